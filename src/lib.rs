//! gallery-pilot library
//!
//! Keyboard-driven navigation and workflow shortcuts over a third-party
//! photo-gallery web application. The hard part is not the keyboard
//! handling: it is synchronizing automated actions against an external,
//! eventually-consistent tree whose controls are recognized by heuristic
//! shape. See the workspace crates for the pieces: `glyph-probe`
//! (arrow-icon recognition), `dom-bridge` (the document port and change
//! wait), `gallerypilot-serializer` (one workflow at a time), and
//! `gallery-flows` (the state machines this crate dispatches to).

pub mod keymap;
pub mod pilot;

pub use keymap::{recognize, Command, KeyChord};
pub use pilot::Pilot;

// Re-export the workflow surface for embedders.
pub use gallery_flows::{Outcome, WaitPolicy};
pub use gallerypilot_core_types::{Direction, NodeId, PilotError};
