//! Workflow state machines over the external gallery UI.
//!
//! Each workflow composes the same primitives: the shared focused-input
//! preamble ([`scope`]), the glyph probe for arrow recognition, and the
//! one-shot change wait for synchronizing against the host application's
//! asynchronous rebuilds. Missing preconditions are silent no-ops, not
//! errors; the feature simply does not apply to the current screen.

pub mod album;
pub mod errors;
pub mod heuristics;
pub mod location;
pub mod menu;
pub mod navigate;
pub mod scope;
pub mod types;

pub use album::add_to_album;
pub use errors::FlowError;
pub use location::edit_location;
pub use menu::{locate_target_menu_item, MenuEntry};
pub use navigate::navigate;
pub use scope::{focused_scope, ScopeCtx};
pub use types::{ControlCandidate, Outcome, WaitPolicy};
