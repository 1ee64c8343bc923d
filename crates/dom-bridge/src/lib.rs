//! Bridge to the external live document.
//!
//! The host application's tree is an external collaborator: read and acted
//! on through [`DomPort`], never owned. The port exposes generic tree
//! reads, synthetic activation side effects, a one-shot subtree-mutation
//! wait, and scoped input-event subscriptions. [`MemDom`] is the
//! deterministic in-memory implementation that backs the test suite.

pub mod errors;
pub mod events;
pub mod mem;
pub mod ports;

pub use errors::DomError;
pub use events::{InputEvent, InputEvents, InputKind, SubscriptionGuard};
pub use mem::{ActivationEvent, ActivationKind, MemDom};
pub use ports::{By, ChangeWait, DomPort, Scope};
