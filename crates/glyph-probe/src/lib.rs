//! Recognizes navigation-arrow icons by the shape of their SVG path data.
//!
//! The host application's markup carries no semantic labels, so forward/back
//! controls are identified geometrically: a small subset of the SVG path
//! grammar is evaluated into absolute vertices and a caret-topology test
//! classifies the vertex cloud as pointing left or right.

pub mod classify;
pub mod errors;
pub mod path;

pub use classify::{arrow_direction, classify};
pub use errors::ProbeError;
pub use path::{absolute_points, tokenize, PathCommand, Point};
