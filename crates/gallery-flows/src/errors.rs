use thiserror::Error;

use dom_bridge::DomError;
use gallerypilot_core_types::PilotError;
use glyph_probe::ProbeError;

#[derive(Debug, Error, Clone)]
pub enum FlowError {
    #[error("glyph probe failed: {0}")]
    Probe(#[from] ProbeError),
    #[error("document bridge failed: {0}")]
    Dom(#[from] DomError),
}

impl From<FlowError> for PilotError {
    fn from(err: FlowError) -> Self {
        PilotError::new(err.to_string())
    }
}
