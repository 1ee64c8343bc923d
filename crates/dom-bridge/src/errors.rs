use thiserror::Error;

use gallerypilot_core_types::{NodeId, PilotError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0} is no longer attached")]
    Detached(NodeId),
    #[error("{0}")]
    Internal(String),
}

impl From<DomError> for PilotError {
    fn from(err: DomError) -> Self {
        PilotError::new(err.to_string())
    }
}
