use thiserror::Error;

use gallerypilot_core_types::PilotError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("malformed path data near {near:?}")]
    Parse { near: String },
    #[error("unsupported path command {0:?}")]
    UnsupportedCommand(char),
}

impl ProbeError {
    /// Truncated view of the remaining input, for diagnostics.
    pub(crate) fn near(rest: &str) -> Self {
        let end = rest
            .char_indices()
            .take(32)
            .last()
            .map(|(idx, ch)| idx + ch.len_utf8())
            .unwrap_or(0);
        Self::Parse {
            near: rest[..end].to_string(),
        }
    }
}

impl From<ProbeError> for PilotError {
    fn from(err: ProbeError) -> Self {
        PilotError::new(err.to_string())
    }
}
