//! Export error types

use crate::generator::ExportStage;
use permit_export_state::FetchError;

/// Errors that abort an export
///
/// Per-entity problems are never errors; they are recorded as warnings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// Missing or malformed input, detected before any stage runs
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stage could not read its state (transport, authentication or a
    /// response it cannot interpret)
    #[error("Failed to export {stage}: {source}")]
    Fetch {
        stage: ExportStage,
        #[source]
        source: FetchError,
    },

    /// The export was cancelled before `stage` started
    #[error("Export cancelled before {stage}")]
    Cancelled { stage: ExportStage },
}

impl ExportError {
    pub fn fetch(stage: ExportStage, source: FetchError) -> Self {
        Self::Fetch { stage, source }
    }

    /// Stage the error is attributed to, if any
    pub fn stage(&self) -> Option<ExportStage> {
        match self {
            Self::Config(_) => None,
            Self::Fetch { stage, .. } | Self::Cancelled { stage } => Some(*stage),
        }
    }
}
