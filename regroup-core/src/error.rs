use std::path::PathBuf;
use thiserror::Error;

/// Failures that callers may want to match on.
///
/// Everything else travels as `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum RegroupError {
    #[error("invalid {what} pattern '{pattern}': {source}")]
    InvalidPattern {
        what: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("id step must be greater than zero")]
    ZeroIdStep,

    #[error("start directory not found: {}", .0.display())]
    StartDirNotFound(PathBuf),

    #[error("failed to write history log {}: {source}", path.display())]
    HistoryWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read history log {}: {source}", path.display())]
    HistoryRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl RegroupError {
    /// True for errors caused by bad user input rather than the environment
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. } | Self::ZeroIdStep | Self::StartDirNotFound(_)
        )
    }
}
