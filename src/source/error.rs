use thiserror::Error;

/// Why a load attempt produced no table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("failed to load data from {origin}: {message}")]
    SourceUnavailable { origin: String, message: String },

    #[error(
        "no data source configured: enter a published CSV URL, \
         or a spreadsheet id together with service-account credentials"
    )]
    NoSourceConfigured,

    #[error("service-account credentials are malformed: {reason}")]
    CredentialMalformed { reason: String },
}

impl SourceError {
    /// Wrap an internal error chain for a given origin.
    pub fn unavailable(origin: impl Into<String>, err: &anyhow::Error) -> Self {
        SourceError::SourceUnavailable {
            origin: origin.into(),
            message: format!("{err:#}"),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        SourceError::CredentialMalformed {
            reason: reason.into(),
        }
    }
}
