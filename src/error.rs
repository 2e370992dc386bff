use axum::http::StatusCode;
use thiserror::Error;

/// Every way a processing request can fail. All variants are turned into a
/// `{ success: false, error }` response at the boundary.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("missing required parameters")]
    MissingParameter,

    #[error("no API key configured or supplied")]
    MissingCredential,

    #[error("text is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("completion provider failed: {0:#}")]
    ProviderFailure(anyhow::Error),
}

impl ProcessError {
    /// `provider_failure` is the configured status for upstream failures.
    pub fn status(&self, provider_failure: StatusCode) -> StatusCode {
        match self {
            ProcessError::MissingParameter
            | ProcessError::MissingCredential
            | ProcessError::InvalidJson(_)
            | ProcessError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ProcessError::ProviderFailure(_) => provider_failure,
        }
    }

    pub fn is_validation(&self) -> bool {
        !matches!(self, ProcessError::ProviderFailure(_))
    }
}
