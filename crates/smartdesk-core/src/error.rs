use reqwest::StatusCode;

/// Errors raised while talking to the SmartDesk backend or validating input.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("{0}")]
    Validation(String),
    #[error("HTTP error! status: {status}")]
    Http { status: StatusCode },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("request task failed: {0}")]
    TaskFailed(String),
    #[error("health check reported status '{0}'")]
    HealthCheck(String),
}

impl DeskError {
    pub fn is_validation(&self) -> bool {
        matches!(self, DeskError::Validation(_))
    }
}

pub type DeskResult<T> = Result<T, DeskError>;
