use shared::domain::InvalidTransition;
use thiserror::Error;

/// Failure at the remote-service seam.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Text suitable for a notification description.
    pub fn user_message(&self) -> &str {
        match self {
            ServiceError::Transport(message)
            | ServiceError::Status { message, .. }
            | ServiceError::Decode(message) => message,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            ServiceError::Decode(value.to_string())
        } else if let Some(status) = value.status() {
            ServiceError::Status {
                status: status.as_u16(),
                message: value.to_string(),
            }
        } else {
            ServiceError::Transport(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("failed to fetch proposals: {0}")]
    Service(#[from] ServiceError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("failed to update applicant status: {0}")]
    Service(#[from] ServiceError),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("applicant {applicant_id} not found on proposal {proposal_id}")]
    UnknownApplicant {
        proposal_id: String,
        applicant_id: String,
    },
}
