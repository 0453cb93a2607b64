use shared::{ErrorKind, ErrorResponse};

/// Failure of an enrollment operation.
///
/// Precondition failures come back as values; nothing in the domain layer panics on
/// bad input. Storage failures are wrapped in `Persistence` and shown to the user as a
/// generic retry message.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Failed to save, try again")]
    Persistence(#[source] anyhow::Error),
}

impl EnrollmentError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EnrollmentError::InvalidRequest(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EnrollmentError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            EnrollmentError::NotFound(_) => ErrorKind::NotFound,
            EnrollmentError::Conflict(_) => ErrorKind::Conflict,
            EnrollmentError::Persistence(_) => ErrorKind::PersistenceError,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<anyhow::Error> for EnrollmentError {
    fn from(error: anyhow::Error) -> Self {
        EnrollmentError::Persistence(error)
    }
}
