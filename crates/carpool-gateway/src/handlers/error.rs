//! Handler error types

use carpool_service::ServiceError;
use thiserror::Error;

use crate::protocol::CloseCode;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Invalid payload received
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Service error
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Close code for this error, or `None` when the socket should stay open.
    ///
    /// Requests the service rejected (empty message, unknown receiver) are
    /// dropped without closing; only infrastructure failures end the session.
    pub fn to_close_code(&self) -> Option<CloseCode> {
        match self {
            Self::InvalidPayload(_) => Some(CloseCode::DecodeError),
            Self::Service(e) if e.status_code() < 500 => None,
            Self::Service(_) | Self::Internal(_) => Some(CloseCode::UnknownError),
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
