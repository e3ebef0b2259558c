// ABOUTME: Server-side error types layered the way client/error.rs layers SmppError
// ABOUTME: Wraps ConnectionError plus authentication/throttling failures specific to the SMSC role

use thiserror::Error;

/// Authentication was attempted and rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("authentication rejected for system_id '{system_id}'")]
pub struct AuthenticationError {
    pub system_id: String,
}

/// A host-imposed rate or capacity limit rejected the request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("throttled: {reason}")]
pub struct ThrottlingError {
    pub reason: String,
}

/// Everything that can go wrong running a server session or listener.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("connection error: {0}")]
    Connection(#[from] crate::connection::ConnectionError),

    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error(transparent)]
    Throttling(#[from] ThrottlingError),

    #[error("listener i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no bound session found for system_id '{0}'")]
    NoSuchSession(String),
}

pub type ServerResult<T> = Result<T, ServerError>;
