use thiserror::Error;

/// Failures reported by the session lifecycle operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(String),
    /// The session outlived its TTL and has been removed.
    #[error("session {0} expired")]
    Expired(String),
    #[error("session {0} already exists")]
    Conflict(String),
    #[error("failed to provision upload destinations: {0}")]
    Provisioning(#[source] anyhow::Error),
}
