use thiserror::Error;

/// Login or profile-update failure. Surfaced to the operator; the
/// caller leaves any existing session untouched.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The backend refused the request; its message is carried verbatim.
    #[error("{0}")]
    Rejected(Box<str>),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Transient list/telemetry retrieval failure. Absorbed by the polling
/// layer: logged, never fatal, prior data stays visible.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Rejected(Box<str>),
    #[error("transport error: {0}")]
    Transport(String),
}

/// A device did not acknowledge a command. Surfaced to the operator
/// verbatim; no local device state is touched.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Rejected(Box<str>),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for CommandError {
    fn from(err: reqwest::Error) -> Self {
        CommandError::Transport(err.to_string())
    }
}
