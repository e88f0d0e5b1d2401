use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the session token. The stored token is gone.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("The server did not respond in time")]
    Timeout,

    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err)
        }
    }
}
