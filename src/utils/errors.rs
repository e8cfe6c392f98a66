use thiserror::Error;

/// Main error type for Selkie
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Backend returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Session not initialized")]
    NotInitialized,

    #[error("Push stream error: {0}")]
    Stream(String),
}

impl ChatError {
    /// True for HTTP/network failures, as opposed to lifecycle or push
    /// channel errors.
    pub fn is_transport(&self) -> bool {
        matches!(self, ChatError::Network(_) | ChatError::Api { .. })
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ChatError>;
