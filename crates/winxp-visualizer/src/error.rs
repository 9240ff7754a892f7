use thiserror::Error;

/// Errors raised by the player outside the render path.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no global window exists")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("audio graph setup failed: {0}")]
    AudioGraph(String),

    #[error("playback was rejected: {0}")]
    PlaybackRejected(String),

    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
