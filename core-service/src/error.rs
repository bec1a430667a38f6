use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),

    /// The service loop has exited; the handle can no longer be used.
    #[error("Music service has stopped")]
    ServiceStopped,
}

pub type Result<T> = std::result::Result<T, CoreError>;
