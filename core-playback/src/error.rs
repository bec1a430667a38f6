//! # Playback Error Types

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
///
/// The controller reports these as `PlaybackEvent::Error` and keeps its
/// state; they are returned mainly so callers can log them.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// No backend can play this kind of media.
    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    /// The media reference is malformed (e.g. an unsafe video id).
    #[error("Invalid media reference: {0}")]
    InvalidMedia(String),

    /// A play/pause command was issued with nothing loaded.
    #[error("No media loaded")]
    NoActiveMedia,

    /// The host player or web view rejected a command.
    #[error("Backend error: {0}")]
    Bridge(#[from] BridgeError),
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
