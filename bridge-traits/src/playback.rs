//! Playback bridge traits and supporting types.
//!
//! Hosts provide a direct audio-file player (`AVPlayer`, `MediaPlayer`) used
//! for short preview clips.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// Playback lifecycle state as tracked by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Stopped => write!(f, "stopped"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Callback invoked when a clip plays to its end, with the URL it was loaded
/// from.
pub type CompletionHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Platform audio-file player for streamable preview clips.
#[async_trait]
pub trait PreviewAudioPlayer: Send + Sync {
    /// Load the clip at `url`, replacing (and stopping) any current item.
    async fn load(&self, url: &str) -> Result<()>;

    /// Begin or resume playback of the loaded clip.
    async fn play(&self) -> Result<()>;

    /// Pause without unloading.
    async fn pause(&self) -> Result<()>;

    /// Install (or with `None`, remove) the end-of-clip callback.
    fn set_completion_handler(&self, handler: Option<CompletionHandler>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_state_defaults_to_stopped() {
        assert_eq!(PlaybackState::default(), PlaybackState::Stopped);
        assert!(PlaybackState::Playing.is_playing());
        assert!(!PlaybackState::Paused.is_playing());
        assert_eq!(PlaybackState::Paused.to_string(), "paused");
    }
}
