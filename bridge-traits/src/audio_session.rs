//! Audio Session Abstraction
//!
//! The process-wide audio session (category, output route) is platform state.
//! Exactly one component, the route controller in `core-playback`, is handed
//! this port and is the only caller that changes the route.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::sensor::ProximityState;

/// Physical output device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioRoute {
    /// Loudspeaker / default media output.
    #[default]
    Speaker,
    /// Receiver held against the ear.
    Earpiece,
}

impl AudioRoute {
    /// The route that is consistent with a proximity reading.
    pub fn for_proximity(proximity: ProximityState) -> Self {
        match proximity {
            ProximityState::Near => AudioRoute::Earpiece,
            ProximityState::Far => AudioRoute::Speaker,
        }
    }
}

impl fmt::Display for AudioRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioRoute::Speaker => write!(f, "speaker"),
            AudioRoute::Earpiece => write!(f, "earpiece"),
        }
    }
}

/// Session category requested at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionCategory {
    /// Plays alongside other apps and respects the silent switch.
    Ambient,
    /// Media playback that keeps playing with the silent switch on.
    Playback,
    /// Voice-style session; required on some platforms for receiver output.
    PlayAndRecord,
}

/// Startup session profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProfile {
    pub category: SessionCategory,
    /// Mix with audio from other apps instead of interrupting it.
    pub mix_with_others: bool,
}

impl Default for SessionProfile {
    fn default() -> Self {
        Self {
            category: SessionCategory::Ambient,
            mix_with_others: true,
        }
    }
}

/// Platform audio session.
///
/// - iOS: `AVAudioSession` category + `overrideOutputAudioPort`
/// - Android: `AudioManager` mode + `setSpeakerphoneOn` / communication device
#[async_trait]
pub trait AudioSession: Send + Sync {
    /// Configure and activate the session.
    async fn activate(&self, profile: SessionProfile) -> Result<()>;

    /// Reconfigure output to `route`. May fail, in which case the previous
    /// output stays in effect.
    async fn apply_route(&self, route: AudioRoute) -> Result<()>;

    /// Deactivate the session, letting other apps resume.
    async fn deactivate(&self) -> Result<()> {
        Ok(())
    }
}
