//! Audio Session Implementation
//!
//! Desktop output goes through the system default device. There is no
//! receiver, so only the speaker route can be applied.

use async_trait::async_trait;
use bridge_traits::{
    audio_session::{AudioRoute, AudioSession, SessionProfile},
    error::{BridgeError, Result},
};
use parking_lot::Mutex;
use tracing::{debug, info};

/// Desktop audio session
///
/// Tracks the requested profile and route. Requests for the earpiece are
/// rejected with [`BridgeError::NotAvailable`].
#[derive(Debug, Default)]
pub struct DesktopAudioSession {
    profile: Mutex<Option<SessionProfile>>,
    route: Mutex<AudioRoute>,
}

impl DesktopAudioSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active profile, if the session has been activated.
    pub fn profile(&self) -> Option<SessionProfile> {
        *self.profile.lock()
    }

    pub fn current_route(&self) -> AudioRoute {
        *self.route.lock()
    }
}

#[async_trait]
impl AudioSession for DesktopAudioSession {
    async fn activate(&self, profile: SessionProfile) -> Result<()> {
        info!(
            category = ?profile.category,
            mix_with_others = profile.mix_with_others,
            "Activating desktop audio session"
        );
        *self.profile.lock() = Some(profile);
        Ok(())
    }

    async fn apply_route(&self, route: AudioRoute) -> Result<()> {
        match route {
            AudioRoute::Speaker => {
                *self.route.lock() = route;
                debug!(route = %route, "Applied audio route");
                Ok(())
            }
            AudioRoute::Earpiece => Err(BridgeError::NotAvailable(
                "earpiece output is not available on desktop".to_string(),
            )),
        }
    }

    async fn deactivate(&self) -> Result<()> {
        self.profile.lock().take();
        debug!("Deactivated desktop audio session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_speaker_only() {
        let session = DesktopAudioSession::new();

        session.activate(SessionProfile::default()).await.unwrap();
        assert_eq!(session.profile(), Some(SessionProfile::default()));

        assert!(session.apply_route(AudioRoute::Speaker).await.is_ok());
        assert!(matches!(
            session.apply_route(AudioRoute::Earpiece).await,
            Err(BridgeError::NotAvailable(_))
        ));
        assert_eq!(session.current_route(), AudioRoute::Speaker);

        session.deactivate().await.unwrap();
        assert_eq!(session.profile(), None);
    }
}
