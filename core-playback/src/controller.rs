//! # Audio Route Controller
//!
//! Keeps the audio output route consistent with the proximity sensor and
//! owns the playback state of the current selection.
//!
//! ## Transitions
//!
//! On every proximity reading the target route is derived from the reading
//! (`Near` → `Earpiece`, `Far` → `Speaker`):
//!
//! | route    | reading | action                                                 |
//! |----------|---------|--------------------------------------------------------|
//! | Speaker  | near    | switch to earpiece; on success auto-play loaded media  |
//! | Earpiece | far     | switch to speaker; playback continues untouched        |
//! | Speaker  | far     | nothing                                                |
//! | Earpiece | near    | nothing                                                |
//!
//! A rejected route change keeps the previous route and is reported as
//! [`RouteEvent::RouteChangeFailed`]. There is no internal retry: the next
//! transition of the sensor retries.
//!
//! The controller is the only caller of [`AudioSession::apply_route`].

use bridge_traits::audio_session::{AudioRoute, AudioSession, SessionProfile};
use bridge_traits::playback::PlaybackState;
use bridge_traits::sensor::ProximityState;
use core_library::{MediaRecord, Playlist};
use core_runtime::config::PlaybackPolicy;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, RouteEvent};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::backend::{BackendSignal, MediaBackend, SignalOutcome};
use crate::error::{PlaybackError, Result};

/// Read-only projection of the controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSnapshot {
    pub proximity: ProximityState,
    pub route: AudioRoute,
    pub playback: PlaybackState,
    pub current: Option<MediaRecord>,
}

impl RouteSnapshot {
    pub fn has_active_media(&self) -> bool {
        self.current.is_some()
    }
}

#[derive(Debug, Clone)]
struct Selection {
    record: MediaRecord,
    backend: usize,
}

pub struct AudioRouteController {
    session: Arc<dyn AudioSession>,
    backends: Vec<Arc<dyn MediaBackend>>,
    policy: PlaybackPolicy,
    event_bus: EventBus,
    proximity: ProximityState,
    route: AudioRoute,
    playback: PlaybackState,
    current: Option<Selection>,
}

impl AudioRouteController {
    /// Create a controller. `backends` are tried in order; the first one that
    /// supports a record's media plays it.
    pub fn new(
        session: Arc<dyn AudioSession>,
        backends: Vec<Arc<dyn MediaBackend>>,
        policy: PlaybackPolicy,
        event_bus: EventBus,
    ) -> Self {
        Self {
            session,
            backends,
            policy,
            event_bus,
            proximity: ProximityState::Far,
            route: AudioRoute::Speaker,
            playback: PlaybackState::Stopped,
            current: None,
        }
    }

    pub fn proximity(&self) -> ProximityState {
        self.proximity
    }

    pub fn route(&self) -> AudioRoute {
        self.route
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn current(&self) -> Option<&MediaRecord> {
        self.current.as_ref().map(|selection| &selection.record)
    }

    pub fn has_active_media(&self) -> bool {
        self.current.is_some()
    }

    pub fn snapshot(&self) -> RouteSnapshot {
        RouteSnapshot {
            proximity: self.proximity,
            route: self.route,
            playback: self.playback,
            current: self.current().cloned(),
        }
    }

    /// Configure and activate the audio session. Failure is logged and the
    /// controller keeps working with whatever session the host provides.
    pub async fn activate_session(&self, profile: SessionProfile) -> bool {
        match self.session.activate(profile).await {
            Ok(()) => {
                info!(category = ?profile.category, mix_with_others = profile.mix_with_others, "Audio session active");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to activate audio session");
                false
            }
        }
    }

    /// Apply a proximity reading.
    #[instrument(skip(self), fields(route = %self.route))]
    pub async fn on_proximity_changed(&mut self, near: bool) {
        let proximity = ProximityState::from_near(near);
        if proximity != self.proximity {
            self.proximity = proximity;
            self.emit(CoreEvent::Route(RouteEvent::ProximityChanged { proximity }));
        }

        let target = AudioRoute::for_proximity(proximity);
        if target == self.route {
            debug!("Route already consistent with proximity");
            return;
        }

        if let Err(e) = self.session.apply_route(target).await {
            warn!(attempted = %target, retained = %self.route, error = %e, "Route change failed");
            self.emit(CoreEvent::Route(RouteEvent::RouteChangeFailed {
                attempted: target,
                retained: self.route,
                message: e.to_string(),
            }));
            return;
        }

        let from = self.route;
        self.route = target;
        info!(from = %from, to = %target, "Audio route changed");
        self.emit(CoreEvent::Route(RouteEvent::RouteChanged { from, to: target }));

        if target == AudioRoute::Earpiece && self.has_active_media() && !self.playback.is_playing()
        {
            let _ = self.play_current().await;
        }
    }

    /// Pause when playing, otherwise play. No-op with nothing loaded.
    pub async fn toggle_play_pause(&mut self) {
        if !self.has_active_media() {
            debug!("Toggle ignored; nothing loaded");
            return;
        }

        let _ = if self.playback.is_playing() {
            self.pause_current().await
        } else {
            self.play_current().await
        };
    }

    /// Load `record` and make it the current selection. Playback starts when
    /// the phone is at the ear, or always with `play_on_select`.
    pub async fn play_new(&mut self, record: MediaRecord) -> Result<()> {
        let autoplay = self.proximity.is_near() || self.policy.play_on_select;
        self.start(record, autoplay).await
    }

    /// Move to the record after the current one in `playlist`.
    ///
    /// Returns `false`, loading nothing, at the end of the list or when the
    /// current selection is not in it.
    pub async fn play_next(&mut self, playlist: &Playlist) -> bool {
        let neighbour = self
            .current()
            .and_then(|current| playlist.next_after(current.id()))
            .cloned();
        self.step_to(neighbour).await
    }

    /// Move to the record before the current one in `playlist`.
    pub async fn play_previous(&mut self, playlist: &Playlist) -> bool {
        let neighbour = self
            .current()
            .and_then(|current| playlist.previous_before(current.id()))
            .cloned();
        self.step_to(neighbour).await
    }

    /// The current item played to its end: mark it stopped and continue
    /// with the next playlist entry.
    pub async fn on_media_finished(&mut self, playlist: &Playlist) {
        let Some(media_id) = self.current().map(|record| record.id().to_string()) else {
            return;
        };

        self.set_playback(PlaybackState::Stopped);
        self.emit(CoreEvent::Playback(PlaybackEvent::Finished {
            media_id: media_id.clone(),
        }));

        let Some(next) = playlist.next_after(&media_id).cloned() else {
            debug!(media_id = %media_id, "End of playlist");
            return;
        };
        let _ = self.start(next, true).await;
    }

    /// Route a host signal to the backend that raised it.
    pub async fn handle_signal(&mut self, signal: BackendSignal, playlist: &Playlist) {
        let Some(index) = self
            .backends
            .iter()
            .position(|backend| backend.kind() == signal.backend)
        else {
            return;
        };

        match self.backends[index].handle_signal(signal).await {
            SignalOutcome::Finished => {
                let is_current = self
                    .current
                    .as_ref()
                    .is_some_and(|selection| selection.backend == index);
                if is_current {
                    self.on_media_finished(playlist).await;
                } else {
                    debug!(backend = %signal.backend, "Ignoring completion from inactive backend");
                }
            }
            SignalOutcome::Stale => {
                debug!(backend = %signal.backend, generation = signal.generation, "Ignoring stale signal");
            }
            SignalOutcome::Handled => {}
        }
    }

    /// Unregister backend callbacks and deactivate the session.
    pub async fn shutdown(&mut self) {
        if self.playback.is_playing() {
            let _ = self.pause_current().await;
        }
        for backend in &self.backends {
            backend.release();
        }
        if let Err(e) = self.session.deactivate().await {
            warn!(error = %e, "Failed to deactivate audio session");
        }
    }

    async fn step_to(&mut self, neighbour: Option<MediaRecord>) -> bool {
        let Some(record) = neighbour else {
            debug!("No neighbour; selection unchanged");
            return false;
        };

        let autoplay =
            self.playback.is_playing() || self.proximity.is_near() || self.policy.play_on_select;
        self.start(record, autoplay).await.is_ok()
    }

    async fn start(&mut self, record: MediaRecord, autoplay: bool) -> Result<()> {
        let Some(index) = self
            .backends
            .iter()
            .position(|backend| backend.supports(record.media()))
        else {
            let error = PlaybackError::UnsupportedMedia(format!("no backend for {}", record.id()));
            self.report_error(Some(record.id()), &error);
            return Err(error);
        };

        if let Some(previous) = &self.current {
            if previous.backend != index && self.playback.is_playing() {
                if let Err(e) = self.backends[previous.backend].pause().await {
                    warn!(error = %e, "Failed to pause previous backend");
                }
            }
        }

        let backend = Arc::clone(&self.backends[index]);
        if let Err(error) = backend.load(record.media()).await {
            self.current = None;
            self.set_playback(PlaybackState::Stopped);
            self.report_error(Some(record.id()), &error);
            return Err(error);
        }

        info!(media_id = %record.id(), backend = %backend.kind(), "Loaded media");
        self.emit(CoreEvent::Playback(PlaybackEvent::Loaded {
            media_id: record.id().to_string(),
            title: record.title().to_string(),
            backend: backend.kind().as_str().to_string(),
        }));
        self.current = Some(Selection {
            record,
            backend: index,
        });
        self.set_playback(PlaybackState::Stopped);

        if autoplay {
            self.play_current().await?;
        }
        Ok(())
    }

    async fn play_current(&mut self) -> Result<()> {
        let backend = self.current_backend()?;
        match backend.play().await {
            Ok(()) => {
                self.set_playback(PlaybackState::Playing);
                Ok(())
            }
            Err(error) => {
                let media_id = self.current().map(|record| record.id().to_string());
                self.report_error(media_id.as_deref(), &error);
                Err(error)
            }
        }
    }

    async fn pause_current(&mut self) -> Result<()> {
        let backend = self.current_backend()?;
        match backend.pause().await {
            Ok(()) => {
                self.set_playback(PlaybackState::Paused);
                Ok(())
            }
            Err(error) => {
                let media_id = self.current().map(|record| record.id().to_string());
                self.report_error(media_id.as_deref(), &error);
                Err(error)
            }
        }
    }

    fn current_backend(&self) -> Result<Arc<dyn MediaBackend>> {
        self.current
            .as_ref()
            .map(|selection| Arc::clone(&self.backends[selection.backend]))
            .ok_or(PlaybackError::NoActiveMedia)
    }

    fn set_playback(&mut self, state: PlaybackState) {
        if self.playback == state {
            return;
        }
        self.playback = state;
        self.emit(CoreEvent::Playback(PlaybackEvent::StateChanged {
            media_id: self.current().map(|record| record.id().to_string()),
            state,
        }));
    }

    fn report_error(&self, media_id: Option<&str>, error: &PlaybackError) {
        warn!(media_id = ?media_id, error = %error, "Playback command failed");
        self.emit(CoreEvent::Playback(PlaybackEvent::Error {
            media_id: media_id.map(str::to_string),
            message: error.to_string(),
        }));
    }

    fn emit(&self, event: CoreEvent) {
        let _ = self.event_bus.emit(event);
    }
}
