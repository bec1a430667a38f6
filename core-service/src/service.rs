//! Music service event loop and its command handle
//!
//! [`MusicService::start`] wires the ports into a route controller, playlist
//! and search clients, then moves them into a single task. That task is the
//! only place state changes: proximity readings, backend signals, search
//! completions and user commands are processed one at a time, with host
//! events taking priority over pending commands.
//!
//! [`MusicHandle`] is the cloneable front end used by the UI layer.

use bridge_traits::audio_session::AudioRoute;
use bridge_traits::playback::PlaybackState;
use bridge_traits::sensor::ProximityState;
use core_library::{MediaRecord, MediaSource, Playlist, PlaylistStore};
use core_playback::{
    AudioRouteController, BackendSignal, EmbeddedWebPlayer, LocalPreviewPlayer, MediaBackend,
    ProximitySignal,
};
use core_runtime::config::{BrowserConfig, CoreConfig};
use core_runtime::events::{
    BrowserEvent, CoreEvent, EventBus, EventStream, PlaylistEvent, Receiver,
};
use core_search::{web_search_url, SearchClient};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::browser::BrowserRequest;
use crate::error::{CoreError, Result};
use crate::CoreDependencies;

const COMMAND_BUFFER: usize = 32;

/// Read-only projection of the service state for UI rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSnapshot {
    pub mode: MediaSource,
    pub proximity: ProximityState,
    pub route: AudioRoute,
    pub playback: PlaybackState,
    pub current: Option<MediaRecord>,
    pub playlist: Vec<MediaRecord>,
    pub results: Vec<MediaRecord>,
    pub last_query: Option<String>,
    /// Whether the device reported a usable proximity sensor.
    pub proximity_monitoring: bool,
}

enum Command {
    SetMode(MediaSource, oneshot::Sender<()>),
    Search(String, oneshot::Sender<Vec<MediaRecord>>),
    OpenWebSearch(String, oneshot::Sender<Option<BrowserRequest>>),
    Play(MediaRecord, oneshot::Sender<()>),
    TogglePlayPause(oneshot::Sender<()>),
    PlayNext(oneshot::Sender<bool>),
    PlayPrevious(oneshot::Sender<bool>),
    AddToPlaylist(MediaRecord, oneshot::Sender<bool>),
    RemoveFromPlaylist(String, oneshot::Sender<bool>),
    Snapshot(oneshot::Sender<ServiceSnapshot>),
    Shutdown(oneshot::Sender<()>),
}

/// A finished off-loop search, re-entering the loop.
struct SearchDone {
    sequence: u64,
    query: String,
    records: Vec<MediaRecord>,
    reply: oneshot::Sender<Vec<MediaRecord>>,
}

/// Command front end of a running [`MusicService`].
///
/// Every method fails only with [`CoreError::ServiceStopped`]; playback,
/// search and storage problems are absorbed by the service and reported as
/// [`CoreEvent`]s.
#[derive(Clone)]
pub struct MusicHandle {
    commands: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl MusicHandle {
    /// Subscribe to service events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    pub fn events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    /// Switch between the Spotify and YouTube modes. Clears the current
    /// search results.
    pub async fn set_mode(&self, mode: MediaSource) -> Result<()> {
        self.request(|reply| Command::SetMode(mode, reply)).await
    }

    /// Search the current mode's catalogue. Never fails on provider errors:
    /// placeholder records are returned instead.
    pub async fn search(&self, query: impl Into<String>) -> Result<Vec<MediaRecord>> {
        let query = query.into();
        self.request(|reply| Command::Search(query, reply)).await
    }

    /// Build the in-app browser request for a web search in the current mode.
    /// `None` for an empty query.
    pub async fn open_web_search(&self, query: impl Into<String>) -> Result<Option<BrowserRequest>> {
        let query = query.into();
        self.request(|reply| Command::OpenWebSearch(query, reply))
            .await
    }

    /// Make `record` the current selection.
    pub async fn play(&self, record: MediaRecord) -> Result<()> {
        self.request(|reply| Command::Play(record, reply)).await
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.request(Command::TogglePlayPause).await
    }

    /// Returns `false` at the end of the playlist.
    pub async fn play_next(&self) -> Result<bool> {
        self.request(Command::PlayNext).await
    }

    /// Returns `false` at the start of the playlist.
    pub async fn play_previous(&self) -> Result<bool> {
        self.request(Command::PlayPrevious).await
    }

    /// Append `record` to the playlist. Returns `false` if its id is already
    /// present.
    pub async fn add_to_playlist(&self, record: MediaRecord) -> Result<bool> {
        self.request(|reply| Command::AddToPlaylist(record, reply))
            .await
    }

    pub async fn remove_from_playlist(&self, id: impl Into<String>) -> Result<bool> {
        let id = id.into();
        self.request(|reply| Command::RemoveFromPlaylist(id, reply))
            .await
    }

    pub async fn snapshot(&self) -> Result<ServiceSnapshot> {
        self.request(Command::Snapshot).await
    }

    /// Stop the service loop, releasing the sensor and host callbacks.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(Command::Shutdown).await
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| CoreError::ServiceStopped)?;
        response.await.map_err(|_| CoreError::ServiceStopped)
    }
}

/// State owned by the service loop.
pub struct MusicService {
    controller: AudioRouteController,
    proximity: ProximitySignal,
    proximity_monitoring: bool,
    playlist: Playlist,
    store: PlaylistStore,
    spotify: Arc<SearchClient>,
    youtube: Arc<SearchClient>,
    browser: BrowserConfig,
    event_bus: EventBus,
    mode: MediaSource,
    results: Vec<MediaRecord>,
    last_query: Option<String>,
    search_sequence: u64,
    applied_sequence: u64,
}

struct Channels {
    commands: mpsc::Receiver<Command>,
    signals: mpsc::UnboundedReceiver<BackendSignal>,
    proximity: watch::Receiver<ProximityState>,
    searches: mpsc::UnboundedReceiver<SearchDone>,
    search_results: mpsc::UnboundedSender<SearchDone>,
}

impl MusicService {
    /// Validate `config`, restore the playlist, activate the audio session,
    /// start proximity monitoring and spawn the service loop on the current
    /// tokio runtime.
    pub async fn start(config: CoreConfig, deps: CoreDependencies) -> Result<MusicHandle> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        let backends: Vec<Arc<dyn MediaBackend>> = vec![
            Arc::new(EmbeddedWebPlayer::new(
                deps.web_view,
                &config.playback,
                signal_tx.clone(),
            )),
            Arc::new(LocalPreviewPlayer::new(deps.preview_player, signal_tx)),
        ];
        let controller = AudioRouteController::new(
            deps.audio_session,
            backends,
            config.playback.clone(),
            event_bus.clone(),
        );
        controller.activate_session(config.session).await;

        let store = PlaylistStore::new(deps.settings_store, config.playlist_storage_key.clone());
        let playlist = store.load().await;
        let _ = event_bus.emit(CoreEvent::Playlist(PlaylistEvent::Loaded {
            count: playlist.len(),
        }));

        let spotify = Arc::new(SearchClient::for_source(
            MediaSource::Spotify,
            Arc::clone(&deps.http_client),
            &config.search,
            event_bus.clone(),
        ));
        let youtube = Arc::new(SearchClient::for_source(
            MediaSource::YouTube,
            deps.http_client,
            &config.search,
            event_bus.clone(),
        ));

        let proximity = ProximitySignal::new(deps.proximity_sensor);
        let proximity_rx = proximity.subscribe();
        let proximity_monitoring = proximity.start();

        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (search_tx, search_rx) = mpsc::unbounded_channel();

        let service = MusicService {
            controller,
            proximity,
            proximity_monitoring,
            playlist,
            store,
            spotify,
            youtube,
            browser: config.browser,
            event_bus: event_bus.clone(),
            mode: MediaSource::default(),
            results: Vec::new(),
            last_query: None,
            search_sequence: 0,
            applied_sequence: 0,
        };

        info!(
            playlist = service.playlist.len(),
            proximity_monitoring, "Music service started"
        );
        tokio::spawn(service.run(Channels {
            commands: command_rx,
            signals: signal_rx,
            proximity: proximity_rx,
            searches: search_rx,
            search_results: search_tx,
        }));

        Ok(MusicHandle {
            commands: command_tx,
            event_bus,
        })
    }

    async fn run(mut self, mut channels: Channels) {
        loop {
            tokio::select! {
                biased;

                changed = channels.proximity.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let near = channels.proximity.borrow_and_update().is_near();
                    self.controller.on_proximity_changed(near).await;
                }
                Some(signal) = channels.signals.recv() => {
                    self.controller.handle_signal(signal, &self.playlist).await;
                }
                Some(done) = channels.searches.recv() => {
                    self.finish_search(done);
                }
                command = channels.commands.recv() => match command {
                    Some(Command::Shutdown(reply)) => {
                        self.shutdown().await;
                        let _ = reply.send(());
                        return;
                    }
                    Some(command) => self.handle_command(command, &channels.search_results).await,
                    None => break,
                },
            }
        }

        self.shutdown().await;
    }

    async fn handle_command(&mut self, command: Command, search_results: &mpsc::UnboundedSender<SearchDone>) {
        match command {
            Command::SetMode(mode, reply) => {
                if mode != self.mode {
                    debug!(mode = %mode, "Switching mode");
                    self.mode = mode;
                    self.results.clear();
                    self.last_query = None;
                }
                let _ = reply.send(());
            }
            Command::Search(query, reply) => self.begin_search(query, reply, search_results),
            Command::OpenWebSearch(query, reply) => {
                let _ = reply.send(self.web_search_request(&query));
            }
            Command::Play(record, reply) => {
                if let Err(e) = self.controller.play_new(record).await {
                    debug!(error = %e, "Play request not fulfilled");
                }
                let _ = reply.send(());
            }
            Command::TogglePlayPause(reply) => {
                self.controller.toggle_play_pause().await;
                let _ = reply.send(());
            }
            Command::PlayNext(reply) => {
                let moved = self.controller.play_next(&self.playlist).await;
                let _ = reply.send(moved);
            }
            Command::PlayPrevious(reply) => {
                let moved = self.controller.play_previous(&self.playlist).await;
                let _ = reply.send(moved);
            }
            Command::AddToPlaylist(record, reply) => {
                let _ = reply.send(self.add_to_playlist(record).await);
            }
            Command::RemoveFromPlaylist(id, reply) => {
                let _ = reply.send(self.remove_from_playlist(&id).await);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown(reply) => {
                // Handled by the loop.
                let _ = reply.send(());
            }
        }
    }

    fn begin_search(
        &mut self,
        query: String,
        reply: oneshot::Sender<Vec<MediaRecord>>,
        search_results: &mpsc::UnboundedSender<SearchDone>,
    ) {
        if query.trim().is_empty() {
            debug!("Ignoring empty search");
            let _ = reply.send(Vec::new());
            return;
        }

        self.search_sequence += 1;
        let sequence = self.search_sequence;
        let client = match self.mode {
            MediaSource::Spotify => Arc::clone(&self.spotify),
            MediaSource::YouTube => Arc::clone(&self.youtube),
        };
        let done = search_results.clone();

        tokio::spawn(async move {
            let records = client.search(&query).await;
            let _ = done.send(SearchDone {
                sequence,
                query,
                records,
                reply,
            });
        });
    }

    fn finish_search(&mut self, done: SearchDone) {
        if done.sequence > self.applied_sequence {
            self.applied_sequence = done.sequence;
            self.results = done.records.clone();
            self.last_query = Some(done.query.trim().to_string());
        } else {
            debug!(sequence = done.sequence, "Superseded search; results not shown");
        }
        let _ = done.reply.send(done.records);
    }

    fn web_search_request(&self, query: &str) -> Option<BrowserRequest> {
        let url = web_search_url(self.mode, query)?;
        let mode = match self.mode {
            MediaSource::Spotify => self.browser.spotify_mode,
            MediaSource::YouTube => self.browser.youtube_mode,
        };

        match BrowserRequest::new(&url, mode, self.browser.blocked_schemes.clone()) {
            Ok(request) => {
                let _ = self.event_bus.emit(CoreEvent::Browser(BrowserEvent::Requested {
                    url: request.url.clone(),
                    mode,
                }));
                Some(request)
            }
            Err(e) => {
                warn!(error = %e, "Could not build browser request");
                None
            }
        }
    }

    async fn add_to_playlist(&mut self, record: MediaRecord) -> bool {
        let media_id = record.id().to_string();
        let title = record.title().to_string();
        if !self.playlist.add(record) {
            debug!(media_id = %media_id, "Already in playlist");
            return false;
        }

        let _ = self.event_bus.emit(CoreEvent::Playlist(PlaylistEvent::Added {
            media_id,
            title,
            position: self.playlist.len() - 1,
        }));
        self.persist_playlist().await;
        true
    }

    async fn remove_from_playlist(&mut self, id: &str) -> bool {
        if self.playlist.remove(id).is_none() {
            return false;
        }

        let _ = self.event_bus.emit(CoreEvent::Playlist(PlaylistEvent::Removed {
            media_id: id.to_string(),
        }));
        self.persist_playlist().await;
        true
    }

    async fn persist_playlist(&self) {
        if let Err(e) = self.store.save(&self.playlist).await {
            warn!(error = %e, "Failed to save playlist");
        }
    }

    fn snapshot(&self) -> ServiceSnapshot {
        let route = self.controller.snapshot();
        ServiceSnapshot {
            mode: self.mode,
            proximity: route.proximity,
            route: route.route,
            playback: route.playback,
            current: route.current,
            playlist: self.playlist.records().to_vec(),
            results: self.results.clone(),
            last_query: self.last_query.clone(),
            proximity_monitoring: self.proximity_monitoring,
        }
    }

    async fn shutdown(&mut self) {
        self.proximity.stop();
        self.controller.shutdown().await;
        info!("Music service stopped");
    }
}
