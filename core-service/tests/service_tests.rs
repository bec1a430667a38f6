//! Music service loop over the in-process host fakes.

use async_trait::async_trait;
use bridge_traits::audio_session::AudioRoute;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::fakes::{
    FakeAudioSession, FakePreviewPlayer, FakeProximitySensor, FakeWebContentView,
    MemorySettingsStore, PreviewCall,
};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::playback::PlaybackState;
use bridge_traits::sensor::ProximityState;
use bridge_traits::web::NavigationMode;
use bridge_traits::SettingsStore;
use bytes::Bytes;
use core_library::{MediaRecord, MediaSource};
use core_runtime::config::CoreConfig;
use core_runtime::events::{BrowserEvent, CoreEvent, PlaylistEvent, Receiver};
use core_service::{CoreDependencies, CoreError, MusicHandle, MusicService, NavigationDecision};
use mockall::mock;
use std::collections::HashMap;
use std::sync::Arc;

mock! {
    Http {}

    #[async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

struct Host {
    sensor: Arc<FakeProximitySensor>,
    session: Arc<FakeAudioSession>,
    web: Arc<FakeWebContentView>,
    preview: Arc<FakePreviewPlayer>,
    settings: Arc<MemorySettingsStore>,
}

impl Host {
    fn new() -> Self {
        Self::with_settings(Arc::new(MemorySettingsStore::new()))
    }

    fn with_settings(settings: Arc<MemorySettingsStore>) -> Self {
        Self {
            sensor: Arc::new(FakeProximitySensor::new()),
            session: Arc::new(FakeAudioSession::new()),
            web: Arc::new(FakeWebContentView::new()),
            preview: Arc::new(FakePreviewPlayer::new()),
            settings,
        }
    }

    fn deps(&self, http: impl HttpClient + 'static) -> CoreDependencies {
        CoreDependencies::new(
            Arc::new(http),
            self.settings.clone(),
            self.sensor.clone(),
            self.session.clone(),
            self.web.clone(),
            self.preview.clone(),
        )
    }

    async fn start(&self) -> MusicHandle {
        self.start_with(CoreConfig::builder().build().unwrap(), offline())
            .await
    }

    async fn start_with(&self, config: CoreConfig, http: MockHttp) -> MusicHandle {
        MusicService::start(config, self.deps(http)).await.unwrap()
    }
}

/// HTTP client that must never be reached.
fn offline() -> MockHttp {
    let mut http = MockHttp::new();
    http.expect_execute().times(0);
    http
}

fn track(id: &str) -> MediaRecord {
    MediaRecord::track(
        id,
        format!("Track {}", id),
        Some(format!("https://p.scdn.co/mp3-preview/{}", id)),
        Some(format!("spotify:track:{}", id)),
    )
}

fn drain(events: &mut Receiver<CoreEvent>) -> Vec<CoreEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

#[tokio::test]
async fn raise_to_ear_routes_and_plays_selection() {
    let host = Host::new();
    let music = host.start().await;

    music.play(track("a")).await.unwrap();
    let snapshot = music.snapshot().await.unwrap();
    assert_eq!(snapshot.playback, PlaybackState::Stopped);
    assert_eq!(snapshot.route, AudioRoute::Speaker);
    assert!(snapshot.proximity_monitoring);

    assert!(host.sensor.emit(true));
    let snapshot = music.snapshot().await.unwrap();
    assert_eq!(snapshot.proximity, ProximityState::Near);
    assert_eq!(snapshot.route, AudioRoute::Earpiece);
    assert_eq!(snapshot.playback, PlaybackState::Playing);
    assert_eq!(host.preview.play_count(), 1);

    assert!(host.sensor.emit(false));
    let snapshot = music.snapshot().await.unwrap();
    assert_eq!(snapshot.route, AudioRoute::Speaker);
    assert_eq!(snapshot.playback, PlaybackState::Playing);
    assert_eq!(
        host.session.applied_routes(),
        vec![AudioRoute::Earpiece, AudioRoute::Speaker]
    );
}

#[tokio::test]
async fn selection_while_near_plays_immediately() {
    let host = Host::new();
    let music = host.start().await;

    host.sensor.emit(true);
    music.play(track("a")).await.unwrap();

    let snapshot = music.snapshot().await.unwrap();
    assert_eq!(snapshot.playback, PlaybackState::Playing);
    assert_eq!(snapshot.current.map(|r| r.id().to_string()).as_deref(), Some("a"));
}

#[tokio::test]
async fn playlist_survives_restart() {
    let settings = Arc::new(MemorySettingsStore::new());

    let host = Host::with_settings(settings.clone());
    let music = host.start().await;
    assert!(music.add_to_playlist(track("a")).await.unwrap());
    assert!(music.add_to_playlist(track("b")).await.unwrap());
    assert!(music.add_to_playlist(track("c")).await.unwrap());
    assert!(music.remove_from_playlist("b").await.unwrap());
    music.shutdown().await.unwrap();

    let host = Host::with_settings(settings);
    let music = host.start().await;
    let mut events = music.subscribe();
    let snapshot = music.snapshot().await.unwrap();

    let ids: Vec<&str> = snapshot.playlist.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn duplicate_add_is_rejected() {
    let host = Host::new();
    let music = host.start().await;
    let mut events = music.subscribe();

    assert!(music.add_to_playlist(track("a")).await.unwrap());
    assert!(!music.add_to_playlist(track("a")).await.unwrap());
    assert!(!music.remove_from_playlist("missing").await.unwrap());

    assert_eq!(music.snapshot().await.unwrap().playlist.len(), 1);
    assert_eq!(
        drain(&mut events),
        vec![CoreEvent::Playlist(PlaylistEvent::Added {
            media_id: "a".to_string(),
            title: "Track a".to_string(),
            position: 0,
        })]
    );
}

#[tokio::test]
async fn corrupt_saved_playlist_starts_empty() {
    let settings = Arc::new(MemorySettingsStore::new());
    settings
        .set_string("saved_playlist", "{not json")
        .await
        .unwrap();

    let host = Host::with_settings(settings);
    let music = host.start().await;

    assert!(music.snapshot().await.unwrap().playlist.is_empty());
}

#[tokio::test]
async fn clip_completion_advances_through_playlist() {
    let host = Host::new();
    let music = host.start().await;
    for id in ["a", "b"] {
        music.add_to_playlist(track(id)).await.unwrap();
    }

    music.play(track("a")).await.unwrap();
    assert!(host.preview.finish());

    let snapshot = music.snapshot().await.unwrap();
    assert_eq!(snapshot.current.map(|r| r.id().to_string()).as_deref(), Some("b"));
    assert_eq!(snapshot.playback, PlaybackState::Playing);

    assert!(!music.play_next().await.unwrap());
    assert!(music.play_previous().await.unwrap());
    let snapshot = music.snapshot().await.unwrap();
    assert_eq!(snapshot.current.map(|r| r.id().to_string()).as_deref(), Some("a"));
}

#[tokio::test]
async fn toggle_without_selection_is_noop() {
    let host = Host::new();
    let music = host.start().await;

    music.toggle_play_pause().await.unwrap();

    assert_eq!(music.snapshot().await.unwrap().playback, PlaybackState::Stopped);
    assert!(host.preview.calls().is_empty());
}

#[tokio::test]
async fn search_without_credentials_shows_placeholders() {
    let host = Host::new();
    let music = host.start().await;

    let results = music.search("  lofi  ").await.unwrap();
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.source() == MediaSource::Spotify));

    let snapshot = music.snapshot().await.unwrap();
    assert_eq!(snapshot.results, results);
    assert_eq!(snapshot.last_query.as_deref(), Some("lofi"));

    music.set_mode(MediaSource::YouTube).await.unwrap();
    let snapshot = music.snapshot().await.unwrap();
    assert_eq!(snapshot.mode, MediaSource::YouTube);
    assert!(snapshot.results.is_empty());
    assert_eq!(snapshot.last_query, None);
}

#[tokio::test]
async fn empty_search_sends_no_request() {
    let host = Host::new();
    let music = host.start().await;

    assert!(music.search("   ").await.unwrap().is_empty());
    assert_eq!(music.snapshot().await.unwrap().last_query, None);
}

#[tokio::test]
async fn youtube_search_uses_remote_results() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .withf(|request| request.url.contains("q=lofi") && request.url.contains("key=yt-key"))
        .times(1)
        .returning(|_| {
            Ok(HttpResponse {
                status: 200,
                headers: HashMap::new(),
                body: Bytes::from_static(
                    br#"{"items":[{"id":{"videoId":"abc123"},"snippet":{"title":"Lofi beats","channelTitle":"Girl"}}]}"#,
                ),
            })
        });

    let host = Host::new();
    let config = CoreConfig::builder().youtube_api_key("yt-key").build().unwrap();
    let music = host.start_with(config, http).await;

    music.set_mode(MediaSource::YouTube).await.unwrap();
    let results = music.search("lofi").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].video_id(), Some("abc123"));

    // Videos play through the embedded page.
    music.play(results[0].clone()).await.unwrap();
    assert_eq!(host.web.loaded_pages().len(), 1);
    assert!(host.preview.calls().is_empty());
}

#[tokio::test]
async fn transport_error_falls_back() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Err(BridgeError::OperationFailed("offline".to_string())));

    let host = Host::new();
    let config = CoreConfig::builder()
        .spotify_access_token("sp-token")
        .build()
        .unwrap();
    let music = host.start_with(config, http).await;

    let results = music.search("jazz").await.unwrap();
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.title().starts_with("jazz - ")));
}

#[tokio::test]
async fn web_search_opens_browser_per_mode() {
    let host = Host::new();
    let music = host.start().await;
    let mut events = music.subscribe();

    let request = music.open_web_search("daft punk").await.unwrap().unwrap();
    assert_eq!(request.url, "https://open.spotify.com/search/daft%20punk");
    assert_eq!(request.policy.mode(), NavigationMode::LockedToInitial);
    assert_eq!(
        request.policy.decide("https://open.spotify.com/album/1"),
        NavigationDecision::Cancel
    );
    assert_eq!(
        request.policy.decide("spotify:album:1"),
        NavigationDecision::Cancel
    );
    assert_eq!(
        drain(&mut events),
        vec![CoreEvent::Browser(BrowserEvent::Requested {
            url: request.url.clone(),
            mode: NavigationMode::LockedToInitial,
        })]
    );

    music.set_mode(MediaSource::YouTube).await.unwrap();
    let request = music.open_web_search("lofi").await.unwrap().unwrap();
    assert_eq!(request.policy.mode(), NavigationMode::Free);
    assert_eq!(
        request.policy.decide("https://www.youtube.com/watch?v=abc"),
        NavigationDecision::Allow
    );

    assert!(music.open_web_search("  ").await.unwrap().is_none());
}

#[tokio::test]
async fn missing_sensor_keeps_speaker_route() {
    let mut host = Host::new();
    host.sensor = Arc::new(FakeProximitySensor::unsupported());
    let music = host.start().await;

    let snapshot = music.snapshot().await.unwrap();
    assert!(!snapshot.proximity_monitoring);
    assert_eq!(snapshot.route, AudioRoute::Speaker);
    assert!(!host.sensor.emit(true));
}

#[tokio::test]
async fn shutdown_releases_host_resources() {
    let host = Host::new();
    let music = host.start().await;
    music.play(track("a")).await.unwrap();
    host.sensor.emit(true);
    assert_eq!(music.snapshot().await.unwrap().playback, PlaybackState::Playing);

    music.shutdown().await.unwrap();

    assert!(!host.sensor.is_enabled());
    assert!(!host.web.has_load_handler());
    assert!(!host.preview.has_completion_handler());
    assert_eq!(host.preview.calls().last(), Some(&PreviewCall::Pause));

    assert!(matches!(
        music.snapshot().await,
        Err(CoreError::ServiceStopped)
    ));
    assert!(matches!(
        music.play(track("b")).await,
        Err(CoreError::ServiceStopped)
    ));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let host = Host::new();
    let mut config = CoreConfig::default();
    config.event_buffer_size = 0;

    let result = MusicService::start(config, host.deps(offline())).await;
    assert!(matches!(result, Err(CoreError::Config(_))));
}
