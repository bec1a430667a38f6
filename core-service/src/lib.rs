//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, settings,
//! proximity sensor, audio session, web view, preview player) into the shared
//! Rust core and runs it as a [`MusicService`]. Desktop apps typically enable
//! the `desktop-shims` feature (which depends on `bridge-desktop`) and only
//! supply the two UI surfaces themselves.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::{CoreDependencies, MusicService};
//!
//! let deps = CoreDependencies::desktop(data_dir, web_view, preview_player).await?;
//! let music = MusicService::start(CoreConfig::builder().build()?, deps).await?;
//!
//! let results = music.search("daft punk").await?;
//! music.play(results[0].clone()).await?;
//! ```

pub mod browser;
pub mod error;
pub mod service;

pub use browser::{BrowserRequest, NavigationDecision, NavigationPolicy};
pub use error::{CoreError, Result};
pub use service::{MusicHandle, MusicService, ServiceSnapshot};

use std::sync::Arc;

use bridge_traits::{
    AudioSession, HttpClient, PreviewAudioPlayer, ProximitySensor, SettingsStore, WebContentView,
};

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub settings_store: Arc<dyn SettingsStore>,
    pub proximity_sensor: Arc<dyn ProximitySensor>,
    pub audio_session: Arc<dyn AudioSession>,
    pub web_view: Arc<dyn WebContentView>,
    pub preview_player: Arc<dyn PreviewAudioPlayer>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        settings_store: Arc<dyn SettingsStore>,
        proximity_sensor: Arc<dyn ProximitySensor>,
        audio_session: Arc<dyn AudioSession>,
        web_view: Arc<dyn WebContentView>,
        preview_player: Arc<dyn PreviewAudioPlayer>,
    ) -> Self {
        Self {
            http_client,
            settings_store,
            proximity_sensor,
            audio_session,
            web_view,
            preview_player,
        }
    }

    /// Desktop bundle: reqwest HTTP, SQLite settings under `data_dir`, no
    /// proximity sensor and a speaker-only audio session.
    #[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
    pub async fn desktop(
        data_dir: std::path::PathBuf,
        web_view: Arc<dyn WebContentView>,
        preview_player: Arc<dyn PreviewAudioPlayer>,
    ) -> Result<Self> {
        use bridge_desktop::{
            DesktopAudioSession, DesktopProximitySensor, ReqwestHttpClient, SqliteSettingsStore,
        };

        let settings = SqliteSettingsStore::new(data_dir.join("settings.db"))
            .await
            .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;

        Ok(Self::new(
            Arc::new(ReqwestHttpClient::new()),
            Arc::new(settings),
            Arc::new(DesktopProximitySensor::new()),
            Arc::new(DesktopAudioSession::new()),
            web_view,
            preview_player,
        ))
    }
}
