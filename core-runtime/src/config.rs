//! # Core Configuration Module
//!
//! Provides configuration for the player core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding search credentials, playback policy, browser navigation policy and
//! storage settings. `build()` validates everything up front so a bad value
//! fails at startup rather than at first use.
//!
//! Platform capabilities (sensor, audio session, web view, player, storage)
//! are not part of the configuration; they are injected separately through
//! `core_service::CoreDependencies`.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .youtube_api_key(std::env::var("YOUTUBE_API_KEY")?)
//!     .max_results(15)
//!     .play_on_select(true)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Providers accept at most 50 results per page
//! let config = CoreConfig::builder()
//!     .max_results(500)
//!     .build()
//!     .expect("Should fail - max_results out of range");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{NavigationMode, SessionProfile};
use std::fmt;
use std::time::Duration;

/// Default storage key for the persisted playlist.
pub const DEFAULT_PLAYLIST_KEY: &str = "saved_playlist";

/// Default capacity of the event bus.
pub const DEFAULT_EVENT_BUFFER: usize = 100;

/// Core configuration for the player core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    /// Remote search settings
    pub search: SearchConfig,

    /// When playback starts on its own
    pub playback: PlaybackPolicy,

    /// In-app browser navigation rules
    pub browser: BrowserConfig,

    /// Settings key the playlist is stored under
    pub playlist_storage_key: String,

    /// Event bus capacity
    pub event_buffer_size: usize,

    /// Audio session profile requested at startup
    pub session: SessionProfile,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            playback: PlaybackPolicy::default(),
            browser: BrowserConfig::default(),
            playlist_storage_key: DEFAULT_PLAYLIST_KEY.to_string(),
            event_buffer_size: DEFAULT_EVENT_BUFFER,
            session: SessionProfile::default(),
        }
    }
}

/// Credentials and limits for the remote search providers.
///
/// # Security Note
///
/// Keys should be loaded from the environment or the host's secure
/// configuration, never compiled into the binary. `Debug` output redacts them.
#[derive(Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// YouTube Data API v3 key. Without it YouTube searches use fallback results.
    pub youtube_api_key: Option<String>,

    /// Pre-obtained Spotify Web API bearer token. Without it Spotify searches
    /// use fallback results.
    pub spotify_access_token: Option<String>,

    /// Results requested per search (1..=50)
    pub max_results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            spotify_access_token: None,
            max_results: 10,
        }
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "spotify_access_token",
                &self.spotify_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl SearchConfig {
    pub fn has_youtube(&self) -> bool {
        self.youtube_api_key.is_some()
    }

    pub fn has_spotify(&self) -> bool {
        self.spotify_access_token.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=50).contains(&self.max_results) {
            return Err(Error::Config(format!(
                "max_results must be between 1 and 50, got {}",
                self.max_results
            )));
        }

        if matches!(self.youtube_api_key.as_deref(), Some(key) if key.trim().is_empty()) {
            return Err(Error::Config(
                "YouTube API key cannot be empty when provided".to_string(),
            ));
        }

        if matches!(self.spotify_access_token.as_deref(), Some(token) if token.trim().is_empty())
        {
            return Err(Error::Config(
                "Spotify access token cannot be empty when provided".to_string(),
            ));
        }

        Ok(())
    }
}

/// Playback policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackPolicy {
    /// Start playback immediately when the user selects a record, regardless
    /// of proximity. When false, a selection only auto-plays while near.
    pub play_on_select: bool,

    /// Delay after the embedded page loads before the first play re-send
    pub embedded_first_resend_ms: u64,

    /// Delay after the first re-send before the confirmation re-send
    pub embedded_second_resend_ms: u64,
}

impl Default for PlaybackPolicy {
    fn default() -> Self {
        Self {
            play_on_select: false,
            embedded_first_resend_ms: 250,
            embedded_second_resend_ms: 350,
        }
    }
}

impl PlaybackPolicy {
    pub fn embedded_first_resend(&self) -> Duration {
        Duration::from_millis(self.embedded_first_resend_ms)
    }

    pub fn embedded_second_resend(&self) -> Duration {
        Duration::from_millis(self.embedded_second_resend_ms)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("embedded_first_resend_ms", self.embedded_first_resend_ms),
            ("embedded_second_resend_ms", self.embedded_second_resend_ms),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{} must be greater than 0ms", name)));
            }
            if value > 5_000 {
                return Err(Error::Config(format!(
                    "{} exceeds maximum of 5 seconds (5,000ms)",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Navigation rules applied to the in-app browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Mode used for Spotify web searches
    pub spotify_mode: NavigationMode,

    /// Mode used for YouTube web searches
    pub youtube_mode: NavigationMode,

    /// Custom URL schemes that must never be followed (lowercase, no colon)
    pub blocked_schemes: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            spotify_mode: NavigationMode::LockedToInitial,
            youtube_mode: NavigationMode::Free,
            blocked_schemes: vec![
                "spotify".to_string(),
                "youtube".to_string(),
                "music".to_string(),
            ],
        }
    }
}

impl BrowserConfig {
    pub fn is_blocked_scheme(&self, scheme: &str) -> bool {
        self.blocked_schemes
            .iter()
            .any(|blocked| blocked.eq_ignore_ascii_case(scheme))
    }

    pub fn validate(&self) -> Result<()> {
        for scheme in &self.blocked_schemes {
            let valid = !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            if !valid {
                return Err(Error::Config(format!(
                    "Invalid blocked URL scheme '{}': use the bare scheme name, e.g. 'spotify'",
                    scheme
                )));
            }
            if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") {
                return Err(Error::Config(format!(
                    "Blocking '{}' would make the browser unusable",
                    scheme
                )));
            }
        }
        Ok(())
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.playback.validate()?;
        self.browser.validate()?;

        if self.playlist_storage_key.trim().is_empty() {
            return Err(Error::Config(
                "Playlist storage key cannot be empty".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > 10_000 {
            return Err(Error::Config(
                "Event buffer size exceeds maximum of 10,000".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Unset options keep their defaults. [`build()`](CoreConfigBuilder::build)
/// validates the result.
#[derive(Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Sets the YouTube Data API key.
    pub fn youtube_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.search.youtube_api_key = Some(key.into());
        self
    }

    /// Sets the Spotify bearer token.
    pub fn spotify_access_token(mut self, token: impl Into<String>) -> Self {
        self.config.search.spotify_access_token = Some(token.into());
        self
    }

    /// Sets the number of results requested per search.
    ///
    /// Default: 10
    pub fn max_results(mut self, max_results: u32) -> Self {
        self.config.search.max_results = max_results;
        self
    }

    /// Start playback as soon as a record is selected.
    ///
    /// Default: false
    pub fn play_on_select(mut self, enabled: bool) -> Self {
        self.config.playback.play_on_select = enabled;
        self
    }

    /// Sets the two embedded-player play re-send delays.
    ///
    /// Default: 250ms, then 350ms
    pub fn embedded_resend_delays(mut self, first: Duration, second: Duration) -> Self {
        self.config.playback.embedded_first_resend_ms = first.as_millis() as u64;
        self.config.playback.embedded_second_resend_ms = second.as_millis() as u64;
        self
    }

    pub fn spotify_navigation(mut self, mode: NavigationMode) -> Self {
        self.config.browser.spotify_mode = mode;
        self
    }

    pub fn youtube_navigation(mut self, mode: NavigationMode) -> Self {
        self.config.browser.youtube_mode = mode;
        self
    }

    /// Adds a custom URL scheme the browser must refuse.
    pub fn block_scheme(mut self, scheme: impl Into<String>) -> Self {
        let scheme = scheme.into().to_ascii_lowercase();
        if !self.config.browser.blocked_schemes.contains(&scheme) {
            self.config.browser.blocked_schemes.push(scheme);
        }
        self
    }

    /// Sets the settings key the playlist is persisted under.
    ///
    /// Default: `"saved_playlist"`
    pub fn playlist_storage_key(mut self, key: impl Into<String>) -> Self {
        self.config.playlist_storage_key = key.into();
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.config.event_buffer_size = size;
        self
    }

    /// Sets the audio session profile requested at startup.
    pub fn session_profile(mut self, profile: SessionProfile) -> Self {
        self.config.session = profile;
        self
    }

    /// Builds the final configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when any value is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
