//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the player core and platform-specific
//! implementations. Each trait represents a capability that the core requires but
//! that must be implemented differently per platform (desktop, iOS, Android).
//!
//! ## Traits
//!
//! ### Sensors & Audio
//! - [`ProximitySensor`](sensor::ProximitySensor) - Near/far readings from the ear sensor
//! - [`AudioSession`](audio_session::AudioSession) - Session category and output route
//!
//! ### Media Surfaces
//! - [`PreviewAudioPlayer`](playback::PreviewAudioPlayer) - Direct player for preview clips
//! - [`WebContentView`](web::WebContentView) - Hidden web view hosting the embedded video player
//!
//! ### Networking & Storage
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences storage
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Partial (no proximity sensor) |
//! | iOS      | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert platform-specific errors to `BridgeError` and
//! include enough context to act on.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds. Callbacks handed to the host
//! (`ProximityHandler`, `LoadHandler`, `CompletionHandler`) may be invoked from
//! any thread.
//!
//! ## Testing
//!
//! The `test-fakes` feature exposes recording fakes for every port in
//! [`fakes`].

pub mod audio_session;
pub mod error;
#[cfg(feature = "test-fakes")]
pub mod fakes;
pub mod http;
pub mod logging;
pub mod playback;
pub mod sensor;
pub mod storage;
pub mod web;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio_session::{AudioRoute, AudioSession, SessionCategory, SessionProfile};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{CompletionHandler, PlaybackState, PreviewAudioPlayer};
pub use sensor::{ProximityHandler, ProximitySensor, ProximityState};
pub use storage::SettingsStore;
pub use web::{LoadHandler, NavigationMode, WebContentView};
