//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `SettingsStore` using a SQLite-backed key-value table
//! - `ProximitySensor` reporting no sensor
//! - `AudioSession` with speaker output only
//!
//! Desktop hosts supply their own web view and audio player surfaces.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http_client = ReqwestHttpClient::new();
//!     let settings = SqliteSettingsStore::new("data/settings.db".into()).await?;
//!
//!     // Use in core dependencies
//!     Ok(())
//! }
//! ```

mod audio_session;
mod http;
mod sensor;
mod settings;

pub use audio_session::DesktopAudioSession;
pub use http::ReqwestHttpClient;
pub use sensor::DesktopProximitySensor;
pub use settings::SqliteSettingsStore;
