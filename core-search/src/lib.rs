//! # Search Module
//!
//! Remote catalogue search with graceful degradation.
//!
//! ## Overview
//!
//! This module provides:
//! - `SearchProvider` implementations for the YouTube Data API and the Spotify
//!   Web API, both issued through the host `HttpClient`
//! - `SearchClient`, which never fails: transport, status and decode errors
//!   are replaced by a fixed set of placeholder records labelled with the query
//! - Web search URL templates for the in-app browser

pub mod client;
pub mod error;
pub mod fallback;
pub mod providers;
pub mod types;
pub mod urls;

pub use client::SearchClient;
pub use error::{Result, SearchError};
pub use fallback::{placeholder_results, FALLBACK_RESULT_COUNT};
pub use providers::{SearchProvider, SpotifyProvider, YouTubeProvider};
pub use urls::web_search_url;
