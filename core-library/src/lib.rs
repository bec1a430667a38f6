//! # Library Module
//!
//! Track and video records, the user's playlist, and its persistence.
//!
//! ## Overview
//!
//! This module manages:
//! - `MediaRecord` values produced by search and copied into the playlist
//! - The ordered, id-unique `Playlist` with next/previous navigation
//! - `PlaylistStore`, whole-list JSON persistence over the host `SettingsStore`

pub mod error;
pub mod models;
pub mod playlist;
pub mod store;

pub use error::{LibraryError, Result};
pub use models::{is_valid_video_id, MediaRecord, MediaRef, MediaSource};
pub use playlist::Playlist;
pub use store::PlaylistStore;
