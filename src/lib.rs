//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `core-service`, `core-playback`, `core-search`).
//! Host applications can depend on `nearplay-workspace` and enable the
//! documented features without needing to wire each crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service as service;

#[cfg(feature = "playback-only")]
pub use core_playback as playback;

#[cfg(feature = "search-only")]
pub use core_search as search;
