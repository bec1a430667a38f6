//! # Playback & Routing Module
//!
//! Drives media playback and keeps the audio output route consistent with the
//! proximity sensor.
//!
//! ## Overview
//!
//! This module handles:
//! - `ProximitySignal`: latest-value near/far stream from the host sensor
//! - `MediaBackend`: load/play/pause over either a hidden web view hosting the
//!   embeddable video player (`EmbeddedWebPlayer`) or the host's audio-file
//!   player for preview clips (`LocalPreviewPlayer`)
//! - `AudioRouteController`: the state machine that reconfigures the audio
//!   session on proximity transitions and starts playback when the phone is
//!   raised to the ear
//!
//! ## Threading
//!
//! The controller is not shared. It is driven by one task that processes
//! proximity readings, backend signals and user commands one at a time. Host
//! callbacks never touch controller state directly; they only forward values
//! into channels that the driving task drains.

pub mod backend;
pub mod controller;
pub mod embedded;
pub mod error;
pub mod preview;
pub mod proximity;

pub use backend::{BackendKind, BackendSignal, MediaBackend, SignalKind, SignalOutcome};
pub use controller::{AudioRouteController, RouteSnapshot};
pub use embedded::{EmbeddedWebPlayer, PLAYER_BASE_URL};
pub use error::{PlaybackError, Result};
pub use preview::LocalPreviewPlayer;
pub use proximity::ProximitySignal;
