//! # Media Backend Abstraction
//!
//! "Whatever is currently producing audio." Each backend wraps one host
//! surface and accepts the media references it knows how to play.
//!
//! Host surfaces report asynchronously (page finished loading, clip reached
//! its end). Backends turn those callbacks into [`BackendSignal`]s on a
//! channel owned by the driving task, which hands each signal back to the
//! backend that sent it via [`MediaBackend::handle_signal`]. Every signal
//! carries the load generation it was raised for, so a signal belonging to a
//! superseded load is recognised and dropped.

use async_trait::async_trait;
use core_library::MediaRef;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Backend variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Hidden web view running the third-party embeddable player.
    EmbeddedWeb,
    /// Host audio-file player for preview clips.
    LocalPreview,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::EmbeddedWeb => "embedded_web",
            BackendKind::LocalPreview => "local_preview",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a host surface reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// The web view finished loading the player page.
    PageLoaded,
    /// The loaded media played to its end.
    Finished,
}

/// A host notification, tagged with the backend and load generation it
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendSignal {
    pub backend: BackendKind,
    pub generation: u64,
    pub kind: SignalKind,
}

/// Result of handing a signal back to its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The signal belongs to a superseded load.
    Stale,
    /// The backend absorbed the signal.
    Handled,
    /// The current item finished; the caller should advance.
    Finished,
}

/// Load/play/pause over one host surface.
///
/// Commands are best-effort: `Ok(())` means the host accepted the command,
/// not that audio is audible. There is no way to observe whether embedded
/// content acted on a command.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Whether this backend can play `media`.
    fn supports(&self, media: &MediaRef) -> bool;

    /// Load `media`, replacing whatever is loaded. Starts a new generation;
    /// signals from earlier generations become stale.
    async fn load(&self, media: &MediaRef) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// React to a signal previously raised by this backend.
    async fn handle_signal(&self, signal: BackendSignal) -> SignalOutcome;

    /// Unregister host callbacks. No signals are raised afterwards.
    fn release(&self) {}
}
