//! Local preview clip backend

use async_trait::async_trait;
use bridge_traits::playback::{CompletionHandler, PreviewAudioPlayer};
use core_library::MediaRef;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::backend::{BackendKind, BackendSignal, MediaBackend, SignalKind, SignalOutcome};
use crate::error::{PlaybackError, Result};

/// Plays preview clips through the host audio-file player.
///
/// Loading replaces the current clip. Clip completion is raised as a
/// [`SignalKind::Finished`] signal for the generation that was playing.
///
/// The host reports which URL finished. A completion for any other URL than
/// the one currently loaded is dropped in the callback, and one queued before
/// a newer load is caught by the generation check in `handle_signal`.
pub struct LocalPreviewPlayer {
    player: Arc<dyn PreviewAudioPlayer>,
    loaded: Arc<Mutex<LoadedClip>>,
}

#[derive(Debug, Default)]
struct LoadedClip {
    generation: u64,
    url: Option<String>,
}

impl LocalPreviewPlayer {
    pub fn new(
        player: Arc<dyn PreviewAudioPlayer>,
        signals: mpsc::UnboundedSender<BackendSignal>,
    ) -> Self {
        let loaded = Arc::new(Mutex::new(LoadedClip::default()));

        let handler_loaded = Arc::clone(&loaded);
        let handler: CompletionHandler = Arc::new(move |finished: &str| {
            let generation = {
                let loaded = handler_loaded.lock();
                if loaded.url.as_deref() != Some(finished) {
                    debug!(url = %finished, "Completion for a clip no longer loaded");
                    return;
                }
                loaded.generation
            };
            let _ = signals.send(BackendSignal {
                backend: BackendKind::LocalPreview,
                generation,
                kind: SignalKind::Finished,
            });
        });
        player.set_completion_handler(Some(handler));

        Self { player, loaded }
    }

    pub fn generation(&self) -> u64 {
        self.loaded.lock().generation
    }
}

#[async_trait]
impl MediaBackend for LocalPreviewPlayer {
    fn kind(&self) -> BackendKind {
        BackendKind::LocalPreview
    }

    /// Tracks without a preview clip cannot be played here.
    fn supports(&self, media: &MediaRef) -> bool {
        matches!(
            media,
            MediaRef::PreviewClip {
                preview_url: Some(_),
                ..
            }
        )
    }

    async fn load(&self, media: &MediaRef) -> Result<()> {
        let url = match media {
            MediaRef::PreviewClip {
                preview_url: Some(url),
                ..
            } => url,
            other => {
                return Err(PlaybackError::UnsupportedMedia(format!(
                    "no preview clip in {:?}",
                    other
                )))
            }
        };

        let generation = {
            let mut loaded = self.loaded.lock();
            loaded.generation += 1;
            loaded.url = Some(url.clone());
            loaded.generation
        };
        self.player.load(url).await?;
        debug!(generation, "Loaded preview clip");
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.player.play().await?;
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.player.pause().await?;
        Ok(())
    }

    async fn handle_signal(&self, signal: BackendSignal) -> SignalOutcome {
        if signal.generation != self.generation() {
            return SignalOutcome::Stale;
        }
        match signal.kind {
            SignalKind::Finished => SignalOutcome::Finished,
            SignalKind::PageLoaded => SignalOutcome::Handled,
        }
    }

    fn release(&self) {
        self.player.set_completion_handler(None);
    }
}
