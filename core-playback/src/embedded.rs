//! Embedded web player backend
//!
//! Drives the third-party embeddable video player inside a hidden
//! [`WebContentView`]. Commands are script evaluations with no delivery
//! guarantee, and the player's readiness cannot be observed synchronously:
//! the page load only means the HTML is in, the iframe player is built after
//! that. The first play command of each page is therefore re-sent twice on a
//! short fixed schedule, whether it was pending at load or issued later.

use async_trait::async_trait;
use bridge_traits::web::{LoadHandler, WebContentView};
use core_library::{is_valid_video_id, MediaRef};
use core_runtime::config::PlaybackPolicy;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use crate::backend::{BackendKind, BackendSignal, MediaBackend, SignalKind, SignalOutcome};
use crate::error::{PlaybackError, Result};

/// Base URL the player page is loaded against.
pub const PLAYER_BASE_URL: &str = "https://www.youtube.com";

const PLAY_SCRIPT: &str = "playVideo();";
const PAUSE_SCRIPT: &str = "pauseVideo();";
/// Guarded form used for re-sends, which may land before the player exists.
const RESEND_PLAY_SCRIPT: &str = "if(window.playVideo) { playVideo(); }";

#[derive(Debug, Default)]
struct PlayerState {
    generation: u64,
    page_ready: bool,
    play_requested: bool,
    resend_scheduled: bool,
}

pub struct EmbeddedWebPlayer {
    view: Arc<dyn WebContentView>,
    state: Arc<Mutex<PlayerState>>,
    first_resend: Duration,
    second_resend: Duration,
}

impl EmbeddedWebPlayer {
    /// Create the player and register the page-load callback, which forwards
    /// into `signals`.
    pub fn new(
        view: Arc<dyn WebContentView>,
        policy: &PlaybackPolicy,
        signals: mpsc::UnboundedSender<BackendSignal>,
    ) -> Self {
        let state = Arc::new(Mutex::new(PlayerState::default()));

        let handler_state = Arc::clone(&state);
        let handler: LoadHandler = Arc::new(move || {
            let generation = handler_state.lock().generation;
            let _ = signals.send(BackendSignal {
                backend: BackendKind::EmbeddedWeb,
                generation,
                kind: SignalKind::PageLoaded,
            });
        });
        view.set_load_handler(Some(handler));

        Self {
            view,
            state,
            first_resend: policy.embedded_first_resend(),
            second_resend: policy.embedded_second_resend(),
        }
    }

    /// Current load generation.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    fn schedule_resend(&self, generation: u64) {
        let view = Arc::clone(&self.view);
        let state = Arc::clone(&self.state);
        let delays = [self.first_resend, self.second_resend];

        tokio::spawn(async move {
            for (attempt, delay) in delays.into_iter().enumerate() {
                tokio::time::sleep(delay).await;

                let wanted = {
                    let state = state.lock();
                    state.generation == generation && state.play_requested
                };
                if !wanted {
                    debug!(generation, "Play re-send cancelled");
                    return;
                }

                match view.evaluate_script(RESEND_PLAY_SCRIPT).await {
                    Ok(()) => debug!(generation, attempt = attempt + 1, "Re-sent play command"),
                    Err(e) => warn!(generation, attempt = attempt + 1, error = %e, "Play re-send failed"),
                }
            }
        });
    }
}

#[async_trait]
impl MediaBackend for EmbeddedWebPlayer {
    fn kind(&self) -> BackendKind {
        BackendKind::EmbeddedWeb
    }

    fn supports(&self, media: &MediaRef) -> bool {
        matches!(media, MediaRef::Video { .. })
    }

    #[instrument(skip(self, media))]
    async fn load(&self, media: &MediaRef) -> Result<()> {
        let video_id = match media {
            MediaRef::Video { video_id } => video_id,
            other => {
                return Err(PlaybackError::UnsupportedMedia(format!(
                    "embedded player cannot play {:?}",
                    other
                )))
            }
        };
        if !is_valid_video_id(video_id) {
            return Err(PlaybackError::InvalidMedia(video_id.clone()));
        }

        let generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.page_ready = false;
            state.play_requested = false;
            state.resend_scheduled = false;
            state.generation
        };

        self.view
            .load_html(&player_html(video_id), PLAYER_BASE_URL)
            .await?;
        debug!(video_id = %video_id, generation, "Loading player page");
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        let (ready, resend_for) = {
            let mut state = self.state.lock();
            state.play_requested = true;
            let resend_for = (state.page_ready && !state.resend_scheduled).then(|| {
                state.resend_scheduled = true;
                state.generation
            });
            (state.page_ready, resend_for)
        };

        if !ready {
            // Delivered by the re-send once the page has loaded.
            debug!("Play deferred until player page loads");
            return Ok(());
        }
        if let Some(generation) = resend_for {
            self.schedule_resend(generation);
        }
        self.view.evaluate_script(PLAY_SCRIPT).await?;
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let ready = {
            let mut state = self.state.lock();
            state.play_requested = false;
            state.page_ready
        };

        if ready {
            self.view.evaluate_script(PAUSE_SCRIPT).await?;
        }
        Ok(())
    }

    async fn handle_signal(&self, signal: BackendSignal) -> SignalOutcome {
        if signal.kind != SignalKind::PageLoaded {
            return SignalOutcome::Handled;
        }

        let play_requested = {
            let mut state = self.state.lock();
            if state.generation != signal.generation {
                return SignalOutcome::Stale;
            }
            state.page_ready = true;
            state.resend_scheduled |= state.play_requested;
            state.play_requested
        };

        debug!(generation = signal.generation, play_requested, "Player page loaded");
        if play_requested {
            self.schedule_resend(signal.generation);
        }
        SignalOutcome::Handled
    }

    fn release(&self) {
        self.view.set_load_handler(None);
    }
}

/// Player page for `video_id`. The id must already be validated.
fn player_html(video_id: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta name="viewport" content="width=device-width, initial-scale=1">
<style>
* {{ margin: 0; padding: 0; }}
html, body {{ width: 100%; height: 100%; background: #000; overflow: hidden; }}
#player {{ width: 100%; height: 100%; }}
</style>
</head>
<body>
<div id="player"></div>
<script>
var tag = document.createElement('script');
tag.src = "https://www.youtube.com/iframe_api";
var firstScriptTag = document.getElementsByTagName('script')[0];
firstScriptTag.parentNode.insertBefore(tag, firstScriptTag);

var player;
function onYouTubeIframeAPIReady() {{
    player = new YT.Player('player', {{
        height: '100%',
        width: '100%',
        videoId: '{video_id}',
        playerVars: {{ 'playsinline': 1, 'controls': 0, 'modestbranding': 1, 'rel': 0, 'autoplay': 0, 'mute': 0 }}
    }});
}}

function playVideo() {{
    try {{
        if (player && player.playVideo) {{
            player.unMute();
            player.setVolume(100);
            player.playVideo();
        }}
    }} catch (e) {{}}
}}

function pauseVideo() {{
    try {{
        if (player && player.pauseVideo) {{
            player.pauseVideo();
        }}
    }} catch (e) {{}}
}}
</script>
</body>
</html>"#,
        video_id = video_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_html_embeds_video() {
        let html = player_html("dQw4w9WgXcQ");
        assert!(html.contains("videoId: 'dQw4w9WgXcQ'"));
        assert!(html.contains("function playVideo()"));
        assert!(html.contains("function pauseVideo()"));
        assert!(html.contains("'playsinline': 1"));
        assert!(html.contains("https://www.youtube.com/iframe_api"));
    }
}
