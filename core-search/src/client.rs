//! Search client with placeholder fallback

use bridge_traits::http::HttpClient;
use core_library::{MediaRecord, MediaSource};
use core_runtime::config::SearchConfig;
use core_runtime::events::{CoreEvent, EventBus, SearchEvent};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::fallback::placeholder_results;
use crate::providers::{SearchProvider, SpotifyProvider, YouTubeProvider};

/// Runs searches against one provider and never fails.
///
/// Any provider error is logged, announced as [`SearchEvent::FellBack`], and
/// replaced by [`placeholder_results`].
pub struct SearchClient {
    provider: Arc<dyn SearchProvider>,
    max_results: u32,
    event_bus: EventBus,
}

impl SearchClient {
    pub fn new(provider: Arc<dyn SearchProvider>, max_results: u32, event_bus: EventBus) -> Self {
        Self {
            provider,
            max_results,
            event_bus,
        }
    }

    /// Client for `source` using the credentials in `config`.
    pub fn for_source(
        source: MediaSource,
        http_client: Arc<dyn HttpClient>,
        config: &SearchConfig,
        event_bus: EventBus,
    ) -> Self {
        let provider: Arc<dyn SearchProvider> = match source {
            MediaSource::YouTube => Arc::new(YouTubeProvider::new(
                http_client,
                config.youtube_api_key.clone(),
            )),
            MediaSource::Spotify => Arc::new(SpotifyProvider::new(
                http_client,
                config.spotify_access_token.clone(),
            )),
        };
        Self::new(provider, config.max_results, event_bus)
    }

    pub fn source(&self) -> MediaSource {
        self.provider.source()
    }

    /// Search for `query`.
    ///
    /// An empty or whitespace-only query returns no records and issues no
    /// request.
    #[instrument(skip(self), fields(source = %self.provider.source()))]
    pub async fn search(&self, query: &str) -> Vec<MediaRecord> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let source = self.provider.source();
        let records = match self.provider.search(query, self.max_results).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Search failed; using placeholder results");
                let _ = self.event_bus.emit(CoreEvent::Search(SearchEvent::FellBack {
                    source: source.as_str().to_string(),
                    query: query.to_string(),
                    reason: e.to_string(),
                }));
                placeholder_results(source, query)
            }
        };

        info!(result_count = records.len(), "Search completed");
        let _ = self.event_bus.emit(CoreEvent::Search(SearchEvent::Completed {
            source: source.as_str().to_string(),
            query: query.to_string(),
            result_count: records.len(),
        }));

        records
    }
}
