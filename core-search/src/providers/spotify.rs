//! Spotify Web API track search
//!
//! Requests carry a bearer token obtained outside the app; there is no
//! authorization flow here.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest, RetryPolicy};
use core_library::{MediaRecord, MediaSource};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{ensure_success, SearchProvider};
use crate::error::{Result, SearchError};
use crate::types::{SpotifySearchResponse, SpotifyTrack};

/// Spotify Web API base URL
const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

pub struct SpotifyProvider {
    http_client: Arc<dyn HttpClient>,
    access_token: Option<String>,
}

impl SpotifyProvider {
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: Option<String>) -> Self {
        Self {
            http_client,
            access_token,
        }
    }

    fn search_url(query: &str, limit: u32) -> String {
        format!(
            "{}/search?type=track&limit={}&q={}",
            SPOTIFY_API_BASE,
            limit,
            urlencoding::encode(query)
        )
    }

    fn convert_track(track: SpotifyTrack) -> MediaRecord {
        let artists = track.artist_names();
        let mut record = MediaRecord::track(track.id, track.name, track.preview_url, track.uri);

        if let Some(artists) = artists {
            record = record.with_subtitle(artists);
        }
        if let Some(album) = track.album {
            if let Some(image) = album.images.into_iter().next() {
                record = record.with_thumbnail(image.url);
            }
            record = record.with_album(album.name);
        }
        record
    }
}

#[async_trait]
impl SearchProvider for SpotifyProvider {
    fn source(&self) -> MediaSource {
        MediaSource::Spotify
    }

    #[instrument(skip(self), fields(source = "spotify"))]
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<MediaRecord>> {
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| SearchError::MissingCredentials("Spotify access token".to_string()))?;

        let request = HttpRequest::get(Self::search_url(query, limit))
            .header("Accept", "application/json")
            .bearer_token(token);

        // Single attempt, no timeout beyond the transport default.
        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::none())
            .await?;
        ensure_success(&response)?;

        let parsed: SpotifySearchResponse = serde_json::from_slice(&response.body)?;
        let records: Vec<MediaRecord> = parsed
            .tracks
            .items
            .into_iter()
            .map(Self::convert_track)
            .collect();

        debug!(count = records.len(), "Spotify search returned");
        Ok(records)
    }
}
