//! Search API response types
//!
//! Only the fields the records are built from are modelled; everything else
//! in the responses is ignored.

use serde::Deserialize;

// =============================================================================
// YouTube Data API v3
// =============================================================================

/// `search.list` response
///
/// See: https://developers.google.com/youtube/v3/docs/search/list
#[derive(Debug, Deserialize)]
pub struct YouTubeSearchResponse {
    #[serde(default)]
    pub items: Vec<YouTubeSearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct YouTubeSearchItem {
    pub id: YouTubeItemId,
    pub snippet: YouTubeSnippet,
}

/// Channel and playlist hits carry no `videoId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeItemId {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSnippet {
    pub title: String,
    #[serde(default)]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub thumbnails: Option<YouTubeThumbnails>,
}

#[derive(Debug, Deserialize)]
pub struct YouTubeThumbnails {
    #[serde(default)]
    pub high: Option<YouTubeThumbnail>,
    #[serde(default)]
    pub medium: Option<YouTubeThumbnail>,
    #[serde(default, rename = "default")]
    pub fallback: Option<YouTubeThumbnail>,
}

impl YouTubeThumbnails {
    /// Largest available thumbnail: high, then medium, then default.
    pub fn best_url(&self) -> Option<&str> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.fallback.as_ref())
            .map(|thumbnail| thumbnail.url.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct YouTubeThumbnail {
    pub url: String,
}

// =============================================================================
// Spotify Web API
// =============================================================================

/// `GET /v1/search?type=track` response
///
/// See: https://developer.spotify.com/documentation/web-api/reference/search
#[derive(Debug, Deserialize)]
pub struct SpotifySearchResponse {
    pub tracks: SpotifyTrackPage,
}

#[derive(Debug, Deserialize)]
pub struct SpotifyTrackPage {
    #[serde(default)]
    pub items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    /// Null for tracks without a preview clip
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub album: Option<SpotifyAlbum>,
}

impl SpotifyTrack {
    /// Artist names joined with ", ", or `None` when there are none.
    pub fn artist_names(&self) -> Option<String> {
        if self.artists.is_empty() {
            return None;
        }
        Some(
            self.artists
                .iter()
                .map(|artist| artist.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}
