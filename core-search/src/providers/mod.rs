//! Remote search providers

mod spotify;
mod youtube;

pub use spotify::SpotifyProvider;
pub use youtube::YouTubeProvider;

use async_trait::async_trait;
use bridge_traits::http::HttpResponse;
use core_library::{MediaRecord, MediaSource};

use crate::error::{Result, SearchError};

/// A remote catalogue that turns a query into records.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Catalogue this provider searches.
    fn source(&self) -> MediaSource;

    /// Search for `query`, returning at most `limit` records.
    ///
    /// # Errors
    ///
    /// Missing credentials, transport failures, non-2xx responses and
    /// undecodable bodies are all errors.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<MediaRecord>>;
}

/// Map a non-2xx response to `ApiError`.
pub(crate) fn ensure_success(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }

    let body = String::from_utf8_lossy(&response.body);
    Err(SearchError::ApiError {
        status_code: response.status,
        message: body.chars().take(200).collect(),
    })
}
