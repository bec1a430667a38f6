//! YouTube Data API v3 search

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest, RetryPolicy};
use core_library::{is_valid_video_id, MediaRecord, MediaSource};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{ensure_success, SearchProvider};
use crate::error::{Result, SearchError};
use crate::types::{YouTubeSearchItem, YouTubeSearchResponse};

/// YouTube Data API base URL
const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Video search over `search.list`, authenticated with an API key.
pub struct YouTubeProvider {
    http_client: Arc<dyn HttpClient>,
    api_key: Option<String>,
}

impl YouTubeProvider {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        Self {
            http_client,
            api_key,
        }
    }

    fn search_url(query: &str, limit: u32, api_key: &str) -> String {
        format!(
            "{}/search?part=snippet&type=video&maxResults={}&q={}&key={}",
            YOUTUBE_API_BASE,
            limit,
            urlencoding::encode(query),
            urlencoding::encode(api_key)
        )
    }

    /// Convert an API item to a record. Non-video hits are skipped.
    fn convert_item(item: YouTubeSearchItem) -> Option<MediaRecord> {
        let video_id = item.id.video_id?;
        if !is_valid_video_id(&video_id) {
            warn!(video_id = %video_id, "Skipping search hit with malformed video id");
            return None;
        }

        let mut record = MediaRecord::video(video_id, item.snippet.title);
        if let Some(channel) = item.snippet.channel_title {
            record = record.with_subtitle(channel);
        }
        if let Some(url) = item
            .snippet
            .thumbnails
            .as_ref()
            .and_then(|thumbnails| thumbnails.best_url())
        {
            record = record.with_thumbnail(url);
        }
        Some(record)
    }
}

#[async_trait]
impl SearchProvider for YouTubeProvider {
    fn source(&self) -> MediaSource {
        MediaSource::YouTube
    }

    #[instrument(skip(self), fields(source = "youtube"))]
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<MediaRecord>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SearchError::MissingCredentials("YouTube API key".to_string()))?;

        let request = HttpRequest::get(Self::search_url(query, limit, api_key))
            .header("Accept", "application/json");

        // Single attempt, no timeout beyond the transport default.
        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::none())
            .await?;
        ensure_success(&response)?;

        let parsed: YouTubeSearchResponse = serde_json::from_slice(&response.body)?;
        let records: Vec<MediaRecord> = parsed
            .items
            .into_iter()
            .filter_map(Self::convert_item)
            .collect();

        debug!(count = records.len(), "YouTube search returned");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::{response, MockHttpClient, MockRetryingHttpClient};
    use bridge_traits::error::BridgeError;
    use core_library::MediaRef;

    const BODY: &str = r#"{
        "items": [
            {
                "id": {"videoId": "vid1"},
                "snippet": {
                    "title": "First",
                    "channelTitle": "Chan",
                    "thumbnails": {
                        "default": {"url": "https://i.ytimg.com/vi/vid1/default.jpg"},
                        "high": {"url": "https://i.ytimg.com/vi/vid1/hqdefault.jpg"}
                    }
                }
            },
            {"id": {"channelId": "UC1"}, "snippet": {"title": "Channel hit"}},
            {"id": {"videoId": "vid2"}, "snippet": {"title": "Second"}}
        ]
    }"#;

    #[tokio::test]
    async fn test_search_builds_request_and_parses() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                request.url.starts_with("https://www.googleapis.com/youtube/v3/search?")
                    && request.url.contains("part=snippet")
                    && request.url.contains("type=video")
                    && request.url.contains("maxResults=5")
                    && request.url.contains("q=lo%20fi")
                    && request.url.contains("key=yt-key")
            })
            .times(1)
            .returning(|_| Ok(response(200, BODY)));

        let provider = YouTubeProvider::new(Arc::new(http), Some("yt-key".to_string()));
        let records = provider.search("lo fi", 5).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), "vid1");
        assert_eq!(records[0].subtitle(), Some("Chan"));
        assert_eq!(
            records[0].thumbnail_url().as_deref(),
            Some("https://i.ytimg.com/vi/vid1/hqdefault.jpg")
        );
        assert_eq!(
            records[1].media(),
            &MediaRef::Video {
                video_id: "vid2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let mut http = MockHttpClient::new();
        http.expect_execute().times(0);

        let provider = YouTubeProvider::new(Arc::new(http), None);
        let result = provider.search("query", 10).await;
        assert!(matches!(result, Err(SearchError::MissingCredentials(_))));
    }

    #[tokio::test]
    async fn test_error_status() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Ok(response(403, r#"{"error":{"message":"quotaExceeded"}}"#)));

        let provider = YouTubeProvider::new(Arc::new(http), Some("k".to_string()));
        let result = provider.search("query", 10).await;
        assert!(matches!(
            result,
            Err(SearchError::ApiError {
                status_code: 403,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_transport_and_decode_failures() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("offline".to_string())));
        let provider = YouTubeProvider::new(Arc::new(http), Some("k".to_string()));
        assert!(matches!(
            provider.search("query", 10).await,
            Err(SearchError::BridgeError(_))
        ));

        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Ok(response(200, "<html>not json</html>")));
        let provider = YouTubeProvider::new(Arc::new(http), Some("k".to_string()));
        assert!(matches!(
            provider.search("query", 10).await,
            Err(SearchError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_single_attempt_without_timeout() {
        let mut http = MockRetryingHttpClient::new();
        http.expect_execute().times(0);
        http.expect_execute_with_retry()
            .withf(|request, policy| policy.max_attempts == 1 && request.timeout.is_none())
            .times(1)
            .returning(|_, _| Ok(response(200, r#"{"items":[]}"#)));

        let provider = YouTubeProvider::new(Arc::new(http), Some("k".to_string()));
        assert!(provider.search("query", 10).await.unwrap().is_empty());
    }
}
