//! Web search URLs opened in the in-app browser

use core_library::MediaSource;

const YOUTUBE_RESULTS_URL: &str = "https://www.youtube.com/results?search_query=";
const SPOTIFY_SEARCH_URL: &str = "https://open.spotify.com/search/";

/// Percent-encode `query` into the source's web search page URL.
///
/// Returns `None` for an empty or whitespace-only query.
pub fn web_search_url(source: MediaSource, query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let encoded = urlencoding::encode(query);
    let url = match source {
        MediaSource::YouTube => format!("{}{}", YOUTUBE_RESULTS_URL, encoded),
        MediaSource::Spotify => format!("{}{}", SPOTIFY_SEARCH_URL, encoded),
    };
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates() {
        assert_eq!(
            web_search_url(MediaSource::YouTube, "lo fi").as_deref(),
            Some("https://www.youtube.com/results?search_query=lo%20fi")
        );
        assert_eq!(
            web_search_url(MediaSource::Spotify, "AC/DC & friends").as_deref(),
            Some("https://open.spotify.com/search/AC%2FDC%20%26%20friends")
        );
    }

    #[test]
    fn test_non_ascii_is_encoded() {
        assert_eq!(
            web_search_url(MediaSource::YouTube, "音楽").as_deref(),
            Some("https://www.youtube.com/results?search_query=%E9%9F%B3%E6%A5%BD")
        );
    }

    #[test]
    fn test_empty_query() {
        assert!(web_search_url(MediaSource::Spotify, "").is_none());
        assert!(web_search_url(MediaSource::YouTube, "   ").is_none());
    }
}
