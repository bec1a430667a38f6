//! Domain models for search results and the playlist
//!
//! A [`MediaRecord`] is an immutable value: it is produced by a search
//! provider (or the placeholder fallback), copied into the playlist, and never
//! mutated after construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LibraryError;

// =============================================================================
// Media Source
// =============================================================================

/// Catalogue a record comes from. Also the app mode the UI switches between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MediaSource {
    #[default]
    #[serde(rename = "spotify")]
    Spotify,
    #[serde(rename = "youtube")]
    YouTube,
}

impl MediaSource {
    pub const ALL: [MediaSource; 2] = [MediaSource::Spotify, MediaSource::YouTube];

    /// Stable lowercase identifier used in ids, events and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaSource::Spotify => "spotify",
            MediaSource::YouTube => "youtube",
        }
    }

    /// Display name.
    pub fn label(&self) -> &'static str {
        match self {
            MediaSource::Spotify => "Spotify",
            MediaSource::YouTube => "YouTube",
        }
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MediaSource {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spotify" => Ok(MediaSource::Spotify),
            "youtube" => Ok(MediaSource::YouTube),
            other => Err(LibraryError::InvalidInput {
                field: "source".to_string(),
                message: format!("unknown media source '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Media Reference
// =============================================================================

/// What a backend needs to actually produce audio for a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaRef {
    /// A streamable preview clip, optionally with the catalogue URI of the
    /// full track. Either may be missing from the catalogue response.
    PreviewClip {
        preview_url: Option<String>,
        uri: Option<String>,
    },
    /// A video hosted by the embeddable third-party player.
    Video { video_id: String },
}

/// Video ids are short URL-safe tokens; anything else would break out of the
/// player page it is embedded in.
pub fn is_valid_video_id(video_id: &str) -> bool {
    !video_id.is_empty()
        && video_id.len() <= 64
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// =============================================================================
// Media Record
// =============================================================================

/// A track or video search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    id: String,
    source: MediaSource,
    title: String,
    /// Artist(s) for tracks, channel for videos
    subtitle: Option<String>,
    album: Option<String>,
    thumbnail_url: Option<String>,
    media: MediaRef,
}

impl MediaRecord {
    /// A catalogue track playable through its preview clip.
    pub fn track(
        id: impl Into<String>,
        title: impl Into<String>,
        preview_url: Option<String>,
        uri: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: MediaSource::Spotify,
            title: title.into(),
            subtitle: None,
            album: None,
            thumbnail_url: None,
            media: MediaRef::PreviewClip { preview_url, uri },
        }
    }

    /// A video playable through the embedded player. The record id is the
    /// video id.
    pub fn video(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        let video_id = video_id.into();
        Self {
            id: video_id.clone(),
            source: MediaSource::YouTube,
            title: title.into(),
            subtitle: None,
            album: None,
            thumbnail_url: None,
            media: MediaRef::Video { video_id },
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> MediaSource {
        self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    pub fn media(&self) -> &MediaRef {
        &self.media
    }

    /// Thumbnail to display. Videos without one fall back to the host's
    /// standard still image.
    pub fn thumbnail_url(&self) -> Option<String> {
        match (&self.thumbnail_url, &self.media) {
            (Some(url), _) => Some(url.clone()),
            (None, MediaRef::Video { video_id }) => Some(format!(
                "https://img.youtube.com/vi/{}/hqdefault.jpg",
                video_id
            )),
            (None, MediaRef::PreviewClip { .. }) => None,
        }
    }

    pub fn video_id(&self) -> Option<&str> {
        match &self.media {
            MediaRef::Video { video_id } => Some(video_id),
            MediaRef::PreviewClip { .. } => None,
        }
    }

    pub fn preview_url(&self) -> Option<&str> {
        match &self.media {
            MediaRef::PreviewClip { preview_url, .. } => preview_url.as_deref(),
            MediaRef::Video { .. } => None,
        }
    }

    /// Embeddable player URL for videos.
    pub fn embed_url(&self) -> Option<String> {
        self.video_id().map(|video_id| {
            format!(
                "https://www.youtube.com/embed/{}?playsinline=1&enablejsapi=1",
                video_id
            )
        })
    }

    /// Validate record invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Record id cannot be empty".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Record title cannot be empty".to_string());
        }

        if let MediaRef::Video { video_id } = &self.media {
            if !is_valid_video_id(video_id) {
                return Err(format!("Invalid video id '{}'", video_id));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_defaults() {
        let video = MediaRecord::video("dQw4w9WgXcQ", "Never Gonna Give You Up")
            .with_subtitle("Rick Astley");

        assert_eq!(video.id(), "dQw4w9WgXcQ");
        assert_eq!(video.source(), MediaSource::YouTube);
        assert_eq!(video.subtitle(), Some("Rick Astley"));
        assert_eq!(
            video.thumbnail_url().as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
        assert_eq!(
            video.embed_url().as_deref(),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ?playsinline=1&enablejsapi=1")
        );
        assert!(video.preview_url().is_none());
        assert!(video.validate().is_ok());
    }

    #[test]
    fn test_track_accessors() {
        let track = MediaRecord::track(
            "4uLU6hMCjMI75M1A2tKUQC",
            "Song",
            Some("https://p.scdn.co/mp3-preview/abc".to_string()),
            Some("spotify:track:4uLU6hMCjMI75M1A2tKUQC".to_string()),
        )
        .with_subtitle("Artist A, Artist B")
        .with_album("Album")
        .with_thumbnail("https://i.scdn.co/image/1");

        assert_eq!(track.source(), MediaSource::Spotify);
        assert_eq!(track.album(), Some("Album"));
        assert_eq!(track.preview_url(), Some("https://p.scdn.co/mp3-preview/abc"));
        assert_eq!(
            track.thumbnail_url().as_deref(),
            Some("https://i.scdn.co/image/1")
        );
        assert!(track.video_id().is_none());
        assert!(track.embed_url().is_none());
    }

    #[test]
    fn test_track_without_thumbnail_has_none() {
        let track = MediaRecord::track("t1", "Song", None, None);
        assert!(track.thumbnail_url().is_none());
    }

    #[test]
    fn test_validation() {
        assert!(MediaRecord::video("", "Title").validate().is_err());
        assert!(MediaRecord::video("abc", "  ").validate().is_err());
        assert!(MediaRecord::video("abc\"onload", "Title").validate().is_err());
        assert!(MediaRecord::track("t1", "Song", None, None).validate().is_ok());
    }

    #[test]
    fn test_video_id_rules() {
        assert!(is_valid_video_id("dQw4w9WgXcQ"));
        assert!(is_valid_video_id("a-b_c"));
        assert!(!is_valid_video_id(""));
        assert!(!is_valid_video_id("'); alert(1); ('"));
        assert!(!is_valid_video_id(&"x".repeat(65)));
    }

    #[test]
    fn test_media_source_parsing() {
        assert_eq!("YouTube".parse::<MediaSource>().unwrap(), MediaSource::YouTube);
        assert_eq!(" spotify ".parse::<MediaSource>().unwrap(), MediaSource::Spotify);
        assert!("deezer".parse::<MediaSource>().is_err());
        assert_eq!(MediaSource::YouTube.as_str(), "youtube");
        assert_eq!(MediaSource::default(), MediaSource::Spotify);
    }

    #[test]
    fn test_serialized_form_is_tagged() {
        let video = MediaRecord::video("abc", "Title");
        let json = serde_json::to_value(&video).unwrap();

        assert_eq!(json["source"], "youtube");
        assert_eq!(json["media"]["kind"], "video");
        assert_eq!(json["media"]["video_id"], "abc");
    }
}
