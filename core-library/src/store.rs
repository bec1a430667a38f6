//! Playlist persistence over the host settings store
//!
//! The whole playlist is written as one JSON array under a single key and
//! read back in one piece. There is no schema version: a value that fails to
//! decode is treated as an empty playlist.

use std::sync::Arc;

use bridge_traits::storage::SettingsStore;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::MediaRecord;
use crate::playlist::Playlist;

pub struct PlaylistStore {
    settings: Arc<dyn SettingsStore>,
    key: String,
}

impl PlaylistStore {
    pub fn new(settings: Arc<dyn SettingsStore>, key: impl Into<String>) -> Self {
        Self {
            settings,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the saved playlist.
    ///
    /// Missing, unreadable or corrupt data yields an empty playlist.
    pub async fn load(&self) -> Playlist {
        let raw = match self.settings.get_string(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No saved playlist");
                return Playlist::new();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read saved playlist");
                return Playlist::new();
            }
        };

        match serde_json::from_str::<Vec<MediaRecord>>(&raw) {
            Ok(records) => {
                let playlist = Playlist::from_records(records);
                debug!(key = %self.key, count = playlist.len(), "Loaded playlist");
                playlist
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Saved playlist is corrupt; starting empty");
                Playlist::new()
            }
        }
    }

    /// Replace the saved playlist with `playlist`.
    pub async fn save(&self, playlist: &Playlist) -> Result<()> {
        let raw = serde_json::to_string(playlist.records())?;
        self.settings.set_string(&self.key, &raw).await?;
        debug!(key = %self.key, count = playlist.len(), "Saved playlist");
        Ok(())
    }

    /// Remove the saved playlist.
    pub async fn clear(&self) -> Result<()> {
        self.settings.delete(&self.key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibraryError;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::fakes::MemorySettingsStore;
    use mockall::mock;

    mock! {
        Settings {}

        #[async_trait]
        impl SettingsStore for Settings {
            async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()>;
            async fn get_string(&self, key: &str) -> BridgeResult<Option<String>>;
            async fn set_bool(&self, key: &str, value: bool) -> BridgeResult<()>;
            async fn get_bool(&self, key: &str) -> BridgeResult<Option<bool>>;
            async fn delete(&self, key: &str) -> BridgeResult<()>;
            async fn has_key(&self, key: &str) -> BridgeResult<bool>;
            async fn list_keys(&self) -> BridgeResult<Vec<String>>;
            async fn clear_all(&self) -> BridgeResult<()>;
        }
    }

    fn sample_playlist() -> Playlist {
        Playlist::from_records(vec![
            MediaRecord::video("vid-1", "First").with_subtitle("Channel"),
            MediaRecord::track(
                "trk-2",
                "Second",
                Some("https://p.scdn.co/mp3-preview/2".to_string()),
                Some("spotify:track:trk-2".to_string()),
            )
            .with_subtitle("Artist")
            .with_album("Album")
            .with_thumbnail("https://i.scdn.co/image/2"),
            MediaRecord::track("trk-3", "Third", None, None),
        ])
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order_and_fields() {
        let settings = Arc::new(MemorySettingsStore::new());
        let store = PlaylistStore::new(settings, "saved_playlist");

        for playlist in [Playlist::new(), sample_playlist()] {
            store.save(&playlist).await.unwrap();
            assert_eq!(store.load().await, playlist);
        }
    }

    #[tokio::test]
    async fn test_missing_key_loads_empty() {
        let store = PlaylistStore::new(Arc::new(MemorySettingsStore::new()), "saved_playlist");
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_data_loads_empty() {
        let settings = Arc::new(MemorySettingsStore::new());
        settings
            .set_string("saved_playlist", "{not json")
            .await
            .unwrap();

        let store = PlaylistStore::new(settings, "saved_playlist");
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_stored_duplicates_are_dropped() {
        let settings = Arc::new(MemorySettingsStore::new());
        let records = vec![
            MediaRecord::video("a", "A"),
            MediaRecord::video("a", "A again"),
        ];
        settings
            .set_string("saved_playlist", &serde_json::to_string(&records).unwrap())
            .await
            .unwrap();

        let playlist = PlaylistStore::new(settings, "saved_playlist").load().await;
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.get(0).map(|r| r.title()), Some("A"));
    }

    #[tokio::test]
    async fn test_read_failure_loads_empty() {
        let mut settings = MockSettings::new();
        settings
            .expect_get_string()
            .returning(|_| Err(BridgeError::StorageError("disk gone".to_string())));

        let store = PlaylistStore::new(Arc::new(settings), "saved_playlist");
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let mut settings = MockSettings::new();
        settings
            .expect_set_string()
            .withf(|key, _| key == "saved_playlist")
            .times(1)
            .returning(|_, _| Err(BridgeError::StorageError("read-only".to_string())));

        let store = PlaylistStore::new(Arc::new(settings), "saved_playlist");
        let result = store.save(&sample_playlist()).await;
        assert!(matches!(result, Err(LibraryError::Bridge(_))));
    }

    #[tokio::test]
    async fn test_clear_removes_key() {
        let settings = Arc::new(MemorySettingsStore::new());
        let store = PlaylistStore::new(settings.clone(), "saved_playlist");

        store.save(&sample_playlist()).await.unwrap();
        store.clear().await.unwrap();
        assert!(!settings.has_key("saved_playlist").await.unwrap());
    }
}
