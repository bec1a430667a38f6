//! Settings Storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::path::PathBuf;
use tracing::{debug, error};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        value_type TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )
"#;

/// SQLite-backed settings store implementation
///
/// Each value is stored with a type tag and reading it back as another type
/// is an error.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Open (creating if needed) the settings database at `db_path`
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to connect to DB: {}", e)))?;

        Self::init_schema(&pool).await?;
        debug!(path = ?db_path, "Initialized settings store");

        Ok(Self { pool })
    }

    /// Create an in-memory settings store (for testing)
    pub async fn in_memory() -> Result<Self> {
        // A single connection, since every in-memory connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to connect to DB: {}", e)))?;

        Self::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(pool)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to create table: {}", e)))?;
        Ok(())
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    async fn set_value(&self, key: &str, value: &str, value_type: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, value_type, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                value_type = excluded.value_type,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(value_type)
        .bind(Self::now())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::StorageError(format!("Failed to set setting: {}", e)))?;

        debug!(key, value_type, "Stored setting");
        Ok(())
    }

    async fn get_value(&self, key: &str, expected_type: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value, value_type FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to get setting: {}", e)))?;

        match row {
            Some(row) => {
                let value: String = row.get(0);
                let value_type: String = row.get(1);

                if value_type != expected_type {
                    error!(
                        key,
                        expected = expected_type,
                        actual = %value_type,
                        "Type mismatch"
                    );
                    return Err(BridgeError::StorageError(format!(
                        "Type mismatch: expected {}, got {}",
                        expected_type, value_type
                    )));
                }

                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value, "string").await
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key, "string").await
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_value(key, &value.to_string(), "bool").await
    }

    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get_value(key, "bool").await? {
            Some(s) => Ok(Some(s.parse().map_err(|e| {
                BridgeError::StorageError(format!("Parse error: {}", e))
            })?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to delete setting: {}", e)))?;

        debug!(key, "Deleted setting");
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to check key: {}", e)))?;

        Ok(row.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to list keys: {}", e)))?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM settings")
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to clear settings: {}", e)))?;

        debug!("Cleared all settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_string_operations() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_string("test_key", "test_value").await.unwrap();
        let value = store.get_string("test_key").await.unwrap();
        assert_eq!(value, Some("test_value".to_string()));

        store.set_string("test_key", "replaced").await.unwrap();
        let value = store.get_string("test_key").await.unwrap();
        assert_eq!(value, Some("replaced".to_string()));

        store.delete("test_key").await.unwrap();
        let value = store.get_string("test_key").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_bool_and_type_mismatch() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_bool("bool_key", true).await.unwrap();
        assert_eq!(store.get_bool("bool_key").await.unwrap(), Some(true));
        assert!(store.get_string("bool_key").await.is_err());
    }

    #[tokio::test]
    async fn test_list_and_clear() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_string("key2", "value2").await.unwrap();
        store.set_string("key1", "value1").await.unwrap();
        assert!(store.has_key("key1").await.unwrap());

        let keys = store.list_keys().await.unwrap();
        assert_eq!(keys, vec!["key1", "key2"]);

        store.clear_all().await.unwrap();
        assert!(store.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = std::env::temp_dir().join(format!("nearplay-settings-{}", std::process::id()));
        let path = dir.join("settings.db");

        {
            let store = SqliteSettingsStore::new(path.clone()).await.unwrap();
            store.set_string("saved_playlist", "[]").await.unwrap();
        }

        let reopened = SqliteSettingsStore::new(path).await.unwrap();
        assert_eq!(
            reopened.get_string("saved_playlist").await.unwrap(),
            Some("[]".to_string())
        );

        let _ = std::fs::remove_dir_all(dir);
    }
}
