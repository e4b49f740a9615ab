//! Token cache: a local staging file in front of one remote object.
//!
//! The staging file is best-effort memoization for warm execution
//! environments. The remote object is authoritative; a missing staging file
//! always falls through to it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::object::{ObjectLocation, ObjectStore};
use crate::error::TelemetryError;

/// Staging path used when none is configured.
pub const DEFAULT_STAGING_PATH: &str = "/tmp/i3logger-cache";

/// OAuth access/refresh credential pair for the telematics API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Name of the first empty field, if any.
    fn empty_field(&self) -> Option<&'static str> {
        if self.access_token.is_empty() {
            Some("access_token")
        } else if self.refresh_token.is_empty() {
            Some("refresh_token")
        } else {
            None
        }
    }
}

// Token values never reach logs.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Persists a [`TokenPair`] across invocations.
pub struct TokenCache {
    store: Arc<dyn ObjectStore>,
    staging_path: PathBuf,
}

impl TokenCache {
    pub fn new(store: Arc<dyn ObjectStore>, staging_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            staging_path: staging_path.into(),
        }
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// Load the cached token pair.
    ///
    /// A staging file left by an earlier invocation wins over the remote
    /// object, even when it is unparseable.
    pub async fn load(&self, location: &ObjectLocation) -> Result<TokenPair, TelemetryError> {
        if self.staging_present().await {
            debug!("Token cache hit at {}", self.staging_path.display());
        } else {
            info!("Fetching token cache from {location}");
            let body = self.store.get(location).await?;
            self.write_staging(&body).await?;
        }

        let raw = tokio::fs::read(&self.staging_path).await.map_err(|e| {
            TelemetryError::StorageRead(format!(
                "Failed to read {}: {e}",
                self.staging_path.display()
            ))
        })?;

        let tokens: TokenPair = serde_json::from_slice(&raw).map_err(|e| {
            TelemetryError::MalformedCache(format!("{}: {e}", self.staging_path.display()))
        })?;

        if let Some(field) = tokens.empty_field() {
            return Err(TelemetryError::MalformedCache(format!(
                "{}: {field} is empty",
                self.staging_path.display()
            )));
        }

        Ok(tokens)
    }

    /// Persist `tokens` to the staging file and then to the remote object.
    ///
    /// Both writes overwrite in full. If the upload fails after the local
    /// write succeeded, the two copies disagree until the next save.
    pub async fn save(
        &self,
        location: &ObjectLocation,
        tokens: &TokenPair,
    ) -> Result<(), TelemetryError> {
        if let Some(field) = tokens.empty_field() {
            return Err(TelemetryError::StorageWriteFailure(format!(
                "refusing to persist an empty {field}"
            )));
        }

        let body = serde_json::to_vec(tokens)
            .map_err(|e| TelemetryError::StorageWriteFailure(format!("Serialize failed: {e}")))?;

        self.write_staging(&body).await?;

        self.store
            .put(location, body)
            .await
            .map_err(TelemetryError::into_write_failure)?;

        info!("Saved token cache to {location}");
        Ok(())
    }

    async fn staging_present(&self) -> bool {
        tokio::fs::metadata(&self.staging_path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn write_staging(&self, body: &[u8]) -> Result<(), TelemetryError> {
        let write_failure = |e: std::io::Error| {
            TelemetryError::StorageWriteFailure(format!(
                "Failed to write {}: {e}",
                self.staging_path.display()
            ))
        };

        if let Some(parent) = self.staging_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(write_failure)?;
            }
        }

        tokio::fs::write(&self.staging_path, body)
            .await
            .map_err(write_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryObjectStore;
    use async_trait::async_trait;
    use tempfile::TempDir;

    fn location() -> ObjectLocation {
        ObjectLocation::new("i3-cache", "tokens")
    }

    /// A fresh execution environment: empty staging directory.
    fn environment(store: Arc<dyn ObjectStore>) -> (TempDir, TokenCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(store, dir.path().join("i3logger-cache"));
        (dir, cache)
    }

    struct RejectingStore;

    #[async_trait]
    impl ObjectStore for RejectingStore {
        async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, TelemetryError> {
            Err(TelemetryError::NotFound(format!("Object {location}")))
        }

        async fn put(&self, _: &ObjectLocation, _: Vec<u8>) -> Result<(), TelemetryError> {
            Err(TelemetryError::StorageRead("access denied".into()))
        }
    }

    #[tokio::test]
    async fn test_load_from_remote_leaves_identical_staging_file() {
        let body = r#"{"access_token":"A1","refresh_token":"R1"}"#;
        let store = Arc::new(MemoryObjectStore::new().with_object(location(), body));
        let (_dir, cache) = environment(store);

        let tokens = cache.load(&location()).await.unwrap();

        assert_eq!(tokens, TokenPair::new("A1", "R1"));
        let staged = std::fs::read_to_string(cache.staging_path()).unwrap();
        assert_eq!(staged, body);
    }

    #[tokio::test]
    async fn test_save_then_load_in_new_environment() {
        let store = Arc::new(MemoryObjectStore::new().with_object(
            location(),
            r#"{"access_token":"A1","refresh_token":"R1"}"#,
        ));

        let (_first_dir, first) = environment(store.clone());
        first.load(&location()).await.unwrap();
        first
            .save(&location(), &TokenPair::new("A2", "R2"))
            .await
            .unwrap();

        let (_second_dir, second) = environment(store.clone());
        let tokens = second.load(&location()).await.unwrap();
        assert_eq!(tokens, TokenPair::new("A2", "R2"));
    }

    fn sample_pairs() -> Vec<TokenPair> {
        vec![
            TokenPair::new("eyJhbGciOi.access", "refresh-7f3c"),
            TokenPair::new(r#"with "quotes""#, r"back\slash\n"),
            TokenPair::new("zugangsschlüssel-ä-ö", "トークン🚗"),
            TokenPair::new("a".repeat(8192), "r".repeat(4096)),
            TokenPair::new(" ", "\t\n{}[]:,"),
        ]
    }

    #[tokio::test]
    async fn test_round_trip_in_same_environment() {
        let store = Arc::new(MemoryObjectStore::new());
        let (_dir, cache) = environment(store);

        for tokens in sample_pairs() {
            cache.save(&location(), &tokens).await.unwrap();
            assert_eq!(cache.load(&location()).await.unwrap(), tokens);
        }
    }

    #[tokio::test]
    async fn test_round_trip_in_fresh_environment() {
        let store = Arc::new(MemoryObjectStore::new());

        for tokens in sample_pairs() {
            let (_writer_dir, writer) = environment(store.clone());
            writer.save(&location(), &tokens).await.unwrap();

            let (_reader_dir, reader) = environment(store.clone());
            assert_eq!(reader.load(&location()).await.unwrap(), tokens);
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_remote_with_serialized_pair() {
        let store = Arc::new(MemoryObjectStore::new());
        let (_dir, cache) = environment(store.clone());
        let tokens = TokenPair::new("A3", "R3");

        cache.save(&location(), &tokens).await.unwrap();

        let remote = store.object(&location()).await.unwrap();
        assert_eq!(remote, serde_json::to_vec(&tokens).unwrap());
    }

    #[tokio::test]
    async fn test_missing_remote_and_no_staging_is_not_found() {
        let store = Arc::new(MemoryObjectStore::new());
        let (_dir, cache) = environment(store);

        let err = cache.load(&location()).await.unwrap_err();

        assert!(matches!(err, TelemetryError::NotFound(_)));
        assert!(!cache.staging_path().exists());
    }

    #[tokio::test]
    async fn test_malformed_staging_file_wins_over_valid_remote() {
        let store = Arc::new(MemoryObjectStore::new().with_object(
            location(),
            r#"{"access_token":"A1","refresh_token":"R1"}"#,
        ));
        let (_dir, cache) = environment(store);
        std::fs::write(cache.staging_path(), r#"{"access_token":"A0"}"#).unwrap();

        let err = cache.load(&location()).await.unwrap_err();

        assert!(matches!(err, TelemetryError::MalformedCache(_)));
    }

    #[tokio::test]
    async fn test_stale_staging_file_is_served_before_remote() {
        let store = Arc::new(MemoryObjectStore::new().with_object(
            location(),
            r#"{"access_token":"A2","refresh_token":"R2"}"#,
        ));
        let (_dir, cache) = environment(store);
        std::fs::write(
            cache.staging_path(),
            r#"{"access_token":"A1","refresh_token":"R1"}"#,
        )
        .unwrap();

        let tokens = cache.load(&location()).await.unwrap();

        assert_eq!(tokens, TokenPair::new("A1", "R1"));
    }

    #[tokio::test]
    async fn test_malformed_remote_object() {
        let store = Arc::new(MemoryObjectStore::new().with_object(location(), "not json"));
        let (_dir, cache) = environment(store);

        let err = cache.load(&location()).await.unwrap_err();

        assert!(matches!(err, TelemetryError::MalformedCache(_)));
    }

    #[tokio::test]
    async fn test_empty_token_is_malformed() {
        let store = Arc::new(MemoryObjectStore::new().with_object(
            location(),
            r#"{"access_token":"A1","refresh_token":""}"#,
        ));
        let (_dir, cache) = environment(store);

        let err = cache.load(&location()).await.unwrap_err();

        assert!(matches!(err, TelemetryError::MalformedCache(_)));
    }

    #[tokio::test]
    async fn test_upload_failure_is_storage_write_failure() {
        let (_dir, cache) = environment(Arc::new(RejectingStore));

        let err = cache
            .save(&location(), &TokenPair::new("A1", "R1"))
            .await
            .unwrap_err();

        assert!(matches!(err, TelemetryError::StorageWriteFailure(_)));
        // Local write already happened; the copies now disagree.
        assert!(cache.staging_path().exists());
    }

    #[tokio::test]
    async fn test_save_rejects_empty_tokens() {
        let store = Arc::new(MemoryObjectStore::new());
        let (_dir, cache) = environment(store.clone());

        let err = cache
            .save(&location(), &TokenPair::new("", "R1"))
            .await
            .unwrap_err();

        assert!(matches!(err, TelemetryError::StorageWriteFailure(_)));
        assert!(store.object(&location()).await.is_none());
    }

    #[tokio::test]
    async fn test_unwritable_staging_path_fails_save() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the staging directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let cache = TokenCache::new(Arc::new(MemoryObjectStore::new()), blocker.join("cache"));

        let err = cache
            .save(&location(), &TokenPair::new("A1", "R1"))
            .await
            .unwrap_err();

        assert!(matches!(err, TelemetryError::StorageWriteFailure(_)));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", TokenPair::new("secret-access", "secret-refresh"));
        assert!(!rendered.contains("secret"));
    }
}
