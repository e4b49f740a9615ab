use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::Mutex;

use crate::error::TelemetryError;

/// Address of a single object in the remote store (bucket + key).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Durable key-addressed object storage.
///
/// Implementations must report a missing object as
/// [`TelemetryError::NotFound`] so callers can tell it apart from transport
/// failures. `put` overwrites unconditionally.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full contents of an object.
    async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, TelemetryError>;

    /// Replace the object with `body`.
    async fn put(&self, location: &ObjectLocation, body: Vec<u8>) -> Result<(), TelemetryError>;
}

/// In-process object store. Used for local runs and tests.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<ObjectLocation, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object before first use.
    pub fn with_object(mut self, location: ObjectLocation, body: impl Into<Vec<u8>>) -> Self {
        self.objects.get_mut().insert(location, body.into());
        self
    }

    /// Current contents of an object, if present.
    pub async fn object(&self, location: &ObjectLocation) -> Option<Vec<u8>> {
        self.objects.lock().await.get(location).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, TelemetryError> {
        self.objects
            .lock()
            .await
            .get(location)
            .cloned()
            .ok_or_else(|| TelemetryError::NotFound(format!("Object {location}")))
    }

    async fn put(&self, location: &ObjectLocation, body: Vec<u8>) -> Result<(), TelemetryError> {
        self.objects.lock().await.insert(location.clone(), body);
        Ok(())
    }
}
