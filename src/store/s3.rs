//! S3-backed [`ObjectStore`].

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use super::object::{ObjectLocation, ObjectStore};
use crate::error::TelemetryError;

pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, TelemetryError> {
        let output = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    TelemetryError::NotFound(format!("Object {location}"))
                } else {
                    TelemetryError::StorageRead(format!(
                        "GetObject {location} failed: {}",
                        DisplayErrorContext(&e)
                    ))
                }
            })?;

        let data = output.body.collect().await.map_err(|e| {
            TelemetryError::StorageRead(format!("Reading body of {location} failed: {e}"))
        })?;

        let bytes = data.into_bytes().to_vec();
        debug!("Fetched {} bytes from {location}", bytes.len());
        Ok(bytes)
    }

    async fn put(&self, location: &ObjectLocation, body: Vec<u8>) -> Result<(), TelemetryError> {
        self.client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                TelemetryError::StorageWriteFailure(format!(
                    "PutObject {location} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }
}
