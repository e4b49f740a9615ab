use async_trait::async_trait;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::Client;
use base64::Engine as _;

use crate::error::TelemetryError;

/// Turns an encrypted configuration value into plaintext.
#[async_trait]
pub trait SecretDecryptor: Send + Sync {
    /// Decrypt a base64-encoded ciphertext blob.
    async fn decrypt(&self, ciphertext_b64: &str) -> Result<String, TelemetryError>;
}

/// Decrypts values that were encrypted with a KMS key and stored base64-encoded
/// in the function's environment.
pub struct KmsDecryptor {
    client: Client,
}

impl KmsDecryptor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretDecryptor for KmsDecryptor {
    async fn decrypt(&self, ciphertext_b64: &str) -> Result<String, TelemetryError> {
        let blob = decode_ciphertext(ciphertext_b64)?;

        let output = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(blob))
            .send()
            .await
            .map_err(|e| {
                TelemetryError::Decryption(format!("KMS Decrypt failed: {}", DisplayErrorContext(&e)))
            })?;

        let plaintext = output
            .plaintext()
            .ok_or_else(|| TelemetryError::Decryption("KMS returned no plaintext".into()))?;

        String::from_utf8(plaintext.as_ref().to_vec())
            .map_err(|e| TelemetryError::Decryption(format!("Invalid UTF-8 after decrypt: {e}")))
    }
}

fn decode_ciphertext(ciphertext_b64: &str) -> Result<Vec<u8>, TelemetryError> {
    let blob = base64::engine::general_purpose::STANDARD
        .decode(ciphertext_b64.trim())
        .map_err(|e| TelemetryError::Decryption(format!("Invalid base64 ciphertext: {e}")))?;

    if blob.is_empty() {
        return Err(TelemetryError::Decryption("Ciphertext is empty".into()));
    }

    Ok(blob)
}
