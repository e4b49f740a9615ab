//! ConnectedDrive API credentials, encrypted at rest in the environment.

use std::fmt;
use tracing::debug;

use super::kms::SecretDecryptor;
use crate::error::TelemetryError;

/// Ciphertexts as they appear in the function environment.
#[derive(Debug, Clone)]
pub struct EncryptedCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub username: String,
    pub password: String,
}

/// Plaintext credentials handed to the vehicle API client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub username: String,
    pub password: String,
}

impl EncryptedCredentials {
    /// Decrypt all four values. Fails on the first value that does not decrypt.
    pub async fn decrypt(
        &self,
        decryptor: &dyn SecretDecryptor,
    ) -> Result<Credentials, TelemetryError> {
        let field = |name: &'static str| {
            move |e: TelemetryError| TelemetryError::Decryption(format!("{name}: {e}"))
        };

        let credentials = Credentials {
            api_key: decryptor.decrypt(&self.api_key).await.map_err(field("API_KEY"))?,
            api_secret: decryptor
                .decrypt(&self.api_secret)
                .await
                .map_err(field("API_SECRET"))?,
            username: decryptor
                .decrypt(&self.username)
                .await
                .map_err(field("CONNECTEDDRIVE_USERNAME"))?,
            password: decryptor
                .decrypt(&self.password)
                .await
                .map_err(field("CONNECTEDDRIVE_PASSWORD"))?,
        };

        debug!("Decrypted ConnectedDrive credentials");
        Ok(credentials)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
