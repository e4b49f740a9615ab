//! Secret decryption for credentials stored encrypted in the environment.

mod credentials;
mod kms;

pub use credentials::{Credentials, EncryptedCredentials};
pub use kms::{KmsDecryptor, SecretDecryptor};
