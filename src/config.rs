use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::crypto::EncryptedCredentials;
use crate::store::{ObjectLocation, DEFAULT_STAGING_PATH};
use crate::vehicle::DEFAULT_BASE_URL;

/// i3logger configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    // ── Token cache ─────────────────────────────────────────────────────
    pub cache_bucket: String,
    pub cache_key: String,
    /// Local staging file for the token cache.
    pub cache_path: PathBuf,

    // ── Metrics ─────────────────────────────────────────────────────────
    pub cloudwatch_namespace: String,
    pub vehicle_vin: String,

    // ── ConnectedDrive ──────────────────────────────────────────────────
    pub api_base_url: String,
    /// KMS ciphertexts, base64-encoded.
    pub credentials: EncryptedCredentials,

    pub aws_region: Option<String>,
}

/// charge-notifier configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub email_address: String,
    pub from_address: String,
    /// SMS destination, E.164 format.
    pub phone_number: String,
    pub aws_region: Option<String>,
}

fn required(get: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    get(name)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{name} is required"))
}

impl LoggerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(LoggerConfig {
            cache_bucket: required(&get, "CACHE_BUCKET")?,
            cache_key: required(&get, "CACHE_KEY")?,
            cache_path: get("CACHE_PATH")
                .unwrap_or_else(|| DEFAULT_STAGING_PATH.into())
                .into(),

            cloudwatch_namespace: required(&get, "CLOUDWATCH_NAMESPACE")?,
            vehicle_vin: required(&get, "VEHICLE_VIN")?,

            api_base_url: get("CONNECTEDDRIVE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            credentials: EncryptedCredentials {
                api_key: required(&get, "API_KEY")?,
                api_secret: required(&get, "API_SECRET")?,
                username: required(&get, "CONNECTEDDRIVE_USERNAME")?,
                password: required(&get, "CONNECTEDDRIVE_PASSWORD")?,
            },

            aws_region: get("AWS_REGION"),
        })
    }

    pub fn cache_location(&self) -> ObjectLocation {
        ObjectLocation::new(&self.cache_bucket, &self.cache_key)
    }
}

impl NotifierConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(|name| std::env::var(name).ok())
    }

    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(NotifierConfig {
            email_address: required(&get, "EMAIL_ADDRESS")?,
            from_address: required(&get, "FROM_ADDRESS")?,
            phone_number: required(&get, "TARGET_TOPIC")
                .context("TARGET_TOPIC holds the SMS phone number")?,
            aws_region: get("AWS_REGION"),
        })
    }
}
