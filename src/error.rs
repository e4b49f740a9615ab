/// Unified error type for the i3 telemetry functions.
///
/// Every variant is fatal to the invocation that raised it; nothing here is
/// retried locally. The scheduler that triggered the function owns retries.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    // ── Token cache ─────────────────────────────────────────────────────
    #[error("{0} not found")]
    NotFound(String),

    #[error("Malformed token cache: {0}")]
    MalformedCache(String),

    #[error("Storage write failed: {0}")]
    StorageWriteFailure(String),

    #[error("Storage read failed: {0}")]
    StorageRead(String),

    // ── Secrets ─────────────────────────────────────────────────────────
    #[error("Decryption error: {0}")]
    Decryption(String),

    // ── Vehicle API ─────────────────────────────────────────────────────
    #[error("Vehicle API error: {0}")]
    VehicleApi(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    // ── Delivery ────────────────────────────────────────────────────────
    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Notification error: {0}")]
    Notification(String),

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for TelemetryError {
    fn from(e: anyhow::Error) -> Self {
        TelemetryError::Internal(e.to_string())
    }
}

impl TelemetryError {
    /// Collapse any error raised while persisting into `StorageWriteFailure`.
    pub(crate) fn into_write_failure(self) -> Self {
        match self {
            e @ TelemetryError::StorageWriteFailure(_) => e,
            other => TelemetryError::StorageWriteFailure(other.to_string()),
        }
    }
}
