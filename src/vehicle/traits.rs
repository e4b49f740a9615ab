use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;
use crate::store::TokenPair;

/// Snapshot of the values the logger reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleStatus {
    pub vin: String,
    /// High-voltage battery state of charge, 0–100.
    pub charge_percentage: f64,
    /// `None` when the vehicle is not charging.
    pub minutes_until_full: Option<u32>,
    pub mileage_km: u64,
    pub charging_status: Option<String>,
}

/// Client for a vehicle telematics API.
///
/// Implementations are constructed from a cached [`TokenPair`] and may
/// replace it while serving requests; [`VehicleApi::tokens`] returns the
/// pair that should be persisted afterwards.
#[async_trait]
pub trait VehicleApi: Send + Sync {
    /// Fetch the current status of the vehicle identified by `vin`.
    async fn vehicle_status(&self, vin: &str) -> Result<VehicleStatus, TelemetryError>;

    /// Tokens currently held by the client.
    async fn tokens(&self) -> TokenPair;
}
