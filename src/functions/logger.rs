//! i3logger invocation: read tokens, poll the vehicle, log metrics, write tokens back.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::LoggerConfig;
use crate::crypto::Credentials;
use crate::error::TelemetryError;
use crate::metrics::{vehicle_metrics, MetricSink};
use crate::store::{TokenCache, TokenPair};
use crate::vehicle::{ConnectedDriveClient, VehicleApi};

/// What one invocation observed. Returned to the trigger as the function result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationSummary {
    pub vin: String,
    pub charge_percentage: f64,
    pub minutes_until_full: Option<u32>,
    pub mileage_km: u64,
    pub metrics_published: usize,
    /// Whether the client ended up holding a different pair than the one loaded.
    pub tokens_renewed: bool,
}

pub struct Logger {
    config: LoggerConfig,
    credentials: Credentials,
    cache: TokenCache,
    metrics: Arc<dyn MetricSink>,
}

impl Logger {
    pub fn new(
        config: LoggerConfig,
        credentials: Credentials,
        cache: TokenCache,
        metrics: Arc<dyn MetricSink>,
    ) -> Self {
        Self {
            config,
            credentials,
            cache,
            metrics,
        }
    }

    /// Run one invocation against the ConnectedDrive API.
    pub async fn invoke(&self) -> Result<InvocationSummary, TelemetryError> {
        self.invoke_with(|credentials, tokens| {
            ConnectedDriveClient::new(&self.config.api_base_url, credentials, tokens)
        })
        .await
    }

    /// Run one invocation with a caller-supplied API client constructor.
    ///
    /// Any failure aborts the invocation. Tokens are saved only after the
    /// metrics were published. The client's final pair is compared with the
    /// loaded one to fill [`InvocationSummary::tokens_renewed`].
    pub async fn invoke_with<A, F>(&self, connect: F) -> Result<InvocationSummary, TelemetryError>
    where
        A: VehicleApi,
        F: FnOnce(Credentials, TokenPair) -> A,
    {
        let location = self.config.cache_location();
        let vin = &self.config.vehicle_vin;

        let cached = self.cache.load(&location).await?;
        let client = connect(self.credentials.clone(), cached.clone());

        let status = client.vehicle_status(vin).await?;
        info!(
            "{vin}: {:.0}% charged, {} km",
            status.charge_percentage, status.mileage_km
        );

        let metrics = vehicle_metrics(vin, &status);
        self.metrics
            .put_metrics(&self.config.cloudwatch_namespace, &metrics)
            .await?;

        let tokens = client.tokens().await;
        let tokens_renewed = tokens != cached;
        self.cache.save(&location, &tokens).await?;

        Ok(InvocationSummary {
            vin: vin.clone(),
            charge_percentage: status.charge_percentage,
            minutes_until_full: status.minutes_until_full,
            mileage_km: status.mileage_km,
            metrics_published: metrics.len(),
            tokens_renewed,
        })
    }
}
