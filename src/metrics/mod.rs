//! Vehicle metrics and the sink they are published to.

mod cloudwatch;

pub use cloudwatch::CloudWatchSink;

use async_trait::async_trait;

use crate::error::TelemetryError;
use crate::vehicle::VehicleStatus;

/// High-resolution storage: one datapoint per minute.
pub const STORAGE_RESOLUTION_SECS: i32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Percent,
    Count,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: &'static str,
    pub value: f64,
    pub unit: MetricUnit,
    /// (name, value) pairs.
    pub dimensions: Vec<(String, String)>,
    pub storage_resolution: i32,
}

impl Metric {
    fn for_vin(name: &'static str, vin: &str, value: f64, unit: MetricUnit) -> Self {
        Self {
            name,
            value,
            unit,
            dimensions: vec![("VIN".to_string(), vin.to_string())],
            storage_resolution: STORAGE_RESOLUTION_SECS,
        }
    }
}

/// The three datapoints logged per invocation.
pub fn vehicle_metrics(vin: &str, status: &VehicleStatus) -> Vec<Metric> {
    vec![
        Metric::for_vin(
            "BatteryCharge",
            vin,
            status.charge_percentage,
            MetricUnit::Percent,
        ),
        Metric::for_vin(
            "MinutesUntilFullyCharged",
            vin,
            f64::from(status.minutes_until_full.unwrap_or(0)),
            MetricUnit::Count,
        ),
        Metric::for_vin(
            "OdometerKilometers",
            vin,
            status.mileage_km as f64,
            MetricUnit::Count,
        ),
    ]
}

/// Destination for metric datapoints.
#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn put_metrics(&self, namespace: &str, metrics: &[Metric]) -> Result<(), TelemetryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(minutes_until_full: Option<u32>) -> VehicleStatus {
        VehicleStatus {
            vin: "WBY1Z21000V000001".into(),
            charge_percentage: 64.5,
            minutes_until_full,
            mileage_km: 18250,
            charging_status: None,
        }
    }

    #[test]
    fn test_vehicle_metrics_shape() {
        let metrics = vehicle_metrics("WBY1Z21000V000001", &status(Some(95)));

        let names: Vec<_> = metrics.iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            ["BatteryCharge", "MinutesUntilFullyCharged", "OdometerKilometers"]
        );
        assert_eq!(metrics[0].value, 64.5);
        assert_eq!(metrics[0].unit, MetricUnit::Percent);
        assert_eq!(metrics[1].value, 95.0);
        assert_eq!(metrics[2].value, 18250.0);
        for metric in &metrics {
            assert_eq!(
                metric.dimensions,
                vec![("VIN".to_string(), "WBY1Z21000V000001".to_string())]
            );
            assert_eq!(metric.storage_resolution, 60);
        }
    }

    #[test]
    fn test_not_charging_reports_zero_minutes() {
        let metrics = vehicle_metrics("WBY1Z21000V000001", &status(None));
        assert_eq!(metrics[1].value, 0.0);
        assert_eq!(metrics[1].unit, MetricUnit::Count);
    }
}
