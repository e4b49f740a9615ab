use async_trait::async_trait;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};
use aws_sdk_cloudwatch::Client;
use tracing::info;

use super::{Metric, MetricSink, MetricUnit};
use crate::error::TelemetryError;

/// Publishes metrics with CloudWatch `PutMetricData`.
pub struct CloudWatchSink {
    client: Client,
}

impl CloudWatchSink {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn datum(metric: &Metric) -> MetricDatum {
    let unit = match metric.unit {
        MetricUnit::Percent => StandardUnit::Percent,
        MetricUnit::Count => StandardUnit::Count,
    };

    let dimensions = metric
        .dimensions
        .iter()
        .map(|(name, value)| Dimension::builder().name(name).value(value).build())
        .collect::<Vec<_>>();

    MetricDatum::builder()
        .metric_name(metric.name)
        .set_dimensions(Some(dimensions))
        .value(metric.value)
        .unit(unit)
        .storage_resolution(metric.storage_resolution)
        .build()
}

#[async_trait]
impl MetricSink for CloudWatchSink {
    async fn put_metrics(&self, namespace: &str, metrics: &[Metric]) -> Result<(), TelemetryError> {
        let data = metrics.iter().map(datum).collect::<Vec<_>>();

        self.client
            .put_metric_data()
            .namespace(namespace)
            .set_metric_data(Some(data))
            .send()
            .await
            .map_err(|e| {
                TelemetryError::Metrics(format!(
                    "PutMetricData to {namespace} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        info!("Published {} metrics to {namespace}", metrics.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::vehicle_metrics;
    use crate::vehicle::VehicleStatus;

    #[test]
    fn test_datum_carries_unit_resolution_and_vin() {
        let status = VehicleStatus {
            vin: "WBY1Z21000V000001".into(),
            charge_percentage: 64.5,
            minutes_until_full: Some(30),
            mileage_km: 18250,
            charging_status: None,
        };
        let metrics = vehicle_metrics(&status.vin, &status);

        let battery = datum(&metrics[0]);

        assert_eq!(battery.value(), Some(64.5));
        assert_eq!(battery.unit(), Some(&StandardUnit::Percent));
        assert_eq!(battery.storage_resolution(), Some(60));
        assert_eq!(battery.dimensions().len(), 1);
        assert_eq!(battery.dimensions()[0].name(), Some("VIN"));
        assert_eq!(battery.dimensions()[0].value(), Some("WBY1Z21000V000001"));
    }

    #[test]
    fn test_every_metric_converts_with_its_own_unit() {
        let status = VehicleStatus {
            vin: "WBY1Z21000V000001".into(),
            charge_percentage: 100.0,
            minutes_until_full: None,
            mileage_km: 18250,
            charging_status: None,
        };

        let data = vehicle_metrics(&status.vin, &status)
            .iter()
            .map(datum)
            .collect::<Vec<_>>();

        let units: Vec<_> = data.iter().map(|d| d.unit().cloned()).collect();
        assert_eq!(
            units,
            vec![
                Some(StandardUnit::Percent),
                Some(StandardUnit::Count),
                Some(StandardUnit::Count),
            ]
        );
        assert_eq!(data[1].value(), Some(0.0));
        assert_eq!(data[2].metric_name(), Some("OdometerKilometers"));
    }
}
