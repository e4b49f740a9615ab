//! Shared AWS SDK configuration.

use aws_config::meta::region::RegionProviderChain;
use aws_config::{Region, SdkConfig};
use tracing::info;

const FALLBACK_REGION: &str = "us-east-1";

/// Load SDK configuration from the environment, preferring an explicit
/// region over the provider chain.
pub async fn load_config(region: Option<&str>) -> SdkConfig {
    let region_provider = match region {
        Some(region) => RegionProviderChain::first_try(Region::new(region.to_string()))
            .or_default_provider(),
        None => RegionProviderChain::default_provider().or_else(FALLBACK_REGION),
    };

    let config = aws_config::from_env().region(region_provider).load().await;
    info!(
        "AWS SDK configured (region: {})",
        config.region().map(|r| r.as_ref()).unwrap_or("unset")
    );
    config
}
