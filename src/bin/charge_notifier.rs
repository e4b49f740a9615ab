use std::sync::Arc;

use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::{json, Value};
use tracing::{error, info};

use i3_telemetry::functions::ChargeNotifier;
use i3_telemetry::notify::AwsNotifier;
use i3_telemetry::{aws, NotifierConfig};

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "i3_telemetry=info,charge_notifier=info".into()),
        )
        .with_ansi(false)
        .init();

    let config = NotifierConfig::from_env()?;
    info!("charge-notifier v{}", env!("CARGO_PKG_VERSION"));

    let sdk = aws::load_config(config.aws_region.as_deref()).await;
    let notifier = Arc::new(AwsNotifier::new(
        aws_sdk_sns::Client::new(&sdk),
        aws_sdk_sesv2::Client::new(&sdk),
    ));
    let function = Arc::new(ChargeNotifier::new(config, notifier));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let function = function.clone();
        async move { handle(&function, event).await }
    }))
    .await
}

async fn handle(
    function: &ChargeNotifier,
    event: LambdaEvent<Value>,
) -> Result<Value, lambda_runtime::Error> {
    info!("Invocation {}", event.context.request_id);
    function.invoke().await.map_err(|e| {
        error!("Invocation failed: {e}");
        e
    })?;
    Ok(json!({ "notified": true }))
}
