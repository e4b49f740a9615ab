use std::sync::Arc;

use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use i3_telemetry::crypto::KmsDecryptor;
use i3_telemetry::functions::Logger;
use i3_telemetry::metrics::CloudWatchSink;
use i3_telemetry::store::S3ObjectStore;
use i3_telemetry::{aws, LoggerConfig, TokenCache};

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "i3_telemetry=info,i3logger=info".into()),
        )
        .with_ansi(false)
        .init();

    let config = LoggerConfig::from_env()?;
    info!("i3logger v{} for {}", env!("CARGO_PKG_VERSION"), config.vehicle_vin);

    // Decrypted once per execution environment, reused across invocations.
    let sdk = aws::load_config(config.aws_region.as_deref()).await;
    let decryptor = KmsDecryptor::new(aws_sdk_kms::Client::new(&sdk));
    let credentials = config.credentials.decrypt(&decryptor).await?;

    let store = Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&sdk)));
    let cache = TokenCache::new(store, config.cache_path.clone());
    let sink = Arc::new(CloudWatchSink::new(aws_sdk_cloudwatch::Client::new(&sdk)));
    let logger = Arc::new(Logger::new(config, credentials, cache, sink));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let logger = logger.clone();
        async move { handle(&logger, event).await }
    }))
    .await
}

async fn handle(logger: &Logger, event: LambdaEvent<Value>) -> Result<Value, lambda_runtime::Error> {
    info!("Invocation {}", event.context.request_id);
    let summary = logger.invoke().await.map_err(|e| {
        error!("Invocation failed: {e}");
        e
    })?;
    Ok(serde_json::to_value(summary)?)
}
