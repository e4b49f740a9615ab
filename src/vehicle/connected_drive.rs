use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::traits::{VehicleApi, VehicleStatus};
use crate::crypto::Credentials;
use crate::error::TelemetryError;
use crate::store::TokenPair;

pub const DEFAULT_BASE_URL: &str = "https://b2vapi.bmwgroup.com";

const TOKEN_PATH: &str = "/webapi/oauth/token/";
const SCOPE: &str = "authenticate_user vehicle_data remote_services";

/// Renew this long before the token endpoint's stated expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// BMW ConnectedDrive client.
///
/// Quirks:
/// - The token endpoint wants HTTP basic auth with the API key/secret on every
///   grant, including refresh.
/// - Cached tokens carry no expiry, so a stale access token is only detected
///   by a 401. The client then refreshes once and retries.
/// - A rejected refresh token falls back to the password grant.
pub struct ConnectedDriveClient {
    base_url: String,
    credentials: Credentials,
    http: reqwest::Client,
    session: Mutex<Session>,
}

struct Session {
    tokens: TokenPair,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusEnvelope {
    vehicle_status: RawStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatus {
    mileage: u64,
    charging_level_hv: f64,
    // Number while charging, absent or a placeholder string otherwise.
    #[serde(default)]
    charging_time_remaining: Option<Value>,
    #[serde(default)]
    charging_status: Option<String>,
}

impl ConnectedDriveClient {
    pub fn new(base_url: impl Into<String>, credentials: Credentials, tokens: TokenPair) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            http: reqwest::Client::new(),
            session: Mutex::new(Session {
                tokens,
                expires_at: None,
            }),
        }
    }

    async fn access_token(&self) -> Result<String, TelemetryError> {
        let expired = {
            let session = self.session.lock().await;
            session
                .expires_at
                .map(|at| at - chrono::Duration::seconds(EXPIRY_MARGIN_SECS) <= Utc::now())
                .unwrap_or(false)
        };

        if expired {
            info!("Access token past expiry, renewing");
            self.renew().await?;
        }

        Ok(self.session.lock().await.tokens.access_token.clone())
    }

    async fn fetch_status(&self, vin: &str, token: &str) -> Result<reqwest::Response, TelemetryError> {
        self.http
            .get(format!("{}/webapi/v1/user/vehicles/{vin}/status", self.base_url))
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TelemetryError::VehicleApi(format!("Status request failed: {e}")))
    }

    /// Refresh the access token, falling back to a password login.
    async fn renew(&self) -> Result<(), TelemetryError> {
        let refresh_token = self.session.lock().await.tokens.refresh_token.clone();

        let refreshed = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .await;

        let response = match refreshed {
            Ok(response) => response,
            Err(e) => {
                warn!("Refresh token rejected ({e}), logging in with password grant");
                self.request_token(&[
                    ("grant_type", "password"),
                    ("username", self.credentials.username.as_str()),
                    ("password", self.credentials.password.as_str()),
                    ("scope", SCOPE),
                ])
                .await?
            }
        };

        self.store_tokens(response).await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, TelemetryError> {
        let resp = self
            .http
            .post(format!("{}{TOKEN_PATH}", self.base_url))
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .header("Accept", "application/json")
            .form(form)
            .send()
            .await
            .map_err(|e| TelemetryError::RefreshFailed(format!("Token request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(TelemetryError::RefreshFailed(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| TelemetryError::RefreshFailed(format!("Failed to parse token response: {e}")))
    }

    async fn store_tokens(&self, response: TokenResponse) -> Result<(), TelemetryError> {
        if response.access_token.is_empty() {
            return Err(TelemetryError::RefreshFailed(
                "Token endpoint returned an empty access_token".into(),
            ));
        }

        let mut session = self.session.lock().await;
        session.tokens.access_token = response.access_token;
        // Some grants do not rotate the refresh token.
        if let Some(refresh_token) = response.refresh_token.filter(|t| !t.is_empty()) {
            session.tokens.refresh_token = refresh_token;
        }
        session.expires_at = response.expires_in.and_then(expiry_from);

        info!("Renewed ConnectedDrive tokens");
        Ok(())
    }
}

#[async_trait]
impl VehicleApi for ConnectedDriveClient {
    async fn vehicle_status(&self, vin: &str) -> Result<VehicleStatus, TelemetryError> {
        let token = self.access_token().await?;
        let mut resp = self.fetch_status(vin, &token).await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            warn!("Access token rejected for {vin}, renewing and retrying once");
            self.renew().await?;
            let token = self.session.lock().await.tokens.access_token.clone();
            resp = self.fetch_status(vin, &token).await?;
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(TelemetryError::VehicleApi(format!(
                "Status for {vin} returned {status}: {body}"
            )));
        }

        let envelope: StatusEnvelope = resp
            .json()
            .await
            .map_err(|e| TelemetryError::VehicleApi(format!("Failed to parse status: {e}")))?;

        let raw = envelope.vehicle_status;
        Ok(VehicleStatus {
            vin: vin.to_string(),
            charge_percentage: raw.charging_level_hv,
            minutes_until_full: raw.charging_time_remaining.as_ref().and_then(minutes),
            mileage_km: raw.mileage,
            charging_status: raw.charging_status,
        })
    }

    async fn tokens(&self) -> TokenPair {
        self.session.lock().await.tokens.clone()
    }
}

/// Absolute expiry for an `expires_in` lifetime; `None` when it does not fit.
fn expiry_from(secs: u64) -> Option<DateTime<Utc>> {
    let lifetime = chrono::Duration::try_seconds(i64::try_from(secs).ok()?)?;
    Utc::now().checked_add_signed(lifetime)
}

fn minutes(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_f64().map(|m| m.max(0.0).round() as u32),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|m| m.max(0.0).round() as u32),
        _ => None,
    }
}
