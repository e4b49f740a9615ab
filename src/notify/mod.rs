//! SMS and email delivery for the charge notifier.

mod aws;
mod template;

pub use aws::AwsNotifier;
pub use template::{render, EMAIL_TEMPLATE};

use async_trait::async_trait;

use crate::error::TelemetryError;

/// An HTML email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Delivery channel for user notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a text message to an E.164 phone number.
    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<(), TelemetryError>;

    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), TelemetryError>;
}
