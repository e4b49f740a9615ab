//! charge-notifier invocation: one SMS, then one email.

use std::sync::Arc;
use tracing::info;

use crate::config::NotifierConfig;
use crate::error::TelemetryError;
use crate::notify::{render, Notifier, OutgoingEmail, EMAIL_TEMPLATE};

pub const SMS_MESSAGE: &str = "Your BMW i3 is fully charged.";
pub const EMAIL_SUBJECT: &str = "Your i3 Is Charged";

pub struct ChargeNotifier {
    config: NotifierConfig,
    notifier: Arc<dyn Notifier>,
}

impl ChargeNotifier {
    pub fn new(config: NotifierConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    pub fn email(&self) -> OutgoingEmail {
        OutgoingEmail {
            from: self.config.from_address.clone(),
            to: self.config.email_address.clone(),
            subject: EMAIL_SUBJECT.to_string(),
            html_body: render(EMAIL_TEMPLATE, ""),
        }
    }

    /// Send both notifications. A failed SMS means no email is sent.
    pub async fn invoke(&self) -> Result<(), TelemetryError> {
        self.notifier
            .send_sms(&self.config.phone_number, SMS_MESSAGE)
            .await?;
        self.notifier.send_email(&self.email()).await?;

        info!("Charge notifications delivered");
        Ok(())
    }
}
