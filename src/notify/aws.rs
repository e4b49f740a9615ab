use async_trait::async_trait;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use tracing::info;

use super::{Notifier, OutgoingEmail};
use crate::error::TelemetryError;

/// SMS through SNS, email through SES.
pub struct AwsNotifier {
    sns: aws_sdk_sns::Client,
    ses: aws_sdk_sesv2::Client,
}

impl AwsNotifier {
    pub fn new(sns: aws_sdk_sns::Client, ses: aws_sdk_sesv2::Client) -> Self {
        Self { sns, ses }
    }
}

fn content(data: &str) -> Result<Content, TelemetryError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| TelemetryError::Notification(format!("Invalid email content: {e}")))
}

#[async_trait]
impl Notifier for AwsNotifier {
    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<(), TelemetryError> {
        let output = self
            .sns
            .publish()
            .phone_number(phone_number)
            .message(message)
            .send()
            .await
            .map_err(|e| {
                TelemetryError::Notification(format!(
                    "SNS Publish failed: {}",
                    aws_sdk_sns::error::DisplayErrorContext(&e)
                ))
            })?;

        info!("SMS sent (message id {})", output.message_id().unwrap_or("-"));
        Ok(())
    }

    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), TelemetryError> {
        let message = Message::builder()
            .subject(content(&email.subject)?)
            .body(Body::builder().html(content(&email.html_body)?).build())
            .build();

        let output = self
            .ses
            .send_email()
            .from_email_address(&email.from)
            .destination(Destination::builder().to_addresses(&email.to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| {
                TelemetryError::Notification(format!(
                    "SES SendEmail failed: {}",
                    aws_sdk_sesv2::error::DisplayErrorContext(&e)
                ))
            })?;

        info!("Email sent (message id {})", output.message_id().unwrap_or("-"));
        Ok(())
    }
}
