//! Outbound email delivery.

use crate::error::AssessmentError;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";
pub const SUMMARY_SUBJECT: &str = "Votre synthèse de compétences en Design";

/// A single message to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// An email-delivery backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailClient: Send + Sync {
    /// Sends the message and returns the provider's delivery status code.
    async fn send(&self, message: EmailMessage) -> Result<u16, AssessmentError>;
}

/// Converts plain text into an HTML body by turning line breaks into `<br>`.
pub fn format_html_body(text: &str) -> String {
    text.replace("\r\n", "<br>").replace('\n', "<br>")
}

/// Delivers mail through the SendGrid v3 API.
pub struct SendGridEmailClient {
    http: reqwest::Client,
    api_key: String,
    from: String,
    endpoint: String,
}

impl SendGridEmailClient {
    pub fn new(api_key: String, from: String, timeout: Duration) -> Result<Self, AssessmentError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssessmentError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            http,
            api_key,
            from,
            endpoint: SENDGRID_SEND_URL.to_string(),
        })
    }

    /// Points the client at a different endpoint, e.g. a local sink.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn payload(&self, message: &EmailMessage) -> serde_json::Value {
        json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": self.from },
            "subject": message.subject,
            "content": [{ "type": "text/html", "value": message.html_body }],
        })
    }
}

#[async_trait]
impl EmailClient for SendGridEmailClient {
    async fn send(&self, message: EmailMessage) -> Result<u16, AssessmentError> {
        debug!(endpoint = %self.endpoint, "Sending email");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(&message))
            .send()
            .await
            .map_err(|e| AssessmentError::UpstreamEmail(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssessmentError::UpstreamEmail(format!(
                "provider returned {}: {}",
                status, body
            )));
        }
        Ok(status.as_u16())
    }
}
