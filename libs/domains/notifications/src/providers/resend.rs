//! Resend email provider implementation.

use super::{BatchReceipt, EmailProvider, OutboundEmail};
use crate::error::{NotificationError, NotifyResult};
use async_trait::async_trait;
use core_config::email::EmailConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

/// Resend email provider, using the batch endpoint.
pub struct ResendProvider {
    api_key: String,
    api_url: String,
    client: Client,
}

impl ResendProvider {
    /// Create a new Resend provider.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn batch_url(&self) -> String {
        format!("{}/emails/batch", self.api_url)
    }
}

// Resend API request/response structures

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    text: &'a str,
    #[serde(skip_serializing_if = "no_headers")]
    headers: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

fn is_blank(text: &&str) -> bool {
    text.is_empty()
}

fn no_headers(headers: &&BTreeMap<String, String>) -> bool {
    headers.is_empty()
}

impl<'a> From<&'a OutboundEmail> for ResendEmail<'a> {
    fn from(email: &'a OutboundEmail) -> Self {
        Self {
            from: &email.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
            headers: &email.headers,
            reply_to: email.reply_to.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResendBatchResponse {
    #[serde(default)]
    data: Vec<ResendCreated>,
}

#[derive(Debug, Deserialize)]
struct ResendCreated {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResendError {
    message: String,
    #[serde(default)]
    name: Option<String>,
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ResendError>(body) {
        Ok(ResendError {
            message,
            name: Some(name),
        }) => format!("{}: {}", name, message),
        Ok(ResendError { message, name: None }) => message,
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    async fn send_batch(&self, emails: &[OutboundEmail]) -> NotifyResult<BatchReceipt> {
        let request: Vec<ResendEmail<'_>> = emails.iter().map(ResendEmail::from).collect();

        debug!(batch_size = emails.len(), "Sending email batch via Resend");

        let response = self
            .client
            .post(self.batch_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let body: ResendBatchResponse = response.json().await?;
            info!(
                batch_size = emails.len(),
                accepted = body.data.len(),
                "Email batch accepted by Resend"
            );
            Ok(BatchReceipt {
                message_ids: body.data.into_iter().map(|d| d.id).collect(),
            })
        } else {
            let error_body = response.text().await.unwrap_or_default();
            let message = error_message(&error_body);
            error!(
                batch_size = emails.len(),
                status = %status,
                error = %message,
                "Failed to send email batch via Resend"
            );

            Err(NotificationError::Provider(format!(
                "Resend error ({}): {}",
                status, message
            )))
        }
    }

    fn name(&self) -> &'static str {
        "Resend"
    }

    async fn health_check(&self) -> NotifyResult<bool> {
        // No health endpoint; check the key format instead
        if self.api_key.starts_with("re_") {
            Ok(true)
        } else {
            Err(NotificationError::Config(
                "Invalid Resend API key format".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_url_from_config() {
        let mut config = EmailConfig::new("re_test_key".to_string());
        config.api_url = "https://mail.internal.test/".to_string();

        let provider = ResendProvider::new(&config);
        assert_eq!(provider.batch_url(), "https://mail.internal.test/emails/batch");
        assert_eq!(provider.name(), "Resend");
    }

    #[test]
    fn test_request_body_shape() {
        let mut email = OutboundEmail {
            from: "Acme <noreply@acme.test>".to_string(),
            to: "ada@acme.test".to_string(),
            subject: "Invoice INV-1 has been paid".to_string(),
            html: "<p>Paid</p>".to_string(),
            text: String::new(),
            headers: BTreeMap::new(),
            reply_to: None,
        };

        let body = serde_json::to_value(ResendEmail::from(&email)).unwrap();
        assert_eq!(
            body,
            json!({
                "from": "Acme <noreply@acme.test>",
                "to": ["ada@acme.test"],
                "subject": "Invoice INV-1 has been paid",
                "html": "<p>Paid</p>"
            })
        );

        email.reply_to = Some("billing@acme.test".to_string());
        email
            .headers
            .insert("X-Entity-Ref-ID".to_string(), "abc".to_string());
        let body = serde_json::to_value(ResendEmail::from(&email)).unwrap();
        assert_eq!(body["reply_to"], "billing@acme.test");
        assert_eq!(body["headers"]["X-Entity-Ref-ID"], "abc");
    }

    #[test]
    fn test_error_message_parsing() {
        assert_eq!(
            error_message(r#"{"statusCode":422,"name":"validation_error","message":"Invalid `to` field"}"#),
            "validation_error: Invalid `to` field"
        );
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[tokio::test]
    async fn test_health_check_key_format() {
        let provider = ResendProvider::new(&EmailConfig::new("re_123".to_string()));
        assert!(provider.health_check().await.unwrap());

        let provider = ResendProvider::new(&EmailConfig::new("sk_123".to_string()));
        assert!(provider.health_check().await.is_err());
    }
}
