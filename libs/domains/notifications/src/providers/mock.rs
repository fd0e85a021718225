//! Mock email provider for testing

use super::{BatchReceipt, EmailProvider, OutboundEmail};
use crate::error::{NotificationError, NotifyResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Mock email provider that captures sent batches
#[derive(Debug, Clone, Default)]
pub struct MockEmailProvider {
    batches: Arc<Mutex<Vec<Vec<OutboundEmail>>>>,
    calls: Arc<AtomicUsize>,
    failure_message: Option<String>,
}

impl MockEmailProvider {
    /// Create a new mock provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider that rejects every batch
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of `send_batch` calls, failed ones included
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Accepted batches, in call order
    pub async fn batches(&self) -> Vec<Vec<OutboundEmail>> {
        self.batches.lock().await.clone()
    }

    /// Every accepted email, flattened
    pub async fn sent_emails(&self) -> Vec<OutboundEmail> {
        self.batches.lock().await.iter().flatten().cloned().collect()
    }

    /// Check if an email was sent to a specific address
    pub async fn was_sent_to(&self, address: &str) -> bool {
        self.batches
            .lock()
            .await
            .iter()
            .flatten()
            .any(|e| e.to == address)
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send_batch(&self, emails: &[OutboundEmail]) -> NotifyResult<BatchReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure_message {
            return Err(NotificationError::Provider(message.clone()));
        }

        let mut batches = self.batches.lock().await;
        let offset: usize = batches.iter().map(Vec::len).sum();
        batches.push(emails.to_vec());

        Ok(BatchReceipt {
            message_ids: (0..emails.len())
                .map(|i| format!("mock-{}", offset + i))
                .collect(),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    async fn health_check(&self) -> NotifyResult<bool> {
        Ok(self.failure_message.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutboundEmail {
        OutboundEmail {
            from: "Acme <noreply@acme.test>".to_string(),
            to: to.to_string(),
            subject: "Test".to_string(),
            html: "<p>Body</p>".to_string(),
            text: "Body".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_mock_provider_captures_batches() {
        let provider = MockEmailProvider::new();

        let receipt = provider
            .send_batch(&[email("a@example.com"), email("b@example.com")])
            .await
            .unwrap();
        assert_eq!(receipt.message_ids, vec!["mock-0", "mock-1"]);

        let receipt = provider.send_batch(&[email("c@example.com")]).await.unwrap();
        assert_eq!(receipt.message_ids, vec!["mock-2"]);

        assert_eq!(provider.calls(), 2);
        assert_eq!(provider.batches().await.len(), 2);
        assert!(provider.was_sent_to("b@example.com").await);
        assert!(!provider.was_sent_to("z@example.com").await);
    }

    #[tokio::test]
    async fn test_mock_provider_fails() {
        let provider = MockEmailProvider::failing("Simulated outage");

        let result = provider.send_batch(&[email("a@example.com")]).await;
        assert!(matches!(result, Err(NotificationError::Provider(m)) if m == "Simulated outage"));
        assert_eq!(provider.calls(), 1);
        assert!(provider.sent_emails().await.is_empty());
        assert!(!provider.health_check().await.unwrap());
    }
}
