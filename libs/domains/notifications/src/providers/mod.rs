//! Email provider implementations.
//!
//! This module contains the `EmailProvider` trait and implementations
//! for the transactional email services used by the notification pipeline.

mod mock;
mod resend;

pub use mock::MockEmailProvider;
pub use resend::ResendProvider;

use crate::error::NotifyResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rendered email ready for the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutboundEmail {
    /// Sender, `"Name <address>"` or a bare address.
    pub from: String,
    /// Recipient email address.
    pub to: String,
    pub subject: String,
    /// HTML body content.
    pub html: String,
    /// Plain text body content.
    pub text: String,
    pub headers: BTreeMap<String, String>,
    /// Reply-To email address.
    pub reply_to: Option<String>,
}

/// Provider acknowledgement for a whole batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReceipt {
    /// Provider-specific message IDs, in batch order.
    pub message_ids: Vec<String>,
}

/// Trait for email sending providers.
///
/// A batch is accepted or rejected as a whole.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send a batch of emails in a single request.
    async fn send_batch(&self, emails: &[OutboundEmail]) -> NotifyResult<BatchReceipt>;

    /// Get the provider name for logging.
    fn name(&self) -> &'static str;

    /// Check if the provider is healthy/configured.
    async fn health_check(&self) -> NotifyResult<bool>;
}
