//! Email gate and batch sender.
//!
//! Candidate emails are filtered by the recipient's email preference,
//! rendered, and handed to the provider as one batch. Every candidate ends
//! up in exactly one of `sent`, `skipped` or `failed`.

use crate::error::NotifyResult;
use crate::models::{Channel, EmailCounts, EmailInput, EmailKind, NotificationOptions, NotificationType};
use crate::providers::{EmailProvider, OutboundEmail};
use crate::repository::NotificationStore;
use crate::templates::TemplateEngine;
use core_config::email::EmailConfig;
use futures::future::join_all;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Header that keeps mail clients from threading unrelated notifications.
pub const ENTITY_REF_HEADER: &str = "X-Entity-Ref-ID";

/// Sender settings shared by every email.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub default_from: String,
    /// Base URL for links in templates.
    pub app_url: String,
}

impl From<&EmailConfig> for EmailSettings {
    fn from(config: &EmailConfig) -> Self {
        Self {
            default_from: config.default_from.clone(),
            app_url: config.app_url.clone(),
        }
    }
}

/// Optional sender fields set by one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvelopeOverrides {
    pub from: Option<String>,
    pub reply_to: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl From<&NotificationOptions> for EnvelopeOverrides {
    fn from(options: &NotificationOptions) -> Self {
        Self {
            from: options.from.clone(),
            reply_to: options.reply_to.clone(),
            headers: options.headers.clone(),
        }
    }
}

impl From<&EmailInput> for EnvelopeOverrides {
    fn from(email: &EmailInput) -> Self {
        Self {
            from: email.from.clone(),
            reply_to: email.reply_to.clone(),
            headers: email.headers.clone(),
        }
    }
}

/// Final sender fields of one email.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailEnvelope {
    pub from: String,
    pub reply_to: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl EmailEnvelope {
    /// Defaults applied before any handler or caller setting.
    pub fn template_defaults(settings: &EmailSettings) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(ENTITY_REF_HEADER.to_string(), Uuid::new_v4().to_string());
        Self {
            from: settings.default_from.clone(),
            reply_to: None,
            headers,
        }
    }

    /// Merge the three layers: `runtime` over `handler` over `defaults`.
    ///
    /// Headers merge key by key in the same order.
    pub fn resolve(
        defaults: EmailEnvelope,
        handler: &EnvelopeOverrides,
        runtime: &EnvelopeOverrides,
    ) -> Self {
        let from = runtime
            .from
            .clone()
            .or_else(|| handler.from.clone())
            .unwrap_or(defaults.from);
        let reply_to = runtime
            .reply_to
            .clone()
            .or_else(|| handler.reply_to.clone())
            .or(defaults.reply_to);

        let mut headers = defaults.headers;
        headers.extend(handler.headers.clone());
        headers.extend(runtime.headers.clone());

        Self {
            from,
            reply_to,
            headers,
        }
    }
}

enum Gate {
    Eligible,
    Skipped,
    Failed,
}

/// Filters, renders and sends notification emails.
pub struct EmailService<S, P>
where
    S: NotificationStore + ?Sized,
    P: EmailProvider + ?Sized,
{
    store: Arc<S>,
    provider: Arc<P>,
    templates: TemplateEngine,
    settings: EmailSettings,
}

impl<S, P> EmailService<S, P>
where
    S: NotificationStore + ?Sized,
    P: EmailProvider + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        provider: Arc<P>,
        templates: TemplateEngine,
        settings: EmailSettings,
    ) -> Self {
        Self {
            store,
            provider,
            templates,
            settings,
        }
    }

    /// Send `emails` as one batch.
    ///
    /// Team and owner emails respect each recipient's email preference for
    /// `notification_type`; customer emails do not. A failed preference
    /// lookup or render counts that email as failed. A provider error fails
    /// every email of the batch.
    pub async fn send_bulk(
        &self,
        emails: Vec<EmailInput>,
        notification_type: NotificationType,
        runtime: &EnvelopeOverrides,
    ) -> EmailCounts {
        let total = emails.len();
        let mut counts = EmailCounts::default();
        if total == 0 {
            return counts;
        }

        let gates = join_all(emails.iter().map(|email| self.gate(email, notification_type))).await;

        let mut outbound = Vec::with_capacity(total);
        for (email, gate) in emails.into_iter().zip(gates) {
            match gate {
                Gate::Skipped => counts.skipped += 1,
                Gate::Failed => counts.failed += 1,
                Gate::Eligible => match self.build(&email, runtime) {
                    Ok(message) => outbound.push(message),
                    Err(e) => {
                        warn!(
                            user_id = %email.user.id,
                            template = %email.template,
                            error = %e,
                            "Failed to render email"
                        );
                        counts.failed += 1;
                    }
                },
            }
        }

        info!(
            notification_type = %notification_type,
            candidates = total,
            eligible = outbound.len(),
            skipped = counts.skipped,
            "Email gate applied"
        );

        if outbound.is_empty() {
            return counts;
        }

        match self.provider.send_batch(&outbound).await {
            Ok(receipt) => {
                debug!(
                    provider = self.provider.name(),
                    message_ids = ?receipt.message_ids,
                    "Email batch sent"
                );
                counts.sent = outbound.len();
            }
            Err(e) => {
                error!(
                    provider = self.provider.name(),
                    notification_type = %notification_type,
                    batch_size = outbound.len(),
                    error = %e,
                    "Email batch failed"
                );
                counts.failed += outbound.len();
            }
        }

        counts
    }

    async fn gate(&self, email: &EmailInput, notification_type: NotificationType) -> Gate {
        if email.kind == EmailKind::Customer {
            return Gate::Eligible;
        }

        if email.recipient().trim().is_empty() {
            warn!(user_id = %email.user.id, "Recipient has no email address, skipping");
            return Gate::Skipped;
        }

        match self
            .store
            .should_send_notification(
                email.user.id,
                email.user.team_id,
                notification_type,
                Channel::Email,
            )
            .await
        {
            Ok(true) => Gate::Eligible,
            Ok(false) => Gate::Skipped,
            Err(e) => {
                warn!(
                    user_id = %email.user.id,
                    error = %e,
                    "Email preference lookup failed"
                );
                Gate::Failed
            }
        }
    }

    fn build(&self, email: &EmailInput, runtime: &EnvelopeOverrides) -> NotifyResult<OutboundEmail> {
        let context = self.context(email);
        let rendered = self
            .templates
            .render(email.template, &email.user.locale, &context)?;

        let envelope = EmailEnvelope::resolve(
            EmailEnvelope::template_defaults(&self.settings),
            &EnvelopeOverrides::from(email),
            runtime,
        );

        Ok(OutboundEmail {
            from: envelope.from,
            to: email.recipient().to_string(),
            subject: email.subject.clone(),
            html: rendered.html,
            text: rendered.text,
            headers: envelope.headers,
            reply_to: envelope.reply_to,
        })
    }

    fn context(&self, email: &EmailInput) -> Value {
        let mut context = match &email.data {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        let is_customer = email.kind == EmailKind::Customer;

        context.insert("team_name".to_string(), json!(email.user.team_name));
        context.insert("app_url".to_string(), json!(self.settings.app_url));
        context.insert("is_customer".to_string(), json!(is_customer));
        if !is_customer {
            context.insert(
                "user".to_string(),
                json!({
                    "first_name": email.user.first_name(),
                    "full_name": email.user.full_name,
                    "email": email.user.email,
                }),
            );
        }
        Value::Object(context)
    }
}
