use core_config::email::{DEFAULT_APP_URL, DEFAULT_FROM, EmailConfig};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::activities::write_activities;
use crate::email::{EmailService, EmailSettings, EnvelopeOverrides};
use crate::error::{NotificationError, NotifyResult};
use crate::handlers::{Handler, Payload};
use crate::models::{EmailCounts, EmailKind, NotificationOptions, NotificationResult};
use crate::providers::EmailProvider;
use crate::recipients::{self, Recipients};
use crate::repository::NotificationStore;
use crate::templates::TemplateEngine;

/// Configuration for the notification service.
#[derive(Debug, Clone)]
pub struct NotificationServiceConfig {
    pub email: EmailSettings,
}

impl NotificationServiceConfig {
    pub fn from_email_config(config: &EmailConfig) -> Self {
        Self {
            email: EmailSettings::from(config),
        }
    }
}

impl Default for NotificationServiceConfig {
    fn default() -> Self {
        Self {
            email: EmailSettings {
                default_from: DEFAULT_FROM.to_string(),
                app_url: DEFAULT_APP_URL.to_string(),
            },
        }
    }
}

/// Entry point of the notification pipeline
///
/// One `create` call validates the event, expands the team into
/// recipients, writes one activity per recipient and, when asked to,
/// sends the matching emails.
pub struct Notifications<S, P>
where
    S: NotificationStore + ?Sized,
    P: EmailProvider + ?Sized,
{
    store: Arc<S>,
    email: EmailService<S, P>,
}

impl<S, P> Notifications<S, P>
where
    S: NotificationStore + ?Sized,
    P: EmailProvider + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        provider: Arc<P>,
        config: NotificationServiceConfig,
    ) -> NotifyResult<Self> {
        let templates = TemplateEngine::new()?;
        Ok(Self {
            email: EmailService::new(store.clone(), provider, templates, config.email),
            store,
        })
    }

    /// Dispatch one business event to every member of `team_id`.
    ///
    /// Fails before touching the store when the type is unknown or the
    /// payload or options are invalid, and before any write when the team
    /// does not exist. Activity and email failures are reported as counts.
    #[instrument(skip_all, fields(notification_type = %notification_type, team_id = %team_id))]
    pub async fn create(
        &self,
        notification_type: &str,
        team_id: Uuid,
        payload: Value,
        options: NotificationOptions,
    ) -> NotifyResult<NotificationResult> {
        let handler = Handler::lookup(notification_type)?;
        let ty = handler.notification_type;

        options
            .validate()
            .map_err(|e| NotificationError::schema(ty, e))?;
        let payload = handler.validate(payload).inspect_err(|e| {
            warn!(error = %e, "Rejected notification payload");
        })?;

        let recipients = recipients::resolve(self.store.as_ref(), team_id).await?;
        if recipients.is_empty() {
            info!("Team has no members, nothing to notify");
            return Ok(NotificationResult::empty(ty));
        }

        let group_id = Uuid::new_v4();
        let written = write_activities(
            self.store.as_ref(),
            &payload,
            &recipients.users,
            group_id,
            options.priority,
        )
        .await;

        let emails = if options.send_email && handler.supports_email {
            self.send_emails(&payload, &recipients, &options).await
        } else {
            EmailCounts::all_skipped(recipients.len())
        };

        info!(
            group_id = %group_id,
            recipients = recipients.len(),
            activities = written.written(),
            activity_failures = written.failed,
            emails_sent = emails.sent,
            emails_skipped = emails.skipped,
            emails_failed = emails.failed,
            "Notification dispatched"
        );

        Ok(NotificationResult {
            notification_type: ty,
            activities: written.written(),
            emails,
        })
    }

    /// Route emails by the kind of a sample built for the first recipient.
    async fn send_emails(
        &self,
        payload: &Payload,
        recipients: &Recipients,
        options: &NotificationOptions,
    ) -> EmailCounts {
        let ty = payload.notification_type();
        let team = &recipients.team;

        let Some(first) = recipients.users.first() else {
            return EmailCounts::default();
        };
        let Some(sample) = payload.create_email(first, team) else {
            return EmailCounts::all_skipped(recipients.len());
        };

        let emails = match sample.kind {
            EmailKind::Customer => vec![sample],
            EmailKind::Owners => recipients
                .owners()
                .filter_map(|user| payload.create_email(user, team))
                .collect(),
            EmailKind::Team => recipients
                .users
                .iter()
                .filter_map(|user| payload.create_email(user, team))
                .collect(),
        };

        self.email
            .send_bulk(emails, ty, &EnvelopeOverrides::from(options))
            .await
    }
}
