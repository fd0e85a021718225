//! Data models for the notifications domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Notification catalogue
// ============================================================================

/// Every business event that can produce a notification.
///
/// The set is closed: each variant has exactly one handler, enforced by the
/// exhaustive matches in `handlers`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    TransactionsCreated,
    TransactionsExported,
    TransactionsCategorized,
    TransactionsAssigned,
    DocumentUploaded,
    DocumentProcessed,
    InboxNew,
    InboxAutoMatched,
    InboxNeedsReview,
    InboxCrossCurrencyMatched,
    InvoicePaid,
    InvoiceOverdue,
    InvoiceScheduled,
    InvoiceSent,
    InvoiceReminderSent,
    InvoiceCancelled,
    InvoiceCreated,
    InvoiceRefunded,
    RecurringSeriesCompleted,
    RecurringSeriesStarted,
    RecurringSeriesPaused,
    RecurringInvoiceUpcoming,
    InsightReady,
}

/// Delivery surface of a notification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    InApp,
    Email,
}

/// Who caused the activity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivitySource {
    #[default]
    System,
    User,
}

/// Lifecycle of a persisted activity. New activities are always unread.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    Unread,
    Read,
    Archived,
}

/// Role of a user inside a team.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MemberRole {
    Owner,
    #[default]
    Member,
}

// ============================================================================
// Teams and recipients
// ============================================================================

/// A team as seen by the notification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub inbox_id: Option<String>,
    /// Contact address used as reply-to on customer-facing emails.
    pub email: Option<String>,
}

/// A row of the team membership lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub locale: Option<String>,
    pub role: MemberRole,
}

/// Recipient identity handed to handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub locale: String,
    pub team_id: Uuid,
    pub team_name: String,
    pub team_inbox_id: Option<String>,
    pub role: MemberRole,
}

impl UserData {
    pub const DEFAULT_LOCALE: &'static str = "en";

    pub fn from_member(team: &Team, member: TeamMember) -> Self {
        Self {
            id: member.id,
            full_name: member.full_name.unwrap_or_default(),
            email: member.email.unwrap_or_default(),
            locale: member
                .locale
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_LOCALE.to_string()),
            team_id: team.id,
            team_name: team.name.clone(),
            team_inbox_id: team.inbox_id.clone(),
            role: member.role,
        }
    }

    /// First name for greetings, falls back to the whole name.
    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("")
    }

    pub fn is_owner(&self) -> bool {
        self.role == MemberRole::Owner
    }
}

// ============================================================================
// Activities
// ============================================================================

fn validate_metadata(metadata: &serde_json::Value) -> Result<(), validator::ValidationError> {
    if metadata.is_object() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("metadata_not_object"))
    }
}

/// An activity ready to be persisted: one per recipient per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInput {
    pub team_id: Uuid,
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub source: ActivitySource,
    #[validate(range(min = 1, max = 10))]
    pub priority: u8,
    /// Links every activity spawned by one `create` call.
    pub group_id: Option<Uuid>,
    #[validate(custom(function = "validate_metadata"))]
    pub metadata: serde_json::Value,
}

impl ActivityInput {
    /// A system activity addressed to `user`.
    pub fn new(
        notification_type: NotificationType,
        user: &UserData,
        priority: u8,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            team_id: user.team_id,
            user_id: Some(user.id),
            notification_type,
            source: ActivitySource::System,
            priority,
            group_id: None,
            metadata,
        }
    }

    pub fn with_source(mut self, source: ActivitySource) -> Self {
        self.source = source;
        self
    }
}

/// A persisted activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub team_id: Uuid,
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub source: ActivitySource,
    pub priority: u8,
    pub group_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub status: ActivityStatus,
}

impl Activity {
    pub fn from_input(input: ActivityInput) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            team_id: input.team_id,
            user_id: input.user_id,
            notification_type: input.notification_type,
            source: input.source,
            priority: input.priority,
            group_id: input.group_id,
            metadata: input.metadata,
            status: ActivityStatus::Unread,
        }
    }
}

// ============================================================================
// Emails
// ============================================================================

/// Audience of an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmailKind {
    /// Every team member, subject to their email preference.
    #[default]
    Team,
    /// Team owners only, subject to their email preference.
    Owners,
    /// A single external address; team preferences do not apply.
    Customer,
}

/// Templates known to the `TemplateEngine`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmailTemplate {
    TransactionsCreated,
    TransactionsExported,
    InboxNew,
    InvoicePaid,
    InvoiceOverdue,
    InvoiceSent,
    InvoiceReminder,
    RecurringInvoiceUpcoming,
    RecurringSeriesPaused,
    InsightReady,
}

/// An email built by a handler, before preference filtering and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailInput {
    pub template: EmailTemplate,
    pub subject: String,
    pub user: UserData,
    /// Template variables.
    pub data: serde_json::Value,
    pub kind: EmailKind,
    /// Recipient override, used by customer emails.
    pub to: Option<String>,
    pub from: Option<String>,
    pub reply_to: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl EmailInput {
    pub fn new(
        template: EmailTemplate,
        subject: impl Into<String>,
        user: &UserData,
        data: serde_json::Value,
    ) -> Self {
        Self {
            template,
            subject: subject.into(),
            user: user.clone(),
            data,
            kind: EmailKind::Team,
            to: None,
            from: None,
            reply_to: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn owners_only(mut self) -> Self {
        self.kind = EmailKind::Owners;
        self
    }

    pub fn to_customer(mut self, address: impl Into<String>) -> Self {
        self.kind = EmailKind::Customer;
        self.to = Some(address.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: Option<String>) -> Self {
        self.reply_to = reply_to;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Address the email is delivered to.
    pub fn recipient(&self) -> &str {
        self.to.as_deref().unwrap_or(&self.user.email)
    }
}

// ============================================================================
// Call options and results
// ============================================================================

/// Caller supplied options for one `create` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationOptions {
    /// Replaces the computed priority of every activity.
    #[validate(range(min = 1, max = 10))]
    pub priority: Option<u8>,
    /// Gate for the email stage.
    pub send_email: bool,
    pub from: Option<String>,
    pub reply_to: Option<String>,
    /// Merged over handler and template headers.
    pub headers: BTreeMap<String, String>,
}

impl NotificationOptions {
    pub fn with_email() -> Self {
        Self {
            send_email: true,
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Outcome of the email stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailCounts {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl EmailCounts {
    pub fn all_skipped(total: usize) -> Self {
        Self {
            sent: 0,
            skipped: total,
            failed: 0,
        }
    }
}

/// Summary returned by `Notifications::create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResult {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub activities: usize,
    pub emails: EmailCounts,
}

impl NotificationResult {
    pub fn empty(notification_type: NotificationType) -> Self {
        Self {
            notification_type,
            activities: 0,
            emails: EmailCounts::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn team() -> Team {
        Team {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            inbox_id: Some("acme-inbox".to_string()),
            email: None,
        }
    }

    #[test]
    fn test_notification_type_tags_round_trip() {
        for ty in NotificationType::iter() {
            let tag = ty.to_string();
            assert_eq!(NotificationType::from_str(&tag).unwrap(), ty);
            assert_eq!(serde_json::to_value(ty).unwrap(), json!(tag));
        }
        assert_eq!(NotificationType::InvoicePaid.as_ref(), "invoice_paid");
        assert!(NotificationType::from_str("not_a_type").is_err());
    }

    #[test]
    fn test_user_data_defaults_locale() {
        let team = team();
        let member = TeamMember {
            id: Uuid::new_v4(),
            full_name: Some("Ada Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            locale: Some("  ".to_string()),
            role: MemberRole::Owner,
        };

        let user = UserData::from_member(&team, member);
        assert_eq!(user.locale, "en");
        assert_eq!(user.team_name, "Acme");
        assert_eq!(user.first_name(), "Ada");
        assert!(user.is_owner());
    }

    #[test]
    fn test_activity_input_validation() {
        let team = team();
        let user = UserData::from_member(
            &team,
            TeamMember {
                id: Uuid::new_v4(),
                full_name: None,
                email: None,
                locale: None,
                role: MemberRole::Member,
            },
        );

        let ok = ActivityInput::new(NotificationType::InboxNew, &user, 10, json!({}));
        assert!(ok.validate().is_ok());

        let too_high = ActivityInput::new(NotificationType::InboxNew, &user, 11, json!({}));
        assert!(too_high.validate().is_err());

        let zero = ActivityInput::new(NotificationType::InboxNew, &user, 0, json!({}));
        assert!(zero.validate().is_err());

        let not_object = ActivityInput::new(NotificationType::InboxNew, &user, 5, json!([1]));
        assert!(not_object.validate().is_err());
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: NotificationOptions = serde_json::from_value(json!({
            "priority": 2,
            "sendEmail": true,
            "replyTo": "billing@example.com",
            "headers": { "X-Campaign": "q3" }
        }))
        .unwrap();

        assert_eq!(options.priority, Some(2));
        assert!(options.send_email);
        assert_eq!(options.reply_to.as_deref(), Some("billing@example.com"));
        assert_eq!(options.headers.get("X-Campaign").map(String::as_str), Some("q3"));
        assert!(options.validate().is_ok());

        let invalid = NotificationOptions::default().with_priority(0);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_result_serializes_type_tag() {
        let result = NotificationResult::empty(NotificationType::InvoicePaid);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "invoice_paid");
        assert_eq!(value["emails"], json!({ "sent": 0, "skipped": 0, "failed": 0 }));
    }
}
