use super::{NotificationHandler, format_amount};
use crate::models::{
    ActivityInput, ActivitySource, EmailInput, EmailTemplate, NotificationType, Team, UserData,
};
use crate::templates::i18n;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::Display;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// How documents reached the inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InboxType {
    Email,
    Sync,
    Upload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InboxNew {
    #[validate(range(min = 1))]
    pub total_count: u32,
    pub inbox_type: InboxType,
    #[serde(default)]
    pub source: ActivitySource,
    pub provider: Option<String>,
}

impl NotificationHandler for InboxNew {
    const TYPE: NotificationType = NotificationType::InboxNew;
    const DEFAULT_PRIORITY: u8 = 3;
    const SUPPORTS_EMAIL: bool = true;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "totalCount": self.total_count,
                "inboxType": self.inbox_type,
                "provider": self.provider,
            }),
        )
        .with_source(self.source)
    }

    fn create_email(&self, user: &UserData, _team: &Team) -> Option<EmailInput> {
        let count = self.total_count.to_string();
        Some(EmailInput::new(
            EmailTemplate::InboxNew,
            i18n::translate(&user.locale, "inbox_new_subject", &[("count", &count)]),
            user,
            json!({
                "count": self.total_count,
                "inbox_type": self.inbox_type,
                "inbox_id": user.team_inbox_id,
            }),
        ))
    }
}

/// Confidence band of a document to transaction match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchType {
    AutoMatched,
    HighConfidence,
    Suggested,
}

/// Fields shared by the three match notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetails {
    pub inbox_id: Uuid,
    pub transaction_id: Uuid,
    #[validate(length(min = 1))]
    pub document_name: String,
    pub document_amount: f64,
    #[validate(length(min = 1))]
    pub document_currency: String,
    pub transaction_amount: f64,
    #[validate(length(min = 1))]
    pub transaction_currency: String,
    pub transaction_name: String,
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence_score: f64,
}

impl MatchDetails {
    fn metadata(&self, match_type: MatchType, is_cross_currency: bool) -> Value {
        json!({
            "inboxId": self.inbox_id,
            "transactionId": self.transaction_id,
            "documentName": self.document_name,
            "documentAmount": format_amount(self.document_amount),
            "documentCurrency": self.document_currency,
            "transactionAmount": format_amount(self.transaction_amount),
            "transactionCurrency": self.transaction_currency,
            "transactionName": self.transaction_name,
            "confidenceScore": self.confidence_score,
            "matchType": match_type,
            "isCrossCurrency": is_cross_currency,
        })
    }

    fn currencies_differ(&self) -> bool {
        !self
            .document_currency
            .eq_ignore_ascii_case(&self.transaction_currency)
    }
}

fn auto_matched_only(match_type: &MatchType) -> Result<(), ValidationError> {
    match match_type {
        MatchType::AutoMatched => Ok(()),
        _ => Err(ValidationError::new("expected_auto_matched")),
    }
}

fn needs_review_only(match_type: &MatchType) -> Result<(), ValidationError> {
    match match_type {
        MatchType::HighConfidence | MatchType::Suggested => Ok(()),
        MatchType::AutoMatched => Err(ValidationError::new("expected_review_match")),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InboxAutoMatched {
    #[serde(flatten)]
    #[validate(nested)]
    pub details: MatchDetails,
    #[validate(custom(function = "auto_matched_only"))]
    pub match_type: MatchType,
    pub is_cross_currency: Option<bool>,
}

impl NotificationHandler for InboxAutoMatched {
    const TYPE: NotificationType = NotificationType::InboxAutoMatched;
    const DEFAULT_PRIORITY: u8 = 5;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        let cross = self
            .is_cross_currency
            .unwrap_or_else(|| self.details.currencies_differ());
        Self::activity(user, self.details.metadata(self.match_type, cross))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InboxNeedsReview {
    #[serde(flatten)]
    #[validate(nested)]
    pub details: MatchDetails,
    #[validate(custom(function = "needs_review_only"))]
    pub match_type: MatchType,
    pub is_cross_currency: Option<bool>,
}

impl NotificationHandler for InboxNeedsReview {
    const TYPE: NotificationType = NotificationType::InboxNeedsReview;
    const DEFAULT_PRIORITY: u8 = 3;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        let cross = self
            .is_cross_currency
            .unwrap_or_else(|| self.details.currencies_differ());
        Self::activity(user, self.details.metadata(self.match_type, cross))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InboxCrossCurrencyMatched {
    #[serde(flatten)]
    #[validate(nested)]
    pub details: MatchDetails,
    pub match_type: MatchType,
}

impl NotificationHandler for InboxCrossCurrencyMatched {
    const TYPE: NotificationType = NotificationType::InboxCrossCurrencyMatched;
    const DEFAULT_PRIORITY: u8 = 5;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(user, self.details.metadata(self.match_type, true))
    }
}
