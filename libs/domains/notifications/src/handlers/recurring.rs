use super::{NotificationHandler, format_amount};
use crate::models::{ActivityInput, EmailInput, EmailTemplate, NotificationType, Team, UserData};
use crate::templates::i18n;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::Display;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSeriesCompleted {
    pub invoice_id: Uuid,
    #[validate(length(min = 1))]
    pub invoice_number: String,
    pub customer_name: Option<String>,
    pub recurring_id: Uuid,
    pub total_generated: u32,
}

impl NotificationHandler for RecurringSeriesCompleted {
    const TYPE: NotificationType = NotificationType::RecurringSeriesCompleted;
    const DEFAULT_PRIORITY: u8 = 6;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "recurringId": self.recurring_id,
                "invoiceId": self.invoice_id,
                "invoiceNumber": self.invoice_number,
                "customerName": self.customer_name,
                "totalGenerated": self.total_generated,
            }),
        )
    }
}

/// When a recurring series stops generating invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EndType {
    Never,
    OnDate,
    AfterCount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSeriesStarted {
    pub recurring_id: Uuid,
    /// First invoice of the series, when already generated.
    pub invoice_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub customer_name: Option<String>,
    #[validate(length(min = 1))]
    pub frequency: String,
    pub end_type: EndType,
    pub end_date: Option<String>,
    #[validate(range(min = 1))]
    pub end_count: Option<u32>,
}

impl NotificationHandler for RecurringSeriesStarted {
    const TYPE: NotificationType = NotificationType::RecurringSeriesStarted;
    const DEFAULT_PRIORITY: u8 = 6;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "recurringId": self.recurring_id,
                "invoiceId": self.invoice_id,
                "invoiceNumber": self.invoice_number,
                "customerName": self.customer_name,
                "frequency": self.frequency,
                "endType": self.end_type,
                "endDate": self.end_date,
                "endCount": self.end_count,
            }),
        )
    }

    fn check(&self) -> Result<(), String> {
        match self.end_type {
            EndType::OnDate if self.end_date.is_none() => {
                Err("endDate is required when endType is on_date".to_string())
            }
            EndType::AfterCount if self.end_count.is_none() => {
                Err("endCount is required when endType is after_count".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PauseReason {
    #[default]
    Manual,
    AutoFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSeriesPaused {
    pub recurring_id: Uuid,
    pub customer_name: Option<String>,
    #[serde(default)]
    pub reason: PauseReason,
    pub failure_count: Option<u32>,
}

impl NotificationHandler for RecurringSeriesPaused {
    const TYPE: NotificationType = NotificationType::RecurringSeriesPaused;
    const DEFAULT_PRIORITY: u8 = 3;
    const SUPPORTS_EMAIL: bool = true;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "recurringId": self.recurring_id,
                "customerName": self.customer_name,
                "reason": self.reason,
                "failureCount": self.failure_count,
            }),
        )
    }

    /// Owners are only emailed when the series was paused automatically.
    fn create_email(&self, user: &UserData, _team: &Team) -> Option<EmailInput> {
        if self.reason != PauseReason::AutoFailure {
            return None;
        }
        Some(
            EmailInput::new(
                EmailTemplate::RecurringSeriesPaused,
                i18n::translate(&user.locale, "recurring_paused_subject", &[]),
                user,
                json!({
                    "recurring_id": self.recurring_id,
                    "customer_name": self.customer_name,
                    "failure_count": self.failure_count,
                }),
            )
            .owners_only(),
        )
    }
}

/// One invoice in the "upcoming" digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingInvoice {
    pub recurring_id: Uuid,
    pub customer_name: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    #[validate(length(min = 1))]
    pub scheduled_at: String,
    #[validate(length(min = 1))]
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecurringInvoiceUpcoming {
    #[validate(length(min = 1), nested)]
    pub invoices: Vec<UpcomingInvoice>,
    pub count: u32,
}

impl NotificationHandler for RecurringInvoiceUpcoming {
    const TYPE: NotificationType = NotificationType::RecurringInvoiceUpcoming;
    const DEFAULT_PRIORITY: u8 = 3;
    const SUPPORTS_EMAIL: bool = true;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "count": self.count,
                "recurringIds": self.invoices.iter().map(|i| i.recurring_id).collect::<Vec<_>>(),
            }),
        )
    }

    fn create_email(&self, user: &UserData, _team: &Team) -> Option<EmailInput> {
        let count = self.count.to_string();
        let invoices: Vec<_> = self
            .invoices
            .iter()
            .map(|i| {
                json!({
                    "customer_name": i.customer_name,
                    "amount": i.amount.map(format_amount),
                    "currency": i.currency,
                    "scheduled_at": i.scheduled_at,
                })
            })
            .collect();

        Some(
            EmailInput::new(
                EmailTemplate::RecurringInvoiceUpcoming,
                i18n::translate(&user.locale, "recurring_upcoming_subject", &[("count", &count)]),
                user,
                json!({ "count": self.count, "invoices": invoices }),
            )
            .owners_only(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{team, user};
    use super::*;
    use crate::models::{EmailKind, MemberRole};

    #[test]
    fn test_series_started_end_rules() {
        let started: RecurringSeriesStarted = serde_json::from_value(json!({
            "recurringId": "3a4b5c6d-7e8f-4a0b-9c1d-2e3f4a5b6c7d",
            "frequency": "monthly_date",
            "endType": "after_count"
        }))
        .unwrap();
        assert!(started.check().is_err());

        let started = RecurringSeriesStarted {
            end_count: Some(12),
            ..started
        };
        assert!(started.check().is_ok());
        assert!(started.validate().is_ok());
    }

    #[test]
    fn test_paused_emails_owners_on_auto_failure_only() {
        let team = team();
        let user = user(&team, MemberRole::Owner);
        let manual: RecurringSeriesPaused = serde_json::from_value(json!({
            "recurringId": "3a4b5c6d-7e8f-4a0b-9c1d-2e3f4a5b6c7d"
        }))
        .unwrap();
        assert_eq!(manual.reason, PauseReason::Manual);
        assert!(manual.create_email(&user, &team).is_none());

        let auto = RecurringSeriesPaused {
            reason: PauseReason::AutoFailure,
            failure_count: Some(3),
            ..manual
        };
        let email = auto.create_email(&user, &team).unwrap();
        assert_eq!(email.kind, EmailKind::Owners);
        assert_eq!(email.data["failure_count"], 3);
    }

    #[test]
    fn test_upcoming_digest() {
        let team = team();
        let user = user(&team, MemberRole::Owner);
        let upcoming: RecurringInvoiceUpcoming = serde_json::from_value(json!({
            "count": 2,
            "invoices": [
                {
                    "recurringId": "3a4b5c6d-7e8f-4a0b-9c1d-2e3f4a5b6c7d",
                    "customerName": "Globex",
                    "amount": 250,
                    "currency": "EUR",
                    "scheduledAt": "2025-04-01",
                    "frequency": "monthly_date"
                },
                {
                    "recurringId": "4b5c6d7e-8f9a-4b1c-8d2e-3f4a5b6c7d8e",
                    "scheduledAt": "2025-04-01",
                    "frequency": "weekly"
                }
            ]
        }))
        .unwrap();

        let activity = upcoming.create_activity(&user);
        assert_eq!(activity.metadata["recurringIds"].as_array().unwrap().len(), 2);

        let email = upcoming.create_email(&user, &team).unwrap();
        assert_eq!(email.kind, EmailKind::Owners);
        assert_eq!(email.subject, "2 recurring invoices will be sent tomorrow");
        assert_eq!(email.data["invoices"][0]["amount"], "250.00");
        assert!(email.data["invoices"][1]["amount"].is_null());
    }
}
