use super::{NotificationHandler, format_amount};
use crate::models::{
    ActivityInput, Channel, EmailInput, EmailTemplate, NotificationType, Team, UserData,
};
use crate::templates::i18n;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

/// Transactions listed in a "new transactions" email.
const EMAIL_TRANSACTION_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    #[validate(length(min = 1))]
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[validate(length(min = 1))]
    pub currency: String,
    #[validate(length(min = 1))]
    pub date: String,
    pub category: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsCreated {
    #[validate(length(min = 1), nested)]
    pub transactions: Vec<TransactionItem>,
}

impl TransactionsCreated {
    fn date_range(&self) -> (Option<&str>, Option<&str>) {
        let dates = self.transactions.iter().map(|t| t.date.as_str());
        (dates.clone().min(), dates.max())
    }
}

impl NotificationHandler for TransactionsCreated {
    const TYPE: NotificationType = NotificationType::TransactionsCreated;
    const DEFAULT_PRIORITY: u8 = 3;
    const SUPPORTS_EMAIL: bool = true;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        let (from, to) = self.date_range();
        Self::activity(
            user,
            json!({
                "count": self.transactions.len(),
                "dateRange": { "from": from, "to": to },
                "transactionIds": self.transactions.iter().map(|t| &t.id).collect::<Vec<_>>(),
            }),
        )
    }

    fn create_email(&self, user: &UserData, _team: &Team) -> Option<EmailInput> {
        let count = self.transactions.len().to_string();
        let transactions: Vec<_> = self
            .transactions
            .iter()
            .take(EMAIL_TRANSACTION_LIMIT)
            .map(|t| {
                json!({
                    "name": t.name,
                    "amount": format_amount(t.amount),
                    "currency": t.currency,
                    "date": t.date,
                })
            })
            .collect();

        Some(EmailInput::new(
            EmailTemplate::TransactionsCreated,
            i18n::translate(&user.locale, "transactions_created_subject", &[("count", &count)]),
            user,
            json!({ "count": self.transactions.len(), "transactions": transactions }),
        ))
    }
}

/// An export shared with the team's accountant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsExported {
    pub transaction_count: u32,
    #[validate(length(min = 1))]
    pub locale: String,
    #[validate(length(min = 1))]
    pub date_format: String,
    #[validate(url)]
    pub download_link: Option<String>,
    #[validate(email)]
    pub accountant_email: Option<String>,
    pub send_email: Option<bool>,
}

impl NotificationHandler for TransactionsExported {
    const TYPE: NotificationType = NotificationType::TransactionsExported;
    const DEFAULT_PRIORITY: u8 = 6;
    const SUPPORTS_EMAIL: bool = true;
    const CHANNELS: &'static [Channel] = &[Channel::InApp];

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "transactionCount": self.transaction_count,
                "downloadLink": self.download_link,
                "accountantEmail": self.accountant_email,
                "sentToAccountant": self.accountant_email.is_some() && self.send_email.unwrap_or(false),
            }),
        )
    }

    /// Sent to the accountant, in the export's locale. Without an
    /// accountant address or with `sendEmail: false` there is no email.
    fn create_email(&self, user: &UserData, team: &Team) -> Option<EmailInput> {
        if self.send_email == Some(false) {
            return None;
        }
        let accountant = self.accountant_email.as_ref()?;
        let count = self.transaction_count.to_string();

        let mut sender = user.clone();
        sender.locale = self.locale.clone();

        Some(
            EmailInput::new(
                EmailTemplate::TransactionsExported,
                i18n::translate(
                    &self.locale,
                    "transactions_exported_subject",
                    &[("team", &team.name), ("count", &count)],
                ),
                &sender,
                json!({
                    "count": self.transaction_count,
                    "download_link": self.download_link,
                }),
            )
            .to_customer(accountant.clone())
            .with_reply_to(team.email.clone()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsCategorized {
    #[validate(length(min = 1))]
    pub category_slug: String,
    #[validate(length(min = 1))]
    pub transaction_ids: Vec<String>,
}

impl NotificationHandler for TransactionsCategorized {
    const TYPE: NotificationType = NotificationType::TransactionsCategorized;
    const DEFAULT_PRIORITY: u8 = 6;
    const SHOW_IN_SETTINGS: bool = false;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "categorySlug": self.category_slug,
                "transactionIds": self.transaction_ids,
                "count": self.transaction_ids.len(),
            }),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsAssigned {
    #[validate(length(min = 1))]
    pub assigned_user_id: String,
    #[validate(length(min = 1))]
    pub transaction_ids: Vec<String>,
}

impl NotificationHandler for TransactionsAssigned {
    const TYPE: NotificationType = NotificationType::TransactionsAssigned;
    const DEFAULT_PRIORITY: u8 = 5;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "assignedUserId": self.assigned_user_id,
                "transactionIds": self.transaction_ids,
                "count": self.transaction_ids.len(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{team, user};
    use super::*;
    use crate::models::{EmailKind, MemberRole};

    fn transaction(id: &str, date: &str) -> TransactionItem {
        TransactionItem {
            id: id.to_string(),
            name: "Coffee".to_string(),
            amount: 4.5,
            currency: "EUR".to_string(),
            date: date.to_string(),
            category: None,
            status: None,
        }
    }

    #[test]
    fn test_transactions_created_activity_and_email() {
        let team = team();
        let user = user(&team, MemberRole::Member);
        let payload = TransactionsCreated {
            transactions: vec![
                transaction("t1", "2025-03-02"),
                transaction("t2", "2025-03-01"),
            ],
        };

        let activity = payload.create_activity(&user);
        assert_eq!(activity.priority, 3);
        assert_eq!(activity.metadata["count"], 2);
        assert_eq!(activity.metadata["dateRange"]["from"], "2025-03-01");
        assert_eq!(activity.metadata["dateRange"]["to"], "2025-03-02");

        let email = payload.create_email(&user, &team).unwrap();
        assert_eq!(email.kind, EmailKind::Team);
        assert_eq!(email.subject, "You have 2 new transactions");
        assert_eq!(email.data["transactions"][0]["amount"], "4.50");
    }

    #[test]
    fn test_transactions_created_requires_items() {
        let payload = TransactionsCreated {
            transactions: vec![],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_export_email_goes_to_accountant() {
        let team = team();
        let user = user(&team, MemberRole::Owner);
        let payload = TransactionsExported {
            transaction_count: 12,
            locale: "de".to_string(),
            date_format: "dd.MM.yyyy".to_string(),
            download_link: Some("https://files.example.com/export.zip".to_string()),
            accountant_email: Some("accountant@example.com".to_string()),
            send_email: Some(true),
        };

        let email = payload.create_email(&user, &team).unwrap();
        assert_eq!(email.kind, EmailKind::Customer);
        assert_eq!(email.recipient(), "accountant@example.com");
        assert_eq!(email.reply_to.as_deref(), Some("billing@acme.test"));
        assert_eq!(email.subject, "Acme hat 12 Transaktionen mit Ihnen geteilt");
        assert_eq!(email.user.locale, "de");
    }

    #[test]
    fn test_export_without_accountant_has_no_email() {
        let team = team();
        let user = user(&team, MemberRole::Owner);
        let payload = TransactionsExported {
            transaction_count: 1,
            locale: "en".to_string(),
            date_format: "yyyy-MM-dd".to_string(),
            download_link: None,
            accountant_email: None,
            send_email: None,
        };
        assert!(payload.create_email(&user, &team).is_none());

        let opted_out = TransactionsExported {
            accountant_email: Some("accountant@example.com".to_string()),
            send_email: Some(false),
            ..payload
        };
        assert!(opted_out.create_email(&user, &team).is_none());
    }
}
