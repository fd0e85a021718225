use super::{NotificationHandler, format_amount};
use crate::models::{
    ActivityInput, ActivitySource, Channel, EmailInput, EmailTemplate, NotificationType, Team,
    UserData,
};
use crate::templates::i18n;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePaid {
    pub invoice_id: Uuid,
    #[validate(length(min = 1))]
    pub invoice_number: String,
    pub customer_name: Option<String>,
    pub paid_at: Option<String>,
    #[serde(default)]
    pub source: ActivitySource,
}

impl NotificationHandler for InvoicePaid {
    const TYPE: NotificationType = NotificationType::InvoicePaid;
    const DEFAULT_PRIORITY: u8 = 3;
    const SUPPORTS_EMAIL: bool = true;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "invoiceId": self.invoice_id,
                "invoiceNumber": self.invoice_number,
                "customerName": self.customer_name,
                "paidAt": self.paid_at,
            }),
        )
        .with_source(self.source)
    }

    fn create_email(&self, user: &UserData, _team: &Team) -> Option<EmailInput> {
        Some(EmailInput::new(
            EmailTemplate::InvoicePaid,
            i18n::translate(
                &user.locale,
                "invoice_paid_subject",
                &[("number", &self.invoice_number)],
            ),
            user,
            json!({
                "invoice_id": self.invoice_id,
                "invoice_number": self.invoice_number,
                "customer_name": self.customer_name,
            }),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceOverdue {
    pub invoice_id: Uuid,
    #[validate(length(min = 1))]
    pub invoice_number: String,
    #[validate(length(min = 1))]
    pub customer_name: String,
    #[serde(default)]
    pub source: ActivitySource,
}

impl NotificationHandler for InvoiceOverdue {
    const TYPE: NotificationType = NotificationType::InvoiceOverdue;
    const DEFAULT_PRIORITY: u8 = 3;
    const SUPPORTS_EMAIL: bool = true;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "invoiceId": self.invoice_id,
                "invoiceNumber": self.invoice_number,
                "customerName": self.customer_name,
            }),
        )
        .with_source(self.source)
    }

    fn create_email(&self, user: &UserData, _team: &Team) -> Option<EmailInput> {
        Some(EmailInput::new(
            EmailTemplate::InvoiceOverdue,
            i18n::translate(
                &user.locale,
                "invoice_overdue_subject",
                &[("number", &self.invoice_number)],
            ),
            user,
            json!({
                "invoice_id": self.invoice_id,
                "invoice_number": self.invoice_number,
                "customer_name": self.customer_name,
            }),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceScheduled {
    pub invoice_id: Uuid,
    #[validate(length(min = 1))]
    pub invoice_number: String,
    #[validate(length(min = 1))]
    pub scheduled_at: String,
    pub customer_name: Option<String>,
}

impl NotificationHandler for InvoiceScheduled {
    const TYPE: NotificationType = NotificationType::InvoiceScheduled;
    const DEFAULT_PRIORITY: u8 = 6;
    const SHOW_IN_SETTINGS: bool = false;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "invoiceId": self.invoice_id,
                "invoiceNumber": self.invoice_number,
                "scheduledAt": self.scheduled_at,
                "customerName": self.customer_name,
            }),
        )
    }
}

/// Builds the customer facing email shared by `invoice_sent` and
/// `invoice_reminder_sent`. Replies go to the team's contact address.
fn customer_invoice_email(
    template: EmailTemplate,
    subject_key: &str,
    invoice: &CustomerInvoice,
    user: &UserData,
    team: &Team,
) -> Option<EmailInput> {
    let address = invoice.customer_email.as_ref()?;
    Some(
        EmailInput::new(
            template,
            i18n::translate(
                &user.locale,
                subject_key,
                &[("number", &invoice.invoice_number), ("team", &team.name)],
            ),
            user,
            json!({
                "invoice_id": invoice.invoice_id,
                "invoice_number": invoice.invoice_number,
                "customer_name": invoice.customer_name,
                "token": invoice.token,
            }),
        )
        .to_customer(address.clone())
        .with_reply_to(team.email.clone()),
    )
}

/// Invoice delivered to a customer through a tokenized link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInvoice {
    pub invoice_id: Uuid,
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1))]
    pub invoice_number: String,
    #[validate(length(min = 1))]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: Option<String>,
}

impl CustomerInvoice {
    fn metadata(&self) -> serde_json::Value {
        json!({
            "invoiceId": self.invoice_id,
            "invoiceNumber": self.invoice_number,
            "customerName": self.customer_name,
            "customerEmail": self.customer_email,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(transparent)]
pub struct InvoiceSent {
    #[validate(nested)]
    pub invoice: CustomerInvoice,
}

impl NotificationHandler for InvoiceSent {
    const TYPE: NotificationType = NotificationType::InvoiceSent;
    const DEFAULT_PRIORITY: u8 = 5;
    const SUPPORTS_EMAIL: bool = true;
    const CHANNELS: &'static [Channel] = &[Channel::InApp];

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(user, self.invoice.metadata())
    }

    fn create_email(&self, user: &UserData, team: &Team) -> Option<EmailInput> {
        customer_invoice_email(
            EmailTemplate::InvoiceSent,
            "invoice_sent_subject",
            &self.invoice,
            user,
            team,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(transparent)]
pub struct InvoiceReminderSent {
    #[validate(nested)]
    pub invoice: CustomerInvoice,
}

impl NotificationHandler for InvoiceReminderSent {
    const TYPE: NotificationType = NotificationType::InvoiceReminderSent;
    const DEFAULT_PRIORITY: u8 = 5;
    const SUPPORTS_EMAIL: bool = true;
    const CHANNELS: &'static [Channel] = &[Channel::InApp];

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(user, self.invoice.metadata())
    }

    fn create_email(&self, user: &UserData, team: &Team) -> Option<EmailInput> {
        customer_invoice_email(
            EmailTemplate::InvoiceReminder,
            "invoice_reminder_subject",
            &self.invoice,
            user,
            team,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCancelled {
    pub invoice_id: Uuid,
    #[validate(length(min = 1))]
    pub invoice_number: String,
    pub customer_name: Option<String>,
}

impl NotificationHandler for InvoiceCancelled {
    const TYPE: NotificationType = NotificationType::InvoiceCancelled;
    const DEFAULT_PRIORITY: u8 = 6;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "invoiceId": self.invoice_id,
                "invoiceNumber": self.invoice_number,
                "customerName": self.customer_name,
            }),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCreated {
    pub invoice_id: Uuid,
    #[validate(length(min = 1))]
    pub invoice_number: String,
    pub customer_name: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

impl NotificationHandler for InvoiceCreated {
    const TYPE: NotificationType = NotificationType::InvoiceCreated;
    const DEFAULT_PRIORITY: u8 = 7;
    const SHOW_IN_SETTINGS: bool = false;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "invoiceId": self.invoice_id,
                "invoiceNumber": self.invoice_number,
                "customerName": self.customer_name,
                "amount": self.amount.map(format_amount),
                "currency": self.currency,
            }),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRefunded {
    pub invoice_id: Uuid,
    #[validate(length(min = 1))]
    pub invoice_number: String,
    pub customer_name: Option<String>,
    pub refunded_at: Option<String>,
}

impl NotificationHandler for InvoiceRefunded {
    const TYPE: NotificationType = NotificationType::InvoiceRefunded;
    const DEFAULT_PRIORITY: u8 = 5;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "invoiceId": self.invoice_id,
                "invoiceNumber": self.invoice_number,
                "customerName": self.customer_name,
                "refundedAt": self.refunded_at,
            }),
        )
    }
}
