//! Notification handlers.
//!
//! One payload type per [`NotificationType`]. Each payload knows how to
//! validate itself and how to turn into an activity (and optionally an
//! email) for a single recipient. Dispatch is a `match` over the closed
//! enum, so a type without a handler does not compile.

mod documents;
mod inbox;
mod insights;
mod invoices;
mod recurring;
mod transactions;

pub use documents::{DocumentProcessed, DocumentUploaded};
pub use inbox::{
    InboxAutoMatched, InboxCrossCurrencyMatched, InboxNeedsReview, InboxNew, InboxType,
    MatchDetails, MatchType,
};
pub use insights::{InsightReady, PeriodType};
pub use invoices::{
    CustomerInvoice, InvoiceCancelled, InvoiceCreated, InvoiceOverdue, InvoicePaid, InvoiceRefunded,
    InvoiceReminderSent, InvoiceScheduled, InvoiceSent,
};
pub use recurring::{
    EndType, PauseReason, RecurringInvoiceUpcoming, RecurringSeriesCompleted,
    RecurringSeriesPaused, RecurringSeriesStarted, UpcomingInvoice,
};
pub use transactions::{
    TransactionItem, TransactionsAssigned, TransactionsCategorized, TransactionsCreated,
    TransactionsExported,
};

use crate::error::{NotificationError, NotifyResult};
use crate::models::{ActivityInput, Channel, EmailInput, NotificationType, Team, UserData};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::debug;
use validator::Validate;

/// Behaviour of one notification type.
///
/// Both builders are pure: no I/O, no clock reads beyond what the payload
/// carries.
pub trait NotificationHandler: DeserializeOwned + Validate + Send + Sync {
    const TYPE: NotificationType;

    /// Priority of the activity before preferences and overrides apply.
    const DEFAULT_PRIORITY: u8;

    /// Whether [`create_email`](Self::create_email) can return an email.
    const SUPPORTS_EMAIL: bool = false;

    /// Whether users can toggle this type on their settings page.
    const SHOW_IN_SETTINGS: bool = true;

    /// Channels a member can turn on or off for this type.
    const CHANNELS: &'static [Channel] = if Self::SUPPORTS_EMAIL {
        &[Channel::InApp, Channel::Email]
    } else {
        &[Channel::InApp]
    };

    fn create_activity(&self, user: &UserData) -> ActivityInput;

    fn create_email(&self, _user: &UserData, _team: &Team) -> Option<EmailInput> {
        None
    }

    /// Rules spanning several fields, run after the field validators.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }

    /// Activity for `user` with this type and its default priority.
    fn activity(user: &UserData, metadata: Value) -> ActivityInput
    where
        Self: Sized,
    {
        ActivityInput::new(Self::TYPE, user, Self::DEFAULT_PRIORITY, metadata)
    }
}

fn parse<T: NotificationHandler>(raw: Value) -> NotifyResult<T> {
    let payload: T =
        serde_json::from_value(raw).map_err(|e| NotificationError::schema(T::TYPE, e))?;
    payload
        .validate()
        .map_err(|e| NotificationError::schema(T::TYPE, e))?;
    payload
        .check()
        .map_err(|e| NotificationError::schema(T::TYPE, e))?;
    Ok(payload)
}

macro_rules! handlers {
    ($($variant:ident),* $(,)?) => {
        /// A validated event payload, tagged by its notification type.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Payload {
            $($variant($variant),)*
        }

        impl Payload {
            /// Deserialize and validate `raw` against the schema of
            /// `notification_type`.
            pub fn parse(notification_type: NotificationType, raw: Value) -> NotifyResult<Self> {
                match notification_type {
                    $(NotificationType::$variant => parse::<$variant>(raw).map(Payload::$variant),)*
                }
            }

            pub fn notification_type(&self) -> NotificationType {
                match self {
                    $(Payload::$variant(_) => NotificationType::$variant,)*
                }
            }

            pub fn create_activity(&self, user: &UserData) -> ActivityInput {
                match self {
                    $(Payload::$variant(p) => p.create_activity(user),)*
                }
            }

            pub fn create_email(&self, user: &UserData, team: &Team) -> Option<EmailInput> {
                match self {
                    $(Payload::$variant(p) => p.create_email(user, team),)*
                }
            }
        }

        impl Handler {
            /// Handler registered for `notification_type`.
            pub fn for_type(notification_type: NotificationType) -> Self {
                match notification_type {
                    $(NotificationType::$variant => Handler {
                        notification_type,
                        default_priority: <$variant as NotificationHandler>::DEFAULT_PRIORITY,
                        supports_email: <$variant as NotificationHandler>::SUPPORTS_EMAIL,
                        show_in_settings: <$variant as NotificationHandler>::SHOW_IN_SETTINGS,
                        channels: <$variant as NotificationHandler>::CHANNELS,
                    },)*
                }
            }
        }
    };
}

handlers!(
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
);

/// Registry entry for one notification type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handler {
    pub notification_type: NotificationType,
    pub default_priority: u8,
    pub supports_email: bool,
    pub show_in_settings: bool,
    pub channels: &'static [Channel],
}

impl Handler {
    /// Resolve a type tag such as `"invoice_paid"`.
    pub fn lookup(tag: &str) -> NotifyResult<Self> {
        let notification_type = NotificationType::from_str(tag).map_err(|_| {
            debug!(tag = %tag, "No handler registered");
            NotificationError::UnknownNotificationType(tag.to_string())
        })?;
        Ok(Self::for_type(notification_type))
    }

    pub fn has_channel(&self, channel: Channel) -> bool {
        self.channels.contains(&channel)
    }

    /// Validate a raw payload for this handler's type.
    pub fn validate(&self, raw: Value) -> NotifyResult<Payload> {
        Payload::parse(self.notification_type, raw)
    }
}

/// Every registered handler, in catalogue order.
pub fn all() -> Vec<Handler> {
    NotificationType::iter().map(Handler::for_type).collect()
}

/// Handlers users can configure, in catalogue order.
pub fn settings_catalogue() -> Vec<Handler> {
    all().into_iter().filter(|h| h.show_in_settings).collect()
}

/// Validate `raw` against the schema of `notification_type`.
pub fn validate(notification_type: NotificationType, raw: Value) -> NotifyResult<Payload> {
    Payload::parse(notification_type, raw)
}

/// Format a money amount for email copy.
pub(crate) fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}


#[cfg(test)]
mod tests {
    use super::test_support::{team, user};
    use super::*;
    use crate::models::MemberRole;
    use serde_json::json;

    #[test]
    fn test_lookup_known_and_unknown() {
        let handler = Handler::lookup("invoice_paid").unwrap();
        assert_eq!(handler.notification_type, NotificationType::InvoicePaid);
        assert!(handler.supports_email);

        let err = Handler::lookup("not_a_type").unwrap_err();
        assert!(matches!(err, NotificationError::UnknownNotificationType(t) if t == "not_a_type"));
    }

    #[test]
    fn test_every_type_has_a_handler() {
        let handlers = all();
        assert_eq!(handlers.len(), NotificationType::iter().count());
        for handler in handlers {
            assert!((1..=10).contains(&handler.default_priority));
        }
    }

    #[test]
    fn test_settings_catalogue() {
        let catalogue = settings_catalogue();
        assert!(catalogue.iter().all(|h| h.show_in_settings));
        assert!(catalogue.iter().all(|h| h.has_channel(Channel::InApp)));
        assert!(
            !catalogue
                .iter()
                .any(|h| h.notification_type == NotificationType::DocumentProcessed)
        );

        let paid = Handler::lookup("invoice_paid").unwrap();
        assert_eq!(paid.channels, &[Channel::InApp, Channel::Email]);

        // Customer emails are not a member preference
        let sent = Handler::lookup("invoice_sent").unwrap();
        assert!(sent.supports_email);
        assert!(!sent.has_channel(Channel::Email));

        let uploaded = Handler::lookup("document_uploaded").unwrap();
        assert!(!uploaded.show_in_settings);
        assert_eq!(uploaded.channels, &[Channel::InApp]);
    }

    #[test]
    fn test_validate_invoice_paid() {
        let payload = validate(
            NotificationType::InvoicePaid,
            json!({
                "invoiceId": "6f1d7b8e-2a43-4c55-9d1e-3b0f2c1a9e77",
                "invoiceNumber": "INV-001",
                "customerName": "Globex",
                "somethingElse": true
            }),
        )
        .unwrap();
        assert_eq!(payload.notification_type(), NotificationType::InvoicePaid);
    }

    #[test]
    fn test_validate_missing_required_field() {
        let err = validate(
            NotificationType::InvoicePaid,
            json!({ "invoiceNumber": "INV-001" }),
        )
        .unwrap_err();
        match err {
            NotificationError::SchemaValidation {
                notification_type,
                message,
            } => {
                assert_eq!(notification_type, "invoice_paid");
                assert!(message.contains("invoiceId"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_uuid_and_empty_strings() {
        assert!(
            validate(
                NotificationType::InvoicePaid,
                json!({ "invoiceId": "not-a-uuid", "invoiceNumber": "INV-001" }),
            )
            .is_err()
        );
        assert!(
            validate(
                NotificationType::InvoicePaid,
                json!({
                    "invoiceId": "6f1d7b8e-2a43-4c55-9d1e-3b0f2c1a9e77",
                    "invoiceNumber": ""
                }),
            )
            .is_err()
        );
    }

    #[test]
    fn test_payload_builders_dispatch() {
        let team = team();
        let user = user(&team, MemberRole::Owner);
        let payload = validate(
            NotificationType::InboxNew,
            json!({ "totalCount": 4, "inboxType": "email" }),
        )
        .unwrap();

        let activity = payload.create_activity(&user);
        assert_eq!(activity.notification_type, NotificationType::InboxNew);
        assert_eq!(activity.user_id, Some(user.id));
        assert_eq!(activity.team_id, team.id);

        let email = payload.create_email(&user, &team).unwrap();
        assert_eq!(email.recipient(), "ada@acme.test");
    }

    #[test]
    fn test_handler_without_email() {
        let team = team();
        let user = user(&team, MemberRole::Member);
        let handler = Handler::lookup("document_uploaded").unwrap();
        assert!(!handler.supports_email);

        let payload = handler
            .validate(json!({
                "fileName": "receipt.pdf",
                "filePath": ["inbox", "receipt.pdf"],
                "mimeType": "application/pdf"
            }))
            .unwrap();
        assert!(payload.create_email(&user, &team).is_none());
    }
}
