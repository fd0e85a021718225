//! Error types for the notifications domain.

use thiserror::Error;
use uuid::Uuid;

/// Result type for notification operations.
pub type NotifyResult<T> = Result<T, NotificationError>;

/// Errors that can occur while dispatching a notification.
///
/// The first three variants abort a `create` call before any side effect.
/// The rest surface from individual recipients or from the email batch and
/// are usually folded into the counts of a `NotificationResult`.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// No handler is registered for the type tag.
    #[error("Unknown notification type: {0}")]
    UnknownNotificationType(String),

    /// The team id does not exist.
    #[error("Team not found: {0}")]
    TeamNotFound(Uuid),

    /// The event payload does not match the schema of its type.
    #[error("Invalid payload for {notification_type}: {message}")]
    SchemaValidation {
        notification_type: String,
        message: String,
    },

    /// A handler produced an activity that violates the activity schema.
    #[error("Invalid activity: {0}")]
    InvalidActivity(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Email provider error.
    #[error("Email provider error: {0}")]
    Provider(String),

    /// Template rendering error.
    #[error("Template rendering error: {0}")]
    Template(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotificationError {
    pub fn schema(notification_type: impl ToString, message: impl ToString) -> Self {
        NotificationError::SchemaValidation {
            notification_type: notification_type.to_string(),
            message: message.to_string(),
        }
    }

    /// True for the errors that reject the whole event.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NotificationError::UnknownNotificationType(_)
                | NotificationError::TeamNotFound(_)
                | NotificationError::SchemaValidation { .. }
        )
    }
}

impl From<sea_orm::DbErr> for NotificationError {
    fn from(err: sea_orm::DbErr) -> Self {
        NotificationError::Database(err.to_string())
    }
}

impl From<handlebars::RenderError> for NotificationError {
    fn from(err: handlebars::RenderError) -> Self {
        NotificationError::Template(err.to_string())
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Provider(err.to_string())
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::Internal(format!("JSON serialization error: {}", err))
    }
}

impl From<validator::ValidationErrors> for NotificationError {
    fn from(err: validator::ValidationErrors) -> Self {
        NotificationError::InvalidActivity(err.to_string())
    }
}

impl From<core_config::ConfigError> for NotificationError {
    fn from(err: core_config::ConfigError) -> Self {
        NotificationError::Config(err.to_string())
    }
}
