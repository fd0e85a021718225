//! Notifications Domain
//!
//! Fans a business event out to every member of a team: one in-app
//! activity per recipient and, when requested, one email per recipient
//! that has not opted out.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     Caller      │  ← create(type, team_id, payload, options)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ Handler lookup  │  ← type tag → handler, payload schema check
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Recipients    │  ← team + members from the store
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Activities    │  ← priority resolution, one write per member
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Email gate    │  ← per-user settings, templates, one batch call
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ Email Provider  │  ← Resend, Mock
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::{
//!     NotificationOptions, NotificationServiceConfig, Notifications, PgNotificationStore,
//!     ResendProvider,
//! };
//!
//! let store = Arc::new(PgNotificationStore::new(db));
//! let provider = Arc::new(ResendProvider::new(&email_config));
//! let notifications = Notifications::new(
//!     store,
//!     provider,
//!     NotificationServiceConfig::from_email_config(&email_config),
//! )?;
//!
//! let result = notifications
//!     .create("invoice_paid", team_id, payload, NotificationOptions::with_email())
//!     .await?;
//! ```

pub mod activities;
pub mod email;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod priority;
pub mod providers;
pub mod recipients;
pub mod repository;
pub mod service;
pub mod templates;

// Re-export commonly used types
pub use email::{EmailSettings, EnvelopeOverrides};
pub use error::{NotificationError, NotifyResult};
pub use handlers::{Handler, Payload};
pub use models::{
    Activity, ActivityInput, Channel, EmailCounts, MemberRole, NotificationOptions,
    NotificationResult, NotificationType, Team, TeamMember, UserData,
};
pub use postgres::PgNotificationStore;
pub use priority::resolve_priority;
pub use providers::{EmailProvider, MockEmailProvider, ResendProvider};
pub use repository::{InMemoryNotificationStore, NotificationStore};
pub use service::{NotificationServiceConfig, Notifications};
pub use templates::TemplateEngine;
