//! Per-recipient activity writes.

use crate::error::NotifyResult;
use crate::handlers::Payload;
use crate::models::{Activity, Channel, UserData};
use crate::priority::resolve_priority;
use crate::repository::NotificationStore;
use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

/// Outcome of writing one event's activities.
#[derive(Debug, Clone, Default)]
pub struct WriteSummary {
    pub activities: Vec<Activity>,
    pub failed: usize,
}

impl WriteSummary {
    pub fn written(&self) -> usize {
        self.activities.len()
    }
}

/// Write one activity per recipient, concurrently.
///
/// Writes are independent: a failed recipient is logged and left out of
/// the summary, the others are kept. Nothing is retried.
pub async fn write_activities<S>(
    store: &S,
    payload: &Payload,
    users: &[UserData],
    group_id: Uuid,
    priority_override: Option<u8>,
) -> WriteSummary
where
    S: NotificationStore + ?Sized,
{
    let writes = users
        .iter()
        .map(|user| write_one(store, payload, user, group_id, priority_override));

    let mut summary = WriteSummary::default();
    for (user, result) in users.iter().zip(join_all(writes).await) {
        match result {
            Ok(activity) => summary.activities.push(activity),
            Err(e) => {
                warn!(
                    user_id = %user.id,
                    team_id = %user.team_id,
                    notification_type = %payload.notification_type(),
                    error = %e,
                    "Failed to write activity"
                );
                summary.failed += 1;
            }
        }
    }
    summary
}

async fn write_one<S>(
    store: &S,
    payload: &Payload,
    user: &UserData,
    group_id: Uuid,
    priority_override: Option<u8>,
) -> NotifyResult<Activity>
where
    S: NotificationStore + ?Sized,
{
    let mut input = payload.create_activity(user);

    let in_app_enabled = store
        .should_send_notification(user.id, user.team_id, input.notification_type, Channel::InApp)
        .await?;

    input.priority = resolve_priority(input.priority, in_app_enabled, priority_override);
    input.group_id = Some(group_id);
    input.validate()?;

    let activity = store.create_activity(input).await?;
    debug!(
        activity_id = %activity.id,
        user_id = %user.id,
        priority = activity.priority,
        "Activity written"
    );
    Ok(activity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::handlers::{self, test_support};
    use crate::models::{Activity, MemberRole, NotificationType};
    use crate::repository::MockNotificationStore;
    use serde_json::json;

    fn invoice_paid() -> Payload {
        handlers::validate(
            NotificationType::InvoicePaid,
            json!({
                "invoiceId": "9d8f0b1e-4a1c-4c0e-8f4e-2b6a1d3c5e7f",
                "invoiceNumber": "INV-001"
            }),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_demotes_muted_recipient_and_stamps_group() {
        let team = test_support::team();
        let loud = test_support::user(&team, MemberRole::Owner);
        let muted = test_support::user(&team, MemberRole::Member);
        let muted_id = muted.id;
        let group_id = Uuid::new_v4();

        let mut store = MockNotificationStore::new();
        store
            .expect_should_send_notification()
            .times(2)
            .returning(move |user_id, _, _, channel| {
                assert_eq!(channel, Channel::InApp);
                Ok(user_id != muted_id)
            });
        store
            .expect_create_activity()
            .times(2)
            .returning(|input| Ok(Activity::from_input(input)));

        let summary =
            write_activities(&store, &invoice_paid(), &[loud.clone(), muted], group_id, None).await;

        assert_eq!(summary.written(), 2);
        assert_eq!(summary.failed, 0);
        for activity in &summary.activities {
            assert_eq!(activity.group_id, Some(group_id));
            let expected = if activity.user_id == Some(loud.id) { 3 } else { 7 };
            assert_eq!(activity.priority, expected);
        }
    }

    #[tokio::test]
    async fn test_override_applies_to_everyone() {
        let team = test_support::team();
        let users = vec![
            test_support::user(&team, MemberRole::Owner),
            test_support::user(&team, MemberRole::Member),
        ];

        let mut store = MockNotificationStore::new();
        store
            .expect_should_send_notification()
            .returning(|_, _, _, _| Ok(false));
        store
            .expect_create_activity()
            .returning(|input| Ok(Activity::from_input(input)));

        let summary =
            write_activities(&store, &invoice_paid(), &users, Uuid::new_v4(), Some(1)).await;
        assert!(summary.activities.iter().all(|a| a.priority == 1));
    }

    #[tokio::test]
    async fn test_failed_write_is_excluded() {
        let team = test_support::team();
        let ok = test_support::user(&team, MemberRole::Owner);
        let broken = test_support::user(&team, MemberRole::Member);
        let broken_id = broken.id;

        let mut store = MockNotificationStore::new();
        store
            .expect_should_send_notification()
            .returning(|_, _, _, _| Ok(true));
        store.expect_create_activity().returning(move |input| {
            if input.user_id == Some(broken_id) {
                Err(NotificationError::Database("connection reset".to_string()))
            } else {
                Ok(Activity::from_input(input))
            }
        });

        let summary =
            write_activities(&store, &invoice_paid(), &[ok.clone(), broken], Uuid::new_v4(), None)
                .await;
        assert_eq!(summary.written(), 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.activities[0].user_id, Some(ok.id));
    }

    #[tokio::test]
    async fn test_preference_error_skips_write() {
        let team = test_support::team();
        let user = test_support::user(&team, MemberRole::Member);

        let mut store = MockNotificationStore::new();
        store
            .expect_should_send_notification()
            .returning(|_, _, _, _| Err(NotificationError::Database("timeout".to_string())));
        store.expect_create_activity().never();

        let summary =
            write_activities(&store, &invoice_paid(), &[user], Uuid::new_v4(), None).await;
        assert_eq!(summary.written(), 0);
        assert_eq!(summary.failed, 1);
    }
}
