use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{NotificationError, NotifyResult};
use crate::models::{
    Activity, ActivityInput, Channel, NotificationType, Team, TeamMember,
};

/// Store for teams, memberships, activities and notification settings
///
/// The notification pipeline only reads teams and settings and only ever
/// inserts activities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Get a team by ID
    async fn get_team_by_id(&self, team_id: Uuid) -> NotifyResult<Option<Team>>;

    /// Members of a team, in membership order
    async fn get_team_members(&self, team_id: Uuid) -> NotifyResult<Vec<TeamMember>>;

    /// Persist a new activity
    async fn create_activity(&self, input: ActivityInput) -> NotifyResult<Activity>;

    /// Whether `user_id` wants `notification_type` on `channel`.
    /// Defaults to true when the user has no setting.
    async fn should_send_notification(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        notification_type: NotificationType,
        channel: Channel,
    ) -> NotifyResult<bool>;
}

type SettingKey = (Uuid, Uuid, NotificationType, Channel);

#[derive(Debug, Default)]
struct State {
    teams: HashMap<Uuid, Team>,
    members: HashMap<Uuid, Vec<TeamMember>>,
    activities: Vec<Activity>,
    settings: HashMap<SettingKey, bool>,
    failing_writes: HashSet<Uuid>,
}

/// In-memory implementation of NotificationStore (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryNotificationStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_team(&self, team: Team) {
        let mut state = self.state.write().await;
        state.members.entry(team.id).or_default();
        state.teams.insert(team.id, team);
    }

    pub async fn add_member(&self, team_id: Uuid, member: TeamMember) {
        let mut state = self.state.write().await;
        state.members.entry(team_id).or_default().push(member);
    }

    pub async fn set_notification_setting(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        notification_type: NotificationType,
        channel: Channel,
        enabled: bool,
    ) {
        let mut state = self.state.write().await;
        state
            .settings
            .insert((user_id, team_id, notification_type, channel), enabled);
    }

    /// Make every activity write for `user_id` fail.
    pub async fn fail_writes_for(&self, user_id: Uuid) {
        self.state.write().await.failing_writes.insert(user_id);
    }

    /// All activities written so far, oldest first.
    pub async fn activities(&self) -> Vec<Activity> {
        self.state.read().await.activities.clone()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn get_team_by_id(&self, team_id: Uuid) -> NotifyResult<Option<Team>> {
        let state = self.state.read().await;
        Ok(state.teams.get(&team_id).cloned())
    }

    async fn get_team_members(&self, team_id: Uuid) -> NotifyResult<Vec<TeamMember>> {
        let state = self.state.read().await;
        Ok(state.members.get(&team_id).cloned().unwrap_or_default())
    }

    async fn create_activity(&self, input: ActivityInput) -> NotifyResult<Activity> {
        let mut state = self.state.write().await;

        if let Some(user_id) = input.user_id {
            if state.failing_writes.contains(&user_id) {
                return Err(NotificationError::Database(format!(
                    "activity insert rejected for user {}",
                    user_id
                )));
            }
        }

        let activity = Activity::from_input(input);
        state.activities.push(activity.clone());

        tracing::debug!(activity_id = %activity.id, "Created activity");
        Ok(activity)
    }

    async fn should_send_notification(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        notification_type: NotificationType,
        channel: Channel,
    ) -> NotifyResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .settings
            .get(&(user_id, team_id, notification_type, channel))
            .copied()
            .unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberRole;
    use serde_json::json;

    fn team() -> Team {
        Team {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            inbox_id: None,
            email: None,
        }
    }

    fn member() -> TeamMember {
        TeamMember {
            id: Uuid::new_v4(),
            full_name: Some("Grace Hopper".to_string()),
            email: Some("grace@acme.test".to_string()),
            locale: None,
            role: MemberRole::Member,
        }
    }

    #[tokio::test]
    async fn test_team_and_members() {
        let store = InMemoryNotificationStore::new();
        let team = team();
        store.insert_team(team.clone()).await;
        store.add_member(team.id, member()).await;
        store.add_member(team.id, member()).await;

        assert_eq!(store.get_team_by_id(team.id).await.unwrap(), Some(team.clone()));
        assert_eq!(store.get_team_members(team.id).await.unwrap().len(), 2);
        assert!(store.get_team_by_id(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.get_team_members(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settings_default_to_enabled() {
        let store = InMemoryNotificationStore::new();
        let (user, team) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(
            store
                .should_send_notification(user, team, NotificationType::InvoicePaid, Channel::Email)
                .await
                .unwrap()
        );

        store
            .set_notification_setting(user, team, NotificationType::InvoicePaid, Channel::Email, false)
            .await;

        assert!(
            !store
                .should_send_notification(user, team, NotificationType::InvoicePaid, Channel::Email)
                .await
                .unwrap()
        );
        assert!(
            store
                .should_send_notification(user, team, NotificationType::InvoicePaid, Channel::InApp)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_create_activity_and_failure_injection() {
        let store = InMemoryNotificationStore::new();
        let team_id = Uuid::new_v4();
        let input = ActivityInput {
            team_id,
            user_id: Some(Uuid::new_v4()),
            notification_type: NotificationType::InboxNew,
            source: Default::default(),
            priority: 3,
            group_id: Some(Uuid::new_v4()),
            metadata: json!({ "totalCount": 1 }),
        };

        let activity = store.create_activity(input.clone()).await.unwrap();
        assert_eq!(activity.team_id, team_id);
        assert_eq!(activity.group_id, input.group_id);

        let blocked = Uuid::new_v4();
        store.fail_writes_for(blocked).await;
        let result = store
            .create_activity(ActivityInput {
                user_id: Some(blocked),
                ..input
            })
            .await;
        assert!(matches!(result, Err(NotificationError::Database(_))));
        assert_eq!(store.activities().await.len(), 1);
    }
}
