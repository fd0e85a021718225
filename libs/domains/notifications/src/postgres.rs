use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entity::{activities, notification_settings, teams, users, users_on_team},
    error::NotifyResult,
    models::{Activity, ActivityInput, Channel, NotificationType, Team, TeamMember},
    repository::NotificationStore,
};

/// PostgreSQL-backed notification store
pub struct PgNotificationStore {
    db: DatabaseConnection,
}

impl PgNotificationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    #[instrument(skip(self))]
    async fn get_team_by_id(&self, team_id: Uuid) -> NotifyResult<Option<Team>> {
        let model = teams::Entity::find_by_id(team_id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn get_team_members(&self, team_id: Uuid) -> NotifyResult<Vec<TeamMember>> {
        let rows = users_on_team::Entity::find()
            .filter(users_on_team::Column::TeamId.eq(team_id))
            .order_by_asc(users_on_team::Column::CreatedAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;

        // Memberships pointing at a deleted user are ignored
        rows.into_iter()
            .filter_map(|(membership, user)| {
                user.map(|user| users_on_team::into_member(membership, user))
            })
            .collect()
    }

    #[instrument(skip(self, input), fields(team_id = %input.team_id, notification_type = %input.notification_type))]
    async fn create_activity(&self, input: ActivityInput) -> NotifyResult<Activity> {
        let active_model: activities::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;
        Activity::try_from(model)
    }

    #[instrument(skip(self))]
    async fn should_send_notification(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        notification_type: NotificationType,
        channel: Channel,
    ) -> NotifyResult<bool> {
        let setting = notification_settings::Entity::find()
            .filter(notification_settings::Column::UserId.eq(user_id))
            .filter(notification_settings::Column::TeamId.eq(team_id))
            .filter(notification_settings::Column::NotificationType.eq(notification_type.as_ref()))
            .filter(notification_settings::Column::Channel.eq(channel.as_ref()))
            .one(&self.db)
            .await?;

        Ok(setting.map(|s| s.enabled).unwrap_or(true))
    }
}
