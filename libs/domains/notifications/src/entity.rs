use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

use crate::error::NotificationError;

fn unknown_value(column: &str, value: &str) -> NotificationError {
    NotificationError::Database(format!("unexpected {} value '{}'", column, value))
}

// ===== Teams Entity =====

pub mod teams {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "teams")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(column_type = "String(StringLen::N(255))")]
        pub name: String,
        #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
        pub inbox_id: Option<String>,
        #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
        pub email: Option<String>,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::users_on_team::Entity")]
        Members,
    }

    impl Related<super::users_on_team::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Members.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Team {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                name: model.name,
                inbox_id: model.inbox_id,
                email: model.email,
            }
        }
    }
}

// ===== Users Entity =====

pub mod users {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
        pub full_name: Option<String>,
        #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
        pub email: Option<String>,
        #[sea_orm(column_type = "String(StringLen::N(10))", nullable)]
        pub locale: Option<String>,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::users_on_team::Entity")]
        Memberships,
    }

    impl Related<super::users_on_team::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Memberships.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

// ===== Team Membership Entity =====

pub mod users_on_team {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "users_on_team")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub user_id: Uuid,
        pub team_id: Uuid,
        #[sea_orm(column_type = "String(StringLen::N(20))")]
        pub role: String,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::users::Entity",
            from = "Column::UserId",
            to = "super::users::Column::Id"
        )]
        User,
        #[sea_orm(
            belongs_to = "super::teams::Entity",
            from = "Column::TeamId",
            to = "super::teams::Column::Id"
        )]
        Team,
    }

    impl Related<super::users::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::User.def()
        }
    }

    impl Related<super::teams::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Team.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    /// Join a membership row with its user.
    pub fn into_member(
        membership: Model,
        user: super::users::Model,
    ) -> crate::error::NotifyResult<crate::models::TeamMember> {
        Ok(crate::models::TeamMember {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            locale: user.locale,
            role: membership
                .role
                .parse()
                .map_err(|_| unknown_value("role", &membership.role))?,
        })
    }
}

// ===== Activities Entity =====

pub mod activities {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "activities")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub created_at: DateTimeWithTimeZone,
        pub team_id: Uuid,
        pub user_id: Option<Uuid>,
        #[sea_orm(column_name = "type", column_type = "String(StringLen::N(64))")]
        pub notification_type: String,
        #[sea_orm(column_type = "String(StringLen::N(20))")]
        pub source: String,
        pub priority: i16,
        pub group_id: Option<Uuid>,
        #[sea_orm(column_type = "JsonBinary")]
        pub metadata: serde_json::Value,
        #[sea_orm(column_type = "String(StringLen::N(20))")]
        pub status: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::teams::Entity",
            from = "Column::TeamId",
            to = "super::teams::Column::Id"
        )]
        Team,
    }

    impl Related<super::teams::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Team.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl TryFrom<Model> for crate::models::Activity {
        type Error = NotificationError;

        fn try_from(model: Model) -> Result<Self, Self::Error> {
            Ok(Self {
                id: model.id,
                created_at: model.created_at.into(),
                team_id: model.team_id,
                user_id: model.user_id,
                notification_type: model
                    .notification_type
                    .parse()
                    .map_err(|_| unknown_value("type", &model.notification_type))?,
                source: model
                    .source
                    .parse()
                    .map_err(|_| unknown_value("source", &model.source))?,
                priority: u8::try_from(model.priority)
                    .map_err(|_| unknown_value("priority", &model.priority.to_string()))?,
                group_id: model.group_id,
                metadata: model.metadata,
                status: model
                    .status
                    .parse()
                    .map_err(|_| unknown_value("status", &model.status))?,
            })
        }
    }

    impl From<crate::models::ActivityInput> for ActiveModel {
        fn from(input: crate::models::ActivityInput) -> Self {
            ActiveModel {
                id: Set(Uuid::now_v7()),
                created_at: Set(chrono::Utc::now().into()),
                team_id: Set(input.team_id),
                user_id: Set(input.user_id),
                notification_type: Set(input.notification_type.to_string()),
                source: Set(input.source.to_string()),
                priority: Set(i16::from(input.priority)),
                group_id: Set(input.group_id),
                metadata: Set(input.metadata),
                status: Set(crate::models::ActivityStatus::Unread.to_string()),
            }
        }
    }
}

// ===== Notification Settings Entity =====

pub mod notification_settings {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "notification_settings")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub user_id: Uuid,
        pub team_id: Uuid,
        #[sea_orm(column_type = "String(StringLen::N(64))")]
        pub notification_type: String,
        #[sea_orm(column_type = "String(StringLen::N(20))")]
        pub channel: String,
        pub enabled: bool,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Activity, ActivityInput, ActivitySource, ActivityStatus, MemberRole, NotificationType,
    };
    use serde_json::json;

    fn activity_row(notification_type: &str, priority: i16) -> activities::Model {
        activities::Model {
            id: Uuid::now_v7(),
            created_at: chrono::Utc::now().into(),
            team_id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            notification_type: notification_type.to_string(),
            source: "user".to_string(),
            priority,
            group_id: None,
            metadata: json!({ "invoiceNumber": "INV-7" }),
            status: "read".to_string(),
        }
    }

    #[test]
    fn test_activity_from_row() {
        let activity = Activity::try_from(activity_row("invoice_paid", 3)).unwrap();
        assert_eq!(activity.notification_type, NotificationType::InvoicePaid);
        assert_eq!(activity.source, ActivitySource::User);
        assert_eq!(activity.status, ActivityStatus::Read);
        assert_eq!(activity.priority, 3);
    }

    #[test]
    fn test_activity_from_row_rejects_unknown_type() {
        let err = Activity::try_from(activity_row("deal_paid", 3)).unwrap_err();
        assert!(matches!(err, NotificationError::Database(msg) if msg.contains("deal_paid")));

        assert!(Activity::try_from(activity_row("invoice_paid", -1)).is_err());
    }

    #[test]
    fn test_active_model_from_input() {
        let input = ActivityInput {
            team_id: Uuid::new_v4(),
            user_id: None,
            notification_type: NotificationType::InboxNew,
            source: ActivitySource::System,
            priority: 7,
            group_id: Some(Uuid::new_v4()),
            metadata: json!({}),
        };

        let model: activities::ActiveModel = input.clone().into();
        assert_eq!(model.notification_type, Set("inbox_new".to_string()));
        assert_eq!(model.priority, Set(7));
        assert_eq!(model.status, Set("unread".to_string()));
        assert_eq!(model.group_id, Set(input.group_id));
    }

    #[test]
    fn test_activity_from_row_rejects_unknown_source_and_status() {
        let mut row = activity_row("invoice_paid", 3);
        row.source = "cron".to_string();
        let err = Activity::try_from(row).unwrap_err();
        assert!(matches!(err, NotificationError::Database(msg) if msg.contains("source") && msg.contains("cron")));

        let mut row = activity_row("invoice_paid", 3);
        row.status = "snoozed".to_string();
        let err = Activity::try_from(row).unwrap_err();
        assert!(matches!(err, NotificationError::Database(msg) if msg.contains("status") && msg.contains("snoozed")));
    }

    fn member_rows(role: &str) -> (users_on_team::Model, users::Model) {
        let user = users::Model {
            id: Uuid::new_v4(),
            full_name: Some("Grace Hopper".to_string()),
            email: Some("grace@acme.test".to_string()),
            locale: None,
            created_at: chrono::Utc::now().into(),
        };
        let membership = users_on_team::Model {
            id: Uuid::new_v4(),
            user_id: user.id,
            team_id: Uuid::new_v4(),
            role: role.to_string(),
            created_at: chrono::Utc::now().into(),
        };
        (membership, user)
    }

    #[test]
    fn test_member_from_rows() {
        let (membership, user) = member_rows("owner");
        let member = users_on_team::into_member(membership, user.clone()).unwrap();
        assert_eq!(member.id, user.id);
        assert_eq!(member.role, MemberRole::Owner);
    }

    #[test]
    fn test_member_rejects_unknown_role() {
        let (membership, user) = member_rows("admin");
        let err = users_on_team::into_member(membership, user).unwrap_err();
        assert!(matches!(err, NotificationError::Database(msg) if msg.contains("role") && msg.contains("admin")));
    }
}
