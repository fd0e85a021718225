//! Team to recipient expansion.

use crate::error::{NotificationError, NotifyResult};
use crate::models::{Team, UserData};
use crate::repository::NotificationStore;
use tracing::debug;
use uuid::Uuid;

/// A team and the members that receive its notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipients {
    pub team: Team,
    pub users: Vec<UserData>,
}

impl Recipients {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn owners(&self) -> impl Iterator<Item = &UserData> {
        self.users.iter().filter(|u| u.is_owner())
    }
}

/// Fetch the team and its members concurrently.
pub async fn resolve<S>(store: &S, team_id: Uuid) -> NotifyResult<Recipients>
where
    S: NotificationStore + ?Sized,
{
    let (team, members) = tokio::try_join!(
        store.get_team_by_id(team_id),
        store.get_team_members(team_id)
    )?;

    let team = team.ok_or(NotificationError::TeamNotFound(team_id))?;
    let users = members
        .into_iter()
        .map(|member| UserData::from_member(&team, member))
        .collect::<Vec<_>>();

    debug!(team_id = %team_id, members = users.len(), "Resolved recipients");
    Ok(Recipients { team, users })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberRole, TeamMember};
    use crate::repository::MockNotificationStore;

    fn team(id: Uuid) -> Team {
        Team {
            id,
            name: "Acme".to_string(),
            inbox_id: Some("inbox-1".to_string()),
            email: None,
        }
    }

    fn member(role: MemberRole) -> TeamMember {
        TeamMember {
            id: Uuid::new_v4(),
            full_name: Some("Linus".to_string()),
            email: Some("linus@acme.test".to_string()),
            locale: Some("de".to_string()),
            role,
        }
    }

    #[tokio::test]
    async fn test_resolve_builds_user_data() {
        let team_id = Uuid::new_v4();
        let mut store = MockNotificationStore::new();
        store
            .expect_get_team_by_id()
            .times(1)
            .returning(move |id| Ok(Some(team(id))));
        store
            .expect_get_team_members()
            .times(1)
            .returning(|_| Ok(vec![member(MemberRole::Owner), member(MemberRole::Member)]));

        let recipients = resolve(&store, team_id).await.unwrap();
        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients.owners().count(), 1);
        assert_eq!(recipients.users[0].team_id, team_id);
        assert_eq!(recipients.users[0].team_inbox_id.as_deref(), Some("inbox-1"));
        assert_eq!(recipients.users[1].locale, "de");
    }

    #[tokio::test]
    async fn test_resolve_missing_team() {
        let team_id = Uuid::new_v4();
        let mut store = MockNotificationStore::new();
        store.expect_get_team_by_id().returning(|_| Ok(None));
        store.expect_get_team_members().returning(|_| Ok(vec![]));

        let err = resolve(&store, team_id).await.unwrap_err();
        assert!(matches!(err, NotificationError::TeamNotFound(id) if id == team_id));
    }

    #[tokio::test]
    async fn test_resolve_empty_team() {
        let team_id = Uuid::new_v4();
        let mut store = MockNotificationStore::new();
        store
            .expect_get_team_by_id()
            .returning(move |id| Ok(Some(team(id))));
        store.expect_get_team_members().returning(|_| Ok(vec![]));

        let recipients = resolve(&store, team_id).await.unwrap();
        assert!(recipients.is_empty());
    }
}
