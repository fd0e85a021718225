use super::NotificationHandler;
use crate::models::{ActivityInput, EmailInput, EmailTemplate, NotificationType, Team, UserData};
use crate::templates::i18n;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::Display;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PeriodType {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

/// A generated business summary is ready to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InsightReady {
    pub insight_id: Uuid,
    pub period_type: PeriodType,
    /// Human readable period, e.g. "Week 12, 2025".
    #[validate(length(min = 1))]
    pub period_label: String,
    pub period_year: Option<i32>,
    pub period_number: Option<u32>,
    pub title: Option<String>,
}

impl NotificationHandler for InsightReady {
    const TYPE: NotificationType = NotificationType::InsightReady;
    const DEFAULT_PRIORITY: u8 = 3;
    const SUPPORTS_EMAIL: bool = true;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "insightId": self.insight_id,
                "periodType": self.period_type,
                "periodLabel": self.period_label,
                "periodYear": self.period_year,
                "periodNumber": self.period_number,
                "title": self.title,
            }),
        )
    }

    fn create_email(&self, user: &UserData, _team: &Team) -> Option<EmailInput> {
        Some(EmailInput::new(
            EmailTemplate::InsightReady,
            i18n::translate(
                &user.locale,
                "insight_ready_subject",
                &[("period", &self.period_label)],
            ),
            user,
            json!({
                "insight_id": self.insight_id,
                "period_label": self.period_label,
                "title": self.title,
            }),
        ))
    }
}
