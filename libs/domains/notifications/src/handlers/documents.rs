use super::NotificationHandler;
use crate::models::{ActivityInput, NotificationType, UserData};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUploaded {
    #[validate(length(min = 1))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub file_path: Vec<String>,
    #[validate(length(min = 1))]
    pub mime_type: String,
}

impl NotificationHandler for DocumentUploaded {
    const TYPE: NotificationType = NotificationType::DocumentUploaded;
    const DEFAULT_PRIORITY: u8 = 7;
    const SHOW_IN_SETTINGS: bool = false;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "fileName": self.file_name,
                "filePath": self.file_path,
                "mimeType": self.mime_type,
            }),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DocumentProcessed {
    #[validate(length(min = 1))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub file_path: Vec<String>,
    #[validate(length(min = 1))]
    pub mime_type: String,
    pub content_length: Option<u64>,
    pub sample_length: Option<u64>,
    pub is_image: Option<bool>,
}

impl NotificationHandler for DocumentProcessed {
    const TYPE: NotificationType = NotificationType::DocumentProcessed;
    const DEFAULT_PRIORITY: u8 = 6;
    const SHOW_IN_SETTINGS: bool = false;

    fn create_activity(&self, user: &UserData) -> ActivityInput {
        Self::activity(
            user,
            json!({
                "fileName": self.file_name,
                "filePath": self.file_path,
                "mimeType": self.mime_type,
                "contentLength": self.content_length,
                "isImage": self.is_image.unwrap_or(false),
            }),
        )
    }
}
