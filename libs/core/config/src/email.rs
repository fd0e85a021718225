use crate::{env_or_default, env_required, ConfigError, FromEnv};

pub const DEFAULT_FROM: &str = "Notifications <notifications@example.com>";
pub const DEFAULT_API_URL: &str = "https://api.resend.com";
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Transactional email settings
#[derive(Clone, Debug)]
pub struct EmailConfig {
    /// Resend API key
    pub api_key: String,
    /// Sender used when neither the handler nor the caller overrides it
    pub default_from: String,
    /// Provider base URL (overridable for testing)
    pub api_url: String,
    /// Dashboard base URL used for links inside emails
    pub app_url: String,
}

impl EmailConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            default_from: DEFAULT_FROM.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }
}

impl FromEnv for EmailConfig {
    /// Requires RESEND_API_KEY; EMAIL_FROM, EMAIL_API_URL and APP_URL have defaults
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_required("RESEND_API_KEY")?,
            default_from: env_or_default("EMAIL_FROM", DEFAULT_FROM),
            api_url: env_or_default("EMAIL_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            app_url: env_or_default("APP_URL", DEFAULT_APP_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}
