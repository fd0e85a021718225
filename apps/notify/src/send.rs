use domain_notifications::NotificationOptions;
use eyre::{Result, WrapErr};
use serde_json::Value;
use std::path::Path;
use uuid::Uuid;

/// Arguments of the `send` command.
#[derive(Debug, Clone)]
pub struct SendArgs {
    pub notification_type: String,
    pub team_id: Uuid,
    pub payload: String,
    pub send_email: bool,
    pub priority: Option<u8>,
    pub from: Option<String>,
    pub reply_to: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl SendArgs {
    /// Parse the payload, reading it from disk when it starts with `@`.
    pub fn load_payload(&self) -> Result<Value> {
        let raw = match self.payload.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(Path::new(path))
                .wrap_err_with(|| format!("Failed to read payload file {}", path))?,
            None => self.payload.clone(),
        };
        serde_json::from_str(&raw).wrap_err("Payload is not valid JSON")
    }

    pub fn options(&self) -> NotificationOptions {
        NotificationOptions {
            priority: self.priority,
            send_email: self.send_email,
            from: self.from.clone(),
            reply_to: self.reply_to.clone(),
            headers: self.headers.iter().cloned().collect(),
        }
    }
}

/// Parse `NAME=VALUE` into a header pair.
pub fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("header name is empty".to_string());
    }
    Ok((name.to_string(), value.trim().to_string()))
}
