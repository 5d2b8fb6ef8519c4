use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::ActivityRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub activity_log: Option<Vec<ActivityRecord>>,
}

impl ChatReply {
    pub fn activities(&self) -> &[ActivityRecord] {
        self.activity_log.as_deref().unwrap_or_default()
    }
}

/// Body of `GET /health`. Only `"status": "ok"` counts as healthy; a missing
/// or non-string status still decodes so it reads as an API error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub azure_configured: Option<bool>,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.status.as_ref().and_then(Value::as_str) == Some("ok")
    }

    /// Status as reported, for diagnostics
    pub fn status_text(&self) -> String {
        match &self.status {
            Some(Value::String(status)) => status.clone(),
            Some(other) => other.to_string(),
            None => "missing".to_string(),
        }
    }
}
