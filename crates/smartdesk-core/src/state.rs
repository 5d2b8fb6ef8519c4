//! UI-agnostic conversation state types
//!
//! These are shared by every front end (full-screen TUI, line-mode client)
//! and don't depend on any specific UI framework.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single turn in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Who sent a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Label shown above the turn in the transcript
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Assistant => "Assistant",
        }
    }
}

/// One internal step the backend reported while producing a reply.
///
/// The backend has shipped both `result` and `details` as the payload key,
/// so both are accepted. An empty or missing step decodes as `"unknown"`;
/// an empty, zero, false or missing payload decodes as an empty object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRecord {
    pub step: String,
    pub result: Value,
}

#[derive(Deserialize)]
struct RawActivityRecord {
    step: Option<Value>,
    #[serde(alias = "details")]
    result: Option<Value>,
}

/// Null, `false`, `0` and `""` count as absent
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

impl<'de> Deserialize<'de> for ActivityRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawActivityRecord::deserialize(deserializer)?;
        let step = match raw.step.filter(|v| !is_blank(v)) {
            Some(Value::String(step)) => step,
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        };
        let result = raw
            .result
            .filter(|v| !is_blank(v))
            .unwrap_or_else(|| Value::Object(Default::default()));
        Ok(Self { step, result })
    }
}

impl ActivityRecord {
    pub fn new(step: impl Into<String>, result: Value) -> Self {
        Self {
            step: step.into(),
            result,
        }
    }

    /// Human-readable step label. Only the first underscore is replaced, so
    /// `lookup_user` becomes `lookup user` and `a_b_c` becomes `a b_c`.
    pub fn label(&self) -> String {
        self.step.replacen('_', " ", 1)
    }

    /// Details block: pretty-printed JSON for structured results, the raw
    /// text for strings.
    pub fn details(&self) -> String {
        match &self.result {
            Value::String(text) => text.clone(),
            Value::Object(_) | Value::Array(_) => {
                serde_json::to_string_pretty(&self.result).unwrap_or_else(|_| self.result.to_string())
            }
            other => other.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.step == "error"
    }
}

/// Result of the most recent health check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Checking,
    Connected {
        environment: Option<String>,
    },
    ApiError,
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Checking => "Checking...",
            ConnectionStatus::Connected { .. } => "Connected",
            ConnectionStatus::ApiError => "API Error",
            ConnectionStatus::Disconnected => "Disconnected",
        }
    }
}
