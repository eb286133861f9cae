//! The normalized message shape every channel consumes, plus the outcome
//! type returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Title used when loosely-typed input carries none.
pub const DEFAULT_TITLE: &str = "System Notice";

/// Severity of a notification, driving color and emoji decoration.
///
/// Unrecognized input values map to [`Severity::Default`]; they are never
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Default,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Parses a severity tag, falling back to `Default` for unknown values.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "success" => Severity::Success,
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            _ => Severity::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Default => "default",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Emoji shown in front of the title.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Success => "✅",
            Severity::Warning => "⚠️",
            Severity::Error => "❌",
            Severity::Default => "ℹ️",
        }
    }

    /// Status word shown in the email banner.
    pub fn status_word(&self) -> &'static str {
        match self {
            Severity::Success => "Success",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Default => "Notice",
        }
    }

    /// Banner background color for the HTML envelope.
    pub fn banner_color(&self) -> &'static str {
        match self {
            Severity::Success => "#4CAF50",
            Severity::Warning => "#FF9800",
            Severity::Error => "#F44336",
            Severity::Default => "#2196F3",
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Severity::from_tag(&tag))
    }
}

/// A call-to-action link attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub url: String,
    pub label: String,
}

impl Action {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }
}

/// The normalized notification, constructed per dispatch call and discarded
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    /// Raw markdown body.
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
    /// Explicit recipient. Wins over the channel's configured default.
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub action_left: Option<Action>,
    #[serde(default)]
    pub action_right: Option<Action>,
    /// Fields not recognized by the schema land here and are never dropped.
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// Set at construction time, immutable thereafter.
    pub created_at: DateTime<Utc>,
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: Severity::Default,
            recipient: None,
            action_left: None,
            action_right: None,
            payload: Map::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Builds a request from loosely-typed key/value input.
    ///
    /// Recognized keys fill the typed fields; everything else is preserved
    /// in `payload`. Action links use the wire names `actionLeftUrl`,
    /// `actionLeftText`, `actionRightUrl` and `actionRightText`.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        let mut request = NotificationRequest::new(DEFAULT_TITLE, "");
        let mut left_url = None;
        let mut left_text = None;
        let mut right_url = None;
        let mut right_text = None;

        for (key, value) in fields {
            match key.as_str() {
                "title" => {
                    if let Some(title) = as_string(&value) {
                        request.title = title;
                    }
                }
                "message" => {
                    if let Some(message) = as_string(&value) {
                        request.message = message;
                    }
                }
                "severity" | "type" => {
                    if let Some(tag) = as_string(&value) {
                        request.severity = Severity::from_tag(&tag);
                    }
                }
                "recipient" => request.recipient = as_string(&value),
                "actionLeftUrl" => left_url = as_string(&value),
                "actionLeftText" => left_text = as_string(&value),
                "actionRightUrl" => right_url = as_string(&value),
                "actionRightText" => right_text = as_string(&value),
                _ => {
                    request.payload.insert(key, value);
                }
            }
        }

        if let (Some(url), Some(label)) = (left_url, left_text) {
            request.action_left = Some(Action::new(url, label));
        }
        if let (Some(url), Some(label)) = (right_url, right_text) {
            request.action_right = Some(Action::new(url, label));
        }
        request
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub succeeded: bool,
    /// Human-readable failure detail; `None` on success.
    pub diagnostic: Option<String>,
}

impl DispatchOutcome {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            diagnostic: None,
        }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}
