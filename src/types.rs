use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn css_class(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub created_at: Option<OffsetDateTime>,
}

/// Severity of an inline status line (sidebar, upload banner, result box).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Success,
    Info,
    Error,
}

impl StatusLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            StatusLevel::Success => "success",
            StatusLevel::Info => "info",
            StatusLevel::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Info, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(StatusLevel::Error, text)
    }
}
