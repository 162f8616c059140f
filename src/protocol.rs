//! Message contract between a donation flow and its host.
//!
//! The flow emits one [`Command`] at a time and the host answers every command
//! with exactly one [`Payload`]. Only interactive pages read the answer; donate
//! and exit commands treat it as an acknowledgement.
use crate::props::Page;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-to-host instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Command {
    RenderPage {
        page: Page,
    },
    Donate {
        key: String,
        /// JSON-encoded document.
        payload: String,
    },
    Exit {
        code: i32,
        message: String,
    },
}

impl Command {
    pub fn render(page: Page) -> Self {
        Command::RenderPage { page }
    }

    pub fn donate(key: impl Into<String>, payload: impl Into<String>) -> Self {
        Command::Donate {
            key: key.into(),
            payload: payload.into(),
        }
    }

    pub fn exit(code: i32, message: impl Into<String>) -> Self {
        Command::Exit {
            code,
            message: message.into(),
        }
    }

    /// True when the engine reads the host's answer to this command.
    pub fn awaits_answer(&self) -> bool {
        match self {
            Command::RenderPage { page } => page.is_interactive(),
            Command::Donate { .. } | Command::Exit { .. } => false,
        }
    }

    pub fn donation_key(&self) -> Option<&str> {
        match self {
            Command::Donate { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Host-to-engine answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Payload {
    #[serde(alias = "PayloadString")]
    StringValue(String),
    #[serde(alias = "PayloadJSON")]
    JsonValue(String),
    #[serde(alias = "PayloadTrue")]
    True,
    #[serde(alias = "PayloadFalse")]
    False,
    /// Skipped, cancelled, or a plain acknowledgement.
    #[serde(alias = "PayloadVoid")]
    None,
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::StringValue(_) => "StringValue",
            Payload::JsonValue(_) => "JsonValue",
            Payload::True => "True",
            Payload::False => "False",
            Payload::None => "None",
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
