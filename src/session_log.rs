//! Session-scoped diagnostic log.
//!
//! Every flow owns one buffer of formatted lines. The buffer is snapshotted
//! into tracking donations, so lines carry no timestamps:
//!
//! ```text
//! INFO --- ddp_flow::flow --- Prompt for file for TikTok
//! ```
//!
//! Each line is also forwarded to `tracing` with the session id attached.
use std::fmt;

/// Snapshot content when nothing has been logged yet.
pub const EMPTY_SNAPSHOT: &str = "no logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARNING"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionLog {
    session_id: String,
    target: &'static str,
    lines: Vec<String>,
}

impl SessionLog {
    pub fn new(session_id: impl Into<String>, target: &'static str) -> Self {
        Self {
            session_id: session_id.into(),
            target,
            lines: Vec::new(),
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, message.into());
    }

    fn push(&mut self, level: Level, message: String) {
        match level {
            Level::Info => tracing::info!(session = %self.session_id, "{message}"),
            Level::Warn => tracing::warn!(session = %self.session_id, "{message}"),
        }
        self.lines
            .push(format!("{level} --- {} --- {message}", self.target));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Every line so far, or a single marker line when empty.
    pub fn snapshot(&self) -> Vec<String> {
        if self.lines.is_empty() {
            return vec![EMPTY_SNAPSHOT.to_string()];
        }
        self.lines.clone()
    }

    /// JSON-encoded [`SessionLog::snapshot`], the tracking donation payload.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }
}
