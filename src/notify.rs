use crate::error::SyncError;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Notifications disappear on their own after this long.
pub const AUTO_DISMISS_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "✓",
            Severity::Error => "✗",
            Severity::Info => "ℹ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            created_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::seconds(AUTO_DISMISS_SECS)
    }
}

impl From<&SyncError> for Notification {
    fn from(err: &SyncError) -> Self {
        Notification::error(err.user_message())
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity.icon(), self.message)
    }
}

/// Pending notifications, oldest first.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    pending: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        self.pending.push(notification);
    }

    /// Hands over everything still on screen at `now`; expired entries are dropped.
    pub fn take_active(&mut self, now: DateTime<Utc>) -> Vec<Notification> {
        let mut pending = std::mem::take(&mut self.pending);
        pending.retain(|n| !n.is_expired(now));
        pending
    }
}
