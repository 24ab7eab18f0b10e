//! Shared types for logconsole
//!
//! This crate contains the log record types used across the logconsole crates.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ratatui::style::Color;
use serde::{Serialize, Serializer};

// ============================================================================
// Severity
// ============================================================================

/// Log severity as presented by the console
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl Severity {
    /// All severities in display order
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warning, Severity::Error];

    /// Short display string (3 chars)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INF",
            Self::Warning => "WRN",
            Self::Error => "ERR",
        }
    }

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }

    /// Get display color for this severity
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Entries
// ============================================================================

/// Key identifying "the same log" for collapsing
///
/// Built from severity and message only. The message is shared with the
/// owning entry, so a key never changes after it has been inserted into an
/// index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    severity: Severity,
    message: Arc<str>,
}

impl IdentityKey {
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A single recorded log occurrence
#[derive(Clone, Debug, Serialize)]
pub struct Entry {
    /// Sequential ID assigned by the store
    id: u64,

    /// Message text
    #[serde(serialize_with = "serialize_shared_str")]
    message: Arc<str>,

    /// Stack trace or other context attached by the host
    context: String,

    severity: Severity,

    /// Arrival time
    timestamp: DateTime<Utc>,

    /// Number of occurrences folded into this entry while collapsed
    repeat_count: u32,
}

impl Entry {
    /// Create a new entry with a repeat count of one
    pub fn new(message: impl Into<Arc<str>>, context: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: 0,
            message: message.into(),
            context: context.into(),
            severity,
            timestamp: Utc::now(),
            repeat_count: 1,
        }
    }

    /// Override the arrival time
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Derive the collapse key (severity + message)
    pub fn key(&self) -> IdentityKey {
        IdentityKey {
            severity: self.severity,
            message: Arc::clone(&self.message),
        }
    }

    /// Reset the repeat count back to one
    pub fn reset(&mut self) {
        self.repeat_count = 1;
    }

    /// Record one more folded occurrence
    pub fn increment_repeat(&mut self) {
        self.repeat_count = self.repeat_count.saturating_add(1);
    }

    /// Assign the store sequence number
    pub fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// First line of the message, for single-line list rendering
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    /// Message followed by its context, if any
    pub fn display_text(&self) -> String {
        let context = self.context.trim_end();
        if context.trim().is_empty() {
            self.message.to_string()
        } else {
            format!("{}\n{}", self.message, context)
        }
    }
}

fn serialize_shared_str<S: Serializer>(value: &Arc<str>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_starts_at_one() {
        let entry = Entry::new("boot", "main.rs:10", Severity::Info);
        assert_eq!(entry.repeat_count(), 1);
        assert_eq!(entry.message(), "boot");
        assert_eq!(entry.context(), "main.rs:10");
    }

    #[test]
    fn test_reset_keeps_content() {
        let mut entry = Entry::new("retry", "net.rs:4", Severity::Warning);
        entry.increment_repeat();
        entry.increment_repeat();
        assert_eq!(entry.repeat_count(), 3);

        entry.reset();
        assert_eq!(entry.repeat_count(), 1);
        assert_eq!(entry.message(), "retry");
        assert_eq!(entry.severity(), Severity::Warning);
    }

    #[test]
    fn test_key_ignores_context_and_time() {
        let a = Entry::new("x", "first trace", Severity::Error);
        let b = Entry::new("x", "second trace", Severity::Error)
            .with_timestamp(Utc::now() + chrono::Duration::seconds(5));
        assert_eq!(a.key(), b.key());

        let c = Entry::new("x", "first trace", Severity::Warning);
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_key_unaffected_by_repeat_count() {
        let mut entry = Entry::new("x", "", Severity::Info);
        let before = entry.key();
        entry.increment_repeat();
        assert_eq!(before, entry.key());
    }

    #[test]
    fn test_display_text() {
        let plain = Entry::new("hello", "   ", Severity::Info);
        assert_eq!(plain.display_text(), "hello");

        let traced = Entry::new("boom", "at foo()\nat bar()\n", Severity::Error);
        assert_eq!(traced.display_text(), "boom\nat foo()\nat bar()");
    }

    #[test]
    fn test_entry_serializes_message_as_string() {
        let entry = Entry::new("hello", "", Severity::Warning);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["message"], "hello");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["repeat_count"], 1);
    }
}
