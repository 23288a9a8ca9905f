// src/notify.rs

//! Notification sink for user-visible service messages.
//!
//! Services report what they did through a [`NotificationSink`] that is
//! injected at construction time. [`MessageLog`] is the in-process,
//! append-only implementation the CLI prints from.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};

/// Append-only receiver of human-readable messages.
pub trait NotificationSink: Send + Sync {
    /// Record a message. No acknowledgement is returned.
    fn record(&self, message: &str);
}

/// A single recorded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub recorded_at: DateTime<Local>,
    pub text: String,
}

/// In-memory message log.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Mutex<Vec<Message>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Message>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Message texts in the order they were recorded.
    pub fn messages(&self) -> Vec<String> {
        self.entries().iter().map(|m| m.text.clone()).collect()
    }

    /// Recorded messages with their timestamps.
    pub fn snapshot(&self) -> Vec<Message> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Drop every recorded message.
    pub fn clear(&self) {
        self.entries().clear();
    }
}

impl NotificationSink for MessageLog {
    fn record(&self, message: &str) {
        log::debug!("notification: {}", message);
        self.entries().push(Message {
            recorded_at: Local::now(),
            text: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_in_order() {
        let log = MessageLog::new();
        log.record("first");
        log.record("second");

        assert_eq!(log.messages(), vec!["first", "second"]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_clear() {
        let log = MessageLog::new();
        log.record("something");
        log.clear();

        assert!(log.is_empty());
    }

    #[test]
    fn test_snapshot_timestamps_are_ordered() {
        let log = MessageLog::new();
        log.record("a");
        log.record("b");

        let entries = log.snapshot();
        assert!(entries[0].recorded_at <= entries[1].recorded_at);
    }
}
