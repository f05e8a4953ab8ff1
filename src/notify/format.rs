//! Message text formatting

use std::fmt;

use chrono::{Local, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Turns events into message text, optionally prefixed with the local time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationFormat {
    add_timestamp: bool,
}

impl NotificationFormat {
    pub fn new(add_timestamp: bool) -> Self {
        Self { add_timestamp }
    }

    pub fn adds_timestamp(&self) -> bool {
        self.add_timestamp
    }

    pub fn task_failed(&self, task: &dyn fmt::Display) -> String {
        self.message(&format!("Task failed: {}", task))
    }

    pub fn message(&self, message: &str) -> String {
        self.message_at(Local::now().naive_local(), message)
    }

    /// Formats as if the current time were `now`
    pub fn message_at(&self, now: NaiveDateTime, message: &str) -> String {
        if self.add_timestamp {
            format!("{} - {}", now.format(TIMESTAMP_FORMAT), message)
        } else {
            message.to_string()
        }
    }
}

impl Default for NotificationFormat {
    fn default() -> Self {
        Self::new(true)
    }
}
