//! # Notifications
//!
//! Formats run events as plain text and hands them to a pluggable sender.
//!
//! ```text
//! Task::safe_execute ──► Notifications::task_failed ──► NotificationFormat ──► NotificationSender::send
//! check command      ──► Notifications::message     ──┘
//! ```
//!
//! Every `send` is a self-contained, blocking call: the XMPP sender connects,
//! authenticates, delivers one message and disconnects each time.

mod format;
mod xmpp;

use std::fmt;

use thiserror::Error;
use tracing::debug;

pub use format::NotificationFormat;
pub use xmpp::{XmppParams, XmppSender, PASSWORD_ENV};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid JID '{jid}': {reason}")]
    InvalidJid { jid: String, reason: String },

    #[error("Failed to start notification runtime")]
    Runtime(#[source] std::io::Error),

    #[error("Notification transport failed: {0}")]
    Transport(String),

    #[error("Connection closed before the message was sent")]
    NotDelivered,
}

/// Delivers a formatted message
pub trait NotificationSender {
    fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Formatting plus delivery, shared by every task of a run
pub struct Notifications {
    sender: Box<dyn NotificationSender>,
    formatter: NotificationFormat,
}

impl Notifications {
    pub fn new(sender: Box<dyn NotificationSender>, formatter: NotificationFormat) -> Self {
        Self { sender, formatter }
    }

    /// Reports a failed task by its display name
    pub fn task_failed(&self, task: &dyn fmt::Display) -> Result<(), NotifyError> {
        let text = self.formatter.task_failed(task);
        debug!(message = %text, "Sending task failure notification");
        self.sender.send(&text)
    }

    /// Sends a free-form message
    pub fn message(&self, message: &str) -> Result<(), NotifyError> {
        let text = self.formatter.message(message);
        debug!(message = %text, "Sending notification");
        self.sender.send(&text)
    }
}

impl fmt::Debug for Notifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifications")
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}
