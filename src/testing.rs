//! Recording fakes shared by unit tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::command::{CommandError, Invocation, ProcessRunner};
use crate::notify::{NotificationFormat, NotificationSender, Notifications, NotifyError};

/// Records invocations and replays queued stdout payloads
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: RefCell<Vec<Invocation>>,
    outputs: RefCell<VecDeque<Vec<u8>>>,
    fail: bool,
}

impl RecordingRunner {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn failing() -> Rc<Self> {
        Rc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn with_outputs<I, S>(outputs: I) -> Rc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        Rc::new(Self {
            outputs: RefCell::new(outputs.into_iter().map(Into::into).collect()),
            ..Self::default()
        })
    }

    pub fn last(&self) -> Invocation {
        self.calls.borrow().last().cloned().unwrap()
    }

    fn record(&self, invocation: &Invocation) -> Result<(), CommandError> {
        self.calls.borrow_mut().push(invocation.clone());
        if self.fail {
            return Err(CommandError::Deliberate);
        }
        Ok(())
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        self.record(invocation)
    }

    fn output(&self, invocation: &Invocation) -> Result<Vec<u8>, CommandError> {
        self.record(invocation)?;
        Ok(self.outputs.borrow_mut().pop_front().unwrap_or_default())
    }
}

/// Collects every sent message
#[derive(Clone, Default)]
pub struct RecordingSender {
    pub sent: Rc<RefCell<Vec<String>>>,
}

impl NotificationSender for RecordingSender {
    fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.sent.borrow_mut().push(message.to_string());
        Ok(())
    }
}

/// Refuses every message
pub struct FailingSender;

impl NotificationSender for FailingSender {
    fn send(&self, _message: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".to_string()))
    }
}

/// Untimestamped notifications backed by a recording sender
pub fn recording_notifications() -> (Rc<Notifications>, Rc<RefCell<Vec<String>>>) {
    let sender = RecordingSender::default();
    let sent = sender.sent.clone();
    let notify = Notifications::new(Box::new(sender), NotificationFormat::new(false));
    (Rc::new(notify), sent)
}
