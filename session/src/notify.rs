//! Single ephemeral user message with a fixed lifetime.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserMessage {
    pub text: String,
    pub kind: MessageKind,
    pub created_at: Instant,
}

#[derive(Debug)]
pub struct Notifier {
    current: Option<UserMessage>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    /// Replaces whatever message is live.
    pub fn notify(&mut self, text: impl Into<String>, kind: MessageKind) {
        self.current = Some(UserMessage {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        });
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.notify(text, MessageKind::Success);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.notify(text, MessageKind::Error);
    }

    /// The live message, if it has not expired yet.
    pub fn current(&self) -> Option<&UserMessage> {
        self.current
            .as_ref()
            .filter(|msg| msg.created_at.elapsed() < self.ttl)
    }

    /// Drops an expired message. Returns true if one was dropped.
    pub fn clear_expired(&mut self) -> bool {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|msg| msg.created_at.elapsed() >= self.ttl);
        if expired {
            self.current = None;
        }
        expired
    }

    /// Sleeps until the live message expires, then clears it.
    pub async fn wait_expiry(&mut self) {
        if let Some(msg) = &self.current {
            sleep_until(msg.created_at + self.ttl).await;
            self.current = None;
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
