//! Flash messages queued for the next rendered response.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Category used for messages queued by the guard.
pub const INFO: &str = "info";

/// Flash messages grouped by category, in the order they were queued.
pub type FlashMessages = BTreeMap<String, Vec<String>>;

/// Append-only sink for flash messages.
pub trait FlashSink: Send + Sync {
    /// Queues a message under the given category.
    fn push(&self, category: &str, message: &str);
}

/// A sink that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl FlashSink for Discard {
    fn push(&self, _category: &str, _message: &str) {}
}

/// In-memory flash storage.
///
/// Messages are handed out once: [`FlashBag::take`] removes what it returns.
#[derive(Debug, Default)]
pub struct FlashBag {
    messages: Mutex<FlashMessages>,
}

impl FlashBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a bag from previously stored messages.
    #[must_use]
    pub fn from_messages(messages: FlashMessages) -> Self {
        Self {
            messages: Mutex::new(messages),
        }
    }

    /// Removes and returns the messages queued under a category.
    pub fn take(&self, category: &str) -> Vec<String> {
        self.lock().remove(category).unwrap_or_default()
    }

    /// Returns a copy of every queued message without removing them.
    pub fn peek(&self) -> FlashMessages {
        self.lock().clone()
    }

    /// Returns whether no message is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().values().all(Vec::is_empty)
    }

    /// Encodes the queued messages as JSON for session storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the messages cannot be serialized.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&*self.lock())
    }

    /// Decodes messages previously produced by [`FlashBag::to_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not a JSON object of string lists.
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data).map(Self::from_messages)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FlashMessages> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FlashSink for FlashBag {
    fn push(&self, category: &str, message: &str) {
        self.lock()
            .entry(category.to_string())
            .or_default()
            .push(message.to_string());
    }
}
