//! One-shot flash messages shown on the next rendered page.

use serde::{Deserialize, Serialize};

/// Which list a flash message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// Pending flash messages, serialised into the session between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashMessages {
    #[serde(default)]
    pub success_message: Vec<String>,
    #[serde(default)]
    pub error_message: Vec<String>,
}

impl FlashMessages {
    /// Append a message to the list for `kind`.
    pub fn push(&mut self, kind: FlashKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            FlashKind::Success => self.success_message.push(message),
            FlashKind::Error => self.error_message.push(message),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.success_message.is_empty() && self.error_message.is_empty()
    }

    /// Messages queued under `kind`, in insertion order.
    pub fn messages(&self, kind: FlashKind) -> &[String] {
        match kind {
            FlashKind::Success => &self.success_message,
            FlashKind::Error => &self.error_message,
        }
    }
}
