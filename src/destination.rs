//! Shared active-destination state.
//!
//! The bot delivers to exactly one chat at a time. The slot starts empty,
//! adopts the first chat that messages the bot (or any chat that sends the
//! update command), and is never cleared while the process runs. The update
//! listener writes it and the scheduler reads it, so the value sits behind
//! a mutex.

use crate::telegram::ChatId;
use std::sync::{Arc, Mutex};

/// Cloneable handle to the single active chat destination.
#[derive(Debug, Clone, Default)]
pub struct DestinationSlot {
    inner: Arc<Mutex<Option<ChatId>>>,
}

impl DestinationSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current destination, if one has been adopted.
    #[must_use]
    pub fn get(&self) -> Option<ChatId> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the destination with `chat_id`.
    pub fn set(&self, chat_id: ChatId) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = Some(chat_id);
    }

    /// Returns `true` once a destination has been adopted.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}
