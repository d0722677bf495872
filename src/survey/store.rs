//! Process-wide, in-memory store of in-flight surveys
//!
//! One slot per conversation id, each behind its own mutex, so two events for
//! the same conversation (a double-tapped button) serialize on the slot
//! instead of racing on a shared map entry. Nothing is persisted: an
//! abandoned survey lives until it is overwritten or the process restarts.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use super::state::Survey;

/// Contents of one conversation slot. `None` means no survey in flight.
pub type SurveySlot = Option<Survey>;

/// Keyed store of conversation slots.
#[derive(Default)]
pub struct SurveyStore {
    slots: DashMap<i64, Arc<Mutex<SurveySlot>>>,
}

impl SurveyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for a conversation, creating an empty one if needed.
    ///
    /// The caller locks the returned mutex for the whole read-modify-write of
    /// one inbound event.
    pub fn slot(&self, chat_id: i64) -> Arc<Mutex<SurveySlot>> {
        self.slots
            .entry(chat_id)
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    /// Drops a conversation's slot entirely.
    ///
    /// An event still holding the old `Arc` simply finds the slot empty.
    pub fn remove(&self, chat_id: i64) {
        self.slots.remove(&chat_id);
    }

    /// Number of conversations with a slot (empty slots included).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
