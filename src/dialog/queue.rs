//! Single-slot hand-off from the coordinator to the UI surface

use super::task::DialogTask;
use std::sync::{Arc, Mutex, PoisonError};

/// Producer side of the hand-off. The coordinator only offers; it never drains.
pub trait TaskQueue: Send + Sync {
    fn offer(&self, task: Arc<DialogTask>);
}

/// Holds at most one pending task for the UI surface to consume
///
/// A new offer replaces a task that was never drained; that task has already
/// been dismissed by the coordinator before its replacement was created.
#[derive(Debug, Default)]
pub struct TaskSlot {
    pending: Mutex<Option<Arc<DialogTask>>>,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending task, leaving the slot empty
    pub fn take(&self) -> Option<Arc<DialogTask>> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl TaskQueue for TaskSlot {
    fn offer(&self, task: Arc<DialogTask>) {
        let replaced = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(stale) = replaced {
            tracing::debug!(task_id = stale.id(), "Replaced undrained dialog task");
        }
    }
}
