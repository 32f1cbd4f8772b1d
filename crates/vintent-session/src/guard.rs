//! Single-slot busy guard for analysis requests

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Allows at most one analysis in flight.
///
/// The only way into `Busy` is [`TaskGuard::try_begin`]; the only way out is
/// dropping the returned [`TaskPermit`]. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct TaskGuard {
    busy: Arc<AtomicBool>,
}

/// Proof that the caller owns the slot. Releases it on drop.
#[derive(Debug)]
#[must_use = "dropping the permit immediately releases the guard"]
pub struct TaskPermit {
    busy: Arc<AtomicBool>,
}

impl TaskGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot, or `None` if it is already taken
    pub fn try_begin(&self) -> Option<TaskPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TaskPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for TaskPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
