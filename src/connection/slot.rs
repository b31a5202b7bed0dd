use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Admission guard allowing a single battle runner per coordinator.
#[derive(Debug, Clone, Default)]
pub struct RunnerSlot {
    occupied: Arc<AtomicBool>,
}

/// Proof of holding the [`RunnerSlot`]; the slot is released on drop.
#[derive(Debug)]
pub struct RunnerLease {
    occupied: Arc<AtomicBool>,
}

impl RunnerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the slot unless another runner holds it.
    pub fn try_acquire(&self) -> Option<RunnerLease> {
        self.occupied
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunnerLease {
                occupied: Arc::clone(&self.occupied),
            })
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied.load(Ordering::Acquire)
    }
}

impl Drop for RunnerLease {
    fn drop(&mut self) {
        self.occupied.store(false, Ordering::Release);
    }
}
