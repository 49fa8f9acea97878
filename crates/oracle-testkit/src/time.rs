//! Manually driven clock

use oracle_core::effects::Clock;
use oracle_core::Timestamp;
use parking_lot::Mutex;
use std::sync::Arc;

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Clock starting at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(timestamp)),
        }
    }

    /// Set absolute time
    pub fn set(&self, timestamp: Timestamp) {
        *self.now.lock() = timestamp;
    }

    /// Advance by `seconds`
    pub fn advance(&self, seconds: u64) {
        *self.now.lock() += seconds;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
