//! Global worker budget shared by every broadcast in a run.
//!
//! Each part transfer holds one [`WorkerSlot`] for its whole duration, so the
//! number of concurrent transfers never exceeds `max_workers` no matter how
//! many broadcasts are in flight.

use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Debug)]
pub struct WorkerBudget {
    max_workers: usize,
    permits: Arc<Semaphore>,
}

/// Releases its worker when dropped.
#[derive(Debug)]
pub struct WorkerSlot {
    _permit: OwnedSemaphorePermit,
}

impl WorkerBudget {
    /// Budget of `max_workers` (at least 1) concurrent transfers.
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            max_workers,
            permits: Arc::new(Semaphore::new(max_workers)),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn in_use(&self) -> usize {
        self.max_workers.saturating_sub(self.available())
    }

    /// Waits for a free worker.
    pub async fn acquire(&self) -> Result<WorkerSlot, AcquireError> {
        let permit = Arc::clone(&self.permits).acquire_owned().await?;
        Ok(WorkerSlot { _permit: permit })
    }
}
