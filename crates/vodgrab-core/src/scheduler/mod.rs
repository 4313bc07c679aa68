//! Bounded-parallel broadcast scheduler.
//!
//! A broadcast task forks one task per pending part and joins them all before
//! writing the manifest. Part transfers run on tokio's blocking pool, gated by
//! a [`WorkerBudget`] shared across every broadcast in the run.

mod broadcast;
mod budget;
mod parallel;
mod prepare;

pub use broadcast::{run_broadcast, BroadcastJob, BroadcastReport};
pub use budget::{WorkerBudget, WorkerSlot};
pub use parallel::run_broadcasts_parallel;
pub use prepare::prepare_job;

use crate::downloader::TransferOptions;
use crate::progress::DEFAULT_RESOLUTION;

#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    pub transfer: TransferOptions,
    /// Denominator of published progress values.
    pub progress_resolution: u64,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            transfer: TransferOptions::default(),
            progress_resolution: DEFAULT_RESOLUTION,
        }
    }
}
