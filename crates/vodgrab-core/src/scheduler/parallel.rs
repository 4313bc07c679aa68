//! Run several broadcasts at once under one worker budget.
//!
//! Keeps up to `max_workers` broadcast tasks in flight; when one finishes the
//! next queued broadcast starts. Transfers from all of them share the budget.

use anyhow::Result;
use std::collections::VecDeque;
use std::sync::Arc;

use super::broadcast::{run_broadcast, BroadcastJob, BroadcastReport};
use super::budget::WorkerBudget;
use super::SchedulerOptions;

/// Runs `jobs` and returns one result per job, in input order.
///
/// A broadcast whose setup or manifest write fails does not stop the others;
/// its slot holds the error and every other report is kept.
pub async fn run_broadcasts_parallel(
    jobs: Vec<BroadcastJob>,
    budget: Arc<WorkerBudget>,
    opts: &SchedulerOptions,
) -> Vec<Result<BroadcastReport>> {
    let max_concurrent = budget.max_workers();
    let mut queue: VecDeque<(usize, BroadcastJob)> = jobs.into_iter().enumerate().collect();
    let mut results: Vec<Option<Result<BroadcastReport>>> = (0..queue.len()).map(|_| None).collect();
    let ids: Vec<String> = queue.iter().map(|(_, job)| job.id.clone()).collect();
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < max_concurrent {
            let Some((index, job)) = queue.pop_front() else {
                break;
            };
            let budget = Arc::clone(&budget);
            let opts = opts.clone();
            join_set.spawn(async move { (index, run_broadcast(job, budget, &opts).await) });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        match res {
            Ok((index, result)) => {
                if let Err(e) = &result {
                    tracing::warn!(id = %ids[index], "broadcast failed: {:#}", e);
                }
                results[index] = Some(result);
            }
            // The slot stays empty and is reported below.
            Err(e) => tracing::warn!("broadcast task aborted: {}", e),
        }
    }

    results
        .into_iter()
        .zip(ids)
        .map(|(r, id)| r.unwrap_or_else(|| Err(anyhow::anyhow!("broadcast {id} task aborted"))))
        .collect()
}
