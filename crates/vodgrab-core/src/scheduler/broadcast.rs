//! One broadcast: fan out a task per pending part, join them all, then write
//! the manifest.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::downloader::{download_part, ExpectedMedia};
use crate::mapping::PartMapping;
use crate::progress::{ProgressListener, ProgressStore, STATUS_FILE_NAME};
use crate::source::ResolvedSource;

use super::budget::WorkerBudget;
use super::SchedulerOptions;

/// A resolved broadcast and where to store it.
pub struct BroadcastJob {
    pub id: String,
    pub storage_root: PathBuf,
    pub source: ResolvedSource,
    pub listener: Option<Arc<dyn ProgressListener>>,
}

impl std::fmt::Debug for BroadcastJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastJob")
            .field("id", &self.id)
            .field("storage_root", &self.storage_root)
            .field("segments", &self.source.segments.len())
            .field("ended", &self.source.ended)
            .finish()
    }
}

/// Outcome of one broadcast run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub id: String,
    pub parts: usize,
    /// Parts already downloaded before this run.
    pub already_complete: usize,
    pub downloaded: usize,
    pub failed: usize,
    /// The playlist was still open, so nothing was scheduled.
    pub skipped_live: bool,
    pub manifest: Option<PathBuf>,
}

impl BroadcastReport {
    pub fn is_complete(&self) -> bool {
        !self.skipped_live && self.already_complete + self.downloaded == self.parts
    }
}

/// Downloads every part of `job` that is not already complete.
///
/// Part failures are counted, not returned: only setup and manifest errors
/// make this fail.
pub async fn run_broadcast(
    job: BroadcastJob,
    budget: Arc<WorkerBudget>,
    opts: &SchedulerOptions,
) -> Result<BroadcastReport> {
    let mut report = BroadcastReport {
        id: job.id.clone(),
        parts: job.source.segments.len(),
        ..Default::default()
    };
    if !job.source.ended {
        tracing::info!(id = %job.id, "playlist has no end marker yet; skipping live broadcast");
        report.skipped_live = true;
        return Ok(report);
    }

    tokio::fs::create_dir_all(&job.storage_root)
        .await
        .with_context(|| format!("create storage root: {}", job.storage_root.display()))?;
    let store = ProgressStore::open(
        job.storage_root.join(STATUS_FILE_NAME),
        opts.progress_resolution,
    );
    if let Some(listener) = job.listener {
        store.set_listener(listener);
    }

    let mapping = PartMapping::new(&job.storage_root, &job.source.segments);
    mapping.forget_missing(&store);
    store.reset(mapping.len());
    let pending = mapping.pending(&store);
    report.already_complete = mapping.len() - pending.len();
    tracing::info!(
        id = %job.id,
        parts = mapping.len(),
        pending = pending.len(),
        muted = job.source.muted_count,
        workers_busy = budget.in_use(),
        "starting broadcast"
    );

    let media = ExpectedMedia::for_source(job.source.kind);
    let transfer = Arc::new(opts.transfer.clone());
    let mut tasks = tokio::task::JoinSet::new();
    for entry in pending {
        let budget = Arc::clone(&budget);
        let store = store.clone();
        let transfer = Arc::clone(&transfer);
        tasks.spawn(async move {
            let _slot = budget.acquire().await?;
            let progress = store.track(entry.id());
            let outcome = tokio::task::spawn_blocking(move || {
                download_part(&entry, media, progress, &transfer)
            })
            .await
            .context("part task join")?;
            Ok::<_, anyhow::Error>(outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(Ok(_bytes))) => report.downloaded += 1,
            // Already logged and recorded by the transfer.
            Ok(Ok(Err(_))) => report.failed += 1,
            Ok(Err(e)) => {
                tracing::warn!(id = %job.id, "part task failed: {:#}", e);
                report.failed += 1;
            }
            Err(e) => {
                tracing::warn!(id = %job.id, "part task aborted: {}", e);
                report.failed += 1;
            }
        }
    }

    let manifest = mapping.write_manifest(&store)?;
    tracing::info!(
        id = %job.id,
        downloaded = report.downloaded,
        failed = report.failed,
        manifest = %manifest.display(),
        "broadcast finished"
    );
    report.manifest = Some(manifest);
    Ok(report)
}
