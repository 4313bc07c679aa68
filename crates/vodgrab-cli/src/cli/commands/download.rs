//! `vodgrab download` – resolve and download every selected broadcast.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use vodgrab_core::config::VodgrabConfig;
use vodgrab_core::scheduler::{prepare_job, run_broadcasts_parallel, BroadcastReport, WorkerBudget};
use vodgrab_core::source::BroadcastDescriptor;

use crate::cli::progress;

pub async fn run_download(
    cfg: &VodgrabConfig,
    descriptors: &Path,
    output: &Path,
    workers: Option<usize>,
) -> Result<()> {
    let selected: Vec<BroadcastDescriptor> = load_descriptors(descriptors)?
        .into_iter()
        .filter(|d| d.selected)
        .collect();
    if selected.is_empty() {
        println!("No selected broadcasts.");
        return Ok(());
    }

    let budget = Arc::new(WorkerBudget::new(workers.unwrap_or(cfg.worker_count)));
    let opts = cfg.scheduler_options();
    let fetch = cfg.fetch_options();
    tracing::info!(
        broadcasts = selected.len(),
        workers = budget.max_workers(),
        output = %output.display(),
        "starting download"
    );

    let mut jobs = Vec::new();
    let mut ids = Vec::new();
    let mut printers = Vec::new();
    let mut unresolved = 0usize;
    for descriptor in selected {
        let id = descriptor.id.clone();
        match prepare_job(descriptor, output, &cfg.rendition_group, &fetch).await {
            Ok(mut job) => {
                let (listener, printer) = progress::spawn_printer(id);
                job.listener = Some(listener);
                ids.push(job.id.clone());
                jobs.push(job);
                printers.push(printer);
            }
            Err(e) => {
                tracing::warn!(id = %id, "cannot resolve broadcast: {:#}", e);
                eprintln!("{}: {:#}", id, e);
                unresolved += 1;
            }
        }
    }

    let results = run_broadcasts_parallel(jobs, budget, &opts).await;
    for printer in printers {
        let _ = printer.await;
    }

    println!("{:<14} {:<10} {}", "BROADCAST", "PARTS", "RESULT");
    let mut incomplete = 0usize;
    let mut errors = Vec::new();
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(report) => {
                if !report.skipped_live && !report.is_complete() {
                    incomplete += 1;
                }
                println!(
                    "{:<14} {:<10} {}",
                    report.id,
                    format!("{}/{}", report.already_complete + report.downloaded, report.parts),
                    summarize(&report)
                );
            }
            Err(e) => {
                println!("{:<14} {:<10} {}", id, "-", "error");
                errors.push(format!("{}: {:#}", id, e));
            }
        }
    }
    for error in &errors {
        eprintln!("{}", error);
    }

    let failed = unresolved + errors.len();
    if failed + incomplete > 0 {
        bail!(
            "{} broadcast(s) failed, {} incomplete; run again to retry",
            failed,
            incomplete
        );
    }
    Ok(())
}

pub(crate) fn load_descriptors(path: &Path) -> Result<Vec<BroadcastDescriptor>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("read descriptors: {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parse descriptors: {}", path.display()))
}

pub(crate) fn summarize(report: &BroadcastReport) -> String {
    if report.skipped_live {
        "live, skipped".to_string()
    } else if report.is_complete() {
        "complete".to_string()
    } else {
        format!("{} failed", report.failed)
    }
}
