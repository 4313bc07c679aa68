//! Descriptor -> [`BroadcastJob`] (resolution runs on a blocking worker).

use anyhow::{Context, Result};
use std::path::Path;

use crate::playlist::FetchOptions;
use crate::source::{resolve_source, BroadcastDescriptor};

use super::broadcast::BroadcastJob;

/// Resolves `descriptor` and places it under `output_root/{id}-{title}`.
pub async fn prepare_job(
    descriptor: BroadcastDescriptor,
    output_root: &Path,
    default_group: &str,
    fetch: &FetchOptions,
) -> Result<BroadcastJob> {
    let storage_root = output_root.join(descriptor.storage_dir_name());
    let id = descriptor.id.clone();
    let source = tokio::task::spawn_blocking({
        let group = default_group.to_string();
        let fetch = fetch.clone();
        move || resolve_source(&descriptor, &group, &fetch)
    })
    .await
    .context("resolve task join")?
    .with_context(|| format!("resolve broadcast {id}"))?;

    tracing::debug!(
        id = %id,
        segments = source.segments.len(),
        ended = source.ended,
        total_ms = source.total_duration_ms,
        "resolved broadcast"
    );
    Ok(BroadcastJob {
        id,
        storage_root,
        source,
        listener: None,
    })
}
