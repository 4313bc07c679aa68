//! Throttled per-broadcast progress lines on stdout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use vodgrab_core::progress::{ChannelListener, ProgressEvent, ProgressListener, ProgressSnapshot};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Listener for one broadcast plus the task printing its progress. The task
/// ends once the broadcast's store (and with it the listener) is dropped.
///
/// Events only wake the printer; the counts come from the listener's snapshot
/// so a dropped event never leaves them stale.
pub fn spawn_printer(id: String) -> (Arc<dyn ProgressListener>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(64);
    let listener = ChannelListener::new(tx);
    let snapshot = listener.subscribe();
    let handle = tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        let mut printed: Option<ProgressSnapshot> = None;
        while rx.recv().await.is_some() {
            let current = *snapshot.borrow();
            let due = last_print.map_or(true, |t| t.elapsed() >= PROGRESS_INTERVAL);
            if (due || current.value >= current.resolution) && printed != Some(current) {
                println!("{}", format_line(&id, &current));
                last_print = Some(Instant::now());
                printed = Some(current);
            }
        }
        let last = *snapshot.borrow();
        if printed != Some(last) && last != ProgressSnapshot::default() {
            println!("{}", format_line(&id, &last));
        }
    });
    (Arc::new(listener), handle)
}

pub(crate) fn format_line(id: &str, snapshot: &ProgressSnapshot) -> String {
    format!(
        "  {}: {}  ({} done, {} failed)",
        id,
        format_percent(snapshot.value, snapshot.resolution),
        snapshot.downloaded,
        snapshot.failed
    )
}

pub(crate) fn format_percent(value: u64, resolution: u64) -> String {
    if resolution == 0 {
        return "?".to_string();
    }
    format!("{:.1}%", value as f64 * 100.0 / resolution as f64)
}
