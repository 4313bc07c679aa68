//! Progress notifications.

use super::status::DownloadStatus;

/// Receives store events on the thread that caused them.
///
/// Implementations that drive a UI must hand the event over to their own
/// thread; the calling worker is blocked until the method returns.
pub trait ProgressListener: Send + Sync {
    /// Published progress moved to `value` out of `resolution`.
    fn progress_changed(&self, value: u64, resolution: u64);

    /// The number of segments in `status` is now `count`.
    fn count_changed(&self, status: DownloadStatus, count: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Progress { value: u64, resolution: u64 },
    Count { status: DownloadStatus, count: usize },
}

/// Latest values seen by a [`ChannelListener`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub value: u64,
    pub resolution: u64,
    pub downloaded: usize,
    pub failed: usize,
}

impl ProgressSnapshot {
    fn apply(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Progress { value, resolution } => {
                self.value = value;
                self.resolution = resolution;
            }
            ProgressEvent::Count { status, count } => match status {
                DownloadStatus::Downloaded => self.downloaded = count,
                DownloadStatus::Failed => self.failed = count,
                DownloadStatus::Untracked => {}
            },
        }
    }
}

/// Forwards events into a tokio channel and keeps a [`ProgressSnapshot`] in a
/// watch channel.
///
/// Events are dropped when the mpsc channel is full; the snapshot never is, so
/// consumers read counts from [`ChannelListener::subscribe`] and treat events
/// as wake-ups.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: tokio::sync::mpsc::Sender<ProgressEvent>,
    snapshot: std::sync::Arc<tokio::sync::watch::Sender<ProgressSnapshot>>,
}

impl ChannelListener {
    pub fn new(tx: tokio::sync::mpsc::Sender<ProgressEvent>) -> Self {
        let (snapshot, _) = tokio::sync::watch::channel(ProgressSnapshot::default());
        Self {
            tx,
            snapshot: std::sync::Arc::new(snapshot),
        }
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<ProgressSnapshot> {
        self.snapshot.subscribe()
    }

    fn forward(&self, event: ProgressEvent) {
        self.snapshot.send_modify(|s| s.apply(event));
        let _ = self.tx.try_send(event);
    }
}

impl ProgressListener for ChannelListener {
    fn progress_changed(&self, value: u64, resolution: u64) {
        self.forward(ProgressEvent::Progress { value, resolution });
    }

    fn count_changed(&self, status: DownloadStatus, count: usize) {
        self.forward(ProgressEvent::Count { status, count });
    }
}
