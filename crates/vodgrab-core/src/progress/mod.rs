//! Durable per-broadcast download status and the live aggregate estimate.
//!
//! A [`ProgressStore`] owns one broadcast's `status.json`. Segment transfers
//! report through [`PartProgress`] handles obtained from [`ProgressStore::track`];
//! the store folds those reports into a single `0..=R` progress value and
//! notifies an optional [`ProgressListener`].

mod aggregate;
mod listener;
mod persist;
mod status;
mod store;

pub use aggregate::AggregateProgress;
pub use persist::read_status_file;
pub use listener::{ChannelListener, ProgressEvent, ProgressListener, ProgressSnapshot};
pub use status::DownloadStatus;
pub use store::{PartProgress, ProgressStore, DEFAULT_RESOLUTION, STATUS_FILE_NAME};

#[cfg(test)]
mod tests;
