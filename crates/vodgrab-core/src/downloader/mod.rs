//! Single-part HTTP transfer into a part file.
//!
//! Each part is one GET streamed straight into its file through curl's receive
//! buffer. The first chunk is checked against the expected media type before
//! anything is written; progress is reported after every chunk; the finished
//! file must pass a size-per-duration sanity check.

mod error;
mod handler;
mod media;
mod transfer;

pub use error::TransferError;
pub use media::ExpectedMedia;
pub use transfer::{download_part, minimum_bytes};

use std::time::Duration;

/// curl settings for part transfers.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Receive buffer size; progress is reported once per filled buffer.
    pub buffer_bytes: usize,
    pub connect_timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    /// Hard wall-clock limit per part.
    pub timeout: Duration,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            buffer_bytes: 64 * 1024,
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            timeout: Duration::from_secs(3600),
        }
    }
}
