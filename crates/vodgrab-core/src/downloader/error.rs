//! Part transfer failure.

use thiserror::Error;

use super::media::ExpectedMedia;

/// Why a part transfer failed. Failures are local to the part: the file is
/// removed and the part is marked failed; sibling transfers continue.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("content type {found:?} is not {expected}")]
    ContentType {
        expected: ExpectedMedia,
        found: Option<String>,
    },
    #[error("HTTP {0}")]
    Http(u32),
    #[error("undersized transfer: {received} bytes, need at least {minimum}")]
    Undersized { minimum: u64, received: u64 },
    #[error("{0}")]
    Curl(#[from] curl::Error),
    #[error("storage: {0}")]
    Io(#[from] std::io::Error),
}
