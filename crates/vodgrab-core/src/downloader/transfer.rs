//! One part: create the file, GET, stream, verify, record.

use std::fs::File;

use curl::easy::Easy2;

use crate::mapping::PartEntry;
use crate::progress::PartProgress;

use super::error::TransferError;
use super::handler::PartHandler;
use super::media::ExpectedMedia;
use super::TransferOptions;

/// Fewest bytes a part of `expected_duration_ms` may have: one per second.
pub fn minimum_bytes(expected_duration_ms: i64) -> u64 {
    if expected_duration_ms > 0 {
        expected_duration_ms as u64 / 1000
    } else {
        0
    }
}

/// Downloads `entry` into its file and records the outcome on `progress`.
///
/// On success the part is marked downloaded and the byte count returned. On
/// any failure the file is removed and the part marked failed. Blocking; run
/// it on a blocking worker.
pub fn download_part(
    entry: &PartEntry,
    expected: ExpectedMedia,
    mut progress: PartProgress,
    opts: &TransferOptions,
) -> Result<u64, TransferError> {
    let file = match File::create(&entry.path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(part = %entry.file_name, "cannot create part file: {}", e);
            progress.invalidate();
            return Err(TransferError::Io(e));
        }
    };

    let mut easy = Easy2::new(PartHandler::new(file, expected, progress));
    let result = perform(&mut easy, entry, opts);
    let handler = easy.get_mut();
    // Close before any removal.
    drop(handler.file.take());

    match result {
        Ok(bytes) => {
            handler.progress.finish();
            tracing::debug!(part = %entry.file_name, bytes, "part downloaded");
            Ok(bytes)
        }
        Err(e) => {
            if let Err(rm) = std::fs::remove_file(&entry.path) {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %entry.path.display(), "could not remove partial part: {}", rm);
                }
            }
            handler.progress.invalidate();
            tracing::warn!(part = %entry.file_name, url = %entry.segment.location, "part failed: {}", e);
            Err(e)
        }
    }
}

fn perform(
    easy: &mut Easy2<PartHandler>,
    entry: &PartEntry,
    opts: &TransferOptions,
) -> Result<u64, TransferError> {
    easy.url(entry.segment.location.as_str())?;
    easy.follow_location(true)?;
    easy.buffer_size(opts.buffer_bytes)?;
    easy.connect_timeout(opts.connect_timeout)?;
    // Abort if throughput stays under the limit; large parts on slow links are
    // not cut by the hard timeout alone.
    easy.low_speed_limit(opts.low_speed_limit)?;
    easy.low_speed_time(opts.low_speed_time)?;
    easy.timeout(opts.timeout)?;

    if let Err(e) = easy.perform() {
        if e.is_write_error() {
            if let Some(rejection) = easy.get_mut().rejection.take() {
                return Err(rejection);
            }
        }
        return Err(TransferError::Curl(e));
    }

    let code = easy.response_code()?;
    let handler = easy.get_mut();
    // Empty bodies never reach the write callback.
    if !handler.checked {
        handler.check_response()?;
    }
    if !(200..300).contains(&code) {
        return Err(TransferError::Http(code));
    }

    let received = handler.bytes_written;
    let minimum = minimum_bytes(entry.segment.expected_duration_ms);
    if received < minimum {
        return Err(TransferError::Undersized { minimum, received });
    }
    Ok(received)
}
