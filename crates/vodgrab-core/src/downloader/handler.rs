//! Easy2 handler for one part transfer.
//! Checks status and content type before the first byte is written.

use std::fs::File;
use std::io::Write;
use std::str;

use crate::progress::PartProgress;

use super::error::TransferError;
use super::media::ExpectedMedia;

pub(super) struct PartHandler {
    pub(super) file: Option<File>,
    pub(super) expected: ExpectedMedia,
    pub(super) progress: PartProgress,
    pub(super) response_headers: Vec<String>,
    pub(super) checked: bool,
    /// Set when a write was refused; returned instead of curl's write error.
    pub(super) rejection: Option<TransferError>,
    pub(super) declared_length: Option<u64>,
    pub(super) bytes_written: u64,
}

impl PartHandler {
    pub(super) fn new(file: File, expected: ExpectedMedia, progress: PartProgress) -> Self {
        Self {
            file: Some(file),
            expected,
            progress,
            response_headers: Vec::new(),
            checked: false,
            rejection: None,
            declared_length: None,
            bytes_written: 0,
        }
    }

    /// Validates the final response's status line and content type, and
    /// records its declared length.
    pub(super) fn check_response(&mut self) -> Result<(), TransferError> {
        self.checked = true;
        if let Some(code) = parse_http_status(&self.response_headers) {
            if !(200..300).contains(&code) {
                return Err(TransferError::Http(code));
            }
        }
        let content_type = header_value(&self.response_headers, "content-type");
        if !self.expected.accepts(content_type) {
            return Err(TransferError::ContentType {
                expected: self.expected,
                found: content_type.map(str::to_string),
            });
        }
        self.declared_length =
            header_value(&self.response_headers, "content-length").and_then(|v| v.parse().ok());
        Ok(())
    }
}

impl curl::easy::Handler for PartHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if line.starts_with("HTTP/") {
                self.response_headers.clear();
            }
            self.response_headers.push(line.to_string());
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        if !self.checked {
            if let Err(e) = self.check_response() {
                self.rejection = Some(e);
            }
        }
        if self.rejection.is_some() {
            return Ok(0);
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(0);
        };
        match file.write_all(data) {
            Ok(()) => {
                self.bytes_written += data.len() as u64;
                self.progress.update(self.bytes_written, self.declared_length);
                Ok(data.len())
            }
            Err(e) => {
                self.rejection = Some(TransferError::Io(e));
                Ok(0)
            }
        }
    }
}

/// Status code from the most recent `HTTP/x yyy` line.
pub(super) fn parse_http_status(headers: &[String]) -> Option<u32> {
    headers
        .iter()
        .rev()
        .find(|l| l.starts_with("HTTP/"))
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
}

/// Case-insensitive header lookup; first match wins.
pub(super) fn header_value<'a>(headers: &'a [String], name: &str) -> Option<&'a str> {
    headers.iter().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}
