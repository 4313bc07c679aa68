//! Playlist GET over curl.

use std::time::Duration;

use url::Url;

use super::error::PlaylistError;

/// Timeouts for playlist requests.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Downloads a playlist body. Anything but HTTP 200 is a malformed playlist.
///
/// Blocking; call from `spawn_blocking` when used from async code.
pub fn fetch_playlist(url: &Url, opts: &FetchOptions) -> Result<Vec<u8>, PlaylistError> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url.as_str())?;
    easy.follow_location(true)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if code != 200 {
        return Err(PlaylistError::malformed(format!("GET {url} returned HTTP {code}")));
    }
    if body.is_empty() {
        return Err(PlaylistError::malformed(format!("GET {url} returned an empty body")));
    }
    Ok(body)
}
