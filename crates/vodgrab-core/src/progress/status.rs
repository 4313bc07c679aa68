use serde::{Deserialize, Serialize};

/// Download state of one segment. `Untracked` is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DownloadStatus {
    #[default]
    Untracked,
    Failed,
    Downloaded,
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DownloadStatus::Untracked => "untracked",
            DownloadStatus::Failed => "failed",
            DownloadStatus::Downloaded => "downloaded",
        })
    }
}
