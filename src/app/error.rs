use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. Any of these aborts the run without leaving an archive behind.
#[derive(Error, Debug)]
pub enum LaterError {
    #[error("Failed to fetch feed {url}: {source}")]
    Fetch { url: String, source: FetchFailure },

    #[error("Feed parsing error: {0}")]
    Parse(String),

    #[error("EPUB assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("No items could be converted ({considered} considered)")]
    EmptyResult { considered: usize },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LaterError>;

/// Why a single HTTP retrieval failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("empty response body")]
    EmptyBody,

    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchFailure::Timeout
        } else if let Some(status) = e.status() {
            FetchFailure::Status(status.as_u16())
        } else {
            FetchFailure::Transport(e.to_string())
        }
    }
}

/// Per-item failures. These never abort the run; the item is skipped and
/// reported in the summary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchFailure),

    #[error("no readable content: {0}")]
    Extraction(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("task failed: {0}")]
    TaskFailed(String),
}

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Chapter slot {slot} is out of range (capacity {capacity})")]
    SlotOutOfRange { slot: usize, capacity: usize },

    #[error("Chapter slot {0} is already filled")]
    SlotOccupied(usize),

    #[error("Chapter order {order} does not follow {previous}")]
    OutOfOrder { order: usize, previous: usize },

    #[error("Failed to move archive into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}
