pub mod library;
pub mod urls;

pub use library::LibrarySource;
pub use urls::IdExtractor;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Identifier for a media item. Opaque to the controller - it only ever
/// carries one of these between the acquisition side and the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaId(String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a loaded/fetched media item. The engine owns the actual
/// decoded media; everyone else holds one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaHandle {
    pub id: MediaId,
    /// Total length in seconds. None until the engine has figured it out.
    pub duration: Option<f64>,
    /// Where the bytes live, when the source is file-backed.
    pub file_path: Option<PathBuf>,
}

impl MediaHandle {
    pub fn new(id: MediaId) -> Self {
        Self {
            id,
            duration: None,
            file_path: None,
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("'{0}' is not a recognizable media url or id")]
    InvalidUrl(String),

    #[error("unsupported media format: .{0}")]
    UnsupportedFormat(String),

    #[error("fetch failed: {0}")]
    FetchFailed(String),
}

/// Capability for turning a user-supplied url or id into a `MediaHandle`.
/// The downloader/extractor behind it is somebody else's problem.
pub trait MediaSource {
    fn fetch(&self, url_or_id: &str) -> Result<MediaHandle, FetchError>;
}
