// Local media library - the thinnest possible fetch implementation.
// Resolves ids against files found under the configured media directories;
// actual downloading/extraction lives behind someone else's MediaSource.

use super::urls::IdExtractor;
use super::{FetchError, MediaHandle, MediaId, MediaSource};
use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Container formats we hand to the engine without complaint.
const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "mkv", "webm"];

pub struct LibrarySource {
    entries: HashMap<String, PathBuf>,
    extractor: IdExtractor,
}

impl LibrarySource {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            extractor: IdExtractor::new(),
        }
    }

    /// Walk the given directories and index every media file by its stem.
    pub fn scan(directories: &[PathBuf]) -> Result<Self> {
        let mut source = Self::new();

        for dir in directories {
            if !dir.exists() {
                debug!("skipping missing media directory {}", dir.display());
                continue;
            }

            for entry in WalkDir::new(dir)
                .follow_links(true)
                .into_iter()
                .filter_map(Result::ok)
            {
                let path = entry.path();

                if !entry.file_type().is_file() {
                    continue;
                }

                // Skip hidden files (dotfiles)
                if path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with('.'))
                {
                    continue;
                }

                // Skip empty files - nothing to play there
                if fs::metadata(path).map_or(true, |m| m.len() == 0) {
                    continue;
                }

                if !is_supported_file(path) {
                    continue;
                }

                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    source
                        .entries
                        .insert(stem.to_string(), path.to_path_buf());
                }
            }
        }

        info!("media library indexed {} items", source.entries.len());
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &PathBuf)> {
        self.entries.iter()
    }
}

impl Default for LibrarySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSource for LibrarySource {
    fn fetch(&self, url_or_id: &str) -> Result<MediaHandle, FetchError> {
        let input = url_or_id.trim();

        // Direct file reference: judge it by its extension before anything else
        if let Some(ext) = file_extension(input) {
            if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                return Err(FetchError::UnsupportedFormat(ext));
            }
            let stem = Path::new(input)
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| FetchError::InvalidUrl(input.to_string()))?;
            return self.lookup(stem);
        }

        // Exact stem match beats url parsing - local names can be short
        if self.entries.contains_key(input) {
            return self.lookup(input);
        }

        let id = self
            .extractor
            .extract(input)
            .ok_or_else(|| FetchError::InvalidUrl(input.to_string()))?;

        self.lookup(&id)
    }
}

impl LibrarySource {
    fn lookup(&self, id: &str) -> Result<MediaHandle, FetchError> {
        match self.entries.get(id) {
            Some(path) => {
                Ok(MediaHandle::new(MediaId::new(id)).with_path(path.clone()))
            }
            None => Err(FetchError::FetchFailed(format!(
                "'{id}' is not in the local library"
            ))),
        }
    }
}

fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Extension of the last path/url segment, lowercased. None when the input
/// doesn't end in a file-looking segment.
fn file_extension(input: &str) -> Option<String> {
    let segment = input.rsplit('/').next().unwrap_or(input);
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.contains('?') || ext.contains('&') {
        return None;
    }
    Some(ext.to_lowercase())
}
