use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One item flowing through the pipeline.
///
/// `path` always lives under `base`; the part below `base` is what gets
/// reproduced in the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub base: PathBuf,
    pub path: PathBuf,
    pub contents: Vec<u8>,
    pub modified: Option<SystemTime>,
}

impl SourceFile {
    pub fn new<B, P, C>(base: B, path: P, contents: C) -> Self
    where
        B: Into<PathBuf>,
        P: Into<PathBuf>,
        C: Into<Vec<u8>>,
    {
        Self {
            base: base.into(),
            path: path.into(),
            contents: contents.into(),
            modified: None,
        }
    }

    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Path relative to `base`. Falls back to the full path when `path` is
    /// not under `base`.
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    pub fn contents_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }

    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    pub fn display_path(&self) -> String {
        self.relative().display().to_string()
    }
}
