use crate::config::FilterConfig;
use regex::Regex;
use std::path::{Path, PathBuf};

pub struct FileFilter {
    max_file_size: u64,
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
    excluded_paths: Vec<PathBuf>,
}

impl FileFilter {
    pub fn new(config: &FilterConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            max_file_size: config.max_file_size,
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_patterns,
            excluded_paths: Vec::new(),
        }
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if self.excluded_paths.iter().any(|p| path == p) {
            return false;
        }

        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            if self.exclude_dirs.iter().any(|exclude| exclude == dir_name) {
                return false;
            }

            if self.matches_any_pattern(&path.to_string_lossy()) {
                return false;
            }
        }

        true
    }

    /// Files matching an exclude pattern are left out of the stream entirely.
    pub fn is_excluded_file(&self, path: &Path) -> bool {
        self.matches_any_pattern(&path.to_string_lossy())
    }

    pub fn is_size_allowed(&self, size: u64) -> bool {
        size <= self.max_file_size
    }

    pub fn matches_any_pattern(&self, text: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }

    /// Skip one specific directory, e.g. an output directory nested in the
    /// input tree.
    pub fn add_excluded_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.excluded_paths.push(path.into());
    }

    pub fn get_max_file_size(&self) -> u64 {
        self.max_file_size
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self::new(&config)
    }
}
