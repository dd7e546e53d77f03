use crate::config::FilterConfig;
use crate::error::{format_bytes, Result, SfcJsError};
use crate::pipeline::SourceFile;
use crate::scanner::file_filter::FileFilter;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Files read from an input tree, plus the entries that could not be read.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<SourceFile>,
    pub errors: Vec<String>,
}

pub struct FileScanner {
    filter: FileFilter,
    max_depth: usize,
}

impl FileScanner {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
        }
    }

    pub fn with_excluded_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.filter.add_excluded_path(path);
        self
    }

    /// Read every file under `root` into a `SourceFile` whose base is `root`.
    ///
    /// Entries that cannot be read are collected in `errors`; the scan only
    /// fails when errors occurred and nothing at all could be read.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<ScanResult> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(SfcJsError::InputNotFound {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(SfcJsError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut files = Vec::new();
        let mut scan_errors = Vec::new();

        let walker = WalkDir::new(root_path)
            .max_depth(self.max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        scan_errors.push(format!("Permission denied: {}", err));
                    } else {
                        scan_errors.push(format!("Scan error: {}", err));
                    }
                    continue;
                }
            };

            if entry.file_type().is_file() {
                match self.read_file(&entry, root_path) {
                    Ok(Some(file)) => files.push(file),
                    Ok(None) => {}
                    Err(err) => {
                        scan_errors.push(format!(
                            "Error reading {}: {}",
                            entry.path().display(),
                            err
                        ));
                    }
                }
            }
        }

        for err in &scan_errors {
            tracing::warn!("{}", err);
        }

        if !scan_errors.is_empty() && files.is_empty() {
            return Err(SfcJsError::Permission {
                path: format!("Multiple scan errors: {}", scan_errors.join(", ")),
            });
        }

        files.sort_by(|a, b| a.relative().cmp(b.relative()));
        tracing::debug!(root = %root_path.display(), files = files.len(), "scan complete");

        Ok(ScanResult {
            files,
            errors: scan_errors,
        })
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || entry.file_type().is_file() {
            return true;
        }

        if entry.file_type().is_dir() {
            return self.filter.should_traverse_directory(entry.path());
        }

        true
    }

    fn read_file(&self, entry: &DirEntry, root_path: &Path) -> Result<Option<SourceFile>> {
        let path = entry.path();

        if self.filter.is_excluded_file(path) {
            tracing::trace!(path = %path.display(), "excluded by pattern");
            return Ok(None);
        }

        let metadata = entry.metadata().map_err(|e| SfcJsError::Io(e.into()))?;

        if !self.filter.is_size_allowed(metadata.len()) {
            return Err(SfcJsError::FileTooLarge {
                size: metadata.len(),
                max_size: self.filter.get_max_file_size(),
            });
        }

        validate_relative_path(path, root_path)?;

        let contents = std::fs::read(path)?;
        let mut file = SourceFile::new(root_path, path, contents);
        if let Ok(modified) = metadata.modified() {
            file = file.with_modified(modified);
        }

        Ok(Some(file))
    }

    pub fn get_statistics(&self, files: &[SourceFile]) -> ScanStatistics {
        let total_files = files.len();
        let total_size = files.iter().map(|f| f.size()).sum();

        let mut files_by_extension = HashMap::new();
        for file in files {
            let ext = file.extension().unwrap_or("no_extension").to_string();
            *files_by_extension.entry(ext).or_insert(0) += 1;
        }

        let (largest_file_size, largest_file_path) = files
            .iter()
            .max_by_key(|f| f.size())
            .map(|f| (f.size(), f.relative().to_path_buf()))
            .unwrap_or((0, PathBuf::new()));

        ScanStatistics {
            total_files,
            total_size,
            files_by_extension,
            largest_file_size,
            largest_file_path,
        }
    }
}

fn validate_relative_path(file_path: &Path, root_path: &Path) -> Result<()> {
    let relative = file_path
        .strip_prefix(root_path)
        .map_err(|_| SfcJsError::InvalidPath {
            path: format!(
                "Cannot calculate relative path for {} from root {}",
                file_path.display(),
                root_path.display()
            ),
        })?;

    if relative
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(SfcJsError::InvalidPath {
            path: format!(
                "Path contains parent directory references: {}",
                relative.display()
            ),
        });
    }

    Ok(())
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub files_by_extension: HashMap<String, usize>,
    pub largest_file_size: u64,
    pub largest_file_path: PathBuf,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Total files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        if !self.files_by_extension.is_empty() {
            summary.push_str("  Files by type:\n");
            let mut extensions: Vec<_> = self.files_by_extension.iter().collect();
            extensions.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

            for (ext, count) in extensions {
                summary.push_str(&format!("    {}: {} files\n", ext, count));
            }
        }

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest file: {} ({})\n",
                self.largest_file_path.display(),
                format_bytes(self.largest_file_size)
            ));
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config() -> FilterConfig {
        FilterConfig {
            max_file_size: 1024,
            exclude_dirs: vec![".git".to_string(), "node_modules".to_string()],
            exclude_patterns: vec![r".*\.min\..*".to_string()],
            max_depth: 5,
        }
    }

    fn create_tree(root: &Path) {
        fs::create_dir_all(root.join("components/forms")).unwrap();
        fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        fs::write(root.join("App.vue"), "<template></template>").unwrap();
        fs::write(root.join("components/forms/Input.vue"), "<template></template>").unwrap();
        fs::write(root.join("components/util.js"), "export const x = 1;").unwrap();
        fs::write(root.join("components/vendor.min.js"), "x").unwrap();
        fs::write(root.join("node_modules/lib/Dep.vue"), "x").unwrap();
    }

    #[test]
    fn test_scan_collects_all_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        create_tree(temp_dir.path());

        let scanner = FileScanner::new(&create_test_config());
        let result = scanner.scan_directory(temp_dir.path()).unwrap();

        let relative: Vec<_> = result
            .files
            .iter()
            .map(|f| f.relative().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("App.vue"),
                PathBuf::from("components/forms/Input.vue"),
                PathBuf::from("components/util.js"),
            ]
        );
        assert!(result.errors.is_empty());
        assert_eq!(result.files[0].base, temp_dir.path());
        assert_eq!(result.files[0].contents, b"<template></template>");
        assert!(result.files[0].modified.is_some());
    }

    #[test]
    fn test_default_filters_keep_minified_files() {
        let temp_dir = TempDir::new().unwrap();
        create_tree(temp_dir.path());

        let scanner = FileScanner::new(&FilterConfig::default());
        let result = scanner.scan_directory(temp_dir.path()).unwrap();

        assert!(result
            .files
            .iter()
            .any(|f| f.relative() == Path::new("components/vendor.min.js")));
        assert!(!result
            .files
            .iter()
            .any(|f| f.relative().starts_with("node_modules")));
    }

    #[test]
    fn test_oversized_files_reported() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Small.vue"), "ok").unwrap();
        fs::write(temp_dir.path().join("Big.vue"), vec![b'a'; 2048]).unwrap();

        let scanner = FileScanner::new(&create_test_config());
        let result = scanner.scan_directory(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("Big.vue"));
        assert!(result.errors[0].contains("File too large"));
    }

    #[test]
    fn test_excluded_output_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("App.js"), "compiled").unwrap();
        fs::write(temp_dir.path().join("App.vue"), "source").unwrap();

        let scanner = FileScanner::new(&create_test_config()).with_excluded_path(&out);
        let result = scanner.scan_directory(temp_dir.path()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].relative(), Path::new("App.vue"));
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileScanner::new(&create_test_config())
            .scan_directory(temp_dir.path())
            .unwrap();
        assert!(result.files.is_empty());
    }

    #[test]
    fn test_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileScanner::new(&create_test_config())
            .scan_directory(temp_dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, SfcJsError::InputNotFound { .. }));
    }

    #[test]
    fn test_root_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("App.vue");
        fs::write(&file, "x").unwrap();

        let err = FileScanner::new(&create_test_config())
            .scan_directory(&file)
            .unwrap_err();
        assert!(matches!(err, SfcJsError::InvalidPath { .. }));
    }

    #[test]
    fn test_scan_statistics() {
        let files = vec![
            SourceFile::new("/src", "/src/A.vue", vec![b'a'; 100]),
            SourceFile::new("/src", "/src/b/B.vue", vec![b'b'; 200]),
            SourceFile::new("/src", "/src/README", "x"),
        ];

        let scanner = FileScanner::new(&create_test_config());
        let stats = scanner.get_statistics(&files);

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_size, 301);
        assert_eq!(stats.files_by_extension.get("vue"), Some(&2));
        assert_eq!(stats.files_by_extension.get("no_extension"), Some(&1));
        assert_eq!(stats.largest_file_path, PathBuf::from("b/B.vue"));
        assert!(stats.display_summary().contains("vue: 2 files"));
    }
}
