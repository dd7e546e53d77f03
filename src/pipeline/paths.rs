use super::SourceFile;
use std::path::{Path, PathBuf};

/// Prefix `.` unless already present, so `jsx` and `.jsx` are equivalent.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

/// Component name: the file name without its extension.
pub fn component_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// `true` when the file's extension equals `source_ext` (with or without a
/// leading dot). Comparison is case-sensitive.
pub fn has_extension(path: &Path, source_ext: &str) -> bool {
    let wanted = source_ext.trim_start_matches('.');
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == wanted)
}

/// `base / dirname(relative) / (stem + ext)`. `ext` must already be
/// normalized.
pub fn rewrite_path(file: &SourceFile, ext: &str) -> PathBuf {
    let relative = file.relative();
    let dir = relative.parent().unwrap_or_else(|| Path::new(""));
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    file.base.join(dir).join(format!("{}{}", stem, ext))
}
