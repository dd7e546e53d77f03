use crate::error::{Result, SfcJsError};
use crate::pipeline::{FileOutcome, ProcessedFile, SourceFile};
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

#[cfg(windows)]
const MAX_PATH: usize = 260;

#[cfg(not(windows))]
const MAX_PATH: usize = 4096;

/// Writes processed files below a destination root, mirroring their
/// position relative to the input root.
pub struct FileWriter {
    force_overwrite: bool,
    buffer_size: usize,
}

impl FileWriter {
    pub fn new() -> Self {
        Self {
            force_overwrite: false,
            buffer_size: 64 * 1024,
        }
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn destination_for(&self, file: &SourceFile, dest_root: &Path) -> PathBuf {
        dest_root.join(file.relative())
    }

    /// Runs before anything is written. Fails with `OutputCollision` when two
    /// files map to the same destination, even under `force`, and with
    /// `OutputExists` when a destination is already present and `force` is
    /// off.
    pub fn check_conflicts(&self, files: &[ProcessedFile], dest_root: &Path) -> Result<()> {
        let mut claimed: HashMap<PathBuf, String> = HashMap::with_capacity(files.len());

        for processed in files {
            let dest = self.destination_for(&processed.file, dest_root);
            let source = source_display(processed);

            if let Some(first) = claimed.get(&dest) {
                return Err(SfcJsError::OutputCollision {
                    path: dest.display().to_string(),
                    first: first.clone(),
                    second: source,
                });
            }

            if !self.force_overwrite && dest.exists() {
                return Err(SfcJsError::OutputExists {
                    path: dest.display().to_string(),
                });
            }

            claimed.insert(dest, source);
        }

        Ok(())
    }

    /// Write one processed file and return the number of bytes written.
    /// Files forwarded unchanged keep their source modification time.
    pub fn write_processed(&self, processed: &ProcessedFile, dest_root: &Path) -> Result<u64> {
        let dest = self.destination_for(&processed.file, dest_root);

        validate_relative(processed.file.relative())?;
        self.validate_destination_path(&dest)?;

        if dest.exists() && !self.force_overwrite {
            return Err(SfcJsError::OutputExists {
                path: dest.display().to_string(),
            });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let written = self.write_bytes(&processed.file.contents, &dest)?;

        let forwarded = !matches!(processed.outcome, FileOutcome::Compiled { .. });
        if forwarded {
            if let Some(modified) = processed.file.modified {
                let _ = filetime::set_file_mtime(
                    &dest,
                    filetime::FileTime::from_system_time(modified),
                );
            }
        }

        tracing::trace!(dest = %dest.display(), bytes = written, "wrote file");
        Ok(written)
    }

    fn write_bytes(&self, contents: &[u8], dest: &Path) -> Result<u64> {
        let dest_file = fs::File::create(dest)?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, dest_file);

        writer.write_all(contents)?;
        writer.flush()?;

        Ok(contents.len() as u64)
    }

    fn validate_destination_path(&self, path: &Path) -> Result<()> {
        check_path_length(path)?;
        validate_file_name(path)
    }
}

impl Default for FileWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Input-side path of a processed file.
fn source_display(processed: &ProcessedFile) -> String {
    match &processed.outcome {
        FileOutcome::Compiled { from } => from.display().to_string(),
        _ => processed.file.display_path(),
    }
}

fn validate_relative(relative: &Path) -> Result<()> {
    if relative.is_absolute() {
        return Err(SfcJsError::InvalidPath {
            path: format!("File is outside the input directory: {}", relative.display()),
        });
    }

    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(SfcJsError::InvalidPath {
            path: format!("Directory traversal not allowed: {}", relative.display()),
        });
    }

    Ok(())
}

fn validate_file_name(path: &Path) -> Result<()> {
    if let Some(filename) = path.file_name().and_then(|s| s.to_str()) {
        #[cfg(windows)]
        {
            let reserved_names = [
                "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6",
                "COM7", "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7",
                "LPT8", "LPT9",
            ];

            let name_upper = filename.to_uppercase();
            let base_name = name_upper.split('.').next().unwrap_or(&name_upper);

            if reserved_names.contains(&base_name) {
                return Err(SfcJsError::InvalidPath {
                    path: format!("Reserved filename on Windows: {}", filename),
                });
            }
        }

        if filename.chars().any(|c| c.is_control()) {
            return Err(SfcJsError::InvalidPath {
                path: format!("Filename contains control characters: {}", filename.escape_debug()),
            });
        }
    }

    Ok(())
}

pub fn check_path_length(path: &Path) -> Result<()> {
    let path_str = path.to_string_lossy();

    if path_str.len() > MAX_PATH {
        Err(SfcJsError::InvalidPath {
            path: format!(
                "Path too long: {} characters (max: {})",
                path_str.len(),
                MAX_PATH
            ),
        })
    } else {
        Ok(())
    }
}
