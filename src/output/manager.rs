use crate::config::{Config, FailurePolicy};
use crate::error::{format_bytes, Result, SfcJsError};
use crate::pipeline::{CompileProgress, FileOutcome, ProcessedFile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const METADATA_DIR: &str = ".sfcjs";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileReport {
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
    pub summary: CompileSummary,
    pub files: Vec<FileEntry>,
    pub compile_time: DateTime<Utc>,
    pub errors: Vec<String>,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileSummary {
    pub total_files: usize,
    pub compiled: usize,
    pub passed_through: usize,
    pub skipped: usize,
    pub total_output_bytes: u64,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Destination path relative to the output directory.
    pub path: String,
    pub size: u64,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub source_extension: String,
    pub target_extension: String,
    pub registry: String,
    pub on_error: FailurePolicy,
    pub exclude_dirs: Vec<String>,
    pub max_file_size: u64,
}

impl From<&Config> for ConfigSnapshot {
    fn from(config: &Config) -> Self {
        Self {
            source_extension: config.transform.source_extension.clone(),
            target_extension: config.transform.target_extension.clone(),
            registry: config.transform.registry.clone(),
            on_error: config.transform.on_error,
            exclude_dirs: config.filters.exclude_dirs.clone(),
            max_file_size: config.filters.max_file_size,
        }
    }
}

impl From<&ProcessedFile> for FileEntry {
    fn from(processed: &ProcessedFile) -> Self {
        Self {
            path: processed.file.relative().to_string_lossy().replace('\\', "/"),
            size: processed.file.size(),
            outcome: processed.outcome.clone(),
        }
    }
}

impl CompileReport {
    pub fn has_skipped(&self) -> bool {
        self.summary.skipped > 0
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct OutputManager {
    output_directory: PathBuf,
}

impl OutputManager {
    pub fn new<P: Into<PathBuf>>(output_directory: P) -> Result<Self> {
        let manager = Self {
            output_directory: output_directory.into(),
        };

        manager.validate_paths()?;
        Ok(manager)
    }

    pub fn get_output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn get_metadata_dir(&self) -> PathBuf {
        self.output_directory.join(METADATA_DIR)
    }

    pub fn create_compile_report(
        &self,
        input_directory: &Path,
        processed: &[ProcessedFile],
        progress: &CompileProgress,
        config: &ConfigSnapshot,
    ) -> CompileReport {
        let summary = CompileSummary {
            total_files: progress.files_processed,
            compiled: progress.compiled,
            passed_through: progress.passed_through,
            skipped: progress.skipped,
            total_output_bytes: processed.iter().map(|p| p.file.size()).sum(),
            duration: progress.elapsed(),
        };

        CompileReport {
            input_directory: input_directory.to_path_buf(),
            output_directory: self.output_directory.clone(),
            summary,
            files: processed.iter().map(FileEntry::from).collect(),
            compile_time: Utc::now(),
            errors: progress.errors.clone(),
            config_used: config.clone(),
        }
    }

    /// Save the report as JSON and plain text under the metadata directory.
    /// Returns the path of the JSON file.
    pub fn save_report(&self, report: &CompileReport) -> Result<PathBuf> {
        let metadata_dir = self.get_metadata_dir();
        fs::create_dir_all(&metadata_dir)?;

        let json_path = metadata_dir.join("compile_report.json");
        let json_content =
            serde_json::to_string_pretty(report).map_err(|e| SfcJsError::Config {
                message: format!("Failed to serialize report to JSON: {}", e),
            })?;
        fs::write(&json_path, json_content)?;

        self.save_report_text(report, &metadata_dir.join("compile_report.txt"))?;

        Ok(json_path)
    }

    fn save_report_text(&self, report: &CompileReport, path: &Path) -> Result<()> {
        let mut file = fs::File::create(path)?;

        writeln!(file, "sfcjs Compile Report")?;
        writeln!(file, "====================")?;
        writeln!(file)?;
        writeln!(file, "Input: {}", report.input_directory.display())?;
        writeln!(file, "Output: {}", report.output_directory.display())?;
        writeln!(
            file,
            "Compiled at: {}",
            report.compile_time.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(file, "Duration: {:?}", report.summary.duration)?;
        writeln!(file)?;

        writeln!(file, "Summary:")?;
        writeln!(file, "  Files processed: {}", report.summary.total_files)?;
        writeln!(file, "  Components compiled: {}", report.summary.compiled)?;
        writeln!(file, "  Passed through: {}", report.summary.passed_through)?;
        writeln!(file, "  Skipped: {}", report.summary.skipped)?;
        writeln!(
            file,
            "  Output size: {}",
            format_bytes(report.summary.total_output_bytes)
        )?;
        writeln!(file)?;

        writeln!(file, "Configuration used:")?;
        writeln!(
            file,
            "  Extensions: .{} -> {}",
            report.config_used.source_extension.trim_start_matches('.'),
            report.config_used.target_extension
        )?;
        writeln!(file, "  Registry: {}", report.config_used.registry)?;
        writeln!(file, "  On error: {:?}", report.config_used.on_error)?;
        writeln!(
            file,
            "  Excluded directories: {}",
            report.config_used.exclude_dirs.join(", ")
        )?;
        writeln!(file)?;

        if !report.errors.is_empty() {
            writeln!(file, "Errors encountered:")?;
            for error in &report.errors {
                writeln!(file, "  - {}", error)?;
            }
            writeln!(file)?;
        }

        writeln!(file, "Files:")?;
        for entry in &report.files {
            let marker = match &entry.outcome {
                FileOutcome::Compiled { from } => format!("compiled from {}", from.display()),
                FileOutcome::PassedThrough => "copied".to_string(),
                FileOutcome::Skipped { reason } => format!("skipped: {}", reason),
            };
            writeln!(file, "  {} ({} bytes) - {}", entry.path, entry.size, marker)?;
        }

        Ok(())
    }

    fn validate_paths(&self) -> Result<()> {
        if !self.output_directory.exists() {
            fs::create_dir_all(&self.output_directory).map_err(|e| SfcJsError::Permission {
                path: format!(
                    "Cannot create output directory {}: {}",
                    self.output_directory.display(),
                    e
                ),
            })?;
        }

        let test_file = self.output_directory.join(".sfcjs_write_test");
        match fs::File::create(&test_file) {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                return Err(SfcJsError::Permission {
                    path: format!(
                        "No write permission for directory {}: {}",
                        self.output_directory.display(),
                        e
                    ),
                });
            }
        }

        Ok(())
    }
}
