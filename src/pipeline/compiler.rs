use super::paths::{component_name, has_extension, normalize_extension, rewrite_path};
use super::SourceFile;
use crate::config::{FailurePolicy, TransformConfig};
use crate::error::{Result, SfcJsError};
use crate::transform::SfcTransform;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What the pipeline did with one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Transformed and renamed; `from` is the original relative path.
    Compiled { from: PathBuf },
    /// Not a component; forwarded untouched.
    PassedThrough,
    /// A component that failed to transform; forwarded untouched.
    Skipped { reason: String },
}

#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub file: SourceFile,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone)]
pub struct CompileProgress {
    pub total_files: usize,
    pub files_processed: usize,
    pub compiled: usize,
    pub passed_through: usize,
    pub skipped: usize,
    pub current_file: Option<String>,
    pub start_time: Instant,
    pub errors: Vec<String>,
}

impl CompileProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            files_processed: 0,
            compiled: 0,
            passed_through: 0,
            skipped: 0,
            current_file: None,
            start_time: Instant::now(),
            errors: Vec::new(),
        }
    }

    pub fn record(&mut self, processed: &ProcessedFile) {
        self.files_processed += 1;
        self.current_file = Some(processed.file.display_path());

        match &processed.outcome {
            FileOutcome::Compiled { .. } => self.compiled += 1,
            FileOutcome::PassedThrough => self.passed_through += 1,
            FileOutcome::Skipped { reason } => {
                self.skipped += 1;
                self.errors
                    .push(format!("{}: {}", processed.file.display_path(), reason));
            }
        }
    }

    pub fn add_error<S: Into<String>>(&mut self, error: S) {
        self.errors.push(error.into());
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn estimated_remaining(&self) -> Duration {
        if self.files_processed == 0 {
            return Duration::from_secs(0);
        }

        let rate = self.files_processed as f64 / self.elapsed().as_secs_f64();
        let remaining_files = self.total_files.saturating_sub(self.files_processed);

        if rate > 0.0 && rate.is_finite() {
            Duration::from_secs_f64(remaining_files as f64 / rate)
        } else {
            Duration::from_secs(0)
        }
    }
}

/// Per-file stage: compiles components, forwards everything else.
pub struct ComponentCompiler {
    transform: SfcTransform,
    source_extension: String,
    target_extension: String,
    on_error: FailurePolicy,
}

impl ComponentCompiler {
    pub fn new() -> Self {
        Self {
            transform: SfcTransform::new(),
            source_extension: "vue".to_string(),
            target_extension: ".js".to_string(),
            on_error: FailurePolicy::default(),
        }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new()
            .with_source_extension(&config.source_extension)
            .with_extension(&config.target_extension)
            .with_registry(config.registry.clone())
            .with_failure_policy(config.on_error)
    }

    /// Target extension; `jsx` and `.jsx` are equivalent.
    pub fn with_extension(mut self, ext: &str) -> Self {
        self.target_extension = normalize_extension(ext);
        self
    }

    pub fn with_source_extension(mut self, ext: &str) -> Self {
        self.source_extension = ext.trim().trim_start_matches('.').to_string();
        self
    }

    pub fn with_registry<S: Into<String>>(mut self, registry: S) -> Self {
        self.transform = self.transform.with_registry(registry);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_error = policy;
        self
    }

    pub fn target_extension(&self) -> &str {
        &self.target_extension
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.on_error
    }

    pub fn is_eligible(&self, file: &SourceFile) -> bool {
        has_extension(&file.path, &self.source_extension)
    }

    /// Transform an eligible file into its renamed output. Errors carry the
    /// file path.
    pub fn compile_file(&self, file: &SourceFile) -> Result<SourceFile> {
        let name = component_name(&file.path).ok_or_else(|| {
            SfcJsError::InvalidComponentName {
                name: file.path.display().to_string(),
            }
            .in_file(&file.path)
        })?;

        let source = file
            .contents_str()
            .ok_or_else(|| SfcJsError::InvalidEncoding.in_file(&file.path))?;

        let compiled = self
            .transform
            .compile(source, &name)
            .map_err(|e| e.in_file(&file.path))?;

        Ok(SourceFile {
            base: file.base.clone(),
            path: rewrite_path(file, &self.target_extension),
            contents: compiled.into_bytes(),
            modified: file.modified,
        })
    }

    /// Run one file through the stage, applying the failure policy.
    pub fn process(&self, file: SourceFile) -> Result<ProcessedFile> {
        if !self.is_eligible(&file) {
            tracing::trace!(path = %file.display_path(), "passing through");
            return Ok(ProcessedFile {
                file,
                outcome: FileOutcome::PassedThrough,
            });
        }

        match self.compile_file(&file) {
            Ok(compiled) => {
                tracing::debug!(
                    from = %file.display_path(),
                    to = %compiled.display_path(),
                    "compiled component"
                );
                Ok(ProcessedFile {
                    file: compiled,
                    outcome: FileOutcome::Compiled {
                        from: file.relative().to_path_buf(),
                    },
                })
            }
            Err(err) => match self.on_error {
                FailurePolicy::Fail => Err(err),
                FailurePolicy::Skip => {
                    let reason = match &err {
                        SfcJsError::Transform { source, .. } => source.to_string(),
                        other => other.to_string(),
                    };
                    tracing::warn!(
                        path = %file.display_path(),
                        %reason,
                        "component not compiled, passing through unchanged"
                    );
                    Ok(ProcessedFile {
                        file,
                        outcome: FileOutcome::Skipped { reason },
                    })
                }
            },
        }
    }

    /// Process a batch, keeping input order. Under `Fail`, the first failure
    /// aborts the batch.
    #[cfg(not(feature = "parallel"))]
    pub fn process_all(&self, files: Vec<SourceFile>) -> Result<Vec<ProcessedFile>> {
        files.into_iter().map(|file| self.process(file)).collect()
    }

    /// Process a batch in parallel, keeping input order. Under `Fail`, the
    /// first failure in input order is returned.
    #[cfg(feature = "parallel")]
    pub fn process_all(&self, files: Vec<SourceFile>) -> Result<Vec<ProcessedFile>> {
        use rayon::prelude::*;

        let results: Vec<Result<ProcessedFile>> = files
            .into_par_iter()
            .map(|file| self.process(file))
            .collect();

        results.into_iter().collect()
    }
}

impl Default for ComponentCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&TransformConfig> for ComponentCompiler {
    fn from(config: &TransformConfig) -> Self {
        Self::from_config(config)
    }
}

impl std::fmt::Debug for ComponentCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCompiler")
            .field("source_extension", &self.source_extension)
            .field("target_extension", &self.target_extension)
            .field("registry", &self.transform.registry())
            .field("on_error", &self.on_error)
            .finish()
    }
}
