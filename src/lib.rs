pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod scanner;
pub mod transform;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, FailurePolicy, FilterConfig, OutputConfig, TransformConfig};
pub use error::{Result, Section, SfcJsError, UserFriendlyError};

// Core functionality re-exports
pub use output::{CompileReport, ConfigSnapshot, FileWriter, OutputManager};
pub use pipeline::{CompileProgress, ComponentCompiler, FileOutcome, ProcessedFile, SourceFile};
pub use scanner::{FileFilter, FileScanner, ScanResult};
pub use transform::{compile_component, SfcTransform};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::{Path, PathBuf};
use tokio::task;

/// Main library interface: compiles a component tree into an output tree.
pub struct SfcJs {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

/// Scanned and compiled files, not yet written.
#[derive(Debug)]
pub struct CompilePlan {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub files: Vec<ProcessedFile>,
    pub scan_errors: Vec<String>,
}

impl SfcJs {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// No signal handler registration.
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::new_for_test(),
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = OutputMode::from(&cli_args.output_format);

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Scan `input_dir` and compile every file in memory.
    pub async fn plan(&self, input_dir: &Path) -> Result<CompilePlan> {
        self.shutdown.check_shutdown()?;

        let input_root = resolve_input_root(input_dir)?;
        let output_root = resolve_output_root(&self.config.output.directory)?;

        if input_root == output_root {
            return Err(SfcJsError::InvalidPath {
                path: format!(
                    "Output directory must differ from the input directory: {}",
                    output_root.display()
                ),
            });
        }

        let scan = self.scan_sources(&input_root, &output_root).await?;
        self.shutdown.check_shutdown()?;

        if scan.files.is_empty() {
            self.output_formatter
                .warning(&format!("No files found in {}", input_root.display()));
        } else {
            self.output_formatter
                .info(&format!("Found {} files", scan.files.len()));
        }

        let files = self.compile_files(scan.files).await?;
        self.shutdown.check_shutdown()?;

        Ok(CompilePlan {
            input_root,
            output_root,
            files,
            scan_errors: scan.errors,
        })
    }

    /// Compile `input_dir` into the configured output directory.
    pub async fn compile_directory(&self, input_dir: &Path) -> Result<CompileReport> {
        self.output_formatter.start_operation("Compiling components");

        let plan = self.plan(input_dir).await?;

        let writer = FileWriter::new().with_force_overwrite(self.config.output.force_overwrite);
        writer.check_conflicts(&plan.files, &plan.output_root)?;

        let output_manager = OutputManager::new(&plan.output_root)?;
        let mut progress =
            self.write_outputs(&writer, &plan.files, output_manager.get_output_directory())?;

        for error in &plan.scan_errors {
            progress.add_error(error.clone());
        }

        let snapshot = ConfigSnapshot::from(&self.config);
        let report = output_manager.create_compile_report(
            &plan.input_root,
            &plan.files,
            &progress,
            &snapshot,
        );

        if self.config.output.generate_report {
            let report_path = output_manager.save_report(&report)?;
            self.output_formatter
                .info(&format!("Report written to {}", report_path.display()));
        }

        self.output_formatter.print_compile_summary(&progress);

        Ok(report)
    }

    async fn scan_sources(&self, input_root: &Path, output_root: &Path) -> Result<ScanResult> {
        let spinner = self.progress_manager.create_spinner("Scanning input directory");

        let scanner =
            FileScanner::new(&self.config.filters).with_excluded_path(output_root.to_path_buf());
        let root = input_root.to_path_buf();

        let scan = task::spawn_blocking(move || scanner.scan_directory(&root))
            .await
            .map_err(|e| SfcJsError::Config {
                message: format!("Scan task failed: {}", e),
            })??;

        spinner.finish_and_clear();

        let stats = FileScanner::new(&self.config.filters).get_statistics(&scan.files);
        self.output_formatter.debug(&stats.display_summary());

        Ok(scan)
    }

    async fn compile_files(&self, files: Vec<SourceFile>) -> Result<Vec<ProcessedFile>> {
        let compiler = ComponentCompiler::from_config(&self.config.transform);
        tracing::debug!(?compiler, files = files.len(), "compiling");

        task::spawn_blocking(move || compiler.process_all(files))
            .await
            .map_err(|e| SfcJsError::Config {
                message: format!("Compile task failed: {}", e),
            })?
    }

    fn write_outputs(
        &self,
        writer: &FileWriter,
        files: &[ProcessedFile],
        output_dir: &Path,
    ) -> Result<CompileProgress> {
        let file_progress = self.progress_manager.create_file_progress(files.len() as u64);
        let mut progress = CompileProgress::new(files.len());

        for processed in files {
            self.shutdown.check_shutdown()?;

            if let Err(e) = writer.write_processed(processed, output_dir) {
                progress.add_error(format!(
                    "Failed to write {}: {}",
                    processed.file.display_path(),
                    e
                ));
            }
            progress.record(processed);

            ui::progress::update_file_progress(&file_progress, &progress);
        }

        ui::progress::finish_progress_with_summary(
            &file_progress,
            &format!("Compiled {} components", progress.compiled),
            progress.elapsed(),
        );

        Ok(progress)
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &SfcJsError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

fn resolve_input_root(input_dir: &Path) -> Result<PathBuf> {
    if !input_dir.exists() {
        return Err(SfcJsError::InputNotFound {
            path: input_dir.display().to_string(),
        });
    }

    Ok(input_dir.canonicalize()?)
}

fn resolve_output_root(output_dir: &Path) -> Result<PathBuf> {
    if output_dir.exists() {
        return Ok(output_dir.canonicalize()?);
    }

    if output_dir.is_absolute() {
        Ok(output_dir.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(output_dir))
    }
}

pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sfcjs {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}
