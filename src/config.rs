use crate::error::{Result, SfcJsError};
use crate::transform::DEFAULT_REGISTRY;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// What happens to a component that cannot be compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the run with the transform error
    Fail,
    /// Pass the file through unchanged and log a warning
    #[default]
    Skip,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransformConfig {
    pub source_extension: String,
    pub target_extension: String,
    pub registry: String,
    pub on_error: FailurePolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_depth: usize,
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub generate_report: bool,
    pub force_overwrite: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            source_extension: "vue".to_string(),
            target_extension: "js".to_string(),
            registry: DEFAULT_REGISTRY.to_string(),
            on_error: FailurePolicy::Skip,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "target".to_string(),
                "dist".to_string(),
            ],
            exclude_patterns: Vec::new(),
            max_depth: 32,
            max_file_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("dist"),
            generate_report: false,
            force_overwrite: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SfcJsError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SfcJsError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| SfcJsError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["sfcjs.toml", ".sfcjs.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref ext) = cli_args.target_extension {
            self.transform.target_extension = ext.clone();
        }

        if let Some(ref registry) = cli_args.registry {
            self.transform.registry = registry.clone();
        }

        if let Some(policy) = cli_args.on_error {
            self.transform.on_error = policy;
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.filters.exclude_dirs.extend(exclude.clone());
        }

        if let Some(max_size) = cli_args.max_file_size {
            self.filters.max_file_size = max_size;
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.directory = output_dir.clone();
        }

        if let Some(report) = cli_args.generate_report {
            self.output.generate_report = report;
        }

        if cli_args.force {
            self.output.force_overwrite = true;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| SfcJsError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| SfcJsError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let ext = self.transform.target_extension.trim();
        if ext.is_empty() || ext == "." {
            return Err(SfcJsError::Config {
                message: "Target extension must not be empty".to_string(),
            });
        }

        if ext.contains('/') || ext.contains('\\') {
            return Err(SfcJsError::Config {
                message: format!("Target extension cannot contain path separators: {}", ext),
            });
        }

        if self.transform.source_extension.trim_start_matches('.').is_empty() {
            return Err(SfcJsError::Config {
                message: "Source extension must not be empty".to_string(),
            });
        }

        if self.transform.registry.trim().is_empty() {
            return Err(SfcJsError::Config {
                message: "Registry expression must not be empty".to_string(),
            });
        }

        if self.filters.max_file_size == 0 {
            return Err(SfcJsError::Config {
                message: "Maximum file size must be greater than 0".to_string(),
            });
        }

        if self.filters.max_depth == 0 {
            return Err(SfcJsError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        for pattern in &self.filters.exclude_patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(SfcJsError::Config {
                    message: format!("Invalid exclude pattern '{}': {}", pattern, e),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub target_extension: Option<String>,
    pub registry: Option<String>,
    pub on_error: Option<FailurePolicy>,
    pub exclude: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub generate_report: Option<bool>,
    pub force: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_extension(mut self, ext: Option<String>) -> Self {
        self.target_extension = ext;
        self
    }

    pub fn with_registry(mut self, registry: Option<String>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_on_error(mut self, policy: Option<FailurePolicy>) -> Self {
        self.on_error = policy;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_max_file_size(mut self, max_size: Option<u64>) -> Self {
        self.max_file_size = max_size;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_generate_report(mut self, report: Option<bool>) -> Self {
        self.generate_report = report;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}
