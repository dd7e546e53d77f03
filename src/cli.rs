use crate::config::{CliOverrides, Config, FailurePolicy};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sfcjs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile Vue single-file components into plain script registrations")]
#[command(
    long_about = "sfcjs walks a directory, turns every single-file component into a script \
                  that registers the component object on a global registry, and copies all \
                  other files to the output directory unchanged."
)]
#[command(after_help = "EXAMPLES:\n  \
    sfcjs src/components\n  \
    sfcjs src/components -o public/components --ext mjs\n  \
    sfcjs src --registry globalThis.Components --on-error fail\n  \
    sfcjs src --config sfcjs.toml --output-format json")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Directory containing the component sources
    #[arg(required_unless_present = "generate_config")]
    pub input_dir: Option<PathBuf>,

    /// Destination directory (defaults to the configured output directory)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Extension for compiled components, with or without the leading dot
    #[arg(short, long, help = "Output extension for compiled components (e.g., js, .mjs)")]
    pub ext: Option<String>,

    /// Global registry expression the components are assigned to
    #[arg(long, help = "Registry object expression (default: window.VueComponents)")]
    pub registry: Option<String>,

    /// What to do with a component that cannot be compiled
    #[arg(long, value_enum)]
    pub on_error: Option<FailurePolicy>,

    /// Directories to exclude from the scan
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Maximum file size (e.g. 512KB, 10MB)
    #[arg(long, value_parser = parse_size_string)]
    pub max_size: Option<u64>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Write a JSON compile report into the output directory
    #[arg(long)]
    pub report: bool,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite files that already exist in the output directory
    #[arg(long)]
    pub force: bool,

    /// Show what would be compiled without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_target_extension(self.ext.clone())
            .with_registry(self.registry.clone())
            .with_on_error(self.on_error)
            .with_exclude(self.exclude.clone())
            .with_max_file_size(self.max_size)
            .with_output_dir(self.out_dir.clone())
            .with_generate_report(self.report.then_some(true))
            .with_force(self.force)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn parse_size_string(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim().to_lowercase();

    let (number_str, multiplier) = if s.ends_with("kb") || s.ends_with('k') {
        (s.trim_end_matches("kb").trim_end_matches('k'), 1024)
    } else if s.ends_with("mb") || s.ends_with('m') {
        (s.trim_end_matches("mb").trim_end_matches('m'), 1024 * 1024)
    } else if s.ends_with("gb") || s.ends_with('g') {
        (
            s.trim_end_matches("gb").trim_end_matches('g'),
            1024 * 1024 * 1024,
        )
    } else if s.ends_with('b') {
        (s.trim_end_matches('b'), 1)
    } else {
        (s.as_str(), 1)
    };

    let number: f64 = number_str
        .parse()
        .map_err(|_| format!("Invalid number format: {}", number_str))?;

    if number < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    Ok((number * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sfcjs").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_minimal() {
        let cli = parse(&["src/components"]);
        assert_eq!(cli.input_dir, Some(PathBuf::from("src/components")));
        assert!(cli.ext.is_none());
        assert!(cli.on_error.is_none());
        assert!(!cli.force);
    }

    #[test]
    fn test_parse_transform_options() {
        let cli = parse(&[
            "src",
            "-o",
            "out",
            "-e",
            ".mjs",
            "--registry",
            "globalThis.C",
            "--on-error",
            "fail",
        ]);

        assert_eq!(cli.out_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.ext.as_deref(), Some(".mjs"));
        assert_eq!(cli.registry.as_deref(), Some("globalThis.C"));
        assert_eq!(cli.on_error, Some(FailurePolicy::Fail));
    }

    #[test]
    fn test_input_required_unless_generating_config() {
        let missing = Cli::try_parse_from(["sfcjs", "--force"]);
        assert!(missing.is_err());

        let generate = Cli::try_parse_from(["sfcjs", "--generate-config"]).unwrap();
        assert!(generate.generate_config);
        assert!(generate.input_dir.is_none());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["sfcjs", "src", "-q", "-v"]).is_err());
        assert_eq!(parse(&["src", "-vv"]).verbosity_level(), 2);
        assert_eq!(parse(&["src", "-q"]).verbosity_level(), 0);
    }

    #[test]
    fn test_overrides_applied_to_config() {
        let cli = parse(&["src", "-e", "jsx", "--max-size", "1KB", "--report", "--force"]);
        let mut config = Config::default();
        config.merge_with_cli_args(&cli.create_cli_overrides());

        assert_eq!(config.transform.target_extension, "jsx");
        assert_eq!(config.filters.max_file_size, 1024);
        assert!(config.output.generate_report);
        assert!(config.output.force_overwrite);
        assert_eq!(config.transform.on_error, FailurePolicy::Skip);
    }

    #[test]
    fn test_parse_size_string() {
        assert_eq!(parse_size_string("10").unwrap(), 10);
        assert_eq!(parse_size_string("10KB").unwrap(), 10 * 1024);
        assert_eq!(parse_size_string("5MB").unwrap(), 5 * 1024 * 1024);
        assert_eq!(parse_size_string("1GB").unwrap(), 1024 * 1024 * 1024);

        assert!(parse_size_string("invalid").is_err());
        assert!(parse_size_string("-5MB").is_err());
    }
}
