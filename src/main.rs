use anyhow::Context;
use clap::Parser;
use sfcjs::{
    Cli, FileOutcome, OutputFormatter, OutputMode, SfcJs, SfcJsError, UserFriendlyError,
};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(&cli) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let Some(input_dir) = cli.input_dir.clone() else {
        eprintln!("No input directory given. Run `sfcjs --help` for usage.");
        return 1;
    };

    let sfcjs = match SfcJs::from_cli(&cli) {
        Ok(sfcjs) => sfcjs,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&sfcjs, &input_dir).await;
    }

    match sfcjs.compile_directory(&input_dir).await {
        Ok(report) => {
            sfcjs.output_formatter().print_compile_report(&report);

            if report.is_clean() {
                0
            } else {
                2 // Completed, but some files were skipped or not written
            }
        }
        Err(e) => {
            sfcjs.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &SfcJsError) -> i32 {
    match error {
        SfcJsError::Cancelled => 130, // Interrupted (SIGINT)
        SfcJsError::InputNotFound { .. } => 3,
        e if e.is_transform_failure() => 4,
        SfcJsError::Permission { .. } => 7,
        SfcJsError::OutputExists { .. } | SfcJsError::OutputCollision { .. } => 8,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "sfcjs.toml".to_string());

    match SfcJs::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  sfcjs <input-dir> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

async fn handle_dry_run(sfcjs: &SfcJs, input_dir: &Path) -> i32 {
    let formatter = sfcjs.output_formatter();

    formatter.info("DRY RUN MODE - No files will be written");
    formatter.print_separator();

    let config = sfcjs.config();
    formatter.info("Configuration that would be used:");
    println!(
        "  Extensions: .{} -> {}",
        config.transform.source_extension.trim_start_matches('.'),
        sfcjs::pipeline::normalize_extension(&config.transform.target_extension)
    );
    println!("  Registry: {}", config.transform.registry);
    println!("  On error: {:?}", config.transform.on_error);
    println!("  Exclude directories: {}", config.filters.exclude_dirs.join(", "));
    println!("  Output directory: {}", config.output.directory.display());
    formatter.print_separator();

    let plan = match sfcjs.plan(input_dir).await {
        Ok(plan) => plan,
        Err(e) => {
            sfcjs.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    println!("Compile plan ({} files):", plan.files.len());
    for processed in &plan.files {
        let target = processed.file.display_path();
        match &processed.outcome {
            FileOutcome::Compiled { from } => println!("  compile {} -> {}", from.display(), target),
            FileOutcome::PassedThrough => println!("  copy    {}", target),
            FileOutcome::Skipped { reason } => println!("  skip    {} ({})", target, reason),
        }
    }

    for error in &plan.scan_errors {
        formatter.warning(error);
    }

    if sfcjs.config().output.force_overwrite {
        formatter.warning("Force mode enabled - existing output files would be overwritten");
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to write the output");

    0
}

fn print_startup_error(error: &SfcJsError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(cli: &Cli) -> anyhow::Result<()> {
    let default_level = match cli.verbosity_level() {
        _ if cli.quiet => "sfcjs=error",
        0 => "sfcjs=warn",
        1 => "sfcjs=info",
        2 => "sfcjs=debug",
        _ => "sfcjs=trace",
    };

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level).context("invalid default log filter")?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("log subscriber already installed: {}", e))
}
