use crate::cli::OutputFormat;
use crate::error::{format_bytes, SfcJsError, UserFriendlyError};
use crate::output::CompileReport;
use crate::pipeline::{CompileProgress, FileOutcome};
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl From<&OutputFormat> for OutputMode {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &SfcJsError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_compile_summary(&self, progress: &CompileProgress) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(progress),
            OutputMode::Json => self.print_json_summary(progress),
            OutputMode::Plain => self.print_plain_summary(progress),
        }
    }

    pub fn print_compile_report(&self, report: &CompileReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report);
                }
            }
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => {
                if !self.quiet {
                    self.print_plain_report(report);
                }
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_summary(&self, progress: &CompileProgress) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Compilation completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Compilation completed!");
        }

        println!();
        println!(
            "  Components compiled: {}",
            self.highlight(progress.compiled.to_string())
        );
        println!(
            "  Files copied:        {}",
            self.highlight(progress.passed_through.to_string())
        );
        if progress.skipped > 0 {
            let skipped = progress.skipped.to_string();
            println!(
                "  Skipped:             {}",
                if self.use_colors {
                    style(skipped).yellow().bold().to_string()
                } else {
                    skipped
                }
            );
        }
        println!(
            "  Time taken:          {}",
            self.highlight(format_duration(progress.elapsed()))
        );

        if !progress.errors.is_empty() {
            println!();
            for error in &progress.errors {
                println!("  - {}", error);
            }
        }

        self.print_separator();
    }

    fn print_json_summary(&self, progress: &CompileProgress) {
        let summary = serde_json::json!({
            "type": "summary",
            "files_processed": progress.files_processed,
            "compiled": progress.compiled,
            "passed_through": progress.passed_through,
            "skipped": progress.skipped,
            "duration_ms": progress.elapsed().as_millis(),
            "errors": progress.errors,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        self.print_json_object(&summary);
    }

    fn print_plain_summary(&self, progress: &CompileProgress) {
        println!("COMPLETED: Compilation");
        println!("Compiled: {}", progress.compiled);
        println!("Copied: {}", progress.passed_through);
        println!("Skipped: {}", progress.skipped);
        println!("Duration: {:?}", progress.elapsed());
        for error in &progress.errors {
            println!("Error: {}", error);
        }
    }

    fn print_human_report(&self, report: &CompileReport) {
        self.print_header("Compile Report");

        println!("Input:  {}", report.input_directory.display());
        println!("Output: {}", report.output_directory.display());
        println!(
            "Compiled at: {}",
            report.compile_time.format("%Y-%m-%d %H:%M UTC")
        );
        println!(
            "Output size: {}",
            format_bytes(report.summary.total_output_bytes)
        );
        println!();

        if self.verbose_level > 0 {
            for entry in &report.files {
                match &entry.outcome {
                    FileOutcome::Compiled { from } => {
                        println!("  {} -> {}", from.display(), entry.path)
                    }
                    FileOutcome::PassedThrough => println!("  {}", entry.path),
                    FileOutcome::Skipped { reason } => {
                        println!("  {} (skipped: {})", entry.path, reason)
                    }
                }
            }
            println!();
        }

        if !report.errors.is_empty() {
            println!("Issues encountered:");
            for error in &report.errors {
                println!("  - {}", error);
            }
        }
    }

    fn print_plain_report(&self, report: &CompileReport) {
        println!("REPORT: Compilation completed");
        println!("Output: {}", report.output_directory.display());
        println!("Files: {}", report.summary.total_files);
        println!("Size: {} bytes", report.summary.total_output_bytes);
        println!("Duration: {:?}", report.summary.duration);

        if !report.errors.is_empty() {
            println!("Errors: {}", report.errors.len());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}
