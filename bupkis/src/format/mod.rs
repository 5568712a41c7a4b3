use crate::context::{AppContext, VerbosityLevel};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use std::time::Duration;
use tabled::{Table, Tabled, settings::Style};

pub use libbupkis::config::{ColorChoice, OutputFormat};

/// Trait for output formatting that can be TTY-aware or plain text
pub trait OutputFormatter: Send + Sync {
    /// Print a success message
    fn success(&self, message: &str);

    /// Print an error message
    fn error(&self, message: &str);

    /// Print a warning message
    fn warning(&self, message: &str);

    /// Create a spinner for indeterminate progress
    fn spinner(&self, message: &str) -> ProgressBar;
}

/// TTY-aware formatter with colors and a spinner
pub struct TtyFormatter;

impl OutputFormatter for TtyFormatter {
    fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    fn warning(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow().bold(), message);
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

/// Plain text formatter for non-TTY output (piped, scripted)
pub struct PlainFormatter;

impl OutputFormatter for PlainFormatter {
    fn success(&self, message: &str) {
        println!("✓ {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("⚠ {}", message);
    }

    fn spinner(&self, _message: &str) -> ProgressBar {
        ProgressBar::hidden()
    }
}

/// Check if we should use colors in output
pub fn should_color(ctx: &AppContext) -> bool {
    match ctx.config.output.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Create the appropriate formatter for the context
pub fn create_formatter(ctx: &AppContext) -> Box<dyn OutputFormatter> {
    if should_color(ctx) {
        Box::new(TtyFormatter)
    } else {
        Box::new(PlainFormatter)
    }
}

/// Print a success message
pub fn success(ctx: &AppContext, message: &str) {
    create_formatter(ctx).success(message);
}

/// Print an error message
pub fn error(ctx: &AppContext, message: &str) {
    create_formatter(ctx).error(message);
}

/// Print a warning message
pub fn warning(ctx: &AppContext, message: &str) {
    create_formatter(ctx).warning(message);
}

/// Start a spinner on stderr; hidden unless stderr is a terminal
pub fn spinner(ctx: &AppContext, message: &str) -> ProgressBar {
    if std::io::stderr().is_terminal() {
        create_formatter(ctx).spinner(message)
    } else {
        ProgressBar::hidden()
    }
}

/// Print a progress message to stderr when the context is at least as
/// verbose as `level`. `Normal` messages are never printed here.
pub fn print(ctx: &AppContext, level: VerbosityLevel, message: &str) {
    if level > VerbosityLevel::Normal && ctx.verbosity >= level {
        eprintln!("{}", message);
    }
}

/// Render rows as a table, JSON or YAML
pub fn render_rows<T: Serialize + Tabled>(
    rows: &[T],
    format: OutputFormat,
) -> Result<String, String> {
    match format {
        OutputFormat::Pretty => Ok(Table::new(rows).with(Style::empty()).to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(rows)
            .map_err(|e| format!("Failed to serialize to JSON: {}", e)),
        OutputFormat::Yaml => {
            serde_yaml::to_string(rows).map_err(|e| format!("Failed to serialize to YAML: {}", e))
        }
    }
}
