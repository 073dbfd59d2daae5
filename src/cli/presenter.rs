//! CLI presenter for output formatting
//!
//! Status goes to stderr so stdout carries only results (the saved path,
//! config values) and stays scriptable.

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TICK: Duration = Duration::from_millis(80);

/// Presenter for CLI output formatting
#[derive(Default)]
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let spinner = ProgressBar::new_spinner()
            .with_style(style)
            .with_message(message.to_string());
        spinner.enable_steady_tick(SPINNER_TICK);
        self.spinner = Some(spinner);
    }

    /// Finish the spinner with a green check
    pub fn spinner_success(&mut self, message: &str) {
        self.finish_spinner(format!("{} {}", "✓".green(), message));
    }

    /// Finish the spinner with a yellow warning sign
    pub fn spinner_fail(&mut self, message: &str) {
        self.finish_spinner(format!("{} {}", "⚠".yellow(), message));
    }

    fn finish_spinner(&mut self, line: String) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(line);
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinner.is_some()
    }

    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print the lines burned into a photo, dimmed, to stderr
    pub fn overlay_lines(&self, lines: &[&str]) {
        for line in lines {
            eprintln!("  {}", line.dimmed());
        }
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}
