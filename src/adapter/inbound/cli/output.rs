//! Terminal output for the allocator commands.
//!
//! Every printer checks the global mode first: `--json` turns human text off
//! entirely (results are emitted as one JSON document instead), and `--quiet`
//! keeps only warnings and errors.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::OwoColorize;
use serde_json::json;

/// Output mode chosen by the global CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Print results as JSON.
    pub json: bool,
    /// Print only warnings and errors.
    pub quiet: bool,
    /// Number of `-v` flags.
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }

    /// Whether informational human-readable lines are printed.
    const fn shows_details(self) -> bool {
        !self.json && !self.quiet
    }
}

static MODE: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn mode() -> OutputConfig {
    let lock = MODE.get_or_init(RwLock::default);
    match lock.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Install the output mode. Called once from the CLI entry point.
pub fn configure(config: OutputConfig) {
    let lock = MODE.get_or_init(RwLock::default);
    match lock.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Override color detection; `None` restores it.
pub fn set_color(enabled: Option<bool>) {
    if let Some(enabled) = enabled {
        owo_colors::set_override(enabled);
    } else {
        owo_colors::unset_override();
    }
}

#[must_use]
pub fn is_json() -> bool {
    mode().json
}

#[must_use]
pub fn is_quiet() -> bool {
    mode().quiet
}

#[must_use]
pub fn verbosity() -> u8 {
    mode().verbose
}

fn details() -> bool {
    mode().shows_details()
}

/// Program name and version banner.
pub fn header(version: &str) {
    if details() {
        println!("{} {}", "budget-allocator".bold(), version.dimmed());
    }
}

/// Blank line followed by a bold title.
pub fn section(title: &str) {
    if details() {
        println!("\n{}", title.bold());
    }
}

/// One `label  value` row, labels padded to a common column.
pub fn field(label: &str, value: impl Display) {
    if details() {
        println!("  {:<16} {value}", label.dimmed());
    }
}

/// Indent a pre-rendered block such as a table.
pub fn lines(block: &str) {
    if details() {
        block.lines().for_each(|line| println!("  {line}"));
    }
}

pub fn success(message: &str) {
    if details() {
        println!("  {} {message}", "✓".green());
    }
}

/// Follow-up advice under a warning.
pub fn hint(message: &str) {
    if details() {
        println!("  {} {message}", "hint:".cyan().bold());
    }
}

/// Warnings survive `--quiet`.
pub fn warning(message: &str) {
    if !is_json() {
        println!("  {} {message}", "⚠".yellow());
    }
}

/// Report an error on stderr, as a JSON object in JSON mode.
pub fn error(message: &str) {
    if is_json() {
        let value = json!({ "type": "error", "payload": { "message": message } });
        eprintln!("{value}");
    } else {
        eprintln!("  {} {message}", "×".red());
    }
}

pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}

fn paint(value: impl Display, style: fn(&str) -> String) -> String {
    let text = value.to_string();
    if is_json() {
        text
    } else {
        style(&text)
    }
}

/// Green text, plain in JSON mode.
pub fn positive(value: impl Display) -> String {
    paint(value, |s| s.green().to_string())
}

/// Red text, plain in JSON mode.
pub fn negative(value: impl Display) -> String {
    paint(value, |s| s.red().to_string())
}

/// Dimmed text, plain in JSON mode.
pub fn muted(value: impl Display) -> String {
    paint(value, |s| s.dimmed().to_string())
}

/// Money and revenue figures, rounded to cents.
#[must_use]
pub fn amount(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_and_json_hide_details() {
        assert!(OutputConfig::new(false, false, 0).shows_details());
        assert!(!OutputConfig::new(false, true, 0).shows_details());
        assert!(!OutputConfig::new(true, false, 0).shows_details());
        assert_eq!(OutputConfig::new(true, true, 3).verbose, 3);
    }

    #[test]
    fn amount_rounds_to_cents() {
        assert_eq!(amount(12.346), "12.35");
        assert_eq!(amount(0.0), "0.00");
        assert_eq!(amount(-3.1), "-3.10");
    }
}
