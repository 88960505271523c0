//! Miette-based error diagnostics for CLI error presentation.
//!
//! Provides rich error types with source code context, labels, and help
//! suggestions. Parse errors in request and configuration files point at the
//! offending location in the file.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::domain::error::ValidationError;
use crate::error::{ConfigError, Error};

/// Request file error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(budget_allocator::request))]
pub struct RequestError {
    /// Human-readable error message.
    pub message: String,

    /// Request file content.
    #[source_code]
    pub src: NamedSource<String>,

    /// Problematic region, when known.
    #[label("here")]
    pub span: Option<SourceSpan>,

    /// Optional help text with suggestions for fixing the error.
    #[help]
    pub help: Option<String>,
}

impl RequestError {
    /// Create a new request error.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        name: &str,
        src: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Self {
        Self {
            message: message.into(),
            src: NamedSource::new(name, src.into()),
            span,
            help: None,
        }
    }

    /// Add a help suggestion to the error.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Configuration error with source location context.
///
/// Displays the configuration file content with a labeled span pointing
/// to the problematic location, along with an optional help message.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(budget_allocator::config))]
pub struct ConfigFileError {
    /// Human-readable error message.
    pub message: String,

    /// Configuration file content.
    #[source_code]
    pub src: NamedSource<String>,

    /// Problematic region, when known.
    #[label("here")]
    pub span: Option<SourceSpan>,

    /// Optional help text with suggestions for fixing the error.
    #[help]
    pub help: Option<String>,
}

impl ConfigFileError {
    /// Build a diagnostic for an error raised while loading `src`.
    ///
    /// TOML syntax errors carry their own span. For invalid values the span
    /// points at the key named by the error's field.
    #[must_use]
    pub fn from_error(name: &str, src: &str, error: &Error) -> Self {
        let (span, help) = match error {
            Error::Config(ConfigError::Parse(e)) => (
                e.span().map(|r| SourceSpan::from((r.start, r.end - r.start))),
                Some("check the TOML syntax and the names of keys and tables".to_string()),
            ),
            Error::Config(ConfigError::InvalidValue { field, .. }) => {
                (find_key(src, field), None)
            }
            _ => (None, None),
        };

        Self {
            message: error.to_string(),
            src: NamedSource::new(name, src.to_string()),
            span,
            help,
        }
    }
}

/// Error without a source location: validation failures, solver failures
/// and I/O problems.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(budget_allocator::allocate))]
pub struct CommandError {
    /// Human-readable error message.
    pub message: String,

    /// Optional help text with suggestions for fixing the error.
    #[help]
    pub help: Option<String>,
}

impl CommandError {
    /// Create a new command error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: None,
        }
    }

    /// Add a help suggestion to the error.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl From<Error> for CommandError {
    fn from(error: Error) -> Self {
        let help = match &error {
            Error::Validation(e) => Some(validation_help(e)),
            Error::Solver(_) => {
                Some("try the native backend or report the request that triggered this".to_string())
            }
            _ => None,
        };
        Self {
            message: error.to_string(),
            help,
        }
    }
}

fn validation_help(error: &ValidationError) -> String {
    match error {
        ValidationError::NoChannels => "add at least one entry to `channels`".into(),
        ValidationError::EmptyId { .. } | ValidationError::DuplicateId { .. } => {
            "every channel needs a unique, non-empty `id`".into()
        }
        ValidationError::NonFinite { .. } => "numbers must be finite".into(),
        ValidationError::NegativeRoi { .. } | ValidationError::NegativeBound { .. } => {
            "ROI and bounds must be zero or positive".into()
        }
        ValidationError::InvertedSpendBounds { .. } => "`minSpend` must not exceed `maxSpend`".into(),
        ValidationError::InvertedRevenueBounds { .. } => {
            "`minRevenue` must not exceed `maxRevenue`".into()
        }
        ValidationError::InvalidBudget { .. } => "`totalBudget` must be a finite number >= 0".into(),
        ValidationError::ZeroChannelsUsed => {
            "omit `minChannelsUsed` to leave channel usage unconstrained".into()
        }
        ValidationError::TooManyChannelsRequired { .. } => {
            "`minChannelsUsed` cannot exceed the number of channels".into()
        }
    }
}

/// Byte offset of a 1-based line and column within `src`.
#[must_use]
pub fn offset_of(src: &str, line: usize, column: usize) -> usize {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(src.len())
}

/// Span of the key named by the last segment of a dotted `field`, if it
/// starts a line in `src`.
#[must_use]
pub fn find_key(src: &str, field: &str) -> Option<SourceSpan> {
    let key = field.rsplit('.').next()?;
    let mut offset = 0;
    for line in src.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(key) {
            if rest.trim_start().starts_with('=') {
                let start = offset + (line.len() - trimmed.len());
                return Some((start, key.len()).into());
            }
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_of_counts_previous_lines() {
        let src = "ab\ncde\nf";
        assert_eq!(offset_of(src, 1, 1), 0);
        assert_eq!(offset_of(src, 2, 2), 4);
        assert_eq!(offset_of(src, 3, 1), 7);
        assert_eq!(offset_of(src, 9, 9), src.len());
    }

    #[test]
    fn find_key_locates_assignment() {
        let src = "[solver]\nmax_nodes_extra = 1\n  max_nodes = 0\n";
        let span = find_key(src, "solver.max_nodes").expect("span");
        assert_eq!(span.offset(), 31);
        assert_eq!(span.len(), "max_nodes".len());
        assert!(find_key(src, "solver.backend").is_none());
    }

    #[test]
    fn config_diagnostic_points_at_invalid_key() {
        let src = "[solver]\nmax_nodes = 0\n";
        let error = Error::Config(ConfigError::InvalidValue {
            field: "solver.max_nodes",
            reason: "must be greater than 0".into(),
        });

        let diagnostic = ConfigFileError::from_error("config.toml", src, &error);

        assert_eq!(diagnostic.span.map(|s| s.offset()), Some(9));
        assert!(diagnostic.message.contains("solver.max_nodes"));
    }

    #[test]
    fn validation_errors_carry_help() {
        let error: CommandError = Error::Validation(ValidationError::ZeroChannelsUsed).into();
        assert!(error.help.is_some());
        assert!(error.message.contains("minChannelsUsed"));
    }
}
