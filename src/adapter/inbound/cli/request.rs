//! Request and configuration file loading for CLI commands.

use std::path::Path;

use miette::SourceSpan;

use super::diagnostic::{offset_of, CommandError, ConfigFileError, RequestError};
use crate::domain::channel::AllocationRequest;
use crate::infrastructure::config::settings::{Config, DEFAULT_CONFIG_PATH};

/// Serialization format of a request file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    Json,
    Toml,
}

impl RequestFormat {
    /// Pick the format from the file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else {
            None
        }
    }
}

/// Parse request `content`; `name` labels the source in diagnostics.
///
/// # Errors
///
/// Returns a [`RequestError`] pointing at the location of the syntax or
/// type error.
pub fn parse_request(
    name: &str,
    content: &str,
    format: RequestFormat,
) -> Result<AllocationRequest, RequestError> {
    match format {
        RequestFormat::Json => serde_json::from_str(content).map_err(|e| {
            let span = (e.line() > 0).then(|| {
                SourceSpan::from((offset_of(content, e.line(), e.column()), 1))
            });
            RequestError::new(format!("invalid request: {e}"), name, content, span)
                .with_help("a request has a `channels` array and a `constraints` object")
        }),
        RequestFormat::Toml => toml::from_str(content).map_err(|e| {
            let span = e
                .span()
                .map(|r| SourceSpan::from((r.start, r.end.saturating_sub(r.start))));
            RequestError::new(
                format!("invalid request: {}", e.message()),
                name,
                content,
                span,
            )
            .with_help("a request has `[[channels]]` entries and a `[constraints]` table")
        }),
    }
}

/// Read and parse a request file.
///
/// # Errors
///
/// Fails on unreadable files, unknown extensions and parse errors.
pub fn load_request(path: &Path) -> miette::Result<AllocationRequest> {
    let format = RequestFormat::from_path(path).ok_or_else(|| {
        CommandError::new(format!(
            "cannot tell the format of request file {}",
            path.display()
        ))
        .with_help("use a .json or .toml extension")
    })?;
    let content = std::fs::read_to_string(path).map_err(|e| {
        CommandError::new(format!("failed to read request file {}: {e}", path.display()))
    })?;

    Ok(parse_request(&path.display().to_string(), &content, format)?)
}

/// Load configuration from an explicit path, or from `config.toml` when it
/// exists, or fall back to defaults.
///
/// # Errors
///
/// Fails when an explicit file is missing, or a file cannot be parsed or
/// validated.
pub fn load_config(path: Option<&Path>) -> miette::Result<Config> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Path::new(DEFAULT_CONFIG_PATH),
        None => return Ok(Config::default()),
    };

    let content = std::fs::read_to_string(path).map_err(|e| {
        CommandError::new(format!("failed to read config file {}: {e}", path.display()))
    })?;

    Config::parse_toml(&content)
        .map_err(|e| ConfigFileError::from_error(&path.display().to_string(), &content, &e).into())
}
