use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::errors::{response::validate_status, ErrorCode, ExceptionTable};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub errors: ErrorsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatterKind {
    /// Full structured envelope
    Json,
    /// Bare `{"message": ...}` body
    None,
}

#[derive(Debug, Clone)]
pub struct ErrorsConfig {
    pub default_status: u16,
    pub formatter: FormatterKind,
    pub messages_file: Option<PathBuf>,
    pub exceptions_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
            },
            errors: ErrorsConfig {
                default_status: validate_status(
                    env::var("ERRORS_DEFAULT_STATUS")
                        .unwrap_or_else(|_| "500".to_string())
                        .parse()
                        .context("ERRORS_DEFAULT_STATUS must be a valid number")?,
                )
                .context("ERRORS_DEFAULT_STATUS must be between 100 and 599")?,
                formatter: parse_formatter(
                    &env::var("ERRORS_FORMATTER").unwrap_or_else(|_| "json".to_string()),
                )?,
                messages_file: env::var("ERRORS_MESSAGES_FILE").ok().map(PathBuf::from),
                exceptions_file: env::var("ERRORS_EXCEPTIONS_FILE").ok().map(PathBuf::from),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ErrorsConfig {
    /// Messages to seed the registry with, read from `messages_file`
    pub fn load_messages(&self) -> Result<Vec<(ErrorCode, String)>> {
        match &self.messages_file {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                parse_messages(&raw)
                    .with_context(|| format!("Invalid error messages in {}", path.display()))
            }
            None => Ok(Vec::new()),
        }
    }

    /// Exception table read from `exceptions_file`
    pub fn load_exceptions(&self) -> Result<ExceptionTable> {
        match &self.exceptions_file {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let table = ExceptionTable::from_json(&raw)
                    .with_context(|| format!("Invalid exception table in {}", path.display()))?;
                validate_exceptions(&table)?;
                Ok(table)
            }
            None => Ok(ExceptionTable::new()),
        }
    }
}

fn parse_formatter(value: &str) -> Result<FormatterKind> {
    match value.to_ascii_lowercase().as_str() {
        "json" => Ok(FormatterKind::Json),
        "none" | "minimal" => Ok(FormatterKind::None),
        other => Err(anyhow!(
            "ERRORS_FORMATTER must be 'json' or 'none', got '{}'",
            other
        )),
    }
}

/// Parse a JSON object of code -> message; numeric keys become integer codes
pub fn parse_messages(raw: &str) -> Result<Vec<(ErrorCode, String)>> {
    let value: Value = serde_json::from_str(raw)?;
    let object = value
        .as_object()
        .ok_or_else(|| anyhow!("expected a JSON object of code -> message"))?;

    object
        .iter()
        .map(|(key, message)| {
            let message = message
                .as_str()
                .ok_or_else(|| anyhow!("message for code '{}' must be a string", key))?;
            Ok((ErrorCode::from_key(key), message.to_string()))
        })
        .collect()
}

// Statuses are checked once here rather than failing on the first request.
fn validate_exceptions(table: &ExceptionTable) -> Result<()> {
    for (type_name, mapping) in table.iter() {
        if let Some(status) = mapping.status {
            validate_status(status)
                .with_context(|| format!("Invalid status configured for {}", type_name))?;
        }
    }
    Ok(())
}
