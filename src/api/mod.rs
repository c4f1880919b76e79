pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::{ErrorsConfig, FormatterKind};
use crate::errors::{ErrorMessageRegistry, ErrorResponder, JsonFormatter};
use crate::metrics::{ERROR_MESSAGES_REGISTERED, EXCEPTION_MAPPINGS_CONFIGURED};
use handlers::{default_exceptions, default_messages, AppState, AppStateInner};

/// Build the shared application state from error configuration.
///
/// Configured messages and exception mappings are layered over the demo
/// defaults, so a configured entry always wins.
pub fn build_state(config: &ErrorsConfig) -> Result<AppState> {
    let registry = ErrorMessageRegistry::with_messages(default_messages());
    registry.register_all(config.load_messages()?);

    let exceptions = default_exceptions().merge(config.load_exceptions()?);

    ERROR_MESSAGES_REGISTERED.set(registry.len() as i64);
    EXCEPTION_MAPPINGS_CONFIGURED.set(exceptions.len() as i64);
    info!(
        messages = registry.len(),
        exception_mappings = exceptions.len(),
        "Error registry initialized"
    );

    let responder = ErrorResponder::new(Arc::new(registry), Arc::new(exceptions))
        .with_default_status(config.default_status)
        .context("Invalid default error status")?;
    let responder = match config.formatter {
        FormatterKind::Json => responder.with_formatter(Arc::new(JsonFormatter)),
        FormatterKind::None => responder,
    };

    Ok(Arc::new(AppStateInner { responder }))
}
