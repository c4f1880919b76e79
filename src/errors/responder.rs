use std::sync::Arc;

use super::builder::ErrorResponseBuilder;
use super::exceptions::ExceptionTable;
use super::formatter::ErrorFormatter;
use super::registry::ErrorMessageRegistry;
use super::response::{validate_status, DEFAULT_STATUS};
use super::validation::AdapterResolver;
use super::Error;

/// Process-wide error resolution setup.
///
/// Built once at startup and cloned into request handlers; each request
/// gets its own [`ErrorResponseBuilder`] from [`ErrorResponder::builder`].
#[derive(Clone)]
pub struct ErrorResponder {
    registry: Arc<ErrorMessageRegistry>,
    exceptions: Arc<ExceptionTable>,
    adapters: Arc<AdapterResolver>,
    formatter: Option<Arc<dyn ErrorFormatter>>,
    default_status: u16,
}

impl ErrorResponder {
    pub fn new(registry: Arc<ErrorMessageRegistry>, exceptions: Arc<ExceptionTable>) -> Self {
        Self {
            registry,
            exceptions,
            adapters: Arc::new(AdapterResolver::with_defaults()),
            formatter: None,
            default_status: DEFAULT_STATUS,
        }
    }

    pub fn with_adapters(mut self, adapters: AdapterResolver) -> Self {
        self.adapters = Arc::new(adapters);
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn ErrorFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn with_default_status(mut self, status: u16) -> Result<Self, Error> {
        self.default_status = validate_status(status)?;
        Ok(self)
    }

    /// Registry shared by every builder; messages registered here are seen
    /// by builders created afterwards and by those already in flight
    pub fn registry(&self) -> &Arc<ErrorMessageRegistry> {
        &self.registry
    }

    pub fn exceptions(&self) -> &ExceptionTable {
        &self.exceptions
    }

    pub fn default_status(&self) -> u16 {
        self.default_status
    }

    /// Fresh request-scoped builder
    pub fn builder(&self) -> ErrorResponseBuilder {
        let builder = ErrorResponseBuilder::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.exceptions),
            Arc::clone(&self.adapters),
        )
        .preset_default_status(self.default_status);

        match &self.formatter {
            Some(formatter) => builder.with_formatter(Arc::clone(formatter)),
            None => builder,
        }
    }
}
