use axum::{
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, warn};

use super::codes::ErrorCode;
use super::exceptions::ExceptionTable;
use super::formatter::ErrorFormatter;
use super::raised::Raised;
use super::registry::ErrorMessageRegistry;
use super::response::{validate_status, ErrorResponse, DEFAULT_STATUS, FALLBACK_MESSAGE};
use super::validation::{AdapterResolver, Validator};
use super::Error;
use crate::metrics::{ERROR_RESPONSES_TOTAL, OTHER_CODE_LABEL};

/// What the caller hands to [`ErrorResponseBuilder::error`]
#[derive(Clone, Copy)]
pub enum ErrorInput<'a> {
    /// An application-raised code with an optional message
    Explicit {
        code: &'a ErrorCode,
        message: Option<&'a str>,
    },
    /// A caught failure, with an optional code overriding the derived one.
    ///
    /// There is no message slot: the message always comes from the
    /// registry or from the failure itself.
    Raised {
        error: &'a dyn Raised,
        code: Option<&'a ErrorCode>,
    },
}

impl<'a> ErrorInput<'a> {
    pub fn code(code: &'a ErrorCode) -> Self {
        Self::Explicit {
            code,
            message: None,
        }
    }

    pub fn code_with_message(code: &'a ErrorCode, message: &'a str) -> Self {
        Self::Explicit {
            code,
            message: Some(message),
        }
    }

    pub fn raised(error: &'a dyn Raised) -> Self {
        Self::Raised { error, code: None }
    }

    pub fn raised_with_code(code: &'a ErrorCode, error: &'a dyn Raised) -> Self {
        Self::Raised {
            error,
            code: Some(code),
        }
    }
}

impl<'a, E: Raised> From<&'a E> for ErrorInput<'a> {
    fn from(error: &'a E) -> Self {
        Self::raised(error)
    }
}

/// Lifecycle of a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Empty,
    ErrorSet,
    ErrorSetWithValidator,
    Finalized,
}

/// Accumulates one error response for a single request.
///
/// The registry, exception table and adapter resolver are shared; the
/// response being built belongs to this builder alone.
pub struct ErrorResponseBuilder {
    registry: Arc<ErrorMessageRegistry>,
    exceptions: Arc<ExceptionTable>,
    adapters: Arc<AdapterResolver>,
    formatter: Option<Arc<dyn ErrorFormatter>>,
    default_status: u16,
    request_id: Option<String>,
    response: Option<ErrorResponse>,
    validator: Option<Box<dyn Validator>>,
    // code came from a declared raised type rather than from the caller
    code_declared: bool,
    finalized: bool,
}

impl ErrorResponseBuilder {
    pub fn new(
        registry: Arc<ErrorMessageRegistry>,
        exceptions: Arc<ExceptionTable>,
        adapters: Arc<AdapterResolver>,
    ) -> Self {
        Self {
            registry,
            exceptions,
            adapters,
            formatter: None,
            default_status: DEFAULT_STATUS,
            request_id: None,
            response: None,
            validator: None,
            code_declared: false,
            finalized: false,
        }
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn ErrorFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Override the status used when nothing else resolves one
    pub fn with_default_status(mut self, status: u16) -> Result<Self, Error> {
        self.default_status = validate_status(status)?;
        Ok(self)
    }

    /// Request ID carried by every response this builder stores
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Default status that has already been validated by the caller
    pub(crate) fn preset_default_status(mut self, status: u16) -> Self {
        self.default_status = status;
        self
    }

    /// Resolve code, message and status and store the resulting response.
    ///
    /// A previously stored response is replaced. If the builder had already
    /// been finalized, its validator is dropped as well.
    pub fn error<'a>(&mut self, input: impl Into<ErrorInput<'a>>) -> Result<&mut Self, Error> {
        let (response, code_declared) = match input.into() {
            ErrorInput::Explicit { code, message } => {
                (self.resolve_explicit(code, message)?, false)
            }
            ErrorInput::Raised { error, code } => {
                (self.resolve_raised(error, code)?, code.is_none())
            }
        };

        if self.finalized {
            self.validator = None;
            self.finalized = false;
        }
        self.code_declared = code_declared;
        self.response = Some(match &self.request_id {
            Some(request_id) => response.with_request_id(request_id.clone()),
            None => response,
        });
        Ok(self)
    }

    /// Shorthand for an explicit code, with the message taken from the registry
    pub fn error_code(&mut self, code: impl Into<ErrorCode>) -> Result<&mut Self, Error> {
        let code = code.into();
        self.error(ErrorInput::code(&code))
    }

    /// Shorthand for an explicit code and message
    pub fn error_message(
        &mut self,
        code: impl Into<ErrorCode>,
        message: &str,
    ) -> Result<&mut Self, Error> {
        let code = code.into();
        self.error(ErrorInput::code_with_message(&code, message))
    }

    /// Shorthand for a caught failure
    pub fn raised(&mut self, error: &dyn Raised) -> Result<&mut Self, Error> {
        self.error(ErrorInput::raised(error))
    }

    /// Shorthand for a caught failure reported under an explicit code
    pub fn raised_with_code(
        &mut self,
        code: impl Into<ErrorCode>,
        error: &dyn Raised,
    ) -> Result<&mut Self, Error> {
        let code = code.into();
        self.error(ErrorInput::raised_with_code(&code, error))
    }

    /// Add a header to the stored response.
    ///
    /// A finalized builder is reopened, since its rendered content no longer
    /// matches the response.
    pub fn header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, Error> {
        let response = self.response.take().ok_or(Error::NoErrorSet)?;
        self.response = Some(response.with_header(name, value));
        self.finalized = false;
        Ok(self)
    }

    /// Attach validation failures built from `input`.
    ///
    /// Fails with [`Error::MissingAdapter`] when no adapter understands the
    /// input; the builder is left untouched in that case.
    pub fn validator<T: Any>(&mut self, input: &T) -> Result<&mut Self, Error> {
        let validator = self
            .adapters
            .make_validator(input)
            .ok_or_else(|| Error::MissingAdapter {
                type_name: std::any::type_name::<T>().to_string(),
            })?;

        self.validator = Some(validator);
        Ok(self)
    }

    pub fn response(&self) -> Option<&ErrorResponse> {
        self.response.as_ref()
    }

    pub fn state(&self) -> BuilderState {
        match (&self.response, &self.validator) {
            _ if self.finalized => BuilderState::Finalized,
            (None, _) => BuilderState::Empty,
            (Some(_), None) => BuilderState::ErrorSet,
            (Some(_), Some(_)) => BuilderState::ErrorSetWithValidator,
        }
    }

    /// Render the envelope for the stored response.
    ///
    /// Without a formatter the envelope is just `{"message": ...}`. With one,
    /// the formatter renders the base envelope and validation failures, if
    /// any, are layered on top of it.
    pub fn content(&mut self) -> Result<Value, Error> {
        let response = self.response.as_ref().ok_or(Error::NoErrorSet)?;

        let content = match &self.formatter {
            None => json!({ "message": response.message() }),
            Some(formatter) => {
                let envelope = formatter.error(response);
                match &self.validator {
                    Some(validator) => formatter.validator(envelope, validator.as_ref()),
                    None => envelope,
                }
            }
        };

        self.finalized = true;
        Ok(content)
    }

    /// Materialize the final response together with its rendered envelope
    pub fn finish(&mut self) -> Result<AssembledError, Error> {
        let content = self.content()?;
        let mut response = self.response.clone().ok_or(Error::NoErrorSet)?;
        if let Some(validator) = &self.validator {
            response = response.with_validation_errors(validator.failures());
        }

        let status = response.status().to_string();
        ERROR_RESPONSES_TOTAL
            .with_label_values(&[&status, &self.metric_code(response.error_code())])
            .inc();

        debug!(
            status = %status,
            code = %response.error_code(),
            validation = response.validation_errors().is_some(),
            "Error response assembled"
        );

        Ok(AssembledError { response, content })
    }

    /// Metric label for `code`; caller-supplied codes that nothing registers
    /// or configures all share [`OTHER_CODE_LABEL`]
    fn metric_code(&self, code: &ErrorCode) -> String {
        if self.code_declared
            || self.registry.resolve(code).is_some()
            || self.exceptions.contains_code(code)
        {
            code.to_string()
        } else {
            OTHER_CODE_LABEL.to_string()
        }
    }

    fn resolve_explicit(
        &self,
        code: &ErrorCode,
        message: Option<&str>,
    ) -> Result<ErrorResponse, Error> {
        let message = match message {
            Some(message) => message.to_string(),
            None => self
                .registry
                .resolve(code)
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        };

        ErrorResponse::new(self.default_status, code.clone(), message)
    }

    fn resolve_raised(
        &self,
        error: &dyn Raised,
        code: Option<&ErrorCode>,
    ) -> Result<ErrorResponse, Error> {
        let type_name = error.type_name();
        let mapping = self.exceptions.lookup(type_name);

        let code = match (code, mapping.and_then(|m| m.code.as_ref())) {
            (Some(code), _) => code.clone(),
            (None, Some(configured)) => configured.clone(),
            (None, None) => error.default_code(),
        };
        let message = self
            .registry
            .resolve(&code)
            .unwrap_or_else(|| error.to_string());
        let status = mapping
            .and_then(|m| m.status)
            .unwrap_or(self.default_status);

        debug!(
            type_name,
            code = %code,
            status,
            configured = mapping.is_some(),
            "Resolved raised error"
        );

        ErrorResponse::new(status, code, message)
    }
}

/// Final error response plus its rendered envelope, ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledError {
    pub response: ErrorResponse,
    pub content: Value,
}

impl IntoResponse for AssembledError {
    fn into_response(self) -> Response {
        let mut http = (self.response.status_code(), Json(self.content)).into_response();

        for (name, value) in self.response.headers() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    http.headers_mut().insert(name, value);
                }
                _ => warn!(header = %name, "Skipping invalid error response header"),
            }
        }

        http
    }
}
