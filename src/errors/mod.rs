//! Error resolution and response assembly

pub mod builder;
pub mod codes;
pub mod exceptions;
pub mod formatter;
pub mod raised;
pub mod registry;
pub mod responder;
pub mod response;
pub mod validation;

pub use builder::{AssembledError, BuilderState, ErrorInput, ErrorResponseBuilder};
pub use codes::ErrorCode;
pub use exceptions::{ExceptionMapping, ExceptionTable};
pub use formatter::{ErrorBody, ErrorEnvelope, ErrorFormatter, JsonFormatter};
pub use raised::{derive_code, Raised};
pub use registry::{ErrorMessageRegistry, Registration};
pub use responder::ErrorResponder;
pub use response::{ErrorResponse, DEFAULT_STATUS, FALLBACK_MESSAGE};
pub use validation::{AdapterResolver, FieldErrors, Validator, ValidatorAdapter};

/// Failures raised while resolving or assembling an error response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Status outside the 100-599 range
    #[error("invalid HTTP status code: {0}")]
    InvalidStatus(u16),

    /// No validator adapter recognizes the supplied input
    #[error("no validator adapter accepts input of type {type_name}")]
    MissingAdapter { type_name: String },

    /// Single-code registration without a message
    #[error("no message given when registering error code {code}")]
    MissingMessage { code: ErrorCode },

    /// The builder was asked for output before an error was set
    #[error("no error has been set on the builder")]
    NoErrorSet,
}
