use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::response::ErrorResponse;
use super::validation::Validator;

/// Renders an [`ErrorResponse`] into the envelope sent to clients
pub trait ErrorFormatter: Send + Sync {
    /// Render the base error envelope
    fn error(&self, response: &ErrorResponse) -> Value;

    /// Layer validation failures on top of an already rendered envelope
    fn validator(&self, envelope: Value, validator: &dyn Validator) -> Value;
}

/// Structured error envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Always false for errors
    pub success: bool,
    /// Error details
    pub error: ErrorBody,
}

/// Error details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Error code for programmatic handling (integer or string)
    #[schema(value_type = Object)]
    pub code: Value,
    /// Human-readable error message
    pub message: String,
    /// HTTP status code
    pub status: u16,
    /// Request ID for tracing
    pub request_id: String,
    /// Validation failures by field (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub fields: Option<Value>,
}

/// Default formatter producing an [`ErrorEnvelope`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl ErrorFormatter for JsonFormatter {
    fn error(&self, response: &ErrorResponse) -> Value {
        let envelope = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: serde_json::to_value(response.error_code()).unwrap_or(Value::Null),
                message: response.message().to_string(),
                status: response.status(),
                request_id: response
                    .request_id()
                    .map(str::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                fields: None,
            },
        };

        serde_json::to_value(envelope).unwrap_or(Value::Null)
    }

    fn validator(&self, mut envelope: Value, validator: &dyn Validator) -> Value {
        if let Some(error) = envelope.get_mut("error").and_then(Value::as_object_mut) {
            error.insert("fields".to_string(), validator.failures());
        }
        envelope
    }
}
