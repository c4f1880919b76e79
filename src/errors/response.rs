use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use super::codes::ErrorCode;
use super::Error;

/// Status used when nothing else resolves one
pub const DEFAULT_STATUS: u16 = 500;

/// Message used when nothing else resolves one
pub const FALLBACK_MESSAGE: &str = "An error occurred";

/// Resolved error, ready to be rendered by a formatter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    status: u16,
    headers: HashMap<String, String>,
    error_code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation_errors: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response.
    ///
    /// Fails with [`Error::InvalidStatus`] unless `status` is within 100-599.
    /// An empty message is replaced with [`FALLBACK_MESSAGE`].
    pub fn new(
        status: u16,
        error_code: impl Into<ErrorCode>,
        message: impl Into<String>,
    ) -> Result<Self, Error> {
        let status = validate_status(status)?;
        let message = message.into();

        Ok(Self {
            status,
            headers: HashMap::new(),
            error_code: error_code.into(),
            message: if message.is_empty() {
                FALLBACK_MESSAGE.to_string()
            } else {
                message
            },
            validation_errors: None,
            request_id: None,
        })
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_validation_errors(mut self, failures: Value) -> Self {
        self.validation_errors = Some(failures);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Status as an `http` type; always valid because construction checked it
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn error_code(&self) -> &ErrorCode {
        &self.error_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn validation_errors(&self) -> Option<&Value> {
        self.validation_errors.as_ref()
    }

    /// ID of the request this error answers, when the transport supplied one
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

/// Check that `status` is a legal HTTP status code (100-599)
pub fn validate_status(status: u16) -> Result<u16, Error> {
    if (100..=599).contains(&status) {
        Ok(status)
    } else {
        Err(Error::InvalidStatus(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_status() {
        let response = ErrorResponse::new(404, 404, "Not found").unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.error_code(), &ErrorCode::Int(404));
        assert_eq!(response.message(), "Not found");
        assert!(response.headers().is_empty());
        assert!(response.validation_errors().is_none());
    }

    #[test]
    fn test_invalid_status() {
        assert_eq!(
            ErrorResponse::new(999, "oops", "Bad").unwrap_err(),
            Error::InvalidStatus(999)
        );
        assert_eq!(
            ErrorResponse::new(99, "oops", "Bad").unwrap_err(),
            Error::InvalidStatus(99)
        );
        assert_eq!(
            ErrorResponse::new(600, "oops", "Bad").unwrap_err(),
            Error::InvalidStatus(600)
        );
    }

    #[test]
    fn test_status_boundaries() {
        assert!(ErrorResponse::new(100, "info", "Continue").is_ok());
        assert!(ErrorResponse::new(599, "edge", "Edge").is_ok());
    }

    #[test]
    fn test_empty_message_falls_back() {
        let response = ErrorResponse::new(500, "internal", "").unwrap();
        assert_eq!(response.message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_headers_and_validation_errors() {
        let response = ErrorResponse::new(429, "rate_limited", "Slow down")
            .unwrap()
            .with_header("Retry-After", "30")
            .with_headers([("X-Limit", "100")])
            .with_validation_errors(json!({"name": ["required"]}));

        assert_eq!(response.headers().get("Retry-After").map(String::as_str), Some("30"));
        assert_eq!(response.headers().len(), 2);
        assert_eq!(
            response.validation_errors(),
            Some(&json!({"name": ["required"]}))
        );
    }

    #[test]
    fn test_serialization() {
        let response = ErrorResponse::new(403, "user_banned", "Banned").unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], 403);
        assert_eq!(json["error_code"], "user_banned");
        assert!(json.get("validation_errors").is_none());
        assert!(json.get("request_id").is_none());
    }

    #[test]
    fn test_request_id() {
        let response = ErrorResponse::new(404, "not_found", "Missing")
            .unwrap()
            .with_request_id("req-7");
        assert_eq!(response.request_id(), Some("req-7"));
        assert_eq!(serde_json::to_value(&response).unwrap()["request_id"], "req-7");
    }
}
