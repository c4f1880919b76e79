//! Structured validation failures attached to error responses.
//!
//! A [`Validator`] renders its failures as JSON. Validators are not built
//! directly by callers: the builder hands an arbitrary input to the
//! [`AdapterResolver`], which asks each registered [`ValidatorAdapter`] in
//! turn whether it understands that input.

use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;

/// Source of structured validation failures
pub trait Validator: Send + Sync {
    fn failures(&self) -> Value;
}

/// Turns a recognized input into a [`Validator`]
pub trait ValidatorAdapter: Send + Sync {
    /// Return `None` when the input is not something this adapter understands
    fn make(&self, input: &dyn Any) -> Option<Box<dyn Validator>>;
}

/// Ordered set of validator adapters; the first match wins
#[derive(Default)]
pub struct AdapterResolver {
    adapters: Vec<Box<dyn ValidatorAdapter>>,
}

impl AdapterResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with the built-in adapters for [`FieldErrors`] and JSON objects
    pub fn with_defaults() -> Self {
        Self::new()
            .with_adapter(FieldErrorsAdapter)
            .with_adapter(JsonFailuresAdapter)
    }

    pub fn with_adapter(mut self, adapter: impl ValidatorAdapter + 'static) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    pub fn make_validator(&self, input: &dyn Any) -> Option<Box<dyn Validator>> {
        self.adapters.iter().find_map(|adapter| adapter.make(input))
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Failure messages grouped by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl Validator for FieldErrors {
    fn failures(&self) -> Value {
        serde_json::to_value(&self.fields).unwrap_or(Value::Null)
    }
}

/// Accepts [`FieldErrors`]
pub struct FieldErrorsAdapter;

impl ValidatorAdapter for FieldErrorsAdapter {
    fn make(&self, input: &dyn Any) -> Option<Box<dyn Validator>> {
        input
            .downcast_ref::<FieldErrors>()
            .map(|errors| Box::new(errors.clone()) as Box<dyn Validator>)
    }
}

/// Pre-rendered failures given as a JSON object
struct JsonFailures(Value);

impl Validator for JsonFailures {
    fn failures(&self) -> Value {
        self.0.clone()
    }
}

/// Accepts a `serde_json::Value` holding an object
pub struct JsonFailuresAdapter;

impl ValidatorAdapter for JsonFailuresAdapter {
    fn make(&self, input: &dyn Any) -> Option<Box<dyn Validator>> {
        input
            .downcast_ref::<Value>()
            .filter(|value| value.is_object())
            .map(|value| Box::new(JsonFailures(value.clone())) as Box<dyn Validator>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_errors_failures() {
        let mut errors = FieldErrors::new();
        errors
            .add("email", "is required")
            .add("password", "is too short")
            .add("email", "must be valid");

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get("email"),
            Some(&["is required".to_string(), "must be valid".to_string()][..])
        );
        assert_eq!(
            errors.failures(),
            json!({
                "email": ["is required", "must be valid"],
                "password": ["is too short"]
            })
        );
    }

    #[test]
    fn test_resolver_picks_matching_adapter() {
        let resolver = AdapterResolver::with_defaults();
        let mut errors = FieldErrors::new();
        errors.add("name", "is required");

        let validator = resolver.make_validator(&errors).unwrap();
        assert_eq!(validator.failures(), json!({"name": ["is required"]}));

        let raw = json!({"age": ["must be positive"]});
        let validator = resolver.make_validator(&raw).unwrap();
        assert_eq!(validator.failures(), raw);
    }

    #[test]
    fn test_resolver_rejects_unknown_input() {
        let resolver = AdapterResolver::with_defaults();
        assert!(resolver.make_validator(&42_u32).is_none());
        assert!(resolver.make_validator(&"name is required").is_none());
        assert!(resolver.make_validator(&json!(["not", "an", "object"])).is_none());
    }

    #[test]
    fn test_empty_resolver() {
        let resolver = AdapterResolver::new();
        assert!(resolver.is_empty());
        assert!(resolver.make_validator(&FieldErrors::new()).is_none());
    }

    #[test]
    fn test_custom_adapter() {
        struct Messages(Vec<&'static str>);

        impl Validator for Messages {
            fn failures(&self) -> Value {
                json!({ "_": self.0 })
            }
        }

        struct MessagesAdapter;

        impl ValidatorAdapter for MessagesAdapter {
            fn make(&self, input: &dyn Any) -> Option<Box<dyn Validator>> {
                input
                    .downcast_ref::<Vec<&'static str>>()
                    .map(|m| Box::new(Messages(m.clone())) as Box<dyn Validator>)
            }
        }

        let resolver = AdapterResolver::new().with_adapter(MessagesAdapter);
        let validator = resolver.make_validator(&vec!["bad input"]).unwrap();
        assert_eq!(validator.failures(), json!({"_": ["bad input"]}));
        assert_eq!(resolver.len(), 1);
    }
}
