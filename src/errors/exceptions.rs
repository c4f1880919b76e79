use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::codes::ErrorCode;

/// Configured code and status for one raised-error type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ExceptionMapping {
    pub fn new(code: Option<ErrorCode>, status: Option<u16>) -> Self {
        Self { code, status }
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            code: None,
            status: Some(status),
        }
    }
}

/// Read-only table from raised-error type name to its configured mapping.
///
/// Loaded from JSON such as `{"UserBannedException": {"status": 403}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExceptionTable {
    entries: HashMap<String, ExceptionMapping>,
}

impl ExceptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, type_name: impl Into<String>, mapping: ExceptionMapping) -> Self {
        self.entries.insert(type_name.into(), mapping);
        self
    }

    /// Layer `overrides` on top of this table; its entries win
    pub fn merge(mut self, overrides: ExceptionTable) -> Self {
        self.entries.extend(overrides.entries);
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn lookup(&self, type_name: &str) -> Option<&ExceptionMapping> {
        self.entries.get(type_name)
    }

    /// Whether any entry maps to `code`
    pub fn contains_code(&self, code: &ErrorCode) -> bool {
        self.entries
            .values()
            .any(|mapping| mapping.code.as_ref() == Some(code))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExceptionMapping)> {
        self.entries.iter().map(|(name, mapping)| (name.as_str(), mapping))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ExceptionMapping)> for ExceptionTable {
    fn from_iter<I: IntoIterator<Item = (String, ExceptionMapping)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let table = ExceptionTable::from_json(
            r#"{
                "UserBannedException": {"status": 403},
                "PaymentFailedException": {"code": "payment", "status": 402},
                "LegacyException": {"code": 1001}
            }"#,
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.lookup("UserBannedException"),
            Some(&ExceptionMapping::with_status(403))
        );
        assert_eq!(
            table.lookup("PaymentFailedException"),
            Some(&ExceptionMapping::new(Some(ErrorCode::from("payment")), Some(402)))
        );
        assert_eq!(
            table.lookup("LegacyException").and_then(|m| m.code.clone()),
            Some(ErrorCode::Int(1001))
        );
        assert!(table.lookup("Unknown").is_none());
    }

    #[test]
    fn test_contains_code() {
        let table = ExceptionTable::new()
            .with(
                "PaymentFailedException",
                ExceptionMapping::new(Some(ErrorCode::from("payment")), Some(402)),
            )
            .with("UserBannedException", ExceptionMapping::with_status(403));

        assert!(table.contains_code(&ErrorCode::from("payment")));
        assert!(!table.contains_code(&ErrorCode::from("user_banned")));
        assert!(!table.contains_code(&ErrorCode::Int(402)));
    }

    #[test]
    fn test_builder_style() {
        let table = ExceptionTable::new().with("TimeoutException", ExceptionMapping::with_status(504));
        assert_eq!(table.lookup("TimeoutException").and_then(|m| m.status), Some(504));
        assert!(!table.is_empty());
    }

    #[test]
    fn test_merge_overrides() {
        let defaults = ExceptionTable::new()
            .with("UserBannedException", ExceptionMapping::with_status(403))
            .with("TimeoutException", ExceptionMapping::with_status(504));
        let configured =
            ExceptionTable::new().with("UserBannedException", ExceptionMapping::with_status(451));

        let table = defaults.merge(configured);
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("UserBannedException").and_then(|m| m.status), Some(451));
        assert_eq!(table.lookup("TimeoutException").and_then(|m| m.status), Some(504));
    }
}
