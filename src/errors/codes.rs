use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error identifier.
///
/// Codes are either integers (`404`, `1001`) or strings (`"user_banned"`).
/// Two codes are equal only when both the kind and the value match, so
/// `Int(404)` and `Str("404")` are distinct registry keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Int(i64),
    Str(String),
}

impl ErrorCode {
    /// Parse a code from a configuration key: numeric keys become integer codes
    pub fn from_key(key: &str) -> Self {
        match key.parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Str(key.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ErrorCode {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ErrorCode {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u16> for ErrorCode {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for ErrorCode {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ErrorCode {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}
