use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use super::codes::ErrorCode;
use super::Error;

/// A registration request for [`ErrorMessageRegistry::register`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// One code, with the message it maps to
    Single {
        code: ErrorCode,
        message: Option<String>,
    },
    /// Several entries registered in order
    Many(Vec<(ErrorCode, String)>),
}

impl<C: Into<ErrorCode>, M: Into<String>> From<(C, M)> for Registration {
    fn from((code, message): (C, M)) -> Self {
        Self::Single {
            code: code.into(),
            message: Some(message.into()),
        }
    }
}

impl From<HashMap<ErrorCode, String>> for Registration {
    fn from(map: HashMap<ErrorCode, String>) -> Self {
        Self::Many(map.into_iter().collect())
    }
}

impl From<Vec<(ErrorCode, String)>> for Registration {
    fn from(entries: Vec<(ErrorCode, String)>) -> Self {
        Self::Many(entries)
    }
}

/// Lookup table from error code to human-readable message.
///
/// Built once at startup and shared behind an `Arc`. Reads take a shared
/// lock, so concurrent `resolve` calls never block each other.
#[derive(Debug, Default)]
pub struct ErrorMessageRegistry {
    messages: RwLock<HashMap<ErrorCode, String>>,
}

impl ErrorMessageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-seeded with messages
    pub fn with_messages<C, M>(entries: impl IntoIterator<Item = (C, M)>) -> Self
    where
        C: Into<ErrorCode>,
        M: Into<String>,
    {
        let registry = Self::new();
        registry.register_all(entries);
        registry
    }

    /// Register one mapping or a batch of mappings.
    ///
    /// Existing entries for the same code are overwritten. A single
    /// registration without a message is rejected and changes nothing.
    pub fn register(&self, registration: impl Into<Registration>) -> Result<(), Error> {
        match registration.into() {
            Registration::Single { code, message } => {
                let message = message.ok_or(Error::MissingMessage { code: code.clone() })?;
                self.register_message(code, message);
            }
            Registration::Many(entries) => self.register_all(entries),
        }
        Ok(())
    }

    pub fn register_message(&self, code: impl Into<ErrorCode>, message: impl Into<String>) {
        let code = code.into();
        debug!(code = %code, "Registering error message");
        self.write().insert(code, message.into());
    }

    pub fn register_all<C, M>(&self, entries: impl IntoIterator<Item = (C, M)>)
    where
        C: Into<ErrorCode>,
        M: Into<String>,
    {
        let mut messages = self.write();
        for (code, message) in entries {
            messages.insert(code.into(), message.into());
        }
    }

    /// Message registered for `code`, if any
    pub fn resolve(&self, code: &ErrorCode) -> Option<String> {
        self.read().get(code).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave a half-written entry, so
    // poisoned guards are safe to reuse.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<ErrorCode, String>> {
        self.messages.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<ErrorCode, String>> {
        self.messages.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_register_and_resolve() {
        let registry = ErrorMessageRegistry::new();
        registry.register(("user_banned", "Your account is banned")).unwrap();
        registry.register((404, "Resource not found")).unwrap();

        assert_eq!(
            registry.resolve(&ErrorCode::from("user_banned")).as_deref(),
            Some("Your account is banned")
        );
        assert_eq!(
            registry.resolve(&ErrorCode::from(404)).as_deref(),
            Some("Resource not found")
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_resolve_unregistered_is_none() {
        let registry = ErrorMessageRegistry::new();
        assert!(registry.resolve(&ErrorCode::from("missing")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_codes_match_exactly() {
        let registry = ErrorMessageRegistry::with_messages([(ErrorCode::from(404), "Not found")]);
        assert!(registry.resolve(&ErrorCode::from("404")).is_none());
    }

    #[test]
    fn test_register_overwrites() {
        let registry = ErrorMessageRegistry::new();
        registry.register_message("quota", "Old");
        registry.register_message("quota", "New");
        assert_eq!(registry.resolve(&ErrorCode::from("quota")).as_deref(), Some("New"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_batch_matches_individual_registration() {
        let entries = vec![
            (ErrorCode::from("a"), "first".to_string()),
            (ErrorCode::from(7), "seven".to_string()),
            (ErrorCode::from("a"), "second".to_string()),
        ];

        let batch = ErrorMessageRegistry::new();
        batch.register(entries.clone()).unwrap();

        let single = ErrorMessageRegistry::new();
        for (code, message) in entries {
            single.register((code, message)).unwrap();
        }

        for code in [ErrorCode::from("a"), ErrorCode::from(7)] {
            assert_eq!(batch.resolve(&code), single.resolve(&code));
        }
        assert_eq!(batch.resolve(&ErrorCode::from("a")).as_deref(), Some("second"));
    }

    #[test]
    fn test_single_without_message_is_rejected() {
        let registry = ErrorMessageRegistry::new();
        let err = registry
            .register(Registration::Single {
                code: ErrorCode::from("orphan"),
                message: None,
            })
            .unwrap_err();

        assert_eq!(
            err,
            Error::MissingMessage {
                code: ErrorCode::from("orphan")
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_readers() {
        let registry = Arc::new(ErrorMessageRegistry::with_messages([("shared", "Shared message")]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.resolve(&ErrorCode::from("shared")))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().as_deref(), Some("Shared message"));
        }
    }
}
