//! Caught failures that can be turned into error responses.
//!
//! A type becomes resolvable by implementing [`Raised`]. The usual way is the
//! [`raised_error!`](crate::raised_error) macro, which declares the type and
//! its identity in one place so every resolvable error is listed in source:
//!
//! ```
//! use error_responder::raised_error;
//! use error_responder::errors::{ErrorCode, Raised};
//!
//! raised_error!(pub UserNotFoundException);
//! raised_error!(pub LegacyFailureException => "legacy");
//!
//! let err = UserNotFoundException::new("no user 7");
//! assert_eq!(err.default_code(), ErrorCode::from("user_not_found"));
//! assert_eq!(LegacyFailureException::default().default_code(), ErrorCode::from("legacy"));
//! ```

use convert_case::{Boundary, Case, Casing};

use super::codes::ErrorCode;

const EXCEPTION_SUFFIX: &str = "Exception";

/// A caught failure
pub trait Raised: std::error::Error + Send + Sync {
    /// Concrete type identity, used as the exception table key
    fn type_name(&self) -> &'static str;

    /// Code used when neither the caller nor the exception table supplies one
    fn default_code(&self) -> ErrorCode {
        ErrorCode::Str(derive_code(self.type_name()))
    }
}

/// Derive an error code from a type name.
///
/// One trailing `Exception` suffix is stripped, then the rest is converted to
/// snake_case: `UserNotFoundException` becomes `user_not_found`. Digits stay
/// attached to the word before them, so `S3UploadFailed` becomes
/// `s3_upload_failed`.
pub fn derive_code(type_name: &str) -> String {
    let base = type_name
        .rsplit("::")
        .next()
        .unwrap_or(type_name);
    let base = match base.strip_suffix(EXCEPTION_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => base,
    };
    base.from_case(Case::Pascal)
        .without_boundaries(&[
            Boundary::LOWER_DIGIT,
            Boundary::UPPER_DIGIT,
            Boundary::DIGIT_LOWER,
        ])
        .to_case(Case::Snake)
}

/// Declare an error type that implements [`Raised`].
///
/// The generated struct carries a message, implements `Display`,
/// `std::error::Error` and `Default`, and reports its own name as the type
/// identity. An optional `=> "code"` arm pins the default code instead of
/// deriving it from the name.
#[macro_export]
macro_rules! raised_error {
    ($(#[$meta:meta])* $vis:vis $name:ident) => {
        $crate::raised_error!(@declare $(#[$meta])* $vis $name);

        impl $crate::errors::Raised for $name {
            fn type_name(&self) -> &'static str {
                stringify!($name)
            }
        }
    };
    ($(#[$meta:meta])* $vis:vis $name:ident => $code:expr) => {
        $crate::raised_error!(@declare $(#[$meta])* $vis $name);

        impl $crate::errors::Raised for $name {
            fn type_name(&self) -> &'static str {
                stringify!($name)
            }

            fn default_code(&self) -> $crate::errors::ErrorCode {
                $crate::errors::ErrorCode::from($code)
            }
        }
    };
    (@declare $(#[$meta:meta])* $vis:vis $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        $vis struct $name {
            message: String,
        }

        impl $name {
            pub fn new(message: impl Into<String>) -> Self {
                Self {
                    message: message.into(),
                }
            }

            pub fn message(&self) -> &str {
                &self.message
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.message)
            }
        }

        impl ::std::error::Error for $name {}
    };
}
