//! Checks whether a regular expression is supported by the restricted
//! dialect of a browser's declarative rule-matching engine.
//!
//! ```
//! use is_regex_supported::{ValidationRequest, UnsupportedReason, validate};
//!
//! assert!(validate(&ValidationRequest::new("^https?://[a-z]+\\.com/")).is_supported());
//! assert_eq!(
//!     validate(&ValidationRequest::new("(unterminated")).reason(),
//!     Some(UnsupportedReason::SyntaxError),
//! );
//! ```

pub mod dialect;
pub mod regex;
pub mod thompson;
pub mod util;
pub mod validator;

pub use crate::regex::{Builder, Config, Error, Program};
pub use validator::{
    PatternValidator, RequestError, UnsupportedReason, ValidationRequest, ValidationResult,
    ValidatorConfig, validate, validate_json,
};

/// Compiles a pattern with the configuration of the rule-matching engine.
pub fn compile(pattern: &str) -> Result<Program, Error> {
    Builder::new(pattern).compile()
}
