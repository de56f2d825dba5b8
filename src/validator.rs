//! Checks whether a pattern is supported by the rule-matching engine.
//!
//! The check compiles the pattern with the restricted engine configured the
//! way the rule-matching engine is, and turns the outcome into a
//! [`ValidationResult`]. An unsupported pattern is an ordinary result, never
//! an error: errors ([`RequestError`]) only describe malformed requests at
//! the JSON boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::regex::{Builder, Config, DEFAULT_MAX_MEM, DEFAULT_NEST_LIMIT};

/// A pattern and the options to check it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    #[serde(rename = "regex")]
    pub pattern: String,
    #[serde(default = "default_case_sensitive")]
    pub is_case_sensitive: bool,
    /// Keep capturing groups while compiling. This doesn't require the
    /// pattern to have any group; use [`crate::Program::capture_count`] for
    /// that.
    #[serde(default)]
    pub require_capturing: bool,
}

fn default_case_sensitive() -> bool {
    true
}

impl ValidationRequest {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_case_sensitive: true,
            require_capturing: false,
        }
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.is_case_sensitive = value;
        self
    }

    pub fn require_capturing(mut self, value: bool) -> Self {
        self.require_capturing = value;
        self
    }
}

/// Why a pattern isn't supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnsupportedReason {
    /// The pattern is valid, but its compiled form is too large.
    MemoryLimitExceeded,
    /// Anything else: malformed pattern, or syntax outside the dialect.
    SyntaxError,
}

/// The verdict for one pattern. `reason` is set iff the pattern isn't
/// supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    is_supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<UnsupportedReason>,
}

impl ValidationResult {
    pub fn supported() -> Self {
        Self {
            is_supported: true,
            reason: None,
        }
    }

    pub fn unsupported(reason: UnsupportedReason) -> Self {
        Self {
            is_supported: false,
            reason: Some(reason),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.is_supported
    }

    pub fn reason(&self) -> Option<UnsupportedReason> {
        self.reason
    }
}

/// A request that doesn't have the expected shape. This is a mistake of the
/// caller, not a verdict about a pattern.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Wrong arguments: expected an object")]
    NotAnObject,
    #[error("Wrong arguments: {0}")]
    WrongArguments(#[from] serde_json::Error),
}

/// Settings of the validator that a host may tune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorConfig {
    /// Memory limit of the emulated engine, in bytes.
    pub max_mem: usize,
    pub nest_limit: u32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_mem: DEFAULT_MAX_MEM,
            nest_limit: DEFAULT_NEST_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternValidator {
    config: ValidatorConfig,
}

impl PatternValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// The engine configuration used for a request.
    pub fn engine_config(&self, request: &ValidationRequest) -> Config {
        Config {
            case_sensitive: request.is_case_sensitive,
            never_capture: !request.require_capturing,
            log_errors: false,
            max_mem: self.config.max_mem,
            nest_limit: self.config.nest_limit,
        }
    }

    pub fn validate(&self, request: &ValidationRequest) -> ValidationResult {
        let config = self.engine_config(request);
        let result = match Builder::with_config(&request.pattern, config).compile() {
            Ok(_) => ValidationResult::supported(),
            Err(err) if err.is_size_limit_exceeded() => {
                ValidationResult::unsupported(UnsupportedReason::MemoryLimitExceeded)
            }
            Err(_) => ValidationResult::unsupported(UnsupportedReason::SyntaxError),
        };
        tracing::debug!(
            pattern = %request.pattern,
            supported = result.is_supported,
            reason = ?result.reason,
            "validated pattern"
        );
        result
    }

    /// Validates a request given as a JSON value, which must be an object
    /// with a string `regex` and optional boolean `isCaseSensitive` and
    /// `requireCapturing`.
    pub fn validate_value(&self, value: Value) -> Result<ValidationResult, RequestError> {
        if !value.is_object() {
            return Err(RequestError::NotAnObject);
        }
        let request: ValidationRequest = serde_json::from_value(value)?;
        Ok(self.validate(&request))
    }

    /// Same as [`PatternValidator::validate_value`], from and to JSON text.
    pub fn validate_json(&self, json: &str) -> Result<String, RequestError> {
        let value: Value = serde_json::from_str(json)?;
        let result = self.validate_value(value)?;
        Ok(serde_json::to_string(&result)?)
    }
}

/// Validates a request with the default configuration.
pub fn validate(request: &ValidationRequest) -> ValidationResult {
    PatternValidator::default().validate(request)
}

/// Validates a JSON request with the default configuration.
pub fn validate_json(json: &str) -> Result<String, RequestError> {
    PatternValidator::default().validate_json(json)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_defaults() {
        let request: ValidationRequest = serde_json::from_value(json!({ "regex": "a" })).unwrap();
        assert_eq!(request, ValidationRequest::new("a"));
        assert!(request.is_case_sensitive);
        assert!(!request.require_capturing);
    }

    #[test]
    fn engine_config_follows_request() {
        let validator = PatternValidator::default();
        let config = validator.engine_config(&ValidationRequest::new("a"));
        assert_eq!(config, Config::default());

        let request = ValidationRequest::new("a")
            .case_sensitive(false)
            .require_capturing(true);
        let config = validator.engine_config(&request);
        assert!(!config.case_sensitive);
        assert!(!config.never_capture);
        assert!(!config.log_errors);
    }

    #[test]
    fn result_invariant() {
        let result = ValidationResult::supported();
        assert!(result.is_supported());
        assert_eq!(result.reason(), None);
        let result = ValidationResult::unsupported(UnsupportedReason::SyntaxError);
        assert!(!result.is_supported());
        assert_eq!(result.reason(), Some(UnsupportedReason::SyntaxError));
    }

    #[test]
    fn serializes_like_the_host_object() {
        let json = serde_json::to_value(ValidationResult::supported()).unwrap();
        assert_eq!(json, json!({ "isSupported": true }));
        let json = serde_json::to_value(ValidationResult::unsupported(
            UnsupportedReason::MemoryLimitExceeded,
        ))
        .unwrap();
        assert_eq!(
            json,
            json!({ "isSupported": false, "reason": "memoryLimitExceeded" })
        );
    }

    #[test]
    fn validator_is_shareable() {
        fn assert_send_sync_copy<T: Send + Sync + Copy>() {}
        assert_send_sync_copy::<PatternValidator>();

        let validator = PatternValidator::default();
        let patterns = ["[a-z]+", "(", "a{1000}"];
        let expected: Vec<_> = patterns
            .iter()
            .map(|p| validator.validate(&ValidationRequest::new(*p)))
            .collect();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        patterns
                            .iter()
                            .map(|p| validator.validate(&ValidationRequest::new(*p)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn validator_config_fields_are_optional() {
        let config: ValidatorConfig = serde_json::from_value(json!({ "maxMem": 4096 })).unwrap();
        assert_eq!(config.max_mem, 4096);
        assert_eq!(config.nest_limit, DEFAULT_NEST_LIMIT);
    }
}
