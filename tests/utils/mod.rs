use is_regex_supported::{UnsupportedReason, ValidationRequest, ValidationResult, validate};
use regex as rust_regex;

/// Validate a pattern with the default options.
pub fn check(pattern: &str) -> ValidationResult {
    validate(&ValidationRequest::new(pattern))
}

/// Compare the verdict on a pattern with rust-regex, which parses the same
/// syntax with fewer restrictions. Panics if an inconsistency is detected:
/// a pattern rust-regex rejects as malformed must be a syntax error, and a
/// pattern we support must compile with rust-regex.
pub fn check_against_rust_regex(pattern: &str) -> ValidationResult {
    let ours = check(pattern);
    match rust_regex::Regex::new(pattern) {
        Err(rust_regex::Error::Syntax(e)) => assert_eq!(
            ours.reason(),
            Some(UnsupportedReason::SyntaxError),
            "rust-regex rejected {pattern:?} but we did not report a syntax error: {e}"
        ),
        Err(e) => assert!(
            !ours.is_supported(),
            "rust-regex failed to compile {pattern:?} but we support it: {e}"
        ),
        Ok(_) => (),
    }
    ours
}
