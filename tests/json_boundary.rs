use is_regex_supported::{PatternValidator, RequestError, ValidatorConfig, validate_json};
use serde_json::{Value, json};

fn verdict(request: Value) -> Value {
    let output = validate_json(&request.to_string()).unwrap();
    serde_json::from_str(&output).unwrap()
}

#[test]
fn test_supported_has_no_reason() {
    assert_eq!(verdict(json!({ "regex": "" })), json!({ "isSupported": true }));
    assert_eq!(
        verdict(json!({ "regex": "[a-z]+", "isCaseSensitive": false })),
        json!({ "isSupported": true })
    );
}

#[test]
fn test_reasons() {
    assert_eq!(
        verdict(json!({ "regex": "(unterminated" })),
        json!({ "isSupported": false, "reason": "syntaxError" })
    );
    assert_eq!(
        verdict(json!({ "regex": "a{1000}{1000}{1000}" })),
        json!({ "isSupported": false, "reason": "memoryLimitExceeded" })
    );
}

#[test]
fn test_options_are_read() {
    let pattern = "(a)".repeat(30);
    assert_eq!(
        verdict(json!({ "regex": pattern, "requireCapturing": false })),
        json!({ "isSupported": true })
    );
    assert_eq!(
        verdict(json!({ "regex": pattern, "requireCapturing": true })),
        json!({ "isSupported": false, "reason": "memoryLimitExceeded" })
    );
}

#[test]
fn test_unknown_fields_are_ignored() {
    assert_eq!(
        verdict(json!({ "regex": "a", "somethingElse": 1 })),
        json!({ "isSupported": true })
    );
}

#[test]
fn test_wrong_arguments() {
    assert!(matches!(
        validate_json(r#"{ "isCaseSensitive": true }"#),
        Err(RequestError::WrongArguments(_))
    ));
    assert!(matches!(
        validate_json(r#"{ "regex": 42 }"#),
        Err(RequestError::WrongArguments(_))
    ));
    assert!(matches!(
        validate_json(r#"{ "regex": "a", "requireCapturing": "yes" }"#),
        Err(RequestError::WrongArguments(_))
    ));
    assert!(matches!(
        validate_json(r#"["a", true, false]"#),
        Err(RequestError::NotAnObject)
    ));
    assert!(matches!(
        validate_json(r#""a""#),
        Err(RequestError::NotAnObject)
    ));
    assert!(matches!(
        validate_json("{"),
        Err(RequestError::WrongArguments(_))
    ));
}

#[test]
fn test_validate_value_with_config() {
    let validator = PatternValidator::new(ValidatorConfig {
        max_mem: 8 << 10,
        ..ValidatorConfig::default()
    });
    let result = validator
        .validate_value(json!({ "regex": "a{200}" }))
        .unwrap();
    assert!(result.is_supported());
}
