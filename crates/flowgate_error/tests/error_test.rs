//! Tests for error types and classification.

use flowgate_error::{
    BuilderError, BuilderErrorKind, ConfigError, ErrorCode, FlowgateError, FlowgateErrorKind,
    ProviderError, RetryableError, ToolError, ToolErrorKind,
};

#[test]
fn test_errors_track_location() {
    let err = ConfigError::new("bad value");
    assert!(err.file.ends_with("error_test.rs"));
    assert!(err.line > 0);

    let err = ToolError::execution("boom");
    assert!(err.file.ends_with("error_test.rs"));
}

#[test]
fn test_config_error_names_field() {
    let err = ConfigError::invalid_field("window_ms", "must be greater than zero");
    assert_eq!(err.message, "window_ms must be greater than zero");
    assert!(err.file.ends_with("error_test.rs"));
    assert!(err.to_string().starts_with("Configuration Error: window_ms"));
}

#[test]
fn test_flowgate_error_wraps_kinds() {
    let err: FlowgateError = ToolError::new(ToolErrorKind::NotFound("x".to_string())).into();
    assert!(matches!(err.kind(), FlowgateErrorKind::Tool(_)));
    assert!(format!("{}", err).contains("Tool not found: x"));

    let err: FlowgateError = BuilderError::invalid_field("window_ms", "must be > 0").into();
    match err.kind() {
        FlowgateErrorKind::Builder(inner) => assert_eq!(
            inner.kind(),
            &BuilderErrorKind::InvalidField {
                field: "window_ms".to_string(),
                reason: "must be > 0".to_string(),
            }
        ),
        other => panic!("unexpected kind: {}", other),
    }
}

#[test]
fn test_provider_error_classification() {
    let err = ProviderError::from_http_status(429, "slow down");
    assert_eq!(err.error_code(), Some(ErrorCode::RateLimit));
    assert!(err.message.contains("HTTP 429"));

    let err = ProviderError::unclassified("mystery");
    assert_eq!(err.error_code(), None);
}

#[test]
fn test_tool_error_classification() {
    let timeout = ToolError::new(ToolErrorKind::Timeout {
        name: "search".to_string(),
        timeout_ms: 50,
    });
    assert_eq!(timeout.error_code(), Some(ErrorCode::Timeout));
    assert_eq!(timeout.kind.to_string(), "Tool 'search' timed out after 50ms");

    let failure = ToolError::execution("bad args");
    assert_eq!(failure.error_code(), None);
}

#[test]
fn test_default_retryable_codes() {
    assert!(ErrorCode::DEFAULT_RETRYABLE.contains(&ErrorCode::RateLimit));
    assert!(!ErrorCode::DEFAULT_RETRYABLE.contains(&ErrorCode::Authentication));
    assert!(ErrorCode::Connection.is_connection_failure());
}
