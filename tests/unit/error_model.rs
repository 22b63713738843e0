use llmclient::error::{Code, Error, Stage};

#[test]
fn code_and_stage_are_independently_queryable() {
    let err = Error::sse("frame overflow");
    assert_eq!(err.code(), Code::Failed);
    assert_eq!(err.stage(), Stage::Sse);
}

#[test]
fn with_body_extracts_api_error_detail() {
    let err = Error::protocol("http status 429").with_body(
        r#"{"error": {"message": "rate limited", "type": "rate_limit", "code": 429}}"#,
    );
    let detail = err.detail().expect("detail should parse");
    assert_eq!(detail.message.as_deref(), Some("rate limited"));
    assert_eq!(detail.type_.as_deref(), Some("rate_limit"));
}

#[test]
fn with_body_tolerates_non_envelope_bodies() {
    let err = Error::protocol("http status 500").with_body("internal server error, not json");
    assert!(err.detail().is_none());
    assert_eq!(err.raw_body(), Some("internal server error, not json"));
}

#[test]
fn cancelled_errors_carry_cancelled_code() {
    let err = Error::cancelled(Stage::Transport);
    assert_eq!(err.code(), Code::Cancelled);
}
