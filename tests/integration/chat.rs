use llmclient::client::Client;
use llmclient::types::chat::{to_wire_messages, ChatRequest};
use llmclient::types::Message;

use crate::fake_transport::FakeTransport;

fn build_request() -> ChatRequest {
    ChatRequest::builder()
        .model("gpt-4o-mini")
        .messages(to_wire_messages(&[Message::user("hi")]))
        .build()
        .unwrap()
}

#[test]
fn non_streaming_chat_completion_parses_content() {
    let mut transport = FakeTransport::new();
    transport.push_json(
        200,
        r#"{"id":"resp_1","model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":"hello there"},"finish_reason":"stop"}],"usage":{"prompt_tokens":5,"completion_tokens":2,"total_tokens":7}}"#,
    );
    let mut client = Client::new(transport, "https://api.example.com", "sk-test");

    let response = client.chat_completions(&build_request()).unwrap();
    let parsed = response.parse().unwrap();
    let choice = parsed.choice(0).unwrap();

    assert_eq!(choice.message.content, Some("hello there"));
    assert_eq!(choice.finish_reason(), llmclient::types::FinishReason::Stop);
    assert_eq!(parsed.usage.total_tokens, 7);
}

#[test]
fn non_success_status_surfaces_api_error_detail() {
    let mut transport = FakeTransport::new();
    transport.push_json(429, r#"{"error":{"message":"rate limited","type":"rate_limit_error"}}"#);
    let mut client = Client::new(transport, "https://api.example.com", "sk-test").enable_last_error(true);

    let err = client.chat_completions(&build_request()).unwrap_err();
    assert_eq!(err.detail().unwrap().message.as_deref(), Some("rate limited"));
    assert_eq!(client.last_error().unwrap().detail().unwrap().type_.as_deref(), Some("rate_limit_error"));
}

#[test]
fn last_error_slot_clears_between_requests() {
    let mut transport = FakeTransport::new();
    transport.push_json(500, r#"{"error":{"message":"boom"}}"#);
    transport.push_json(
        200,
        r#"{"id":"resp_2","model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":"ok"},"finish_reason":"stop"}],"usage":{"prompt_tokens":1,"completion_tokens":1,"total_tokens":2}}"#,
    );
    let mut client = Client::new(transport, "https://api.example.com", "sk-test").enable_last_error(true);

    assert!(client.chat_completions(&build_request()).is_err());
    assert!(client.last_error().is_some());

    let response = client.chat_completions(&build_request()).unwrap();
    assert!(client.last_error().is_none());
    assert!(response.parse().is_ok());
}

#[test]
fn non_success_status_carries_http_status() {
    let mut transport = FakeTransport::new();
    transport.push_json(429, r#"{"error":{"message":"rate limited"}}"#);
    let mut client = Client::new(transport, "https://api.example.com", "sk-test");

    let err = client.chat_completions(&build_request()).unwrap_err();
    assert_eq!(err.http_status(), Some(429));
}

#[test]
fn set_api_key_rejects_header_injection() {
    let transport = FakeTransport::new();
    let mut client = Client::new(transport, "https://api.example.com", "sk-test");
    assert!(client.set_api_key("sk-evil\r\nX-Injected: 1").is_err());
}

#[test]
fn per_request_header_override_merges_and_protects_content_type() {
    let mut transport = FakeTransport::new();
    transport.push_json(
        200,
        r#"{"id":"resp_1","model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":"ok"},"finish_reason":"stop"}],"usage":{"prompt_tokens":1,"completion_tokens":1,"total_tokens":2}}"#,
    );
    let mut client = Client::new(transport, "https://api.example.com", "sk-test");

    let overrides = std::collections::HashMap::from([("X-Request-Id".to_string(), "abc123".to_string())]);
    let response = client.chat_completions_with_headers(&build_request(), Some(&overrides)).unwrap();
    assert!(response.parse().is_ok());

    let mut bad_overrides = std::collections::HashMap::new();
    bad_overrides.insert("Content-Type".to_string(), "text/plain".to_string());
    let err = client.chat_completions_with_headers(&build_request(), Some(&bad_overrides)).unwrap_err();
    assert_eq!(err.stage(), llmclient::error::Stage::Protocol);
}

#[test]
fn choice_index_past_end_returns_none() {
    let mut transport = FakeTransport::new();
    transport.push_json(
        200,
        r#"{"id":"resp_3","model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":"only one"},"finish_reason":"stop"}],"usage":{"prompt_tokens":1,"completion_tokens":1,"total_tokens":2}}"#,
    );
    let mut client = Client::new(transport, "https://api.example.com", "sk-test");
    let response = client.chat_completions(&build_request()).unwrap();
    let parsed = response.parse().unwrap();
    assert!(parsed.choice(5).is_none());
}
