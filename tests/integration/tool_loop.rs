use llmclient::client::{Client, StreamCallbacks};
use llmclient::tool_loop::{self, ToolLoopBudgets};
use llmclient::types::chat::ChatRequest;
use llmclient::types::Message;

use crate::fake_transport::FakeTransport;

fn request() -> ChatRequest {
    ChatRequest::builder().model("gpt-4o-mini").messages(Vec::new()).build().unwrap()
}

const TOOL_CALL_RESPONSE: &str = r#"{"id":"r1","model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":null,"tool_calls":[{"id":"call_1","type":"function","function":{"name":"get_weather","arguments":"{\"city\":\"NYC\"}"}}]},"finish_reason":"tool_calls"}],"usage":{"prompt_tokens":1,"completion_tokens":1,"total_tokens":2}}"#;

const FINAL_RESPONSE: &str = r#"{"id":"r2","model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":"It is sunny."},"finish_reason":"stop"}],"usage":{"prompt_tokens":1,"completion_tokens":1,"total_tokens":2}}"#;

#[test]
fn completes_after_one_tool_dispatch_round() {
    let mut transport = FakeTransport::new();
    transport.push_json(200, TOOL_CALL_RESPONSE);
    transport.push_json(200, FINAL_RESPONSE);
    let mut client = Client::new(transport, "https://api.example.com", "sk-test");

    let result = tool_loop::run(
        &mut client,
        &request(),
        vec![Message::user("weather in NYC?")],
        ToolLoopBudgets::default(),
        |call| {
            assert_eq!(call.name, "get_weather");
            Ok("72F and sunny".to_string())
        },
        || false,
    )
    .unwrap();

    assert_eq!(result.turns_used, 2);
    assert_eq!(result.final_content.as_deref(), Some("It is sunny."));
}

#[test]
fn detects_identical_repeated_tool_calls() {
    let mut transport = FakeTransport::new();
    transport.push_json(200, TOOL_CALL_RESPONSE);
    transport.push_json(200, TOOL_CALL_RESPONSE);
    let mut client = Client::new(transport, "https://api.example.com", "sk-test");

    let result = tool_loop::run(
        &mut client,
        &request(),
        vec![Message::user("weather in NYC?")],
        ToolLoopBudgets::default(),
        |_| Ok("72F".to_string()),
        || false,
    );

    assert!(result.is_err());
}

#[test]
fn max_turns_budget_is_enforced() {
    let mut transport = FakeTransport::new();
    for _ in 0..3 {
        transport.push_json(200, TOOL_CALL_RESPONSE);
    }
    let mut client = Client::new(transport, "https://api.example.com", "sk-test");

    let budgets = ToolLoopBudgets { max_turns: 1, ..ToolLoopBudgets::default() };
    let result = tool_loop::run(
        &mut client,
        &request(),
        vec![Message::user("weather?")],
        budgets,
        |_| Ok("ignored".to_string()),
        || false,
    );
    assert!(result.is_err());
}

#[test]
fn abort_before_request_cancels_loop() {
    let transport = FakeTransport::new();
    let mut client = Client::new(transport, "https://api.example.com", "sk-test");

    let result = tool_loop::run(
        &mut client,
        &request(),
        vec![Message::user("weather?")],
        ToolLoopBudgets::default(),
        |_| Ok("never reached".to_string()),
        || true,
    );
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().code(), llmclient::error::Code::Cancelled);
}

#[test]
fn run_streaming_carries_real_streamed_content_into_history() {
    let mut transport = FakeTransport::new();
    transport.push_stream(
        200,
        vec![
            "data: {\"id\":\"r1\",\"model\":\"gpt-4o-mini\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"It \"}}]}\n\n",
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"is sunny.\"},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        ],
    );
    let mut client = Client::new(transport, "https://api.example.com", "sk-test");

    let result = tool_loop::run_streaming(
        &mut client,
        &request(),
        vec![Message::user("weather?")],
        ToolLoopBudgets::default(),
        StreamCallbacks::default(),
        |_| Ok("never reached".to_string()),
        || false,
    )
    .unwrap();

    assert_eq!(result.final_content.as_deref(), Some("It is sunny."));
    let last = result.messages.last().unwrap();
    assert_eq!(last.content.as_deref(), Some("It is sunny."));
}
