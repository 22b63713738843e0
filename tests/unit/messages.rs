use llmclient::tool_accumulator::ToolCall;
use llmclient::types::{FinishReason, Message, Role};

#[test]
fn tool_message_requires_both_id_and_name() {
    let msg = Message::tool("call_1", "get_weather", "72F");
    assert_eq!(msg.role, Role::Tool);
    assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(msg.name.as_deref(), Some("get_weather"));
    assert_eq!(msg.content.as_deref(), Some("72F"));
}

#[test]
fn plain_messages_never_carry_tool_fields() {
    let msg = Message::user("hi");
    assert!(msg.tool_call_id.is_none());
    assert!(msg.name.is_none());
}

#[test]
fn assistant_with_tool_calls_carries_them() {
    let calls = vec![ToolCall {
        id: "call_1".into(),
        kind: "function".into(),
        name: "get_weather".into(),
        arguments: "{}".into(),
    }];
    let msg = Message::assistant_with_tool_calls(None, calls.clone());
    assert_eq!(msg.tool_calls, Some(calls));
}

#[test]
fn finish_reason_unknown_for_unrecognized_string() {
    assert_eq!(FinishReason::from_str("something_new"), FinishReason::Unknown);
}
