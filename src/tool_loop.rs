//! The bounded, multi-turn tool-dispatch loop.
//!
//! State machine: REQ → receive → DISPATCH → APPEND → REQ, grounded on
//! `examples/original_source/examples/tool_loop.c`'s `main()` driver loop
//! and `llm_tool_dispatch_cb` signature. Budgets (`max_turns`,
//! `max_tool_args_bytes_per_turn`, `max_tool_output_bytes_total`) and
//! loop-repeat detection are not present in that C example — they come
//! from spec.md §4.5, which the example predates.

use crate::client::{Client, StreamCallbacks};
use crate::error::{Error, Stage};
use crate::tool_accumulator::ToolCall;
use crate::transport::Transport;
use crate::types::chat::{to_wire_messages, ChatRequest};
use crate::types::Message;

#[derive(Debug, Clone, Copy)]
pub struct ToolLoopBudgets {
    pub max_turns: u32,
    pub max_tool_args_bytes_per_turn: usize,
    pub max_tool_output_bytes_total: usize,
}

impl Default for ToolLoopBudgets {
    fn default() -> Self {
        Self {
            max_turns: 16,
            max_tool_args_bytes_per_turn: 4 * 1024 * 1024,
            max_tool_output_bytes_total: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug)]
pub struct ToolLoopResult {
    pub messages: Vec<Message>,
    pub final_content: Option<String>,
    pub turns_used: u32,
}

/// Build a stable signature for a turn's assistant tool calls, used to
/// detect the model repeating an identical set of calls turn after turn
/// without making progress. Order-sensitive: spec.md §4.5 only flags a
/// stuck loop when the same calls recur with the same names, arguments,
/// *and* order — two turns issuing the same calls in a different order
/// are not a repeat.
fn signature(calls: &[ToolCall]) -> String {
    calls
        .iter()
        .map(|c| format!("{}:{}", c.name, c.arguments))
        .collect::<Vec<_>>()
        .join("|")
}

/// Drives `request`/`messages` through the dispatch loop until the model
/// stops requesting tool calls, a budget is exceeded, the loop repeats
/// itself, or `abort` returns `true`.
///
/// `dispatch` is called once per tool call in a turn, in order, and must
/// return the tool's textual output (or an error, which aborts the loop).
pub fn run<T: Transport>(
    client: &mut Client<T>,
    request: &ChatRequest,
    mut messages: Vec<Message>,
    budgets: ToolLoopBudgets,
    mut dispatch: impl FnMut(&ToolCall) -> Result<String, Error>,
    mut abort: impl FnMut() -> bool,
) -> Result<ToolLoopResult, Error> {
    let mut turns = 0u32;
    let mut total_output_bytes = 0usize;
    let mut last_signature: Option<String> = None;

    loop {
        if abort() {
            return Err(Error::cancelled(Stage::None));
        }
        if turns >= budgets.max_turns {
            return Err(Error::protocol("tool loop exceeded max_turns"));
        }
        turns += 1;

        let mut turn_request = request.clone();
        turn_request.messages = to_wire_messages(&messages);

        let response = client.chat_completions(&turn_request)?;
        let parsed = response.parse()?;
        let Some(choice) = parsed.choice(0) else {
            return Err(Error::protocol("chat response has no choices"));
        };

        let content = choice.message.content.map(|s| s.to_string());
        let tool_calls = choice.message.tool_calls()?;

        if tool_calls.is_empty() {
            messages.push(Message::assistant(content.clone().unwrap_or_default()));
            return Ok(ToolLoopResult {
                messages,
                final_content: content,
                turns_used: turns,
            });
        }

        let turn_arg_bytes: usize = tool_calls.iter().map(|c| c.arguments.len()).sum();
        if turn_arg_bytes > budgets.max_tool_args_bytes_per_turn {
            return Err(Error::protocol("tool loop exceeded max_tool_args_bytes_per_turn"));
        }

        let sig = signature(&tool_calls);
        if last_signature.as_deref() == Some(sig.as_str()) {
            return Err(Error::protocol("tool loop detected identical repeated tool calls"));
        }
        last_signature = Some(sig);

        messages.push(Message::assistant_with_tool_calls(content, tool_calls.clone()));

        for call in &tool_calls {
            if abort() {
                return Err(Error::cancelled(Stage::None));
            }
            let output = dispatch(call)?;
            total_output_bytes += output.len();
            if total_output_bytes > budgets.max_tool_output_bytes_total {
                return Err(Error::protocol("tool loop exceeded max_tool_output_bytes_total"));
            }
            messages.push(Message::tool(call.id.clone(), call.name.clone(), output));
        }
    }
}

/// Streaming variant: each turn is driven via
/// [`Client::chat_completions_stream`] instead of the non-streaming
/// endpoint, forwarding content/reasoning deltas to `callbacks` as they
/// arrive.
pub fn run_streaming<T: Transport>(
    client: &mut Client<T>,
    request: &ChatRequest,
    mut messages: Vec<Message>,
    budgets: ToolLoopBudgets,
    mut callbacks: StreamCallbacks<'_>,
    mut dispatch: impl FnMut(&ToolCall) -> Result<String, Error>,
    mut abort: impl FnMut() -> bool,
) -> Result<ToolLoopResult, Error> {
    let mut turns = 0u32;
    let mut total_output_bytes = 0usize;
    let mut last_signature: Option<String> = None;

    loop {
        if abort() {
            return Err(Error::cancelled(Stage::None));
        }
        if turns >= budgets.max_turns {
            return Err(Error::protocol("tool loop exceeded max_turns"));
        }
        turns += 1;

        let mut turn_request = request.clone();
        turn_request.messages = to_wire_messages(&messages);

        // Shadow-accumulate the streamed content locally (in addition to
        // forwarding to the caller's callback) so the terminal branch below
        // can push the real assistant text instead of a placeholder.
        let mut turn_content = String::new();
        let mut content_delta = |delta: &str| {
            turn_content.push_str(delta);
            if let Some(cb) = callbacks.on_content_delta.as_deref_mut() {
                cb(delta);
            }
        };
        let turn_callbacks = StreamCallbacks {
            on_content_delta: Some(&mut content_delta),
            on_reasoning_delta: callbacks.on_reasoning_delta.as_deref_mut(),
            on_tool_call_delta: callbacks.on_tool_call_delta.as_deref_mut(),
            on_tool_args_fragment: callbacks.on_tool_args_fragment.as_deref_mut(),
            on_tool_args_complete: callbacks.on_tool_args_complete.as_deref_mut(),
            on_usage: callbacks.on_usage.as_deref_mut(),
            on_finish_reason: callbacks.on_finish_reason.as_deref_mut(),
            abort: callbacks.abort.as_deref_mut(),
        };
        let summary = client.chat_completions_stream(&turn_request, turn_callbacks)?;

        if summary.tool_calls.is_empty() {
            messages.push(Message::assistant(turn_content.clone()));
            return Ok(ToolLoopResult {
                messages,
                final_content: Some(turn_content),
                turns_used: turns,
            });
        }

        let turn_arg_bytes: usize = summary.tool_calls.iter().map(|c| c.arguments.len()).sum();
        if turn_arg_bytes > budgets.max_tool_args_bytes_per_turn {
            return Err(Error::protocol("tool loop exceeded max_tool_args_bytes_per_turn"));
        }

        let sig = signature(&summary.tool_calls);
        if last_signature.as_deref() == Some(sig.as_str()) {
            return Err(Error::protocol("tool loop detected identical repeated tool calls"));
        }
        last_signature = Some(sig);

        let turn_content = if turn_content.is_empty() { None } else { Some(turn_content) };
        messages.push(Message::assistant_with_tool_calls(turn_content, summary.tool_calls.clone()));

        for call in &summary.tool_calls {
            if abort() {
                return Err(Error::cancelled(Stage::None));
            }
            let output = dispatch(call)?;
            total_output_bytes += output.len();
            if total_output_bytes > budgets.max_tool_output_bytes_total {
                return Err(Error::protocol("tool loop exceeded max_tool_output_bytes_total"));
            }
            messages.push(Message::tool(call.id.clone(), call.name.clone(), output));
        }
    }
}
