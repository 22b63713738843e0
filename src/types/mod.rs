//! Core wire types shared across the chat, completions, and embeddings
//! endpoints: roles, messages, finish reasons, usage, and the client-side
//! resource limits.
//!
//! Grounded on the teacher's `src/types.rs` (`Role` enum) and
//! `src/types/stream.rs` (finish-reason/usage shapes), with the exact
//! finish-reason string mapping taken from
//! `examples/original_source/src/json_core.c`.

mod shared;

pub mod chat;
pub mod completion;
pub mod embeddings;

pub use shared::{Limits, Timeouts, Usage};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A single chat message. `tool_call_id`/`name` are only meaningful (and
/// only constructible) on a `Role::Tool` message — see `Message::tool`,
/// which is the Rust projection of the original `llm_tool_message_init`
/// helper that forbids pairing those fields with any other role.
/// `content` and `content_parts` are mutually exclusive: every constructor
/// sets exactly one of the two.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    /// Optional raw content-parts JSON span (spec.md §3), for multi-part
    /// messages (text plus images, etc.) — mutually exclusive with
    /// `content`. See [`Message::with_parts`].
    pub content_parts: Option<serde_json::Value>,
    pub tool_call_id: Option<String>,
    pub name: Option<String>,
    pub tool_calls: Option<Vec<crate::tool_accumulator::ToolCall>>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// A `role`/`content_parts` message, for multi-part content such as
    /// text mixed with image references. `parts` is the raw JSON array the
    /// API expects in place of a plain string `content`.
    pub fn with_parts(role: Role, parts: serde_json::Value) -> Self {
        Self {
            role,
            content: None,
            content_parts: Some(parts),
            tool_call_id: None,
            name: None,
            tool_calls: None,
        }
    }

    pub fn assistant_with_tool_calls(
        content: Option<String>,
        tool_calls: Vec<crate::tool_accumulator::ToolCall>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content,
            content_parts: None,
            tool_call_id: None,
            name: None,
            tool_calls: Some(tool_calls),
        }
    }

    /// The only way to produce a `Role::Tool` message — pairs the dispatch
    /// result with the call it answers, and forbids an assistant/user/etc.
    /// message from accidentally carrying those fields.
    pub fn tool(tool_call_id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            content_parts: None,
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            tool_calls: None,
        }
    }

    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            content_parts: None,
            tool_call_id: None,
            name: None,
            tool_calls: None,
        }
    }
}

/// Why a choice stopped generating. Mapping is byte-exact with
/// `llm_finish_reason_from_string`/`llm_finish_reason_to_string` in
/// `examples/original_source/src/json_core.c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Unknown,
}

impl FinishReason {
    pub fn from_str(s: &str) -> Self {
        match s {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "tool_calls" => FinishReason::ToolCalls,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::Length => "length",
            FinishReason::ToolCalls => "tool_calls",
            FinishReason::ContentFilter => "content_filter",
            FinishReason::Unknown => "unknown",
        }
    }
}
