//! Resource limits, timeouts, and token usage — the client-side knobs from
//! spec.md §3 ("Limits") and §6 ("Timeouts"), grounded on
//! `examples/original_source/src/llm.c`'s default constants and
//! `include/llm/llm.h`'s `llm_limits_t`/`llm_timeout_t`.

use serde::{Deserialize, Serialize};

/// Byte/count budgets enforced by the SSE scanner, the tool-call
/// accumulator, and the request builders. Defaults match the original C
/// client's built-in defaults where one exists; every field is `0` =
/// unbounded (spec.md §3/§4.1).
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_response_bytes: usize,
    pub max_line_bytes: usize,
    pub max_frame_bytes: usize,
    pub max_sse_buffer_bytes: usize,
    pub max_tool_args_bytes_per_call: usize,
    pub max_tool_args_bytes_per_turn: usize,
    pub max_tool_output_bytes_total: usize,
    /// Per `examples/original_source/src/json_build.c::build_embeddings_request`'s
    /// `max_input_bytes` parameter.
    pub max_embedding_input_bytes: usize,
    /// Per the same function's `max_inputs` parameter.
    pub max_embedding_inputs: usize,
    /// Named `max_content_bytes` in `llm.h`'s `llm_limits_t`; spelled out
    /// here to match spec.md's "max content-parts bytes" wording.
    pub max_content_parts_bytes: usize,
    pub max_content_parts: usize,
    /// No concrete original-source default exists for either stop-sequence
    /// cap — `llm_request_opts_json_write` takes them as bare function
    /// parameters with no built-in constant. Defaults below are a judgment
    /// call, documented in DESIGN.md.
    pub max_stop_strings: usize,
    pub max_stop_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_response_bytes: 10 * 1024 * 1024,
            max_line_bytes: 1024 * 1024,
            max_frame_bytes: 1024 * 1024,
            max_sse_buffer_bytes: 2 * 1024 * 1024,
            max_tool_args_bytes_per_call: 1024 * 1024,
            max_tool_args_bytes_per_turn: 4 * 1024 * 1024,
            max_tool_output_bytes_total: 16 * 1024 * 1024,
            max_embedding_input_bytes: 256 * 1024,
            max_embedding_inputs: 128,
            max_content_parts_bytes: 64 * 1024,
            max_content_parts: 32,
            max_stop_strings: 4,
            max_stop_bytes: 256,
        }
    }
}

/// Connect/overall timeouts, in milliseconds, matching the original
/// client's `llm_timeout_t` defaults (connect 10s, overall 60s).
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect_ms: u64,
    pub overall_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect_ms: 10_000,
            overall_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
