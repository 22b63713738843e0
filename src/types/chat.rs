//! Chat completions: request builder and response parser.
//!
//! The request side is grounded on the teacher's `derive_builder`-based
//! request types (`src/api/chat.rs::ChatCompletionRequest`,
//! `src/api/embeddings.rs::EmbeddingRequest`). The response side follows
//! `examples/original_source/src/protocol_chat.c`'s `parse_chat_response`:
//! spans are returned raw (unescaped) and borrow from the owning
//! [`ChatResponse`]'s backing buffer rather than being copied out — the
//! "owned backing buffer + borrowed view" pattern from spec.md §9.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Stage};
use crate::types::{FinishReason, Message, Role, Usage};

/// One or many stop strings, matching the two shapes the request options
/// writer accepts for `stop` (spec.md §4.3).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StopSequences {
    Single(String),
    Many(Vec<String>),
}

impl From<String> for StopSequences {
    fn from(s: String) -> Self {
        StopSequences::Single(s)
    }
}

impl From<Vec<String>> for StopSequences {
    fn from(v: Vec<String>) -> Self {
        StopSequences::Many(v)
    }
}

impl StopSequences {
    pub fn count(&self) -> usize {
        match self {
            StopSequences::Single(_) => 1,
            StopSequences::Many(v) => v.len(),
        }
    }

    pub fn max_len(&self) -> usize {
        match self {
            StopSequences::Single(s) => s.len(),
            StopSequences::Many(v) => v.iter().map(|s| s.len()).max().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Builder)]
#[builder(build_fn(error = "Error", validate = "Self::validate"))]
pub struct ChatRequest {
    #[builder(setter(into))]
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[builder(setter(strip_option), default)]
    pub temperature: Option<f64>,
    #[builder(setter(strip_option), default)]
    pub top_p: Option<f64>,
    #[builder(setter(strip_option), default)]
    pub max_tokens: Option<u32>,
    #[builder(setter(strip_option, into), default)]
    pub stop: Option<StopSequences>,
    #[builder(setter(strip_option), default)]
    pub frequency_penalty: Option<f64>,
    #[builder(setter(strip_option), default)]
    pub presence_penalty: Option<f64>,
    #[builder(setter(strip_option), default)]
    pub seed: Option<i64>,
    /// A raw, caller-supplied JSON object (sans braces) merged into the
    /// request body verbatim — the Rust analogue of `json_build.c`'s
    /// `params_json` splice. Kept deliberately narrow: see
    /// `crate::json_builder` for the safer parse-and-remerge alternative
    /// this spec chose instead of brace-stripping.
    #[builder(setter(strip_option), default)]
    #[serde(skip)]
    pub extra_params: Option<serde_json::Map<String, serde_json::Value>>,
    #[builder(setter(custom), default)]
    pub tools: Option<Vec<serde_json::Value>>,
    #[builder(setter(skip), default)]
    pub stream: bool,
}

impl ChatRequestBuilder {
    pub fn tools(mut self, tools: Vec<serde_json::Value>) -> Self {
        self.tools = Some(Some(tools));
        self
    }

    /// `seed` is integer-typed (`int64_t` in the original) and can't carry
    /// NaN/infinity; only the four floating-point options need rejecting.
    fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("temperature", &self.temperature),
            ("top_p", &self.top_p),
            ("frequency_penalty", &self.frequency_penalty),
            ("presence_penalty", &self.presence_penalty),
        ] {
            if let Some(Some(v)) = value {
                if !v.is_finite() {
                    return Err(Error::protocol(format!("{name} must be finite (not NaN or infinite)")));
                }
            }
        }
        Ok(())
    }
}

impl ChatRequest {
    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

/// Wire projection of [`crate::types::Message`] — the shape the JSON body
/// actually needs, kept separate so the public `Message` type can carry
/// richer invariants (see `Message::tool`) than serde's flat struct model
/// allows.
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    /// Mutually exclusive with `content_parts` — `Message` enforces this at
    /// construction time, never here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_parts: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<serde_json::Value>>,
}

impl From<&Message> for WireMessage {
    fn from(m: &Message) -> Self {
        Self {
            role: m.role.as_str_static(),
            content: m.content.clone(),
            content_parts: m.content_parts.clone(),
            tool_call_id: m.tool_call_id.clone(),
            name: m.name.clone(),
            tool_calls: m.tool_calls.as_ref().map(|calls| {
                calls
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "id": c.id,
                            "type": c.kind,
                            "function": { "name": c.name, "arguments": c.arguments },
                        })
                    })
                    .collect()
            }),
        }
    }
}

impl Role {
    fn as_str_static(self) -> &'static str {
        self.as_str()
    }
}

pub fn to_wire_messages(messages: &[Message]) -> Vec<WireMessage> {
    messages.iter().map(WireMessage::from).collect()
}

/// Owns the raw, undecoded response body. Parsing borrows from this
/// buffer's lifetime, so no parsed span can outlive the response that
/// produced it.
pub struct ChatResponse {
    body: String,
}

impl ChatResponse {
    pub fn from_body(body: String) -> Self {
        Self { body }
    }

    pub fn raw_body(&self) -> &str {
        &self.body
    }

    pub fn parse(&self) -> Result<ParsedChatResponse<'_>, Error> {
        serde_json::from_str(&self.body)
            .map_err(|e| Error::new(crate::error::Code::Failed, Stage::Json, e.to_string()).with_body(self.body.clone()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ParsedChatResponse<'a> {
    #[serde(borrow)]
    pub id: &'a str,
    #[serde(borrow)]
    pub model: &'a str,
    #[serde(borrow)]
    pub choices: Vec<ParsedChoice<'a>>,
    #[serde(default)]
    pub usage: Usage,
}

impl<'a> ParsedChatResponse<'a> {
    /// Bounds-checked choice accessor, the Rust projection of
    /// `llm_chat_choice_get`. Returns `None` past the end rather than
    /// panicking.
    pub fn choice(&self, index: usize) -> Option<&ParsedChoice<'a>> {
        self.choices.get(index)
    }
}

#[derive(Debug, Deserialize)]
pub struct ParsedChoice<'a> {
    #[serde(default)]
    pub index: u32,
    #[serde(borrow)]
    pub message: ParsedMessage<'a>,
    pub finish_reason: Option<&'a str>,
}

impl<'a> ParsedChoice<'a> {
    pub fn finish_reason(&self) -> FinishReason {
        self.finish_reason.map(FinishReason::from_str).unwrap_or(FinishReason::Unknown)
    }
}

#[derive(Debug, Deserialize)]
pub struct ParsedMessage<'a> {
    #[serde(borrow)]
    pub role: &'a str,
    #[serde(default, borrow)]
    pub content: Option<&'a str>,
    #[serde(default, borrow)]
    pub reasoning_content: Option<&'a str>,
    /// Kept as an unparsed JSON subtree span — the direct analogue of the
    /// original's `tool_calls_span`. Fed into
    /// [`crate::tool_accumulator::ToolCallAccumulator`] one element at a
    /// time by the caller, or parsed in bulk by [`Self::tool_calls`].
    #[serde(default, borrow)]
    pub tool_calls: Option<&'a serde_json::value::RawValue>,
}

impl<'a> ParsedMessage<'a> {
    pub fn tool_calls(&self) -> Result<Vec<crate::tool_accumulator::ToolCall>, Error> {
        let Some(raw) = self.tool_calls else {
            return Ok(Vec::new());
        };
        #[derive(Deserialize)]
        struct RawToolCall<'b> {
            id: &'b str,
            #[serde(rename = "type")]
            kind: &'b str,
            function: RawFunction<'b>,
        }
        #[derive(Deserialize)]
        struct RawFunction<'b> {
            name: &'b str,
            arguments: &'b str,
        }
        let calls: Vec<RawToolCall<'_>> = serde_json::from_str(raw.get())
            .map_err(|e| Error::json(format!("malformed tool_calls: {e}")))?;
        Ok(calls
            .into_iter()
            .map(|c| crate::tool_accumulator::ToolCall {
                id: c.id.to_string(),
                kind: c.kind.to_string(),
                name: c.function.name.to_string(),
                arguments: c.function.arguments.to_string(),
            })
            .collect())
    }
}

/// One streamed delta for a chat completion, matching the shape of
/// `choices[0].delta` in an SSE `data:` frame.
#[derive(Debug, Deserialize)]
pub struct ParsedChatChunk<'a> {
    #[serde(default, borrow)]
    pub id: Option<&'a str>,
    #[serde(default, borrow)]
    pub model: Option<&'a str>,
    #[serde(borrow)]
    pub choices: Vec<ParsedChunkChoice<'a>>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ParsedChunkChoice<'a> {
    #[serde(default)]
    pub index: u32,
    #[serde(borrow)]
    pub delta: ParsedChunkDelta<'a>,
    #[serde(default, borrow)]
    pub finish_reason: Option<&'a str>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ParsedChunkDelta<'a> {
    #[serde(default, borrow)]
    pub content: Option<&'a str>,
    #[serde(default, borrow)]
    pub reasoning_content: Option<&'a str>,
    #[serde(default, borrow)]
    pub tool_calls: Option<&'a serde_json::value::RawValue>,
}

impl<'a> ParsedChunkDelta<'a> {
    /// Each element of the `tool_calls` delta array, ready to feed one at
    /// a time into a [`crate::tool_accumulator::ToolCallAccumulator`].
    pub fn tool_call_deltas(&self) -> Result<Vec<(u32, crate::tool_accumulator::ToolCallDelta<'a>)>, Error> {
        let Some(raw) = self.tool_calls else {
            return Ok(Vec::new());
        };
        #[derive(Deserialize)]
        struct RawDelta<'b> {
            index: u32,
            #[serde(default, borrow)]
            id: Option<&'b str>,
            #[serde(default, rename = "type", borrow)]
            kind: Option<&'b str>,
            #[serde(default, borrow)]
            function: Option<RawFunctionDelta<'b>>,
        }
        #[derive(Deserialize)]
        struct RawFunctionDelta<'b> {
            #[serde(default, borrow)]
            name: Option<&'b str>,
            #[serde(default, borrow)]
            arguments: Option<&'b str>,
        }
        let deltas: Vec<RawDelta<'_>> = serde_json::from_str(raw.get())
            .map_err(|e| Error::json(format!("malformed tool_calls delta: {e}")))?;
        Ok(deltas
            .into_iter()
            .map(|d| {
                (
                    d.index,
                    crate::tool_accumulator::ToolCallDelta {
                        id: d.id,
                        kind: d.kind,
                        name: d.function.as_ref().and_then(|f| f.name),
                        arguments_fragment: d.function.as_ref().and_then(|f| f.arguments),
                    },
                )
            })
            .collect())
    }
}

/// Find the choice a streaming delta applies to. Preserves the original
/// `find_choice_token` compatibility quirk: when `choice_index` is 0 and no
/// element carries an explicit `"index"` field matching it, fall back to
/// the first array element rather than treating it as "not found".
pub fn find_choice<'a, 'b>(choices: &'b [ParsedChunkChoice<'a>], choice_index: u32) -> Option<&'b ParsedChunkChoice<'a>> {
    if let Some(found) = choices.iter().find(|c| c.index == choice_index) {
        return Some(found);
    }
    if choice_index == 0 {
        return choices.first();
    }
    None
}

/// Validates `stop` against the client's configured caps. Lives here
/// rather than in `ChatRequestBuilder::validate` because the caps come
/// from `Limits`, which the builder has no access to — mirroring
/// `build_embeddings_request`'s external-parameter cap pattern in
/// `examples/original_source/src/json_build.c`. `0` means unbounded.
pub fn check_stop_caps(stop: Option<&StopSequences>, limits: &crate::types::Limits) -> Result<(), Error> {
    let Some(stop) = stop else {
        return Ok(());
    };
    if limits.max_stop_strings != 0 && stop.count() > limits.max_stop_strings {
        return Err(Error::protocol("stop exceeds max_stop_strings"));
    }
    if limits.max_stop_bytes != 0 && stop.max_len() > limits.max_stop_bytes {
        return Err(Error::protocol("stop string exceeds max_stop_bytes"));
    }
    Ok(())
}
