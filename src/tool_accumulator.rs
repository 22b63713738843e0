//! Reassembles streamed tool-call argument fragments, keyed by the
//! `index` field OpenAI-style deltas carry.
//!
//! Grounded on the teacher's `src/types/stream.rs::ToolCallAccumulator`
//! (write-once id/name, always-append arguments) generalized with the
//! freeze-and-cap semantics from `examples/original_source/src/tools_accum.c`,
//! which the teacher's version lacks entirely.

use std::collections::BTreeMap;

use crate::error::Error;

/// One delta fragment for a single tool call, as streamed by the API.
#[derive(Debug, Clone, Default)]
pub struct ToolCallDelta<'a> {
    pub id: Option<&'a str>,
    pub kind: Option<&'a str>,
    pub name: Option<&'a str>,
    pub arguments_fragment: Option<&'a str>,
}

/// A fully reassembled tool call, ready to hand to a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Default)]
struct Slot {
    id: Option<String>,
    kind: Option<String>,
    name: Option<String>,
    arguments: String,
    frozen: bool,
}

impl Slot {
    fn feed(&mut self, delta: &ToolCallDelta<'_>, max_arg_bytes: usize) -> Result<(), Error> {
        if self.frozen {
            return Err(Error::protocol("tool call accumulator already frozen"));
        }
        if let Some(id) = delta.id {
            if self.id.is_none() {
                self.id = Some(id.to_string());
            }
        }
        if let Some(kind) = delta.kind {
            if self.kind.is_none() {
                self.kind = Some(kind.to_string());
            }
        }
        if let Some(name) = delta.name {
            if self.name.is_none() {
                self.name = Some(name.to_string());
            }
        }
        if let Some(fragment) = delta.arguments_fragment {
            if max_arg_bytes != 0 && self.arguments.len() + fragment.len() > max_arg_bytes {
                return Err(Error::protocol("tool call arguments exceed max_tool_args_bytes_per_call"));
            }
            self.arguments.push_str(fragment);
        }
        Ok(())
    }
}

/// Collects tool-call deltas across a streamed response, indexed sparsely
/// by the `index` the API assigns each concurrent tool call.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    slots: BTreeMap<u32, Slot>,
    max_arg_bytes: usize,
}

impl ToolCallAccumulator {
    pub fn new(max_arg_bytes: usize) -> Self {
        Self {
            slots: BTreeMap::new(),
            max_arg_bytes,
        }
    }

    pub fn feed(&mut self, index: u32, delta: &ToolCallDelta<'_>) -> Result<(), Error> {
        let slot = self.slots.entry(index).or_default();
        slot.feed(delta, self.max_arg_bytes)
    }

    /// Freezes every slot (refusing further deltas) and returns the
    /// completed tool calls in index order. A slot missing `id` or `name`
    /// is dropped rather than surfaced half-built.
    pub fn finish(self) -> Vec<ToolCall> {
        self.finish_indexed().into_iter().map(|(_, call)| call).collect()
    }

    /// Like [`finish`](Self::finish), but keeps each call paired with the
    /// `index` it was streamed under — needed to fire
    /// `on_tool_args_complete(index, &ToolCall)` per delta index.
    pub fn finish_indexed(mut self) -> Vec<(u32, ToolCall)> {
        let mut out = Vec::with_capacity(self.slots.len());
        for (_, slot) in self.slots.iter_mut() {
            slot.frozen = true;
        }
        for (index, slot) in self.slots {
            if let (Some(id), Some(name)) = (slot.id, slot.name) {
                out.push((
                    index,
                    ToolCall {
                        id,
                        kind: slot.kind.unwrap_or_else(|| "function".to_string()),
                        name,
                        arguments: unescape_json_string(&slot.arguments),
                    },
                ));
            }
        }
        out
    }

    /// Non-consuming snapshot of the calls that are currently complete
    /// (have both `id` and `name`), without freezing anything. Used to fire
    /// `on_tool_args_complete` as soon as a frame's `finish_reason` marks a
    /// tool call done, ahead of the final [`finish_indexed`](Self::finish_indexed)
    /// pass at stream end.
    pub fn completed_snapshot(&self) -> Vec<(u32, ToolCall)> {
        self.slots
            .iter()
            .filter_map(|(index, slot)| {
                let (id, name) = (slot.id.clone()?, slot.name.clone()?);
                Some((
                    *index,
                    ToolCall {
                        id,
                        kind: slot.kind.clone().unwrap_or_else(|| "function".to_string()),
                        name,
                        arguments: unescape_json_string(&slot.arguments),
                    },
                ))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Unescape a JSON string body (no surrounding quotes) per RFC 8259 —
/// the one place spans are *not* kept raw, because spec.md requires
/// `on_tool_args_complete` to deliver the unescaped arguments string.
pub fn unescape_json_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                if let Ok(code) = u32::from_str_radix(&hex, 16) {
                    if let Some(ch) = char::from_u32(code) {
                        out.push(ch);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
