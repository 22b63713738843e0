#![no_main]

use libfuzzer_sys::fuzz_target;
use llmclient::tool_accumulator::{ToolCallAccumulator, ToolCallDelta};

/// Grounded on `examples/original_source/tests/fuzz_tool_accum.c`: a byte
/// cursor drives a sequence of synthetic deltas against a real accumulator,
/// checking only that feeding garbage never panics (cap rejections are a
/// normal `Err`).
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take_u8(&mut self) -> u8 {
        let b = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        b
    }

    fn take_str(&mut self, max_len: usize) -> &'a str {
        let len = (self.take_u8() as usize % (max_len + 1)).min(self.data.len().saturating_sub(self.pos));
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        std::str::from_utf8(slice).unwrap_or("")
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = Cursor { data, pos: 0 };
    let max_arg_bytes = match cursor.take_u8() {
        0 => 0,
        n => n as usize * 16,
    };
    let mut acc = ToolCallAccumulator::new(max_arg_bytes);

    while cursor.pos < data.len() {
        let index = cursor.take_u8() as u32 % 4;
        let has_id = cursor.take_u8() & 1 == 1;
        let has_kind = cursor.take_u8() & 1 == 1;
        let has_name = cursor.take_u8() & 1 == 1;
        let id = cursor.take_str(16);
        let kind = cursor.take_str(16);
        let name = cursor.take_str(16);
        let fragment = cursor.take_str(64);

        let delta = ToolCallDelta {
            id: has_id.then_some(id),
            kind: has_kind.then_some(kind),
            name: has_name.then_some(name),
            arguments_fragment: Some(fragment),
        };
        let _ = acc.feed(index, &delta);
        let _ = acc.completed_snapshot();
    }

    let _ = acc.finish_indexed();
});
