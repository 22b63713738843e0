#![no_main]

use libfuzzer_sys::fuzz_target;
use llmclient::types::chat::ParsedChatChunk;

/// Grounded on `examples/original_source/tests/fuzz_json_spans.c`: feeds
/// arbitrary bytes straight into the zero-copy chunk parser and its
/// tool-call-delta extraction. Malformed input must surface as `Err`, never
/// a panic or an out-of-bounds borrow from the source buffer.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(chunk) = serde_json::from_str::<ParsedChatChunk<'_>>(text) else {
        return;
    };

    for choice in &chunk.choices {
        let _ = choice.delta.tool_call_deltas();
    }
});
