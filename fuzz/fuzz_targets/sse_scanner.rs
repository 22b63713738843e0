#![no_main]

use libfuzzer_sys::fuzz_target;
use llmclient::sse::{SseLimits, SseScanner};

/// Grounded on `examples/original_source/tests/fuzz_sse_config.c`: the
/// first 4 bytes pick the four byte budgets (with the high bit of each
/// selecting "unbounded" the same way `cfgN & 0x80` does in the C target),
/// the rest of the input is fed to the scanner. Never expected to panic —
/// only to return `Ok` or a clean `Err`.
fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let cap = |byte: u8, modulus: usize| -> usize {
        if byte & 0x80 != 0 {
            0
        } else {
            1 + (byte as usize % modulus)
        }
    };
    let limits = SseLimits {
        max_line_bytes: cap(data[0], 64),
        max_frame_bytes: cap(data[1], 64),
        max_sse_buffer_bytes: cap(data[2], 128),
        max_total_bytes: cap(data[3], 256),
    };
    let mut scanner = SseScanner::new(limits);
    let payload = &data[4..];
    let _ = scanner.feed(payload, |_line| true, || true);
});
