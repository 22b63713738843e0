use llmclient::sse::{SseLimits, SseScanner};

#[test]
fn total_byte_budget_is_enforced_across_feeds() {
    let mut scanner = SseScanner::new(SseLimits {
        max_total_bytes: 10,
        ..SseLimits::default()
    });
    assert!(scanner.feed(b"data: 12345\n\n", |_| true, || true).is_err());
}

#[test]
fn frame_budget_accumulates_across_multiple_data_lines() {
    let mut scanner = SseScanner::new(SseLimits {
        max_frame_bytes: 6,
        ..SseLimits::default()
    });
    let result = scanner.feed(b"data: abc\ndata: def\ndata: ghi\n\n", |_| true, || true);
    assert!(result.is_err());
}
