//! Byte-budget-capped SSE (Server-Sent Events) scanner.
//!
//! Grounded on `examples/original_source/src/sse.c`: feed bytes in, get
//! `data:` lines and frame boundaries out, under four independent caps.
//! Once any cap is tripped the scanner is poisoned — every subsequent
//! `feed` call returns the same error without scanning further (the
//! "sticky first error" behavior `sse_set_error` implements in the C
//! source). The teacher's SSE handling (`src/api/messages.rs::stream_messages`,
//! `src/api/responses.rs::stream_response`) is purely line-oriented with no
//! budget at all; this scanner is what closes that gap.

use crate::error::Error;

/// The four independent byte budgets from the original `sse_create` caps.
#[derive(Debug, Clone, Copy)]
pub struct SseLimits {
    /// Max bytes in a single physical line (before the terminating `\n`).
    pub max_line_bytes: usize,
    /// Max bytes accumulated across the `data:` lines of one frame.
    pub max_frame_bytes: usize,
    /// Max bytes the scanner's internal unscanned-bytes buffer may hold.
    pub max_sse_buffer_bytes: usize,
    /// Max bytes fed to the scanner over its whole lifetime.
    pub max_total_bytes: usize,
}

impl Default for SseLimits {
    fn default() -> Self {
        Self {
            max_line_bytes: 1_000_000,
            max_frame_bytes: 1_000_000,
            max_sse_buffer_bytes: 2_000_000,
            max_total_bytes: 10_000_000,
        }
    }
}

/// `cap == 0` means "unbounded" (spec.md §3/§4.1): a nonzero cap is
/// exceeded only when `value` is strictly greater than it.
fn cap_exceeded(value: usize, cap: usize) -> bool {
    cap != 0 && value > cap
}

pub struct SseScanner {
    limits: SseLimits,
    buf: Vec<u8>,
    frame_bytes: usize,
    total_bytes: usize,
    error: Option<Error>,
    done: bool,
    stopped: bool,
}

impl SseScanner {
    pub fn new(limits: SseLimits) -> Self {
        Self {
            limits,
            buf: Vec::new(),
            frame_bytes: 0,
            total_bytes: 0,
            error: None,
            done: false,
            stopped: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// `true` once a caller's `on_data_line`/`on_frame` callback has
    /// returned `false`, requesting the scanner stop delivering further
    /// lines/frames — distinct from `is_done`, which only reflects the
    /// `[DONE]` sentinel.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn poison(&mut self, err: Error) -> Error {
        self.error = Some(err.clone());
        err
    }

    /// Feed one chunk of transport bytes. `on_data_line` is invoked once
    /// per `data:` line (with the `data:` prefix and at most one leading
    /// space stripped); `on_frame` is invoked once per blank-line frame
    /// boundary. Either callback returning `false` stops the scanner
    /// immediately (no further callbacks fire) without raising an error;
    /// check `is_stopped` afterward. Stops early, also without error, once
    /// the `[DONE]` sentinel is observed on a data line.
    pub fn feed(
        &mut self,
        chunk: &[u8],
        mut on_data_line: impl FnMut(&str) -> bool,
        mut on_frame: impl FnMut() -> bool,
    ) -> Result<(), Error> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.done || self.stopped {
            return Ok(());
        }

        self.total_bytes += chunk.len();
        if cap_exceeded(self.total_bytes, self.limits.max_total_bytes) {
            return Err(self.poison(Error::sse("total byte budget exceeded")));
        }

        if cap_exceeded(self.buf.len() + chunk.len(), self.limits.max_sse_buffer_bytes) {
            return Err(self.poison(Error::sse("sse internal buffer budget exceeded")));
        }
        self.buf.extend_from_slice(chunk);

        loop {
            let newline_pos = self.buf.iter().position(|&b| b == b'\n');
            let Some(pos) = newline_pos else {
                if cap_exceeded(self.buf.len(), self.limits.max_line_bytes) {
                    return Err(self.poison(Error::sse("unterminated line exceeds max_line_bytes")));
                }
                break;
            };

            let mut line = &self.buf[..pos];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }
            if cap_exceeded(line.len(), self.limits.max_line_bytes) {
                return Err(self.poison(Error::sse("line exceeds max_line_bytes")));
            }

            let line_str = match std::str::from_utf8(line) {
                Ok(s) => s,
                Err(_) => return Err(self.poison(Error::sse("line is not valid utf-8"))),
            };

            if line_str.is_empty() {
                if !on_frame() {
                    self.stopped = true;
                    self.buf.drain(0..=pos);
                    return Ok(());
                }
                self.frame_bytes = 0;
            } else if let Some(rest) = line_str.strip_prefix("data:") {
                let rest = rest.strip_prefix(' ').unwrap_or(rest);
                self.frame_bytes += rest.len();
                if cap_exceeded(self.frame_bytes, self.limits.max_frame_bytes) {
                    return Err(self.poison(Error::sse("frame exceeds max_frame_bytes")));
                }
                if rest == "[DONE]" {
                    self.done = true;
                    self.buf.drain(0..=pos);
                    return Ok(());
                }
                if !on_data_line(rest) {
                    self.stopped = true;
                    self.buf.drain(0..=pos);
                    return Ok(());
                }
            }
            // any other field (event:, id:, retry:, comments) is ignored —
            // this scanner only surfaces data lines and frame boundaries.

            self.buf.drain(0..=pos);
        }

        Ok(())
    }
}
