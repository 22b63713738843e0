//! The request driver: assembles headers and a JSON body, hands them to a
//! [`Transport`], and turns the result into either a buffered response body
//! or a stream of SSE data lines.
//!
//! Grounded on the teacher's per-endpoint `send_*`/`create_*` functions
//! (`src/api/chat.rs`, `src/api/embeddings.rs`, `src/api/responses.rs`),
//! which all repeat this same header-assembly + status-check shape;
//! generalized here into one function each endpoint module calls.

use std::collections::HashMap;

use crate::error::{Error, Stage};
use crate::sse::{SseLimits, SseScanner};
use crate::transport::{TlsConfig, Transport};

pub fn default_headers(api_key: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Authorization".to_string(), format!("Bearer {api_key}"));
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}

/// `cap == 0` means "unbounded" everywhere in this crate (spec.md §3/§4.1);
/// a nonzero cap is exceeded only when `value` is strictly greater than it.
fn cap_exceeded(value: usize, cap: usize) -> bool {
    cap != 0 && value > cap
}

/// Send a non-streaming JSON POST, returning the raw response body on
/// success or a protocol-stage [`Error`] (carrying the raw body for
/// best-effort API error extraction) on a non-2xx status.
#[allow(clippy::too_many_arguments)]
pub fn send_json(
    transport: &mut dyn Transport,
    url: &str,
    headers: &HashMap<String, String>,
    body: &[u8],
    max_response_bytes: usize,
    tls: &TlsConfig,
    proxy: Option<&str>,
    no_proxy: Option<&str>,
) -> Result<String, Error> {
    tracing::debug!(url, body_len = body.len(), "sending request");
    let response = transport
        .http_post(url, headers, body, tls, proxy, no_proxy)
        .map_err(|e| {
            tracing::error!(stage = ?Stage::Transport, url, "transport failed");
            e
        })?;
    if cap_exceeded(response.body.len(), max_response_bytes) {
        tracing::error!(stage = ?Stage::Protocol, url, "response exceeds max_response_bytes");
        return Err(Error::protocol("response exceeds max_response_bytes"));
    }
    let text = response.body_string();
    if !response.is_success() {
        tracing::warn!(status = response.status, "non-success response");
        return Err(Error::protocol(format!("http status {}", response.status))
            .with_body(text)
            .with_http_status(response.status));
    }
    Ok(text)
}

#[allow(clippy::too_many_arguments)]
pub fn send_get(
    transport: &mut dyn Transport,
    url: &str,
    headers: &HashMap<String, String>,
    max_response_bytes: usize,
    tls: &TlsConfig,
    proxy: Option<&str>,
    no_proxy: Option<&str>,
) -> Result<String, Error> {
    tracing::debug!(url, "sending GET");
    let response = transport
        .http_get(url, headers, tls, proxy, no_proxy)
        .map_err(|e| {
            tracing::error!(stage = ?Stage::Transport, url, "transport failed");
            e
        })?;
    if cap_exceeded(response.body.len(), max_response_bytes) {
        tracing::error!(stage = ?Stage::Protocol, url, "response exceeds max_response_bytes");
        return Err(Error::protocol("response exceeds max_response_bytes"));
    }
    let text = response.body_string();
    if !response.is_success() {
        tracing::warn!(status = response.status, "non-success response");
        return Err(Error::protocol(format!("http status {}", response.status))
            .with_body(text)
            .with_http_status(response.status));
    }
    Ok(text)
}

/// Send a streaming JSON POST. Every `data:` line the SSE scanner yields
/// is handed to `on_data_line`, which returns `false` to request
/// cancellation — once it does, no further lines or frames are delivered
/// and the transport's chunk callback itself starts returning `false`, per
/// the contract documented on `transport::ChunkCallback`. Returns once the
/// stream ends, the `[DONE]` sentinel is observed, or cancellation fires.
#[allow(clippy::too_many_arguments)]
pub fn send_streaming_json(
    transport: &mut dyn Transport,
    url: &str,
    headers: &HashMap<String, String>,
    body: &[u8],
    limits: SseLimits,
    tls: &TlsConfig,
    proxy: Option<&str>,
    no_proxy: Option<&str>,
    mut on_data_line: impl FnMut(&str) -> bool,
) -> Result<bool, Error> {
    tracing::debug!(url, body_len = body.len(), "sending streaming request");
    let mut scanner = SseScanner::new(limits);
    let mut error: Option<Error> = None;
    let (status, _headers) = transport
        .http_post_stream(url, headers, body, tls, proxy, no_proxy, &mut |chunk| {
            tracing::trace!(chunk_len = chunk.len(), "sse chunk received");
            match scanner.feed(chunk, &mut on_data_line, || true) {
                Ok(()) => {
                    let keep_going = !scanner.is_done() && !scanner.is_stopped();
                    tracing::trace!(done = scanner.is_done(), stopped = scanner.is_stopped(), "sse accumulator transition");
                    keep_going
                }
                Err(e) => {
                    tracing::error!(stage = ?Stage::Sse, url, "sse scanner failed");
                    error = Some(e);
                    false
                }
            }
        })?;
    if let Some(e) = error {
        return Err(e);
    }
    if scanner.is_stopped() {
        return Ok(true);
    }
    if !(200..300).contains(&status) {
        tracing::warn!(status, "non-success streaming response");
        return Err(Error::protocol(format!("http status {status}")).with_http_status(status));
    }
    Ok(false)
}
