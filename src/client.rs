//! The `Client`: owns transport, config, and the opt-in last-error slot,
//! and exposes one method per external interface in spec.md §6
//! (`/health`, `/v1/models`, `/props`, `/v1/chat/completions`,
//! `/v1/completions`, `/v1/embeddings`).
//!
//! Grounded on the teacher's `src/client.rs` (one struct owning the
//! transport + api key, one method per endpoint delegating to an `api::*`
//! module) — generalized to a generic `Transport` and to the
//! synchronous/blocking call shape spec.md §5 requires instead of async.

use std::collections::HashMap;

use crate::driver;
use crate::error::{Code, Error, Stage};
use crate::sse::SseLimits;
use crate::tool_accumulator::{ToolCall, ToolCallAccumulator, ToolCallDelta};
use crate::transport::{TlsConfig, Transport};
use crate::types::chat::{check_stop_caps, find_choice, ChatRequest, ChatRequestBuilder, ChatResponse};
use crate::types::completion::{CompletionsRequest, CompletionsResponse};
use crate::types::embeddings::{check_embedding_caps, EmbeddingsRequest, EmbeddingsResponse};
use crate::types::{Limits, Usage};

/// Callbacks invoked synchronously while a chat stream is being driven.
/// Mirrors `llm_stream_callbacks_t`/`llm_abort_cb`: every field is
/// optional, every callback is called on the caller's thread, never
/// re-entrantly. The fan-out order matches spec.md §4.4/§5:
/// `on_tool_args_fragment` for an index always precedes that index's
/// `on_tool_args_complete`, and `on_usage`/`on_finish_reason` fire at most
/// once per payload actually present in the stream.
#[derive(Default)]
pub struct StreamCallbacks<'a> {
    pub on_content_delta: Option<&'a mut dyn FnMut(&str)>,
    pub on_reasoning_delta: Option<&'a mut dyn FnMut(&str)>,
    pub on_tool_call_delta: Option<&'a mut dyn FnMut(u32, &ToolCallDelta<'_>)>,
    /// Just the raw argument-string fragment for one tool-call index, as it
    /// streams in — narrower than `on_tool_call_delta`, which also carries
    /// id/kind/name changes.
    pub on_tool_args_fragment: Option<&'a mut dyn FnMut(u32, &str)>,
    /// Fires once per tool-call index, when that call's arguments are
    /// fully reassembled — either because its frame carried a non-null
    /// `finish_reason`, or at stream end if it hadn't fired already.
    pub on_tool_args_complete: Option<&'a mut dyn FnMut(u32, &ToolCall)>,
    pub on_usage: Option<&'a mut dyn FnMut(Usage)>,
    pub on_finish_reason: Option<&'a mut dyn FnMut(&str)>,
    /// Polled before each chunk is processed; returning `true` cancels the
    /// stream with `Code::Cancelled` and signals the transport to stop.
    pub abort: Option<&'a mut dyn FnMut() -> bool>,
}

/// Rejects header/API-key/proxy values that would permit header injection
/// (spec.md §6/§4.4: "reject bytes that would permit header injection").
fn reject_header_injection(value: &str) -> Result<(), Error> {
    if value.contains('\r') || value.contains('\n') {
        return Err(Error::new(Code::Failed, Stage::Protocol, "value contains forbidden CR/LF"));
    }
    Ok(())
}

/// Case-insensitively merges `overrides` into `base`, rejecting CR/LF in
/// either key or value and refusing to let a caller override `Content-Type`
/// — every request this crate sends is a JSON body, so that header is
/// always managed internally (spec.md §4.4 "Header resolution").
fn merge_headers(base: &HashMap<String, String>, overrides: Option<&HashMap<String, String>>) -> Result<HashMap<String, String>, Error> {
    let mut merged = base.clone();
    let Some(overrides) = overrides else {
        return Ok(merged);
    };
    for (name, value) in overrides {
        reject_header_injection(name)?;
        reject_header_injection(value)?;
        if name.eq_ignore_ascii_case("content-type") {
            return Err(Error::protocol("Content-Type header cannot be overridden per-request"));
        }
        if let Some(existing) = merged.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned() {
            merged.remove(&existing);
        }
        merged.insert(name.clone(), value.clone());
    }
    Ok(merged)
}

/// The end-of-stream summary a streaming chat call resolves to.
#[derive(Debug, Clone)]
pub struct ChatStreamSummary {
    pub id: Option<String>,
    pub model: Option<String>,
    pub finish_reason: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<Usage>,
}

pub struct Client<T: Transport> {
    transport: T,
    base_url: String,
    /// `None` omits the `Authorization` header entirely — distinct from an
    /// empty string, which would send `Authorization: Bearer `.
    api_key: Option<String>,
    /// Default model used by [`Self::chat_request_builder`] when the
    /// caller doesn't set one explicitly — the runtime-settable analogue of
    /// `ClientConfig::default_model`.
    model: Option<String>,
    tls: TlsConfig,
    proxy: Option<String>,
    no_proxy: Option<String>,
    default_headers: HashMap<String, String>,
    limits: Limits,
    capture_last_error: bool,
    last_error: Option<Error>,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            api_key: Some(api_key.into()),
            model: None,
            tls: TlsConfig::default(),
            proxy: None,
            no_proxy: None,
            default_headers: HashMap::new(),
            limits: Limits::default(),
            capture_last_error: false,
            last_error: None,
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Opt into the per-client last-error slot. Independent of any
    /// caller-supplied error detail — a separate allocation, per spec.md §7.
    pub fn enable_last_error(mut self, enable: bool) -> Self {
        self.capture_last_error = enable;
        self
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Sets the default model used by [`Self::chat_request_builder`].
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = Some(model.into());
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Replaces the API key used for the `Authorization` header on every
    /// subsequent request. Rejects a key containing CR/LF.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<(), Error> {
        let api_key = api_key.into();
        reject_header_injection(&api_key)?;
        self.api_key = Some(api_key);
        Ok(())
    }

    /// Clears the API key — subsequent requests carry no `Authorization`
    /// header at all.
    pub fn clear_api_key(&mut self) {
        self.api_key = None;
    }

    pub fn set_tls_config(&mut self, tls: TlsConfig) {
        self.tls = tls;
    }

    pub fn tls_config(&self) -> &TlsConfig {
        &self.tls
    }

    pub fn set_proxy(&mut self, proxy: impl Into<String>) -> Result<(), Error> {
        let proxy = proxy.into();
        reject_header_injection(&proxy)?;
        self.proxy = Some(proxy);
        Ok(())
    }

    pub fn clear_proxy(&mut self) {
        self.proxy = None;
    }

    pub fn set_no_proxy(&mut self, no_proxy: impl Into<String>) -> Result<(), Error> {
        let no_proxy = no_proxy.into();
        reject_header_injection(&no_proxy)?;
        self.no_proxy = Some(no_proxy);
        Ok(())
    }

    pub fn clear_no_proxy(&mut self) {
        self.no_proxy = None;
    }

    /// Sets a header sent with every subsequent request, unless overridden
    /// per-call via the `*_with_headers` methods. Rejects CR/LF and
    /// `Content-Type` (always managed internally).
    pub fn set_default_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<(), Error> {
        let (name, value) = (name.into(), value.into());
        reject_header_injection(&name)?;
        reject_header_injection(&value)?;
        if name.eq_ignore_ascii_case("content-type") {
            return Err(Error::protocol("Content-Type header is managed automatically"));
        }
        self.default_headers.insert(name, value);
        Ok(())
    }

    pub fn remove_default_header(&mut self, name: &str) {
        self.default_headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    }

    /// A [`ChatRequestBuilder`] pre-populated with [`Self::model`] when one
    /// has been set, so callers don't have to repeat it on every request.
    pub fn chat_request_builder(&self) -> ChatRequestBuilder {
        let mut builder = ChatRequest::builder();
        if let Some(model) = &self.model {
            builder = builder.model(model.clone());
        }
        builder
    }

    fn begin_request(&mut self) {
        self.last_error = None;
    }

    fn finish<R>(&mut self, result: Result<R, Error>) -> Result<R, Error> {
        if self.capture_last_error {
            if let Err(e) = &result {
                self.last_error = Some(e.clone());
            }
        }
        result
    }

    fn record_error(&mut self, err: Error) -> Error {
        if self.capture_last_error {
            self.last_error = Some(err.clone());
        }
        err
    }

    fn headers(&self) -> HashMap<String, String> {
        let mut headers = self.default_headers.clone();
        headers
            .entry("Content-Type".to_string())
            .or_insert_with(|| "application/json".to_string());
        if let Some(api_key) = &self.api_key {
            headers.insert("Authorization".to_string(), format!("Bearer {api_key}"));
        }
        headers
    }

    /// [`Self::headers`], with per-request `overrides` merged in
    /// case-insensitively. See [`merge_headers`].
    fn headers_with_overrides(&self, overrides: Option<&HashMap<String, String>>) -> Result<HashMap<String, String>, Error> {
        merge_headers(&self.headers(), overrides)
    }

    pub fn health(&mut self) -> Result<bool, Error> {
        self.begin_request();
        let url = format!("{}/health", self.base_url);
        let headers = self.headers();
        let result = driver::send_get(
            &mut self.transport,
            &url,
            &headers,
            self.limits.max_response_bytes,
            &self.tls,
            self.proxy.as_deref(),
            self.no_proxy.as_deref(),
        )
        .map(|_| true);
        self.finish(result)
    }

    /// The `/props` endpoint, canonicalized per spec.md §9 — the original
    /// source sometimes targets `/health` here instead; this crate always
    /// hits `/props`.
    pub fn props(&mut self) -> Result<serde_json::Value, Error> {
        self.begin_request();
        let url = format!("{}/props", self.base_url);
        let headers = self.headers();
        let result = driver::send_get(
            &mut self.transport,
            &url,
            &headers,
            self.limits.max_response_bytes,
            &self.tls,
            self.proxy.as_deref(),
            self.no_proxy.as_deref(),
        )
        .and_then(|body| serde_json::from_str(&body).map_err(|e| Error::json(e.to_string())));
        self.finish(result)
    }

    pub fn models(&mut self) -> Result<Vec<String>, Error> {
        self.begin_request();
        let url = format!("{}/v1/models", self.base_url);
        let headers = self.headers();
        let result = driver::send_get(
            &mut self.transport,
            &url,
            &headers,
            self.limits.max_response_bytes,
            &self.tls,
            self.proxy.as_deref(),
            self.no_proxy.as_deref(),
        )
        .and_then(|body| {
            #[derive(serde::Deserialize)]
            struct ModelsList {
                data: Vec<ModelEntry>,
            }
            #[derive(serde::Deserialize)]
            struct ModelEntry {
                id: String,
            }
            serde_json::from_str::<ModelsList>(&body)
                .map(|l| l.data.into_iter().map(|m| m.id).collect())
                .map_err(|e| Error::json(e.to_string()))
        });
        self.finish(result)
    }

    pub fn chat_completions(&mut self, request: &ChatRequest) -> Result<ChatResponse, Error> {
        self.chat_completions_with_headers(request, None)
    }

    /// Like [`Self::chat_completions`], but merges `extra_headers` into the
    /// per-request header set (spec.md §6's per-request header override).
    pub fn chat_completions_with_headers(
        &mut self,
        request: &ChatRequest,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<ChatResponse, Error> {
        self.begin_request();
        check_stop_caps(request.stop.as_ref(), &self.limits)?;
        let url = format!("{}/v1/chat/completions", self.base_url);
        let headers = match self.headers_with_overrides(extra_headers) {
            Ok(h) => h,
            Err(e) => return self.finish(Err(e)),
        };
        let body = crate::json_builder::serialize_with_extra(request, request.extra_params.as_ref());
        let result = body.and_then(|body| {
            driver::send_json(
                &mut self.transport,
                &url,
                &headers,
                &body,
                self.limits.max_response_bytes,
                &self.tls,
                self.proxy.as_deref(),
                self.no_proxy.as_deref(),
            )
            .map(ChatResponse::from_body)
        });
        self.finish(result)
    }

    /// Drives a streaming chat completion to completion, invoking
    /// `callbacks` as deltas arrive and returning the assembled summary —
    /// including any tool calls reassembled by an internal
    /// [`ToolCallAccumulator`]. Returning `true` from `callbacks.abort`
    /// signals the transport to stop reading the response, not just the
    /// local frame loop.
    pub fn chat_completions_stream(
        &mut self,
        request: &ChatRequest,
        mut callbacks: StreamCallbacks<'_>,
    ) -> Result<ChatStreamSummary, Error> {
        self.begin_request();
        if let Err(e) = check_stop_caps(request.stop.as_ref(), &self.limits) {
            return self.finish(Err(e));
        }
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = request.clone().streaming();
        let body = match crate::json_builder::serialize_with_extra(&request, request.extra_params.as_ref()) {
            Ok(b) => b,
            Err(e) => return self.finish(Err(e)),
        };
        let headers = self.headers();

        let mut accumulator = ToolCallAccumulator::new(self.limits.max_tool_args_bytes_per_call);
        let mut id = None;
        let mut model = None;
        let mut finish_reason: Option<String> = None;
        let mut usage = None;
        let mut parse_err: Option<Error> = None;
        let mut completed_fired: std::collections::HashSet<u32> = std::collections::HashSet::new();

        let sse_limits = SseLimits {
            max_line_bytes: self.limits.max_line_bytes,
            max_frame_bytes: self.limits.max_frame_bytes,
            max_sse_buffer_bytes: self.limits.max_sse_buffer_bytes,
            max_total_bytes: self.limits.max_response_bytes,
        };

        let result = driver::send_streaming_json(&mut self.transport, &url, &headers, &body, sse_limits, &self.tls, self.proxy.as_deref(), self.no_proxy.as_deref(), |line| {
            if parse_err.is_some() {
                return false;
            }
            if let Some(abort) = callbacks.abort.as_mut() {
                if abort() {
                    return false;
                }
            }
            let chunk: crate::types::chat::ParsedChatChunk<'_> = match serde_json::from_str(line) {
                Ok(c) => c,
                Err(e) => {
                    parse_err = Some(Error::json(format!("malformed stream chunk: {e}")));
                    return false;
                }
            };
            if let Some(cid) = chunk.id {
                id.get_or_insert_with(|| cid.to_string());
            }
            if let Some(m) = chunk.model {
                model.get_or_insert_with(|| m.to_string());
            }
            if let Some(u) = chunk.usage {
                usage = Some(u);
                if let Some(cb) = callbacks.on_usage.as_mut() {
                    cb(u);
                }
            }
            if let Some(choice) = find_choice(&chunk.choices, 0) {
                if let Some(content) = choice.delta.content {
                    if let Some(cb) = callbacks.on_content_delta.as_mut() {
                        cb(content);
                    }
                }
                if let Some(reasoning) = choice.delta.reasoning_content {
                    if let Some(cb) = callbacks.on_reasoning_delta.as_mut() {
                        cb(reasoning);
                    }
                }
                match choice.delta.tool_call_deltas() {
                    Ok(deltas) => {
                        for (index, delta) in deltas {
                            if let Some(cb) = callbacks.on_tool_call_delta.as_mut() {
                                cb(index, &delta);
                            }
                            if let Some(fragment) = delta.arguments_fragment {
                                if let Some(cb) = callbacks.on_tool_args_fragment.as_mut() {
                                    cb(index, fragment);
                                }
                            }
                            if let Err(e) = accumulator.feed(index, &delta) {
                                parse_err = Some(e);
                                return false;
                            }
                        }
                    }
                    Err(e) => {
                        parse_err = Some(e);
                        return false;
                    }
                }
                if let Some(fr) = choice.finish_reason {
                    finish_reason = Some(fr.to_string());
                    if let Some(cb) = callbacks.on_finish_reason.as_mut() {
                        cb(fr);
                    }
                    // A non-null finish_reason means every tool call accumulated
                    // so far for this choice is done; fire on_tool_args_complete
                    // now rather than waiting for stream end.
                    for (index, call) in accumulator.completed_snapshot() {
                        if completed_fired.insert(index) {
                            if let Some(cb) = callbacks.on_tool_args_complete.as_mut() {
                                cb(index, &call);
                            }
                        }
                    }
                }
            }
            true
        });

        // A `stopped` result means the line/frame callback returned `false`,
        // which happens both on a real `abort()` cancellation and on an
        // internal parse failure (see the closure above) — `parse_err`
        // distinguishes the two, so it's checked first to avoid reporting a
        // parse failure as a cancellation.
        match result {
            Ok(stopped) => {
                if let Some(e) = parse_err {
                    return self.finish(Err(e));
                }
                if stopped {
                    return Err(self.record_error(Error::cancelled(Stage::Sse)));
                }
            }
            Err(e) => return Err(self.record_error(e)),
        }

        let completed = accumulator.finish_indexed();
        for (index, call) in &completed {
            if completed_fired.insert(*index) {
                if let Some(cb) = callbacks.on_tool_args_complete.as_mut() {
                    cb(*index, call);
                }
            }
        }

        self.finish(Ok(ChatStreamSummary {
            id,
            model,
            finish_reason,
            tool_calls: completed.into_iter().map(|(_, call)| call).collect(),
            usage,
        }))
    }

    pub fn completions(&mut self, request: &CompletionsRequest) -> Result<CompletionsResponse, Error> {
        self.begin_request();
        let url = format!("{}/v1/completions", self.base_url);
        let headers = self.headers();
        let body = serde_json::to_vec(request).map_err(|e| Error::json(e.to_string()));
        let result = body.and_then(|body| {
            driver::send_json(
                &mut self.transport,
                &url,
                &headers,
                &body,
                self.limits.max_response_bytes,
                &self.tls,
                self.proxy.as_deref(),
                self.no_proxy.as_deref(),
            )
            .map(CompletionsResponse::from_body)
        });
        self.finish(result)
    }

    pub fn embeddings(&mut self, request: &EmbeddingsRequest) -> Result<EmbeddingsResponse, Error> {
        self.begin_request();
        if let Err(e) = check_embedding_caps(&request.input, &self.limits) {
            return self.finish(Err(e));
        }
        let url = format!("{}/v1/embeddings", self.base_url);
        let headers = self.headers();
        let body = serde_json::to_vec(request).map_err(|e| Error::json(e.to_string()));
        let result = body.and_then(|body| {
            driver::send_json(
                &mut self.transport,
                &url,
                &headers,
                &body,
                self.limits.max_response_bytes,
                &self.tls,
                self.proxy.as_deref(),
                self.no_proxy.as_deref(),
            )
            .map(EmbeddingsResponse::from_body)
        });
        self.finish(result)
    }
}
