//! Legacy text completions (`POST /v1/completions`): request builder and
//! response parser. Grounded on
//! `examples/original_source/src/json_build.c::build_completions_request`
//! and `protocol_completions.c`; response spans follow the same
//! owned-buffer/borrowed-view pattern as [`crate::types::chat`].

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Stage};
use crate::types::{FinishReason, Usage};

#[derive(Debug, Clone, Serialize, Builder)]
#[builder(build_fn(error = "Error"))]
pub struct CompletionsRequest {
    #[builder(setter(into))]
    pub model: String,
    #[builder(setter(into))]
    pub prompt: String,
    #[builder(setter(strip_option), default)]
    pub max_tokens: Option<u32>,
    #[builder(setter(strip_option), default)]
    pub temperature: Option<f64>,
    #[builder(setter(skip), default)]
    pub stream: bool,
}

impl CompletionsRequest {
    pub fn builder() -> CompletionsRequestBuilder {
        CompletionsRequestBuilder::default()
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

pub struct CompletionsResponse {
    body: String,
}

impl CompletionsResponse {
    pub fn from_body(body: String) -> Self {
        Self { body }
    }

    pub fn raw_body(&self) -> &str {
        &self.body
    }

    pub fn parse(&self) -> Result<ParsedCompletionsResponse<'_>, Error> {
        serde_json::from_str(&self.body)
            .map_err(|e| Error::new(crate::error::Code::Failed, Stage::Json, e.to_string()).with_body(self.body.clone()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ParsedCompletionsResponse<'a> {
    #[serde(borrow)]
    pub id: &'a str,
    #[serde(borrow)]
    pub model: &'a str,
    #[serde(borrow)]
    pub choices: Vec<ParsedCompletionChoice<'a>>,
    #[serde(default)]
    pub usage: Usage,
}

impl<'a> ParsedCompletionsResponse<'a> {
    pub fn choice(&self, index: usize) -> Option<&ParsedCompletionChoice<'a>> {
        self.choices.get(index)
    }
}

#[derive(Debug, Deserialize)]
pub struct ParsedCompletionChoice<'a> {
    #[serde(default)]
    pub index: u32,
    #[serde(borrow)]
    pub text: &'a str,
    #[serde(default, borrow)]
    pub finish_reason: Option<&'a str>,
}

impl<'a> ParsedCompletionChoice<'a> {
    pub fn finish_reason(&self) -> FinishReason {
        self.finish_reason.map(FinishReason::from_str).unwrap_or(FinishReason::Unknown)
    }
}
