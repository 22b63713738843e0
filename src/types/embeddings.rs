//! Embeddings (`POST /v1/embeddings`): request builder and response
//! parser. Grounded on the teacher's `src/api/embeddings.rs` (untagged
//! `EmbeddingInput`/`EmbeddingVector` enums, `derive_builder` request
//! shape) and the input-count/byte-size validation in
//! `examples/original_source/src/json_build.c::build_embeddings_request`.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Stage};

/// One or many input strings, matching the API's accepted shapes.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Single(String),
    Many(Vec<String>),
}

impl From<String> for EmbeddingInput {
    fn from(s: String) -> Self {
        EmbeddingInput::Single(s)
    }
}

impl From<Vec<String>> for EmbeddingInput {
    fn from(v: Vec<String>) -> Self {
        EmbeddingInput::Many(v)
    }
}

impl EmbeddingInput {
    pub fn count(&self) -> usize {
        match self {
            EmbeddingInput::Single(_) => 1,
            EmbeddingInput::Many(v) => v.len(),
        }
    }

    pub fn max_len(&self) -> usize {
        match self {
            EmbeddingInput::Single(s) => s.len(),
            EmbeddingInput::Many(v) => v.iter().map(|s| s.len()).max().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Builder)]
#[builder(build_fn(error = "Error"))]
pub struct EmbeddingsRequest {
    #[builder(setter(into))]
    pub model: String,
    #[builder(setter(into))]
    pub input: EmbeddingInput,
    #[builder(setter(strip_option), default)]
    pub encoding_format: Option<EmbeddingEncodingFormat>,
}

impl EmbeddingsRequest {
    pub fn builder() -> EmbeddingsRequestBuilder {
        EmbeddingsRequestBuilder::default()
    }
}

/// Validates `input` against the client's configured caps. Lives outside
/// the builder (unlike the original `build_embeddings_request`, which took
/// `max_inputs`/`max_input_bytes` as bare parameters) because the caps come
/// from a `Client`'s `Limits`, which the builder has no access to — same
/// pattern as `crate::types::chat::check_stop_caps`. `0` means unbounded.
pub fn check_embedding_caps(input: &EmbeddingInput, limits: &crate::types::Limits) -> Result<(), Error> {
    if limits.max_embedding_inputs != 0 && input.count() > limits.max_embedding_inputs {
        return Err(Error::protocol("embeddings request exceeds max_embedding_inputs"));
    }
    if limits.max_embedding_input_bytes != 0 && input.max_len() > limits.max_embedding_input_bytes {
        return Err(Error::protocol("embeddings request input exceeds max_embedding_input_bytes"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingEncodingFormat {
    Float,
    Base64,
}

pub struct EmbeddingsResponse {
    body: String,
}

impl EmbeddingsResponse {
    pub fn from_body(body: String) -> Self {
        Self { body }
    }

    pub fn raw_body(&self) -> &str {
        &self.body
    }

    pub fn parse(&self) -> Result<ParsedEmbeddingsResponse<'_>, Error> {
        serde_json::from_str(&self.body)
            .map_err(|e| Error::new(crate::error::Code::Failed, Stage::Json, e.to_string()).with_body(self.body.clone()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ParsedEmbeddingsResponse<'a> {
    #[serde(borrow)]
    pub model: &'a str,
    pub data: Vec<ParsedEmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub struct ParsedEmbeddingData {
    pub index: u32,
    pub embedding: EmbeddingVector,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingVector {
    Float(Vec<f32>),
    Base64(String),
}
