//! Error taxonomy: a stage-tagged, code-tagged error type plus the
//! best-effort API error detail extracted from a response body.
//!
//! Grounded on `error.rs`/`api/errors.rs` in the teacher SDK (which flattens
//! everything into one variant list); this crate keeps the two axes —
//! outcome code and failing stage — as independently queryable fields
//! because the tool loop and the last-error slot both need to branch on
//! stage without matching on a growing enum.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Coarse outcome of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Code {
    #[default]
    None,
    Cancelled,
    Failed,
}

impl Code {
    pub fn as_str(self) -> &'static str {
        match self {
            Code::None => "none",
            Code::Cancelled => "cancelled",
            Code::Failed => "failed",
        }
    }
}

/// The subsystem a failure originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    None,
    Transport,
    Tls,
    Sse,
    Json,
    Protocol,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::None => "none",
            Stage::Transport => "transport",
            Stage::Tls => "tls",
            Stage::Sse => "sse",
            Stage::Json => "json",
            Stage::Protocol => "protocol",
        }
    }
}

/// Best-effort decode of an API's `{"error": {"message", "type", "code"}}`
/// body. Extraction is best-effort: a body that doesn't parse at all yields
/// `None` from `from_body`, but individual missing fields inside a
/// recognized envelope are simply `None`.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ErrorDetail {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub code: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

impl ErrorDetail {
    pub fn from_body(raw_body: &str) -> Option<Self> {
        serde_json::from_str::<ErrorEnvelope>(raw_body)
            .ok()
            .map(|e| e.error)
    }
}

/// The crate's error type. Carries the code/stage pair the error handling
/// design requires plus a human-readable message, and — for protocol-level
/// failures — the raw response body and its parsed API error detail.
#[derive(Debug, Clone)]
pub struct Error {
    code: Code,
    stage: Stage,
    message: String,
    raw_body: Option<String>,
    detail: Option<ErrorDetail>,
    http_status: Option<u16>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {}",
            self.code.as_str(),
            self.stage.as_str(),
            self.message
        )
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: Code, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            code,
            stage,
            message: message.into(),
            raw_body: None,
            detail: None,
            http_status: None,
        }
    }

    pub fn cancelled(stage: Stage) -> Self {
        Self::new(Code::Cancelled, stage, "operation cancelled")
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(Code::Failed, Stage::Transport, message)
    }

    pub fn tls(message: impl Into<String>) -> Self {
        Self::new(Code::Failed, Stage::Tls, message)
    }

    pub fn sse(message: impl Into<String>) -> Self {
        Self::new(Code::Failed, Stage::Sse, message)
    }

    pub fn json(message: impl Into<String>) -> Self {
        Self::new(Code::Failed, Stage::Json, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(Code::Failed, Stage::Protocol, message)
    }

    /// Attach the raw HTTP body and try to extract `{"error": {...}}` from
    /// it. Called by the request driver whenever transport returns a
    /// non-2xx status.
    pub fn with_body(mut self, raw_body: impl Into<String>) -> Self {
        let raw_body = raw_body.into();
        self.detail = ErrorDetail::from_body(&raw_body);
        self.raw_body = Some(raw_body);
        self
    }

    /// Attach the HTTP status code observed for this failure, per spec.md
    /// §3's "optional http status" error detail.
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn raw_body(&self) -> Option<&str> {
        self.raw_body.as_deref()
    }

    pub fn detail(&self) -> Option<&ErrorDetail> {
        self.detail.as_ref()
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(e: derive_builder::UninitializedFieldError) -> Self {
        Error::new(Code::Failed, Stage::None, e.to_string())
    }
}

/// Errors from the ambient configuration layer (§4.7). Kept separate from
/// [`Error`] because config loading happens before a `Client` exists, so
/// there is no stage/code pair to attach it to yet.
#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config format in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
