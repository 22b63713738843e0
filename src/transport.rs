//! The injected, synchronous HTTP transport contract.
//!
//! This crate does not perform byte-level HTTP I/O itself — spec.md §1
//! scopes that out as an external collaborator, specified only through
//! this narrow contract. Grounded directly on
//! `examples/original_source/src/llm_transport_contract.h`: blocking
//! calls, ownership of returned bodies transferred to the caller, and a
//! streaming callback that is invoked synchronously and serially on the
//! calling thread — never re-entrantly, never after the call returns.
//!
//! The teacher implements HTTP itself with `surf`/`tokio`; this crate
//! deliberately does not, because spec.md §5 describes a single-threaded,
//! synchronous, cooperative concurrency model with no background I/O
//! threads — the opposite of the teacher's async architecture. See
//! DESIGN.md for the rationale.

use std::collections::HashMap;

use crate::error::Error;

/// Tri-state TLS peer/host verification, mirroring
/// `llm_tls_verify_mode_t`: `Default` defers to the transport
/// implementor's platform defaults rather than forcing a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVerifyMode {
    #[default]
    Default,
    On,
    Off,
}

/// TLS settings copied into the client. Grounded on
/// `examples/original_source/include/llm/llm.h::llm_tls_config_t`; the
/// original's key-password callback (a C function pointer + user-data
/// pair) is represented here as a plain password string since this crate
/// has no FFI boundary to cross.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    pub ca_bundle_path: Option<String>,
    pub ca_dir_path: Option<String>,
    pub client_cert_path: Option<String>,
    pub client_key_path: Option<String>,
    pub key_password: Option<String>,
    pub verify_peer: TlsVerifyMode,
    pub verify_host: TlsVerifyMode,
    pub insecure: bool,
}

/// A fully-buffered HTTP response, as returned by `http_get`/`http_post`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Returning `false` from the chunk callback aborts the in-flight stream;
/// the transport must stop calling back and return `Err` rather than
/// continue delivering chunks.
pub type ChunkCallback<'a> = dyn FnMut(&[u8]) -> bool + 'a;

/// The narrow synchronous contract the core crate consumes. Implementors
/// own connection-pooling and retry policy and are handed the resolved
/// TLS/proxy settings on every call, per
/// `examples/original_source/src/llm_transport_contract.h`'s
/// `http_get`/`http_post`/`http_post_stream` signatures (timeout and
/// `max_response_bytes` are enforced by `driver.rs` instead and not
/// threaded through here).
pub trait Transport {
    fn http_get(
        &mut self,
        url: &str,
        headers: &HashMap<String, String>,
        tls: &TlsConfig,
        proxy: Option<&str>,
        no_proxy: Option<&str>,
    ) -> Result<HttpResponse, Error>;

    fn http_post(
        &mut self,
        url: &str,
        headers: &HashMap<String, String>,
        body: &[u8],
        tls: &TlsConfig,
        proxy: Option<&str>,
        no_proxy: Option<&str>,
    ) -> Result<HttpResponse, Error>;

    /// Streaming POST. `on_chunk` is invoked once per transport-layer
    /// chunk of the response body, synchronously, in order, on the calling
    /// thread — never concurrently and never after this call returns.
    /// Returns the final status/headers once the body is exhausted or the
    /// callback requests abort.
    fn http_post_stream(
        &mut self,
        url: &str,
        headers: &HashMap<String, String>,
        body: &[u8],
        tls: &TlsConfig,
        proxy: Option<&str>,
        no_proxy: Option<&str>,
        on_chunk: &mut ChunkCallback<'_>,
    ) -> Result<(u16, HashMap<String, String>), Error>;
}
