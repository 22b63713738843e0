//! Scripted [`Transport`] for integration tests.
//!
//! Grounded on `examples/original_source/tests/fake_transport.c`: queue up
//! responses (or, for streaming, queues of raw chunks) ahead of time and
//! let the driver consume them in call order.

use std::collections::{HashMap, VecDeque};

use llmclient::error::Error;
use llmclient::transport::{ChunkCallback, HttpResponse, TlsConfig, Transport};

pub struct ScriptedResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

pub struct ScriptedStream {
    pub status: u16,
    pub chunks: Vec<Vec<u8>>,
}

#[derive(Default)]
pub struct FakeTransport {
    pub json_responses: VecDeque<ScriptedResponse>,
    pub stream_responses: VecDeque<ScriptedStream>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&mut self, status: u16, body: impl Into<Vec<u8>>) -> &mut Self {
        self.json_responses.push_back(ScriptedResponse { status, body: body.into() });
        self
    }

    pub fn push_stream(&mut self, status: u16, chunks: Vec<&str>) -> &mut Self {
        self.stream_responses.push_back(ScriptedStream {
            status,
            chunks: chunks.into_iter().map(|c| c.as_bytes().to_vec()).collect(),
        });
        self
    }
}

impl Transport for FakeTransport {
    fn http_get(
        &mut self,
        _url: &str,
        _headers: &HashMap<String, String>,
        _tls: &TlsConfig,
        _proxy: Option<&str>,
        _no_proxy: Option<&str>,
    ) -> Result<HttpResponse, Error> {
        let r = self.json_responses.pop_front().expect("no scripted GET response queued");
        Ok(HttpResponse { status: r.status, headers: HashMap::new(), body: r.body })
    }

    fn http_post(
        &mut self,
        _url: &str,
        _headers: &HashMap<String, String>,
        _body: &[u8],
        _tls: &TlsConfig,
        _proxy: Option<&str>,
        _no_proxy: Option<&str>,
    ) -> Result<HttpResponse, Error> {
        let r = self.json_responses.pop_front().expect("no scripted POST response queued");
        Ok(HttpResponse { status: r.status, headers: HashMap::new(), body: r.body })
    }

    fn http_post_stream(
        &mut self,
        _url: &str,
        _headers: &HashMap<String, String>,
        _body: &[u8],
        _tls: &TlsConfig,
        _proxy: Option<&str>,
        _no_proxy: Option<&str>,
        on_chunk: &mut ChunkCallback<'_>,
    ) -> Result<(u16, HashMap<String, String>), Error> {
        let scripted = self.stream_responses.pop_front().expect("no scripted stream queued");
        for chunk in &scripted.chunks {
            if !on_chunk(chunk) {
                break;
            }
        }
        Ok((scripted.status, HashMap::new()))
    }
}
