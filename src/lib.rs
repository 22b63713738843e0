//! A synchronous client library for OpenAI-style chat-completion HTTP
//! services: SSE streaming, tool-call reassembly, request/response
//! protocol handling, and a bounded multi-turn tool-dispatch loop.
//!
//! ## What this crate does not do
//!
//! It does not perform HTTP I/O itself — callers supply a [`Transport`]
//! implementation. It does not run a model, persist credentials, batch
//! requests, or spawn background threads: every call blocks the caller's
//! thread and every callback is invoked synchronously on it.
//!
//! ## Quick start
//!
//! ```no_run
//! use llmclient::{Client, types::Message, types::chat::ChatRequest};
//! # use llmclient::transport::{Transport, HttpResponse, ChunkCallback, TlsConfig};
//! # use llmclient::error::Error;
//! # use std::collections::HashMap;
//! # struct MyTransport;
//! # impl Transport for MyTransport {
//! #     fn http_get(&mut self, _: &str, _: &HashMap<String, String>, _: &TlsConfig, _: Option<&str>, _: Option<&str>) -> Result<HttpResponse, Error> { unimplemented!() }
//! #     fn http_post(&mut self, _: &str, _: &HashMap<String, String>, _: &[u8], _: &TlsConfig, _: Option<&str>, _: Option<&str>) -> Result<HttpResponse, Error> { unimplemented!() }
//! #     fn http_post_stream(&mut self, _: &str, _: &HashMap<String, String>, _: &[u8], _: &TlsConfig, _: Option<&str>, _: Option<&str>, _: &mut ChunkCallback<'_>) -> Result<(u16, HashMap<String, String>), Error> { unimplemented!() }
//! # }
//! let mut client = Client::new(MyTransport, "https://api.example.com", "sk-...");
//! let request = ChatRequest::builder()
//!     .model("gpt-4o-mini")
//!     .messages(llmclient::types::chat::to_wire_messages(&[Message::user("hello")]))
//!     .build()
//!     .unwrap();
//! let response = client.chat_completions(&request)?;
//! let parsed = response.parse()?;
//! println!("{:?}", parsed.choice(0).and_then(|c| c.message.content));
//! # Ok::<(), llmclient::error::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod json_builder;
pub mod sse;
pub mod tool_accumulator;
pub mod tool_loop;
pub mod transport;
pub mod types;
pub mod utils;

pub use client::Client;
pub use error::{Error, Result};
pub use transport::Transport;
