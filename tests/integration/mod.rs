mod fake_transport;

mod chat;
mod embeddings;
mod streaming;
mod tool_loop;
