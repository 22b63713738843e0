mod error_model;
mod messages;
mod sse_limits;
