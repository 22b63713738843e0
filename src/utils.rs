//! Ambient logging setup. Grounded on the `tracing`/`tracing-subscriber`
//! init pattern used throughout the pack's `contextmirror-voice-mirror`
//! sibling (`src-tauri/src/bin/mcp.rs`): `EnvFilter` from the environment,
//! falling back to a sensible default level. The teacher itself never
//! initializes logging (`openrouter-rs` has no `tracing` dependency at
//! all); this crate adds it as the ambient stack spec.md's Non-goals don't
//! exclude.

/// Initialize a global `tracing` subscriber reading `RUST_LOG`, defaulting
/// to `info` when unset. Intended for binaries/tests embedding this crate;
/// library code only ever emits `tracing` events and never installs a
/// subscriber itself.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
