//! Unified error types for the constrained-device agent.
//!
//! Only startup-time work is fallible (config load, transport connect,
//! worker spawn).  The event surface never returns `Result`: absent or
//! malformed records are absorbed locally and reported as `false` / `None`.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level agent error
// ---------------------------------------------------------------------------

/// Every fallible startup operation funnels into this type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration is semantically invalid (e.g. floor above ceiling).
    #[error("config: {0}")]
    Config(String),
    /// Configuration file is not valid TOML or has mistyped keys.
    #[error("config parse: {0}")]
    ConfigParse(#[from] toml::de::Error),
    /// Configuration file could not be read.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// A record could not be encoded to its wire form.
    #[error("codec: {0}")]
    Codec(#[from] serde_json::Error),
    /// Pub/sub transport could not be set up.
    #[error("transport: {0}")]
    Transport(String),
    /// A periodic worker thread could not be spawned.
    #[error("scheduler: {0}")]
    Scheduler(String),
}

pub type Result<T> = core::result::Result<T, Error>;
