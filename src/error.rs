// Error kinds surfaced by the clustering core.
//
// The CLI and the CSV glue work in anyhow::Result, but the core needs callers
// to tell "no model yet" apart from "model is garbage", so these are typed.
// An empty document is deliberately not here: it is a zero-length token
// vector and flows through the pipeline like any other document.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or invalid hyperparameters, or nothing to fit on.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Apply mode was requested but the store has no model under this key.
    #[error("no topic model found under '{0}' — run `murmur fit` first")]
    ModelNotFound(String),

    /// The stored blob could not be decoded or breaks model invariants.
    #[error("topic model is corrupt or from an incompatible version: {0}")]
    ModelCorrupt(String),

    /// The model store itself failed (disk, permissions).
    #[error("model store I/O failed: {0}")]
    Store(#[from] std::io::Error),

    /// The curated topic-name table exists but cannot be parsed.
    #[error("topic-name table is unreadable: {0}")]
    Table(String),
}

impl PipelineError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
