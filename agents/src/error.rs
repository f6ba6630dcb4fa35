//! Error taxonomy for the agent pipeline.
//!
//! Only [`PipelineError::Generation`] and [`PipelineError::Write`] abort a
//! task. Missing context and unreadable sources are recovered where they occur
//! and only logged; a response lacking a section or code block is not an error
//! at all.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("context document '{name}' unavailable at {}: {source}", path.display())]
    MissingContext {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source artifact {} unreadable: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationFailure),

    #[error("prompt rendering failed: {0}")]
    Prompt(#[from] minijinja::Error),

    #[error("write {} failed: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a generation backend could not produce a completion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationFailure {
    #[error("backend not configured: {0}")]
    NotConfigured(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("simulation failed: {0}")]
    Simulation(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
