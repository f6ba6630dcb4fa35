//! Task classification and response extraction for specialized LLM agents.
//!
//! A task (free-text spec plus an optional source file) is routed to one of
//! three agent families: security review, performance review, or general
//! question answering. The family classifies the task by keyword frequency,
//! assembles a prompt from project context documents, makes one generation
//! call, and splits the response into fixed output files.
//!
//! - **[`core`]**: Pure, deterministic logic (classification, extraction,
//!   output manifests). No I/O.
//! - **[`io`]**: Side-effecting operations (filesystem, prompt templates,
//!   generation backends).
//!
//! [`pipeline`] coordinates the two for `agents run`.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod pipeline;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
