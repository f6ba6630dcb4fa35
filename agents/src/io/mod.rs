//! I/O for agent tasks: config, context, prompts, backends, output files.

pub mod backend;
pub mod config;
pub mod context;
pub mod init;
pub mod prompt;
pub mod writer;
