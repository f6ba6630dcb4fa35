//! Stable exit codes for `agents` CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid arguments, unreadable config, or any other setup error.
pub const INVALID: i32 = 1;
/// The generation backend failed or was not configured; nothing was written.
pub const GENERATION_FAILED: i32 = 2;
/// An output file could not be written.
pub const WRITE_FAILED: i32 = 3;
