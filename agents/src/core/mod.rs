//! Deterministic, pure logic shared by every agent family.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod classifier;
pub mod extract;
pub mod family;
pub mod manifest;
pub mod types;
