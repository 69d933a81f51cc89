//! Shared fixtures for unit tests.
//!
//! The factories assemble complete DEX images in memory, so that reader and builder tests
//! exercise the same byte-level code paths as real containers without shipping binaries.

mod factories;

pub use factories::*;
