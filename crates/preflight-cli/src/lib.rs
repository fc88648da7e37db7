//! Preflight CLI library.
//!
//! This module exposes internal types for testing purposes.
//! The main entry point is the `preflight` binary.

pub mod cli;
pub mod convert;
pub mod output;
#[cfg(feature = "serve")]
pub mod server;

// Re-export commonly used types
pub use cli::Args;
