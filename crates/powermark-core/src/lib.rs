//! Powermark Core — shared errors and utilities.
//!
//! This crate provides the foundational types used across all Powermark
//! crates. It has no internal Powermark dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`util`]: HTML escaping and path helpers

#![doc = include_str!("../README.md")]

pub mod error;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, ResourceKind, Result};

// Convenience re-exports from util
pub use util::html::{escape_attr, escape_html};
pub use util::paths::{default_output_path, expand_tilde};
