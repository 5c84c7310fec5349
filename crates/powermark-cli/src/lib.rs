//! Command-line front end for the Powermark page compiler.
//!
//! # Key Abstractions
//!
//! - [`CliArgs`]: clap argument definitions
//! - [`PowermarkConfig`]: confyg-backed configuration
//! - [`PowermarkCli`]: builds the sandbox and compiler, then runs a compile

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;

pub use app::PowermarkCli;
pub use cli::CliArgs;
pub use config::PowermarkConfig;
