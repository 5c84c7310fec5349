//! Code execution sandbox for execute fences.
//!
//! The sandbox runs one snippet, captures its output, and contains every
//! failure. Callers only ever see a string: the snippet's output on success,
//! or an HTML-safe error block describing what went wrong.
//!
//! # Key Abstractions
//!
//! - [`CodeExecutor`]: runs a snippet, writing into a per-call [`OutputCapture`]
//! - [`ProcessExecutor`]: child-process backend with time and output ceilings
//! - [`SerialExecutor`]: wraps an executor so that only one snippet runs at a time
//! - [`Sandbox`]: the containment boundary used by the fence router
//!
//! # Trust boundary
//!
//! A non-terminating snippet is stopped by the timeout, but the child
//! process otherwise runs with the privileges of the host process. Documents
//! containing execute fences must be treated as code.

#![doc = include_str!("../README.md")]

pub mod capture;
pub mod error;
pub mod executor;
pub mod process;
pub mod sandbox;
pub mod serial;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use capture::OutputCapture;
pub use error::{ExecError, ExecResult};
pub use executor::{CodeExecutor, DisabledExecutor};
pub use process::{ProcessExecutor, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT};
pub use sandbox::{render_error_block, Sandbox};
pub use serial::SerialExecutor;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockExecutor;
