//! The `CodeExecutor` trait.
//!
//! An executor runs one snippet and writes whatever it prints into the
//! capture it is handed. Executors report failure through [`ExecError`];
//! containment (turning that into an error block) is the job of
//! [`Sandbox`](crate::Sandbox).

use std::sync::Arc;

use crate::capture::OutputCapture;
use crate::error::{ExecError, ExecResult};

/// Backend that runs embedded code snippets.
///
/// # Bounds
///
/// - `Send + Sync`: one executor may serve several compiles on different
///   threads. Implementations that touch process-wide state must be wrapped
///   in a [`SerialExecutor`](crate::SerialExecutor).
pub trait CodeExecutor: Send + Sync {
    /// Run `code`, writing its output into `capture`.
    ///
    /// Output written before a failure stays in the capture but is discarded
    /// by the sandbox.
    fn run(&self, code: &str, capture: &mut OutputCapture) -> ExecResult<()>;

    /// Returns the name of this executor for logging/debugging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<E: CodeExecutor + ?Sized> CodeExecutor for Box<E> {
    fn run(&self, code: &str, capture: &mut OutputCapture) -> ExecResult<()> {
        (**self).run(code, capture)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<E: CodeExecutor + ?Sized> CodeExecutor for Arc<E> {
    fn run(&self, code: &str, capture: &mut OutputCapture) -> ExecResult<()> {
        (**self).run(code, capture)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Executor used when code execution is turned off.
///
/// Every snippet fails with [`ExecError::Disabled`], so execute fences render
/// an error block instead of running anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledExecutor;

impl CodeExecutor for DisabledExecutor {
    fn run(&self, _code: &str, _capture: &mut OutputCapture) -> ExecResult<()> {
        Err(ExecError::Disabled)
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
