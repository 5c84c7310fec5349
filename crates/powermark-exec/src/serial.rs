//! Mutual exclusion for executors.
//!
//! [`SerialExecutor`] holds one process-wide lock for the whole duration of
//! each run, so snippets from concurrent compiles never overlap even when
//! they are driven through different `SerialExecutor` instances.

use std::sync::{Mutex, PoisonError};

use crate::capture::OutputCapture;
use crate::error::ExecResult;
use crate::executor::CodeExecutor;

static EXECUTION_LOCK: Mutex<()> = Mutex::new(());

/// Executor wrapper that runs at most one snippet at a time, process-wide.
#[derive(Debug, Clone, Default)]
pub struct SerialExecutor<E> {
    inner: E,
}

impl<E: CodeExecutor> SerialExecutor<E> {
    /// Wrap `inner`.
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    /// The wrapped executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: CodeExecutor> CodeExecutor for SerialExecutor<E> {
    fn run(&self, code: &str, capture: &mut OutputCapture) -> ExecResult<()> {
        // A panicking run poisons the lock but leaves nothing to repair.
        let _guard = EXECUTION_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.inner.run(code, capture)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
