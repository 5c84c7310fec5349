//! Mock executor for testing.

use std::sync::{Arc, Mutex, PoisonError};

use crate::capture::OutputCapture;
use crate::error::{ExecError, ExecResult};
use crate::executor::CodeExecutor;

/// Mock executor that returns canned outcomes instead of running code.
///
/// Outcomes are returned in order. After all outcomes are used, the executor
/// cycles back to the first one. Every snippet it receives is recorded.
#[derive(Clone)]
pub struct MockExecutor {
    state: Arc<Mutex<MockState>>,
}

struct MockState {
    canned: Vec<Result<String, String>>,
    index: usize,
    calls: Vec<String>,
}

impl MockExecutor {
    /// Creates a mock executor with canned outcomes.
    ///
    /// `Ok(text)` is written to the capture; `Err(message)` fails the run
    /// with [`ExecError::Failed`].
    ///
    /// # Examples
    ///
    /// ```
    /// use powermark_exec::MockExecutor;
    ///
    /// let executor = MockExecutor::new(vec![
    ///     Ok("first\n".to_string()),
    ///     Err("NameError: x".to_string()),
    /// ]);
    /// ```
    pub fn new(outcomes: Vec<Result<String, String>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                canned: outcomes,
                index: 0,
                calls: Vec::new(),
            })),
        }
    }

    /// Creates a mock executor that always prints `output`.
    pub fn with_output(output: impl Into<String>) -> Self {
        Self::new(vec![Ok(output.into())])
    }

    /// Creates a mock executor that always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(vec![Err(message.into())])
    }

    /// Snippets received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CodeExecutor for MockExecutor {
    fn run(&self, code: &str, capture: &mut OutputCapture) -> ExecResult<()> {
        let mut state = self.lock();
        state.calls.push(code.to_string());

        if state.canned.is_empty() {
            return Ok(());
        }

        // Get current outcome, then advance (cycling)
        let outcome = state.canned[state.index].clone();
        state.index = (state.index + 1) % state.canned.len();

        match outcome {
            Ok(text) => capture.write_str(&text),
            Err(message) => Err(ExecError::failed(message)),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
