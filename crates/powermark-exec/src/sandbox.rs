//! Containment boundary around a [`CodeExecutor`].
//!
//! [`Sandbox::execute`] never fails. Every error, including a panic inside
//! the executor, becomes an HTML-safe error block, so one broken snippet
//! cannot take down the rest of the document.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, warn};
use powermark_core::escape_html;

use crate::capture::OutputCapture;
use crate::error::ExecError;
use crate::executor::CodeExecutor;
use crate::process::DEFAULT_MAX_OUTPUT_BYTES;

/// Runs snippets and contains their failures.
#[derive(Clone)]
pub struct Sandbox {
    executor: Arc<dyn CodeExecutor>,
    max_output_bytes: usize,
}

impl Sandbox {
    /// Wrap an executor with the default output ceiling.
    pub fn new<E: CodeExecutor + 'static>(executor: E) -> Self {
        Self::from_arc(Arc::new(executor))
    }

    /// Wrap an already shared executor.
    pub fn from_arc(executor: Arc<dyn CodeExecutor>) -> Self {
        Self {
            executor,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }

    /// Set the ceiling on captured output per snippet.
    pub fn with_max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }

    /// The wrapped executor.
    pub fn executor(&self) -> &dyn CodeExecutor {
        &*self.executor
    }

    /// Run `code` and return what it printed, or an error block.
    pub fn execute(&self, code: &str) -> String {
        let mut capture = OutputCapture::with_limit(self.max_output_bytes);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.executor.run(code, &mut capture)
        }))
        .unwrap_or_else(|payload| Err(ExecError::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(()) => {
                debug!(
                    "executor `{}` produced {} bytes",
                    self.executor.name(),
                    capture.len()
                );
                capture.into_string()
            }
            Err(err) => {
                warn!("code execution failed ({}): {err}", self.executor.name());
                render_error_block(&err)
            }
        }
    }
}

impl std::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sandbox")
            .field("executor", &self.executor.name())
            .field("max_output_bytes", &self.max_output_bytes)
            .finish()
    }
}

/// Render a failure as an inline HTML block.
pub fn render_error_block(err: &ExecError) -> String {
    format!(
        "Error executing code:\n<pre>{}</pre>",
        escape_html(&err.to_string())
    )
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::executor::DisabledExecutor;
    use crate::mock::MockExecutor;

    struct PanickingExecutor;

    impl CodeExecutor for PanickingExecutor {
        fn run(&self, _code: &str, _capture: &mut OutputCapture) -> crate::ExecResult<()> {
            panic!("interpreter state corrupted");
        }
    }

    #[test]
    fn test_execute_returns_output() {
        let sandbox = Sandbox::new(MockExecutor::with_output("Hello, World!\n"));
        assert_eq!(sandbox.execute("print('Hello, World!')"), "Hello, World!\n");
    }

    #[test]
    fn test_execute_contains_failure() {
        let sandbox = Sandbox::new(MockExecutor::failing("ZeroDivisionError: division by zero"));
        let html = sandbox.execute("1/0");
        assert_eq!(
            html,
            "Error executing code:\n<pre>ZeroDivisionError: division by zero</pre>"
        );
    }

    #[test]
    fn test_error_block_is_html_safe() {
        let sandbox = Sandbox::new(MockExecutor::failing("bad <tag> & more"));
        let html = sandbox.execute("x");
        assert!(html.contains("bad &lt;tag&gt; &amp; more"));
        assert!(!html.contains("<tag>"));
    }

    #[test]
    fn test_execute_contains_panic() {
        let sandbox = Sandbox::new(PanickingExecutor);
        let html = sandbox.execute("anything");
        assert!(html.starts_with("Error executing code:"));
        assert!(html.contains("interpreter state corrupted"));
    }

    #[test]
    fn test_output_limit_becomes_error_block() {
        let sandbox =
            Sandbox::new(MockExecutor::with_output("0123456789")).with_max_output_bytes(4);
        let html = sandbox.execute("x");
        assert!(html.contains("output exceeded the 4-byte limit"));
    }

    #[test]
    fn test_disabled_execution_renders_notice() {
        let sandbox = Sandbox::new(DisabledExecutor);
        assert!(sandbox.execute("x").contains("code execution is disabled"));
    }

    #[test]
    fn test_each_call_gets_fresh_capture() {
        let sandbox = Sandbox::new(MockExecutor::with_output("once\n"));
        assert_eq!(sandbox.execute("a"), "once\n");
        assert_eq!(sandbox.execute("b"), "once\n");
    }

    #[test]
    fn test_sandbox_debug_names_executor() {
        let sandbox = Sandbox::new(DisabledExecutor);
        assert!(format!("{sandbox:?}").contains("disabled"));
    }
}
