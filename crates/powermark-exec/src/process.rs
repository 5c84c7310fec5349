//! Child-process executor.
//!
//! Each snippet is piped to a fresh interpreter process on stdin. The child
//! runs in a scratch directory that is removed afterwards, sees only the
//! environment variables explicitly passed through, is killed when it
//! exceeds its wall-clock ceiling, and fails once its stdout outgrows the
//! capture limit.
//!
//! On unix the interpreter leads its own process group. The group is killed
//! when the run ends, so processes a snippet leaves running in the
//! background do not outlive it.

use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::debug;

use crate::capture::OutputCapture;
use crate::error::{ExecError, ExecResult};
use crate::executor::CodeExecutor;

/// Default wall-clock ceiling for one snippet.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default ceiling on captured stdout.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// How much of the child's stderr is kept for the error block.
const STDERR_KEEP_BYTES: usize = 64 * 1024;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const READ_CHUNK: usize = 8 * 1024;

/// Runs snippets through an external interpreter.
///
/// # Example
///
/// ```no_run
/// use powermark_exec::{CodeExecutor, OutputCapture, ProcessExecutor};
/// use std::time::Duration;
///
/// let executor = ProcessExecutor::python().with_timeout(Duration::from_secs(5));
/// let mut capture = OutputCapture::with_limit(4096);
/// executor.run("print('hi')", &mut capture)?;
/// assert_eq!(capture.into_string(), "hi\n");
/// # Ok::<(), powermark_exec::ExecError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    pass_env: Vec<String>,
}

impl ProcessExecutor {
    /// Create an executor for `program`, which reads the snippet on stdin.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            pass_env: vec!["PATH".to_string()],
        }
    }

    /// Executor for `python3 -`.
    pub fn python() -> Self {
        Self::new("python3").with_args(["-"])
    }

    /// Set the interpreter arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the wall-clock ceiling.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pass an environment variable from the host through to the child.
    ///
    /// Only `PATH` is passed by default.
    pub fn with_passed_env(mut self, name: impl Into<String>) -> Self {
        self.pass_env.push(name.into());
        self
    }

    /// Interpreter program.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Interpreter arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Wall-clock ceiling.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command(&self, workdir: &std::path::Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(workdir)
            .env_clear()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for name in &self.pass_env {
            if let Some(value) = std::env::var_os(name) {
                command.env(name, value);
            }
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        command
    }

    fn supervise(
        &self,
        child: &mut Child,
        code: &str,
        capture: &mut OutputCapture,
    ) -> ExecResult<()> {
        let stdin = child.stdin.take();
        let code: Vec<u8> = code.as_bytes().to_vec();
        let writer = thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                // The child may exit without reading its input.
                let _ = stdin.write_all(&code);
            }
        });

        let overflow = Arc::new(AtomicBool::new(false));
        let out_reader = spawn_reader(
            child.stdout.take(),
            capture.remaining(),
            Some(Arc::clone(&overflow)),
        );
        let err_reader = spawn_reader(child.stderr.take(), Some(STDERR_KEEP_BYTES), None);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if overflow.load(Ordering::Acquire) {
                return Err(ExecError::OutputLimit(capture.limit().unwrap_or(0)));
            }
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                return Err(ExecError::Timeout(self.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        // Background processes still holding the pipes go with the group.
        kill_group(child.id());
        let timed_out = || ExecError::Timeout(self.timeout);
        join_before(writer, deadline).ok_or_else(timed_out)?;
        let stdout = join_before(out_reader, deadline).ok_or_else(timed_out)?;
        let stderr = join_before(err_reader, deadline).ok_or_else(timed_out)?;

        if overflow.load(Ordering::Acquire) {
            return Err(ExecError::OutputLimit(capture.limit().unwrap_or(0)));
        }
        if !status.success() {
            return Err(ExecError::Failed {
                status: status.code(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        }
        capture.write_bytes(&stdout)
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::python()
    }
}

impl CodeExecutor for ProcessExecutor {
    fn run(&self, code: &str, capture: &mut OutputCapture) -> ExecResult<()> {
        let workdir = tempfile::Builder::new()
            .prefix("powermark-exec-")
            .tempdir()?;

        let mut child = self
            .command(workdir.path())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        debug!(
            "spawned `{}` (pid {}) in {}",
            self.program,
            child.id(),
            workdir.path().display()
        );

        let result = self.supervise(&mut child, code, capture);
        if result.is_err() {
            // Timed out, over the limit, or already exited; reap either way.
            kill_group(child.id());
            let _ = child.kill();
            let _ = child.wait();
        }
        result
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Kill every process in the group led by `pid`.
#[cfg(unix)]
fn kill_group(pid: u32) {
    let status = Command::new("kill")
        .args(["-KILL", "--", &format!("-{pid}")])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    if let Err(err) = status {
        debug!("could not signal process group {pid}: {err}");
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}

/// Join `handle` unless it is still running at `deadline`.
///
/// A thread left running is detached; it ends once its pipe closes.
fn join_before<T: Default>(handle: JoinHandle<T>, deadline: Instant) -> Option<T> {
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(POLL_INTERVAL);
    }
    Some(handle.join().unwrap_or_default())
}

/// Drain `source` on a background thread.
///
/// Past `limit` bytes, a reader with an `overflow` flag raises it and stops;
/// one without keeps draining but discards the excess.
fn spawn_reader<R>(
    source: Option<R>,
    limit: Option<usize>,
    overflow: Option<Arc<AtomicBool>>,
) -> JoinHandle<Vec<u8>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut collected = Vec::new();
        let Some(mut source) = source else {
            return collected;
        };
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = match source.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            };
            match limit {
                Some(limit) if collected.len() + n > limit => match &overflow {
                    Some(flag) => {
                        flag.store(true, Ordering::Release);
                        break;
                    }
                    None => {
                        let room = limit.saturating_sub(collected.len());
                        collected.extend_from_slice(&chunk[..room]);
                    }
                },
                _ => collected.extend_from_slice(&chunk[..n]),
            }
        }
        collected
    })
}
