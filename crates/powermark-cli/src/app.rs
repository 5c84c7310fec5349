//! The `powermark` application.
//!
//! Wires configuration, logging and the content pipeline together.

use std::path::{Path, PathBuf};

use powermark_content::{Compiler, PageShell};
use powermark_core::{Error, Result};
use powermark_exec::{DisabledExecutor, ProcessExecutor, Sandbox, SerialExecutor};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::CliArgs;
use crate::config::PowermarkConfig;

// ============================================================================
// PowermarkCli
// ============================================================================

/// The command-line application.
#[derive(Debug, Clone)]
pub struct PowermarkCli {
    config: PowermarkConfig,
}

impl PowermarkCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let config = PowermarkConfig::load(args.config.as_deref())?;
        Ok(Self::new(config))
    }

    /// Create with an already loaded configuration.
    pub fn new(config: PowermarkConfig) -> Self {
        Self { config }
    }

    /// The effective configuration.
    pub fn config(&self) -> &PowermarkConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// The sandbox execute fences run in.
    pub fn sandbox(&self) -> Sandbox {
        let settings = &self.config.sandbox;
        if !settings.enabled {
            debug!("code execution disabled by configuration");
            return Sandbox::new(DisabledExecutor);
        }
        let executor = ProcessExecutor::new(settings.interpreter.clone())
            .with_args(settings.args.iter().cloned())
            .with_timeout(settings.timeout());
        Sandbox::new(SerialExecutor::new(executor)).with_max_output_bytes(settings.max_output_bytes)
    }

    /// A compiler for the configured sandbox, options and shell.
    ///
    /// `template` overrides the configured shell. A template that was named
    /// but does not exist is an error.
    pub fn compiler(&self, template: Option<&Path>) -> Result<Compiler> {
        let compiler = Compiler::with_options(self.sandbox(), self.config.compile_options());
        let template = template.map(Path::to_path_buf).or_else(|| self.config.template_path());
        match template {
            Some(path) => {
                debug!("using page template {}", path.display());
                Ok(compiler.with_shell(PageShell::load(&path)?))
            }
            None => Ok(compiler),
        }
    }

    /// Compile one document; returns the path written.
    pub fn compile(
        &self,
        input: &Path,
        output: Option<&Path>,
        template: Option<&Path>,
    ) -> Result<PathBuf> {
        self.compiler(template)?.compile_file(input, output)
    }

    /// Run the CLI with the given arguments.
    pub fn run(&self, args: &CliArgs) -> Result<()> {
        if args.print_config {
            print!("{}", self.config.to_toml_string()?);
            return Ok(());
        }
        let input = args
            .input
            .as_deref()
            .ok_or_else(|| Error::config("no input document given"))?;
        let written = self.compile(input, args.output.as_deref(), args.template.as_deref())?;
        println!("{}", written.display());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
