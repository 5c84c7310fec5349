//! Configuration for the `powermark` command.
//!
//! Provides the [`PowermarkConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `POWERMARK_CONFIG` environment variable
//! 3. XDG default: `~/.config/powermark/config.toml`
//! 4. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use confyg::{Confygery, env};
use powermark_content::{CompileOptions, FenceLabels, MarkdownOptions, MergePolicy};
use powermark_core::{Error, Result, expand_tilde};
use powermark_exec::{DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "POWERMARK_CONFIG";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the `powermark` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowermarkConfig {
    /// Page shell template; the built-in shell is used when absent.
    pub template: Option<String>,

    /// Fence labels.
    pub fences: FenceLabels,

    /// Code execution settings.
    pub sandbox: SandboxConfig,

    /// Markdown extensions.
    pub markdown: MarkdownOptions,

    /// Attribute annotation settings.
    pub attributes: AttributesConfig,
}

/// Code execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Whether execute fences run at all.
    pub enabled: bool,

    /// Interpreter program.
    pub interpreter: String,

    /// Arguments passed to the interpreter; the snippet arrives on stdin.
    pub args: Vec<String>,

    /// Wall-clock limit per snippet, in seconds.
    pub timeout_secs: u64,

    /// Ceiling on captured output per snippet.
    pub max_output_bytes: usize,
}

/// Attribute annotation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributesConfig {
    /// How blocks merge with attributes a tag already has.
    pub merge_policy: MergePolicy,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interpreter: "python3".to_string(),
            args: vec!["-".to_string()],
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl SandboxConfig {
    /// The timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl PowermarkConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path)
            && path.exists()
        {
            builder
                .add_file(&path.to_string_lossy())
                .map_err(|e| Error::config(format!("config file: {e}")))?;
        }

        let mut env_opts = env::Options::with_top_level("POWERMARK");
        env_opts.add_section("fences");
        env_opts.add_section("sandbox");
        env_opts.add_section("markdown");
        env_opts.add_section("attributes");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(expand_tilde(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(expand_tilde(path));
        }
        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("powermark").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// The configured template path, with `~` expanded.
    pub fn template_path(&self) -> Option<PathBuf> {
        self.template.as_deref().map(expand_tilde)
    }

    /// Options for the compiler.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            labels: self.fences.clone(),
            markdown: self.markdown,
            merge_policy: self.attributes.merge_policy,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Default tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_powermark_config_default() {
        let config = PowermarkConfig::default();
        assert!(config.template.is_none());
        assert_eq!(config.fences.exec_label, "python-power");
        assert_eq!(config.fences.style_label, "css-power");
        assert_eq!(config.fences.script_label, "js-power");
        assert!(config.sandbox.enabled);
        assert_eq!(config.sandbox.interpreter, "python3");
        assert_eq!(config.sandbox.args, vec!["-"]);
        assert_eq!(config.sandbox.timeout_secs, 30);
        assert_eq!(config.sandbox.max_output_bytes, 1_048_576);
        assert!(config.markdown.smart_punctuation);
        assert_eq!(config.attributes.merge_policy, MergePolicy::Overwrite);
    }

    // ------------------------------------------------------------------------
    // Serialization tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_powermark_config_from_toml() {
        let toml_str = r#"
            template = "/site/shell.html"

            [fences]
            exec_label = "run"

            [sandbox]
            enabled = false
            timeout_secs = 5

            [markdown]
            tables = false

            [attributes]
            merge_policy = "append"
        "#;

        let config: PowermarkConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.template.as_deref(), Some("/site/shell.html"));
        assert_eq!(config.fences.exec_label, "run");
        assert_eq!(config.fences.style_label, "css-power");
        assert!(!config.sandbox.enabled);
        assert_eq!(config.sandbox.timeout(), Duration::from_secs(5));
        assert_eq!(config.sandbox.interpreter, "python3");
        assert!(!config.markdown.tables);
        assert!(config.markdown.footnotes);
        assert_eq!(config.attributes.merge_policy, MergePolicy::Append);
    }

    #[test]
    fn test_powermark_config_to_toml() {
        let config = PowermarkConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("[sandbox]"));
        assert!(toml_str.contains("interpreter = \"python3\""));
        assert!(toml_str.contains("merge_policy = \"overwrite\""));

        // Round-trip
        let parsed: PowermarkConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unknown_merge_policy_is_rejected() {
        let result: std::result::Result<PowermarkConfig, _> =
            toml::from_str("[attributes]\nmerge_policy = \"merge\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_compile_options_follow_config() {
        let mut config = PowermarkConfig::default();
        config.fences.script_label = "js".to_string();
        config.attributes.merge_policy = MergePolicy::Append;
        config.markdown.footnotes = false;

        let options = config.compile_options();
        assert_eq!(options.labels.script_label, "js");
        assert_eq!(options.merge_policy, MergePolicy::Append);
        assert!(!options.markdown.footnotes);
    }

    // ------------------------------------------------------------------------
    // Loading tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_powermark_config_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                template = "shell.html"
                [fences]
                style_label = "styles"
            "#,
        )
        .unwrap();

        let config = PowermarkConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.template.as_deref(), Some("shell.html"));
        assert_eq!(config.fences.style_label, "styles");
        assert_eq!(config.fences.exec_label, "python-power");
    }

    #[test]
    fn test_powermark_config_load_defaults() {
        // Load with a nonexistent file falls back to defaults
        let config = PowermarkConfig::load(Some("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.sandbox.interpreter, "python3");
        assert_eq!(config.fences.exec_label, "python-power");
    }

    // ------------------------------------------------------------------------
    // Path tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_resolve_config_path_explicit() {
        let path = PowermarkConfig::resolve_config_path(Some("/explicit/config.toml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_default_config_path_shape() {
        if let Some(path) = PowermarkConfig::default_config_path() {
            assert!(path.ends_with("powermark/config.toml"));
        }
    }

    #[test]
    fn test_template_path_expands_tilde() {
        let config = PowermarkConfig {
            template: Some("~/shell.html".to_string()),
            ..PowermarkConfig::default()
        };
        let path = config.template_path().unwrap();
        assert!(path.ends_with("shell.html"));
        if dirs::home_dir().is_some() {
            assert!(!path.starts_with("~"));
        }
    }
}
