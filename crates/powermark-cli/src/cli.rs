//! CLI argument parsing.

use std::path::PathBuf;

use clap::Parser;

// ============================================================================
// CLI argument types
// ============================================================================

/// Compile a Powermark document into an HTML page.
#[derive(Parser, Debug)]
#[command(name = "powermark", author, version, about, long_about = None)]
pub struct CliArgs {
    /// The markdown document to compile.
    #[arg(required_unless_present = "print_config")]
    pub input: Option<PathBuf>,

    /// Where to write the page (defaults to the input with an `.html` extension).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Page shell template, overriding the configured one.
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, env = "POWERMARK_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_input_only() {
        let args = parse(&["powermark", "post.md"]);
        assert_eq!(args.input, Some(PathBuf::from("post.md")));
        assert!(args.output.is_none());
        assert!(args.template.is_none());
        assert!(!args.verbose);
        assert!(!args.print_config);
    }

    #[test]
    fn test_all_flags() {
        let args = parse(&[
            "powermark",
            "post.md",
            "-o",
            "out/post.html",
            "--template",
            "shell.html",
            "-c",
            "cfg.toml",
            "-v",
        ]);
        assert_eq!(args.output, Some(PathBuf::from("out/post.html")));
        assert_eq!(args.template, Some(PathBuf::from("shell.html")));
        assert_eq!(args.config.as_deref(), Some("cfg.toml"));
        assert!(args.verbose);
    }

    #[test]
    fn test_input_is_required() {
        assert!(CliArgs::try_parse_from(["powermark"]).is_err());
    }

    #[test]
    fn test_print_config_without_input() {
        let args = parse(&["powermark", "--print-config"]);
        assert!(args.print_config);
        assert!(args.input.is_none());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["powermark", "x.md", "-v", "-q"]).is_err());
    }
}
