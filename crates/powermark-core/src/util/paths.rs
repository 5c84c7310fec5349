//! Path resolution utilities.
//!
//! Provides generic path helpers used by the compiler and the CLI.

use std::path::{Path, PathBuf};

/// Extension given to compiled pages.
pub const OUTPUT_EXTENSION: &str = "html";

/// Derives the default output path for an input document.
///
/// The last extension of the input is replaced with `.html`; an input
/// without an extension simply gains one.
///
/// # Example
///
/// ```
/// use powermark_core::util::paths::default_output_path;
/// use std::path::PathBuf;
///
/// assert_eq!(default_output_path("docs/post.md"), PathBuf::from("docs/post.html"));
/// ```
pub fn default_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
    input.as_ref().with_extension(OUTPUT_EXTENSION)
}

/// Expands `~` to the user's home directory.
///
/// If the path starts with `~`, replaces it with the user's home directory.
/// Otherwise returns the path unchanged.
///
/// # Example
///
/// ```
/// use powermark_core::util::paths::expand_tilde;
///
/// let expanded = expand_tilde("~/documents");
/// assert!(!expanded.starts_with("~"));
/// ```
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_replaces_extension() {
        assert_eq!(
            default_output_path("notes/intro.md"),
            PathBuf::from("notes/intro.html")
        );
    }

    #[test]
    fn test_default_output_path_only_last_extension() {
        assert_eq!(
            default_output_path("archive.v2.md"),
            PathBuf::from("archive.v2.html")
        );
    }

    #[test]
    fn test_default_output_path_without_extension() {
        assert_eq!(default_output_path("README"), PathBuf::from("README.html"));
    }

    #[test]
    fn test_default_output_path_in_tempdir() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("page.md");
        assert_eq!(default_output_path(&input), dir.path().join("page.html"));
    }

    #[test]
    fn test_expand_tilde_with_tilde() {
        let path = expand_tilde("~/test/path");
        assert!(!path.starts_with("~"), "Tilde should be expanded");
        if let Some(home) = dirs::home_dir() {
            assert!(path.starts_with(&home), "Path should start with home dir");
            assert!(path.ends_with("test/path"), "Path should preserve suffix");
        }
    }

    #[test]
    fn test_expand_tilde_without_tilde() {
        let original = PathBuf::from("/absolute/path");
        let expanded = expand_tilde(&original);
        assert_eq!(original, expanded, "Absolute path should not change");
    }

    #[test]
    fn test_expand_tilde_tilde_only() {
        let path = expand_tilde("~");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home, "~ should expand to home directory");
        }
    }
}
