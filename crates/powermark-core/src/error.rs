//! Error types for Powermark operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Powermark crates. Uses `thiserror` for derive macros.
//!
//! Only [`Error::MissingResource`] and I/O failures abort a compile. Problems
//! local to one part of a document (a failing code snippet, a malformed or
//! dangling attribute block) are absorbed where they occur and never surface
//! here.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The kind of resource a compile could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// The input markdown document.
    Document,
    /// The page-shell template.
    Template,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => f.write_str("input document"),
            Self::Template => f.write_str("page template"),
        }
    }
}

/// Errors that can occur in Powermark operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a specific path.
    #[error("I/O error on {}: {source}", .path.display())]
    IoPath {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A required input could not be found. Fatal for the whole compile.
    #[error("File not found - {kind}: {}", .path.display())]
    MissingResource {
        /// Which resource was missing.
        kind: ResourceKind,
        /// Where it was looked for.
        path: PathBuf,
    },

    /// Front matter could not be parsed.
    #[error("Front matter error: {0}")]
    FrontMatter(String),

    /// Page template substitution failed.
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a missing resource error.
    pub fn missing(kind: ResourceKind, path: impl Into<PathBuf>) -> Self {
        Self::MissingResource {
            kind,
            path: path.into(),
        }
    }

    /// Create a front matter error.
    pub fn front_matter(msg: impl Into<String>) -> Self {
        Self::FrontMatter(msg.into())
    }

    /// Create a template error.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an I/O error with the path it occurred on.
    ///
    /// `NotFound` errors become [`Error::MissingResource`] of the given kind.
    pub fn io_for(kind: ResourceKind, err: std::io::Error, path: &Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::missing(kind, path)
        } else {
            Self::io_with_path(err, path)
        }
    }

    /// Wrap an I/O error with the path it occurred on.
    pub fn io_with_path(err: std::io::Error, path: &Path) -> Self {
        Self::IoPath {
            path: path.to_path_buf(),
            source: err,
        }
    }

    /// Whether this error is a missing document or template.
    pub fn is_missing_resource(&self) -> bool {
        matches!(self, Self::MissingResource { .. })
    }
}

/// Result type alias using Powermark's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_resource_display() {
        let err = Error::missing(ResourceKind::Document, "/docs/post.md");
        assert_eq!(
            err.to_string(),
            "File not found - input document: /docs/post.md"
        );
        assert!(err.is_missing_resource());
    }

    #[test]
    fn test_missing_template_display() {
        let err = Error::missing(ResourceKind::Template, "shell.html");
        assert!(err.to_string().contains("page template"));
    }

    #[test]
    fn test_io_for_not_found_maps_to_missing() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::io_for(ResourceKind::Template, io, Path::new("t.html"));
        match err {
            Error::MissingResource { kind, path } => {
                assert_eq!(kind, ResourceKind::Template);
                assert_eq!(path, PathBuf::from("t.html"));
            }
            other => panic!("Expected MissingResource, got {other:?}"),
        }
    }

    #[test]
    fn test_io_for_other_kinds_keep_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = Error::io_for(ResourceKind::Document, io, Path::new("a.md"));
        assert!(!err.is_missing_resource());
        assert!(err.to_string().contains("a.md"));
    }

    #[test]
    fn test_constructor_helpers() {
        assert!(matches!(Error::config("x"), Error::Config(m) if m == "x"));
        assert!(matches!(Error::template("y"), Error::Template(m) if m == "y"));
        assert!(matches!(
            Error::front_matter("z"),
            Error::FrontMatter(m) if m == "z"
        ));
    }
}
