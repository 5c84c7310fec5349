//! Powermark content processing.
//!
//! Everything between the raw document and the finished page: front matter,
//! inline markers, markdown rendering with fence routing, attribute
//! annotation and page assembly.
//!
//! # Modules
//!
//! - [`frontmatter`]: `---` YAML metadata
//! - [`inline`]: `literalHTML[...]` expansion
//! - [`fence`]: Fence Block Router
//! - [`markdown`]: pulldown-cmark rendering
//! - [`attributes`]: Attribute Annotation Engine
//! - [`assemble`]: page shell filling
//! - [`pipeline`]: the [`Compiler`]

#![doc = include_str!("../README.md")]

pub mod assemble;
pub mod attributes;
pub mod environment;
pub mod fence;
pub mod frontmatter;
pub mod inline;
pub mod markdown;
pub mod pipeline;

pub use assemble::{BUILTIN_SHELL, PageParts, PageShell};
pub use attributes::{AnnotationReport, Annotator, MergePolicy, annotate};
pub use environment::{RenderEnvironment, STYLE_CATEGORY};
pub use fence::{FenceKind, FenceLabels, FenceRouter};
pub use frontmatter::{DEFAULT_TITLE, Document, Metadata, parse_document};
pub use inline::expand_literal_html;
pub use markdown::{MarkdownOptions, render_markdown};
pub use pipeline::{CompileOptions, Compiler, Page};
