//! Attribute annotation of rendered HTML.
//!
//! Authors write `{#id .class key=value}` after a heading, inside a
//! paragraph, or after any element. Once the markdown has been rendered,
//! the [`Annotator`] moves those markers onto the HTML tags they describe.

pub mod annotate;
pub mod block;
pub mod html;

pub use annotate::{AnnotationReport, Annotator, MergePolicy, annotate};
pub use block::{AttributeBlock, AttributeSet, find_blocks, parse_block};
