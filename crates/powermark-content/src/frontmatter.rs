//! YAML front matter.
//!
//! A document may start with a metadata block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Notes
//! css: [base.css, print.css]
//! js: app.js
//! ---
//! # Body
//! ```
//!
//! `css` and `js` accept a single URL or a list. Unknown keys are ignored.

use powermark_core::{Error, Result};
use serde::Deserialize;

/// Title used when the front matter does not set one.
pub const DEFAULT_TITLE: &str = "Rendered Page";

const FENCE: &str = "---";

/// Metadata read from front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Page title.
    pub title: Option<String>,
    /// Stylesheet URLs, in order.
    #[serde(deserialize_with = "one_or_many")]
    pub css: Vec<String>,
    /// Script URLs, in order.
    #[serde(deserialize_with = "one_or_many")]
    pub js: Vec<String>,
}

impl Metadata {
    /// The title, or [`DEFAULT_TITLE`].
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }
}

/// A document split into metadata and body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Parsed front matter; empty when the document has none.
    pub metadata: Metadata,
    /// Everything after the front matter.
    pub body: String,
}

/// Split `raw` into front matter and body.
///
/// Text without a leading `---` line, or whose opening fence is never
/// closed, has no front matter and is returned whole as the body.
pub fn parse_document(raw: &str) -> Result<Document> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some((yaml, body)) = split_front_matter(raw) else {
        return Ok(Document {
            metadata: Metadata::default(),
            body: raw.to_string(),
        });
    };

    let metadata = if yaml.trim().is_empty() {
        Metadata::default()
    } else {
        yaml_serde::from_str(yaml).map_err(|e| Error::front_matter(e.to_string()))?
    };
    Ok(Document {
        metadata,
        body: body.to_string(),
    })
}

/// Returns `(yaml, body)` when `raw` opens with a front matter fence.
fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let (first, mut rest) = split_line(raw);
    if first.trim_end() != FENCE {
        return None;
    }
    let yaml_start = raw.len() - rest.len();
    loop {
        if rest.is_empty() {
            return None;
        }
        let line_start = raw.len() - rest.len();
        let (line, after) = split_line(rest);
        if line.trim_end() == FENCE {
            return Some((&raw[yaml_start..line_start], after));
        }
        rest = after;
    }
}

/// Split off the first line, dropping its terminator.
fn split_line(text: &str) -> (&str, &str) {
    match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Nothing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(url) => vec![url],
        OneOrMany::Many(urls) => urls,
        OneOrMany::Nothing(()) => Vec::new(),
    })
}
