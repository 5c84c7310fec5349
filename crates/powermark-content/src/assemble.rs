//! Page assembly: filling the page shell.
//!
//! A shell is HTML with `$name` or `${name}` placeholders; `$$` stands for a
//! literal dollar sign. Recognized names:
//!
//! - `title`: page title, HTML-escaped
//! - `css_links`: one `<link rel="stylesheet">` per stylesheet URL
//! - `custom_styles`: collected style fences, newline-joined
//! - `html_content`: the rendered body fragment
//! - `js_links`: one `<script src>` per script URL
//!
//! Any other placeholder, or a `$` that starts none, is rejected when the
//! shell is parsed.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use powermark_core::{Error, ResourceKind, Result, escape_attr, escape_html};
use regex::Regex;

/// The shell used when no template is configured.
pub const BUILTIN_SHELL: &str = include_str!("../templates/page.html");

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\}|)")
        .expect("placeholder pattern compiles")
});

/// A named slot in the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Title,
    CssLinks,
    CustomStyles,
    HtmlContent,
    JsLinks,
}

impl Slot {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "css_links" => Some(Self::CssLinks),
            "custom_styles" => Some(Self::CustomStyles),
            "html_content" => Some(Self::HtmlContent),
            "js_links" => Some(Self::JsLinks),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Slot),
}

/// Everything that goes into a page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageParts<'a> {
    /// Page title, unescaped.
    pub title: &'a str,
    /// Stylesheet URLs.
    pub css: &'a [String],
    /// Collected style fragments.
    pub styles: &'a [String],
    /// Rendered body fragment.
    pub body: &'a str,
    /// Script URLs.
    pub js: &'a [String],
}

/// A parsed page shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageShell {
    segments: Vec<Segment>,
}

impl Default for PageShell {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PageShell {
    /// The compiled-in shell.
    pub fn builtin() -> Self {
        // The built-in shell only uses known placeholders.
        Self::parse(BUILTIN_SHELL).unwrap_or_else(|_| Self {
            segments: vec![Segment::Slot(Slot::HtmlContent)],
        })
    }

    /// Parse a shell, rejecting unknown placeholders.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(source) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            literal.push_str(&source[last..whole.start()]);
            last = whole.end();

            if caps.get(1).is_some() {
                literal.push('$');
                continue;
            }
            let Some(name) = caps.get(2).or_else(|| caps.get(3)) else {
                let line = source[..whole.start()].matches('\n').count() + 1;
                return Err(Error::template(format!(
                    "invalid placeholder at line {line}: `$` must start a name or be written `$$`"
                )));
            };
            let slot = Slot::from_name(name.as_str()).ok_or_else(|| {
                Error::template(format!("unknown placeholder `${}`", name.as_str()))
            })?;
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Slot(slot));
        }
        literal.push_str(&source[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Read and parse a shell from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .map_err(|e| Error::io_for(ResourceKind::Template, e, path))?;
        Self::parse(&source)
    }

    /// Fill the shell.
    pub fn render(&self, parts: &PageParts<'_>) -> String {
        let mut out = String::with_capacity(BUILTIN_SHELL.len() + parts.body.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(Slot::Title) => out.push_str(&escape_html(parts.title)),
                Segment::Slot(Slot::CssLinks) => out.push_str(&stylesheet_links(parts.css)),
                Segment::Slot(Slot::CustomStyles) => out.push_str(&parts.styles.join("\n")),
                Segment::Slot(Slot::HtmlContent) => out.push_str(parts.body),
                Segment::Slot(Slot::JsLinks) => out.push_str(&script_links(parts.js)),
            }
        }
        out
    }
}

/// `<link rel="stylesheet">` tags, one per line.
pub fn stylesheet_links(urls: &[String]) -> String {
    urls.iter()
        .map(|url| format!("<link rel=\"stylesheet\" href=\"{}\">", escape_attr(url)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<script src>` tags, one per line.
pub fn script_links(urls: &[String]) -> String {
    urls.iter()
        .map(|url| format!("<script src=\"{}\"></script>", escape_attr(url)))
        .collect::<Vec<_>>()
        .join("\n")
}
