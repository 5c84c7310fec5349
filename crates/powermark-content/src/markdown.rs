//! Markdown to HTML conversion with fence routing.
//!
//! Fenced code blocks are collected whole and handed to the
//! [`FenceRouter`]; its output replaces the block as raw HTML. Every other
//! event goes to the stock pulldown-cmark HTML writer.
//!
//! Smart punctuation is not applied inside `{...}` attribute blocks, so
//! quotes and dashes in attribute values reach the annotator as written.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use serde::{Deserialize, Serialize};

use crate::attributes::find_blocks;
use crate::environment::RenderEnvironment;
use crate::fence::FenceRouter;

/// Markdown extensions to enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Curly quotes, en and em dashes, ellipses, everywhere except inside
    /// attribute blocks.
    pub smart_punctuation: bool,
    /// GitHub-style tables.
    pub tables: bool,
    /// Footnote references and definitions.
    pub footnotes: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            smart_punctuation: true,
            tables: true,
            footnotes: true,
        }
    }
}

impl MarkdownOptions {
    /// The equivalent parser options.
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        options
    }
}

/// Render `text` to an HTML fragment, routing fences through `router`.
pub fn render_markdown(
    text: &str,
    options: &MarkdownOptions,
    router: &FenceRouter,
    env: &mut RenderEnvironment,
) -> String {
    let parser = Parser::new_ext(text, options.parser_options()).into_offset_iter();
    let mut events = Vec::new();
    let mut fence: Option<(CowStr<'_>, String)> = None;
    let mut run: Vec<(CowStr<'_>, Range<usize>)> = Vec::new();

    for (event, range) in parser {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                flush_text_run(&mut run, text, &mut events);
                fence = Some((info, String::new()));
            }
            Event::Text(chunk) if fence.is_some() => {
                if let Some((_, body)) = fence.as_mut() {
                    body.push_str(&chunk);
                }
            }
            Event::End(TagEnd::CodeBlock) if fence.is_some() => {
                if let Some((info, body)) = fence.take() {
                    let rendered = router.dispatch(&info, &body, env);
                    events.push(Event::Html(CowStr::from(rendered)));
                }
            }
            Event::Text(chunk) if options.smart_punctuation => run.push((chunk, range)),
            other => {
                flush_text_run(&mut run, text, &mut events);
                events.push(other);
            }
        }
    }
    flush_text_run(&mut run, text, &mut events);

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Emit a run of adjacent text events, putting back the source characters of
/// any smart punctuation that falls inside an attribute block.
fn flush_text_run<'a>(
    run: &mut Vec<(CowStr<'a>, Range<usize>)>,
    source: &'a str,
    events: &mut Vec<Event<'a>>,
) {
    if run.is_empty() {
        return;
    }
    let joined: String = run.iter().map(|(chunk, _)| chunk.as_ref()).collect();
    let blocks = if joined.contains('{') {
        find_blocks(&joined)
    } else {
        Vec::new()
    };

    let mut offset = 0;
    for (chunk, range) in run.drain(..) {
        let span = offset..offset + chunk.len();
        offset = span.end;
        let inside = blocks
            .iter()
            .any(|block| block.span.start < span.start && span.end < block.span.end);
        match source.get(range) {
            Some(original) if inside && is_substituted(original, &chunk) => {
                events.push(Event::Text(CowStr::Borrowed(original)));
            }
            _ => events.push(Event::Text(chunk)),
        }
    }
}

/// Whether `rendered` is a smart punctuation replacement of `original`.
fn is_substituted(original: &str, rendered: &str) -> bool {
    !original.is_empty()
        && original != rendered
        && original.chars().all(|c| matches!(c, '\'' | '"' | '-' | '.'))
}
