//! Resolution of attribute blocks onto the tags they annotate.
//!
//! Two placement rules apply, in order:
//!
//! 1. The first block inside a `<p>` element's text is merged onto that
//!    paragraph's start tag. Later blocks in the same paragraph are removed
//!    without being applied.
//! 2. Every other block is merged onto the nearest start tag before it. A
//!    block with no tag before it is dropped.
//!
//! Every block found in eligible text is removed from the output, whether or
//! not it was applied.

use std::ops::Range;

use log::debug;
use serde::{Deserialize, Serialize};

use super::block::{AttributeSet, find_blocks, parse_block};
use super::html::{Record, RecordKind, StartTag, TagAttr, decode_entities, render, tokenize};

/// How block attributes combine with attributes the tag already has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// A new id replaces the old one; named attributes are last-write-wins.
    #[default]
    Overwrite,
    /// Ids and named attributes are always added, even when the tag already
    /// has them. Produces duplicate attributes.
    Append,
}

/// What an annotation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    /// Blocks merged onto their enclosing paragraph.
    pub embedded: usize,
    /// Blocks merged onto the nearest preceding start tag.
    pub anchored: usize,
    /// Later blocks in an already annotated paragraph, removed unapplied.
    pub suppressed: usize,
    /// Raw text of blocks dropped because no tag precedes them.
    pub dangling: Vec<String>,
}

impl AnnotationReport {
    /// Total number of blocks removed from the fragment.
    pub fn total(&self) -> usize {
        self.embedded + self.anchored + self.suppressed + self.dangling.len()
    }
}

/// Rewrites attribute blocks in a rendered HTML fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Annotator {
    policy: MergePolicy,
}

/// A block located in the record arena.
struct Located {
    record: usize,
    span: Range<usize>,
    raw: String,
}

impl Annotator {
    /// An annotator with the given merge policy.
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy }
    }

    /// The merge policy in use.
    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Resolve every attribute block in `html`.
    pub fn annotate(&self, html: &str) -> String {
        self.annotate_with_report(html).0
    }

    /// Resolve every attribute block in `html` and report what happened.
    pub fn annotate_with_report(&self, html: &str) -> (String, AnnotationReport) {
        let mut report = AnnotationReport::default();
        if !html.contains('{') {
            return (html.to_string(), report);
        }

        let mut records = tokenize(html);
        let blocks = locate_blocks(html, &records);
        if blocks.is_empty() {
            return (html.to_string(), report);
        }
        let mut consumed = vec![false; blocks.len()];

        // Paragraph-embedded blocks
        for p in 0..records.len() {
            let is_paragraph = records[p].as_start_tag().is_some_and(|tag| tag.is("p"));
            if !is_paragraph {
                continue;
            }
            let end = paragraph_end(&records, p);
            let mut inside = blocks
                .iter()
                .enumerate()
                .filter(|(i, b)| !consumed[*i] && b.record > p && b.record < end)
                .map(|(i, _)| i);
            let Some(first) = inside.next() else {
                continue;
            };
            let rest: Vec<usize> = inside.collect();
            self.apply(&mut records[p], &parse(&blocks[first].raw));
            consumed[first] = true;
            report.embedded += 1;
            for i in rest {
                debug!("dropping extra paragraph attribute block: {{{}}}", blocks[i].raw);
                consumed[i] = true;
                report.suppressed += 1;
            }
        }

        // Standalone blocks
        for (i, block) in blocks.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            let anchor = (0..block.record)
                .rev()
                .find(|&idx| records[idx].as_start_tag().is_some());
            match anchor {
                Some(idx) => {
                    self.apply(&mut records[idx], &parse(&block.raw));
                    report.anchored += 1;
                }
                None => {
                    debug!("dropping attribute block with no preceding tag: {{{}}}", block.raw);
                    report.dangling.push(block.raw.clone());
                }
            }
        }

        for block in &blocks {
            if let RecordKind::Text { cuts, .. } = &mut records[block.record].kind {
                cuts.push(block.span.clone());
            }
        }

        debug!(
            "resolved {} attribute blocks ({} embedded, {} anchored, {} suppressed, {} dangling)",
            report.total(),
            report.embedded,
            report.anchored,
            report.suppressed,
            report.dangling.len()
        );
        (render(html, &records), report)
    }

    fn apply(&self, record: &mut Record, set: &AttributeSet) {
        if set.is_empty() {
            return;
        }
        if let RecordKind::StartTag(tag) = &mut record.kind {
            merge(tag, set, self.policy);
        }
    }
}

/// Resolve every attribute block in `html` with the default merge policy.
///
/// ```
/// use powermark_content::annotate;
///
/// assert_eq!(
///     annotate("<h2>Title</h2>{#sec1 .note}"),
///     r#"<h2 id="sec1" class="note">Title</h2>"#
/// );
/// ```
pub fn annotate(html: &str) -> String {
    Annotator::default().annotate(html)
}

fn locate_blocks(html: &str, records: &[Record]) -> Vec<Located> {
    let mut located = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        if !record.is_eligible_text() {
            continue;
        }
        let base = record.span.start;
        for block in find_blocks(&html[record.span.clone()]) {
            located.push(Located {
                record: idx,
                span: base + block.span.start..base + block.span.end,
                raw: block.raw,
            });
        }
    }
    located
}

/// Index of the record that ends the paragraph opened at `p`: its close tag,
/// the next paragraph, or the end of the fragment.
fn paragraph_end(records: &[Record], p: usize) -> usize {
    records[p + 1..]
        .iter()
        .position(|r| r.is_end_tag("p") || r.as_start_tag().is_some_and(|tag| tag.is("p")))
        .map_or(records.len(), |offset| p + 1 + offset)
}

fn parse(raw: &str) -> AttributeSet {
    parse_block(&decode_entities(raw))
}

fn merge(tag: &mut StartTag, set: &AttributeSet, policy: MergePolicy) {
    if let Some(id) = &set.id {
        put(tag, "id", id, policy);
    }
    if !set.classes.is_empty() {
        let joined = set.classes.join(" ");
        match tag.attr_mut("class") {
            Some(existing) => existing.append_words(&joined),
            None => tag.push_attr(TagAttr::quoted("class", &joined)),
        }
    }
    for (key, value) in &set.attributes {
        put(tag, key, value, policy);
    }
}

fn put(tag: &mut StartTag, name: &str, value: &str, policy: MergePolicy) {
    if policy == MergePolicy::Overwrite
        && let Some(existing) = tag.attr_mut(name)
    {
        existing.set_value(value);
        return;
    }
    tag.push_attr(TagAttr::quoted(name, value));
}
