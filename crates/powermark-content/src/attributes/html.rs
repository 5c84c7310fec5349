//! Flat tokenization of rendered HTML into an ordered record arena.
//!
//! The fragment is split into start tags, end tags, text runs and other
//! markup (comments, doctypes). Records partition the source exactly: every
//! byte belongs to one record, and an unmodified record renders back as its
//! original bytes. Records are addressed by index, so edits to one record
//! never shift the position of another.

use std::ops::Range;

use powermark_core::escape_attr;

/// Elements whose content is raw text up to the matching close tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Elements whose text content is literal and never carries attribute blocks.
const LITERAL_ELEMENTS: &[&str] = &["pre", "code"];

/// One attribute inside a start tag, as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAttr {
    /// Attribute name as written.
    pub name: String,
    /// Raw (still entity-encoded) value, if the attribute has one.
    pub value: Option<String>,
    /// Quote character around the value, if quoted.
    pub quote: Option<char>,
}

impl TagAttr {
    /// A new double-quoted attribute; `value` is escaped.
    pub fn quoted(name: impl Into<String>, value: &str) -> Self {
        Self {
            name: name.into(),
            value: Some(escape_attr(value)),
            quote: Some('"'),
        }
    }

    /// Replace the value; `value` is escaped.
    pub fn set_value(&mut self, value: &str) {
        self.value = Some(escape_attr(value));
        self.quote = Some('"');
    }

    /// Append space-separated words to the value; `extra` is escaped.
    pub fn append_words(&mut self, extra: &str) {
        let existing = self.double_quoted_raw();
        let joined = if existing.trim().is_empty() {
            escape_attr(extra)
        } else {
            format!("{existing} {}", escape_attr(extra))
        };
        self.value = Some(joined);
        self.quote = Some('"');
    }

    /// The raw value made safe for a double-quoted context.
    fn double_quoted_raw(&self) -> String {
        let raw = self.value.as_deref().unwrap_or("");
        match self.quote {
            Some('"') => raw.to_string(),
            _ => raw.replace('"', "&quot;"),
        }
    }

    fn render_into(&self, out: &mut String) {
        out.push(' ');
        out.push_str(&self.name);
        if let Some(value) = &self.value {
            out.push('=');
            match self.quote {
                Some(q) => {
                    out.push(q);
                    out.push_str(value);
                    out.push(q);
                }
                None => out.push_str(value),
            }
        }
    }
}

/// A start tag with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Tag name as written.
    pub name: String,
    /// Attributes in source order.
    pub attrs: Vec<TagAttr>,
    /// Whether the tag ended in `/>`.
    pub self_closing: bool,
    dirty: bool,
}

impl StartTag {
    /// Whether this tag has the given name (ASCII case-insensitive).
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Look up an attribute by name.
    pub fn attr(&self, name: &str) -> Option<&TagAttr> {
        self.attrs.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Look up an attribute by name, marking the tag modified.
    pub fn attr_mut(&mut self, name: &str) -> Option<&mut TagAttr> {
        self.dirty = true;
        self.attrs
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Append an attribute, marking the tag modified.
    pub fn push_attr(&mut self, attr: TagAttr) {
        self.dirty = true;
        self.attrs.push(attr);
    }

    /// Whether the tag must be re-rendered.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Serialize the tag.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 2 + self.attrs.len() * 16);
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            attr.render_into(&mut out);
        }
        if self.self_closing {
            out.push_str(" /");
        }
        out.push('>');
        out
    }
}

/// What a record holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    /// `<name ...>`
    StartTag(StartTag),
    /// `</name>`, with the name lowercased.
    EndTag(String),
    /// A run of text between tags.
    Text {
        /// Whether attribute blocks in this text are honored.
        eligible: bool,
        /// Absolute byte spans removed from the text on render.
        cuts: Vec<Range<usize>>,
    },
    /// Comments, doctypes, processing instructions.
    Markup,
}

/// One entry of the arena: a kind plus the source span it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Record contents.
    pub kind: RecordKind,
    /// Byte span in the source fragment.
    pub span: Range<usize>,
}

impl Record {
    /// The start tag, if this record is one.
    pub fn as_start_tag(&self) -> Option<&StartTag> {
        match &self.kind {
            RecordKind::StartTag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Whether this is the end tag `</name>`.
    pub fn is_end_tag(&self, name: &str) -> bool {
        matches!(&self.kind, RecordKind::EndTag(n) if n.eq_ignore_ascii_case(name))
    }

    /// Whether this is an eligible text run.
    pub fn is_eligible_text(&self) -> bool {
        matches!(self.kind, RecordKind::Text { eligible: true, .. })
    }
}

/// Split `source` into records.
pub fn tokenize(source: &str) -> Vec<Record> {
    let bytes = source.as_bytes();
    let mut records = Vec::new();
    let mut text_start: Option<usize> = None;
    let mut literal_depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' {
            if let Some((kind, end)) = scan_markup(source, i) {
                flush_text(&mut records, &mut text_start, i, literal_depth == 0);

                let mut raw_text_of = None;
                match &kind {
                    RecordKind::StartTag(tag) if !tag.self_closing => {
                        let lower = tag.name.to_ascii_lowercase();
                        if LITERAL_ELEMENTS.contains(&lower.as_str()) {
                            literal_depth += 1;
                        } else if RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
                            raw_text_of = Some(lower);
                        }
                    }
                    RecordKind::EndTag(name) if LITERAL_ELEMENTS.contains(&name.as_str()) => {
                        literal_depth = literal_depth.saturating_sub(1);
                    }
                    _ => {}
                }
                records.push(Record { kind, span: i..end });
                i = end;

                if let Some(name) = raw_text_of {
                    let close = find_close_tag(source, i, &name);
                    if close > i {
                        records.push(Record {
                            kind: RecordKind::Text {
                                eligible: false,
                                cuts: Vec::new(),
                            },
                            span: i..close,
                        });
                    }
                    i = close;
                }
                continue;
            }
        }
        if text_start.is_none() {
            text_start = Some(i);
        }
        i += 1;
    }
    flush_text(&mut records, &mut text_start, bytes.len(), literal_depth == 0);
    records
}

/// Serialize records back into HTML.
pub fn render(source: &str, records: &[Record]) -> String {
    let mut out = String::with_capacity(source.len());
    for record in records {
        match &record.kind {
            RecordKind::StartTag(tag) if tag.is_dirty() => out.push_str(&tag.render()),
            RecordKind::Text { cuts, .. } if !cuts.is_empty() => {
                let mut cuts = cuts.clone();
                cuts.sort_by_key(|c| c.start);
                let mut pos = record.span.start;
                for cut in cuts {
                    out.push_str(&source[pos..cut.start]);
                    pos = cut.end;
                }
                out.push_str(&source[pos..record.span.end]);
            }
            _ => out.push_str(&source[record.span.clone()]),
        }
    }
    out
}

/// Decode the entities rendered markdown text may contain.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    const ENTITIES: &[(&str, &str)] = &[
        ("&quot;", "\""),
        ("&#34;", "\""),
        ("&#39;", "'"),
        ("&#x27;", "'"),
        ("&apos;", "'"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&amp;", "&"),
    ];
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, decoded)) => {
                out.push_str(decoded);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn flush_text(records: &mut Vec<Record>, start: &mut Option<usize>, end: usize, eligible: bool) {
    if let Some(begin) = start.take() {
        records.push(Record {
            kind: RecordKind::Text {
                eligible,
                cuts: Vec::new(),
            },
            span: begin..end,
        });
    }
}

/// Try to read one piece of markup starting at the `<` at `i`.
///
/// Returns `None` when the `<` does not start well-formed markup; it is then
/// ordinary text.
fn scan_markup(source: &str, i: usize) -> Option<(RecordKind, usize)> {
    let rest = &source[i..];
    let bytes = rest.as_bytes();

    if rest.starts_with("<!--") {
        let end = rest[4..]
            .find("-->")
            .map_or(source.len(), |p| i + 4 + p + 3);
        return Some((RecordKind::Markup, end));
    }
    if rest.starts_with("<!") || rest.starts_with("<?") {
        let end = rest.find('>')?;
        return Some((RecordKind::Markup, i + end + 1));
    }
    if rest.starts_with("</") {
        let name_len = bytes[2..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-')
            .count();
        if name_len == 0 {
            return None;
        }
        let name = rest[2..2 + name_len].to_ascii_lowercase();
        let end = rest[2 + name_len..].find('>')?;
        return Some((RecordKind::EndTag(name), i + 2 + name_len + end + 1));
    }
    if bytes.get(1).is_some_and(u8::is_ascii_alphabetic) {
        return scan_start_tag(source, i);
    }
    None
}

fn scan_start_tag(source: &str, i: usize) -> Option<(RecordKind, usize)> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let name_start = i + 1;
    let mut j = name_start;
    while j < len && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'-') {
        j += 1;
    }
    let name = source[name_start..j].to_string();
    let mut attrs = Vec::new();

    let skip_ws = |k: &mut usize| {
        while *k < len && bytes[*k].is_ascii_whitespace() {
            *k += 1;
        }
    };

    loop {
        skip_ws(&mut j);
        if j >= len {
            return None;
        }
        match bytes[j] {
            b'>' => {
                let tag = StartTag {
                    name,
                    attrs,
                    self_closing: false,
                    dirty: false,
                };
                return Some((RecordKind::StartTag(tag), j + 1));
            }
            b'/' if bytes.get(j + 1) == Some(&b'>') => {
                let tag = StartTag {
                    name,
                    attrs,
                    self_closing: true,
                    dirty: false,
                };
                return Some((RecordKind::StartTag(tag), j + 2));
            }
            b'/' | b'=' | b'"' | b'\'' => {
                j += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = j;
        while j < len && !bytes[j].is_ascii_whitespace() && !matches!(bytes[j], b'>' | b'/' | b'=')
        {
            j += 1;
        }
        let attr_name = source[attr_start..j].to_string();

        let mut k = j;
        skip_ws(&mut k);
        if k < len && bytes[k] == b'=' {
            k += 1;
            skip_ws(&mut k);
            if k >= len {
                return None;
            }
            if bytes[k] == b'"' || bytes[k] == b'\'' {
                let quote = bytes[k];
                let close = source[k + 1..].find(quote as char).map(|p| k + 1 + p)?;
                attrs.push(TagAttr {
                    name: attr_name,
                    value: Some(source[k + 1..close].to_string()),
                    quote: Some(quote as char),
                });
                j = close + 1;
            } else {
                let value_start = k;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    k += 1;
                }
                attrs.push(TagAttr {
                    name: attr_name,
                    value: Some(source[value_start..k].to_string()),
                    quote: None,
                });
                j = k;
            }
        } else {
            attrs.push(TagAttr {
                name: attr_name,
                value: None,
                quote: None,
            });
        }
    }
}

/// Position of the `</name` that closes a raw-text element, or the end of
/// the source when it is never closed.
fn find_close_tag(source: &str, from: usize, name: &str) -> usize {
    // ASCII lowercasing keeps byte offsets unchanged.
    let haystack = source[from..].to_ascii_lowercase();
    let needle = format!("</{name}");
    let mut offset = 0;
    while let Some(pos) = haystack[offset..].find(&needle) {
        let at = offset + pos;
        let after = haystack.as_bytes().get(at + needle.len());
        if after.is_none_or(|b| !b.is_ascii_alphanumeric()) {
            return from + at;
        }
        offset = at + needle.len();
    }
    source.len()
}
