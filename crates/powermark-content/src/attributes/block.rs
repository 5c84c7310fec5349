//! Attribute block syntax.
//!
//! A block is the text between `{` and the first `}` after it. Its contents
//! are split on whitespace, except inside single or double quotes, and each
//! token is classified:
//!
//! | Token | Effect |
//! |---|---|
//! | `#name` | sets the id (last one wins) |
//! | `.name` | appends a class |
//! | `key=value`, `key="a b"` | sets a named attribute |
//! | anything else | appended as a class |
//!
//! `id=` and `class=` tokens are folded into the id and class list.

use std::ops::Range;

/// One `{...}` marker found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBlock {
    /// Byte span of the whole marker, braces included.
    pub span: Range<usize>,
    /// Text between the braces.
    pub raw: String,
}

/// Locate every attribute block in `text`, left to right.
///
/// The first `}` after an opening `{` closes the block; there is no nesting,
/// so `{a {b}` is a single block with raw text `a {b`.
pub fn find_blocks(text: &str) -> Vec<AttributeBlock> {
    let mut blocks = Vec::new();
    let mut from = 0;
    while let Some(open) = text[from..].find('{').map(|p| from + p) {
        let Some(close) = text[open + 1..].find('}').map(|p| open + 1 + p) else {
            break;
        };
        blocks.push(AttributeBlock {
            span: open..close + 1,
            raw: text[open + 1..close].to_string(),
        });
        from = close + 1;
    }
    blocks
}

/// Resolved contents of one attribute block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    /// Element id, if any token set one.
    pub id: Option<String>,
    /// Class names in the order they appeared.
    pub classes: Vec<String>,
    /// Other attributes in first-appearance order; a repeated key keeps
    /// its first position and its last value.
    pub attributes: Vec<(String, String)>,
}

impl AttributeSet {
    /// Whether the block contributed nothing.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }

    /// Value of a named attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn set(&mut self, key: &str, value: String) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }
}

/// Split block contents into tokens, keeping quoted spans together.
///
/// Quotes stay in the returned tokens; a backslash-escaped quote does not
/// close a quoted span. Typographic quotes (`“…”`, `‘…’`) count as quotes
/// so that blocks survive smart punctuation.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut closing: Option<char> = None;
    let mut escaped = false;

    for ch in raw.chars() {
        if let Some(close) = closing {
            current.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == close {
                closing = None;
            }
            continue;
        }
        if ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        closing = closing_quote(ch);
        current.push(ch);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Parse block contents into an [`AttributeSet`].
///
/// Never fails: contents with no usable tokens give an empty set.
pub fn parse_block(raw: &str) -> AttributeSet {
    let mut set = AttributeSet::default();
    for token in tokenize(raw) {
        if let Some(id) = token.strip_prefix('#') {
            if !id.is_empty() {
                set.id = Some(unquote(id));
            }
        } else if let Some(class) = token.strip_prefix('.') {
            if !class.is_empty() {
                set.classes.push(unquote(class));
            }
        } else if let Some((key, value)) = split_key_value(&token) {
            let value = unquote(value);
            match key {
                "id" => set.id = Some(value),
                "class" => set
                    .classes
                    .extend(value.split_whitespace().map(str::to_string)),
                _ => set.set(key, value),
            }
        } else {
            set.classes.push(unquote(&token));
        }
    }
    set
}

fn split_key_value(token: &str) -> Option<(&str, &str)> {
    let (key, value) = token.split_once('=')?;
    let starts_quoted = key.chars().next().and_then(closing_quote).is_some();
    if key.is_empty() || starts_quoted {
        return None;
    }
    Some((key, value))
}

fn closing_quote(open: char) -> Option<char> {
    match open {
        '"' => Some('"'),
        '\'' => Some('\''),
        '\u{201C}' => Some('\u{201D}'),
        '\u{2018}' => Some('\u{2019}'),
        _ => None,
    }
}

/// Strip one pair of surrounding quotes and unescape quotes inside them.
fn unquote(value: &str) -> String {
    let mut chars = value.chars();
    let Some(open) = chars.next() else {
        return String::new();
    };
    let Some(close) = closing_quote(open) else {
        return value.to_string();
    };
    let inner = &value[open.len_utf8()..];
    let inner = inner.strip_suffix(close).unwrap_or(inner);

    let mut out = String::with_capacity(inner.len());
    let mut iter = inner.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\\' && iter.peek().is_some_and(|next| *next == close || *next == open) {
            if let Some(next) = iter.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}
