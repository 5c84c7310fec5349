//! `literalHTML[...]` markers.
//!
//! Each marker is replaced by its payload, verbatim, before markdown
//! rendering. The payload may hold one level of balanced brackets, and
//! `\[` / `\]` stand for literal brackets. Replacement is a single pass: a
//! payload that spells out another marker is not expanded again.
//!
//! Payloads with two or more levels of unescaped nesting do not match and
//! are left in the text untouched.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Marker keyword preceding the bracketed payload.
pub const MARKER: &str = "literalHTML";

#[allow(clippy::expect_used)]
static LITERAL_HTML: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)literalHTML\[((?:\\.|\[(?:\\.|[^\[\]\\])*\]|[^\[\]\\])*)\]")
        .expect("literalHTML pattern compiles")
});

/// Replace every `literalHTML[...]` marker in `text` with its payload.
///
/// ```
/// use powermark_content::expand_literal_html;
///
/// assert_eq!(
///     expand_literal_html("a literalHTML[<br>] b"),
///     "a <br> b"
/// );
/// ```
pub fn expand_literal_html(text: &str) -> Cow<'_, str> {
    if !text.contains(MARKER) {
        return Cow::Borrowed(text);
    }
    LITERAL_HTML.replace_all(text, |caps: &Captures<'_>| unescape_brackets(&caps[1]))
}

fn unescape_brackets(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len());
    let mut chars = payload.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(&next) = chars.peek()
            && matches!(next, '[' | ']')
        {
            out.push(next);
            chars.next();
            continue;
        }
        out.push(ch);
    }
    out
}
