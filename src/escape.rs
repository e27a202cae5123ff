//! The ROW escape grammar.
//!
//! Every field token on the wire is passed through this transform so that
//! tabs, newlines and comment markers inside values never collide with the
//! line structure:
//!
//! | Wire | Raw |
//! |------|-----|
//! | `\N` | null |
//! | `\t` | TAB |
//! | `\n` | NEWLINE |
//! | `\#` | `#` |
//! | `\\` | `\` |
//!
//! Both directions are single-pass, so no replacement result is ever
//! rescanned and `unescape(escape(s)) == s` holds for every string.
//!
//! ```rust
//! use row_format::escape::{escape, unescape};
//!
//! let raw = "a#b\tc\\d";
//! let wire = escape(Some(raw));
//! assert_eq!(wire, "a\\#b\\tc\\\\d");
//! assert_eq!(unescape(&wire).as_deref(), Some(raw));
//!
//! assert_eq!(escape(None), "\\N");
//! assert_eq!(unescape("\\N"), None);
//! ```

use std::borrow::Cow;

/// The wire token for a null value.
pub const NULL_TOKEN: &str = "\\N";

/// Escapes a raw value into its wire token.
#[must_use]
pub fn escape(value: Option<&str>) -> Cow<'_, str> {
    let Some(s) = value else {
        return Cow::Borrowed(NULL_TOKEN);
    };
    if !s.contains(['\t', '\n', '#', '\\']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '#' => out.push_str("\\#"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Unescapes a wire token; `\N` yields `None`.
///
/// A backslash followed by anything other than `t`, `n`, `#` or `\` is kept
/// verbatim, as is a trailing lone backslash.
#[must_use]
pub fn unescape(token: &str) -> Option<Cow<'_, str>> {
    if token == NULL_TOKEN {
        return None;
    }
    if !token.contains('\\') {
        return Some(Cow::Borrowed(token));
    }

    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('#') => out.push('#'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Some(Cow::Owned(out))
}
