//! Catalog naming grammar enforcement.
//!
//! Portal identifiers are free-form; catalog names and tags are not. Every character outside the target's allow-list becomes `-`, runs of
//! `-` collapse to one, and output stops growing at [`MAX_LEN`] characters.
//! Case is preserved.

/// Longest sanitized value, one below the catalog's 63-character limit.
pub const MAX_LEN: usize = 62;

/// Which catalog field a value is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeTarget {
    /// `[a-z0-9:+#-]`
    Tag,
    /// `[a-zA-Z0-9-_.]`
    Name,
}

impl SanitizeTarget {
    const fn allows(self, ch: char) -> bool {
        match self {
            Self::Tag => matches!(ch, 'a'..='z' | '0'..='9' | ':' | '+' | '#' | '-'),
            Self::Name => ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'),
        }
    }
}

/// Rewrite `value` into the grammar of `target`. Idempotent.
#[must_use]
pub fn sanitize(target: SanitizeTarget, value: &str) -> String {
    let mut out = String::with_capacity(value.len().min(MAX_LEN));
    for ch in value.chars() {
        if out.len() >= MAX_LEN {
            break;
        }
        let ch = if target.allows(ch) { ch } else { '-' };
        if ch == '-' && out.ends_with('-') {
            continue;
        }
        out.push(ch);
    }
    out
}
