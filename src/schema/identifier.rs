//! Column identifier legality
//!
//! Names made only of ASCII letters, digits, `_` and `$` (and not purely
//! digits) are used as they are. Anything else is quoted with backticks,
//! doubling any backtick inside, which keeps the mapping injective and
//! stable across documents.

use once_cell::sync::Lazy;
use regex::Regex;

static PLAIN_IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_$]+$").unwrap()
});

/// Map a path-derived name to a legal relational identifier
pub fn sanitize_identifier(text: &str) -> String {
    if is_plain_identifier(text) {
        return text.to_string();
    }

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('`');
    for c in text.chars() {
        if c == '`' {
            quoted.push('`');
        }
        quoted.push(c);
    }
    quoted.push('`');
    quoted
}

fn is_plain_identifier(text: &str) -> bool {
    PLAIN_IDENTIFIER_REGEX.is_match(text) && !text.bytes().all(|b| b.is_ascii_digit())
}
