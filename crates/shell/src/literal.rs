//! POSIX shell quoting

/// Quote `token` so a POSIX shell passes it through as one literal word.
///
/// Tokens made only of characters that never need escaping are returned
/// unchanged; everything else is wrapped in single quotes with embedded
/// single quotes spelled as `'\''`.
#[must_use]
pub fn quote(token: &str) -> String {
    if !token.is_empty() && token.chars().all(is_plain) {
        return token.to_string();
    }
    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('\'');
    for c in token.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | ',' | '+' | '@')
}
