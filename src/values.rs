//! Helpers for raw CSS value text.
//!
//! Declaration values are kept exactly as written in the stylesheet, so
//! everything downstream works on text: splitting lists at the top level,
//! removing one layer of quotes, and recognizing `data:` URIs.

/// Remove one matching pair of surrounding quotes.
///
/// Only strips when the quotes enclose at least one character and the
/// interior is on a single line:
/// - `'Font A'` → `Font A`
/// - `"Font A"` → `Font A`
/// - `'Font A"` → unchanged
/// - `''` → unchanged
pub fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() < 3 {
        return value;
    }
    let first = bytes[0];
    if (first != b'\'' && first != b'"') || bytes[bytes.len() - 1] != first {
        return value;
    }
    let interior = &value[1..value.len() - 1];
    if interior.contains(['\n', '\r']) {
        return value;
    }
    interior
}

/// Returns true if the value is a `data:` URI (case-insensitive, surrounding
/// whitespace ignored).
pub fn is_data_uri(value: &str) -> bool {
    value.trim().to_lowercase().starts_with("data:")
}

/// Split a value on top-level commas.
///
/// Commas inside quotes or parentheses do not split. A trailing empty
/// segment is kept, so `"a,"` yields `["a", ""]`.
pub fn comma_list(value: &str) -> Vec<&str> {
    split_list(value, &[','], true)
}

/// Split a value on top-level whitespace.
///
/// Quoted strings and parenthesized groups stay whole, so
/// `bold 12px 'Open Sans'` yields `["bold", "12px", "'Open Sans'"]`.
pub fn space_list(value: &str) -> Vec<&str> {
    split_list(value, &[' ', '\n', '\t'], false)
}

fn split_list<'a>(value: &'a str, separators: &[char], keep_last: bool) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (pos, ch) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            _ if quote.is_some() => {
                if quote == Some(ch) {
                    quote = None;
                }
            }
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 && separators.contains(&ch) => {
                if start < pos {
                    parts.push(value[start..pos].trim());
                }
                start = pos + ch.len_utf8();
            }
            _ => {}
        }
    }

    if keep_last || start < value.len() {
        parts.push(value[start..].trim());
    }
    parts
}
