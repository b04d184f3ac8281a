//! Comment stripping for JSON-with-comments config files.
//!
//! Two comment forms are recognised:
//! - `/* ... */` block comments, which may span lines.
//! - `//` line comments running to the end of the line. A `//` directly after
//!   a `:` is not a comment, so `"http://localhost:3000"` survives intact.
//!
//! Comment markers are not recognised as string-aware tokens; the colon rule
//! is the only escape hatch.

/// Remove all comments from `text`, leaving every other byte untouched.
///
/// An unterminated `/*` is kept as-is. Line comments stop before the line
/// terminator, so line structure is preserved. Removing a comment can join
/// the bytes around it into a new marker (`:/` + `/*c*/` + `*x*/`), so passes
/// repeat until nothing changes; applying the function to its own output is
/// a no-op.
///
/// # Example
///
/// ```
/// use ba_core::config::strip_comments;
///
/// let text = r#"{ "route": "http://localhost:3000", // where to look
///   /* the port */ "port": 4242 }"#;
/// let stripped = strip_comments(text);
/// assert!(stripped.contains("http://localhost:3000"));
/// assert!(!stripped.contains("where to look"));
/// assert!(!stripped.contains("the port"));
/// ```
pub fn strip_comments(text: &str) -> String {
    let mut current = strip_pass(text);
    loop {
        let next = strip_pass(&current);
        // Every pass that changes the text makes it shorter.
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

fn strip_pass(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut kept_from = 0;
    let mut i = 0;

    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                let Some(close) = text[i + 2..].find("*/") else {
                    break;
                };
                out.push_str(&text[kept_from..i]);
                i += 2 + close + 2;
                kept_from = i;
            }
            (b'/', b'/') if i == 0 || bytes[i - 1] != b':' => {
                out.push_str(&text[kept_from..i]);
                i = text[i..]
                    .find(|c| c == '\n' || c == '\r')
                    .map_or(bytes.len(), |offset| i + offset);
                kept_from = i;
            }
            _ => i += 1,
        }
    }

    out.push_str(&text[kept_from..]);
    out
}
