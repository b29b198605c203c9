//! Locating SQL statements embedded in application log lines.

/// Marker that precedes the logged statement.
pub const SQL_INFO_MARKER: &str = r#""sql_INFO":""#;

/// Pull the statement that follows [`SQL_INFO_MARKER`] out of a log line and unescape it.
///
/// The statement ends at the first `"` after the marker, escaped or not, so a quoted literal
/// cuts it short. Lines without the marker, unterminated statements and empty statements
/// yield `None`.
pub fn extract_embedded_sql(line: &str) -> Option<String> {
    extract_embedded_sql_with(line, SQL_INFO_MARKER, false)
}

/// Same as [`extract_embedded_sql`] with a caller-provided marker. With `escaped_quotes` set,
/// `\"` no longer ends the statement and only an unescaped `"` does.
pub fn extract_embedded_sql_with(line: &str, marker: &str, escaped_quotes: bool) -> Option<String> {
    let start = line.find(marker)? + marker.len();
    let rest = line.get(start..)?;
    let end = if escaped_quotes { unescaped_quote(rest)? } else { rest.find('"')? };
    if end == 0 {
        return None;
    }
    Some(unescape_sql(&rest[..end]))
}

/// Byte index of the first `"` not preceded by an escaping backslash.
fn unescaped_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, b) in s.bytes().enumerate() {
        match b {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b'"' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Undo log escaping: `\"` becomes `"`, then `\\` becomes `\`.
pub fn unescape_sql(s: &str) -> String {
    s.replace(r#"\""#, "\"").replace(r"\\", r"\")
}
