//! Line sanitizer: strips printer control sequences and blank lines.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// Form feeds and ANSI/VT escape sequences (`ESC [ params letter`).
static CONTROL_SEQUENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x0c|\x1b\[[0-9;]*[a-zA-Z]").unwrap());

/// A sanitized, non-empty spool line.
///
/// `indented` is taken from the line after control sequences are removed but
/// before it is trimmed; trimming erases it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanLine {
    /// Visible text with outer whitespace trimmed.
    pub text: String,
    /// Whether the raw line began with whitespace.
    pub indented: bool,
}

impl CleanLine {
    /// Whitespace-separated fields of the line.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}

/// Decode raw bytes as UTF-8, dropping invalid sequences rather than
/// replacing them.
pub fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Remove control sequences from a single raw line.
///
/// Removal repeats until nothing matches, since deleting a form feed or an
/// escape nested inside another `ESC[` sequence can rejoin the outer one.
pub fn strip_controls(raw: &str) -> Cow<'_, str> {
    if !CONTROL_SEQUENCES.is_match(raw) {
        return Cow::Borrowed(raw);
    }

    let mut text = raw.to_string();
    while CONTROL_SEQUENCES.is_match(&text) {
        text = CONTROL_SEQUENCES.replace_all(&text, "").into_owned();
    }
    Cow::Owned(text)
}

/// Split text into lines the way a universal-newline reader does: `\r\n`,
/// a lone `\r`, and `\n` all end a line. Terminators are not kept and a
/// trailing terminator does not start an extra line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.find(['\r', '\n']) {
            Some(end) => {
                lines.push(&rest[..end]);
                let width = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + width..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }

    lines
}

/// Sanitize one raw line; `None` when nothing visible remains.
pub fn sanitize_line(raw: &str) -> Option<CleanLine> {
    let stripped = strip_controls(raw);
    let indented = stripped.starts_with(char::is_whitespace);
    let text = stripped.trim();

    if text.is_empty() {
        return None;
    }

    Some(CleanLine {
        text: text.to_string(),
        indented,
    })
}

/// Sanitize the full text of a spool file, keeping non-empty lines in order.
pub fn sanitize(raw: &str) -> Vec<CleanLine> {
    split_lines(raw).into_iter().filter_map(sanitize_line).collect()
}
