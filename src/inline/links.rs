//! Link syntax scanners.
//!
//! Handles the pieces shared by inline links, reference links and link
//! reference definitions:
//! - Labels: `[foo *bar*]`
//! - Destinations: `<with spaces>` or `bare(balanced)`
//! - Titles: `"..."`, `'...'`, `(...)`
//! - Autolinks: `<https://example.com>` and `<email@example.com>`
//!
//! All scanners take a byte position and return the position just past the
//! construct, or `None` without side effects.

use crate::escape::unescape_string;
use crate::limits;

/// Destination and title of an inline link, both unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub dest: String,
    pub title: Option<String>,
    /// Position just past the closing `)`.
    pub end: usize,
}

/// A recognized autolink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autolink {
    /// Text between the angle brackets.
    pub content: String,
    pub is_email: bool,
    /// Position just past the `>`.
    pub end: usize,
}

/// Skip spaces and tabs, at most one line ending, then spaces and tabs.
pub fn skip_spnl(text: &[u8], mut pos: usize) -> usize {
    while pos < text.len() && matches!(text[pos], b' ' | b'\t') {
        pos += 1;
    }
    if pos < text.len() && text[pos] == b'\n' {
        pos += 1;
        while pos < text.len() && matches!(text[pos], b' ' | b'\t') {
            pos += 1;
        }
    }
    pos
}

/// Scan a link label starting at `[`. Returns the position after `]`.
///
/// Unescaped `[` inside a label is not allowed; the content may hold at
/// most 999 characters.
pub fn scan_link_label(text: &[u8], start: usize) -> Option<usize> {
    if text.get(start) != Some(&b'[') {
        return None;
    }
    let mut pos = start + 1;
    while pos < text.len() {
        match text[pos] {
            b'\\' if pos + 1 < text.len() => pos += 2,
            b'[' => return None,
            b']' => {
                return (pos - start - 1 <= limits::MAX_LINK_LABEL_LEN).then_some(pos + 1);
            }
            _ => pos += 1,
        }
        if pos - start > limits::MAX_LINK_LABEL_LEN + 1 {
            return None;
        }
    }
    None
}

/// Scan a link destination. Returns `(end, raw)` where `raw` still carries
/// backslash escapes and entities.
///
/// A bare destination may be empty only when directly followed by `)`.
pub fn scan_link_destination(text: &[u8], start: usize) -> Option<(usize, &[u8])> {
    if text.get(start) == Some(&b'<') {
        let mut pos = start + 1;
        while pos < text.len() {
            match text[pos] {
                b'\\' if pos + 1 < text.len() => pos += 2,
                b'\n' | b'<' => return None,
                b'>' => return Some((pos + 1, &text[start + 1..pos])),
                _ => pos += 1,
            }
        }
        return None;
    }

    let mut pos = start;
    let mut depth = 0usize;
    while pos < text.len() {
        let b = text[pos];
        match b {
            b'\\' if pos + 1 < text.len() && text[pos + 1].is_ascii_punctuation() => pos += 2,
            b'(' => {
                depth += 1;
                if depth > limits::MAX_LINK_PAREN_DEPTH {
                    return None;
                }
                pos += 1;
            }
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                pos += 1;
            }
            _ if b <= b' ' || b == 0x7f => break,
            _ => pos += 1,
        }
    }
    if depth != 0 || (pos == start && text.get(pos) != Some(&b')')) {
        return None;
    }
    Some((pos, &text[start..pos]))
}

/// Scan a link title. Returns `(end, raw)` with the delimiters stripped.
pub fn scan_link_title(text: &[u8], start: usize) -> Option<(usize, &[u8])> {
    let close = match text.get(start)? {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    let mut pos = start + 1;
    while pos < text.len() {
        let b = text[pos];
        if b == b'\\' && pos + 1 < text.len() {
            pos += 2;
        } else if b == close {
            return Some((pos + 1, &text[start + 1..pos]));
        } else if close == b')' && b == b'(' {
            return None;
        } else {
            pos += 1;
        }
    }
    None
}

/// Scan the `(dest "title")` part of an inline link, starting at `(`.
pub fn scan_inline_link(text: &[u8], start: usize) -> Option<LinkTarget> {
    if text.get(start) != Some(&b'(') {
        return None;
    }
    let pos = skip_spnl(text, start + 1);
    let (after_dest, raw_dest) = scan_link_destination(text, pos)?;
    let mut pos = skip_spnl(text, after_dest);

    let mut title = None;
    // A title must be separated from the destination by whitespace.
    if pos > after_dest {
        if let Some((after_title, raw_title)) = scan_link_title(text, pos) {
            title = Some(unescape_string(raw_title));
            pos = skip_spnl(text, after_title);
        }
    }

    if text.get(pos) != Some(&b')') {
        return None;
    }
    Some(LinkTarget {
        dest: unescape_string(raw_dest),
        title,
        end: pos + 1,
    })
}

/// Try to parse an autolink at `<`.
pub fn scan_autolink(text: &[u8], start: usize) -> Option<Autolink> {
    if text.get(start) != Some(&b'<') {
        return None;
    }
    let content_start = start + 1;
    let mut pos = content_start;
    while pos < text.len() && text[pos] != b'>' {
        if text[pos] <= b' ' || text[pos] == b'<' {
            return None;
        }
        pos += 1;
    }
    if pos >= text.len() {
        return None;
    }
    let content = &text[content_start..pos];
    let is_email = if is_uri_autolink(content) {
        false
    } else if is_email_autolink(content) {
        true
    } else {
        return None;
    };
    Some(Autolink {
        content: String::from_utf8_lossy(content).into_owned(),
        is_email,
        end: pos + 1,
    })
}

/// Scheme of 2-32 characters (letter first, then letters, digits, `+.-`),
/// a colon, then anything but whitespace and angle brackets.
fn is_uri_autolink(content: &[u8]) -> bool {
    let Some(colon) = content.iter().position(|&b| b == b':') else {
        return false;
    };
    let scheme = &content[..colon];
    (2..=32).contains(&scheme.len())
        && scheme[0].is_ascii_alphabetic()
        && scheme[1..]
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'.' | b'-'))
}

fn is_email_autolink(content: &[u8]) -> bool {
    let Some(at) = content.iter().position(|&b| b == b'@') else {
        return false;
    };
    let (local, domain) = (&content[..at], &content[at + 1..]);
    let local_valid = !local.is_empty()
        && local
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || b".!#$%&'*+/=?^_`{|}~-".contains(&b));
    local_valid && !domain.is_empty() && domain.split(|&b| b == b'.').all(is_domain_label)
}

fn is_domain_label(label: &[u8]) -> bool {
    (1..=63).contains(&label.len())
        && label[0].is_ascii_alphanumeric()
        && label[label.len() - 1].is_ascii_alphanumeric()
        && label.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'-')
}
