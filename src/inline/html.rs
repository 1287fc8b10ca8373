//! Raw HTML grammar.
//!
//! Recognizes the constructs CommonMark passes through verbatim: open and
//! closing tags, comments, processing instructions, declarations and CDATA
//! sections. Used inline and by HTML block start condition 7.

#[inline]
fn is_tag_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n')
}

fn skip_ws(text: &[u8], mut pos: usize) -> usize {
    while pos < text.len() && is_tag_ws(text[pos]) {
        pos += 1;
    }
    pos
}

fn find(text: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > text.len() {
        return None;
    }
    text[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

/// Tag name: ASCII letter, then letters, digits and `-`.
fn scan_tag_name(text: &[u8], start: usize) -> Option<usize> {
    if !text.get(start)?.is_ascii_alphabetic() {
        return None;
    }
    let mut pos = start + 1;
    while pos < text.len() && (text[pos].is_ascii_alphanumeric() || text[pos] == b'-') {
        pos += 1;
    }
    Some(pos)
}

fn scan_attribute_name(text: &[u8], start: usize) -> Option<usize> {
    let first = *text.get(start)?;
    if !(first.is_ascii_alphabetic() || first == b'_' || first == b':') {
        return None;
    }
    let mut pos = start + 1;
    while pos < text.len()
        && (text[pos].is_ascii_alphanumeric() || matches!(text[pos], b'_' | b'.' | b':' | b'-'))
    {
        pos += 1;
    }
    Some(pos)
}

fn scan_attribute_value(text: &[u8], start: usize) -> Option<usize> {
    match *text.get(start)? {
        quote @ (b'"' | b'\'') => {
            let close = text[start + 1..].iter().position(|&b| b == quote)?;
            Some(start + 1 + close + 1)
        }
        _ => {
            let mut pos = start;
            while pos < text.len()
                && !is_tag_ws(text[pos])
                && !matches!(text[pos], b'"' | b'\'' | b'=' | b'<' | b'>' | b'`')
            {
                pos += 1;
            }
            (pos > start).then_some(pos)
        }
    }
}

/// `<name attr="v" ...>` or `<name/>`. Returns the position after `>`.
pub fn scan_open_tag(text: &[u8], start: usize) -> Option<usize> {
    if text.get(start) != Some(&b'<') {
        return None;
    }
    let mut pos = scan_tag_name(text, start + 1)?;
    loop {
        let after_ws = skip_ws(text, pos);
        if after_ws > pos {
            if let Some(name_end) = scan_attribute_name(text, after_ws) {
                pos = name_end;
                let eq = skip_ws(text, pos);
                if text.get(eq) == Some(&b'=') {
                    pos = scan_attribute_value(text, skip_ws(text, eq + 1))?;
                }
                continue;
            }
        }
        pos = after_ws;
        break;
    }
    if text.get(pos) == Some(&b'/') {
        pos += 1;
    }
    (text.get(pos) == Some(&b'>')).then_some(pos + 1)
}

/// `</name>`. Returns the position after `>`.
pub fn scan_closing_tag(text: &[u8], start: usize) -> Option<usize> {
    if text.get(start..start + 2) != Some(b"</") {
        return None;
    }
    let pos = skip_ws(text, scan_tag_name(text, start + 2)?);
    (text.get(pos) == Some(&b'>')).then_some(pos + 1)
}

fn scan_comment(text: &[u8], start: usize) -> Option<usize> {
    let body = start + 4;
    let rest = text.get(body..)?;
    if rest.starts_with(b">") || rest.starts_with(b"->") {
        return None;
    }
    let end = find(text, body, b"--")?;
    // `--` may only appear as part of the closing `-->`.
    (text.get(end + 2) == Some(&b'>')).then_some(end + 3)
}

fn scan_processing_instruction(text: &[u8], start: usize) -> Option<usize> {
    find(text, start + 2, b"?>").map(|p| p + 2)
}

fn scan_declaration(text: &[u8], start: usize) -> Option<usize> {
    if !text.get(start + 2)?.is_ascii_alphabetic() {
        return None;
    }
    find(text, start + 2, b">").map(|p| p + 1)
}

fn scan_cdata(text: &[u8], start: usize) -> Option<usize> {
    find(text, start + 9, b"]]>").map(|p| p + 3)
}

/// Any inline raw HTML construct at `start`. Returns the position after it.
pub fn scan_html(text: &[u8], start: usize) -> Option<usize> {
    let rest = text.get(start..)?;
    if rest.starts_with(b"<!--") {
        scan_comment(text, start)
    } else if rest.starts_with(b"<![CDATA[") {
        scan_cdata(text, start)
    } else if rest.starts_with(b"<!") {
        scan_declaration(text, start)
    } else if rest.starts_with(b"<?") {
        scan_processing_instruction(text, start)
    } else if rest.starts_with(b"</") {
        scan_closing_tag(text, start)
    } else {
        scan_open_tag(text, start)
    }
}
