//! HTML block start and end conditions (CommonMark kinds 1-7).

use crate::inline::html::{scan_closing_tag, scan_open_tag};

/// Block-level tag names for start condition 6.
static KIND6_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "section", "source",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

static KIND1_TAGS: &[&str] = &["pre", "script", "style", "textarea"];

fn tag_name_at(line: &[u8], start: usize) -> &[u8] {
    let mut end = start;
    while end < line.len() && (line[end].is_ascii_alphanumeric() || line[end] == b'-') {
        end += 1;
    }
    &line[start..end]
}

fn eq_ignore_case(a: &[u8], b: &str) -> bool {
    a.eq_ignore_ascii_case(b.as_bytes())
}

/// Which kind of HTML block `line` (indentation already stripped) starts,
/// if any. Kind 7 cannot interrupt a paragraph.
pub fn start_kind(line: &[u8], interrupts_paragraph: bool) -> Option<u8> {
    if line.first() != Some(&b'<') {
        return None;
    }

    let name = tag_name_at(line, 1);
    let after = line.get(1 + name.len()).copied();
    if KIND1_TAGS.iter().any(|t| eq_ignore_case(name, t))
        && matches!(after, None | Some(b' ' | b'\t' | b'>' | b'\n'))
    {
        return Some(1);
    }
    if line.starts_with(b"<!--") {
        return Some(2);
    }
    if line.starts_with(b"<?") {
        return Some(3);
    }
    if line.len() > 2 && line[1] == b'!' && line[2].is_ascii_alphabetic() {
        return Some(4);
    }
    if line.starts_with(b"<![CDATA[") {
        return Some(5);
    }

    let name_start = if line.get(1) == Some(&b'/') { 2 } else { 1 };
    let name = tag_name_at(line, name_start);
    let rest = &line[name_start + name.len()..];
    let boundary = rest.is_empty()
        || matches!(rest[0], b' ' | b'\t' | b'\n' | b'>')
        || rest.starts_with(b"/>");
    if boundary && KIND6_TAGS.iter().any(|t| eq_ignore_case(name, t)) {
        return Some(6);
    }

    if interrupts_paragraph {
        return None;
    }
    let end = scan_open_tag(line, 0).or_else(|| scan_closing_tag(line, 0))?;
    let only_ws_after = line[end..].iter().all(|&b| matches!(b, b' ' | b'\t'));
    let is_kind1 = KIND1_TAGS.iter().any(|t| eq_ignore_case(name, t));
    (only_ws_after && !is_kind1).then_some(7)
}

fn contains_ignore_case(line: &[u8], needle: &str) -> bool {
    let needle = needle.as_bytes();
    line.windows(needle.len()).any(|w| w.eq_ignore_ascii_case(needle))
}

/// Whether `line` satisfies the end condition of a block of `kind`.
/// Kinds 6 and 7 end at a blank line, which the caller detects.
pub fn ends_on(kind: u8, line: &[u8]) -> bool {
    match kind {
        1 => KIND1_TAGS
            .iter()
            .any(|t| contains_ignore_case(line, &format!("</{t}>"))),
        2 => contains_ignore_case(line, "-->"),
        3 => contains_ignore_case(line, "?>"),
        4 => line.contains(&b'>'),
        5 => contains_ignore_case(line, "]]>"),
        _ => false,
    }
}
