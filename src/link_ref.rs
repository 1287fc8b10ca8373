//! Link reference definitions (CommonMark).
//!
//! Definitions are recognized by the block parser at the front of a
//! paragraph's accumulated text, stored once per document and consulted
//! read-only by the inline parser.

use rustc_hash::FxHashMap;

use crate::escape::unescape_string;
use crate::inline::links::{scan_link_destination, scan_link_label, scan_link_title, skip_spnl};

/// A link reference definition (destination + optional title), unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRefDef {
    pub dest: String,
    pub title: Option<String>,
}

/// Store of link reference definitions, keyed by normalized label.
#[derive(Debug, Default, Clone)]
pub struct LinkRefStore {
    by_label: FxHashMap<String, LinkRefDef>,
}

impl LinkRefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition if the label is new. First definition wins.
    pub fn insert(&mut self, label: String, def: LinkRefDef) -> bool {
        if self.by_label.contains_key(&label) {
            return false;
        }
        self.by_label.insert(label, def);
        true
    }

    /// Look up by an already normalized label.
    pub fn get(&self, label: &str) -> Option<&LinkRefDef> {
        self.by_label.get(label)
    }

    /// Look up by the raw text between a label's brackets.
    pub fn lookup(&self, raw_label: &str) -> Option<&LinkRefDef> {
        let key = normalize_label(raw_label);
        if key.is_empty() {
            return None;
        }
        self.by_label.get(&key)
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkRefDef)> {
        self.by_label.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Normalize a link label per CommonMark: trim, collapse internal whitespace
/// to single spaces, and case-fold.
///
/// Backslash escapes and entities are not processed, so `[foo\!]` and
/// `[foo!]` are different labels.
pub fn normalize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut last_was_space = true;

    for ch in label.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }

        last_was_space = false;
        if ch == 'ß' || ch == 'ẞ' {
            out.push_str("ss");
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// A definition parsed off the front of some text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDef {
    /// Normalized label.
    pub label: String,
    pub def: LinkRefDef,
    /// Bytes consumed, including the terminating line ending.
    pub consumed: usize,
}

/// Try to parse one link reference definition at the start of `text`.
///
/// `text` is paragraph content: lines joined with `\n`, leading indentation
/// already stripped.
pub fn parse_link_ref_def(text: &[u8]) -> Option<ParsedDef> {
    let label_end = scan_link_label(text, 0)?;
    let raw_label = std::str::from_utf8(&text[1..label_end - 1]).ok()?;
    let label = normalize_label(raw_label);
    if label.is_empty() || text.get(label_end) != Some(&b':') {
        return None;
    }

    let pos = skip_spnl(text, label_end + 1);
    let (after_dest, raw_dest) = scan_link_destination(text, pos)?;
    if after_dest == pos {
        return None;
    }
    let dest = unescape_string(raw_dest);

    let before_title = after_dest;
    let title_start = skip_spnl(text, before_title);
    if title_start > before_title {
        if let Some((after_title, raw_title)) = scan_link_title(text, title_start) {
            if let Some(end) = line_end_after(text, after_title) {
                return Some(ParsedDef {
                    label,
                    def: LinkRefDef {
                        dest,
                        title: Some(unescape_string(raw_title)),
                    },
                    consumed: end,
                });
            }
        }
    }

    // No title, or trailing garbage after it: the definition may still end
    // right after the destination.
    let end = line_end_after(text, before_title)?;
    Some(ParsedDef {
        label,
        def: LinkRefDef { dest, title: None },
        consumed: end,
    })
}

/// Skip trailing spaces; the line must end there. Returns the position after
/// the line ending.
fn line_end_after(text: &[u8], mut pos: usize) -> Option<usize> {
    while pos < text.len() && matches!(text[pos], b' ' | b'\t') {
        pos += 1;
    }
    match text.get(pos) {
        None => Some(pos),
        Some(b'\n') => Some(pos + 1),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Foo \n  BAR "), "foo bar");
        assert_eq!(normalize_label("ẞ"), "ss");
        assert_eq!(normalize_label("Straße"), "strasse");
        assert_eq!(normalize_label(" \t"), "");
    }

    #[test]
    fn test_first_definition_wins() {
        let mut store = LinkRefStore::new();
        let first = LinkRefDef {
            dest: "/first".into(),
            title: None,
        };
        assert!(store.insert("foo".into(), first.clone()));
        assert!(!store.insert(
            "foo".into(),
            LinkRefDef {
                dest: "/second".into(),
                title: None
            }
        ));
        assert_eq!(store.lookup("FOO"), Some(&first));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_parse_full_definition() {
        let parsed = parse_link_ref_def(b"[Foo]: /url \"title\"\nrest").unwrap();
        assert_eq!(parsed.label, "foo");
        assert_eq!(parsed.def.dest, "/url");
        assert_eq!(parsed.def.title.as_deref(), Some("title"));
        assert_eq!(parsed.consumed, 20);
    }

    #[test]
    fn test_parse_multiline_title() {
        let parsed = parse_link_ref_def(b"[foo]:\n/url\n'the title'").unwrap();
        assert_eq!(parsed.def.dest, "/url");
        assert_eq!(parsed.def.title.as_deref(), Some("the title"));
    }

    #[test]
    fn test_title_on_next_line_may_be_dropped() {
        // The title line is not a valid title, so the definition ends
        // after the destination and the rest stays paragraph text.
        let parsed = parse_link_ref_def(b"[foo]: /url\n\"title\" ok").unwrap();
        assert_eq!(parsed.def.title, None);
        assert_eq!(parsed.consumed, 12);
    }

    #[test]
    fn test_reject_garbage() {
        assert!(parse_link_ref_def(b"[foo]: /url \"title\" ok").is_none());
        assert!(parse_link_ref_def(b"[foo]:").is_none());
        assert!(parse_link_ref_def(b"[]: /url").is_none());
        assert!(parse_link_ref_def(b"[foo] /url").is_none());
    }

    #[test]
    fn test_angle_destination_may_be_empty() {
        let parsed = parse_link_ref_def(b"[foo]: <>").unwrap();
        assert_eq!(parsed.def.dest, "");
    }
}
