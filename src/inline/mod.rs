//! Inline parser for Markdown.
//!
//! A single left-to-right pass over one leaf's raw text:
//! 1. Literal text is buffered and flushed into a text node right before
//!    any construct that needs a node of its own.
//! 2. `[`, `![` and `*`/`_` runs become placeholder text nodes, tracked by
//!    the bracket stack and the delimiter stack.
//! 3. A `]` that completes a link cuts everything after its opener's
//!    placeholder out into the link's children, after resolving emphasis
//!    inside it; what is left is resolved once the scan ends.

mod code_span;
mod emphasis;
pub mod html;
pub mod links;
mod node;

pub use node::{Inline, LinkKind};

use log::trace;

use crate::escape::{decode_entity, is_ascii_punctuation};
use crate::limits::MAX_CODE_SPAN_BACKTICKS;
use crate::link_ref::{LinkRefDef, LinkRefStore};
use crate::list::{Arena, Handle, List};
use code_span::BacktickIndex;
use emphasis::Delimiter;
use links::{scan_autolink, scan_inline_link, scan_link_label};

/// Bytes that may start something other than literal text.
const SPECIAL: [bool; 256] = {
    let mut table = [false; 256];
    table[b'\n' as usize] = true;
    table[b'\\' as usize] = true;
    table[b'`' as usize] = true;
    table[b'*' as usize] = true;
    table[b'_' as usize] = true;
    table[b'[' as usize] = true;
    table[b']' as usize] = true;
    table[b'!' as usize] = true;
    table[b'<' as usize] = true;
    table[b'&' as usize] = true;
    table
};

/// An open `[` or `![` waiting for its `]`.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    /// Placeholder text node holding `[` or `![`.
    node: Handle,
    image: bool,
    /// Cleared when a link closes around it; links cannot nest.
    active: bool,
    /// Offset just past the opening bracket.
    label_start: usize,
}

/// Parse `text` into inline nodes appended to `out`.
///
/// Each call keeps its own delimiter stack and backtick index, so spans are
/// parsed independently of one another.
///
/// # Example
/// ```
/// use marktree::inline::{parse_inlines, Inline};
/// use marktree::link_ref::LinkRefStore;
/// use marktree::list::Arena;
///
/// let mut arena = Arena::new();
/// let out = arena.new_list();
/// parse_inlines("*hi*", &mut arena, out, &LinkRefStore::new());
/// let first = arena.first(out).unwrap();
/// assert!(matches!(arena.get(first), Inline::Emphasis { .. }));
/// ```
pub fn parse_inlines(text: &str, nodes: &mut Arena<Inline>, out: List, refs: &LinkRefStore) {
    let mut delims = Arena::new();
    let delim_stack = delims.new_list();
    InlineParser {
        text,
        bytes: text.as_bytes(),
        pos: 0,
        nodes,
        out,
        refs,
        pending: String::new(),
        delims,
        delim_stack,
        brackets: Vec::new(),
        backticks: BacktickIndex::default(),
        bracket_counts: None,
    }
    .run();
}

pub(crate) struct InlineParser<'a, 'r> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    nodes: &'r mut Arena<Inline>,
    out: List,
    refs: &'r LinkRefStore,
    pending: String,
    delims: Arena<Delimiter>,
    delim_stack: List,
    brackets: Vec<Bracket>,
    backticks: BacktickIndex,
    /// Unescaped `[`/`]` seen before each offset, built on first `]`.
    bracket_counts: Option<Vec<u32>>,
}

impl InlineParser<'_, '_> {
    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\n' => self.line_break(),
                b'\\' => self.backslash(),
                b'`' => self.code_span(),
                ch @ (b'*' | b'_') => self.delimiter_run(ch),
                b'[' => self.open_bracket(false),
                b'!' if self.bytes.get(self.pos + 1) == Some(&b'[') => self.open_bracket(true),
                b']' => self.close_bracket(),
                b'<' => self.angle_bracket(),
                b'&' => self.entity(),
                _ => self.literal_run(),
            }
        }
        self.flush();
        self.process_emphasis(0);
        merge_adjacent_text(self.nodes, self.out);
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.nodes.push_back(self.out, Inline::Text(text));
        }
    }

    fn push(&mut self, node: Inline) -> Handle {
        self.flush();
        self.nodes.push_back(self.out, node)
    }

    fn literal_run(&mut self) {
        let start = self.pos;
        let mut end = start + 1;
        while end < self.bytes.len() && !SPECIAL[self.bytes[end] as usize] {
            end += 1;
        }
        self.pending.push_str(&self.text[start..end]);
        self.pos = end;
    }

    fn skip_leading_spaces(&mut self) {
        while self.bytes.get(self.pos) == Some(&b' ') {
            self.pos += 1;
        }
    }

    fn line_break(&mut self) {
        let kept = self.pending.trim_end_matches(' ').len();
        let hard = self.pending.len() - kept >= 2;
        self.pending.truncate(kept);
        self.push(if hard {
            Inline::HardBreak
        } else {
            Inline::SoftBreak
        });
        self.pos += 1;
        self.skip_leading_spaces();
    }

    fn backslash(&mut self) {
        match self.bytes.get(self.pos + 1) {
            Some(b'\n') => {
                self.push(Inline::HardBreak);
                self.pos += 2;
                self.skip_leading_spaces();
            }
            Some(&next) if is_ascii_punctuation(next) => {
                self.pending.push(char::from(next));
                self.pos += 2;
            }
            _ => {
                self.pending.push('\\');
                self.pos += 1;
            }
        }
    }

    fn code_span(&mut self) {
        let start = self.pos;
        let run = self.bytes[start..].iter().take_while(|&&b| b == b'`').count();
        let open_end = start + run;
        let closer = if run > MAX_CODE_SPAN_BACKTICKS {
            None
        } else {
            self.backticks.find_closer(self.bytes, run, open_end)
        };
        match closer {
            Some(close) => {
                let content = code_span::normalize_content(&self.text[open_end..close]);
                self.push(Inline::Code(content));
                self.pos = close + run;
            }
            None => {
                self.pending.push_str(&self.text[start..open_end]);
                self.pos = open_end;
            }
        }
    }

    fn angle_bracket(&mut self) {
        if let Some(link) = scan_autolink(self.bytes, self.pos) {
            let dest = if link.is_email {
                format!("mailto:{}", link.content)
            } else {
                link.content.clone()
            };
            self.push(Inline::Autolink {
                dest,
                text: link.content,
                is_email: link.is_email,
            });
            self.pos = link.end;
        } else if let Some(end) = html::scan_html(self.bytes, self.pos) {
            let raw = self.text[self.pos..end].to_owned();
            self.push(Inline::Html(raw));
            self.pos = end;
        } else {
            self.pending.push('<');
            self.pos += 1;
        }
    }

    fn entity(&mut self) {
        match decode_entity(&self.bytes[self.pos..]) {
            Some((decoded, used)) => {
                self.pending.push_str(&decoded);
                self.pos += used;
            }
            None => {
                self.pending.push('&');
                self.pos += 1;
            }
        }
    }

    fn delimiter_run(&mut self, ch: u8) {
        let start = self.pos;
        let len = self.bytes[start..].iter().take_while(|&&b| b == ch).count();
        let end = start + len;
        let before = self.text[..start].chars().next_back();
        let after = self.text[end..].chars().next();
        let (can_open, can_close) = emphasis::flanking(ch, before, after);
        self.pos = end;

        let run = &self.text[start..end];
        if !can_open && !can_close {
            self.pending.push_str(run);
            return;
        }
        let node = self.push(Inline::Text(run.to_owned()));
        self.delims.push_back(
            self.delim_stack,
            Delimiter {
                ch,
                pos: start,
                node,
                len,
                orig_len: len,
                can_open,
                can_close,
            },
        );
    }

    fn open_bracket(&mut self, image: bool) {
        let width = if image { 2 } else { 1 };
        let marker = self.text[self.pos..self.pos + width].to_owned();
        let node = self.push(Inline::Text(marker));
        self.pos += width;
        self.brackets.push(Bracket {
            node,
            image,
            active: true,
            label_start: self.pos,
        });
    }

    fn close_bracket(&mut self) {
        let close = self.pos;
        let Some(opener) = self.brackets.last().copied() else {
            self.pending.push(']');
            self.pos += 1;
            return;
        };
        if !opener.active {
            self.brackets.pop();
            self.pending.push(']');
            self.pos += 1;
            return;
        }

        let Some((kind, dest, title, end)) = self.link_target(&opener, close) else {
            self.brackets.pop();
            self.pending.push(']');
            self.pos += 1;
            return;
        };
        trace!("{kind:?} link at {close} -> {dest}");

        self.flush();
        self.process_emphasis(opener.label_start);
        let children = self.nodes.split_off_after(self.out, opener.node);
        self.nodes.remove(opener.node);
        let node = if opener.image {
            Inline::Image {
                kind,
                dest,
                title,
                children,
            }
        } else {
            Inline::Link {
                kind,
                dest,
                title,
                children,
            }
        };
        self.nodes.push_back(self.out, node);
        self.brackets.pop();
        if !opener.image {
            for earlier in &mut self.brackets {
                if !earlier.image {
                    earlier.active = false;
                }
            }
        }
        self.pos = end;
    }

    /// Inline destination, then full reference, then collapsed or shortcut
    /// reference. A full reference with an unknown label matches nothing.
    fn link_target(
        &mut self,
        opener: &Bracket,
        close: usize,
    ) -> Option<(LinkKind, String, Option<String>, usize)> {
        let after = close + 1;
        if let Some(target) = scan_inline_link(self.bytes, after) {
            return Some((LinkKind::Inline, target.dest, target.title, target.end));
        }

        let (kind, end) = match scan_link_label(self.bytes, after) {
            Some(label_end) if label_end - after > 2 => {
                let def = self.refs.lookup(&self.text[after + 1..label_end - 1])?;
                return Some((LinkKind::Full, def.dest.clone(), def.title.clone(), label_end));
            }
            Some(label_end) => (LinkKind::Collapsed, label_end),
            None => (LinkKind::Shortcut, after),
        };
        let def = self.own_label(opener, close)?;
        Some((kind, def.dest.clone(), def.title.clone(), end))
    }

    /// Definition named by the bracketed text itself. Text holding
    /// unescaped brackets is never a valid label.
    fn own_label(&mut self, opener: &Bracket, close: usize) -> Option<&LinkRefDef> {
        let bytes = self.bytes;
        let counts = self
            .bracket_counts
            .get_or_insert_with(|| unescaped_bracket_counts(bytes));
        if counts[close] != counts[opener.label_start] {
            return None;
        }
        self.refs.lookup(&self.text[opener.label_start..close])
    }
}

/// `counts[i]` is the number of unescaped `[` and `]` in `text[..i]`.
fn unescaped_bracket_counts(text: &[u8]) -> Vec<u32> {
    let mut counts = Vec::with_capacity(text.len() + 1);
    let mut seen = 0;
    let mut escaped = false;
    for &b in text {
        counts.push(seen);
        if !escaped && (b == b'[' || b == b']') {
            seen += 1;
        }
        escaped = !escaped && b == b'\\';
    }
    counts.push(seen);
    counts
}

/// Join neighbouring text nodes at every nesting level.
///
/// Walks nested lists with an explicit stack; emphasis can nest as deep
/// as the span has delimiter runs.
fn merge_adjacent_text(nodes: &mut Arena<Inline>, list: List) {
    let mut lists = vec![list];
    while let Some(list) = lists.pop() {
        let mut cur = nodes.first(list);
        while let Some(h) = cur {
            if let Some(children) = nodes.get(h).children() {
                lists.push(children);
            }
            let Some(next) = nodes.next(h) else {
                break;
            };
            if nodes.get(h).as_text().is_some() && nodes.get(next).as_text().is_some() {
                let tail = match nodes.get_mut(next) {
                    Inline::Text(text) => std::mem::take(text),
                    _ => unreachable!(),
                };
                nodes.remove(next);
                if let Inline::Text(text) = nodes.get_mut(h) {
                    text.push_str(&tail);
                }
                continue;
            }
            cur = Some(next);
        }
    }
}
