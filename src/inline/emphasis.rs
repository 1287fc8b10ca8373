//! Emphasis and strong emphasis resolution.
//!
//! Delimiter runs (`*`, `_`) are kept on a delimiter stack as they are
//! scanned; each one owns a placeholder text node holding its characters.
//! Resolution walks the stack bottom-up looking for closers, matches each
//! with the nearest compatible opener below it, and wraps the nodes between
//! the two placeholders into an emphasis node.

use crate::list::Handle;

use super::InlineParser;
use super::node::Inline;

/// One `*` or `_` run on the delimiter stack.
#[derive(Debug, Clone, Copy)]
pub(super) struct Delimiter {
    pub ch: u8,
    /// Byte offset of the run in the span.
    pub pos: usize,
    /// Placeholder text node.
    pub node: Handle,
    /// Characters not yet used by a match.
    pub len: usize,
    /// Run length as scanned; the rule of three looks at this.
    pub orig_len: usize,
    pub can_open: bool,
    pub can_close: bool,
}

impl Delimiter {
    /// Slot in the "no opener below here" table: character, whether the
    /// closer can also open, and its run length modulo 3.
    fn class(&self) -> usize {
        usize::from(self.ch == b'*') * 6 + usize::from(self.can_open) * 3 + self.orig_len % 3
    }
}

fn is_punctuation(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_punctuation()
    } else {
        !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control()
    }
}

/// Whether a run of `ch` between `before` and `after` can open and can
/// close emphasis. The edges of the span count as whitespace.
pub(super) fn flanking(ch: u8, before: Option<char>, after: Option<char>) -> (bool, bool) {
    let before_ws = before.is_none_or(char::is_whitespace);
    let after_ws = after.is_none_or(char::is_whitespace);
    let before_punct = before.is_some_and(is_punctuation);
    let after_punct = after.is_some_and(is_punctuation);

    let left = !after_ws && (!after_punct || before_ws || before_punct);
    let right = !before_ws && (!before_punct || after_ws || after_punct);

    if ch == b'_' {
        (left && (!right || before_punct), right && (!left || after_punct))
    } else {
        (left, right)
    }
}

impl InlineParser<'_, '_> {
    /// Resolve every delimiter at or after `stack_bottom`, then drop them
    /// from the stack.
    pub(super) fn process_emphasis(&mut self, stack_bottom: usize) {
        let mut openers_bottom = [stack_bottom; 12];

        let mut closer = None;
        let mut candidate = self.delims.last(self.delim_stack);
        while let Some(h) = candidate {
            if self.delims.get(h).pos < stack_bottom {
                break;
            }
            closer = Some(h);
            candidate = self.delims.prev(h);
        }

        while let Some(c) = closer {
            let close = *self.delims.get(c);
            if !close.can_close {
                closer = self.delims.next(c);
                continue;
            }

            let class = close.class();
            let mut found = None;
            let mut opener = self.delims.prev(c);
            while let Some(o) = opener {
                let open = self.delims.get(o);
                if open.pos < stack_bottom || open.pos < openers_bottom[class] {
                    break;
                }
                if open.can_open && open.ch == close.ch {
                    let odd_match = (close.can_open || open.can_close)
                        && (open.orig_len + close.orig_len) % 3 == 0
                        && !(open.orig_len % 3 == 0 && close.orig_len % 3 == 0);
                    if !odd_match {
                        found = Some(o);
                        break;
                    }
                }
                opener = self.delims.prev(o);
            }

            match found {
                Some(o) => closer = self.insert_emphasis(o, c),
                None => {
                    // The class fixes the closer's side of the rule of three,
                    // so openers it rejected here stay rejected for every later
                    // closer of the same class.
                    openers_bottom[class] = close.pos;
                    closer = self.delims.next(c);
                    if !close.can_open {
                        self.delims.remove(c);
                    }
                }
            }
        }

        while let Some(h) = self.delims.last(self.delim_stack) {
            if self.delims.get(h).pos < stack_bottom {
                break;
            }
            self.delims.remove(h);
        }
    }

    /// Match `opener` with `closer`, using two characters from each when
    /// both have two left. Returns the closer to continue with.
    fn insert_emphasis(&mut self, opener: Handle, closer: Handle) -> Option<Handle> {
        let open = *self.delims.get(opener);
        let close = *self.delims.get(closer);
        let used = if open.len >= 2 && close.len >= 2 { 2 } else { 1 };
        self.delims.get_mut(opener).len -= used;
        self.delims.get_mut(closer).len -= used;
        self.shrink_placeholder(open.node, used);
        self.shrink_placeholder(close.node, used);

        let mut between = self.delims.next(opener).filter(|&h| h != closer);
        while let Some(h) = between {
            between = self.delims.next(h).filter(|&h| h != closer);
            self.delims.remove(h);
        }

        let children = self.nodes.detach_between(open.node, close.node);
        let node = if used == 2 {
            Inline::Strong { children }
        } else {
            Inline::Emphasis { children }
        };
        self.nodes.insert_after(open.node, node);

        if open.len == used {
            self.nodes.remove(open.node);
            self.delims.remove(opener);
        }
        if close.len == used {
            let next = self.delims.next(closer);
            self.nodes.remove(close.node);
            self.delims.remove(closer);
            next
        } else {
            Some(closer)
        }
    }

    fn shrink_placeholder(&mut self, node: Handle, by: usize) {
        if let Inline::Text(text) = self.nodes.get_mut(node) {
            text.truncate(text.len() - by);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flanking_star() {
        assert_eq!(flanking(b'*', None, Some('a')), (true, false));
        assert_eq!(flanking(b'*', Some('a'), None), (false, true));
        assert_eq!(flanking(b'*', Some('a'), Some('b')), (true, true));
        assert_eq!(flanking(b'*', Some(' '), Some(' ')), (false, false));
    }

    #[test]
    fn test_flanking_punctuation() {
        // `a*"foo"*` : the first run is right-flanking only.
        assert_eq!(flanking(b'*', Some('a'), Some('"')), (false, true));
        assert_eq!(flanking(b'*', Some(' '), Some('"')), (true, false));
    }

    #[test]
    fn test_underscore_intraword() {
        assert_eq!(flanking(b'_', Some('a'), Some('b')), (false, false));
        assert_eq!(flanking(b'_', Some('.'), Some('b')), (true, false));
        assert_eq!(flanking(b'_', Some('a'), Some('.')), (false, true));
    }

    #[test]
    fn test_unicode_punctuation_and_symbols() {
        assert!(is_punctuation('€'));
        assert!(is_punctuation('。'));
        assert!(!is_punctuation('é'));
        assert!(!is_punctuation('\u{a0}'));
    }
}
