//! Line, indentation and container-prefix scanning.
//!
//! These are the primitives the block state machine is built on. None of
//! them look at the cache or at "last block" state; they only move the
//! cursor over the source.

use smallvec::SmallVec;

use crate::cursor::Cursor;

/// Prefix a line must carry to stay inside an open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// Block quote: up to three spaces, `>`, one optional space.
    Quote,
    /// List item continuation: exactly this many spaces, or a blank line.
    Indent(usize),
}

/// Open containers, outermost first. Its length is the nesting depth.
pub type ContainerStack = SmallVec<[Container; 16]>;

/// What [`next_line`] learned about the line at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    /// Columns of indentation after the matched container prefixes.
    pub indent: usize,
    /// The line is empty or whitespace after its prefixes.
    pub is_blank: bool,
    /// Blank lines consumed (0 for a non-blank line).
    pub blank_lines: usize,
    /// Number of containers whose prefix matched, in stack order.
    pub matched: usize,
    /// Offset right after the matched prefixes.
    pub line_begin: usize,
    /// Offset before any prefix was consumed.
    pub rollback: usize,
}

impl LineInfo {
    /// Whether every container on the stack matched this line.
    #[inline]
    pub fn prefix_ok(&self, stack_len: usize) -> bool {
        self.matched == stack_len
    }
}

/// Advance over spaces, returning how many.
///
/// Tabs in the structural part of a line are expanded to spaces before
/// block scanning, so only spaces are counted here.
#[inline]
pub fn skip_indentation(cursor: &mut Cursor<'_>) -> usize {
    cursor.skip_spaces()
}

/// Consume each container's prefix in order, stopping at the first one that
/// does not match. Returns how many matched; the cursor ends up after the
/// last matched prefix.
pub fn check_prefix(cursor: &mut Cursor<'_>, stack: &[Container]) -> usize {
    for (idx, container) in stack.iter().enumerate() {
        let save = cursor.offset();
        let ok = match *container {
            Container::Quote => {
                cursor.skip_spaces_max(3);
                if cursor.eat(b'>') {
                    cursor.eat(b' ');
                    true
                } else {
                    false
                }
            }
            Container::Indent(width) => {
                cursor.skip_spaces_max(width) == width || cursor.rest_is_blank()
            }
        };
        if !ok {
            cursor.set_offset(save);
            return idx;
        }
    }
    stack.len()
}

/// Read the next line's prefix and indentation.
///
/// With `skip_prefix`, the cursor is taken to be mid-line, right after a
/// container marker, and all prefixes count as matched.
///
/// A blank line is consumed together with every following blank line that
/// still matches the same (possibly shortened) prefix; the cursor is left at
/// the start of the first line that is not such a blank line. For a
/// non-blank line the cursor is left at its first non-space character.
///
/// Returns `None` at end of input.
pub fn next_line(
    cursor: &mut Cursor<'_>,
    stack: &[Container],
    skip_prefix: bool,
) -> Option<LineInfo> {
    if cursor.is_eof() {
        return None;
    }
    let rollback = cursor.offset();
    let matched = if skip_prefix {
        stack.len()
    } else {
        check_prefix(cursor, stack)
    };
    let line_begin = cursor.offset();
    let indent = skip_indentation(cursor);
    let is_blank = cursor.rest_is_blank();

    let mut blank_lines = 0;
    if is_blank {
        cursor.consume_line();
        blank_lines = 1;
        while !cursor.is_eof() {
            let save = cursor.offset();
            if check_prefix(cursor, &stack[..matched]) == matched && cursor.rest_is_blank() {
                cursor.consume_line();
                blank_lines += 1;
            } else {
                cursor.set_offset(save);
                break;
            }
        }
    }

    Some(LineInfo {
        indent,
        is_blank,
        blank_lines,
        matched,
        line_begin,
        rollback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_prefix_nested() {
        let input = b"> >   text\n";
        let mut cursor = Cursor::new(input);
        let stack = [Container::Quote, Container::Quote, Container::Indent(2)];
        assert_eq!(check_prefix(&mut cursor, &stack), 3);
        assert_eq!(cursor.offset(), 6);
    }

    #[test]
    fn test_check_prefix_partial_restores() {
        let input = b"> text\n";
        let mut cursor = Cursor::new(input);
        let stack = [Container::Quote, Container::Indent(4)];
        assert_eq!(check_prefix(&mut cursor, &stack), 1);
        assert_eq!(cursor.offset(), 2);
    }

    #[test]
    fn test_quote_allows_three_spaces() {
        let mut cursor = Cursor::new(b"   >x\n");
        assert_eq!(check_prefix(&mut cursor, &[Container::Quote]), 1);
        assert_eq!(cursor.peek(), Some(b'x'));

        let mut cursor = Cursor::new(b"    >x\n");
        assert_eq!(check_prefix(&mut cursor, &[Container::Quote]), 0);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_indent_matches_blank_line() {
        let mut cursor = Cursor::new(b" \nx");
        assert_eq!(check_prefix(&mut cursor, &[Container::Indent(4)]), 1);
    }

    #[test]
    fn test_next_line_absorbs_blanks() {
        let input = b"\n  \n\nnext\n";
        let mut cursor = Cursor::new(input);
        let info = next_line(&mut cursor, &[], false).unwrap();
        assert!(info.is_blank);
        assert_eq!(info.blank_lines, 3);
        assert_eq!(cursor.rest_of_line(), b"next");
    }

    #[test]
    fn test_next_line_blank_stops_at_quote_boundary() {
        let input = b">\n>\n\n> x\n";
        let mut cursor = Cursor::new(input);
        let info = next_line(&mut cursor, &[Container::Quote], false).unwrap();
        assert!(info.is_blank);
        assert!(info.prefix_ok(1));
        assert_eq!(info.blank_lines, 2);
        assert_eq!(cursor.offset(), 4);
    }

    #[test]
    fn test_next_line_indent() {
        let input = b">     code\n";
        let mut cursor = Cursor::new(input);
        let info = next_line(&mut cursor, &[Container::Quote], false).unwrap();
        assert_eq!(info.indent, 4);
        assert_eq!(info.line_begin, 2);
        assert_eq!(info.rollback, 0);
        assert!(!info.is_blank);
        assert_eq!(cursor.rest_of_line(), b"code");
    }

    #[test]
    fn test_next_line_eof() {
        let mut cursor = Cursor::new(b"");
        assert!(next_line(&mut cursor, &[], false).is_none());
    }
}
