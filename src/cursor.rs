//! Byte cursor over the normalized source buffer.
//!
//! The block parser rewinds constantly (container prefix checks, paragraph
//! lookahead, cache replay), so the cursor is a plain offset into the input
//! that can be saved and restored with [`Cursor::offset`] and
//! [`Cursor::set_offset`].

use memchr::memchr;

/// A cursor for byte-by-byte scanning with cheap save/restore.
///
/// # Example
/// ```
/// use marktree::cursor::Cursor;
///
/// let mut cursor = Cursor::new(b"Hello, World!");
/// assert_eq!(cursor.peek(), Some(b'H'));
/// cursor.advance(7);
/// assert_eq!(cursor.peek(), Some(b'W'));
/// cursor.set_offset(0);
/// assert!(cursor.at(b'H'));
/// ```
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor over a byte slice.
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Current offset from the start of input.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Move to an absolute offset (rollback or cache replay).
    #[inline]
    pub fn set_offset(&mut self, offset: usize) {
        debug_assert!(offset <= self.input.len());
        self.pos = offset;
    }

    /// Number of bytes remaining.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Check if cursor is at end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peek the current byte without advancing.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Advance by n bytes.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.pos += n;
    }

    /// Advance by 1 byte.
    #[inline]
    pub fn bump(&mut self) {
        debug_assert!(!self.is_eof());
        self.pos += 1;
    }

    /// Check if current position matches a byte.
    #[inline]
    pub fn at(&self, b: u8) -> bool {
        self.peek() == Some(b)
    }

    /// Skip while predicate is true.
    #[inline]
    pub fn skip_while<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(u8) -> bool,
    {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !predicate(b) {
                break;
            }
            self.pos += 1;
        }
        self.pos - start
    }

    /// Skip spaces only.
    #[inline]
    pub fn skip_spaces(&mut self) -> usize {
        self.skip_while(|b| b == b' ')
    }

    /// Skip at most `max` spaces.
    #[inline]
    pub fn skip_spaces_max(&mut self, max: usize) -> usize {
        let mut n = 0;
        while n < max && self.at(b' ') {
            self.pos += 1;
            n += 1;
        }
        n
    }

    /// Consume a specific byte if present.
    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.at(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_slice(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Offset of the end of the current line (the `\n` or end of input).
    #[inline]
    pub fn line_end(&self) -> usize {
        match memchr(b'\n', self.remaining_slice()) {
            Some(n) => self.pos + n,
            None => self.input.len(),
        }
    }

    /// Text from the cursor up to (not including) the line terminator.
    #[inline]
    pub fn rest_of_line(&self) -> &'a [u8] {
        &self.input[self.pos..self.line_end()]
    }

    /// Whether the rest of the line holds only spaces and tabs.
    #[inline]
    pub fn rest_is_blank(&self) -> bool {
        self.rest_of_line().iter().all(|&b| b == b' ' || b == b'\t')
    }

    /// Advance past the current line terminator, returning the line's
    /// `(start, end)` offsets excluding the newline.
    #[inline]
    pub fn consume_line(&mut self) -> (usize, usize) {
        let start = self.pos;
        let end = self.line_end();
        self.pos = if end < self.input.len() { end + 1 } else { end };
        (start, end)
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.offset())
            .field("remaining", &self.remaining())
            .finish()
    }
}
