//! Leaf block productions: headings, breaks, code and HTML blocks.
//!
//! Each `try_*` looks at the line under the cursor (indentation already
//! skipped) and either consumes the construct or leaves the cursor alone.

use crate::escape::unescape_string;

use super::html_block;
use super::node::Block;
use super::parser::{BlockParser, Step};
use super::scan::{self, Container, LineInfo};

#[inline]
fn is_space_or_tab(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

impl BlockParser<'_> {
    pub(super) fn try_atx_heading(&mut self) -> Option<Block> {
        let line = self.cursor.rest_of_line();
        let level = line.iter().take_while(|&&b| b == b'#').count();
        if level == 0 || level > 6 {
            return None;
        }
        if !matches!(line.get(level), None | Some(b' ' | b'\t')) {
            return None;
        }

        let start = self.cursor.offset() + level;
        let (_, end) = self.cursor.consume_line();
        let content = self.source[start..end].trim_matches([' ', '\t']);
        // Optional closing sequence: a run of `#` preceded by whitespace.
        let unclosed = content.trim_end_matches('#');
        let content = if unclosed.is_empty() {
            ""
        } else if unclosed.ends_with([' ', '\t']) {
            unclosed.trim_end_matches([' ', '\t'])
        } else {
            content
        };

        Some(Block::Heading {
            level: level as u8,
            setext: false,
            raw: content.to_owned(),
            children: self.inlines.new_list(),
        })
    }

    /// Setext underline below the open paragraph `pending[idx]`.
    ///
    /// Definitions at the start of the paragraph are extracted first; when
    /// nothing else is left the underline is not an underline, so the cursor
    /// rewinds to `rollback` for the line to be read again.
    pub(super) fn try_setext_heading(&mut self, idx: usize, rollback: usize) -> Option<Step> {
        let line = self.cursor.rest_of_line();
        let ch = *line.first()?;
        if ch != b'=' && ch != b'-' {
            return None;
        }
        let run = line.iter().take_while(|&&b| b == ch).count();
        if !line[run..].iter().all(|&b| is_space_or_tab(b)) {
            return None;
        }

        let raw = std::mem::take(&mut self.pending[idx]);
        let consumed = self.extract_definitions(&raw);
        let content = raw[consumed..].trim();
        if content.is_empty() {
            self.cursor.set_offset(rollback);
            return Some(Step::Definition);
        }

        self.cursor.consume_line();
        Some(Step::Block(Block::Heading {
            level: if ch == b'=' { 1 } else { 2 },
            setext: true,
            raw: content.to_owned(),
            children: self.inlines.new_list(),
        }))
    }

    pub(super) fn try_thematic_break(&mut self) -> Option<Block> {
        let line = self.cursor.rest_of_line();
        let ch = *line.first()?;
        if !matches!(ch, b'-' | b'*' | b'_') {
            return None;
        }
        let mut count = 0;
        for &b in line {
            if b == ch {
                count += 1;
            } else if !is_space_or_tab(b) {
                return None;
            }
        }
        if count < 3 {
            return None;
        }
        self.cursor.consume_line();
        Some(Block::ThematicBreak)
    }

    /// Fenced code. `indent` is the opening fence's indentation, removed
    /// from content lines where present.
    pub(super) fn try_fenced_code(&mut self, stack: &[Container], indent: usize) -> Option<Block> {
        let line = self.cursor.rest_of_line();
        let fence = *line.first()?;
        if fence != b'`' && fence != b'~' {
            return None;
        }
        let fence_len = line.iter().take_while(|&&b| b == fence).count();
        if fence_len < 3 {
            return None;
        }
        let info = &line[fence_len..];
        if fence == b'`' && info.contains(&b'`') {
            return None;
        }
        let info = unescape_string(info.trim_ascii());
        self.cursor.consume_line();

        let mut literal = String::new();
        while !self.cursor.is_eof() {
            let rollback = self.cursor.offset();
            if scan::check_prefix(&mut self.cursor, stack) < stack.len() {
                self.cursor.set_offset(rollback);
                break;
            }
            let content_start = self.cursor.offset();
            if self.cursor.skip_spaces() < 4 {
                let rest = self.cursor.rest_of_line();
                let run = rest.iter().take_while(|&&b| b == fence).count();
                if run >= fence_len && rest[run..].iter().all(|&b| is_space_or_tab(b)) {
                    self.cursor.consume_line();
                    break;
                }
            }
            self.cursor.set_offset(content_start);
            self.cursor.skip_spaces_max(indent);
            let (start, end) = self.cursor.consume_line();
            literal.push_str(&self.source[start..end]);
            literal.push('\n');
        }

        Some(Block::FencedCode {
            fence,
            info,
            literal,
        })
    }

    /// Indented code starting at `line`. Trailing blank lines are not part
    /// of the block; the cursor is put back in front of them.
    pub(super) fn indented_code(&mut self, stack: &[Container], line: &LineInfo) -> Block {
        self.cursor.set_offset(line.line_begin);
        let mut literal = String::new();
        let mut blanks = String::new();
        let mut content_end = self.cursor.offset();

        loop {
            let blank = self.cursor.rest_is_blank();
            self.cursor.skip_spaces_max(4);
            let (start, end) = self.cursor.consume_line();
            if blank {
                blanks.push_str(&self.source[start..end]);
                blanks.push('\n');
            } else {
                literal.push_str(&blanks);
                blanks.clear();
                literal.push_str(&self.source[start..end]);
                literal.push('\n');
                content_end = self.cursor.offset();
            }

            if self.cursor.is_eof() {
                break;
            }
            let rollback = self.cursor.offset();
            let continues = scan::check_prefix(&mut self.cursor, stack) == stack.len()
                && (self.cursor.rest_is_blank()
                    || self.cursor.rest_of_line().starts_with(b"    "));
            if !continues {
                self.cursor.set_offset(rollback);
                break;
            }
        }

        if !blanks.is_empty() {
            self.cursor.set_offset(content_end);
        }
        Block::IndentedCode { literal }
    }

    /// HTML block whose start condition matches the line at the cursor.
    /// Lines are kept verbatim, indentation included.
    pub(super) fn try_html_block(
        &mut self,
        stack: &[Container],
        line: &LineInfo,
        interrupts_paragraph: bool,
    ) -> Option<Block> {
        let kind = html_block::start_kind(self.cursor.rest_of_line(), interrupts_paragraph)?;
        self.cursor.set_offset(line.line_begin);

        let mut raw = String::new();
        loop {
            let (start, end) = self.cursor.consume_line();
            let text = &self.source[start..end];
            raw.push_str(text);
            raw.push('\n');
            if html_block::ends_on(kind, text.as_bytes()) || self.cursor.is_eof() {
                break;
            }
            let rollback = self.cursor.offset();
            let matched = scan::check_prefix(&mut self.cursor, stack) == stack.len();
            if !matched || (kind >= 6 && self.cursor.rest_is_blank()) {
                self.cursor.set_offset(rollback);
                break;
            }
        }

        Some(Block::HtmlBlock { kind, raw })
    }
}
