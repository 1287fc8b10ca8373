//! Block parser state machine.
//!
//! Parsing is pull-based: every production asks [`BlockParser::next_block`]
//! for the next step at its nesting depth and decides from the answer whether
//! to keep going. A line that fails some container prefix is still parsed on
//! the spot, at the depth it did match; the resulting node is parked in the
//! lookahead cache behind one `Exit` per container that has to close first,
//! and replayed as the frames unwind.

use log::{debug, trace};

use crate::cursor::Cursor;
use crate::inline::Inline;
use crate::limits::{MAX_BLOCK_NESTING, MAX_LIST_MARKER_DIGITS};
use crate::link_ref::{LinkRefStore, parse_link_ref_def};
use crate::list::Arena;
use crate::{Document, ParseStats};

use super::cache::LookaheadCache;
use super::node::{Block, ListKind};
use super::scan::{self, Container, ContainerStack, LineInfo};

/// One answer of [`BlockParser::next_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// A finished block at the requesting depth.
    Block(Block),
    /// A lazy or regular paragraph continuation line, leading spaces removed.
    Continuation(String),
    /// A paragraph turned out to be nothing but link reference definitions.
    Definition,
    /// One or more blank lines.
    Blank,
    /// The innermost open container ends here.
    Exit,
}

/// What was last produced at one nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Last {
    None,
    /// A paragraph is open; its text is `pending[idx]`.
    Paragraph(usize),
    /// A list is open and expects more items of this kind.
    Item(ListKind),
    Other,
}

/// A list marker found at the cursor.
#[derive(Debug, Clone, Copy)]
pub(super) struct ListMarker {
    pub kind: ListKind,
    /// Marker length in bytes (`-` is 1, `10.` is 3).
    pub width: usize,
}

/// Parses normalized Markdown into a block tree.
///
/// The input must already be normalized with [`super::normalize`]: line
/// feeds only, no NUL, structural tabs expanded, trailing newline.
pub struct BlockParser<'a> {
    pub(super) source: &'a str,
    pub(super) cursor: Cursor<'a>,
    cache: LookaheadCache<Step>,
    last_blocks: Vec<Last>,
    /// Raw text of every paragraph currently being collected, outermost first.
    pub(super) pending: Vec<String>,
    pub(super) blocks: Arena<Block>,
    pub(super) inlines: Arena<Inline>,
    refs: LinkRefStore,
    stats: ParseStats,
    max_nesting: usize,
}

impl<'a> BlockParser<'a> {
    /// Create a parser with the default nesting limit.
    pub fn new(source: &'a str) -> Self {
        Self::with_max_nesting(source, MAX_BLOCK_NESTING)
    }

    /// Create a parser that reads container markers beyond `max_nesting`
    /// levels as plain text.
    pub fn with_max_nesting(source: &'a str, max_nesting: usize) -> Self {
        Self {
            source,
            cursor: Cursor::new(source.as_bytes()),
            cache: LookaheadCache::new(),
            last_blocks: vec![Last::None],
            pending: Vec::new(),
            blocks: Arena::with_capacity(source.len() / 32 + 4),
            inlines: Arena::new(),
            refs: LinkRefStore::new(),
            stats: ParseStats::default(),
            max_nesting,
        }
    }

    /// Parse the whole input into a [`Document`] whose leaves still carry
    /// their raw inline text.
    pub fn parse(mut self) -> Document {
        let mut stack = ContainerStack::new();
        let root = self.blocks.new_list();
        loop {
            match self.next_block(&mut stack, false) {
                Step::Exit => break,
                Step::Block(block) => {
                    self.blocks.push_back(root, block);
                }
                Step::Blank | Step::Definition => {}
                Step::Continuation(_) => unreachable!("continuation line outside a paragraph"),
            }
        }
        debug_assert!(stack.is_empty(), "containers left open: {stack:?}");
        debug_assert!(self.cache.is_empty(), "unconsumed lookahead at end of input");
        debug!(
            "block pass done: {} top-level blocks, {} definitions, {} containers",
            self.blocks.len(root),
            self.refs.len(),
            self.stats.container_pushes
        );
        Document {
            blocks: self.blocks,
            inlines: self.inlines,
            root,
            refs: self.refs,
            stats: self.stats,
        }
    }

    /// The next step at depth `stack.len()`.
    ///
    /// With `skip_prefix`, the cursor sits mid-line right after a container
    /// marker, and the rest of that line belongs to the innermost container.
    pub(crate) fn next_block(&mut self, stack: &mut ContainerStack, skip_prefix: bool) -> Step {
        if let Some((offset, step)) = self.cache.pop() {
            trace!("replay {step:?} at {offset}");
            self.cursor.set_offset(offset);
            return step;
        }

        let full_depth = stack.len();
        let Some(line) = scan::next_line(&mut self.cursor, stack, skip_prefix) else {
            if full_depth > 1 {
                self.cache
                    .store(self.cursor.offset(), vec![Step::Exit; full_depth - 1]);
            }
            return Step::Exit;
        };

        if line.is_blank {
            if line.prefix_ok(full_depth) {
                return Step::Blank;
            }
            let mut queue = vec![Step::Exit; full_depth - line.matched - 1];
            queue.push(Step::Blank);
            self.cache.store(self.cursor.offset(), queue);
            return Step::Exit;
        }

        if line.prefix_ok(full_depth) {
            return self.dispatch(stack, &line, full_depth);
        }

        // The line is parsed right away at the depth that matched; whatever
        // comes out is delivered once the unmatched containers have closed.
        let unmatched: ContainerStack = stack.drain(line.matched..).collect();
        let step = self.dispatch(stack, &line, full_depth);
        stack.extend(unmatched);
        if let Step::Continuation(_) = step {
            return step;
        }
        trace!(
            "line at {} closes {} containers",
            line.rollback,
            full_depth - line.matched
        );
        let mut queue = vec![Step::Exit; full_depth - line.matched - 1];
        queue.push(step);
        self.cache.store_front(self.cursor.offset(), queue);
        Step::Exit
    }

    /// Decide what a non-blank line starts, at depth `stack.len()`.
    /// `full_depth` is the depth the caller asked for.
    fn dispatch(&mut self, stack: &mut ContainerStack, line: &LineInfo, full_depth: usize) -> Step {
        let depth = stack.len();
        let last = self.last(depth);
        let in_paragraph = matches!(last, Last::Paragraph(_));
        let lazy_paragraph = matches!(self.last(full_depth), Last::Paragraph(_));

        if line.indent >= 4 {
            if lazy_paragraph {
                return self.continuation();
            }
            let block = self.indented_code(stack, line);
            return self.finish(depth, block);
        }

        if let Some(block) = self.try_atx_heading() {
            return self.finish(depth, block);
        }
        if let Some(block) = self.try_fenced_code(stack, line.indent) {
            return self.finish(depth, block);
        }
        if self.cursor.at(b'>') && depth < self.max_nesting {
            let block = self.block_quote(stack);
            return self.finish(depth, block);
        }
        if let Last::Paragraph(idx) = last {
            if let Some(step) = self.try_setext_heading(idx, line.rollback) {
                return step;
            }
        }
        if let Some(block) = self.try_thematic_break() {
            return self.finish(depth, block);
        }
        if let Some(marker) = self.scan_list_marker() {
            if let Last::Item(open) = last {
                if open.is_ordered() == marker.kind.is_ordered()
                    && open.marker_char() == marker.kind.marker_char()
                {
                    return Step::Block(self.list_item(stack, line.indent, marker));
                }
            }
            if depth < self.max_nesting && (!in_paragraph || self.may_interrupt(marker)) {
                let block = self.list(stack, line.indent, marker);
                return self.finish(depth, block);
            }
        }
        if let Some(block) = self.try_html_block(stack, line, in_paragraph || lazy_paragraph) {
            return self.finish(depth, block);
        }

        if lazy_paragraph {
            self.continuation()
        } else {
            self.paragraph(stack)
        }
    }

    fn finish(&mut self, depth: usize, block: Block) -> Step {
        self.set_last(depth, Last::Other);
        Step::Block(block)
    }

    fn last(&self, depth: usize) -> Last {
        self.last_blocks.get(depth).copied().unwrap_or(Last::None)
    }

    fn set_last(&mut self, depth: usize, last: Last) {
        if self.last_blocks.len() <= depth {
            self.last_blocks.resize(depth + 1, Last::None);
        }
        self.last_blocks[depth] = last;
    }

    fn open_container(&mut self, stack: &mut ContainerStack, container: Container) {
        stack.push(container);
        self.stats.container_pushes += 1;
        self.set_last(stack.len(), Last::None);
        trace!("open {container:?} at depth {}", stack.len());
    }

    fn close_container(&mut self, stack: &mut ContainerStack) {
        let closed = stack.pop();
        assert!(closed.is_some(), "container exit with no open container");
        self.stats.container_exits += 1;
    }

    /// The rest of the current line as paragraph text.
    fn take_line(&mut self) -> String {
        let (start, end) = self.cursor.consume_line();
        self.source[start..end].to_owned()
    }

    fn continuation(&mut self) -> Step {
        Step::Continuation(self.take_line())
    }

    /// Strip leading link reference definitions off paragraph text,
    /// recording them. Returns how many bytes they covered.
    pub(super) fn extract_definitions(&mut self, raw: &str) -> usize {
        let mut consumed = 0;
        while let Some(parsed) = parse_link_ref_def(raw[consumed..].as_bytes()) {
            trace!("definition [{}] -> {}", parsed.label, parsed.def.dest);
            self.refs.insert(parsed.label, parsed.def);
            consumed += parsed.consumed;
        }
        consumed
    }

    fn paragraph(&mut self, stack: &mut ContainerStack) -> Step {
        let depth = stack.len();
        let idx = self.pending.len();
        let first = self.take_line();
        self.pending.push(first);
        self.set_last(depth, Last::Paragraph(idx));

        let lookahead = loop {
            match self.next_block(stack, false) {
                Step::Continuation(text) => {
                    let raw = &mut self.pending[idx];
                    raw.push('\n');
                    raw.push_str(&text);
                }
                step => break step,
            }
        };

        debug_assert_eq!(self.pending.len(), idx + 1, "paragraph buffers out of order");
        let raw = self.pending.pop().unwrap_or_default();
        self.set_last(depth, Last::Other);
        let consumed = self.extract_definitions(&raw);
        let text = raw[consumed..].trim_end();
        if text.is_empty() {
            return lookahead;
        }
        self.cache.store_front(self.cursor.offset(), [lookahead]);
        Step::Block(Block::Paragraph {
            raw: text.to_owned(),
            children: self.inlines.new_list(),
        })
    }

    fn block_quote(&mut self, stack: &mut ContainerStack) -> Block {
        let depth = stack.len();
        self.cursor.bump();
        self.cursor.eat(b' ');
        self.set_last(depth, Last::Other);
        self.open_container(stack, Container::Quote);

        let children = self.blocks.new_list();
        let mut skip_prefix = true;
        loop {
            match self.next_block(stack, std::mem::take(&mut skip_prefix)) {
                Step::Exit => break,
                Step::Block(block) => {
                    self.blocks.push_back(children, block);
                }
                Step::Blank | Step::Definition => {}
                Step::Continuation(_) => unreachable!("continuation line outside a paragraph"),
            }
        }
        self.close_container(stack);
        Block::BlockQuote { children }
    }

    pub(super) fn scan_list_marker(&self) -> Option<ListMarker> {
        let rest = self.cursor.remaining_slice();
        let (kind, width) = match *rest.first()? {
            bullet @ (b'-' | b'+' | b'*') => (ListKind::Unordered { bullet }, 1),
            b'0'..=b'9' => {
                let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
                if digits > MAX_LIST_MARKER_DIGITS {
                    return None;
                }
                let delimiter = *rest.get(digits)?;
                if delimiter != b'.' && delimiter != b')' {
                    return None;
                }
                let start = std::str::from_utf8(&rest[..digits]).ok()?.parse().ok()?;
                (ListKind::Ordered { start, delimiter }, digits + 1)
            }
            _ => return None,
        };
        matches!(rest.get(width), None | Some(b' ' | b'\t' | b'\n'))
            .then_some(ListMarker { kind, width })
    }

    /// A list may interrupt a paragraph only with a non-empty first item,
    /// and an ordered one only when it starts at 1.
    fn may_interrupt(&self, marker: ListMarker) -> bool {
        let after = &self.cursor.rest_of_line()[marker.width..];
        let empty = after.iter().all(|&b| b == b' ' || b == b'\t');
        let starts_at_one = match marker.kind {
            ListKind::Unordered { .. } => true,
            ListKind::Ordered { start, .. } => start == 1,
        };
        !empty && starts_at_one
    }

    fn list(&mut self, stack: &mut ContainerStack, indent: usize, marker: ListMarker) -> Block {
        let depth = stack.len();
        self.set_last(depth, Last::Item(marker.kind));

        let children = self.blocks.new_list();
        let first = self.list_item(stack, indent, marker);
        let mut loose = matches!(first, Block::ListItem { loose: true, .. });
        let mut trailing_blank = matches!(first, Block::ListItem { last_line_blank: true, .. });
        self.blocks.push_back(children, first);

        loop {
            match self.next_block(stack, false) {
                Step::Block(
                    item @ Block::ListItem {
                        loose: item_loose,
                        last_line_blank,
                        ..
                    },
                ) => {
                    loose |= trailing_blank || item_loose;
                    trailing_blank = last_line_blank;
                    self.blocks.push_back(children, item);
                }
                Step::Blank => trailing_blank = true,
                step => {
                    self.cache.store_front(self.cursor.offset(), [step]);
                    break;
                }
            }
        }

        self.set_last(depth, Last::Other);
        Block::List {
            kind: marker.kind,
            loose,
            last_line_blank: trailing_blank,
            children,
        }
    }

    fn list_item(&mut self, stack: &mut ContainerStack, indent: usize, marker: ListMarker) -> Block {
        let after_marker = self.cursor.offset() + marker.width;
        self.cursor.set_offset(after_marker);
        let spaces = self.cursor.skip_spaces();
        let blank_start = self.cursor.rest_is_blank();
        let padding = if blank_start || spaces >= 5 { 1 } else { spaces };
        if blank_start {
            self.cursor.consume_line();
        } else {
            self.cursor.set_offset(after_marker + padding);
        }
        self.open_container(stack, Container::Indent(indent + marker.width + padding));

        let children = self.blocks.new_list();
        let mut loose = false;
        let mut pending_blank = false;
        let mut skip_prefix = !blank_start;
        let mut first_pull = true;
        loop {
            let step = self.next_block(stack, std::mem::take(&mut skip_prefix));
            match step {
                Step::Exit => break,
                // An item can begin with at most one blank line.
                Step::Blank if first_pull && blank_start => {
                    self.cache
                        .store_front(self.cursor.offset(), [Step::Exit, Step::Blank]);
                }
                Step::Blank => pending_blank = true,
                Step::Definition => {}
                Step::Block(block) => {
                    if pending_blank && !self.blocks.is_empty(children) {
                        loose = true;
                    }
                    pending_blank = matches!(block, Block::List { last_line_blank: true, .. });
                    self.blocks.push_back(children, block);
                }
                Step::Continuation(_) => unreachable!("continuation line outside a paragraph"),
            }
            first_pull = false;
        }
        self.close_container(stack);

        Block::ListItem {
            kind: marker.kind,
            loose,
            last_line_blank: pending_blank,
            children,
        }
    }
}
