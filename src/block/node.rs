//! Block-level node types.

use crate::list::List;

/// List marker kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Bullet list (`-`, `+`, `*`).
    Unordered {
        /// The bullet character.
        bullet: u8,
    },
    /// Ordered list (`1.`, `1)`).
    Ordered {
        /// Number of the first item.
        start: u32,
        /// `.` or `)`.
        delimiter: u8,
    },
}

impl ListKind {
    /// The character that must repeat for a following item to belong to
    /// the same list: the bullet, or the ordered delimiter.
    pub fn marker_char(self) -> u8 {
        match self {
            Self::Unordered { bullet } => bullet,
            Self::Ordered { delimiter, .. } => delimiter,
        }
    }

    pub fn is_ordered(self) -> bool {
        matches!(self, Self::Ordered { .. })
    }
}

/// A block node.
///
/// Container variants own a list of child blocks in the document's block
/// arena; paragraphs and headings own a list of inline children in the
/// inline arena, filled in by the inline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Paragraph.
    Paragraph {
        /// Unparsed content, lines joined with `\n`.
        raw: String,
        /// Inline children.
        children: List,
    },
    /// ATX (`# Title`) or Setext (`Title\n===`) heading.
    Heading {
        /// Heading level (1-6).
        level: u8,
        /// Whether this came from an underline.
        setext: bool,
        /// Unparsed content.
        raw: String,
        /// Inline children.
        children: List,
    },
    /// Thematic break (`---`, `***`, `___`).
    ThematicBreak,
    /// Block quote (`> ...`).
    BlockQuote {
        /// Child blocks.
        children: List,
    },
    /// Bullet or ordered list.
    List {
        kind: ListKind,
        /// Loose lists wrap item paragraphs in `<p>`.
        loose: bool,
        /// The last item ended with a blank line.
        last_line_blank: bool,
        /// Child list items.
        children: List,
    },
    /// One list item.
    ListItem {
        kind: ListKind,
        /// Blank line between two of this item's direct children.
        loose: bool,
        /// The item ended with a blank line.
        last_line_blank: bool,
        /// Child blocks.
        children: List,
    },
    /// Fenced code block.
    FencedCode {
        /// `` ` `` or `~`.
        fence: u8,
        /// Unescaped info string.
        info: String,
        /// Body, every line terminated by `\n`.
        literal: String,
    },
    /// Indented code block.
    IndentedCode {
        /// Body, every line terminated by `\n`.
        literal: String,
    },
    /// Raw HTML block.
    HtmlBlock {
        /// Start condition, 1 through 7.
        kind: u8,
        /// Verbatim lines, every line terminated by `\n`.
        raw: String,
    },
}

impl Block {
    /// Child block list of a container.
    pub fn block_children(&self) -> Option<List> {
        match self {
            Self::BlockQuote { children }
            | Self::List { children, .. }
            | Self::ListItem { children, .. } => Some(*children),
            _ => None,
        }
    }

    /// Raw text span and inline child list of a leaf holding inline content.
    pub fn inline_content(&self) -> Option<(&str, List)> {
        match self {
            Self::Paragraph { raw, children } | Self::Heading { raw, children, .. } => {
                Some((raw.as_str(), *children))
            }
            _ => None,
        }
    }
}
