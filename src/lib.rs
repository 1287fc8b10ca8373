//! marktree: a CommonMark parser that builds a node tree.
//!
//! Parsing runs in two passes. The block pass turns the whole document into
//! a tree of containers and leaves and collects link reference definitions;
//! the inline pass then parses each paragraph and heading with the finished
//! reference map.
//!
//! # Design Principles
//! - Pull-based block parsing with explicit backtracking through an
//!   offset-keyed lookahead cache
//! - Arena-backed node lists: O(1) append, unlink and range detach
//! - Delimiter-stack emphasis and link resolution
//! - Total over all input: malformed Markdown degrades to text, never errors

pub mod block;
pub mod cursor;
pub mod escape;
pub mod inline;
pub mod limits;
pub mod link_ref;
pub mod list;
pub mod render;

use log::debug;

// Re-export primary types
pub use block::{Block, BlockParser, ListKind};
pub use inline::{Inline, LinkKind, parse_inlines};
pub use link_ref::{LinkRefDef, LinkRefStore};
pub use list::{Arena, Handle, List};
pub use render::{HtmlWriter, render_document};

/// Parsing/rendering options.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Allow raw inline and block HTML. When false it is escaped as text.
    pub allow_html: bool,
    /// Resolve reference-style links. Definitions are consumed either way.
    pub allow_link_refs: bool,
    /// Container depth beyond which `>` and list markers are plain text.
    pub max_nesting: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allow_html: true,
            allow_link_refs: true,
            max_nesting: limits::MAX_BLOCK_NESTING,
        }
    }
}

/// Counters collected during the block pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    /// Containers opened.
    pub container_pushes: usize,
    /// Container exits consumed.
    pub container_exits: usize,
}

/// A parsed document.
#[derive(Debug)]
pub struct Document {
    /// Storage for every block node.
    pub blocks: Arena<Block>,
    /// Storage for every inline node.
    pub inlines: Arena<Inline>,
    /// Top-level blocks.
    pub root: List,
    /// Link reference definitions, by normalized label.
    pub refs: LinkRefStore,
    pub stats: ParseStats,
}

impl Document {
    /// Top-level blocks in order.
    pub fn top_level(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter(self.root)
    }
}

/// Parse Markdown into a [`Document`].
///
/// # Example
/// ```
/// use marktree::Block;
///
/// let doc = marktree::parse("> foo\nbar\n");
/// let quote = doc.top_level().next().unwrap();
/// let children = quote.block_children().unwrap();
/// let para = doc.blocks.iter(children).next().unwrap();
/// assert_eq!(para.inline_content().unwrap().0, "foo\nbar");
/// ```
pub fn parse(input: &str) -> Document {
    parse_with_options(input, &Options::default())
}

/// Parse Markdown into a [`Document`] with options.
pub fn parse_with_options(input: &str, options: &Options) -> Document {
    let source = block::normalize(input);
    let mut doc = BlockParser::with_max_nesting(&source, options.max_nesting).parse();

    let no_refs = LinkRefStore::new();
    let refs = if options.allow_link_refs {
        &doc.refs
    } else {
        &no_refs
    };

    let mut spans = 0usize;
    let mut pending = vec![doc.root];
    while let Some(list) = pending.pop() {
        for block in doc.blocks.iter(list) {
            if let Some(children) = block.block_children() {
                pending.push(children);
            } else if let Some((raw, out)) = block.inline_content() {
                parse_inlines(raw, &mut doc.inlines, out, refs);
                spans += 1;
            }
        }
    }
    debug!(
        "inline pass done: {spans} spans, {} inline nodes",
        doc.inlines.allocated()
    );
    doc
}

/// Convert Markdown to HTML.
///
/// This is the primary API for simple use cases.
///
/// # Example
/// ```
/// let html = marktree::to_html("# Hello\n\nWorld");
/// assert_eq!(html, "<h1>Hello</h1>\n<p>World</p>\n");
/// ```
pub fn to_html(input: &str) -> String {
    to_html_with_options(input, &Options::default())
}

/// Convert Markdown to HTML with options.
pub fn to_html_with_options(input: &str, options: &Options) -> String {
    let doc = parse_with_options(input, options);
    render_document(&doc, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(to_html(""), "");
        assert_eq!(to_html("\n\n"), "");
    }

    #[test]
    fn test_paragraph_and_heading() {
        assert_eq!(to_html("# Title\nbody"), "<h1>Title</h1>\n<p>body</p>\n");
    }

    #[test]
    fn test_nested_spans_are_inline_parsed() {
        let html = to_html("> - *a*\n");
        assert_eq!(
            html,
            "<blockquote>\n<ul>\n<li><em>a</em></li>\n</ul>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_disallow_html() {
        let options = Options {
            allow_html: false,
            ..Options::default()
        };
        assert_eq!(
            to_html_with_options("a <b>c</b>", &options),
            "<p>a &lt;b&gt;c&lt;/b&gt;</p>\n"
        );
        assert_eq!(
            to_html_with_options("<div>\nx\n</div>\n", &options),
            "&lt;div&gt;\nx\n&lt;/div&gt;\n"
        );
    }

    #[test]
    fn test_disallow_link_refs() {
        let input = "[foo]: /url\n\n[foo]\n";
        assert_eq!(to_html(input), "<p><a href=\"/url\">foo</a></p>\n");
        let options = Options {
            allow_link_refs: false,
            ..Options::default()
        };
        assert_eq!(to_html_with_options(input, &options), "<p>[foo]</p>\n");
    }

    #[test]
    fn test_stats_balance() {
        let doc = parse("> - a\n>   - b\n\nc\n");
        assert!(doc.stats.container_pushes > 0);
        assert_eq!(doc.stats.container_pushes, doc.stats.container_exits);
    }

    #[test]
    fn test_max_nesting_option() {
        let options = Options {
            max_nesting: 1,
            ..Options::default()
        };
        assert_eq!(
            to_html_with_options("> > a", &options),
            "<blockquote>\n<p>&gt; a</p>\n</blockquote>\n"
        );
    }
}
