//! HTML rendering of a parsed [`Document`].
//!
//! Output matches the CommonMark reference renderer byte for byte: `cr()`
//! placement, tight-list paragraphs without `<p>`, plain-text image alt.

use crate::block::{Block, ListKind};
use crate::escape;
use crate::inline::Inline;
use crate::list::{Handle, List};
use crate::{Document, Options};

/// HTML output writer with pre-allocated, reusable buffer.
///
/// # Example
/// ```
/// use marktree::HtmlWriter;
///
/// let mut writer = HtmlWriter::new();
/// writer.write_str("<p>");
/// writer.write_escaped_text("Hello <World>");
/// writer.write_str("</p>");
///
/// let html = writer.into_string();
/// assert_eq!(html, "<p>Hello &lt;World&gt;</p>");
/// ```
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: Vec<u8>,
}

impl HtmlWriter {
    /// Create a new writer with default capacity.
    #[inline]
    pub fn new() -> Self {
        Self {
            out: Vec::with_capacity(1024),
        }
    }

    /// Write a static string (compile-time known).
    #[inline]
    pub fn write_str(&mut self, s: &'static str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    /// Write a dynamic string without escaping.
    #[inline]
    pub fn write_raw(&mut self, s: &str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    /// Write text with HTML escaping.
    #[inline]
    pub fn write_escaped_text(&mut self, text: &str) {
        escape::escape_text_into(&mut self.out, text.as_bytes());
    }

    /// Write a destination for `href` or `src`: percent-encoded, then
    /// HTML-escaped.
    #[inline]
    pub fn write_url(&mut self, url: &str) {
        escape::escape_url_into(&mut self.out, url.as_bytes());
    }

    /// Newline unless the output is empty or already ends with one.
    #[inline]
    pub fn cr(&mut self) {
        if self.out.last().is_some_and(|&b| b != b'\n') {
            self.out.push(b'\n');
        }
    }

    /// Take ownership as String.
    #[inline]
    pub fn into_string(self) -> String {
        // Only `&str` content and ASCII markup is ever written, so the
        // buffer is valid UTF-8.
        String::from_utf8(self.out)
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
    }

    fn heading_tag(&mut self, close: bool, level: u8) {
        debug_assert!((1..=6).contains(&level));
        self.write_str(if close { "</h" } else { "<h" });
        self.out.push(b'0' + level);
        self.out.push(b'>');
    }

    /// Write a u32 as decimal (for `<ol start>`).
    #[inline]
    fn write_u32(&mut self, mut n: u32) {
        let mut buf = [0u8; 10];
        let mut start = buf.len();
        loop {
            start -= 1;
            buf[start] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        self.out.extend_from_slice(&buf[start..]);
    }
}

/// Render a parsed document to HTML.
pub fn render_document(doc: &Document, options: &Options) -> String {
    let mut renderer = Renderer {
        doc,
        options,
        w: HtmlWriter::new(),
    };
    renderer.blocks(doc.root, false);
    renderer.w.into_string()
}

struct Renderer<'d> {
    doc: &'d Document,
    options: &'d Options,
    w: HtmlWriter,
}

impl Renderer<'_> {
    /// `tight`: paragraphs are direct children of a tight list's item and
    /// lose their `<p>` wrapper.
    fn blocks(&mut self, list: List, tight: bool) {
        for block in self.doc.blocks.iter(list) {
            self.block(block, tight);
        }
    }

    fn block(&mut self, block: &Block, tight: bool) {
        match block {
            Block::Paragraph { children, .. } => {
                if tight {
                    self.inlines(*children);
                } else {
                    self.w.cr();
                    self.w.write_str("<p>");
                    self.inlines(*children);
                    self.w.write_str("</p>");
                    self.w.cr();
                }
            }
            Block::Heading {
                level, children, ..
            } => {
                self.w.cr();
                self.w.heading_tag(false, *level);
                self.inlines(*children);
                self.w.heading_tag(true, *level);
                self.w.cr();
            }
            Block::ThematicBreak => {
                self.w.cr();
                self.w.write_str("<hr />");
                self.w.cr();
            }
            Block::BlockQuote { children } => {
                self.w.cr();
                self.w.write_str("<blockquote>");
                self.w.cr();
                self.blocks(*children, false);
                self.w.cr();
                self.w.write_str("</blockquote>");
                self.w.cr();
            }
            Block::List {
                kind,
                loose,
                children,
                ..
            } => {
                let close = match *kind {
                    ListKind::Unordered { .. } => {
                        self.w.cr();
                        self.w.write_str("<ul>");
                        "</ul>"
                    }
                    ListKind::Ordered { start, .. } => {
                        self.w.cr();
                        if start == 1 {
                            self.w.write_str("<ol>");
                        } else {
                            self.w.write_str("<ol start=\"");
                            self.w.write_u32(start);
                            self.w.write_str("\">");
                        }
                        "</ol>"
                    }
                };
                self.w.cr();
                for item in self.doc.blocks.iter(*children) {
                    self.block(item, !*loose);
                }
                self.w.cr();
                self.w.write_str(close);
                self.w.cr();
            }
            Block::ListItem { children, .. } => {
                self.w.cr();
                self.w.write_str("<li>");
                self.blocks(*children, tight);
                self.w.write_str("</li>");
                self.w.cr();
            }
            Block::FencedCode { info, literal, .. } => {
                let lang = info.split_ascii_whitespace().next();
                self.code_block(lang, literal);
            }
            Block::IndentedCode { literal } => self.code_block(None, literal),
            Block::HtmlBlock { raw, .. } => {
                self.w.cr();
                if self.options.allow_html {
                    self.w.write_raw(raw);
                } else {
                    self.w.write_escaped_text(raw);
                }
                self.w.cr();
            }
        }
    }

    fn code_block(&mut self, lang: Option<&str>, literal: &str) {
        self.w.cr();
        match lang {
            Some(lang) => {
                self.w.write_str("<pre><code class=\"language-");
                self.w.write_escaped_text(lang);
                self.w.write_str("\">");
            }
            None => self.w.write_str("<pre><code>"),
        }
        self.w.write_escaped_text(literal);
        self.w.write_str("</code></pre>");
        self.w.cr();
    }

    /// Inline content is walked with an explicit stack of open lists, each
    /// with the tag that closes it, so nesting depth costs heap, not stack.
    fn inlines(&mut self, list: List) {
        let doc = self.doc;
        let mut open: Vec<(Option<Handle>, &'static str)> = vec![(doc.inlines.first(list), "")];
        while let Some(top) = open.last_mut() {
            let Some(h) = top.0 else {
                let close = top.1;
                open.pop();
                self.w.write_str(close);
                continue;
            };
            top.0 = doc.inlines.next(h);

            match doc.inlines.get(h) {
                Inline::Text(text) => self.w.write_escaped_text(text),
                Inline::Code(code) => {
                    self.w.write_str("<code>");
                    self.w.write_escaped_text(code);
                    self.w.write_str("</code>");
                }
                Inline::Emphasis { children } => {
                    self.w.write_str("<em>");
                    open.push((doc.inlines.first(*children), "</em>"));
                }
                Inline::Strong { children } => {
                    self.w.write_str("<strong>");
                    open.push((doc.inlines.first(*children), "</strong>"));
                }
                Inline::Link {
                    dest,
                    title,
                    children,
                    ..
                } => {
                    self.w.write_str("<a href=\"");
                    self.w.write_url(dest);
                    self.title(title.as_deref());
                    self.w.write_str("\">");
                    open.push((doc.inlines.first(*children), "</a>"));
                }
                Inline::Image {
                    dest,
                    title,
                    children,
                    ..
                } => {
                    self.w.write_str("<img src=\"");
                    self.w.write_url(dest);
                    self.w.write_str("\" alt=\"");
                    let mut alt = String::new();
                    plain_text(doc, *children, &mut alt);
                    self.w.write_escaped_text(&alt);
                    self.title(title.as_deref());
                    self.w.write_str("\" />");
                }
                Inline::Autolink { dest, text, .. } => {
                    self.w.write_str("<a href=\"");
                    self.w.write_url(dest);
                    self.w.write_str("\">");
                    self.w.write_escaped_text(text);
                    self.w.write_str("</a>");
                }
                Inline::Html(raw) => {
                    if self.options.allow_html {
                        self.w.write_raw(raw);
                    } else {
                        self.w.write_escaped_text(raw);
                    }
                }
                Inline::SoftBreak => self.w.write_str("\n"),
                Inline::HardBreak => self.w.write_str("<br />\n"),
            }
        }
    }

    fn title(&mut self, title: Option<&str>) {
        if let Some(title) = title {
            self.w.write_str("\" title=\"");
            self.w.write_escaped_text(title);
        }
    }
}

/// Text content of an inline list, markup dropped. Used for `alt`.
fn plain_text(doc: &Document, list: List, out: &mut String) {
    let mut open = vec![doc.inlines.first(list)];
    while let Some(top) = open.last_mut() {
        let Some(h) = *top else {
            open.pop();
            continue;
        };
        *top = doc.inlines.next(h);
        match doc.inlines.get(h) {
            Inline::Text(text) | Inline::Code(text) | Inline::Html(text) => out.push_str(text),
            Inline::Autolink { text, .. } => out.push_str(text),
            Inline::SoftBreak | Inline::HardBreak => out.push('\n'),
            other => {
                if let Some(children) = other.children() {
                    open.push(doc.inlines.first(children));
                }
            }
        }
    }
}
