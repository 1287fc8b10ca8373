//! Inline node types.

use crate::list::List;

/// How a link or image found its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `[text](dest "title")`
    Inline,
    /// `[text][label]`
    Full,
    /// `[label][]`
    Collapsed,
    /// `[label]`
    Shortcut,
}

/// An inline node. Nodes with children own a list in the same arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Literal text, escapes and entities already decoded.
    Text(String),
    /// Code span content, line endings folded to spaces.
    Code(String),
    Emphasis {
        children: List,
    },
    Strong {
        children: List,
    },
    Link {
        kind: LinkKind,
        dest: String,
        title: Option<String>,
        children: List,
    },
    /// Image; its children make up the alt text.
    Image {
        kind: LinkKind,
        dest: String,
        title: Option<String>,
        children: List,
    },
    /// `<scheme:...>` or `<user@host>`.
    Autolink {
        /// Link target, `mailto:` prepended for email addresses.
        dest: String,
        /// Text between the angle brackets.
        text: String,
        is_email: bool,
    },
    /// Raw inline HTML, verbatim.
    Html(String),
    SoftBreak,
    HardBreak,
}

impl Inline {
    /// Child list of emphasis, links and images.
    pub fn children(&self) -> Option<List> {
        match self {
            Self::Emphasis { children }
            | Self::Strong { children }
            | Self::Link { children, .. }
            | Self::Image { children, .. } => Some(*children),
            _ => None,
        }
    }

    /// Text content, for text nodes.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}
