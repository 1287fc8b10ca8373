//! Hard limits for pathological input.
//!
//! The grammar itself has no depth bound; these keep recursion and
//! backtracking bounded.

/// Maximum nesting depth for block containers (lists, blockquotes).
/// Deeper markers are read as paragraph text.
pub const MAX_BLOCK_NESTING: usize = 128;

/// Maximum parentheses nesting in link destinations (CommonMark: 32).
pub const MAX_LINK_PAREN_DEPTH: usize = 32;

/// Maximum digits in an ordered list marker.
pub const MAX_LIST_MARKER_DIGITS: usize = 9;

/// Maximum characters inside a link label's brackets.
pub const MAX_LINK_LABEL_LEN: usize = 999;

/// Maximum backtick run considered as a code span fence.
/// Longer runs are literal text.
pub const MAX_CODE_SPAN_BACKTICKS: usize = 1024;
