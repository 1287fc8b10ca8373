//! Block-level parser for Markdown.
//!
//! The block parser is line-oriented and handles:
//! - Thematic breaks
//! - ATX and Setext headings
//! - Fenced and indented code blocks
//! - HTML blocks
//! - Blockquotes
//! - Lists
//! - Paragraphs and link reference definitions

mod cache;
mod html_block;
mod leaf;
mod node;
mod parser;
mod scan;

pub use cache::LookaheadCache;
pub use node::{Block, ListKind};
pub use parser::BlockParser;
pub use scan::{Container, ContainerStack, LineInfo, check_prefix, next_line, skip_indentation};

use memchr::{memchr, memchr2};

/// Columns per tab stop.
const TAB_STOP: usize = 4;

/// Prepare raw input for block parsing.
///
/// - `\r\n` and lone `\r` become `\n`
/// - NUL becomes U+FFFD
/// - tabs in the structural part of each line (indentation, `>` markers
///   and list markers) are expanded to the next multiple of four columns;
///   tabs anywhere else are kept
/// - a final `\n` is appended when missing
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 1);
    let unified;
    let text = if memchr2(b'\r', b'\0', input.as_bytes()).is_some() {
        unified = input
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .replace('\0', "\u{FFFD}");
        unified.as_str()
    } else {
        input
    };

    for line in text.split_inclusive('\n') {
        expand_structural_tabs(line, &mut out);
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn expand_structural_tabs(line: &str, out: &mut String) {
    let bytes = line.as_bytes();
    if memchr(b'\t', bytes).is_none() {
        out.push_str(line);
        return;
    }

    let followed_by_ws = |at: usize| matches!(bytes.get(at), None | Some(b' ' | b'\t' | b'\n'));
    let mut col = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\t' => {
                let width = TAB_STOP - col % TAB_STOP;
                out.extend(std::iter::repeat_n(' ', width));
                col += width;
                i += 1;
            }
            b @ (b' ' | b'>') => {
                out.push(b as char);
                col += 1;
                i += 1;
            }
            b @ (b'-' | b'+' | b'*') if followed_by_ws(i + 1) => {
                out.push(b as char);
                col += 1;
                i += 1;
            }
            b'0'..=b'9' => {
                let digits = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
                let delim = i + digits;
                if !matches!(bytes.get(delim), Some(b'.' | b')')) || !followed_by_ws(delim + 1) {
                    break;
                }
                out.push_str(&line[i..=delim]);
                col += digits + 1;
                i = delim + 1;
            }
            _ => break,
        }
    }
    out.push_str(&line[i..]);
}
