//! Escaping and unescaping.
//!
//! Output side: HTML text escaping and URL percent-encoding for the renderer.
//! Input side: backslash escapes and entity/numeric character references,
//! decoded into the strings stored on nodes.
//!
//! Fast-path optimized: scans for the first escapable character with memchr,
//! then bulk-copies segments between escapes.

use memchr::{memchr, memchr2, memchr3};

/// Lookup table for escapable characters in text content and attributes.
const TEXT_ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table
};

/// Escape HTML text content into output buffer.
///
/// Escapes `<`, `>`, `&` and `"`.
///
/// # Example
/// ```
/// use marktree::escape::escape_text_into;
///
/// let mut out = Vec::new();
/// escape_text_into(&mut out, b"<script>");
/// assert_eq!(out, b"&lt;script&gt;");
/// ```
#[inline]
pub fn escape_text_into(out: &mut Vec<u8>, input: &[u8]) {
    let mut pos = match first_text_escape(input) {
        Some(p) => p,
        None => {
            out.extend_from_slice(input);
            return;
        }
    };
    out.extend_from_slice(&input[..pos]);

    while pos < input.len() {
        let scan_start = pos;
        while pos < input.len() && !TEXT_ESCAPE_TABLE[input[pos] as usize] {
            pos += 1;
        }
        out.extend_from_slice(&input[scan_start..pos]);

        if pos < input.len() {
            let escape_seq: &[u8] = match input[pos] {
                b'<' => b"&lt;",
                b'>' => b"&gt;",
                b'&' => b"&amp;",
                b'"' => b"&quot;",
                _ => unreachable!(),
            };
            out.extend_from_slice(escape_seq);
            pos += 1;
        }
    }
}

#[inline]
fn first_text_escape(input: &[u8]) -> Option<usize> {
    let a = memchr3(b'<', b'>', b'&', input);
    let b = memchr(b'"', input);
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Escape and return as a String.
pub fn escape_text_to_string(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len() + input.len() / 8);
    escape_text_into(&mut out, input.as_bytes());
    // Only ASCII sequences were substituted for ASCII bytes.
    String::from_utf8(out).unwrap_or_default()
}

/// ASCII punctuation: the characters a backslash may escape.
#[inline]
pub fn is_ascii_punctuation(b: u8) -> bool {
    b.is_ascii_punctuation()
}

/// Whether a URL byte is kept verbatim by [`escape_url_into`].
#[inline]
fn is_url_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' | b';' | b'/'
                | b'?' | b':' | b'@' | b'&' | b'=' | b'+' | b'$' | b',' | b'#'
        )
}

/// Percent-encode a link destination and HTML-escape it for an `href`/`src`.
///
/// Existing `%XX` escapes are preserved; a `%` not followed by two hex
/// digits is encoded as `%25`.
pub fn escape_url_into(out: &mut Vec<u8>, url: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut pos = 0;
    while pos < url.len() {
        let b = url[pos];
        if b == b'%'
            && pos + 2 < url.len()
            && url[pos + 1].is_ascii_hexdigit()
            && url[pos + 2].is_ascii_hexdigit()
        {
            out.extend_from_slice(&url[pos..pos + 3]);
            pos += 3;
            continue;
        }
        match b {
            b'&' => out.extend_from_slice(b"&amp;"),
            _ if is_url_safe(b) => out.push(b),
            _ => {
                out.push(b'%');
                out.push(HEX[(b >> 4) as usize]);
                out.push(HEX[(b & 0xF) as usize]);
            }
        }
        pos += 1;
    }
}

/// Decode a character reference starting at `input[0] == b'&'`.
///
/// Returns the decoded text and the number of bytes consumed, or `None`
/// if the text there is not a valid entity or numeric reference.
pub fn decode_entity(input: &[u8]) -> Option<(String, usize)> {
    debug_assert_eq!(input.first(), Some(&b'&'));
    let semi = memchr(b';', &input[..input.len().min(40)])?;
    let body = &input[1..semi];

    if let Some(num) = body.strip_prefix(b"#") {
        let (digits, radix) = match num.first() {
            Some(b'x' | b'X') => (&num[1..], 16),
            _ => (num, 10),
        };
        let max_len = if radix == 16 { 6 } else { 7 };
        let all_digits = digits.iter().all(|b| match radix {
            16 => b.is_ascii_hexdigit(),
            _ => b.is_ascii_digit(),
        });
        if digits.is_empty() || digits.len() > max_len || !all_digits {
            return None;
        }
        let text = std::str::from_utf8(digits).ok()?;
        let code = u32::from_str_radix(text, radix).ok()?;
        let ch = match code {
            0 => '\u{FFFD}',
            _ => char::from_u32(code).unwrap_or('\u{FFFD}'),
        };
        return Some((ch.to_string(), semi + 1));
    }

    let is_name = body.len() >= 2
        && body.len() <= 32
        && body[0].is_ascii_alphabetic()
        && body.iter().all(u8::is_ascii_alphanumeric);
    if !is_name {
        return None;
    }
    let raw = std::str::from_utf8(&input[..=semi]).ok()?;
    let decoded = html_escape::decode_html_entities(raw);
    // A leftover `;` means only a legacy prefix such as `&amp` was decoded.
    if decoded == raw || (decoded.ends_with(';') && decoded != ";") {
        return None;
    }
    let mut decoded = decoded.into_owned();
    if let Some(tail) = combining_tail(body) {
        decoded.push(tail);
    }
    Some((decoded, semi + 1))
}

/// Named references that decode to two code points. The entity table in
/// `html-escape` keeps only the first one; this holds the second, sorted by
/// name.
const COMBINING_TAILS: &[(&[u8], char)] = &[
    (b"NotEqualTilde", '\u{338}'),
    (b"NotGreaterFullEqual", '\u{338}'),
    (b"NotGreaterGreater", '\u{338}'),
    (b"NotGreaterSlantEqual", '\u{338}'),
    (b"NotHumpDownHump", '\u{338}'),
    (b"NotHumpEqual", '\u{338}'),
    (b"NotLeftTriangleBar", '\u{338}'),
    (b"NotLessLess", '\u{338}'),
    (b"NotLessSlantEqual", '\u{338}'),
    (b"NotNestedGreaterGreater", '\u{338}'),
    (b"NotNestedLessLess", '\u{338}'),
    (b"NotPrecedesEqual", '\u{338}'),
    (b"NotRightTriangleBar", '\u{338}'),
    (b"NotSquareSubset", '\u{338}'),
    (b"NotSquareSuperset", '\u{338}'),
    (b"NotSubset", '\u{20D2}'),
    (b"NotSucceedsEqual", '\u{338}'),
    (b"NotSucceedsTilde", '\u{338}'),
    (b"NotSuperset", '\u{20D2}'),
    (b"ThickSpace", '\u{200A}'),
    (b"acE", '\u{333}'),
    (b"bne", '\u{20E5}'),
    (b"bnequiv", '\u{20E5}'),
    (b"caps", '\u{FE00}'),
    (b"cups", '\u{FE00}'),
    (b"fjlig", '\u{6A}'),
    (b"gesl", '\u{FE00}'),
    (b"gvertneqq", '\u{FE00}'),
    (b"gvnE", '\u{FE00}'),
    (b"lates", '\u{FE00}'),
    (b"lesg", '\u{FE00}'),
    (b"lvertneqq", '\u{FE00}'),
    (b"lvnE", '\u{FE00}'),
    (b"nGg", '\u{338}'),
    (b"nGt", '\u{20D2}'),
    (b"nGtv", '\u{338}'),
    (b"nLl", '\u{338}'),
    (b"nLt", '\u{20D2}'),
    (b"nLtv", '\u{338}'),
    (b"nang", '\u{20D2}'),
    (b"napE", '\u{338}'),
    (b"napid", '\u{338}'),
    (b"nbump", '\u{338}'),
    (b"nbumpe", '\u{338}'),
    (b"ncongdot", '\u{338}'),
    (b"nedot", '\u{338}'),
    (b"nesim", '\u{338}'),
    (b"ngE", '\u{338}'),
    (b"ngeqq", '\u{338}'),
    (b"ngeqslant", '\u{338}'),
    (b"nges", '\u{338}'),
    (b"nlE", '\u{338}'),
    (b"nleqq", '\u{338}'),
    (b"nleqslant", '\u{338}'),
    (b"nles", '\u{338}'),
    (b"notinE", '\u{338}'),
    (b"notindot", '\u{338}'),
    (b"nparsl", '\u{20E5}'),
    (b"npart", '\u{338}'),
    (b"npre", '\u{338}'),
    (b"npreceq", '\u{338}'),
    (b"nrarrc", '\u{338}'),
    (b"nrarrw", '\u{338}'),
    (b"nsce", '\u{338}'),
    (b"nsubE", '\u{338}'),
    (b"nsubset", '\u{20D2}'),
    (b"nsubseteqq", '\u{338}'),
    (b"nsucceq", '\u{338}'),
    (b"nsupE", '\u{338}'),
    (b"nsupset", '\u{20D2}'),
    (b"nsupseteqq", '\u{338}'),
    (b"nvap", '\u{20D2}'),
    (b"nvge", '\u{20D2}'),
    (b"nvgt", '\u{20D2}'),
    (b"nvle", '\u{20D2}'),
    (b"nvlt", '\u{20D2}'),
    (b"nvltrie", '\u{20D2}'),
    (b"nvrtrie", '\u{20D2}'),
    (b"nvsim", '\u{20D2}'),
    (b"race", '\u{331}'),
    (b"smtes", '\u{FE00}'),
    (b"sqcaps", '\u{FE00}'),
    (b"sqcups", '\u{FE00}'),
    (b"varsubsetneq", '\u{FE00}'),
    (b"varsubsetneqq", '\u{FE00}'),
    (b"varsupsetneq", '\u{FE00}'),
    (b"varsupsetneqq", '\u{FE00}'),
    (b"vnsub", '\u{20D2}'),
    (b"vnsup", '\u{20D2}'),
    (b"vsubnE", '\u{FE00}'),
    (b"vsubne", '\u{FE00}'),
    (b"vsupnE", '\u{FE00}'),
    (b"vsupne", '\u{FE00}'),
];

/// Second code point of a two-code-point named reference.
fn combining_tail(name: &[u8]) -> Option<char> {
    COMBINING_TAILS
        .binary_search_by(|(probe, _)| probe.cmp(&name))
        .ok()
        .map(|idx| COMBINING_TAILS[idx].1)
}

/// Process backslash escapes and character references in a link
/// destination, link title or info string.
pub fn unescape_string(input: &[u8]) -> String {
    if memchr2(b'\\', b'&', input).is_none() {
        return String::from_utf8_lossy(input).into_owned();
    }

    let mut out: Vec<u8> = Vec::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        match input[pos] {
            b'\\' if pos + 1 < input.len() && is_ascii_punctuation(input[pos + 1]) => {
                out.push(input[pos + 1]);
                pos += 2;
            }
            b'&' => match decode_entity(&input[pos..]) {
                Some((text, used)) => {
                    out.extend_from_slice(text.as_bytes());
                    pos += used;
                }
                None => {
                    out.push(b'&');
                    pos += 1;
                }
            },
            b => {
                out.push(b);
                pos += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
