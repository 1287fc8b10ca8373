//! Code span matching.
//!
//! Backtick runs must match exactly. Every maximal run in the span is
//! indexed by length on first use; a closer search for length `n` pops
//! positions from the front of that length's queue, so each run is looked at
//! once no matter how many unmatched openers there are.

use std::collections::VecDeque;

use memchr::memchr;
use rustc_hash::FxHashMap;

/// Backtick runs of one inline span, by length.
#[derive(Debug, Default)]
pub(super) struct BacktickIndex {
    runs: Option<FxHashMap<usize, VecDeque<usize>>>,
}

impl BacktickIndex {
    fn build(text: &[u8]) -> FxHashMap<usize, VecDeque<usize>> {
        let mut runs: FxHashMap<usize, VecDeque<usize>> = FxHashMap::default();
        let mut pos = 0;
        while let Some(found) = memchr(b'`', &text[pos..]) {
            let start = pos + found;
            let len = text[start..].iter().take_while(|&&b| b == b'`').count();
            runs.entry(len).or_default().push_back(start);
            pos = start + len;
        }
        runs
    }

    /// Start of the first run of exactly `len` backticks at or after
    /// `after`.
    ///
    /// Scanning only moves forward, so runs before `after` are dropped.
    pub fn find_closer(&mut self, text: &[u8], len: usize, after: usize) -> Option<usize> {
        let runs = self.runs.get_or_insert_with(|| Self::build(text));
        let queue = runs.get_mut(&len)?;
        while queue.front().is_some_and(|&start| start < after) {
            queue.pop_front();
        }
        queue.pop_front()
    }
}

/// Code span content: line endings become spaces, and one space is
/// stripped from each end when both ends have one and the content is not
/// all spaces.
pub(super) fn normalize_content(raw: &str) -> String {
    let content = raw.replace('\n', " ");
    let bytes = content.as_bytes();
    let strip = bytes.len() >= 2
        && bytes[0] == b' '
        && bytes[bytes.len() - 1] == b' '
        && bytes.iter().any(|&b| b != b' ');
    if strip {
        content[1..content.len() - 1].to_owned()
    } else {
        content
    }
}
