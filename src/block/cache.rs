//! Offset-keyed replay queue for block parsing decisions.
//!
//! When a production looks ahead and decides what later input is, it parks
//! the result here keyed by the offset where scanning resumes after it.
//! The next pull of the block parser replays the earliest entry instead of
//! re-scanning, which is how a decision made deep inside one recursion frame
//! reaches the frame it belongs to.

use std::collections::{BTreeMap, VecDeque};

#[derive(Debug)]
pub struct LookaheadCache<T> {
    entries: BTreeMap<usize, VecDeque<T>>,
}

impl<T> Default for LookaheadCache<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> LookaheadCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total queued items across all offsets.
    pub fn len(&self) -> usize {
        self.entries.values().map(VecDeque::len).sum()
    }

    /// Pop the first item of the earliest offset. The caller moves its
    /// cursor to the returned offset.
    pub fn pop(&mut self) -> Option<(usize, T)> {
        let mut entry = self.entries.first_entry()?;
        let offset = *entry.key();
        let item = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        item.map(|item| (offset, item))
    }

    /// Queue a fresh decision at `offset`.
    ///
    /// # Panics
    ///
    /// If items are already queued there: two productions decided the same
    /// position, and silently merging would corrupt replay order.
    pub fn store<I: IntoIterator<Item = T>>(&mut self, offset: usize, items: I) {
        let queue: VecDeque<T> = items.into_iter().collect();
        if queue.is_empty() {
            return;
        }
        let previous = self.entries.insert(offset, queue);
        assert!(
            previous.is_none(),
            "lookahead cache already holds a decision for offset {offset}"
        );
    }

    /// Queue items at `offset` ahead of anything already queued there,
    /// keeping their relative order.
    pub fn store_front<I>(&mut self, offset: usize, items: I)
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: DoubleEndedIterator,
    {
        let queue = self.entries.entry(offset).or_default();
        for item in items.into_iter().rev() {
            queue.push_front(item);
        }
        if queue.is_empty() {
            self.entries.remove(&offset);
        }
    }
}
