//! Ordered node lists with stable handles.
//!
//! Elements of every list live in one [`Arena`]; a [`List`] is a pair of
//! sentinel slots and links are `u32` indices. Appending, unlinking a single
//! element and cutting a contiguous run out into a fresh list are all O(1),
//! and no element is ever moved in memory.
//!
//! The inline parser uses the same structure for its output nodes and for its
//! delimiter stack: a link's children and an emphasis node's children are
//! produced by detaching the run between two handles.

use std::fmt;

const NIL: u32 = u32::MAX;

/// Stable reference to one element of an [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u32);

impl Handle {
    /// Raw slot index, stable for the lifetime of the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An ordered sequence inside an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct List {
    head: u32,
    tail: u32,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    /// `None` only for sentinels.
    value: Option<T>,
    prev: u32,
    next: u32,
}

/// Slab storage shared by any number of [`List`]s.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Number of slots ever allocated, sentinels included.
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    fn alloc(&mut self, value: Option<T>) -> u32 {
        let idx = self.slots.len();
        assert!(idx < NIL as usize, "arena exhausted");
        self.slots.push(Slot {
            value,
            prev: NIL,
            next: NIL,
        });
        idx as u32
    }

    #[inline]
    fn is_sentinel(&self, idx: u32) -> bool {
        self.slots[idx as usize].value.is_none()
    }

    /// Create a new empty list.
    pub fn new_list(&mut self) -> List {
        let head = self.alloc(None);
        let tail = self.alloc(None);
        self.slots[head as usize].next = tail;
        self.slots[tail as usize].prev = head;
        List { head, tail }
    }

    /// Append `value` at the end of `list`.
    pub fn push_back(&mut self, list: List, value: T) -> Handle {
        let last = self.slots[list.tail as usize].prev;
        self.link_after(last, value)
    }

    /// Insert `value` directly after `at`.
    pub fn insert_after(&mut self, at: Handle, value: T) -> Handle {
        self.link_after(at.0, value)
    }

    fn link_after(&mut self, prev: u32, value: T) -> Handle {
        let next = self.slots[prev as usize].next;
        debug_assert!(next != NIL, "insert next to an unlinked element");
        let idx = self.alloc(Some(value));
        let slot = &mut self.slots[idx as usize];
        slot.prev = prev;
        slot.next = next;
        self.slots[prev as usize].next = idx;
        self.slots[next as usize].prev = idx;
        Handle(idx)
    }

    /// Unlink one element. Its value stays readable through [`Arena::get`],
    /// but the handle no longer belongs to any list.
    pub fn remove(&mut self, handle: Handle) {
        let slot = &self.slots[handle.index()];
        let (prev, next) = (slot.prev, slot.next);
        debug_assert!(
            prev != NIL && next != NIL,
            "handle {handle:?} removed twice"
        );
        self.slots[prev as usize].next = next;
        self.slots[next as usize].prev = prev;
        let slot = &mut self.slots[handle.index()];
        slot.prev = NIL;
        slot.next = NIL;
    }

    /// Move the run `[start, end)` of `list` into a new list. `end == None`
    /// means through the end of `list`.
    pub fn detach(&mut self, list: List, start: Handle, end: Option<Handle>) -> List {
        let before = self.slots[start.index()].prev;
        debug_assert!(before != NIL, "detach from an unlinked element");
        let after = end.map_or(list.tail, |h| h.0);
        self.detach_raw(before, after)
    }

    /// Move everything strictly between `after` and `before` into a new list.
    pub fn detach_between(&mut self, after: Handle, before: Handle) -> List {
        self.detach_raw(after.0, before.0)
    }

    /// Move everything after `after` up to the end of `list` into a new list.
    pub fn split_off_after(&mut self, list: List, after: Handle) -> List {
        self.detach_raw(after.0, list.tail)
    }

    fn detach_raw(&mut self, before: u32, after: u32) -> List {
        let out = self.new_list();
        let first = self.slots[before as usize].next;
        if first == after {
            return out;
        }
        let last = self.slots[after as usize].prev;

        self.slots[before as usize].next = after;
        self.slots[after as usize].prev = before;

        self.slots[out.head as usize].next = first;
        self.slots[first as usize].prev = out.head;
        self.slots[out.tail as usize].prev = last;
        self.slots[last as usize].next = out.tail;
        out
    }

    pub fn first(&self, list: List) -> Option<Handle> {
        let idx = self.slots[list.head as usize].next;
        (!self.is_sentinel(idx)).then_some(Handle(idx))
    }

    pub fn last(&self, list: List) -> Option<Handle> {
        let idx = self.slots[list.tail as usize].prev;
        (!self.is_sentinel(idx)).then_some(Handle(idx))
    }

    pub fn next(&self, handle: Handle) -> Option<Handle> {
        let idx = self.slots[handle.index()].next;
        debug_assert!(idx != NIL, "walk from an unlinked element");
        (idx != NIL && !self.is_sentinel(idx)).then_some(Handle(idx))
    }

    pub fn prev(&self, handle: Handle) -> Option<Handle> {
        let idx = self.slots[handle.index()].prev;
        debug_assert!(idx != NIL, "walk from an unlinked element");
        (idx != NIL && !self.is_sentinel(idx)).then_some(Handle(idx))
    }

    /// Whether `handle` currently belongs to some list.
    pub fn is_linked(&self, handle: Handle) -> bool {
        self.slots[handle.index()].next != NIL
    }

    pub fn is_empty(&self, list: List) -> bool {
        self.slots[list.head as usize].next == list.tail
    }

    /// Element count; walks the list.
    pub fn len(&self, list: List) -> usize {
        self.handles(list).count()
    }

    #[inline]
    pub fn get(&self, handle: Handle) -> &T {
        match &self.slots[handle.index()].value {
            Some(value) => value,
            None => panic!("handle {handle:?} points at a list sentinel"),
        }
    }

    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.slots[handle.index()].value {
            Some(value) => value,
            None => panic!("handle {handle:?} points at a list sentinel"),
        }
    }

    /// Iterate the handles of `list` in order.
    pub fn handles(&self, list: List) -> Handles<'_, T> {
        Handles {
            arena: self,
            next: self.slots[list.head as usize].next,
        }
    }

    /// Iterate the values of `list` in order.
    pub fn iter(&self, list: List) -> impl Iterator<Item = &T> + '_ {
        self.handles(list).map(move |h| self.get(h))
    }
}

/// Iterator over the handles of one list.
pub struct Handles<'a, T> {
    arena: &'a Arena<T>,
    next: u32,
}

impl<T> Iterator for Handles<'_, T> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        if self.next == NIL || self.arena.is_sentinel(self.next) {
            return None;
        }
        let current = self.next;
        self.next = self.arena.slots[current as usize].next;
        Some(Handle(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(arena: &Arena<u32>, list: List) -> Vec<u32> {
        arena.iter(list).copied().collect()
    }

    #[test]
    fn test_push_and_iterate() {
        let mut arena = Arena::new();
        let list = arena.new_list();
        assert!(arena.is_empty(list));
        for i in 0..4 {
            arena.push_back(list, i);
        }
        assert_eq!(collect(&arena, list), vec![0, 1, 2, 3]);
        assert_eq!(arena.len(list), 4);
    }

    #[test]
    fn test_remove_middle() {
        let mut arena = Arena::new();
        let list = arena.new_list();
        let a = arena.push_back(list, 1);
        let b = arena.push_back(list, 2);
        arena.push_back(list, 3);
        arena.remove(b);
        assert_eq!(collect(&arena, list), vec![1, 3]);
        assert!(!arena.is_linked(b));
        assert_eq!(*arena.get(b), 2);
        assert_eq!(arena.next(a).map(|h| *arena.get(h)), Some(3));
    }

    #[test]
    fn test_detach_range() {
        let mut arena = Arena::new();
        let list = arena.new_list();
        let handles: Vec<_> = (0..6).map(|i| arena.push_back(list, i)).collect();
        let cut = arena.detach(list, handles[1], Some(handles[4]));
        assert_eq!(collect(&arena, list), vec![0, 4, 5]);
        assert_eq!(collect(&arena, cut), vec![1, 2, 3]);

        let rest = arena.detach(list, handles[4], None);
        assert_eq!(collect(&arena, list), vec![0]);
        assert_eq!(collect(&arena, rest), vec![4, 5]);
    }

    #[test]
    fn test_detach_between_adjacent_is_empty() {
        let mut arena = Arena::new();
        let list = arena.new_list();
        let a = arena.push_back(list, 1);
        let b = arena.push_back(list, 2);
        let cut = arena.detach_between(a, b);
        assert!(arena.is_empty(cut));
        assert_eq!(collect(&arena, list), vec![1, 2]);
    }

    #[test]
    fn test_split_off_after() {
        let mut arena = Arena::new();
        let list = arena.new_list();
        let handles: Vec<_> = (0..5).map(|i| arena.push_back(list, i)).collect();
        let tail = arena.split_off_after(list, handles[2]);
        assert_eq!(collect(&arena, tail), vec![3, 4]);
        arena.push_back(tail, 9);
        assert_eq!(collect(&arena, list), vec![0, 1, 2]);
        assert_eq!(collect(&arena, tail), vec![3, 4, 9]);
    }

    #[test]
    fn test_insert_after_and_prev() {
        let mut arena = Arena::new();
        let list = arena.new_list();
        let a = arena.push_back(list, 1);
        arena.push_back(list, 3);
        let b = arena.insert_after(a, 2);
        assert_eq!(collect(&arena, list), vec![1, 2, 3]);
        assert_eq!(arena.prev(b), Some(a));
        assert_eq!(arena.prev(a), None);
        assert_eq!(arena.first(list), Some(a));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "removed twice")]
    fn test_double_remove_is_detected() {
        let mut arena = Arena::new();
        let list = arena.new_list();
        let a = arena.push_back(list, 1);
        arena.remove(a);
        arena.remove(a);
    }
}
