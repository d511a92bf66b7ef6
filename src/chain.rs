use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::entry::Entry;

#[derive(Clone, Debug)]
enum Slot<V> {
    Occupied(Entry<V>),
    Vacant { next_free: Option<usize> },
}

impl<V> Slot<V> {
    /// Moves the entry out, leaving a vacant slot that points at `next_free`.
    /// A slot that is already vacant is left untouched.
    fn take(&mut self, next_free: Option<usize>) -> Option<Entry<V>> {
        match core::mem::replace(self, Slot::Vacant { next_free }) {
            Slot::Occupied(entry) => Some(entry),
            vacant @ Slot::Vacant { .. } => {
                *self = vacant;
                None
            }
        }
    }
}

/// The collision chain owned by one bucket.
///
/// Entries live in a slot vector and are linked to each other by slot
/// handle, giving a doubly-linked list without shared mutable nodes. Freed
/// slots are threaded onto a free list and reused by later appends, so
/// handles stay stable for the lifetime of the entry they name.
///
/// - Append at the tail: O(1)
/// - Unlink by handle: O(1)
/// - Lookup by key: O(len)
#[derive(Clone, Debug)]
pub(crate) struct Chain<V> {
    slots: Vec<Slot<V>>,
    free: Option<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<V> Chain<V> {
    pub(crate) const fn new() -> Self {
        Chain {
            slots: Vec::new(),
            free: None,
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn get(&self, handle: usize) -> Option<&Entry<V>> {
        match self.slots.get(handle) {
            Some(Slot::Occupied(entry)) => Some(entry),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, handle: usize) -> Option<&mut Entry<V>> {
        match self.slots.get_mut(handle) {
            Some(Slot::Occupied(entry)) => Some(entry),
            _ => None,
        }
    }

    /// Walks the chain from the head and returns the handle of the entry
    /// whose cached hash and key both match.
    pub(crate) fn find(&self, hash: u64, key: &str) -> Option<usize> {
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            let entry = self.get(handle)?;
            if entry.matches(hash, key) {
                return Some(handle);
            }
            cursor = entry.next;
        }
        None
    }

    /// Links `entry` after the current tail and returns its handle.
    ///
    /// The caller is responsible for making sure the key is not already
    /// present.
    pub(crate) fn push_back(&mut self, mut entry: Entry<V>) -> usize {
        entry.prev = self.tail;
        entry.next = None;

        let handle = match self.free.take() {
            Some(handle) => {
                if let Slot::Vacant { next_free } = &self.slots[handle] {
                    self.free = *next_free;
                }
                self.slots[handle] = Slot::Occupied(entry);
                handle
            }
            None => {
                self.slots.push(Slot::Occupied(entry));
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => self.set_next(tail, Some(handle)),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        self.len += 1;
        handle
    }

    /// Removes the entry at `handle` from the chain, relinking its neighbors.
    ///
    /// Returns `None` if `handle` does not name a live entry.
    pub(crate) fn unlink(&mut self, handle: usize) -> Option<Entry<V>> {
        let next_free = self.free;
        let mut entry = self.slots.get_mut(handle)?.take(next_free)?;
        self.free = Some(handle);

        match (entry.prev, entry.next) {
            (Some(prev), Some(next)) => {
                self.set_next(prev, Some(next));
                self.set_prev(next, Some(prev));
            }
            (Some(prev), None) => {
                self.set_next(prev, None);
                self.tail = Some(prev);
            }
            (None, Some(next)) => {
                self.set_prev(next, None);
                self.head = Some(next);
            }
            (None, None) => {
                self.head = None;
                self.tail = None;
            }
        }

        entry.prev = None;
        entry.next = None;
        self.len -= 1;

        if self.len == 0 {
            // Nothing left to keep handles stable for.
            self.slots.clear();
            self.free = None;
        }

        Some(entry)
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    pub(crate) fn iter(&self) -> Iter<'_, V> {
        Iter {
            chain: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    fn set_next(&mut self, handle: usize, next: Option<usize>) {
        if let Some(entry) = self.get_mut(handle) {
            entry.next = next;
        }
    }

    fn set_prev(&mut self, handle: usize, prev: Option<usize>) {
        if let Some(entry) = self.get_mut(handle) {
            entry.prev = prev;
        }
    }
}

/// Head-to-tail iterator over a chain's entries. Also walks tail-to-head
/// through [`DoubleEndedIterator`].
pub(crate) struct Iter<'a, V> {
    chain: &'a Chain<V>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.chain.get(self.front?)?;
        self.front = entry.next;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.chain.get(self.back?)?;
        self.back = entry.prev;
        self.remaining -= 1;
        Some(entry)
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn entry(key: &str, value: i32) -> Entry<i32> {
        // Same hash for every key so matching has to fall back to the key.
        Entry::new(key.to_string(), value, 7)
    }

    fn keys(chain: &Chain<i32>) -> Vec<&str> {
        chain.iter().map(|e| e.key()).collect()
    }

    fn keys_rev(chain: &Chain<i32>) -> Vec<&str> {
        chain.iter().rev().map(|e| e.key()).collect()
    }

    fn chain_of(keys: &[&str]) -> (Chain<i32>, Vec<usize>) {
        let mut chain = Chain::new();
        let handles = keys
            .iter()
            .enumerate()
            .map(|(i, k)| chain.push_back(entry(k, i as i32)))
            .collect();
        (chain, handles)
    }

    #[test]
    fn push_back_appends_in_order() {
        let (chain, _) = chain_of(&["a", "b", "c"]);
        assert_eq!(chain.len(), 3);
        assert_eq!(keys(&chain), vec!["a", "b", "c"]);
        assert_eq!(keys_rev(&chain), vec!["c", "b", "a"]);
    }

    #[test]
    fn find_compares_keys_not_just_hashes() {
        let (chain, handles) = chain_of(&["a", "b", "c"]);
        assert_eq!(chain.find(7, "a"), Some(handles[0]));
        assert_eq!(chain.find(7, "b"), Some(handles[1]));
        assert_eq!(chain.find(7, "c"), Some(handles[2]));
        assert_eq!(chain.find(7, "d"), None);
        assert_eq!(chain.find(8, "a"), None);
    }

    #[test]
    fn find_on_empty_chain() {
        let chain: Chain<i32> = Chain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.find(7, ""), None);
        assert!(chain.iter().next().is_none());
    }

    #[test]
    fn unlink_head() {
        let (mut chain, handles) = chain_of(&["a", "b", "c"]);
        let removed = chain.unlink(handles[0]).unwrap();
        assert_eq!(removed.key(), "a");
        assert_eq!(removed.prev, None);
        assert_eq!(removed.next, None);
        assert_eq!(keys(&chain), vec!["b", "c"]);
        assert_eq!(keys_rev(&chain), vec!["c", "b"]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn unlink_tail() {
        let (mut chain, handles) = chain_of(&["a", "b", "c"]);
        assert_eq!(chain.unlink(handles[2]).unwrap().key(), "c");
        assert_eq!(keys(&chain), vec!["a", "b"]);
        assert_eq!(keys_rev(&chain), vec!["b", "a"]);

        // A new tail must link after the old neighbor.
        chain.push_back(entry("d", 3));
        assert_eq!(keys(&chain), vec!["a", "b", "d"]);
        assert_eq!(keys_rev(&chain), vec!["d", "b", "a"]);
    }

    #[test]
    fn unlink_middle() {
        let (mut chain, handles) = chain_of(&["a", "b", "c", "d"]);
        assert_eq!(chain.unlink(handles[1]).unwrap().key(), "b");
        assert_eq!(chain.unlink(handles[2]).unwrap().key(), "c");
        assert_eq!(keys(&chain), vec!["a", "d"]);
        assert_eq!(keys_rev(&chain), vec!["d", "a"]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn unlink_sole_entry_resets_chain() {
        let (mut chain, handles) = chain_of(&["a"]);
        assert_eq!(chain.unlink(handles[0]).unwrap().into_value(), 0);
        assert!(chain.is_empty());
        assert_eq!(chain.head, None);
        assert_eq!(chain.tail, None);
        assert!(chain.slots.is_empty());

        chain.push_back(entry("b", 1));
        assert_eq!(keys(&chain), vec!["b"]);
    }

    #[test]
    fn unlink_stale_handle_is_none() {
        let (mut chain, handles) = chain_of(&["a", "b"]);
        assert!(chain.unlink(handles[0]).is_some());
        assert!(chain.unlink(handles[0]).is_none());
        assert!(chain.unlink(99).is_none());
        assert_eq!(keys(&chain), vec!["b"]);
    }

    #[test]
    fn freed_slots_are_reused() {
        let (mut chain, handles) = chain_of(&["a", "b", "c"]);
        chain.unlink(handles[0]).unwrap();
        chain.unlink(handles[1]).unwrap();

        let d = chain.push_back(entry("d", 3));
        let e = chain.push_back(entry("e", 4));
        assert_eq!(d, handles[1]);
        assert_eq!(e, handles[0]);
        assert_eq!(chain.slots.len(), 3);
        assert_eq!(keys(&chain), vec!["c", "d", "e"]);
        assert_eq!(keys_rev(&chain), vec!["e", "d", "c"]);
        assert_eq!(chain.find(7, "e"), Some(e));
    }

    #[test]
    fn iterator_meets_in_the_middle() {
        let (chain, _) = chain_of(&["a", "b", "c"]);
        let mut iter = chain.iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next().unwrap().key(), "a");
        assert_eq!(iter.next_back().unwrap().key(), "c");
        assert_eq!(iter.next().unwrap().key(), "b");
        assert!(iter.next_back().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn get_mut_updates_in_place() {
        let (mut chain, handles) = chain_of(&["a", "b"]);
        *chain.get_mut(handles[1]).unwrap().value_mut() = 42;
        assert_eq!(chain.get(handles[1]).unwrap().value(), &42);
        assert!(chain.get(17).is_none());
    }

    #[test]
    fn clear_empties_chain() {
        let (mut chain, _) = chain_of(&["a", "b", "c"]);
        chain.clear();
        assert!(chain.is_empty());
        assert_eq!(chain.iter().count(), 0);
        chain.push_back(entry("z", 0));
        assert_eq!(keys(&chain), vec!["z"]);
    }
}
