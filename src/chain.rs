//! Entry arena and singly-linked collision chains.
//!
//! Entries live in a generational `SlotMap`; a chain is a bucket head plus
//! `next` links, all expressed as `EntryKey`s. Relinking during delete or
//! rehash only rewrites keys, the entries themselves never move or get
//! copied.

use crate::error::TableError;
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! {
    pub(crate) struct EntryKey;
}

/// Head of a bucket's chain.
pub(crate) type Head = Option<EntryKey>;

#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) key: String,
    pub(crate) value: i32,
    pub(crate) next: Option<EntryKey>,
}

#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: SlotMap<EntryKey, Entry>,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    pub(crate) fn key(&self, k: EntryKey) -> &str {
        &self.slots[k].key
    }

    pub(crate) fn value(&self, k: EntryKey) -> i32 {
        self.slots[k].value
    }

    /// Overwrite the value in place, returning the old one.
    pub(crate) fn replace_value(&mut self, k: EntryKey, value: i32) -> i32 {
        std::mem::replace(&mut self.slots[k].value, value)
    }

    /// Store a detached entry. The caller links it into a chain.
    pub(crate) fn alloc(&mut self, key: String, value: i32) -> EntryKey {
        self.slots.insert(Entry {
            key,
            value,
            next: None,
        })
    }

    /// First entry of the chain whose key equals `key`, with its position.
    pub(crate) fn find(&self, head: Head, key: &str) -> Option<(usize, EntryKey)> {
        let mut cur = head;
        let mut pos = 0;
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.key == key {
                return Some((pos, k));
            }
            cur = e.next;
            pos += 1;
        }
        None
    }

    /// Link a detached entry at the tail of the chain.
    pub(crate) fn push_back(&mut self, head: &mut Head, k: EntryKey) {
        let Some(mut tail) = *head else {
            *head = Some(k);
            return;
        };
        while let Some(next) = self.slots[tail].next {
            tail = next;
        }
        self.slots[tail].next = Some(k);
    }

    /// Link a detached entry after a known tail, updating the tail.
    pub(crate) fn push_back_at(&mut self, head: &mut Head, tail: &mut Head, k: EntryKey) {
        match *tail {
            Some(t) => self.slots[t].next = Some(k),
            None => *head = Some(k),
        }
        *tail = Some(k);
    }

    /// Clear the entry's link and return what it pointed to.
    pub(crate) fn detach_next(&mut self, k: EntryKey) -> Option<EntryKey> {
        self.slots[k].next.take()
    }

    /// Unlink and destroy the entry with `key`, keeping sibling links intact.
    pub(crate) fn unlink(&mut self, head: &mut Head, key: &str) -> Option<Entry> {
        let mut prev: Option<EntryKey> = None;
        let mut cur = *head;
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.key == key {
                let next = e.next;
                match prev {
                    None => *head = next,
                    Some(p) => self.slots[p].next = next,
                }
                return self.slots.remove(k);
            }
            prev = cur;
            cur = e.next;
        }
        None
    }

    pub(crate) fn chain(&self, head: Head) -> Chain<'_> {
        Chain {
            slots: &self.slots,
            cur: head,
        }
    }

    pub(crate) fn chain_len(&self, head: Head) -> usize {
        self.chain(head).count()
    }
}

/// Copy `key` into a freshly allocated buffer, reporting allocation failure.
pub(crate) fn owned_key(key: &str) -> Result<String, TableError> {
    let mut s = String::new();
    s.try_reserve_exact(key.len())?;
    s.push_str(key);
    Ok(s)
}

/// Bucket array of `capacity` empty chains, allocated fallibly.
pub(crate) fn empty_heads(capacity: usize) -> Result<Vec<Head>, TableError> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)?;
    v.resize(capacity, None);
    Ok(v)
}

/// Iterator over one chain in link order.
#[derive(Clone)]
pub struct Chain<'a> {
    slots: &'a SlotMap<EntryKey, Entry>,
    cur: Option<EntryKey>,
}

impl<'a> Chain<'a> {
    pub(crate) fn keys(self) -> impl Iterator<Item = EntryKey> + 'a {
        let slots = self.slots;
        std::iter::successors(self.cur, move |&k| slots[k].next)
    }
}

impl fmt::Debug for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = (&'a str, i32);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cur?;
        let e = &self.slots[k];
        self.cur = e.next;
        Some((e.key.as_str(), e.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(arena: &mut Arena, keys: &[&str]) -> Head {
        let mut head = None;
        for (i, k) in keys.iter().enumerate() {
            let e = arena.alloc((*k).to_string(), i as i32);
            arena.push_back(&mut head, e);
        }
        head
    }

    fn collect(arena: &Arena, head: Head) -> Vec<String> {
        arena.chain(head).map(|(k, _)| k.to_string()).collect()
    }

    #[test]
    fn push_back_keeps_insertion_order() {
        let mut a = Arena::new();
        let head = build(&mut a, &["a", "b", "c"]);
        assert_eq!(collect(&a, head), ["a", "b", "c"]);
        assert_eq!(a.chain_len(head), 3);
    }

    #[test]
    fn find_reports_position() {
        let mut a = Arena::new();
        let head = build(&mut a, &["a", "b", "c"]);
        let (pos, k) = a.find(head, "c").unwrap();
        assert_eq!(pos, 2);
        assert_eq!(a.key(k), "c");
        assert_eq!(a.value(k), 2);
        assert!(a.find(head, "z").is_none());
        assert!(a.find(None, "a").is_none());
    }

    #[test]
    fn unlink_head_middle_and_tail() {
        let mut a = Arena::new();
        let mut head = build(&mut a, &["a", "b", "c", "d"]);

        let e = a.unlink(&mut head, "b").unwrap();
        assert_eq!((e.key.as_str(), e.value), ("b", 1));
        assert_eq!(collect(&a, head), ["a", "c", "d"]);

        a.unlink(&mut head, "a").unwrap();
        assert_eq!(collect(&a, head), ["c", "d"]);

        a.unlink(&mut head, "d").unwrap();
        assert_eq!(collect(&a, head), ["c"]);

        a.unlink(&mut head, "c").unwrap();
        assert!(head.is_none());
        assert_eq!(a.len(), 0);
    }

    #[test]
    fn unlink_missing_leaves_chain_alone() {
        let mut a = Arena::new();
        let mut head = build(&mut a, &["a", "b"]);
        assert!(a.unlink(&mut head, "x").is_none());
        assert_eq!(collect(&a, head), ["a", "b"]);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn push_back_at_tracks_tail() {
        let mut a = Arena::new();
        let mut head = None;
        let mut tail = None;
        for k in ["x", "y", "z"] {
            let e = a.alloc(k.to_string(), 0);
            a.push_back_at(&mut head, &mut tail, e);
        }
        assert_eq!(collect(&a, head), ["x", "y", "z"]);
        assert_eq!(a.key(tail.unwrap()), "z");
    }

    #[test]
    fn detach_next_splits_links() {
        let mut a = Arena::new();
        let head = build(&mut a, &["a", "b"]);
        let first = head.unwrap();
        let second = a.detach_next(first).unwrap();
        assert_eq!(a.key(second), "b");
        assert_eq!(a.chain(Some(first)).count(), 1);
        assert_eq!(collect(&a, head), ["a"]);
    }

    #[test]
    fn replace_value_returns_previous() {
        let mut a = Arena::new();
        let head = build(&mut a, &["k"]);
        let k = head.unwrap();
        assert_eq!(a.replace_value(k, 42), 0);
        assert_eq!(a.value(k), 42);
    }

    #[test]
    fn allocation_helpers() {
        assert_eq!(owned_key("abc").unwrap(), "abc");
        let heads = empty_heads(4).unwrap();
        assert_eq!(heads.len(), 4);
        assert!(heads.iter().all(Option::is_none));
        assert!(matches!(
            empty_heads(usize::MAX),
            Err(TableError::OutOfMemory(_))
        ));
    }
}
