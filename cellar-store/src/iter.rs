//! Iter Module - ordered iteration over tab/dict entries
//!
//! [`crate::tab::Tab`] and [`crate::dict::Dict`] both expose their contents
//! only through lookups keyed by a candidate value. These iterators instead
//! walk every entry in trie order, which callers need for things like
//! listing every interned package name or every key in a dictionary. The
//! walk keeps an explicit stack of dispatch-node frames rather than
//! recursing, so it can be driven one entry at a time through
//! [`Iterator::next`].

use crate::hamt;
use crate::value::Value;

/// A partially-walked dispatch node: `node` together with the next child
/// slot (0..32) still to be visited.
struct DispatchFrame<'s> {
    node: Value<'s>,
    next_child: u32,
}

/// Scan a dispatch node's children from `from` (inclusive) up to slot 31 for
/// the first occupied one, returning its index and value.
fn next_occupied_child(node: Value<'_>, from: u32) -> Option<(u32, Value<'_>)> {
    (from..32).find_map(|idx| {
        let child = hamt::get(node, idx);
        if child.is_null() {
            None
        } else {
            Some((idx, child))
        }
    })
}

/// Push `node` and everything along its leftmost spine onto `stack`,
/// stopping at the first search node found (or doing nothing if the spine
/// bottoms out at null). Dispatch nodes are pushed so the walk can resume
/// at the next child once the search node at the bottom is exhausted.
fn push_spine<'s>(
    mut node: Value<'s>,
    search_tag: u8,
    stack: &mut Vec<DispatchFrame<'s>>,
) -> Option<Value<'s>> {
    loop {
        if node.is_null() {
            return None;
        }
        if node.is(search_tag) {
            return Some(node);
        }
        match next_occupied_child(node, 0) {
            Some((idx, child)) => {
                stack.push(DispatchFrame { node, next_child: idx + 1 });
                node = child;
            }
            None => {
                // A dispatch node with no occupied children at all; shouldn't
                // occur in practice since the tries never keep such a node
                // around, but fall through to the next stack frame if it does.
                return pop_and_continue(stack, search_tag);
            }
        }
    }
}

fn pop_and_continue<'s>(
    stack: &mut Vec<DispatchFrame<'s>>,
    search_tag: u8,
) -> Option<Value<'s>> {
    while let Some(frame) = stack.last_mut() {
        match next_occupied_child(frame.node, frame.next_child) {
            Some((idx, child)) => {
                frame.next_child = idx + 1;
                return push_spine(child, search_tag, stack);
            }
            None => {
                stack.pop();
            }
        }
    }
    None
}

/// Entries held in the search node currently at the bottom of the walk,
/// plus how many of them have already been yielded.
struct SearchCursor<'s> {
    node: Value<'s>,
    next_entry: usize,
}

/// Iterates every interned member of a [`crate::tab::Tab`] in trie order.
pub struct TabEntries<'s> {
    stack: Vec<DispatchFrame<'s>>,
    current: Option<SearchCursor<'s>>,
    search_tag: u8,
}

impl<'s> TabEntries<'s> {
    pub(crate) fn new(root: Value<'s>, search_tag: u8) -> TabEntries<'s> {
        let mut stack = Vec::new();
        let current = push_spine(root, search_tag, &mut stack).map(|node| SearchCursor { node, next_entry: 0 });
        TabEntries { stack, current, search_tag }
    }

    fn advance_search_node(&mut self) {
        self.current = pop_and_continue(&mut self.stack, self.search_tag)
            .map(|node| SearchCursor { node, next_entry: 0 });
    }
}

impl<'s> Iterator for TabEntries<'s> {
    type Item = Value<'s>;

    fn next(&mut self) -> Option<Value<'s>> {
        loop {
            let cursor = self.current.as_mut()?;
            // Tab search nodes hold [hash, member_1, member_2, ...].
            if cursor.next_entry + 1 < cursor.node.len() {
                let member = cursor.node.field(cursor.next_entry + 1);
                cursor.next_entry += 1;
                return Some(member);
            }
            self.advance_search_node();
        }
    }
}

/// Iterates every key/value entry of a [`crate::dict::Dict`] in trie order.
pub struct DictEntries<'s> {
    stack: Vec<DispatchFrame<'s>>,
    current: Option<SearchCursor<'s>>,
    search_tag: u8,
}

impl<'s> DictEntries<'s> {
    pub(crate) fn new(root: Value<'s>, search_tag: u8) -> DictEntries<'s> {
        let mut stack = Vec::new();
        let current = push_spine(root, search_tag, &mut stack).map(|node| SearchCursor { node, next_entry: 0 });
        DictEntries { stack, current, search_tag }
    }

    fn advance_search_node(&mut self) {
        self.current = pop_and_continue(&mut self.stack, self.search_tag)
            .map(|node| SearchCursor { node, next_entry: 0 });
    }
}

impl<'s> Iterator for DictEntries<'s> {
    type Item = (Value<'s>, Value<'s>);

    fn next(&mut self) -> Option<(Value<'s>, Value<'s>)> {
        loop {
            let cursor = self.current.as_mut()?;
            // Dict search nodes hold [hash, key_1, value_1, key_2, value_2, ...].
            let entries = (cursor.node.len() - 1) / 2;
            if cursor.next_entry < entries {
                let e = cursor.next_entry;
                cursor.next_entry += 1;
                return Some((cursor.node.field(1 + 2 * e), cursor.node.field(2 + 2 * e)));
            }
            self.advance_search_node();
        }
    }
}

/// Iterates every `(key, member)` pair obtained by flattening each dict
/// entry's value out into its fields, one pair per field rather than one
/// pair per key. Entries whose value has no fields are skipped entirely.
/// Meant for [`crate::dict::DictKind::WeakSets`], where a value is itself a
/// vector of set members; for other kinds it just walks whatever fields the
/// value happens to have.
pub struct DictEntryMembers<'s> {
    entries: DictEntries<'s>,
    current: Option<(Value<'s>, Value<'s>, usize)>,
}

impl<'s> DictEntryMembers<'s> {
    pub(crate) fn new(root: Value<'s>, search_tag: u8) -> DictEntryMembers<'s> {
        let mut entries = DictEntries::new(root, search_tag);
        let current = Self::first_nonempty(&mut entries);
        DictEntryMembers { entries, current }
    }

    fn first_nonempty(entries: &mut DictEntries<'s>) -> Option<(Value<'s>, Value<'s>, usize)> {
        entries.find_map(|(key, val)| {
            if val.len() == 0 {
                None
            } else {
                Some((key, val, 0))
            }
        })
    }
}

impl<'s> Iterator for DictEntryMembers<'s> {
    type Item = (Value<'s>, Value<'s>);

    fn next(&mut self) -> Option<(Value<'s>, Value<'s>)> {
        let (key, val, index) = self.current.take()?;
        let member = val.field(index);
        let next_index = index + 1;
        self.current = if next_index < val.len() {
            Some((key, val, next_index))
        } else {
            Self::first_nonempty(&mut self.entries)
        };
        Some((key, member))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::{Dict, DictKind};
    use crate::tab::Tab;
    use crate::{Store, StoreOptions, Unstored};

    #[test]
    fn tab_entries_visits_every_interned_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
        let mut tab = Tab::new(&store);
        let mut expected = Vec::new();
        for i in 0..64 {
            let v = tab.intern_blob(format!("pkg-{i}").as_bytes()).unwrap();
            expected.push(v);
        }
        let seen: Vec<Value<'_>> = tab.entries().unwrap().collect();
        assert_eq!(seen.len(), expected.len());
        for v in &expected {
            assert!(seen.iter().any(|s| s.same(*v)));
        }
    }

    #[test]
    fn dict_entries_visits_every_pair() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path().join("d.store"), StoreOptions::default()).unwrap();
        let mut dict = Dict::new(&store, DictKind::Strong);
        for i in 0..64 {
            let key = store.store(&Unstored::string(format!("pkg-{i}"))).unwrap();
            let value = store.store(&Unstored::Int(i)).unwrap();
            dict.set(key, value).unwrap();
        }
        let seen: Vec<(Value<'_>, Value<'_>)> = dict.entries().unwrap().collect();
        assert_eq!(seen.len(), 64);
    }

    #[test]
    fn dict_entry_members_flattens_weak_sets_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path().join("s.store"), StoreOptions::default()).unwrap();
        let mut dict = Dict::new(&store, DictKind::WeakSets);
        let a = store.store(&Unstored::string("a")).unwrap();
        let b = store.store(&Unstored::string("b")).unwrap();
        let one = store.store(&Unstored::Int(1)).unwrap();
        let two = store.store(&Unstored::Int(2)).unwrap();
        let three = store.store(&Unstored::Int(3)).unwrap();
        dict.add(a, one).unwrap();
        dict.add(a, two).unwrap();
        dict.add(b, three).unwrap();

        let seen: Vec<(Value<'_>, Value<'_>)> = dict.entry_members().unwrap().collect();
        assert_eq!(seen.len(), 3);
        let a_members: Vec<i32> = seen
            .iter()
            .filter(|(k, _)| k.same(a))
            .map(|(_, v)| v.to_int().unwrap())
            .collect();
        assert_eq!(a_members.len(), 2);
        assert!(a_members.contains(&1) && a_members.contains(&2));
        assert!(seen.iter().any(|(k, v)| k.same(b) && v.to_int() == Some(3)));
    }
}
