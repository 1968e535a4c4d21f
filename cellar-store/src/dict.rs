//! Dict Module - identity-keyed dictionaries
//!
//! Unlike [`crate::tab`], a `Dict` keys on object *identity* (pointer
//! equality, via [`Value::same`]) rather than content, and comes in three
//! flavors that only differ in how the collector treats them:
//!
//! - [`DictKind::Strong`]: both keys and values are ordinary reachability
//!   roots. A strong dict keeps everything it references alive.
//! - [`DictKind::WeakKeys`]: an entry survives a collection only if its key
//!   is independently reachable from somewhere else; otherwise the whole
//!   entry is dropped. Used for caches keyed by objects that may go away.
//! - [`DictKind::WeakSets`]: each key maps to a small set of values rather
//!   than one value (see [`Dict::add`]/[`Dict::rem`]); entries are dropped
//!   the same way as [`DictKind::WeakKeys`] when the key becomes
//!   unreachable. Used for reverse-reference tracking (e.g. "who depends on
//!   this package").
//!
//! The trie shape (dispatch/search nodes, 32-way branching) is identical to
//! [`crate::tab`]'s; see [`crate::hamt`] for the shared mechanics. Every
//! flavor uses a distinct tag pair so the collector can recognize which
//! treatment a node needs purely from its tag.
//!
//! As with [`crate::tab`], every [`Dict::set`]/[`Dict::add`]/[`Dict::del`]
//! call only edits an in-memory overlay of the dictionary's trie; nothing
//! about that scaffolding reaches the store until [`Dict::store`] or
//! [`Dict::finish`] materializes the touched nodes for real.
//! [`Dict::abort`] drops the overlay instead, leaving only whatever was
//! already committed in a previous session.

use crate::error::Result;
use crate::hamt;
use crate::value::Value;
use crate::Store;

pub(crate) const DICT_DISPATCH_TAG: u8 = 0x7B;
pub(crate) const DICT_SEARCH_TAG: u8 = 0x7C;
pub(crate) const WEAK_DICT_DISPATCH_TAG: u8 = 0x79;
pub(crate) const WEAK_DICT_SEARCH_TAG: u8 = 0x7A;
pub(crate) const WEAK_SETS_DISPATCH_TAG: u8 = 0x77;
pub(crate) const WEAK_SETS_SEARCH_TAG: u8 = 0x78;

/// Tag used for the small fixed-size record that holds one key's set of
/// values in a [`DictKind::WeakSets`] dictionary.
const SET_NODE_TAG: u8 = 0x76;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DictKind {
    Strong,
    WeakKeys,
    WeakSets,
}

impl DictKind {
    pub(crate) fn tags(self) -> (u8, u8) {
        match self {
            DictKind::Strong => (DICT_DISPATCH_TAG, DICT_SEARCH_TAG),
            DictKind::WeakKeys => (WEAK_DICT_DISPATCH_TAG, WEAK_DICT_SEARCH_TAG),
            DictKind::WeakSets => (WEAK_SETS_DISPATCH_TAG, WEAK_SETS_SEARCH_TAG),
        }
    }

    /// Recover a dict flavor and whether `tag` is that flavor's dispatch (as
    /// opposed to search) tag, purely from the tag. Used by the collector,
    /// which only ever sees raw tags while scanning.
    pub(crate) fn classify(tag: u8) -> Option<(DictKind, bool)> {
        match tag {
            DICT_DISPATCH_TAG => Some((DictKind::Strong, true)),
            DICT_SEARCH_TAG => Some((DictKind::Strong, false)),
            WEAK_DICT_DISPATCH_TAG => Some((DictKind::WeakKeys, true)),
            WEAK_DICT_SEARCH_TAG => Some((DictKind::WeakKeys, false)),
            WEAK_SETS_DISPATCH_TAG => Some((DictKind::WeakSets, true)),
            WEAK_SETS_SEARCH_TAG => Some((DictKind::WeakSets, false)),
            _ => None,
        }
    }

    pub(crate) fn is_weak(self) -> bool {
        !matches!(self, DictKind::Strong)
    }
}

/// One node of a dict's trie, as seen from the overlay that [`Dict`] builds
/// up in process memory between [`Dict::init`] and [`Dict::store`]/
/// [`Dict::finish`]/[`Dict::abort`]. Mirrors [`crate::tab`]'s `Node`, with
/// search nodes holding key/value pairs instead of bare members.
#[derive(Clone)]
enum Node<'s> {
    Stored(Value<'s>),
    Search {
        hash: u32,
        entries: Vec<(Value<'s>, Value<'s>)>,
    },
    Dispatch {
        base: Value<'s>,
        overrides: Vec<(u32, Node<'s>)>,
    },
}

/// A handle for reading and mutating one dictionary.
pub struct Dict<'s> {
    store: &'s Store,
    kind: DictKind,
    root: Node<'s>,
}

impl<'s> Dict<'s> {
    /// Start working on a dictionary rooted at `root` (null for a fresh
    /// dictionary).
    pub fn init(store: &'s Store, kind: DictKind, root: Value<'s>) -> Dict<'s> {
        Dict {
            store,
            kind,
            root: Node::Stored(root),
        }
    }

    pub fn new(store: &'s Store, kind: DictKind) -> Dict<'s> {
        Self::init(store, kind, Value::null())
    }

    pub fn open(store: &'s Store, kind: DictKind, root: Value<'s>) -> Dict<'s> {
        Self::init(store, kind, root)
    }

    pub fn kind(&self) -> DictKind {
        self.kind
    }

    fn identity_hash(&self, value: Value<'_>) -> u32 {
        value.identity_hash(self.store.heap().base())
    }

    /// Value associated with `key`. For [`DictKind::WeakSets`] this is the
    /// internal set record; use [`Dict::members`] to read its contents.
    pub fn get(&self, key: Value<'_>) -> Option<Value<'s>> {
        let hash = self.identity_hash(key);
        get_node(&self.root, 0, hash, key, self.kind.tags().1)
    }

    /// Associate `key` with `value`, overwriting any previous value. For
    /// [`DictKind::WeakSets`] dictionaries, prefer [`Dict::add`].
    pub fn set(&mut self, key: Value<'_>, value: Value<'_>) -> Result<()> {
        let hash = self.identity_hash(key);
        let tags = self.kind.tags();
        let root = std::mem::replace(&mut self.root, Node::Stored(Value::null()));
        self.root = set_node(self.store, root, 0, hash, key.recast(), value.recast(), tags)?;
        Ok(())
    }

    /// Add `value` to the set associated with `key` (a no-op if it's
    /// already a member). For [`DictKind::Strong`] and
    /// [`DictKind::WeakKeys`], this is equivalent to [`Dict::set`].
    pub fn add(&mut self, key: Value<'_>, value: Value<'_>) -> Result<()> {
        if self.kind != DictKind::WeakSets {
            return self.set(key, value);
        }
        let set = match self.get(key) {
            Some(set) if set.is(SET_NODE_TAG) => {
                if (0..set.len()).any(|i| set.field(i).same(value)) {
                    return Ok(());
                }
                self.store.insert_field(set, set.len(), value)?
            }
            _ => self.store.new_record(SET_NODE_TAG, &[value])?,
        };
        self.set(key, set)
    }

    /// Remove the entire entry for `key`. Returns whether an entry was
    /// actually present.
    pub fn del(&mut self, key: Value<'_>) -> Result<bool> {
        let hash = self.identity_hash(key);
        let tags = self.kind.tags();
        let root = std::mem::replace(&mut self.root, Node::Stored(Value::null()));
        let (new_root, removed) = del_node(self.store, root, 0, hash, key, tags)?;
        self.root = new_root;
        Ok(removed)
    }

    /// Remove `value` from the set associated with `key`, deleting the
    /// whole entry if it was the last member. For [`DictKind::Strong`] and
    /// [`DictKind::WeakKeys`] this is equivalent to [`Dict::del`] (the
    /// `value` argument is ignored beyond that).
    pub fn rem(&mut self, key: Value<'_>, value: Value<'_>) -> Result<bool> {
        if self.kind != DictKind::WeakSets {
            return self.del(key);
        }
        let Some(set) = self.get(key) else {
            return Ok(false);
        };
        if !set.is(SET_NODE_TAG) {
            return Ok(false);
        }
        let Some(pos) = (0..set.len()).find(|&i| set.field(i).same(value)) else {
            return Ok(false);
        };
        if set.len() == 1 {
            self.del(key)
        } else {
            let shrunk = self.store.remove_fields(set, pos, 1)?;
            self.set(key, shrunk)?;
            Ok(true)
        }
    }

    /// The members of the set stored at `key` in a [`DictKind::WeakSets`]
    /// dictionary (empty if there is no entry).
    pub fn members(&self, key: Value<'_>) -> Vec<Value<'s>> {
        match self.get(key) {
            Some(set) if set.is(SET_NODE_TAG) => (0..set.len()).map(|i| set.field(i)).collect(),
            _ => Vec::new(),
        }
    }

    /// Every key/value entry, in trie order. For [`DictKind::WeakSets`] the
    /// yielded value is the internal set record; see [`Dict::members`] and
    /// [`Dict::entry_members`]. Materializes any session-local overlay into
    /// the store first (see [`Dict::store`]) without disturbing the
    /// dictionary's own overlay.
    pub fn entries(&self) -> Result<crate::iter::DictEntries<'s>> {
        let root = materialize(self.store, self.root.clone(), self.kind.tags())?;
        Ok(crate::iter::DictEntries::new(root, self.kind.tags().1))
    }

    /// Every `(key, member)` pair flattened out of a [`DictKind::WeakSets`]
    /// dictionary's entries -- one pair per element of each entry's set,
    /// rather than one pair per key. Meaningless but harmless for the other
    /// kinds (their "members" are just their single value).
    pub fn entry_members(&self) -> Result<crate::iter::DictEntryMembers<'s>> {
        let root = materialize(self.store, self.root.clone(), self.kind.tags())?;
        Ok(crate::iter::DictEntryMembers::new(root, self.kind.tags().1))
    }

    /// Materialize the overlay built up this session into real stored
    /// records, keeping the dictionary usable for further operations.
    /// Returns the new root.
    pub fn store(&mut self) -> Result<Value<'s>> {
        let backing = self.store;
        let tags = self.kind.tags();
        let root = std::mem::replace(&mut self.root, Node::Stored(Value::null()));
        let materialized = materialize(backing, root, tags)?;
        self.root = Node::Stored(materialized);
        Ok(materialized)
    }

    /// Materialize the overlay and return the final root, consuming `self`.
    pub fn finish(self) -> Result<Value<'s>> {
        let tags = self.kind.tags();
        materialize(self.store, self.root, tags)
    }

    /// Discard everything set into the overlay this session without
    /// touching the store.
    pub fn abort(self) {}
}

/// Insert an already-copied `(key, value)` pair into a fresh trie built
/// during garbage collection, computing the identity hash from `key`'s
/// *new* address. Used instead of [`Dict::set`] because the collector works
/// directly against a `Store`, not a live `Dict` handle, and because a GC
/// rebuild always starts from an empty root rather than mutating one in
/// place.
pub(crate) fn gc_insert<'s>(
    store: &'s Store,
    root: Value<'s>,
    key: Value<'s>,
    value: Value<'s>,
    tags: (u8, u8),
) -> Result<Value<'s>> {
    let hash = key.identity_hash(store.heap().base());
    let node = set_node(store, Node::Stored(root), 0, hash, key, value, tags)?;
    materialize(store, node, tags)
}

fn get_node<'s>(node: &Node<'s>, shift: u32, hash: u32, key: Value<'_>, search_tag: u8) -> Option<Value<'s>> {
    match node {
        Node::Stored(v) => get_rec(*v, shift, hash, key, search_tag),
        Node::Search { entries, .. } => entries.iter().find(|(k, _)| k.same(key)).map(|(_, v)| *v),
        Node::Dispatch { base, overrides } => {
            let idx = hamt::level_index(hash, shift);
            if let Some((_, child)) = overrides.iter().find(|(i, _)| *i == idx) {
                get_node(child, shift + hamt::BITS_PER_LEVEL, hash, key, search_tag)
            } else {
                let child = if base.is_null() {
                    Value::null()
                } else {
                    hamt::get(*base, idx)
                };
                get_rec(child, shift + hamt::BITS_PER_LEVEL, hash, key, search_tag)
            }
        }
    }
}

fn get_rec<'s>(node: Value<'s>, shift: u32, hash: u32, key: Value<'_>, search_tag: u8) -> Option<Value<'s>> {
    if node.is_null() {
        None
    } else if node.is(search_tag) {
        let entries = (node.len() - 1) / 2;
        (0..entries)
            .find(|&e| node.field(1 + 2 * e).same(key))
            .map(|e| node.field(2 + 2 * e))
    } else {
        let idx = hamt::level_index(hash, shift);
        let child = hamt::get(node, idx);
        get_rec(child, shift + hamt::BITS_PER_LEVEL, hash, key, search_tag)
    }
}

fn set_node<'s>(
    store: &'s Store,
    node: Node<'s>,
    shift: u32,
    hash: u32,
    key: Value<'s>,
    value: Value<'s>,
    tags: (u8, u8),
) -> Result<Node<'s>> {
    let (_, search_tag) = tags;
    match node {
        Node::Stored(v) if v.is_null() => Ok(Node::Search {
            hash,
            entries: vec![(key, value)],
        }),
        Node::Stored(v) if v.is(search_tag) => {
            let n_entries = (v.len() - 1) / 2;
            let mut entries: Vec<(Value<'s>, Value<'s>)> =
                (0..n_entries).map(|e| (v.field(1 + 2 * e), v.field(2 + 2 * e))).collect();
            if let Some(slot) = entries.iter_mut().find(|(k, _)| k.same(key)) {
                slot.1 = value;
            } else if shift >= hamt::MAX_SHIFT {
                entries.push((key, value));
            } else {
                let mut dispatch = Node::Dispatch {
                    base: Value::null(),
                    overrides: Vec::new(),
                };
                for (k, val) in entries {
                    let kh = k.identity_hash(store.heap().base());
                    dispatch = set_node(store, dispatch, shift, kh, k, val, tags)?;
                }
                return set_node(store, dispatch, shift, hash, key, value, tags);
            }
            Ok(Node::Search { hash, entries })
        }
        Node::Stored(v) => {
            let idx = hamt::level_index(hash, shift);
            let child = hamt::get(v, idx);
            let new_child = set_node(
                store,
                Node::Stored(child),
                shift + hamt::BITS_PER_LEVEL,
                hash,
                key,
                value,
                tags,
            )?;
            Ok(Node::Dispatch {
                base: v,
                overrides: vec![(idx, new_child)],
            })
        }
        Node::Search {
            hash: node_hash,
            mut entries,
        } => {
            if let Some(slot) = entries.iter_mut().find(|(k, _)| k.same(key)) {
                slot.1 = value;
                return Ok(Node::Search {
                    hash: node_hash,
                    entries,
                });
            }
            if shift >= hamt::MAX_SHIFT {
                entries.push((key, value));
                Ok(Node::Search {
                    hash: node_hash,
                    entries,
                })
            } else {
                let mut dispatch = Node::Dispatch {
                    base: Value::null(),
                    overrides: Vec::new(),
                };
                for (k, val) in entries {
                    let kh = k.identity_hash(store.heap().base());
                    dispatch = set_node(store, dispatch, shift, kh, k, val, tags)?;
                }
                set_node(store, dispatch, shift, hash, key, value, tags)
            }
        }
        Node::Dispatch { base, mut overrides } => {
            let idx = hamt::level_index(hash, shift);
            let existing_child = take_slot(&mut overrides, idx).unwrap_or_else(|| {
                Node::Stored(if base.is_null() {
                    Value::null()
                } else {
                    hamt::get(base, idx)
                })
            });
            let new_child = set_node(
                store,
                existing_child,
                shift + hamt::BITS_PER_LEVEL,
                hash,
                key,
                value,
                tags,
            )?;
            overrides.push((idx, new_child));
            Ok(Node::Dispatch { base, overrides })
        }
    }
}

fn del_node<'s>(
    store: &'s Store,
    node: Node<'s>,
    shift: u32,
    hash: u32,
    key: Value<'_>,
    tags: (u8, u8),
) -> Result<(Node<'s>, bool)> {
    let (_, search_tag) = tags;
    match node {
        Node::Stored(v) if v.is_null() => Ok((Node::Stored(v), false)),
        Node::Stored(v) if v.is(search_tag) => {
            let n_entries = (v.len() - 1) / 2;
            let entries: Vec<(Value<'s>, Value<'s>)> =
                (0..n_entries).map(|e| (v.field(1 + 2 * e), v.field(2 + 2 * e))).collect();
            match entries.iter().position(|(k, _)| k.same(key)) {
                None => Ok((Node::Stored(v), false)),
                Some(pos) => {
                    let mut entries = entries;
                    entries.remove(pos);
                    if entries.is_empty() {
                        Ok((Node::Stored(Value::null()), true))
                    } else {
                        Ok((Node::Search { hash, entries }, true))
                    }
                }
            }
        }
        Node::Stored(v) => {
            let idx = hamt::level_index(hash, shift);
            let child = hamt::get(v, idx);
            let (new_child, removed) = del_node(
                store,
                Node::Stored(child),
                shift + hamt::BITS_PER_LEVEL,
                hash,
                key,
                tags,
            )?;
            Ok((
                Node::Dispatch {
                    base: v,
                    overrides: vec![(idx, new_child)],
                },
                removed,
            ))
        }
        Node::Search {
            hash: node_hash,
            mut entries,
        } => match entries.iter().position(|(k, _)| k.same(key)) {
            None => Ok((
                Node::Search {
                    hash: node_hash,
                    entries,
                },
                false,
            )),
            Some(pos) => {
                entries.remove(pos);
                if entries.is_empty() {
                    Ok((Node::Stored(Value::null()), true))
                } else {
                    Ok((
                        Node::Search {
                            hash: node_hash,
                            entries,
                        },
                        true,
                    ))
                }
            }
        },
        Node::Dispatch { base, mut overrides } => {
            let idx = hamt::level_index(hash, shift);
            let existing_child = take_slot(&mut overrides, idx).unwrap_or_else(|| {
                Node::Stored(if base.is_null() {
                    Value::null()
                } else {
                    hamt::get(base, idx)
                })
            });
            let (new_child, removed) =
                del_node(store, existing_child, shift + hamt::BITS_PER_LEVEL, hash, key, tags)?;
            overrides.push((idx, new_child));
            Ok((Node::Dispatch { base, overrides }, removed))
        }
    }
}

fn take_slot<'s>(overrides: &mut Vec<(u32, Node<'s>)>, idx: u32) -> Option<Node<'s>> {
    let pos = overrides.iter().position(|(i, _)| *i == idx)?;
    Some(overrides.remove(pos).1)
}

/// Walk an overlay tree bottom-up, writing every touched node into the store
/// for the first time and returning the resulting stored root.
fn materialize<'s>(store: &'s Store, node: Node<'s>, tags: (u8, u8)) -> Result<Value<'s>> {
    let (dispatch_tag, search_tag) = tags;
    match node {
        Node::Stored(v) => Ok(v),
        Node::Search { hash, entries } => {
            let mut fields = Vec::with_capacity(1 + entries.len() * 2);
            fields.push(Value::int(crate::value::hash_to_small_int(hash)));
            for (k, v) in entries {
                fields.push(k);
                fields.push(v);
            }
            store.new_record(search_tag, &fields)
        }
        Node::Dispatch { base, overrides } => {
            let mut result = if base.is_null() {
                hamt::new_dispatch(store, dispatch_tag)?
            } else {
                base
            };
            for (idx, child) in overrides {
                let child_value = materialize(store, child, tags)?;
                result = hamt::set(store, result, idx, child_value)?;
            }
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Store, StoreOptions, Unstored};

    #[test]
    fn strong_dict_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path().join("d.store"), StoreOptions::default()).unwrap();
        let key = store.store(&Unstored::string("curl")).unwrap();
        let value = store.store(&Unstored::Int(42)).unwrap();
        let mut dict = Dict::new(&store, DictKind::Strong);
        dict.set(key, value).unwrap();
        assert_eq!(dict.get(key).unwrap().to_int(), Some(42));
        assert!(dict.del(key).unwrap());
        assert!(dict.get(key).is_none());
    }

    #[test]
    fn weak_sets_accumulate_and_shrink() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path().join("d.store"), StoreOptions::default()).unwrap();
        let key = store.store(&Unstored::string("libssl")).unwrap();
        let a = store.store(&Unstored::string("curl")).unwrap();
        let b = store.store(&Unstored::string("wget")).unwrap();
        let mut dict = Dict::new(&store, DictKind::WeakSets);
        dict.add(key, a).unwrap();
        dict.add(key, b).unwrap();
        dict.add(key, a).unwrap();
        assert_eq!(dict.members(key).len(), 2);
        assert!(dict.rem(key, a).unwrap());
        assert_eq!(dict.members(key).len(), 1);
        assert!(dict.rem(key, b).unwrap());
        assert!(dict.get(key).is_none());
    }

    #[test]
    fn finish_commits_the_overlay_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.store");
        {
            let store = Store::create(&path, StoreOptions::default()).unwrap();
            let key = store.store(&Unstored::string("curl")).unwrap();
            let value = store.store(&Unstored::Int(1)).unwrap();
            let mut dict = Dict::new(&store, DictKind::Strong);
            dict.set(key, value).unwrap();
            let root = dict.finish().unwrap();
            store.set_root(root).unwrap();
        }
        let store = Store::open(&path, StoreOptions::default()).unwrap();
        let dict = Dict::open(&store, DictKind::Strong, store.root());
        let key = store.store(&Unstored::string("curl")).unwrap();
        assert_eq!(dict.get(key).unwrap().to_int(), Some(1));
    }

    #[test]
    fn abort_discards_the_overlay_without_touching_the_committed_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.store");
        let store = Store::create(&path, StoreOptions::default()).unwrap();

        let curl = store.store(&Unstored::string("curl")).unwrap();
        let one = store.store(&Unstored::Int(1)).unwrap();
        let mut dict = Dict::new(&store, DictKind::Strong);
        dict.set(curl, one).unwrap();
        let root = dict.finish().unwrap();
        store.set_root(root).unwrap();

        let wget = store.store(&Unstored::string("wget")).unwrap();
        let two = store.store(&Unstored::Int(2)).unwrap();
        let mut dict = Dict::open(&store, DictKind::Strong, store.root());
        dict.set(wget, two).unwrap();
        dict.abort();

        let dict = Dict::open(&store, DictKind::Strong, store.root());
        assert!(dict.get(curl).is_some());
        assert!(dict.get(wget).is_none());
    }

    #[test]
    fn store_materializes_in_place_and_keeps_the_dict_usable() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path().join("d.store"), StoreOptions::default()).unwrap();
        let key = store.store(&Unstored::string("curl")).unwrap();
        let value = store.store(&Unstored::Int(1)).unwrap();
        let mut dict = Dict::new(&store, DictKind::Strong);
        dict.set(key, value).unwrap();
        let root = dict.store().unwrap();
        assert!(!root.is_null());
        assert_eq!(dict.get(key).unwrap().to_int(), Some(1));

        let other_key = store.store(&Unstored::string("wget")).unwrap();
        let other_value = store.store(&Unstored::Int(2)).unwrap();
        dict.set(other_key, other_value).unwrap();
        assert_eq!(dict.get(other_key).unwrap().to_int(), Some(2));
    }
}
