//! Tab Module - content-addressed intern tables
//!
//! A `Tab` hands back the same stored value every time it is asked to intern
//! two structurally-equal candidates, so that equal data only ever exists
//! once in a store. It is a thin, transient handle over a hash-array-mapped
//! trie whose root is itself an ordinary stored value: open a `Tab` over an
//! existing root to keep interning into a table a previous session built, or
//! start from null to build a fresh one.
//!
//! Interned values themselves are written into the store the moment they're
//! first seen -- a value has to exist somewhere to be compared against. The
//! trie *scaffolding* around them (dispatch/search nodes) does not: every
//! [`Tab::intern`] call only edits an in-memory overlay of the real,
//! previously-committed trie, and nothing about that scaffolding reaches the
//! store until [`Tab::finish`] walks it and writes the touched nodes for
//! real. [`Tab::abort`] just drops that overlay -- the already-interned
//! values it pointed at stay in the store as ordinary garbage, to be
//! reclaimed by the next collection, exactly as if they'd never been given a
//! home in a table at all.

use crate::error::Result;
use crate::hamt;
use crate::object::Unstored;
use crate::value::{hash_to_small_int, Value};
use crate::Store;

pub(crate) const TAB_DISPATCH_TAG: u8 = 0x7D;
pub(crate) const TAB_SEARCH_TAG: u8 = 0x7E;

/// One node of a table's trie, as seen from the overlay that [`Tab`] builds
/// up in process memory between [`Tab::init`] and [`Tab::finish`]/[`Tab::abort`].
#[derive(Clone)]
enum Node<'s> {
    /// Untouched this session: a committed record (or null) exactly as it
    /// reads from the store.
    Stored(Value<'s>),
    /// A search node with at least one member added or kept this session;
    /// not yet written anywhere.
    Search { hash: u32, members: Vec<Value<'s>> },
    /// A dispatch node with at least one slot touched this session. `base`
    /// is the committed dispatch record the untouched slots still read
    /// through (null if this dispatch node itself is new).
    Dispatch {
        base: Value<'s>,
        overrides: Vec<(u32, Node<'s>)>,
    },
}

/// A handle for interning values into a single hash trie.
pub struct Tab<'s> {
    store: &'s Store,
    root: Node<'s>,
}

impl<'s> Tab<'s> {
    /// Start working on a table rooted at `root` (null for a fresh table).
    pub fn init(store: &'s Store, root: Value<'s>) -> Tab<'s> {
        Tab {
            store,
            root: Node::Stored(root),
        }
    }

    /// Start a fresh, empty table.
    pub fn new(store: &'s Store) -> Tab<'s> {
        Self::init(store, Value::null())
    }

    /// Resume interning into a table built in a previous session.
    pub fn open(store: &'s Store, root: Value<'s>) -> Tab<'s> {
        Self::init(store, root)
    }

    /// Intern `candidate`: if a structurally-equal value is already in the
    /// table, return it unchanged and without allocating anything new;
    /// otherwise store `candidate` and add it to the table's in-memory
    /// overlay.
    pub fn intern(&mut self, candidate: &Unstored) -> Result<Value<'s>> {
        let hash = candidate.content_hash();
        let root = std::mem::replace(&mut self.root, Node::Stored(Value::null()));
        let (new_root, found) = intern_node(self.store, root, 0, hash, candidate)?;
        self.root = new_root;
        Ok(found)
    }

    /// Convenience wrapper for interning raw byte strings.
    pub fn intern_blob(&mut self, bytes: &[u8]) -> Result<Value<'s>> {
        self.intern(&Unstored::blob(bytes.to_vec()))
    }

    /// Probe the table without interning: returns the existing entry if
    /// `candidate` is already present, without allocating or mutating
    /// anything.
    pub fn intern_soft(&self, candidate: &Unstored) -> Option<Value<'s>> {
        let hash = candidate.content_hash();
        lookup_node(&self.root, 0, hash, candidate)
    }

    /// Alias for [`Tab::intern_soft`].
    pub fn lookup(&self, candidate: &Unstored) -> Option<Value<'s>> {
        self.intern_soft(candidate)
    }

    /// Materialize the overlay built up this session into real stored
    /// records and return the table's final root. Consumes `self`: there is
    /// nothing left to do with a table once its root has been committed
    /// somewhere reachable.
    pub fn finish(self) -> Result<Value<'s>> {
        materialize(self.store, self.root)
    }

    /// Discard everything interned into the overlay this session without
    /// touching the store. Values already interned via [`Tab::intern`]
    /// remain in the store as unreachable garbage until the next collection
    /// -- only the scaffolding around them is thrown away.
    pub fn abort(self) {}

    /// Every interned value, in trie order. If the overlay has
    /// session-local edits, they are first materialized into the store (as
    /// [`Tab::finish`] would) so the iterator has real records to walk; the
    /// table's own overlay is left untouched, so further [`Tab::intern`]
    /// calls and an eventual [`Tab::finish`] still see exactly what they
    /// would have without this call.
    pub fn entries(&self) -> Result<crate::iter::TabEntries<'s>> {
        let root = materialize(self.store, self.root.clone())?;
        Ok(crate::iter::TabEntries::new(root, TAB_SEARCH_TAG))
    }
}

fn intern_node<'s>(
    store: &'s Store,
    node: Node<'s>,
    shift: u32,
    hash: u32,
    candidate: &Unstored,
) -> Result<(Node<'s>, Value<'s>)> {
    match node {
        Node::Stored(v) if v.is_null() => {
            let stored = store.store(candidate)?;
            Ok((
                Node::Search {
                    hash,
                    members: vec![stored],
                },
                stored,
            ))
        }
        Node::Stored(v) if v.is(TAB_SEARCH_TAG) => {
            for i in 1..v.len() {
                let member = v.field(i);
                if candidate.equals_value(member) {
                    return Ok((Node::Stored(v), member));
                }
            }
            let stored = store.store(candidate)?;
            let mut members: Vec<Value<'s>> = (1..v.len()).map(|i| v.field(i)).collect();
            members.push(stored);
            Ok((Node::Search { hash, members }, stored))
        }
        Node::Stored(v) => {
            debug_assert!(v.is(TAB_DISPATCH_TAG));
            let idx = hamt::level_index(hash, shift);
            let child = hamt::get(v, idx);
            let (new_child, found) = intern_node(
                store,
                Node::Stored(child),
                shift + hamt::BITS_PER_LEVEL,
                hash,
                candidate,
            )?;
            Ok((
                Node::Dispatch {
                    base: v,
                    overrides: vec![(idx, new_child)],
                },
                found,
            ))
        }
        Node::Search {
            hash: node_hash,
            members,
        } => {
            for &member in &members {
                if candidate.equals_value(member) {
                    return Ok((
                        Node::Search {
                            hash: node_hash,
                            members,
                        },
                        member,
                    ));
                }
            }
            let stored = store.store(candidate)?;
            if shift >= hamt::MAX_SHIFT {
                let mut members = members;
                members.push(stored);
                Ok((
                    Node::Search {
                        hash: node_hash,
                        members,
                    },
                    stored,
                ))
            } else {
                let mut dispatch = Node::Dispatch {
                    base: Value::null(),
                    overrides: Vec::new(),
                };
                for member in members {
                    let member_hash = member.content_hash();
                    dispatch = place_scratch(store, dispatch, shift, member_hash, member)?;
                }
                dispatch = place_scratch(store, dispatch, shift, hash, stored)?;
                Ok((dispatch, stored))
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
            let (new_child, found) = intern_node(
                store,
                existing_child,
                shift + hamt::BITS_PER_LEVEL,
                hash,
                candidate,
            )?;
            overrides.push((idx, new_child));
            Ok((Node::Dispatch { base, overrides }, found))
        }
    }
}

/// Insert an already-stored `value` with known `hash` into a (sub)tree
/// rooted at the in-memory overlay `node`, exploding a search node into a
/// dispatch node once it would otherwise need to hold colliding entries that
/// still have discriminating hash bits left, and simply appending once the
/// trie has run out of bits (`shift >= hamt::MAX_SHIFT`).
fn place_scratch<'s>(
    store: &'s Store,
    node: Node<'s>,
    shift: u32,
    hash: u32,
    value: Value<'s>,
) -> Result<Node<'s>> {
    match node {
        Node::Stored(v) if v.is_null() => Ok(Node::Search {
            hash,
            members: vec![value],
        }),
        Node::Stored(v) if v.is(TAB_SEARCH_TAG) => {
            if shift >= hamt::MAX_SHIFT {
                let mut members: Vec<Value<'s>> = (1..v.len()).map(|i| v.field(i)).collect();
                members.push(value);
                Ok(Node::Search { hash, members })
            } else {
                let mut dispatch = Node::Dispatch {
                    base: Value::null(),
                    overrides: Vec::new(),
                };
                for i in 1..v.len() {
                    let member = v.field(i);
                    let member_hash = member.content_hash();
                    dispatch = place_scratch(store, dispatch, shift, member_hash, member)?;
                }
                place_scratch(store, dispatch, shift, hash, value)
            }
        }
        Node::Stored(v) => {
            debug_assert!(v.is(TAB_DISPATCH_TAG));
            let idx = hamt::level_index(hash, shift);
            let child = hamt::get(v, idx);
            let new_child = place_scratch(
                store,
                Node::Stored(child),
                shift + hamt::BITS_PER_LEVEL,
                hash,
                value,
            )?;
            Ok(Node::Dispatch {
                base: v,
                overrides: vec![(idx, new_child)],
            })
        }
        Node::Search {
            hash: node_hash,
            mut members,
        } => {
            if shift >= hamt::MAX_SHIFT {
                members.push(value);
                Ok(Node::Search {
                    hash: node_hash,
                    members,
                })
            } else {
                let mut dispatch = Node::Dispatch {
                    base: Value::null(),
                    overrides: Vec::new(),
                };
                for member in members {
                    let member_hash = member.content_hash();
                    dispatch = place_scratch(store, dispatch, shift, member_hash, member)?;
                }
                place_scratch(store, dispatch, shift, hash, value)
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
            let new_child = place_scratch(
                store,
                existing_child,
                shift + hamt::BITS_PER_LEVEL,
                hash,
                value,
            )?;
            overrides.push((idx, new_child));
            Ok(Node::Dispatch { base, overrides })
        }
    }
}

fn take_slot<'s>(overrides: &mut Vec<(u32, Node<'s>)>, idx: u32) -> Option<Node<'s>> {
    let pos = overrides.iter().position(|(i, _)| *i == idx)?;
    Some(overrides.remove(pos).1)
}

/// Pure lookup across a mixed stored/overlay tree; never allocates.
fn lookup_node<'s>(node: &Node<'s>, shift: u32, hash: u32, candidate: &Unstored) -> Option<Value<'s>> {
    match node {
        Node::Stored(v) => lookup_rec(*v, shift, hash, candidate),
        Node::Search { members, .. } => members.iter().copied().find(|m| candidate.equals_value(*m)),
        Node::Dispatch { base, overrides } => {
            let idx = hamt::level_index(hash, shift);
            if let Some((_, child)) = overrides.iter().find(|(i, _)| *i == idx) {
                lookup_node(child, shift + hamt::BITS_PER_LEVEL, hash, candidate)
            } else {
                let child = if base.is_null() {
                    Value::null()
                } else {
                    hamt::get(*base, idx)
                };
                lookup_rec(child, shift + hamt::BITS_PER_LEVEL, hash, candidate)
            }
        }
    }
}

fn lookup_rec<'s>(node: Value<'s>, shift: u32, hash: u32, candidate: &Unstored) -> Option<Value<'s>> {
    if node.is_null() {
        None
    } else if node.is(TAB_SEARCH_TAG) {
        (1..node.len()).map(|i| node.field(i)).find(|m| candidate.equals_value(*m))
    } else {
        let idx = hamt::level_index(hash, shift);
        let child = hamt::get(node, idx);
        lookup_rec(child, shift + hamt::BITS_PER_LEVEL, hash, candidate)
    }
}

/// Walk an overlay tree bottom-up, writing every touched node into the store
/// for the first time and returning the resulting stored root.
fn materialize<'s>(store: &'s Store, node: Node<'s>) -> Result<Value<'s>> {
    match node {
        Node::Stored(v) => Ok(v),
        Node::Search { hash, members } => {
            let mut fields = Vec::with_capacity(1 + members.len());
            fields.push(Value::int(hash_to_small_int(hash)));
            fields.extend(members);
            store.new_record(TAB_SEARCH_TAG, &fields)
        }
        Node::Dispatch { base, overrides } => {
            let mut result = if base.is_null() {
                hamt::new_dispatch(store, TAB_DISPATCH_TAG)?
            } else {
                base
            };
            for (idx, child) in overrides {
                let child_value = materialize(store, child)?;
                result = hamt::set(store, result, idx, child_value)?;
            }
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreOptions;

    #[test]
    fn interning_dedups_equal_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
        let mut tab = Tab::new(&store);
        let a = tab.intern_blob(b"curl").unwrap();
        let b = tab.intern_blob(b"curl").unwrap();
        assert!(a.same(b));
        let c = tab.intern_blob(b"wget").unwrap();
        assert!(!a.same(c));
    }

    #[test]
    fn interning_many_distinct_values_stays_consistent() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
        let mut tab = Tab::new(&store);
        let mut handles = Vec::new();
        for i in 0..500 {
            handles.push(tab.intern_blob(format!("pkg-{i}").as_bytes()).unwrap());
        }
        for (i, h) in handles.iter().enumerate() {
            let again = tab.intern_blob(format!("pkg-{i}").as_bytes()).unwrap();
            assert!(h.same(again));
        }
    }

    #[test]
    fn finish_commits_the_overlay_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.store");
        {
            let store = Store::create(&path, StoreOptions::default()).unwrap();
            let mut tab = Tab::new(&store);
            tab.intern_blob(b"curl").unwrap();
            tab.intern_blob(b"wget").unwrap();
            let root = tab.finish().unwrap();
            store.set_root(root).unwrap();
        }
        let store = Store::open(&path, StoreOptions::default()).unwrap();
        let tab = Tab::open(&store, store.root());
        assert!(tab.lookup(&Unstored::blob(b"curl".to_vec())).is_some());
        assert!(tab.lookup(&Unstored::blob(b"wget".to_vec())).is_some());
        assert!(tab.lookup(&Unstored::blob(b"missing".to_vec())).is_none());
    }

    #[test]
    fn abort_discards_the_overlay_without_touching_the_committed_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.store");
        let store = Store::create(&path, StoreOptions::default()).unwrap();

        let mut tab = Tab::new(&store);
        tab.intern_blob(b"curl").unwrap();
        let root = tab.finish().unwrap();
        store.set_root(root).unwrap();

        let mut tab = Tab::open(&store, store.root());
        tab.intern_blob(b"wget").unwrap();
        tab.abort();

        let tab = Tab::open(&store, store.root());
        assert!(tab.lookup(&Unstored::blob(b"curl".to_vec())).is_some());
        assert!(tab.lookup(&Unstored::blob(b"wget".to_vec())).is_none());
    }

    #[test]
    fn intern_soft_never_allocates() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
        let mut tab = Tab::new(&store);
        tab.intern_blob(b"curl").unwrap();
        let before = store.len_words();
        assert!(tab.intern_soft(&Unstored::blob(b"curl".to_vec())).is_some());
        assert!(tab.intern_soft(&Unstored::blob(b"missing".to_vec())).is_none());
        assert_eq!(store.len_words(), before);
    }
}
