//! GC Module - the copying collector
//!
//! Collection copies every value reachable from the root into a brand-new
//! file, then atomically swaps that file in for the old one; nothing is
//! ever freed in place. Three things make this more than a plain copying
//! collector:
//!
//! - Shared substructure must stay shared: if two fields reference the same
//!   object, they must still reference the same (newly relocated) object
//!   afterward. This is tracked by stamping a forwarding pointer into the
//!   already-copied object's *old* header the first time it is copied (see
//!   [`crate::value::make_forward`]); later references to the same address
//!   just follow the forwarding pointer instead of copying again. Writing
//!   into from-space like this is only safe because the from-space mapping
//!   has been [`crate::heap::Heap::detach`]ed from its file first, so the
//!   mutation is copy-on-write and never reaches disk.
//! - [`crate::dict::Dict`] keys on object identity, which is address-based;
//!   after objects move, every dictionary's internal trie (built around the
//!   *old* addresses' hashes) is stale. So dictionaries of every
//!   [`crate::dict::DictKind`] are not copied field-by-field like ordinary
//!   records -- their entries are collected, their surviving keys and
//!   values relocated, and a fresh trie is built around the new identity
//!   hashes.
//! - [`crate::dict::DictKind::WeakKeys`] and
//!   [`crate::dict::DictKind::WeakSets`] entries additionally only survive
//!   if their key is reachable some other way. Reachability is computed
//!   first, over the old store, as a standard mark pass that defers
//!   descending into weak structures; a ripple then repeatedly admits
//!   entries whose key has since become reachable (which can in turn make
//!   more things reachable, if an admitted entry's value points at another
//!   weak structure) until a full pass admits nothing new. Only then is
//!   anything copied.
//! - [`crate::tab::Tab`] tables hash over content rather than identity, so
//!   a table's shape is unaffected by objects moving -- but a member is
//!   still only worth keeping if something other than the table itself
//!   reaches it. Tab dispatch/search nodes are therefore deferred during
//!   the mark pass exactly like weak dict structure (but never fed to the
//!   ripple -- membership in a Tab never makes anything reachable). At copy
//!   time each deferred node is rebuilt keeping only members independently
//!   marked reachable by the strong pass or the ripple, dropping the rest
//!   and collapsing subtrees that end up with nothing left in them.

use std::collections::HashSet;

use crate::dict::{self, DictKind};
use crate::error::{Result, StoreError};
use crate::hamt;
use crate::tab::{TAB_DISPATCH_TAG, TAB_SEARCH_TAG};
use crate::value::{self, Value};
use crate::Store;

/// Run a full collection over `store`, returning a fresh [`Store`] open on
/// the same path once the collected file has replaced the original.
pub(crate) fn collect(store: Store) -> Result<Store> {
    if store.options().read_only {
        return Err(StoreError::Locked {
            path: store.path().display().to_string(),
        });
    }

    let options = store.options().clone();
    let final_path = store.path().to_path_buf();
    let tmp_path = final_path.with_extension("gc-tmp");

    // Disconnect the source mapping from its file so the forwarding
    // pointers we are about to stamp into it never get written back.
    store.heap_mut().detach()?;

    let mut mark = Mark {
        visited: HashSet::new(),
        weak_search_nodes: Vec::new(),
        delayed_count: 0,
        max_delayed: options.max_delayed,
    };
    mark_strong(&store, store.root(), &mut mark)?;
    ripple(&store, &mut mark)?;

    let to_store = Store::create(&tmp_path, options.clone())?;
    let new_root = copy_value(&store, &to_store, store.root(), &mark.visited)?;
    to_store.set_root(new_root)?;

    drop(to_store);
    drop(store);

    std::fs::rename(&tmp_path, &final_path).map_err(|source| StoreError::Io {
        path: final_path.display().to_string(),
        source,
    })?;

    Store::open(&final_path, options)
}

struct Mark<'f> {
    /// Byte offsets (from the from-store's mapping base) of every object
    /// found strongly reachable.
    visited: HashSet<usize>,
    /// Every weak dict/set search node touched while marking, regardless of
    /// whether any of its entries have been admitted yet.
    weak_search_nodes: Vec<Value<'f>>,
    /// Count of distinct table/weak-dict/weak-set nodes deferred so far.
    delayed_count: usize,
    /// Cap on `delayed_count`, from [`crate::StoreOptions::max_delayed`].
    max_delayed: usize,
}

impl<'f> Mark<'f> {
    fn delay(&mut self) -> Result<()> {
        self.delayed_count += 1;
        if self.delayed_count > self.max_delayed {
            return Err(StoreError::TooManyDelayed {
                max: self.max_delayed,
            });
        }
        Ok(())
    }
}

fn addr_of(value: Value<'_>, base: *mut u8) -> Option<usize> {
    value
        .header_ptr()
        .map(|p| p.as_ptr() as usize - base as usize)
}

/// Mark everything reachable from `value` via strong references. Descending
/// into a weak dict/set defers to [`mark_weak_structure`], which records the
/// node for the ripple pass instead of marking its entries reachable.
fn mark_strong<'f>(from: &Store, value: Value<'f>, mark: &mut Mark<'f>) -> Result<()> {
    let base = from.heap().base();
    let Some(addr) = addr_of(value, base) else {
        return Ok(());
    };
    if !mark.visited.insert(addr) {
        return Ok(());
    }
    let tag = value.tag();
    if let Some((kind, _)) = DictKind::classify(tag) {
        if kind.is_weak() {
            return mark_weak_structure(from, value, kind.tags(), mark);
        }
    }
    if tag == TAB_DISPATCH_TAG || tag == TAB_SEARCH_TAG {
        return mark_tab_structure(from, value, mark);
    }
    if value.is_blob() {
        return Ok(());
    }
    for i in 0..value.len() {
        mark_strong(from, value.field(i), mark)?;
    }
    Ok(())
}

/// Walk a table's dispatch/search structure without marking its members
/// reachable. A member only stays alive if something else also reaches it;
/// that is checked once, at copy time, by [`copy_tab_node`]. Unlike weak
/// dict/set nodes, table nodes never feed the ripple pass -- being a member
/// of a table never makes anything else reachable.
fn mark_tab_structure<'f>(from: &Store, value: Value<'f>, mark: &mut Mark<'f>) -> Result<()> {
    let base = from.heap().base();
    let Some(addr) = addr_of(value, base) else {
        return Ok(());
    };
    if !mark.visited.insert(addr) {
        return Ok(());
    }
    mark.delay()?;
    if value.is(TAB_DISPATCH_TAG) {
        for idx in 0..32u32 {
            let child = hamt::get(value, idx);
            if !child.is_null() {
                mark_tab_structure(from, child, mark)?;
            }
        }
    }
    // Search nodes hold [hash, member_1, member_2, ...]; members are
    // intentionally left unmarked here.
    Ok(())
}

/// Walk a weak dict/set's dispatch/search structure without marking its
/// entries' keys or values reachable -- only the scaffolding nodes
/// themselves are recorded as visited (so a shared weak substructure isn't
/// walked twice), and every search node found is queued for [`ripple`].
fn mark_weak_structure<'f>(
    from: &Store,
    value: Value<'f>,
    tags: (u8, u8),
    mark: &mut Mark<'f>,
) -> Result<()> {
    let base = from.heap().base();
    let Some(addr) = addr_of(value, base) else {
        return Ok(());
    };
    if !mark.visited.insert(addr) {
        return Ok(());
    }
    mark.delay()?;
    let (dispatch_tag, search_tag) = tags;
    if value.is(search_tag) {
        mark.weak_search_nodes.push(value);
    } else if value.is(dispatch_tag) {
        for idx in 0..32u32 {
            mark_weak_structure(from, hamt::get(value, idx), tags, mark)?;
        }
    }
    Ok(())
}

/// Repeatedly scan every weak search node found so far for entries whose
/// key has become reachable, marking their value strongly reachable (which
/// may itself queue more weak search nodes via [`mark_strong`]), until a
/// full pass admits nothing new. Terminates because the set of admitted
/// entries only grows and is bounded by the total entry count.
fn ripple(from: &Store, mark: &mut Mark<'_>) -> Result<()> {
    let base = from.heap().base();
    let mut admitted: HashSet<(usize, usize)> = HashSet::new();
    loop {
        let mut changed = false;
        for &node in mark.weak_search_nodes.clone().iter() {
            let node_addr = addr_of(node, base).expect("search node is always a pointer");
            let entries = (node.len() - 1) / 2;
            for e in 0..entries {
                if admitted.contains(&(node_addr, e)) {
                    continue;
                }
                let key = node.field(1 + 2 * e);
                let alive = match addr_of(key, base) {
                    Some(kaddr) => mark.visited.contains(&kaddr),
                    None => true, // null/int keys are trivially alive
                };
                if alive {
                    admitted.insert((node_addr, e));
                    mark_strong(from, node.field(2 + 2 * e), mark)?;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    Ok(())
}

fn copy_value<'f, 't>(
    from: &Store,
    to: &'t Store,
    value: Value<'f>,
    visited: &HashSet<usize>,
) -> Result<Value<'t>> {
    if value.is_null() || value.is_int() {
        return Ok(value.recast());
    }
    let ptr = value.header_ptr().expect("non-null, non-int value has a pointer");
    let header = unsafe { ptr.as_ptr().read() };
    if value::is_forwarded(header) {
        let offset = value::forward_offset_bytes(header);
        if offset == 0 {
            return Ok(Value::null());
        }
        let new_ptr = unsafe { to.heap().base().add(offset as usize) as *mut u32 };
        return Ok(to.value_at(new_ptr));
    }

    let tag = value.tag();
    if tag == TAB_DISPATCH_TAG || tag == TAB_SEARCH_TAG {
        // copy_tab_node stamps its own forwarding pointer (including for
        // pruned-to-nothing subtrees, which forward to null), so it bypasses
        // the generic forwarding write below entirely.
        return Ok(copy_tab_node(from, to, value, visited)?.unwrap_or(Value::null()));
    }
    let new_value = if let Some((kind, _)) = DictKind::classify(tag) {
        copy_dict_node(from, to, value, kind, visited)?
    } else if value.is_blob() {
        to.new_blob(value.blob_bytes())?
    } else {
        let mut fields = Vec::with_capacity(value.len());
        for i in 0..value.len() {
            fields.push(copy_value(from, to, value.field(i), visited)?.recast());
        }
        to.new_record(tag, &fields)?
    };

    let forward_offset = new_value
        .header_ptr()
        .map(|p| p.as_ptr() as usize - to.heap().base() as usize)
        .unwrap_or(0);
    unsafe {
        ptr.as_ptr().write(value::make_forward(forward_offset as u32));
    }
    Ok(new_value)
}

fn collect_dict_entries<'f>(node: Value<'f>, tags: (u8, u8), out: &mut Vec<(Value<'f>, Value<'f>)>) {
    if node.is_null() {
        return;
    }
    let (dispatch_tag, search_tag) = tags;
    if node.is(search_tag) {
        let entries = (node.len() - 1) / 2;
        for e in 0..entries {
            out.push((node.field(1 + 2 * e), node.field(2 + 2 * e)));
        }
    } else if node.is(dispatch_tag) {
        for idx in 0..32u32 {
            collect_dict_entries(hamt::get(node, idx), tags, out);
        }
    }
}

fn copy_dict_node<'f, 't>(
    from: &Store,
    to: &'t Store,
    node: Value<'f>,
    kind: DictKind,
    visited: &HashSet<usize>,
) -> Result<Value<'t>> {
    let tags = kind.tags();
    let mut entries = Vec::new();
    collect_dict_entries(node, tags, &mut entries);
    let from_base = from.heap().base();

    let mut new_root: Value<'t> = Value::null();
    for (key, val) in entries {
        if kind.is_weak() {
            if let Some(kaddr) = addr_of(key, from_base) {
                if !visited.contains(&kaddr) {
                    continue;
                }
            }
        }
        let new_key = copy_value(from, to, key, visited)?;
        let new_val = copy_value(from, to, val, visited)?;
        new_root = dict::gc_insert(to, new_root, new_key, new_val, tags)?;
    }
    Ok(new_root)
}

/// Copy a table dispatch/search node, keeping only members that are
/// independently alive (reached by the strong mark pass, or admitted by the
/// dict ripple) and collapsing to `None` any node left with nothing in it.
/// Stamps its own forwarding pointer on `node` (a pruned-away node forwards
/// to offset 0, the same encoding [`copy_value`] uses for a null root),
/// which both lets shared trie substructure be copied only once and lets a
/// child already visited through another path short-circuit here.
fn copy_tab_node<'f, 't>(
    from: &Store,
    to: &'t Store,
    node: Value<'f>,
    visited: &HashSet<usize>,
) -> Result<Option<Value<'t>>> {
    let ptr = node.header_ptr().expect("tab nodes are always pointers");
    let header = unsafe { ptr.as_ptr().read() };
    if value::is_forwarded(header) {
        let offset = value::forward_offset_bytes(header);
        return Ok(if offset == 0 {
            None
        } else {
            let new_ptr = unsafe { to.heap().base().add(offset as usize) as *mut u32 };
            Some(to.value_at(new_ptr))
        });
    }

    let from_base = from.heap().base();
    let copy = if node.is(TAB_SEARCH_TAG) {
        let mut fields = vec![node.field(0).recast()];
        for i in 1..node.len() {
            let member = node.field(i);
            let alive = match addr_of(member, from_base) {
                Some(addr) => visited.contains(&addr),
                None => true, // null/int members are trivially alive
            };
            if alive {
                fields.push(copy_value(from, to, member, visited)?.recast());
            }
        }
        if fields.len() > 1 {
            Some(to.new_record(TAB_SEARCH_TAG, &fields)?)
        } else {
            None
        }
    } else {
        debug_assert!(node.is(TAB_DISPATCH_TAG));
        let mut result = hamt::new_dispatch(to, TAB_DISPATCH_TAG)?;
        for idx in 0..32u32 {
            let child = hamt::get(node, idx);
            if child.is_null() {
                continue;
            }
            if let Some(copied) = copy_tab_node(from, to, child, visited)? {
                result = hamt::set(to, result, idx, copied)?;
            }
        }
        if hamt::is_empty_sentinel(result) {
            None
        } else {
            Some(result)
        }
    };

    let forward_offset = match copy {
        Some(v) => v
            .header_ptr()
            .map(|p| p.as_ptr() as usize - to.heap().base() as usize)
            .unwrap_or(0),
        None => 0,
    };
    unsafe {
        ptr.as_ptr().write(value::make_forward(forward_offset as u32));
    }
    Ok(copy)
}
