//! # cellar-store
//!
//! A struct-store: a single-file, memory-mapped, append-only object heap
//! with an atomic root commit and a copying garbage collector.
//!
//! A store holds four kinds of values: null, small integers, records
//! (tagged sequences of fields), and blobs (byte strings). Values are
//! immutable once created; "mutation" means allocating a new value and
//! making it (or something that reaches it) the new root. Setting a new
//! root is atomic from the file's point of view: a reader either sees the
//! old root with everything it reaches intact, or the new one, never a
//! partially-written store.
//!
//! Only one process may hold a store open for writing at a time (enforced
//! with an advisory file lock); [`Store`] itself is not [`Sync`], since its
//! core operations mutate the mapping directly rather than through any
//! internal synchronization.
//!
//! ## Quick start
//!
//! ```no_run
//! use cellar_store::{Store, StoreOptions, Unstored};
//!
//! # fn main() -> cellar_store::Result<()> {
//! let store = Store::create("packages.store", StoreOptions::default())?;
//!
//! let name = Unstored::string("curl");
//! let pkg = Unstored::record(64, vec![Unstored::Null, name]);
//! let stored = store.store(&pkg)?;
//! store.set_root(stored)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: store sizing/threshold configuration
//! - [`error`]: error types for all store operations
//! - [`heap`]: file-backed virtual memory management
//! - [`value`]: the tagged-word wire encoding and the [`Value`] handle
//! - [`object`]: record/blob allocation and the [`Unstored`] builder
//! - [`tab`]: content-addressed intern tables
//! - [`dict`]: identity-keyed dictionaries with strong/weak semantics
//! - [`gc`]: the copying collector
//! - [`iter`]: ordered iteration over tab/dict entries

pub mod config;
pub mod dict;
pub mod error;
pub mod gc;
pub(crate) mod hamt;
pub(crate) mod heap;
pub mod iter;
pub mod object;
pub mod tab;
pub mod value;

pub use config::StoreOptions;
pub use error::{Result, StoreError};
pub use object::Unstored;
pub use value::Value;

use std::cell::UnsafeCell;
use std::path::Path;
use std::ptr::NonNull;

use heap::Heap;

/// A single open struct-store.
///
/// Allocating methods (`store`, `new_record`, `new_blob`, ...) take `&self`
/// rather than `&mut self`: a struct-store only ever grows by appending, so
/// the mapping's base address and every [`Value`] pointer into it stay valid
/// across any number of further allocations on the same `Store`. Internally
/// this is implemented with an [`UnsafeCell`], the way a bump arena would be;
/// the invariant that makes it sound is the same one the file format itself
/// relies on -- one writer, append-only, no in-place mutation of anything
/// already written.
pub struct Store {
    heap: UnsafeCell<Heap>,
    options: StoreOptions,
}

impl Store {
    /// Create a new, empty store at `path`, truncating any existing file.
    pub fn create(path: impl AsRef<Path>, options: StoreOptions) -> Result<Store> {
        options
            .validate()
            .map_err(|e| StoreError::Configuration(e.to_string()))?;
        let heap = Heap::create(path.as_ref(), options.max_size, options.grow_chunk)?;
        Ok(Store {
            heap: UnsafeCell::new(heap),
            options,
        })
    }

    /// Open an existing store at `path`.
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Store> {
        options
            .validate()
            .map_err(|e| StoreError::Configuration(e.to_string()))?;
        let heap = Heap::open(
            path.as_ref(),
            options.max_size,
            options.grow_chunk,
            options.read_only,
        )?;
        Ok(Store {
            heap: UnsafeCell::new(heap),
            options,
        })
    }

    pub fn path(&self) -> &Path {
        self.heap().path()
    }

    pub(crate) fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Shared access to the underlying heap.
    pub(crate) fn heap(&self) -> &Heap {
        unsafe { &*self.heap.get() }
    }

    /// Exclusive access to the underlying heap through a shared `Store`
    /// borrow. Sound because `Store` hands out no API that lets two calls
    /// observe overlapping mutable access at once: every allocating method
    /// takes this reborrow, uses it, and drops it before returning.
    #[allow(clippy::mut_from_ref)]
    pub(crate) fn heap_mut(&self) -> &mut Heap {
        unsafe { &mut *self.heap.get() }
    }

    pub(crate) fn value_at(&self, ptr: *mut u32) -> Value<'_> {
        Value::from_ptr(NonNull::new(ptr).expect("value_at with null pointer"))
    }

    /// The store's current root value, or null if none has been set.
    pub fn root(&self) -> Value<'_> {
        let word = self.heap().header().root;
        self.decode_root(word)
    }

    fn decode_root(&self, word: u32) -> Value<'_> {
        if word == 0 {
            Value::null()
        } else if word & 0b11 == 0b11 {
            Value::int((word as i32) >> 2)
        } else {
            let ptr = unsafe { self.heap().base().add(word as usize) as *mut u32 };
            self.value_at(ptr)
        }
    }

    fn encode_root(&self, value: Value<'_>) -> u32 {
        if value.is_null() {
            0
        } else if let Some(i) = value.to_int() {
            ((i as u32) << 2) | 0b11
        } else {
            let ptr = value
                .header_ptr()
                .expect("non-null, non-int value has no pointer");
            (ptr.as_ptr() as usize - self.heap().base() as usize) as u32
        }
    }

    /// Make `value` the new root and durably commit the store. This is the
    /// only operation that writes to the file's header, and thus the only
    /// point at which a crash can be observed to have "half happened" --
    /// either the old root is still there, or the new one fully is.
    pub fn set_root(&self, value: Value<'_>) -> Result<()> {
        let word = self.encode_root(value);
        self.heap_mut().commit(word)
    }

    /// Number of objects ever created with the given application-reserved
    /// tag (64..80); see [`Store::new_record`] for how the counter is
    /// assigned.
    pub fn tag_count(&self, tag: u8) -> u32 {
        if (64..80).contains(&tag) {
            self.heap().header().counts[(tag - 64) as usize]
        } else {
            0
        }
    }

    /// Words allocated since the last collection.
    pub fn words_allocated_since_gc(&self) -> usize {
        self.heap().header().alloced as usize
    }

    /// Current high-water allocation mark, in words, not counting the
    /// header itself.
    pub fn len_words(&self) -> usize {
        self.heap().header().len as usize
    }

    /// Whether the current root is null, a small integer, or a pointer to a
    /// stored object -- for diagnostic output, not anything the store
    /// itself branches on.
    pub fn root_kind(&self) -> &'static str {
        let root = self.root();
        if root.is_null() {
            "null"
        } else if root.is_int() {
            "int"
        } else if root.is_blob() {
            "blob"
        } else {
            "record"
        }
    }

    /// Run a garbage collection only if more than
    /// [`StoreOptions::gc_threshold_words`] words have been allocated since
    /// the last one, otherwise return the store unchanged.
    pub fn maybe_gc(self) -> Result<Store> {
        if self.words_allocated_since_gc() > self.options.gc_threshold_words {
            tracing::info!(path = %self.path().display(), "collecting garbage");
            self.gc()
        } else {
            Ok(self)
        }
    }

    /// Run a garbage collection unconditionally, copying every value
    /// reachable from the root into a fresh file and atomically replacing
    /// this store's file with it.
    pub fn gc(self) -> Result<Store> {
        gc::collect(self)
    }
}
