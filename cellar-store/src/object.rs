//! Object Module - record/blob allocation, shallow copy, and the
//! unstored-value builder.
//!
//! Values only become visible to other store operations once they have
//! been written into the mapping by one of the `new_*`/`store` functions
//! here; until then they live as an ordinary [`Unstored`] tree in process
//! memory. This is a stronger guarantee than the original C API offered
//! (which let you build a graph of malloc'd "unstored" objects with the
//! same bit layout as stored ones, and mutate them in place): in this
//! port, an `Unstored` value can never be handed to a function that
//! expects a [`Value`], so a value cannot be referenced by the store
//! before it actually exists on disk.

use crate::error::Result;
use crate::value::{encode_field, encode_header, hash_blob, Value, BLOB_TAG};
use crate::Store;

/// A value tree built in ordinary process memory, not yet written into a
/// store. Construct one with the associated functions, nest them freely,
/// then call [`Store::store`] once the whole tree is ready.
#[derive(Clone, Debug)]
pub enum Unstored {
    Null,
    Int(i32),
    Blob(Vec<u8>),
    Record(u8, Vec<Unstored>),
}

impl Unstored {
    pub fn blob(bytes: impl Into<Vec<u8>>) -> Unstored {
        Unstored::Blob(bytes.into())
    }

    pub fn record(tag: u8, fields: impl Into<Vec<Unstored>>) -> Unstored {
        Unstored::Record(tag, fields.into())
    }

    pub fn string(s: impl AsRef<str>) -> Unstored {
        Unstored::Blob(s.as_ref().as_bytes().to_vec())
    }

    /// Content hash of this (not yet stored) tree, computed the same way as
    /// [`Value::content_hash`] so a candidate key can be hashed before
    /// deciding whether it needs to be stored at all.
    pub(crate) fn content_hash(&self) -> u32 {
        match self {
            Unstored::Null => 0,
            Unstored::Int(i) => *i as u32 & 0x3FFF_FFFF,
            Unstored::Blob(bytes) => hash_blob(bytes),
            Unstored::Record(_, fields) => {
                let mut h: u32 = 0;
                for f in fields {
                    h = (h << 8).wrapping_add(f.content_hash());
                }
                h & 0x3FFF_FFFF
            }
        }
    }

    /// Structural equality between this unstored tree and an already-stored
    /// value, without allocating anything.
    pub(crate) fn equals_value(&self, other: Value<'_>) -> bool {
        match self {
            Unstored::Null => other.is_null(),
            Unstored::Int(i) => other.to_int() == Some(*i),
            Unstored::Blob(bytes) => other.equal_blob(bytes),
            Unstored::Record(tag, fields) => {
                other.is(*tag)
                    && other.len() == fields.len()
                    && fields
                        .iter()
                        .enumerate()
                        .all(|(i, f)| f.equals_value(other.field(i)))
            }
        }
    }
}

impl Store {
    /// Write an [`Unstored`] tree into the store, returning the resulting
    /// stored [`Value`]. Fields are stored depth-first so that by the time
    /// a record is allocated, every field word it needs to encode already
    /// has a home in the mapping.
    pub fn store(&self, value: &Unstored) -> Result<Value<'_>> {
        match value {
            Unstored::Null => Ok(Value::null()),
            Unstored::Int(i) => Ok(Value::int(*i)),
            Unstored::Blob(bytes) => self.new_blob(bytes),
            Unstored::Record(tag, fields) => {
                let mut stored = Vec::with_capacity(fields.len());
                for f in fields {
                    stored.push(self.store(f)?.recast());
                }
                self.new_record(*tag, &stored)
            }
        }
    }

    /// Allocate a new blob object with the given contents.
    pub fn new_blob(&self, bytes: &[u8]) -> Result<Value<'_>> {
        let len_words = (bytes.len() + 3) / 4;
        let offset = self.heap_mut().alloc_words(1 + len_words)?;
        let base = self.heap().base();
        let header_ptr = unsafe { base.add(offset) as *mut u32 };
        unsafe {
            header_ptr.write(encode_header(BLOB_TAG, bytes.len() as u32)?);
            let data_ptr = header_ptr.add(1) as *mut u8;
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), data_ptr, bytes.len());
            // zero any trailing pad bytes so content hashing/equality never
            // reads uninitialized memory.
            for i in bytes.len()..len_words * 4 {
                data_ptr.add(i).write(0);
            }
        }
        Ok(self.value_at(header_ptr))
    }

    /// Allocate a new record with the given tag and fields. Tags 64..80
    /// are reserved: their first field is overwritten with a per-store,
    /// per-tag sequence number, auto-incremented on every such allocation,
    /// giving applications a cheap unique counter without a dictionary
    /// lookup (used by tab/dict nodes internally, and available to
    /// applications for tags they reserve the same way).
    pub fn new_record<'s>(&'s self, tag: u8, fields: &[Value<'_>]) -> Result<Value<'s>> {
        let offset = self.heap_mut().alloc_words(1 + fields.len())?;
        let base = self.heap().base();
        let header_ptr = unsafe { base.add(offset) as *mut u32 };
        unsafe {
            header_ptr.write(encode_header(tag, fields.len() as u32)?);
        }
        for (i, field) in fields.iter().enumerate() {
            let field_ptr = unsafe { header_ptr.add(1 + i) };
            let word = if i == 0 && (64..80).contains(&tag) && !fields.is_empty() {
                let seq = self.next_tag_sequence(tag);
                encode_field(Value::int(seq), header_ptr)
            } else {
                encode_field(field.recast(), header_ptr)
            };
            unsafe { field_ptr.write(word) };
        }
        Ok(self.value_at(header_ptr))
    }

    pub(crate) fn next_tag_sequence(&self, tag: u8) -> i32 {
        let idx = (tag - 64) as usize;
        let counts = &mut self.heap_mut().header_mut().counts;
        let seq = counts[idx];
        counts[idx] = seq.wrapping_add(1);
        seq as i32
    }

    /// Shallow copy: allocate a new object with the same tag and fields as
    /// `value` (fields are reused, not recursively copied). Used to make a
    /// structurally-fresh version of an object before destructively
    /// rewriting one of its fields, since stored objects are otherwise
    /// immutable.
    pub fn copy<'s>(&'s self, value: Value<'_>) -> Result<Value<'s>> {
        if value.is_blob() {
            self.new_blob(value.blob_bytes())
        } else {
            let fields: Vec<Value<'_>> = (0..value.len()).map(|i| value.field(i)).collect();
            self.new_record(value.tag(), &fields)
        }
    }

    /// Return a copy of `record` with `new_field` spliced in at `index`,
    /// shifting later fields up by one. Used by the HAMT implementations
    /// to grow dispatch/search nodes.
    pub(crate) fn insert_field<'s>(
        &'s self,
        record: Value<'_>,
        index: usize,
        new_field: Value<'_>,
    ) -> Result<Value<'s>> {
        let mut fields: Vec<Value<'_>> = (0..record.len()).map(|i| record.field(i)).collect();
        fields.insert(index, new_field.recast());
        self.new_record(record.tag(), &fields)
    }

    /// Return a copy of `record` with `count` fields starting at `index`
    /// removed. Used to shrink dispatch/search nodes.
    pub(crate) fn remove_fields<'s>(
        &'s self,
        record: Value<'_>,
        index: usize,
        count: usize,
    ) -> Result<Value<'s>> {
        let mut fields: Vec<Value<'_>> = (0..record.len()).map(|i| record.field(i)).collect();
        fields.drain(index..index + count);
        self.new_record(record.tag(), &fields)
    }

    /// Return a copy of `record` with field `index` replaced.
    pub(crate) fn set_field<'s>(
        &'s self,
        record: Value<'_>,
        index: usize,
        new_value: Value<'_>,
    ) -> Result<Value<'s>> {
        let mut fields: Vec<Value<'_>> = (0..record.len()).map(|i| record.field(i)).collect();
        fields[index] = new_value.recast();
        self.new_record(record.tag(), &fields)
    }
}
