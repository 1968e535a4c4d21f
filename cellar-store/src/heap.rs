//! Heap Module - file-backed virtual memory for a struct-store
//!
//! A store reserves a large span of virtual address space up front with a
//! single `mmap`, then grows the backing file underneath that reservation
//! with `ftruncate` as objects are allocated. The reservation's base
//! address never moves for the lifetime of the mapping, which is what lets
//! [`crate::Value`] hold a raw pointer for its whole borrow instead of an
//! offset that has to be re-resolved on every access.
//!
//! This uses raw `libc` calls rather than `memmap2` because the commit
//! protocol needs two operations `memmap2` doesn't expose: re-protecting an
//! already-mapped region in place with `MAP_FIXED`, and detaching a mapping
//! from its file with `MAP_PRIVATE` so garbage collection can mutate
//! forwarding pointers in the from-space without corrupting the on-disk
//! file it's disconnecting from.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::ptr;

use crate::error::{Result, StoreError};

/// Magic bytes identifying a struct-store file ("STDB" as little-endian u32).
pub(crate) const MAGIC: u32 = 0x4244_5453;
/// On-disk format version this build reads and writes.
pub(crate) const VERSION: u32 = 0;

/// Byte size of [`Header`] as stored at the start of the file.
pub(crate) const HEADER_SIZE: usize = std::mem::size_of::<Header>();

/// The fixed-size store header: magic/version identification plus the
/// book-keeping a store needs to resume after being reopened.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct Header {
    pub magic: u32,
    pub version: u32,
    /// Byte offset from the mapping base to the root object's header word,
    /// or 0 if the root is null/unset.
    pub root: u32,
    /// Length of the store in words (i.e. current high-water allocation
    /// mark), not counting the header itself.
    pub len: u32,
    /// Words allocated since the last garbage collection.
    pub alloced: u32,
    /// Per-tag object counts for tags 64..80, used to assign sequence
    /// numbers to interned/dictionary entries as they are created.
    pub counts: [u32; 16],
}

/// A file-backed, growable virtual memory reservation.
pub(crate) struct Heap {
    path: PathBuf,
    file: File,
    /// Base address of the fixed-size reservation.
    base: *mut u8,
    /// Size of the reservation (the virtual address span, not the file).
    max_size: usize,
    /// Size of the backing file as last grown to.
    file_size: usize,
    /// Granularity, in bytes, at which [`Heap::grow`] rounds the backing
    /// file's size up.
    grow_chunk: usize,
    read_only: bool,
}

// The heap's raw pointer is only ever dereferenced through borrows that are
// tied to a `Store`'s lifetime; the `Store` itself enforces single-writer
// access, so it is sound to move a `Heap` between threads.
unsafe impl Send for Heap {}

impl Heap {
    /// Create a brand-new, empty store file at `path`, truncating it if it
    /// already exists.
    pub fn create(path: &Path, max_size: usize, grow_chunk: usize) -> Result<Heap> {
        Self::open_with(path, max_size, grow_chunk, true, false)
    }

    /// Open an existing store file at `path`.
    pub fn open(path: &Path, max_size: usize, grow_chunk: usize, read_only: bool) -> Result<Heap> {
        Self::open_with(path, max_size, grow_chunk, false, read_only)
    }

    fn open_with(
        path: &Path,
        max_size: usize,
        grow_chunk: usize,
        truncate: bool,
        read_only: bool,
    ) -> Result<Heap> {
        let file = OpenOptions::new()
            .read(true)
            .write(!read_only)
            .create(!read_only)
            .truncate(truncate)
            .open(path)
            .map_err(|source| io_err(path, source))?;

        if !read_only {
            lock_exclusive(&file, path)?;
        }

        let prot = if read_only {
            libc::PROT_READ
        } else {
            libc::PROT_READ | libc::PROT_WRITE
        };

        let base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                max_size,
                prot,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(io_err(path, io::Error::last_os_error()));
        }
        let base = base as *mut u8;

        let mut heap = Heap {
            path: path.to_path_buf(),
            file,
            base,
            max_size,
            file_size: 0,
            grow_chunk,
            read_only,
        };

        let metadata_len = heap.file.metadata().map_err(|e| io_err(path, e))?.len() as usize;

        if truncate || metadata_len == 0 {
            heap.file
                .set_len(0)
                .map_err(|e| io_err(path, e))?;
            heap.file_size = 0;
            heap.grow(HEADER_SIZE)?;
            let header = heap.header_mut();
            header.magic = MAGIC;
            header.version = VERSION;
            header.root = 0;
            header.len = 0;
            header.alloced = 0;
            header.counts = [0; 16];
        } else {
            heap.file_size = metadata_len;
            if metadata_len < HEADER_SIZE {
                return Err(StoreError::NotAStore {
                    path: path.display().to_string(),
                });
            }
            let header = heap.header();
            if header.magic != MAGIC {
                return Err(StoreError::NotAStore {
                    path: path.display().to_string(),
                });
            }
            if header.version != VERSION {
                return Err(StoreError::VersionMismatch {
                    path: path.display().to_string(),
                    found: header.version,
                    expected: VERSION,
                });
            }
        }

        Ok(heap)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn base(&self) -> *mut u8 {
        self.base
    }

    pub fn header(&self) -> &Header {
        unsafe { &*(self.base as *const Header) }
    }

    pub fn header_mut(&mut self) -> &mut Header {
        unsafe { &mut *(self.base as *mut Header) }
    }

    /// Grow the backing file so that it is at least `size` bytes, rounded
    /// up to the configured growth granularity. Never shrinks.
    pub fn grow(&mut self, size: usize) -> Result<()> {
        let chunk = self.grow_chunk;
        let size = (size + chunk - 1) / chunk * chunk;
        if size > self.max_size {
            return Err(StoreError::SizeLimit {
                requested: size,
                max: self.max_size,
            });
        }
        if size > self.file_size {
            self.file
                .set_len(size as u64)
                .map_err(|e| io_err(&self.path, e))?;
            self.file_size = size;
        }
        Ok(())
    }

    /// Word offset (from the mapping base) at which the next object may be
    /// allocated, i.e. one past the current high-water mark.
    pub fn next_offset(&self) -> usize {
        HEADER_SIZE + (self.header().len as usize) * 4
    }

    /// Reserve `words` 32-bit words past the current high-water mark,
    /// growing the file if necessary, and return the byte offset of the
    /// allocation.
    pub fn alloc_words(&mut self, words: usize) -> Result<usize> {
        let offset = self.next_offset();
        let new_len_words = self.header().len as usize + words;
        self.grow(HEADER_SIZE + new_len_words * 4)?;
        self.header_mut().len = new_len_words as u32;
        self.header_mut().alloced += words as u32;
        Ok(offset)
    }

    /// Write the header back with the given root offset and fsync the
    /// allocated region, toggling the header's protection to `PROT_READ`
    /// once the commit is durable so that a stray write can't corrupt a
    /// store that looks fully written.
    pub fn commit(&mut self, root_offset: u32) -> Result<()> {
        if self.read_only {
            return Err(StoreError::Locked {
                path: self.path.display().to_string(),
            });
        }

        let data_start = (self.base as usize + HEADER_SIZE) as *mut libc::c_void;
        let data_start_aligned = (data_start as usize & !(page_size() - 1)) as *mut libc::c_void;
        let data_len = self.next_offset() - (data_start_aligned as usize - self.base as usize);
        if data_len > 0 {
            let rc = unsafe { libc::msync(data_start_aligned, data_len, libc::MS_SYNC) };
            if rc < 0 {
                return Err(io_err(&self.path, io::Error::last_os_error()));
            }
        }

        self.mprotect_header(libc::PROT_READ | libc::PROT_WRITE)?;
        self.header_mut().root = root_offset;

        let rc = unsafe {
            libc::msync(
                self.base as *mut libc::c_void,
                HEADER_SIZE,
                libc::MS_SYNC,
            )
        };
        if rc < 0 {
            return Err(io_err(&self.path, io::Error::last_os_error()));
        }

        self.mprotect_header(libc::PROT_READ)?;
        Ok(())
    }

    fn mprotect_header(&mut self, prot: libc::c_int) -> Result<()> {
        let rc = unsafe {
            libc::mmap(
                self.base as *mut libc::c_void,
                HEADER_SIZE,
                prot,
                libc::MAP_SHARED | libc::MAP_FIXED,
                self.file.as_raw_fd(),
                0,
            )
        };
        if rc == libc::MAP_FAILED {
            return Err(io_err(&self.path, io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Detach this mapping from its backing file by re-mapping it
    /// `MAP_PRIVATE`. After this call, writes (such as the forwarding
    /// pointers a collector stamps into from-space objects) are
    /// copy-on-write and never reach disk; this is how the collector is
    /// able to mutate the "from" store's objects in place without
    /// corrupting the file it is about to replace.
    pub fn detach(&mut self) -> Result<()> {
        let rc = unsafe {
            libc::mmap(
                self.base as *mut libc::c_void,
                self.file_size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_FIXED,
                self.file.as_raw_fd(),
                0,
            )
        };
        if rc == libc::MAP_FAILED {
            return Err(io_err(&self.path, io::Error::last_os_error()));
        }
        Ok(())
    }

}

impl Drop for Heap {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.base as *mut libc::c_void, self.max_size);
        }
    }
}

fn lock_exclusive(file: &File, path: &Path) -> Result<()> {
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock {
            return Err(StoreError::Locked {
                path: path.display().to_string(),
            });
        }
        return Err(io_err(path, err));
    }
    Ok(())
}

fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

fn io_err(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
