//! Symbol module - String interning for control-file fields and values.
//!
//! This module provides the [`Symbol`] type, which is a compact (4-byte) handle
//! to an interned string. Symbols enable O(1) string comparison and reduce memory
//! usage when the same field name or value appears in many stanzas.
//!
//! # Overview
//!
//! The symbol interning system is a core component of control-file parsing,
//! providing:
//!
//! - **Memory efficiency**: Each unique string is stored only once
//! - **Fast comparison**: Symbol comparison is O(1) via index comparison
//! - **Thread safety**: Safe to use across multiple threads concurrently
//! - **Stable handles**: Symbols remain valid for the program lifetime
//!
//! # Performance Characteristics
//!
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `Symbol::intern()` (hit) | O(1) | String already interned |
//! | `Symbol::intern()` (miss) | O(1) | New string allocation |
//! | `Symbol` comparison | O(1) | Index comparison only |
//! | `Symbol::as_str()` | O(n) | Linear search by index |
//! | `Symbol::eq_str()` | O(1) | Hash + pointer comparison |
//!
//! # Thread Safety
//!
//! The symbol interner is fully thread-safe (`Sync + Send`). Multiple threads
//! can intern strings concurrently without blocking each other, thanks to
//! DashMap's lock-free design.
//!
//! # Memory Model
//!
//! Interned strings are allocated on the heap with `'static` lifetime.
//! They are never deallocated, which is acceptable because:
//! 1. A single import/resolve run touches a bounded number of packages
//! 2. Total memory usage is bounded by the size of the control files read
//! 3. This avoids complex lifetime tracking
//!
//! # Examples
//!
//! Basic usage:
//!
//! ```
//! use cellar_util::symbol::Symbol;
//!
//! let s1 = Symbol::intern("hello");
//! let s2 = Symbol::intern("hello");
//! let s3 = Symbol::intern("world");
//!
//! assert_eq!(s1, s2);  // Same symbol for same string
//! assert_ne!(s1, s3);  // Different strings get different symbols
//! ```
//!
//! Using known fields:
//!
//! ```
//! use cellar_util::symbol::{Symbol, FIELD_PACKAGE, FIELD_VERSION};
//!
//! assert_eq!(FIELD_PACKAGE.as_str(), "Package");
//! assert_eq!(FIELD_VERSION.as_str(), "Version");
//! assert!(FIELD_PACKAGE.is_known());  // Pre-defined control-file field
//! ```
//!
//! Thread-safe usage:
//!
//! ```
//! use cellar_util::symbol::Symbol;
//! use std::thread;
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|i| {
//!         thread::spawn(move || {
//!             Symbol::intern(&format!("thread_{}", i))
//!         })
//!     })
//!     .collect();
//!
//! let symbols: Vec<_> = handles.into_iter()
//!     .map(|h| h.join().unwrap())
//!     .collect();
//!
//! // All symbols are unique
//! assert_eq!(symbols.len(), 4);
//! ```
//!
//! # Statistics and Profiling
//!
//! The interner tracks hit/miss statistics for performance profiling:
//!
//! ```
//! use cellar_util::symbol::Symbol;
//!
//! let _ = Symbol::intern("test");
//! let _ = Symbol::intern("test");  // Hit
//!
//! let stats = Symbol::stats_struct();
//! println!("Hits: {}, Misses: {}", stats.hits, stats.misses);
//! ```

mod interner;

pub use interner::STRING_TABLE;

/// Statistics about the string interner for profiling
///
/// Provides insights into memory usage and efficiency of the interner.
///
/// # Fields
///
/// * `count` - Number of unique interned strings
/// * `capacity` - Hash map capacity (number of buckets)
/// * `collisions` - Number of hash collisions encountered
/// * `hits` - Number of times an already-interned string was requested
/// * `misses` - Number of times a new string was allocated
///
/// # Examples
///
/// ```
/// use cellar_util::symbol::{Symbol, InternerStats};
///
/// let stats = Symbol::stats_struct();
/// println!("Interned {} strings", stats.count);
/// println!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);
/// println!("Load factor: {:.2}", stats.load_factor());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct InternerStats {
    /// Number of interned strings
    pub count: usize,
    /// Hash map capacity (number of buckets)
    pub capacity: usize,
    /// Number of hash collisions encountered
    pub collisions: usize,
    /// Number of cache hits (string already interned)
    pub hits: usize,
    /// Number of cache misses (new string allocation)
    pub misses: usize,
}

impl InternerStats {
    /// Create new stats with the given values
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(100, 256, 5, 80, 20);
    /// assert_eq!(stats.count, 100);
    /// assert_eq!(stats.hits, 80);
    /// ```
    pub const fn new(
        count: usize,
        capacity: usize,
        collisions: usize,
        hits: usize,
        misses: usize,
    ) -> Self {
        Self {
            count,
            capacity,
            collisions,
            hits,
            misses,
        }
    }

    /// Calculate the load factor (count / capacity)
    ///
    /// Returns 0.0 if capacity is 0.
    ///
    /// A load factor above 0.75 indicates the hash map may need resizing.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(100, 200, 0, 0, 0);
    /// assert_eq!(stats.load_factor(), 0.5);
    /// ```
    pub fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.count as f64 / self.capacity as f64
        }
    }

    /// Check if the interner is getting full (load factor > 0.75)
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(100, 200, 0, 0, 0);
    /// assert!(!stats.is_near_capacity());
    ///
    /// let stats = InternerStats::new(100, 120, 0, 0, 0);
    /// assert!(stats.is_near_capacity());
    /// ```
    pub fn is_near_capacity(&self) -> bool {
        self.load_factor() > 0.75
    }

    /// Calculate the hit rate (hits / (hits + misses))
    ///
    /// Returns 0.0 if no lookups have been performed.
    ///
    /// A high hit rate (>0.9) indicates good interning efficiency.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(100, 200, 0, 90, 10);
    /// assert_eq!(stats.hit_rate(), 0.9);
    /// ```
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get total number of interning operations
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(100, 200, 0, 90, 10);
    /// assert_eq!(stats.total_operations(), 100);
    /// ```
    pub fn total_operations(&self) -> usize {
        self.hits + self.misses
    }

    /// Get memory efficiency ratio (unique strings / total operations)
    ///
    /// Lower values indicate better deduplication.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(10, 100, 0, 90, 10);
    /// assert_eq!(stats.memory_efficiency(), 0.1);  // 10 unique / 100 ops
    /// ```
    pub fn memory_efficiency(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.count as f64 / self.total_operations() as f64
        }
    }
}

/// Symbol - An interned string identifier
///
/// A Symbol is a compact (4-byte) handle to a string stored in a global
/// string table. This enables O(1) string comparison and reduces memory
/// usage when the same string appears multiple times.
///
/// # Size
///
/// `Symbol` is exactly 4 bytes (u32), making it very cache-friendly compared
/// to `String` which is 24 bytes plus heap allocation.
///
/// # Thread Safety
///
/// Symbols are safe to share across threads (`Sync + Send`). The underlying
/// string table uses DashMap for lock-free concurrent access.
///
/// # Lifetime
///
/// Interned strings have `'static` lifetime and are never deallocated.
/// This is safe because the string table lives for the program duration.
///
/// # Examples
///
/// ```
/// use cellar_util::symbol::Symbol;
///
/// let field = Symbol::intern("Package");
/// let name = Symbol::intern("libcellar");
///
/// assert_eq!(field.as_str(), "Package");
/// assert_eq!(name.as_str(), "libcellar");
/// assert_eq!(field, Symbol::intern("Package"));  // O(1) comparison
/// ```
///
/// # Performance Notes
///
/// - **Creation**: O(1) hash lookup/insert
/// - **Comparison**: O(1) index comparison
/// - **String retrieval**: O(n) linear search (avoid in hot paths)
/// - **Memory**: One allocation per unique string
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    /// Index into the global string table
    pub(crate) index: u32,
}

// ============================================================================
// KNOWN SYMBOLS (CONTROL-FILE FIELDS AND VALUES)
// ============================================================================
//
/// Reserved symbol indices for known symbols (field names and field values)
///
/// All symbols with index < this value are pre-defined at startup and
/// correspond to Debian-control-file field names and their common values.
const RESERVED_SYMBOLS_END: u32 = 512;

// ----------------------------------------------------------------------------
// Core Identification Fields
// ----------------------------------------------------------------------------

/// Known symbol for the `Package` field
pub const FIELD_PACKAGE: Symbol = Symbol { index: 0 };
/// Known symbol for the `Source` field
pub const FIELD_SOURCE: Symbol = Symbol { index: 1 };
/// Known symbol for the `Version` field
pub const FIELD_VERSION: Symbol = Symbol { index: 2 };
/// Known symbol for the `Architecture` field
pub const FIELD_ARCHITECTURE: Symbol = Symbol { index: 3 };
/// Known symbol for the `Maintainer` field
pub const FIELD_MAINTAINER: Symbol = Symbol { index: 4 };
/// Known symbol for the `Description` field
pub const FIELD_DESCRIPTION: Symbol = Symbol { index: 5 };
/// Known symbol for the `Homepage` field
pub const FIELD_HOMEPAGE: Symbol = Symbol { index: 6 };
/// Known symbol for the `Depends` field
pub const FIELD_DEPENDS: Symbol = Symbol { index: 7 };
/// Known symbol for the `Recommends` field
pub const FIELD_RECOMMENDS: Symbol = Symbol { index: 8 };
/// Known symbol for the `Suggests` field
pub const FIELD_SUGGESTS: Symbol = Symbol { index: 9 };
/// Known symbol for the `Conflicts` field
pub const FIELD_CONFLICTS: Symbol = Symbol { index: 10 };
/// Known symbol for the `Breaks` field
pub const FIELD_BREAKS: Symbol = Symbol { index: 11 };
/// Known symbol for the `Provides` field
pub const FIELD_PROVIDES: Symbol = Symbol { index: 12 };

// ----------------------------------------------------------------------------
// Relationship and Classification Fields
// ----------------------------------------------------------------------------

/// Known symbol for the `Replaces` field
pub const FIELD_REPLACES: Symbol = Symbol { index: 13 };
/// Known symbol for the `Enhances` field
pub const FIELD_ENHANCES: Symbol = Symbol { index: 14 };
/// Known symbol for the `Pre-Depends` field
pub const FIELD_PRE_DEPENDS: Symbol = Symbol { index: 15 };
/// Known symbol for the `Essential` field
pub const FIELD_ESSENTIAL: Symbol = Symbol { index: 16 };
/// Known symbol for the `Multi-Arch` field
pub const FIELD_MULTI_ARCH: Symbol = Symbol { index: 17 };
/// Known symbol for the `Section` field
pub const FIELD_SECTION: Symbol = Symbol { index: 18 };
/// Known symbol for the `Priority` field
pub const FIELD_PRIORITY: Symbol = Symbol { index: 19 };

// ----------------------------------------------------------------------------
// Source-Package and Build Fields
// ----------------------------------------------------------------------------

/// Known symbol for the `Build-Depends` field
pub const FIELD_BUILD_DEPENDS: Symbol = Symbol { index: 20 };
/// Known symbol for the `Build-Conflicts` field
pub const FIELD_BUILD_CONFLICTS: Symbol = Symbol { index: 21 };
/// Known symbol for the `Standards-Version` field
pub const FIELD_STANDARDS_VERSION: Symbol = Symbol { index: 22 };
/// Known symbol for the `Vcs-Git` field
pub const FIELD_VCS_GIT: Symbol = Symbol { index: 23 };
/// Known symbol for the `Vcs-Browser` field
pub const FIELD_VCS_BROWSER: Symbol = Symbol { index: 24 };
/// Known symbol for the `Uploaders` field
pub const FIELD_UPLOADERS: Symbol = Symbol { index: 25 };

// ----------------------------------------------------------------------------
// Boolean-ish Field Values
// ----------------------------------------------------------------------------

/// Known symbol for the `yes` value
pub const VAL_YES: Symbol = Symbol { index: 26 };
/// Known symbol for the `no` value
pub const VAL_NO: Symbol = Symbol { index: 27 };

// ----------------------------------------------------------------------------
// Package Status Fields
// ----------------------------------------------------------------------------

/// Known symbol for the `installed` status word
pub const STATUS_INSTALLED: Symbol = Symbol { index: 28 };
/// Known symbol for the `removed` status word
pub const STATUS_REMOVED: Symbol = Symbol { index: 29 };

// ----------------------------------------------------------------------------
// Architecture Names
// ----------------------------------------------------------------------------

/// Known symbol for the `amd64` architecture
pub const ARCH_AMD64: Symbol = Symbol { index: 30 };
/// Known symbol for the `arm64` architecture
pub const ARCH_ARM64: Symbol = Symbol { index: 31 };
/// Known symbol for the `armhf` architecture
pub const ARCH_ARMHF: Symbol = Symbol { index: 32 };
/// Known symbol for the `i386` architecture
pub const ARCH_I386: Symbol = Symbol { index: 33 };
/// Known symbol for the `mips64el` architecture
pub const ARCH_MIPS64EL: Symbol = Symbol { index: 34 };
/// Known symbol for the `ppc64el` architecture
pub const ARCH_PPC64EL: Symbol = Symbol { index: 35 };
/// Known symbol for the `riscv64` architecture
pub const ARCH_RISCV64: Symbol = Symbol { index: 36 };
/// Known symbol for the `s390x` architecture
pub const ARCH_S390X: Symbol = Symbol { index: 37 };
/// Known symbol for the `all` architecture (architecture-independent package)
pub const ARCH_ALL: Symbol = Symbol { index: 38 };
/// Known symbol for the `any` architecture wildcard
pub const ARCH_ANY: Symbol = Symbol { index: 39 };

// ----------------------------------------------------------------------------
// Archive Section Components
// ----------------------------------------------------------------------------

/// Known symbol for the `main` archive component
pub const SECTION_MAIN: Symbol = Symbol { index: 40 };
/// Known symbol for the `contrib` archive component
pub const SECTION_CONTRIB: Symbol = Symbol { index: 41 };

// ----------------------------------------------------------------------------
// Section and Priority Values
// ----------------------------------------------------------------------------

/// Known symbol for the `non-free` archive component
pub const SECTION_NON_FREE: Symbol = Symbol { index: 42 };
/// Known symbol for the `optional` priority
pub const PRIORITY_OPTIONAL: Symbol = Symbol { index: 43 };
/// Known symbol for the `extra` priority
pub const PRIORITY_EXTRA: Symbol = Symbol { index: 44 };

// ----------------------------------------------------------------------------
// Remaining Priority Values
// ----------------------------------------------------------------------------

/// Known symbol for the `standard` priority
pub const PRIORITY_STANDARD: Symbol = Symbol { index: 45 };
/// Known symbol for the `required` priority
pub const PRIORITY_REQUIRED: Symbol = Symbol { index: 46 };

// ----------------------------------------------------------------------------
// Multi-Arch Values
// ----------------------------------------------------------------------------

/// Known symbol for the `same` `Multi-Arch` value
pub const MULTI_ARCH_SAME: Symbol = Symbol { index: 47 };
/// Known symbol for the `foreign` `Multi-Arch` value
pub const MULTI_ARCH_FOREIGN: Symbol = Symbol { index: 48 };

// ----------------------------------------------------------------------------
// Package Database Status Words
// ----------------------------------------------------------------------------

/// Known symbol for the `unpacked` dpkg status word
pub const STATUS_UNPACKED: Symbol = Symbol { index: 49 };
/// Known symbol for the `half-configured` dpkg status word
pub const STATUS_HALF_CONFIGURED: Symbol = Symbol { index: 50 };
/// Known symbol for the `half-installed` dpkg status word
pub const STATUS_HALF_INSTALLED: Symbol = Symbol { index: 51 };
/// Known symbol for the `config-files` dpkg status word
pub const STATUS_CONFIG_FILES: Symbol = Symbol { index: 52 };
/// Known symbol for the `not-installed` dpkg status word
pub const STATUS_NOT_INSTALLED: Symbol = Symbol { index: 53 };
/// Known symbol for the `triggers-awaited` dpkg status word
pub const STATUS_TRIGGERS_AWAITED: Symbol = Symbol { index: 54 };
/// Known symbol for the `triggers-pending` dpkg status word
pub const STATUS_TRIGGERS_PENDING: Symbol = Symbol { index: 55 };
/// Known symbol for the `hold` dpkg status word
pub const STATUS_HOLD: Symbol = Symbol { index: 56 };
/// Known symbol for the `ok` dpkg status word
pub const STATUS_OK: Symbol = Symbol { index: 57 };
/// Known symbol for the `reinst-required` dpkg status word
pub const STATUS_REINST_REQUIRED: Symbol = Symbol { index: 58 };
/// Known symbol for the `install` want-state word
pub const WANT_INSTALL: Symbol = Symbol { index: 59 };
/// Known symbol for the `deinstall` want-state word
pub const WANT_DEINSTALL: Symbol = Symbol { index: 60 };
/// Known symbol for the `purge` want-state word
pub const WANT_PURGE: Symbol = Symbol { index: 61 };
/// Known symbol for the `unknown` want-state word
pub const WANT_UNKNOWN: Symbol = Symbol { index: 62 };
/// Known symbol for the `want` status-line column header
pub const FLAG_WANT: Symbol = Symbol { index: 63 };
/// Known symbol for the `current` status-line column header
pub const FLAG_CURRENT: Symbol = Symbol { index: 64 };
/// Known symbol for the `auto` installed-by-dependency flag
pub const FLAG_AUTO: Symbol = Symbol { index: 65 };
/// Known symbol for the `manual` installed-by-request flag
pub const FLAG_MANUAL: Symbol = Symbol { index: 66 };
/// Known symbol for the `native` multi-arch flag
pub const FLAG_NATIVE: Symbol = Symbol { index: 67 };
/// Known symbol for the `virtual` provides flag
pub const FLAG_VIRTUAL: Symbol = Symbol { index: 68 };
/// Known symbol for the `noarch` architecture wildcard
pub const ARCH_NOARCH: Symbol = Symbol { index: 69 };

// ----------------------------------------------------------------------------
// Extended Metadata Fields
// ----------------------------------------------------------------------------

/// Known symbol for the `Origin` field
pub const FIELD_ORIGIN: Symbol = Symbol { index: 70 };
/// Known symbol for the `Label` field
pub const FIELD_LABEL: Symbol = Symbol { index: 71 };
/// Known symbol for the `Codename` field
pub const FIELD_CODENAME: Symbol = Symbol { index: 72 };
/// Known symbol for the `Suite` field
pub const FIELD_SUITE: Symbol = Symbol { index: 73 };
/// Known symbol for the `Component` field
pub const FIELD_COMPONENT: Symbol = Symbol { index: 74 };
/// Known symbol for the `Bugs` field
pub const FIELD_BUGS: Symbol = Symbol { index: 75 };
/// Known symbol for the `Tag` field
pub const FIELD_TAG: Symbol = Symbol { index: 76 };
/// Known symbol for the `Task` field
pub const FIELD_TASK: Symbol = Symbol { index: 77 };
/// Known symbol for the `Kernel-Version` field
pub const FIELD_KERNEL_VERSION: Symbol = Symbol { index: 78 };
/// Known symbol for the `Installed-Size` field
pub const FIELD_INSTALLED_SIZE: Symbol = Symbol { index: 79 };
/// Known symbol for the `Installer-Menu-Item` field
pub const FIELD_INSTALLER_MENU_ITEM: Symbol = Symbol { index: 80 };
/// Known symbol for the `Original-Maintainer` field
pub const FIELD_ORIGINAL_MAINTAINER: Symbol = Symbol { index: 81 };
/// Known symbol for the `Python-Version` field
pub const FIELD_PYTHON_VERSION: Symbol = Symbol { index: 82 };
/// Known symbol for the `Ruby-Versions` field
pub const FIELD_RUBY_VERSIONS: Symbol = Symbol { index: 83 };
/// Known symbol for the `Go-Import-Path` field
pub const FIELD_GO_IMPORT_PATH: Symbol = Symbol { index: 84 };
/// Known symbol for the `Rust-Version` field
pub const FIELD_RUST_VERSION: Symbol = Symbol { index: 85 };
/// Known symbol for the `Static-Built-Using` field
pub const FIELD_STATIC_BUILT_USING: Symbol = Symbol { index: 86 };
/// Known symbol for the `Built-Using` field
pub const FIELD_BUILT_USING: Symbol = Symbol { index: 87 };
/// Known symbol for the `Checksums-Sha1` field
pub const FIELD_CHECKSUMS_SHA1: Symbol = Symbol { index: 88 };
/// Known symbol for the `Checksums-Sha256` field
pub const FIELD_CHECKSUMS_SHA256: Symbol = Symbol { index: 89 };
/// Known symbol for the `Checksums-Md5` field
pub const FIELD_CHECKSUMS_MD5: Symbol = Symbol { index: 90 };
/// Known symbol for the `Files` field
pub const FIELD_FILES: Symbol = Symbol { index: 91 };
/// Known symbol for the `Package-List` field
pub const FIELD_PACKAGE_LIST: Symbol = Symbol { index: 92 };
/// Known symbol for the `Package-Type` field
pub const FIELD_PACKAGE_TYPE: Symbol = Symbol { index: 93 };
/// Known symbol for the `Config-Version` field
pub const FIELD_CONFIG_VERSION: Symbol = Symbol { index: 94 };
/// Known symbol for the `Auto-Built-Package` field
pub const FIELD_AUTO_BUILT_PACKAGE: Symbol = Symbol { index: 95 };
/// Known symbol for the `Build-Ids` field
pub const FIELD_BUILD_IDS: Symbol = Symbol { index: 96 };
/// Known symbol for the `Testsuite` field
pub const FIELD_TESTSUITE: Symbol = Symbol { index: 97 };
/// Known symbol for the `Testsuite-Triggers` field
pub const FIELD_TESTSUITE_TRIGGERS: Symbol = Symbol { index: 98 };
/// Known symbol for the `Dgit` field
pub const FIELD_DGIT: Symbol = Symbol { index: 99 };
/// Known symbol for the `Comment` field
pub const FIELD_COMMENT: Symbol = Symbol { index: 100 };
/// Known symbol for the `Description-md5` field
pub const FIELD_DESCRIPTION_MD5: Symbol = Symbol { index: 101 };
/// Known symbol for the `Ghc-Package` field
pub const FIELD_GHC_PACKAGE: Symbol = Symbol { index: 102 };

impl Symbol {
    /// The maximum index value for a symbol
    pub const MAX_INDEX: u32 = u32::MAX;

    /// Intern a string, returning its symbol
    ///
    /// This function will:
    /// 1. Hash the string to check for existing entry
    /// 2. If found, return existing symbol (cache hit)
    /// 3. If not found, allocate new slot and return new symbol (cache miss)
    ///
    /// # Thread Safety
    ///
    /// This function is thread-safe. Multiple threads can intern strings
    /// concurrently using DashMap for lock-free access.
    ///
    /// # Performance
    ///
    /// - **Best case** (string already interned): O(1) hash lookup
    /// - **Worst case** (new unique string): O(1) hash insert + allocation
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// let field = Symbol::intern("Package");
    /// let name = Symbol::intern("libcellar");
    ///
    /// // Interning the same string returns the same symbol
    /// assert_eq!(Symbol::intern("Package"), field);
    /// ```
    #[inline]
    pub fn intern(string: &str) -> Self {
        STRING_TABLE.intern(string)
    }

    /// Get the string value associated with this symbol
    ///
    /// # Performance
    ///
    /// O(n) where n is the number of interned strings, as we need to
    /// search the DashMap by index. This is a trade-off for better
    /// concurrent write performance.
    ///
    /// For hot paths, consider caching the string reference or using
    /// [`Symbol::eq_str()`] for comparisons.
    ///
    /// # Panics
    ///
    /// Returns empty string if the symbol is invalid (e.g., created manually
    /// with an out-of-bounds index).
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello");
    /// assert_eq!(sym.as_str(), "hello");
    /// ```
    #[inline]
    pub fn as_str(&self) -> &'static str {
        STRING_TABLE.get(*self).unwrap_or("")
    }

    /// Check if the symbol's string is empty
    ///
    /// # Performance
    ///
    /// O(1) - checks if index corresponds to the empty string symbol.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// assert!(Symbol::intern("").is_empty());
    /// assert!(!Symbol::intern("hello").is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Get the length of the symbol's string in bytes
    ///
    /// # Performance
    ///
    /// O(n) where n is the number of interned strings (requires lookup).
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// assert_eq!(Symbol::intern("hello").len(), 5);
    /// assert_eq!(Symbol::intern("").len(), 0);
    /// assert_eq!(Symbol::intern("你好").len(), 6);  // UTF-8 bytes
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    /// Check if the symbol's string starts with a given prefix
    ///
    /// # Arguments
    ///
    /// * `prefix` - The prefix to check for
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello_world");
    /// assert!(sym.starts_with("hello"));
    /// assert!(!sym.starts_with("world"));
    /// ```
    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.as_str().starts_with(prefix)
    }

    /// Check if the symbol's string ends with a given suffix
    ///
    /// # Arguments
    ///
    /// * `suffix` - The suffix to check for
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello_world");
    /// assert!(sym.ends_with("world"));
    /// assert!(!sym.ends_with("hello"));
    /// ```
    #[inline]
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.as_str().ends_with(suffix)
    }

    /// Compare the symbol's string with a `&str` without allocation
    ///
    /// This is more efficient than `symbol.as_str() == other` when you
    /// only need equality comparison, as it can short-circuit early.
    ///
    /// # Arguments
    ///
    /// * `other` - The string to compare against
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello");
    /// assert!(sym.eq_str("hello"));
    /// assert!(!sym.eq_str("world"));
    /// ```
    #[inline]
    pub fn eq_str(&self, other: &str) -> bool {
        self.as_str() == other
    }

    /// Returns true if this is a "known" symbol (predefined control-file
    /// field name or value)
    ///
    /// Known symbols are interned at startup and have indices in a reserved
    /// range (0 to `RESERVED_SYMBOLS_END`).
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::{Symbol, FIELD_PACKAGE};
    ///
    /// assert!(FIELD_PACKAGE.is_known());
    /// assert!(!Symbol::intern("X-My-Field").is_known());
    /// ```
    #[inline]
    pub fn is_known(&self) -> bool {
        self.index < RESERVED_SYMBOLS_END
    }

    /// Get the raw index value
    ///
    /// Useful for serialization or debugging.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("test");
    /// let index = sym.as_u32();
    /// ```
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.index
    }

    /// Create a symbol from a raw index
    ///
    /// # Safety
    ///
    /// The index must correspond to a valid entry in the string table.
    /// Creating a symbol with an invalid index leads to undefined behavior
    /// when calling `as_str()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("test");
    /// let index = sym.as_u32();
    /// let sym2 = unsafe { Symbol::from_u32_unchecked(index) };
    /// assert_eq!(sym, sym2);
    /// ```
    #[inline]
    pub unsafe fn from_u32_unchecked(index: u32) -> Self {
        Self { index }
    }

    /// Get statistics about the string interner for profiling
    ///
    /// Returns an `InternerStats` struct with detailed information about
    /// the interner's state, including count, capacity, collisions, hits,
    /// and misses.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// let stats = Symbol::stats_struct();
    /// println!("Interned {} strings", stats.count);
    /// println!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);
    /// ```
    #[inline]
    pub fn stats_struct() -> InternerStats {
        STRING_TABLE.stats()
    }

    /// Get basic statistics about the string interner (legacy API)
    ///
    /// Returns a tuple of (number of interned strings, hash map capacity).
    /// For more detailed statistics, use [`Symbol::stats_struct`].
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// let (count, capacity) = Symbol::stats();
    /// println!("Interned {} strings with capacity {}", count, capacity);
    /// ```
    #[inline]
    pub fn stats() -> (usize, usize) {
        let stats = STRING_TABLE.stats();
        (stats.count, stats.capacity)
    }

    /// Intern a known control-file field name or value, returning its
    /// predefined symbol
    ///
    /// This is a convenience method for interning the field names and values
    /// that appear in nearly every stanza. For known ones, this returns the
    /// predefined constant symbol without hashing or allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::{Symbol, FIELD_PACKAGE};
    ///
    /// let sym = Symbol::intern_known("Package");
    /// assert_eq!(sym, FIELD_PACKAGE);
    ///
    /// // Unknown fields are interned normally
    /// let unknown = Symbol::intern_known("X-My-Field");
    /// assert!(!unknown.is_known());
    /// ```
    #[inline]
    pub fn intern_known(string: &str) -> Self {
        match string {
            // Core identification fields
            "Package" => FIELD_PACKAGE,
            "Source" => FIELD_SOURCE,
            "Version" => FIELD_VERSION,
            "Architecture" => FIELD_ARCHITECTURE,
            "Maintainer" => FIELD_MAINTAINER,
            "Description" => FIELD_DESCRIPTION,
            "Homepage" => FIELD_HOMEPAGE,
            "Depends" => FIELD_DEPENDS,
            "Recommends" => FIELD_RECOMMENDS,
            "Suggests" => FIELD_SUGGESTS,
            "Conflicts" => FIELD_CONFLICTS,
            "Breaks" => FIELD_BREAKS,
            "Provides" => FIELD_PROVIDES,
            // Relationship and classification fields
            "Replaces" => FIELD_REPLACES,
            "Enhances" => FIELD_ENHANCES,
            "Pre-Depends" => FIELD_PRE_DEPENDS,
            "Essential" => FIELD_ESSENTIAL,
            "Multi-Arch" => FIELD_MULTI_ARCH,
            "Section" => FIELD_SECTION,
            "Priority" => FIELD_PRIORITY,
            // Source-package and build fields
            "Build-Depends" => FIELD_BUILD_DEPENDS,
            "Build-Conflicts" => FIELD_BUILD_CONFLICTS,
            "Standards-Version" => FIELD_STANDARDS_VERSION,
            "Vcs-Git" => FIELD_VCS_GIT,
            "Vcs-Browser" => FIELD_VCS_BROWSER,
            "Uploaders" => FIELD_UPLOADERS,
            // Boolean-ish values
            "yes" => VAL_YES,
            "no" => VAL_NO,
            // Package status words
            "installed" => STATUS_INSTALLED,
            "removed" => STATUS_REMOVED,
            // Architecture names
            "amd64" => ARCH_AMD64,
            "arm64" => ARCH_ARM64,
            "armhf" => ARCH_ARMHF,
            "i386" => ARCH_I386,
            "mips64el" => ARCH_MIPS64EL,
            "ppc64el" => ARCH_PPC64EL,
            "riscv64" => ARCH_RISCV64,
            "s390x" => ARCH_S390X,
            "all" => ARCH_ALL,
            "any" => ARCH_ANY,
            // Archive section components
            "main" => SECTION_MAIN,
            "contrib" => SECTION_CONTRIB,
            "non-free" => SECTION_NON_FREE,
            // Priority values
            "optional" => PRIORITY_OPTIONAL,
            "extra" => PRIORITY_EXTRA,
            "standard" => PRIORITY_STANDARD,
            "required" => PRIORITY_REQUIRED,
            // Multi-Arch values
            "same" => MULTI_ARCH_SAME,
            "foreign" => MULTI_ARCH_FOREIGN,
            // dpkg status-database words
            "unpacked" => STATUS_UNPACKED,
            "half-configured" => STATUS_HALF_CONFIGURED,
            "half-installed" => STATUS_HALF_INSTALLED,
            "config-files" => STATUS_CONFIG_FILES,
            "not-installed" => STATUS_NOT_INSTALLED,
            "triggers-awaited" => STATUS_TRIGGERS_AWAITED,
            "triggers-pending" => STATUS_TRIGGERS_PENDING,
            "hold" => STATUS_HOLD,
            "ok" => STATUS_OK,
            "reinst-required" => STATUS_REINST_REQUIRED,
            "install" => WANT_INSTALL,
            "deinstall" => WANT_DEINSTALL,
            "purge" => WANT_PURGE,
            "unknown" => WANT_UNKNOWN,
            "want" => FLAG_WANT,
            "current" => FLAG_CURRENT,
            "auto" => FLAG_AUTO,
            "manual" => FLAG_MANUAL,
            "native" => FLAG_NATIVE,
            "virtual" => FLAG_VIRTUAL,
            "noarch" => ARCH_NOARCH,
            // Extended metadata fields
            "Origin" => FIELD_ORIGIN,
            "Label" => FIELD_LABEL,
            "Codename" => FIELD_CODENAME,
            "Suite" => FIELD_SUITE,
            "Component" => FIELD_COMPONENT,
            "Bugs" => FIELD_BUGS,
            "Tag" => FIELD_TAG,
            "Task" => FIELD_TASK,
            "Kernel-Version" => FIELD_KERNEL_VERSION,
            "Installed-Size" => FIELD_INSTALLED_SIZE,
            "Installer-Menu-Item" => FIELD_INSTALLER_MENU_ITEM,
            "Original-Maintainer" => FIELD_ORIGINAL_MAINTAINER,
            "Python-Version" => FIELD_PYTHON_VERSION,
            "Ruby-Versions" => FIELD_RUBY_VERSIONS,
            "Go-Import-Path" => FIELD_GO_IMPORT_PATH,
            "Rust-Version" => FIELD_RUST_VERSION,
            "Static-Built-Using" => FIELD_STATIC_BUILT_USING,
            "Built-Using" => FIELD_BUILT_USING,
            "Checksums-Sha1" => FIELD_CHECKSUMS_SHA1,
            "Checksums-Sha256" => FIELD_CHECKSUMS_SHA256,
            "Checksums-Md5" => FIELD_CHECKSUMS_MD5,
            "Files" => FIELD_FILES,
            "Package-List" => FIELD_PACKAGE_LIST,
            "Package-Type" => FIELD_PACKAGE_TYPE,
            "Config-Version" => FIELD_CONFIG_VERSION,
            "Auto-Built-Package" => FIELD_AUTO_BUILT_PACKAGE,
            "Build-Ids" => FIELD_BUILD_IDS,
            "Testsuite" => FIELD_TESTSUITE,
            "Testsuite-Triggers" => FIELD_TESTSUITE_TRIGGERS,
            "Dgit" => FIELD_DGIT,
            "Comment" => FIELD_COMMENT,
            "Description-md5" => FIELD_DESCRIPTION_MD5,
            "Ghc-Package" => FIELD_GHC_PACKAGE,
            _ => Self::intern(string),
        }
    }

    /// Get the symbol for a well-known architecture, section, or priority
    /// value
    ///
    /// Returns the predefined symbol for these closed-vocabulary field
    /// values, or interns the string for anything else (e.g. a foreign
    /// architecture name this build doesn't recognize).
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::{Symbol, ARCH_AMD64, SECTION_MAIN};
    ///
    /// assert_eq!(Symbol::intern_value("amd64"), ARCH_AMD64);
    /// assert_eq!(Symbol::intern_value("main"), SECTION_MAIN);
    /// ```
    #[inline]
    pub fn intern_value(string: &str) -> Self {
        match string {
            "amd64" => ARCH_AMD64,
            "arm64" => ARCH_ARM64,
            "armhf" => ARCH_ARMHF,
            "i386" => ARCH_I386,
            "mips64el" => ARCH_MIPS64EL,
            "ppc64el" => ARCH_PPC64EL,
            "riscv64" => ARCH_RISCV64,
            "s390x" => ARCH_S390X,
            "all" => ARCH_ALL,
            "any" => ARCH_ANY,
            "main" => SECTION_MAIN,
            "contrib" => SECTION_CONTRIB,
            "non-free" => SECTION_NON_FREE,
            "optional" => PRIORITY_OPTIONAL,
            "extra" => PRIORITY_EXTRA,
            "standard" => PRIORITY_STANDARD,
            "required" => PRIORITY_REQUIRED,
            _ => Self::intern(string),
        }
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

impl std::fmt::Debug for Symbol {
    /// Format the symbol for debugging, showing the actual string content
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello");
    /// assert_eq!(format!("{:?}", sym), "Symbol(hello)");
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.as_str())
    }
}

impl std::fmt::Display for Symbol {
    /// Format the symbol for display, showing just the string content
    ///
    /// # Examples
    ///
    /// ```
    /// use cellar_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello");
    /// assert_eq!(format!("{}", sym), "hello");
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pretty-print a symbol with quotes for debugging
///
/// This trait provides optional pretty-printing with quotes to distinguish
/// symbols from regular strings in debug output.
///
/// # Examples
///
/// ```
/// use cellar_util::symbol::{Symbol, SymbolPretty};
///
/// let sym = Symbol::intern("hello");
/// assert_eq!(format!("{}", sym.pretty()), "\"hello\"");
/// ```
pub trait SymbolPretty {
    /// Get a pretty-printed version with quotes
    fn pretty(&self) -> SymbolPrettyDisplay<'_>;
}

impl SymbolPretty for Symbol {
    fn pretty(&self) -> SymbolPrettyDisplay<'_> {
        SymbolPrettyDisplay(self)
    }
}

/// Display wrapper for pretty-printing symbols with quotes
pub struct SymbolPrettyDisplay<'a>(&'a Symbol);

impl std::fmt::Display for SymbolPrettyDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.0.as_str())
    }
}

impl std::fmt::Debug for SymbolPrettyDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymbolPretty(\"{}\")", self.0.as_str())
    }
}

// Ensure Symbol is thread-safe
static_assertions::assert_impl_all!(Symbol: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    // ========================================================================
    // Basic Interning Tests
    // ========================================================================

    #[test]
    fn test_symbol_intern() {
        let s1 = Symbol::intern("hello");
        let s2 = Symbol::intern("hello");
        let s3 = Symbol::intern("world");

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
        assert_eq!(s1.as_str(), "hello");
        assert_eq!(s3.as_str(), "world");
    }

    #[test]
    fn test_symbol_display() {
        let s = Symbol::intern("test");
        assert_eq!(format!("{}", s), "test");
        assert_eq!(format!("{:?}", s), "Symbol(test)");
    }

    #[test]
    fn test_symbol_pretty() {
        let s = Symbol::intern("test");
        assert_eq!(format!("{}", s.pretty()), "\"test\"");
        assert_eq!(format!("{:?}", s.pretty()), "SymbolPretty(\"test\")");
    }

    // ========================================================================
    // Symbol Utility Methods
    // ========================================================================

    #[test]
    fn test_symbol_is_empty() {
        assert!(Symbol::intern("").is_empty());
        assert!(!Symbol::intern("a").is_empty());
        assert!(!Symbol::intern("hello").is_empty());
    }

    #[test]
    fn test_symbol_len() {
        assert_eq!(Symbol::intern("").len(), 0);
        assert_eq!(Symbol::intern("a").len(), 1);
        assert_eq!(Symbol::intern("hello").len(), 5);
        assert_eq!(Symbol::intern("你好").len(), 6); // UTF-8 bytes
    }

    #[test]
    fn test_symbol_starts_with() {
        let sym = Symbol::intern("hello_world");
        assert!(sym.starts_with("hello"));
        assert!(sym.starts_with("hello_world"));
        assert!(!sym.starts_with("world"));
        assert!(!sym.starts_with(""));
    }

    #[test]
    fn test_symbol_ends_with() {
        let sym = Symbol::intern("hello_world");
        assert!(sym.ends_with("world"));
        assert!(sym.ends_with("hello_world"));
        assert!(!sym.ends_with("hello"));
        assert!(sym.ends_with(""));
    }

    #[test]
    fn test_symbol_eq_str() {
        let sym = Symbol::intern("hello");
        assert!(sym.eq_str("hello"));
        assert!(!sym.eq_str("world"));
        assert!(!sym.eq_str(""));
    }

    #[test]
    fn test_symbol_to_string() {
        let sym = Symbol::intern("hello");
        let string = sym.to_string();
        assert_eq!(string, "hello");
        assert_eq!(string.len(), 5);
    }

    // ========================================================================
    // Known Symbols Tests
    // ========================================================================

    #[test]
    fn test_symbol_is_known() {
        assert!(FIELD_PACKAGE.is_known());
        assert!(FIELD_VERSION.is_known());
        assert!(ARCH_AMD64.is_known());
        assert!(STATUS_UNPACKED.is_known());
        assert!(!Symbol::intern("X-My-Field").is_known());
    }

    #[test]
    fn test_known_symbols_values() {
        // Core identification fields
        assert_eq!(FIELD_PACKAGE.as_str(), "Package");
        assert_eq!(FIELD_VERSION.as_str(), "Version");
        assert_eq!(FIELD_ARCHITECTURE.as_str(), "Architecture");
        assert_eq!(FIELD_DEPENDS.as_str(), "Depends");

        // Relationship fields
        assert_eq!(FIELD_PRE_DEPENDS.as_str(), "Pre-Depends");
        assert_eq!(FIELD_SECTION.as_str(), "Section");
        assert_eq!(FIELD_PRIORITY.as_str(), "Priority");

        // Architecture names
        assert_eq!(ARCH_AMD64.as_str(), "amd64");
        assert_eq!(ARCH_ARM64.as_str(), "arm64");
        assert_eq!(ARCH_ALL.as_str(), "all");
        assert_eq!(ARCH_ANY.as_str(), "any");

        // dpkg status-database words
        assert_eq!(STATUS_UNPACKED.as_str(), "unpacked");
        assert_eq!(STATUS_HALF_CONFIGURED.as_str(), "half-configured");
        assert_eq!(STATUS_OK.as_str(), "ok");
    }

    #[test]
    fn test_intern_known() {
        assert_eq!(Symbol::intern_known("Package"), FIELD_PACKAGE);
        assert_eq!(Symbol::intern_known("amd64"), ARCH_AMD64);
        assert_eq!(Symbol::intern_known("unpacked"), STATUS_UNPACKED);

        let unknown = Symbol::intern_known("X-My-Field");
        assert_eq!(unknown.as_str(), "X-My-Field");
        assert!(!unknown.is_known());
    }

    #[test]
    fn test_intern_value() {
        assert_eq!(Symbol::intern_value("amd64"), ARCH_AMD64);
        assert_eq!(Symbol::intern_value("main"), SECTION_MAIN);
        assert_eq!(Symbol::intern_value("required"), PRIORITY_REQUIRED);

        let custom = Symbol::intern_value("loong64");
        assert_eq!(custom.as_str(), "loong64");
        assert!(!custom.is_known());
    }

    // ========================================================================
    // Raw Index Tests
    // ========================================================================

    #[test]
    fn test_from_u32_unchecked() {
        let sym = Symbol::intern("test");
        let index = sym.as_u32();
        let sym2 = unsafe { Symbol::from_u32_unchecked(index) };
        assert_eq!(sym, sym2);
    }

    #[test]
    fn test_as_u32() {
        let sym = Symbol::intern("test");
        let index = sym.as_u32();
        assert!(index < Symbol::MAX_INDEX);
    }

    // ========================================================================
    // Statistics Tests
    // ========================================================================

    #[test]
    fn test_stats() {
        let (count, capacity) = Symbol::stats();
        assert!(count > 0); // Known symbols are pre-interned
        assert!(capacity >= count);
    }

    #[test]
    fn test_stats_struct() {
        let stats = Symbol::stats_struct();
        assert!(stats.count > 0);
        assert!(stats.capacity >= stats.count);
        assert!(stats.load_factor() >= 0.0);
        assert!(stats.load_factor() <= 1.0);
        assert!(stats.hit_rate() >= 0.0);
        assert!(stats.hit_rate() <= 1.0);
    }

    #[test]
    fn test_interner_stats_methods() {
        let stats = InternerStats::new(100, 200, 5, 80, 20);

        assert_eq!(stats.count, 100);
        assert_eq!(stats.capacity, 200);
        assert_eq!(stats.collisions, 5);
        assert_eq!(stats.hits, 80);
        assert_eq!(stats.misses, 20);

        assert_eq!(stats.load_factor(), 0.5);
        assert!(!stats.is_near_capacity());

        assert_eq!(stats.hit_rate(), 0.8);
        assert_eq!(stats.total_operations(), 100);
        assert_eq!(stats.memory_efficiency(), 1.0);

        let stats_full = InternerStats::new(100, 120, 0, 0, 0);
        assert!(stats_full.is_near_capacity());

        let stats_empty = InternerStats::new(0, 0, 0, 0, 0);
        assert_eq!(stats_empty.load_factor(), 0.0);
        assert_eq!(stats_empty.hit_rate(), 0.0);
    }

    // ========================================================================
    // Thread Safety Tests
    // ========================================================================

    #[test]
    fn test_concurrent_intern() {
        let handles: Vec<_> = (0..10)
            .map(|i| {
                thread::spawn(move || {
                    let s = Symbol::intern(&format!("thread_{}", i));
                    (i, s)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // All symbols should be unique
        let symbols: Vec<_> = results.iter().map(|(_, s)| *s).collect();
        for i in 0..symbols.len() {
            for j in (i + 1)..symbols.len() {
                assert_ne!(symbols[i], symbols[j]);
            }
        }
    }

    #[test]
    fn test_concurrent_same_string() {
        let handles: Vec<_> = (0..10)
            .map(|_| {
                thread::spawn(|| Symbol::intern("concurrent_same"))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // All should be the same symbol
        for symbol in &results[1..] {
            assert_eq!(results[0], *symbol);
        }
    }

    #[test]
    fn test_thread_safety_stress() {
        const THREADS: usize = 20;
        const ITERATIONS: usize = 50;

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                thread::spawn(move || {
                    let mut local_symbols = Vec::new();
                    for i in 0..ITERATIONS {
                        let s = Symbol::intern(&format!("stress_{}_{}", t, i));
                        local_symbols.push(s);
                    }
                    local_symbols
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Verify all symbols within each thread are unique
        for symbols in &results {
            for i in 0..symbols.len() {
                for j in (i + 1)..symbols.len() {
                    assert_ne!(symbols[i], symbols[j]);
                }
            }
        }
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Symbol>();
        assert_send_sync::<InternerStats>();
    }

    // ========================================================================
    // Edge Cases
    // ========================================================================

    #[test]
    fn test_empty_string() {
        let s = Symbol::intern("");
        assert_eq!(s.as_str(), "");
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn test_unicode_strings() {
        let test_cases = ["你好", "世界", "🦀", "こんにちは", "Привет"];

        for test in &test_cases {
            let sym = Symbol::intern(test);
            assert_eq!(sym.as_str(), *test);
        }
    }

    #[test]
    fn test_long_strings() {
        let long_string = "a".repeat(10000);
        let sym = Symbol::intern(&long_string);
        assert_eq!(sym.as_str(), long_string.as_str());
        assert_eq!(sym.len(), 10000);
    }

    #[test]
    fn test_special_characters() {
        let special = "hello\nworld\t!";
        let sym = Symbol::intern(special);
        assert_eq!(sym.as_str(), special);
    }

    // ========================================================================
    // Property-Based Tests (Manual Implementation)
    // ========================================================================

    #[test]
    fn test_idempotence() {
        // Property: intern(intern(x)) == intern(x)
        let test_strings = ["hello", "world", "test", "foo", "bar"];

        for s in &test_strings {
            let sym1 = Symbol::intern(s);
            let sym2 = Symbol::intern(s);
            let sym3 = Symbol::intern(&sym1.as_str());

            assert_eq!(sym1, sym2);
            assert_eq!(sym1, sym3);
        }
    }

    #[test]
    fn test_uniqueness() {
        // Property: different strings get different symbols
        let strings = ["abc", "def", "ghi", "jkl", "mno"];

        for i in 0..strings.len() {
            for j in (i + 1)..strings.len() {
                let sym_i = Symbol::intern(strings[i]);
                let sym_j = Symbol::intern(strings[j]);
                assert_ne!(sym_i, sym_j);
            }
        }
    }

    #[test]
    fn test_roundtrip() {
        // Property: intern(to_string(intern(x))) == intern(x)
        let test_strings = ["hello", "world", "test"];

        for s in &test_strings {
            let sym1 = Symbol::intern(s);
            let string = sym1.to_string();
            let sym2 = Symbol::intern(&string);
            assert_eq!(sym1, sym2);
        }
    }

    #[test]
    fn test_comparison_consistency() {
        // Property: symbol comparison is consistent with string comparison
        let pairs = [
            ("hello", "hello", true),
            ("hello", "world", false),
            ("", "", true),
            ("a", "a", true),
            ("a", "b", false),
        ];

        for (s1, s2, expected_eq) in &pairs {
            let sym1 = Symbol::intern(s1);
            let sym2 = Symbol::intern(s2);

            assert_eq!(sym1 == sym2, *expected_eq);
            assert_eq!(sym1.eq_str(s2), *expected_eq);
            assert_eq!(s1 == s2, *expected_eq);
        }
    }

    // ========================================================================
    // Performance Tests (Not Benchmarks, but Performance-Related)
    // ========================================================================

    #[test]
    fn test_hit_miss_tracking() {
        STRING_TABLE.reset_stats();

        // First intern should be a miss
        let _ = Symbol::intern("unique_perf_test");
        let stats = Symbol::stats_struct();
        assert!(stats.misses >= 1);

        // Second intern of same string should be a hit
        let _ = Symbol::intern("unique_perf_test");
        let stats = Symbol::stats_struct();
        assert!(stats.hits >= 1);

        // Verify hit rate calculation
        assert!(stats.hit_rate() > 0.0);
    }

    #[test]
    fn test_known_symbol_performance() {
        // Known symbols should have predictable indices
        assert!(FIELD_PACKAGE.index < RESERVED_SYMBOLS_END);
        assert!(ARCH_AMD64.index < RESERVED_SYMBOLS_END);
        assert!(STATUS_UNPACKED.index < RESERVED_SYMBOLS_END);

        // Known symbols should be fast to look up
        for _ in 0..1000 {
            let _ = Symbol::intern_known("Package");
            let _ = Symbol::intern_known("amd64");
        }
    }
}
