//! String interning for identifiers, module path segments and type-variable tags.
//!
//! A [`Symbol`] is a 4-byte handle into a global, thread-safe string table.
//! Interning turns identifier comparison (which happens constantly during name
//! resolution and unification) into a cheap integer comparison instead of a
//! byte-by-byte string comparison.
//!
//! # Examples
//!
//! ```
//! use quill_util::Symbol;
//!
//! let a = Symbol::intern("base");
//! let b = Symbol::intern("base");
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "base");
//! ```

use ahash::AHasher;
use dashmap::DashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

struct StringTable {
    map: DashMap<u64, (&'static str, u32)>,
    strings: DashMap<u32, &'static str>,
    next: AtomicU32,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::new(),
            strings: DashMap::new(),
            next: AtomicU32::new(0),
        }
    }

    fn hash_of(s: &str) -> u64 {
        let mut hasher = AHasher::default();
        s.hash(&mut hasher);
        hasher.finish()
    }

    fn intern(&self, s: &str) -> u32 {
        let hash = Self::hash_of(s);
        if let Some(entry) = self.map.get(&hash) {
            let (stored, idx) = *entry;
            if stored == s {
                return idx;
            }
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = self.next.fetch_add(1, Ordering::Relaxed);
        self.map.insert(hash, (leaked, idx));
        self.strings.insert(idx, leaked);
        idx
    }

    fn resolve(&self, idx: u32) -> &'static str {
        *self
            .strings
            .get(&idx)
            .expect("Symbol index must have been produced by intern()")
    }
}

/// An interned identifier.
///
/// Two symbols compare equal iff the strings they were interned from are
/// equal, in O(1) time. Retrieving the underlying text is O(1) as well (a
/// single lock-free map lookup), unlike a naive linear-scan interner.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Intern `s`, returning the same [`Symbol`] for equal strings.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_util::Symbol;
    ///
    /// assert_eq!(Symbol::intern("foo"), Symbol::intern("foo"));
    /// assert_ne!(Symbol::intern("foo"), Symbol::intern("bar"));
    /// ```
    pub fn intern(s: &str) -> Self {
        Symbol(STRING_TABLE.intern(s))
    }

    /// Recover the original string this symbol was interned from.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_util::Symbol;
    ///
    /// let sym = Symbol::intern("base");
    /// assert_eq!(sym.as_str(), "base");
    /// ```
    pub fn as_str(self) -> &'static str {
        STRING_TABLE.resolve(self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static_assertions::assert_impl_all!(Symbol: Send, Sync, Copy);

/// The base type names that short-circuit name resolution (spec §4.4): they
/// are never looked up in `name_set`, just passed through as-is.
pub const BASE_TYPE_NAMES: &[&str] = &[
    "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "f16", "f32", "f64", "char", "bool",
    "unit", "str",
];

/// Whether `s` names one of the base types the resolver short-circuits
/// (spec §4.4) rather than looking up in `name_set`.
///
/// # Examples
///
/// ```
/// use quill_util::is_base_type_name;
///
/// assert!(is_base_type_name("i32"));
/// assert!(!is_base_type_name("MyType"));
/// ```
pub fn is_base_type_name(s: &str) -> bool {
    BASE_TYPE_NAMES.contains(&s)
}
