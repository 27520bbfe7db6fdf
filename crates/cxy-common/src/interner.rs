//! A string interner: stores at most one copy of each distinct byte
//! sequence and hands back a stable, cheap-to-compare handle.
//!
//! Storage is backed by the same [`bumpalo::Bump`] arena the AST is built
//! in: first insertion copies the bytes into arena-owned storage. Handle
//! equality is pointer identity, not content comparison --
//! two tokens whose source bytes are equal always intern to the exact same
//! handle, so `==` on handles is a pointer compare, never a byte compare.

use std::hash::{Hash, Hasher};

use bumpalo::Bump;
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};

/// A handle to a byte-exact, arena-owned string. Copy, cheap to pass by
/// value, and stable for the lifetime of the [`Interner`]'s arena.
#[derive(Debug, Clone, Copy)]
pub struct InternedStr<'bump> {
    data: &'bump str,
}

impl<'bump> InternedStr<'bump> {
    pub fn as_str(&self) -> &'bump str {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl PartialEq for InternedStr<'_> {
    /// Pointer identity: two handles for equal source bytes are always the
    /// *same* allocation once interned, so this never needs to fall back
    /// to a content compare.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.data.as_ptr(), other.data.as_ptr()) && self.data.len() == other.data.len()
    }
}

impl Eq for InternedStr<'_> {}

impl Hash for InternedStr<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.data.as_ptr() as usize).hash(state);
        self.data.len().hash(state);
    }
}

impl std::fmt::Display for InternedStr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.data)
    }
}

/// Serializes as its plain string content -- handle identity is a parse-time
/// concern only, not something diagnostics or golden fixtures care about.
impl Serialize for InternedStr<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.data)
    }
}

/// Hash-set keyed by string content, deduplicating into one arena-owned
/// copy per distinct byte sequence.
pub struct Interner<'bump> {
    bump: &'bump Bump,
    table: FxHashMap<&'bump str, InternedStr<'bump>>,
}

impl<'bump> Interner<'bump> {
    pub fn new(bump: &'bump Bump) -> Self {
        Self {
            bump,
            table: FxHashMap::default(),
        }
    }

    /// Intern `text`, copying it into arena storage on first sight.
    /// Later calls with byte-equal text return the same handle.
    pub fn intern(&mut self, text: &str) -> InternedStr<'bump> {
        if let Some(&existing) = self.table.get(text) {
            return existing;
        }
        let owned: &'bump str = self.bump.alloc_str(text);
        let handle = InternedStr { data: owned };
        self.table.insert(owned, handle);
        handle
    }

    /// Number of distinct strings interned so far.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_intern_returns_identical_handle() {
        let bump = Bump::new();
        let mut interner = Interner::new(&bump);
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        assert_eq!(a, b);
        assert!(std::ptr::eq(a.as_str().as_ptr(), b.as_str().as_ptr()));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn distinct_strings_get_distinct_handles() {
        let bump = Bump::new();
        let mut interner = Interner::new(&bump);
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn intern_preserves_bytes_exactly() {
        let bump = Bump::new();
        let mut interner = Interner::new(&bump);
        let h = interner.intern("caf\u{e9}");
        assert_eq!(h.as_str(), "caf\u{e9}");
    }
}
