//! Identifier interning.
//!
//! `Sym` is an interned string: two identifiers with the same text are the
//! same `Sym`, so equality and hashing are pointer comparisons. This mirrors
//! `Sym` in `original_source/src/sym.h` (the C compiler this core is
//! distilled from interns every identifier into a global symbol pool for the
//! same reason: fast equality checks during codegen, e.g. `strcmp(name,
//! "main")` in the original is the one place it *doesn't* use interning, and
//! not coincidentally it is a known hot comparison in `build_funproto`).

use std::cell::RefCell;
use std::fmt;

use bumpalo::Bump;
use rustc_hash::FxHashMap;

/// An interned string. Cheap to copy and compare.
#[derive(Copy, Clone, Eq, Hash)]
pub struct Sym(*const str);

// SAFETY: a `Sym` only ever points into the `SymInterner`'s bump arena, which
// outlives every `Sym` handed out (the arena is never reset while a `Sym`
// derived from it is reachable). `Sym` itself holds no exclusive access to
// anything, so sharing the pointer across threads is as safe as sharing a
// `&'static str` would be once the interner is done mutating.
unsafe impl Send for Sym {}
unsafe impl Sync for Sym {}

impl Sym {
    #[must_use]
    pub fn as_str(&self) -> &str {
        // SAFETY: see the `unsafe impl Send`/`Sync` note above.
        unsafe { &*self.0 }
    }
}

impl PartialEq for Sym {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl fmt::Debug for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicates identifier text into `Sym`s backed by a bump arena.
///
/// One interner is shared by an entire build (package); nodes produced by
/// the (external) parser/resolver are expected to intern through the same
/// instance so that `Sym` equality is always pointer equality.
pub struct SymInterner<'a> {
    arena: &'a Bump,
    map: RefCell<FxHashMap<&'a str, Sym>>,
}

impl<'a> SymInterner<'a> {
    #[must_use]
    pub fn new(arena: &'a Bump) -> Self {
        SymInterner {
            arena,
            map: RefCell::new(FxHashMap::default()),
        }
    }

    /// Intern `text`, returning the canonical `Sym` for it.
    pub fn intern(&self, text: &str) -> Sym {
        if let Some(sym) = self.map.borrow().get(text) {
            return *sym;
        }
        let copy: &'a str = self.arena.alloc_str(text);
        let sym = Sym(copy as *const str);
        self.map.borrow_mut().insert(copy, sym);
        sym
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn interning_dedupes_equal_text() {
        let arena = Bump::new();
        let interner = SymInterner::new(&arena);
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "foo");
    }

    #[test]
    fn distinct_text_is_distinct() {
        let arena = Bump::new();
        let interner = SymInterner::new(&arena);
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert!(a != b);
    }
}
