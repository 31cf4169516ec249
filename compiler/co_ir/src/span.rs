//! Source location spans.

use std::fmt;

/// A half-open byte-offset range into a single source file.
///
/// Mirrors the teacher's compact 8-byte span representation (`ori_ir::Span`)
/// but keeps `start`/`end` named `pos`/`endpos` to match spec.md §3.1's
/// `Node.pos` / `Node.endpos` naming.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub pos: u32,
    pub endpos: u32,
}

impl Span {
    pub const DUMMY: Span = Span { pos: 0, endpos: 0 };

    #[inline]
    #[must_use]
    pub const fn new(pos: u32, endpos: u32) -> Self {
        Span { pos, endpos }
    }

    #[inline]
    #[must_use]
    pub const fn len(self) -> u32 {
        self.endpos.saturating_sub(self.pos)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.pos == self.endpos
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.pos, self.endpos)
    }
}
