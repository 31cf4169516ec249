//! Build configuration (spec.md §6's "build context").
//!
//! `BuildConfig` carries the two pieces of caller-supplied configuration
//! spec.md names explicitly: the target integer width used to bind
//! `int`/`uint` (§6 "Type aliasing"), and (added, per `SPEC_FULL.md` §2's
//! ambient-stack section) a `pretty_ir` flag mirroring the teacher's
//! `prettyIR`-style field on its own build-options struct
//! (`oric::commands::build::BuildOptions`) — whether the driver should keep
//! named (rather than numbered) IR values around for a human-readable
//! `.ll` dump. Neither of these is a CLI surface; CLI parsing itself is out
//! of scope per spec.md §1.

/// The platform integer width `int`/`uint` alias to.
///
/// This is a thin re-export-by-value of `co_llvm::IntWidth` so that
/// `co_driver` can be built (and its config constructed/tested) without the
/// `llvm` feature. When the `llvm` feature is enabled, [`BuildConfig::int_width`]
/// is handed straight to `co_llvm::CodegenCx::new`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum IntWidth {
    Bits32,
    Bits64,
}

impl IntWidth {
    /// The width a native `usize` on this host would bind to, mirroring how
    /// a real driver picks `sint_type` from the compilation target rather
    /// than always defaulting to 64-bit.
    #[must_use]
    pub const fn host() -> Self {
        #[cfg(target_pointer_width = "32")]
        {
            IntWidth::Bits32
        }
        #[cfg(not(target_pointer_width = "32"))]
        {
            IntWidth::Bits64
        }
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            IntWidth::Bits32 => 32,
            IntWidth::Bits64 => 64,
        }
    }
}

#[cfg(feature = "llvm")]
impl From<IntWidth> for co_llvm::IntWidth {
    fn from(w: IntWidth) -> Self {
        match w {
            IntWidth::Bits32 => co_llvm::IntWidth::Bits32,
            IntWidth::Bits64 => co_llvm::IntWidth::Bits64,
        }
    }
}

/// Caller-supplied build configuration (spec.md §6).
#[derive(Copy, Clone, Debug)]
pub struct BuildConfig {
    /// The width `int`/`uint` bind to in the module being built.
    pub int_width: IntWidth,
    /// Keep human-readable value/block names in the emitted IR. Off by
    /// default: LLVM numbers anonymous values either way, and named values
    /// cost a little extra bookkeeping that only matters for a `.ll` dump
    /// a human will read.
    pub pretty_ir: bool,
}

impl BuildConfig {
    #[must_use]
    pub const fn new(int_width: IntWidth) -> Self {
        BuildConfig { int_width, pretty_ir: false }
    }

    #[must_use]
    pub const fn with_pretty_ir(mut self, pretty_ir: bool) -> Self {
        self.pretty_ir = pretty_ir;
        self
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig::new(IntWidth::host())
    }
}
