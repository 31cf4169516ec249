//! Top-level build pipeline for the Co codegen core (spec.md §4.3).
//!
//! `co_driver` owns the IR module/context lifetimes and composes
//! parse → resolve → codegen → optimize → emit. Parsing and resolution are
//! out of scope for this repository (spec.md §1): the driver accepts an
//! already-typed `co_ir::Package` built by a caller (in this repo, the
//! `coc` binary's own tiny in-memory AST constructor, used only for the
//! smoke-test path described in `SPEC_FULL.md`). Optimization and emission
//! are collaborators this crate only calls through, never implements.
//!
//! Grounded in `examples/upstat-io-sigil-lang/compiler/oric`'s
//! `commands/compile_common.rs` (`check_source` → `compile_to_llvm`
//! staging) and `context.rs` (a small config struct threaded through the
//! pipeline), scaled down to what spec.md §6 asks the driver to own.

pub mod config;
pub mod sample;

pub use config::BuildConfig;

#[cfg(feature = "llvm")]
pub mod pipeline;

#[cfg(feature = "llvm")]
pub use pipeline::{build_and_verify, PipelineError};
