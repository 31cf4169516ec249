//! Type interner and IR builder for the Co codegen core.
//!
//! This crate is the stateful translator that walks a typed `co_ir::Node`
//! tree and emits LLVM IR via `inkwell`. It never parses, resolves,
//! optimizes, or emits object files; those are collaborators outside this
//! core.
//!
//! # Architecture
//!
//! - **Context** (`context.rs`): `SimpleCx` (bare LLVM context/module/type
//!   constructors) wrapped by `CodegenCx` (type interner + diagnostics).
//! - **Declare** (`declare.rs`): two-phase codegen, predefine a function's
//!   prototype before building any body so recursive and forward-referencing
//!   calls resolve.
//! - **Builder** (`builder.rs`): per-function instruction builder; dispatches
//!   expression nodes to IR.
//! - **Operators** (`operators.rs`): binary operator lowering tables.
//! - **Control flow** (`control_flow.rs`): if/else phi lowering.
//! - **Functions** (`functions.rs`): whole-function codegen, entry to ret.
//! - **Module** (`module.rs`): whole-package codegen and verification.
//!
//! # Debugging
//!
//! Enable tracing with `RUST_LOG=co_llvm=debug` or `RUST_LOG=co_llvm=trace`.

pub mod builder;
pub mod context;
pub mod control_flow;
pub mod declare;
pub mod error;
pub mod functions;
pub mod module;
pub mod operators;

pub use builder::Builder;
pub use context::{CodegenCx, IntWidth, IrType, IrValue, SimpleCx, TypeCache};
pub use error::BuildError;
pub use module::build_module;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output. Call once at startup; safe to call
/// more than once. Enable with `RUST_LOG=co_llvm=debug` or
/// `RUST_LOG=co_llvm=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
