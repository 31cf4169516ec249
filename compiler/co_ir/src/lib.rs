//! Typed AST, type interning keys, and scope model for the Co compiler.
//!
//! This crate is read-only input to codegen (`co_llvm`): it defines the
//! [`Node`] tree produced by parsing + resolution, the [`typeid`] function
//! used to key type interning, and the [`Scope`] model those phases use.
//! Nothing here depends on an IR backend — `Node` is generic over the
//! memoized-value type so that codegen crates can plug in their own IR
//! handle without this crate knowing about LLVM, inkwell, or anything else.
//!
//! Grounded in `examples/upstat-io-sigil-lang/compiler/ori_ir` for Rust
//! idiom (interned `Sym`, arena-backed storage, `Span`) and in
//! `original_source/src/co/parse/ast.h` + `src/parse/typeid.h` for the
//! actual data model (see `DESIGN.md`).

pub mod interner;
pub mod node;
pub mod package;
pub mod scope;
pub mod span;
pub mod typeid;

pub use interner::{Sym, SymInterner};
pub use node::{BinOpKind, Node, NodeClass, NodeFlags, NodeKind, Payload, StructField, TypeCode};
pub use package::{File, Package};
pub use scope::Scope;
pub use span::Span;
pub use typeid::typeid;
