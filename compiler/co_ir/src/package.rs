//! Top-level containers the driver walks — spec.md §4.2.17 / §6.
//!
//! A `Package` is an ordered list of `File`s; each `File` is an ordered list
//! of top-level declarations (`Var`s and `Fun`s). These are plain slices
//! rather than `Node` payloads: `Pkg`/`File` are parse-time container kinds
//! in `original_source/src/co/parse/ast.h` (`NodeClassArray`), but nothing in
//! the codegen core needs to address a file or package *by* a `Node` — the
//! driver just needs something to iterate.

use crate::node::Node;

/// One source file's top-level declarations, in source order.
pub struct File<'a, V: Copy> {
    pub name: &'a str,
    pub decls: &'a [&'a Node<'a, V>],
}

/// An ordered list of files forming a compilation unit.
pub struct Package<'a, V: Copy> {
    pub files: &'a [File<'a, V>],
}
