//! A tiny in-memory AST constructor for the smoke-test path.
//!
//! Parsing and name/type resolution are out of scope for this repository
//! (spec.md §1): both produce the typed `co_ir::Package` this crate's
//! pipeline consumes. Since there is no real parser here, this module
//! builds a handful of already-resolved packages directly, matching the
//! "Concrete scenarios" spec.md §8 enumerates, for `co_driver`'s own tests
//! and the `coc` binary's smoke-test entry point. This is not a parser
//! stand-in for general use — it exists only to exercise the pipeline.

use bumpalo::Bump;

use co_ir::{BinOpKind, File, Node, NodeFlags, Package, Payload, Span, SymInterner, TypeCode};

/// Owns the arena and symbol interner backing one constructed sample
/// package, so callers don't have to juggle separate arena/interner
/// lifetimes themselves.
pub struct SampleArena {
    pub bump: Bump,
}

impl SampleArena {
    #[must_use]
    pub fn new() -> Self {
        SampleArena { bump: Bump::new() }
    }
}

impl Default for SampleArena {
    fn default() -> Self {
        SampleArena::new()
    }
}

type N<'a, V> = Node<'a, V>;

fn basic<'a, V: Copy>(arena: &'a Bump, code: TypeCode) -> &'a N<'a, V> {
    arena.alloc(Node::new(Span::DUMMY, NodeFlags::empty(), None, Payload::BasicType(code)))
}

/// Scenario 1 (spec.md §8): `fun id(x int) int { x }`.
///
/// A single package, single file, single function: a const parameter
/// returned directly from the body with no allocas and no explicit `ret`
/// statement (the implicit-return path in `functions::build_fun`).
#[must_use]
pub fn identity_package<'a, V: Copy>(arena: &'a Bump, interner: &SymInterner<'a>) -> Package<'a, V> {
    let int_ty = basic(arena, TypeCode::Int);

    let x_name = interner.intern("x");
    let param: &N<'a, V> = arena.alloc(Node::new(
        Span::new(8, 13),
        NodeFlags::CONST | NodeFlags::PARAM,
        Some(int_ty),
        Payload::Var { name: x_name, init: None },
    ));
    let params_tuple: &N<'a, V> =
        arena.alloc(Node::new(Span::DUMMY, NodeFlags::empty(), None, Payload::Tuple(arena.alloc_slice_copy(&[param]))));
    let param_ty_tuple: &N<'a, V> = arena.alloc(Node::new(
        Span::DUMMY,
        NodeFlags::empty(),
        None,
        Payload::TupleType(arena.alloc_slice_copy(&[&*int_ty])),
    ));
    let fun_ty: &N<'a, V> = arena.alloc(Node::new(
        Span::DUMMY,
        NodeFlags::empty(),
        None,
        Payload::FunType { params: Some(param_ty_tuple), result: Some(int_ty) },
    ));

    let body: &N<'a, V> = arena.alloc(Node::new(
        Span::new(20, 21),
        NodeFlags::empty(),
        Some(int_ty),
        Payload::Id { name: x_name, target: std::cell::Cell::new(Some(param)) },
    ));

    let id_name = interner.intern("id");
    let fun: &N<'a, V> = arena.alloc(Node::new(
        Span::new(0, 23),
        NodeFlags::CONST,
        Some(fun_ty),
        Payload::Fun { name: Some(id_name), params: Some(params_tuple), body: Some(body) },
    ));

    let decls = arena.alloc_slice_copy(&[fun]);
    let files = arena.alloc_slice_copy(&[File { name: "identity.co", decls }]);
    Package { files }
}

/// Scenario 3 (spec.md §8): `fun pick(c bool) i32 { if c 1 else 2 }`.
///
/// Exercises the rvalue-`if` phi path: both branches are used for their
/// value, so a phi selecting between them is required at `if.end`.
#[must_use]
pub fn pick_package<'a, V: Copy>(arena: &'a Bump, interner: &SymInterner<'a>) -> Package<'a, V> {
    let bool_ty = basic(arena, TypeCode::Bool);
    let i32_ty = basic(arena, TypeCode::I32);

    let c_name = interner.intern("c");
    let param: &N<'a, V> = arena.alloc(Node::new(
        Span::new(10, 16),
        NodeFlags::CONST | NodeFlags::PARAM,
        Some(bool_ty),
        Payload::Var { name: c_name, init: None },
    ));
    let params_tuple: &N<'a, V> =
        arena.alloc(Node::new(Span::DUMMY, NodeFlags::empty(), None, Payload::Tuple(arena.alloc_slice_copy(&[param]))));
    let param_ty_tuple: &N<'a, V> = arena.alloc(Node::new(
        Span::DUMMY,
        NodeFlags::empty(),
        None,
        Payload::TupleType(arena.alloc_slice_copy(&[&*bool_ty])),
    ));
    let fun_ty: &N<'a, V> = arena.alloc(Node::new(
        Span::DUMMY,
        NodeFlags::empty(),
        None,
        Payload::FunType { params: Some(param_ty_tuple), result: Some(i32_ty) },
    ));

    let cond: &N<'a, V> = arena.alloc(Node::new(
        Span::new(22, 23),
        NodeFlags::empty(),
        Some(bool_ty),
        Payload::Id { name: c_name, target: std::cell::Cell::new(Some(param)) },
    ));
    let thenb: &N<'a, V> = arena.alloc(Node::new(Span::new(24, 25), NodeFlags::empty(), Some(i32_ty), Payload::IntLit(1)));
    let elseb: &N<'a, V> = arena.alloc(Node::new(Span::new(31, 32), NodeFlags::empty(), Some(i32_ty), Payload::IntLit(2)));

    let body: &N<'a, V> = arena.alloc(Node::new(
        Span::new(19, 32),
        NodeFlags::RVALUE,
        Some(i32_ty),
        Payload::If { cond, thenb, elseb: Some(elseb) },
    ));

    let pick_name = interner.intern("pick");
    let fun: &N<'a, V> = arena.alloc(Node::new(
        Span::new(0, 34),
        NodeFlags::CONST,
        Some(fun_ty),
        Payload::Fun { name: Some(pick_name), params: Some(params_tuple), body: Some(body) },
    ));

    let decls = arena.alloc_slice_copy(&[fun]);
    let files = arena.alloc_slice_copy(&[File { name: "pick.co", decls }]);
    Package { files }
}

/// Scenario 2 (spec.md §8): `fun lt(a i32, b i32) bool { a < b }`.
#[must_use]
pub fn lt_package<'a, V: Copy>(arena: &'a Bump, interner: &SymInterner<'a>) -> Package<'a, V> {
    let i32_ty = basic(arena, TypeCode::I32);
    let bool_ty = basic(arena, TypeCode::Bool);

    let a_name = interner.intern("a");
    let b_name = interner.intern("b");
    let param_a: &N<'a, V> = arena.alloc(Node::new(
        Span::new(7, 12),
        NodeFlags::CONST | NodeFlags::PARAM,
        Some(i32_ty),
        Payload::Var { name: a_name, init: None },
    ));
    let param_b: &N<'a, V> = arena.alloc(Node::new(
        Span::new(14, 19),
        NodeFlags::CONST | NodeFlags::PARAM,
        Some(i32_ty),
        Payload::Var { name: b_name, init: None },
    ));
    let params_tuple: &N<'a, V> = arena.alloc(Node::new(
        Span::DUMMY,
        NodeFlags::empty(),
        None,
        Payload::Tuple(arena.alloc_slice_copy(&[param_a, param_b])),
    ));
    let param_ty_tuple: &N<'a, V> = arena.alloc(Node::new(
        Span::DUMMY,
        NodeFlags::empty(),
        None,
        Payload::TupleType(arena.alloc_slice_copy(&[&*i32_ty, &*i32_ty])),
    ));
    let fun_ty: &N<'a, V> = arena.alloc(Node::new(
        Span::DUMMY,
        NodeFlags::empty(),
        None,
        Payload::FunType { params: Some(param_ty_tuple), result: Some(bool_ty) },
    ));

    let a_id: &N<'a, V> = arena.alloc(Node::new(
        Span::new(26, 27),
        NodeFlags::empty(),
        Some(i32_ty),
        Payload::Id { name: a_name, target: std::cell::Cell::new(Some(param_a)) },
    ));
    let b_id: &N<'a, V> = arena.alloc(Node::new(
        Span::new(30, 31),
        NodeFlags::empty(),
        Some(i32_ty),
        Payload::Id { name: b_name, target: std::cell::Cell::new(Some(param_b)) },
    ));
    let body: &N<'a, V> = arena.alloc(Node::new(
        Span::new(26, 31),
        NodeFlags::empty(),
        Some(bool_ty),
        Payload::BinOp { op: BinOpKind::Lt, left: a_id, right: b_id },
    ));

    let lt_name = interner.intern("lt");
    let fun: &N<'a, V> = arena.alloc(Node::new(
        Span::new(0, 33),
        NodeFlags::CONST,
        Some(fun_ty),
        Payload::Fun { name: Some(lt_name), params: Some(params_tuple), body: Some(body) },
    ));

    let decls = arena.alloc_slice_copy(&[fun]);
    let files = arena.alloc_slice_copy(&[File { name: "lt.co", decls }]);
    Package { files }
}

/// Scenario 6 (spec.md §8): `fun ext(i32) i32` with no body — a bodyless
/// external declaration.
#[must_use]
pub fn extern_package<'a, V: Copy>(arena: &'a Bump, interner: &SymInterner<'a>) -> Package<'a, V> {
    let i32_ty = basic(arena, TypeCode::I32);
    let param_ty_tuple: &N<'a, V> = arena.alloc(Node::new(
        Span::DUMMY,
        NodeFlags::empty(),
        None,
        Payload::TupleType(arena.alloc_slice_copy(&[&*i32_ty])),
    ));
    let fun_ty: &N<'a, V> = arena.alloc(Node::new(
        Span::DUMMY,
        NodeFlags::empty(),
        None,
        Payload::FunType { params: Some(param_ty_tuple), result: Some(i32_ty) },
    ));
    let ext_name = interner.intern("ext");
    let fun: &N<'a, V> = arena.alloc(Node::new(
        Span::new(0, 16),
        NodeFlags::CONST,
        Some(fun_ty),
        Payload::Fun { name: Some(ext_name), params: None, body: None },
    ));

    let decls = arena.alloc_slice_copy(&[fun]);
    let files = arena.alloc_slice_copy(&[File { name: "extern.co", decls }]);
    Package { files }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identity_package_has_one_file_one_decl() {
        let arena = SampleArena::new();
        let interner = SymInterner::new(&arena.bump);
        let pkg: Package<'_, u32> = identity_package(&arena.bump, &interner);
        assert_eq!(pkg.files.len(), 1);
        assert_eq!(pkg.files[0].decls.len(), 1);
    }

    #[test]
    fn pick_package_body_is_an_rvalue_if() {
        let arena = SampleArena::new();
        let interner = SymInterner::new(&arena.bump);
        let pkg: Package<'_, u32> = pick_package(&arena.bump, &interner);
        let fun = pkg.files[0].decls[0];
        match &fun.payload {
            Payload::Fun { body: Some(body), .. } => {
                assert!(body.flags().contains(NodeFlags::RVALUE));
                assert_eq!(body.kind(), co_ir::NodeKind::If);
            }
            _ => panic!("expected a Fun with a body"),
        }
    }

    #[test]
    fn extern_package_fun_has_no_body() {
        let arena = SampleArena::new();
        let interner = SymInterner::new(&arena.bump);
        let pkg: Package<'_, u32> = extern_package(&arena.bump, &interner);
        let fun = pkg.files[0].decls[0];
        match &fun.payload {
            Payload::Fun { body, .. } => assert!(body.is_none()),
            _ => panic!("expected a Fun"),
        }
    }
}
