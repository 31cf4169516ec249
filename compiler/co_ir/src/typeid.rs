//! Typeid computation — spec.md §3.3 / §4.1's "Typeid Computer".
//!
//! A typeid is a canonical byte-string identifying a type up to structural
//! equality: two type nodes with the same shape produce the same typeid,
//! regardless of where in the AST they occur. `original_source`'s
//! `typeid.h`/`ast.c` builds this incrementally into a caller-provided
//! buffer (`_typeid_make`); we build an owned `String` instead, which is the
//! idiomatic shape once there's no manual buffer-size bookkeeping to do.
//!
//! The exact mnemonic alphabet below is this crate's own invention (the
//! original leaves the format unspecified beyond "unique per structural
//! type"); it is stable, which is the only property spec.md requires.

use std::fmt::Write as _;

use crate::node::{Node, NodeKind, Payload, TypeCode};

fn basic_mnemonic(code: TypeCode) -> &'static str {
    match code {
        TypeCode::Bool => "b",
        TypeCode::I8 => "i8",
        TypeCode::U8 => "u8",
        TypeCode::I16 => "i16",
        TypeCode::U16 => "u16",
        TypeCode::I32 => "i32",
        TypeCode::U32 => "u32",
        TypeCode::I64 => "i64",
        TypeCode::U64 => "u64",
        TypeCode::F32 => "f32",
        TypeCode::F64 => "f64",
        TypeCode::Int => "int",
        TypeCode::Uint => "uint",
        TypeCode::Nil => "nil",
        TypeCode::Ideal => "ideal",
    }
}

/// Compute the typeid of a type node. Panics (internal error, per spec.md
/// §7) if `n` is not a type-class node.
#[must_use]
pub fn typeid<V: Copy>(n: &Node<'_, V>) -> String {
    let mut out = String::new();
    write_typeid(n, &mut out);
    out
}

fn write_typeid<V: Copy>(n: &Node<'_, V>, out: &mut String) {
    assert!(
        n.kind().is_type(),
        "internal error: typeid() called on non-type node {:?}",
        n.kind()
    );
    match &n.payload {
        Payload::BasicType(code) => out.push_str(basic_mnemonic(*code)),
        Payload::TupleType(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_typeid(item, out);
            }
            out.push(')');
        }
        Payload::StructType { name, fields } => {
            // The struct's name participates in its typeid: two distinct
            // struct declarations with identical field lists are still
            // distinct IR types (they are nominal, not structural, in Co).
            let _ = write!(out, "struct {name}{{");
            for (i, f) in fields.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}:", f.name);
                write_typeid(f.ty, out);
            }
            out.push('}');
        }
        Payload::FunType { params, result } => {
            out.push('(');
            if let Some(params) = params {
                write_typeid(params, out);
            }
            out.push_str(")->");
            match result {
                Some(result) => write_typeid(result, out),
                None => out.push_str("nil"),
            }
        }
        _ => unreachable!("internal error: non-type payload under a type NodeKind"),
    }
}

/// True if `n`'s kind can recursively contain itself through a `FunType`
/// (directly, or via a struct field / tuple element). `co_llvm`'s type
/// interner uses this to decide whether it must pre-register before
/// recursing (spec.md §3.3's "must be installed before recursively
/// materializing its components").
#[must_use]
pub fn is_potentially_recursive(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::FunType | NodeKind::StructType)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeFlags, StructField};
    use crate::span::Span;
    use pretty_assertions::assert_eq;

    type N<'a> = Node<'a, u32>;

    fn basic(code: TypeCode) -> N<'static> {
        Node::new(Span::DUMMY, NodeFlags::empty(), None, Payload::BasicType(code))
    }

    #[test]
    fn equal_structure_equal_typeid() {
        let a = basic(TypeCode::I32);
        let b = basic(TypeCode::I32);
        assert_eq!(typeid(&a), typeid(&b));
    }

    #[test]
    fn distinct_structure_distinct_typeid() {
        let a = basic(TypeCode::I32);
        let b = basic(TypeCode::I64);
        assert!(typeid(&a) != typeid(&b));
    }

    #[test]
    fn tuple_typeid_is_ordered() {
        let i32a = basic(TypeCode::I32);
        let boola = basic(TypeCode::Bool);
        let t1 = Node::new(
            Span::DUMMY,
            NodeFlags::empty(),
            None,
            Payload::TupleType(&[&i32a, &boola]),
        );
        let t2 = Node::new(
            Span::DUMMY,
            NodeFlags::empty(),
            None,
            Payload::TupleType(&[&boola, &i32a]),
        );
        assert!(typeid(&t1) != typeid(&t2));
    }

    #[test]
    fn struct_typeid_includes_name_and_fields() {
        let arena = bumpalo::Bump::new();
        let interner = crate::interner::SymInterner::new(&arena);
        let i32a = basic(TypeCode::I32);
        let f64a = basic(TypeCode::F64);
        let fields_x = [StructField {
            name: interner.intern("x"),
            ty: &i32a,
        }];
        let fields_y = [StructField {
            name: interner.intern("y"),
            ty: &i32a,
        }];
        let point = Node::new(
            Span::DUMMY,
            NodeFlags::empty(),
            None,
            Payload::StructType {
                name: interner.intern("Point"),
                fields: &fields_x,
            },
        );
        let renamed_field = Node::new(
            Span::DUMMY,
            NodeFlags::empty(),
            None,
            Payload::StructType {
                name: interner.intern("Point"),
                fields: &fields_y,
            },
        );
        let different_field_type = Node::new(
            Span::DUMMY,
            NodeFlags::empty(),
            None,
            Payload::StructType {
                name: interner.intern("Point"),
                fields: &[StructField {
                    name: interner.intern("x"),
                    ty: &f64a,
                }],
            },
        );
        assert!(typeid(&point) != typeid(&renamed_field));
        assert!(typeid(&point) != typeid(&different_field_type));
    }
}
