//! `If` lowering (spec.md §4.2.15).
//!
//! An `else` block is only created when one is needed to produce a value: an
//! explicit else-branch, or the whole `If` being used as an rvalue (in which
//! case a missing else-branch falls back to `cx.default_value`). The phi's
//! incoming blocks are the blocks *actually current* after building each
//! branch, not the blocks created before building them — nested control flow
//! inside a branch can move the insertion point forward.

use inkwell::values::BasicValueEnum;

use crate::builder::Builder;
use crate::context::{CoNode, IrValue};
use crate::error::internal_error;
use co_ir::NodeFlags;

pub fn build_if<'ll, 'cx, 'a>(
    bx: &Builder<'a, 'll, 'cx>,
    n: &CoNode<'_, 'll>,
    cond: &CoNode<'_, 'll>,
    thenb: &CoNode<'_, 'll>,
    elseb: Option<&CoNode<'_, 'll>>,
) -> Option<IrValue<'ll>> {
    let is_rvalue = n.flags().contains(NodeFlags::RVALUE);
    let cond_val = bx.build_expr_mustload(cond, "cond")?.as_value()?.into_int_value();

    let then_bb = bx.append_block("if.then");
    let needs_else_block = elseb.is_some() || is_rvalue;
    let else_bb = needs_else_block.then(|| bx.append_block("if.else"));
    let end_bb = bx.append_block("if.end");

    bx.cond_br(cond_val, then_bb, else_bb.unwrap_or(end_bb));

    bx.position_at_end(then_bb);
    let then_val = bx.build_expr_mustload(thenb, "thenval");
    let then_incoming = bx.current_block().unwrap_or_else(|| internal_error!(n.span, "then branch has no block"));
    if then_incoming.get_terminator().is_none() {
        bx.br(end_bb);
    }

    let else_result = else_bb.map(|bb| {
        bx.position_at_end(bb);
        let v = match elseb {
            Some(e) => bx.build_expr_mustload(e, "elseval"),
            None => {
                let ty_node = thenb.ty().unwrap_or_else(|| internal_error!(thenb.span, "then branch has no type"));
                Some(IrValue::Value(bx.cx().default_value(ty_node)))
            }
        };
        let incoming = bx.current_block().unwrap_or_else(|| internal_error!(n.span, "else branch has no block"));
        if incoming.get_terminator().is_none() {
            bx.br(end_bb);
        }
        (v, incoming)
    });

    bx.position_at_end(end_bb);

    if !is_rvalue {
        return None;
    }

    let then_value = then_val?.as_value()?;
    let (else_val, else_incoming) = else_result.unwrap_or_else(|| internal_error!(n.span, "rvalue if has no else block"));
    let else_value = else_val?.as_value()?;

    let phi = bx.phi(then_value.get_type(), "ifval");
    let incoming: [(&dyn inkwell::values::BasicValue<'ll>, inkwell::basic_block::BasicBlock<'ll>); 2] =
        [(&then_value, then_incoming), (&else_value, else_incoming)];
    phi.add_incoming(&incoming);

    let result: BasicValueEnum<'ll> = phi.as_basic_value();
    Some(result.into())
}

#[cfg(test)]
mod tests {
    use inkwell::context::Context;
    use pretty_assertions::assert_eq;

    use co_diagnostic::Diagnostics;
    use co_ir::{Node, Payload, Span, TypeCode};

    use super::*;
    use crate::context::{CodegenCx, IntWidth};

    type N<'a> = Node<'a, IrValue<'a>>;

    fn basic(code: TypeCode) -> N<'static> {
        Node::new(Span::DUMMY, NodeFlags::empty(), None, Payload::BasicType(code))
    }

    fn make_builder<'ll, 'a>(cx: &'a CodegenCx<'ll, 'a>) -> Builder<'a, 'll, 'a> {
        let fn_type = cx.scx.type_i32().fn_type(&[], false);
        let function = cx.llmod().add_function("f", fn_type, None);
        let entry = cx.llcx().append_basic_block(function, "entry");
        Builder::new(cx, function, entry)
    }

    #[test]
    fn rvalue_if_without_else_uses_default_value_and_phis() {
        let context = Context::create();
        let diagnostics = Diagnostics::new();
        let cx = CodegenCx::new(&context, "t", IntWidth::Bits64, &diagnostics);
        let bx = make_builder(&cx);

        let bool_ty = basic(TypeCode::Bool);
        let i32_ty = basic(TypeCode::I32);
        let cond = Node::new(Span::DUMMY, NodeFlags::empty(), Some(&bool_ty), Payload::BoolLit(true));
        let thenb = Node::new(Span::DUMMY, NodeFlags::empty(), Some(&i32_ty), Payload::IntLit(1));
        let n = Node::new(
            Span::DUMMY,
            NodeFlags::RVALUE,
            Some(&i32_ty),
            Payload::If { cond: &cond, thenb: &thenb, elseb: None },
        );

        let v = build_if(&bx, &n, &cond, &thenb, None);
        assert!(v.is_some());
        assert!(v.unwrap().as_value().unwrap().is_int_value());
    }

    #[test]
    fn statement_if_without_else_produces_no_value_and_no_else_block() {
        let context = Context::create();
        let diagnostics = Diagnostics::new();
        let cx = CodegenCx::new(&context, "t", IntWidth::Bits64, &diagnostics);
        let bx = make_builder(&cx);

        let bool_ty = basic(TypeCode::Bool);
        let nil_ty = basic(TypeCode::Nil);
        let cond = Node::new(Span::DUMMY, NodeFlags::empty(), Some(&bool_ty), Payload::BoolLit(false));
        let thenb = Node::new(Span::DUMMY, NodeFlags::empty(), Some(&nil_ty), Payload::Block(&[]));
        let n = Node::new(
            Span::DUMMY,
            NodeFlags::empty(),
            Some(&nil_ty),
            Payload::If { cond: &cond, thenb: &thenb, elseb: None },
        );

        let v = build_if(&bx, &n, &cond, &thenb, None);
        assert!(v.is_none());
    }
}
