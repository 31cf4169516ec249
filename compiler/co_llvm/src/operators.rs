//! Binary operator lowering (spec.md §4.2.14).
//!
//! Dispatch is three-way on the operand type: bool (only equality
//! comparisons are legal), float (arithmetic + ordered comparisons, no
//! bitwise/shift ops), and integer (full arithmetic and bitwise ops, with
//! signed/unsigned variants chosen from the operand's `TypeCode`).

use inkwell::values::BasicValueEnum;
use inkwell::{FloatPredicate, IntPredicate};

use co_ir::BinOpKind;

use crate::builder::{basic_type_code, Builder};
use crate::context::{CoNode, IrValue};
use crate::error::internal_error;

pub fn build_binop<'ll, 'cx, 'a>(
    bx: &Builder<'a, 'll, 'cx>,
    n: &CoNode<'_, 'll>,
    op: BinOpKind,
    left: &CoNode<'_, 'll>,
    right: &CoNode<'_, 'll>,
) -> Option<IrValue<'ll>> {
    let operand_ty = left.ty().unwrap_or_else(|| internal_error!(left.span, "binop operand has no type"));
    let code = basic_type_code(operand_ty);

    let lhs = bx.build_expr_mustload(left, "lhs")?.as_value()?;
    let rhs = bx.build_expr_mustload(right, "rhs")?.as_value()?;

    if code.is_bool() {
        let (l, r) = (lhs.into_int_value(), rhs.into_int_value());
        let pred = match op {
            BinOpKind::Eq => IntPredicate::EQ,
            BinOpKind::NEq => IntPredicate::NE,
            _ => {
                bx.cx().diagnostics.error(n.span, format!("operator {op:?} is not defined on bool"));
                return None;
            }
        };
        return Some(bx.icmp(pred, l, r, "booleq").into());
    }

    if code.is_float() {
        let (l, r) = (lhs.into_float_value(), rhs.into_float_value());
        let v: BasicValueEnum<'ll> = match op {
            BinOpKind::Add => bx.fadd(l, r, "fadd").into(),
            BinOpKind::Sub => bx.fsub(l, r, "fsub").into(),
            BinOpKind::Mul => bx.fmul(l, r, "fmul").into(),
            BinOpKind::Div => bx.fdiv(l, r, "fdiv").into(),
            BinOpKind::Rem => bx.frem(l, r, "frem").into(),
            BinOpKind::Eq => bx.fcmp(FloatPredicate::OEQ, l, r, "feq").into(),
            BinOpKind::NEq => bx.fcmp(FloatPredicate::UNE, l, r, "fne").into(),
            BinOpKind::Lt => bx.fcmp(FloatPredicate::OLT, l, r, "flt").into(),
            BinOpKind::LEq => bx.fcmp(FloatPredicate::OLE, l, r, "fle").into(),
            BinOpKind::Gt => bx.fcmp(FloatPredicate::OGT, l, r, "fgt").into(),
            BinOpKind::GEq => bx.fcmp(FloatPredicate::OGE, l, r, "fge").into(),
            BinOpKind::Shl | BinOpKind::Shr | BinOpKind::And | BinOpKind::Or | BinOpKind::Xor => {
                bx.cx().diagnostics.error(n.span, format!("operator {op:?} is not defined on floats"));
                return None;
            }
        };
        return Some(v.into());
    }

    let (l, r) = (lhs.into_int_value(), rhs.into_int_value());
    let signed = code.is_signed();
    let v: BasicValueEnum<'ll> = match op {
        BinOpKind::Add => bx.add(l, r, "add").into(),
        BinOpKind::Sub => bx.sub(l, r, "sub").into(),
        BinOpKind::Mul => bx.mul(l, r, "mul").into(),
        BinOpKind::Div if signed => bx.sdiv(l, r, "sdiv").into(),
        BinOpKind::Div => bx.udiv(l, r, "udiv").into(),
        BinOpKind::Rem if signed => bx.srem(l, r, "srem").into(),
        BinOpKind::Rem => bx.urem(l, r, "urem").into(),
        BinOpKind::Shl => bx.shl(l, r, "shl").into(),
        BinOpKind::Shr if signed => bx.ashr(l, r, "ashr").into(),
        BinOpKind::Shr => bx.lshr(l, r, "lshr").into(),
        BinOpKind::And => bx.and(l, r, "and").into(),
        BinOpKind::Or => bx.or(l, r, "or").into(),
        BinOpKind::Xor => bx.xor(l, r, "xor").into(),
        BinOpKind::Eq => bx.icmp(IntPredicate::EQ, l, r, "eq").into(),
        BinOpKind::NEq => bx.icmp(IntPredicate::NE, l, r, "ne").into(),
        BinOpKind::Lt if signed => bx.icmp(IntPredicate::SLT, l, r, "slt").into(),
        BinOpKind::Lt => bx.icmp(IntPredicate::ULT, l, r, "ult").into(),
        BinOpKind::LEq if signed => bx.icmp(IntPredicate::SLE, l, r, "sle").into(),
        BinOpKind::LEq => bx.icmp(IntPredicate::ULE, l, r, "ule").into(),
        BinOpKind::Gt if signed => bx.icmp(IntPredicate::SGT, l, r, "sgt").into(),
        BinOpKind::Gt => bx.icmp(IntPredicate::UGT, l, r, "ugt").into(),
        BinOpKind::GEq if signed => bx.icmp(IntPredicate::SGE, l, r, "sge").into(),
        BinOpKind::GEq => bx.icmp(IntPredicate::UGE, l, r, "uge").into(),
    };
    Some(v.into())
}
