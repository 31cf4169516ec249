//! Whole-function codegen (spec.md §4.2.4).
//!
//! `build_fun` is the entry point for lowering one `Fun` node into an LLVM
//! `FunctionValue`, from memoization check through the final implicit
//! return. It calls `declare::declare_fun` for the prototype, then (if the
//! function has a body) builds it with a fresh [`crate::builder::Builder`].

use inkwell::values::FunctionValue;

use co_ir::Payload;

use crate::builder::Builder;
use crate::context::{CoNode, CodegenCx, IrValue};
use crate::declare::declare_fun;
use crate::error::internal_error;

/// Build (declaring if necessary) the LLVM function for `n`.
///
/// Step 1 is the memo check: a function already visited (directly, or as
/// the target of a recursive/mutually-recursive call) has its `FunctionValue`
/// cached in `irval` and is returned immediately rather than re-declared or
/// re-built. Step 2 declares the prototype and stashes it in `irval`
/// *before* building the body — this is what lets the body's own call sites
/// (self-recursive calls, or calls to a sibling not yet built) resolve
/// without looping forever.
pub fn build_fun<'ll, 'a>(cx: &CodegenCx<'ll, 'a>, n: &CoNode<'_, 'll>) -> FunctionValue<'ll> {
    if let Some(v) = n.irval() {
        return v
            .as_function()
            .unwrap_or_else(|| internal_error!(n.span, "Fun node's irval is not a function"));
    }

    let body = match &n.payload {
        Payload::Fun { body, .. } => *body,
        _ => internal_error!(n.span, "build_fun called on non-Fun node {:?}", n.kind()),
    };

    let function = declare_fun(cx, n);
    n.set_irval(IrValue::Function(function));

    let Some(body) = body else {
        // External (bodyless) declaration: nothing more to build.
        return function;
    };

    let entry = cx.llcx().append_basic_block(function, "entry");
    let bx = Builder::new(cx, function, entry);
    bind_params(&bx, n, function);

    let body_val = bx.build_expr_mustload(body, "body");

    if bx.current_block().is_some_and(|bb| bb.get_terminator().is_none()) {
        let fun_ty = n.ty().unwrap_or_else(|| internal_error!(n.span, "Fun node has no FunType"));
        let result_ty = match &fun_ty.payload {
            Payload::FunType { result, .. } => {
                result.unwrap_or_else(|| internal_error!(n.span, "function type has no result type"))
            }
            _ => internal_error!(n.span, "Fun's type is not a FunType"),
        };
        if matches!(&result_ty.payload, Payload::BasicType(co_ir::TypeCode::Nil)) {
            bx.ret_void();
        } else {
            let v = body_val
                .and_then(|v| v.as_value())
                .unwrap_or_else(|| cx.default_value(result_ty));
            bx.ret(v);
        }
    }

    function
}

/// Bind each parameter `Var` node to its incoming LLVM argument (spec.md
/// §4.2.4 step 4). A `const` parameter's `irval` is the incoming value
/// directly; a mutable parameter gets an entry alloca so it can be
/// reassigned within the body, mirroring `build_var_def`'s own const/mutable
/// split in `builder.rs`.
fn bind_params<'ll, 'a>(bx: &Builder<'_, 'll, 'a>, n: &CoNode<'_, 'll>, function: FunctionValue<'ll>) {
    let params = match &n.payload {
        Payload::Fun { params, .. } => *params,
        _ => internal_error!(n.span, "bind_params called on non-Fun node"),
    };
    let Some(params) = params else { return };
    let param_nodes: &[&CoNode<'_, 'll>] = match &params.payload {
        Payload::Tuple(items) => items,
        _ => internal_error!(params.span, "Fun params is not a Tuple"),
    };

    for (i, param) in param_nodes.iter().enumerate() {
        let (name, is_const) = match &param.payload {
            Payload::Var { name, .. } => (*name, param.is_const()),
            _ => internal_error!(param.span, "function parameter is not a Var"),
        };
        let incoming = function
            .get_nth_param(i as u32)
            .unwrap_or_else(|| internal_error!(param.span, "missing incoming LLVM argument {i}"));
        incoming.set_name(name.as_str());

        if is_const {
            param.set_irval(IrValue::Value(incoming));
        } else {
            let ty_node = param
                .ty()
                .unwrap_or_else(|| internal_error!(param.span, "mutable parameter has no type"));
            let ty = bx.cx().get_type(ty_node).expect_basic();
            let ptr = bx.entry_alloca(name.as_str(), ty);
            bx.store(incoming, ptr);
            param.set_irval(IrValue::Value(ptr.into()));
        }
    }
}
