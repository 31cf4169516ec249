//! Whole-package codegen and verification (spec.md §4.2.16-§4.2.18).
//!
//! `build_module` walks every top-level declaration in a [`Package`],
//! declaring and building functions (`functions::build_fun` handles the
//! two-phase declare/build split and memoization) and global variables, then
//! runs LLVM's module verifier. A user error posted to `diagnostics` during
//! the walk aborts the build without running the verifier, since an
//! incomplete module is expected to fail verification for uninteresting
//! reasons.

use inkwell::module::Linkage;

use co_ir::{Node, Package, Payload};

use crate::context::{CodegenCx, IrValue};
use crate::error::{internal_error, BuildError};
use crate::functions::build_fun;

/// Build every declaration in `pkg` into `cx`'s module, then verify it.
pub fn build_module<'ll, 'a>(cx: &CodegenCx<'ll, 'a>, pkg: &Package<'_, IrValue<'ll>>) -> Result<(), BuildError> {
    for file in pkg.files {
        for decl in file.decls {
            build_decl(cx, decl);
        }
    }

    if let Some(err) = cx.diagnostics.error_guaranteed() {
        let _ = err;
        let error_count = cx
            .diagnostics
            .take()
            .into_iter()
            .filter(|d| d.severity == co_diagnostic::Severity::Error)
            .count();
        return Err(BuildError::AbortedOnDiagnostics { error_count });
    }

    match cx.llmod().verify() {
        Ok(()) => Ok(()),
        Err(message) => Err(BuildError::VerificationFailed {
            message: message.to_string(),
            ir_dump: cx.llmod().print_to_string().to_string(),
        }),
    }
}

fn build_decl<'ll, 'a>(cx: &CodegenCx<'ll, 'a>, decl: &Node<'_, IrValue<'ll>>) {
    match &decl.payload {
        Payload::Fun { .. } => {
            build_fun(cx, decl);
        }
        Payload::Var { .. } => build_global_var(cx, decl),
        _ => internal_error!(decl.span, "unexpected top-level declaration kind {:?}", decl.kind()),
    }
}

/// A top-level `Var` becomes an LLVM global. Its initializer, if present,
/// must fold to a compile-time constant (spec.md §4.2.16) — globals with a
/// non-constant initializer are a user error, not an internal one.
fn build_global_var<'ll, 'a>(cx: &CodegenCx<'ll, 'a>, n: &Node<'_, IrValue<'ll>>) {
    let (name, init) = match &n.payload {
        Payload::Var { name, init } => (*name, *init),
        _ => internal_error!(n.span, "build_global_var called on non-Var node"),
    };
    let Some(ty_node) = n.ty() else { return };
    let ty = cx.get_type(ty_node).expect_basic();

    let global = cx.llmod().add_global(ty, None, name.as_str());
    // spec.md §4.2.16: "Linkage defaults to private" for every global,
    // const or mutable alike — the const/external split is §6's rule for
    // top-level functions, not for vars.
    global.set_linkage(Linkage::Private);

    match init.map(|e| build_const_expr(cx, e)) {
        Some(Some(value)) => global.set_initializer(&value),
        Some(None) => {
            cx.diagnostics.error(n.span, format!("initializer for global `{name}` is not a compile-time constant"));
            global.set_initializer(&cx.default_value(ty_node));
        }
        None => global.set_initializer(&cx.default_value(ty_node)),
    }
    if n.is_const() {
        global.set_constant(true);
    }

    n.set_irval(IrValue::Value(global.as_pointer_value().into()));
}

/// Fold a global initializer expression to an LLVM constant. Only literals
/// are supported; anything else (a call, a reference to another global)
/// returns `None` so the caller can post a diagnostic rather than emit
/// ill-formed IR.
fn build_const_expr<'ll, 'a>(cx: &CodegenCx<'ll, 'a>, n: &Node<'_, IrValue<'ll>>) -> Option<inkwell::values::BasicValueEnum<'ll>> {
    let ty_node = n.ty()?;
    match &n.payload {
        Payload::BoolLit(b) => Some(cx.scx.type_i1().const_int(u64::from(*b), false).into()),
        Payload::IntLit(bits) => {
            let ity = cx.get_type(ty_node).expect_basic().into_int_type();
            let signed = crate::builder::basic_type_code(ty_node).is_signed();
            Some(ity.const_int(*bits, signed).into())
        }
        Payload::FloatLit(f) => {
            let fty = cx.get_type(ty_node).expect_basic().into_float_type();
            Some(fty.const_float(*f).into())
        }
        _ => None,
    }
}
