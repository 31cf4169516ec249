//! Two-phase function declaration (spec.md §4.2.4 steps 2-3).
//!
//! Splitting "declare the prototype" from "build the body" (`declare_fun`
//! here, `functions::build_fun` for the rest) is the teacher's own idiom for
//! exactly this problem (`ori_llvm`'s `declare.rs`), and it is what makes
//! forward references and recursive calls work: `build_fun` calls
//! `declare_fun` and stashes the resulting `FunctionValue` in the node's
//! `irval` *before* building the body, so a call to a not-yet-built sibling
//! function resolves to a real (if still bodyless) `FunctionValue` instead of
//! recursing forever.

use inkwell::module::Linkage;
use inkwell::values::FunctionValue;

use co_ir::{typeid, Payload, Sym};

use crate::context::{CoNode, CodegenCx};
use crate::error::internal_error;

/// Declare (but do not define) the LLVM function for `n`.
///
/// Bodyless `Fun` nodes (external declarations, spec.md §4.2.4 step 3 / §6
/// "External (bodyless) declarations are exported") keep their surface name
/// verbatim, since they must link against an externally-defined symbol.
/// Named functions with a body are mangled with their function type's typeid
/// so that distinctly-typed functions sharing a surface name never collide;
/// `main` is the one name kept bare and exported regardless (spec.md §6
/// "Top-level named functions are emitted with private/internal linkage
/// unless their name is `main`, which is exported").
pub fn declare_fun<'ll, 'a>(cx: &CodegenCx<'ll, 'a>, n: &CoNode<'_, 'll>) -> FunctionValue<'ll> {
    let (name, has_body) = match &n.payload {
        Payload::Fun { name, body, .. } => (*name, body.is_some()),
        _ => internal_error!(n.span, "declare_fun called on non-Fun node {:?}", n.kind()),
    };
    let fun_ty_node = n
        .ty()
        .unwrap_or_else(|| internal_error!(n.span, "Fun node has no FunType"));
    let fn_type = cx.get_fun_type(fun_ty_node);

    let is_main = matches!(name, Some(sym) if sym.as_str() == "main");
    let symbol = symbol_name(name, is_main, has_body, fun_ty_node);

    let function = cx.llmod().add_function(&symbol, fn_type, None);
    let linkage = if is_main || !has_body {
        Linkage::External
    } else {
        Linkage::Private
    };
    function.set_linkage(linkage);
    function
}

fn symbol_name(name: Option<Sym>, is_main: bool, has_body: bool, fun_ty: &CoNode<'_, '_>) -> String {
    match name {
        Some(_) if is_main => "main".to_string(),
        Some(sym) if !has_body => sym.as_str().to_string(),
        Some(sym) => format!("{}.{}", sym.as_str(), typeid(fun_ty)),
        None => format!("anon.{}", typeid(fun_ty)),
    }
}

#[cfg(test)]
mod tests {
    use inkwell::context::Context;
    use pretty_assertions::assert_eq;

    use co_diagnostic::Diagnostics;
    use co_ir::{Node, NodeFlags, Payload, Span, TypeCode};

    use super::*;
    use crate::context::IntWidth;

    type N<'a> = Node<'a, crate::context::IrValue<'a>>;

    fn basic(code: TypeCode) -> N<'static> {
        Node::new(Span::DUMMY, NodeFlags::empty(), None, Payload::BasicType(code))
    }

    #[test]
    fn bodyless_fun_gets_external_linkage_and_bare_name() {
        let context = Context::create();
        let diagnostics = Diagnostics::new();
        let cx = CodegenCx::new(&context, "t", IntWidth::Bits64, &diagnostics);

        let arena = bumpalo::Bump::new();
        let interner = co_ir::SymInterner::new(&arena);
        let name = interner.intern("puts");

        let param_ty = basic(TypeCode::I32);
        let params = Node::new(
            Span::DUMMY,
            NodeFlags::empty(),
            None,
            Payload::TupleType(&[&param_ty]),
        );
        let result_ty = basic(TypeCode::I32);
        let fun_ty = Node::new(
            Span::DUMMY,
            NodeFlags::empty(),
            None,
            Payload::FunType { params: Some(&params), result: Some(&result_ty) },
        );
        let fun = Node::new(
            Span::DUMMY,
            NodeFlags::CONST,
            Some(&fun_ty),
            Payload::Fun { name: Some(name), params: None, body: None },
        );

        let function = declare_fun(&cx, &fun);
        assert_eq!(function.get_name().to_str().unwrap(), "puts");
        assert_eq!(function.get_linkage(), Linkage::External);
    }

    #[test]
    fn main_is_never_mangled() {
        let context = Context::create();
        let diagnostics = Diagnostics::new();
        let cx = CodegenCx::new(&context, "t", IntWidth::Bits64, &diagnostics);
        let arena = bumpalo::Bump::new();
        let interner = co_ir::SymInterner::new(&arena);
        let name = interner.intern("main");

        let result_ty = basic(TypeCode::I32);
        let fun_ty = Node::new(
            Span::DUMMY,
            NodeFlags::empty(),
            None,
            Payload::FunType { params: None, result: Some(&result_ty) },
        );
        let body = Node::new(Span::DUMMY, NodeFlags::empty(), None, Payload::IntLit(0));
        let fun = Node::new(
            Span::DUMMY,
            NodeFlags::CONST,
            Some(&fun_ty),
            Payload::Fun { name: Some(name), params: None, body: Some(&body) },
        );

        let function = declare_fun(&cx, &fun);
        assert_eq!(function.get_name().to_str().unwrap(), "main");
        assert_eq!(function.get_linkage(), Linkage::External);
    }

    #[test]
    fn named_fun_with_body_is_mangled_and_private() {
        let context = Context::create();
        let diagnostics = Diagnostics::new();
        let cx = CodegenCx::new(&context, "t", IntWidth::Bits64, &diagnostics);
        let arena = bumpalo::Bump::new();
        let interner = co_ir::SymInterner::new(&arena);
        let name = interner.intern("id");

        let param_ty = basic(TypeCode::I32);
        let params = Node::new(
            Span::DUMMY,
            NodeFlags::empty(),
            None,
            Payload::TupleType(&[&param_ty]),
        );
        let result_ty = basic(TypeCode::I32);
        let fun_ty = Node::new(
            Span::DUMMY,
            NodeFlags::empty(),
            None,
            Payload::FunType { params: Some(&params), result: Some(&result_ty) },
        );
        let body = Node::new(Span::DUMMY, NodeFlags::empty(), None, Payload::IntLit(0));
        let fun = Node::new(
            Span::DUMMY,
            NodeFlags::CONST,
            Some(&fun_ty),
            Payload::Fun { name: Some(name), params: None, body: Some(&body) },
        );

        let function = declare_fun(&cx, &fun);
        assert!(function.get_name().to_str().unwrap().starts_with("id."));
        assert_eq!(function.get_linkage(), Linkage::Private);
    }
}
