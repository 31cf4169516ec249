//! The per-function instruction builder (spec.md §4.2).
//!
//! `Builder` wraps one LLVM `IRBuilder` positioned within one function. It
//! carries the `noload` flag spec.md §4.2 lists as part of the builder's
//! state (here a `Cell<bool>` since `build_expr` takes `&self`, mirroring how
//! `co_ir::Node` itself uses `Cell` for its `irval`/`flags` slots). The `mut`
//! flag spec.md also mentions is *not* carried here: grounding in
//! `original_source/src/co/llvm/llvm.c` shows it is passed as a parameter to
//! the anonymous-struct-literal builder (`build_anon_struct`), not threaded
//! persistent state, so it is modeled as an ordinary function argument below
//! (see `Builder::build_anon_struct`).
//!
//! Dispatch by `NodeKind` is split across this file (literals, identifiers,
//! calls, casts, structs/tuples, selectors/index, assignment) and three
//! sibling modules: `operators` (binary op tables), `control_flow` (`if`),
//! `functions` (whole-function codegen, which owns `Builder` construction).

use std::cell::Cell;

use inkwell::basic_block::BasicBlock;
use inkwell::types::{BasicType, BasicTypeEnum};
use inkwell::values::{
    BasicValue, BasicValueEnum, FloatValue, FunctionValue, IntValue, PhiValue, PointerValue,
};
use inkwell::module::Linkage;
use inkwell::IntPredicate;
use tracing::instrument;

use co_ir::{NodeFlags, NodeKind, Payload, TypeCode};

use crate::context::{CoNode, CodegenCx, IrValue};
use crate::error::internal_error;

/// Per-function LLVM instruction builder.
///
/// One `Builder` is created per function body (`functions::build_fun`) and
/// positioned at that function's entry block initially; it is repositioned
/// as control-flow blocks are appended. This mirrors the teacher's
/// `Builder::build(cx, bb)` constructor, instantiated fresh per insertion
/// point rather than save/restoring a single process-wide cursor the way
/// `original_source`'s C `B` struct does — inkwell's `create_builder()` is
/// cheap, so there is no shared-cursor state to restore between calls.
pub struct Builder<'a, 'll, 'cx> {
    cx: &'a CodegenCx<'ll, 'cx>,
    llbuilder: inkwell::builder::Builder<'ll>,
    function: FunctionValue<'ll>,
    noload: Cell<bool>,
}

impl<'a, 'll, 'cx> Builder<'a, 'll, 'cx> {
    #[must_use]
    pub fn new(cx: &'a CodegenCx<'ll, 'cx>, function: FunctionValue<'ll>, bb: BasicBlock<'ll>) -> Self {
        let llbuilder = cx.llcx().create_builder();
        llbuilder.position_at_end(bb);
        Builder { cx, llbuilder, function, noload: Cell::new(false) }
    }

    #[must_use]
    pub fn cx(&self) -> &'a CodegenCx<'ll, 'cx> {
        self.cx
    }

    #[must_use]
    pub fn function(&self) -> FunctionValue<'ll> {
        self.function
    }

    #[must_use]
    pub fn current_block(&self) -> Option<BasicBlock<'ll>> {
        self.llbuilder.get_insert_block()
    }

    pub fn position_at_end(&self, bb: BasicBlock<'ll>) {
        self.llbuilder.position_at_end(bb);
    }

    #[must_use]
    pub fn append_block(&self, name: &str) -> BasicBlock<'ll> {
        self.cx.llcx().append_basic_block(self.function, name)
    }

    /// Create an alloca in the function's entry block, regardless of the
    /// builder's current position. Placing allocas at entry is required for
    /// LLVM's `mem2reg` to turn them back into SSA registers.
    pub fn entry_alloca(&self, name: &str, ty: BasicTypeEnum<'ll>) -> PointerValue<'ll> {
        let entry = self
            .function
            .get_first_basic_block()
            .unwrap_or_else(|| internal_error!(co_ir::Span::DUMMY, "function has no entry block"));
        let saved = self.current_block();
        match entry.get_first_instruction() {
            Some(first) => self.llbuilder.position_before(&first),
            None => self.llbuilder.position_at_end(entry),
        }
        let ptr = self.llbuilder.build_alloca(ty, name).expect("alloca");
        if let Some(bb) = saved {
            self.llbuilder.position_at_end(bb);
        }
        ptr
    }

    // -- Raw instruction helpers --

    pub fn ret_void(&self) {
        self.llbuilder.build_return(None).expect("ret void");
    }

    pub fn ret(&self, v: BasicValueEnum<'ll>) {
        self.llbuilder.build_return(Some(&v)).expect("ret");
    }

    pub fn br(&self, dest: BasicBlock<'ll>) {
        self.llbuilder.build_unconditional_branch(dest).expect("br");
    }

    pub fn cond_br(&self, cond: IntValue<'ll>, then_bb: BasicBlock<'ll>, else_bb: BasicBlock<'ll>) {
        self.llbuilder
            .build_conditional_branch(cond, then_bb, else_bb)
            .expect("cond_br");
    }

    pub fn store(&self, val: BasicValueEnum<'ll>, ptr: PointerValue<'ll>) {
        self.llbuilder.build_store(ptr, val).expect("store");
    }

    pub fn load(&self, ty: BasicTypeEnum<'ll>, ptr: PointerValue<'ll>, name: &str) -> BasicValueEnum<'ll> {
        self.llbuilder.build_load(ty, ptr, name).expect("load")
    }

    pub fn struct_gep(
        &self,
        ty: inkwell::types::StructType<'ll>,
        ptr: PointerValue<'ll>,
        index: u32,
        name: &str,
    ) -> PointerValue<'ll> {
        self.llbuilder
            .build_struct_gep(ty, ptr, index, name)
            .unwrap_or_else(|()| internal_error!(co_ir::Span::DUMMY, "struct field {index} out of range"))
    }

    pub fn phi(&self, ty: BasicTypeEnum<'ll>, name: &str) -> PhiValue<'ll> {
        self.llbuilder.build_phi(ty, name).expect("phi")
    }

    pub fn add(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_int_add(l, r, n).expect("add")
    }
    pub fn sub(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_int_sub(l, r, n).expect("sub")
    }
    pub fn mul(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_int_mul(l, r, n).expect("mul")
    }
    pub fn sdiv(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_int_signed_div(l, r, n).expect("sdiv")
    }
    pub fn udiv(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_int_unsigned_div(l, r, n).expect("udiv")
    }
    pub fn srem(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_int_signed_rem(l, r, n).expect("srem")
    }
    pub fn urem(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_int_unsigned_rem(l, r, n).expect("urem")
    }
    pub fn shl(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_left_shift(l, r, n).expect("shl")
    }
    pub fn ashr(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_right_shift(l, r, true, n).expect("ashr")
    }
    pub fn lshr(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_right_shift(l, r, false, n).expect("lshr")
    }
    pub fn and(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_and(l, r, n).expect("and")
    }
    pub fn or(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_or(l, r, n).expect("or")
    }
    pub fn xor(&self, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_xor(l, r, n).expect("xor")
    }
    pub fn icmp(&self, pred: IntPredicate, l: IntValue<'ll>, r: IntValue<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_int_compare(pred, l, r, n).expect("icmp")
    }
    pub fn fadd(&self, l: FloatValue<'ll>, r: FloatValue<'ll>, n: &str) -> FloatValue<'ll> {
        self.llbuilder.build_float_add(l, r, n).expect("fadd")
    }
    pub fn fsub(&self, l: FloatValue<'ll>, r: FloatValue<'ll>, n: &str) -> FloatValue<'ll> {
        self.llbuilder.build_float_sub(l, r, n).expect("fsub")
    }
    pub fn fmul(&self, l: FloatValue<'ll>, r: FloatValue<'ll>, n: &str) -> FloatValue<'ll> {
        self.llbuilder.build_float_mul(l, r, n).expect("fmul")
    }
    pub fn fdiv(&self, l: FloatValue<'ll>, r: FloatValue<'ll>, n: &str) -> FloatValue<'ll> {
        self.llbuilder.build_float_div(l, r, n).expect("fdiv")
    }
    pub fn frem(&self, l: FloatValue<'ll>, r: FloatValue<'ll>, n: &str) -> FloatValue<'ll> {
        self.llbuilder.build_float_rem(l, r, n).expect("frem")
    }
    pub fn fcmp(
        &self,
        pred: inkwell::FloatPredicate,
        l: FloatValue<'ll>,
        r: FloatValue<'ll>,
        n: &str,
    ) -> IntValue<'ll> {
        self.llbuilder.build_float_compare(pred, l, r, n).expect("fcmp")
    }
    pub fn trunc(&self, v: IntValue<'ll>, ty: inkwell::types::IntType<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_int_truncate(v, ty, n).expect("trunc")
    }
    pub fn zext(&self, v: IntValue<'ll>, ty: inkwell::types::IntType<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_int_z_extend(v, ty, n).expect("zext")
    }
    pub fn sext(&self, v: IntValue<'ll>, ty: inkwell::types::IntType<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_int_s_extend(v, ty, n).expect("sext")
    }
    pub fn sitofp(&self, v: IntValue<'ll>, ty: inkwell::types::FloatType<'ll>, n: &str) -> FloatValue<'ll> {
        self.llbuilder.build_signed_int_to_float(v, ty, n).expect("sitofp")
    }
    pub fn uitofp(&self, v: IntValue<'ll>, ty: inkwell::types::FloatType<'ll>, n: &str) -> FloatValue<'ll> {
        self.llbuilder.build_unsigned_int_to_float(v, ty, n).expect("uitofp")
    }
    pub fn fptosi(&self, v: FloatValue<'ll>, ty: inkwell::types::IntType<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_float_to_signed_int(v, ty, n).expect("fptosi")
    }
    pub fn fptoui(&self, v: FloatValue<'ll>, ty: inkwell::types::IntType<'ll>, n: &str) -> IntValue<'ll> {
        self.llbuilder.build_float_to_unsigned_int(v, ty, n).expect("fptoui")
    }
    pub fn fpext(&self, v: FloatValue<'ll>, ty: inkwell::types::FloatType<'ll>, n: &str) -> FloatValue<'ll> {
        self.llbuilder.build_float_ext(v, ty, n).expect("fpext")
    }
    pub fn fptrunc(&self, v: FloatValue<'ll>, ty: inkwell::types::FloatType<'ll>, n: &str) -> FloatValue<'ll> {
        self.llbuilder.build_float_trunc(v, ty, n).expect("fptrunc")
    }

    pub fn call(&self, f: FunctionValue<'ll>, args: &[BasicValueEnum<'ll>], name: &str) -> Option<BasicValueEnum<'ll>> {
        let meta: Vec<inkwell::values::BasicMetadataValueEnum> = args.iter().map(|v| (*v).into()).collect();
        self.llbuilder.build_call(f, &meta, name).expect("call").try_as_basic_value().left()
    }

    // -- `noload` plumbing (spec.md §4.2.1) --

    #[must_use]
    pub fn noload(&self) -> bool {
        self.noload.get()
    }

    /// Build `n`, returning the address of its storage rather than its
    /// value. Used for left-hand sides of assignment, and for the operand of
    /// `Index`/`Selector` before GEP-ing into it.
    pub fn build_expr_noload(&self, n: &CoNode<'_, 'll>, debugname: &str) -> Option<IrValue<'ll>> {
        let saved = self.noload.replace(true);
        let v = self.build_expr(n, debugname);
        self.noload.set(saved);
        v
    }

    /// Build `n`, returning its loaded value even if the ambient mode is
    /// `noload` (used for subexpressions that are always consumed as
    /// values, e.g. call arguments, binary operands).
    pub fn build_expr_mustload(&self, n: &CoNode<'_, 'll>, debugname: &str) -> Option<IrValue<'ll>> {
        let saved = self.noload.replace(false);
        let v = self.build_expr(n, debugname);
        self.noload.set(saved);
        v
    }

    /// The main recursive dispatch (spec.md §4.2.1).
    #[instrument(skip(self, n), level = "trace", fields(kind = ?n.kind(), debugname))]
    pub fn build_expr(&self, n: &CoNode<'_, 'll>, debugname: &str) -> Option<IrValue<'ll>> {
        if let Some(v) = n.irval() {
            return Some(v);
        }
        match &n.payload {
            Payload::BoolLit(b) => Some(self.cx.scx.type_i1().const_int(u64::from(*b), false).into()),
            Payload::IntLit(bits) => {
                let ty_node = n.ty().unwrap_or_else(|| internal_error!(n.span, "IntLit has no type"));
                let ity = self.cx.get_type(ty_node).expect_basic().into_int_type();
                let signed = basic_type_code(ty_node).is_signed();
                Some(ity.const_int(*bits, signed).into())
            }
            Payload::FloatLit(f) => {
                let ty_node = n.ty().unwrap_or_else(|| internal_error!(n.span, "FloatLit has no type"));
                let fty = self.cx.get_type(ty_node).expect_basic().into_float_type();
                Some(fty.const_float(*f).into())
            }
            Payload::Id { target, .. } => {
                let target = target
                    .get()
                    .unwrap_or_else(|| internal_error!(n.span, "Id has no resolved target"));
                self.build_id(target, debugname)
            }
            Payload::Var { .. } => self.build_var_def(n),
            Payload::Fun { .. } => Some(IrValue::Function(crate::functions::build_fun(self.cx, n))),
            Payload::BinOp { op, left, right } => crate::operators::build_binop(self, n, *op, left, right),
            Payload::If { cond, thenb, elseb } => crate::control_flow::build_if(self, n, cond, thenb, *elseb),
            Payload::Call { receiver, args } => self.build_call(receiver, *args, debugname),
            Payload::Block(items) => self.build_block(items),
            Payload::Tuple(items) => self.build_tuple(items, debugname),
            Payload::StructCons(fields) => self.build_struct_cons(n, fields, debugname),
            Payload::Index { operand, index } => self.build_index(n, operand, *index, debugname),
            Payload::Selector { operand, member } => self.build_selector(n, operand, *member, debugname),
            Payload::Assign { target, source } => self.build_assign(n, target, source, debugname),
            Payload::Return(operand) => self.build_return(*operand),
            Payload::TypeCast { target_type, arg } => self.build_typecast(n, target_type, arg, debugname),
            Payload::Bad => internal_error!(n.span, "Bad node reached codegen"),
            Payload::BasicType(_) | Payload::TupleType(_) | Payload::StructType { .. } | Payload::FunType { .. } => {
                internal_error!(n.span, "type-class node {:?} reached build_expr", n.kind())
            }
        }
    }

    /// `Id` lowering (spec.md §4.2.3): resolve through `target`.
    fn build_id(&self, target: &CoNode<'_, 'll>, debugname: &str) -> Option<IrValue<'ll>> {
        match target.kind() {
            NodeKind::Fun => Some(IrValue::Function(crate::functions::build_fun(self.cx, target))),
            NodeKind::Var => self.load_var(target, debugname),
            other => internal_error!(target.span, "Id target has unexpected kind {other:?}"),
        }
    }

    /// Building a `Var` *definition* (spec.md §4.2.3): declares storage (or
    /// an `irval` directly for a `const`) the first time a `Var` node is
    /// encountered, e.g. as a `Block` statement or a function parameter
    /// (`functions::bind_param` duplicates the const/mutable split for
    /// parameters, which arrive as an already-computed value rather than an
    /// initializer expression to build).
    fn build_var_def(&self, n: &CoNode<'_, 'll>) -> Option<IrValue<'ll>> {
        let (name, init) = match &n.payload {
            Payload::Var { name, init } => (*name, *init),
            _ => internal_error!(n.span, "build_var_def called on non-Var node"),
        };
        // An unused variable with no resolved type produces no IR (spec.md
        // §4.2.3 "If the var is unused and has no type, produce no IR").
        let Some(ty_node) = n.ty() else { return None };
        let debugname = name.as_str();

        if n.is_const() {
            let v = match init {
                Some(e) => self.build_expr_mustload(e, debugname)?,
                None => IrValue::Value(self.cx.default_value(ty_node)),
            };
            n.set_irval(v);
            Some(v)
        } else {
            let ty = self.cx.get_type(ty_node).expect_basic();
            let ptr = self.entry_alloca(debugname, ty);
            if let Some(e) = init {
                let v = self.build_expr_mustload(e, debugname)?.as_value()?;
                self.store(v, ptr);
            }
            let v = IrValue::Value(ptr.into());
            n.set_irval(v);
            Some(v)
        }
    }

    /// `load_var(var)` (spec.md §4.2.3): the value a reference to `var`
    /// produces. `var.irval()` must already be populated (by `build_var_def`
    /// or `functions::bind_param`) by the time anything refers to it — Co
    /// has no forward-reference-before-declaration for locals.
    fn load_var(&self, var: &CoNode<'_, 'll>, debugname: &str) -> Option<IrValue<'ll>> {
        let stored = var
            .irval()
            .unwrap_or_else(|| internal_error!(var.span, "var referenced before its definition was built"));
        if self.noload.get() || var.is_const() {
            return Some(stored);
        }
        let ptr = stored.as_value()?.into_pointer_value();
        let ty_node = var
            .ty()
            .unwrap_or_else(|| internal_error!(var.span, "mutable var has no type"));
        let ty = self.cx.get_type(ty_node).expect_basic();
        Some(self.load(ty, ptr, debugname).into())
    }

    /// `Block` (spec.md §4.2.5): sequence of expressions, value of the last.
    fn build_block(&self, items: &[&CoNode<'_, 'll>]) -> Option<IrValue<'ll>> {
        let (last, init) = items.split_last()?;
        for item in init {
            self.build_expr(item, "stmt");
        }
        self.build_expr(last, "blockval")
    }

    /// `Call` (spec.md §4.2.6). `TypeCast` is a distinct `NodeKind` in this
    /// model, so `receiver` here always names a function.
    fn build_call(
        &self,
        receiver: &CoNode<'_, 'll>,
        args: Option<&CoNode<'_, 'll>>,
        debugname: &str,
    ) -> Option<IrValue<'ll>> {
        let func = self
            .build_expr_mustload(receiver, "callee")?
            .as_function()
            .unwrap_or_else(|| internal_error!(receiver.span, "call receiver did not lower to a function"));
        let arg_nodes: &[&CoNode<'_, 'll>] = match args.map(|a| &a.payload) {
            Some(Payload::Tuple(items)) => items,
            None => &[],
            Some(_) => internal_error!(receiver.span, "call args is not a Tuple"),
        };
        let mut arg_values = Vec::with_capacity(arg_nodes.len());
        for arg in arg_nodes {
            let v = self.build_expr_mustload(arg, "arg")?.as_value()?;
            arg_values.push(v);
        }
        debug_assert_eq!(
            arg_values.len(),
            func.count_params() as usize,
            "argument count must match parameter count of a resolved call"
        );
        self.call(func, &arg_values, debugname).map(IrValue::Value)
    }

    /// `TypeCast` (spec.md §4.2.7), with the destination type and source
    /// signedness resolved from the real operand types — the original C
    /// hardcodes `dsttype = i32` and `isSigned = false` regardless of the
    /// actual cast; spec.md's Open Questions calls this out as a bug to fix,
    /// not a behavior to port.
    fn build_typecast(
        &self,
        n: &CoNode<'_, 'll>,
        target_type: &CoNode<'_, 'll>,
        arg: &CoNode<'_, 'll>,
        debugname: &str,
    ) -> Option<IrValue<'ll>> {
        let src_ty_node = arg.ty().unwrap_or_else(|| internal_error!(arg.span, "cast operand has no type"));
        let src_code = basic_type_code(src_ty_node);
        let dst_code = basic_type_code(target_type);
        let dst_ir = self.cx.get_type(target_type).expect_basic();
        let val = self.build_expr_mustload(arg, "cast_src")?.as_value()?;

        let result: BasicValueEnum<'ll> = match (val, dst_ir) {
            (BasicValueEnum::IntValue(v), BasicTypeEnum::IntType(dst)) => {
                let (src_bits, dst_bits) = (v.get_type().get_bit_width(), dst.get_bit_width());
                match src_bits.cmp(&dst_bits) {
                    std::cmp::Ordering::Less if src_code.is_signed() => self.sext(v, dst, debugname).into(),
                    std::cmp::Ordering::Less => self.zext(v, dst, debugname).into(),
                    std::cmp::Ordering::Greater => self.trunc(v, dst, debugname).into(),
                    std::cmp::Ordering::Equal => v.into(),
                }
            }
            (BasicValueEnum::IntValue(v), BasicTypeEnum::FloatType(dst)) => {
                if src_code.is_signed() {
                    self.sitofp(v, dst, debugname).into()
                } else {
                    self.uitofp(v, dst, debugname).into()
                }
            }
            (BasicValueEnum::FloatValue(v), BasicTypeEnum::IntType(dst)) => {
                if dst_code.is_signed() {
                    self.fptosi(v, dst, debugname).into()
                } else {
                    self.fptoui(v, dst, debugname).into()
                }
            }
            (BasicValueEnum::FloatValue(v), BasicTypeEnum::FloatType(dst)) => {
                match v.get_type().get_bit_width().cmp(&dst.get_bit_width()) {
                    std::cmp::Ordering::Less => self.fpext(v, dst, debugname).into(),
                    std::cmp::Ordering::Greater => self.fptrunc(v, dst, debugname).into(),
                    std::cmp::Ordering::Equal => v.into(),
                }
            }
            _ => {
                self.cx
                    .diagnostics
                    .error(n.span, format!("unsupported cast from {src_code:?} to {dst_code:?}"));
                return None;
            }
        };
        Some(result.into())
    }

    /// `Return` (spec.md §4.2.8).
    fn build_return(&self, operand: Option<&CoNode<'_, 'll>>) -> Option<IrValue<'ll>> {
        match operand {
            Some(e) => {
                let v = self.build_expr_mustload(e, "retval")?.as_value()?;
                self.ret(v);
            }
            None => self.ret_void(),
        }
        None
    }

    /// `Tuple` as an expression (a literal, not a destructure target).
    fn build_tuple(&self, items: &[&CoNode<'_, 'll>], debugname: &str) -> Option<IrValue<'ll>> {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(self.build_expr_mustload(item, "elem")?.as_value()?);
        }
        let ptr = self.build_anon_struct(&values, false);
        Some(self.addr_or_load(ptr, &values, debugname))
    }

    /// `StructCons` (spec.md §4.2.9): allocate storage for the struct and
    /// store each field initializer. The original C leaves this as `TODO:
    /// initialize fields`; spec.md's Open Questions requires the real
    /// per-field store implemented here.
    fn build_struct_cons(&self, n: &CoNode<'_, 'll>, fields: &[&CoNode<'_, 'll>], debugname: &str) -> Option<IrValue<'ll>> {
        let ty_node = n.ty().unwrap_or_else(|| internal_error!(n.span, "StructCons has no type"));
        let struct_ty = self.cx.get_type(ty_node).expect_basic().into_struct_type();
        let ptr = self.entry_alloca(debugname, struct_ty.into());
        for (i, field) in fields.iter().enumerate() {
            let v = self.build_expr_mustload(field, "field")?.as_value()?;
            let field_ptr = self.struct_gep(struct_ty, ptr, i as u32, &format!("{debugname}.{i}"));
            self.store(v, field_ptr);
        }
        if self.noload.get() {
            Some(ptr.into())
        } else {
            Some(self.load(struct_ty.into(), ptr, debugname).into())
        }
    }

    /// `Selector` (spec.md §4.2.10). Resolves the field index by name from
    /// the operand's `StructType` — the original C hardcodes index `0`,
    /// which spec.md's Open Questions flags as needing a real lookup.
    fn build_selector(
        &self,
        n: &CoNode<'_, 'll>,
        operand: &CoNode<'_, 'll>,
        member: co_ir::Sym,
        debugname: &str,
    ) -> Option<IrValue<'ll>> {
        let struct_ty_node = operand.ty().unwrap_or_else(|| internal_error!(operand.span, "selector operand has no type"));
        let fields = match &struct_ty_node.payload {
            Payload::StructType { fields, .. } => fields,
            _ => internal_error!(operand.span, "selector operand type is not a StructType"),
        };
        let field_index = fields
            .iter()
            .position(|f| f.name == member)
            .unwrap_or_else(|| internal_error!(n.span, "unknown struct field {member}"));
        let struct_ty = self.cx.get_type(struct_ty_node).expect_basic().into_struct_type();
        let ptr = self.build_expr_noload(operand, "selector_base")?.as_value()?.into_pointer_value();
        let field_ptr = self.struct_gep(struct_ty, ptr, field_index as u32, &format!("{member}.ptr"));
        if self.noload.get() {
            Some(field_ptr.into())
        } else {
            let field_ty = self.cx.get_type(fields[field_index].ty).expect_basic();
            Some(self.load(field_ty, field_ptr, member.as_str()).into())
        }
    }

    /// `Index` (spec.md §4.2.11): compile-time literal index into a tuple.
    fn build_index(&self, n: &CoNode<'_, 'll>, operand: &CoNode<'_, 'll>, index: u32, debugname: &str) -> Option<IrValue<'ll>> {
        let tuple_ty_node = operand.ty().unwrap_or_else(|| internal_error!(operand.span, "index operand has no type"));
        let items = match &tuple_ty_node.payload {
            Payload::TupleType(items) => items,
            _ => internal_error!(n.span, "index operand type is not a TupleType"),
        };
        let tuple_ty = self.cx.get_type(tuple_ty_node).expect_basic().into_struct_type();
        let ptr = self.build_expr_noload(operand, "index_base")?.as_value()?.into_pointer_value();
        let elem_ptr = self.struct_gep(tuple_ty, ptr, index, &format!("idx{index}"));
        if self.noload.get() {
            Some(elem_ptr.into())
        } else {
            let elem_ty = self.cx.get_type(items[index as usize]).expect_basic();
            Some(self.load(elem_ty, elem_ptr, debugname).into())
        }
    }

    /// `Assign` (spec.md §4.2.12): dispatches on whether the target is a
    /// tuple (destructure) or a scalar `Var`.
    fn build_assign(
        &self,
        n: &CoNode<'_, 'll>,
        target: &CoNode<'_, 'll>,
        source: &CoNode<'_, 'll>,
        debugname: &str,
    ) -> Option<IrValue<'ll>> {
        match &target.payload {
            Payload::Tuple(targets) => self.build_assign_tuple(n, targets, source, debugname),
            _ => self.build_assign_scalar(n, target, source, debugname),
        }
    }

    fn build_assign_scalar(
        &self,
        n: &CoNode<'_, 'll>,
        target: &CoNode<'_, 'll>,
        source: &CoNode<'_, 'll>,
        debugname: &str,
    ) -> Option<IrValue<'ll>> {
        let ptr = self.build_expr_noload(target, "assign_target")?.as_value()?.into_pointer_value();
        let v = self.build_expr_mustload(source, "assign_src")?.as_value()?;
        self.store(v, ptr);
        if n.flags().contains(NodeFlags::RVALUE) && !self.noload.get() {
            let ty_node = target.ty().unwrap_or_else(|| internal_error!(target.span, "assign target has no type"));
            let ty = self.cx.get_type(ty_node).expect_basic();
            Some(self.load(ty, ptr, debugname).into())
        } else {
            None
        }
    }

    /// Tuple destructure (spec.md §4.2.12's second form). Every source
    /// element is loaded *before* any target is stored to, so `(a, b) = (b,
    /// a)` swaps correctly instead of clobbering `b` before it's read
    /// (spec.md §8's "Load order" testable property). A target entry whose
    /// `irval` is still unset is a fresh definition (introduced by this
    /// assignment, not a prior declaration) and gets a new local allocated
    /// for it — the Rust-idiomatic replacement for the original C's
    /// null-source-slot convention, since `co_ir`'s `Tuple` payload has no
    /// room for a null element.
    fn build_assign_tuple(
        &self,
        n: &CoNode<'_, 'll>,
        targets: &[&CoNode<'_, 'll>],
        source: &CoNode<'_, 'll>,
        debugname: &str,
    ) -> Option<IrValue<'ll>> {
        let source_items = match &source.payload {
            Payload::Tuple(items) => items,
            _ => internal_error!(source.span, "tuple-assign source is not a Tuple"),
        };
        debug_assert_eq!(targets.len(), source_items.len(), "tuple assign arity mismatch");

        let mut loaded = Vec::with_capacity(source_items.len());
        for item in source_items {
            loaded.push(self.build_expr_mustload(item, "assign_src")?.as_value()?);
        }

        let mut ptrs = Vec::with_capacity(targets.len());
        for (target, value) in targets.iter().zip(loaded.iter()) {
            let ptr = if target.kind() == NodeKind::Var && target.irval().is_none() {
                let ty = target
                    .ty()
                    .map(|t| self.cx.get_type(t).expect_basic())
                    .unwrap_or_else(|| value.get_type());
                let p = self.entry_alloca("assign_def", ty);
                target.set_irval(IrValue::Value(p.into()));
                p
            } else {
                self.build_expr_noload(target, "assign_target")?.as_value()?.into_pointer_value()
            };
            self.store(*value, ptr);
            ptrs.push(ptr);
        }

        if n.flags().contains(NodeFlags::RVALUE) {
            let mut post_values = Vec::with_capacity(ptrs.len());
            for (ptr, target) in ptrs.iter().zip(targets.iter()) {
                let ty_node = target.ty().unwrap_or_else(|| internal_error!(target.span, "assign target has no type"));
                let ty = self.cx.get_type(ty_node).expect_basic();
                post_values.push(self.load(ty, *ptr, "post").into());
            }
            let values: Vec<BasicValueEnum<'ll>> = post_values;
            let addr = self.build_anon_struct(&values, false);
            Some(self.addr_or_load(addr, &values, debugname))
        } else {
            None
        }
    }

    /// Anonymous struct literal helper (spec.md §4.2.13). Always returns the
    /// *address* of the constructed aggregate, per spec.md's own wording
    /// ("return its address" in all three branches) — callers that need the
    /// loaded value (a Tuple literal used as an rvalue) load through it
    /// themselves via [`Builder::addr_or_load`].
    fn build_anon_struct(&self, values: &[BasicValueEnum<'ll>], mutable: bool) -> PointerValue<'ll> {
        let tys: Vec<BasicTypeEnum<'ll>> = values.iter().map(BasicValueEnum::get_type).collect();
        let struct_ty = self.cx.scx.type_struct(&tys, false);

        if values.iter().all(|v| is_ir_const(*v)) {
            let const_struct = struct_ty.const_named_struct(values);
            if mutable {
                let ptr = self.entry_alloca("anon", struct_ty.into());
                self.store(const_struct.into(), ptr);
                ptr
            } else {
                let global = self.cx.llmod().add_global(struct_ty, None, "anon_struct");
                global.set_initializer(&const_struct);
                global.set_linkage(Linkage::Private);
                global.set_constant(true);
                global.as_pointer_value()
            }
        } else {
            let ptr = self.entry_alloca("anon", struct_ty.into());
            for (i, v) in values.iter().enumerate() {
                let field_ptr = self.struct_gep(struct_ty, ptr, i as u32, &format!("anon.{i}"));
                self.store(*v, field_ptr);
            }
            ptr
        }
    }

    /// Load through an anonymous-struct address unless the ambient mode is
    /// `noload`, in which case the address itself is the expression's value.
    fn addr_or_load(&self, ptr: PointerValue<'ll>, values: &[BasicValueEnum<'ll>], debugname: &str) -> IrValue<'ll> {
        if self.noload.get() {
            return ptr.into();
        }
        let tys: Vec<BasicTypeEnum<'ll>> = values.iter().map(BasicValueEnum::get_type).collect();
        let struct_ty = self.cx.scx.type_struct(&tys, false);
        self.load(struct_ty.into(), ptr, debugname).into()
    }
}

fn is_ir_const(v: BasicValueEnum<'_>) -> bool {
    match v {
        BasicValueEnum::IntValue(i) => i.is_const(),
        BasicValueEnum::FloatValue(f) => f.is_const(),
        BasicValueEnum::PointerValue(p) => p.is_const(),
        BasicValueEnum::StructValue(s) => s.is_const(),
        BasicValueEnum::ArrayValue(a) => a.is_const(),
        _ => false,
    }
}

/// Extract the `TypeCode` from a (necessarily scalar) type node, for sites
/// that need source/destination signedness (`TypeCast`, `BinOp`).
pub(crate) fn basic_type_code(t: &CoNode<'_, '_>) -> TypeCode {
    match &t.payload {
        Payload::BasicType(code) => *code,
        _ => internal_error!(t.span, "expected a scalar BasicType, found {:?}", t.kind()),
    }
}
