//! LLVM codegen context.
//!
//! `SimpleCx` is a minimal wrapper around LLVM's `Context`+`Module`, kept
//! close to the teacher's `ori_llvm::context::SimpleCx`. `CodegenCx` layers
//! the Co-specific state spec.md §4.2 says the builder "carries... for the
//! duration of a module build" on top: the type interner (§4.1), the target
//! integer width (§6), and the diagnostics sink (§6 "External Interfaces").

use std::cell::RefCell;

use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::{
    BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FloatType, FunctionType, IntType,
    PointerType, StructType,
};
use inkwell::values::{BasicValueEnum, FunctionValue};
use inkwell::AddressSpace;
use rustc_hash::FxHashMap;

use co_diagnostic::Diagnostics;
use co_ir::{typeid, Node, Payload, TypeCode};

use crate::error::internal_error;

/// The platform integer width `int`/`uint` alias to (spec.md §6).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum IntWidth {
    Bits32,
    Bits64,
}

impl IntWidth {
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            IntWidth::Bits32 => 32,
            IntWidth::Bits64 => 64,
        }
    }
}

/// The memoized IR value stored in a [`co_ir::Node`]'s `irval` slot.
///
/// `co_ir::Node` is generic over `V: Copy` precisely so `co_llvm` can plug
/// this in: a plain value (what most expressions produce) or a function
/// (what `Fun` nodes produce, which inkwell represents with a distinct
/// `FunctionValue` type rather than a `BasicValueEnum`).
#[derive(Copy, Clone)]
pub enum IrValue<'ll> {
    Value(BasicValueEnum<'ll>),
    Function(FunctionValue<'ll>),
}

impl<'ll> IrValue<'ll> {
    #[must_use]
    pub fn as_value(self) -> Option<BasicValueEnum<'ll>> {
        match self {
            IrValue::Value(v) => Some(v),
            IrValue::Function(_) => None,
        }
    }

    #[must_use]
    pub fn as_function(self) -> Option<FunctionValue<'ll>> {
        match self {
            IrValue::Function(f) => Some(f),
            IrValue::Value(_) => None,
        }
    }
}

impl<'ll> From<BasicValueEnum<'ll>> for IrValue<'ll> {
    fn from(v: BasicValueEnum<'ll>) -> Self {
        IrValue::Value(v)
    }
}

/// A Co AST node, keyed to this backend's `IrValue`.
pub type CoNode<'a, 'll> = Node<'a, IrValue<'ll>>;

/// An IR type handle. Distinct from `BasicTypeEnum` because `FunType`
/// (spec.md §3.2) maps to an LLVM `FunctionType`, which isn't itself a
/// value type and so isn't a `BasicTypeEnum` variant in inkwell.
#[derive(Copy, Clone)]
pub enum IrType<'ll> {
    Basic(BasicTypeEnum<'ll>),
    Function(FunctionType<'ll>),
    /// The handle for `nil`/absent types (spec.md §4.1's "handle returned
    /// for `nil` type or absent type is the primitive 'void' handle").
    Void,
}

impl<'ll> IrType<'ll> {
    /// Unwrap as a value type, for sites that can't accept `void`/a function
    /// type (internal error otherwise — those sites are only ever reached
    /// with a resolved, non-void expression type per spec.md §1).
    #[must_use]
    pub fn expect_basic(self) -> BasicTypeEnum<'ll> {
        match self {
            IrType::Basic(t) => t,
            IrType::Function(_) | IrType::Void => {
                internal_error!(co_ir::Span::DUMMY, "expected a value type, found {self:?}")
            }
        }
    }
}

impl std::fmt::Debug for IrType<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrType::Basic(t) => write!(f, "{t}"),
            IrType::Function(t) => write!(f, "{t}"),
            IrType::Void => write!(f, "void"),
        }
    }
}

/// Minimal LLVM context with the module and commonly used primitive types.
pub struct SimpleCx<'ll> {
    /// The LLVM context (owns all LLVM types and values).
    pub llcx: &'ll Context,
    /// The LLVM module being compiled.
    pub llmod: Module<'ll>,
    /// Commonly used pointer type (opaque pointer).
    pub ptr_type: PointerType<'ll>,
}

impl<'ll> SimpleCx<'ll> {
    #[must_use]
    pub fn new(context: &'ll Context, module_name: &str) -> Self {
        let llmod = context.create_module(module_name);
        let ptr_type = context.ptr_type(AddressSpace::default());

        Self {
            llcx: context,
            llmod,
            ptr_type,
        }
    }

    /// Consume this context and return the LLVM module, for the driver to
    /// verify and hand off to the emitter (spec.md §4.3).
    pub fn into_module(self) -> Module<'ll> {
        self.llmod
    }

    // -- Type constructors --

    #[inline]
    #[must_use]
    pub fn type_i1(&self) -> IntType<'ll> {
        self.llcx.bool_type()
    }

    #[inline]
    #[must_use]
    pub fn type_i8(&self) -> IntType<'ll> {
        self.llcx.i8_type()
    }

    #[inline]
    #[must_use]
    pub fn type_i16(&self) -> IntType<'ll> {
        self.llcx.i16_type()
    }

    #[inline]
    #[must_use]
    pub fn type_i32(&self) -> IntType<'ll> {
        self.llcx.i32_type()
    }

    #[inline]
    #[must_use]
    pub fn type_i64(&self) -> IntType<'ll> {
        self.llcx.i64_type()
    }

    #[inline]
    #[must_use]
    pub fn type_f32(&self) -> FloatType<'ll> {
        self.llcx.f32_type()
    }

    #[inline]
    #[must_use]
    pub fn type_f64(&self) -> FloatType<'ll> {
        self.llcx.f64_type()
    }

    #[inline]
    #[must_use]
    pub fn type_void(&self) -> inkwell::types::VoidType<'ll> {
        self.llcx.void_type()
    }

    #[inline]
    #[must_use]
    pub fn type_ptr(&self) -> PointerType<'ll> {
        self.ptr_type
    }

    #[must_use]
    pub fn type_struct(&self, fields: &[BasicTypeEnum<'ll>], packed: bool) -> StructType<'ll> {
        self.llcx.struct_type(fields, packed)
    }

    /// A named, initially opaque struct type, for forward references
    /// (spec.md §3.3's pre-registration requirement — see
    /// `CodegenCx::get_type`).
    #[must_use]
    pub fn type_named_struct(&self, name: &str) -> StructType<'ll> {
        self.llcx.opaque_struct_type(name)
    }

    pub fn set_struct_body(&self, ty: StructType<'ll>, fields: &[BasicTypeEnum<'ll>], packed: bool) {
        ty.set_body(fields, packed);
    }

    #[must_use]
    pub fn type_func(
        &self,
        args: &[BasicMetadataTypeEnum<'ll>],
        ret: BasicTypeEnum<'ll>,
    ) -> FunctionType<'ll> {
        ret.fn_type(args, false)
    }

    #[must_use]
    pub fn type_void_func(&self, args: &[BasicMetadataTypeEnum<'ll>]) -> FunctionType<'ll> {
        self.type_void().fn_type(args, false)
    }
}

/// The type interner (spec.md §4.1): typeid → materialized IR type.
///
/// `BasicType` nodes never enter this map — `CodegenCx::get_type` serves
/// them directly from `SimpleCx`'s fixed primitive constructors, since there
/// is exactly one of each and no structural recursion to worry about.
#[derive(Default)]
pub struct TypeCache<'ll> {
    interned: RefCell<FxHashMap<String, IrType<'ll>>>,
}

impl<'ll> TypeCache<'ll> {
    #[must_use]
    pub fn new() -> Self {
        TypeCache::default()
    }

    fn get(&self, key: &str) -> Option<IrType<'ll>> {
        self.interned.borrow().get(key).copied()
    }

    fn set(&self, key: String, ty: IrType<'ll>) {
        self.interned.borrow_mut().insert(key, ty);
    }
}

/// Per-module codegen state (spec.md §4.2's "It carries the following state
/// for the duration of a module build").
pub struct CodegenCx<'ll, 'a> {
    pub scx: SimpleCx<'ll>,
    pub diagnostics: &'a Diagnostics,
    types: TypeCache<'ll>,
    int_width: IntWidth,
}

impl<'ll, 'a> CodegenCx<'ll, 'a> {
    #[must_use]
    pub fn new(
        context: &'ll Context,
        module_name: &str,
        int_width: IntWidth,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        CodegenCx {
            scx: SimpleCx::new(context, module_name),
            diagnostics,
            types: TypeCache::new(),
            int_width,
        }
    }

    #[inline]
    #[must_use]
    pub fn llcx(&self) -> &'ll Context {
        self.scx.llcx
    }

    #[inline]
    #[must_use]
    pub fn llmod(&self) -> &Module<'ll> {
        &self.scx.llmod
    }

    #[must_use]
    pub fn int_width(&self) -> IntWidth {
        self.int_width
    }

    fn basic_type(&self, code: TypeCode) -> IrType<'ll> {
        match code {
            TypeCode::Bool => IrType::Basic(self.scx.type_i1().into()),
            TypeCode::I8 | TypeCode::U8 => IrType::Basic(self.scx.type_i8().into()),
            TypeCode::I16 | TypeCode::U16 => IrType::Basic(self.scx.type_i16().into()),
            TypeCode::I32 | TypeCode::U32 => IrType::Basic(self.scx.type_i32().into()),
            TypeCode::I64 | TypeCode::U64 => IrType::Basic(self.scx.type_i64().into()),
            TypeCode::F32 => IrType::Basic(self.scx.type_f32().into()),
            TypeCode::F64 => IrType::Basic(self.scx.type_f64().into()),
            TypeCode::Int | TypeCode::Uint => match self.int_width {
                IntWidth::Bits32 => IrType::Basic(self.scx.type_i32().into()),
                IntWidth::Bits64 => IrType::Basic(self.scx.type_i64().into()),
            },
            // `nil` and `ideal` lower to void (spec.md §6).
            TypeCode::Nil | TypeCode::Ideal => IrType::Void,
        }
    }

    /// `get_type(t)` (spec.md §4.1): the IR type for an AST type node.
    ///
    /// `BasicType` is served directly from the fixed primitive cache;
    /// everything else goes through the typeid-keyed intern map, installing
    /// a forward-reference handle before recursing into subcomponents when
    /// the kind is potentially recursive (`StructType`/`FunType`, per
    /// `co_ir::typeid::is_potentially_recursive` — spec.md §3.3).
    pub fn get_type(&self, t: &CoNode<'_, 'll>) -> IrType<'ll> {
        match &t.payload {
            Payload::BasicType(code) => self.basic_type(*code),
            Payload::FunType { .. } => IrType::Function(self.get_fun_type(t)),
            Payload::TupleType(items) => {
                let key = typeid(t);
                if let Some(cached) = self.types.get(&key) {
                    return cached;
                }
                let field_tys: Vec<BasicTypeEnum<'ll>> = items
                    .iter()
                    .copied()
                    .map(|item| self.get_type(item).expect_basic())
                    .collect();
                let ty = IrType::Basic(self.scx.type_struct(&field_tys, false).into());
                self.types.set(key, ty);
                ty
            }
            Payload::StructType { name, fields } => {
                let key = typeid(t);
                if let Some(cached) = self.types.get(&key) {
                    return cached;
                }
                // Pre-register the opaque named struct before recursing into
                // field types, so a field referencing this same struct (by
                // typeid) resolves to this handle instead of recursing
                // forever (spec.md §3.3).
                let named = self.scx.type_named_struct(name.as_str());
                let placeholder = IrType::Basic(named.into());
                self.types.set(key.clone(), placeholder);
                let field_tys: Vec<BasicTypeEnum<'ll>> =
                    fields.iter().map(|f| self.get_type(f.ty).expect_basic()).collect();
                self.scx.set_struct_body(named, &field_tys, false);
                placeholder
            }
            _ => internal_error!(t.span, "get_type called on non-type node {:?}", t.kind()),
        }
    }

    /// The `FunType` case of `get_type`, returning the narrower
    /// `FunctionType` inkwell needs for `declare_fn`/`declare_extern_fn`.
    ///
    /// A `FunType`'s own params/result can't recurse back into the *same*
    /// `FunType` node within a finite AST, so the pre-registration guard
    /// spec.md §3.3 asks for degenerates to an ordinary insert-on-miss
    /// cache here; the pre-registration that actually breaks mutual
    /// recursion between function *bodies* is `Fun`'s `irval` being set
    /// (to the declared `FunctionValue`) before the body is built — see
    /// `functions::build_fun`.
    pub fn get_fun_type(&self, t: &CoNode<'_, 'll>) -> FunctionType<'ll> {
        let key = typeid(t);
        if let Some(IrType::Function(cached)) = self.types.get(&key) {
            return cached;
        }
        let (params, result): (Option<&CoNode<'_, 'll>>, Option<&CoNode<'_, 'll>>) = match &t.payload {
            Payload::FunType { params, result } => (*params, *result),
            _ => internal_error!(t.span, "get_fun_type called on non-FunType node {:?}", t.kind()),
        };
        let param_tys: Vec<BasicMetadataTypeEnum<'ll>> = match params {
            Some(tuple) => match &tuple.payload {
                Payload::TupleType(items) => items
                    .iter()
                    .copied()
                    .map(|item| self.get_type(item).expect_basic().into())
                    .collect(),
                _ => internal_error!(tuple.span, "FunType params is not a TupleType"),
            },
            None => Vec::new(),
        };
        let fn_ty = match result.map(|r| self.get_type(r)) {
            Some(IrType::Basic(ret)) => self.scx.type_func(&param_tys, ret),
            Some(IrType::Void) | None => self.scx.type_void_func(&param_tys),
            Some(IrType::Function(_)) => internal_error!(t.span, "function-typed result"),
        };
        self.types.set(key, IrType::Function(fn_ty));
        fn_ty
    }

    /// `build_default_value(type)` (spec.md §9): the zero of the IR type for
    /// `t`, used for a `Const` var with no initializer and for an `if`
    /// without an else-branch used as an rvalue.
    pub fn default_value(&self, t: &CoNode<'_, 'll>) -> BasicValueEnum<'ll> {
        match self.get_type(t) {
            IrType::Basic(BasicTypeEnum::IntType(i)) => i.const_zero().into(),
            IrType::Basic(BasicTypeEnum::FloatType(f)) => f.const_zero().into(),
            IrType::Basic(BasicTypeEnum::StructType(s)) => s.const_zero().into(),
            IrType::Basic(BasicTypeEnum::PointerType(p)) => p.const_null().into(),
            IrType::Basic(other) => internal_error!(t.span, "no default value for {other}"),
            IrType::Void | IrType::Function(_) => {
                internal_error!(t.span, "no default value for void/function type")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use co_ir::{NodeFlags, Span};
    use pretty_assertions::assert_eq;

    fn basic(code: TypeCode) -> Node<'static, IrValue<'static>> {
        Node::new(Span::DUMMY, NodeFlags::empty(), None, Payload::BasicType(code))
    }

    #[test]
    fn int_aliases_target_width() {
        let context = Context::create();
        let diagnostics = Diagnostics::new();
        let cx32 = CodegenCx::new(&context, "t32", IntWidth::Bits32, &diagnostics);
        let cx64 = CodegenCx::new(&context, "t64", IntWidth::Bits64, &diagnostics);

        let int_node = basic(TypeCode::Int);
        assert_eq!(cx32.get_type(&int_node).expect_basic(), cx32.scx.type_i32().into());
        assert_eq!(cx64.get_type(&int_node).expect_basic(), cx64.scx.type_i64().into());
    }

    #[test]
    fn nil_is_void() {
        let context = Context::create();
        let diagnostics = Diagnostics::new();
        let cx = CodegenCx::new(&context, "t", IntWidth::Bits64, &diagnostics);
        assert!(matches!(cx.get_type(&basic(TypeCode::Nil)), IrType::Void));
    }

    #[test]
    fn repeated_get_type_on_same_typeid_returns_same_handle() {
        let context = Context::create();
        let diagnostics = Diagnostics::new();
        let cx = CodegenCx::new(&context, "t", IntWidth::Bits64, &diagnostics);

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
            Payload::TupleType(&[&i32a, &boola]),
        );
        assert_eq!(cx.get_type(&t1).expect_basic(), cx.get_type(&t2).expect_basic());
    }
}
