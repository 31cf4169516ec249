//! The AST node model.
//!
//! Ported from `original_source/src/co/parse/ast.h`'s `Node` (a tagged
//! record with a `kind` discriminator, a shared `type`/`pos`/`endpos`, and a
//! payload selected by `kind`) into an arena-allocated, lifetime-checked
//! Rust shape. The C source uses a `union` keyed by `kind`; Rust expresses
//! that directly as an enum (`Payload`), so `kind` is no longer a field that
//! can drift out of sync with the payload — it is *derived* from it via
//! [`Node::kind`].
//!
//! `Node` is generic over `V: Copy`, the type the codegen backend uses to
//! memoize a built IR value on the node (`irval` in spec.md §3.1). `co_ir`
//! never depends on a codegen backend, so it does not know what `V` is;
//! `co_llvm` instantiates it with its own `IrValue` (see `co_llvm::node`).

use std::cell::Cell;

use bitflags::bitflags;

use crate::interner::Sym;
use crate::span::Span;

bitflags! {
    /// Coarse classification of a [`NodeKind`], ported from `NodeClassFlags`
    /// in `ast.h`.
    #[derive(Copy, Clone, Eq, PartialEq, Debug)]
    pub struct NodeClass: u8 {
        /// Literal constants: `123`, `true`, `nil`.
        const CONST = 1 << 0;
        /// General expressions.
        const EXPR = 1 << 1;
        /// Type-class nodes (`BasicType`, `TupleType`, `StructType`, `FunType`).
        const TYPE = 1 << 2;
        /// The node carries an ordered list (`Block`, `Tuple`, `TupleType`).
        const ARRAY = 1 << 3;
    }
}

bitflags! {
    /// Per-node flags, ported from the `flags` bitset in spec.md §3.1.
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
    pub struct NodeFlags: u8 {
        /// Immutable binding (a `const` var, or a literal).
        const CONST = 1 << 0;
        /// The node's value is consumed by its context (as opposed to being
        /// built purely for its side effect / address).
        const RVALUE = 1 << 1;
        /// Resolution left this node in a deliberately incomplete state
        /// (carried through from the resolver; codegen never clears it, it
        /// only asserts it is absent at entry).
        const UNRESOLVED = 1 << 2;
        /// An `unsafe`-annotated expression.
        const UNSAFE = 1 << 3;
        /// Node is a function parameter (`Var` nodes only).
        const PARAM = 1 << 4;
    }
}

/// Discriminator for [`Node::payload`]. One variant per `DEF_NODE_KINDS`
/// entry in `ast.h` that survives into codegen (parse-only kinds like
/// `Comment`/`Bad`/`Pkg`/`File` are handled by the driver, not the builder,
/// so `Bad` is kept only as an explicit "this should never reach codegen"
/// marker and the rest are omitted).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    Bad,
    BoolLit,
    IntLit,
    FloatLit,
    Id,
    Var,
    Fun,
    BinOp,
    If,
    Call,
    Block,
    Tuple,
    StructCons,
    Index,
    Selector,
    Assign,
    Return,
    TypeCast,
    BasicType,
    TupleType,
    StructType,
    FunType,
}

impl NodeKind {
    /// Mirrors `NodeKindClass` / `_NodeClassTable` in `ast.h`: a fast,
    /// branch-free classification lookup.
    #[must_use]
    pub const fn class(self) -> NodeClass {
        use NodeKind::{
            Assign, Bad, BasicType, BinOp, Block, BoolLit, Call, FloatLit, Fun, FunType, Id, If,
            Index, IntLit, Return, Selector, StructCons, StructType, Tuple, TupleType, TypeCast,
            Var,
        };
        match self {
            Bad => NodeClass::empty(),
            BoolLit | IntLit | FloatLit => NodeClass::CONST,
            Id | Var | Fun | BinOp | If | Call | StructCons | Index | Selector | Assign
            | Return | TypeCast => NodeClass::EXPR,
            Block | Tuple => NodeClass::from_bits_truncate(NodeClass::EXPR.bits() | NodeClass::ARRAY.bits()),
            BasicType | StructType | FunType => NodeClass::TYPE,
            TupleType => NodeClass::from_bits_truncate(NodeClass::TYPE.bits() | NodeClass::ARRAY.bits()),
        }
    }

    #[must_use]
    pub const fn is_type(self) -> bool {
        self.class().contains(NodeClass::TYPE)
    }

    #[must_use]
    pub const fn is_const(self) -> bool {
        self.class().contains(NodeClass::CONST)
    }

    #[must_use]
    pub const fn is_expr(self) -> bool {
        self.class().contains(NodeClass::EXPR)
    }
}

/// Primitive type codes for [`Payload::BasicType`], ported from
/// `TypeCode` (`universe.h`/`typeid.h`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeCode {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Platform-width signed integer; aliases `I32`/`I64` per §6.
    Int,
    /// Platform-width unsigned integer; aliases `U32`/`U64` per §6.
    Uint,
    /// `nil` — the unit/void type.
    Nil,
    /// The type of an as-yet-unresolved untyped constant (e.g. `3`).
    Ideal,
}

impl TypeCode {
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            TypeCode::I8 | TypeCode::I16 | TypeCode::I32 | TypeCode::I64 | TypeCode::Int
        )
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, TypeCode::F32 | TypeCode::F64)
    }

    #[must_use]
    pub const fn is_bool(self) -> bool {
        matches!(self, TypeCode::Bool)
    }
}

/// Binary operators, ported from the `T_PRIM_OPS` token range.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    Or,
    Xor,
    Eq,
    NEq,
    Lt,
    LEq,
    Gt,
    GEq,
}

impl BinOpKind {
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOpKind::Eq
                | BinOpKind::NEq
                | BinOpKind::Lt
                | BinOpKind::LEq
                | BinOpKind::Gt
                | BinOpKind::GEq
        )
    }
}

/// A named, typed field of a [`Payload::StructType`].
#[derive(Copy, Clone)]
pub struct StructField<'a, V: Copy> {
    pub name: Sym,
    pub ty: &'a Node<'a, V>,
}

/// The variant payload of a [`Node`], selected by [`Node::kind`].
pub enum Payload<'a, V: Copy> {
    Bad,
    BoolLit(bool),
    /// Raw bit pattern; sign/width is determined by the node's resolved type.
    IntLit(u64),
    FloatLit(f64),
    Id {
        name: Sym,
        /// The resolved binding this identifier refers to. Non-null by the
        /// time codegen runs (spec.md §1's "every identifier node carries a
        /// resolved `target`").
        target: Cell<Option<&'a Node<'a, V>>>,
    },
    /// Both a declaration and a local binding (spec.md §4.2.3). `Param` in
    /// `NodeFlags` marks function parameters; `Const` marks immutable
    /// bindings.
    Var {
        name: Sym,
        init: Option<&'a Node<'a, V>>,
    },
    Fun {
        name: Option<Sym>,
        /// `NTuple` of `Var` params, or `None` for a nullary function.
        params: Option<&'a Node<'a, V>>,
        /// `None` means this is an external (bodyless) declaration.
        body: Option<&'a Node<'a, V>>,
    },
    BinOp {
        op: BinOpKind,
        left: &'a Node<'a, V>,
        right: &'a Node<'a, V>,
    },
    If {
        cond: &'a Node<'a, V>,
        thenb: &'a Node<'a, V>,
        elseb: Option<&'a Node<'a, V>>,
    },
    Call {
        /// Either an `NFun` or a type node (a type-conversion call, handled
        /// via `TypeCast` instead — see spec.md §4.2.6).
        receiver: &'a Node<'a, V>,
        /// `NTuple` of argument expressions, or `None` for no arguments.
        args: Option<&'a Node<'a, V>>,
    },
    Block(&'a [&'a Node<'a, V>]),
    Tuple(&'a [&'a Node<'a, V>]),
    /// Field initializer values in declaration order; `Node::ty` names the
    /// `StructType`.
    StructCons(&'a [&'a Node<'a, V>]),
    Index {
        operand: &'a Node<'a, V>,
        /// Compile-time integer literal index (spec.md §4.2.11).
        index: u32,
    },
    Selector {
        operand: &'a Node<'a, V>,
        member: Sym,
    },
    Assign {
        target: &'a Node<'a, V>,
        source: &'a Node<'a, V>,
    },
    Return(Option<&'a Node<'a, V>>),
    TypeCast {
        target_type: &'a Node<'a, V>,
        arg: &'a Node<'a, V>,
    },
    BasicType(TypeCode),
    TupleType(&'a [&'a Node<'a, V>]),
    StructType {
        name: Sym,
        fields: &'a [StructField<'a, V>],
    },
    FunType {
        /// `TupleType` node, or `None` for a nullary function type.
        params: Option<&'a Node<'a, V>>,
        /// `None`/`nil` result lowers to void (spec.md §4.1).
        result: Option<&'a Node<'a, V>>,
    },
}

/// An AST node.
///
/// Owned by the arena of the surrounding build context (spec.md §3.1's
/// "Ownership"): nodes are never freed individually, and `co_ir` exposes no
/// `Drop` glue. Everything is read-only from codegen's perspective except
/// `irval`, which is write-once per build and uses `Cell` for interior
/// mutability exactly as the original C uses a bare mutable field on an
/// otherwise-const-by-convention struct.
pub struct Node<'a, V: Copy> {
    pub span: Span,
    ty: Cell<Option<&'a Node<'a, V>>>,
    flags: Cell<NodeFlags>,
    irval: Cell<Option<V>>,
    pub payload: Payload<'a, V>,
}

impl<'a, V: Copy> Node<'a, V> {
    #[must_use]
    pub fn new(span: Span, flags: NodeFlags, ty: Option<&'a Node<'a, V>>, payload: Payload<'a, V>) -> Self {
        Node {
            span,
            ty: Cell::new(ty),
            flags: Cell::new(flags),
            irval: Cell::new(None),
            payload,
        }
    }

    /// The discriminator for [`Node::payload`]; see the module docs for why
    /// this is computed rather than stored.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match &self.payload {
            Payload::Bad => NodeKind::Bad,
            Payload::BoolLit(_) => NodeKind::BoolLit,
            Payload::IntLit(_) => NodeKind::IntLit,
            Payload::FloatLit(_) => NodeKind::FloatLit,
            Payload::Id { .. } => NodeKind::Id,
            Payload::Var { .. } => NodeKind::Var,
            Payload::Fun { .. } => NodeKind::Fun,
            Payload::BinOp { .. } => NodeKind::BinOp,
            Payload::If { .. } => NodeKind::If,
            Payload::Call { .. } => NodeKind::Call,
            Payload::Block(_) => NodeKind::Block,
            Payload::Tuple(_) => NodeKind::Tuple,
            Payload::StructCons(_) => NodeKind::StructCons,
            Payload::Index { .. } => NodeKind::Index,
            Payload::Selector { .. } => NodeKind::Selector,
            Payload::Assign { .. } => NodeKind::Assign,
            Payload::Return(_) => NodeKind::Return,
            Payload::TypeCast { .. } => NodeKind::TypeCast,
            Payload::BasicType(_) => NodeKind::BasicType,
            Payload::TupleType(_) => NodeKind::TupleType,
            Payload::StructType { .. } => NodeKind::StructType,
            Payload::FunType { .. } => NodeKind::FunType,
        }
    }

    /// The node's resolved type, or `None` if unknown/void. Every expression
    /// node must have this set by the time codegen runs (spec.md §1).
    #[must_use]
    pub fn ty(&self) -> Option<&'a Node<'a, V>> {
        self.ty.get()
    }

    pub fn set_ty(&self, ty: &'a Node<'a, V>) {
        self.ty.set(Some(ty));
    }

    #[must_use]
    pub fn flags(&self) -> NodeFlags {
        self.flags.get()
    }

    pub fn set_flags(&self, flags: NodeFlags) {
        self.flags.set(flags);
    }

    #[must_use]
    pub fn is_const(&self) -> bool {
        self.flags().contains(NodeFlags::CONST)
    }

    #[must_use]
    pub fn is_param(&self) -> bool {
        self.flags().contains(NodeFlags::PARAM)
    }

    /// The memoized IR value for this node, if the builder has already
    /// visited it. See spec.md §4.2.1 ("Nodes with an already-set `irval`
    /// ... return that memoized value") and §9 ("Cyclic references via
    /// memoization").
    #[must_use]
    pub fn irval(&self) -> Option<V> {
        self.irval.get()
    }

    /// Set the memoized IR value. Spec.md's invariant is "write-once per
    /// build"; `co_llvm` upholds that by only ever calling this from the one
    /// place each node kind is built, never speculatively.
    pub fn set_irval(&self, v: V) {
        self.irval.set(Some(v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn class_table_matches_ast_h() {
        assert_eq!(NodeKind::IntLit.class(), NodeClass::CONST);
        assert!(NodeKind::Block.class().contains(NodeClass::ARRAY));
        assert!(NodeKind::Block.class().contains(NodeClass::EXPR));
        assert_eq!(NodeKind::BasicType.class(), NodeClass::TYPE);
        assert!(NodeKind::TupleType.class().contains(NodeClass::TYPE));
        assert!(NodeKind::TupleType.class().contains(NodeClass::ARRAY));
    }

    #[test]
    fn irval_is_initially_none() {
        let n: Node<'_, u32> = Node::new(Span::DUMMY, NodeFlags::empty(), None, Payload::BoolLit(true));
        assert_eq!(n.irval(), None);
        n.set_irval(7);
        assert_eq!(n.irval(), Some(7));
    }
}
