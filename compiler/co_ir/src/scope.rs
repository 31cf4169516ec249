//! Lexical scope — spec.md §3.4.
//!
//! `Scope` is a linked hash map from symbol to node, built by the resolver
//! and exposed to codegen only as a read-only lookup (spec.md: "The codegen
//! core does not mutate scopes"). Ported from `ScopeNew`/`ScopeAssoc`/
//! `ScopeLookup` in `original_source/src/co/parse/ast.h`.

use rustc_hash::FxHashMap;

use crate::interner::Sym;
use crate::node::Node;

/// A lexical namespace, optionally chained to a parent scope.
pub struct Scope<'a, V: Copy> {
    parent: Option<&'a Scope<'a, V>>,
    bindings: FxHashMap<Sym, &'a Node<'a, V>>,
}

impl<'a, V: Copy> Scope<'a, V> {
    #[must_use]
    pub fn new(parent: Option<&'a Scope<'a, V>>) -> Self {
        Scope {
            parent,
            bindings: FxHashMap::default(),
        }
    }

    /// Associate `sym` with `node` in this scope, returning any node it
    /// replaces (mirrors `ScopeAssoc`'s "Returns replaced value or NULL").
    pub fn assoc(&mut self, sym: Sym, node: &'a Node<'a, V>) -> Option<&'a Node<'a, V>> {
        self.bindings.insert(sym, node)
    }

    /// Look up `sym`, walking up through parent scopes (`ScopeLookup`).
    #[must_use]
    pub fn lookup(&self, sym: Sym) -> Option<&'a Node<'a, V>> {
        if let Some(node) = self.bindings.get(&sym) {
            return Some(*node);
        }
        self.parent.and_then(|p| p.lookup(sym))
    }

    #[must_use]
    pub fn parent(&self) -> Option<&'a Scope<'a, V>> {
        self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::SymInterner;
    use crate::node::{NodeFlags, Payload};
    use crate::span::Span;
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookup_walks_parent_chain() {
        let arena = Bump::new();
        let interner = SymInterner::new(&arena);
        let x = interner.intern("x");
        let node = Node::new(Span::DUMMY, NodeFlags::empty(), None, Payload::Bad);

        let mut parent = Scope::new(None);
        parent.assoc(x, &node);
        let child: Scope<'_, u32> = Scope::new(Some(&parent));

        assert!(child.lookup(x).is_some());
        assert!(child.lookup(interner.intern("y")).is_none());
        assert_eq!(child.lookup(x).unwrap() as *const _, &node as *const _);
    }
}
