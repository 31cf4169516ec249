//! Diagnostic sink for the Co codegen core.
//!
//! Codegen never panics on a *user* error (spec.md §7: "User errors ...
//! emitted via the diagnostic sink with a position span; codegen continues
//! best-effort or aborts the module build"). This crate is that sink,
//! trimmed from `examples/upstat-io-sigil-lang/compiler/ori_diagnostic` down
//! to what a codegen-only crate needs: no fix-it registry, no SARIF/JSON/
//! terminal emitters (those are CLI-facing concerns spec.md §1 places
//! outside the core's scope). The `ErrorGuaranteed` proof-of-emission
//! pattern is kept as-is because it directly encodes spec.md §7's
//! propagation rule and is cheap to carry over.

use std::cell::RefCell;
use std::fmt;

use co_ir::Span;

/// Severity of a diagnostic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic message keyed on a source span.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({:?})", self.severity, self.message, self.span)
    }
}

/// Proof that at least one error was posted to a [`Diagnostics`] sink.
///
/// Mirrors `ori_diagnostic::ErrorGuaranteed`: the only way to construct one
/// is to actually emit an error, so a function returning
/// `Result<T, ErrorGuaranteed>` can't claim failure without having told the
/// caller why.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}

impl std::error::Error for ErrorGuaranteed {}

/// Collects diagnostics posted during a single build.
///
/// One instance is threaded through the whole `co_llvm::IrBuilder` (spec.md
/// §6: "the caller passes a build context with ... a diagnostics sink").
#[derive(Default)]
pub struct Diagnostics {
    items: RefCell<Vec<Diagnostic>>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Post a user error, returning proof that it was recorded.
    pub fn error(&self, span: Span, message: impl Into<String>) -> ErrorGuaranteed {
        self.items.borrow_mut().push(Diagnostic {
            severity: Severity::Error,
            span,
            message: message.into(),
        });
        ErrorGuaranteed(())
    }

    pub fn warning(&self, span: Span, message: impl Into<String>) {
        self.items.borrow_mut().push(Diagnostic {
            severity: Severity::Warning,
            span,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.items
            .borrow()
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn error_guaranteed(&self) -> Option<ErrorGuaranteed> {
        if self.has_errors() {
            Some(ErrorGuaranteed(()))
        } else {
            None
        }
    }

    /// Drain all diagnostics in emission order.
    #[must_use]
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.items.borrow_mut())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_guaranteed_requires_an_emitted_error() {
        let sink = Diagnostics::new();
        assert!(sink.error_guaranteed().is_none());
        sink.error(Span::DUMMY, "bad");
        assert!(sink.error_guaranteed().is_some());
    }

    #[test]
    fn warnings_do_not_count_as_errors() {
        let sink = Diagnostics::new();
        sink.warning(Span::DUMMY, "hm");
        assert!(!sink.has_errors());
        assert_eq!(sink.take().len(), 1);
    }
}
