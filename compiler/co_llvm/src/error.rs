//! Resource-level failures (spec.md §7 "Resource errors").
//!
//! Internal errors (wrong node kind reaching a codegen site, a type slot
//! that should be non-null at codegen entry being null) panic via
//! [`internal_error!`] — they indicate a bug upstream of codegen, not
//! something a caller can recover from (spec.md §7: "not recoverable").
//! User errors go to `co_diagnostic::Diagnostics` instead. `BuildError` is
//! reserved for the third category: allocation failure and verifier
//! rejection, which are fatal to *this* module build but not to the process.

use std::fmt;

/// A module build failed for a reason that isn't a user-code mistake.
#[derive(Debug)]
pub enum BuildError {
    /// `Module::verify()` rejected the built IR. Carries the verifier's own
    /// message; spec.md §4.2.18 says verification failures "surface the IR
    /// dump alongside the message".
    VerificationFailed { message: String, ir_dump: String },
    /// A user error was posted to the diagnostics sink and the driver chose
    /// to abort rather than continue best-effort (spec.md §7 "codegen
    /// continues best-effort or aborts the module build").
    AbortedOnDiagnostics { error_count: usize },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::VerificationFailed { message, ir_dump } => {
                write!(f, "module verification failed: {message}\n---\n{ir_dump}")
            }
            BuildError::AbortedOnDiagnostics { error_count } => {
                write!(f, "build aborted after {error_count} error(s)")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Panics with a position span attached, for codegen-site invariant
/// violations (spec.md §7 "Internal errors": "panic/abort with source
/// position"). Mirrors the teacher's stance in `ori_llvm`'s lint table that
/// `unwrap`/`expect` calls on inkwell's builder API are acceptable because
/// "these only fail on internal LLVM state corruption, not user input" —
/// the same reasoning applies here to AST shape violations.
macro_rules! internal_error {
    ($span:expr, $($arg:tt)*) => {
        panic!("internal error at {:?}: {}", $span, format!($($arg)*))
    };
}

pub(crate) use internal_error;
