//! Error types for IR lowering
//!
//! Every variant is fatal for the file being lowered: the pass stops, the
//! partially built IR is dropped, and the error is reported as a compilation
//! failure of that file.

use miette::Diagnostic;
use st_ir::verify::VerifyError;
use st_ir::{Symbol, SymbolKind};
use st_span::FileSpan;
use st_tree::NodeKind;
use thiserror::Error;

/// Result type for lowering operations
pub type LowerResult<T> = Result<T, LowerError>;

/// Errors that abort lowering of a file
#[derive(Debug, Error, Diagnostic)]
pub enum LowerError {
    /// A declaration reached lowering without a resolved modality
    #[error("declaration `{name}` at {span} has no resolved modality")]
    #[diagnostic(
        code(lower::missing_modality),
        help("the resolver must fill in modality for every property and function")
    )]
    MissingModality {
        /// Declaration name
        name: String,
        /// Declaration location
        span: FileSpan,
    },

    /// A type needed to build IR was never resolved
    #[error("type of `{name}` at {span} is unresolved: {reason}")]
    #[diagnostic(code(lower::unresolved_type))]
    UnresolvedType {
        /// What the type belongs to
        name: String,
        /// Why the type is unusable
        reason: String,
        /// Location of the type reference
        span: FileSpan,
    },

    /// The module has no fragment for the file's package
    #[error("no package fragment for package `{package}` of file `{file}`")]
    #[diagnostic(code(lower::missing_package_fragment))]
    MissingPackageFragment {
        /// Package name
        package: String,
        /// File name
        file: String,
    },

    /// A source node kind with no construction routine
    #[error("cannot lower {kind} at {span}: no lowering routine for this node kind")]
    #[diagnostic(
        code(lower::unsupported_node),
        help("extend the lowering visitor; content is never dropped silently")
    )]
    UnsupportedNode {
        /// Kind of the offending node
        kind: NodeKind,
        /// Its location
        span: FileSpan,
    },

    /// The current owner was read while no owner was pushed
    #[error("no owner on the scope stack")]
    #[diagnostic(code(lower::empty_scope))]
    EmptyScope,

    /// A declaration slot held a declaration of the wrong kind
    #[error("expected a {expected} declaration, found a {found}")]
    #[diagnostic(code(lower::kind_mismatch))]
    KindMismatch {
        /// Kind the caller required
        expected: SymbolKind,
        /// Kind actually stored
        found: SymbolKind,
    },

    /// A parameter list longer than a parameter index can number
    #[error("function `{function}` declares {count} value parameters, more than an index can hold")]
    #[diagnostic(code(lower::too_many_parameters))]
    TooManyParameters {
        /// Function name
        function: String,
        /// Number of declared parameters
        count: usize,
    },

    /// A symbol was bound twice
    #[error("symbol {symbol} is already bound")]
    #[diagnostic(code(lower::symbol_already_bound))]
    SymbolAlreadyBound {
        /// The symbol
        symbol: Symbol,
    },

    /// Lowering was cancelled before the file was finished
    #[error("lowering of `{file}` was cancelled")]
    #[diagnostic(code(lower::cancelled))]
    Cancelled {
        /// File name
        file: String,
    },

    /// The finished IR failed structural verification
    #[error("lowered IR of `{file}` breaks {} structural invariant(s)", .errors.len())]
    #[diagnostic(code(lower::verification))]
    Verification {
        /// File name
        file: String,
        /// Every violation found
        errors: Vec<VerifyError>,
    },

    /// The worker pool for parallel lowering could not be created
    #[error("failed to build the lowering thread pool")]
    #[diagnostic(code(lower::thread_pool))]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl LowerError {
    /// Whether the error reports a broken upstream contract (as opposed to a
    /// gap in this stage, a defect in it, or an external interruption)
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingModality { .. }
                | Self::UnresolvedType { .. }
                | Self::MissingPackageFragment { .. }
        )
    }
}
