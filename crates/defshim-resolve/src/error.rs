use miette::Diagnostic;
use thiserror::Error;

use defshim_hierarchy::TypeId;

/// Result type for binding resolution
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Fatal resolution failures. Each one means an invariant the upstream
/// type checker guarantees did not hold for the current unit.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// More than one non-superseded default remains for a signature
    #[error("Ambiguous default for `{signature}` in `{ty}`: {}", .candidates.join(", "))]
    #[diagnostic(
        code(defshim_resolve::resolution_ambiguity),
        help("the type must override the method and pick one default explicitly")
    )]
    ResolutionAmbiguity {
        /// Consuming type
        ty: String,
        /// Ambiguous signature
        signature: String,
        /// Interfaces whose defaults compete
        candidates: Vec<String>,
    },

    /// A concrete type ends up without any dispatch target for a signature
    #[error("Concrete type `{ty}` has no implementation of `{signature}`")]
    #[diagnostic(code(defshim_resolve::unresolved_abstract_signature))]
    UnresolvedAbstractSignature {
        /// Concrete type
        ty: String,
        /// Unimplemented signature
        signature: String,
    },

    /// A type id that the hierarchy index did not mint
    #[error("Type {id} is not part of the hierarchy")]
    #[diagnostic(code(defshim_resolve::unknown_type))]
    UnknownType { id: TypeId },
}
