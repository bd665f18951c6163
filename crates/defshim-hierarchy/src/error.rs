use miette::Diagnostic;
use thiserror::Error;

use crate::types::TypeId;

/// Result type for hierarchy construction.
pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Structural defects in the hierarchy handed over by the type checker.
///
/// Language-level legality is not checked here; these only guard the
/// index itself (dangling references, cycles, wrong supertype kinds).
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Unknown type `{name}` referenced by `{referenced_by}`")]
    #[diagnostic(code(defshim_hierarchy::unknown_type))]
    UnknownType { name: String, referenced_by: String },

    #[error("Type `{name}` is defined more than once")]
    #[diagnostic(code(defshim_hierarchy::duplicate_type))]
    DuplicateType { name: String },

    #[error("`{ty}` implements `{target}`, which is not an interface")]
    #[diagnostic(code(defshim_hierarchy::not_an_interface))]
    NotAnInterface { ty: String, target: String },

    #[error("`{ty}` extends `{target}`, which is not a class")]
    #[diagnostic(code(defshim_hierarchy::not_a_class))]
    NotAClass { ty: String, target: String },

    #[error("Cyclic inheritance involving `{ty}`")]
    #[diagnostic(code(defshim_hierarchy::cyclic_inheritance))]
    CyclicInheritance { ty: String },

    #[error("Body of `{ty}.{signature}` refers to type {id}, which is not in the hierarchy")]
    #[diagnostic(
        code(defshim_hierarchy::dangling_type_id),
        help("ids in method bodies must come from the same builder (`add` or `next_id`)")
    )]
    DanglingTypeId { ty: String, signature: String, id: TypeId },

    #[error("Method `{signature}` is declared more than once in `{ty}`")]
    #[diagnostic(code(defshim_hierarchy::duplicate_method))]
    DuplicateMethod { ty: String, signature: String },
}
