//! Read-only model of a type-checked class/interface hierarchy.
//!
//! The front end hands over fully resolved declarations; this crate turns
//! them into a `HierarchyIndex` that answers the supertype, closure and
//! substitution queries the default-method stage needs.

pub mod body;
pub mod builder;
pub mod error;
pub mod index;
pub mod types;

pub use body::{BinaryOp, Block, Expr, LambdaBase, Literal, Stmt};
pub use builder::{HierarchyBuilder, MethodSpec, TypeBuilder};
pub use error::{HierarchyError, HierarchyResult};
pub use index::HierarchyIndex;
pub use types::{
    FieldDecl, MethodDecl, MethodModifier, MethodSignature, Param, Primitive, Substitution,
    SuperRef, TypeDecl, TypeId, TypeKind, TypeName, TypeRef, OBJECT,
};
