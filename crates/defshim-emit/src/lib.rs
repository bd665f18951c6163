//! Default-method functionalization and shim emission.
//!
//! For every compilation unit this crate walks the resolved bindings and
//! produces an ordered list of `EmissionRequest`s: one shared function per
//! consumed (interface, default) pair, forwarding shims or abstract stubs
//! per type, companion markers for interfaces that carry defaults, static
//! field symbols and optional reflection metadata.

pub mod companion;
pub mod error;
pub mod functionalize;
pub mod metadata;
pub mod naming;
pub mod options;
pub mod registry;
pub mod request;
pub mod shim;
pub mod translator;

pub use companion::{has_companion, CompanionPolicy, CompanionState};
pub use error::{TranslateError, TranslateResult};
pub use functionalize::FunctionalizedMethod;
pub use metadata::MethodMetadata;
pub use naming::{selector, selector_identifier, NameTable, StaticFieldSymbols};
pub use options::TranslationOptions;
pub use registry::{FunctionIdentity, FunctionRegistry};
pub use request::{
    CompanionArtifact, DeclarationOrigin, EmissionRequest, MethodDeclaration, ReflectionMetadata,
    RewrittenMethod, ShimBody, ShimKind, StaticFieldRequest,
};
pub use shim::ShimEmitter;
pub use translator::{CompilationUnit, Translator, UnitOutput};
