//! Default-method binding resolution.
//!
//! Given a `HierarchyIndex`, decides for every (type, signature) pair which
//! body answers the message: the type's own override, a superclass
//! implementation, the most specific interface default, or nothing at all.

pub mod binding;
pub mod context;
pub mod error;
pub mod exposure;
pub mod specificity;

pub use binding::Binding;
pub use context::ResolutionContext;
pub use error::{ResolveError, ResolveResult};
pub use specificity::{resolve_interface_default, InterfaceResolution};
