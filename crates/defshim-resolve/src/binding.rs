// src/binding.rs
//! Override-precedence resolution for a (type, signature) pair.

use indexmap::IndexSet;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use defshim_hierarchy::{MethodSignature, TypeId};

use crate::context::ResolutionContext;
use crate::error::{ResolveError, ResolveResult};
use crate::specificity::{resolve_interface_default, InterfaceResolution};

/// Which body answers a message for a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binding {
    /// The type declares a concrete body itself.
    ExplicitOverride,
    /// A superclass owns the dispatch entry: either its own body or a shim
    /// it already received. Carries the class holding the entry.
    InheritedClassImpl(TypeId),
    /// The type needs a shim forwarding to this interface's default.
    InterfaceDefault(TypeId),
    /// Nothing implements the signature at this point.
    Abstract { declared_by: TypeId },
}

impl Binding {
    pub fn is_abstract(self) -> bool {
        matches!(self, Binding::Abstract { .. })
    }

    /// The interface whose default is forwarded to, if any.
    pub fn default_source(self) -> Option<TypeId> {
        match self {
            Binding::InterfaceDefault(iface) => Some(iface),
            _ => None,
        }
    }
}

/// What a class sees for a signature through its superclass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inherited {
    ClassImpl(TypeId),
    Shim { holder: TypeId, source: TypeId },
    Abstract(TypeId),
    Nothing,
}

impl<'idx> ResolutionContext<'idx> {
    /// Resolves the binding of `sig` on `ty`, consulting and filling the per-run cache.
    ///
    /// Returns `Ok(None)` when the type does not expose the signature at all.
    /// A concrete class, enum or anonymous class whose binding would be
    /// abstract is reported as `UnresolvedAbstractSignature`.
    pub fn resolve(&mut self, ty: TypeId, sig: &MethodSignature) -> ResolveResult<Option<Binding>> {
        let index = self.index;
        let decl = index.try_get(ty).ok_or(ResolveError::UnknownType { id: ty })?;
        if let Some(cached) = self.cached(ty, sig) {
            return Ok(cached);
        }

        let binding = if decl.is_interface() {
            self.resolve_for_interface(ty, sig)?
        } else {
            self.resolve_for_class(ty, sig)?
        };

        if decl.is_concrete() && binding.map_or(false, Binding::is_abstract) {
            return Err(ResolveError::UnresolvedAbstractSignature {
                ty: decl.name.to_string(),
                signature: sig.to_string(),
            });
        }
        if let Some(b) = binding {
            debug!("{}.{} bound to {:?}", decl.name, sig, b);
        }
        self.store(ty, sig.clone(), binding);
        Ok(binding)
    }

    /// An interface consumes defaults reachable from itself, its own included.
    fn resolve_for_interface(
        &mut self,
        ty: TypeId,
        sig: &MethodSignature,
    ) -> ResolveResult<Option<Binding>> {
        let mut reachable = IndexSet::with_capacity(self.index.interface_closure(ty).len() + 1);
        reachable.insert(ty);
        reachable.extend(self.index.interface_closure(ty).iter().copied());
        Ok(match resolve_interface_default(self.index, ty, &reachable, sig)? {
            InterfaceResolution::Default(source) => Some(Binding::InterfaceDefault(source)),
            InterfaceResolution::Abstract(declared_by) => Some(Binding::Abstract { declared_by }),
            InterfaceResolution::Undeclared => None,
        })
    }

    fn resolve_for_class(
        &mut self,
        ty: TypeId,
        sig: &MethodSignature,
    ) -> ResolveResult<Option<Binding>> {
        // 1. A declaration on the class itself decides everything.
        if let Some(own) = self.index.instance_method(ty, sig) {
            return Ok(Some(if own.is_abstract() {
                Binding::Abstract { declared_by: ty }
            } else {
                Binding::ExplicitOverride
            }));
        }

        // 2. Class implementations up the chain beat any interface default.
        let superclass = self.index.superclass(ty);
        let inherited = match superclass {
            Some(sup) => self.inherited(sup, sig)?,
            None => Inherited::Nothing,
        };
        trace!("{} inherits {:?} for {}", self.index.get(ty).name, inherited, sig);
        match inherited {
            Inherited::ClassImpl(holder) => return Ok(Some(Binding::InheritedClassImpl(holder))),
            Inherited::Abstract(declared_by) if !self.index.get(declared_by).is_interface() => {
                return Ok(Some(Binding::Abstract { declared_by }));
            }
            _ => {}
        }

        // 3. Nothing new to consider: keep whatever the superclass chain settled on.
        if superclass.is_some() && !self.index.introduces_interfaces(ty) {
            return Ok(match inherited {
                Inherited::Shim { holder, .. } | Inherited::ClassImpl(holder) => {
                    Some(Binding::InheritedClassImpl(holder))
                }
                Inherited::Abstract(declared_by) => Some(Binding::Abstract { declared_by }),
                Inherited::Nothing => None,
            });
        }

        // 4. Resolve over every interface visible to the class.
        let visible = self.index.visible_interfaces(ty);
        Ok(match resolve_interface_default(self.index, ty, visible, sig)? {
            InterfaceResolution::Default(source) => match inherited {
                Inherited::Shim { holder, source: from } if from == source => {
                    Some(Binding::InheritedClassImpl(holder))
                }
                _ => Some(Binding::InterfaceDefault(source)),
            },
            InterfaceResolution::Abstract(declared_by) => Some(Binding::Abstract { declared_by }),
            InterfaceResolution::Undeclared => None,
        })
    }

    /// Classifies the superclass binding from the point of view of a subclass.
    fn inherited(&mut self, sup: TypeId, sig: &MethodSignature) -> ResolveResult<Inherited> {
        Ok(match self.resolve(sup, sig)? {
            Some(Binding::ExplicitOverride) => Inherited::ClassImpl(sup),
            Some(Binding::InterfaceDefault(source)) => Inherited::Shim { holder: sup, source },
            Some(Binding::InheritedClassImpl(holder)) => match self.resolve(holder, sig)? {
                Some(Binding::InterfaceDefault(source)) => Inherited::Shim { holder, source },
                _ => Inherited::ClassImpl(holder),
            },
            Some(Binding::Abstract { declared_by }) => Inherited::Abstract(declared_by),
            None => Inherited::Nothing,
        })
    }
}
