// src/exposure.rs
//! Enumeration of the signatures a type must answer.

use indexmap::IndexSet;

use defshim_hierarchy::{MethodSignature, TypeId};

use crate::binding::Binding;
use crate::context::ResolutionContext;
use crate::error::{ResolveError, ResolveResult};

impl<'idx> ResolutionContext<'idx> {
    /// Every instance signature `ty` exposes, in a stable order: its own
    /// declarations, then those of each superclass (nearest first), then
    /// those of the visible interfaces in breadth-first order.
    pub fn exposed_signatures(&self, ty: TypeId) -> ResolveResult<IndexSet<MethodSignature>> {
        let index = self.index;
        let decl = index.try_get(ty).ok_or(ResolveError::UnknownType { id: ty })?;

        let interfaces = if decl.is_interface() {
            index.interface_closure(ty)
        } else {
            index.visible_interfaces(ty)
        };

        let mut exposed = IndexSet::new();
        let owners = std::iter::once(ty)
            .chain(index.superclass_chain(ty))
            .chain(interfaces.iter().copied());
        for owner in owners {
            exposed.extend(
                index
                    .get(owner)
                    .methods
                    .iter()
                    .filter(|m| !m.is_static())
                    .map(|m| m.signature.clone()),
            );
        }
        Ok(exposed)
    }

    /// Resolved bindings for every exposed signature, in exposure order.
    pub fn bindings_for(&mut self, ty: TypeId) -> ResolveResult<Vec<(MethodSignature, Binding)>> {
        let mut out = Vec::new();
        for sig in self.exposed_signatures(ty)? {
            if let Some(binding) = self.resolve(ty, &sig)? {
                out.push((sig, binding));
            }
        }
        Ok(out)
    }
}
