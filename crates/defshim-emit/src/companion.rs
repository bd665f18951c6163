// src/companion.rs
//! Companion existence and conformance-pragma policy.

use log::debug;

use defshim_hierarchy::{HierarchyIndex, MethodSignature, TypeId};
use defshim_resolve::{Binding, ResolutionContext, ResolveResult};

use crate::request::CompanionArtifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionState {
    NoCompanion,
    HasCompanion,
}

/// Tracks one interface while its bindings are walked.
#[derive(Debug)]
pub struct CompanionPolicy {
    interface: TypeId,
    state: CompanionState,
    unimplemented: Vec<MethodSignature>,
}

impl CompanionPolicy {
    pub fn new(interface: TypeId) -> Self {
        Self { interface, state: CompanionState::NoCompanion, unimplemented: Vec::new() }
    }

    pub fn state(&self) -> CompanionState {
        self.state
    }

    pub fn observe(&mut self, index: &HierarchyIndex, sig: &MethodSignature, binding: Binding) {
        match binding {
            Binding::InterfaceDefault(source) => {
                if self.state == CompanionState::NoCompanion {
                    debug!(
                        "{} gets a companion: {} has a default from {}",
                        index.get(self.interface).name,
                        sig,
                        index.get(source).name
                    );
                    self.state = CompanionState::HasCompanion;
                }
            }
            Binding::Abstract { .. } => self.unimplemented.push(sig.clone()),
            Binding::ExplicitOverride | Binding::InheritedClassImpl(_) => {}
        }
    }

    /// The companion to emit, if the interface reached `HasCompanion`.
    pub fn artifact(&self, index: &HierarchyIndex) -> Option<CompanionArtifact> {
        match self.state {
            CompanionState::NoCompanion => None,
            CompanionState::HasCompanion => Some(CompanionArtifact {
                interface: self.interface,
                name: index.get(self.interface).name.mangled(),
                suppress_incomplete_conformance: !self.unimplemented.is_empty(),
            }),
        }
    }
}

/// Whether `iface` has at least one default bound at it, its own or inherited.
pub fn has_companion(ctx: &mut ResolutionContext<'_>, iface: TypeId) -> ResolveResult<bool> {
    match ctx.index().try_get(iface) {
        Some(decl) if decl.is_interface() => {}
        _ => return Ok(false),
    }
    for sig in ctx.exposed_signatures(iface)? {
        if let Some(Binding::InterfaceDefault(_)) = ctx.resolve(iface, &sig)? {
            return Ok(true);
        }
    }
    Ok(false)
}
