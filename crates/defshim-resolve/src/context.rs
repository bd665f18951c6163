// src/context.rs
//! Per-run resolution state.

use rustc_hash::FxHashMap;

use defshim_hierarchy::{HierarchyIndex, MethodSignature, TypeId};

use crate::binding::Binding;

/// Resolution state for one compilation run (or one parallel unit).
///
/// Holds the binding cache keyed by type and signature. The cache is never
/// shared between contexts, so independent units can resolve on separate
/// threads against the same index.
#[derive(Debug)]
pub struct ResolutionContext<'idx> {
    pub(crate) index: &'idx HierarchyIndex,
    bindings: FxHashMap<TypeId, FxHashMap<MethodSignature, Option<Binding>>>,
}

impl<'idx> ResolutionContext<'idx> {
    pub fn new(index: &'idx HierarchyIndex) -> Self {
        Self { index, bindings: FxHashMap::default() }
    }

    pub fn index(&self) -> &'idx HierarchyIndex {
        self.index
    }

    /// Number of (type, signature) pairs resolved so far.
    pub fn cached_len(&self) -> usize {
        self.bindings.values().map(FxHashMap::len).sum()
    }

    pub(crate) fn cached(&self, ty: TypeId, sig: &MethodSignature) -> Option<Option<Binding>> {
        self.bindings.get(&ty).and_then(|per_type| per_type.get(sig)).copied()
    }

    pub(crate) fn store(&mut self, ty: TypeId, sig: MethodSignature, binding: Option<Binding>) {
        self.bindings.entry(ty).or_default().insert(sig, binding);
    }
}
