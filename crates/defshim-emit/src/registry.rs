// src/registry.rs
//! Run-wide identities of functionalized default methods.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Serialize;

use defshim_hierarchy::{MethodSignature, TypeDecl, TypeId};

use crate::naming::NameTable;
use crate::options::TranslationOptions;

/// The one shared function emitted for an (interface, default signature) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FunctionIdentity {
    pub interface: TypeId,
    pub signature: MethodSignature,
    pub symbol: String,
}

/// Shared by every unit of a run, including units translated on other threads.
///
/// Identities are keyed by (interface, signature) and symbols are derived
/// from the interface declaration alone, so two units interning the same
/// default always agree on one identity.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: DashMap<(TypeId, MethodSignature), Arc<FunctionIdentity>>,
    name_tables: RwLock<FxHashMap<TypeId, Arc<NameTable>>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The name table of a type, built on first request.
    pub fn name_table(&self, decl: &TypeDecl, options: &TranslationOptions) -> Arc<NameTable> {
        if let Some(table) = self.name_tables.read().get(&decl.id) {
            return Arc::clone(table);
        }
        let built = Arc::new(NameTable::build(decl, options));
        Arc::clone(self.name_tables.write().entry(decl.id).or_insert(built))
    }

    /// Returns the identity of the default method `sig` declared on `decl`,
    /// creating it on first use. `None` if `decl` declares no such default.
    pub fn intern(
        &self,
        decl: &TypeDecl,
        sig: &MethodSignature,
        options: &TranslationOptions,
    ) -> Option<Arc<FunctionIdentity>> {
        let key = (decl.id, sig.clone());
        if let Some(existing) = self.functions.get(&key).map(|entry| Arc::clone(entry.value())) {
            return Some(existing);
        }

        decl.instance_method(sig).filter(|m| m.is_default())?;
        let symbol = self.name_table(decl, options).function(sig)?.to_string();
        let identity = self.functions.entry(key).or_insert_with(|| {
            Arc::new(FunctionIdentity { interface: decl.id, signature: sig.clone(), symbol })
        });
        Some(Arc::clone(identity.value()))
    }

    pub fn get(&self, interface: TypeId, sig: &MethodSignature) -> Option<Arc<FunctionIdentity>> {
        self.functions.get(&(interface, sig.clone())).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// All identities, ordered by symbol.
    pub fn identities(&self) -> Vec<Arc<FunctionIdentity>> {
        let mut all: Vec<_> =
            self.functions.iter().map(|entry| Arc::clone(entry.value())).collect();
        all.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        all
    }
}
