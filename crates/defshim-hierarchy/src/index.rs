// src/index.rs
//! Read-only query layer over the type-checked hierarchy.

use std::collections::VecDeque;

use indexmap::IndexSet;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::types::{MethodDecl, MethodSignature, SuperRef, Substitution, TypeDecl, TypeId};

/// Immutable view over every class, interface and enum of a translation run.
///
/// Interface closures are computed once at construction, so all queries are
/// cheap and the index can be shared by reference between worker threads.
#[derive(Debug, Clone)]
pub struct HierarchyIndex {
    types: Vec<TypeDecl>,
    by_name: FxHashMap<String, TypeId>,
    /// Interfaces reachable through the type's own implements/extends clauses,
    /// breadth-first, so nearer interfaces come first.
    own_interfaces: Vec<IndexSet<TypeId>>,
    /// `own_interfaces` of the type followed by those of each superclass.
    visible_interfaces: Vec<IndexSet<TypeId>>,
}

impl HierarchyIndex {
    /// Builds the index from already validated, acyclic declarations whose
    /// ids match their positions.
    pub(crate) fn from_types(types: Vec<TypeDecl>) -> Self {
        let by_name = types.iter().map(|t| (t.name.to_string(), t.id)).collect();

        let own_interfaces: Vec<IndexSet<TypeId>> = types
            .iter()
            .map(|t| {
                let mut closure = IndexSet::new();
                let mut queue: VecDeque<TypeId> = t.interfaces.iter().map(|r| r.id).collect();
                while let Some(next) = queue.pop_front() {
                    if closure.insert(next) {
                        queue.extend(types[next.index()].interfaces.iter().map(|r| r.id));
                    }
                }
                closure
            })
            .collect();

        let visible_interfaces = types
            .iter()
            .map(|t| {
                let mut visible = own_interfaces[t.id.index()].clone();
                let mut current = t.superclass.as_ref().map(|s| s.id);
                while let Some(class) = current {
                    visible.extend(own_interfaces[class.index()].iter().copied());
                    current = types[class.index()].superclass.as_ref().map(|s| s.id);
                }
                visible
            })
            .collect();

        debug!("built hierarchy index with {} types", types.len());
        Self { types, by_name, own_interfaces, visible_interfaces }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns the declaration for an id minted by this index.
    pub fn get(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.index()]
    }

    pub fn try_get(&self, id: TypeId) -> Option<&TypeDecl> {
        self.types.get(id.index())
    }

    /// Looks a type up by its dotted source name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter()
    }

    pub fn superclass(&self, id: TypeId) -> Option<TypeId> {
        self.get(id).superclass.as_ref().map(|s| s.id)
    }

    /// Strict ancestors along the superclass chain, nearest first.
    pub fn superclass_chain(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(self.superclass(id), move |&c| self.superclass(c))
    }

    pub fn direct_interfaces(&self, id: TypeId) -> &[SuperRef] {
        &self.get(id).interfaces
    }

    /// Every interface reachable through the type's own supertype clauses.
    /// For an interface this is the set of all its super-interfaces.
    pub fn interface_closure(&self, id: TypeId) -> &IndexSet<TypeId> {
        &self.own_interfaces[id.index()]
    }

    /// Interfaces implemented by the type or by any of its superclasses.
    pub fn visible_interfaces(&self, id: TypeId) -> &IndexSet<TypeId> {
        &self.visible_interfaces[id.index()]
    }

    /// Whether the type implements an interface its superclass chain does not see.
    pub fn introduces_interfaces(&self, id: TypeId) -> bool {
        match self.superclass(id) {
            Some(sup) => self.visible_interfaces(id).len() > self.visible_interfaces(sup).len(),
            None => !self.visible_interfaces(id).is_empty(),
        }
    }

    /// `sub` extends `sup`, directly or transitively. Irreflexive.
    pub fn is_subinterface(&self, sub: TypeId, sup: TypeId) -> bool {
        sub != sup && self.own_interfaces[sub.index()].contains(&sup)
    }

    /// The instance method with this signature declared directly on `id`.
    pub fn instance_method(&self, id: TypeId, sig: &MethodSignature) -> Option<&MethodDecl> {
        self.get(id).instance_method(sig)
    }

    /// Type arguments of `to` as seen from `from`, composed along the first
    /// supertype path found breadth-first. Raw references yield an empty map.
    pub fn substitution(&self, from: TypeId, to: TypeId) -> Option<Substitution> {
        let mut queue = VecDeque::from([(from, Substitution::default())]);
        let mut seen = FxHashSet::default();
        while let Some((current, subst)) = queue.pop_front() {
            if current == to {
                return Some(subst);
            }
            if !seen.insert(current) {
                continue;
            }
            let decl = self.get(current);
            for sup in decl.superclass.iter().chain(decl.interfaces.iter()) {
                let target = self.get(sup.id);
                let next = if sup.args.is_empty() {
                    Substitution::default()
                } else {
                    target
                        .type_params
                        .iter()
                        .cloned()
                        .zip(sup.args.iter().map(|a| a.substitute(&subst)))
                        .collect()
                };
                queue.push_back((sup.id, next));
            }
        }
        None
    }
}
