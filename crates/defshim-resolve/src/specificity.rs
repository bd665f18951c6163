// src/specificity.rs
//! Most-specific interface selection for a single signature.

use indexmap::IndexSet;
use log::trace;

use defshim_hierarchy::{HierarchyIndex, MethodDecl, MethodSignature, TypeId};

use crate::error::{ResolveError, ResolveResult};

/// Outcome of choosing among the interfaces reachable from a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceResolution {
    /// Exactly one non-superseded interface supplies a default body.
    Default(TypeId),
    /// Only abstract declarations survive; the first surviving declarer is reported.
    Abstract(TypeId),
    /// No reachable interface declares the signature.
    Undeclared,
}

/// Picks the interface whose declaration of `sig` applies to `consumer`.
///
/// Every interface in `reachable` that declares `sig` as an instance method
/// is a candidate. A candidate is superseded when another candidate extends
/// it, directly or transitively. Abstract redeclarations take part in the
/// supersession, so `interface C extends B { void f(); }` hides B's default
/// from everything that reaches B only through C.
pub fn resolve_interface_default(
    index: &HierarchyIndex,
    consumer: TypeId,
    reachable: &IndexSet<TypeId>,
    sig: &MethodSignature,
) -> ResolveResult<InterfaceResolution> {
    // 1. Every reachable declaration of the signature.
    let candidates: Vec<&MethodDecl> = reachable
        .iter()
        .filter_map(|&iface| index.instance_method(iface, sig))
        .collect();
    if candidates.is_empty() {
        return Ok(InterfaceResolution::Undeclared);
    }

    // 2. Drop candidates some other candidate is more specific than.
    let survivors: Vec<&MethodDecl> = candidates
        .iter()
        .copied()
        .filter(|m| {
            !candidates.iter().any(|other| index.is_subinterface(other.declaring, m.declaring))
        })
        .collect();
    trace!(
        "{} for {}: {} candidate(s), {} survivor(s)",
        sig,
        index.get(consumer).name,
        candidates.len(),
        survivors.len()
    );

    // 3. At most one default may remain.
    let defaults: Vec<TypeId> =
        survivors.iter().filter(|m| m.is_default()).map(|m| m.declaring).collect();
    match defaults.as_slice() {
        [single] => Ok(InterfaceResolution::Default(*single)),
        [] => Ok(survivors.first().map_or(InterfaceResolution::Undeclared, |m| {
            InterfaceResolution::Abstract(m.declaring)
        })),
        _ => Err(ResolveError::ResolutionAmbiguity {
            ty: index.get(consumer).name.to_string(),
            signature: sig.to_string(),
            candidates: defaults.iter().map(|&d| index.get(d).name.to_string()).collect(),
        }),
    }
}
