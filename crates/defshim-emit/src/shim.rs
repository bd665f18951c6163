// src/shim.rs
//! Per-type forwarding shims and abstract stubs.

use log::debug;
use rustc_hash::FxHashSet;

use defshim_hierarchy::{HierarchyIndex, MethodDecl, MethodSignature, Param, TypeId};

use crate::naming::selector;
use crate::options::TranslationOptions;
use crate::registry::FunctionIdentity;
use crate::request::{DeclarationOrigin, MethodDeclaration, ShimBody, ShimKind};

/// Emits at most one dispatch entry per (type, signature) within a unit.
#[derive(Debug, Default)]
pub struct ShimEmitter {
    emitted: FxHashSet<(TypeId, MethodSignature)>,
}

impl ShimEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declaration and forwarding body on `owner` for the default `source` provides.
    /// `None` if `owner` already has an entry for the signature.
    pub fn forward(
        &mut self,
        index: &HierarchyIndex,
        options: &TranslationOptions,
        owner: TypeId,
        source: &MethodDecl,
        function: &FunctionIdentity,
    ) -> Option<(MethodDeclaration, ShimBody)> {
        if !self.emitted.insert((owner, source.signature.clone())) {
            return None;
        }
        let origin = DeclarationOrigin::DefaultShim { source: source.declaring };
        let declaration = declare(index, options, owner, source, origin);
        let args = declaration.params.iter().map(|p| p.name.clone()).collect();
        let kind = ShimKind::Forward { function: function.symbol.clone(), args };
        let body = body_for(&declaration, kind);
        debug!("shim {}.{} -> {}", declaration.owner_name, declaration.selector, function.symbol);
        Some((declaration, body))
    }

    /// Declaration with an undefined-operation body for an abstract signature.
    pub fn undefined_operation(
        &mut self,
        index: &HierarchyIndex,
        options: &TranslationOptions,
        owner: TypeId,
        declared: &MethodDecl,
    ) -> Option<(MethodDeclaration, ShimBody)> {
        if !self.emitted.insert((owner, declared.signature.clone())) {
            return None;
        }
        let declaration = declare(index, options, owner, declared, DeclarationOrigin::AbstractStub);
        let body = body_for(&declaration, ShimKind::UndefinedOperation);
        debug!("abstract stub {}.{}", declaration.owner_name, declaration.selector);
        Some((declaration, body))
    }

    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }
}

/// Declares `method` on `owner` with the owner's type arguments substituted.
/// Inherited declarations get positional parameter names.
fn declare(
    index: &HierarchyIndex,
    options: &TranslationOptions,
    owner: TypeId,
    method: &MethodDecl,
    origin: DeclarationOrigin,
) -> MethodDeclaration {
    let subst = index.substitution(owner, method.declaring).unwrap_or_default();
    let inherited = method.declaring != owner;
    let params = method
        .params
        .iter()
        .enumerate()
        .map(|(position, p)| {
            let name = if inherited {
                format!("{}{}", options.shim_param_prefix, position)
            } else {
                p.name.clone()
            };
            Param { name, ty: p.ty.substitute(&subst) }
        })
        .collect();
    MethodDeclaration {
        owner,
        owner_name: index.get(owner).name.mangled(),
        selector: selector(&method.signature, options),
        signature: method.signature.clone(),
        return_type: method.return_type.substitute(&subst),
        params,
        origin,
    }
}

fn body_for(declaration: &MethodDeclaration, kind: ShimKind) -> ShimBody {
    ShimBody {
        owner: declaration.owner,
        owner_name: declaration.owner_name.clone(),
        selector: declaration.selector.clone(),
        signature: declaration.signature.clone(),
        returns_value: !declaration.return_type.is_void(),
        kind,
    }
}
