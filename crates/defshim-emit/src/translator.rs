// src/translator.rs
//! Unit-level driver tying resolution, functionalization and shim emission together.

use std::collections::VecDeque;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use defshim_hierarchy::{HierarchyIndex, LambdaBase, MethodSignature, TypeId, TypeName};
use defshim_resolve::{Binding, ResolutionContext, ResolveError};

use crate::companion::{has_companion, CompanionPolicy};
use crate::error::{TranslateError, TranslateResult};
use crate::functionalize::{functionalize, needs_rewrite, BodyRewriter, FunctionalizedMethod};
use crate::metadata::MethodMetadata;
use crate::options::TranslationOptions;
use crate::registry::{FunctionIdentity, FunctionRegistry};
use crate::request::{
    CompanionArtifact, EmissionRequest, MethodDeclaration, ReflectionMetadata, RewrittenMethod,
    ShimBody, ShimKind, StaticFieldRequest,
};
use crate::shim::ShimEmitter;

/// The types emitted into one output artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub name: TypeName,
    pub types: Vec<TypeId>,
}

impl CompilationUnit {
    pub fn new(name: TypeName, types: Vec<TypeId>) -> Self {
        Self { name, types }
    }

    /// One unit per top-level type, holding it and every type nested in it.
    pub fn per_top_level(index: &HierarchyIndex) -> Vec<CompilationUnit> {
        let mut grouped: IndexMap<TypeName, Vec<TypeId>> = IndexMap::new();
        for decl in index.iter() {
            grouped.entry(decl.name.top_level()).or_default().push(decl.id);
        }
        grouped.into_iter().map(|(name, types)| CompilationUnit { name, types }).collect()
    }

    pub fn owns(&self, ty: TypeId) -> bool {
        self.types.contains(&ty)
    }
}

/// Ordered requests produced for one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitOutput {
    pub unit: TypeName,
    pub requests: Vec<EmissionRequest>,
}

impl UnitOutput {
    pub fn definitions(&self) -> impl Iterator<Item = &FunctionalizedMethod> {
        self.requests.iter().filter_map(|r| match r {
            EmissionRequest::FunctionDefinition(f) => Some(f),
            _ => None,
        })
    }

    pub fn declarations(&self) -> impl Iterator<Item = &MethodDeclaration> {
        self.requests.iter().filter_map(|r| match r {
            EmissionRequest::MethodDeclaration(d) => Some(d),
            _ => None,
        })
    }

    pub fn shims(&self) -> impl Iterator<Item = &ShimBody> {
        self.requests.iter().filter_map(|r| match r {
            EmissionRequest::ShimBody(s) => Some(s),
            _ => None,
        })
    }

    pub fn companions(&self) -> impl Iterator<Item = &CompanionArtifact> {
        self.requests.iter().filter_map(|r| match r {
            EmissionRequest::Companion(c) => Some(c),
            _ => None,
        })
    }

    pub fn companion(&self, name: &str) -> Option<&CompanionArtifact> {
        self.companions().find(|c| c.name == name)
    }

    pub fn static_fields(&self) -> impl Iterator<Item = &StaticFieldRequest> {
        self.requests.iter().filter_map(|r| match r {
            EmissionRequest::StaticField(s) => Some(s),
            _ => None,
        })
    }

    pub fn rewritten_methods(&self) -> impl Iterator<Item = &RewrittenMethod> {
        self.requests.iter().filter_map(|r| match r {
            EmissionRequest::RewrittenMethod(m) => Some(m),
            _ => None,
        })
    }

    pub fn metadata(&self) -> impl Iterator<Item = &ReflectionMetadata> {
        self.requests.iter().filter_map(|r| match r {
            EmissionRequest::ReflectionMetadata(m) => Some(m),
            _ => None,
        })
    }

    /// Number of shim bodies forwarding to `function`.
    pub fn forward_count(&self, function: &str) -> usize {
        self.shims()
            .filter(|s| matches!(&s.kind, ShimKind::Forward { function: f, .. } if f == function))
            .count()
    }
}

#[derive(Debug, Default)]
struct TypeEmission {
    companion: Option<CompanionArtifact>,
    static_fields: Vec<StaticFieldRequest>,
    /// Keyed by declaration position inside the interface.
    definitions: Vec<(usize, FunctionalizedMethod)>,
    entries: Vec<(MethodDeclaration, ShimBody)>,
    rewritten: Vec<RewrittenMethod>,
}

/// Caches and worklist of a single unit. Dropped when the unit is done.
struct UnitState {
    owned: FxHashSet<TypeId>,
    emissions: FxHashMap<TypeId, TypeEmission>,
    shims: ShimEmitter,
    pending: VecDeque<Arc<FunctionIdentity>>,
    queued: FxHashSet<(TypeId, MethodSignature)>,
}

impl UnitState {
    fn new(unit: &CompilationUnit) -> Self {
        Self {
            owned: unit.types.iter().copied().collect(),
            emissions: FxHashMap::default(),
            shims: ShimEmitter::new(),
            pending: VecDeque::new(),
            queued: FxHashSet::default(),
        }
    }

    fn emission(&mut self, ty: TypeId) -> &mut TypeEmission {
        self.emissions.entry(ty).or_default()
    }

    /// Records a use of a shared function. Only functions of interfaces in
    /// this unit are defined here; other units define their own.
    fn consume(&mut self, identity: Arc<FunctionIdentity>) {
        if self.owned.contains(&identity.interface)
            && self.queued.insert((identity.interface, identity.signature.clone()))
        {
            self.pending.push_back(identity);
        }
    }

    fn into_requests(
        mut self,
        index: &HierarchyIndex,
        unit: &CompilationUnit,
        strip_reflection: bool,
    ) -> Vec<EmissionRequest> {
        let mut requests = Vec::new();
        for &ty in &unit.types {
            let mut emission = match self.emissions.remove(&ty) {
                Some(emission) => emission,
                None => continue,
            };
            emission.definitions.sort_by_key(|(position, _)| *position);
            let methods: Vec<MethodMetadata> = emission
                .entries
                .iter()
                .map(|(_, body)| MethodMetadata::for_shim(body.selector.clone(), &body.kind))
                .collect();

            requests.extend(emission.companion.map(EmissionRequest::Companion));
            requests.extend(emission.static_fields.into_iter().map(EmissionRequest::StaticField));
            requests.extend(
                emission
                    .definitions
                    .into_iter()
                    .map(|(_, f)| EmissionRequest::FunctionDefinition(f)),
            );
            for (declaration, body) in emission.entries {
                requests.push(EmissionRequest::MethodDeclaration(declaration));
                requests.push(EmissionRequest::ShimBody(body));
            }
            requests.extend(emission.rewritten.into_iter().map(EmissionRequest::RewrittenMethod));
            if !strip_reflection && !methods.is_empty() {
                requests.push(EmissionRequest::ReflectionMetadata(ReflectionMetadata {
                    owner: ty,
                    owner_name: index.get(ty).name.mangled(),
                    methods,
                }));
            }
        }
        requests
    }
}

/// Translates compilation units against one immutable hierarchy.
///
/// Each unit gets its own `ResolutionContext`; the `FunctionRegistry` is the
/// only state shared between units, so `translate_parallel` may run units on
/// any number of rayon workers.
#[derive(Debug)]
pub struct Translator<'idx> {
    index: &'idx HierarchyIndex,
    options: TranslationOptions,
    registry: Arc<FunctionRegistry>,
}

impl<'idx> Translator<'idx> {
    pub fn new(index: &'idx HierarchyIndex, options: TranslationOptions) -> Self {
        Self::with_registry(index, options, Arc::new(FunctionRegistry::new()))
    }

    pub fn with_registry(
        index: &'idx HierarchyIndex,
        options: TranslationOptions,
        registry: Arc<FunctionRegistry>,
    ) -> Self {
        Self { index, options, registry }
    }

    pub fn index(&self) -> &'idx HierarchyIndex {
        self.index
    }

    pub fn options(&self) -> &TranslationOptions {
        &self.options
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> Arc<FunctionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Translates every top-level unit in index order. A failing unit does
    /// not stop the others.
    pub fn translate_all(&self) -> Vec<TranslateResult<UnitOutput>> {
        CompilationUnit::per_top_level(self.index)
            .iter()
            .map(|unit| self.translate_unit(unit))
            .collect()
    }

    /// Like `translate_all` over the given units, on the rayon pool.
    pub fn translate_parallel(
        &self,
        units: &[CompilationUnit],
    ) -> Vec<TranslateResult<UnitOutput>> {
        units.par_iter().map(|unit| self.translate_unit(unit)).collect()
    }

    /// Resolves, functionalizes and emits one unit. On error nothing of the
    /// unit is returned; an id the index does not know is reported as
    /// `ResolveError::UnknownType`.
    pub fn translate_unit(&self, unit: &CompilationUnit) -> TranslateResult<UnitOutput> {
        let mut ctx = ResolutionContext::new(self.index);
        let mut state = UnitState::new(unit);

        // Units are built by callers; their ids may come from another index.
        let mut decls = Vec::with_capacity(unit.types.len());
        for &ty in &unit.types {
            decls.push(self.index.try_get(ty).ok_or(ResolveError::UnknownType { id: ty })?);
        }

        for decl in decls {
            if decl.is_interface() {
                self.translate_interface(&mut ctx, &mut state, decl.id)?;
            } else {
                self.translate_class(&mut ctx, &mut state, decl.id)?;
            }
        }
        self.define_consumed(&mut ctx, &mut state)?;

        let requests = state.into_requests(self.index, unit, self.options.strip_reflection);
        info!("translated unit {} into {} request(s)", unit.name, requests.len());
        Ok(UnitOutput { unit: unit.name.clone(), requests })
    }

    /// What a lambda implementing `iface` is based on at runtime.
    pub fn lambda_base(
        &self,
        ctx: &mut ResolutionContext<'idx>,
        iface: TypeId,
    ) -> TranslateResult<LambdaBase> {
        Ok(if has_companion(ctx, iface)? { LambdaBase::Companion(iface) } else { LambdaBase::Root })
    }

    /// The shared function `iface.super.sig(..)` calls when written inside `from`.
    pub fn super_default_symbol(
        &self,
        ctx: &mut ResolutionContext<'idx>,
        from: TypeId,
        iface: TypeId,
        sig: &MethodSignature,
    ) -> TranslateResult<Arc<FunctionIdentity>> {
        let name_of = |id: TypeId| {
            self.index.try_get(id).map_or_else(|| id.to_string(), |d| d.name.to_string())
        };
        let unknown = || TranslateError::UnknownSuperDefault {
            ty: name_of(from),
            interface: name_of(iface),
            signature: sig.to_string(),
        };
        if !self.index.try_get(iface).map_or(false, |d| d.is_interface()) {
            return Err(unknown());
        }
        match ctx.resolve(iface, sig)? {
            Some(Binding::InterfaceDefault(source)) => self.intern_default(source, sig),
            _ => Err(unknown()),
        }
    }

    fn translate_interface(
        &self,
        ctx: &mut ResolutionContext<'idx>,
        state: &mut UnitState,
        ty: TypeId,
    ) -> TranslateResult<()> {
        let mut policy = CompanionPolicy::new(ty);
        for (sig, binding) in ctx.bindings_for(ty)? {
            policy.observe(self.index, &sig, binding);
            if let Binding::InterfaceDefault(source) = binding {
                self.emit_forward(state, ty, source, &sig)?;
            }
        }

        if let Some(artifact) = policy.artifact(self.index) {
            let decl = self.index.get(ty);
            let table = self.registry.name_table(decl, &self.options);
            let emission = state.emission(ty);
            for field in decl.static_fields() {
                if let Some(symbols) = table.static_field(&field.name) {
                    emission.static_fields.push(StaticFieldRequest {
                        owner: ty,
                        field: field.name.clone(),
                        ty: field.ty.clone(),
                        storage_symbol: symbols.storage.clone(),
                        accessor_symbol: symbols.accessor.clone(),
                    });
                }
            }
            emission.companion = Some(artifact);
        }
        Ok(())
    }

    fn translate_class(
        &self,
        ctx: &mut ResolutionContext<'idx>,
        state: &mut UnitState,
        ty: TypeId,
    ) -> TranslateResult<()> {
        let decl = self.index.get(ty);

        for (sig, binding) in ctx.bindings_for(ty)? {
            match binding {
                Binding::InterfaceDefault(source) => self.emit_forward(state, ty, source, &sig)?,
                Binding::Abstract { declared_by } if decl.is_abstract => {
                    // Only the topmost abstract class materializes the stub.
                    if declared_by != ty {
                        if let Some(sup) = self.index.superclass(ty) {
                            if ctx.resolve(sup, &sig)?.map_or(false, Binding::is_abstract) {
                                continue;
                            }
                        }
                    }
                    if let Some(declared) = self.index.instance_method(declared_by, &sig) {
                        let stub = state.shims.undefined_operation(
                            self.index,
                            &self.options,
                            ty,
                            declared,
                        );
                        if let Some(entry) = stub {
                            state.emission(ty).entries.push(entry);
                        }
                    }
                }
                _ => {}
            }
        }

        for method in decl.methods.iter().filter(|m| !m.is_default()) {
            let body = match method.body.as_ref() {
                Some(body) if needs_rewrite(body) => body,
                _ => continue,
            };
            let mut rewriter = BodyRewriter::in_place(self, ctx, ty);
            let body = rewriter.rewrite_block(body)?;
            for identity in rewriter.consumed {
                state.consume(identity);
            }
            state.emission(ty).rewritten.push(RewrittenMethod {
                owner: ty,
                owner_name: decl.name.mangled(),
                signature: method.signature.clone(),
                body,
            });
        }
        Ok(())
    }

    fn emit_forward(
        &self,
        state: &mut UnitState,
        owner: TypeId,
        source: TypeId,
        sig: &MethodSignature,
    ) -> TranslateResult<()> {
        let identity = self.intern_default(source, sig)?;
        let method = self
            .index
            .instance_method(source, sig)
            .ok_or_else(|| self.missing_body(source, sig))?;
        let shim = state.shims.forward(self.index, &self.options, owner, method, &identity);
        if let Some(entry) = shim {
            state.emission(owner).entries.push(entry);
        }
        state.consume(identity);
        Ok(())
    }

    /// Functionalizes every consumed default owned by the unit, including
    /// those only reached through `I.super.m()` calls of other bodies.
    fn define_consumed(
        &self,
        ctx: &mut ResolutionContext<'idx>,
        state: &mut UnitState,
    ) -> TranslateResult<()> {
        while let Some(identity) = state.pending.pop_front() {
            let (function, consumed) = functionalize(self, ctx, &identity)?;
            for next in consumed {
                state.consume(next);
            }
            let position = self
                .index
                .get(identity.interface)
                .methods
                .iter()
                .position(|m| m.signature == identity.signature)
                .unwrap_or(usize::MAX);
            debug!("functionalized {}", function.symbol);
            state.emission(identity.interface).definitions.push((position, function));
        }
        Ok(())
    }

    fn intern_default(
        &self,
        source: TypeId,
        sig: &MethodSignature,
    ) -> TranslateResult<Arc<FunctionIdentity>> {
        self.registry
            .intern(self.index.get(source), sig, &self.options)
            .ok_or_else(|| self.missing_body(source, sig))
    }

    fn missing_body(&self, source: TypeId, sig: &MethodSignature) -> TranslateError {
        TranslateError::MissingDefaultBody {
            interface: self.index.get(source).name.to_string(),
            signature: sig.to_string(),
        }
    }
}
