// src/builder.rs
//! Construction of a `HierarchyIndex` from name-based declarations.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::body::Block;
use crate::error::{HierarchyError, HierarchyResult};
use crate::index::HierarchyIndex;
use crate::types::{
    FieldDecl, MethodDecl, MethodModifier, MethodSignature, Param, SuperRef, TypeDecl, TypeId,
    TypeKind, TypeName, TypeRef,
};

#[derive(Debug, Clone)]
struct PendingRef {
    name: String,
    args: Vec<TypeRef>,
}

/// A method awaiting insertion into a type.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: String,
    params: Vec<Param>,
    return_type: TypeRef,
    modifier: MethodModifier,
    body: Option<Block>,
}

impl MethodSpec {
    pub fn new(name: &str, modifier: MethodModifier) -> Self {
        let body = match modifier {
            MethodModifier::Abstract => None,
            _ => Some(Block::empty()),
        };
        Self {
            name: name.to_string(),
            params: Vec::new(),
            return_type: TypeRef::Void,
            modifier,
            body,
        }
    }

    pub fn abstract_method(name: &str) -> Self {
        Self::new(name, MethodModifier::Abstract)
    }

    pub fn default_method(name: &str) -> Self {
        Self::new(name, MethodModifier::Default)
    }

    pub fn concrete(name: &str) -> Self {
        Self::new(name, MethodModifier::Concrete)
    }

    pub fn static_method(name: &str) -> Self {
        Self::new(name, MethodModifier::Static)
    }

    pub fn param(mut self, name: &str, ty: TypeRef) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    pub fn body(mut self, body: Block) -> Self {
        self.body = Some(body);
        self
    }

    /// The erased signature this method will be registered under.
    pub fn signature(&self) -> MethodSignature {
        MethodSignature::new(&self.name, self.params.iter().map(|p| p.ty.clone()))
    }
}

/// A type awaiting insertion into a `HierarchyBuilder`.
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    name: TypeName,
    kind: TypeKind,
    superclass: Option<PendingRef>,
    interfaces: Vec<PendingRef>,
    type_params: Vec<String>,
    methods: Vec<MethodSpec>,
    fields: Vec<FieldDecl>,
    is_abstract: bool,
    is_anonymous: bool,
}

impl TypeBuilder {
    pub fn new(name: TypeName, kind: TypeKind) -> Self {
        Self {
            name,
            kind,
            superclass: None,
            interfaces: Vec::new(),
            type_params: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            is_abstract: false,
            is_anonymous: false,
        }
    }

    pub fn class(name: &str) -> Self {
        Self::new(TypeName::parse(name), TypeKind::Class)
    }

    pub fn interface(name: &str) -> Self {
        Self::new(TypeName::parse(name), TypeKind::Interface)
    }

    pub fn enumeration(name: &str) -> Self {
        Self::new(TypeName::parse(name), TypeKind::Enum)
    }

    /// Superclass for classes, an additional super-interface for interfaces.
    pub fn extends(self, name: &str) -> Self {
        self.extends_generic(name, Vec::new())
    }

    pub fn extends_generic(mut self, name: &str, args: Vec<TypeRef>) -> Self {
        let pending = PendingRef { name: name.to_string(), args };
        if self.kind == TypeKind::Interface {
            self.interfaces.push(pending);
        } else {
            self.superclass = Some(pending);
        }
        self
    }

    pub fn implements(self, name: &str) -> Self {
        self.implements_generic(name, Vec::new())
    }

    pub fn implements_generic(mut self, name: &str, args: Vec<TypeRef>) -> Self {
        self.interfaces.push(PendingRef { name: name.to_string(), args });
        self
    }

    pub fn type_param(mut self, name: &str) -> Self {
        self.type_params.push(name.to_string());
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.is_anonymous = true;
        self
    }

    pub fn method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    pub fn static_field(mut self, name: &str, ty: TypeRef) -> Self {
        self.fields.push(FieldDecl { name: name.to_string(), ty, is_static: true });
        self
    }

    pub fn field(mut self, name: &str, ty: TypeRef) -> Self {
        self.fields.push(FieldDecl { name: name.to_string(), ty, is_static: false });
        self
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }
}

/// Collects type declarations and turns them into a validated `HierarchyIndex`.
///
/// Ids are assigned in insertion order. Bodies may refer to any id the
/// builder hands out (`add` or `next_id`); `build` rejects ids that end up
/// naming no type.
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    pending: Vec<TypeBuilder>,
    by_name: FxHashMap<String, TypeId>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next call to `add` will assign.
    pub fn next_id(&self) -> TypeId {
        TypeId(self.pending.len() as u32)
    }

    pub fn id_of(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn add(&mut self, ty: TypeBuilder) -> HierarchyResult<TypeId> {
        let key = ty.name.to_string();
        if self.by_name.contains_key(&key) {
            return Err(HierarchyError::DuplicateType { name: key });
        }
        let id = self.next_id();
        self.by_name.insert(key, id);
        self.pending.push(ty);
        Ok(id)
    }

    pub fn build(self) -> HierarchyResult<HierarchyIndex> {
        let kinds: Vec<TypeKind> = self.pending.iter().map(|p| p.kind).collect();
        let resolve = |r: &PendingRef, owner: &TypeName| -> HierarchyResult<SuperRef> {
            let id = self.by_name.get(&r.name).copied().ok_or_else(|| HierarchyError::UnknownType {
                name: r.name.clone(),
                referenced_by: owner.to_string(),
            })?;
            Ok(SuperRef { id, args: r.args.clone() })
        };

        let mut types = Vec::with_capacity(self.pending.len());
        for (position, pending) in self.pending.iter().enumerate() {
            let id = TypeId(position as u32);

            let superclass = match &pending.superclass {
                Some(r) => {
                    let sup = resolve(r, &pending.name)?;
                    if kinds[sup.id.index()] == TypeKind::Interface {
                        return Err(HierarchyError::NotAClass {
                            ty: pending.name.to_string(),
                            target: r.name.clone(),
                        });
                    }
                    Some(sup)
                }
                None => None,
            };

            let mut interfaces = Vec::with_capacity(pending.interfaces.len());
            for r in &pending.interfaces {
                let sup = resolve(r, &pending.name)?;
                if kinds[sup.id.index()] != TypeKind::Interface {
                    return Err(HierarchyError::NotAnInterface {
                        ty: pending.name.to_string(),
                        target: r.name.clone(),
                    });
                }
                interfaces.push(sup);
            }

            let mut seen = FxHashSet::default();
            let mut methods = Vec::with_capacity(pending.methods.len());
            for spec in &pending.methods {
                let signature = spec.signature();
                if !seen.insert(signature.clone()) {
                    return Err(HierarchyError::DuplicateMethod {
                        ty: pending.name.to_string(),
                        signature: signature.to_string(),
                    });
                }
                let dangling = spec
                    .body
                    .iter()
                    .flat_map(Block::referenced_types)
                    .find(|referenced| referenced.index() >= kinds.len());
                if let Some(id) = dangling {
                    return Err(HierarchyError::DanglingTypeId {
                        ty: pending.name.to_string(),
                        signature: signature.to_string(),
                        id,
                    });
                }
                methods.push(MethodDecl {
                    signature,
                    params: spec.params.clone(),
                    return_type: spec.return_type.clone(),
                    modifier: spec.modifier,
                    body: spec.body.clone(),
                    declaring: id,
                });
            }

            types.push(TypeDecl {
                id,
                name: pending.name.clone(),
                kind: pending.kind,
                superclass,
                interfaces,
                type_params: pending.type_params.clone(),
                methods,
                fields: pending.fields.clone(),
                is_abstract: pending.is_abstract,
                is_anonymous: pending.is_anonymous,
            });
        }

        check_acyclic(&types)?;
        Ok(HierarchyIndex::from_types(types))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

fn check_acyclic(types: &[TypeDecl]) -> HierarchyResult<()> {
    fn visit(types: &[TypeDecl], state: &mut [Visit], id: TypeId) -> HierarchyResult<()> {
        match state[id.index()] {
            Visit::Done => return Ok(()),
            Visit::InProgress => {
                return Err(HierarchyError::CyclicInheritance {
                    ty: types[id.index()].name.to_string(),
                });
            }
            Visit::Unvisited => {}
        }
        state[id.index()] = Visit::InProgress;
        let decl = &types[id.index()];
        for sup in decl.superclass.iter().chain(decl.interfaces.iter()) {
            visit(types, state, sup.id)?;
        }
        state[id.index()] = Visit::Done;
        Ok(())
    }

    let mut state = vec![Visit::Unvisited; types.len()];
    for decl in types {
        visit(types, &mut state, decl.id)?;
    }
    Ok(())
}
