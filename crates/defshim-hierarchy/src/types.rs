// src/types.rs
//! Core definitions describing the type-checked class/interface hierarchy.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::body::Block;

/// Name of the implicit root class. Type parameters without a bound erase to it.
pub const OBJECT: &str = "java.lang.Object";

/// A unique identifier for a type stored in the `HierarchyIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Position of the type inside the index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a type node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

/// Fully qualified source name of a type.
///
/// `com.example.Outer.Inner` is stored as package `[com, example]` and
/// nesting path `[Outer, Inner]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName {
    pub package: Vec<String>,
    pub path: Vec<String>,
}

impl TypeName {
    /// A top-level type in the default package.
    pub fn simple(name: &str) -> Self {
        Self { package: Vec::new(), path: vec![name.to_string()] }
    }

    /// Parses a dotted name. Leading lowercase segments form the package,
    /// everything from the first capitalized segment on is the nesting path.
    pub fn parse(qualified: &str) -> Self {
        let mut package = Vec::new();
        let mut path = Vec::new();
        for segment in qualified.split('.').filter(|s| !s.is_empty()) {
            let starts_upper = segment.chars().next().map_or(false, |c| c.is_uppercase());
            if path.is_empty() && !starts_upper {
                package.push(segment.to_string());
            } else {
                path.push(segment.to_string());
            }
        }
        // A name without any capitalized segment is treated as a bare type name.
        if path.is_empty() {
            if let Some(last) = package.pop() {
                path.push(last);
            }
        }
        Self { package, path }
    }

    /// The name of a type nested directly inside this one.
    pub fn nested(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.push(name.to_string());
        Self { package: self.package.clone(), path }
    }

    /// The innermost name segment.
    pub fn simple_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }

    /// The outermost type of the nesting path, qualified with the package.
    pub fn top_level(&self) -> TypeName {
        Self {
            package: self.package.clone(),
            path: self.path.first().cloned().into_iter().collect(),
        }
    }

    /// Target-side identifier: camel-cased package followed by the nesting
    /// path joined with `_` (`com.foo.A.P` -> `ComFooA_P`).
    pub fn mangled(&self) -> String {
        let mut out = String::new();
        for segment in &self.package {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
        out.push_str(&self.path.join("_"));
        out
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let segments: Vec<&str> =
            self.package.iter().chain(self.path.iter()).map(String::as_str).collect();
        write!(f, "{}", segments.join("."))
    }
}

/// Primitive value types of the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }
}

/// Maps type parameter names to the arguments they are instantiated with.
pub type Substitution = FxHashMap<String, TypeRef>;

/// A semantic type as supplied by the type checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Void,
    Primitive(Primitive),
    /// A class or interface type, possibly parameterized.
    Named { name: String, args: Vec<TypeRef> },
    /// A reference to a type parameter in scope.
    Param { name: String, bound: Option<Box<TypeRef>> },
    Array(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: &str) -> Self {
        TypeRef::Named { name: name.to_string(), args: Vec::new() }
    }

    pub fn generic(name: &str, args: Vec<TypeRef>) -> Self {
        TypeRef::Named { name: name.to_string(), args }
    }

    pub fn param(name: &str) -> Self {
        TypeRef::Param { name: name.to_string(), bound: None }
    }

    pub fn object() -> Self {
        TypeRef::named(OBJECT)
    }

    pub fn array_of(elem: TypeRef) -> Self {
        TypeRef::Array(Box::new(elem))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// The erased form used for override matching: type arguments are dropped
    /// and type parameters collapse to their bound.
    pub fn erasure(&self) -> TypeRef {
        match self {
            TypeRef::Void | TypeRef::Primitive(_) => self.clone(),
            TypeRef::Named { name, .. } => TypeRef::named(name),
            TypeRef::Param { bound, .. } => match bound {
                Some(bound) => bound.erasure(),
                None => TypeRef::object(),
            },
            TypeRef::Array(elem) => TypeRef::array_of(elem.erasure()),
        }
    }

    /// Replaces type parameters that appear in `subst`. Unmapped parameters are kept.
    pub fn substitute(&self, subst: &Substitution) -> TypeRef {
        if subst.is_empty() {
            return self.clone();
        }
        match self {
            TypeRef::Void | TypeRef::Primitive(_) => self.clone(),
            TypeRef::Named { name, args } => TypeRef::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(subst)).collect(),
            },
            TypeRef::Param { name, .. } => subst.get(name).cloned().unwrap_or_else(|| self.clone()),
            TypeRef::Array(elem) => TypeRef::array_of(elem.substitute(subst)),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => write!(f, "void"),
            TypeRef::Primitive(p) => write!(f, "{}", p.keyword()),
            TypeRef::Named { name, args } if args.is_empty() => write!(f, "{}", name),
            TypeRef::Named { name, args } => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{}<{}>", name, args.join(", "))
            }
            TypeRef::Param { name, .. } => write!(f, "{}", name),
            TypeRef::Array(elem) => write!(f, "{}[]", elem),
        }
    }
}

/// A reference from a type to one of its supertypes, with type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuperRef {
    pub id: TypeId,
    pub args: Vec<TypeRef>,
}

/// Identity key of a method: name plus erased parameter types.
/// Equality of signatures defines override matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    name: String,
    params: Vec<TypeRef>,
}

impl MethodSignature {
    /// Builds a signature, erasing every parameter type.
    pub fn new(name: &str, params: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            name: name.to_string(),
            params: params.into_iter().map(|p| p.erasure()).collect(),
        }
    }

    /// A signature without parameters.
    pub fn nullary(name: &str) -> Self {
        Self::new(name, std::iter::empty())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        write!(f, "{}({})", self.name, params.join(", "))
    }
}

/// Modifier of a declared method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodModifier {
    Abstract,
    /// An interface method carrying an inheritable body.
    Default,
    Static,
    /// A concrete method body on a class.
    Concrete,
}

/// A named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

impl Param {
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self { name: name.to_string(), ty }
    }
}

/// A method declared directly on a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub signature: MethodSignature,
    /// Parameters as written, before erasure.
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub modifier: MethodModifier,
    pub body: Option<Block>,
    /// Back-reference to the declaring type; lookup only.
    pub declaring: TypeId,
}

impl MethodDecl {
    pub fn is_static(&self) -> bool {
        self.modifier == MethodModifier::Static
    }

    pub fn is_default(&self) -> bool {
        self.modifier == MethodModifier::Default
    }

    pub fn is_abstract(&self) -> bool {
        self.modifier == MethodModifier::Abstract
    }
}

/// A field declared on a type. Only names matter for collision checks,
/// the type is carried through to static-field requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
}

/// A class, interface or enum node. Immutable once the index is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub id: TypeId,
    pub name: TypeName,
    pub kind: TypeKind,
    /// Direct superclass; always `None` for interfaces.
    pub superclass: Option<SuperRef>,
    /// Directly implemented (classes) or extended (interfaces) interfaces, in source order.
    pub interfaces: Vec<SuperRef>,
    pub type_params: Vec<String>,
    pub methods: Vec<MethodDecl>,
    pub fields: Vec<FieldDecl>,
    pub is_abstract: bool,
    pub is_anonymous: bool,
}

impl TypeDecl {
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Classes and enums that must provide a dispatch target for every signature.
    pub fn is_concrete(&self) -> bool {
        !self.is_interface() && !self.is_abstract
    }

    /// Any declared method with the given signature, static ones included.
    pub fn declared_method(&self, sig: &MethodSignature) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| &m.signature == sig)
    }

    /// A declared instance method (abstract, default or concrete) with the given signature.
    pub fn instance_method(&self, sig: &MethodSignature) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| &m.signature == sig && !m.is_static())
    }

    pub fn default_methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods.iter().filter(|m| m.is_default())
    }

    pub fn static_fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.fields.iter().filter(|f| f.is_static)
    }

    pub fn static_field(&self, name: &str) -> Option<&FieldDecl> {
        self.static_fields().find(|f| f.name == name)
    }
}
