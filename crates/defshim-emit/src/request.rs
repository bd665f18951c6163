// src/request.rs
//! Emission requests handed to the target printer.
//!
//! Every request carries the decisions already taken (symbols, selectors,
//! substituted types, body kind) so the printer never resolves anything.

use serde::Serialize;

use defshim_hierarchy::{Block, MethodSignature, Param, TypeId, TypeRef};

use crate::functionalize::FunctionalizedMethod;
use crate::metadata::MethodMetadata;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EmissionRequest {
    /// The single shared function of a default method.
    FunctionDefinition(FunctionalizedMethod),
    MethodDeclaration(MethodDeclaration),
    ShimBody(ShimBody),
    Companion(CompanionArtifact),
    StaticField(StaticFieldRequest),
    /// A class method whose body calls `I.super.m()` or creates lambdas.
    RewrittenMethod(RewrittenMethod),
    ReflectionMetadata(ReflectionMetadata),
}

/// Why a per-type declaration is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclarationOrigin {
    /// Forwarding shim to `source`'s default.
    DefaultShim { source: TypeId },
    /// Abstract signature materialized with a failing body.
    AbstractStub,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDeclaration {
    pub owner: TypeId,
    pub owner_name: String,
    pub selector: String,
    pub signature: MethodSignature,
    pub return_type: TypeRef,
    pub params: Vec<Param>,
    pub origin: DeclarationOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ShimKind {
    /// `function(self, args...)`, returning its result when non-void.
    Forward { function: String, args: Vec<String> },
    /// Signals an undefined-operation failure at runtime.
    UndefinedOperation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShimBody {
    pub owner: TypeId,
    pub owner_name: String,
    pub selector: String,
    pub signature: MethodSignature,
    pub returns_value: bool,
    pub kind: ShimKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanionArtifact {
    pub interface: TypeId,
    pub name: String,
    /// The companion leaves some signature unimplemented, so the target
    /// compiler's conformance-incompleteness diagnostic must be silenced.
    pub suppress_incomplete_conformance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticFieldRequest {
    pub owner: TypeId,
    pub field: String,
    pub ty: TypeRef,
    pub storage_symbol: String,
    pub accessor_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewrittenMethod {
    pub owner: TypeId,
    pub owner_name: String,
    pub signature: MethodSignature,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReflectionMetadata {
    pub owner: TypeId,
    pub owner_name: String,
    pub methods: Vec<MethodMetadata>,
}
