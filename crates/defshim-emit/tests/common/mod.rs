// Shared helpers for translation tests

#![allow(dead_code)]

use defshim_emit::{
    CompilationUnit, EmissionRequest, ShimKind, TranslationOptions, Translator, UnitOutput,
};
use defshim_hierarchy::{
    HierarchyBuilder, HierarchyIndex, MethodSignature, MethodSpec, Primitive, TypeBuilder, TypeId,
    TypeName, TypeRef,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Fixture {
    pub index: HierarchyIndex,
}

impl Fixture {
    pub fn new(types: Vec<TypeBuilder>) -> Self {
        let mut builder = HierarchyBuilder::new();
        for ty in types {
            builder.add(ty).expect("type added");
        }
        Self::from_builder(builder)
    }

    pub fn from_builder(builder: HierarchyBuilder) -> Self {
        Self { index: builder.build().expect("valid hierarchy") }
    }

    pub fn id(&self, name: &str) -> TypeId {
        self.index.lookup(name).unwrap_or_else(|| panic!("no type named {name}"))
    }

    /// Every type in one unit, the way a single source file is translated.
    pub fn single_unit(&self) -> CompilationUnit {
        CompilationUnit::new(TypeName::simple("Test"), self.index.iter().map(|t| t.id).collect())
    }

    pub fn translate(&self) -> UnitOutput {
        self.translate_with(TranslationOptions::default())
    }

    pub fn translate_with(&self, options: TranslationOptions) -> UnitOutput {
        init_logging();
        Translator::new(&self.index, options)
            .translate_unit(&self.single_unit())
            .expect("unit translates")
    }
}

pub fn iface(name: &str) -> TypeBuilder {
    TypeBuilder::interface(name)
}

pub fn class(name: &str) -> TypeBuilder {
    TypeBuilder::class(name)
}

pub fn default_m(name: &str) -> MethodSpec {
    MethodSpec::default_method(name)
}

pub fn abstract_m(name: &str) -> MethodSpec {
    MethodSpec::abstract_method(name)
}

pub fn concrete_m(name: &str) -> MethodSpec {
    MethodSpec::concrete(name)
}

pub fn int() -> TypeRef {
    TypeRef::Primitive(Primitive::Int)
}

pub fn string() -> TypeRef {
    TypeRef::named("java.lang.String")
}

pub fn sig(name: &str) -> MethodSignature {
    MethodSignature::nullary(name)
}

/// Number of emitted declarations with the given selector, across all owners.
pub fn declaration_count(output: &UnitOutput, selector: &str) -> usize {
    output.declarations().filter(|d| d.selector == selector).count()
}

/// Target function the shim of `owner` forwards to, if it has one for `selector`.
pub fn forwarded_by(output: &UnitOutput, owner: &str, selector: &str) -> Option<String> {
    let shim = output.shims().find(|s| s.owner_name == owner && s.selector == selector)?;
    match &shim.kind {
        ShimKind::Forward { function, .. } => Some(function.clone()),
        ShimKind::UndefinedOperation => None,
    }
}

pub fn definition_symbols(output: &UnitOutput) -> Vec<String> {
    output.definitions().map(|f| f.symbol.clone()).collect()
}

/// One line per request, for order-sensitive comparisons.
pub fn summary(output: &UnitOutput) -> String {
    output
        .requests
        .iter()
        .map(|r| match r {
            EmissionRequest::FunctionDefinition(f) => format!("function {}", f.symbol),
            EmissionRequest::MethodDeclaration(d) => {
                format!("declare {}.{}", d.owner_name, d.selector)
            }
            EmissionRequest::ShimBody(s) => match &s.kind {
                ShimKind::Forward { function, .. } => {
                    format!("shim {}.{} -> {}", s.owner_name, s.selector, function)
                }
                ShimKind::UndefinedOperation => format!("stub {}.{}", s.owner_name, s.selector),
            },
            EmissionRequest::Companion(c) => {
                let incomplete =
                    if c.suppress_incomplete_conformance { " (incomplete)" } else { "" };
                format!("companion {}{}", c.name, incomplete)
            }
            EmissionRequest::StaticField(f) => {
                format!("static {} {}", f.storage_symbol, f.accessor_symbol)
            }
            EmissionRequest::RewrittenMethod(m) => {
                format!("rewritten {}.{}", m.owner_name, m.signature)
            }
            EmissionRequest::ReflectionMetadata(m) => format!("metadata {}", m.owner_name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
