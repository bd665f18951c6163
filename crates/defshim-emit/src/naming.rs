// src/naming.rs
//! Target-side selectors and function symbols.

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use defshim_hierarchy::{MethodSignature, TypeDecl, TypeName, TypeRef};

use crate::options::TranslationOptions;

/// Message selector for a signature: `f`, `fWithInt:`, `rWithInt:withA:`.
pub fn selector(sig: &MethodSignature, options: &TranslationOptions) -> String {
    let mut out = sig.name().to_string();
    for (position, param) in sig.params().iter().enumerate() {
        out.push_str(if position == 0 { "With" } else { "with" });
        out.push_str(&type_token(param, options));
        out.push(':');
    }
    out
}

/// The selector with `:` turned into `_`, as used inside C identifiers.
pub fn selector_identifier(sig: &MethodSignature, options: &TranslationOptions) -> String {
    selector(sig, options).replace(':', "_")
}

fn type_token(ty: &TypeRef, options: &TranslationOptions) -> String {
    match ty {
        TypeRef::Void => "Void".to_string(),
        TypeRef::Primitive(p) => capitalize(p.keyword()),
        TypeRef::Named { name, .. } => match options.rename(name) {
            Some(renamed) => renamed.to_string(),
            None => TypeName::parse(name).mangled(),
        },
        TypeRef::Param { .. } => type_token(&ty.erasure(), options),
        TypeRef::Array(elem) => format!("{}Array", type_token(elem, options)),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Storage and accessor symbols of a static field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFieldSymbols {
    pub storage: String,
    pub accessor: String,
}

/// Free-standing symbols a single type contributes to the target namespace.
///
/// Static fields claim their storage and accessor symbols first, then
/// default and static methods claim theirs in declaration order. A symbol
/// that is already taken gets `_` appended until it is unique, so the same
/// declaration always yields the same table.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    functions: FxHashMap<MethodSignature, String>,
    static_fields: FxHashMap<String, StaticFieldSymbols>,
}

impl NameTable {
    pub fn build(decl: &TypeDecl, options: &TranslationOptions) -> Self {
        let prefix = decl.name.mangled();
        let mut claimed = FxHashSet::default();
        let mut table = NameTable::default();

        for field in decl.static_fields() {
            let storage = claim(&mut claimed, format!("{prefix}_{}_", field.name));
            let accessor = claim(&mut claimed, format!("{prefix}_get_{}_", field.name));
            table
                .static_fields
                .insert(field.name.clone(), StaticFieldSymbols { storage, accessor });
        }

        for method in decl.methods.iter().filter(|m| m.is_default() || m.is_static()) {
            let selector = selector_identifier(&method.signature, options);
            let symbol = claim(&mut claimed, format!("{prefix}_{selector}"));
            table.functions.insert(method.signature.clone(), symbol);
        }
        table
    }

    /// Symbol of the function for a default or static method.
    pub fn function(&self, sig: &MethodSignature) -> Option<&str> {
        self.functions.get(sig).map(String::as_str)
    }

    pub fn static_field(&self, name: &str) -> Option<&StaticFieldSymbols> {
        self.static_fields.get(name)
    }
}

fn claim(claimed: &mut FxHashSet<String>, wanted: String) -> String {
    let mut symbol = wanted;
    while claimed.contains(&symbol) {
        debug!("symbol `{}` already taken, disambiguating", symbol);
        symbol.push('_');
    }
    claimed.insert(symbol.clone());
    symbol
}

#[cfg(test)]
mod tests {
    use super::*;
    use defshim_hierarchy::{HierarchyBuilder, MethodSpec, Primitive, TypeBuilder};

    fn int() -> TypeRef {
        TypeRef::Primitive(Primitive::Int)
    }

    #[test]
    fn test_selectors() {
        let options = TranslationOptions::default();
        assert_eq!(selector(&MethodSignature::nullary("f"), &options), "f");
        let r = MethodSignature::new("r", [int(), TypeRef::named("A")]);
        assert_eq!(selector(&r, &options), "rWithInt:withA:");
        assert_eq!(selector_identifier(&r, &options), "rWithInt_withA_");

        let s = MethodSignature::new("underscorePrefix", [TypeRef::named("java.lang.String")]);
        assert_eq!(selector_identifier(&s, &options), "underscorePrefixWithNSString_");

        let g = MethodSignature::new("g", [TypeRef::param("T"), TypeRef::array_of(int())]);
        assert_eq!(selector(&g, &options), "gWithId:withIntArray:");

        let boxed = MethodSignature::new("h", [TypeRef::named("java.lang.Integer")]);
        assert_eq!(selector(&boxed, &options), "hWithJavaLangInteger:");
    }

    #[test]
    fn test_static_field_and_function_do_not_collide() {
        let mut b = HierarchyBuilder::new();
        let p = b
            .add(
                TypeBuilder::interface("P")
                    .method(MethodSpec::default_method("f"))
                    .static_field("f", TypeRef::object()),
            )
            .unwrap();
        let index = b.build().unwrap();
        let table = NameTable::build(index.get(p), &TranslationOptions::default());

        assert_eq!(table.function(&MethodSignature::nullary("f")), Some("P_f"));
        let field = table.static_field("f").unwrap();
        assert_eq!(field.storage, "P_f_");
        assert_eq!(field.accessor, "P_get_f_");
    }

    #[test]
    fn test_clashing_symbols_get_suffixes() {
        let mut b = HierarchyBuilder::new();
        let p = b
            .add(
                TypeBuilder::interface("P")
                    .static_field("g", TypeRef::object())
                    .method(MethodSpec::default_method("g_"))
                    .method(MethodSpec::static_method("get_g_")),
            )
            .unwrap();
        let index = b.build().unwrap();
        let table = NameTable::build(index.get(p), &TranslationOptions::default());

        assert_eq!(table.static_field("g").unwrap().storage, "P_g_");
        assert_eq!(table.function(&MethodSignature::nullary("g_")), Some("P_g__"));
        assert_eq!(table.function(&MethodSignature::nullary("get_g_")), Some("P_get_g__"));
    }
}
