// Shared hierarchy builders for resolution tests

#![allow(dead_code)]

use defshim_hierarchy::{
    HierarchyBuilder, HierarchyIndex, MethodSignature, MethodSpec, TypeBuilder, TypeId,
};

pub struct Fixture {
    pub index: HierarchyIndex,
}

impl Fixture {
    pub fn new(types: Vec<TypeBuilder>) -> Self {
        let mut builder = HierarchyBuilder::new();
        for ty in types {
            builder.add(ty).expect("type added");
        }
        Self { index: builder.build().expect("valid hierarchy") }
    }

    pub fn id(&self, name: &str) -> TypeId {
        self.index.lookup(name).unwrap_or_else(|| panic!("no type named {name}"))
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

pub fn sig(name: &str) -> MethodSignature {
    MethodSignature::nullary(name)
}
