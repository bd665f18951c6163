use std::sync::Arc;

use defshim_emit::{
    CompilationUnit, FunctionRegistry, TranslateError, TranslationOptions, Translator,
};
use defshim_hierarchy::{TypeId, TypeName};
use defshim_resolve::ResolveError;
use rustc_hash::FxHashMap;

mod common;
use common::*;

/// Several top-level types that share defaults across unit boundaries.
fn library() -> Fixture {
    Fixture::new(vec![
        iface("Base").method(default_m("hello")).method(abstract_m("name")),
        iface("Named").extends("Base").method(default_m("name")),
        iface("Loud").extends("Base").method(default_m("hello")),
        class("Person").implements("Named"),
        class("Shouter").implements("Loud").method(concrete_m("name")),
        class("Child").extends("Person").implements("Loud"),
        iface("Plain").method(abstract_m("run")),
        class("Runner").implements("Plain").method(concrete_m("run")),
    ])
}

#[test]
fn test_units_per_top_level_type() {
    let fx = Fixture::new(vec![
        class("A"),
        iface("A.P").method(default_m("f")),
        class("A.B"),
        class("A.B.C").implements("A.P"),
        class("A.D"),
        class("Other").implements("A.P"),
    ]);
    let units = CompilationUnit::per_top_level(&fx.index);

    let names: Vec<String> = units.iter().map(|u| u.name.to_string()).collect();
    assert_eq!(names, vec!["A", "Other"]);
    assert_eq!(units[0].types.len(), 5);
    assert!(units[0].owns(fx.id("A.B.C")));
    assert!(!units[0].owns(fx.id("Other")));
}

#[test]
fn test_each_function_defined_once_across_units() {
    init_logging();
    let fx = library();
    let translator = Translator::new(&fx.index, TranslationOptions::default());
    let units = CompilationUnit::per_top_level(&fx.index);
    let outputs: Vec<_> = translator
        .translate_parallel(&units)
        .into_iter()
        .collect::<Result<_, _>>()
        .expect("all units translate");
    assert_eq!(outputs.len(), units.len());

    let mut defined: FxHashMap<String, usize> = FxHashMap::default();
    for out in &outputs {
        for symbol in definition_symbols(out) {
            *defined.entry(symbol).or_default() += 1;
        }
    }
    let mut symbols: Vec<_> = defined.keys().cloned().collect();
    symbols.sort();
    assert_eq!(symbols, vec!["Base_hello", "Loud_hello", "Named_name"]);
    assert!(defined.values().all(|&count| count == 1));

    // Every forwarded-to function is defined somewhere.
    for out in &outputs {
        for shim in out.shims() {
            if let defshim_emit::ShimKind::Forward { function, .. } = &shim.kind {
                assert!(defined.contains_key(function), "{function} is never defined");
            }
        }
    }

    let interned: Vec<String> =
        translator.registry().identities().iter().map(|i| i.symbol.clone()).collect();
    assert_eq!(interned, symbols);
}

#[test]
fn test_parallel_matches_sequential() {
    let fx = library();
    let sequential: Vec<_> = Translator::new(&fx.index, TranslationOptions::default())
        .translate_all()
        .into_iter()
        .map(Result::unwrap)
        .collect();
    let parallel: Vec<_> = Translator::new(&fx.index, TranslationOptions::default())
        .translate_parallel(&CompilationUnit::per_top_level(&fx.index))
        .into_iter()
        .map(Result::unwrap)
        .collect();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_child_picks_more_specific_default() {
    let out = library().translate();
    // Person's shim for hello comes from Base; Loud is more specific for Child.
    assert_eq!(forwarded_by(&out, "Person", "hello").as_deref(), Some("Base_hello"));
    assert_eq!(forwarded_by(&out, "Child", "hello").as_deref(), Some("Loud_hello"));
    assert_eq!(forwarded_by(&out, "Child", "name"), None);
    assert_eq!(forwarded_by(&out, "Shouter", "name"), None);
    assert!(out.companion("Plain").is_none());
}

#[test]
fn test_shared_registry_gives_one_identity() {
    let fx = library();
    let registry = Arc::new(FunctionRegistry::new());
    let options = TranslationOptions::default();
    let first = Translator::with_registry(&fx.index, options.clone(), Arc::clone(&registry));
    let second = Translator::with_registry(&fx.index, options, Arc::clone(&registry));

    let units = CompilationUnit::per_top_level(&fx.index);
    first.translate_unit(&units[0]).unwrap();
    let before = registry.get(fx.id("Base"), &sig("hello")).unwrap();
    second.translate_unit(&units[3]).unwrap();
    let after = registry.get(fx.id("Base"), &sig("hello")).unwrap();

    assert!(Arc::ptr_eq(&before, &after));
    assert!(Arc::ptr_eq(&first.shared_registry(), &second.shared_registry()));
    assert_eq!(before.symbol, "Base_hello");
}

#[test]
fn test_ambiguous_defaults_fail_only_their_unit() {
    let fx = Fixture::new(vec![
        iface("A").method(default_m("f")),
        iface("B").method(default_m("f")),
        class("C").implements("A").implements("B"),
    ]);
    let results = Translator::new(&fx.index, TranslationOptions::default()).translate_all();

    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    match &results[2] {
        Err(TranslateError::Resolve(ResolveError::ResolutionAmbiguity {
            ty,
            signature,
            candidates,
        })) => {
            assert_eq!(ty, "C");
            assert_eq!(signature, "f()");
            assert_eq!(candidates, &vec!["A".to_string(), "B".to_string()]);
        }
        other => panic!("expected an ambiguity, got {other:?}"),
    }
}

#[test]
fn test_concrete_class_without_implementation_fails() {
    let fx = Fixture::new(vec![iface("I").method(abstract_m("f")), class("C").implements("I")]);
    let err = Translator::new(&fx.index, TranslationOptions::default())
        .translate_unit(&fx.single_unit())
        .unwrap_err();
    match err {
        TranslateError::Resolve(ResolveError::UnresolvedAbstractSignature { ty, .. }) => {
            assert_eq!(ty, "C")
        }
        other => panic!("expected an unresolved signature, got {other:?}"),
    }
}

#[test]
fn test_explicit_unit_only_emits_its_types() {
    let fx = library();
    let people = vec![fx.id("Person"), fx.id("Child")];
    let unit = CompilationUnit::new(TypeName::simple("People"), people);
    let translator = Translator::new(&fx.index, TranslationOptions::default());
    let out = translator.translate_unit(&unit).unwrap();

    assert_eq!(out.unit, TypeName::simple("People"));
    assert!(out.definitions().next().is_none());
    assert!(out.companions().next().is_none());
    assert!(out.shims().all(|s| s.owner_name == "Person" || s.owner_name == "Child"));
}

#[test]
fn test_unit_with_foreign_id_fails_cleanly() {
    let fx = library();
    let stray =
        CompilationUnit::new(TypeName::simple("Stray"), vec![fx.id("Person"), TypeId(42)]);
    let translator = Translator::new(&fx.index, TranslationOptions::default());

    let err = translator.translate_unit(&stray).unwrap_err();
    assert!(matches!(err, TranslateError::Resolve(ResolveError::UnknownType { id: TypeId(42) })));
    assert_eq!(err.to_string(), "Type #42 is not part of the hierarchy");

    let mut units = CompilationUnit::per_top_level(&fx.index);
    units.push(stray);
    let results = translator.translate_parallel(&units);
    assert!(results[..results.len() - 1].iter().all(Result::is_ok));
    assert!(results[results.len() - 1].is_err());
}
