use std::io::Write;

use defshim_emit::{TranslateError, TranslationOptions};
use tempfile::NamedTempFile;

mod common;
use common::*;

#[test]
fn test_options_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
strip_reflection = true
shim_param_prefix = "p"

[type_renames]
"java.lang.String" = "JString"
"#
    )
    .unwrap();

    let options = TranslationOptions::from_file(file.path()).unwrap();
    assert!(options.strip_reflection);
    assert_eq!(options.receiver_name, "self");
    assert_eq!(options.shim_param_prefix, "p");
    assert_eq!(options.type_renames.len(), 1);

    let fx = Fixture::new(vec![
        iface("A").method(default_m("f").param("s", string())),
        class("B").implements("A"),
    ]);
    let out = fx.translate_with(options);
    let declaration = out.declarations().find(|d| d.owner_name == "B").unwrap();
    assert_eq!(declaration.selector, "fWithJString:");
    assert_eq!(declaration.params[0].name, "p0");
    assert_eq!(out.metadata().count(), 0);
}

#[test]
fn test_missing_options_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    match TranslationOptions::from_file(&path) {
        Err(TranslateError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an io error, got {other:?}"),
    }
}

#[test]
fn test_malformed_options_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "strip_reflection = \"yes\"").unwrap();
    assert!(matches!(
        TranslationOptions::from_file(file.path()),
        Err(TranslateError::Options { .. })
    ));
}
