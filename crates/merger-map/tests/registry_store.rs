use std::collections::BTreeMap;
use std::fs;

use merger_map::{
    AliasRegistry, MapError, RegistryOrigin, RegistryStore, build_index, export_template,
};

fn as_sorted(registry: &AliasRegistry) -> BTreeMap<String, Vec<String>> {
    registry
        .entries()
        .iter()
        .map(|e| (e.standard.clone(), e.aliases.clone()))
        .collect()
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = RegistryStore::new(dir.path().join("nested").join("column_mappings.json"));

    let mut registry = AliasRegistry::builtin();
    registry.add("仓库", vec!["warehouse".to_string(), "库房".to_string()]);
    registry.remove("客户");
    store.save(&registry).expect("save registry");

    let loaded = store.load();
    assert_eq!(loaded.origin, RegistryOrigin::File);
    assert!(loaded.warning.is_none());
    assert_eq!(as_sorted(&loaded.registry), as_sorted(&registry));
    assert_eq!(loaded.registry, registry);
}

#[test]
fn missing_document_yields_defaults_without_warning() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = RegistryStore::new(dir.path().join("absent.json"));

    let loaded = store.load();
    assert_eq!(loaded.origin, RegistryOrigin::Default);
    assert!(loaded.warning.is_none());
    assert_eq!(loaded.registry, AliasRegistry::builtin());
}

#[test]
fn malformed_document_yields_defaults_with_warning() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("column_mappings.json");
    fs::write(&path, r#"{"数量": "qty"}"#).expect("write document");

    let loaded = RegistryStore::new(&path).load();
    assert_eq!(loaded.origin, RegistryOrigin::Default);
    assert!(matches!(loaded.warning, Some(MapError::Malformed { .. })));
    assert_eq!(loaded.registry, AliasRegistry::builtin());
}

#[test]
fn non_json_document_yields_defaults_with_warning() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("column_mappings.json");
    fs::write(&path, "not json at all").expect("write document");

    let loaded = RegistryStore::new(&path).load();
    assert!(loaded.warning.is_some());
    assert_eq!(loaded.origin, RegistryOrigin::Default);
}

#[test]
fn save_to_unwritable_location_fails_without_panic() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("file");
    fs::write(&blocker, "x").expect("write blocker");

    // parent is a regular file, so the directory cannot be created
    let store = RegistryStore::new(blocker.join("column_mappings.json"));
    let err = store.save(&AliasRegistry::builtin()).unwrap_err();
    assert!(matches!(err, MapError::Write { .. }));
}

#[test]
fn exported_template_loads_as_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("template.json");
    export_template(&path).expect("export template");

    let loaded = RegistryStore::new(&path).load();
    assert_eq!(loaded.origin, RegistryOrigin::File);
    assert_eq!(loaded.registry, AliasRegistry::builtin());
}

#[test]
fn index_must_be_rebuilt_after_mutation() {
    let mut registry = AliasRegistry::new();
    registry.add("数量", vec!["qty".to_string()]);
    let stale = build_index(&registry);

    registry.add("数量", vec!["pcs".to_string()]);
    assert_eq!(stale.exact("pcs"), None);
    assert_eq!(build_index(&registry).exact("pcs"), Some("数量"));
}
