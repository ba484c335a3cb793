use merger_map::{
    AliasRegistry, ColumnResolver, MatchKind, build_index, normalize_text, resolve_columns,
};
use merger_model::{CellValue, Column, Table};
use proptest::prelude::*;

fn registry(entries: &[(&str, &[&str])]) -> AliasRegistry {
    let mut registry = AliasRegistry::new();
    for (standard, aliases) in entries {
        registry.add(*standard, aliases.iter().map(|a| (*a).to_string()).collect());
    }
    registry
}

#[test]
fn every_builtin_alias_resolves_exactly() {
    let registry = AliasRegistry::builtin();
    let index = build_index(&registry);
    for entry in registry.entries() {
        let resolution = resolve_columns(&[entry.standard.as_str()], &index, false);
        assert_eq!(resolution.columns[0].resolved, entry.standard);
        assert_eq!(resolution.columns[0].kind, MatchKind::Exact);
        for alias in &entry.aliases {
            let resolution = resolve_columns(&[alias.as_str()], &index, false);
            assert_eq!(resolution.columns[0].resolved, entry.standard, "alias {alias}");
        }
    }
}

#[test]
fn whitespace_and_case_do_not_block_exact_match() {
    let index = build_index(&AliasRegistry::builtin());
    let resolution = resolve_columns(&["  Unit\nPrice ", "商品 名称"], &index, false);
    assert_eq!(resolution.renamed_labels(), vec!["单价", "商品名称"]);
}

#[test]
fn fuzzy_uses_longest_key() {
    let index = build_index(&registry(&[("数量", &["qty"]), ("销售数量", &["sales qty"])]));
    let resolution = resolve_columns(&["Monthly Sales Qty"], &index, true);
    assert_eq!(resolution.columns[0].resolved, "销售数量");
    assert_eq!(resolution.columns[0].kind, MatchKind::Fuzzy);
}

#[test]
fn repeated_labels_without_mapping() {
    let index = build_index(&AliasRegistry::new());
    let resolution = resolve_columns(&["A", "A", "B"], &index, false);
    assert_eq!(resolution.renamed_labels(), vec!["A", "A_1", "B"]);

    let report = resolution.report();
    let unmapped_a = report
        .iter()
        .filter(|e| e.original == "A" && e.resolved == "A" && e.kind == MatchKind::Unmapped)
        .count();
    assert_eq!(unmapped_a, 2);
}

#[test]
fn later_registry_entry_wins_shared_alias() {
    let index = build_index(&registry(&[("甲", &["共享"]), ("乙", &["共享"])]));
    let resolution = resolve_columns(&["共享"], &index, false);
    assert_eq!(resolution.columns[0].resolved, "乙");
}

#[test]
fn lookup_agrees_with_resolution_for_shared_labels() {
    let registry = registry(&[("甲", &["共享", "丙"]), ("乙", &["共享"]), ("丙", &[])]);
    let index = build_index(&registry);
    for label in ["共享", "丙", "甲"] {
        let resolution = resolve_columns(&[label], &index, false);
        assert_eq!(
            registry.find_standard_name(label),
            resolution.columns[0].resolved,
            "label {label}"
        );
    }
    assert_eq!(registry.find_standard_name("共享"), "乙");
    assert_eq!(registry.find_standard_name("丙"), "丙");
}

#[test]
fn resolve_table_renames_columns() {
    let mut table = Table::from_columns(
        "sheet",
        vec![
            Column::new("qty", vec![CellValue::Integer(1)]),
            Column::new("Quantity", vec![CellValue::Integer(2)]),
            Column::new("备注", vec![CellValue::text("x")]),
        ],
    )
    .unwrap();

    let resolver = ColumnResolver::new(&AliasRegistry::builtin());
    let resolution = resolver.resolve_table(&mut table, false).unwrap();

    assert_eq!(table.column_names(), vec!["数量", "数量_1", "备注"]);
    assert_eq!(resolution.collisions(), 1);
    assert_eq!(resolution.report().count(MatchKind::Unmapped), 1);
}

#[test]
fn report_serializes_to_json() {
    let index = build_index(&AliasRegistry::builtin());
    let report = resolve_columns(&["qty"], &index, false).report();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "entries": [{ "original": "qty", "resolved": "数量", "kind": "exact" }]
        })
    );
}

proptest! {
    #[test]
    fn rendered_names_are_unique(labels in prop::collection::vec("[ab_12]{1,3}", 0..12)) {
        let index = build_index(&AliasRegistry::new());
        let rendered = resolve_columns(labels.as_slice(), &index, false).renamed_labels();
        let mut seen = std::collections::HashSet::new();
        for name in &rendered {
            prop_assert!(seen.insert(name.clone()), "duplicate {}", name);
        }
        prop_assert_eq!(rendered.len(), labels.len());
    }

    #[test]
    fn case_variants_resolve_alike(label in "[a-zA-Z ]{1,12}") {
        let index = build_index(&AliasRegistry::builtin());
        let upper = resolve_columns(&[label.to_uppercase()], &index, true);
        let lower = resolve_columns(&[label.to_lowercase()], &index, true);
        prop_assert_eq!(upper.columns[0].kind, lower.columns[0].kind);
        if upper.columns[0].kind != MatchKind::Unmapped {
            prop_assert_eq!(&upper.columns[0].resolved, &lower.columns[0].resolved);
        }
        prop_assert_eq!(normalize_text(&label.to_uppercase()), normalize_text(&label.to_lowercase()));
    }
}
