//! Client-side merge of backend items with local dex edits

use crate::store::Overrides;
use lzm_common::models::SpeciesRecord;
use std::collections::HashMap;

/// Union backend items with custom entries, then apply override patches
///
/// Records are keyed by name; a later record of the same name replaces an
/// earlier one in place, so custom entries shadow backend items. Nameless
/// records are dropped. A patch only touches the fields it carries, and a
/// patch for a name not in the union is ignored.
pub fn apply_dex_overrides(
    base: &[SpeciesRecord],
    custom: &[SpeciesRecord],
    overrides: &Overrides,
) -> Vec<SpeciesRecord> {
    let mut merged: Vec<SpeciesRecord> = Vec::with_capacity(base.len() + custom.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in base.iter().chain(custom) {
        let Some(name) = record.name() else {
            continue;
        };
        match index.get(name) {
            Some(&i) => merged[i] = record.clone(),
            None => {
                index.insert(name.to_string(), merged.len());
                merged.push(record.clone());
            }
        }
    }

    for (name, patch) in overrides {
        if let Some(&i) = index.get(name.as_str()) {
            merged[i].apply_patch(patch);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn record(v: Value) -> SpeciesRecord {
        SpeciesRecord::from(v)
    }

    fn patch(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_override_changes_only_patched_facet() {
        let base = vec![record(json!({
            "종_한글명": "레오파드 게코", "종류": "Gecko", "사육_난이도_5단계": 1, "식성타입": "곤충식"
        }))];
        let mut overrides = Overrides::new();
        overrides.insert("레오파드 게코".into(), patch(json!({"사육_난이도_5단계": 3})));

        let merged = apply_dex_overrides(&base, &[], &overrides);

        let mut expected = base[0].clone();
        expected.set("사육_난이도_5단계", 3);
        assert_eq!(merged, vec![expected]);
    }

    #[test]
    fn test_custom_entry_shadows_backend_in_place() {
        let base = vec![
            record(json!({"종_한글명": "A", "종류": "backend"})),
            record(json!({"종_한글명": "B"})),
        ];
        let custom = vec![
            record(json!({"종_한글명": "C"})),
            record(json!({"종_한글명": "A", "종류": "local"})),
        ];

        let merged = apply_dex_overrides(&base, &custom, &Overrides::new());
        let names: Vec<&str> = merged.iter().filter_map(|r| r.name()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(merged[0].text("종류"), Some("local"));
    }

    #[test]
    fn test_nameless_records_and_orphan_patches_ignored() {
        let base = vec![record(json!({"종류": "Gecko"})), record(json!({"종_한글명": "A"}))];
        let mut overrides = Overrides::new();
        overrides.insert("missing".into(), patch(json!({"종류": "x"})));

        let merged = apply_dex_overrides(&base, &[], &overrides);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name(), Some("A"));
        assert!(merged[0].get("종류").is_none());
    }

    #[test]
    fn test_override_applies_to_custom_entries() {
        let custom = vec![record(json!({"종_한글명": "가면도마뱀붙이", "사육_요약": "old"}))];
        let mut overrides = Overrides::new();
        overrides.insert("가면도마뱀붙이".into(), patch(json!({"사육_요약": "new"})));

        let merged = apply_dex_overrides(&[], &custom, &overrides);
        assert_eq!(merged[0].text("사육_요약"), Some("new"));
    }
}
