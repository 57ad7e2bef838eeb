//! Dictionary loading and the algebra of merging dictionaries.

use std::collections::BTreeMap;
use std::io::Write;

use ebl_kernel::dictionary::{RawDictionary, RawDomain, SymbolTable};
use ebl_kernel::DictionaryError;
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,8}"
}

fn names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(name(), 0..5)
}

prop_compose! {
    fn domain()(
        actors in names(),
        verbs in names(),
        entities in names(),
        data_objects in names(),
        relationships in names(),
        grants in prop::collection::btree_map(name(), names(), 0..3),
    ) -> RawDomain {
        RawDomain {
            actors,
            verbs,
            entities,
            data_objects,
            relationships,
            actor_verbs: grants,
            ..RawDomain::default()
        }
    }
}

prop_compose! {
    fn dictionary()(
        domains in prop::collection::btree_map(name(), domain(), 0..3),
        relationship_types in names(),
    ) -> RawDictionary {
        let mut raw = RawDictionary::default();
        raw.core.relationship_types = relationship_types;
        raw.domains = domains.into_iter().map(|(k, v)| (k, Some(v))).collect::<BTreeMap<_, _>>();
        raw
    }
}

proptest! {
    #[test]
    fn adding_a_dictionary_never_removes_symbols(base in dictionary(), extra in dictionary()) {
        let before = SymbolTable::compile(&base);
        let after = SymbolTable::compile_all(&[base.clone(), extra]);

        for (_, domain) in base.domains() {
            for actor in &domain.actors {
                prop_assert!(!before.has_actor(actor) || after.has_actor(actor));
            }
            for verb in &domain.verbs {
                prop_assert!(!before.has_verb(verb) || after.has_verb(verb));
            }
            for entity in &domain.entities {
                prop_assert!(!before.has_entity(entity) || after.has_entity(entity));
            }
            for data_object in &domain.data_objects {
                prop_assert!(!before.has_data_object(data_object) || after.has_data_object(data_object));
            }
            for ty in &domain.relationships {
                prop_assert!(before.is_relationship_type(ty));
                prop_assert!(after.is_relationship_type(ty));
            }
        }
        for ty in &base.core.relationship_types {
            prop_assert!(!before.is_relationship_type(ty) || after.is_relationship_type(ty));
        }
    }

    #[test]
    fn core_and_domain_relationship_types_both_count(raw in dictionary()) {
        let table = SymbolTable::compile(&raw);
        for ty in &raw.core.relationship_types {
            prop_assert!(table.is_relationship_type(ty));
        }
        for (_, domain) in raw.domains() {
            for ty in &domain.relationships {
                prop_assert!(table.is_relationship_type(ty));
            }
        }
    }

    #[test]
    fn merge_order_does_not_matter(a in dictionary(), b in dictionary()) {
        let ab = SymbolTable::compile_all(&[a.clone(), b.clone()]);
        let ba = SymbolTable::compile_all(&[b, a]);
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn unlisted_actor_is_unrestricted(raw in dictionary(), verb in name()) {
        let table = SymbolTable::compile(&raw);
        prop_assert!(table.actor_allows_verb("NoSuchActor_0000000000", &verb));
    }

    #[test]
    fn listed_verbs_are_allowed(raw in dictionary()) {
        let table = SymbolTable::compile(&raw);
        for (_, domain) in raw.domains() {
            for (actor, verbs) in &domain.actor_verbs {
                for verb in verbs {
                    prop_assert!(table.actor_allows_verb(actor, verb));
                    prop_assert!(table.is_permitted_by_any_actor(verb));
                }
            }
        }
    }
}

#[test]
fn loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"{{ "domains": {{ "ops": {{ "actors": ["Operator"], "verbs": ["Restart"] }} }} }}"#
    )
    .expect("write dictionary");

    let table = SymbolTable::from_paths(&[file.path()]).expect("loads");
    assert!(table.has_actor("operator"));
    assert!(table.has_verb("RESTART"));
}

#[test]
fn several_files_merge() {
    let dir = tempfile::tempdir().expect("temp dir");
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    std::fs::write(&a, r#"{ "domains": { "a": { "actors": ["Teller"] } } }"#).expect("write a");
    std::fs::write(&b, r#"{ "domains": { "b": { "actors": ["Auditor"] } } }"#).expect("write b");

    let table = SymbolTable::from_paths(&[a, b]).expect("loads");
    assert!(table.has_actor("Teller"));
    assert!(table.has_actor("Auditor"));
}

#[test]
fn malformed_file_names_its_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"domains\": ").expect("write");

    let err = SymbolTable::from_paths(&[&path]).expect_err("malformed");
    assert!(matches!(err, DictionaryError::Json { .. }));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = SymbolTable::from_paths(&[dir.path().join("absent.json")]).expect_err("missing");
    assert!(matches!(err, DictionaryError::Io { .. }));
}
