//! Property tests for module canonicalisation, path resolution and
//! route pattern shapes.

use camino::Utf8Path;
use indexmap::IndexMap;
use proptest::prelude::*;
use serde_json::{Map, Value};
use theme_provider::{
    core::{
        module::{ModuleObject, classify_module_spec, resolve_module_object, to_module_object},
        routes::normalize_page_override,
    },
    infra::path::{NameUtils, PathUtils, PatternUtils},
};

const ROOT: &str = "/srv/theme";

fn segment() -> impl Strategy<Value = String>
{
    "[a-z][a-z0-9]{0,7}"
}

fn relative_path() -> impl Strategy<Value = String>
{
    prop::collection::vec(segment(), 1..4).prop_map(|parts| format!("./{}.astro", parts.join("/")))
}

fn export_name() -> impl Strategy<Value = String>
{
    // Already camelCase, so the fold leaves it alone
    "[a-z][a-zA-Z0-9]{0,7}".prop_filter("reserved keys", |n| n != "imports" && n != "exports")
}

proptest! {
    #[test]
    fn import_arrays_canonicalise_to_imports(paths in prop::collection::vec(relative_path(), 0..6)) {
        let value = Value::Array(paths.iter().cloned().map(Value::String).collect());
        let spec = classify_module_spec(&value).expect("arrays always classify");
        let object = to_module_object(spec, Utf8Path::new(ROOT)).expect("no globs involved");

        prop_assert_eq!(object, ModuleObject { imports: paths, exports: IndexMap::new() });
    }

    #[test]
    fn plain_records_canonicalise_to_exports(entries in prop::collection::btree_map(export_name(), relative_path(), 1..6)) {
        let map: Map<String, Value> = entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        let spec = classify_module_spec(&Value::Object(map)).expect("records classify");
        let object = to_module_object(spec, Utf8Path::new(ROOT)).expect("no globs involved");

        prop_assert!(object.imports.is_empty());
        prop_assert_eq!(object.exports.len(), entries.len());
        for (name, path) in &entries {
            prop_assert_eq!(object.exports[name].as_deref(), Some(path.as_str()));
        }
    }

    #[test]
    fn relative_entries_resolve_to_absolute(
        imports in prop::collection::vec(relative_path(), 0..5),
        exports in prop::collection::btree_map(export_name(), relative_path(), 0..5),
    ) {
        let object = ModuleObject {
            imports,
            exports: exports.into_iter().map(|(k, v)| (k, Some(v))).collect(),
        };
        let resolved = resolve_module_object(Utf8Path::new(ROOT), &object);

        for path in resolved.imports.iter().chain(resolved.exports.values()) {
            prop_assert!(PathUtils::is_absolute_id(path), "{} is not absolute", path);
            prop_assert!(path.starts_with(ROOT));
        }
    }

    #[test]
    fn package_ids_pass_through(name in "[a-z][a-z0-9-]{0,10}", file in segment()) {
        let id = format!("@scope/{name}/{file}.js");
        prop_assert_eq!(PathUtils::resolve_id(Utf8Path::new(ROOT), &id), id);
    }

    #[test]
    fn duplicate_imports_collapse(path in relative_path()) {
        let object = ModuleObject {
            imports: vec![path.clone(), format!("./x/..{}", &path[1..]), path],
            exports: IndexMap::new(),
        };
        let resolved = resolve_module_object(Utf8Path::new(ROOT), &object);

        prop_assert_eq!(resolved.imports.len(), 1);
    }

    #[test]
    fn renaming_static_segments_keeps_shape(
        old in prop::collection::vec(segment(), 1..4),
        new in prop::collection::vec(segment(), 1..4),
        param in segment(),
    ) {
        let old_pattern = format!("/{}/[{param}]", old.join("-"));
        let new_pattern = format!("{}/[{param}]/", new.join("_"));

        let normalized = normalize_page_override(&old_pattern, &new_pattern).expect("same shape");
        prop_assert!(normalized.starts_with('/'));
        prop_assert!(!normalized.ends_with('/'));
        prop_assert!(PatternUtils::validate_pattern(&normalized, &old_pattern));
    }

    #[test]
    fn dropping_a_param_is_rejected(prefix in segment(), param in segment()) {
        let old_pattern = format!("/{prefix}/[{param}]");
        let new_pattern = format!("/{prefix}");
        prop_assert!(normalize_page_override(&old_pattern, &new_pattern).is_err());
    }

    #[test]
    fn single_hyphen_names_fold_to_stable_identifiers(name in "[a-z]{1,5}(-[a-z]{1,5}){0,3}") {
        let once = NameUtils::camel_case(&name);
        prop_assert!(!once.contains('-'));
        prop_assert_eq!(NameUtils::camel_case(&once), once.clone());
    }
}
