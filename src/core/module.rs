//! Module object model: raw author/user module options, their canonical
//! `{ imports, exports }` form, and the resolved form with absolute paths.
//!
//! Raw options arrive as loosely typed JSON values (from a TOML manifest or
//! straight from code). [`classify_module_spec`] is the single place where
//! their shape is inspected; everything downstream works on [`ModuleSpec`].

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;

use crate::{
    core::glob::glob_to_module_object,
    error::ThemeResult,
    infra::path::{NameUtils, PathUtils},
};

/// A classified module option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSpec
{
    /// One or more globs expanded against a directory
    Glob(Vec<String>),

    /// Side-effect imports, in declaration order
    Imports(Vec<String>),

    /// Export name to path; `None` means "no export by this name"
    Exports(IndexMap<String, Option<String>>),

    /// Both halves spelled out
    Object
    {
        imports: Vec<String>,
        exports: IndexMap<String, Option<String>>,
    },
}

/// Canonical, unresolved module object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleObject
{
    pub imports: Vec<String>,
    pub exports: IndexMap<String, Option<String>>,
}

/// Module object with every path resolved against `root`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedModuleObject
{
    /// Base directory relative entries were resolved against
    pub root: Utf8PathBuf,

    /// Absolute (or package) ids, de-duplicated, first occurrence kept
    pub imports: Vec<String>,

    /// camelCase export name to absolute (or package) id
    pub exports: IndexMap<String, String>,
}

/// Classify a raw option value. Returns `None` for values that declare
/// nothing (`false`, `null`, `""`, `true`, numbers).
pub fn classify_module_spec(value: &Value) -> Option<ModuleSpec>
{
    match value
    {
        Value::String(glob) if !glob.is_empty() => Some(ModuleSpec::Glob(vec![glob.clone()])),
        Value::Array(items) => Some(ModuleSpec::Imports(flatten_imports(items))),
        Value::Object(map) if map.contains_key("imports") || map.contains_key("exports") =>
        {
            let imports = match map.get("imports")
            {
                Some(Value::Array(items)) => flatten_imports(items),
                Some(Value::String(single)) if !single.is_empty() => vec![single.clone()],
                _ => Vec::new(),
            };

            let exports = match map.get("exports")
            {
                Some(Value::Object(exports)) => export_entries(exports.iter()),
                Some(_) => IndexMap::new(),
                // Remaining keys are the export map: `{ imports, Layout }`
                None => export_entries(
                    map.iter()
                        .filter(|(key, _)| key.as_str() != "imports"),
                ),
            };

            Some(ModuleSpec::Object { imports, exports })
        }
        Value::Object(map) => Some(ModuleSpec::Exports(export_entries(map.iter()))),
        _ => None,
    }
}

/// Flatten nested import arrays in order, dropping falsy and non-string
/// entries.
fn flatten_imports(items: &[Value]) -> Vec<String>
{
    let mut out = Vec::new();

    for item in items
    {
        match item
        {
            Value::String(path) if !path.is_empty() => out.push(path.clone()),
            Value::Array(nested) => out.extend(flatten_imports(nested)),
            _ =>
            {}
        }
    }

    out
}

fn export_entries<'a>(entries: impl Iterator<Item = (&'a String, &'a Value)>) -> IndexMap<String, Option<String>>
{
    entries
        .map(|(name, value)| {
            let path = match value
            {
                Value::String(path) if !path.is_empty() => Some(path.clone()),
                _ => None,
            };
            (name.clone(), path)
        })
        .collect()
}

/// Convert any spec into the canonical object. Globs are compiled against
/// `glob_root`; the other shapes convert without loss.
pub fn to_module_object(
    spec: ModuleSpec,
    glob_root: &Utf8Path,
) -> ThemeResult<ModuleObject>
{
    Ok(match spec
    {
        ModuleSpec::Glob(globs) => glob_to_module_object(glob_root, &globs)?,
        ModuleSpec::Imports(imports) => ModuleObject { imports, exports: IndexMap::new() },
        ModuleSpec::Exports(exports) => ModuleObject { imports: Vec::new(), exports },
        ModuleSpec::Object { imports, exports } => ModuleObject { imports, exports },
    })
}

/// Resolve every entry of `module` against `root`.
pub fn resolve_module_object(
    root: &Utf8Path,
    module: &ModuleObject,
) -> ResolvedModuleObject
{
    let imports: IndexSet<String> = module
        .imports
        .iter()
        .filter(|id| !id.is_empty())
        .map(|id| PathUtils::resolve_id(root, id))
        .collect();

    let mut exports = IndexMap::new();
    for (name, id) in &module.exports
    {
        let Some(id) = id.as_deref().filter(|id| !id.is_empty())
        else
        {
            continue;
        };

        exports.insert(NameUtils::camel_case(name), PathUtils::resolve_id(root, id));
    }

    ResolvedModuleObject {
        root: root.to_path_buf(),
        imports: imports
            .into_iter()
            .collect(),
        exports,
    }
}

impl ResolvedModuleObject
{
    /// Nothing to import and nothing to export
    pub fn is_empty(&self) -> bool
    {
        self.imports
            .is_empty()
            && self
                .exports
                .is_empty()
    }

    /// Look up an export by its raw (unfolded) name
    pub fn export(
        &self,
        raw_name: &str,
    ) -> Option<&str>
    {
        self.exports
            .get(&NameUtils::camel_case(raw_name))
            .map(String::as_str)
    }
}
