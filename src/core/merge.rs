//! Override merge engine.
//!
//! A user override for a module slot is merged over the author's module:
//! imports append, exports replace per key. The author's entries stay
//! reachable through an alias module so override files can compose with
//! the originals without importing themselves.

use std::collections::HashSet;

use camino::Utf8Path;
use indexmap::IndexSet;
use serde_json::Value;
use tracing::debug;

use crate::{
    core::{
        module::{ResolvedModuleObject, classify_module_spec, resolve_module_object, to_module_object},
        resolver::{LoadParams, VirtualContent},
        virtual_module::VirtualModule,
    },
    error::ThemeResult,
    infra::path::SlashUtils,
};

/// Merge `over` onto `author`. Imports are appended then de-duplicated,
/// exports are replaced per key; new keys are appended.
pub fn merge_module_objects(
    author: &ResolvedModuleObject,
    over: &ResolvedModuleObject,
) -> ResolvedModuleObject
{
    let imports: IndexSet<String> = author
        .imports
        .iter()
        .chain(over.imports.iter())
        .cloned()
        .collect();

    let mut exports = author
        .exports
        .clone();
    for (name, path) in &over.exports
    {
        exports.insert(name.clone(), path.clone());
    }

    ResolvedModuleObject {
        root: author
            .root
            .clone(),
        imports: imports
            .into_iter()
            .collect(),
        exports,
    }
}

/// Specifiers for one module slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNames
{
    /// Option key, e.g. `components`
    pub slot: String,

    /// `theme/slot`: what consumers import
    pub resolved: String,

    /// `theme:slot`: the author's entries, never overridden
    pub alias: String,
}

impl ModuleNames
{
    pub fn new(
        theme: &str,
        slot: &str,
    ) -> Self
    {
        Self {
            slot: slot.to_string(),
            resolved: format!("{theme}/{slot}"),
            alias: format!("{theme}:{slot}"),
        }
    }
}

/// One module slot after override application.
#[derive(Debug)]
pub struct MergedModule
{
    pub names: ModuleNames,

    /// Author entries under the consumer-facing name
    pub authored: VirtualModule,

    /// Author entries under the alias name
    pub alias: VirtualModule,

    /// The non-empty override, resolved against the project root
    pub overrides: Option<VirtualModule>,

    /// What consumers receive
    pub resolved: VirtualModule,
}

/// Applies a raw user override to an author module.
pub struct ModuleOverride;

impl ModuleOverride
{
    /// Resolve `override_spec` against `project_root` and merge it onto
    /// `author`. A missing or empty override leaves the module untouched.
    pub fn apply(
        names: ModuleNames,
        author: ResolvedModuleObject,
        override_spec: Option<&Value>,
        project_root: &Utf8Path,
    ) -> ThemeResult<MergedModule>
    {
        let overrides = match override_spec.and_then(classify_module_spec)
        {
            Some(spec) =>
            {
                let object = to_module_object(spec, project_root)?;
                Some(resolve_module_object(project_root, &object)).filter(|o| !o.is_empty())
            }
            None => None,
        };

        let resolved = match &overrides
        {
            Some(over) =>
            {
                debug!(
                    module = %names.resolved,
                    imports = over.imports.len(),
                    exports = over.exports.len(),
                    "applying user override"
                );
                merge_module_objects(&author, over)
            }
            None => author.clone(),
        };

        Ok(MergedModule {
            authored: VirtualModule::new(names.resolved.clone(), author.clone()),
            alias: VirtualModule::new(names.alias.clone(), author),
            overrides: overrides.map(|over| VirtualModule::new(names.resolved.clone(), over)),
            resolved: VirtualModule::new(names.resolved.clone(), resolved),
            names,
        })
    }
}

impl MergedModule
{
    /// True when an override changed anything
    pub fn is_overridden(&self) -> bool
    {
        self.overrides
            .is_some()
    }

    /// Content served for the consumer-facing id.
    ///
    /// Without an override, or when the merged module exports nothing, the
    /// merged content is static. Otherwise the answer depends on the
    /// importer: a file that is itself one of the merged exports receives the
    /// author's content, so an override can import the module it overrides.
    pub fn served_content(&self) -> VirtualContent
    {
        let merged = self
            .resolved
            .content()
            .to_string();

        if !self.is_overridden()
            || self
                .resolved
                .module()
                .exports
                .is_empty()
        {
            return VirtualContent::Static(merged);
        }

        let original = self
            .authored
            .content()
            .to_string();
        let export_paths: HashSet<String> = self
            .resolved
            .module()
            .exports
            .values()
            .cloned()
            .collect();

        VirtualContent::Dynamic(Box::new(move |params: &LoadParams| {
            let from_export = params
                .importer
                .as_deref()
                .map(importer_path)
                .is_some_and(|importer| export_paths.contains(&importer));

            if from_export { Some(original.clone()) } else { Some(merged.clone()) }
        }))
    }

    /// Content served for the alias id
    pub fn alias_content(&self) -> VirtualContent
    {
        VirtualContent::Static(
            self.alias
                .content()
                .to_string(),
        )
    }
}

/// Importer ids may carry a query (`Card.astro?astro&type=script`) or
/// backslashes; compare on the bare, slash-normalized path.
fn importer_path(importer: &str) -> String
{
    let bare = importer
        .split_once('?')
        .map_or(importer, |(path, _)| path);

    SlashUtils::normalize(bare)
}
