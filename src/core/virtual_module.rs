//! Virtual module synthesizer.
//!
//! Turns a resolved module object into importable module source and the
//! matching declaration fragments. Content, module types and interface types
//! all enumerate exports through [`VirtualModule::typed_exports`], so the
//! three always agree on names and order.

use std::sync::OnceLock;

use serde_json::Value;

use crate::{core::module::ResolvedModuleObject, infra::path::ExtUtils};

/// Type expression used for recognised image exports
pub const IMAGE_TYPE: &str = r#"import("astro").ImageMetadata"#;

/// A named, resolved module with memoized generated text.
#[derive(Debug, Clone)]
pub struct VirtualModule
{
    name: String,
    module: ResolvedModuleObject,
    content: OnceLock<String>,
    module_types: OnceLock<String>,
    interface_types: OnceLock<String>,
}

/// One export as it appears in generated code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedExport<'a>
{
    pub name: &'a str,
    pub path: &'a str,
    pub type_expr: String,
}

/// Borrowed view over the declaration fragments of a module
pub struct ModuleTypes<'a>
{
    module: &'a VirtualModule,
}

impl VirtualModule
{
    pub fn new(
        name: impl Into<String>,
        module: ResolvedModuleObject,
    ) -> Self
    {
        Self {
            name: name.into(),
            module,
            content: OnceLock::new(),
            module_types: OnceLock::new(),
            interface_types: OnceLock::new(),
        }
    }

    /// The synthetic import specifier
    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn module(&self) -> &ResolvedModuleObject
    {
        &self.module
    }

    /// Exports that produce a binding, in declaration order. Stylesheet
    /// paths are side effects only and never become a named export.
    pub fn typed_exports(&self) -> impl Iterator<Item = TypedExport<'_>>
    {
        self.module
            .exports
            .iter()
            .filter(|(_, path)| !path.is_empty() && !ExtUtils::is_style(path))
            .map(|(name, path)| TypedExport { name, path, type_expr: type_expression(path) })
    }

    /// Runnable module source: side-effect imports, then re-exports.
    pub fn content(&self) -> &str
    {
        self.content
            .get_or_init(|| {
                let mut lines: Vec<String> = self
                    .module
                    .imports
                    .iter()
                    .map(|path| format!("import {};", quote(path)))
                    .collect();

                for export in self.typed_exports()
                {
                    if export.name == "default"
                    {
                        lines.push(format!("export {{ default }} from {};", quote(export.path)));
                        continue;
                    }

                    lines.push(format!(
                        "export {{ default as {} }} from {};",
                        export.name,
                        quote(export.path)
                    ));
                }

                join_lines(lines)
            })
    }

    /// Declaration fragments for this module
    pub fn types(&self) -> ModuleTypes<'_>
    {
        ModuleTypes { module: self }
    }
}

impl<'a> ModuleTypes<'a>
{
    /// Body of `declare module "<name>" { ... }`
    pub fn module(&self) -> &'a str
    {
        let module = self.module;

        module
            .module_types
            .get_or_init(|| {
                let mut lines = Vec::new();

                for export in module.typed_exports()
                {
                    if export.name == "default"
                    {
                        lines.push(format!("const _default: {};", export.type_expr));
                        lines.push("export default _default;".to_string());
                        continue;
                    }

                    lines.push(format!("export const {}: {};", export.name, export.type_expr));
                }

                join_lines(lines)
            })
    }

    /// Body of the module's entry inside a registry interface
    pub fn interface(&self) -> &'a str
    {
        let module = self.module;

        module
            .interface_types
            .get_or_init(|| {
                join_lines(
                    module
                        .typed_exports()
                        .map(|export| format!("{}: {};", export.name, export.type_expr))
                        .collect(),
                )
            })
    }
}

/// Image files are typed as image metadata, everything else as the
/// default export of the file itself
fn type_expression(path: &str) -> String
{
    if ExtUtils::is_image(path)
    {
        return IMAGE_TYPE.to_string();
    }

    format!("typeof import({}).default", quote(path))
}

/// JSON string literal, valid as a JS/TS string literal
pub fn quote(text: &str) -> String
{
    Value::String(text.to_string()).to_string()
}

fn join_lines(lines: Vec<String>) -> String
{
    if lines.is_empty()
    {
        return String::new();
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
