//! Filepath: src/core/theme.rs
//! One configuration pass for a theme.
//!
//! [`Theme::new`] resolves the author's directories once. [`Theme::build`]
//! runs a pass for one user/project pairing in a fixed order:
//! config validation, package warnings, integrations, middleware, modules
//! (author option order), pages, resolver, declarations. All pass state
//! lives in a [`PassState`] owned by that call; passes share nothing.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::{
    core::{
        dts::{DtsBuffer, LineBuffer},
        integrations::{IntegrationsOutcome, resolve_integrations},
        merge::{MergedModule, ModuleNames, ModuleOverride},
        middleware::{MiddlewareEntry, discover_middleware},
        module::{classify_module_spec, resolve_module_object, to_module_object},
        package::{ThemePackage, validate_theme_name},
        resolver::{VirtualContent, VirtualResolver},
        routes::{InjectedRoute, PageOverrideOutcome, apply_page_overrides, discover_pages},
        schema::{AnySchema, ConfigSchema, ObjectSchema},
        virtual_module::{VirtualModule, quote},
    },
    error::{ThemeError, ThemeResult},
    infra::path::{IMAGE_FORMATS, PathUtils, STYLE_FORMATS, UI_FRAMEWORK_FORMATS},
};

/// Module option names owned by built-in virtual modules
pub const RESERVED_MODULE_NAMES: &[&str] =
    &["config", "pages", "public", "content", "db", "context", "collections", "integrations"];

/// Registry interfaces written to the declaration file
pub mod interfaces
{
    pub const MODULES_AUTHORED: &str = "ThemeModulesAuthored";
    pub const MODULES_OVERRIDES: &str = "ThemeModulesOverrides";
    pub const MODULES_RESOLVED: &str = "ThemeModulesResolved";
    pub const ROUTES_AUTHORED: &str = "ThemeRoutesAuthored";
    pub const ROUTES_OVERRIDES: &str = "ThemeRoutesOverrides";
    pub const ROUTES_RESOLVED: &str = "ThemeRoutesResolved";
    pub const INTEGRATIONS: &str = "ThemeIntegrations";
    pub const INTEGRATIONS_RESOLVED: &str = "ThemeIntegrationsResolved";
}

/// Namespace holding the per-theme registries
pub const TYPES_NAMESPACE: &str = "AstroThemeProvider";

/// Author-side options, usually read from `theme.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorOptions
{
    /// Package name of the theme (npm naming rules)
    pub name: String,

    /// The theme's entry file; its directory is the theme root
    pub entrypoint: Utf8PathBuf,

    /// Source directory, relative to the theme root
    #[serde(default = "defaults::src_dir")]
    pub src_dir: String,

    /// Page directory, relative to the source directory
    #[serde(default = "defaults::page_dir")]
    pub page_dir: String,

    /// Static files, relative to the theme root; `false` disables
    #[serde(default = "defaults::public_dir", deserialize_with = "dir_or_false")]
    pub public_dir: Option<String>,

    /// Middleware search directory, relative to the source directory
    #[serde(default = "defaults::middleware_dir", deserialize_with = "dir_or_false")]
    pub middleware_dir: Option<String>,

    /// Emit advisory warnings
    #[serde(default = "defaults::log")]
    pub log: bool,

    /// Module options by slot name, merged over the default modules
    #[serde(default)]
    pub imports: IndexMap<String, Value>,

    /// Integrations the theme injects, by name
    #[serde(default)]
    pub integrations: Vec<String>,

    /// Declarative schema for the user's `config`
    #[serde(default)]
    pub schema: Option<ObjectSchema>,
}

mod defaults
{
    pub fn src_dir() -> String
    {
        "src".into()
    }

    pub fn page_dir() -> String
    {
        "pages".into()
    }

    pub fn public_dir() -> Option<String>
    {
        Some("public".into())
    }

    pub fn middleware_dir() -> Option<String>
    {
        Some("./".into())
    }

    pub fn log() -> bool
    {
        true
    }
}

/// Accept a directory string, or `false`/empty to disable
fn dir_or_false<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DirOption
    {
        Dir(String),
        Toggle(bool),
    }

    match DirOption::deserialize(deserializer)?
    {
        DirOption::Dir(dir) if !dir.is_empty() => Ok(Some(dir)),
        DirOption::Dir(_) | DirOption::Toggle(false) => Ok(None),
        DirOption::Toggle(true) => Err(serde::de::Error::custom("expected a directory or `false`")),
    }
}

/// Modules every theme gets unless the author replaces them
pub fn default_imports() -> IndexMap<String, Value>
{
    let braces = |formats: &[&str]| formats.join(",");

    IndexMap::from([
        ("assets".to_string(), Value::String(format!("assets/**.{{{}}}", braces(IMAGE_FORMATS)))),
        (
            "components".to_string(),
            Value::String(format!("components/**.{{astro,{}}}", braces(UI_FRAMEWORK_FORMATS))),
        ),
        ("layouts".to_string(), Value::String("layouts/**.astro".to_string())),
        ("styles".to_string(), Value::String(format!("styles/**.{{{}}}", braces(STYLE_FORMATS)))),
    ])
}

/// Consumer-side options for one theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserOptions
{
    /// Raw configuration, validated by the theme's schema
    #[serde(default = "empty_object")]
    pub config: Value,

    /// Author pattern to `false` (remove) or a replacement pattern
    #[serde(default)]
    pub pages: IndexMap<String, Value>,

    /// Module slot to an override module spec
    #[serde(default)]
    pub overrides: IndexMap<String, Value>,

    /// Integration name to enabled
    #[serde(default)]
    pub integrations: IndexMap<String, bool>,
}

fn empty_object() -> Value
{
    Value::Object(Map::new())
}

impl Default for UserOptions
{
    fn default() -> Self
    {
        Self {
            config: empty_object(),
            pages: IndexMap::new(),
            overrides: IndexMap::new(),
            integrations: IndexMap::new(),
        }
    }
}

/// What the host project contributes to a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext
{
    /// Project root; user overrides resolve against it
    pub root: Utf8PathBuf,

    /// Integrations already configured in the project
    pub integrations: Vec<String>,
}

/// Summary of one virtual module slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary
{
    pub slot: String,
    pub id: String,
    pub alias: String,
    pub imports: usize,
    pub exports: Vec<String>,
    pub overridden: bool,
}

/// Everything one pass hands back to the host.
#[derive(Debug)]
pub struct ThemeBuild
{
    pub name: String,
    pub config: Value,
    pub resolver: VirtualResolver,
    pub routes: Vec<InjectedRoute>,
    pub pages: PageOverrideOutcome,
    pub middleware: Vec<MiddlewareEntry>,
    pub integrations: IntegrationsOutcome,
    /// Only set when the directory exists
    pub public_dir: Option<Utf8PathBuf>,
    pub watch_dirs: Vec<Utf8PathBuf>,
    pub modules: Vec<ModuleSummary>,
    pub dts: String,
}

impl ThemeBuild
{
    /// File name for the declaration text; scope separators are flattened
    pub fn dts_file_name(&self) -> String
    {
        let flat = self
            .name
            .trim_start_matches('@')
            .replace('/', "-");
        format!("{flat}.d.ts")
    }
}

/// A theme with its directories resolved.
pub struct Theme
{
    name: String,
    entrypoint: Utf8PathBuf,
    root: Utf8PathBuf,
    src_dir: Utf8PathBuf,
    page_dir: Utf8PathBuf,
    public_dir: Option<Utf8PathBuf>,
    middleware_dir: Option<Utf8PathBuf>,
    log: bool,
    imports: IndexMap<String, Value>,
    integrations: Vec<String>,
    package: Option<ThemePackage>,
    schema: Box<dyn ConfigSchema>,
}

impl Theme
{
    /// Validate the name and resolve the theme's directories. The source
    /// directory must exist; pages, public and middleware may be absent.
    #[instrument(skip_all, fields(theme = %options.name))]
    pub fn new(options: AuthorOptions) -> ThemeResult<Self>
    {
        validate_theme_name(&options.name)?;

        let cwd = Utf8Path::new("./");
        let entrypoint = PathUtils::resolve_filepath(cwd, options.entrypoint.as_str(), true)?;
        let root = PathUtils::resolve_directory(&entrypoint, "./", true)?;
        let src_dir = PathUtils::resolve_directory(&root, &options.src_dir, true)?;
        let page_dir = PathUtils::resolve_directory(&src_dir, &options.page_dir, false)?;

        let public_dir = options
            .public_dir
            .as_deref()
            .map(|dir| PathUtils::resolve_directory(&root, dir, false))
            .transpose()?;
        let middleware_dir = options
            .middleware_dir
            .as_deref()
            .map(|dir| PathUtils::resolve_directory(&src_dir, dir, false))
            .transpose()?;

        let package = ThemePackage::read(&root)?;
        if package.is_none() && options.log
        {
            warn!(root = %root, "theme has no package.json");
        }

        let mut imports = default_imports();
        for (slot, option) in options.imports
        {
            imports.insert(slot, option);
        }

        let schema: Box<dyn ConfigSchema> = match options.schema
        {
            Some(schema) => Box::new(schema),
            None => Box::new(AnySchema),
        };

        debug!(root = %root, src = %src_dir, "resolved theme");

        Ok(Self {
            name: options.name,
            entrypoint,
            root,
            src_dir,
            page_dir,
            public_dir,
            middleware_dir,
            log: options.log,
            imports,
            integrations: options.integrations,
            package,
            schema,
        })
    }

    /// Replace the config validator
    pub fn with_schema(
        mut self,
        schema: impl ConfigSchema + 'static,
    ) -> Self
    {
        self.schema = Box::new(schema);
        self
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn root(&self) -> &Utf8Path
    {
        &self.root
    }

    pub fn src_dir(&self) -> &Utf8Path
    {
        &self.src_dir
    }

    pub fn entrypoint(&self) -> &Utf8Path
    {
        &self.entrypoint
    }

    /// Module options after defaults, in pass order
    pub fn module_options(&self) -> &IndexMap<String, Value>
    {
        &self.imports
    }

    /// Run one configuration pass.
    #[instrument(skip_all, fields(theme = %self.name))]
    pub fn build(
        &self,
        user: &UserOptions,
        project: &ProjectContext,
    ) -> ThemeResult<ThemeBuild>
    {
        let config = self
            .schema
            .validate(&user.config)
            .map_err(|issues| ThemeError::InvalidConfig { theme: self.name.clone(), issues })?;

        if self.log
            && let Some(package) = &self.package
        {
            package.log_warnings();
        }

        let integrations = resolve_integrations(&self.integrations, &user.integrations, &project.integrations);

        let middleware = match &self.middleware_dir
        {
            Some(dir) => discover_middleware(dir)?,
            None => Vec::new(),
        };

        let mut state = PassState::new(&self.name);

        for (slot, option) in &self.imports
        {
            let Some(spec) = classify_module_spec(option)
            else
            {
                continue;
            };

            if RESERVED_MODULE_NAMES.contains(&slot.as_str())
            {
                warn!(
                    module = %slot,
                    "module name '{slot}' is reserved for the built-in virtual import '{}/{slot}'",
                    self.name
                );
                continue;
            }

            let object = to_module_object(spec, &self.src_dir)?;
            let author = resolve_module_object(&self.root, &object);

            if author.is_empty()
            {
                debug!(module = %slot, "empty module skipped");
                continue;
            }

            let merged = ModuleOverride::apply(
                ModuleNames::new(&self.name, slot),
                author,
                user.overrides
                    .get(slot),
                &project.root,
            )?;

            state.add_module(&merged);
        }

        for slot in user
            .overrides
            .keys()
            .filter(|slot| !state.has_slot(slot))
        {
            debug!(module = %slot, "override for unknown module ignored");
        }

        let author_pages = discover_pages(&self.page_dir)?;
        let pages = apply_page_overrides(&author_pages, &user.pages)?;
        state.add_pages(&author_pages, &pages);
        state.add_integrations(&integrations);
        state.add_builtins(&self.entrypoint, &config, &integrations, &pages);

        let modules = state
            .summaries
            .clone();
        let (resolver, dts) = state.finish()?;

        info!(
            modules = modules.len(),
            routes = pages.patterns.len(),
            virtual_ids = resolver.len(),
            "theme pass complete"
        );

        Ok(ThemeBuild {
            name: self
                .name
                .clone(),
            config,
            resolver,
            routes: pages.injected_routes(),
            pages,
            middleware,
            integrations,
            public_dir: self
                .public_dir
                .clone()
                .filter(|dir| dir.exists()),
            watch_dirs: vec![
                self.root
                    .clone(),
            ],
            modules,
            dts,
        })
    }
}

/// Accumulator for one pass: virtual imports plus declarations.
struct PassState
{
    theme: String,
    imports: IndexMap<String, VirtualContent>,
    dts: DtsBuffer,
    modules_authored: LineBuffer,
    modules_overrides: LineBuffer,
    modules_resolved: LineBuffer,
    summaries: Vec<ModuleSummary>,
}

impl PassState
{
    fn new(theme: &str) -> Self
    {
        Self {
            theme: theme.to_string(),
            imports: IndexMap::new(),
            dts: DtsBuffer::new(),
            modules_authored: LineBuffer::new(),
            modules_overrides: LineBuffer::new(),
            modules_resolved: LineBuffer::new(),
            summaries: Vec::new(),
        }
    }

    fn has_slot(
        &self,
        slot: &str,
    ) -> bool
    {
        self.summaries
            .iter()
            .any(|s| s.slot == slot)
    }

    fn add_module(
        &mut self,
        merged: &MergedModule,
    )
    {
        let names = &merged.names;

        debug!(module = %names.resolved, overridden = merged.is_overridden(), "virtual module");

        self.imports
            .insert(names.resolved.clone(), merged.served_content());
        self.imports
            .insert(names.alias.clone(), merged.alias_content());

        self.dts
            .add_module(
                &names.resolved,
                merged
                    .resolved
                    .types()
                    .module(),
            );
        self.dts
            .add_module(
                &names.alias,
                merged
                    .alias
                    .types()
                    .module(),
            );

        push_module_entry(&mut self.modules_authored, &names.slot, &merged.authored);
        push_module_entry(&mut self.modules_resolved, &names.slot, &merged.resolved);
        if let Some(over) = &merged.overrides
        {
            push_module_entry(&mut self.modules_overrides, &names.slot, over);
        }

        let module = merged
            .resolved
            .module();
        self.summaries
            .push(ModuleSummary {
                slot: names
                    .slot
                    .clone(),
                id: names
                    .resolved
                    .clone(),
                alias: names
                    .alias
                    .clone(),
                imports: module
                    .imports
                    .len(),
                exports: merged
                    .resolved
                    .typed_exports()
                    .map(|e| {
                        e.name
                            .to_string()
                    })
                    .collect(),
                overridden: merged.is_overridden(),
            });
    }

    fn add_pages(
        &mut self,
        author: &IndexMap<String, Utf8PathBuf>,
        outcome: &PageOverrideOutcome,
    )
    {
        let page_type = |pattern: &str, entry: &Utf8Path| {
            format!("{}: typeof import({}).default;", quote(pattern), quote(entry.as_str()))
        };

        let mut authored = LineBuffer::new();
        for (pattern, entry) in author
        {
            authored.push(&page_type(pattern, entry), 0);
        }

        let mut overrides = LineBuffer::new();
        for (old, new) in &outcome.override_log
        {
            overrides.push(&format!("{}: {};", quote(old), quote(new)), 0);
        }
        for (old, _) in outcome
            .resolved
            .iter()
            .filter(|(_, new)| new.is_none())
        {
            overrides.push(&format!("{}: false;", quote(old)), 0);
        }

        let mut resolved = LineBuffer::new();
        for (pattern, entry) in &outcome.patterns
        {
            resolved.push(&page_type(pattern, entry), 0);
        }

        self.add_registry(interfaces::ROUTES_AUTHORED, &authored);
        self.add_registry(interfaces::ROUTES_OVERRIDES, &overrides);
        self.add_registry(interfaces::ROUTES_RESOLVED, &resolved);
    }

    fn add_integrations(
        &mut self,
        integrations: &IntegrationsOutcome,
    )
    {
        self.add_registry(interfaces::INTEGRATIONS, &integrations.possible_types());
        self.add_registry(interfaces::INTEGRATIONS_RESOLVED, &integrations.resolved_types());
    }

    /// `theme/config` and `theme/context`
    fn add_builtins(
        &mut self,
        entrypoint: &Utf8Path,
        config: &Value,
        integrations: &IntegrationsOutcome,
        pages: &PageOverrideOutcome,
    )
    {
        let config_id = format!("{}/config", self.theme);
        let context_id = format!("{}/context", self.theme);

        let config_type = format!(
            "NonNullable<NonNullable<Parameters<typeof import({}).default>[0]>[\"config\"]>",
            quote(entrypoint.as_str())
        );

        self.imports
            .insert(config_id.clone(), VirtualContent::Static(format!("export default {};\n", config)));
        self.dts
            .add_module(
                &config_id,
                &format!(
                    "export type ThemeName = {};\nexport type ThemeConfig = {config_type};\nconst config: ThemeConfig;\nexport default config;",
                    quote(&self.theme)
                ),
            );

        let existing: Vec<String> = integrations
            .existing
            .iter()
            .cloned()
            .collect();
        let page_map: Map<String, Value> = pages
            .resolved
            .iter()
            .map(|(pattern, new)| {
                let value = new
                    .clone()
                    .map_or(Value::Bool(false), Value::String);
                (pattern.clone(), value)
            })
            .collect();

        let context = format!(
            "export const integrations = new Set({});\nexport const pages = new Map(Object.entries({}));\n",
            Value::from(existing),
            Value::Object(page_map.clone())
        );

        let page_keys = if page_map.is_empty()
        {
            "never".to_string()
        }
        else
        {
            page_map
                .keys()
                .map(|p| quote(p))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        self.imports
            .insert(context_id.clone(), VirtualContent::Static(context));
        self.dts
            .add_module(
                &context_id,
                &format!(
                    "export const integrations: Set<string>;\nexport const pages: Map<{page_keys}, string | false>;"
                ),
            );

        let mut configs = LineBuffer::new();
        configs.push(&format!("{}: {config_type};", quote(&self.theme)), 0);
        let mut themes = LineBuffer::new();
        themes.push(&format!("{}: true;", quote(&self.theme)), 0);

        let mut options = LineBuffer::new();
        options.push_block(&format!("{}:", quote(&self.theme)), &self.options_types(integrations), 0);

        let mut namespace = LineBuffer::new();
        namespace.push_block("export interface Themes", &themes, 0);
        namespace.push_block("export interface ThemeConfigs", &configs, 0);
        namespace.push_block("export interface ThemeOptions", &options, 0);
        self.dts
            .add_namespace(TYPES_NAMESPACE, &namespace);
    }

    /// What a consumer may pass for this theme, keyed off the authored
    /// registries so only declared patterns, slots and exports type-check
    fn options_types(
        &self,
        integrations: &IntegrationsOutcome,
    ) -> LineBuffer
    {
        let theme = quote(&self.theme);
        let routes = format!("{}[{theme}]", interfaces::ROUTES_AUTHORED);
        let modules = format!("{}[{theme}]", interfaces::MODULES_AUTHORED);
        let resolved = format!("{}[{theme}]", interfaces::INTEGRATIONS_RESOLVED);

        let mut buf = LineBuffer::new();
        buf.push(&format!("pages?: {{ [Pattern in keyof {routes}]?: string | boolean }};"), 0);
        buf.push(
            &format!(
                "overrides?: {{ [Module in keyof {modules}]?: {modules}[Module] extends string[] ? string[] : {{ [Export in keyof {modules}[Module]]?: string }} }};"
            ),
            0,
        );

        if integrations
            .injected
            .is_empty()
            && integrations
                .ignored
                .is_empty()
        {
            buf.push(&format!("integrations?: \"{} is not injecting any integrations\";", self.theme), 0);
        }
        else
        {
            buf.push(&format!("integrations?: {{ [Name in keyof {resolved}]?: boolean }};"), 0);
        }

        buf
    }

    /// Add `"theme": { body }` to a registry interface
    fn add_registry(
        &mut self,
        interface: &str,
        body: &LineBuffer,
    )
    {
        let mut entry = LineBuffer::new();
        entry.push_block(&format!("{}:", quote(&self.theme)), body, 0);
        self.dts
            .add_interface(interface, &entry);
    }

    fn finish(mut self) -> ThemeResult<(VirtualResolver, String)>
    {
        let authored = std::mem::take(&mut self.modules_authored);
        let overrides = std::mem::take(&mut self.modules_overrides);
        let resolved = std::mem::take(&mut self.modules_resolved);

        self.add_registry(interfaces::MODULES_AUTHORED, &authored);
        self.add_registry(interfaces::MODULES_OVERRIDES, &overrides);
        self.add_registry(interfaces::MODULES_RESOLVED, &resolved);

        let resolver = VirtualResolver::new(&self.theme, self.imports)?;

        Ok((resolver, self.dts.compile()))
    }
}

/// `slot: { name: Type; ... }`, or `slot: string[];` for a module with
/// side-effect imports only
fn push_module_entry(
    buf: &mut LineBuffer,
    slot: &str,
    module: &VirtualModule,
)
{
    let interface = module
        .types()
        .interface();

    if interface.is_empty()
    {
        buf.push(&format!("{}: string[];", quote(slot)), 0);
        return;
    }

    let mut body = LineBuffer::new();
    body.push(interface, 0);
    buf.push_block(&format!("{}:", quote(slot)), &body, 0);
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    /// Theme root with an entrypoint and `src/`, plus the options to load it
    fn theme_dir(imports: Value) -> (TempDir, AuthorOptions)
    {
        let tmp = TempDir::new().unwrap();
        let root = PathUtils::to_utf8(
            dunce::canonicalize(tmp.path()).unwrap(),
        )
        .unwrap();

        fs::write(root.join("index.ts"), "export default {}").unwrap();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(root.join("src/components/Card.astro"), "").unwrap();

        let options = AuthorOptions {
            name: "demo".into(),
            entrypoint: root.join("index.ts"),
            src_dir: "src".into(),
            page_dir: "pages".into(),
            public_dir: None,
            middleware_dir: None,
            log: false,
            imports: serde_json::from_value(imports).unwrap(),
            integrations: Vec::new(),
            schema: None,
        };

        (tmp, options)
    }

    fn project(tmp: &TempDir) -> ProjectContext
    {
        ProjectContext {
            root: PathUtils::to_utf8(
                tmp.path()
                    .to_path_buf(),
            )
            .unwrap(),
            integrations: Vec::new(),
        }
    }

    #[test]
    fn invalid_name_is_fatal()
    {
        let (_tmp, mut options) = theme_dir(json!({}));
        options.name = "Demo".into();

        assert!(matches!(Theme::new(options), Err(ThemeError::InvalidThemeName { .. })));
    }

    #[test]
    fn missing_src_dir_is_fatal()
    {
        let (_tmp, mut options) = theme_dir(json!({}));
        options.src_dir = "lib".into();

        assert!(matches!(Theme::new(options), Err(ThemeError::MissingPath { what: "directory", .. })));
    }

    #[test]
    fn author_imports_extend_the_defaults()
    {
        let (_tmp, options) = theme_dir(json!({ "icons": "icons/*.svg", "layouts": false }));
        let theme = Theme::new(options).unwrap();

        let slots: Vec<&str> = theme
            .module_options()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(slots, ["assets", "components", "layouts", "styles", "icons"]);
        assert_eq!(theme.module_options()["layouts"], json!(false));
    }

    #[test]
    fn empty_and_disabled_modules_are_skipped()
    {
        let (tmp, options) = theme_dir(json!({ "layouts": false, "extra": [] }));
        let theme = Theme::new(options).unwrap();

        let build = theme
            .build(&UserOptions::default(), &project(&tmp))
            .unwrap();

        let slots: Vec<&str> = build
            .modules
            .iter()
            .map(|m| m.slot.as_str())
            .collect();
        assert_eq!(slots, ["components"]);
        assert!(build.resolver.contains("demo/components"));
        assert!(build.resolver.contains("demo:components"));
        assert!(!build.resolver.contains("demo/layouts"));
        assert!(build.resolver.contains("demo/config"));
        assert!(build.resolver.contains("demo/context"));
    }

    #[test]
    fn options_type_explains_missing_integrations()
    {
        let (tmp, options) = theme_dir(json!({}));
        let theme = Theme::new(options).unwrap();

        let build = theme
            .build(&UserOptions::default(), &project(&tmp))
            .unwrap();

        assert!(
            build
                .dts
                .contains("integrations?: \"demo is not injecting any integrations\";"),
            "{}",
            build.dts
        );
        assert!(
            build
                .dts
                .contains("export type ThemeName = \"demo\";")
        );
    }

    #[test]
    fn reserved_slot_never_shadows_builtin()
    {
        let (tmp, options) = theme_dir(json!({ "context": "components/*.astro" }));
        let theme = Theme::new(options).unwrap();

        let build = theme
            .build(&UserOptions::default(), &project(&tmp))
            .unwrap();

        let context = build
            .resolver
            .serve("demo/context", None, false)
            .unwrap();
        assert!(context.starts_with("export const integrations = new Set([]);"));
        assert!(
            !build
                .modules
                .iter()
                .any(|m| m.slot == "context")
        );
    }

    #[test]
    fn custom_schema_validates_config()
    {
        let (tmp, options) = theme_dir(json!({}));
        let schema: ObjectSchema = toml::from_str("[fields.title]\ntype = \"string\"\nrequired = true\n").unwrap();
        let theme = Theme::new(options)
            .unwrap()
            .with_schema(schema);

        let err = match theme.build(&UserOptions::default(), &project(&tmp))
        {
            Ok(_) => panic!("missing title should fail"),
            Err(err) => err,
        };
        assert!(matches!(err, ThemeError::InvalidConfig { ref issues, .. } if issues == &["config.title: required"]));
    }

    #[test]
    fn dts_file_name_flattens_scope()
    {
        let (tmp, mut options) = theme_dir(json!({}));
        options.name = "@scope/demo".into();
        let theme = Theme::new(options).unwrap();

        let build = theme
            .build(&UserOptions::default(), &project(&tmp))
            .unwrap();
        assert_eq!(build.dts_file_name(), "scope-demo.d.ts");
        assert!(
            build
                .dts
                .contains("declare module \"@scope/demo/components\" {")
        );
    }

    #[test]
    fn manifest_directories_accept_false()
    {
        let options: AuthorOptions =
            toml::from_str("name = \"t\"\nentrypoint = \"/t/index.ts\"\npublic_dir = false\n").unwrap();
        assert_eq!(options.public_dir, None);
        assert_eq!(options.middleware_dir.as_deref(), Some("./"));

        let err = toml::from_str::<AuthorOptions>("name = \"t\"\nentrypoint = \"/t/index.ts\"\npublic_dir = true\n");
        assert!(err.is_err());
    }
}
