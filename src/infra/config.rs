//! Filepath: src/infra/config.rs
//! Project configuration (`theme-provider.toml`) and theme manifests
//! (`theme.toml`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cli::{AppContext, InitArgs},
    core::theme::{AuthorOptions, ProjectContext, UserOptions},
    infra::path::PathUtils,
};

/// Project config files, first match wins
pub const CONFIG_FILES: &[&str] = &["theme-provider.toml", "theme-provider.yaml", "theme-provider.json"];

/// Environment prefix; nested keys use `__` (`THEME_PROVIDER__OUT_DIR`)
pub const ENV_PREFIX: &str = "THEME_PROVIDER";

/// Manifest file looked up when the theme path is a directory
pub const MANIFEST_FILE: &str = "theme.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig
{
    /// Theme manifest, or a directory holding `theme.toml`
    pub theme: PathBuf,

    /// Declaration output directory, relative to the project root
    pub out_dir: PathBuf,

    /// Integrations already present in the project
    pub integrations: Vec<String>,

    /// Options handed to the theme
    pub options: UserOptions,
}

impl Default for ProviderConfig
{
    fn default() -> Self
    {
        Self {
            theme: PathBuf::from("theme"),
            out_dir: PathBuf::from(".astro"),
            integrations: Vec::new(),
            options: UserOptions::default(),
        }
    }
}

impl ProviderConfig
{
    /// Project context for a pass rooted at `root`
    pub fn project(
        &self,
        root: &Path,
    ) -> Result<ProjectContext>
    {
        Ok(ProjectContext {
            root: absolute_utf8(root)?,
            integrations: self
                .integrations
                .clone(),
        })
    }
}

/// Load the project config from `root`, layered with environment overrides.
/// An explicit `file` replaces the lookup.
pub fn load_config(
    root: &Path,
    file: Option<&Path>,
) -> Result<ProviderConfig>
{
    let mut builder = config::Config::builder();

    let path = match file
    {
        Some(file) => Some(file.to_path_buf()),
        None => CONFIG_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.exists()),
    };

    if let Some(path) = &path
    {
        debug!(path = %path.display(), "loading project config");
        builder = builder.add_source(config::File::from(path.as_path()));
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("integrations")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: ProviderConfig = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

/// Read a theme manifest. `path` may name the file or its directory. A
/// relative `entrypoint` is taken relative to the manifest.
pub fn load_author_options(path: &Path) -> Result<AuthorOptions>
{
    let manifest = if path.is_dir() { path.join(MANIFEST_FILE) } else { path.to_path_buf() };

    let text = std::fs::read_to_string(&manifest)
        .with_context(|| format!("Failed to read theme manifest {}", manifest.display()))?;
    let mut options: AuthorOptions = toml::from_str(&text)
        .with_context(|| format!("Failed to parse theme manifest {}", manifest.display()))?;

    let manifest_dir = absolute_utf8(
        manifest
            .parent()
            .unwrap_or(Path::new(".")),
    )?;

    if options
        .entrypoint
        .is_relative()
    {
        options.entrypoint = PathUtils::lexical_join(&manifest_dir, options.entrypoint.as_str());
    }

    debug!(theme = %options.name, entrypoint = %options.entrypoint, "loaded theme manifest");

    Ok(options)
}

/// Expand `~` and make `path` absolute without requiring it to exist
pub fn expand_path(path: &Path) -> PathBuf
{
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

/// Absolute UTF-8 form of an existing path
pub fn absolute_utf8(path: &Path) -> Result<Utf8PathBuf>
{
    let expanded = expand_path(path);
    let canonical = dunce::canonicalize(&expanded).with_context(|| format!("Path not found: {}", expanded.display()))?;

    Ok(PathUtils::to_utf8(canonical)?)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join(CONFIG_FILES[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let mut config = ProviderConfig::default();
    if let Some(theme) = args.theme
    {
        config.theme = theme;
    }

    let toml_string = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    if ctx.dry_run
    {
        println!("{toml_string}");
        return Ok(());
    }

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_without_a_file()
    {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path(), None).unwrap();

        assert_eq!(config.theme, PathBuf::from("theme"));
        assert_eq!(config.out_dir, PathBuf::from(".astro"));
        assert!(
            config
                .options
                .pages
                .is_empty()
        );
    }

    #[test]
    fn reads_user_options()
    {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path()
                .join("theme-provider.toml"),
            r#"
theme = "../my-theme"
integrations = ["@astrojs/mdx"]

[options.config]
title = "Blog"

[options.pages]
"/blog" = false

[options.overrides.components]
Card = "./src/MyCard.astro"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path(), None).unwrap();

        assert_eq!(config.theme, PathBuf::from("../my-theme"));
        assert_eq!(config.integrations, vec!["@astrojs/mdx"]);
        assert_eq!(config.options.config, json!({ "title": "Blog" }));
        assert_eq!(config.options.pages["/blog"], json!(false));
        assert_eq!(config.options.overrides["components"], json!({ "Card": "./src/MyCard.astro" }));
    }

    #[test]
    fn manifest_entrypoint_is_relative_to_manifest()
    {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path()
                .join("theme.toml"),
            "name = \"my-theme\"\nentrypoint = \"index.ts\"\n\n[imports]\nicons = \"icons/*.svg\"\n",
        )
        .unwrap();

        let options = load_author_options(tmp.path()).unwrap();
        let dir = absolute_utf8(tmp.path()).unwrap();

        assert_eq!(options.entrypoint, dir.join("index.ts"));
        assert_eq!(options.src_dir, "src");
        assert_eq!(options.public_dir.as_deref(), Some("public"));
        assert_eq!(options.imports["icons"], json!("icons/*.svg"));
    }

    #[test]
    fn manifest_can_disable_directories()
    {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp
            .path()
            .join("theme.toml");
        fs::write(&manifest, "name = \"t\"\nentrypoint = \"/abs/index.ts\"\npublic_dir = false\nmiddleware_dir = \"\"\n").unwrap();

        let options = load_author_options(&manifest).unwrap();

        assert_eq!(options.entrypoint, "/abs/index.ts");
        assert_eq!(options.public_dir, None);
        assert_eq!(options.middleware_dir, None);
    }

    #[test]
    fn init_writes_a_loadable_file()
    {
        let tmp = TempDir::new().unwrap();
        let ctx = AppContext { quiet: true, no_color: true, dry_run: false, verbose: false };
        init(InitArgs { path: tmp.path().to_path_buf(), force: false, theme: None }, &ctx).unwrap();

        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config.out_dir, PathBuf::from(".astro"));

        let again = init(InitArgs { path: tmp.path().to_path_buf(), force: false, theme: None }, &ctx);
        assert!(again.is_err());
    }
}
