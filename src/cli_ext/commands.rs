//! CLI command handlers: one configuration pass per invocation, or one per
//! change in watch mode.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::mpsc,
    time::Duration,
};

use anyhow::{Context, Result};
use notify::{EventKind, RecursiveMode, Watcher};
use owo_colors::OwoColorize;
use serde_json::json;
use tabled::{Table, Tabled};
use tracing::{debug, error, info, instrument};

use crate::{
    cli::{AppContext, BuildArgs, CheckPatternArgs, LoadArgs, OutputFormat, ProjectArgs, WatchArgs},
    core::{
        routes::normalize_page_override,
        theme::{Theme, ThemeBuild},
    },
    infra::config::{CONFIG_FILES, ProviderConfig, absolute_utf8, expand_path, load_author_options, load_config},
};

/// A finished pass plus where its declarations belong
pub struct PassOutput
{
    pub build: ThemeBuild,
    pub config: ProviderConfig,
    pub project_root: PathBuf,
}

impl PassOutput
{
    pub fn dts_path(&self) -> PathBuf
    {
        self.project_root
            .join(&self.config.out_dir)
            .join(
                self.build
                    .dts_file_name(),
            )
    }
}

/// Theme manifest location: `--theme` wins over the config file, relative
/// paths are taken from the project root.
fn theme_path(
    project_root: &Path,
    args: &ProjectArgs,
    config: &ProviderConfig,
) -> PathBuf
{
    let raw = args
        .theme
        .as_ref()
        .unwrap_or(&config.theme);
    let expanded = expand_path(raw);

    if expanded.is_relative() { project_root.join(expanded) } else { expanded }
}

/// Load config and manifest, then run one pass.
#[instrument(skip_all, fields(project = %args.project.display()))]
pub fn run_pass(args: &ProjectArgs) -> Result<PassOutput>
{
    let project_root = absolute_utf8(&args.project)?.into_std_path_buf();
    let config_file = args
        .config
        .as_deref()
        .map(expand_path);
    let config = load_config(&project_root, config_file.as_deref())?;

    let manifest = theme_path(&project_root, args, &config);
    let options = load_author_options(&manifest)?;
    let theme = Theme::new(options)?;

    let project = config.project(&project_root)?;
    let build = theme.build(&config.options, &project)?;

    Ok(PassOutput { build, config, project_root })
}

/// Write the declaration file unless this is a dry run
fn write_dts(
    output: &PassOutput,
    ctx: &AppContext,
) -> Result<Option<PathBuf>>
{
    let path = output.dts_path();

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            eprintln!("Would write {}", path.display());
        }
        return Ok(None);
    }

    if let Some(parent) = path.parent()
    {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, &output.build.dts).with_context(|| format!("Failed to write {}", path.display()))?;

    debug!(path = %path.display(), "declarations written");
    Ok(Some(path))
}

pub fn build_run(
    args: BuildArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let output = run_pass(&args.project)?;

    if args.print_dts
    {
        print!("{}", output.build.dts);
        return Ok(());
    }

    let written = write_dts(&output, ctx)?;

    if ctx.quiet
    {
        return Ok(());
    }

    match args.format
    {
        OutputFormat::Json =>
        {
            let summary = json!({
                "name": output.build.name,
                "config": output.build.config,
                "modules": output.build.modules,
                "routes": output.build.routes,
                "pages": output.build.pages,
                "middleware": output.build.middleware,
                "integrations": output.build.integrations,
                "public_dir": output.build.public_dir,
                "virtual_ids": output.build.resolver.ids().collect::<Vec<_>>(),
                "dts": written,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Table =>
        {
            print_tables(&output.build);
        }
        OutputFormat::Text =>
        {
            print_text(&output.build, written.as_deref(), ctx);
        }
    }

    Ok(())
}

fn print_tables(build: &ThemeBuild)
{
    #[derive(Tabled)]
    struct ModuleRow
    {
        module: String,
        alias: String,
        exports: String,
        imports: usize,
        overridden: bool,
    }

    #[derive(Tabled)]
    struct RouteRow
    {
        pattern: String,
        entrypoint: String,
    }

    let modules: Vec<_> = build
        .modules
        .iter()
        .map(|module| ModuleRow {
            module: module
                .id
                .clone(),
            alias: module
                .alias
                .clone(),
            exports: module
                .exports
                .join(", "),
            imports: module.imports,
            overridden: module.overridden,
        })
        .collect();

    let routes: Vec<_> = build
        .routes
        .iter()
        .map(|route| RouteRow {
            pattern: route
                .pattern
                .clone(),
            entrypoint: route
                .entrypoint
                .to_string(),
        })
        .collect();

    println!("{}", Table::new(modules));
    println!("{}", Table::new(routes));
}

fn print_text(
    build: &ThemeBuild,
    written: Option<&Path>,
    ctx: &AppContext,
)
{
    let heading = if ctx.no_color
    {
        build
            .name
            .clone()
    }
    else
    {
        build
            .name
            .green()
            .bold()
            .to_string()
    };
    println!("{heading}");

    for module in &build.modules
    {
        let marker = if module.overridden { " (overridden)" } else { "" };
        println!("  module {}{} [{}]", module.id, marker, module.exports.join(", "));
    }

    for route in &build.routes
    {
        println!("  route  {} -> {}", route.pattern, route.entrypoint);
    }

    for removed in build
        .pages
        .resolved
        .iter()
        .filter_map(|(pattern, target)| target.is_none().then_some(pattern))
    {
        println!("  route  {removed} removed");
    }

    for integration in &build.integrations.injected
    {
        println!("  integration {integration}");
    }

    if let Some(path) = written
    {
        println!("Wrote {}", path.display());
    }
}

pub fn load_run(
    args: LoadArgs,
    _ctx: &AppContext,
) -> Result<()>
{
    let output = run_pass(&args.project)?;

    let content = output
        .build
        .resolver
        .serve(&args.id, args.importer.as_deref(), args.ssr)
        .with_context(|| format!("\"{}\" is not a virtual module of {}", args.id, output.build.name))?;

    print!("{content}");
    Ok(())
}

pub fn check_pattern_run(
    args: CheckPatternArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let normalized = normalize_page_override(&args.old, &args.new)?;

    if ctx.quiet
    {
        return Ok(());
    }

    let status = if ctx.no_color { "valid".to_string() } else { "valid".green().to_string() };
    println!("{status} {normalized}");
    Ok(())
}

/// Run a pass, then re-run on every settled burst of filesystem changes.
/// Failed passes are logged and the watch continues.
pub fn watch_run(
    args: WatchArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let output = run_pass(&args.project)?;
    write_dts(&output, ctx)?;

    let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to start file watcher")?;

    for dir in &output.build.watch_dirs
    {
        watcher
            .watch(dir.as_std_path(), RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {dir}"))?;
    }
    for name in CONFIG_FILES
    {
        let file = output
            .project_root
            .join(name);
        if file.exists()
        {
            watcher
                .watch(&file, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch {}", file.display()))?;
        }
    }

    let out_dir = output
        .project_root
        .join(&output.config.out_dir);
    let debounce = Duration::from_millis(args.debounce_ms);

    info!(dirs = output.build.watch_dirs.len(), "watching for changes");
    if !ctx.quiet
    {
        eprintln!("Watching {} for changes", output.build.name);
    }

    while let Ok(event) = rx.recv()
    {
        let relevant = |event: &notify::Result<notify::Event>| match event
        {
            Ok(event) =>
            {
                !matches!(event.kind, EventKind::Access(_))
                    && event
                        .paths
                        .iter()
                        .any(|path| !path.starts_with(&out_dir))
            }
            Err(_) => false,
        };

        let mut changed = relevant(&event);
        while let Ok(next) = rx.recv_timeout(debounce)
        {
            changed |= relevant(&next);
        }

        if !changed
        {
            continue;
        }

        match run_pass(&args.project).and_then(|output| write_dts(&output, ctx))
        {
            Ok(_) => info!("theme pass re-run"),
            Err(err) => error!("{err:#}"),
        }
    }

    Ok(())
}
