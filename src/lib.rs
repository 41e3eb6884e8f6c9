//! **theme-provider** - Virtual modules, route overrides and type declarations for themes
//!
//! A theme declares named module slots, pages and a config schema. Each
//! configuration pass merges the project's overrides into those slots, serves
//! the result as virtual imports and emits matching TypeScript declarations.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Configuration errors with miette diagnostics
pub mod error;
pub use error::{ThemeError, ThemeResult};

/// Theme engine - module synthesis, overrides and declaration emission
pub mod core {
    /// Module option shapes and their canonical form
    pub mod module;
    pub use module::{ModuleObject, ModuleSpec, ResolvedModuleObject};

    /// Glob expansion into export maps
    pub mod glob;

    /// Generated module source and type text
    pub mod virtual_module;
    pub use virtual_module::VirtualModule;

    /// Sentinel-prefixed virtual id resolution
    pub mod resolver;
    pub use resolver::{PipelinePlugin, VirtualContent, VirtualResolver};

    /// Author/user module merging with importer-aware content
    pub mod merge;
    pub use merge::{MergedModule, ModuleOverride};

    /// Page discovery and route overrides
    pub mod routes;

    /// Declaration text builder
    pub mod dts;
    pub use dts::{DtsBuffer, LineBuffer};

    /// User config validation
    pub mod schema;
    pub use schema::{AnySchema, ConfigSchema, ObjectSchema};

    /// Theme package.json checks
    pub mod package;

    /// Theme integration toggles
    pub mod integrations;

    /// Middleware discovery
    pub mod middleware;

    /// The configuration pass
    pub mod theme;
    pub use theme::{AuthorOptions, ProjectContext, Theme, ThemeBuild, UserOptions};
}

/// Infrastructure - configuration files, paths and walking
pub mod infra {
    /// Project config and theme manifests with layered sources
    pub mod config;
    pub use config::{ProviderConfig, init as config_init, load_author_options, load_config};

    /// Slash, path, extension and naming helpers
    pub mod path;

    /// Glob-driven directory walking
    pub mod walk;
    pub use walk::FileWalker;
}

/// CLI command handlers
pub mod cli_ext {
    pub mod commands;
    pub use commands::{build_run, check_pattern_run, load_run, run_pass, watch_run};
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use cli_ext::{build_run, check_pattern_run, load_run, watch_run};
pub use crate::core::{Theme, ThemeBuild, UserOptions, VirtualResolver};
pub use infra::{FileWalker, ProviderConfig, load_config};
