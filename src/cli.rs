use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
    pub verbose: bool,  // global --verbose
}

#[derive(Parser)]
#[command(name = "tpr")]
#[command(about = "Build virtual modules, routes and type declarations for a themed site")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Only print errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show what would be done without writing files
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Log each module and route decision
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a configuration pass and write the declaration file
    Build(BuildArgs),

    /// Print the source served for a virtual module id
    Load(LoadArgs),

    /// Check that a replacement route pattern keeps its parameters
    CheckPattern(CheckPatternArgs),

    /// Re-run the pass whenever theme files change
    Watch(WatchArgs),

    /// Initialize a theme-provider.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where the project and its config live
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project root
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Project config file (defaults to theme-provider.{toml,yaml,json} in the project root)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Theme manifest or directory; overrides the config file
    #[arg(long)]
    pub theme: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Summary format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print the declaration text instead of writing it
    #[arg(long)]
    pub print_dts: bool,
}

#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Virtual module id, e.g. my-theme/components
    #[arg(value_name = "ID")]
    pub id: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// File importing the module
    #[arg(long)]
    pub importer: Option<String>,

    /// Load for server-side rendering
    #[arg(long)]
    pub ssr: bool,
}

#[derive(Parser, Debug)]
pub struct CheckPatternArgs {
    /// Pattern declared by the theme
    #[arg(value_name = "OLD")]
    pub old: String,

    /// Replacement pattern
    #[arg(value_name = "NEW")]
    pub new: String,
}

#[derive(Parser, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Quiet period before re-running, in milliseconds
    #[arg(long, default_value = "150")]
    pub debounce_ms: u64,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,

    /// Theme manifest or directory to reference
    #[arg(long)]
    pub theme: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Table,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; required unless --stdout is set
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
