use std::process::ExitCode;

use clap::Parser;
use theme_provider::{
    ThemeError,
    cli::{AppContext, Cli, Commands},
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    };

    init_tracing(&ctx);

    let result = match cli.command {
        Commands::Build(args) => theme_provider::build_run(args, &ctx),
        Commands::Load(args) => theme_provider::load_run(args, &ctx),
        Commands::CheckPattern(args) => theme_provider::check_pattern_run(args, &ctx),
        Commands::Watch(args) => theme_provider::watch_run(args, &ctx),
        Commands::Init(args) => theme_provider::infra::config::init(args, &ctx),
        Commands::Completions(args) => theme_provider::completion::run(args, &ctx),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(err, &ctx);
            ExitCode::FAILURE
        }
    }
}

/// RUST_LOG wins; otherwise warnings, widened by --verbose, narrowed by --quiet
fn init_tracing(ctx: &AppContext) {
    let level = if ctx.quiet {
        "error"
    } else if ctx.verbose {
        "theme_provider=debug"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!ctx.no_color)
        .with_target(false)
        .without_time()
        .init();
}

/// Configuration errors get a labeled diagnostic, everything else the
/// anyhow chain.
fn report(err: anyhow::Error, ctx: &AppContext) {
    if ctx.no_color {
        let _ = miette::set_hook(Box::new(|_| {
            Box::new(miette::MietteHandlerOpts::new().color(false).build())
        }));
    }

    match err.downcast::<ThemeError>() {
        Ok(theme_err) => eprintln!("{:?}", miette::Report::new(theme_err)),
        Err(err) => eprintln!("Error: {err:?}"),
    }
}
