//! Shell completion scripts for `tpr`.

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate, generate_to};
use std::fs;

use crate::cli::{AppContext, Cli, CompletionsArgs};

/// Binary name the scripts complete
const BIN_NAME: &str = "tpr";

/// Completion script for `shell` as text
pub fn script(shell: Shell) -> Result<String> {
    let mut buf = Vec::new();
    generate(shell, &mut Cli::command(), BIN_NAME, &mut buf);
    String::from_utf8(buf).context("completion script is not UTF-8")
}

pub fn run(args: CompletionsArgs, ctx: &AppContext) -> Result<()> {
    if args.stdout {
        print!("{}", script(args.shell)?);
        return Ok(());
    }

    let dir = args
        .out_dir
        .context("--out-dir is required unless --stdout is set")?;

    if ctx.dry_run {
        eprintln!("Would write {} completion to {}", args.shell, dir.display());
        return Ok(());
    }

    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let path = generate_to(args.shell, &mut Cli::command(), BIN_NAME, &dir).context("generate completion file")?;

    if !ctx.quiet {
        eprintln!("Wrote completion to {}", path.display());
    }
    Ok(())
}
