//! kousei CLI

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::Result;
use kousei::{build_linter, check, config, load_catalog, lsp};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

/// Japanese proofreading with textlint, in the editor and on the command line
#[derive(Debug, Parser)]
#[command(name = "kousei", version, about)]
struct Args {
    /// Path to config file (default: .config/kousei/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the language server over stdio (the default)
    Lsp,

    /// Proofread files and print the findings
    Check {
        /// Settings JSON, as an editor would send for `japanese-proofreading`
        #[arg(long)]
        settings: Option<String>,

        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    // stdout carries the LSP transport, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let config = config::load_config(args.config.as_deref())?;
    let catalog = Arc::new(load_catalog(&config)?);
    let linter = build_linter(&config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match args.command.unwrap_or(Command::Lsp) {
        Command::Lsp => runtime.block_on(lsp::run(linter, catalog)),
        Command::Check { settings, files } => {
            let settings = check::parse_settings(settings.as_deref())?;
            let summary = runtime.block_on(check::run(
                linter.as_ref(),
                &catalog,
                settings.as_ref(),
                &files,
            ))?;
            if !summary.passed() {
                eprintln!(
                    "{} {} error(s) found",
                    "error:".red().bold(),
                    summary.errors
                );
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
