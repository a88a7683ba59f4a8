//! `quillc` - the command-line front end over the quill semantic analyzer.

mod config;
mod demo;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use quill_util::{Diagnostic, SourceMap};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quillc", version, about = "The quill semantic analyzer")]
struct Cli {
    /// Path to a quill.toml config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run name resolution and type inference over the built-in sample
    /// program and report the inferred types (or the first error).
    Check,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn run_check(config: &Config) -> Result<()> {
    let program = demo::sample_program();
    tracing::info!(modules = program.modules.len(), "analyzing program");

    match quill_sem::analyze(program) {
        Ok(typed) => {
            for module in &typed.modules {
                for tl in &module.top_levels {
                    if let quill_sem::hir::TopLevel::Func(f) = tl {
                        if config.analysis.verbose {
                            tracing::info!(name = %f.name, ty = %f.body.ty(), "inferred");
                        }
                        println!("{}: {}", f.name, f.body.ty());
                    }
                }
            }
            Ok(())
        }
        Err(err) => {
            let map = SourceMap::new();
            let diagnostic = Diagnostic::error(err.to_string(), err.span());
            eprintln!("{}", diagnostic.render(&map));
            anyhow::bail!("analysis failed")
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Check => run_check(&config),
    }
}
