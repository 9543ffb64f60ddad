//! AnyLetters CLI entry point.
//!
//! Provides command-line tools for working with AnyLetters dictionaries:
//! - `anyletters languages` - List installed dictionaries
//! - `anyletters check` - Validate guesses for a round
//! - `anyletters solutions` - Show the secret-word pool
//! - `anyletters stats` - Count expanded forms per length
//! - `anyletters clear-cache` - Remove cached artifacts

mod commands;
mod output;

use std::io::stderr;
use std::path::PathBuf;
use std::process::exit;

use anyletters::{CacheStore, Engine};
use clap::{Args, Parser, Subcommand, ValueEnum};
use commands::{
    run_check, run_clear_cache, run_languages, run_solutions, run_stats, CheckArgs,
    ClearCacheArgs, LanguagesArgs, SolutionsArgs, StatsArgs,
};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

/// AnyLetters dictionary tools.
#[derive(Debug, Parser)]
#[command(name = "anyletters")]
#[command(about = "AnyLetters dictionary tools", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Color output control
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto, global = true)]
    pub color: ColorWhen,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filesystem locations shared by every command.
#[derive(Debug, Args)]
pub struct PathArgs {
    /// Directory holding one sub-directory per language
    #[arg(
        long,
        env = "ANYLETTERS_DICTIONARIES",
        default_value = "dictionaries",
        global = true
    )]
    pub dictionaries: PathBuf,

    /// Directory of curated `<lang><length>.txt` solution lists
    #[arg(long, env = "ANYLETTERS_SOLUTIONS", global = true)]
    pub solutions: Option<PathBuf>,

    /// Directory of `global.json` and per-language filter profiles
    #[arg(long, env = "ANYLETTERS_PROFILES", global = true)]
    pub profiles: Option<PathBuf>,

    /// Cache directory
    #[arg(long, env = "ANYLETTERS_CACHE", default_value = "cache", global = true)]
    pub cache: PathBuf,

    /// Recompute everything instead of reading and writing the cache
    #[arg(long, global = true)]
    pub no_cache: bool,
}

impl PathArgs {
    /// Build the engine these locations describe.
    pub fn engine(&self) -> miette::Result<Engine> {
        let cache = if self.no_cache {
            None
        } else {
            Some(CacheStore::open(&self.cache).into_diagnostic()?)
        };
        Ok(Engine::builder()
            .dictionaries_root(self.dictionaries.clone())
            .maybe_solutions_root(self.solutions.clone())
            .maybe_profiles_root(self.profiles.clone())
            .maybe_cache(cache)
            .build())
    }
}

/// When to use colored output.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List installed dictionaries
    Languages(LanguagesArgs),
    /// Check guesses against a round's word list
    Check(CheckArgs),
    /// Show the secret-word pool for a language and length
    Solutions(SolutionsArgs),
    /// Count expanded forms per word length
    Stats(StatsArgs),
    /// Remove cached forms and solutions
    ClearCache(ClearCacheArgs),
}

/// Set up color output based on user preference.
fn setup_colors(color_when: ColorWhen) {
    match color_when {
        ColorWhen::Auto => {
            // owo-colors automatically checks TTY, NO_COLOR, FORCE_COLOR
        }
        ColorWhen::Always => {
            owo_colors::set_override(true);
        }
        ColorWhen::Never => {
            owo_colors::set_override(false);
        }
    }
}

/// Log to stderr, honouring `RUST_LOG` over the verbosity flag.
fn setup_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(stderr)
        .with_target(false)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    setup_colors(cli.color);
    setup_tracing(cli.verbose);

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let result = cli.paths.engine().and_then(|engine| {
        let code = match cli.command {
            Commands::Languages(args) => run_languages(&engine, args),
            Commands::Check(args) => run_check(&engine, args),
            Commands::Solutions(args) => run_solutions(&engine, args),
            Commands::Stats(args) => run_stats(&engine, args),
            Commands::ClearCache(args) => run_clear_cache(&engine, args),
        };
        engine.close();
        code
    });

    match result {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("{:?}", e);
            exit(exitcode::SOFTWARE);
        }
    }
}
