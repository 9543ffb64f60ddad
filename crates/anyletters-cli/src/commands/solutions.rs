//! Implementation of the `anyletters solutions` command.

use anyletters::{Difficulty, Engine, Filtering, LanguageCode, SolutionSource};
use miette::IntoDiagnostic;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::output::engine_report;

/// Arguments for the solutions command.
#[derive(Debug, clap::Args)]
pub struct SolutionsArgs {
    /// Language code (e.g., en, de-ch)
    #[arg(long, required = true)]
    pub lang: String,

    /// Word length
    #[arg(long, required = true)]
    pub length: usize,

    /// Difficulty (easy, medium, hard, chaos)
    #[arg(long, default_value = "medium")]
    pub difficulty: Difficulty,

    /// Skip the solution filters
    #[arg(long)]
    pub no_filters: bool,

    /// Print at most this many words
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for a solution pool.
#[derive(Serialize)]
struct PoolJson<'a> {
    language: &'a LanguageCode,
    length: usize,
    source: &'a SolutionSource,
    total: usize,
    words: Vec<&'a str>,
}

/// Run the solutions command.
pub fn run_solutions(engine: &Engine, args: SolutionsArgs) -> miette::Result<i32> {
    let language = LanguageCode::new(&args.lang);
    let filtering = if args.no_filters {
        Filtering::Disabled
    } else {
        Filtering::Enabled
    };
    let pool = engine
        .solutions(&language, args.length, args.difficulty, filtering)
        .map_err(engine_report)?;
    let limit = args.limit.unwrap_or(usize::MAX);
    let words: Vec<&str> = pool.iter().take(limit).collect();

    if args.json {
        let json = PoolJson {
            language: pool.language(),
            length: pool.length(),
            source: pool.source(),
            total: pool.len(),
            words,
        };
        println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
    } else {
        eprintln!(
            "{} {} words from {}",
            "Solutions:".bold(),
            pool.len(),
            pool.source()
        );
        for word in &words {
            println!("{word}");
        }
        if words.len() < pool.len() {
            eprintln!("{}", format!("... {} more", pool.len() - words.len()).dimmed());
        }
    }

    Ok(exitcode::OK)
}
