//! Implementation of the `anyletters stats` command.

use anyletters::{Difficulty, Engine, Filtering, LanguageCode};
use miette::IntoDiagnostic;
use serde::Serialize;

use crate::output::engine_report;
use crate::output::table::{format_length_table, LengthStats};

/// Arguments for the stats command.
#[derive(Debug, clap::Args)]
pub struct StatsArgs {
    /// Language code (e.g., en, de-ch)
    #[arg(long, required = true)]
    pub lang: String,

    /// Difficulty whose expansion mode and filters to use
    #[arg(long, default_value = "medium")]
    pub difficulty: Difficulty,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for one word length.
#[derive(Serialize)]
struct LengthJson {
    length: usize,
    forms: usize,
    solutions: usize,
}

/// Run the stats command.
pub fn run_stats(engine: &Engine, args: StatsArgs) -> miette::Result<i32> {
    let language = LanguageCode::new(&args.lang);
    let dictionary = engine.dictionary(&language).map_err(engine_report)?;
    let forms = engine
        .expanded_forms(&language, args.difficulty.expansion_mode())
        .map_err(engine_report)?;
    let filters = engine
        .filter_set(&language, args.difficulty, Filtering::Enabled)
        .map_err(engine_report)?;

    let stats: Vec<LengthStats> = forms
        .lengths()
        .map(|length| LengthStats {
            length,
            forms: forms.count_of_length(length),
            solutions: filters.apply(&forms, length).len(),
        })
        .collect();

    if args.json {
        let json: Vec<LengthJson> = stats
            .iter()
            .map(|row| LengthJson {
                length: row.length,
                forms: row.forms,
                solutions: row.solutions,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
    } else {
        println!(
            "{}: {} stems in {} file pairs, {} forms",
            language,
            dictionary.stem_count(),
            dictionary.pairs().len(),
            forms.len()
        );
        println!("{}", format_length_table(&stats));
    }

    Ok(exitcode::OK)
}
