//! Implementation of the `anyletters check` command.

use anyletters::{Difficulty, Engine, RoundRequest, Verdict};
use miette::IntoDiagnostic;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::output::engine_report;

/// Arguments for the check command.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Language code (e.g., en, de-ch)
    #[arg(long, required = true)]
    pub lang: String,

    /// Word length of the round
    #[arg(long, required = true)]
    pub length: usize,

    /// Difficulty of the round (easy, medium, hard, chaos)
    #[arg(long, default_value = "medium")]
    pub difficulty: Difficulty,

    /// Guesses to check
    #[arg(required = true)]
    pub words: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for one checked guess.
#[derive(Serialize)]
struct VerdictJson<'a> {
    word: &'a str,
    valid: bool,
    verdict: &'static str,
}

/// Run the check command.
pub fn run_check(engine: &Engine, args: CheckArgs) -> miette::Result<i32> {
    let request = RoundRequest::builder()
        .language(args.lang.as_str())
        .length(args.length)
        .difficulty(args.difficulty)
        .build();
    let round = engine.start_round(&request).map_err(engine_report)?;

    let verdicts: Vec<(&str, Verdict)> = args
        .words
        .iter()
        .map(|word| (word.as_str(), round.check(word)))
        .collect();
    let all_valid = verdicts.iter().all(|(_, verdict)| verdict.is_valid());

    if args.json {
        let json: Vec<VerdictJson<'_>> = verdicts
            .iter()
            .map(|&(word, verdict)| VerdictJson {
                word,
                valid: verdict.is_valid(),
                verdict: verdict_name(verdict),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
    } else {
        for (word, verdict) in &verdicts {
            match verdict {
                Verdict::Valid => println!("{} {}", "✓".green(), word),
                Verdict::Unknown => println!("{} {} {}", "✗".red(), word, "(unknown)".dimmed()),
                Verdict::WrongLength { expected, actual } => println!(
                    "{} {} {}",
                    "✗".red(),
                    word,
                    format!("({actual} letters, expected {expected})").dimmed()
                ),
            }
        }
    }

    if all_valid {
        Ok(exitcode::OK)
    } else {
        Ok(exitcode::DATAERR)
    }
}

fn verdict_name(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Valid => "valid",
        Verdict::WrongLength { .. } => "wrong_length",
        Verdict::Unknown => "unknown",
    }
}
