//! Implementation of the `anyletters languages` command.

use anyletters::Engine;
use miette::IntoDiagnostic;
use serde::Serialize;

use crate::output::engine_report;

/// Arguments for the languages command.
#[derive(Debug, clap::Args)]
pub struct LanguagesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for one installed language.
#[derive(Serialize)]
struct LanguageJson<'a> {
    code: &'a str,
    directory: &'a str,
}

/// Run the languages command.
pub fn run_languages(engine: &Engine, args: LanguagesArgs) -> miette::Result<i32> {
    let languages = engine.languages().map_err(engine_report)?;

    if args.json {
        let json: Vec<LanguageJson<'_>> = languages
            .iter()
            .map(|entry| LanguageJson {
                code: entry.code.as_str(),
                directory: &entry.directory,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
    } else if languages.is_empty() {
        eprintln!(
            "no dictionaries found under {}",
            engine.dictionaries_root().display()
        );
    } else {
        for entry in &languages {
            println!("{}", entry.code);
        }
    }

    Ok(exitcode::OK)
}
