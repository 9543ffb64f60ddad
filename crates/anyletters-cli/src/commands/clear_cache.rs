//! Implementation of the `anyletters clear-cache` command.

use anyletters::{CacheScope, Engine, LanguageCode};
use miette::IntoDiagnostic;

/// Arguments for the clear-cache command.
#[derive(Debug, clap::Args)]
pub struct ClearCacheArgs {
    /// Only clear this language (default: everything)
    pub lang: Option<String>,
}

/// Run the clear-cache command.
pub fn run_clear_cache(engine: &Engine, args: ClearCacheArgs) -> miette::Result<i32> {
    if engine.cache().is_none() {
        eprintln!("cache disabled, nothing to clear");
        return Ok(exitcode::OK);
    }
    let scope = match &args.lang {
        Some(lang) => CacheScope::Language(LanguageCode::new(lang)),
        None => CacheScope::All,
    };
    let removed = engine.clear_cache(&scope).into_diagnostic()?;
    println!("removed {removed} cache records");
    Ok(exitcode::OK)
}
