//! CLI command implementations.

mod check;
mod clear_cache;
mod languages;
mod solutions;
mod stats;

pub use check::{run_check, CheckArgs};
pub use clear_cache::{run_clear_cache, ClearCacheArgs};
pub use languages::{run_languages, LanguagesArgs};
pub use solutions::{run_solutions, SolutionsArgs};
pub use stats::{run_stats, StatsArgs};
