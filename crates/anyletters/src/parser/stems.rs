//! `.dic` stem table parser.

use thiserror::Error;

use super::affix::AffixGrammar;
use super::error::ParseError;
use crate::types::Flag;

/// One stem with the flags attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemEntry {
    pub stem: String,
    pub flags: Vec<Flag>,
}

impl StemEntry {
    pub fn has_flag(&self, flag: &Flag) -> bool {
        self.flags.contains(flag)
    }
}

/// A recoverable problem with a stem table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StemWarning {
    /// The first line is not an entry count.
    #[error("stem table has no entry count line")]
    MissingCount,

    /// The entry count is off by more than a factor of two.
    #[error("stem table declares {declared} entries but contains {parsed}")]
    CountMismatch { declared: usize, parsed: usize },
}

/// Parsed contents of one `.dic` file.
#[derive(Debug, Clone, Default)]
pub struct StemTable {
    entries: Vec<StemEntry>,
    declared_count: Option<usize>,
    warnings: Vec<StemWarning>,
}

impl StemTable {
    /// Decode raw `.dic` bytes with the grammar's encoding and parse them.
    pub fn from_bytes(bytes: &[u8], grammar: &AffixGrammar) -> Result<Self, ParseError> {
        let text = grammar.encoding().decode(bytes)?;
        parse_stem_table(&text, grammar)
    }

    pub fn entries(&self) -> &[StemEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &StemEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry count from the first line, if there was one.
    pub fn declared_count(&self) -> Option<usize> {
        self.declared_count
    }

    pub fn warnings(&self) -> &[StemWarning] {
        &self.warnings
    }
}

/// Parse decoded `.dic` text against a grammar.
pub fn parse_stem_table(input: &str, grammar: &AffixGrammar) -> Result<StemTable, ParseError> {
    let mut table = StemTable::default();
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !is_skipped(line))
        .peekable();

    match lines.peek().and_then(|(_, line)| line.trim().parse::<usize>().ok()) {
        Some(count) => {
            table.declared_count = Some(count);
            lines.next();
        }
        None => table.warnings.push(StemWarning::MissingCount),
    }

    for (line_no, line) in lines {
        let (stem, raw_flags) = split_entry(line);
        if stem.is_empty() {
            continue;
        }
        let mut flags = match raw_flags {
            Some(raw) if !raw.is_empty() => grammar.resolve_flags(raw, line_no)?,
            _ => Vec::new(),
        };
        dedup_in_order(&mut flags);
        table.entries.push(StemEntry { stem, flags });
    }

    if let Some(declared) = table.declared_count {
        let parsed = table.entries.len();
        if parsed.saturating_mul(2) < declared || parsed > declared.saturating_mul(2) {
            table
                .warnings
                .push(StemWarning::CountMismatch { declared, parsed });
        }
    }

    Ok(table)
}

/// Blank lines, tab-indented lines and `#` comments carry no entry.
fn is_skipped(line: &str) -> bool {
    line.starts_with('\t') || line.trim().is_empty() || line.trim_start().starts_with('#')
}

/// Split `stem[/flags][ morph...]`, honouring `\/` inside the stem.
fn split_entry(line: &str) -> (String, Option<&str>) {
    let line = line.trim_start();
    let mut stem = String::new();
    let mut chars = line.char_indices().peekable();
    while let Some((index, c)) = chars.next() {
        match c {
            '\\' if chars.peek().is_some_and(|(_, next)| *next == '/') => {
                stem.push('/');
                chars.next();
            }
            '/' => {
                let rest = &line[index + 1..];
                let flags = rest.split(char::is_whitespace).next().unwrap_or_default();
                return (stem, Some(flags));
            }
            c if c.is_whitespace() => return (stem, None),
            c => stem.push(c),
        }
    }
    (stem, None)
}

fn dedup_in_order(flags: &mut Vec<Flag>) {
    let mut seen = Vec::with_capacity(flags.len());
    flags.retain(|flag| {
        if seen.contains(flag) {
            false
        } else {
            seen.push(flag.clone());
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_plain_stem() {
        assert_eq!(split_entry("hello"), ("hello".to_string(), None));
    }

    #[test]
    fn split_stem_with_flags_and_morphology() {
        assert_eq!(
            split_entry("bake/GS po:verb"),
            ("bake".to_string(), Some("GS"))
        );
    }

    #[test]
    fn split_escaped_slash() {
        assert_eq!(
            split_entry(r"km\/h/S"),
            ("km/h".to_string(), Some("S"))
        );
    }

    #[test]
    fn split_stops_at_whitespace() {
        assert_eq!(
            split_entry("word\tst:word"),
            ("word".to_string(), None)
        );
    }
}
