//! `.aff` grammar parser.
//!
//! Only the directives that influence which surface forms exist are
//! interpreted: the encoding, the flag representation, flag aliases, the
//! marker flags that suppress entries, and the `PFX`/`SFX` rule blocks.
//! Everything else (compounding, suggestion tables, keyboard layouts) is
//! skipped.

use std::collections::HashMap;
use std::iter::{Enumerate, Peekable};
use std::str::Lines;

use winnow::ascii::{dec_uint, space1};
use winnow::combinator::{alt, opt, preceded};
use winnow::prelude::*;
use winnow::token::take_till;

use super::condition::Condition;
use super::encoding::Encoding;
use super::error::ParseError;
use crate::types::Flag;

/// Whether an affix attaches before or after the stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffixKind {
    Prefix,
    Suffix,
}

impl AffixKind {
    pub fn directive(self) -> &'static str {
        match self {
            AffixKind::Prefix => "PFX",
            AffixKind::Suffix => "SFX",
        }
    }
}

/// One line of a `PFX`/`SFX` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffixRule {
    pub kind: AffixKind,
    pub flag: Flag,
    /// Whether the rule may combine with a rule of the opposite kind.
    pub cross_product: bool,
    pub strip: String,
    pub append: String,
    pub condition: Condition,
}

impl AffixRule {
    /// Apply the rule to a stem, or `None` when the condition or the strip
    /// string does not match.
    ///
    /// ```
    /// use anyletters::parser::parse_affix_grammar;
    /// use anyletters::parser::AffixKind;
    ///
    /// let grammar = parse_affix_grammar("SFX G Y 1\nSFX G e ing e\n").unwrap();
    /// let rule = &grammar.rules(AffixKind::Suffix, &"G".into())[0];
    /// assert_eq!(rule.apply("bake").as_deref(), Some("baking"));
    /// assert_eq!(rule.apply("run"), None);
    /// ```
    pub fn apply(&self, stem: &str) -> Option<String> {
        self.apply_rooted(stem, stem)
    }

    /// Apply the rule to `word` while checking the condition against
    /// `root`. Used when a prefix attaches to an already suffixed stem.
    pub fn apply_rooted(&self, word: &str, root: &str) -> Option<String> {
        match self.kind {
            AffixKind::Suffix => {
                if !self.condition.matches_end(root) {
                    return None;
                }
                let base = word.strip_suffix(self.strip.as_str())?;
                Some(format!("{base}{}", self.append))
            }
            AffixKind::Prefix => {
                if !self.condition.matches_start(root) {
                    return None;
                }
                let base = word.strip_prefix(self.strip.as_str())?;
                Some(format!("{}{base}", self.append))
            }
        }
    }
}

/// How flags are written in the stem table (`FLAG` directive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlagType {
    /// One character per flag.
    #[default]
    Char,
    /// Two characters per flag.
    Long,
    /// Comma-separated decimal numbers.
    Numeric,
    /// One Unicode scalar per flag.
    Utf8,
}

impl FlagType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "char" => Some(FlagType::Char),
            "long" => Some(FlagType::Long),
            "num" => Some(FlagType::Numeric),
            "UTF-8" | "utf-8" => Some(FlagType::Utf8),
            _ => None,
        }
    }

    /// Split a flag field into individual flags.
    pub fn split(self, raw: &str) -> Result<Vec<Flag>, String> {
        match self {
            FlagType::Char | FlagType::Utf8 => Ok(raw.chars().map(Flag::from).collect()),
            FlagType::Long => {
                let chars: Vec<char> = raw.chars().collect();
                if chars.len() % 2 != 0 {
                    return Err("long flags need an even number of characters".to_string());
                }
                Ok(chars
                    .chunks(2)
                    .map(|pair| Flag::new(pair.iter().collect::<String>()))
                    .collect())
            }
            FlagType::Numeric => raw
                .split(',')
                .map(|part| {
                    let part = part.trim();
                    part.parse::<u16>()
                        .map(|n| Flag::new(n.to_string()))
                        .map_err(|_| format!("'{part}' is not a flag number"))
                })
                .collect(),
        }
    }
}

/// Flags that change whether a stem entry produces forms at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `NEEDAFFIX`: the bare stem is not a word, its affixed forms are.
    NeedAffix,
    /// `FORBIDDENWORD`: the entry produces nothing.
    Forbidden,
    /// `ONLYINCOMPOUND`: the entry only appears inside compounds.
    OnlyInCompound,
}

/// Parsed contents of one `.aff` file.
#[derive(Debug, Clone, Default)]
pub struct AffixGrammar {
    encoding: Encoding,
    flag_type: FlagType,
    prefixes: HashMap<Flag, Vec<AffixRule>>,
    suffixes: HashMap<Flag, Vec<AffixRule>>,
    aliases: Vec<Vec<Flag>>,
    markers: HashMap<Marker, Flag>,
    header_lines: HashMap<(AffixKind, Flag), usize>,
}

impl AffixGrammar {
    /// Decode and parse raw `.aff` bytes.
    ///
    /// The `SET` directive selects the decoder; without one the file is read
    /// as UTF-8 and, failing that, as ISO 8859-1.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let (encoding, text) = match Encoding::sniff(bytes)? {
            Some(encoding) => (encoding, encoding.decode(bytes)?),
            None => Encoding::decode_guess(bytes),
        };
        let mut grammar = parse_affix_grammar(&text)?;
        grammar.encoding = encoding;
        Ok(grammar)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn flag_type(&self) -> FlagType {
        self.flag_type
    }

    /// Rules of one flag group, in file order.
    pub fn rules(&self, kind: AffixKind, flag: &Flag) -> &[AffixRule] {
        self.groups(kind).get(flag).map_or(&[], Vec::as_slice)
    }

    /// Apply the first rule of a flag group that matches `stem`.
    pub fn apply_first(
        &self,
        kind: AffixKind,
        flag: &Flag,
        stem: &str,
    ) -> Option<(&AffixRule, String)> {
        self.rules(kind, flag)
            .iter()
            .find_map(|rule| rule.apply(stem).map(|form| (rule, form)))
    }

    /// Total number of rules across all groups.
    pub fn rule_count(&self) -> usize {
        self.prefixes.values().chain(self.suffixes.values()).map(Vec::len).sum()
    }

    /// The flag declared for a marker directive, if any.
    pub fn marker(&self, marker: Marker) -> Option<&Flag> {
        self.markers.get(&marker)
    }

    /// Whether `flags` carries the given marker.
    pub fn is_marked(&self, flags: &[Flag], marker: Marker) -> bool {
        self.marker(marker).is_some_and(|flag| flags.contains(flag))
    }

    /// Resolve the flag field of a stem entry, expanding `AF` aliases.
    pub fn resolve_flags(&self, raw: &str, line: usize) -> Result<Vec<Flag>, ParseError> {
        let invalid = |message: String| ParseError::InvalidFlags {
            line,
            flags: raw.to_string(),
            message,
        };
        if self.aliases.is_empty() {
            return self.flag_type.split(raw).map_err(invalid);
        }
        let index: usize = raw
            .trim()
            .parse()
            .map_err(|_| invalid("expected a flag alias number".to_string()))?;
        index
            .checked_sub(1)
            .and_then(|i| self.aliases.get(i))
            .cloned()
            .ok_or_else(|| invalid(format!("no flag alias {index}")))
    }

    fn groups(&self, kind: AffixKind) -> &HashMap<Flag, Vec<AffixRule>> {
        match kind {
            AffixKind::Prefix => &self.prefixes,
            AffixKind::Suffix => &self.suffixes,
        }
    }

    fn groups_mut(&mut self, kind: AffixKind) -> &mut HashMap<Flag, Vec<AffixRule>> {
        match kind {
            AffixKind::Prefix => &mut self.prefixes,
            AffixKind::Suffix => &mut self.suffixes,
        }
    }

    fn single_flag(&self, raw: &str, line: usize) -> Result<Flag, ParseError> {
        let mut flags = self
            .flag_type
            .split(raw)
            .map_err(|message| ParseError::InvalidFlags {
                line,
                flags: raw.to_string(),
                message,
            })?;
        match (flags.pop(), flags.is_empty()) {
            (Some(flag), true) => Ok(flag),
            _ => Err(ParseError::InvalidFlags {
                line,
                flags: raw.to_string(),
                message: "expected exactly one flag".to_string(),
            }),
        }
    }
}

/// Parse decoded `.aff` text.
pub fn parse_affix_grammar(input: &str) -> Result<AffixGrammar, ParseError> {
    let mut grammar = AffixGrammar::default();
    let mut lines = SignificantLines::new(input);

    while let Some((line_no, line)) = lines.next() {
        let mut fields = line.split_whitespace();
        let Some(directive) = fields.next() else {
            continue;
        };
        let argument = fields.next();
        match directive {
            "SET" => {
                grammar.encoding = Encoding::from_name(required(argument, line_no, "SET")?)?;
            }
            "FLAG" => {
                let name = required(argument, line_no, "FLAG")?;
                grammar.flag_type = FlagType::from_name(name).ok_or_else(|| {
                    ParseError::Syntax {
                        line: line_no,
                        message: format!("unknown flag type '{name}'"),
                    }
                })?;
            }
            "NEEDAFFIX" | "FORBIDDENWORD" | "ONLYINCOMPOUND" => {
                let marker = match directive {
                    "NEEDAFFIX" => Marker::NeedAffix,
                    "FORBIDDENWORD" => Marker::Forbidden,
                    _ => Marker::OnlyInCompound,
                };
                let flag = grammar.single_flag(required(argument, line_no, directive)?, line_no)?;
                grammar.markers.insert(marker, flag);
            }
            "AF" => parse_alias_block(&mut grammar, &mut lines, line_no, argument)?,
            "PFX" | "SFX" => parse_affix_block(&mut grammar, &mut lines, line_no, line)?,
            _ => {}
        }
    }

    Ok(grammar)
}

fn required<'a>(argument: Option<&'a str>, line: usize, directive: &str) -> Result<&'a str, ParseError> {
    argument.ok_or_else(|| ParseError::Syntax {
        line,
        message: format!("{directive} needs an argument"),
    })
}

fn parse_alias_block(
    grammar: &mut AffixGrammar,
    lines: &mut SignificantLines<'_>,
    header_line: usize,
    argument: Option<&str>,
) -> Result<(), ParseError> {
    let count: usize = required(argument, header_line, "AF")?
        .parse()
        .map_err(|_| ParseError::Syntax {
            line: header_line,
            message: "AF header needs an alias count".to_string(),
        })?;
    for _ in 0..count {
        let Some((line_no, line)) = lines.next() else {
            return Err(ParseError::Syntax {
                line: header_line,
                message: format!("AF declares {count} aliases but the file ends early"),
            });
        };
        let mut fields = line.split_whitespace();
        let (Some("AF"), Some(raw)) = (fields.next(), fields.next()) else {
            return Err(ParseError::Syntax {
                line: line_no,
                message: "expected an AF alias line".to_string(),
            });
        };
        let flags = grammar
            .flag_type
            .split(raw)
            .map_err(|message| ParseError::InvalidFlags {
                line: line_no,
                flags: raw.to_string(),
                message,
            })?;
        grammar.aliases.push(flags);
    }
    Ok(())
}

fn parse_affix_block(
    grammar: &mut AffixGrammar,
    lines: &mut SignificantLines<'_>,
    line_no: usize,
    line: &str,
) -> Result<(), ParseError> {
    let Some(header) = parse_line(line, affix_header) else {
        return Err(stray_rule(grammar, lines, line_no, line));
    };
    let flag = grammar.single_flag(header.flag, line_no)?;
    let mut rules = Vec::with_capacity(header.count);

    while rules.len() < header.count {
        let next = lines
            .peek()
            .and_then(|(n, l)| parse_line(l, affix_rule).map(|rule| (n, rule)))
            .filter(|(_, rule)| rule.kind == header.kind && rule.flag == header.flag);
        let Some((rule_line, raw)) = next else {
            return Err(ParseError::RuleCountMismatch {
                line: line_no,
                flag,
                declared: header.count,
                found: rules.len(),
            });
        };
        lines.next();
        let condition = Condition::parse(raw.condition.unwrap_or(".")).map_err(|message| {
            ParseError::Syntax {
                line: rule_line,
                message,
            }
        })?;
        rules.push(AffixRule {
            kind: header.kind,
            flag: flag.clone(),
            cross_product: header.cross_product,
            strip: zero_as_empty(raw.strip).to_string(),
            append: zero_as_empty(strip_continuation(raw.append)).to_string(),
            condition,
        });
    }

    grammar
        .header_lines
        .insert((header.kind, flag.clone()), line_no);
    grammar
        .groups_mut(header.kind)
        .entry(flag)
        .or_default()
        .extend(rules);
    Ok(())
}

/// Build the error for a rule line found outside of its block. When the
/// flag has a block already, the block declared too few rules.
fn stray_rule(
    grammar: &AffixGrammar,
    lines: &mut SignificantLines<'_>,
    line_no: usize,
    line: &str,
) -> ParseError {
    let Some(rule) = parse_line(line, affix_rule) else {
        return ParseError::Syntax {
            line: line_no,
            message: format!("malformed affix line '{line}'"),
        };
    };
    let flag = Flag::new(rule.flag);
    let (Some(declared), Some(&header_line)) = (
        grammar.groups(rule.kind).get(&flag).map(Vec::len),
        grammar.header_lines.get(&(rule.kind, flag.clone())),
    ) else {
        return ParseError::Syntax {
            line: line_no,
            message: format!("{} rule for '{flag}' before its header", rule.kind.directive()),
        };
    };
    let mut extra = 1;
    while lines
        .peek()
        .and_then(|(_, l)| parse_line(l, affix_rule))
        .is_some_and(|next| next.kind == rule.kind && next.flag == rule.flag)
    {
        lines.next();
        extra += 1;
    }
    ParseError::RuleCountMismatch {
        line: header_line,
        flag,
        declared,
        found: declared + extra,
    }
}

fn zero_as_empty(field: &str) -> &str {
    if field == "0" { "" } else { field }
}

fn strip_continuation(append: &str) -> &str {
    append.split_once('/').map_or(append, |(text, _)| text)
}

// =========================================================================
// Line grammar
// =========================================================================

struct RawHeader<'i> {
    kind: AffixKind,
    flag: &'i str,
    cross_product: bool,
    count: usize,
}

struct RawRule<'i> {
    kind: AffixKind,
    flag: &'i str,
    strip: &'i str,
    append: &'i str,
    condition: Option<&'i str>,
}

/// Run a line parser, ignoring trailing fields (morphological data).
fn parse_line<'i, O>(
    line: &'i str,
    mut parser: impl FnMut(&mut &'i str) -> ModalResult<O>,
) -> Option<O> {
    let mut remaining = line;
    let parsed = parser(&mut remaining).ok()?;
    if remaining.is_empty() || remaining.starts_with(char::is_whitespace) {
        Some(parsed)
    } else {
        None
    }
}

fn affix_header<'i>(input: &mut &'i str) -> ModalResult<RawHeader<'i>> {
    let kind = affix_kind(input)?;
    space1(input)?;
    let flag = field(input)?;
    space1(input)?;
    let cross_product = alt(('Y'.value(true), 'N'.value(false))).parse_next(input)?;
    space1(input)?;
    let count: u32 = dec_uint(input)?;
    Ok(RawHeader {
        kind,
        flag,
        cross_product,
        count: count as usize,
    })
}

fn affix_rule<'i>(input: &mut &'i str) -> ModalResult<RawRule<'i>> {
    let kind = affix_kind(input)?;
    space1(input)?;
    let flag = field(input)?;
    space1(input)?;
    let strip = field(input)?;
    space1(input)?;
    let append = field(input)?;
    let condition = opt(preceded(space1, field)).parse_next(input)?;
    Ok(RawRule {
        kind,
        flag,
        strip,
        append,
        condition,
    })
}

fn affix_kind(input: &mut &str) -> ModalResult<AffixKind> {
    alt(("PFX".value(AffixKind::Prefix), "SFX".value(AffixKind::Suffix))).parse_next(input)
}

fn field<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_till(1.., char::is_whitespace).parse_next(input)
}

// =========================================================================
// Line iteration
// =========================================================================

/// Lines with blank lines and `#` comments removed, numbered from 1.
pub(crate) struct SignificantLines<'a> {
    inner: Peekable<Enumerate<Lines<'a>>>,
}

impl<'a> SignificantLines<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            inner: input.lines().enumerate().peekable(),
        }
    }

    fn skip_insignificant(&mut self) {
        while self
            .inner
            .peek()
            .is_some_and(|(_, line)| is_insignificant(line))
        {
            self.inner.next();
        }
    }

    pub(crate) fn peek(&mut self) -> Option<(usize, &'a str)> {
        self.skip_insignificant();
        self.inner.peek().map(|(i, line)| (i + 1, line.trim()))
    }
}

impl<'a> Iterator for SignificantLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_insignificant();
        self.inner.next().map(|(i, line)| (i + 1, line.trim()))
    }
}

fn is_insignificant(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}
