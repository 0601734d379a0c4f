//! Verse lists: parsing `1-3, 5, 16a` into ordered runs and rendering runs back.

use serde::Serialize;

use crate::collation::Collator;
use crate::numerals;
use crate::patterns::Patterns;
use crate::types::Numeral;

/// A maximal run of consecutive verses, or a single non-numeric verse token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VerseGroup {
    /// Every verse from `first` through `last`.
    Run {
        /// Lowest verse of the run.
        first: u32,
        /// Highest verse of the run.
        last: u32,
    },
    /// An annotated or otherwise non-numeric verse id such as `16a`.
    Token(String),
}

impl VerseGroup {
    /// A run holding one verse.
    pub const fn single(verse: u32) -> Self {
        return VerseGroup::Run { first: verse, last: verse };
    }

    /// The first verse, or the whole token.
    pub fn first(&self) -> Numeral {
        return match self {
            VerseGroup::Run { first, .. } => Numeral::Int(*first),
            VerseGroup::Token(token) => Numeral::Opaque(token.clone()),
        };
    }

    /// The last verse, or the whole token.
    pub fn last(&self) -> Numeral {
        return match self {
            VerseGroup::Run { last, .. } => Numeral::Int(*last),
            VerseGroup::Token(token) => Numeral::Opaque(token.clone()),
        };
    }

    /// The first verse when it is a number.
    pub const fn first_int(&self) -> Option<u32> {
        return match self {
            VerseGroup::Run { first, .. } => Some(*first),
            VerseGroup::Token(_) => None,
        };
    }

    /// Every verse the group covers, in order.
    pub fn verses(&self) -> Vec<Numeral> {
        return match self {
            VerseGroup::Run { first, last } => (*first..=*last).map(Numeral::Int).collect(),
            VerseGroup::Token(token) => vec![Numeral::Opaque(token.clone())],
        };
    }

    /// Text compared when tokens and runs are interleaved.
    fn sort_text(&self) -> String {
        return self.first().to_string();
    }
}

/// How [`format_verses`] renders a verse list.
#[derive(Debug, Clone, Copy)]
pub struct VerseStyle<'a> {
    /// Placed between runs.
    pub group_separator: &'a str,
    /// Selects the default numeral script.
    pub language: &'a str,
    /// Digit table overriding the language default when it has ten entries.
    pub numerals: &'a [String],
    /// Placed before every rendered verse, e.g. `p` for paragraph ids.
    pub prefix: &'a str,
    /// Placed between the two ends of a run.
    pub range_separator: &'a str,
}

impl VerseStyle<'static> {
    /// `1-3,5` as used in site paths.
    pub const PATH: Self = Self {
        group_separator: ",",
        language: "",
        numerals: &[],
        prefix: "",
        range_separator: "-",
    };

    /// `p1-p3,p5` as used in `id=` and `context=` query parameters.
    pub const QUERY: Self = Self {
        group_separator: ",",
        language: "",
        numerals: &[],
        prefix: "p",
        range_separator: "-",
    };
}

/// Parse a verse list into ordered, non-overlapping groups.
///
/// Returns `None` when the text holds no verse at all (the whole chapter).
pub fn parse_verses(text: &str, patterns: &Patterns, collator: &Collator) -> Option<Vec<VerseGroup>> {
    let cleaned = strip_verse_ids(text);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let mut runs: Vec<(u32, u32)> = Vec::new();
    let mut tokens: Vec<String> = Vec::new();

    for part in patterns.verse_group.split(cleaned) {
        let bounds = patterns.verse_range.split(part.trim());
        let lower = bounds.first().and_then(|b| return numerals::to_int(b));
        let upper = bounds.last().and_then(|b| return numerals::to_int(b));

        match (lower, upper) {
            (Some(Numeral::Int(lo)), Some(Numeral::Int(hi))) => runs.push(ordered_run(lo, hi)),
            (Some(Numeral::Int(n)), None) | (None, Some(Numeral::Int(n))) => runs.push((n, n)),
            (None, None) => {},
            (Some(Numeral::Opaque(token)), None) | (None, Some(Numeral::Opaque(token))) => tokens.push(token),
            (Some(Numeral::Opaque(token)), Some(_)) if bounds.len() == 1 => tokens.push(token),
            // A range with an annotated end stays one token, as written.
            (Some(_), Some(_)) => tokens.push(part.trim().to_string()),
        }
    }

    let groups = order_groups(merge_runs(runs), tokens, collator);
    if groups.is_empty() {
        return None;
    }
    return Some(groups);
}

/// Coalesce ascending integers into maximal runs.
pub fn coalesce(verses: &[u32]) -> Vec<VerseGroup> {
    let runs = merge_runs(verses.iter().map(|v| return (*v, *v)).collect());
    return runs.into_iter().map(|(first, last)| return VerseGroup::Run { first, last }).collect();
}

/// Render groups as `first<range>last` joined by the group separator.
/// Only a run's endpoints are rendered.
pub fn format_verses(groups: &[VerseGroup], style: &VerseStyle<'_>) -> String {
    let verse = |n: u32| {
        let digits = numerals::format_number(n, style.language, None, style.numerals);
        return format!("{}{digits}", style.prefix);
    };

    return groups
        .iter()
        .map(|group| {
            return match group {
                VerseGroup::Run { first, last } if first == last => verse(*first),
                VerseGroup::Run { first, last } => {
                    format!("{}{}{}", verse(*first), style.range_separator, verse(*last))
                },
                VerseGroup::Token(token) => format!("{}{token}", style.prefix),
            };
        })
        .collect::<Vec<_>>()
        .join(style.group_separator);
}

/// Expand an abbreviated upper bound by borrowing the lower bound's leading
/// digits: `123-45` reads as `123-145`.
///
/// Returns `None` when the upper bound is not shorter than the lower bound,
/// or when borrowing still leaves the range inverted.
pub fn expand_abbreviated(lower: u32, upper: u32) -> Option<u32> {
    let lo = lower.to_string();
    let hi = upper.to_string();
    let borrowed = lo.len().checked_sub(hi.len()).filter(|n| return *n > 0)?;
    let expanded: u32 = format!("{}{hi}", lo.get(..borrowed)?).parse().ok()?;
    if expanded < lower {
        return None;
    }
    return Some(expanded);
}

/// A run from two parsed bounds. An inverted range is read as abbreviated;
/// when that fails only the lower bound is kept.
fn ordered_run(lower: u32, upper: u32) -> (u32, u32) {
    if lower <= upper {
        return (lower, upper);
    }
    return match expand_abbreviated(lower, upper) {
        Some(expanded) => (lower, expanded),
        None => {
            tracing::debug!(lower, upper, "inverted verse range, keeping the lower bound");
            (lower, lower)
        },
    };
}

/// Sort runs and merge any that overlap or touch.
fn merge_runs(mut runs: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    runs.sort_unstable();
    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(runs.len());
    for (first, last) in runs {
        match merged.last_mut() {
            Some(prev) if first <= prev.1.saturating_add(1) => prev.1 = prev.1.max(last),
            _ => merged.push((first, last)),
        }
    }
    return merged;
}

/// Interleave integer runs and tokens in natural order. A token that sorts
/// inside a run splits it, so tokens never merge with their neighbours.
fn order_groups(runs: Vec<(u32, u32)>, mut tokens: Vec<String>, collator: &Collator) -> Vec<VerseGroup> {
    tokens.sort();
    tokens.dedup();

    let mut runs = runs;
    for token in &tokens {
        runs = runs
            .into_iter()
            .flat_map(|(first, last)| return split_run(first, last, token, collator))
            .collect();
    }

    let mut groups: Vec<VerseGroup> = runs
        .into_iter()
        .map(|(first, last)| return VerseGroup::Run { first, last })
        .chain(tokens.into_iter().map(VerseGroup::Token))
        .collect();
    if groups.iter().any(|g| return matches!(g, VerseGroup::Token(_))) {
        groups.sort_by(|a, b| return collator.compare(&a.sort_text(), &b.sort_text()));
    }
    return groups;
}

/// Split `first..=last` around `token` if the token sorts strictly inside it.
fn split_run(first: u32, last: u32, token: &str, collator: &Collator) -> Vec<(u32, u32)> {
    let before = |n: u32| return collator.compare(&n.to_string(), token).is_lt();
    if first == last || !before(first) || before(last) {
        return vec![(first, last)];
    }

    // Largest verse still sorting before the token: `first` does, `last` does not.
    let (mut lo, mut hi) = (first, last);
    while hi.saturating_sub(lo) > 1 {
        let mid = lo.saturating_add(hi.saturating_sub(lo) / 2);
        if before(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    return vec![(first, lo), (hi, last)];
}

/// Drop the `p` of paragraph ids (`p12`) used in site paths and queries.
fn strip_verse_ids(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, c) in chars.iter().enumerate() {
        let is_id_prefix = matches!(c, 'p' | 'P')
            && chars.get(i.saturating_add(1)).is_some_and(char::is_ascii_digit)
            && i.checked_sub(1).and_then(|j| return chars.get(j)).is_none_or(|prev| return !prev.is_alphanumeric());
        if !is_id_prefix {
            out.push(*c);
        }
    }
    return out;
}
