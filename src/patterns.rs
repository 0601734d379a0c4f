//! Separator patterns compiled once from the metadata punctuation tables.

use regex::Regex;

use crate::catalog::PunctuationSummary;
use crate::error::Error;

/// One punctuation role: every equivalent token and the alternation matching any of them.
#[derive(Debug, Clone)]
pub struct Separator {
    /// Escaped tokens joined with `|`, for embedding in larger patterns.
    alternation: String,
    /// Compiled form of `alternation`.
    regex: Regex,
    /// Literal tokens, longest first.
    tokens: Vec<String>,
}

impl Separator {
    /// Build a separator from metadata variants (trimmed) plus fixed fallbacks (kept as is).
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if the alternation fails to compile.
    pub fn compile(variants: &[String], fallbacks: &[&str]) -> Result<Self, Error> {
        let mut tokens: Vec<String> = variants
            .iter()
            .map(|v| return v.trim().to_string())
            .chain(fallbacks.iter().map(|f| return (*f).to_string()))
            .filter(|t| return !t.is_empty())
            .collect();
        tokens.sort_by(|a, b| {
            return b.chars().count().cmp(&a.chars().count()).then_with(|| return a.cmp(b));
        });
        tokens.dedup();

        let alternation = tokens
            .iter()
            .map(|t| return regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&alternation)?;

        return Ok(Self { alternation, regex, tokens });
    }

    /// The escaped alternation, without grouping.
    pub fn alternation(&self) -> &str {
        return &self.alternation;
    }

    /// Literal tokens, longest first.
    pub fn tokens(&self) -> &[String] {
        return &self.tokens;
    }

    /// The compiled alternation.
    pub const fn regex(&self) -> &Regex {
        return &self.regex;
    }

    /// Whether any token occurs in `text`.
    pub fn is_in(&self, text: &str) -> bool {
        return self.regex.is_match(text);
    }

    /// Number of token occurrences in `text`.
    pub fn count_in(&self, text: &str) -> usize {
        return self.regex.find_iter(text).count();
    }

    /// Split at every occurrence.
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        return self.regex.split(text).collect();
    }

    /// Split at the first occurrence only.
    pub fn split_once<'t>(&self, text: &'t str) -> Option<(&'t str, &'t str)> {
        let found = self.regex.find(text)?;
        return Some((text.get(..found.start())?, text.get(found.end()..)?));
    }

    /// Replace every occurrence with `with`.
    pub fn replace_all(&self, text: &str, with: &str) -> String {
        return self.regex.replace_all(text, regex::NoExpand(with)).into_owned();
    }
}

/// Separator patterns for every punctuation role.
#[derive(Debug, Clone)]
pub struct Patterns {
    /// Between chapter and verses, `:` in English.
    pub chapter_verse: Separator,
    /// Closes a parenthesised aside.
    pub closing_parenthesis: Separator,
    /// Opens a parenthesised aside.
    pub opening_parenthesis: Separator,
    /// Between whole citations, `;` in English.
    pub reference: Separator,
    /// Between verse groups, `,` in English.
    pub verse_group: Separator,
    /// Between the ends of a verse range, `-` in English.
    pub verse_range: Separator,
}

impl Patterns {
    /// Compile every role from the cross-language punctuation summary.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if a role's alternation fails to compile.
    pub fn compile(summary: &PunctuationSummary) -> Result<Self, Error> {
        let patterns = Self {
            chapter_verse: Separator::compile(&summary.chapter_verse_separator, &[":"])?,
            closing_parenthesis: Separator::compile(&summary.closing_parenthesis, &[")"])?,
            opening_parenthesis: Separator::compile(&summary.opening_parenthesis, &["("])?,
            reference: Separator::compile(&summary.reference_separator, &[";", "\n"])?,
            verse_group: Separator::compile(&summary.verse_group_separator, &[","])?,
            verse_range: Separator::compile(&summary.verse_range_separator, &["-", "–", "〜"])?,
        };
        tracing::debug!(
            reference = patterns.reference.alternation(),
            chapter_verse = patterns.chapter_verse.alternation(),
            verse_group = patterns.verse_group.alternation(),
            verse_range = patterns.verse_range.alternation(),
            "separator patterns compiled"
        );
        return Ok(patterns);
    }
}
