//! Rewrites free-form citation text into one canonical citation per
//! `; `-separated segment.
//!
//! Natural citations are ambiguous at the token level: a comma can separate
//! books, chapters or verses, and several citations may be joined by nothing
//! but whitespace. The rewrite uses the language's real book names and the
//! compiled punctuation to settle each case.

use regex::{Captures, Regex};

use crate::catalog::{Catalog, FALLBACK_LANGUAGE};
use crate::error::Error;
use crate::patterns::{Patterns, Separator};

/// Marks a segment as a site path or URL; those pass through unchanged.
pub const PATH_MARKER: &str = "/scriptures/";

/// Canonical separator placed between normalized citations.
const SEGMENT_JOIN: &str = "; ";

/// Book names and abbreviations of one language (plus English), longest first.
#[derive(Debug, Default)]
pub struct BookNames {
    /// Names as they appear in citations, after group separators are removed.
    names: Vec<String>,
    /// `(original, rewritten)` for names that contain a verse-group separator.
    rewrites: Vec<(String, String)>,
}

impl BookNames {
    /// Collect the display names and abbreviations for `language` and English.
    pub fn new(catalog: &Catalog, language: &str, verse_group: &Separator) -> Self {
        let mut originals: Vec<String> = Vec::new();
        let languages = if language == FALLBACK_LANGUAGE {
            vec![language]
        } else {
            vec![language, FALLBACK_LANGUAGE]
        };
        for tag in languages {
            for (_, translated) in catalog.names_for(tag) {
                for name in [&translated.name, &translated.abbrev] {
                    let name = name.trim();
                    if !name.is_empty() && !originals.iter().any(|n| return n == name) {
                        originals.push(name.to_string());
                    }
                }
            }
        }
        sort_longest_first(&mut originals);

        let mut rewrites = Vec::new();
        let mut names = Vec::with_capacity(originals.len());
        for original in originals {
            if verse_group.is_in(&original) {
                let rewritten = collapse_spaces(&verse_group.replace_all(&original, " "));
                rewrites.push((original, rewritten.clone()));
                names.push(rewritten);
            } else {
                names.push(original);
            }
        }
        sort_longest_first(&mut names);
        names.dedup();

        tracing::debug!(language, names = names.len(), rewrites = rewrites.len(), "book names collected");
        return Self { names, rewrites };
    }

    /// Number of distinct searchable names.
    pub fn len(&self) -> usize {
        return self.names.len();
    }

    /// Whether no names were collected.
    pub fn is_empty(&self) -> bool {
        return self.names.is_empty();
    }

    /// Replace names containing a group separator with their rewritten form.
    fn protect_separators(&self, text: &str) -> String {
        if self.rewrites.is_empty() {
            return text.to_string();
        }
        let originals: Vec<&str> = self.rewrites.iter().map(|(o, _)| return o.as_str()).collect();
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for hit in find_names(text, &originals) {
            out.push_str(text.get(cursor..hit.start).unwrap_or(""));
            if let Some((_, rewritten)) = self.rewrites.get(hit.name) {
                out.push_str(rewritten);
            }
            cursor = hit.end;
        }
        out.push_str(text.get(cursor..).unwrap_or(""));
        return out;
    }

    /// Insert a citation boundary before every book name.
    fn split_before_names(&self, text: &str) -> String {
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        let mut out = String::with_capacity(text.len().saturating_add(8));
        let mut cursor = 0;
        for hit in find_names(text, &names) {
            out.push_str(text.get(cursor..hit.start).unwrap_or(""));
            out.push_str(SEGMENT_JOIN);
            cursor = hit.start;
        }
        out.push_str(text.get(cursor..).unwrap_or(""));
        return out;
    }
}

/// Compiled rewrites used by [`Normalizer::normalize`].
#[derive(Debug)]
pub struct Normalizer {
    /// `and`, `y`, `e`, `et`, `&` before a number.
    and_connective: Regex,
    /// A chapter-verse separator repeated with only whitespace between.
    doubled_chapter_verse: Regex,
    /// English ordinal prefixes `I ` through `IV `.
    roman_ordinal: Regex,
    /// `through`, `thru`, `to`, `al`, `a`, `à` before a number.
    through_connective: Regex,
    /// `verse`, `vv.`, `versículo` and friends before a number.
    verse_introducer: Regex,
}

impl Normalizer {
    /// Compile the rewrite patterns.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if a pattern fails to compile.
    pub fn new(patterns: &Patterns) -> Result<Self, Error> {
        let cv = patterns.chapter_verse.alternation();
        return Ok(Self {
            and_connective: Regex::new(r"(?i)\s*(?:\b(?:and|y|e|et)\b|&)\s*(\d)")?,
            doubled_chapter_verse: Regex::new(&format!(r"(?:{cv})(?:\s*(?:{cv}))+"))?,
            roman_ordinal: Regex::new(r"(?i)\b(iv|iii|ii|i)\s")?,
            through_connective: Regex::new(r"(?i)\s*\b(?:through|thru|to|al|a|à)\b\s*(\d)")?,
            verse_introducer: Regex::new(
                r"(?i)[\s,]*\b(?:verses|verse|vss|vs|vv|v|versículos|versículo|versets|verset|versetto|versetti|vers)\.?\s*(\d)",
            )?,
        });
    }

    /// Rewrite raw citation text into canonical `; `-joined citations.
    pub fn normalize(&self, raw: &str, language: &str, patterns: &Patterns, names: &BookNames) -> String {
        let text = strip_boundary(raw, patterns);
        let mut citations: Vec<String> = Vec::new();

        for segment in patterns.reference.split(text) {
            let segment = strip_boundary(segment, patterns);
            if segment.is_empty() {
                continue;
            }
            if segment.contains(PATH_MARKER) {
                citations.push(segment.to_string());
                continue;
            }

            let rewritten = self.rewrite_words(segment, language, names);
            for piece in patterns.reference.split(&rewritten) {
                let piece = strip_boundary(piece, patterns);
                if !piece.is_empty() {
                    citations.extend(segment_verse_lists(piece, patterns));
                }
            }
        }

        let normalized = citations.join(SEGMENT_JOIN);
        tracing::debug!(raw, normalized = normalized.as_str(), "normalized");
        return normalized;
    }

    /// Word-level rewrites on one natural-language segment: ordinals,
    /// spaces, protected names, name boundaries, connectives, verse words.
    fn rewrite_words(&self, segment: &str, language: &str, names: &BookNames) -> String {
        let mut text = segment.to_string();

        if language == FALLBACK_LANGUAGE {
            text = self
                .roman_ordinal
                .replace_all(&text, |caps: &Captures<'_>| {
                    let ordinal = caps.get(1).map_or("", |m| return m.as_str());
                    let digit = match ordinal.to_ascii_lowercase().as_str() {
                        "i" => "1",
                        "ii" => "2",
                        "iii" => "3",
                        _ => "4",
                    };
                    return format!("{digit} ");
                })
                .into_owned();
        }

        text = text.replace(['\u{a0}', '\u{202f}'], " ");
        text = names.protect_separators(&text);
        text = names.split_before_names(&text);
        text = self.and_connective.replace_all(&text, ",$1").into_owned();
        text = self.through_connective.replace_all(&text, "-$1").into_owned();
        text = self.verse_introducer.replace_all(&text, ":$1").into_owned();
        text = self.doubled_chapter_verse.replace_all(&text, ":").into_owned();
        return text;
    }
}

/// One name occurrence found by [`find_names`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NameHit {
    /// Byte offset just past the match.
    end: usize,
    /// Index into the searched name list.
    name: usize,
    /// Byte offset of the match.
    start: usize,
}

/// Resolve what the commas in one citation mean.
///
/// Without a chapter-verse separator every comma separates chapters, so each
/// part becomes its own citation. With one, parts carrying a separator start
/// a new citation and bare parts extend the current citation's verse list.
fn segment_verse_lists(citation: &str, patterns: &Patterns) -> Vec<String> {
    let parts: Vec<&str> = patterns
        .verse_group
        .split(citation)
        .into_iter()
        .map(str::trim)
        .filter(|p| return !p.is_empty())
        .collect();

    if !patterns.chapter_verse.is_in(citation) {
        return parts.into_iter().map(str::to_string).collect();
    }

    let mut out: Vec<String> = Vec::new();
    for part in parts {
        match out.last_mut() {
            Some(current) if !patterns.chapter_verse.is_in(part) && patterns.chapter_verse.is_in(current.as_str()) => {
                current.push(',');
                current.push_str(part);
            },
            _ => out.push(part.to_string()),
        }
    }
    return out;
}

/// Trim whitespace and boundary punctuation, then one trailing `:`.
pub fn strip_boundary<'t>(text: &'t str, patterns: &Patterns) -> &'t str {
    let mut text = text.trim();
    loop {
        let before = text.len();
        for token in boundary_tokens(patterns) {
            text = text.strip_prefix(token).unwrap_or(text);
            text = text.strip_suffix(token).unwrap_or(text);
            text = text.trim();
        }
        if text.len() == before {
            break;
        }
    }

    for token in patterns.chapter_verse.tokens() {
        if let Some(stripped) = text.strip_suffix(token.as_str()) {
            return stripped.trim_end();
        }
    }
    return text;
}

/// Punctuation stripped from both ends of a citation.
fn boundary_tokens(patterns: &Patterns) -> impl Iterator<Item = &str> {
    return patterns
        .reference
        .tokens()
        .iter()
        .chain(patterns.verse_group.tokens())
        .chain(patterns.verse_range.tokens())
        .map(String::as_str)
        .chain(["(", ";", ",", "."]);
}

/// Non-overlapping, case-insensitive whole-word occurrences of `names`,
/// scanning left to right and preferring earlier (longer) names.
fn find_names(text: &str, names: &[&str]) -> Vec<NameHit> {
    let mut hits = Vec::new();
    let mut pos = 0;
    while let Some(rest) = text.get(pos..).filter(|r| return !r.is_empty()) {
        let prev = text.get(..pos).and_then(|before| return before.chars().next_back());
        let hit = names.iter().enumerate().find_map(|(index, name)| {
            if !starts_word(prev, name) {
                return None;
            }
            let len = match_len(rest, name)?;
            let next = rest.get(len..).and_then(|after| return after.chars().next());
            if next.is_some_and(char::is_alphabetic) {
                return None;
            }
            return Some(NameHit {
                end: pos.saturating_add(len),
                name: index,
                start: pos,
            });
        });

        match hit {
            Some(found) => {
                pos = found.end;
                hits.push(found);
            },
            None => pos = pos.saturating_add(rest.chars().next().map_or(1, char::len_utf8)),
        }
    }
    return hits;
}

/// A name may start here unless it would continue a word, a slug, or a number.
fn starts_word(prev: Option<char>, name: &str) -> bool {
    let Some(prev) = prev else { return true };
    if prev.is_alphabetic() || prev == '-' {
        return false;
    }
    let name_starts_with_digit = name.chars().next().is_some_and(char::is_numeric);
    return !(prev.is_numeric() && name_starts_with_digit);
}

/// Byte length of `name` matched case-insensitively at the start of `text`.
fn match_len(text: &str, name: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    for expected in name.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    return Some(chars.next().map_or(text.len(), |(i, _)| return i));
}

/// Longer names first so the scan prefers them; ties alphabetical.
fn sort_longest_first(names: &mut [String]) {
    names.sort_by(|a, b| return b.chars().count().cmp(&a.chars().count()).then_with(|| return a.cmp(b)));
}

/// Collapse whitespace runs to one space.
fn collapse_spaces(text: &str) -> String {
    return text.split_whitespace().collect::<Vec<_>>().join(" ");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::fixture;

    fn normalize(raw: &str, language: &str) -> String {
        let catalog = fixture();
        let patterns = Patterns::compile(catalog.summary()).unwrap();
        let names = BookNames::new(&catalog, language, &patterns.verse_group);
        let normalizer = Normalizer::new(&patterns).unwrap();
        return normalizer.normalize(raw, language, &patterns, &names);
    }

    #[test]
    fn boundary_punctuation_is_stripped() {
        assert_eq!(normalize("  ;John 3:16, ", "en"), "John 3:16");
        assert_eq!(normalize("(Alma 5.", "en"), "Alma 5");
        assert_eq!(normalize("Alma 5:", "en"), "Alma 5");
        assert_eq!(normalize("", "en"), "");
    }

    #[test]
    fn roman_ordinals_in_english() {
        assert_eq!(normalize("II Corinthians 5:17", "en"), "2 Corinthians 5:17");
        assert_eq!(normalize("i nephi 3:7", "en"), "1 nephi 3:7");
        assert_eq!(normalize("II Corintios 5:17", "es"), "II Corintios 5:17");
    }

    #[test]
    fn whitespace_joined_citations_are_split() {
        assert_eq!(normalize("Genesis 1:2 1 Nephi 3:7", "en"), "Genesis 1:2; 1 Nephi 3:7");
        assert_eq!(normalize("John 3:16 1 John 2:3", "en"), "John 3:16; 1 John 2:3");
        assert_eq!(normalize("1-john 2", "en"), "1-john 2");
    }

    #[test]
    fn connectives_become_separators() {
        assert_eq!(normalize("John 3:16 and 18", "en"), "John 3:16,18");
        assert_eq!(normalize("John 3:16 through 18", "en"), "John 3:16-18");
        assert_eq!(normalize("Juan 3:16 al 18", "es"), "Juan 3:16-18");
        assert_eq!(normalize("Doctrine and Covenants 76", "en"), "Doctrine and Covenants 76");
    }

    #[test]
    fn verse_words_become_chapter_verse_separators() {
        assert_eq!(normalize("John 3 verse 16", "en"), "John 3:16");
        assert_eq!(normalize("John 3, vv. 16-17", "en"), "John 3:16-17");
        assert_eq!(normalize("Juan 3 versículo 16", "es"), "Juan 3:16");
    }

    #[test]
    fn verse_abbreviations_attached_to_the_number() {
        assert_eq!(normalize("John 3 v16", "en"), "John 3:16");
        assert_eq!(normalize("John 3 vv16-18", "en"), "John 3:16-18");
        assert_eq!(normalize("John 3 vs.16", "en"), "John 3:16");
        assert_eq!(normalize("Revelation 3", "en"), "Revelation 3");
    }

    #[test]
    fn bare_comma_lists_are_chapters() {
        assert_eq!(normalize("Genesis 1, 2", "en"), "Genesis 1; 2");
    }

    #[test]
    fn comma_parts_join_the_current_verse_list() {
        assert_eq!(normalize("John 3:16, 18, 4:2", "en"), "John 3:16,18; 4:2");
    }

    #[test]
    fn names_with_commas_survive() {
        assert_eq!(normalize("José Smith, Historia 1:17, 19", "es"), "José Smith Historia 1:17,19");
    }

    #[test]
    fn paths_pass_through() {
        let url = "https://www.churchofjesuschrist.org/study/scriptures/ot/gen/3?id=p1-p3&lang=eng#p1";
        assert_eq!(normalize(url, "en"), url);
    }

    #[test]
    fn han_citations_split_without_spaces() {
        assert_eq!(normalize("約翰福音3：16創世記1：1", "zh-Hant"), "約翰福音3：16; 創世記1：1");
    }

    #[test]
    fn normalizing_twice_is_stable() {
        for raw in ["Genesis 1:2 1 Nephi 3:7", "John 3:16 and 18, 4:2", "Genesis 1, 2"] {
            let once = normalize(raw, "en");
            assert_eq!(normalize(&once, "en"), once);
        }
    }
}
