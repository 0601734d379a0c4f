//! Turns normalized citation text into [`Reference`]s.
//!
//! Each `;`-separated segment is either a site path (`/scriptures/bofm/1-ne/3.7`,
//! possibly inside a URL) or a natural citation (`1 Nephi 3:7`). Both forms are
//! split into book, chapter and verse substrings, the book is matched against
//! the catalog, and omitted books and chapters are carried over from the
//! previous citation.

use unicode_normalization::UnicodeNormalization as _;
use unicode_normalization::char::is_combining_mark;

use crate::catalog::Catalog;
use crate::collation::Collator;
use crate::normalizer::{PATH_MARKER, strip_boundary};
use crate::numerals;
use crate::patterns::Patterns;
use crate::reference::Reference;
use crate::types::Numeral;
use crate::verses::{self, VerseGroup};

/// Slug a singular display form resolves to, for books whose canonical slug is plural.
pub(crate) const SLUG_ALIASES: [(&str, &str); 5] = [
    ("doctrine-and-covenants", "sections"),
    ("facsimile", "facsimiles"),
    ("jst-psalm", "jst-psalms"),
    ("official-declaration", "official-declarations"),
    ("psalm", "psalms"),
];

/// Book whose numbered sub-documents fold into `fac-N` chapter keys.
const FACSIMILES: &str = "facsimiles";

/// Everything the resolver reads while walking a citation list.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Books, publications and names.
    pub catalog: &'a Catalog,
    /// Orders non-numeric verse tokens.
    pub collator: &'a Collator,
    /// Separators citations are split on.
    pub patterns: &'a Patterns,
}

/// The substrings of one citation before any lookup.
#[derive(Debug, Default, PartialEq, Eq)]
struct RawCitation {
    /// Book name, abbreviation or site path; empty when omitted.
    book: String,
    /// Chapter text; empty when omitted.
    chapter: String,
    /// Parenthesised context verses.
    context: Option<String>,
    /// Whether `book` is a site path rather than a display name.
    is_path: bool,
    /// Highlighted verses.
    verses: Option<String>,
}

/// The book and chapter the previous citation settled on.
#[derive(Debug, Default)]
struct Carry {
    /// Book an elided citation continues.
    book: Option<String>,
    /// Chapter a verses-only citation continues.
    chapter: Option<Numeral>,
}

/// Resolve every citation in normalized text, in input order.
///
/// Never fails: unknown books keep their raw text and unparseable numbers
/// stay opaque.
pub fn resolve(normalized: &str, language: &str, ctx: &ResolveContext<'_>) -> Vec<Reference> {
    let mut references = Vec::new();
    let mut carry = Carry::default();

    for segment in ctx.patterns.reference.split(normalized) {
        let segment = strip_boundary(segment, ctx.patterns);
        if segment.is_empty() {
            continue;
        }

        let raw = if segment.contains(PATH_MARKER) {
            split_path(segment)
        } else {
            split_natural(segment, ctx.patterns)
        };
        references.push(resolve_citation(&raw, language, ctx, &mut carry));
    }

    tracing::debug!(citations = references.len(), "resolved");
    return references;
}

/// Resolve one citation, continuing from and updating `carry`.
fn resolve_citation(raw: &RawCitation, language: &str, ctx: &ResolveContext<'_>, carry: &mut Carry) -> Reference {
    let mut chapter = numerals::to_int(&raw.chapter);
    let mut verse_groups = parse_groups(raw.verses.as_deref(), ctx);
    let context_verse_groups = parse_groups(raw.context.as_deref(), ctx);

    let mut reference = Reference::new(language);
    let found = if raw.book.is_empty() {
        None
    } else if raw.is_path {
        slug_for_path(ctx.catalog, &raw.book, chapter.as_ref())
    } else {
        find_slug(ctx.catalog, &raw.book)
    };
    let found = found.map(|slug| return alias(&slug).map_or(slug, str::to_string));

    let book = match found {
        None if raw.book.is_empty() => {
            reference.book_elided = carry.book.is_some();
            carry.book.clone()
        },
        None => {
            tracing::warn!(text = raw.book.as_str(), "no book matches citation text");
            reference.book_text = Some(raw.book.clone());
            None
        },
        Some(slug) => {
            reference.book_elided = carry.book.as_deref() == Some(slug.as_str());
            Some(slug)
        },
    };

    if reference.book_elided && chapter.is_none() {
        chapter.clone_from(&carry.chapter);
    }

    if book.as_deref() == Some(FACSIMILES) {
        fold_facsimile_number(&mut chapter, &mut verse_groups);
    }

    if book.as_deref().is_some_and(|slug| return ctx.catalog.is_publication(slug)) {
        carry.book = None;
        carry.chapter = None;
    } else {
        carry.book.clone_from(&book);
        carry.chapter.clone_from(&chapter);
    }

    match book {
        Some(slug) if ctx.catalog.is_publication(&slug) => reference.publication = Some(slug),
        Some(slug) => {
            reference.publication = ctx.catalog.publication_of(&slug).map(str::to_string);
            if reference.publication.is_none() {
                tracing::warn!(slug = slug.as_str(), "book is not part of any publication");
            }
            reference.book = Some(slug);
        },
        None => {},
    }

    if !verse_groups.is_empty() && chapter.is_none() {
        chapter = only_chapter(ctx.catalog, reference.book.as_deref());
        if chapter.is_none() {
            tracing::warn!(verses = raw.verses.as_deref().unwrap_or(""), "verses without a chapter, dropping them");
            verse_groups.clear();
        }
    }

    reference.chapter = chapter;
    reference.verse_groups = verse_groups;
    reference.context_verse_groups = context_verse_groups;
    return reference;
}

/// Verse groups of an optional verse list; empty when absent.
fn parse_groups(text: Option<&str>, ctx: &ResolveContext<'_>) -> Vec<VerseGroup> {
    return text
        .and_then(|t| return verses::parse_verses(t, ctx.patterns, ctx.collator))
        .unwrap_or_default();
}

/// `Facsimile 2` means the chapter `fac-2`; a bare `Facsimile :2` means the same.
fn fold_facsimile_number(chapter: &mut Option<Numeral>, verse_groups: &mut Vec<VerseGroup>) {
    match (chapter.as_ref(), verse_groups.as_slice()) {
        (Some(&Numeral::Int(n)), _) => *chapter = Some(Numeral::Opaque(format!("fac-{n}"))),
        (None, &[VerseGroup::Run { first, last }]) if first == last => {
            *chapter = Some(Numeral::Opaque(format!("fac-{first}")));
            verse_groups.clear();
        },
        _ => {},
    }
    return;
}

/// The chapter of a single-chapter book.
fn only_chapter(catalog: &Catalog, book: Option<&str>) -> Option<Numeral> {
    let chapters = &catalog.book(book?)?.chapters;
    return match chapters.as_slice() {
        [only] => Some(only.clone()),
        _ => None,
    };
}

/// The plural slug a singular display form stands for.
fn alias(slug: &str) -> Option<&'static str> {
    return SLUG_ALIASES
        .iter()
        .find(|(from, _)| return *from == slug)
        .map(|(_, to)| return *to);
}

// ── Book lookup ───────────────────────────────────────────────────────

/// Exact display-name lookup, then a fuzzy pass over every known name.
fn find_slug(catalog: &Catalog, text: &str) -> Option<String> {
    if let Some(slug) = catalog.slug_for_name(text) {
        return Some(slug.to_string());
    }

    let wanted = fold_for_compare(text);
    if wanted.is_empty() {
        return None;
    }
    // Folding is not injective, so this stays a linear scan in document order.
    return catalog
        .name_index()
        .find(|(name, _)| return fold_for_compare(name) == wanted)
        .map(|(_, slug)| return slug.to_string());
}

/// Letters and digits only, decomposed and lowercased.
fn fold_for_compare(text: &str) -> String {
    return text
        .nfkd()
        .filter(|c| return c.is_alphanumeric() && !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
}

/// Match a site path. Books sharing a path are told apart by the chapter.
fn slug_for_path(catalog: &Catalog, path: &str, chapter: Option<&Numeral>) -> Option<String> {
    let path = path.trim_end_matches('/');
    if let Some(chapter) = chapter {
        let owner = catalog
            .books()
            .find(|(_, book)| return book.church_uri == path && book.chapters.contains(chapter));
        if let Some((slug, _)) = owner {
            return Some(slug.to_string());
        }
    }
    return catalog.slug_for_path(path).map(str::to_string);
}

// ── Citation forms ────────────────────────────────────────────────────

/// Split a site path or URL:
/// `/scriptures/ot/gen/3.1-3(4)`, `.../gen/3?id=p1-p3&context=p4#p1`.
fn split_path(segment: &str) -> RawCitation {
    let after = segment.split_once(PATH_MARKER).map_or("", |(_, rest)| return rest);
    let full = format!("{PATH_MARKER}{after}");

    let (rest, fragment) = split_off(&full, '#');
    let (mut path, query) = split_off(rest, '?');

    let mut verses = None;
    let mut context = None;
    if let Some((before, dotted)) = path.split_once('.') {
        path = before;
        let dotted = dotted.replace(')', "");
        match dotted.split_once('(') {
            Some((v, c)) => {
                verses = Some(v.to_string());
                context = Some(c.to_string());
            },
            None => verses = Some(dotted),
        }
    } else if let Some(id) = query.and_then(|q| return query_param(q, "id")) {
        verses = Some(id.to_string());
        context = query.and_then(|q| return query_param(q, "context")).map(str::to_string);
    } else if let Some(paragraph) = fragment.filter(|f| return is_paragraph_id(f)) {
        verses = Some(paragraph.to_string());
    }

    let path = path.trim_end_matches('/');
    let (book, chapter) = if path.matches('/').count() > 3 {
        path.rsplit_once('/').unwrap_or((path, ""))
    } else {
        (path, "")
    };

    return RawCitation {
        book: book.to_string(),
        chapter: chapter.to_string(),
        context,
        is_path: true,
        verses,
    };
}

/// Split at the first `marker`, keeping what follows it if present.
fn split_off(text: &str, marker: char) -> (&str, Option<&str>) {
    return match text.split_once(marker) {
        Some((head, tail)) => (head, Some(tail)),
        None => (text, None),
    };
}

/// Value of one `name=value` pair in a query string.
fn query_param<'q>(query: &'q str, name: &str) -> Option<&'q str> {
    return query
        .split('&')
        .filter_map(|pair| return pair.split_once('='))
        .find(|(key, _)| return *key == name)
        .map(|(_, value)| return value);
}

/// `p12`, the site's paragraph anchor for verse 12.
fn is_paragraph_id(fragment: &str) -> bool {
    return fragment
        .strip_prefix('p')
        .is_some_and(|digits| return !digits.is_empty() && digits.chars().all(|c| return c.is_ascii_digit()));
}

/// Split a natural citation: `1 Nephi 3:7 (8)` into book, chapter, verses, context.
///
/// With more than one chapter-verse separator nothing is treated as verses
/// and the whole text becomes book and chapter.
fn split_natural(segment: &str, patterns: &Patterns) -> RawCitation {
    let segment = strip_trailing_noise(segment, patterns);

    let (unparsed, verses, context) = match patterns.chapter_verse.split_once(&segment) {
        Some((head, tail)) if patterns.chapter_verse.count_in(&segment) == 1 => {
            let tail = patterns.closing_parenthesis.replace_all(tail, "");
            match patterns.opening_parenthesis.split_once(&tail) {
                Some((v, c)) => (head, Some(v.to_string()), Some(c.to_string())),
                None => (head, Some(tail.clone()), None),
            }
        },
        _ => (segment.as_str(), None, None),
    };

    let (book, chapter) = split_chapter(unparsed, patterns);
    return RawCitation {
        book: book.to_string(),
        chapter: chapter.to_string(),
        context,
        is_path: false,
        verses,
    };
}

/// Separate the trailing run of digits and separators (the chapter) from the book.
fn split_chapter<'t>(text: &'t str, patterns: &Patterns) -> (&'t str, &'t str) {
    let is_chapter_char = |c: char| {
        return c.is_numeric()
            || [&patterns.verse_range, &patterns.verse_group, &patterns.chapter_verse]
                .iter()
                .any(|sep| return sep.tokens().iter().any(|t| return t.contains(c)));
    };
    let cut = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| return is_chapter_char(*c))
        .last()
        .map_or(text.len(), |(i, _)| return i);

    let (book, chapter) = text.split_at(cut);
    return (book.trim(), chapter.trim());
}

/// Drop words after the verse list that are neither numbers nor punctuation:
/// `John 3:16 is quoted often` keeps `John 3:16`.
fn strip_trailing_noise(segment: &str, patterns: &Patterns) -> String {
    let Some(found) = patterns.chapter_verse.regex().find(segment) else {
        return segment.to_string();
    };
    let (head, tail) = segment.split_at(found.end());

    let kept: Vec<&str> = tail
        .split_whitespace()
        .enumerate()
        .take_while(|(i, word)| {
            return *i == 0 || word.chars().any(char::is_numeric) || word.chars().all(|c| return !c.is_alphanumeric());
        })
        .map(|(_, word)| return word)
        .collect();
    return format!("{head}{}", kept.join(" "));
}
