//! Reordering resolved references: canonical (traditional) or alphabetical by
//! localized book name.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::collation::{Collator, is_han_language};
use crate::numerals;
use crate::patterns::Patterns;
use crate::reference::{Reference, display_slug};
use crate::types::{Numeral, SortMode};

/// Sorts after every real position.
const UNMATCHED: u32 = u32::MAX;

/// Fixed headings Han-script languages are bucketed under.
const LATIN_HEADINGS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 1-based position of every book slug in some ordering.
#[derive(Debug, Clone, Default)]
pub struct BookIndex {
    /// Position by slug.
    positions: HashMap<String, u32>,
}

impl BookIndex {
    /// Canonical structure order.
    pub fn traditional(catalog: &Catalog) -> Self {
        return Self::from_order(catalog.books().map(|(slug, _)| return slug));
    }

    /// Alphabetical order of localized book names.
    ///
    /// Books are filed under the first letter of their display name; headings
    /// sort by the collator, books under one heading keep canonical order, and
    /// names that start with no letter come first. Han-script languages use the
    /// Latin headings A to Z, with every other name filed after Z.
    pub fn alphabetical(catalog: &Catalog, collator: &Collator) -> Self {
        let language = collator.language();
        let han = is_han_language(language);

        let mut underflow: Vec<&str> = Vec::new();
        let mut overflow: Vec<&str> = Vec::new();
        let mut buckets: Vec<(String, Vec<&str>)> = Vec::new();

        for (slug, _) in catalog.books() {
            let name = catalog.display_name(language, display_slug(slug), false).unwrap_or_else(|| return slug.to_string());
            let heading = collator.index_letter(&name);
            let heading = match heading {
                Some(letter) if han && !LATIN_HEADINGS.contains(letter.as_str()) => {
                    overflow.push(slug);
                    continue;
                },
                Some(letter) => letter,
                None => {
                    underflow.push(slug);
                    continue;
                },
            };
            match buckets.iter_mut().find(|(h, _)| return *h == heading) {
                Some((_, slugs)) => slugs.push(slug),
                None => buckets.push((heading, vec![slug])),
            }
        }

        buckets.sort_by(|(a, _), (b, _)| return collator.compare(a, b));
        tracing::debug!(language, headings = buckets.len(), "alphabetical book index built");

        let order = underflow
            .into_iter()
            .chain(buckets.into_iter().flat_map(|(_, slugs)| return slugs))
            .chain(overflow);
        return Self::from_order(order);
    }

    /// Number slugs from 1 in iteration order.
    fn from_order<'a>(order: impl Iterator<Item = &'a str>) -> Self {
        let positions = order
            .zip(1_u32..)
            .map(|(slug, position)| return (slug.to_string(), position))
            .collect();
        return Self { positions };
    }

    /// Position of a book; `0` when unknown.
    pub fn position(&self, slug: Option<&str>) -> u32 {
        return slug.and_then(|s| return self.positions.get(s).copied()).unwrap_or(0);
    }

    /// Slugs in index order.
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<(&str, u32)> = self.positions.iter().map(|(s, p)| return (s.as_str(), *p)).collect();
        slugs.sort_by_key(|(_, p)| return *p);
        return slugs.into_iter().map(|(s, _)| return s).collect();
    }
}

/// `(book, chapter, first verse, verse group count)`.
type SortKey = (u32, u32, u32, usize);

/// Reorder references in place. `SortMode::None` leaves them untouched.
///
/// `index` supplies book positions and is ignored for `SortMode::None`.
/// Ties keep input order. Elided book names are recomputed afterwards, since
/// the citation a book repeated may have moved.
pub fn sort(references: &mut [Reference], catalog: &Catalog, patterns: &Patterns, index: &BookIndex, mode: SortMode) {
    if mode == SortMode::None {
        return;
    }
    references.sort_by_cached_key(|reference| return sort_key(reference, catalog, patterns, index));
    mark_elided_books(references);
}

/// Position of a reference under `index`; unresolved parts sort last.
fn sort_key(reference: &Reference, catalog: &Catalog, patterns: &Patterns, index: &BookIndex) -> SortKey {
    let book = index.position(reference.book.as_deref());
    let chapter = chapter_position(reference, catalog, patterns);
    let verse = match reference.verse_groups.first() {
        None => 0,
        Some(group) => group.first_int().unwrap_or(UNMATCHED),
    };
    return (book, chapter, verse, reference.verse_groups.len());
}

/// 1-based position in the book's chapter list, `0` for no chapter.
fn chapter_position(reference: &Reference, catalog: &Catalog, patterns: &Patterns) -> u32 {
    let Some(chapter) = &reference.chapter else {
        return 0;
    };
    let Some(book) = reference.book.as_deref().and_then(|slug| return catalog.book(slug)) else {
        return UNMATCHED;
    };

    // A chapter range sorts by its first chapter.
    let wanted = match chapter {
        Numeral::Opaque(text) => {
            let first = patterns.verse_range.split(text).first().copied().unwrap_or_default();
            numerals::to_int(first.trim()).filter(Numeral::is_int).unwrap_or_else(|| return chapter.clone())
        },
        Numeral::Int(_) => chapter.clone(),
    };

    return book
        .chapters
        .iter()
        .zip(1_u32..)
        .find(|(c, _)| return **c == wanted)
        .map_or(UNMATCHED, |(_, position)| return position);
}

/// A book is elided when the reference before it names the same book.
fn mark_elided_books(references: &mut [Reference]) {
    let mut previous: Option<String> = None;
    for reference in references.iter_mut() {
        reference.book_elided = reference.book.is_some() && reference.book == previous;
        previous.clone_from(&reference.book);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::fixture;
    use crate::verses::VerseGroup;

    fn reference(book: &str, chapter: Numeral, verse: Option<VerseGroup>) -> Reference {
        let mut r = Reference::new("en");
        r.book = Some(book.to_string());
        r.chapter = Some(chapter);
        r.verse_groups = verse.into_iter().collect();
        return r;
    }

    fn order(references: &[Reference]) -> Vec<String> {
        return references
            .iter()
            .map(|r| {
                let chapter = r.chapter.as_ref().map(ToString::to_string).unwrap_or_default();
                return format!("{} {chapter}", r.book.as_deref().unwrap_or("?"));
            })
            .collect();
    }

    #[test]
    fn none_keeps_input_order() {
        let catalog = fixture();
        let patterns = Patterns::compile(catalog.summary()).unwrap();
        let mut refs = vec![reference("john", Numeral::Int(3), None), reference("genesis", Numeral::Int(1), None)];
        let before = refs.clone();
        sort(&mut refs, &catalog, &patterns, &BookIndex::default(), SortMode::None);
        assert_eq!(refs, before);
    }

    #[test]
    fn traditional_follows_structure_order() {
        let catalog = fixture();
        let patterns = Patterns::compile(catalog.summary()).unwrap();
        let index = BookIndex::traditional(&catalog);
        let mut refs = vec![
            reference("alma", Numeral::Int(5), None),
            reference("genesis", Numeral::Int(3), Some(VerseGroup::single(4))),
            reference("genesis", Numeral::Int(3), Some(VerseGroup::single(2))),
            reference("genesis", Numeral::Opaque("1-2".to_string()), None),
            reference("john", Numeral::Int(1), None),
        ];
        sort(&mut refs, &catalog, &patterns, &index, SortMode::Traditional);
        assert_eq!(order(&refs), ["genesis 1-2", "genesis 3", "genesis 3", "john 1", "alma 5"]);
        assert_eq!(refs[1].verse_groups, [VerseGroup::single(2)]);
        let elided: Vec<bool> = refs.iter().map(|r| return r.book_elided).collect();
        assert_eq!(elided, [false, true, true, false, false]);
    }

    #[test]
    fn unresolved_books_and_chapters_sort_deterministically() {
        let catalog = fixture();
        let patterns = Patterns::compile(catalog.summary()).unwrap();
        let index = BookIndex::traditional(&catalog);
        let mut unknown = Reference::new("en");
        unknown.book_text = Some("Hezekiah".to_string());
        let mut refs = vec![
            reference("genesis", Numeral::Opaque("3:16:17".to_string()), None),
            reference("genesis", Numeral::Int(2), None),
            unknown,
        ];
        sort(&mut refs, &catalog, &patterns, &index, SortMode::Traditional);
        assert_eq!(order(&refs), ["? ", "genesis 2", "genesis 3:16:17"]);
    }

    #[test]
    fn facsimile_chapters_use_their_list_position() {
        let catalog = fixture();
        let patterns = Patterns::compile(catalog.summary()).unwrap();
        let index = BookIndex::traditional(&catalog);
        let mut refs = vec![
            reference("facsimiles", Numeral::Opaque("fac-3".to_string()), None),
            reference("facsimiles", Numeral::Opaque("fac-1".to_string()), None),
        ];
        sort(&mut refs, &catalog, &patterns, &index, SortMode::Traditional);
        assert_eq!(order(&refs), ["facsimiles fac-1", "facsimiles fac-3"]);
    }

    #[test]
    fn alphabetical_index_uses_localized_names() {
        let catalog = fixture();
        let english = BookIndex::alphabetical(&catalog, &Collator::new("en"));
        let slugs = english.slugs();
        // Names starting with a digit file before every letter.
        assert_eq!(slugs.first().copied(), Some("1-corinthians"));
        // Under one heading books keep canonical order: Alma precedes Abraham.
        assert!(english.position(Some("alma")) < english.position(Some("abraham")));
        assert!(english.position(Some("abraham")) < english.position(Some("exodus")));

        let spanish = BookIndex::alphabetical(&catalog, &Collator::new("es"));
        // Éxodo files under E with Génesis under G; Juan under J before Mateo.
        assert!(spanish.position(Some("exodus")) < spanish.position(Some("genesis")));
        assert!(spanish.position(Some("john")) < spanish.position(Some("matthew")));
    }

    #[test]
    fn han_names_file_after_latin_headings() {
        let catalog = fixture();
        let index = BookIndex::alphabetical(&catalog, &Collator::new("zh-Hant"));
        // Books without a Chinese name fall back to English and keep Latin headings.
        assert!(index.position(Some("alma")) < index.position(Some("john")));
        assert!(index.position(Some("genesis")) > index.position(Some("moroni")));
    }

    #[test]
    fn label_mode_sorts_by_display_name() {
        let catalog = fixture();
        let patterns = Patterns::compile(catalog.summary()).unwrap();
        let index = BookIndex::alphabetical(&catalog, &Collator::new("en"));
        let mut refs = vec![
            reference("john", Numeral::Int(1), None),
            reference("alma", Numeral::Int(1), None),
            reference("genesis", Numeral::Int(1), None),
        ];
        sort(&mut refs, &catalog, &patterns, &index, SortMode::Label);
        assert_eq!(order(&refs), ["alma 1", "genesis 1", "john 1"]);
    }
}
