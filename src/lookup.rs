//! The engine: metadata, compiled patterns and per-language caches behind one
//! service object.

use std::path::Path;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::collation::{Collator, LanguageCache};
use crate::error::Error;
use crate::normalizer::{BookNames, Normalizer};
use crate::patterns::Patterns;
use crate::reference::Reference;
use crate::resolver::{self, ResolveContext};
use crate::sorting::{self, BookIndex};
use crate::types::SortMode;

/// Parses citations against one loaded catalog.
///
/// Everything built per language (collators, book-name matchers, alphabetical
/// book indexes) is created on first use and shared afterwards, so one
/// `Lookup` can serve many threads.
#[derive(Debug)]
pub struct Lookup {
    /// Book order by localized name, per language.
    alphabetical: LanguageCache<BookIndex>,
    /// Name matchers for the normalizer, per language.
    book_names: LanguageCache<BookNames>,
    /// Loaded metadata.
    catalog: Catalog,
    /// Collators, per language.
    collators: LanguageCache<Collator>,
    /// Compiled free-text rewrites.
    normalizer: Normalizer,
    /// Compiled separators.
    patterns: Patterns,
    /// Book order as published.
    traditional: BookIndex,
}

impl Lookup {
    /// Wrap a loaded catalog, compiling its separator patterns.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if the catalog's punctuation fails to compile.
    pub fn new(catalog: Catalog) -> Result<Self, Error> {
        let patterns = Patterns::compile(catalog.summary())?;
        let normalizer = Normalizer::new(&patterns)?;
        let traditional = BookIndex::traditional(&catalog);
        return Ok(Self {
            alphabetical: LanguageCache::new(),
            book_names: LanguageCache::new(),
            catalog,
            collators: LanguageCache::new(),
            normalizer,
            patterns,
            traditional,
        });
    }

    /// Load the metadata documents from `dir` and build the engine.
    ///
    /// # Errors
    ///
    /// Returns `Error::MetadataNotFound` or `Error::MetadataCorrupt` if a
    /// document is missing or malformed, and `Error::Pattern` if its
    /// punctuation fails to compile.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        return Self::new(Catalog::load(dir)?);
    }

    /// The loaded metadata.
    pub const fn catalog(&self) -> &Catalog {
        return &self.catalog;
    }

    /// The compiled separator patterns.
    pub const fn patterns(&self) -> &Patterns {
        return &self.patterns;
    }

    /// BCP 47 tag for a caller-supplied language code, `en` when unknown.
    pub fn language(&self, tag: &str) -> String {
        return self.catalog.bcp47(tag);
    }

    /// The shared collator for a language.
    pub fn collator(&self, language: &str) -> Arc<Collator> {
        return self.collators.get_or_create(language, Collator::new);
    }

    /// Rewrite free text into `; `-joined canonical citations.
    pub fn normalize(&self, raw: &str, language: &str) -> String {
        return self.normalize_in(raw, &self.language(language));
    }

    /// Resolve already-normalized text, then order it by `sort`.
    pub fn resolve(&self, normalized: &str, language: &str, sort: SortMode) -> Vec<Reference> {
        return self.resolve_in(normalized, &self.language(language), sort);
    }

    /// Normalize, resolve and sort raw citation text.
    ///
    /// Never fails: text that matches nothing yields references carrying the
    /// raw text, and empty input yields no references.
    pub fn parse(&self, raw: &str, language: &str, sort: SortMode) -> Vec<Reference> {
        let language = self.language(language);
        let normalized = self.normalize_in(raw, &language);
        tracing::debug!(raw, normalized = normalized.as_str(), "parsing");
        return self.resolve_in(&normalized, &language, sort);
    }

    /// Reorder references in place.
    pub fn sort(&self, references: &mut [Reference], language: &str, mode: SortMode) {
        self.sort_in(references, &self.language(language), mode);
    }

    /// [`Lookup::normalize`] for an already-mapped tag.
    fn normalize_in(&self, raw: &str, language: &str) -> String {
        let names = self.book_names.get_or_create(language, |tag| {
            return BookNames::new(&self.catalog, tag, &self.patterns.verse_group);
        });
        return self.normalizer.normalize(raw, language, &self.patterns, &names);
    }

    /// [`Lookup::resolve`] for an already-mapped tag.
    fn resolve_in(&self, normalized: &str, language: &str, sort: SortMode) -> Vec<Reference> {
        let collator = self.collator(language);
        let ctx = ResolveContext {
            catalog: &self.catalog,
            collator: &collator,
            patterns: &self.patterns,
        };
        let mut references = resolver::resolve(normalized, language, &ctx);
        self.sort_in(&mut references, language, sort);
        return references;
    }

    /// [`Lookup::sort`] for an already-mapped tag.
    fn sort_in(&self, references: &mut [Reference], language: &str, mode: SortMode) {
        let index = match mode {
            SortMode::None => return,
            SortMode::Traditional => None,
            SortMode::Label => {
                let collator = self.collator(language);
                Some(self.alphabetical.get_or_create(language, |_| {
                    return BookIndex::alphabetical(&self.catalog, &collator);
                }))
            },
        };
        let index = index.as_deref().unwrap_or(&self.traditional);
        sorting::sort(references, &self.catalog, &self.patterns, index, mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{captured_warnings, fixture};
    use crate::types::Numeral;

    fn lookup() -> Lookup {
        return Lookup::new(fixture()).unwrap();
    }

    #[test]
    fn parses_a_simple_citation() {
        let refs = lookup().parse("1 Nephi 3:7", "en", SortMode::None);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].book.as_deref(), Some("1-nephi"));
        assert_eq!(refs[0].publication.as_deref(), Some("bofm"));
        assert_eq!(refs[0].chapter, Some(Numeral::Int(3)));
    }

    #[test]
    fn unknown_languages_fall_back_to_english() {
        let lookup = lookup();
        assert_eq!(lookup.language("tlh"), "en");
        assert_eq!(lookup.language("zh-Hant-TW"), "zh-Hant");
        let refs = lookup.parse("Genesis 1", "tlh", SortMode::None);
        assert_eq!(refs[0].language, "en");
    }

    #[test]
    fn unknown_languages_warn_once_per_parse() {
        let lookup = lookup();
        let logs = captured_warnings(|| {
            let _ = lookup.parse("Genesis 1", "tlh", SortMode::Label);
        });
        assert_eq!(logs.matches("no BCP 47 tag").count(), 1);
    }

    #[test]
    fn sorting_is_applied_after_resolution() {
        let lookup = lookup();
        let refs = lookup.parse("Alma 5; John 3; Genesis 1", "en", SortMode::Traditional);
        let books: Vec<&str> = refs.iter().filter_map(|r| return r.book.as_deref()).collect();
        assert_eq!(books, ["genesis", "john", "alma"]);

        let refs = lookup.parse("John 3; Genesis 1; Alma 5", "en", SortMode::Label);
        let books: Vec<&str> = refs.iter().filter_map(|r| return r.book.as_deref()).collect();
        assert_eq!(books, ["alma", "genesis", "john"]);
    }

    #[test]
    fn per_language_state_is_built_once() {
        let lookup = lookup();
        let first = lookup.collator("es");
        let _ = lookup.parse("Génesis 1", "es", SortMode::Label);
        assert!(Arc::ptr_eq(&first, &lookup.collator("es")));
        assert_eq!(lookup.alphabetical.len(), 1);
        assert_eq!(lookup.book_names.len(), 1);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(lookup().parse("", "en", SortMode::Traditional).is_empty());
        assert!(lookup().parse(" ; ", "en", SortMode::None).is_empty());
    }
}
