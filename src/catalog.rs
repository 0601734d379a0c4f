//! Locale metadata and scripture structure tables.
//!
//! Two JSON documents feed the catalog: `metadata-languages.min.json` maps
//! language codes to BCP 47 tags and site language codes, and
//! `metadata-scriptures.min.json` carries translated names, punctuation,
//! numeral tables, the publication/book/chapter structure and the reverse
//! name-to-slug map. Both are read once and never mutated.

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::Numeral;

/// File name of the language table inside a data directory.
pub const LANGUAGES_FILE: &str = "metadata-languages.min.json";
/// File name of the scripture table inside a data directory.
pub const SCRIPTURES_FILE: &str = "metadata-scriptures.min.json";

/// Language used when a tag is unmapped or a table lacks an entry.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Display name and abbreviation for a slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TranslatedName {
    /// Short form, e.g. `1 Ne.`.
    #[serde(default)]
    pub abbrev: String,
    /// Full form, e.g. `1 Nephi`.
    #[serde(default)]
    pub name: String,
}

/// Punctuation a language uses when rendering a label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguagePunctuation {
    /// Between the book name and the chapter.
    pub book_chapter_separator: String,
    /// Between the chapter and the verse list.
    pub chapter_verse_separator: String,
    /// Closes the context verse list.
    pub closing_parenthesis: String,
    /// Opens the context verse list.
    pub opening_parenthesis: String,
    /// Between whole citations.
    pub reference_separator: String,
    /// Between verse groups.
    pub verse_group_separator: String,
    /// Between the two ends of a verse run.
    pub verse_range_separator: String,
}

impl Default for LanguagePunctuation {
    fn default() -> Self {
        return Self {
            book_chapter_separator: " ".to_string(),
            chapter_verse_separator: ":".to_string(),
            closing_parenthesis: ")".to_string(),
            opening_parenthesis: " (".to_string(),
            reference_separator: "; ".to_string(),
            verse_group_separator: ", ".to_string(),
            verse_range_separator: "–".to_string(),
        };
    }
}

/// Per-language entry of the scripture table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageEntry {
    /// Ten digit glyphs, or empty when the language uses its default script.
    pub numerals: Vec<String>,
    /// Separators used when rendering labels.
    pub punctuation: LanguagePunctuation,
    /// Names keyed by publication, book or chapter slug.
    pub translated_names: IndexMap<String, TranslatedName>,
}

/// Every punctuation variant seen across all languages, per role.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PunctuationSummary {
    /// Chapter-verse separators.
    pub chapter_verse_separator: Vec<String>,
    /// Context-closing parentheses.
    pub closing_parenthesis: Vec<String>,
    /// Context-opening parentheses.
    pub opening_parenthesis: Vec<String>,
    /// Citation separators.
    pub reference_separator: Vec<String>,
    /// Verse-group separators.
    pub verse_group_separator: Vec<String>,
    /// Verse-range separators.
    pub verse_range_separator: Vec<String>,
}

/// The `summary` object of the scripture document.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Summary {
    /// Punctuation variants per role.
    punctuation: PunctuationSummary,
}

/// A book: its site path and the ordered list of valid chapter keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Chapter keys in reading order.
    #[serde(default)]
    pub chapters: Vec<Numeral>,
    /// Site path such as `/scriptures/bofm/1-ne`.
    pub church_uri: String,
}

/// A top-level volume and its books in canonical order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    /// Books keyed by slug.
    #[serde(default)]
    pub books: IndexMap<String, Book>,
    /// Site path such as `/scriptures/bofm`.
    pub church_uri: String,
}

/// `metadata-scriptures.min.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScripturesDocument {
    /// Publication slug to the tags it is published in.
    availability: HashMap<String, Vec<String>>,
    /// Per-language names, punctuation and numerals.
    languages: IndexMap<String, LanguageEntry>,
    /// Every display name, abbreviation and slug to its slug.
    map_to_slug: IndexMap<String, String>,
    /// Publications, books and chapters.
    structure: IndexMap<String, Publication>,
    /// Cross-language punctuation variants.
    summary: Summary,
}

/// One entry of the language document's `languages` map.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChurchLanguage {
    /// The site's three-letter language code.
    #[serde(default)]
    church_lang: String,
}

/// `metadata-languages.min.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LanguagesDocument {
    /// BCP 47 tag to site language.
    languages: HashMap<String, ChurchLanguage>,
    /// Any known language code to its BCP 47 tag.
    map_to_bcp47: HashMap<String, String>,
}

/// Read-only metadata for every supported language and the scripture structure.
#[derive(Debug)]
pub struct Catalog {
    /// Publication slug to the language tags it is published in.
    availability: HashMap<String, Vec<String>>,
    /// Raw language codes to BCP 47 tags.
    bcp47: HashMap<String, String>,
    /// Book slug to its publication slug.
    book_publication: HashMap<String, String>,
    /// BCP 47 tag to the site's language code.
    church_languages: HashMap<String, String>,
    /// Punctuation used when a language has no entry.
    default_punctuation: LanguagePunctuation,
    /// Scripture-table entries by BCP 47 tag.
    languages: IndexMap<String, LanguageEntry>,
    /// Display names and abbreviations to slugs, in document order.
    names: IndexMap<String, String>,
    /// Site paths (`/scriptures/bofm/1-ne`) to slugs.
    paths: HashMap<String, String>,
    /// Publications in canonical order.
    structure: IndexMap<String, Publication>,
    /// Punctuation variants across all languages.
    summary: PunctuationSummary,
}

impl Catalog {
    /// Load both metadata documents from a data directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::MetadataNotFound` if either file is missing,
    /// `Error::MetadataCorrupt` if one does not deserialize,
    /// or `Error::Io` for other read failures.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let languages: LanguagesDocument = read_document(&dir.join(LANGUAGES_FILE))?;
        let scriptures: ScripturesDocument = read_document(&dir.join(SCRIPTURES_FILE))?;
        return Ok(Self::build(languages, scriptures));
    }

    /// Build a catalog from the two documents' JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Error::JsonDe` if either document is malformed.
    pub fn from_json(languages: &str, scriptures: &str) -> Result<Self, Error> {
        let languages: LanguagesDocument = serde_json::from_str(languages)?;
        let scriptures: ScripturesDocument = serde_json::from_str(scriptures)?;
        return Ok(Self::build(languages, scriptures));
    }

    /// Derive the lookup indexes from the two documents.
    fn build(languages: LanguagesDocument, scriptures: ScripturesDocument) -> Self {
        let mut book_publication = HashMap::new();
        let mut paths = HashMap::new();

        for (publication_slug, publication) in &scriptures.structure {
            paths
                .entry(trim_path(&publication.church_uri))
                .or_insert_with(|| return publication_slug.clone());
            for (book_slug, book) in &publication.books {
                book_publication
                    .entry(book_slug.clone())
                    .or_insert_with(|| return publication_slug.clone());
                // Several books can share a path (facsimiles live under their book).
                paths.entry(trim_path(&book.church_uri)).or_insert_with(|| return book_slug.clone());
            }
        }

        let church_languages = languages
            .languages
            .into_iter()
            .map(|(tag, entry)| return (tag, entry.church_lang))
            .collect();

        tracing::debug!(
            languages = scriptures.languages.len(),
            publications = scriptures.structure.len(),
            books = book_publication.len(),
            "catalog loaded"
        );

        return Self {
            availability: scriptures.availability,
            bcp47: languages.map_to_bcp47,
            book_publication,
            church_languages,
            default_punctuation: LanguagePunctuation::default(),
            languages: scriptures.languages,
            names: scriptures.map_to_slug,
            paths,
            structure: scriptures.structure,
            summary: scriptures.summary.punctuation,
        };
    }

    /// Normalize a language code to a BCP 47 tag from the language table.
    ///
    /// Tags naming the `Hant`/`Hans` scripts map through `cmn-Hant`/`cmn-Hans`.
    /// Unmapped tags fall back to `en`; a non-empty unmapped tag also logs a warning.
    pub fn bcp47(&self, tag: &str) -> String {
        let key = if tag.contains("Hant") {
            "cmn-Hant"
        } else if tag.contains("Hans") {
            "cmn-Hans"
        } else {
            tag
        };

        if let Some(mapped) = self.bcp47.get(key).filter(|m| return !m.is_empty()) {
            return mapped.clone();
        }
        if !tag.is_empty() {
            tracing::warn!(tag, fallback = FALLBACK_LANGUAGE, "no BCP 47 tag for language, falling back");
        }
        return FALLBACK_LANGUAGE.to_string();
    }

    /// The scripture-table entry for a language, if it has one.
    pub fn language(&self, tag: &str) -> Option<&LanguageEntry> {
        return self.languages.get(tag);
    }

    /// Language tags the scripture table has entries for, in document order.
    pub fn language_tags(&self) -> impl Iterator<Item = &str> {
        return self.languages.keys().map(String::as_str);
    }

    /// Translated names and abbreviations for a language (empty when unknown).
    pub fn names_for(&self, tag: &str) -> impl Iterator<Item = (&str, &TranslatedName)> {
        return self
            .languages
            .get(tag)
            .into_iter()
            .flat_map(|entry| return entry.translated_names.iter())
            .map(|(slug, name)| return (slug.as_str(), name));
    }

    /// The translated name entry for a slug in one language, without fallback.
    pub fn translated(&self, tag: &str, slug: &str) -> Option<&TranslatedName> {
        return self.languages.get(tag).and_then(|entry| return entry.translated_names.get(slug));
    }

    /// A slug's display name in `tag`, falling back to English.
    ///
    /// With `abbreviated`, the language's abbreviation is preferred when it has one.
    pub fn display_name(&self, tag: &str, slug: &str, abbreviated: bool) -> Option<String> {
        let own = self.translated(tag, slug);
        let name = own
            .map(|n| return n.name.as_str())
            .filter(|n| return !n.is_empty())
            .or_else(|| {
                return self
                    .translated(FALLBACK_LANGUAGE, slug)
                    .map(|n| return n.name.as_str())
                    .filter(|n| return !n.is_empty());
            });

        let abbrev = own
            .filter(|_| return abbreviated)
            .map(|n| return n.abbrev.as_str())
            .filter(|a| return !a.is_empty());
        return abbrev.or(name).map(str::to_string);
    }

    /// Label punctuation for a language, English defaults when it has none.
    pub fn punctuation(&self, tag: &str) -> &LanguagePunctuation {
        return self
            .languages
            .get(tag)
            .map_or(&self.default_punctuation, |entry| return &entry.punctuation);
    }

    /// Digit glyphs for a language; empty means the language's default script.
    pub fn numerals(&self, tag: &str) -> &[String] {
        return self.languages.get(tag).map_or(&[], |entry| return entry.numerals.as_slice());
    }

    /// The site's language code for a tag (`en` → `eng`).
    pub fn church_lang(&self, tag: &str) -> Option<&str> {
        return self
            .church_languages
            .get(tag)
            .map(String::as_str)
            .filter(|code| return !code.is_empty());
    }

    /// Whether a publication is published in a language.
    ///
    /// Publications without availability data count as available everywhere.
    pub fn is_available(&self, publication: &str, tag: &str) -> bool {
        return self
            .availability
            .get(publication)
            .is_none_or(|tags| return tags.iter().any(|t| return t == tag));
    }

    /// Punctuation variants across all languages.
    pub const fn summary(&self) -> &PunctuationSummary {
        return &self.summary;
    }

    /// Publications in canonical order.
    pub const fn structure(&self) -> &IndexMap<String, Publication> {
        return &self.structure;
    }

    /// Every book slug in canonical order.
    pub fn books(&self) -> impl Iterator<Item = (&str, &Book)> {
        return self
            .structure
            .values()
            .flat_map(|publication| return publication.books.iter())
            .map(|(slug, book)| return (slug.as_str(), book));
    }

    /// Whether a slug names a whole publication.
    pub fn is_publication(&self, slug: &str) -> bool {
        return self.structure.contains_key(slug);
    }

    /// The publication a book belongs to.
    pub fn publication_of(&self, book: &str) -> Option<&str> {
        return self.book_publication.get(book).map(String::as_str);
    }

    /// A book's structure entry.
    pub fn book(&self, slug: &str) -> Option<&Book> {
        let publication = self.publication_of(slug)?;
        return self.structure.get(publication).and_then(|p| return p.books.get(slug));
    }

    /// Exact lookup of a display name or abbreviation.
    pub fn slug_for_name(&self, text: &str) -> Option<&str> {
        return self.names.get(text).map(String::as_str);
    }

    /// Every known display name, abbreviation and slug with its target, in document order.
    pub fn name_index(&self) -> impl Iterator<Item = (&str, &str)> {
        return self.names.iter().map(|(name, slug)| return (name.as_str(), slug.as_str()));
    }

    /// Look up a site path such as `/scriptures/bofm/1-ne`.
    pub fn slug_for_path(&self, path: &str) -> Option<&str> {
        return self.paths.get(trim_path(path).as_str()).map(String::as_str);
    }
}

/// A site path without surrounding whitespace or trailing slashes.
fn trim_path(path: &str) -> String {
    return path.trim().trim_end_matches('/').to_string();
}

/// Read and deserialize one metadata document.
///
/// # Errors
///
/// Returns `Error::MetadataNotFound`, `Error::MetadataCorrupt` or `Error::Io`.
fn read_document<T>(path: &Path) -> Result<T, Error>
where
    T: serde::de::DeserializeOwned,
{
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::MetadataNotFound { path: path.to_path_buf() });
        },
        Err(e) => return Err(Error::Io(e)),
    };

    return serde_json::from_str(&content).map_err(|e| {
        return Error::MetadataCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
    });
}
