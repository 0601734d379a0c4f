//! The resolved citation and its renderings: label, site path, URL and HTML link.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::numerals;
use crate::patterns::Patterns;
use crate::resolver::SLUG_ALIASES;
use crate::types::Numeral;
use crate::verses::{self, VerseGroup, VerseStyle};

/// Default site prefix that canonical paths are appended to.
pub const DEFAULT_URL_BASE: &str = "https://www.churchofjesuschrist.org/study";

/// One parsed citation.
///
/// Either `publication` alone is set (a whole volume), or `book` names a book
/// inside `publication`, or neither is set and `book_text` keeps the text
/// that matched no book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Canonical book slug.
    pub book: Option<String>,
    /// Whether the book repeats the previous citation's and is not shown.
    pub book_elided: bool,
    /// Raw book text when no book matched it.
    pub book_text: Option<String>,
    /// Chapter number, or a composite key such as `fac-2`.
    pub chapter: Option<Numeral>,
    /// Verses shown in parentheses around the cited ones.
    pub context_verse_groups: Vec<VerseGroup>,
    /// BCP-47 tag the reference renders in.
    pub language: String,
    /// Canonical publication slug.
    pub publication: Option<String>,
    /// Cited verses, ordered.
    pub verse_groups: Vec<VerseGroup>,
}

/// Options for [`Reference::label`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelOptions {
    /// Prefer abbreviated book and chapter names.
    pub abbreviated: bool,
    /// Leave the book name out of every label.
    pub skip_book_name: bool,
}

/// Options for [`Reference::url`].
#[derive(Debug, Clone, Copy)]
pub struct UrlOptions<'a> {
    /// Site prefix the canonical path is appended to.
    pub base: &'a str,
    /// Omit `lang=` when the publication is not published in the language.
    pub check_availability: bool,
    /// Leave off the `#p16` fragment.
    pub skip_fragment: bool,
    /// Leave off the `lang=` parameter.
    pub skip_lang: bool,
}

impl Default for UrlOptions<'_> {
    fn default() -> Self {
        return Self {
            base: DEFAULT_URL_BASE,
            check_availability: false,
            skip_fragment: false,
            skip_lang: false,
        };
    }
}

/// Options for [`Reference::link`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkOptions<'a> {
    /// `class` attribute, omitted when `None`.
    pub class: Option<&'a str>,
    /// How the anchor text is labelled.
    pub label: LabelOptions,
    /// `target` attribute, omitted when `None`.
    pub target: Option<&'a str>,
    /// How the `href` is built.
    pub url: UrlOptions<'a>,
}

impl Reference {
    /// An empty reference in `language`.
    pub fn new(language: &str) -> Self {
        return Self {
            book: None,
            book_elided: false,
            book_text: None,
            chapter: None,
            context_verse_groups: Vec::new(),
            language: language.to_string(),
            publication: None,
            verse_groups: Vec::new(),
        };
    }

    /// Whether the reference names a whole publication and nothing inside it.
    pub const fn is_publication_only(&self) -> bool {
        return self.publication.is_some() && self.book.is_none();
    }

    // ── Label ─────────────────────────────────────────────────────────

    /// Localized display text such as `1 Nephi 3:7` or `Juan 3:16–18 (19)`.
    pub fn label(&self, catalog: &Catalog, patterns: &Patterns, options: LabelOptions) -> String {
        let lang = self.language.as_str();
        if let (Some(publication), None) = (&self.publication, &self.book) {
            return catalog.display_name(lang, publication, options.abbreviated).unwrap_or_default();
        }

        let punctuation = catalog.punctuation(lang);
        let digits = catalog.numerals(lang);
        let chapter_name = self.chapter.as_ref().map(|chapter| {
            return self.chapter_name(catalog, patterns, chapter, options.abbreviated);
        });

        let mut label = String::new();
        let show_book = !options.skip_book_name && !self.book_elided;
        if show_book {
            let name = match &self.book {
                Some(slug) => catalog.display_name(lang, display_slug(slug), options.abbreviated),
                None => self.book_text.clone(),
            };
            // A chapter with a name of its own (`Facsimile 2`) already says which book it is in.
            if !chapter_name.as_ref().is_some_and(|(_, named)| return *named) {
                label.push_str(&name.unwrap_or_default());
            }
        }

        let Some((chapter, _)) = chapter_name else {
            return label;
        };
        if !label.is_empty() {
            label.push_str(&punctuation.book_chapter_separator);
        }
        label.push_str(&chapter);

        if self.verse_groups.is_empty() {
            return label;
        }
        let style = VerseStyle {
            group_separator: &punctuation.verse_group_separator,
            language: lang,
            numerals: digits,
            prefix: "",
            range_separator: &punctuation.verse_range_separator,
        };
        label.push_str(&punctuation.chapter_verse_separator);
        label.push_str(&verses::format_verses(&self.verse_groups, &style));
        if !self.context_verse_groups.is_empty() {
            label.push_str(&punctuation.opening_parenthesis);
            label.push_str(&verses::format_verses(&self.context_verse_groups, &style));
            label.push_str(&punctuation.closing_parenthesis);
        }
        return label;
    }

    /// Display text for the chapter, and whether it came from a translated name.
    fn chapter_name(&self, catalog: &Catalog, patterns: &Patterns, chapter: &Numeral, abbreviated: bool) -> (String, bool) {
        let lang = self.language.as_str();
        let key = chapter.to_string();
        if let Some(name) = catalog.display_name(lang, &key, abbreviated) {
            return (name, true);
        }

        let digits = catalog.numerals(lang);
        if let Numeral::Int(n) = chapter {
            return (numerals::format_number(*n, lang, None, digits), false);
        }

        let parts = patterns.verse_range.split(&key);
        let bounds: Option<Vec<u32>> = parts
            .iter()
            .map(|part| return numerals::to_int(part.trim()).and_then(|n| return n.as_int()))
            .collect();
        return match bounds {
            Some(bounds) if bounds.len() > 1 => {
                let formatted: Vec<String> = bounds
                    .into_iter()
                    .map(|n| return numerals::format_number(n, lang, None, digits))
                    .collect();
                (formatted.join(&catalog.punctuation(lang).verse_range_separator), false)
            },
            _ => (key, false),
        };
    }

    // ── Paths and links ───────────────────────────────────────────────

    /// Canonical site path, e.g. `/scriptures/bofm/1-ne/3.7`.
    ///
    /// Empty when the reference matched no book.
    pub fn uri(&self, catalog: &Catalog, patterns: &Patterns, use_query_parameters: bool) -> String {
        if let (Some(publication), None) = (&self.publication, &self.book) {
            return catalog
                .structure()
                .get(publication)
                .map(|p| return p.church_uri.clone())
                .unwrap_or_default();
        }

        let Some(book) = self.book.as_deref().and_then(|slug| return catalog.book(slug)) else {
            return String::new();
        };
        let mut uri = book.church_uri.clone();
        let Some(chapter) = &self.chapter else {
            return uri;
        };

        uri.push('/');
        uri.push_str(&path_chapter(chapter, patterns));
        if self.verse_groups.is_empty() {
            return uri;
        }

        if use_query_parameters {
            uri.push_str("?id=");
            uri.push_str(&verses::format_verses(&self.verse_groups, &VerseStyle::QUERY));
            if !self.context_verse_groups.is_empty() {
                uri.push_str("&context=");
                uri.push_str(&verses::format_verses(&self.context_verse_groups, &VerseStyle::QUERY));
            }
        } else {
            uri.push('.');
            uri.push_str(&verses::format_verses(&self.verse_groups, &VerseStyle::PATH));
            if !self.context_verse_groups.is_empty() {
                uri.push('(');
                uri.push_str(&verses::format_verses(&self.context_verse_groups, &VerseStyle::PATH));
                uri.push(')');
            }
        }
        return uri;
    }

    /// Full site URL with query-parameter verses, `lang=` and a `#p` fragment.
    pub fn url(&self, catalog: &Catalog, patterns: &Patterns, options: &UrlOptions<'_>) -> String {
        let lang = self.language.as_str();
        let mut url = format!("{}{}", options.base.trim_end_matches('/'), self.uri(catalog, patterns, true));

        if !options.skip_lang && self.lang_is_published(catalog, options.check_availability) {
            match catalog.church_lang(lang) {
                Some(code) => {
                    url.push(if url.contains('?') { '&' } else { '?' });
                    url.push_str("lang=");
                    url.push_str(code);
                },
                None => tracing::debug!(language = lang, "no site language code, leaving lang out"),
            }
        }

        if options.skip_fragment {
            return url;
        }
        if let Some(first) = self.verse_groups.first() {
            url.push_str("#p");
            url.push_str(&first.first().to_string());
        }
        return url;
    }

    /// Whether `lang=` belongs on the URL under the availability setting.
    fn lang_is_published(&self, catalog: &Catalog, check_availability: bool) -> bool {
        if !check_availability {
            return true;
        }
        let Some(publication) = self.publication.as_deref() else {
            return true;
        };
        let available = catalog.is_available(publication, &self.language);
        if !available {
            tracing::debug!(publication, language = self.language.as_str(), "publication not available in language");
        }
        return available;
    }

    /// HTML anchor pointing at [`Reference::url`] and showing [`Reference::label`].
    pub fn link(&self, catalog: &Catalog, patterns: &Patterns, options: &LinkOptions<'_>) -> String {
        let url = self.url(catalog, patterns, &options.url);
        let label = self.label(catalog, patterns, options.label);

        let attribute = |name: &str, value: Option<&str>| {
            return value.map_or_else(String::new, |v| return format!(" {name}=\"{}\"", escape_html(v)));
        };
        let attributes = format!("{}{}", attribute("class", options.class), attribute("target", options.target));
        return format!("<a href=\"{}\"{attributes}>{}</a>", escape_html(&url), escape_html(&label));
    }
}

/// The translated-name key for a book whose canonical slug is plural.
pub(crate) fn display_slug(slug: &str) -> &str {
    return SLUG_ALIASES
        .iter()
        .find(|(_, canonical)| return *canonical == slug)
        .map_or(slug, |(display, _)| return *display);
}

/// A chapter range such as `1-3` is addressed by its first chapter.
fn path_chapter(chapter: &Numeral, patterns: &Patterns) -> String {
    let text = chapter.to_string();
    let parts = patterns.verse_range.split(&text);
    let is_range = parts.len() > 1 && parts.iter().all(|p| return !p.is_empty() && p.chars().all(|c| return c.is_ascii_digit()));
    return match parts.first() {
        Some(first) if is_range => (*first).to_string(),
        _ => text,
    };
}

/// Escape text for an HTML attribute or element body.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    return out;
}

/// Render a list of references with one renderer, joined by `separator`.
pub fn join_rendered<F>(references: &[Reference], separator: &str, render: F) -> String
where
    F: Fn(&Reference) -> String,
{
    return references.iter().map(render).collect::<Vec<_>>().join(separator);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::fixture;

    struct Fixture {
        catalog: Catalog,
        patterns: Patterns,
    }

    fn setup() -> Fixture {
        let catalog = fixture();
        let patterns = Patterns::compile(catalog.summary()).unwrap();
        return Fixture { catalog, patterns };
    }

    fn book(language: &str, slug: &str, publication: &str, chapter: Option<Numeral>, verses: Vec<VerseGroup>) -> Reference {
        let mut reference = Reference::new(language);
        reference.book = Some(slug.to_string());
        reference.publication = Some(publication.to_string());
        reference.chapter = chapter;
        reference.verse_groups = verses;
        return reference;
    }

    fn run(first: u32, last: u32) -> VerseGroup {
        return VerseGroup::Run { first, last };
    }

    #[test]
    fn labels_book_chapter_and_verses() {
        let f = setup();
        let r = book("en", "1-nephi", "bofm", Some(Numeral::Int(3)), vec![VerseGroup::single(7)]);
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "1 Nephi 3:7");

        let mut r = book("en", "john", "nt", Some(Numeral::Int(3)), vec![run(16, 18), VerseGroup::single(20)]);
        r.context_verse_groups = vec![VerseGroup::single(21)];
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "John 3:16–18, 20 (21)");
    }

    #[test]
    fn labels_abbreviated_and_without_book() {
        let f = setup();
        let r = book("en", "1-nephi", "bofm", Some(Numeral::Int(3)), vec![]);
        let abbreviated = LabelOptions { abbreviated: true, skip_book_name: false };
        assert_eq!(r.label(&f.catalog, &f.patterns, abbreviated), "1 Ne. 3");
        let skip = LabelOptions { abbreviated: false, skip_book_name: true };
        assert_eq!(r.label(&f.catalog, &f.patterns, skip), "3");
    }

    #[test]
    fn labels_publications_and_singular_books() {
        let f = setup();
        let mut r = Reference::new("es");
        r.publication = Some("ot".to_string());
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "Antiguo Testamento");

        let r = book("en", "psalms", "ot", Some(Numeral::Int(23)), vec![]);
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "Psalm 23");
        let r = book("es", "sections", "dc-testament", Some(Numeral::Int(76)), vec![VerseGroup::single(22)]);
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "Doctrina y Convenios 76:22");
    }

    #[test]
    fn labels_localized_numerals_and_punctuation() {
        let f = setup();
        let r = book("ar", "john", "nt", Some(Numeral::Int(3)), vec![run(16, 18)]);
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "يوحنا ٣:١٦–١٨");
        let r = book("zh-Hant", "john", "nt", Some(Numeral::Int(3)), vec![VerseGroup::single(16)]);
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "約翰福音3：16");
    }

    #[test]
    fn labels_named_and_ranged_chapters() {
        let f = setup();
        let r = book("en", "facsimiles", "pgp", Some(Numeral::Opaque("fac-2".to_string())), vec![]);
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "Facsimile 2");

        let r = book("en", "genesis", "ot", Some(Numeral::Opaque("1-3".to_string())), vec![]);
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "Genesis 1–3");

        let r = book("en", "genesis", "ot", Some(Numeral::Opaque("3:16:17".to_string())), vec![]);
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "Genesis 3:16:17");
    }

    #[test]
    fn labels_unknown_and_elided_books() {
        let f = setup();
        let mut r = Reference::new("en");
        r.book_text = Some("Hezekiah".to_string());
        r.chapter = Some(Numeral::Int(4));
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "Hezekiah 4");

        let mut r = book("en", "genesis", "ot", Some(Numeral::Int(3)), vec![]);
        r.book_elided = true;
        assert_eq!(r.label(&f.catalog, &f.patterns, LabelOptions::default()), "3");
    }

    #[test]
    fn uris() {
        let f = setup();
        let r = book("en", "1-nephi", "bofm", Some(Numeral::Int(3)), vec![VerseGroup::single(7)]);
        assert_eq!(r.uri(&f.catalog, &f.patterns, false), "/scriptures/bofm/1-ne/3.7");

        let mut r = book("en", "genesis", "ot", Some(Numeral::Int(3)), vec![run(1, 3), VerseGroup::single(5)]);
        r.context_verse_groups = vec![VerseGroup::single(4)];
        assert_eq!(r.uri(&f.catalog, &f.patterns, false), "/scriptures/ot/gen/3.1-3,5(4)");
        assert_eq!(r.uri(&f.catalog, &f.patterns, true), "/scriptures/ot/gen/3?id=p1-p3,p5&context=p4");

        let r = book("en", "genesis", "ot", Some(Numeral::Opaque("1-3".to_string())), vec![]);
        assert_eq!(r.uri(&f.catalog, &f.patterns, false), "/scriptures/ot/gen/1");
        let r = book("en", "facsimiles", "pgp", Some(Numeral::Opaque("fac-1".to_string())), vec![]);
        assert_eq!(r.uri(&f.catalog, &f.patterns, false), "/scriptures/pgp/abr/fac-1");

        let mut r = Reference::new("en");
        r.publication = Some("nt".to_string());
        assert_eq!(r.uri(&f.catalog, &f.patterns, false), "/scriptures/nt");
        let mut r = Reference::new("en");
        r.book_text = Some("Hezekiah".to_string());
        assert_eq!(r.uri(&f.catalog, &f.patterns, false), "");
    }

    #[test]
    fn urls() {
        let f = setup();
        let r = book("en", "1-nephi", "bofm", Some(Numeral::Int(3)), vec![VerseGroup::single(7)]);
        assert_eq!(
            r.url(&f.catalog, &f.patterns, &UrlOptions::default()),
            "https://www.churchofjesuschrist.org/study/scriptures/bofm/1-ne/3?id=p7&lang=eng#p7"
        );
        let bare = UrlOptions { skip_fragment: true, skip_lang: true, ..UrlOptions::default() };
        assert_eq!(
            r.url(&f.catalog, &f.patterns, &bare),
            "https://www.churchofjesuschrist.org/study/scriptures/bofm/1-ne/3?id=p7"
        );

        let r = book("es", "genesis", "ot", Some(Numeral::Int(1)), vec![]);
        let local = UrlOptions { base: "http://localhost/", ..UrlOptions::default() };
        assert_eq!(r.url(&f.catalog, &f.patterns, &local), "http://localhost/scriptures/ot/gen/1?lang=spa");
    }

    #[test]
    fn availability_gates_the_language_parameter() {
        let f = setup();
        let r = book("ar", "abraham", "pgp", Some(Numeral::Int(1)), vec![]);
        let gated = UrlOptions { check_availability: true, ..UrlOptions::default() };
        assert_eq!(
            r.url(&f.catalog, &f.patterns, &gated),
            "https://www.churchofjesuschrist.org/study/scriptures/pgp/abr/1"
        );
        assert!(r.url(&f.catalog, &f.patterns, &UrlOptions::default()).ends_with("?lang=ara"));
    }

    #[test]
    fn links_escape_attributes_and_text() {
        let f = setup();
        let r = book("en", "sections", "dc-testament", Some(Numeral::Int(76)), vec![VerseGroup::single(22)]);
        let options = LinkOptions {
            class: Some("ref \"x\""),
            target: Some("_blank"),
            label: LabelOptions { abbreviated: true, skip_book_name: false },
            url: UrlOptions::default(),
        };
        assert_eq!(
            r.link(&f.catalog, &f.patterns, &options),
            "<a href=\"https://www.churchofjesuschrist.org/study/scriptures/dc-testament/dc/76?id=p22&amp;lang=eng#p22\" \
             class=\"ref &quot;x&quot;\" target=\"_blank\">D&amp;C 76:22</a>"
        );
    }
}
