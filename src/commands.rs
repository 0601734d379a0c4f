//! Named operations the CLI dispatches to: label, uri, url, link, normalize,
//! langs, punctuation, numerals, number.
//!
//! Every operation has the same typed signature and is looked up in a fixed
//! table; `info` needs no metadata and is handled by the binary directly.

use crate::error::Error;
use crate::lookup::Lookup;
use crate::numerals::{self, Conversion, NumeralFormat};
use crate::reference::{self, LabelOptions, LinkOptions, Reference, UrlOptions};
use crate::types::{Numeral, SortMode};

/// Every operation, by name.
pub const OPERATIONS: [(&str, Operation); 9] = [
    ("label", label),
    ("langs", langs),
    ("link", link),
    ("normalize", normalize),
    ("number", number),
    ("numerals", numerals),
    ("punctuation", punctuation),
    ("uri", uri),
    ("url", url),
];

/// An operation: input text and options in, printable output out.
pub type Operation = fn(&Lookup, &str, &Options) -> Result<String, Error>;

/// Settings shared by every operation, merged from config and flags.
#[allow(clippy::struct_excessive_bools, reason = "each flag maps to one independent CLI switch")]
#[derive(Debug, Clone)]
pub struct Options {
    /// Prefer abbreviated book names in labels.
    pub abbreviated: bool,
    /// Gate the URL `lang=` parameter on publication availability.
    pub check_availability: bool,
    /// Target script for `number`; the language default when unset.
    pub format: Option<NumeralFormat>,
    /// Language code citations are parsed and rendered in.
    pub lang: String,
    /// `class` attribute of rendered links.
    pub link_class: Option<String>,
    /// `target` attribute of rendered links.
    pub link_target: Option<String>,
    /// Joins multiple results.
    pub separator: String,
    /// Leave the book name out of labels.
    pub skip_book_name: bool,
    /// Leave the `#p16` fragment off URLs.
    pub skip_fragment: bool,
    /// Leave the `lang=` parameter off URLs.
    pub skip_lang: bool,
    /// Order applied to parsed references.
    pub sort_by: SortMode,
    /// Site prefix for URLs and links.
    pub url_base: String,
    /// Render verses as `?id=p1&context=p2` in `uri` output.
    pub use_query_parameters: bool,
}

impl Default for Options {
    fn default() -> Self {
        return Self {
            abbreviated: false,
            check_availability: false,
            format: None,
            lang: "en".to_string(),
            link_class: None,
            link_target: None,
            separator: "\n".to_string(),
            skip_book_name: false,
            skip_fragment: false,
            skip_lang: false,
            sort_by: SortMode::None,
            url_base: reference::DEFAULT_URL_BASE.to_string(),
            use_query_parameters: false,
        };
    }
}

impl Options {
    /// Label rendering switches.
    const fn label(&self) -> LabelOptions {
        return LabelOptions {
            abbreviated: self.abbreviated,
            skip_book_name: self.skip_book_name,
        };
    }

    /// URL rendering switches.
    fn url(&self) -> UrlOptions<'_> {
        return UrlOptions {
            base: &self.url_base,
            check_availability: self.check_availability,
            skip_fragment: self.skip_fragment,
            skip_lang: self.skip_lang,
        };
    }
}

/// Names accepted by [`find`].
pub fn names() -> Vec<&'static str> {
    return OPERATIONS.iter().map(|(name, _)| return *name).collect();
}

/// Look up an operation by name.
///
/// # Errors
///
/// Returns `Error::UnknownCommand` if no operation has that name.
pub fn find(name: &str) -> Result<Operation, Error> {
    return OPERATIONS
        .iter()
        .find(|(candidate, _)| return *candidate == name)
        .map(|(_, operation)| return *operation)
        .ok_or_else(|| {
            return Error::UnknownCommand {
                known: names().into_iter().map(str::to_string).collect(),
                name: name.to_string(),
            };
        });
}

/// Run the named operation.
///
/// # Errors
///
/// Returns `Error::UnknownCommand` for an unknown name, or whatever the
/// operation itself returns.
pub fn run(name: &str, lookup: &Lookup, input: &str, options: &Options) -> Result<String, Error> {
    let operation = find(name)?;
    tracing::debug!(command = name, lang = options.lang.as_str(), "running");
    return operation(lookup, input, options);
}

/// Parse the input in the configured language and order.
fn parse(lookup: &Lookup, input: &str, options: &Options) -> Vec<Reference> {
    return lookup.parse(input, &options.lang, options.sort_by);
}

// ── Citation operations ───────────────────────────────────────────────

/// Localized labels, e.g. `1 Nephi 3:7`.
///
/// # Errors
///
/// Never fails.
pub fn label(lookup: &Lookup, input: &str, options: &Options) -> Result<String, Error> {
    let references = parse(lookup, input, options);
    let label_options = options.label();
    return Ok(reference::join_rendered(&references, &options.separator, |r| {
        return r.label(lookup.catalog(), lookup.patterns(), label_options);
    }));
}

/// Canonical site paths, e.g. `/scriptures/bofm/1-ne/3.7`.
///
/// # Errors
///
/// Never fails.
pub fn uri(lookup: &Lookup, input: &str, options: &Options) -> Result<String, Error> {
    let references = parse(lookup, input, options);
    return Ok(reference::join_rendered(&references, &options.separator, |r| {
        return r.uri(lookup.catalog(), lookup.patterns(), options.use_query_parameters);
    }));
}

/// Full site URLs.
///
/// # Errors
///
/// Never fails.
pub fn url(lookup: &Lookup, input: &str, options: &Options) -> Result<String, Error> {
    let references = parse(lookup, input, options);
    let url_options = options.url();
    return Ok(reference::join_rendered(&references, &options.separator, |r| {
        return r.url(lookup.catalog(), lookup.patterns(), &url_options);
    }));
}

/// HTML anchors.
///
/// # Errors
///
/// Never fails.
pub fn link(lookup: &Lookup, input: &str, options: &Options) -> Result<String, Error> {
    let references = parse(lookup, input, options);
    let link_options = LinkOptions {
        class: options.link_class.as_deref(),
        label: options.label(),
        target: options.link_target.as_deref(),
        url: options.url(),
    };
    return Ok(reference::join_rendered(&references, &options.separator, |r| {
        return r.link(lookup.catalog(), lookup.patterns(), &link_options);
    }));
}

/// The normalized citation text the resolver sees.
///
/// # Errors
///
/// Never fails.
pub fn normalize(lookup: &Lookup, input: &str, options: &Options) -> Result<String, Error> {
    return Ok(lookup.normalize(input, &options.lang));
}

// ── Metadata operations ───────────────────────────────────────────────

/// Language tags the metadata covers. The input is ignored.
///
/// # Errors
///
/// Never fails.
pub fn langs(lookup: &Lookup, _input: &str, options: &Options) -> Result<String, Error> {
    return Ok(lookup.catalog().language_tags().collect::<Vec<_>>().join(&options.separator));
}

/// The language's punctuation table as JSON. The input is ignored.
///
/// # Errors
///
/// Returns `Error::JsonDe` if serialization fails.
pub fn punctuation(lookup: &Lookup, _input: &str, options: &Options) -> Result<String, Error> {
    let language = lookup.language(&options.lang);
    let table = lookup.catalog().punctuation(&language);
    return Ok(serde_json::to_string_pretty(table)?);
}

/// The language's ten digit glyphs, joined by the separator. The input is ignored.
///
/// # Errors
///
/// Never fails.
pub fn numerals(lookup: &Lookup, _input: &str, options: &Options) -> Result<String, Error> {
    let language = lookup.language(&options.lang);
    return Ok(lookup.catalog().numerals(&language).join(&options.separator));
}

/// Re-render each whitespace-separated number in `--format`, or in the
/// language's default script. Tokens that are not numbers pass through.
///
/// # Errors
///
/// Never fails.
pub fn number(lookup: &Lookup, input: &str, options: &Options) -> Result<String, Error> {
    let language = lookup.language(&options.lang);
    let digits = lookup.catalog().numerals(&language);
    let conversions = [Conversion::Chinese, Conversion::Geez, Conversion::Roman];

    let rendered: Vec<String> = input
        .split_whitespace()
        .map(|token| {
            return match numerals::to_int_with(token, &conversions) {
                Some(Numeral::Int(n)) => numerals::format_number(n, &language, options.format, digits),
                _ => {
                    tracing::warn!(token, "not a number, passing through");
                    token.to_string()
                },
            };
        })
        .collect();
    return Ok(rendered.join(&options.separator));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::fixture;

    fn lookup() -> Lookup {
        return Lookup::new(fixture()).unwrap();
    }

    fn run_with(name: &str, input: &str, options: &Options) -> String {
        return run(name, &lookup(), input, options).unwrap();
    }

    #[test]
    fn unknown_commands_are_rejected() {
        let err = run("get_label", &lookup(), "", &Options::default()).unwrap_err();
        match err {
            Error::UnknownCommand { name, known } => {
                assert_eq!(name, "get_label");
                assert!(known.contains(&"label".to_string()));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn every_operation_is_reachable_by_name() {
        for name in names() {
            assert!(find(name).is_ok(), "{name}");
        }
        assert_eq!(names().len(), OPERATIONS.len());
    }

    #[test]
    fn label_and_uri_join_with_the_separator() {
        let options = Options { separator: " | ".to_string(), ..Options::default() };
        assert_eq!(run_with("label", "1 Nephi 3:7; Genesis 1", &options), "1 Nephi 3:7 | Genesis 1");
        assert_eq!(run_with("uri", "1 Nephi 3:7; Genesis 1", &options), "/scriptures/bofm/1-ne/3.7 | /scriptures/ot/gen/1");
    }

    #[test]
    fn uri_with_query_parameters() {
        let options = Options { use_query_parameters: true, ..Options::default() };
        assert_eq!(run_with("uri", "John 3:16-18 (19)", &options), "/scriptures/nt/john/3?id=p16-p18&context=p19");
    }

    #[test]
    fn url_and_link() {
        let options = Options { lang: "es".to_string(), ..Options::default() };
        assert_eq!(
            run_with("url", "Juan 3:16", &options),
            "https://www.churchofjesuschrist.org/study/scriptures/nt/john/3?id=p16&lang=spa#p16"
        );
        let options = Options {
            link_class: Some("scripture".to_string()),
            skip_lang: true,
            skip_fragment: true,
            ..Options::default()
        };
        assert_eq!(
            run_with("link", "Genesis 1", &options),
            "<a href=\"https://www.churchofjesuschrist.org/study/scriptures/ot/gen/1\" class=\"scripture\">Genesis 1</a>"
        );
    }

    #[test]
    fn metadata_operations() {
        let options = Options { separator: ",".to_string(), ..Options::default() };
        assert_eq!(run_with("langs", "", &options), "en,es,ar,zh-Hant");
        let options = Options { lang: "ar".to_string(), separator: String::new(), ..Options::default() };
        assert_eq!(run_with("numerals", "", &options), "٠١٢٣٤٥٦٧٨٩");
        let options = Options { lang: "zh-Hant".to_string(), ..Options::default() };
        let table: serde_json::Value = serde_json::from_str(&run_with("punctuation", "", &options)).unwrap();
        assert_eq!(table["chapterVerseSeparator"], "：");
    }

    #[test]
    fn number_formats() {
        let roman = Options { format: Some(NumeralFormat::RomanUpper), ..Options::default() };
        assert_eq!(run_with("number", "14", &roman), "XIV");
        let arabic = Options { lang: "ar".to_string(), separator: " ".to_string(), ..Options::default() };
        assert_eq!(run_with("number", "14 xiv", &arabic), "١٤ ١٤");
        assert_eq!(run_with("number", "fac-1", &Options::default()), "fac-1");
    }
}
