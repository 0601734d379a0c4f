//! Natural-order string comparison per language, and the per-language cache
//! the engine keeps collators (and other per-language state) in.
//!
//! Letters compare by code point after case and accent folding. Languages
//! whose alphabets order letters differently carry a tailoring table; the
//! Latin-script languages listed in [`ROOT_ORDER`] and the non-Latin scripts
//! whose code points already follow alphabet order use the root order as is.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use unicode_normalization::UnicodeNormalization as _;
use unicode_normalization::char::is_combining_mark;

/// Weights are spaced so tailored letters can slot in after a base letter.
const WEIGHT_STEP: u32 = 8;

/// Primary language subtags whose readers expect the root letter order.
pub const ROOT_ORDER: &[&str] = &[
    "af", "bg", "ca", "ceb", "de", "el", "en", "fil", "fj", "fr", "ht", "hy", "id", "ilo", "it", "ja", "ka", "ko",
    "mg", "mh", "mn", "ms", "nl", "pt", "ru", "sm", "sw", "tl", "to", "ty",
];

/// Czech: `ch` is a letter between `h` and `i`.
const CZECH: &[Rule] = &[("č", 'c', 1), ("ch", 'h', 1), ("ř", 'r', 1), ("š", 's', 1), ("ž", 'z', 1)];

/// Danish and Norwegian.
const DANISH: &[Rule] = &[("æ", 'z', 1), ("ä", 'z', 1), ("ø", 'z', 2), ("ö", 'z', 2), ("å", 'z', 3)];

/// Estonian: `z` and `ž` follow `š`, the vowels with marks follow `w`.
const ESTONIAN: &[Rule] = &[
    ("š", 's', 1),
    ("z", 's', 2),
    ("ž", 's', 3),
    ("õ", 'w', 1),
    ("ä", 'w', 2),
    ("ö", 'w', 3),
    ("ü", 'w', 4),
];

/// Hungarian digraphs and the long vowels.
const HUNGARIAN: &[Rule] = &[
    ("cs", 'c', 1),
    ("dz", 'd', 1),
    ("dzs", 'd', 2),
    ("gy", 'g', 1),
    ("ly", 'l', 1),
    ("ny", 'n', 1),
    ("ö", 'o', 1),
    ("ő", 'o', 1),
    ("sz", 's', 1),
    ("ty", 't', 1),
    ("ü", 'u', 1),
    ("ű", 'u', 1),
    ("zs", 'z', 1),
];

/// Icelandic.
const ICELANDIC: &[Rule] = &[
    ("á", 'a', 1),
    ("ð", 'd', 1),
    ("é", 'e', 1),
    ("í", 'i', 1),
    ("ó", 'o', 1),
    ("ú", 'u', 1),
    ("ý", 'y', 1),
    ("þ", 'z', 1),
    ("æ", 'z', 2),
    ("ö", 'z', 3),
];

/// Latvian.
const LATVIAN: &[Rule] = &[
    ("č", 'c', 1),
    ("ģ", 'g', 1),
    ("ķ", 'k', 1),
    ("ļ", 'l', 1),
    ("ņ", 'n', 1),
    ("š", 's', 1),
    ("ž", 'z', 1),
];

/// Lithuanian: `y` shares a place with `i`.
const LITHUANIAN: &[Rule] = &[("č", 'c', 1), ("y", 'i', 0), ("š", 's', 1), ("ž", 'z', 1)];

/// Polish.
const POLISH: &[Rule] = &[
    ("ą", 'a', 1),
    ("ć", 'c', 1),
    ("ę", 'e', 1),
    ("ł", 'l', 1),
    ("ń", 'n', 1),
    ("ó", 'o', 1),
    ("ś", 's', 1),
    ("ź", 'z', 1),
    ("ż", 'z', 2),
];

/// Romanian, with both comma-below and cedilla spellings.
const ROMANIAN: &[Rule] = &[
    ("ă", 'a', 1),
    ("â", 'a', 2),
    ("î", 'i', 1),
    ("ș", 's', 1),
    ("ş", 's', 1),
    ("ț", 't', 1),
    ("ţ", 't', 1),
];

/// Croatian and Bosnian.
const SERBO_CROATIAN: &[Rule] = &[
    ("č", 'c', 1),
    ("ć", 'c', 2),
    ("dž", 'd', 1),
    ("đ", 'd', 2),
    ("lj", 'l', 1),
    ("nj", 'n', 1),
    ("š", 's', 1),
    ("ž", 'z', 1),
];

/// Slovak.
const SLOVAK: &[Rule] = &[
    ("ä", 'a', 1),
    ("č", 'c', 1),
    ("ch", 'h', 1),
    ("ô", 'o', 1),
    ("ř", 'r', 1),
    ("š", 's', 1),
    ("ž", 'z', 1),
];

/// Slovenian.
const SLOVENIAN: &[Rule] = &[("č", 'c', 1), ("š", 's', 1), ("ž", 'z', 1)];

/// Spanish.
const SPANISH: &[Rule] = &[("ñ", 'n', 1)];

/// Swedish and Finnish.
const SWEDISH: &[Rule] = &[("å", 'z', 1), ("ä", 'z', 2), ("æ", 'z', 2), ("ö", 'z', 3), ("ø", 'z', 3)];

/// Turkish; Azerbaijani adds `ə`.
const TURKISH: &[Rule] = &[
    ("ç", 'c', 1),
    ("ə", 'e', 1),
    ("ğ", 'g', 1),
    ("ı", 'h', 1),
    ("ö", 'o', 1),
    ("ş", 's', 1),
    ("ü", 'u', 1),
];

/// `(text, base, rank)`: `text` sorts `rank` places after `base`, and rank 0
/// shares `base`'s place.
type Rule = (&'static str, char, u32);

/// One unit of a sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyPart {
    /// A weighted letter or contraction.
    Letter(u32),
    /// A digit run without leading zeros, compared by value.
    Number(String),
}

impl KeyPart {
    /// Numbers sort before letters.
    fn cmp_part(&self, other: &Self) -> Ordering {
        return match (self, other) {
            (KeyPart::Letter(a), KeyPart::Letter(b)) => a.cmp(b),
            (KeyPart::Letter(_), KeyPart::Number(_)) => Ordering::Greater,
            (KeyPart::Number(_), KeyPart::Letter(_)) => Ordering::Less,
            (KeyPart::Number(a), KeyPart::Number(b)) => a.len().cmp(&b.len()).then_with(|| return a.cmp(b)),
        };
    }
}

/// Letters and contractions a language places apart from the root order.
#[derive(Debug, Clone, Default)]
struct Tailoring {
    /// Rules with the longest text first, so contractions win over their letters.
    rules: Vec<Rule>,
}

impl Tailoring {
    /// The table for a language's primary subtag; empty when it has none.
    fn for_language(language: &str) -> Self {
        let table: &[Rule] = match primary_subtag(language) {
            "az" | "tr" => TURKISH,
            "bs" | "hr" => SERBO_CROATIAN,
            "cs" => CZECH,
            "da" | "nb" | "nn" | "no" => DANISH,
            "es" => SPANISH,
            "et" => ESTONIAN,
            "fi" | "sv" => SWEDISH,
            "hu" => HUNGARIAN,
            "is" => ICELANDIC,
            "lt" => LITHUANIAN,
            "lv" => LATVIAN,
            "pl" => POLISH,
            "ro" => ROMANIAN,
            "sk" => SLOVAK,
            "sl" => SLOVENIAN,
            _ => &[],
        };
        let mut rules = table.to_vec();
        rules.sort_by_key(|(text, ..)| return std::cmp::Reverse(text.chars().count()));
        return Self { rules };
    }

    /// Whether `c` is a tailored letter in its own right and must survive folding.
    fn keeps(&self, c: char) -> bool {
        return self.rules.iter().any(|(text, ..)| return text.chars().eq(std::iter::once(c)));
    }

    /// The rule matching at the start of `text`, as `(byte length, rule)`.
    fn matched(&self, text: &str) -> Option<(usize, Rule)> {
        return self
            .rules
            .iter()
            .find(|(rule_text, ..)| return text.starts_with(rule_text))
            .map(|rule| return (rule.0.len(), *rule));
    }
}

/// Compares strings the way a reader of one language expects: accents and
/// case are secondary, digit runs compare by numeric value.
#[derive(Debug, Clone)]
pub struct Collator {
    /// BCP 47 tag the collator was built for.
    language: String,
    /// Letters placed apart from the root order.
    tailoring: Tailoring,
}

impl Collator {
    /// Build the collator for a BCP 47 tag, warning when the language has
    /// neither a tailoring nor a known fit with the root order.
    pub fn new(language: &str) -> Self {
        let tailoring = Tailoring::for_language(language);
        if tailoring.rules.is_empty() && !uses_root_order(language) && !is_han_language(language) {
            tracing::warn!(language, "no collation tailoring for language, using root letter order");
        }
        return Self {
            language: language.to_string(),
            tailoring,
        };
    }

    /// The tag this collator was built for.
    pub fn language(&self) -> &str {
        return &self.language;
    }

    /// Total order: folded keys first, raw text breaks ties.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let left = self.key(a);
        let right = self.key(b);
        for (l, r) in left.iter().zip(&right) {
            let ord = l.cmp_part(r);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        return left.len().cmp(&right.len()).then_with(|| return a.cmp(b));
    }

    /// Lowercase, accent-free form of `text`, with tailored letters kept intact.
    pub fn fold(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars().flat_map(char::to_lowercase) {
            if self.tailoring.keeps(c) {
                out.push(c);
                continue;
            }
            out.extend(
                std::iter::once(c)
                    .nfkd()
                    .filter(|d| return !is_combining_mark(*d))
                    .flat_map(char::to_lowercase),
            );
        }
        return out;
    }

    /// The alphabetical-index heading `text` files under: its first folded
    /// letter or contraction in uppercase, or `None` when it does not start
    /// with a letter.
    pub fn index_letter(&self, text: &str) -> Option<String> {
        let folded = self.fold(text.trim());
        if let Some((_, (rule_text, ..))) = self.tailoring.matched(&folded) {
            return Some(rule_text.to_uppercase());
        }
        let first = folded.chars().next()?;
        if !first.is_alphabetic() {
            return None;
        }
        return Some(first.to_uppercase().collect());
    }

    /// Sort key: weighted letters and numeric digit runs, whitespace dropped.
    fn key(&self, text: &str) -> Vec<KeyPart> {
        let folded = self.fold(text);
        let mut parts = Vec::new();
        let mut digits = String::new();
        let mut rest = folded.as_str();
        while let Some(c) = rest.chars().next() {
            if c.is_ascii_digit() {
                digits.push(c);
                rest = rest.get(c.len_utf8()..).unwrap_or("");
                continue;
            }
            flush_digits(&mut digits, &mut parts);
            if let Some((len, (_, base, rank))) = self.tailoring.matched(rest) {
                parts.push(KeyPart::Letter(letter_weight(base).saturating_add(rank)));
                rest = rest.get(len..).unwrap_or("");
                continue;
            }
            rest = rest.get(c.len_utf8()..).unwrap_or("");
            if !c.is_whitespace() {
                parts.push(KeyPart::Letter(letter_weight(c)));
            }
        }
        flush_digits(&mut digits, &mut parts);
        return parts;
    }
}

/// Per-language values created on first use and shared afterwards.
///
/// Reads take a shared lock; the first request for a language builds its
/// value under the write lock, so concurrent first requests build it once.
#[derive(Debug)]
pub struct LanguageCache<T> {
    /// Built values by BCP 47 tag.
    entries: RwLock<HashMap<String, Arc<T>>>,
}

impl<T> Default for LanguageCache<T> {
    fn default() -> Self {
        return Self { entries: RwLock::new(HashMap::new()) };
    }
}

impl<T> LanguageCache<T> {
    /// An empty cache.
    pub fn new() -> Self {
        return Self::default();
    }

    /// The cached value for `language`, building it with `create` if absent.
    pub fn get_or_create<F>(&self, language: &str, create: F) -> Arc<T>
    where
        F: FnOnce(&str) -> T,
    {
        let cached = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(language)
            .cloned();
        if let Some(value) = cached {
            return value;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let value = entries.entry(language.to_string()).or_insert_with(|| {
            tracing::debug!(language, "building per-language cache entry");
            return Arc::new(create(language));
        });
        return Arc::clone(value);
    }

    /// Number of languages built so far.
    pub fn len(&self) -> usize {
        return self.entries.read().unwrap_or_else(PoisonError::into_inner).len();
    }

    /// Whether nothing has been built yet.
    pub fn is_empty(&self) -> bool {
        return self.len() == 0;
    }
}

/// Push the pending digit run, if any, as one numeric part.
fn flush_digits(digits: &mut String, parts: &mut Vec<KeyPart>) {
    if digits.is_empty() {
        return;
    }
    let trimmed = digits.trim_start_matches('0');
    let value = if trimmed.is_empty() { "0" } else { trimmed };
    parts.push(KeyPart::Number(value.to_string()));
    digits.clear();
}

/// Whether a language's book names are written in Han script.
pub fn is_han_language(language: &str) -> bool {
    return matches!(primary_subtag(language), "zh" | "cmn" | "yue" | "lzh");
}

/// Root weight of a folded letter.
fn letter_weight(c: char) -> u32 {
    return u32::from(c).saturating_mul(WEIGHT_STEP);
}

/// `pt` for `pt-BR`, `zh` for `zh_Hant`.
fn primary_subtag(language: &str) -> &str {
    return language.split(['-', '_']).next().unwrap_or("");
}

/// Whether the root letter order is already right for `language`.
pub fn uses_root_order(language: &str) -> bool {
    return ROOT_ORDER.contains(&primary_subtag(language));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::captured_warnings;

    fn sorted(language: &str, words: &[&str]) -> Vec<String> {
        let collator = Collator::new(language);
        let mut out: Vec<String> = words.iter().map(|w| return w.to_string()).collect();
        out.sort_by(|a, b| return collator.compare(a, b));
        return out;
    }

    #[test]
    fn digit_runs_compare_by_value() {
        assert_eq!(sorted("en", &["10a", "9b", "2"]), ["2", "9b", "10a"]);
        assert_eq!(sorted("en", &["fac-10", "fac-2", "fac-1"]), ["fac-1", "fac-2", "fac-10"]);
    }

    #[test]
    fn accents_and_case_are_secondary() {
        assert_eq!(sorted("en", &["Éxodo", "Ester", "abdías"]), ["abdías", "Ester", "Éxodo"]);
        assert_eq!(Collator::new("en").compare("a", "A"), "a".cmp("A"));
    }

    #[test]
    fn spanish_sorts_enye_after_n() {
        assert_eq!(sorted("es", &["ñu", "nz", "o"]), ["nz", "ñu", "o"]);
        assert_eq!(sorted("en", &["nz", "ñu"]), ["ñu", "nz"]);
        assert_eq!(sorted("en", &["ñb", "nc"]), ["ñb", "nc"]);
    }

    #[test]
    fn swedish_sorts_aring_after_z() {
        assert_eq!(sorted("sv", &["ål", "zebra", "ar"]), ["ar", "zebra", "ål"]);
    }

    #[test]
    fn czech_ch_follows_h() {
        assert_eq!(sorted("cs", &["Chrám", "Hora", "Izák", "Cesta"]), ["Cesta", "Hora", "Chrám", "Izák"]);
        assert_eq!(sorted("cs", &["Čas", "Dům", "Cena"]), ["Cena", "Čas", "Dům"]);
        assert_eq!(sorted("en", &["Chrám", "Hora"]), ["Chrám", "Hora"]);
        assert_eq!(Collator::new("cs").index_letter("Chrám").as_deref(), Some("CH"));
    }

    #[test]
    fn lithuanian_y_shares_a_place_with_i() {
        assert_eq!(sorted("lt", &["yra", "ir", "is"]), ["ir", "yra", "is"]);
        assert_eq!(sorted("lt", &["ilgas", "ykis"]), ["ykis", "ilgas"]);
        assert_eq!(sorted("en", &["ykis", "ilgas"]), ["ilgas", "ykis"]);
        assert_eq!(sorted("lt", &["šaltas", "tas", "sala"]), ["sala", "šaltas", "tas"]);
    }

    #[test]
    fn hungarian_digraphs_are_letters() {
        assert_eq!(sorted("hu", &["csak", "cukor", "dal"]), ["cukor", "csak", "dal"]);
    }

    #[test]
    fn untailored_languages_warn_once_per_collator() {
        let logs = captured_warnings(|| {
            let _ = Collator::new("xx");
            let _ = Collator::new("en");
            let _ = Collator::new("cs");
            let _ = Collator::new("zh-Hant");
        });
        assert_eq!(logs.matches("no collation tailoring").count(), 1);
        assert!(logs.contains("xx"));
        assert!(uses_root_order("pt-BR"));
        assert!(!uses_root_order("cs"));
    }

    #[test]
    fn index_letters() {
        let collator = Collator::new("es");
        assert_eq!(collator.index_letter("Éxodo").as_deref(), Some("E"));
        assert_eq!(collator.index_letter("1 Nefi"), None);
        assert!(is_han_language("zh-Hant"));
        assert!(!is_han_language("ja"));
    }

    #[test]
    fn cache_builds_each_language_once() {
        let cache: LanguageCache<Collator> = LanguageCache::new();
        let mut builds = 0;
        let first = cache.get_or_create("es", |tag| {
            builds += 1;
            return Collator::new(tag);
        });
        let second = cache.get_or_create("es", |tag| {
            builds += 1;
            return Collator::new(tag);
        });
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_is_shared_across_threads() {
        let cache: Arc<LanguageCache<Collator>> = Arc::new(LanguageCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                return std::thread::spawn(move || return cache.get_or_create("fr", Collator::new));
            })
            .collect();
        let built: Vec<Arc<Collator>> = handles.into_iter().map(|h| return h.join().unwrap()).collect();
        assert!(built.windows(2).all(|w| return Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(cache.len(), 1);
    }
}
