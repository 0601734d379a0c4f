//! Conversion between integers and the numeral scripts used in localized citations.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::types::Numeral;

/// Arabic-Indic digits.
const ARABIC_EASTERN: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];
/// Extended Arabic-Indic digits (Persian, Urdu).
const ARABIC_EXTENDED: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];
/// Devanagari digits.
const DEVANAGARI: [char; 10] = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];
/// Khmer digits.
const KHMER: [char; 10] = ['០', '១', '២', '៣', '៤', '៥', '៦', '៧', '៨', '៩'];
/// Myanmar digits.
const MYANMAR: [char; 10] = ['၀', '၁', '၂', '၃', '၄', '၅', '၆', '၇', '၈', '၉'];
/// Thai digits.
const THAI: [char; 10] = ['๐', '๑', '๒', '๓', '๔', '๕', '๖', '๗', '๘', '๙'];
/// Fullwidth digits.
const FULLWIDTH: [char; 10] = ['０', '１', '２', '３', '４', '５', '６', '７', '８', '９'];

/// Every digit table accepted when reading a decimal number.
const DECIMAL_SCRIPTS: [&[char; 10]; 7] = [
    &ARABIC_EASTERN,
    &ARABIC_EXTENDED,
    &DEVANAGARI,
    &KHMER,
    &MYANMAR,
    &THAI,
    &FULLWIDTH,
];

/// Characters that make up Chinese numerals.
const CHINESE_CHARS: [char; 18] = [
    '〇', '零', '一', '二', '三', '四', '五', '六', '七', '八', '九', '十', '百', '千', '万', '萬',
    '亿', '億',
];

/// Geʽez ones (U+1369..U+1371).
const GEEZ_ONES: [char; 9] = ['፩', '፪', '፫', '፬', '፭', '፮', '፯', '፰', '፱'];
/// Geʽez tens (U+1372..U+137A).
const GEEZ_TENS: [char; 9] = ['፲', '፳', '፴', '፵', '፶', '፷', '፸', '፹', '፺'];
/// Geʽez hundred.
const GEEZ_HUNDRED: char = '፻';
/// Geʽez ten thousand.
const GEEZ_TEN_THOUSAND: char = '፼';

/// Roman symbols by descending value, subtractive pairs included.
const ROMAN_LADDER: [(u32, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// Every format, in the order `info` and `--help` list them.
pub const ALL_FORMATS: [NumeralFormat; 16] = [
    NumeralFormat::Decimal,
    NumeralFormat::ArabicEastern,
    NumeralFormat::ArabicExtended,
    NumeralFormat::Devanagari,
    NumeralFormat::Khmer,
    NumeralFormat::Myanmar,
    NumeralFormat::Thai,
    NumeralFormat::Custom,
    NumeralFormat::ChineseSimplified,
    NumeralFormat::ChineseTraditional,
    NumeralFormat::Fullwidth,
    NumeralFormat::Geez,
    NumeralFormat::RomanUpper,
    NumeralFormat::RomanLower,
    NumeralFormat::AlphabetUpper,
    NumeralFormat::AlphabetLower,
];

/// Conversions tried by [`to_int`]. Roman and alphabetic numerals share an
/// alphabet with ordinary words, so callers opt into them explicitly.
pub const DEFAULT_CONVERSIONS: &[Conversion] = &[Conversion::Chinese, Conversion::Geez];

/// Order in which conversions are tried.
const CONVERSION_PRIORITY: [Conversion; 4] =
    [Conversion::Chinese, Conversion::Geez, Conversion::Roman, Conversion::Alphabet];

/// Target representation for [`format_number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumeralFormat {
    /// `N`, `AA`, like spreadsheet columns.
    AlphabetLower,
    /// Uppercase variant of [`NumeralFormat::AlphabetLower`].
    AlphabetUpper,
    /// `١٤`
    ArabicEastern,
    /// `۱۴`
    ArabicExtended,
    /// Not implemented; renders plain decimal with a diagnostic.
    ChineseSimplified,
    /// Not implemented; renders plain decimal with a diagnostic.
    ChineseTraditional,
    /// Digit substitution through a caller-supplied table.
    Custom,
    /// Plain ASCII decimal.
    Decimal,
    /// `१४`
    Devanagari,
    /// Fullwidth digits, only for single-digit numbers.
    Fullwidth,
    /// `፲፬`
    Geez,
    /// `១៤`
    Khmer,
    /// `၁၄`
    Myanmar,
    /// `xiv`
    RomanLower,
    /// `XIV`
    RomanUpper,
    /// `๑๔`
    Thai,
}

impl NumeralFormat {
    /// The command-line name of the format.
    pub const fn name(self) -> &'static str {
        return match self {
            NumeralFormat::AlphabetLower => "alphabet-lower",
            NumeralFormat::AlphabetUpper => "alphabet-upper",
            NumeralFormat::ArabicEastern => "arabic-eastern",
            NumeralFormat::ArabicExtended => "arabic-extended",
            NumeralFormat::ChineseSimplified => "chinese-simplified",
            NumeralFormat::ChineseTraditional => "chinese-traditional",
            NumeralFormat::Custom => "custom",
            NumeralFormat::Decimal => "decimal",
            NumeralFormat::Devanagari => "devanagari",
            NumeralFormat::Fullwidth => "decimal-fullwidth",
            NumeralFormat::Geez => "geez",
            NumeralFormat::Khmer => "khmer",
            NumeralFormat::Myanmar => "myanmar",
            NumeralFormat::RomanLower => "roman-lower",
            NumeralFormat::RomanUpper => "roman-upper",
            NumeralFormat::Thai => "thai",
        };
    }

    /// Default format for a language tag, keyed on its primary subtag.
    pub fn for_language(language: &str) -> Self {
        let primary = language.split(['-', '_']).next().unwrap_or("");
        return match primary {
            "am" => NumeralFormat::Geez,
            "ar" => NumeralFormat::ArabicEastern,
            "fa" | "ur" => NumeralFormat::ArabicExtended,
            "km" => NumeralFormat::Khmer,
            "my" => NumeralFormat::Myanmar,
            "ne" => NumeralFormat::Devanagari,
            "th" => NumeralFormat::Thai,
            _ => NumeralFormat::Decimal,
        };
    }

    /// The substitution table for simple per-digit scripts.
    const fn digit_table(self) -> Option<&'static [char; 10]> {
        return match self {
            NumeralFormat::ArabicEastern => Some(&ARABIC_EASTERN),
            NumeralFormat::ArabicExtended => Some(&ARABIC_EXTENDED),
            NumeralFormat::Devanagari => Some(&DEVANAGARI),
            NumeralFormat::Khmer => Some(&KHMER),
            NumeralFormat::Myanmar => Some(&MYANMAR),
            NumeralFormat::Thai => Some(&THAI),
            _ => None,
        };
    }
}

impl fmt::Display for NumeralFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.name());
    }
}

impl FromStr for NumeralFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        // `devangari` and `decimal-string` are the spellings older callers used.
        let wanted = match wanted.as_str() {
            "devangari" => "devanagari",
            "decimal-string" => "decimal",
            other => other,
        };
        return ALL_FORMATS
            .into_iter()
            .find(|format| return format.name() == wanted)
            .ok_or_else(|| return Error::UnknownNumeralFormat { value: s.to_string() });
    }
}

/// Which digit counts get fullwidth digits. Wider numbers stay ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullwidthWidths {
    /// Convert numbers with more than two digits.
    pub more_digits: bool,
    /// Convert single-digit numbers.
    pub one_digit: bool,
    /// Convert two-digit numbers.
    pub two_digits: bool,
}

impl Default for FullwidthWidths {
    fn default() -> Self {
        return Self {
            more_digits: false,
            one_digit: true,
            two_digits: false,
        };
    }
}

/// Non-decimal scripts [`to_int_with`] may try, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Latin letters as bijective base-26 (`a`=1, `aa`=27).
    Alphabet,
    /// Chinese ideographic numerals. Not implemented.
    Chinese,
    /// Geʽez numerals.
    Geez,
    /// Roman numerals in either case.
    Roman,
}

// ── Parsing ───────────────────────────────────────────────────────────

/// Parse a chapter or verse token with the default conversions.
///
/// Returns `None` for empty tokens and for zero.
pub fn to_int(token: &str) -> Option<Numeral> {
    return to_int_with(token, DEFAULT_CONVERSIONS);
}

/// Parse a token as decimal digits (any supported script), or through the
/// first listed conversion whose character set covers the whole token.
///
/// Tokens no converter accepts come back as [`Numeral::Opaque`] so composite
/// chapter keys keep working downstream.
pub fn to_int_with(token: &str, conversions: &[Conversion]) -> Option<Numeral> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(n) = parse_decimal(token) {
        return nonzero(n);
    }

    for conversion in CONVERSION_PRIORITY {
        if !conversions.contains(&conversion) || !token.chars().all(|c| return accepts(conversion, c)) {
            continue;
        }
        let converted = match conversion {
            Conversion::Alphabet => alphabet_to_int(token),
            Conversion::Chinese => return chinese_to_int(token),
            Conversion::Geez => geez_to_int(token),
            Conversion::Roman => roman_to_int(token),
        };
        return match converted {
            Some(n) => nonzero(n),
            None => Some(Numeral::Opaque(token.to_string())),
        };
    }

    return Some(Numeral::Opaque(token.to_string()));
}

/// Zero is not a chapter or verse.
const fn nonzero(n: u32) -> Option<Numeral> {
    if n == 0 {
        return None;
    }
    return Some(Numeral::Int(n));
}

/// Whether `c` can appear in a numeral of the given conversion.
fn accepts(conversion: Conversion, c: char) -> bool {
    return match conversion {
        Conversion::Alphabet => c.is_ascii_alphabetic(),
        Conversion::Chinese => CHINESE_CHARS.contains(&c),
        Conversion::Geez => {
            GEEZ_ONES.contains(&c) || GEEZ_TENS.contains(&c) || c == GEEZ_HUNDRED || c == GEEZ_TEN_THOUSAND
        },
        Conversion::Roman => matches!(c.to_ascii_uppercase(), 'I' | 'V' | 'X' | 'L' | 'C' | 'D' | 'M'),
    };
}

/// Read decimal digits written in ASCII or any of the substitution scripts.
/// Mixed scripts are accepted digit by digit.
fn parse_decimal(token: &str) -> Option<u32> {
    let mut ascii = String::with_capacity(token.len());
    for c in token.chars() {
        if c.is_ascii_digit() {
            ascii.push(c);
            continue;
        }
        let digit = DECIMAL_SCRIPTS
            .iter()
            .find_map(|table| return table.iter().position(|d| return *d == c))?;
        ascii.push(char::from_digit(u32::try_from(digit).ok()?, 10)?);
    }
    return ascii.parse().ok();
}

/// Ideographic numerals are a known gap: report it and give up.
fn chinese_to_int(token: &str) -> Option<Numeral> {
    tracing::warn!(token, "conversion from Chinese numerals to an integer is not implemented");
    return None;
}

/// Value of one uppercase Roman symbol, zero for anything else.
fn roman_value(c: char) -> i64 {
    return match c {
        'I' => 1,
        'V' => 5,
        'X' => 10,
        'L' => 50,
        'C' => 100,
        'D' => 500,
        'M' => 1000,
        _ => 0,
    };
}

/// A symbol followed by a larger one is subtracted, otherwise added.
fn roman_to_int(token: &str) -> Option<u32> {
    let values: Vec<i64> = token.chars().map(|c| return roman_value(c.to_ascii_uppercase())).collect();
    let mut total: i64 = 0;
    for (i, value) in values.iter().enumerate() {
        let next = values.get(i.saturating_add(1)).copied().unwrap_or(0);
        if *value >= next {
            total = total.checked_add(*value)?;
        } else {
            total = total.checked_sub(*value)?;
        }
    }
    return u32::try_from(total).ok();
}

/// Bijective base-26 letters back to a number.
fn alphabet_to_int(token: &str) -> Option<u32> {
    let mut total: u32 = 0;
    for c in token.chars() {
        let letter = u32::from(c.to_ascii_uppercase()).checked_sub(u32::from('A'))?.checked_add(1)?;
        total = total.checked_mul(26)?.checked_add(letter)?;
    }
    return Some(total);
}

/// `፻` multiplies the pending group by 100, `፼` closes everything read so far
/// into a block of ten thousands. A bare multiplier stands for one of itself.
fn geez_to_int(token: &str) -> Option<u32> {
    let mut total: u64 = 0;
    let mut hundreds: u64 = 0;
    let mut current: u64 = 0;

    for c in token.chars() {
        if let Some(i) = GEEZ_ONES.iter().position(|d| return *d == c) {
            current = current.checked_add(u64::try_from(i).ok()?.checked_add(1)?)?;
        } else if let Some(i) = GEEZ_TENS.iter().position(|d| return *d == c) {
            current = current.checked_add(u64::try_from(i).ok()?.checked_add(1)?.checked_mul(10)?)?;
        } else if c == GEEZ_HUNDRED {
            hundreds = hundreds.checked_add(current.max(1).checked_mul(100)?)?;
            current = 0;
        } else if c == GEEZ_TEN_THOUSAND {
            let block = total.checked_add(hundreds)?.checked_add(current)?;
            total = block.max(1).checked_mul(10_000)?;
            hundreds = 0;
            current = 0;
        }
    }

    let value = total.checked_add(hundreds)?.checked_add(current)?;
    return u32::try_from(value).ok();
}

// ── Formatting ────────────────────────────────────────────────────────

/// Format a number for display in a language.
///
/// An explicit `format` wins. Otherwise a ten-entry `custom_digits` table
/// selects digit substitution, and failing that the language's default
/// script is used.
pub fn format_number(
    number: u32,
    language: &str,
    format: Option<NumeralFormat>,
    custom_digits: &[String],
) -> String {
    let format = match format {
        Some(f) => f,
        None if custom_digits.len() == 10 => NumeralFormat::Custom,
        None => NumeralFormat::for_language(language),
    };

    if let Some(table) = format.digit_table() {
        return substitute_digits(number, |d| return table.get(d).map(|c| return c.to_string()));
    }

    return match format {
        NumeralFormat::AlphabetLower => format_alphabet(number, false),
        NumeralFormat::AlphabetUpper => format_alphabet(number, true),
        NumeralFormat::ChineseSimplified | NumeralFormat::ChineseTraditional => format_chinese(number),
        NumeralFormat::Custom if custom_digits.len() == 10 => {
            substitute_digits(number, |d| return custom_digits.get(d).cloned())
        },
        NumeralFormat::Custom => {
            tracing::warn!(len = custom_digits.len(), "custom numeral table needs ten digits, using decimal");
            number.to_string()
        },
        NumeralFormat::Fullwidth => format_fullwidth(number, FullwidthWidths::default()),
        NumeralFormat::Geez => format_geez(number),
        NumeralFormat::RomanLower => format_roman(number, false),
        NumeralFormat::RomanUpper => format_roman(number, true),
        _ => number.to_string(),
    };
}

/// Format a chapter or verse value. Opaque tokens are shown as written.
pub fn format_numeral(value: &Numeral, language: &str, custom_digits: &[String]) -> String {
    return match value {
        Numeral::Int(n) => format_number(*n, language, None, custom_digits),
        Numeral::Opaque(text) => text.clone(),
    };
}

/// Replace each decimal digit through `lookup`, keeping digits it has no glyph for.
fn substitute_digits<F>(number: u32, lookup: F) -> String
where
    F: Fn(usize) -> Option<String>,
{
    let mut out = String::new();
    for c in number.to_string().chars() {
        let digit = c.to_digit(10).and_then(|d| return usize::try_from(d).ok()).unwrap_or(0);
        match lookup(digit) {
            Some(glyph) => out.push_str(&glyph),
            None => out.push(c),
        }
    }
    return out;
}

/// Ideographic output is a known gap: report it and fall back to decimal.
fn format_chinese(number: u32) -> String {
    tracing::warn!(number, "conversion from an integer to Chinese numerals is not implemented");
    return number.to_string();
}

/// Fullwidth digits for numbers whose width is enabled in `widths`.
pub fn format_fullwidth(number: u32, widths: FullwidthWidths) -> String {
    let ascii = number.to_string();
    let convert = match ascii.len() {
        1 => widths.one_digit,
        2 => widths.two_digits,
        _ => widths.more_digits,
    };
    if !convert {
        return ascii;
    }
    return substitute_digits(number, |d| return FULLWIDTH.get(d).map(|c| return c.to_string()));
}

/// Greedy subtractive encoding. Values below one render as an empty string.
pub fn format_roman(number: u32, uppercase: bool) -> String {
    let mut remaining = number;
    let mut out = String::new();
    for (value, symbol) in ROMAN_LADDER {
        while remaining >= value {
            out.push_str(symbol);
            remaining = remaining.saturating_sub(value);
        }
    }
    if uppercase {
        return out.to_ascii_uppercase();
    }
    return out;
}

/// Bijective base-26. Values below one render as an empty string.
pub fn format_alphabet(number: u32, uppercase: bool) -> String {
    let base = if uppercase { b'A' } else { b'a' };
    let mut letters = Vec::new();
    let mut remaining = number;
    while remaining > 0 {
        remaining = remaining.saturating_sub(1);
        let offset = u8::try_from(remaining % 26).unwrap_or(0);
        letters.push(char::from(base.saturating_add(offset)));
        remaining /= 26;
    }
    return letters.iter().rev().collect();
}

/// Geʽez numerals, built from base-100 digit pairs read most significant
/// first. Odd pair positions carry `፻`, even ones `፼`. A leading pair of one
/// is implied by its multiplier, and a one before `፻` is always implied.
pub fn format_geez(number: u32) -> String {
    if number == 0 {
        return String::new();
    }

    let mut pairs = Vec::new();
    let mut remaining = number;
    while remaining > 0 {
        pairs.push(remaining % 100);
        remaining /= 100;
    }

    let mut out = String::new();
    let highest = pairs.len().saturating_sub(1);
    for (position, pair) in pairs.iter().enumerate().rev() {
        let pair = *pair;
        let hundreds_slot = position % 2 == 1;
        let implied_one = pair == 1 && position > 0 && (hundreds_slot || position == highest);

        if pair != 0 && !implied_one {
            push_geez_pair(&mut out, pair);
        }
        if hundreds_slot && pair != 0 {
            out.push(GEEZ_HUNDRED);
        } else if position > 0 && !hundreds_slot {
            out.push(GEEZ_TEN_THOUSAND);
        }
    }
    return out;
}

/// Append one base-100 pair as Geʽez tens and ones.
fn push_geez_pair(out: &mut String, pair: u32) {
    let tens = usize::try_from(pair / 10).unwrap_or(0);
    let ones = usize::try_from(pair % 10).unwrap_or(0);
    if let Some(c) = tens.checked_sub(1).and_then(|i| return GEEZ_TENS.get(i)) {
        out.push(*c);
    }
    if let Some(c) = ones.checked_sub(1).and_then(|i| return GEEZ_ONES.get(i)) {
        out.push(*c);
    }
}
