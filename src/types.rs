/// Core value types shared by the parser, the formatter, and the metadata tables.
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A chapter or verse value: either a parsed integer or an opaque token.
///
/// Opaque tokens cover composite chapter keys (`fac-1`, a chapter range such as
/// `3-5`) and annotated verse ids (`16a`) that no numeral converter accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Numeral {
    /// A positive integer in any supported numeral script.
    Int(u32),
    /// Text kept verbatim.
    Opaque(String),
}

impl Numeral {
    /// The integer value, if this is not an opaque token.
    pub const fn as_int(&self) -> Option<u32> {
        return match self {
            Numeral::Int(n) => Some(*n),
            Numeral::Opaque(_) => None,
        };
    }

    /// Whether the value is an integer.
    pub const fn is_int(&self) -> bool {
        return matches!(self, Numeral::Int(_));
    }
}

impl fmt::Display for Numeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Numeral::Int(n) => write!(f, "{n}"),
            Numeral::Opaque(s) => f.write_str(s),
        };
    }
}

/// How a parsed list of references is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Alphabetical by the localized book name, then chapter and verse.
    Label,
    /// Input order.
    #[default]
    None,
    /// Canonical scripture order from the structure table.
    Traditional,
}

impl FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SortMode::None),
            "label" => Ok(SortMode::Label),
            "traditional" => Ok(SortMode::Traditional),
            _ => Err(Error::UnknownSortMode { value: s.to_string() }),
        };
    }
}
