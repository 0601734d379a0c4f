//! Scripture citation parsing and rendering.
//!
//! Free text such as `1 Ne 3:7; Juan 3:16-18` is normalized, resolved against
//! locale metadata into [`Reference`]s, optionally sorted, and rendered as
//! labels, site paths, URLs or HTML links.
//!
//! ```no_run
//! use scripref::{LabelOptions, Lookup, SortMode};
//!
//! let lookup = Lookup::load(std::path::Path::new("data"))?;
//! for reference in lookup.parse("1 Nephi 3:7", "en", SortMode::None) {
//!     println!("{}", reference.label(lookup.catalog(), lookup.patterns(), LabelOptions::default()));
//! }
//! # Ok::<(), scripref::Error>(())
//! ```

pub mod catalog;
pub mod collation;
pub mod commands;
pub mod config;
pub mod diagnostics;
mod error;
pub mod info;
pub mod lookup;
pub mod normalizer;
pub mod numerals;
pub mod patterns;
pub mod reference;
pub mod resolver;
pub mod sorting;
mod types;
pub mod verses;

pub use crate::catalog::Catalog;
pub use crate::error::Error;
pub use crate::lookup::Lookup;
pub use crate::numerals::NumeralFormat;
pub use crate::reference::{LabelOptions, LinkOptions, Reference, UrlOptions};
pub use crate::types::{Numeral, SortMode};
pub use crate::verses::VerseGroup;
