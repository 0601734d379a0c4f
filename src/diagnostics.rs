use std::fmt::Write as _;
use std::path::Path;

use crate::catalog::{LANGUAGES_FILE, SCRIPTURES_FILE};
use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::numerals::ALL_FORMATS;

/// ANSI bold, for headings.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened, why, and how to fix it.
/// Designed to be readable by both humans and LLM agents.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::MetadataNotFound { path } => render_metadata_not_found(path),
        Error::MetadataCorrupt { path, reason } => render_metadata_corrupt(path, reason),
        Error::UnknownCommand { name, known } => render_unknown_command(name, known),
        Error::UnknownNumeralFormat { value } => render_unknown_numeral_format(value),
        Error::UnknownSortMode { value } => render_unknown_sort_mode(value),
        _ => render_generic(e),
    };
}

/// Variants with nothing beyond their message and a fixed hint.
fn render_generic(e: &Error) -> String {
    return match e {
        Error::ConfigNotFound { path } => format!("\
# Error: Config Not Found

`{}` does not exist.

## Fix

Point `--config` at an existing file, or drop the flag to use `{CONFIG_FILE}`
in the current directory.
", path.display()),

        Error::Pattern(e) => format!("\
# Error: Invalid Punctuation Pattern

The metadata punctuation tables produced a pattern the regex engine rejected:

{e}

## Fix

Check the `summary.punctuation` table in `{SCRIPTURES_FILE}`.
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::JsonDe(e) => format!("\
# Error: JSON

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Valid keys in `{CONFIG_FILE}`:

    data_dir = \"data\"
    lang = \"en\"
    separator = \"\\n\"
    sort_by = \"none\"              # none | traditional | label
    check_availability = false
    url_base = \"https://www.churchofjesuschrist.org/study\"
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

/// Where the metadata documents are expected.
fn render_metadata_not_found(path: &Path) -> String {
    return format!("\
# Error: Metadata Not Found

`{}` does not exist.

## Fix

Place `{LANGUAGES_FILE}` and `{SCRIPTURES_FILE}` in the data directory, or
point `data_dir` in `{CONFIG_FILE}` (or `--data-dir`) at the directory that
holds them.
", path.display());
}

/// Which document failed to deserialize, and why.
fn render_metadata_corrupt(path: &Path, reason: &str) -> String {
    return format!("\
# Error: Metadata Corrupt

`{}` could not be read: {reason}

## Fix

Replace the file with a fresh copy of the metadata document.
", path.display());
}

/// The closest command, if any, then every command.
fn render_unknown_command(name: &str, known: &[String]) -> String {
    let mut out = format!("\
# Error: Unknown Command

No command named `{name}`.
");

    if let Some(suggestion) = find_closest_command(name, known) {
        let _ = writeln!(out, "\n## Did you mean `{suggestion}`?");
    }

    out.push_str("\n## Commands\n\n");
    for k in known {
        let _ = writeln!(out, "- `{k}`");
    }
    out.push_str("- `info`\n");
    return out;
}

/// Find a known command that matches once case, `get_`/`church_` prefixes
/// and separators are ignored (`get_church_uri` → `uri`).
pub(crate) fn find_closest_command(name: &str, known: &[String]) -> Option<String> {
    let wanted = strip_prefixes(name);
    return known.iter().find(|k| return strip_prefixes(k) == wanted).cloned();
}

/// Lowercase, `_` for `-`, `get_` and `church_` removed.
fn strip_prefixes(name: &str) -> String {
    let mut s = name.to_ascii_lowercase().replace('-', "_");
    for prefix in ["get_", "church_"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.to_string();
        }
    }
    return s;
}

/// Every format name the engine accepts.
fn render_unknown_numeral_format(value: &str) -> String {
    let mut out = format!("\
# Error: Unknown Numeral Format

`{value}` is not a numeral format.

## Formats

");
    for format in ALL_FORMATS {
        let _ = writeln!(out, "- `{}`", format.name());
    }
    return out;
}

/// The three sort modes.
fn render_unknown_sort_mode(value: &str) -> String {
    return format!("\
# Error: Unknown Sort Mode

`{value}` is not a sort mode.

## Fix

Use one of:

    --sort-by none
    --sort-by traditional
    --sort-by label
");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_metadata_explains_where_to_put_it() {
        let md = render_error(&Error::MetadataNotFound { path: PathBuf::from("data/metadata-languages.min.json") });
        assert!(md.starts_with("# Error: Metadata Not Found"));
        assert!(md.contains("## Fix"));
        assert!(md.contains(SCRIPTURES_FILE));
    }

    #[test]
    fn unknown_command_suggests_a_match() {
        let known = vec!["label".to_string(), "uri".to_string(), "url".to_string()];
        let md = render_error(&Error::UnknownCommand { known, name: "get_church_uri".to_string() });
        assert!(md.contains("## Did you mean `uri`?"));
        assert!(md.contains("- `info`"));
    }

    #[test]
    fn unknown_numeral_format_lists_formats() {
        let md = render_error(&Error::UnknownNumeralFormat { value: "klingon".to_string() });
        assert!(md.contains("- `roman-upper`"));
        assert!(md.contains("- `decimal-fullwidth`"));
    }
}
