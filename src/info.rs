use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::{Catalog, LANGUAGES_FILE, SCRIPTURES_FILE};
use crate::commands;
use crate::config::{CONFIG_FILE, Config};
use crate::numerals::ALL_FORMATS;

/// What `info` reports about the working directory.
struct CurrentState {
    /// Whether `.scripref.toml` exists.
    config_found: bool,
    /// Metadata directory after config resolution.
    data_dir: PathBuf,
    /// Language tags in the metadata, or `None` when it failed to load.
    languages: Option<Vec<String>>,
}

/// `info --json` document.
#[derive(Serialize)]
struct InfoJson {
    /// Every command name, `info` included.
    commands: Vec<String>,
    /// See [`CurrentState`].
    current_state: StateJson,
    /// Process exit codes and their meaning.
    exit_codes: Vec<ExitCodeInfo>,
    /// Names accepted by `--format`.
    numeral_formats: Vec<String>,
    /// Crate version.
    version: String,
}

/// One exit code.
#[derive(Serialize)]
struct ExitCodeInfo {
    /// Process exit status.
    code: u8,
    /// When it is returned.
    meaning: String,
}

/// [`CurrentState`] as JSON.
#[derive(Serialize)]
struct StateJson {
    /// Whether `.scripref.toml` exists.
    config_found: bool,
    /// Metadata directory after config resolution.
    data_dir: String,
    /// Language tags, or `null` when the metadata failed to load.
    languages: Option<Vec<String>>,
}

/// Output the comprehensive scripref reference document.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

/// Inspect config and metadata under `root`.
fn gather_state(root: &Path) -> CurrentState {
    let config_found = root.join(CONFIG_FILE).exists();
    let data_dir = Config::load(root)
        .map(|c| return c.data_dir)
        .unwrap_or_else(|_| return Config::default().data_dir);

    let languages = Catalog::load(&data_dir)
        .ok()
        .map(|catalog| return catalog.language_tags().map(str::to_string).collect());

    return CurrentState { config_found, data_dir, languages };
}

// ── Markdown output ───────────────────────────────────────────────────

/// Human-readable document.
fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_formats();
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

/// Title, usage, flags and configuration keys.
fn print_markdown_header(version: &str) {
    print!(
        "\
# scripref {version}

Parse scripture citations in many languages and render them as localized
labels, site paths, URLs, and HTML links.

## Usage

    scripref <command> <input> [flags]

    scripref label \"1 Nephi 3:7\"                 1 Nephi 3:7
    scripref uri \"1 Ne 3:7\"                      /scriptures/bofm/1-ne/3.7
    scripref url \"Juan 3:16\" --lang es           https://…/nt/john/3?id=p16&lang=spa#p16
    scripref link \"Gen 1; 3\" --link-class ref    <a href=…>Genesis 1</a> …
    scripref normalize \"John 3 verse 16 and 18\"  John 3:16,18
    scripref number 14 --format roman-upper      XIV
    scripref langs                               en, es, …
    scripref punctuation --lang zh-Hant          JSON punctuation table
    scripref numerals --lang ar                  digit glyphs
    scripref info [--json]                       this document

## Flags

    --lang <code>              Parse and render in this language (default en)
    --separator <text>         Joins multiple results (default newline)
    --sort-by <mode>           none | traditional | label
    --abbreviated              Prefer abbreviated book names
    --skip-book-name           Leave book names out of labels
    --use-query-parameters     `uri` renders ?id=p1&context=p2
    --skip-lang                No lang= parameter in URLs
    --skip-fragment            No #p fragment in URLs
    --link-class <class>       class attribute for links
    --link-target <target>     target attribute for links
    --format <format>          Numeral format for `number`
    --check-availability       Omit lang= when the volume is not published in it
    --data-dir <dir>           Directory holding the metadata documents
    --config <file>            Config file (default ./{CONFIG_FILE})

## Configuration ({CONFIG_FILE})

    data_dir = \"data\"                     # holds {LANGUAGES_FILE}
                                          # and {SCRIPTURES_FILE}
    lang = \"en\"
    separator = \"\\n\"
    sort_by = \"none\"                      # none | traditional | label
    check_availability = false
    url_base = \"https://www.churchofjesuschrist.org/study\"

Set RUST_LOG=scripref=debug to trace each stage on stderr.

"
    );
}

/// Numeral format names.
fn print_markdown_formats() {
    let names = ALL_FORMATS.iter().map(|f| return f.name()).collect::<Vec<_>>().join(", ");
    println!("## Numeral Formats\n\n{names}\n\n## Current State\n");
}

/// Config and metadata found in the working directory.
fn print_markdown_state(state: &CurrentState) {
    if state.config_found {
        println!("Config:     {CONFIG_FILE} (found)");
    } else {
        println!("Config:     {CONFIG_FILE} (not found)");
    }

    println!("Data dir:   {}", state.data_dir.display());

    match &state.languages {
        Some(tags) => println!("Languages:  {} ({})", tags.len(), tags.join(", ")),
        None => println!("Languages:  (metadata not found)"),
    }
}

/// Exit code table.
fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success |
| 2    | Invalid command-line arguments |
| 3    | Runtime error |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

/// Machine-readable document.
fn print_json(state: &CurrentState) {
    let mut commands: Vec<String> = commands::names().into_iter().map(str::to_string).collect();
    commands.push("info".to_string());

    let info = InfoJson {
        commands,
        current_state: StateJson {
            config_found: state.config_found,
            data_dir: state.data_dir.display().to_string(),
            languages: state.languages.clone(),
        },
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success".to_string() },
            ExitCodeInfo { code: 2, meaning: "Invalid command-line arguments".to_string() },
            ExitCodeInfo { code: 3, meaning: "Runtime error".to_string() },
        ],
        numeral_formats: ALL_FORMATS.iter().map(|f| return f.name().to_string()).collect(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
