use std::path::Path;
use std::process::{Command, Output};

use scripref::{LabelOptions, Lookup, Numeral, SortMode, UrlOptions, VerseGroup};

fn lookup() -> Lookup {
    return Lookup::load(Path::new("tests/fixtures/data")).unwrap();
}

fn labels(lookup: &Lookup, input: &str, lang: &str, sort: SortMode) -> Vec<String> {
    return lookup
        .parse(input, lang, sort)
        .iter()
        .map(|r| return r.label(lookup.catalog(), lookup.patterns(), LabelOptions::default()))
        .collect();
}

fn scripref_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_scripref"));
    cmd.current_dir(dir);
    cmd.env_remove("RUST_LOG");
    return cmd;
}

fn fixture_cmd(fixture: &str) -> Command {
    return scripref_cmd(&Path::new("tests/fixtures").join(fixture));
}

fn stdout(output: &Output) -> String {
    return String::from_utf8_lossy(&output.stdout).into_owned();
}

fn stderr(output: &Output) -> String {
    return String::from_utf8_lossy(&output.stderr).into_owned();
}

// ── Library ───────────────────────────────────────────────────────────

#[test]
fn single_citation_end_to_end() {
    let lookup = lookup();
    let refs = lookup.parse("1 Nephi 3:7", "en", SortMode::None);
    assert_eq!(refs.len(), 1);
    let r = &refs[0];
    assert_eq!(r.label(lookup.catalog(), lookup.patterns(), LabelOptions::default()), "1 Nephi 3:7");
    assert_eq!(r.uri(lookup.catalog(), lookup.patterns(), false), "/scriptures/bofm/1-ne/3.7");
    assert_eq!(
        r.url(lookup.catalog(), lookup.patterns(), &UrlOptions::default()),
        "https://www.churchofjesuschrist.org/study/scriptures/bofm/1-ne/3?id=p7&lang=eng#p7"
    );
}

#[test]
fn comma_separated_chapters_without_verses() {
    let refs = lookup().parse("Genesis 1, 2", "en", SortMode::None);
    let chapters: Vec<Option<Numeral>> = refs.iter().map(|r| return r.chapter.clone()).collect();
    assert_eq!(chapters, [Some(Numeral::Int(1)), Some(Numeral::Int(2))]);
    assert!(refs.iter().all(|r| return r.verse_groups.is_empty()));
    assert!(refs.iter().all(|r| return r.book.as_deref() == Some("genesis")));
}

#[test]
fn site_url_with_query_parameters() {
    let lookup = lookup();
    let input = "https://www.churchofjesuschrist.org/study/scriptures/ot/gen/3?id=p1-p3&lang=eng#p1";
    let refs = lookup.parse(input, "es", SortMode::None);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].book.as_deref(), Some("genesis"));
    assert_eq!(refs[0].verse_groups, [VerseGroup::Run { first: 1, last: 3 }]);
    // The caller's language wins over the URL's lang parameter.
    assert_eq!(refs[0].language, "es");
    assert_eq!(refs[0].label(lookup.catalog(), lookup.patterns(), LabelOptions::default()), "Génesis 3:1–3");
}

#[test]
fn omitted_book_is_carried_over() {
    let lookup = lookup();
    let refs = lookup.parse("Genesis 1:2; 3", "en", SortMode::None);
    assert_eq!(refs.len(), 2);
    assert!(refs.iter().all(|r| return r.book.as_deref() == Some("genesis")));
    assert_eq!(refs[1].chapter, Some(Numeral::Int(3)));
    assert!(refs[1].book_elided);
}

#[test]
fn verse_abbreviation_without_a_space() {
    let lookup = lookup();
    let refs = lookup.parse("John 3 v16", "en", SortMode::None);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].book.as_deref(), Some("john"));
    assert_eq!(refs[0].label(lookup.catalog(), lookup.patterns(), LabelOptions::default()), "John 3:16");
}

#[test]
fn traditional_sort_follows_canon() {
    let lookup = lookup();
    let sorted = labels(&lookup, "Moroni 10:4; John 3:16; Genesis 1:1", "en", SortMode::Traditional);
    assert_eq!(sorted, ["Genesis 1:1", "John 3:16", "Moroni 10:4"]);
    let reversed = labels(&lookup, "Genesis 1:1; Moroni 10:4; John 3:16", "en", SortMode::Traditional);
    assert_eq!(sorted, reversed);
}

#[test]
fn localized_labels() {
    let lookup = lookup();
    assert_eq!(labels(&lookup, "John 3:16", "ar", SortMode::None), ["يوحنا ٣:١٦"]);
    assert_eq!(labels(&lookup, "約翰福音3：16～18", "zh-Hant", SortMode::None), ["約翰福音3：16～18"]);
    assert_eq!(labels(&lookup, "Juan 3:16", "es", SortMode::None), ["Juan 3:16"]);
}

#[test]
fn unknown_books_degrade_to_raw_text() {
    let lookup = lookup();
    let refs = lookup.parse("Hezekiah 4:2", "en", SortMode::None);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].book, None);
    assert_eq!(refs[0].book_text.as_deref(), Some("Hezekiah"));
    assert_eq!(refs[0].uri(lookup.catalog(), lookup.patterns(), false), "");
}

#[test]
fn lookup_is_shared_across_threads() {
    let lookup = std::sync::Arc::new(lookup());
    let handles: Vec<_> = ["en", "es", "ar", "zh-Hant"]
        .into_iter()
        .map(|lang| {
            let lookup = std::sync::Arc::clone(&lookup);
            std::thread::spawn(move || return lookup.parse("John 3:16", lang, SortMode::Label).len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}

// ── Binary ────────────────────────────────────────────────────────────

#[test]
fn cli_label() {
    let output = fixture_cmd("basic").args(["label", "1 Nephi 3:7"]).output().unwrap();
    assert!(output.status.success(), "label failed: {}", stderr(&output));
    assert_eq!(stdout(&output), "1 Nephi 3:7\n");
}

#[test]
fn cli_flags_override_config() {
    let output = fixture_cmd("spanish").args(["uri", "Alma 5; Genesis 1"]).output().unwrap();
    assert!(output.status.success(), "uri failed: {}", stderr(&output));
    assert_eq!(stdout(&output), "/scriptures/ot/gen/1 | /scriptures/bofm/alma/5\n");

    let output = fixture_cmd("spanish")
        .args(["label", "Alma 5; Genesis 1", "--sort-by", "none", "--separator", "\n", "--lang", "en"])
        .output()
        .unwrap();
    assert!(output.status.success(), "label failed: {}", stderr(&output));
    assert_eq!(stdout(&output), "Alma 5\nGenesis 1\n");
}

#[test]
fn cli_accepts_underscore_flags() {
    let output = fixture_cmd("basic")
        .args(["url", "Genesis 1:1", "--skip_lang", "--skip_fragment"])
        .output()
        .unwrap();
    assert!(output.status.success(), "url failed: {}", stderr(&output));
    assert_eq!(stdout(&output), "https://www.churchofjesuschrist.org/study/scriptures/ot/gen/1?id=p1\n");
}

#[test]
fn cli_unknown_command_exits_3() {
    let output = fixture_cmd("basic").args(["get_label", "Genesis 1"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let err = stderr(&output);
    assert!(err.contains("Unknown Command"), "{err}");
    assert!(err.contains("Did you mean `label`?"), "{err}");
}

#[test]
fn cli_bad_sort_mode_exits_3() {
    let output = fixture_cmd("basic").args(["label", "Genesis 1", "--sort-by", "sideways"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Unknown Sort Mode"));
}

#[test]
fn cli_missing_metadata_explains_the_fix() {
    let dir = tempfile::tempdir().unwrap();
    let output = scripref_cmd(dir.path()).args(["label", "Genesis 1"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let err = stderr(&output);
    assert!(err.contains("Metadata Not Found"), "{err}");
    assert!(err.contains("## Fix"), "{err}");
}

#[test]
fn cli_malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".scripref.toml"), "lang = [").unwrap();
    let output = scripref_cmd(dir.path()).args(["langs"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Invalid TOML"));
}

#[test]
fn cli_info_json_needs_no_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let output = scripref_cmd(dir.path()).args(["info", "--json"]).output().unwrap();
    assert!(output.status.success(), "info failed: {}", stderr(&output));
    let info: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let commands = info["commands"].as_array().unwrap();
    assert!(commands.iter().any(|c| return c == "label"));
    assert!(commands.iter().any(|c| return c == "info"));
    assert_eq!(info["current_state"]["config_found"], false);
    assert!(info["current_state"]["languages"].is_null());
}

#[test]
fn cli_number_and_metadata_commands() {
    let output = fixture_cmd("basic").args(["number", "1999", "--format", "roman-upper"]).output().unwrap();
    assert_eq!(stdout(&output), "MCMXCIX\n");

    let output = fixture_cmd("basic").args(["langs", "--separator", " "]).output().unwrap();
    assert_eq!(stdout(&output), "en es ar zh-Hant\n");

    let output = fixture_cmd("basic").args(["number", "7", "--format", "klingon"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Unknown Numeral Format"));
}
