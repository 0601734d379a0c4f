use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use scripref::commands::{self, Options};
use scripref::config::Config;
use scripref::{Error, Lookup, NumeralFormat, SortMode, diagnostics, info};

/// Runtime failures exit with this code; clap uses 2 for bad arguments.
const EXIT_RUNTIME_ERROR: u8 = 3;

/// Command-line arguments.
#[allow(clippy::struct_excessive_bools, reason = "each flag maps to one independent CLI switch")]
#[derive(Parser)]
#[command(name = "scripref", version, about = "Parse scripture citations and render labels, paths, URLs, and links")]
struct Cli {
    /// Prefer abbreviated book names in labels
    #[arg(long)]
    abbreviated: bool,
    /// Omit `lang=` from URLs when the volume is not published in the language
    #[arg(long, alias = "check_availability")]
    check_availability: bool,
    /// label, uri, url, link, normalize, langs, punctuation, numerals, number, or info
    command: String,
    /// Config file to read instead of ./.scripref.toml
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the metadata documents
    #[arg(long, alias = "data_dir")]
    data_dir: Option<PathBuf>,
    /// Numeral format for `number` (e.g. roman-upper, arabic-eastern)
    #[arg(long)]
    format: Option<String>,
    /// Citation text, or the numbers for `number`
    #[arg(default_value = "")]
    input: String,
    /// Machine-readable output for `info`
    #[arg(long)]
    json: bool,
    /// Language to parse and render in
    #[arg(long)]
    lang: Option<String>,
    /// `class` attribute for links
    #[arg(long, alias = "link_class")]
    link_class: Option<String>,
    /// `target` attribute for links
    #[arg(long, alias = "link_target")]
    link_target: Option<String>,
    /// Joins multiple results
    #[arg(long)]
    separator: Option<String>,
    /// Leave book names out of labels
    #[arg(long, alias = "skip_book_name")]
    skip_book_name: bool,
    /// No `#p` fragment in URLs
    #[arg(long, alias = "skip_fragment")]
    skip_fragment: bool,
    /// No `lang=` parameter in URLs
    #[arg(long, alias = "skip_lang")]
    skip_lang: bool,
    /// none, traditional, or label
    #[arg(long, alias = "sort_by")]
    sort_by: Option<String>,
    /// Site prefix for URLs and links
    #[arg(long, alias = "url_base")]
    url_base: Option<String>,
    /// Render verses as `?id=p1&context=p2` in `uri` output
    #[arg(long, alias = "use_query_parameters")]
    use_query_parameters: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| return "scripref=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.command == "info" {
        info::run(cli.json);
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            return ExitCode::SUCCESS;
        },
        Err(e) => {
            diagnostics::print_error(&e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        },
    }
}

/// Resolve the command first, so a typo fails before metadata is loaded.
///
/// # Errors
///
/// Returns errors from dispatch, config loading, flag parsing, or metadata loading.
fn run(cli: &Cli) -> Result<String, Error> {
    let operation = commands::find(&cli.command)?;
    let config = match &cli.config {
        Some(path) => Config::load_file(path)?,
        None => Config::load(Path::new("."))?,
    };
    let options = merge_options(cli, &config)?;
    let data_dir = cli.data_dir.as_ref().unwrap_or(&config.data_dir);

    let lookup = Lookup::load(data_dir)?;
    tracing::debug!(command = cli.command.as_str(), data_dir = %data_dir.display(), "metadata loaded");
    return operation(&lookup, &cli.input, &options);
}

/// Command-line flags win over config values.
///
/// # Errors
///
/// Returns `Error::UnknownSortMode` or `Error::UnknownNumeralFormat` for
/// unrecognized flag values.
fn merge_options(cli: &Cli, config: &Config) -> Result<Options, Error> {
    let sort_by = match &cli.sort_by {
        Some(value) => value.parse::<SortMode>()?,
        None => config.sort_by,
    };
    let format = cli.format.as_deref().map(str::parse::<NumeralFormat>).transpose()?;

    return Ok(Options {
        abbreviated: cli.abbreviated,
        check_availability: cli.check_availability || config.check_availability,
        format,
        lang: cli.lang.clone().unwrap_or_else(|| return config.lang.clone()),
        link_class: cli.link_class.clone(),
        link_target: cli.link_target.clone(),
        separator: cli.separator.clone().unwrap_or_else(|| return config.separator.clone()),
        skip_book_name: cli.skip_book_name,
        skip_fragment: cli.skip_fragment,
        skip_lang: cli.skip_lang,
        sort_by,
        url_base: cli.url_base.clone().unwrap_or_else(|| return config.url_base.clone()),
        use_query_parameters: cli.use_query_parameters,
    });
}
