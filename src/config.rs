use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::reference::DEFAULT_URL_BASE;
use crate::types::SortMode;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = ".scripref.toml";

/// Project configuration loaded from `.scripref.toml`.
/// Every key is optional; command-line flags override what the file says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Gate the URL `lang=` parameter on publication availability.
    pub check_availability: bool,
    /// Directory holding the two metadata documents, relative to the config file.
    pub data_dir: PathBuf,
    /// Language code citations are parsed and rendered in.
    pub lang: String,
    /// Joins rendered references in command output.
    pub separator: String,
    /// Order applied to parsed references.
    pub sort_by: SortMode,
    /// Site prefix for URLs and links.
    pub url_base: String,
}

/// Raw TOML structure for `.scripref.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriprefTomlConfig {
    /// `check_availability = true`
    check_availability: Option<bool>,
    /// `data_dir = "data"`
    data_dir: Option<PathBuf>,
    /// `lang = "es"`
    lang: Option<String>,
    /// `separator = "; "`
    separator: Option<String>,
    /// `sort_by = "traditional"`
    sort_by: Option<SortMode>,
    /// `url_base = "https://..."`
    url_base: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            check_availability: false,
            data_dir: PathBuf::from("data"),
            lang: "en".to_string(),
            separator: "\n".to_string(),
            sort_by: SortMode::None,
            url_base: DEFAULT_URL_BASE.to_string(),
        };
    }
}

impl Config {
    /// Load config from `.scripref.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a file the user
    /// wrote never silently falls back to defaults.
    ///
    /// A relative `data_dir` is resolved against `root`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::with_data_dir(root, &Self::default().data_dir));
            },
            Err(e) => return Err(Error::Io(e)),
        };

        return Self::parse(root, &content);
    }

    /// Load config from an explicit file, which must exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file is missing, otherwise as
    /// [`Config::load`].
    pub fn load_file(path: &Path) -> Result<Self, Error> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound { path: path.to_path_buf() });
        }
        let root = path.parent().unwrap_or_else(|| return Path::new("."));
        let content = std::fs::read_to_string(path)?;
        return Self::parse(root, &content);
    }

    /// Fill defaults around the keys present in `content`.
    fn parse(root: &Path, content: &str) -> Result<Self, Error> {
        let raw: ScriprefTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        let data_dir = raw.data_dir.unwrap_or_else(|| return defaults.data_dir.clone());
        return Ok(Self {
            check_availability: raw.check_availability.unwrap_or(defaults.check_availability),
            data_dir: root.join(data_dir),
            lang: raw.lang.unwrap_or(defaults.lang),
            separator: raw.separator.unwrap_or(defaults.separator),
            sort_by: raw.sort_by.unwrap_or(defaults.sort_by),
            url_base: raw.url_base.unwrap_or(defaults.url_base),
        });
    }

    /// Defaults, with `data_dir` resolved against `root`.
    fn with_data_dir(root: &Path, data_dir: &Path) -> Self {
        return Self {
            data_dir: root.join(data_dir),
            ..Self::default()
        };
    }
}
