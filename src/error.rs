/// Crate-level error types for scripref.
use std::path::PathBuf;

/// Errors that stop a command before any citation is parsed.
///
/// Citation text itself never produces an error: unknown books, malformed
/// numerals, and unmapped languages degrade to best-effort values with a
/// `tracing` diagnostic. Only metadata loading, configuration, pattern
/// compilation, and command dispatch can fail.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported as scripref::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A config file named on the command line does not exist.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// File that was requested.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization failed outside of a metadata file.
    #[error("json: {0}")]
    JsonDe(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A metadata file exists but cannot be deserialized.
    #[error("metadata corrupt: {}: {reason}", path.display())]
    MetadataCorrupt {
        /// File that failed to deserialize.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Expected metadata file does not exist on disk.
    #[error("metadata not found: {}", path.display())]
    MetadataNotFound {
        /// Path to the missing metadata file.
        path: PathBuf,
    },

    /// A separator table produced a pattern the regex engine rejected.
    #[error("pattern: {0}")]
    Pattern(
        /// The wrapped regex compilation error.
        #[from]
        regex::Error,
    ),

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// No operation is registered under the requested name.
    #[error("unknown command: `{name}` (known: {})", known.join(", "))]
    UnknownCommand {
        /// Operation names that are registered.
        known: Vec<String>,
        /// Name that was requested.
        name: String,
    },

    /// A numeral format name is not one the engine can emit.
    #[error("unknown numeral format: `{value}`")]
    UnknownNumeralFormat {
        /// Requested format name.
        value: String,
    },

    /// A sort mode name is not `none`, `traditional`, or `label`.
    #[error("unknown sort mode: `{value}`")]
    UnknownSortMode {
        /// Requested sort mode.
        value: String,
    },
}
