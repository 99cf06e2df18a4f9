//! Error types for the techskills CLI.

use std::{env::VarError, io, path::PathBuf, process::ExitCode, result::Result as StdResult};

use thiserror::Error;
use toml::{de::Error as TomlError, ser::Error as TomlSerError};

/// Result type for techskills operations.
pub type Result<T> = StdResult<T, Error>;

/// Errors that can occur while running the CLI.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be read.
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The configuration file could not be parsed.
    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        source: TomlError,
    },
    /// The configuration parsed but describes an unusable group setup.
    #[error("Invalid config at {path}: {message}")]
    InvalidConfig {
        /// Path to the config file.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },
    /// The configuration file could not be serialized.
    #[error("Failed to serialize config: {source}")]
    ConfigSerialize {
        /// Underlying serialization error.
        source: TomlSerError,
    },
    /// The configuration file could not be written.
    #[error("Failed to write config at {path}: {source}")]
    ConfigWrite {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Home directory resolution failed.
    #[error("Failed to resolve the home directory.")]
    HomeDirMissing,
    /// A user-supplied path could not be expanded.
    #[error("Invalid path: {path}: {source}")]
    PathExpansion {
        /// Input path that failed to expand.
        path: String,
        /// Underlying expansion error.
        source: shellexpand::LookupError<VarError>,
    },
    /// A file of technician identifiers could not be read.
    #[error("Failed to read identifiers from {path}: {source}")]
    IdentifierFileRead {
        /// Path to the identifier file.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Required credential variables are not set.
    #[error("Missing environment variables (or .env entries): {}", .names.join(", "))]
    MissingCredentials {
        /// Names of the unset variables.
        names: Vec<&'static str>,
    },
    /// The token request was rejected or returned no token.
    #[error("Authentication failed: {message}")]
    Auth {
        /// Error message describing the failure.
        message: String,
    },
    /// An HTTP request could not be sent or its body could not be read.
    #[error("Request to {url} failed: {source}")]
    Request {
        /// Target URL.
        url: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },
    /// The remote API answered with an error status.
    #[error("Remote API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or error message.
        message: String,
    },
    /// A remote response did not have the expected shape.
    #[error("Unexpected response from {url}: {message}")]
    Decode {
        /// URL that returned the response.
        url: String,
        /// Error message describing the mismatch.
        message: String,
    },
    /// No technician matched the identifier.
    #[error("No technician found for '{identifier}'")]
    NotFound {
        /// Identifier as supplied by the operator.
        identifier: String,
    },
    /// More than one technician matched the identifier.
    #[error("Ambiguous {kind} '{identifier}'; use the technician id instead. Candidates: {}", .candidates.join(", "))]
    Ambiguous {
        /// Identifier as supplied by the operator.
        identifier: String,
        /// Which lookup produced the candidates.
        kind: &'static str,
        /// Ids of every matching technician.
        candidates: Vec<String>,
    },
    /// A group name or number did not match the configuration.
    #[error("Invalid group '{value}'. Run `techskills groups` to see the valid ones.")]
    InvalidGroup {
        /// Value supplied by the operator.
        value: String,
    },
    /// The targeted group has no skills that exist remotely.
    #[error("No skills of group '{group}' exist remotely. Check the labels; missing: {}", .missing.join(", "))]
    EmptyGroup {
        /// Group name.
        group: String,
        /// Configured labels with no remote match.
        missing: Vec<String>,
    },
    /// The subset chosen from a group was empty.
    #[error("No skills selected from group '{group}'.")]
    NoSkillsSelected {
        /// Group name.
        group: String,
    },
    /// The removal mode was not one of the supported values.
    #[error("Invalid mode '{value}'. Use 1 (add-only), 2 (reset) or 3 (align).")]
    InvalidMode {
        /// Value supplied by the operator.
        value: String,
    },
    /// No technician identifiers were supplied.
    #[error("No technicians given. Pass identifiers or --file.")]
    NoTechnicians,
    /// An interactive prompt was interrupted or canceled.
    #[error("Prompt canceled.")]
    PromptCanceled,
    /// An interactive prompt failed.
    #[error("Prompt failed: {message}")]
    PromptFailed {
        /// Error message describing the prompt failure.
        message: String,
    },
}

impl Error {
    /// Map errors to exit codes for CLI termination.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(1)
    }
}
