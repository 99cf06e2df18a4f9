//! Configuration loading and validation.

use std::{
    collections::HashSet,
    env, fmt, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    paths,
};

/// REST API version used when the config does not name one.
pub const DEFAULT_API_VERSION: &str = "v65.0";

/// Maximum number of skills fetched for the catalog by default.
pub const DEFAULT_SKILL_LIMIT: usize = 2000;

/// A named bundle of skill labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group name shown to the operator.
    pub name: String,
    /// Skill master labels, in display order.
    pub skills: Vec<String>,
}

/// Parsed configuration for the CLI.
///
/// Built once at startup and passed to every command; nothing reads
/// configuration from globals.
#[derive(Debug, Clone)]
pub struct Config {
    /// Groups in display order.
    groups: Vec<Group>,
    /// REST API version.
    api_version: String,
    /// Maximum number of skills fetched for the catalog.
    skill_limit: usize,
}

/// Raw config file structure.
#[derive(Debug, Deserialize, Serialize)]
struct RawConfig {
    /// REST API version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_version: Option<String>,
    /// Maximum number of skills fetched for the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    skill_limit: Option<usize>,
    /// Configured groups in display order.
    #[serde(default)]
    groups: Vec<Group>,
}

impl Config {
    /// Load the config from `path`, or from the default location.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(&config_path(path)?)
    }

    /// Load a config file from an explicit path, using defaults when it does not exist.
    pub(crate) fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file; using built-in groups");
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source: error,
                });
            }
        };
        Self::parse(&contents, path)
    }

    /// Parse config contents; `path` is only used for error reporting.
    pub(crate) fn parse(contents: &str, path: &Path) -> Result<Self> {
        let raw: RawConfig = toml::from_str(contents).map_err(|error| Error::ConfigParse {
            path: path.to_path_buf(),
            source: error,
        })?;

        let invalid = |message: String| Error::InvalidConfig {
            path: path.to_path_buf(),
            message,
        };

        if raw.groups.is_empty() {
            return Err(invalid("no [[groups]] configured".to_string()));
        }
        let mut seen = HashSet::new();
        for group in &raw.groups {
            if group.name.trim().is_empty() {
                return Err(invalid("group with an empty name".to_string()));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(invalid(format!("duplicate group '{}'", group.name)));
            }
        }
        if raw.skill_limit == Some(0) {
            return Err(invalid("skill_limit must be positive".to_string()));
        }

        Ok(Self {
            groups: raw.groups,
            api_version: raw
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            skill_limit: raw.skill_limit.unwrap_or(DEFAULT_SKILL_LIMIT),
        })
    }

    /// Serialize the config in the on-disk format.
    pub(crate) fn to_toml(&self) -> Result<String> {
        let raw = RawConfig {
            api_version: Some(self.api_version.clone()),
            skill_limit: Some(self.skill_limit),
            groups: self.groups.clone(),
        };
        toml::to_string(&raw).map_err(|error| Error::ConfigSerialize { source: error })
    }

    /// Return the configured groups in display order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Return the REST API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Return the catalog size limit.
    pub fn skill_limit(&self) -> usize {
        self.skill_limit
    }

    /// Find a group by exact name, 1-based display position, or case-insensitive name.
    pub fn find_group(&self, value: &str) -> Result<&Group> {
        let trimmed = value.trim();
        if let Some(group) = self.groups.iter().find(|group| group.name == trimmed) {
            return Ok(group);
        }
        if let Ok(index) = trimmed.parse::<usize>()
            && let Some(group) = index.checked_sub(1).and_then(|i| self.groups.get(i))
        {
            return Ok(group);
        }
        let lowered = trimmed.to_lowercase();
        self.groups
            .iter()
            .find(|group| group.name.to_lowercase() == lowered)
            .ok_or_else(|| Error::InvalidGroup {
                value: value.to_string(),
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groups: default_groups(),
            api_version: DEFAULT_API_VERSION.to_string(),
            skill_limit: DEFAULT_SKILL_LIMIT,
        }
    }
}

/// Build a group from a name and a label list.
fn group(name: &str, skills: &[&str]) -> Group {
    Group {
        name: name.to_string(),
        skills: skills.iter().map(|skill| (*skill).to_string()).collect(),
    }
}

/// Built-in groups used when no config file exists.
pub fn default_groups() -> Vec<Group> {
    vec![
        group("Ativação", &["Ativação", "Chip", "Mesh", "PME", "TV"]),
        group(
            "Manutenção Corretiva",
            &[
                "Chip",
                "Manutenção",
                "Manutenção Garantia",
                "Mesh",
                "MotoDesk",
                "PME",
                "TV",
                "OS critica",
            ],
        ),
        group("Manutenção Preventiva", &["Manutenção", "Mesh", "PME", "TV"]),
        group(
            "Outros",
            &[
                "Alteração de plano",
                "Chip",
                "Mesh",
                "Migração",
                "Migração - Zhone",
                "PME",
                "Serviços Adicionais",
                "TV",
            ],
        ),
        group(
            "Mudança",
            &["Chip", "Mesh", "Mudança de endereço", "PME", "TV", "OS critica"],
        ),
        group(
            "Retirada",
            &[
                "Chip",
                "MotoDesk",
                "PME",
                "Retirada de Equipamento - Compulsório",
                "Retirada de Equipamento - Voluntário",
                "TV",
            ],
        ),
    ]
}

/// Login credentials for the field-service org.
#[derive(Clone)]
pub struct Credentials {
    /// Login domain, e.g. `https://login.salesforce.com`.
    pub domain: String,
    /// Connected app consumer key.
    pub client_id: String,
    /// Connected app consumer secret.
    pub client_secret: String,
    /// Integration user name.
    pub username: String,
    /// Integration user password (with security token when required).
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Read credentials from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read credentials through `lookup`, reporting every missing variable at once.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| match lookup(name).filter(|value| !value.is_empty()) {
            Some(value) => value,
            None => {
                missing.push(name);
                String::new()
            }
        };
        let credentials = Self {
            client_id: read("SF_CLIENT_ID"),
            client_secret: read("SF_CLIENT_SECRET"),
            username: read("SF_USERNAME"),
            password: read("SF_PASSWORD"),
            domain: read("SF_DOMAIN"),
        };
        if missing.is_empty() {
            Ok(credentials)
        } else {
            Err(Error::MissingCredentials { names: missing })
        }
    }
}

/// Resolve the config file location from an optional explicit path.
pub(crate) fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => paths::expand_path(&path.to_string_lossy()),
        None => paths::default_config_path(),
    }
}
