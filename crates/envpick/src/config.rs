#![forbid(unsafe_code)]

//! Environment configuration file.
//!
//! ```json
//! {
//!   "environments": [
//!     { "name": "prod", "url": "https://api.example.com", "api_key": "sk-...", "model": "opus" }
//!   ]
//! }
//! ```
//!
//! A missing or empty file is an empty configuration. A non-empty file must
//! carry the `environments` key.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use envpick_core::Profile;
use serde::{Deserialize, Serialize};

/// A configured API environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    pub url: String,
    pub api_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env_vars: BTreeMap<String, String>,
}

impl Environment {
    /// The fields the selection menu shows.
    #[must_use]
    pub fn profile(&self) -> Profile {
        Profile::new(&*self.name, &*self.url, &*self.model)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub environments: Vec<Environment>,
}

impl Config {
    /// Look up an environment by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|env| env.name == name)
    }

    /// Menu entries in configuration order.
    #[must_use]
    pub fn profiles(&self) -> Vec<Profile> {
        self.environments.iter().map(Environment::profile).collect()
    }
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    /// No home directory to resolve the default path against.
    NoHome,
    /// The file exists but could not be read.
    Read { path: PathBuf, source: io::Error },
    /// The file is not valid JSON for a [`Config`].
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The top-level object has no `environments` key.
    MissingEnvironments { path: PathBuf },
    /// Two environments share a name.
    DuplicateName { path: PathBuf, name: String },
    /// An environment is missing a required value.
    EmptyField {
        path: PathBuf,
        index: usize,
        field: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHome => write!(f, "cannot locate the home directory; pass --config=PATH"),
            Self::Read { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid JSON in {}: {source}", path.display())
            }
            Self::MissingEnvironments { path } => {
                write!(f, "{} has no \"environments\" field", path.display())
            }
            Self::DuplicateName { path, name } => {
                write!(f, "environment '{name}' is defined twice in {}", path.display())
            }
            Self::EmptyField { path, index, field } => write!(
                f,
                "environment {} in {} has an empty {field}",
                index + 1,
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// `$HOME/.envpick/config.json`.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(".envpick").join("config.json"))
        .ok_or(ConfigError::NoHome)
}

/// Load and validate the configuration at `path`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no configuration file, using empty configuration");
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    parse(path, &data)
}

/// Parse configuration text; `path` is only used in error messages.
pub fn parse(path: &Path, data: &str) -> Result<Config, ConfigError> {
    if data.trim().is_empty() {
        return Ok(Config::default());
    }

    let value: serde_json::Value =
        serde_json::from_str(data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if value.get("environments").is_none() {
        return Err(ConfigError::MissingEnvironments {
            path: path.to_path_buf(),
        });
    }
    let config: Config = serde_json::from_value(value).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate(path, &config)?;
    tracing::debug!(
        path = %path.display(),
        environments = config.environments.len(),
        "configuration loaded"
    );
    Ok(config)
}

fn validate(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let mut seen = std::collections::BTreeSet::new();
    for (index, env) in config.environments.iter().enumerate() {
        for (field, value) in [("name", &env.name), ("url", &env.url)] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    path: path.to_path_buf(),
                    index,
                    field,
                });
            }
        }
        if !seen.insert(env.name.as_str()) {
            return Err(ConfigError::DuplicateName {
                path: path.to_path_buf(),
                name: env.name.clone(),
            });
        }
    }
    Ok(())
}

/// Hide all but the first and last four characters of a key.
///
/// Keys of eight characters or fewer are hidden entirely.
#[must_use]
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Path {
        Path::new("config.json")
    }

    #[test]
    fn parses_environments() {
        let config = parse(
            path(),
            r#"{"environments":[
                {"name":"prod","url":"https://api.example.com","api_key":"sk-123456789","model":"opus"},
                {"name":"dev","url":"http://localhost:8080","api_key":"k","env_vars":{"TIMEOUT":"30"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(config.environments.len(), 2);
        assert_eq!(config.environments[1].model, "");
        assert_eq!(config.environments[1].env_vars["TIMEOUT"], "30");
        assert_eq!(
            config.profiles(),
            vec![
                Profile::new("prod", "https://api.example.com", "opus"),
                Profile::new("dev", "http://localhost:8080", ""),
            ]
        );
        assert_eq!(config.find("dev").map(|e| e.api_key.as_str()), Some("k"));
        assert!(config.find("Dev").is_none());
    }

    #[test]
    fn empty_text_is_empty_config() {
        assert_eq!(parse(path(), "").unwrap(), Config::default());
        assert_eq!(parse(path(), "  \n").unwrap(), Config::default());
    }

    #[test]
    fn missing_environments_key_is_rejected() {
        assert!(matches!(
            parse(path(), r#"{"envs":[]}"#),
            Err(ConfigError::MissingEnvironments { .. })
        ));
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = parse(path(), "{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid JSON in config.json"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = parse(
            path(),
            r#"{"environments":[
                {"name":"a","url":"http://a","api_key":"k"},
                {"name":"a","url":"http://b","api_key":"k"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName { ref name, .. } if name == "a"));
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = parse(
            path(),
            r#"{"environments":[{"name":"a","url":" ","api_key":"k"}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "environment 1 in config.json has an empty url");
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("absent.json")).unwrap();
        assert!(config.environments.is_empty());
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.json");
        let config = Config {
            environments: vec![Environment {
                name: "prod".into(),
                url: "https://api.example.com".into(),
                api_key: "sk-abcdefghijkl".into(),
                model: String::new(),
                env_vars: BTreeMap::new(),
            }],
        };
        fs::write(&file, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(load(&file).unwrap(), config);
    }

    #[test]
    fn api_key_masking() {
        assert_eq!(mask_api_key(""), "");
        assert_eq!(mask_api_key("short"), "*****");
        assert_eq!(mask_api_key("12345678"), "********");
        assert_eq!(mask_api_key("sk-abcdefghijkl"), "sk-a*******ijkl");
    }
}
