//! Configuration for locating the backing file and tuning logging.
//!
//! Resolution order (first hit wins):
//! 1. explicit path (the `--config` flag)
//! 2. `CONTACTBOOK_CONFIG` environment variable
//! 3. `contactbook.toml` in the working directory, if present
//! 4. built-in defaults
//!
//! String overrides (`key=value`) are applied on top via [`Config::set_field`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "CONTACTBOOK_CONFIG";
pub const CONFIG_FILE: &str = "contactbook.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown config field '{0}'")]
    UnknownField(String),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Central source of truth for configuration defaults.
pub struct ConfigDefaults;

impl ConfigDefaults {
    /// Where the original web app kept its contacts.
    pub const DATA_FILE: &'static str = "data/contacts.json";
    pub const LOG_LEVEL: &'static str = "warn";
}

fn default_data_file() -> PathBuf {
    PathBuf::from(ConfigDefaults::DATA_FILE)
}
fn default_log_level() -> String {
    ConfigDefaults::LOG_LEVEL.to_string()
}

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// JSON array of contacts.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Advisory lock taken by mutating commands. Defaults to `<data_file>.lock`.
    #[serde(default)]
    pub lock_file: Option<PathBuf>,
    /// `log` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            lock_file: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Resolve and load the configuration (see module docs for precedence).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn lock_path(&self) -> PathBuf {
        self.lock_file.clone().unwrap_or_else(|| {
            let mut name = self.data_file.as_os_str().to_os_string();
            name.push(".lock");
            PathBuf::from(name)
        })
    }

    pub fn list_fields() -> &'static [&'static str] {
        &["data_file", "lock_file", "log_level"]
    }

    pub fn get_field(&self, field: &str) -> Option<String> {
        match field {
            "data_file" => Some(self.data_file.display().to_string()),
            "lock_file" => Some(self.lock_path().display().to_string()),
            "log_level" => Some(self.log_level.clone()),
            _ => None,
        }
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        match field {
            "data_file" => self.data_file = PathBuf::from(value),
            "lock_file" => self.lock_file = Some(PathBuf::from(value)),
            "log_level" => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(ConfigError::InvalidValue {
                        field: field.to_string(),
                        reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
                    });
                }
                self.log_level = level;
            }
            other => return Err(ConfigError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Apply `key=value` overrides in order, stopping at the first error.
    pub fn apply_overrides_from_pairs(
        &mut self,
        pairs: &[(String, String)],
    ) -> Result<(), ConfigError> {
        for (key, value) in pairs {
            self.set_field(key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data_file, PathBuf::from("data/contacts.json"));
        assert_eq!(config.lock_path(), PathBuf::from("data/contacts.json.lock"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(r#"data_file = "/srv/contacts.json""#).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/srv/contacts.json"));
        assert_eq!(config.log_level, "warn");
        assert!(config.lock_file.is_none());
    }

    #[test]
    fn test_unknown_file_key_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contactbook.toml");
        fs::write(&path, "datafile = \"x\"\n").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_env_var_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(
            &path,
            "data_file = \"people.json\"\nlock_file = \"people.lock\"\n",
        )
        .unwrap();

        // SAFETY: serialized with the other env-touching tests
        unsafe { std::env::set_var(CONFIG_ENV, &path) };
        let config = Config::load(None);
        unsafe { std::env::remove_var(CONFIG_ENV) };

        let config = config.unwrap();
        assert_eq!(config.data_file, PathBuf::from("people.json"));
        assert_eq!(config.lock_path(), PathBuf::from("people.lock"));
    }

    #[test]
    #[serial]
    fn test_explicit_path_beats_env_var() {
        let temp_dir = TempDir::new().unwrap();
        let env_path = temp_dir.path().join("env.toml");
        let flag_path = temp_dir.path().join("flag.toml");
        fs::write(&env_path, "data_file = \"env.json\"\n").unwrap();
        fs::write(&flag_path, "data_file = \"flag.json\"\n").unwrap();

        // SAFETY: serialized with the other env-touching tests
        unsafe { std::env::set_var(CONFIG_ENV, &env_path) };
        let config = Config::load(Some(&flag_path));
        unsafe { std::env::remove_var(CONFIG_ENV) };

        assert_eq!(config.unwrap().data_file, PathBuf::from("flag.json"));
    }

    #[test]
    fn test_set_field() {
        let mut config = Config::default();
        config.set_field("data_file", "other.json").unwrap();
        config.set_field("log_level", "DEBUG").unwrap();

        assert_eq!(config.get_field("data_file").unwrap(), "other.json");
        assert_eq!(config.get_field("lock_file").unwrap(), "other.json.lock");
        assert_eq!(config.get_field("log_level").unwrap(), "debug");
    }

    #[test]
    fn test_set_field_rejects_bad_input() {
        let mut config = Config::default();
        assert!(matches!(
            config.set_field("colour", "blue"),
            Err(ConfigError::UnknownField(_))
        ));
        assert!(matches!(
            config.set_field("log_level", "loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_list_fields_round_trip_through_get_field() {
        let config = Config::default();
        for field in Config::list_fields() {
            assert!(config.get_field(field).is_some(), "missing getter: {field}");
        }
        assert!(config.get_field("nope").is_none());
    }

    #[test]
    fn test_apply_overrides_from_pairs_stops_at_error() {
        let mut config = Config::default();
        let pairs = vec![
            ("log_level".to_string(), "info".to_string()),
            ("bogus".to_string(), "1".to_string()),
            ("data_file".to_string(), "late.json".to_string()),
        ];
        assert!(config.apply_overrides_from_pairs(&pairs).is_err());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.data_file, PathBuf::from("data/contacts.json"));
    }
}
