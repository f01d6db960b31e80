//! Geoquest configuration.
//!
//! Loaded from `~/.geoquest/config.toml`. A missing file is an empty config.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::Storage;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Username to act as when neither `--as` nor `GEOQUEST_IDENTITY` is set.
    pub identity: Option<String>,

    /// Database file. Defaults to `~/.geoquest/geoquest.sqlite`.
    pub database: Option<PathBuf>,
}

impl Config {
    /// Load config from `~/.geoquest/config.toml`.
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.geoquest/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".geoquest").join("config.toml"))
    }

    /// Where the database lives: the configured path, else the default.
    pub fn database_path(&self) -> Result<PathBuf, String> {
        self.database
            .clone()
            .or_else(Storage::default_path)
            .ok_or_else(|| "could not determine home directory".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_kebab_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "identity = \"hikerjoe\"\ndatabase = \"/tmp/quests.sqlite\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.identity.as_deref(), Some("hikerjoe"));
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/quests.sqlite")
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default-identity = \"hikerjoe\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("invalid config"));
    }
}
