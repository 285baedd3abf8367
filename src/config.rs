//! `foodshare.toml`: optional settings layered under the CLI flags

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE: &str = "food_management.db";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FoodshareConfig {
    pub database: Option<String>,
    pub port: Option<u16>,
    pub recent_limit: Option<usize>,
}

impl FoodshareConfig {
    /// Config written by `foodshare config init`
    pub fn starter() -> Self {
        Self {
            database: Some(DEFAULT_DATABASE.to_string()),
            port: Some(DEFAULT_PORT),
            recent_limit: Some(DEFAULT_RECENT_LIMIT),
        }
    }

    /// Database path: CLI flag, then config file, then default
    pub fn database_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    pub fn port(&self, flag: Option<u16>) -> u16 {
        flag.or(self.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn recent_limit(&self) -> usize {
        self.recent_limit.unwrap_or(DEFAULT_RECENT_LIMIT)
    }

    /// Reject settings no command could use
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == Some(0) {
            anyhow::bail!("port must be between 1 and {}", u16::MAX);
        }
        if self.recent_limit == Some(0) {
            anyhow::bail!("recent_limit must be at least 1");
        }
        if matches!(self.database.as_deref(), Some(db) if db.trim().is_empty()) {
            anyhow::bail!("database must not be empty");
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("foodshare.toml")
}

/// Load settings. A missing default file yields the defaults; a missing
/// file named with `--config` is an error.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FoodshareConfig> {
    let explicit = path.is_some();
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        if explicit {
            anyhow::bail!("config file {} not found", path.display());
        }
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(FoodshareConfig::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: FoodshareConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid settings in {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

pub fn write_config(path: &Path, config: &FoodshareConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_unusable_settings_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foodshare.toml");

        std::fs::write(&path, "port = 0\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("port must be between 1"));

        std::fs::write(&path, "recent_limit = 0\n").unwrap();
        assert!(load_config(Some(&path)).is_err());

        std::fs::write(&path, "recent_limt = 3\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("parsing"));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foodshare.toml");
        write_config(&path, &FoodshareConfig::starter(), false).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded, FoodshareConfig::starter());

        assert!(write_config(&path, &FoodshareConfig::default(), false).is_err());
        write_config(&path, &FoodshareConfig::default(), true).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), FoodshareConfig::default());
    }

    #[test]
    fn test_precedence() {
        let config = FoodshareConfig {
            database: Some("from_file.db".to_string()),
            port: None,
            recent_limit: None,
        };
        assert_eq!(config.database_path(None), PathBuf::from("from_file.db"));
        assert_eq!(config.database_path(Some(Path::new("flag.db"))), PathBuf::from("flag.db"));
        assert_eq!(FoodshareConfig::default().database_path(None), PathBuf::from(DEFAULT_DATABASE));
        assert_eq!(config.port(Some(9000)), 9000);
        assert_eq!(config.port(None), DEFAULT_PORT);
        assert_eq!(config.recent_limit(), DEFAULT_RECENT_LIMIT);
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("food.db");
        ensure_db_dir(&db).unwrap();
        assert!(dir.path().join("nested").is_dir());
    }
}
