use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Contents of `habitrack.toml`. Every field is optional; CLI flags win.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HabitrackConfig {
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
    pub cors: Option<bool>,
}

impl HabitrackConfig {
    /// Config written by `habitrack init`
    pub fn starter() -> Self {
        Self {
            database: Some(default_database_path().to_string_lossy().into_owned()),
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
            static_dir: Some("ui/static".to_string()),
            cors: Some(false),
        }
    }

    /// Database path: explicit flag, then config, then the default
    pub fn database_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_database_path)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("habitrack.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("db").join("habits.sqlite")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<HabitrackConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: HabitrackConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &HabitrackConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("nope.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habitrack.toml");

        write_config(&path, &HabitrackConfig::starter(), false).unwrap();
        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, HabitrackConfig::starter());

        let err = write_config(&path, &HabitrackConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        write_config(&path, &HabitrackConfig::default(), true).unwrap();
    }

    #[test]
    fn test_partial_config() {
        let config: HabitrackConfig = toml::from_str("port = 9000\n").unwrap();
        assert_eq!(config.port, Some(9000));
        assert_eq!(config.database_path(None), default_database_path());
        assert_eq!(
            config.database_path(Some(PathBuf::from("x.db"))),
            PathBuf::from("x.db")
        );
    }

    #[test]
    fn test_ensure_db_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("a").join("b").join("habits.sqlite");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
