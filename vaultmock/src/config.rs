//! Configuration management

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub mount: MountConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MountConfig {
    #[serde(default = "default_mount")]
    pub path: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            path: default_mount(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum StorageConfig {
    #[serde(rename = "ephemeral")]
    Ephemeral,

    #[serde(rename = "sqlite")]
    Sqlite {
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Ephemeral
    }
}

fn default_port() -> u16 {
    8200
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_mount() -> String {
    "mock/".to_string()
}

pub fn default_sqlite_path() -> PathBuf {
    PathBuf::from("data").join("vaultmock.db")
}

impl Config {
    /// Load configuration from an optional file and `VAULTMOCK__*` environment variables
    pub fn load(file: &Path) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(file).required(false))
            .add_source(config::Environment::with_prefix("VAULTMOCK").separator("__"))
            .build()?;

        Ok(config.try_deserialize::<Config>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse("");
        assert_eq!(config.server.port, 8200);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.mount.path, "mock/");
        assert_eq!(config.storage, StorageConfig::Ephemeral);
    }

    #[test]
    fn test_sqlite_storage() {
        let config = parse(
            r#"
            [server]
            port = 9000

            [storage]
            type = "sqlite"
            path = "/tmp/accounts.db"
            "#,
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                path: PathBuf::from("/tmp/accounts.db")
            }
        );
    }

    #[test]
    fn test_sqlite_default_path() {
        let config = parse("[storage]\ntype = \"sqlite\"\n");
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                path: default_sqlite_path()
            }
        );
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let config = Config::load(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.mount.path, "mock/");
    }
}
