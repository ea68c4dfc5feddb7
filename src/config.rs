use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::error::ConfigError;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Simulated delays of a scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub scan_delay: Duration,
    pub upload_delay: Duration,
    pub analyze_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            scan_delay: Duration::from_millis(1500),
            upload_delay: Duration::from_millis(1000),
            analyze_delay: Duration::from_millis(1500),
        }
    }
}

pub struct Config {
    pub session: SessionConfig,
    pub data_dir: Option<PathBuf>,
    pub ephemeral: bool,
    pub bind: SocketAddr,
}

// on-disk shape of config.toml, every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    session: FileSession,
    #[serde(default)]
    storage: FileStorage,
    #[serde(default)]
    server: FileServer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSession {
    scan_delay: Option<String>,
    upload_delay: Option<String>,
    analyze_delay: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileStorage {
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileServer {
    bind: Option<String>,
}

/// ~/.config/encode/config.toml or platform equivalent
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "encode")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Flags win over the config file, the file wins over defaults. An
    /// explicit `--config` must exist; the default location may not.
    pub fn load(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => read_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_file(&path)?,
                _ => FileConfig::default(),
            },
        };

        Config::from_parts(args, file)
    }

    fn from_parts(args: &GlobalArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let defaults = SessionConfig::default();

        let session = SessionConfig {
            scan_delay: duration("session.scan_delay", file.session.scan_delay, defaults.scan_delay)?,
            upload_delay: duration("session.upload_delay", file.session.upload_delay, defaults.upload_delay)?,
            analyze_delay: duration("session.analyze_delay", file.session.analyze_delay, defaults.analyze_delay)?,
        };

        let bind_str = file.server.bind.unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_str.parse().map_err(|source| ConfigError::Bind {
            value: bind_str.clone(),
            source,
        })?;

        Ok(Config {
            session,
            data_dir: args.data_dir.clone().or(file.storage.data_dir),
            ephemeral: args.ephemeral,
            bind,
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    debug!(path = %path.display(), "Reading config file");

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(toml::from_str(&contents)?)
}

fn duration(key: &'static str, value: Option<String>, default: Duration) -> Result<Duration, ConfigError> {
    match value {
        Some(s) => humantime::parse_duration(&s).map_err(|source| ConfigError::Duration { key, source }),
        None => Ok(default),
    }
}
