//! Layered configuration for shelfsync.
//!
//! Values are resolved in order, later sources winning:
//! 1. built-in defaults,
//! 2. a TOML file (if it exists),
//! 3. `SHELFSYNC_`-prefixed environment variables, with `__` separating
//!    nested keys (`SHELFSYNC_CACHE__MAX_AGE_DAYS=7`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "SHELFSYNC_";
const DATABASE_FILENAME: &str = "shelfsync.db";
const CONFIG_FILENAME: &str = "shelfsync.toml";
/// Scraped sites ban clients that hit them faster than this.
pub const MIN_THROTTLE_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub remote: RemoteConfig,
    pub legacy: LegacyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILENAME))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILENAME));
        Self { path }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How many whole days a synced collection stays fresh.
    pub max_age_days: u32,
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_age_days: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Page size requested from the commerce API.
    pub page_size: u32,
    /// Delay between consecutive requests to the scraped sites.
    pub throttle_ms: u64,
}
impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            throttle_ms: MIN_THROTTLE_MS,
        }
    }
}
impl RemoteConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LegacyConfig {
    /// JSON library file from before the local store existed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_json: Option<PathBuf>,
}

impl Config {
    /// The configuration file in the platform's config directory, if the
    /// platform has one.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
    }

    /// All providers, in precedence order. A missing file is skipped.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate the configuration.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Config = Self::figment(file).extract().or_raise(|| ErrorKind::Extract)?;
        config.validate()?;
        tracing::debug!(database = %config.database.path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("database.path"));
        }
        if self.remote.page_size == 0 {
            exn::bail!(ErrorKind::Invalid("remote.page_size"));
        }
        if self.remote.throttle_ms < MIN_THROTTLE_MS {
            exn::bail!(ErrorKind::Invalid("remote.throttle_ms"));
        }
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "shelfsync")
}
