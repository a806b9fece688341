//! # Configuration
//!
//! Two sources, loaded once at startup:
//!
//! - **Project config**: `sailsync.json` in the working directory. Directory
//!   layout, recipient aliases and default options for visual templates.
//!   Missing file means defaults.
//! - **Credentials**: `SAILTHRU_API_KEY` / `SAILTHRU_API_SECRET`, read from the
//!   environment after loading the env file picked with `--env`
//!   (`.env.<name>`, or `.env` without the flag). Variables already set in the
//!   process win over the file.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `templates_dir` | `templates` | Where `<name>.html` files live |
//! | `options_dir` | `options` | Where `<name>.json` sidecars live |
//! | `aliases` | `{}` | Recipient shorthands, e.g. `{"me": "me@example.com"}` |
//! | `default_options` | `{}` | Sidecar fields used when a visual template leaves them unset |

use crate::error::{Result, SyncError};
use crate::model::TemplateMetadata;
use crate::recipients::AliasTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "sailsync.json";

pub const API_KEY_ENV: &str = "SAILTHRU_API_KEY";
pub const API_SECRET_ENV: &str = "SAILTHRU_API_SECRET";
pub const API_URL_ENV: &str = "SAILTHRU_API_URL";

/// Env name that also turns on debug logging.
pub const DEBUG_ENV: &str = "debug";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SailsyncConfig {
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    #[serde(default = "default_options_dir")]
    pub options_dir: PathBuf,

    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    #[serde(default)]
    pub default_options: TemplateMetadata,
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_options_dir() -> PathBuf {
    PathBuf::from("options")
}

impl Default for SailsyncConfig {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            options_dir: default_options_dir(),
            aliases: BTreeMap::new(),
            default_options: TemplateMetadata::default(),
        }
    }
}

impl SailsyncConfig {
    /// Load config from the given directory, or return defaults if not found.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(SyncError::Io)?;
        serde_json::from_str(&content).map_err(|e| {
            SyncError::Config(format!("{} is not valid: {}", config_path.display(), e))
        })
    }

    /// Directories resolved against `root` (relative entries are relative to
    /// the project, not the process).
    pub fn resolve_dirs(&self, root: &Path) -> (PathBuf, PathBuf) {
        (root.join(&self.templates_dir), root.join(&self.options_dir))
    }

    pub fn alias_table(&self) -> AliasTable {
        AliasTable::new(self.aliases.clone())
    }
}

/// API credentials for the template service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SyncError::Config(format!("Missing credentials: {} is not set", key)))
        };
        Ok(Self {
            api_key: read(API_KEY_ENV)?,
            api_secret: read(API_SECRET_ENV)?,
        })
    }
}

/// Name of the env file for `--env <name>`.
pub fn env_file_name(env: Option<&str>) -> String {
    match env {
        Some(name) => format!(".env.{}", name),
        None => ".env".to_string(),
    }
}

/// Load the selected env file into the process environment. A missing file is
/// fine; credentials may come from the shell instead.
pub fn load_env_file(dir: &Path, env: Option<&str>) -> Result<Option<PathBuf>> {
    let path = dir.join(env_file_name(env));
    match dotenvy::from_path(&path) {
        Ok(()) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(SyncError::Config(format!(
            "Could not load {}: {}",
            path.display(),
            e
        ))),
    }
}

pub fn api_url() -> String {
    std::env::var(API_URL_ENV)
        .unwrap_or_else(|_| crate::remote::sailthru::DEFAULT_API_URL.to_string())
}
