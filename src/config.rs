//! JSON configuration for message windows.
//!
//! Every field has a default, so a partial file (or none at all) is valid:
//!
//! ```json
//! {
//!   "class_name": "TrayHost",
//!   "surface_name": "Tray host",
//!   "secret_policy": "sequential"
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::events::{RemovalPolicy, SecretPolicy};
use crate::model::constants::*;

/// Settings used to construct a [`crate::MessageWindow`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WindowConfig {
    pub class_name: String,
    pub surface_name: String,
    pub icon_resource: Option<u16>,
    pub secret_policy: SecretPolicy,
    pub removal_policy: RemovalPolicy,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_CLASS_NAME.to_string(),
            surface_name: DEFAULT_SURFACE_NAME.to_string(),
            icon_resource: None,
            secret_policy: SecretPolicy::default(),
            removal_policy: RemovalPolicy::default(),
        }
    }
}

/// Config file path: `$SURFACEMUX_CONFIG`, or `surfacemux.json` in the
/// working directory.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

impl WindowConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load from `path`, failing on I/O or parse errors.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, returning defaults if it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no config at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = WindowConfig::default();
        assert_eq!(config.class_name, DEFAULT_CLASS_NAME);
        assert_eq!(config.surface_name, DEFAULT_SURFACE_NAME);
        assert_eq!(config.icon_resource, None);
        assert_eq!(config.secret_policy, SecretPolicy::Random);
        assert_eq!(config.removal_policy, RemovalPolicy::SwapRemove);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = WindowConfig::from_json(r#"{ "secret_policy": "sequential" }"#).unwrap();
        assert_eq!(config.secret_policy, SecretPolicy::Sequential);
        assert_eq!(config.class_name, DEFAULT_CLASS_NAME);
    }

    #[test]
    fn policies_use_snake_case() {
        let config = WindowConfig {
            removal_policy: RemovalPolicy::Ordered,
            ..WindowConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""removal_policy":"ordered""#));
        assert!(json.contains(r#""secret_policy":"random""#));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(WindowConfig::from_json(r#"{ "removal_policy": "shuffle" }"#).is_err());
    }
}
