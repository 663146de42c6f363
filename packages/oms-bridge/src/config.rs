//! Bridge configuration.
//!
//! Values are layered, later layers winning: built-in defaults, the TOML
//! file, the environment (`OMS_URL`, `OMS_NAMESPACE_URI`) and finally the
//! command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use oms_address_space::BlockPolicy;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const ENV_OMS_URL: &str = "OMS_URL";
pub const ENV_NAMESPACE_URI: &str = "OMS_NAMESPACE_URI";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Root URL of the object memory server.
    pub oms_url: String,
    /// Namespace URI of the root partition.
    pub namespace_uri: String,
    pub request_timeout_secs: u64,
    /// Expose "Delete Block" on block nodes.
    pub block_deletable: bool,
    /// How deep the binary walks the address space.
    pub walk_depth: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            oms_url: "http://localhost:10082".to_string(),
            namespace_uri: "DE/DFKI/OPCUA/OMS".to_string(),
            request_timeout_secs: 30,
            block_deletable: true,
            walk_depth: 3,
        }
    }
}

/// One configuration layer. Unset fields leave the lower layer alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub oms_url: Option<String>,
    pub namespace_uri: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub block_deletable: Option<bool>,
    pub walk_depth: Option<usize>,
}

impl ConfigLayer {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The environment layer, read through `lookup`.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            oms_url: non_empty(ENV_OMS_URL),
            namespace_uri: non_empty(ENV_NAMESPACE_URI),
            ..Default::default()
        }
    }
}

impl BridgeConfig {
    /// Load the configuration the binary runs with.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>, flags: &ConfigLayer) -> Result<Self, ConfigError> {
        Self::load_with_env(path, flags, |key| std::env::var(key).ok())
    }

    pub fn load_with_env(
        path: Option<&Path>,
        flags: &ConfigLayer,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::Missing {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => config.apply(ConfigLayer::from_file(path)?),
            None => {
                if let Some(path) = Self::default_config_path().filter(|p| p.exists()) {
                    tracing::debug!(path = %path.display(), "reading default config file");
                    config.apply(ConfigLayer::from_file(&path)?);
                }
            }
        }

        config.apply(ConfigLayer::from_env(env));
        config.apply(flags.clone());
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/oms-bridge/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("oms-bridge").join("config.toml"))
    }

    pub fn apply(&mut self, layer: ConfigLayer) {
        if let Some(url) = layer.oms_url {
            self.oms_url = url;
        }
        if let Some(uri) = layer.namespace_uri {
            self.namespace_uri = uri;
        }
        if let Some(secs) = layer.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
        if let Some(deletable) = layer.block_deletable {
            self.block_deletable = deletable;
        }
        if let Some(depth) = layer.walk_depth {
            self.walk_depth = depth;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.oms_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.oms_url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.oms_url.clone(),
                message: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if self.namespace_uri.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "namespace_uri must not be empty".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "request_timeout_secs must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn block_policy(&self) -> BlockPolicy {
        BlockPolicy {
            deletable: self.block_deletable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.oms_url, "http://localhost:10082");
        assert_eq!(config.namespace_uri, "DE/DFKI/OPCUA/OMS");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.block_policy().deletable);
        assert_eq!(config.walk_depth, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = config_file(
            r#"
oms_url = "http://oms.example:8080"
block_deletable = false
"#,
        );
        let config =
            BridgeConfig::load_with_env(Some(file.path()), &ConfigLayer::default(), env(&[]))
                .unwrap();
        assert_eq!(config.oms_url, "http://oms.example:8080");
        assert!(!config.block_deletable);
        assert_eq!(config.namespace_uri, "DE/DFKI/OPCUA/OMS");
    }

    #[test]
    fn test_env_overrides_file_and_flags_override_env() {
        let file = config_file(
            r#"
oms_url = "http://from-file:1"
namespace_uri = "urn:file"
"#,
        );
        let vars = [(ENV_OMS_URL, "http://from-env:2"), (ENV_NAMESPACE_URI, "urn:env")];

        let config =
            BridgeConfig::load_with_env(Some(file.path()), &ConfigLayer::default(), env(&vars))
                .unwrap();
        assert_eq!(config.oms_url, "http://from-env:2");
        assert_eq!(config.namespace_uri, "urn:env");

        let flags = ConfigLayer {
            oms_url: Some("http://from-flag:3".to_string()),
            walk_depth: Some(7),
            ..Default::default()
        };
        let config = BridgeConfig::load_with_env(Some(file.path()), &flags, env(&vars)).unwrap();
        assert_eq!(config.oms_url, "http://from-flag:3");
        assert_eq!(config.namespace_uri, "urn:env");
        assert_eq!(config.walk_depth, 7);
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let layer = ConfigLayer::from_env(env(&[(ENV_OMS_URL, "  ")]));
        assert_eq!(layer, ConfigLayer::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = BridgeConfig::load_with_env(Some(&path), &ConfigLayer::default(), env(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let file = config_file("oms_uri = \"http://typo\"\n");
        let err =
            BridgeConfig::load_with_env(Some(file.path()), &ConfigLayer::default(), env(&[]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let flags = ConfigLayer {
            oms_url: Some("not a url".to_string()),
            ..Default::default()
        };
        let file = config_file("");
        let err = BridgeConfig::load_with_env(Some(file.path()), &flags, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));

        let flags = ConfigLayer {
            oms_url: Some("ftp://oms.example".to_string()),
            ..Default::default()
        };
        let err = BridgeConfig::load_with_env(Some(file.path()), &flags, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = BridgeConfig::default();
        config.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }
}
