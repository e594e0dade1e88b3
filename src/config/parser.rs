//! Configuration parser for loading and merging configuration sources.
//!
//! Sources, in increasing precedence: built-in defaults, the optional
//! `cloudgate.yaml`, environment variables.

use crate::error::{CloudgateError, ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::PreflightConfig;

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["cloudgate.yaml", "cloudgate.yml"];

/// Configuration parser for preflight runs.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<PreflightConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(CloudgateError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            CloudgateError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<PreflightConfig> {
        debug!("Parsing YAML configuration");

        let config: PreflightConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            CloudgateError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        Ok(config)
    }

    /// Loads configuration with environment overrides, falling back to
    /// defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error for an explicitly given path that does not exist, or
    /// for an unparseable or invalid file.
    pub fn load_or_default(&self, explicit_path: Option<&PathBuf>) -> Result<PreflightConfig> {
        let mut config = match explicit_path {
            Some(path) => self.load_file(path)?,
            None => {
                let start = self
                    .base_path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("."));
                match find_config_file(start) {
                    Some(path) => self.load_file(path)?,
                    None => {
                        debug!("No configuration file found, using defaults");
                        PreflightConfig::default()
                    }
                }
            }
        };

        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(config: &mut PreflightConfig) {
        if let Ok(group) = std::env::var("CLOUDGATE_RESOURCE_GROUP") {
            debug!("Overriding resource_group from environment");
            config.resource_group = group;
        }

        if let Ok(subscription) = std::env::var("CLOUDGATE_SUBSCRIPTION_ID") {
            debug!("Overriding subscription_id from environment");
            config.subscription_id = Some(subscription);
        }

        if let Ok(location) = std::env::var("CLOUDGATE_DEFAULT_LOCATION") {
            debug!("Overriding default_location from environment");
            config.default_location = location;
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                CloudgateError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Finds a configuration file in the given directory or its parents.
#[must_use]
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let mut current = start_dir.as_ref().to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let parser = ConfigParser::new();
        let config = parser.parse_yaml("{}", None).expect("valid config");
        assert_eq!(config, PreflightConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r"
resource_group: netsec-preflight
default_location: westeurope
subscription_id: 00000000-0000-0000-0000-000000000000
concurrency: 4
timeout_secs: 60
";
        let parser = ConfigParser::new();
        let config = parser.parse_yaml(yaml, None).expect("valid config");

        assert_eq!(config.resource_group, "netsec-preflight");
        assert_eq!(config.default_location, "westeurope");
        assert_eq!(
            config.subscription_id.as_deref(),
            Some("00000000-0000-0000-0000-000000000000")
        );
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_load_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cloudgate.yaml");
        std::fs::write(&path, "resource_group: from-disk\n").expect("write config");

        let parser = ConfigParser::new();
        let config = parser.load_file(&path).expect("load config");
        assert_eq!(config.resource_group, "from-disk");
    }

    #[test]
    fn test_find_config_file_searches_upward() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(dir.path().join("cloudgate.yml"), "{}").expect("write config");

        let found = find_config_file(&nested).expect("config found");
        assert_eq!(found, dir.path().join("cloudgate.yml"));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let parser = ConfigParser::new();
        let missing = PathBuf::from("definitely-not-here/cloudgate.yaml");
        assert!(parser.load_or_default(Some(&missing)).is_err());
    }
}
