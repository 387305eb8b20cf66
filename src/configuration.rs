use crate::model::{Protocol, DEFAULT_SERVER};
use dirs::config_dir;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const DEFAULT_APPLICATION_ID: &str = "migasfree-sdk";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const CONFIG_DIR_ENV: &str = "MIGASFREE_SDK_CONFIG_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("configuration file {path:?} does not exist")]
    NotFound { path: PathBuf },
    #[error("failed to load configuration data, because of: {cause}")]
    FailedToLoadData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ConfigurationError {
    /// True when no configuration is available at all, as opposed to a broken one
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            ConfigurationError::NotFound { .. }
                | ConfigurationError::FailedToFindConfigurationDirectory
        )
    }
}

/// Optional defaults for the client, read from a YAML file.
///
/// Every field may be omitted. Values passed explicitly to the client builder
/// always take precedence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    server: Option<String>,
    #[serde(default)]
    protocol: Option<Protocol>,
    #[serde(default)]
    api_version: Option<u32>,
    #[serde(default)]
    proxy: BTreeMap<String, String>,
}

impl Configuration {
    pub fn server(&self) -> Option<&str> {
        self.server.as_deref().filter(|s| !s.is_empty())
    }

    /// The server to use when the caller gave none: the configured one, or `localhost`
    pub fn server_or_default(&self) -> String {
        self.server().unwrap_or(DEFAULT_SERVER).to_string()
    }

    pub fn protocol(&self) -> Option<Protocol> {
        self.protocol
    }

    pub fn api_version(&self) -> Option<u32> {
        self.api_version
    }

    pub fn proxy(&self) -> &BTreeMap<String, String> {
        &self.proxy
    }

    pub fn set_server(&mut self, server: impl Into<String>) {
        self.server = Some(server.into());
    }

    pub fn get_default_configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        if let Ok(config_dir_str) = std::env::var(CONFIG_DIR_ENV) {
            let mut config_path = PathBuf::from(config_dir_str);
            config_path.push(DEFAULT_CONFIGURATION_FILE_NAME);
            return Ok(config_path);
        }

        match config_dir() {
            Some(configuration_directory) => {
                let mut default_config_file_path = configuration_directory;
                default_config_file_path.push(DEFAULT_APPLICATION_ID);
                default_config_file_path.push(DEFAULT_CONFIGURATION_FILE_NAME);

                Ok(default_config_file_path)
            }
            None => Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }
    }

    pub fn load_default() -> Result<Configuration, ConfigurationError> {
        let default_file_path = Configuration::get_default_configuration_file_path()?;
        debug!("Loading configuration from {}...", default_file_path.display());
        Configuration::load_from_file(&default_file_path)
    }

    pub fn load_from_file(path: &Path) -> Result<Configuration, ConfigurationError> {
        match fs::read_to_string(path) {
            Ok(configuration) => serde_yaml::from_str(&configuration)
                .map_err(|cause| ConfigurationError::FailedToLoadData {
                    cause: Box::new(cause),
                }),
            Err(cause) if cause.kind() == std::io::ErrorKind::NotFound => {
                Err(ConfigurationError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(cause) => Err(ConfigurationError::FailedToLoadData {
                cause: Box::new(cause),
            }),
        }
    }
}
