use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: String, value: String },
    #[error("invalid bind address '{address}'")]
    InvalidAddress { address: String },
}

impl ConfigError {
    pub fn invalid_env(var: &str, value: &str) -> Self {
        Self::InvalidEnv {
            var: var.to_string(),
            value: value.to_string(),
        }
    }
}
