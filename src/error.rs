use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the configuration edge of the library
#[derive(Error, Debug)]
pub enum PostureError {
    #[error("Could not find home directory")]
    HomeDirNotFound,

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnvOverride { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PostureError>;
