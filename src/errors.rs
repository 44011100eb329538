use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration key not found: {0}")]
    UnknownConfigKey(String),
    #[error("{0} is empty")]
    EmptyConfigValue(String),
    #[error("Failed to read config file: {0}")]
    ConfigFile(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
