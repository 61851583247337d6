use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory could not be determined")]
    ConfigDirNotFound,

    #[error(
        "No topology file found. Looked for:\n\
        - current directory: fleetgate.local.yaml, fleetgate.yaml\n\
        - ./.fleetgate/ directory\n\
        - ~/.config/fleetgate/fleetgate.yaml\n\
        Set FLEETGATE_CONFIG_PATH to point at a file directly"
    )]
    ConfigFileNotFound,

    #[error("Config file does not exist: {0}")]
    MissingFile(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
