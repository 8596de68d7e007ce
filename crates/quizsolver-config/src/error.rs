//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly named config file is absent.
    #[error("config file {} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// `${NAME}` appears in the file but `NAME` is not in the environment.
    #[error("${{{0}}} is referenced but not set")]
    UnsetVariable(String),

    #[error("{var}={value:?}: {reason}")]
    BadVariable {
        var: String,
        value: String,
        reason: String,
    },

    /// Validation found at least one error.
    #[error("configuration rejected: {0}")]
    Rejected(String),
}
