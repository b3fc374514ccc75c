//! Errors raised while building, reading and writing configs.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for OCIO operations.
pub type OcioResult<T> = Result<T, OcioError>;

/// Config model errors.
#[derive(Debug, Error)]
pub enum OcioError {
    /// Reading or writing a config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not YAML.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// `ocio_profile_version` is not a 2.x version.
    #[error("unsupported config version: {version} (supported: 2.x)")]
    UnsupportedVersion {
        /// Version as written.
        version: String,
    },

    /// A transform node has an unknown tag or bad fields.
    #[error("invalid transform: {reason}")]
    InvalidTransform {
        /// What is wrong with it.
        reason: String,
    },

    /// A document node has an unexpected shape.
    #[error("malformed config: {0}")]
    Malformed(String),

    /// A config needs at least one colour space.
    #[error("config '{config}' has no colour spaces")]
    NoColorSpaces {
        /// Config name.
        config: String,
    },

    /// The `reference` role is mandatory.
    #[error("config '{config}' does not define the 'reference' role")]
    MissingReferenceRole {
        /// Config name.
        config: String,
    },

    /// A role names a colour space the config does not contain.
    #[error("role '{role}' references non-existent colour space '{colorspace}'")]
    DanglingRole {
        /// Role name.
        role: String,
        /// Missing colour space.
        colorspace: String,
    },
}
