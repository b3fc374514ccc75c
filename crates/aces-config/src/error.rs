//! Error types for profile loading and config generation.

use std::path::PathBuf;

use aces_ctl::GraphError;
use aces_ocio::OcioError;
use thiserror::Error;

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Errors raised while loading a profile or generating a config.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A colour space the profile needs was not generated.
    #[error("profile '{profile}': colour space '{name}' used by {usage} is not in the transform graph")]
    MissingColorSpace {
        /// Profile name.
        profile: String,
        /// Missing colour space label.
        name: String,
        /// What asked for it, e.g. `role 'scene_linear'`.
        usage: String,
    },

    /// The profile is syntactically valid YAML but not a usable profile.
    #[error("invalid profile '{profile}': {reason}")]
    InvalidProfile {
        /// Profile name.
        profile: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Unknown built-in profile name.
    #[error("unknown profile '{0}', expected one of: reference, cg, studio")]
    UnknownProfile(String),

    /// Profile file not found.
    #[error("profile file not found: {path}")]
    ProfileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// Profile YAML could not be parsed.
    #[error("profile parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error reading a profile.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Graph query failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Config assembly failed.
    #[error(transparent)]
    Ocio(#[from] OcioError),

    /// The generated config has validation errors.
    #[error("generated config is invalid ({} error(s)): {}", .issues.len(), .issues.join("; "))]
    Validation {
        /// Error messages.
        issues: Vec<String>,
    },
}
