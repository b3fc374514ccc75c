//! Error types for transform discovery and graph building.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while scanning a CTL or CLF tree.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// I/O error reading a transform file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed.
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// Root path does not exist.
    #[error("transform root not found: {path}")]
    RootNotFound {
        /// Requested root.
        path: PathBuf,
    },

    /// Root path exists but is not a directory.
    #[error("transform root is not a directory: {path}")]
    NotADirectory {
        /// Requested root.
        path: PathBuf,
    },

    /// The tree contains no transform files.
    #[error("no {kind} transforms found under {path}")]
    EmptyTree {
        /// Scanned root.
        path: PathBuf,
        /// File kind, `CTL` or `CLF`.
        kind: &'static str,
    },

    /// A transform file could not be understood.
    #[error("malformed transform {path}: {reason}")]
    Malformed {
        /// Offending file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Two files share the same transform name.
    #[error("duplicate transform '{name}': {first} and {second}")]
    DuplicateTransform {
        /// Shared name.
        name: String,
        /// First file seen.
        first: PathBuf,
        /// Second file seen.
        second: PathBuf,
    },

    /// A transform imports something that is not in the tree.
    #[error("transform '{transform}' depends on '{dependency}', which was not discovered")]
    UnresolvedDependency {
        /// Importing transform.
        transform: String,
        /// Missing import.
        dependency: String,
    },

    /// Invalid ignore glob.
    #[error("invalid ignore pattern '{pattern}': {source}")]
    Pattern {
        /// Pattern as given.
        pattern: String,
        /// Parser error.
        source: glob::PatternError,
    },
}

/// Errors raised while assembling or querying the transform graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A dependency edge points at a transform absent from the set.
    #[error("transform '{transform}' depends on unknown transform '{dependency}'")]
    UnresolvedDependency {
        /// Dependent transform.
        transform: String,
        /// Missing dependency.
        dependency: String,
    },

    /// The dependency relation is cyclic.
    #[error("dependency cycle: {}", .cycle.join(" -> "))]
    Cycle {
        /// Transform names along the cycle, first name repeated at the end.
        cycle: Vec<String>,
    },

    /// Lookup of an unknown transform.
    #[error("unknown transform: {name}")]
    UnknownTransform {
        /// Requested name.
        name: String,
    },

    /// Lookup of a colour space that no transform converts from or to.
    #[error("unknown colour space: {name}")]
    UnknownColorSpace {
        /// Requested label.
        name: String,
    },

    /// Both colour spaces exist but are not connected.
    #[error("no conversion path from '{source_space}' to '{target_space}'")]
    NoPath {
        /// Start label.
        source_space: String,
        /// End label.
        target_space: String,
    },
}
