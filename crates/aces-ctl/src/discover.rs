//! CTL tree discovery.
//!
//! Walks a reference tree (such as the `transforms/ctl` directory of
//! `aces-dev`) in sorted order and turns every `.ctl` file into a
//! [`CtlTransform`]. The resulting [`TransformSet`] is keyed by transform
//! name and guarantees that every import resolves to a member of the set.
//!
//! # Example
//!
//! ```ignore
//! use aces_ctl::{discover_ctl_transforms, DiscoveryOptions};
//!
//! let options = DiscoveryOptions::new().with_ignore("**/experimental/**")?;
//! let set = discover_ctl_transforms("aces-dev/transforms/ctl", &options)?;
//! println!("{} transforms", set.len());
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, info, trace};
use walkdir::WalkDir;

use crate::ctl::CtlTransform;
use crate::error::{DiscoveryError, DiscoveryResult};

/// Discovery settings.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    ignore: Vec<Pattern>,
}

impl DiscoveryOptions {
    /// Default options: nothing ignored.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a glob; files whose root-relative path matches it are skipped.
    pub fn with_ignore(mut self, pattern: &str) -> DiscoveryResult<Self> {
        let compiled = Pattern::new(pattern).map_err(|source| DiscoveryError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.ignore.push(compiled);
        Ok(self)
    }

    /// Checks a root-relative path against the ignore globs.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        let normalized = relative.to_string_lossy().replace('\\', "/");
        self.ignore.iter().any(|p| p.matches(&normalized))
    }
}

/// Discovered transforms, keyed and iterated by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformSet {
    transforms: BTreeMap<String, CtlTransform>,
}

impl TransformSet {
    /// Builds a set, rejecting duplicate names and unresolved imports.
    pub fn from_transforms(
        transforms: impl IntoIterator<Item = CtlTransform>,
    ) -> DiscoveryResult<Self> {
        let mut map: BTreeMap<String, CtlTransform> = BTreeMap::new();
        for transform in transforms {
            if let Some(existing) = map.get(transform.name()) {
                return Err(DiscoveryError::DuplicateTransform {
                    name: transform.name().to_string(),
                    first: existing.path().to_path_buf(),
                    second: transform.path().to_path_buf(),
                });
            }
            map.insert(transform.name().to_string(), transform);
        }

        for transform in map.values() {
            for dependency in transform.dependencies() {
                if !map.contains_key(dependency) {
                    return Err(DiscoveryError::UnresolvedDependency {
                        transform: transform.name().to_string(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        Ok(Self { transforms: map })
    }

    /// Number of transforms.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Looks a transform up by name.
    pub fn get(&self, name: &str) -> Option<&CtlTransform> {
        self.transforms.get(name)
    }

    /// Transforms sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &CtlTransform> {
        self.transforms.values()
    }

    /// Transform names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }
}

impl IntoIterator for TransformSet {
    type Item = CtlTransform;
    type IntoIter = std::collections::btree_map::IntoValues<String, CtlTransform>;

    fn into_iter(self) -> Self::IntoIter {
        self.transforms.into_values()
    }
}

impl<'a> IntoIterator for &'a TransformSet {
    type Item = &'a CtlTransform;
    type IntoIter = std::collections::btree_map::Values<'a, String, CtlTransform>;

    fn into_iter(self) -> Self::IntoIter {
        self.transforms.values()
    }
}

/// Checks that `root` is an existing directory.
pub(crate) fn check_root(root: &Path) -> DiscoveryResult<()> {
    if !root.exists() {
        return Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    Ok(())
}

/// Lists files under `root` with the given extension, sorted, minus ignored ones.
pub(crate) fn collect_files(
    root: &Path,
    extension: &str,
    options: &DiscoveryOptions,
) -> DiscoveryResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if !matches {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if options.is_ignored(relative) {
            trace!(path = %relative.display(), "Ignored");
            continue;
        }
        files.push(path.to_path_buf());
    }
    Ok(files)
}

/// Discovers every CTL transform under `root`.
///
/// # Errors
///
/// - [`DiscoveryError::RootNotFound`] / [`DiscoveryError::NotADirectory`]
/// - [`DiscoveryError::EmptyTree`] when no `.ctl` file survives filtering
/// - [`DiscoveryError::Malformed`] for unreadable headers or non UTF-8 files
/// - [`DiscoveryError::DuplicateTransform`], [`DiscoveryError::UnresolvedDependency`]
pub fn discover_ctl_transforms(
    root: impl AsRef<Path>,
    options: &DiscoveryOptions,
) -> DiscoveryResult<TransformSet> {
    let root = root.as_ref();
    check_root(root)?;
    debug!(root = %root.display(), "Discovering CTL transforms");

    let files = collect_files(root, "ctl", options)?;
    if files.is_empty() {
        return Err(DiscoveryError::EmptyTree {
            path: root.to_path_buf(),
            kind: "CTL",
        });
    }

    let transforms = files
        .iter()
        .map(CtlTransform::from_file)
        .collect::<DiscoveryResult<Vec<_>>>()?;
    let set = TransformSet::from_transforms(transforms)?;

    info!(root = %root.display(), count = set.len(), "Discovered CTL transforms");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_patterns() {
        let options = DiscoveryOptions::new()
            .with_ignore("**/experimental/*")
            .unwrap()
            .with_ignore("*InvRRT*")
            .unwrap();

        assert!(options.is_ignored(Path::new("odt/experimental/ODT.X.ctl")));
        assert!(options.is_ignored(Path::new("rrt/InvRRT.ctl")));
        assert!(!options.is_ignored(Path::new("rrt/RRT.ctl")));
    }

    #[test]
    fn bad_pattern() {
        let err = DiscoveryOptions::new().with_ignore("[").unwrap_err();
        assert!(matches!(err, DiscoveryError::Pattern { .. }));
    }

    #[test]
    fn duplicate_names_rejected() {
        let a = CtlTransform::parse("a/RRT.ctl", "").unwrap();
        let b = CtlTransform::parse("b/RRT.ctl", "").unwrap();
        let err = TransformSet::from_transforms([a, b]).unwrap_err();
        assert!(matches!(err, DiscoveryError::DuplicateTransform { name, .. } if name == "RRT"));
    }

    #[test]
    fn unresolved_import_names_both_sides() {
        let t = CtlTransform::parse("RRT.ctl", "import \"ACESlib.Missing\";").unwrap();
        let err = TransformSet::from_transforms([t]).unwrap_err();
        match err {
            DiscoveryError::UnresolvedDependency { transform, dependency } => {
                assert_eq!(transform, "RRT");
                assert_eq!(dependency, "ACESlib.Missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
