//! CLI command implementations

pub mod build;
pub mod discover;
pub mod generate;
pub mod path;
pub mod validate;

use std::path::Path;

use aces_config::{ConfigProfile, ProfileSpec};
use aces_ctl::{
    ClfTransform, DiscoveryOptions, TransformGraph, TransformSet, discover_clf_transforms,
    discover_ctl_transforms,
};
use anyhow::{Context, Result};

use crate::TreeArgs;

/// Discovery options from the `--ignore` globs.
pub fn discovery_options(tree: &TreeArgs) -> Result<DiscoveryOptions> {
    tree.ignore.iter().try_fold(DiscoveryOptions::new(), |options, pattern| {
        options
            .with_ignore(pattern)
            .with_context(|| format!("Invalid ignore pattern: {pattern}"))
    })
}

/// Discovers the CTL transforms of a tree.
pub fn discover_ctl(root: &Path, options: &DiscoveryOptions) -> Result<TransformSet> {
    discover_ctl_transforms(root, options)
        .with_context(|| format!("Failed to discover CTL transforms: {}", root.display()))
}

/// Discovers the CTL transforms and builds their graph.
pub fn load_graph(root: &Path, options: &DiscoveryOptions) -> Result<TransformGraph> {
    let set = discover_ctl(root, options)?;
    TransformGraph::build(set)
        .with_context(|| format!("Failed to build transform graph: {}", root.display()))
}

/// Discovers the CLF transforms of the optional CLF tree.
pub fn load_clf(root: Option<&Path>, options: &DiscoveryOptions) -> Result<Vec<ClfTransform>> {
    match root {
        Some(root) => discover_clf_transforms(root, options)
            .with_context(|| format!("Failed to discover CLF transforms: {}", root.display())),
        None => Ok(Vec::new()),
    }
}

/// Loads the profile file when given, else the named built-in profile.
pub fn resolve_profile(name: &str, file: Option<&Path>) -> Result<ProfileSpec> {
    match file {
        Some(path) => ProfileSpec::from_file(path)
            .with_context(|| format!("Failed to load profile: {}", path.display())),
        None => {
            let profile: ConfigProfile = name.parse()?;
            profile
                .spec()
                .with_context(|| format!("Failed to load built-in profile: {profile}"))
        }
    }
}

/// Frames `message` in a box of `width` columns, wrapping words to fit.
///
/// ```text
/// ==============================
/// *                            *
/// *   Generating "cg" config   *
/// *                            *
/// ==============================
/// ```
pub fn message_box(message: &str, width: usize, padding: usize) -> String {
    let inner = width.saturating_sub(2);
    let text_width = inner.saturating_sub(padding * 2).max(1);

    let mut lines: Vec<String> = Vec::new();
    for paragraph in message.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > text_width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n", "=".repeat(width)));
    out.push_str(&format!("*{}*\n", " ".repeat(inner)));
    for line in &lines {
        let pad = " ".repeat(padding);
        out.push_str(&format!("*{pad}{line:<w$}*\n", w = inner.saturating_sub(padding)));
    }
    out.push_str(&format!("*{}*\n", " ".repeat(inner)));
    out.push_str(&"=".repeat(width));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxed_message() {
        let boxed = message_box("Generating \"cg\" config", 30, 3);
        let expected = "\
==============================
*                            *
*   Generating \"cg\" config   *
*                            *
==============================";
        assert_eq!(boxed, expected);
    }

    #[test]
    fn boxed_message_wraps() {
        let message = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, \
                       sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";
        let boxed = message_box(message, 60, 3);
        let lines: Vec<&str> = boxed.lines().collect();
        assert_eq!(lines[2], "*   Lorem ipsum dolor sit amet, consectetur adipiscing     *");
        assert_eq!(lines[4], "*   dolore magna aliqua.                                   *");
        assert_eq!(lines.len(), 7);
        assert!(lines.iter().all(|l| l.len() == 60));
    }

    #[test]
    fn unknown_builtin_profile() {
        let err = resolve_profile("film", None).unwrap_err();
        assert!(err.to_string().contains("film"));
        assert_eq!(resolve_profile("ref", None).unwrap().name, "reference");
    }

    #[test]
    fn bad_ignore_glob() {
        let tree = TreeArgs {
            ctl_root: "ctl".into(),
            clf_root: None,
            ignore: vec!["[".to_string()],
        };
        assert!(discovery_options(&tree).is_err());
    }
}
