//! Configuration validation.
//!
//! Detects structural problems in a [`Config`]:
//! - Roles, views and looks referencing missing color spaces
//! - Views referencing missing view transforms or looks
//! - Duplicate names across color spaces, aliases and named transforms
//! - File rules without the trailing `Default` rule
//! - File transforms that cannot be found on the search path
//!
//! # Example
//!
//! ```ignore
//! use aces_ocio::{validate, Config};
//!
//! let config = Config::from_file("studio-config.ocio")?;
//! let issues = validate::check(&config);
//! if validate::has_errors(&issues) {
//!     issues.iter().for_each(|issue| eprintln!("{issue}"));
//! }
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::colorspace::ReferenceSpace;
use crate::config::{Config, FileRule};
use crate::look::parse_looks;
use crate::role::names;
use crate::transform::Transform;

/// How bad an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Worth knowing, nothing to fix.
    Info,
    /// Loads, but some lookups will not behave as intended.
    Warning,
    /// OCIO would reject the config or fail at runtime.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// One finding of [`check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Severity.
    pub severity: Severity,
    /// Kind of problem.
    pub category: IssueCategory,
    /// Message naming the offending entries.
    pub message: String,
    /// Entry the issue is about, e.g. `sRGB:SDR Video`.
    pub context: Option<String>,
}

impl Issue {
    fn new(
        severity: Severity,
        category: IssueCategory,
        message: String,
        context: impl Into<Option<String>>,
    ) -> Self {
        Self {
            severity,
            category,
            message,
            context: context.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Kind of problem an [`Issue`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCategory {
    /// Reference to an undefined colour space.
    MissingColorSpace,
    /// Required or recommended role not bound.
    MissingRole,
    /// Reference to an undefined display or view.
    MissingDisplay,
    /// Reference to an undefined view transform.
    MissingViewTransform,
    /// Reference to an undefined look.
    MissingLook,
    /// File transform not found on the search path.
    MissingFile,
    /// Transform or reference space used where it cannot work.
    InvalidTransform,
    /// File rules without a trailing `Default`.
    FileRules,
    /// Name or alias defined twice.
    Duplicate,
}

/// Runs every check; issues come grouped by check, in config order.
pub fn check(config: &Config) -> Vec<Issue> {
    let mut issues = Vec::new();

    check_roles(config, &mut issues);
    check_displays(config, &mut issues);
    check_colorspaces(config, &mut issues);
    check_names(config, &mut issues);
    check_looks(config, &mut issues);
    check_file_rules(config, &mut issues);
    check_files(config, &mut issues);

    issues
}

/// Whether any issue is an error.
pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

/// Whether any issue is a warning or an error.
pub fn has_warnings(issues: &[Issue]) -> bool {
    issues.iter().any(|i| i.severity >= Severity::Warning)
}

fn check_roles(config: &Config, issues: &mut Vec<Issue>) {
    if !config.roles().has_reference() {
        issues.push(Issue::new(
            Severity::Error,
            IssueCategory::MissingRole,
            "required role 'reference' is not defined".to_string(),
            names::REFERENCE.to_string(),
        ));
    }
    for role in config.roles().unassigned(&names::RECOMMENDED) {
        issues.push(Issue::new(
            Severity::Warning,
            IssueCategory::MissingRole,
            format!("recommended role '{role}' is not defined"),
            role.to_string(),
        ));
    }

    for (role, cs_name) in config.roles().iter() {
        if config.colorspace(cs_name).is_none() {
            issues.push(Issue::new(
                Severity::Error,
                IssueCategory::MissingColorSpace,
                format!("role '{role}' references non-existent color space '{cs_name}'"),
                role.to_string(),
            ));
        }
    }
}

fn check_displays(config: &Config, issues: &mut Vec<Issue>) {
    let dm = config.displays();
    if dm.displays().is_empty() {
        issues.push(Issue::new(
            Severity::Warning,
            IssueCategory::MissingDisplay,
            "no displays defined".to_string(),
            None::<String>,
        ));
    }

    for view in dm.shared_views() {
        check_view(config, "<shared>", view, issues);
    }

    for display in dm.displays() {
        if display.views().is_empty() && display.shared_views().is_empty() {
            issues.push(Issue::new(
                Severity::Warning,
                IssueCategory::MissingDisplay,
                format!("display '{}' has no views", display.name()),
                display.name().to_string(),
            ));
        }
        for view in display.views() {
            check_view(config, display.name(), view, issues);
        }
        for shared in display.shared_views() {
            if dm.shared_view(shared).is_none() {
                issues.push(Issue::new(
                    Severity::Error,
                    IssueCategory::MissingDisplay,
                    format!("display '{}' references unknown shared view '{shared}'", display.name()),
                    display.name().to_string(),
                ));
            }
        }
    }

    for name in config.active_displays() {
        if dm.display(name).is_none() {
            issues.push(Issue::new(
                Severity::Error,
                IssueCategory::MissingDisplay,
                format!("active display '{name}' is not defined"),
                name.clone(),
            ));
        }
    }
    for name in config.active_views() {
        let known = dm.displays().iter().any(|d| d.view_names().any(|v| v == name))
            || dm.shared_view(name).is_some();
        if !known {
            issues.push(Issue::new(
                Severity::Error,
                IssueCategory::MissingDisplay,
                format!("active view '{name}' is not used by any display"),
                name.clone(),
            ));
        }
    }

    if let Some(vt) = dm.default_view_transform() {
        if dm.view_transform(vt).is_none() {
            issues.push(Issue::new(
                Severity::Error,
                IssueCategory::MissingViewTransform,
                format!("default view transform '{vt}' is not defined"),
                vt.to_string(),
            ));
        }
    }
}

fn check_view(config: &Config, display: &str, view: &crate::display::View, issues: &mut Vec<Issue>) {
    let context = format!("{display}:{}", view.name());

    let cs = view.target_colorspace();
    if cs != crate::display::USE_DISPLAY_NAME && config.colorspace(cs).is_none() {
        issues.push(Issue::new(
            Severity::Error,
            IssueCategory::MissingColorSpace,
            format!(
                "view '{}' in display '{display}' references non-existent color space '{cs}'",
                view.name()
            ),
            context.clone(),
        ));
    }

    if let Some(dcs) = view.display_colorspace() {
        let is_display_referred = config
            .colorspace(dcs)
            .map(|cs| cs.reference_space() == ReferenceSpace::Display)
            .unwrap_or(true);
        if !is_display_referred {
            issues.push(Issue::new(
                Severity::Error,
                IssueCategory::InvalidTransform,
                format!("view '{}' uses scene-referred '{dcs}' as display color space", view.name()),
                context.clone(),
            ));
        }
    }

    if let Some(vt) = view.view_transform() {
        if config.displays().view_transform(vt).is_none() {
            issues.push(Issue::new(
                Severity::Error,
                IssueCategory::MissingViewTransform,
                format!("view '{}' references non-existent view transform '{vt}'", view.name()),
                context.clone(),
            ));
        }
    }

    if let Some(looks) = view.looks() {
        for (look, _) in parse_looks(looks) {
            if config.looks().get(look).is_none() {
                issues.push(Issue::new(
                    Severity::Error,
                    IssueCategory::MissingLook,
                    format!("view '{}' references non-existent look '{look}'", view.name()),
                    context.clone(),
                ));
            }
        }
    }
}

fn check_colorspaces(config: &Config, issues: &mut Vec<Issue>) {
    for cs in config.colorspaces() {
        if cs.is_data() && (cs.to_reference().is_some() || cs.from_reference().is_some()) {
            issues.push(Issue::new(
                Severity::Warning,
                IssueCategory::InvalidTransform,
                format!("data color space '{}' has transforms defined (will be ignored)", cs.name()),
                cs.name().to_string(),
            ));
        }

        for t in cs.to_reference().into_iter().chain(cs.from_reference()) {
            check_transform_refs(config, cs.name(), t, issues);
        }
    }
}

/// Color space transforms must point at defined color spaces.
fn check_transform_refs(config: &Config, owner: &str, transform: &Transform, issues: &mut Vec<Issue>) {
    transform.walk(&mut |t| {
        if let Transform::ColorSpace(c) = t {
            for name in [&c.src, &c.dst] {
                if config.colorspace(name).is_none() {
                    issues.push(Issue::new(
                        Severity::Error,
                        IssueCategory::MissingColorSpace,
                        format!("'{owner}' references non-existent color space '{name}'"),
                        owner.to_string(),
                    ));
                }
            }
        }
    });
}

/// Names and aliases share one namespace across color spaces and named
/// transforms.
fn check_names(config: &Config, issues: &mut Vec<Issue>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut claim = |name: &str, owner: &str, issues: &mut Vec<Issue>| {
        if !seen.insert(name.to_lowercase()) {
            issues.push(Issue::new(
                Severity::Error,
                IssueCategory::Duplicate,
                format!("name '{name}' of '{owner}' is already in use"),
                owner.to_string(),
            ));
        }
    };

    for cs in config.colorspaces() {
        claim(cs.name(), cs.name(), issues);
        for alias in cs.aliases() {
            claim(alias, cs.name(), issues);
        }
    }
    for nt in config.named_transforms() {
        claim(&nt.name, &nt.name, issues);
        for alias in &nt.aliases {
            claim(alias, &nt.name, issues);
        }
        if nt.transform.is_none() && nt.inverse_transform.is_none() {
            issues.push(Issue::new(
                Severity::Error,
                IssueCategory::InvalidTransform,
                format!("named transform '{}' defines no transform", nt.name),
                nt.name.clone(),
            ));
        }
    }

    let mut vts = HashSet::new();
    for vt in config.displays().view_transforms() {
        if !vts.insert(vt.name()) {
            issues.push(Issue::new(
                Severity::Error,
                IssueCategory::Duplicate,
                format!("duplicate view transform '{}'", vt.name()),
                vt.name().to_string(),
            ));
        }
    }

    for name in config.inactive_colorspaces() {
        if config.colorspace(name).is_none() && config.named_transform(name).is_none() {
            issues.push(Issue::new(
                Severity::Warning,
                IssueCategory::MissingColorSpace,
                format!("inactive color space '{name}' is not defined"),
                name.clone(),
            ));
        }
    }
}

fn check_looks(config: &Config, issues: &mut Vec<Issue>) {
    let mut names = HashSet::new();
    for look in config.looks() {
        if !names.insert(look.name()) {
            issues.push(Issue::new(
                Severity::Error,
                IssueCategory::Duplicate,
                format!("duplicate look '{}'", look.name()),
                look.name().to_string(),
            ));
        }
        match look.process_space.as_deref() {
            Some(ps) if config.colorspace(ps).is_none() => issues.push(Issue::new(
                Severity::Error,
                IssueCategory::MissingColorSpace,
                format!("look '{}' uses non-existent process space '{ps}'", look.name()),
                look.name().to_string(),
            )),
            Some(_) => {}
            None => issues.push(Issue::new(
                Severity::Error,
                IssueCategory::MissingColorSpace,
                format!("look '{}' has no process space", look.name()),
                look.name().to_string(),
            )),
        }
    }
}

fn check_file_rules(config: &Config, issues: &mut Vec<Issue>) {
    let rules = config.file_rules();
    match rules.last() {
        Some(last) if last.name == FileRule::DEFAULT => {}
        _ => issues.push(Issue::new(
            Severity::Error,
            IssueCategory::FileRules,
            format!("file rules must end with the '{}' rule", FileRule::DEFAULT),
            None::<String>,
        )),
    }

    for rule in rules {
        if config.colorspace(&rule.colorspace).is_none() {
            issues.push(Issue::new(
                Severity::Error,
                IssueCategory::MissingColorSpace,
                format!(
                    "file rule '{}' references non-existent color space '{}'",
                    rule.name, rule.colorspace
                ),
                rule.name.clone(),
            ));
        }
    }
}

/// Checks that file transforms resolve against the search path.
fn check_files(config: &Config, issues: &mut Vec<Issue>) {
    for path in config.search_paths() {
        if path.is_absolute() && !path.exists() {
            issues.push(Issue::new(
                Severity::Warning,
                IssueCategory::MissingFile,
                format!("search path does not exist: {}", path.display()),
                path.display().to_string(),
            ));
        }
    }

    let mut files = Vec::new();
    let mut collect = |t: &Transform| {
        t.walk(&mut |t| {
            if let Transform::File(f) = t {
                files.push(f.src.clone());
            }
        })
    };
    for cs in config.colorspaces() {
        cs.to_reference().into_iter().chain(cs.from_reference()).for_each(&mut collect);
    }
    for nt in config.named_transforms() {
        nt.transform.iter().chain(&nt.inverse_transform).for_each(&mut collect);
    }

    for src in files {
        let found = if src.is_absolute() {
            src.exists()
        } else {
            config
                .search_paths()
                .iter()
                .filter(|p| p.is_absolute())
                .any(|p| p.join(&src).exists())
                || !config.search_paths().iter().any(|p| p.is_absolute())
        };
        if !found {
            issues.push(Issue::new(
                Severity::Warning,
                IssueCategory::MissingFile,
                format!("file transform source not found: {}", src.display()),
                src.display().to_string(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::{ColorSpace, Encoding};
    use crate::config_builder::ConfigBuilder;
    use crate::display::{Display, View};
    use crate::look::Look;

    fn base() -> ConfigBuilder {
        ConfigBuilder::new("test")
            .add_colorspace(ColorSpace::builder("ACES2065-1").encoding(Encoding::SceneLinear).build())
            .add_colorspace(ColorSpace::builder("Raw").encoding(Encoding::Data).build())
            .set_role("reference", "ACES2065-1")
            .set_role("default", "ACES2065-1")
            .set_role("scene_linear", "ACES2065-1")
            .add_display(Display::new("sRGB - Display").with_view(View::new("Raw", "Raw")))
            .add_file_rule(FileRule::default_rule("ACES2065-1"))
    }

    #[test]
    fn clean_config_has_no_warnings() {
        let config = base().build().unwrap();
        let issues = check(&config);
        assert!(!has_warnings(&issues), "{issues:?}");
    }

    #[test]
    fn check_empty_config() {
        let issues = check(&Config::new());

        assert!(issues.iter().any(|i| i.category == IssueCategory::MissingRole));
        assert!(issues.iter().any(|i| i.category == IssueCategory::MissingDisplay));
        assert!(issues.iter().any(|i| i.category == IssueCategory::FileRules));
        assert!(has_errors(&issues));
    }

    #[test]
    fn missing_view_transform_and_look() {
        let config = base()
            .add_display(
                Display::new("P3-D65 - Display")
                    .with_view(View::with_view_transform("SDR", "Missing VT", "Raw").with_look("Ghost")),
            )
            .build()
            .unwrap();
        let issues = check(&config);

        assert!(issues.iter().any(|i| i.category == IssueCategory::MissingViewTransform));
        assert!(issues.iter().any(|i| i.category == IssueCategory::MissingLook));
        assert!(issues.iter().any(|i| i.category == IssueCategory::InvalidTransform));
    }

    #[test]
    fn duplicate_alias_detected() {
        let config = base()
            .add_colorspace(ColorSpace::builder("ACEScg").alias("raw").build())
            .build()
            .unwrap();
        let issues = check(&config);
        assert!(issues.iter().any(|i| i.category == IssueCategory::Duplicate));
    }

    #[test]
    fn look_process_space_required() {
        let config = base()
            .add_look(Look::new("LMT").with_process_space("Nowhere"))
            .build()
            .unwrap();
        assert!(has_errors(&check(&config)));
    }

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Info.to_string(), "INFO");
        assert_eq!(Severity::Warning.to_string(), "WARN");
        assert_eq!(Severity::Error.to_string(), "ERROR");
    }
}
