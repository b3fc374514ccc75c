//! OCIO configuration model and `.ocio` parsing.
//!
//! [`Config`] is the in-memory form of a generated configuration. It can be
//! serialized with [`Config::to_yaml_string`] and read back with
//! [`Config::from_yaml_str`]; the two are inverses of each other for every
//! config this crate produces.
//!
//! # Example
//!
//! ```ignore
//! use aces_ocio::Config;
//!
//! let config = Config::from_file("cg-config.ocio")?;
//!
//! for cs in config.colorspaces() {
//!     println!("{}: {}", cs.name(), cs.family());
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, trace};

use crate::colorspace::{ColorSpace, Encoding, ReferenceSpace};
use crate::display::{Display, DisplayManager, View, ViewTransform};
use crate::error::{OcioError, OcioResult};
use crate::look::{Look, LookManager};
use crate::role::Roles;
use crate::transform::*;

/// An OCIO v2 config.
///
/// Built with [`crate::ConfigBuilder`] or parsed from YAML; fields are read
/// through accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) version: ConfigVersion,
    /// As written, relative to the config file.
    pub(crate) search_paths: Vec<PathBuf>,
    /// Display-referred first, then scene-referred.
    pub(crate) colorspaces: Vec<ColorSpace>,
    pub(crate) roles: Roles,
    pub(crate) displays: DisplayManager,
    pub(crate) looks: LookManager,
    pub(crate) named_transforms: Vec<NamedTransform>,
    pub(crate) active_displays: Vec<String>,
    pub(crate) active_views: Vec<String>,
    pub(crate) inactive_colorspaces: Vec<String>,
    /// `Default` last.
    pub(crate) file_rules: Vec<FileRule>,
}

/// Config profile version, e.g. `2.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl ConfigVersion {
    /// OCIO 2.0 profile.
    pub const V2_0: Self = Self { major: 2, minor: 0 };
    /// OCIO 2.1 profile.
    pub const V2_1: Self = Self { major: 2, minor: 1 };
    /// OCIO 2.2 profile.
    pub const V2_2: Self = Self { major: 2, minor: 2 };

    /// Parses `"2"`, `"2.1"`; only major version 2 is supported.
    pub fn parse(s: &str) -> OcioResult<Self> {
        let unsupported = || OcioError::UnsupportedVersion { version: s.to_string() };
        let mut parts = s.trim().splitn(2, '.');
        let major: u32 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(unsupported)?;
        let minor: u32 = match parts.next() {
            Some(p) => p.parse().map_err(|_| unsupported())?,
            None => 0,
        };
        if major != 2 {
            return Err(unsupported());
        }
        Ok(Self { major, minor })
    }
}

impl Default for ConfigVersion {
    fn default() -> Self {
        Self::V2_1
    }
}

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Entry of the `file_rules` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRule {
    /// Rule name. The `Default` rule must come last.
    pub name: String,
    /// Assigned color space.
    pub colorspace: String,
    /// Glob pattern on the file path.
    pub pattern: Option<String>,
    /// Extension filter.
    pub extension: Option<String>,
}

impl FileRule {
    /// Name of the mandatory catch-all rule.
    pub const DEFAULT: &'static str = "Default";

    /// Creates the catch-all rule.
    pub fn default_rule(colorspace: impl Into<String>) -> Self {
        Self {
            name: Self::DEFAULT.to_string(),
            colorspace: colorspace.into(),
            pattern: None,
            extension: None,
        }
    }
}

/// Named transform (OCIO v2.0+): a transform usable without a color space.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTransform {
    /// Name.
    pub name: String,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// Family.
    pub family: String,
    /// Categories.
    pub categories: Vec<String>,
    /// Encoding.
    pub encoding: Encoding,
    /// Description.
    pub description: String,
    /// Forward transform.
    pub transform: Option<Transform>,
    /// Inverse transform.
    pub inverse_transform: Option<Transform>,
}

impl NamedTransform {
    /// Creates a named transform with a forward transform.
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            family: String::new(),
            categories: Vec::new(),
            encoding: Encoding::Unknown,
            description: String::new(),
            transform: Some(transform),
            inverse_transform: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Nameless config with nothing in it.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            version: ConfigVersion::default(),
            search_paths: Vec::new(),
            colorspaces: Vec::new(),
            roles: Roles::new(),
            displays: DisplayManager::new(),
            looks: LookManager::new(),
            named_transforms: Vec::new(),
            active_displays: Vec::new(),
            active_views: Vec::new(),
            inactive_colorspaces: Vec::new(),
            file_rules: Vec::new(),
        }
    }

    /// Reads and parses an `.ocio` file.
    pub fn from_file(path: impl AsRef<Path>) -> OcioResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OcioError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        debug!(path = %path.display(), "Loading OCIO config");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parses OCIO YAML, `!<Tag>` nodes included.
    pub fn from_yaml_str(yaml: &str) -> OcioResult<Self> {
        let normalized = normalize_tags(yaml)?;
        let raw: RawConfig = serde_yaml::from_str(&normalized)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> OcioResult<Self> {
        let version = match &raw.ocio_profile_version {
            Value::Number(n) => ConfigVersion::parse(&n.to_string())?,
            Value::String(s) => ConfigVersion::parse(s)?,
            other => {
                return Err(OcioError::UnsupportedVersion {
                    version: format!("{other:?}"),
                })
            }
        };

        let mut config = Self {
            name: raw.name.unwrap_or_default(),
            description: raw.description.unwrap_or_default().trim_end().to_string(),
            version,
            search_paths: raw
                .search_path
                .map(|s| s.split(':').filter(|p| !p.is_empty()).map(PathBuf::from).collect())
                .unwrap_or_default(),
            active_displays: raw.active_displays.unwrap_or_default(),
            active_views: raw.active_views.unwrap_or_default(),
            inactive_colorspaces: raw.inactive_colorspaces.unwrap_or_default(),
            ..Self::new()
        };

        for (role, cs) in raw.roles.unwrap_or_default() {
            config.roles.define(role, cs);
        }

        for raw_rule in raw.file_rules.unwrap_or_default() {
            config.file_rules.push(FileRule {
                name: raw_rule.name,
                colorspace: raw_rule.colorspace,
                pattern: raw_rule.pattern,
                extension: raw_rule.extension,
            });
        }

        for raw_view in raw.shared_views.unwrap_or_default() {
            config.displays.add_shared_view(raw_view.into_view()?);
        }

        if let Some(displays) = raw.displays {
            for (name, entries) in displays {
                let name = name
                    .as_str()
                    .ok_or_else(|| OcioError::Malformed("display name is not a string".into()))?;
                let entries: Vec<RawDisplayEntry> = serde_yaml::from_value(entries)?;
                let mut display = Display::new(name);
                for entry in entries {
                    match entry {
                        RawDisplayEntry::View(raw_view) => display.add_view(raw_view.into_view()?),
                        RawDisplayEntry::Shared(names) => {
                            for shared in names {
                                display.add_shared_view(shared);
                            }
                        }
                    }
                }
                config.displays.add_display(display);
            }
        }

        if let Some(vt) = raw.default_view_transform {
            config.displays.set_default_view_transform(vt);
        }

        for raw_look in raw.looks.unwrap_or_default() {
            let mut look =
                Look::new(&raw_look.name).with_description(raw_look.description.unwrap_or_default());
            look.process_space = raw_look.process_space;
            look.transform = raw_look.transform.as_ref().map(transform_from_value).transpose()?;
            look.inverse_transform = raw_look
                .inverse_transform
                .as_ref()
                .map(transform_from_value)
                .transpose()?;
            config.looks.add(look);
        }

        for raw_vt in raw.view_transforms.unwrap_or_default() {
            let mut vt = ViewTransform::new(&raw_vt.name)
                .with_family(raw_vt.family.unwrap_or_default())
                .with_description(raw_vt.description.unwrap_or_default());
            for category in raw_vt.categories.unwrap_or_default() {
                vt = vt.with_category(category);
            }
            if let Some(t) = raw_vt.from_scene_reference {
                vt = vt.with_from_scene_reference(transform_from_value(&t)?);
            }
            if let Some(t) = raw_vt.to_scene_reference {
                vt = vt.with_to_scene_reference(transform_from_value(&t)?);
            }
            config.displays.add_view_transform(vt);
        }

        for raw_cs in raw.display_colorspaces.unwrap_or_default() {
            let cs = raw_cs.into_colorspace(ReferenceSpace::Display)?;
            config.colorspaces.push(cs);
        }
        for raw_cs in raw.colorspaces.unwrap_or_default() {
            let cs = raw_cs.into_colorspace(ReferenceSpace::Scene)?;
            config.colorspaces.push(cs);
        }

        for raw_nt in raw.named_transforms.unwrap_or_default() {
            config.named_transforms.push(NamedTransform {
                name: raw_nt.name,
                aliases: raw_nt.aliases.unwrap_or_default(),
                family: raw_nt.family.unwrap_or_default(),
                categories: raw_nt.categories.unwrap_or_default(),
                encoding: raw_nt.encoding.as_deref().map(str::parse::<Encoding>).transpose()?.unwrap_or_default(),
                description: raw_nt.description.unwrap_or_default().trim_end().to_string(),
                transform: raw_nt.transform.as_ref().map(transform_from_value).transpose()?,
                inverse_transform: raw_nt
                    .inverse_transform
                    .as_ref()
                    .map(transform_from_value)
                    .transpose()?,
            });
        }

        trace!(
            colorspaces = config.colorspaces.len(),
            displays = config.displays.displays().len(),
            "Parsed OCIO config"
        );
        Ok(config)
    }

    /// `name:` of the config.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Config description.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// `ocio_profile_version`.
    #[inline]
    pub fn version(&self) -> ConfigVersion {
        self.version
    }

    /// `search_path` entries.
    #[inline]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Every colour space, in emitted order.
    #[inline]
    pub fn colorspaces(&self) -> &[ColorSpace] {
        &self.colorspaces
    }

    /// Colour spaces of one reference space.
    pub fn colorspaces_in(&self, space: ReferenceSpace) -> impl Iterator<Item = &ColorSpace> {
        self.colorspaces
            .iter()
            .filter(move |cs| cs.reference_space() == space)
    }

    /// Colour space by role, name or alias, case-insensitive.
    pub fn colorspace(&self, name: &str) -> Option<&ColorSpace> {
        if let Some(cs_name) = self.roles.get(name) {
            return self.colorspaces.iter().find(|cs| cs.matches_name(cs_name));
        }
        self.colorspaces.iter().find(|cs| cs.matches_name(name))
    }

    /// Role bindings.
    #[inline]
    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    /// Displays, shared views and view transforms.
    #[inline]
    pub fn displays(&self) -> &DisplayManager {
        &self.displays
    }

    /// Looks.
    #[inline]
    pub fn looks(&self) -> &LookManager {
        &self.looks
    }

    /// Named transforms.
    #[inline]
    pub fn named_transforms(&self) -> &[NamedTransform] {
        &self.named_transforms
    }

    /// Named transform by name or alias, case-insensitive.
    pub fn named_transform(&self, name: &str) -> Option<&NamedTransform> {
        self.named_transforms.iter().find(|nt| {
            nt.name.eq_ignore_ascii_case(name)
                || nt.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
        })
    }

    /// `active_displays` list.
    #[inline]
    pub fn active_displays(&self) -> &[String] {
        &self.active_displays
    }

    /// `active_views` list.
    #[inline]
    pub fn active_views(&self) -> &[String] {
        &self.active_views
    }

    /// `inactive_colorspaces` list.
    #[inline]
    pub fn inactive_colorspaces(&self) -> &[String] {
        &self.inactive_colorspaces
    }

    /// File rules in match order.
    #[inline]
    pub fn file_rules(&self) -> &[FileRule] {
        &self.file_rules
    }

    /// First active display, else the first display declared.
    pub fn default_display(&self) -> Option<&str> {
        self.active_displays
            .first()
            .map(String::as_str)
            .or_else(|| self.displays.default_display())
    }

    /// First view of `display`.
    pub fn default_view(&self, display: &str) -> Option<&str> {
        self.displays
            .display(display)
            .and_then(|d| d.default_view())
    }
}

/// Rewrites OCIO's verbatim `!<Tag>` syntax into something serde_yaml reads.
///
/// Structural tags (`!<ColorSpace>`, `!<View>`, ...) carry no information and
/// are dropped; transform tags become plain local tags (`!BuiltinTransform`).
fn normalize_tags(yaml: &str) -> OcioResult<String> {
    static STRUCTURAL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    static TRANSFORM: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

    let structural = STRUCTURAL
        .get_or_init(|| {
            Regex::new(r"!<(?:ColorSpace|NamedTransform|ViewTransform|SharedView|Views|View|Look|Rule)> ?")
        })
        .as_ref()
        .map_err(|e| OcioError::Malformed(e.to_string()))?;
    let transform = TRANSFORM
        .get_or_init(|| Regex::new(r"!<([A-Za-z]+Transform)>"))
        .as_ref()
        .map_err(|e| OcioError::Malformed(e.to_string()))?;

    let stripped = structural.replace_all(yaml, "");
    Ok(transform.replace_all(&stripped, "!$1").into_owned())
}

/// Converts a tagged YAML node into a transform.
fn transform_from_value(value: &Value) -> OcioResult<Transform> {
    let Value::Tagged(tagged) = value else {
        return Err(OcioError::InvalidTransform {
            reason: format!("expected a tagged transform, got {value:?}"),
        });
    };
    let tag = tagged.tag.to_string();
    let tag = tag.trim_start_matches('!');

    let empty = Mapping::new();
    let map = match &tagged.value {
        Value::Mapping(m) => m,
        Value::Null => &empty,
        other => {
            return Err(OcioError::InvalidTransform {
                reason: format!("{tag} body is not a mapping: {other:?}"),
            })
        }
    };

    let direction = match map.get("direction").and_then(Value::as_str) {
        Some(d) => TransformDirection::parse(d).ok_or_else(|| OcioError::InvalidTransform {
            reason: format!("unknown direction '{d}' in {tag}"),
        })?,
        None => TransformDirection::Forward,
    };
    let required_str = |key: &str| -> OcioResult<String> {
        map.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| OcioError::InvalidTransform {
                reason: format!("{tag} is missing '{key}'"),
            })
    };

    let transform = match tag {
        "BuiltinTransform" => Transform::Builtin(BuiltinTransform {
            style: required_str("style")?,
            direction,
        }),
        "FileTransform" => Transform::File(FileTransform {
            src: PathBuf::from(required_str("src")?),
            direction,
        }),
        "ColorSpaceTransform" => Transform::ColorSpace(ColorSpaceTransform {
            src: required_str("src")?,
            dst: required_str("dst")?,
            direction,
        }),
        "MatrixTransform" => {
            let mut matrix = MatrixTransform::IDENTITY;
            if let Some(values) = map.get("matrix") {
                read_floats(values, &mut matrix, tag)?;
            }
            let mut offset = [0.0; 4];
            if let Some(values) = map.get("offset") {
                read_floats(values, &mut offset, tag)?;
            }
            Transform::Matrix(MatrixTransform { matrix, offset, direction })
        }
        "GroupTransform" => {
            let children = match map.get("children") {
                Some(Value::Sequence(seq)) => seq
                    .iter()
                    .map(transform_from_value)
                    .collect::<OcioResult<Vec<_>>>()?,
                Some(other) => {
                    return Err(OcioError::InvalidTransform {
                        reason: format!("GroupTransform children is not a list: {other:?}"),
                    })
                }
                None => Vec::new(),
            };
            Transform::Group(GroupTransform { transforms: children, direction })
        }
        other => {
            return Err(OcioError::InvalidTransform {
                reason: format!("unsupported transform type '{other}'"),
            })
        }
    };
    Ok(transform)
}

/// Reads a fixed-size float list.
fn read_floats(value: &Value, out: &mut [f64], tag: &str) -> OcioResult<()> {
    let seq = value.as_sequence().ok_or_else(|| OcioError::InvalidTransform {
        reason: format!("{tag} values are not a list"),
    })?;
    if seq.len() != out.len() {
        return Err(OcioError::InvalidTransform {
            reason: format!("{tag} expects {} values, got {}", out.len(), seq.len()),
        });
    }
    for (slot, v) in out.iter_mut().zip(seq) {
        *slot = v.as_f64().ok_or_else(|| OcioError::InvalidTransform {
            reason: format!("{tag} value {v:?} is not a number"),
        })?;
    }
    Ok(())
}

// Document shapes as serde sees them after tag normalisation.

#[derive(Debug, Deserialize)]
struct RawConfig {
    ocio_profile_version: Value,
    name: Option<String>,
    description: Option<String>,
    search_path: Option<String>,
    roles: Option<BTreeMap<String, String>>,
    file_rules: Option<Vec<RawFileRule>>,
    shared_views: Option<Vec<RawView>>,
    displays: Option<Mapping>,
    active_displays: Option<Vec<String>>,
    active_views: Option<Vec<String>>,
    inactive_colorspaces: Option<Vec<String>>,
    default_view_transform: Option<String>,
    looks: Option<Vec<RawLook>>,
    view_transforms: Option<Vec<RawViewTransform>>,
    display_colorspaces: Option<Vec<RawColorSpace>>,
    colorspaces: Option<Vec<RawColorSpace>>,
    named_transforms: Option<Vec<RawNamedTransform>>,
}

#[derive(Debug, Deserialize)]
struct RawColorSpace {
    name: String,
    aliases: Option<Vec<String>>,
    family: Option<String>,
    description: Option<String>,
    isdata: Option<bool>,
    categories: Option<Vec<String>>,
    encoding: Option<String>,
    to_scene_reference: Option<Value>,
    from_scene_reference: Option<Value>,
    to_display_reference: Option<Value>,
    from_display_reference: Option<Value>,
}

impl RawColorSpace {
    fn into_colorspace(self, space: ReferenceSpace) -> OcioResult<ColorSpace> {
        let mut builder = ColorSpace::builder(&self.name)
            .family(self.family.unwrap_or_default())
            .description(self.description.unwrap_or_default())
            .reference_space(space);

        for alias in self.aliases.unwrap_or_default() {
            builder = builder.alias(alias);
        }
        for category in self.categories.unwrap_or_default() {
            builder = builder.category(category);
        }
        if let Some(encoding) = self.encoding {
            builder = builder.encoding(encoding.parse::<Encoding>()?);
        }
        if let Some(is_data) = self.isdata {
            builder = builder.is_data(is_data);
        }

        let (to, from) = match space {
            ReferenceSpace::Scene => (self.to_scene_reference, self.from_scene_reference),
            ReferenceSpace::Display => (self.to_display_reference, self.from_display_reference),
        };
        if let Some(t) = to {
            builder = builder.to_reference(transform_from_value(&t)?);
        }
        if let Some(t) = from {
            builder = builder.from_reference(transform_from_value(&t)?);
        }

        Ok(builder.build())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDisplayEntry {
    View(RawView),
    Shared(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawView {
    name: String,
    colorspace: Option<String>,
    view_transform: Option<String>,
    display_colorspace: Option<String>,
    looks: Option<String>,
    rule: Option<String>,
    description: Option<String>,
}

impl RawView {
    fn into_view(self) -> OcioResult<View> {
        let mut view = match (self.colorspace, self.view_transform, self.display_colorspace) {
            (Some(cs), None, None) => View::new(self.name, cs),
            (None, Some(vt), Some(dcs)) => View::with_view_transform(self.name, vt, dcs),
            _ => {
                return Err(OcioError::Malformed(format!(
                    "view '{}' needs either a colorspace or a view_transform with display_colorspace",
                    self.name
                )))
            }
        };
        if let Some(looks) = self.looks {
            view = view.with_look(looks);
        }
        if let Some(rule) = self.rule {
            view = view.with_rule(rule);
        }
        if let Some(desc) = self.description {
            view = view.with_description(desc);
        }
        Ok(view)
    }
}

#[derive(Debug, Deserialize)]
struct RawLook {
    name: String,
    process_space: Option<String>,
    description: Option<String>,
    transform: Option<Value>,
    inverse_transform: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawViewTransform {
    name: String,
    description: Option<String>,
    family: Option<String>,
    categories: Option<Vec<String>>,
    from_scene_reference: Option<Value>,
    to_scene_reference: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawFileRule {
    name: String,
    colorspace: String,
    pattern: Option<String>,
    extension: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNamedTransform {
    name: String,
    aliases: Option<Vec<String>>,
    family: Option<String>,
    categories: Option<Vec<String>>,
    encoding: Option<String>,
    description: Option<String>,
    transform: Option<Value>,
    inverse_transform: Option<Value>,
}
