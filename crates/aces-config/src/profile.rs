//! Config profiles.
//!
//! A profile selects which transforms of the graph end up in a config and
//! how they are named. Profiles are YAML documents; the three built-in ones
//! are compiled into the crate and custom ones can be loaded from disk.
//!
//! ```yaml
//! name: cg
//! profile_version: 0.1.0
//! aces_version: "1.3"
//! ocio_version: "2.1"
//! naming: beautified
//! families: [csc, odt, output_transform]
//! include: ['^ACEScsc\.Academy\.ACEScg_to_ACES$']
//! roles:
//!   reference: ACES2065-1
//!   scene_linear: ACEScg
//! required: [ACEScg]
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use aces_ctl::TransformFamily;
use aces_ocio::ConfigVersion;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GenerationError, GenerationResult};
use crate::naming::Beautifier;

const REFERENCE_YAML: &str = include_str!("../profiles/reference.yaml");
const CG_YAML: &str = include_str!("../profiles/cg.yaml");
const STUDIO_YAML: &str = include_str!("../profiles/studio.yaml");

/// Built-in profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigProfile {
    /// Every transform of the reference implementation, raw names.
    Reference,
    /// Minimal computer graphics config.
    Cg,
    /// Broad studio config with beautified names.
    Studio,
}

impl ConfigProfile {
    /// All built-in profiles.
    pub const ALL: [Self; 3] = [Self::Reference, Self::Cg, Self::Studio];

    /// Profile keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Cg => "cg",
            Self::Studio => "studio",
        }
    }

    /// Embedded YAML source.
    pub fn source(&self) -> &'static str {
        match self {
            Self::Reference => REFERENCE_YAML,
            Self::Cg => CG_YAML,
            Self::Studio => STUDIO_YAML,
        }
    }

    /// Parses the embedded profile.
    pub fn spec(&self) -> GenerationResult<ProfileSpec> {
        ProfileSpec::from_yaml_str(self.source())
    }
}

impl fmt::Display for ConfigProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigProfile {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" | "ref" => Ok(Self::Reference),
            "cg" => Ok(Self::Cg),
            "studio" => Ok(Self::Studio),
            _ => Err(GenerationError::UnknownProfile(s.to_string())),
        }
    }
}

/// How colour-space and view-transform names are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Naming {
    /// Names derived directly from transform names.
    #[default]
    Raw,
    /// Raw names rewritten by the profile's `beautify` rules; the raw name
    /// is kept as an alias.
    Beautified,
}

/// What goes into colour-space and view-transform descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionStyle {
    /// No description.
    None,
    /// The CTL leading comment blocks.
    Aces,
    /// A generated one-liner such as `Convert ACEScct to ACES2065-1`.
    Opencolorio,
    /// The `<ACESuserName>` values, or the generated one-liner.
    #[default]
    Short,
    /// The CTL comment blocks, or the generated one-liner.
    Long,
    /// [`Self::Short`] followed by the transform IDs and user names.
    ShortUnion,
    /// [`Self::Long`] followed by the transform IDs and user names.
    LongUnion,
}

/// One `pattern -> replacement` beautification rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Regular expression.
    pub pattern: String,
    /// Replacement, `${1}` style groups allowed.
    pub replacement: String,
}

/// Profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSpec {
    /// Short name, used in the config name (`cg`, `studio`, ...).
    pub name: String,
    /// Config description.
    #[serde(default)]
    pub description: String,
    /// Profile release, e.g. `0.1.0`.
    pub profile_version: String,
    /// ACES release the config targets, e.g. `1.3`.
    pub aces_version: String,
    /// OCIO profile version of the emitted config.
    #[serde(default = "default_ocio_version")]
    pub ocio_version: String,
    /// Naming convention.
    #[serde(default)]
    pub naming: Naming,
    /// Description style.
    #[serde(default)]
    pub description_style: DescriptionStyle,
    /// Transform families to turn into config entries.
    pub families: Vec<String>,
    /// Transform-name regexes; when non-empty a transform must match one.
    #[serde(default)]
    pub include: Vec<String>,
    /// Transform-name regexes excluding transforms.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Role name to colour-space label.
    #[serde(default)]
    pub roles: BTreeMap<String, String>,
    /// Colour-space labels that must be generated.
    #[serde(default)]
    pub required: Vec<String>,
    /// Colour-space name regexes listed as inactive.
    #[serde(default)]
    pub inactive: Vec<String>,
    /// Beautification rules, applied in order.
    #[serde(default)]
    pub beautify: Vec<Replacement>,
}

fn default_ocio_version() -> String {
    "2.1".to_string()
}

impl ProfileSpec {
    /// Parses a profile document.
    pub fn from_yaml_str(yaml: &str) -> GenerationResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        spec.compile()?;
        debug!(profile = %spec.name, families = spec.families.len(), "Loaded profile");
        Ok(spec)
    }

    /// Reads a profile document from disk.
    pub fn from_file(path: impl AsRef<Path>) -> GenerationResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GenerationError::ProfileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Name used in the generated config: `<name>-config-v<profile>_aces-v<aces>_ocio-v<ocio>`.
    pub fn config_name(&self) -> String {
        format!(
            "{}-config-v{}_aces-v{}_ocio-v{}",
            self.name, self.profile_version, self.aces_version, self.ocio_version
        )
    }

    /// Checks and compiles the regexes and keywords of this profile.
    pub fn compile(&self) -> GenerationResult<CompiledProfile> {
        let invalid = |reason: String| GenerationError::InvalidProfile {
            profile: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("empty name".into()));
        }
        let version = ConfigVersion::parse(&self.ocio_version).map_err(|e| invalid(e.to_string()))?;

        let mut families = Vec::with_capacity(self.families.len());
        for keyword in &self.families {
            let family = TransformFamily::parse(keyword)
                .ok_or_else(|| invalid(format!("unknown transform family '{keyword}'")))?;
            if !families.contains(&family) {
                families.push(family);
            }
        }
        if families.is_empty() {
            return Err(invalid("no transform family selected".into()));
        }

        let regexes = |patterns: &[String], what: &str| -> GenerationResult<Vec<Regex>> {
            patterns
                .iter()
                .map(|p| Regex::new(p).map_err(|e| invalid(format!("bad {what} pattern '{p}': {e}"))))
                .collect()
        };

        Ok(CompiledProfile {
            version,
            families,
            include: regexes(&self.include, "include")?,
            exclude: regexes(&self.exclude, "exclude")?,
            inactive: regexes(&self.inactive, "inactive")?,
            beautifier: Beautifier::new(&self.beautify).map_err(|e| invalid(e.to_string()))?,
        })
    }
}

/// A profile with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    /// OCIO profile version.
    pub version: ConfigVersion,
    /// Selected families.
    pub families: Vec<TransformFamily>,
    /// Include patterns.
    pub include: Vec<Regex>,
    /// Exclude patterns.
    pub exclude: Vec<Regex>,
    /// Inactive colour-space patterns.
    pub inactive: Vec<Regex>,
    /// Compiled beautification rules.
    pub beautifier: Beautifier,
}

impl CompiledProfile {
    /// Whether a transform of `family` named `name` is selected.
    pub fn selects(&self, family: TransformFamily, name: &str) -> bool {
        self.families.contains(&family)
            && (self.include.is_empty() || self.include.iter().any(|r| r.is_match(name)))
            && !self.exclude.iter().any(|r| r.is_match(name))
    }

    /// Whether a colour-space name is listed as inactive.
    pub fn is_inactive(&self, name: &str) -> bool {
        self.inactive.iter().any(|r| r.is_match(name))
    }
}
