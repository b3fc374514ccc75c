//! Colour spaces.
//!
//! Scene-referred colour spaces of an ACES config convert to `ACES2065-1`
//! through builtin transforms; display colour spaces sit on the display
//! reference and carry no transform.
//!
//! # Example
//!
//! ```
//! use aces_ocio::{ColorSpace, Encoding};
//!
//! let acescct = ColorSpace::builder("ACEScct")
//!     .family("ACES")
//!     .encoding(Encoding::Log)
//!     .alias("acescct_ap1")
//!     .build();
//!
//! assert!(acescct.matches_name("ACESCCT_AP1"));
//! assert_eq!(acescct.encoding(), Encoding::Log);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::OcioError;
use crate::transform::Transform;

/// OCIO v2 `encoding` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// `scene-linear`: ACES2065-1, ACEScg, linear camera spaces.
    SceneLinear,
    /// `display-linear`.
    DisplayLinear,
    /// `log`: ACEScc, ACEScct, camera log curves.
    Log,
    /// `sdr-video`: SDR display encodings.
    Sdr,
    /// `hdr-video`: PQ and HLG display encodings.
    Hdr,
    /// `data`: non-colour data such as `Raw`.
    Data,
    /// Not written to the config.
    #[default]
    Unknown,
}

impl Encoding {
    /// Attribute value, empty for [`Encoding::Unknown`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SceneLinear => "scene-linear",
            Self::DisplayLinear => "display-linear",
            Self::Log => "log",
            Self::Sdr => "sdr-video",
            Self::Hdr => "hdr-video",
            Self::Data => "data",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = OcioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "scene-linear" => Self::SceneLinear,
            "display-linear" => Self::DisplayLinear,
            "log" => Self::Log,
            "sdr-video" => Self::Sdr,
            "hdr-video" => Self::Hdr,
            "data" => Self::Data,
            "" => Self::Unknown,
            other => return Err(OcioError::Malformed(format!("unknown encoding '{other}'"))),
        })
    }
}

/// Reference space a color space is defined against (OCIO v2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferenceSpace {
    /// Scene-referred reference (`to_scene_reference`).
    #[default]
    Scene,
    /// Display-referred reference (`to_display_reference`).
    Display,
}

/// A colour space and its conversion to or from its reference space.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpace {
    name: String,
    aliases: Vec<String>,
    description: String,
    /// Slash-separated, e.g. `Input/ARRI`.
    family: String,
    /// `file-io`, `working-space`, ...
    categories: Vec<String>,
    encoding: Encoding,
    is_data: bool,
    reference_space: ReferenceSpace,
    to_reference: Option<Transform>,
    from_reference: Option<Transform>,
}

impl ColorSpace {
    /// Starts a [`ColorSpaceBuilder`].
    #[inline]
    pub fn builder(name: impl Into<String>) -> ColorSpaceBuilder {
        ColorSpaceBuilder::new(name)
    }

    /// Name as emitted.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Other names resolving to this colour space, e.g. the raw name of a
    /// beautified one.
    #[inline]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Free-form text.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// UI grouping.
    #[inline]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Application-facing categories.
    #[inline]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// `encoding` attribute.
    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// `isdata`: pixel values bypass colour processing.
    #[inline]
    pub fn is_data(&self) -> bool {
        self.is_data
    }

    /// Whether this sits on the scene or the display reference.
    #[inline]
    pub fn reference_space(&self) -> ReferenceSpace {
        self.reference_space
    }

    /// Conversion into the reference space (`to_*_reference`).
    #[inline]
    pub fn to_reference(&self) -> Option<&Transform> {
        self.to_reference.as_ref()
    }

    /// Conversion out of the reference space (`from_*_reference`).
    #[inline]
    pub fn from_reference(&self) -> Option<&Transform> {
        self.from_reference.as_ref()
    }

    /// Case-insensitive match against the name and the aliases, the way
    /// OCIO resolves colour space references.
    pub fn matches_name(&self, name: &str) -> bool {
        std::iter::once(&self.name)
            .chain(&self.aliases)
            .any(|n| n.eq_ignore_ascii_case(name))
    }
}

/// Fluent construction of a [`ColorSpace`].
#[derive(Debug)]
pub struct ColorSpaceBuilder {
    inner: ColorSpace,
}

impl ColorSpaceBuilder {
    /// Starts a scene-referred colour space with no transforms.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: ColorSpace {
                name: name.into(),
                aliases: Vec::new(),
                description: String::new(),
                family: String::new(),
                categories: Vec::new(),
                encoding: Encoding::Unknown,
                is_data: false,
                reference_space: ReferenceSpace::Scene,
                to_reference: None,
                from_reference: None,
            },
        }
    }

    /// Adds an alias; the name itself and repeats are ignored.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if alias != self.inner.name && !self.inner.aliases.contains(&alias) {
            self.inner.aliases.push(alias);
        }
        self
    }

    /// Description, trailing whitespace trimmed.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.inner.description = desc.into().trim_end().to_string();
        self
    }

    /// UI grouping, `/` separated.
    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.inner.family = family.into();
        self
    }

    /// Adds a category once.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        if !self.inner.categories.contains(&category) {
            self.inner.categories.push(category);
        }
        self
    }

    /// Encoding; [`Encoding::Data`] also sets `isdata`.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.inner.encoding = encoding;
        self.inner.is_data |= encoding == Encoding::Data;
        self
    }

    /// Sets `isdata`.
    pub fn is_data(mut self, is_data: bool) -> Self {
        self.inner.is_data = is_data;
        self
    }

    /// Scene (default) or display reference.
    pub fn reference_space(mut self, space: ReferenceSpace) -> Self {
        self.inner.reference_space = space;
        self
    }

    /// Conversion into the reference.
    pub fn to_reference(mut self, transform: Transform) -> Self {
        self.inner.to_reference = Some(transform);
        self
    }

    /// Conversion out of the reference.
    pub fn from_reference(mut self, transform: Transform) -> Self {
        self.inner.from_reference = Some(transform);
        self
    }

    /// Finishes the colour space.
    pub fn build(self) -> ColorSpace {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beautified_name_keeps_raw_alias() {
        let acescct = ColorSpace::builder("ACEScct")
            .alias("ACES - ACEScct")
            .alias("ACEScct")
            .alias("ACES - ACEScct")
            .category("working-space")
            .category("working-space")
            .encoding(Encoding::Log)
            .to_reference(Transform::builtin("ACEScsc.Academy.ACEScct_to_ACES"))
            .description("Convert ACEScct to ACES2065-1\n\n")
            .build();

        assert_eq!(acescct.aliases(), ["ACES - ACEScct"]);
        assert_eq!(acescct.categories(), ["working-space"]);
        assert_eq!(acescct.description(), "Convert ACEScct to ACES2065-1");
        assert!(acescct.matches_name("aces - acescct"));
        assert!(acescct.matches_name("ACESCCT"));
        assert!(!acescct.matches_name("ACEScc"));
        assert!(acescct.from_reference().is_none());
        assert!(!acescct.is_data());
    }

    #[test]
    fn data_encoding_implies_isdata() {
        let raw = ColorSpace::builder("Raw").encoding(Encoding::Data).build();
        assert!(raw.is_data());
        assert_eq!(raw.reference_space(), ReferenceSpace::Scene);
    }

    #[test]
    fn encoding_attribute() {
        assert_eq!("scene-linear".parse::<Encoding>().unwrap(), Encoding::SceneLinear);
        assert_eq!("hdr-video".parse::<Encoding>().unwrap(), Encoding::Hdr);
        assert_eq!("".parse::<Encoding>().unwrap(), Encoding::Unknown);
        assert!("linear".parse::<Encoding>().is_err());
        assert_eq!(Encoding::Sdr.to_string(), "sdr-video");
    }
}
