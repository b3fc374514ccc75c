//! Fluent construction of [`Config`] values.
//!
//! # Example
//!
//! ```
//! use aces_ocio::{ColorSpace, ConfigBuilder, Display, Encoding, View};
//!
//! let config = ConfigBuilder::new("Minimal ACES")
//!     .description("Scene reference and raw data only")
//!     .add_colorspaces([
//!         ColorSpace::builder("ACES2065-1").encoding(Encoding::SceneLinear).family("ACES").build(),
//!         ColorSpace::builder("Raw").encoding(Encoding::Data).build(),
//!     ])
//!     .set_role("aces_interchange", "ACES2065-1")
//!     .set_role("reference", "ACES2065-1")
//!     .add_display(Display::new("sRGB").with_view(View::new("Raw", "Raw")))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.colorspaces().len(), 2);
//! ```

use std::path::PathBuf;

use crate::colorspace::{ColorSpace, ReferenceSpace};
use crate::config::{Config, ConfigVersion, FileRule, NamedTransform};
use crate::display::{Display, View, ViewTransform};
use crate::error::{OcioError, OcioResult};
use crate::look::Look;

/// Assembles a [`Config`] and checks it is self-consistent on [`ConfigBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Empty config called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let mut config = Config::new();
        config.name = name.into();
        Self { config }
    }

    /// Config description, trailing whitespace trimmed.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.config.description = desc.into().trim_end().to_string();
        self
    }

    /// `ocio_profile_version`.
    pub fn version(mut self, version: ConfigVersion) -> Self {
        self.config.version = version;
        self
    }

    /// Appends a `search_path` entry.
    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.search_paths.push(path.into());
        self
    }

    /// Appends one colour space.
    pub fn add_colorspace(mut self, colorspace: ColorSpace) -> Self {
        self.config.colorspaces.push(colorspace);
        self
    }

    /// Appends colour spaces in order.
    pub fn add_colorspaces(mut self, colorspaces: impl IntoIterator<Item = ColorSpace>) -> Self {
        self.config.colorspaces.extend(colorspaces);
        self
    }

    /// Binds a role.
    pub fn set_role(mut self, role: impl Into<String>, colorspace: impl Into<String>) -> Self {
        self.config.roles.define(role, colorspace);
        self
    }

    /// Adds a display, merging with one of the same name.
    pub fn add_display(mut self, display: Display) -> Self {
        self.config.displays.add_display(display);
        self
    }

    /// Adds a shared view.
    pub fn add_shared_view(mut self, view: View) -> Self {
        self.config.displays.add_shared_view(view);
        self
    }

    /// Adds a view transform.
    pub fn add_view_transform(mut self, vt: ViewTransform) -> Self {
        self.config.displays.add_view_transform(vt);
        self
    }

    /// Sets the default view transform.
    pub fn default_view_transform(mut self, name: impl Into<String>) -> Self {
        self.config.displays.set_default_view_transform(name);
        self
    }

    /// Adds a look.
    pub fn add_look(mut self, look: Look) -> Self {
        self.config.looks.add(look);
        self
    }

    /// `active_displays` list.
    pub fn active_displays(mut self, displays: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.active_displays = displays.into_iter().map(Into::into).collect();
        self
    }

    /// `active_views` list.
    pub fn active_views(mut self, views: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.active_views = views.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a named transform.
    pub fn add_named_transform(mut self, transform: NamedTransform) -> Self {
        self.config.named_transforms.push(transform);
        self
    }

    /// `inactive_colorspaces` list.
    pub fn inactive_colorspaces(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.inactive_colorspaces = names.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a file rule.
    pub fn add_file_rule(mut self, rule: FileRule) -> Self {
        self.config.file_rules.push(rule);
        self
    }

    /// Finishes the config. Display-referred colour spaces are moved ahead of
    /// scene-referred ones, keeping their relative order.
    ///
    /// Fails with [`OcioError::NoColorSpaces`], [`OcioError::MissingReferenceRole`]
    /// or [`OcioError::DanglingRole`].
    pub fn build(self) -> OcioResult<Config> {
        let mut config = self.config;
        config
            .colorspaces
            .sort_by_key(|cs| cs.reference_space() == ReferenceSpace::Scene);

        if config.colorspaces.is_empty() {
            return Err(OcioError::NoColorSpaces {
                config: config.name.clone(),
            });
        }
        if !config.roles.has_reference() {
            return Err(OcioError::MissingReferenceRole {
                config: config.name.clone(),
            });
        }
        if let Some((role, cs_name)) = config
            .roles
            .iter()
            .find(|(_, cs_name)| !config.colorspaces.iter().any(|cs| cs.matches_name(cs_name)))
        {
            return Err(OcioError::DanglingRole {
                role: role.to_string(),
                colorspace: cs_name.to_string(),
            });
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::Encoding;

    fn aces() -> ColorSpace {
        ColorSpace::builder("ACES2065-1")
            .encoding(Encoding::SceneLinear)
            .build()
    }

    #[test]
    fn build_minimal() {
        let config = ConfigBuilder::new("Minimal")
            .add_colorspace(aces())
            .set_role("reference", "ACES2065-1")
            .add_file_rule(FileRule::default_rule("ACES2065-1"))
            .build()
            .unwrap();

        assert_eq!(config.name(), "Minimal");
        assert_eq!(config.file_rules().len(), 1);
    }

    #[test]
    fn missing_reference_role() {
        let result = ConfigBuilder::new("NoRef").add_colorspace(aces()).build();
        assert!(matches!(result, Err(OcioError::MissingReferenceRole { .. })));
    }

    #[test]
    fn role_to_unknown_colorspace() {
        let result = ConfigBuilder::new("Dangling")
            .add_colorspace(aces())
            .set_role("reference", "ACES2065-1")
            .set_role("scene_linear", "ACEScg")
            .build();
        assert!(matches!(
            result,
            Err(OcioError::DanglingRole { role, colorspace }) if role == "scene_linear" && colorspace == "ACEScg"
        ));
    }

    #[test]
    fn empty_config_rejected() {
        let result = ConfigBuilder::new("Empty").build();
        assert!(matches!(result, Err(OcioError::NoColorSpaces { .. })));
    }
}
