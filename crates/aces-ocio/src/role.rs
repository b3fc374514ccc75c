//! Roles: purpose names bound to colour spaces.
//!
//! Generated ACES configs always bind `reference` and `aces_interchange` to
//! `ACES2065-1` and `data` to `Raw`; the working-space roles come from the
//! profile.

use std::collections::BTreeMap;

/// Role names used by ACES configs.
pub mod names {
    /// Scene reference, mandatory.
    pub const REFERENCE: &str = "reference";
    /// Colour space assumed for untagged files.
    pub const DEFAULT: &str = "default";
    /// Non-colour data.
    pub const DATA: &str = "data";
    /// Linear working space.
    pub const SCENE_LINEAR: &str = "scene_linear";
    /// Renderer working space.
    pub const RENDERING: &str = "rendering";
    /// Log space for compositing operations.
    pub const COMPOSITING_LOG: &str = "compositing_log";
    /// Grading space.
    pub const COLOR_TIMING: &str = "color_timing";
    /// Texture painting space.
    pub const TEXTURE_PAINT: &str = "texture_paint";
    /// Matte painting space.
    pub const MATTE_PAINT: &str = "matte_paint";
    /// Colour picker space.
    pub const COLOR_PICKING: &str = "color_picking";
    /// ACES2065-1 interchange.
    pub const ACES_INTERCHANGE: &str = "aces_interchange";
    /// CIE XYZ D65 display interchange.
    pub const CIE_XYZ_D65_INTERCHANGE: &str = "cie_xyz_d65_interchange";

    /// Roles a usable config should bind besides `reference`.
    pub const RECOMMENDED: [&str; 2] = [DEFAULT, SCENE_LINEAR];
}

/// Role bindings, ordered by role name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles {
    mapping: BTreeMap<String, String>,
}

impl Roles {
    /// No bindings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `role` to `colorspace`, returning the previous binding.
    pub fn define(&mut self, role: impl Into<String>, colorspace: impl Into<String>) -> Option<String> {
        self.mapping.insert(role.into(), colorspace.into())
    }

    /// Colour space bound to `role`.
    #[inline]
    pub fn get(&self, role: &str) -> Option<&str> {
        self.mapping.get(role).map(String::as_str)
    }

    /// Whether `role` is bound.
    #[inline]
    pub fn contains(&self, role: &str) -> bool {
        self.mapping.contains_key(role)
    }

    /// `(role, colour space)` pairs in role order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mapping.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Roles of `wanted` that are not bound.
    pub fn unassigned<'a>(&self, wanted: &[&'a str]) -> Vec<&'a str> {
        wanted.iter().copied().filter(|role| !self.contains(role)).collect()
    }

    /// Number of bindings.
    #[inline]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Whether nothing is bound.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Whether `reference` is bound.
    #[inline]
    pub fn has_reference(&self) -> bool {
        self.contains(names::REFERENCE)
    }

    /// Colour space bound to `reference`.
    #[inline]
    pub fn reference(&self) -> Option<&str> {
        self.get(names::REFERENCE)
    }

    /// Colour space bound to `scene_linear`.
    #[inline]
    pub fn scene_linear(&self) -> Option<&str> {
        self.get(names::SCENE_LINEAR)
    }
}

impl<R: Into<String>, C: Into<String>> FromIterator<(R, C)> for Roles {
    fn from_iter<I: IntoIterator<Item = (R, C)>>(iter: I) -> Self {
        let mut roles = Self::new();
        for (role, colorspace) in iter {
            roles.define(role, colorspace);
        }
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebinding_returns_previous() {
        let mut roles = Roles::new();
        assert_eq!(roles.define(names::SCENE_LINEAR, "ACEScg"), None);
        assert_eq!(roles.define(names::SCENE_LINEAR, "ACES2065-1").as_deref(), Some("ACEScg"));
        assert_eq!(roles.scene_linear(), Some("ACES2065-1"));
        assert!(!roles.has_reference());
    }

    #[test]
    fn unassigned_roles() {
        let roles: Roles = [("reference", "ACES2065-1"), ("default", "ACES2065-1")]
            .into_iter()
            .collect();
        assert_eq!(roles.unassigned(&names::RECOMMENDED), vec!["scene_linear"]);
        assert_eq!(roles.reference(), Some("ACES2065-1"));
    }

    #[test]
    fn ordered_by_role() {
        let roles: Roles = [("texture_paint", "ACEScct"), ("aces_interchange", "ACES2065-1"), ("data", "Raw")]
            .into_iter()
            .collect();
        let keys: Vec<_> = roles.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["aces_interchange", "data", "texture_paint"]);
    }
}
