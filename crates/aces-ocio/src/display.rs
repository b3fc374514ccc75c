//! Displays, views and view transforms.
//!
//! Each output transform of an ACES tree ends up as three linked entries: a
//! view transform holding the RRT/ODT chain from the scene reference, a
//! display colour space on the display reference, and a view on the display
//! that joins the two.
//!
//! # Example
//!
//! ```
//! use aces_ocio::{Display, View};
//!
//! let mut display = Display::new("sRGB");
//! display.add_view(View::with_view_transform(
//!     "SDR Video",
//!     "ACES 1.0 Output - sRGB",
//!     "sRGB - Display",
//! ));
//! display.add_view(View::new("Raw", "Raw"));
//!
//! assert_eq!(display.default_view(), Some("SDR Video"));
//! ```

use crate::transform::Transform;

/// Display colour space placeholder that OCIO replaces with the display name.
pub const USE_DISPLAY_NAME: &str = "<USE_DISPLAY_NAME>";

/// Where a view sends the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewTarget {
    /// Straight into a colour space (`colorspace:`).
    ColorSpace(String),
    /// Through a view transform into a display colour space
    /// (`view_transform:` + `display_colorspace:`).
    ViewTransform {
        /// View transform name.
        view_transform: String,
        /// Display colour space name, possibly [`USE_DISPLAY_NAME`].
        display_colorspace: String,
    },
}

/// A view of a display, or a shared view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    name: String,
    target: ViewTarget,
    looks: Option<String>,
    rule: Option<String>,
    description: String,
}

impl View {
    /// View showing `colorspace` as is, e.g. the `Raw` view.
    pub fn new(name: impl Into<String>, colorspace: impl Into<String>) -> Self {
        Self::with_target(name, ViewTarget::ColorSpace(colorspace.into()))
    }

    /// View rendering through `view_transform` into `display_colorspace`.
    pub fn with_view_transform(
        name: impl Into<String>,
        view_transform: impl Into<String>,
        display_colorspace: impl Into<String>,
    ) -> Self {
        Self::with_target(
            name,
            ViewTarget::ViewTransform {
                view_transform: view_transform.into(),
                display_colorspace: display_colorspace.into(),
            },
        )
    }

    fn with_target(name: impl Into<String>, target: ViewTarget) -> Self {
        Self {
            name: name.into(),
            target,
            looks: None,
            rule: None,
            description: String::new(),
        }
    }

    /// Look string applied before the view, see [`crate::parse_looks`].
    pub fn with_look(mut self, looks: impl Into<String>) -> Self {
        self.looks = Some(looks.into());
        self
    }

    /// Viewing rule restricting which colour spaces may use this view.
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Description, trailing whitespace trimmed.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into().trim_end().to_string();
        self
    }

    /// Name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the view sends the image.
    #[inline]
    pub fn target(&self) -> &ViewTarget {
        &self.target
    }

    /// Target of a `colorspace:` view.
    pub fn colorspace(&self) -> Option<&str> {
        match &self.target {
            ViewTarget::ColorSpace(cs) => Some(cs),
            ViewTarget::ViewTransform { .. } => None,
        }
    }

    /// View transform of a `view_transform:` view.
    pub fn view_transform(&self) -> Option<&str> {
        match &self.target {
            ViewTarget::ViewTransform { view_transform, .. } => Some(view_transform),
            ViewTarget::ColorSpace(_) => None,
        }
    }

    /// Display colour space of a `view_transform:` view.
    pub fn display_colorspace(&self) -> Option<&str> {
        match &self.target {
            ViewTarget::ViewTransform {
                display_colorspace, ..
            } => Some(display_colorspace),
            ViewTarget::ColorSpace(_) => None,
        }
    }

    /// Colour space the view ends in, whichever form it takes.
    pub fn target_colorspace(&self) -> &str {
        match &self.target {
            ViewTarget::ColorSpace(cs) => cs,
            ViewTarget::ViewTransform {
                display_colorspace, ..
            } => display_colorspace,
        }
    }

    /// Look string, if any.
    #[inline]
    pub fn looks(&self) -> Option<&str> {
        self.looks.as_deref()
    }

    /// Viewing rule, if any.
    #[inline]
    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    /// Free-form text.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A display: its own views plus references to shared views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    name: String,
    views: Vec<View>,
    shared_views: Vec<String>,
}

impl Display {
    /// Display without views.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            views: Vec::new(),
            shared_views: Vec::new(),
        }
    }

    /// [`Display::add_view`], builder style.
    pub fn with_view(mut self, view: View) -> Self {
        self.add_view(view);
        self
    }

    /// Name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a view, replacing one of the same name.
    pub fn add_view(&mut self, view: View) {
        match self.views.iter_mut().find(|v| v.name == view.name) {
            Some(existing) => *existing = view,
            None => self.views.push(view),
        }
    }

    /// References a shared view once.
    pub fn add_shared_view(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.shared_views.contains(&name) {
            self.shared_views.push(name);
        }
    }

    /// Own views in declaration order.
    #[inline]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Referenced shared view names.
    #[inline]
    pub fn shared_views(&self) -> &[String] {
        &self.shared_views
    }

    /// Case-insensitive lookup among the own views.
    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name.eq_ignore_ascii_case(name))
    }

    /// First view declared, own views before shared ones.
    pub fn default_view(&self) -> Option<&str> {
        self.view_names().next()
    }

    /// Own view names, then shared view names.
    pub fn view_names(&self) -> impl Iterator<Item = &str> {
        self.views
            .iter()
            .map(|v| v.name.as_str())
            .chain(self.shared_views.iter().map(String::as_str))
    }
}

/// A scene to display conversion shared by views.
///
/// ACES view transforms carry the `RRT` + `ODT` builtin chain in
/// `from_scene_reference`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    name: String,
    family: String,
    categories: Vec<String>,
    description: String,
    from_scene_reference: Option<Transform>,
    to_scene_reference: Option<Transform>,
}

impl ViewTransform {
    /// View transform without transforms.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            family: String::new(),
            categories: Vec::new(),
            description: String::new(),
            from_scene_reference: None,
            to_scene_reference: None,
        }
    }

    /// Name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
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

    /// Free-form text.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Scene reference to display reference.
    #[inline]
    pub fn from_scene_reference(&self) -> Option<&Transform> {
        self.from_scene_reference.as_ref()
    }

    /// Display reference back to the scene reference.
    #[inline]
    pub fn to_scene_reference(&self) -> Option<&Transform> {
        self.to_scene_reference.as_ref()
    }

    /// Sets the family.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    /// Adds a category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Sets the description, trailing whitespace trimmed.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into().trim_end().to_string();
        self
    }

    /// Sets the scene to display transform.
    pub fn with_from_scene_reference(mut self, t: Transform) -> Self {
        self.from_scene_reference = Some(t);
        self
    }

    /// Sets the display to scene transform.
    pub fn with_to_scene_reference(mut self, t: Transform) -> Self {
        self.to_scene_reference = Some(t);
        self
    }
}

/// Displays, shared views and view transforms of a config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayManager {
    displays: Vec<Display>,
    shared_views: Vec<View>,
    view_transforms: Vec<ViewTransform>,
    default_view_transform: Option<String>,
}

impl DisplayManager {
    /// Nothing defined.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a display; views of a display with the same name are merged in.
    pub fn add_display(&mut self, display: Display) {
        match self.displays.iter_mut().find(|d| d.name == display.name) {
            Some(existing) => {
                display.views.into_iter().for_each(|v| existing.add_view(v));
                display
                    .shared_views
                    .into_iter()
                    .for_each(|s| existing.add_shared_view(s));
            }
            None => self.displays.push(display),
        }
    }

    /// Displays in declaration order.
    #[inline]
    pub fn displays(&self) -> &[Display] {
        &self.displays
    }

    /// Case-insensitive display lookup.
    pub fn display(&self, name: &str) -> Option<&Display> {
        self.displays.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// First display declared.
    #[inline]
    pub fn default_display(&self) -> Option<&str> {
        self.display_names().next()
    }

    /// Display names in declaration order.
    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.displays.iter().map(|d| d.name.as_str())
    }

    /// Adds a shared view.
    pub fn add_shared_view(&mut self, view: View) {
        self.shared_views.push(view);
    }

    /// Shared views in declaration order.
    #[inline]
    pub fn shared_views(&self) -> &[View] {
        &self.shared_views
    }

    /// Shared view lookup, exact name.
    pub fn shared_view(&self, name: &str) -> Option<&View> {
        self.shared_views.iter().find(|v| v.name == name)
    }

    /// Adds a view transform.
    pub fn add_view_transform(&mut self, vt: ViewTransform) {
        self.view_transforms.push(vt);
    }

    /// Case-insensitive view transform lookup.
    pub fn view_transform(&self, name: &str) -> Option<&ViewTransform> {
        self.view_transforms
            .iter()
            .find(|vt| vt.name.eq_ignore_ascii_case(name))
    }

    /// View transforms in declaration order.
    #[inline]
    pub fn view_transforms(&self) -> &[ViewTransform] {
        &self.view_transforms
    }

    /// Names the view transform used between the scene and display references.
    pub fn set_default_view_transform(&mut self, name: impl Into<String>) {
        self.default_view_transform = Some(name.into());
    }

    /// `default_view_transform`, if set.
    #[inline]
    pub fn default_view_transform(&self) -> Option<&str> {
        self.default_view_transform.as_deref()
    }
}
