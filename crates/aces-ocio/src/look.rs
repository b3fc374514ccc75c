//! Looks.
//!
//! Every Look Modification Transform (LMT) of a generated ACES config is
//! emitted as a look processed in `ACES2065-1`; views reference looks by
//! name through a look string such as `"+LMT A, -LMT B"`.
//!
//! # Example
//!
//! ```
//! use aces_ocio::{Look, Transform};
//!
//! let look = Look::new("ACES 1.3 Reference Gamut Compression")
//!     .with_process_space("ACES2065-1")
//!     .with_transform(Transform::builtin("LMT.Academy.GamutCompress"));
//!
//! assert_eq!(look.process_space.as_deref(), Some("ACES2065-1"));
//! ```

use crate::transform::{Transform, TransformDirection};

/// A look: a transform applied in its process space.
#[derive(Debug, Clone, PartialEq)]
pub struct Look {
    /// Look name.
    pub name: String,
    /// Colour space the transform runs in.
    pub process_space: Option<String>,
    /// Free-form description, trailing whitespace trimmed.
    pub description: String,
    /// Forward transform.
    pub transform: Option<Transform>,
    /// Explicit inverse, when the forward transform is not invertible.
    pub inverse_transform: Option<Transform>,
}

impl Look {
    /// Look with no process space and no transform.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            process_space: None,
            description: String::new(),
            transform: None,
            inverse_transform: None,
        }
    }

    /// Returns the look name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the process space.
    pub fn with_process_space(mut self, space: impl Into<String>) -> Self {
        self.process_space = Some(space.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into().trim_end().to_string();
        self
    }

    /// Sets the forward transform.
    pub fn with_transform(mut self, t: Transform) -> Self {
        self.transform = Some(t);
        self
    }

    /// Sets the inverse transform.
    pub fn with_inverse_transform(mut self, t: Transform) -> Self {
        self.inverse_transform = Some(t);
        self
    }
}

/// Looks of a config, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookManager {
    looks: Vec<Look>,
}

impl LookManager {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a look. Duplicates are kept and reported by validation.
    pub fn add(&mut self, look: Look) {
        self.looks.push(look);
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Look> {
        self.looks.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// Iterates in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Look> {
        self.looks.iter()
    }

    /// Number of looks.
    #[inline]
    pub fn len(&self) -> usize {
        self.looks.len()
    }

    /// Whether there are no looks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.looks.is_empty()
    }
}

impl<'a> IntoIterator for &'a LookManager {
    type Item = &'a Look;
    type IntoIter = std::slice::Iter<'a, Look>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Splits a view's look string into look names and directions.
///
/// A leading `-` selects the inverse, `+` or nothing the forward direction.
pub fn parse_looks(looks: &str) -> Vec<(&str, TransformDirection)> {
    looks
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix('-') {
            Some(name) => (name.trim_start(), TransformDirection::Inverse),
            None => (s.trim_start_matches('+').trim_start(), TransformDirection::Forward),
        })
        .collect()
}
