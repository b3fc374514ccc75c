//! Transform definitions referenced by generated configs.
//!
//! ACES conversions only need five OCIO transform kinds. CTL programs map to
//! `BuiltinTransform` styles, CLF files to `FileTransform`s, and chains such
//! as RRT followed by an ODT to a `GroupTransform`.

use std::path::PathBuf;

/// `direction:` of a transform node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformDirection {
    /// As authored.
    #[default]
    Forward,
    /// Inverted.
    Inverse,
}

impl TransformDirection {
    /// Flipped direction.
    #[inline]
    pub fn inverse(self) -> Self {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
        }
    }

    /// Parses a direction keyword, `None` for unknown keywords.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "forward" => Some(Self::Forward),
            "inverse" => Some(Self::Inverse),
            _ => None,
        }
    }

    /// YAML keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Inverse => "inverse",
        }
    }
}

/// A transform node of a config.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// `!<BuiltinTransform>`.
    Builtin(BuiltinTransform),

    /// `!<MatrixTransform>`.
    Matrix(MatrixTransform),

    /// `!<FileTransform>`.
    File(FileTransform),

    /// `!<ColorSpaceTransform>`.
    ColorSpace(ColorSpaceTransform),

    /// `!<GroupTransform>`.
    Group(GroupTransform),
}

impl Transform {
    /// Forward builtin of the given style.
    pub fn builtin(style: impl Into<String>) -> Self {
        Self::Builtin(BuiltinTransform {
            style: style.into(),
            direction: TransformDirection::Forward,
        })
    }

    /// Forward matrix with no offset.
    pub fn matrix(m: [f64; 16]) -> Self {
        Self::Matrix(MatrixTransform {
            matrix: m,
            offset: [0.0; 4],
            direction: TransformDirection::Forward,
        })
    }

    /// Forward group of `transforms`, applied in order.
    pub fn group(transforms: Vec<Transform>) -> Self {
        Self::Group(GroupTransform {
            transforms,
            direction: TransformDirection::Forward,
        })
    }

    /// Forward reference to a CLF or LUT file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(FileTransform {
            src: path.into(),
            direction: TransformDirection::Forward,
        })
    }

    /// Forward conversion between two named colour spaces.
    pub fn colorspace(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self::ColorSpace(ColorSpaceTransform {
            src: src.into(),
            dst: dst.into(),
            direction: TransformDirection::Forward,
        })
    }

    /// Collapses a chain of steps: `None` when empty, the step itself when
    /// there is only one, a group otherwise.
    pub fn chain(mut steps: Vec<Transform>) -> Option<Self> {
        match steps.len() {
            0 => None,
            1 => steps.pop(),
            _ => Some(Self::group(steps)),
        }
    }

    /// YAML tag without the `!<>` wrapper.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Builtin(_) => "BuiltinTransform",
            Self::Matrix(_) => "MatrixTransform",
            Self::File(_) => "FileTransform",
            Self::ColorSpace(_) => "ColorSpaceTransform",
            Self::Group(_) => "GroupTransform",
        }
    }

    /// Direction the transform is applied in.
    pub fn direction(&self) -> TransformDirection {
        match self {
            Self::Builtin(t) => t.direction,
            Self::Matrix(t) => t.direction,
            Self::File(t) => t.direction,
            Self::ColorSpace(t) => t.direction,
            Self::Group(t) => t.direction,
        }
    }

    fn direction_mut(&mut self) -> &mut TransformDirection {
        match self {
            Self::Builtin(t) => &mut t.direction,
            Self::Matrix(t) => &mut t.direction,
            Self::File(t) => &mut t.direction,
            Self::ColorSpace(t) => &mut t.direction,
            Self::Group(t) => &mut t.direction,
        }
    }

    /// Same transform with the direction flipped.
    pub fn inverse(mut self) -> Self {
        let dir = self.direction_mut();
        *dir = dir.inverse();
        self
    }

    /// Visits this transform and every nested child, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Transform)) {
        visit(self);
        if let Self::Group(g) = self {
            for child in &g.transforms {
                child.walk(visit);
            }
        }
    }
}

/// OCIO builtin, named by style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinTransform {
    /// Style, e.g. `ACEScsc.Academy.ACEScc_to_ACES`.
    pub style: String,
    /// Direction.
    pub direction: TransformDirection,
}

/// Affine RGBA transform.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixTransform {
    /// Row-major 4x4 coefficients.
    pub matrix: [f64; 16],
    /// Added after the matrix.
    pub offset: [f64; 4],
    /// Direction.
    pub direction: TransformDirection,
}

impl MatrixTransform {
    /// Identity matrix.
    pub const IDENTITY: [f64; 16] = [
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
    ];

    /// Expands a row-major 3x3 matrix into a 4x4 one.
    pub fn from_3x3(m: [f64; 9]) -> [f64; 16] {
        let mut out = Self::IDENTITY;
        for row in 0..3 {
            for col in 0..3 {
                out[row * 4 + col] = m[row * 3 + col];
            }
        }
        out
    }
}

/// Transform loaded from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTransform {
    /// Source file path, resolved against the config search path.
    pub src: PathBuf,
    /// Direction.
    pub direction: TransformDirection,
}

/// Conversion between two colour spaces of the same config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSpaceTransform {
    /// From.
    pub src: String,
    /// To.
    pub dst: String,
    /// Direction.
    pub direction: TransformDirection,
}

/// Transforms run one after another.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTransform {
    /// Steps in forward order.
    pub transforms: Vec<Transform>,
    /// Inverse runs the steps backwards, each inverted.
    pub direction: TransformDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_keywords() {
        assert_eq!(TransformDirection::Inverse.as_str(), "inverse");
        assert_eq!(TransformDirection::parse("Inverse"), Some(TransformDirection::Inverse));
        assert_eq!(TransformDirection::parse("sideways"), None);
    }

    #[test]
    fn chain_collapses() {
        assert!(Transform::chain(Vec::new()).is_none());

        let single = Transform::chain(vec![Transform::builtin("A")]).unwrap();
        assert_eq!(single, Transform::builtin("A"));

        let many = Transform::chain(vec![Transform::builtin("A"), Transform::builtin("B")]).unwrap();
        assert_eq!(many.tag(), "GroupTransform");
    }

    #[test]
    fn group_inverse_keeps_children() {
        let rrt_odt = Transform::chain(vec![
            Transform::builtin("RRT"),
            Transform::file("ODT.Academy.Rec709_100nits_dim.clf"),
        ])
        .unwrap();
        let Transform::Group(inverted) = rrt_odt.inverse() else {
            panic!("expected a group");
        };
        assert_eq!(inverted.direction, TransformDirection::Inverse);
        assert_eq!(inverted.transforms[1].direction(), TransformDirection::Forward);
        assert_eq!(inverted.transforms[0].clone().inverse().inverse(), Transform::builtin("RRT"));
    }

    #[test]
    fn matrix_from_3x3() {
        let m = MatrixTransform::from_3x3([2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 4.0]);
        assert_eq!(m[0], 2.0);
        assert_eq!(m[5], 3.0);
        assert_eq!(m[10], 4.0);
        assert_eq!(m[15], 1.0);
    }

    #[test]
    fn walk_visits_children() {
        let g = Transform::group(vec![Transform::builtin("A"), Transform::builtin("B")]);
        let mut tags = Vec::new();
        g.walk(&mut |t| tags.push(t.tag()));
        assert_eq!(tags, vec!["GroupTransform", "BuiltinTransform", "BuiltinTransform"]);
    }
}
