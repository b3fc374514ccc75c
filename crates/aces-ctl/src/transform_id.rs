//! ACES transform identifiers and families.
//!
//! Every reference CTL file carries an identifier such as
//! `urn:ampas:aces:transformId:v1.5:ODT.Academy.RGBmonitor_100nits_dim.a1.0.3`.
//! The part after the URN prefix reads `<type>.<namespace>.<name>.<version>`,
//! where the namespace is absent for a few types (`RRT`, `ACESlib`, ...).
//!
//! # Example
//!
//! ```
//! use aces_ctl::{AcesTransformId, TransformFamily};
//!
//! let id: AcesTransformId =
//!     "urn:ampas:aces:transformId:v1.5:ACEScsc.Academy.ACEScc_to_ACES.a1.0.3".parse().unwrap();
//!
//! assert_eq!(id.family(), TransformFamily::Csc);
//! assert_eq!(id.namespace(), Some("Academy"));
//! assert_eq!(id.name(), "ACEScc_to_ACES");
//! assert_eq!(id.version(), Some("a1.0.3"));
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// URN prefix shared by all ACES transform identifiers.
pub const URN_PREFIX: &str = "urn:ampas:aces:transformId:";

/// Transform family, derived from the identifier type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransformFamily {
    /// Colour space conversion (`ACEScsc`).
    Csc,
    /// Input transform (`IDT`).
    Idt,
    /// Inverse input transform (`InvIDT`).
    InvIdt,
    /// Look modification transform (`LMT`).
    Lmt,
    /// Reference rendering transform (`RRT`).
    Rrt,
    /// Inverse reference rendering transform (`InvRRT`).
    InvRrt,
    /// Output device transform (`ODT`).
    Odt,
    /// Inverse output device transform (`InvODT`).
    InvOdt,
    /// Combined RRT + ODT (`RRTODT`).
    OutputTransform,
    /// Inverse combined output transform (`InvRRTODT`).
    InvOutputTransform,
    /// Shared CTL library (`ACESlib`).
    Library,
    /// Utility transform (`ACESutil`).
    Utility,
    /// Anything else.
    Unknown,
}

impl TransformFamily {
    /// All families, in display order.
    pub const ALL: [Self; 13] = [
        Self::Csc,
        Self::Idt,
        Self::InvIdt,
        Self::Lmt,
        Self::Rrt,
        Self::InvRrt,
        Self::Odt,
        Self::InvOdt,
        Self::OutputTransform,
        Self::InvOutputTransform,
        Self::Library,
        Self::Utility,
        Self::Unknown,
    ];

    /// Maps an identifier type token to its family.
    pub fn from_type(token: &str) -> Self {
        match token {
            "ACEScsc" => Self::Csc,
            "IDT" => Self::Idt,
            "InvIDT" => Self::InvIdt,
            "LMT" => Self::Lmt,
            "RRT" => Self::Rrt,
            "InvRRT" => Self::InvRrt,
            "ODT" => Self::Odt,
            "InvODT" => Self::InvOdt,
            "RRTODT" => Self::OutputTransform,
            "InvRRTODT" => Self::InvOutputTransform,
            "ACESlib" => Self::Library,
            "ACESutil" => Self::Utility,
            _ => Self::Unknown,
        }
    }

    /// Parses a family keyword as used in profiles (`csc`, `odt`, `output_transform`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        let family = match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "csc" | "acescsc" => Self::Csc,
            "idt" => Self::Idt,
            "inv_idt" | "invidt" => Self::InvIdt,
            "lmt" => Self::Lmt,
            "rrt" => Self::Rrt,
            "inv_rrt" | "invrrt" => Self::InvRrt,
            "odt" => Self::Odt,
            "inv_odt" | "invodt" => Self::InvOdt,
            "output_transform" | "rrtodt" => Self::OutputTransform,
            "inv_output_transform" | "invrrtodt" => Self::InvOutputTransform,
            "library" | "lib" | "aceslib" => Self::Library,
            "utility" | "util" | "acesutil" => Self::Utility,
            "unknown" => Self::Unknown,
            _ => return None,
        };
        Some(family)
    }

    /// Profile keyword for this family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csc => "csc",
            Self::Idt => "idt",
            Self::InvIdt => "inv_idt",
            Self::Lmt => "lmt",
            Self::Rrt => "rrt",
            Self::InvRrt => "inv_rrt",
            Self::Odt => "odt",
            Self::InvOdt => "inv_odt",
            Self::OutputTransform => "output_transform",
            Self::InvOutputTransform => "inv_output_transform",
            Self::Library => "library",
            Self::Utility => "utility",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this is an inverse family.
    pub fn is_inverse(&self) -> bool {
        matches!(
            self,
            Self::InvIdt | Self::InvRrt | Self::InvOdt | Self::InvOutputTransform
        )
    }
}

impl fmt::Display for TransformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed ACES transform identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AcesTransformId {
    raw: String,
    aces_version: Option<String>,
    kind: String,
    namespace: Option<String>,
    name: String,
    version: Option<String>,
}

impl AcesTransformId {
    /// Parses the dotted body of an identifier, e.g. `ODT.Academy.Rec709_100nits_dim.a1.0.3`,
    /// or a bare file stem such as `ODT.Academy.Rec709_100nits_dim`.
    pub fn parse_body(body: &str) -> Option<Self> {
        let body = body.trim();
        if body.is_empty() {
            return None;
        }
        let components: Vec<&str> = body.split('.').collect();
        let split = components
            .iter()
            .position(|c| is_version_start(c))
            .unwrap_or(components.len());
        let (named, versioned) = components.split_at(split);
        if named.is_empty() || named.iter().any(|c| c.is_empty()) {
            return None;
        }

        let kind = named[0].to_string();
        let (namespace, name) = match named.len() {
            1 => (None, named[0].to_string()),
            2 => (None, named[1].to_string()),
            _ => (Some(named[1].to_string()), named[2..].join(".")),
        };
        let version = (!versioned.is_empty()).then(|| versioned.join("."));

        Some(Self {
            raw: body.to_string(),
            aces_version: None,
            kind,
            namespace,
            name,
            version,
        })
    }

    /// The identifier as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// ACES release of the URN, e.g. `v1.5`.
    pub fn aces_version(&self) -> Option<&str> {
        self.aces_version.as_deref()
    }

    /// Type token, e.g. `ODT` or `ACEScsc`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Family derived from the type token.
    pub fn family(&self) -> TransformFamily {
        TransformFamily::from_type(&self.kind)
    }

    /// Namespace, e.g. `Academy`, when present.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Transform name, e.g. `RGBmonitor_100nits_dim`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transform version, e.g. `a1.0.3`.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Version components start with `a<digits>`, e.g. `a1` in `a1.0.3`.
fn is_version_start(component: &str) -> bool {
    let mut chars = component.chars();
    chars.next() == Some('a') && {
        let rest: Vec<char> = chars.collect();
        !rest.is_empty() && rest.iter().all(char::is_ascii_digit)
    }
}

/// Error returned when a string is not an ACES transform URN.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not an ACES transform identifier: '{0}'")]
pub struct InvalidTransformId(pub String);

impl FromStr for AcesTransformId {
    type Err = InvalidTransformId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || InvalidTransformId(s.to_string());
        let rest = s.strip_prefix(URN_PREFIX).ok_or_else(invalid)?;

        let (aces_version, body) = match rest.split_once(':') {
            Some((v, body)) if v.starts_with('v') => (Some(v.to_string()), body),
            Some(_) => return Err(invalid()),
            None => (None, rest),
        };

        let mut id = Self::parse_body(body).ok_or_else(invalid)?;
        id.raw = s.to_string();
        id.aces_version = aces_version;
        Ok(id)
    }
}

impl fmt::Display for AcesTransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
