//! CTL transform descriptors.
//!
//! A [`CtlTransform`] holds what the generator needs from one `.ctl` file:
//! its identifier, the user facing name, the leading comment block, the
//! colour spaces it converts between and the files it imports.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::transform_id::{AcesTransformId, TransformFamily};

/// Label of the ACES scene reference space.
pub const ACES_REFERENCE: &str = "ACES2065-1";

/// Label of the output colour encoding space the RRT produces.
pub const OCES: &str = "OCES";

/// Genus used when a transform has no namespace.
pub const UNDEFINED_GENUS: &str = "undefined";

/// One discovered CTL transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtlTransform {
    name: String,
    path: PathBuf,
    id: Option<AcesTransformId>,
    user_name: Option<String>,
    description: String,
    family: TransformFamily,
    genus: String,
    transform_name: String,
    source: Option<String>,
    target: Option<String>,
    dependencies: Vec<String>,
}

struct HeaderPatterns {
    transform_id: Regex,
    user_name: Regex,
    import: Regex,
}

fn patterns() -> DiscoveryResult<&'static HeaderPatterns> {
    static PATTERNS: OnceLock<Result<HeaderPatterns, regex::Error>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Ok(HeaderPatterns {
                transform_id: Regex::new(r"<ACEStransformID>\s*(.*?)\s*</ACEStransformID>")?,
                user_name: Regex::new(r"<ACESuserName>\s*(.*?)\s*</ACESuserName>")?,
                import: Regex::new(r#"(?m)^\s*import\s+"([^"]+)"\s*;"#)?,
            })
        })
        .as_ref()
        .map_err(|e| DiscoveryError::Malformed {
            path: PathBuf::new(),
            reason: e.to_string(),
        })
}

impl CtlTransform {
    /// Reads and parses a CTL file.
    pub fn from_file(path: impl AsRef<Path>) -> DiscoveryResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|_| DiscoveryError::Malformed {
            path: path.to_path_buf(),
            reason: "file is not valid UTF-8".into(),
        })?;
        Self::parse(path, &text)
    }

    /// Parses CTL source text; the unique name is the file stem of `path`.
    pub fn parse(path: impl AsRef<Path>, text: &str) -> DiscoveryResult<Self> {
        let path = path.as_ref();
        let malformed = |reason: String| DiscoveryError::Malformed {
            path: path.to_path_buf(),
            reason,
        };
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed("file name is not a valid transform name".into()))?
            .to_string();

        let patterns = patterns()?;

        let id = match patterns.transform_id.captures(text) {
            Some(caps) => {
                let raw = caps.get(1).map_or("", |m| m.as_str());
                Some(raw.parse::<AcesTransformId>().map_err(|e| malformed(e.to_string()))?)
            }
            None => None,
        };
        let user_name = patterns
            .user_name
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|s| !s.is_empty());

        let mut dependencies: Vec<String> = Vec::new();
        for caps in patterns.import.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                let dep = m.as_str().trim_end_matches(".ctl").to_string();
                if !dependencies.contains(&dep) {
                    dependencies.push(dep);
                }
            }
        }

        // Without an identifier the stem carries the same dotted grammar.
        let parsed = id.clone().or_else(|| AcesTransformId::parse_body(&name));
        let (family, genus, transform_name) = match &parsed {
            Some(id) => (
                id.family(),
                id.namespace().unwrap_or(UNDEFINED_GENUS).to_string(),
                id.name().to_string(),
            ),
            None => (TransformFamily::Unknown, UNDEFINED_GENUS.to_string(), name.clone()),
        };
        let (source, target) = derive_endpoints(family, &transform_name).unzip();

        trace!(
            name = %name,
            family = %family,
            dependencies = dependencies.len(),
            "Parsed CTL transform"
        );

        Ok(Self {
            name,
            path: path.to_path_buf(),
            id,
            user_name,
            description: leading_comment(text),
            family,
            genus,
            transform_name,
            source,
            target,
            dependencies,
        })
    }

    /// Unique name: the file stem, e.g. `ACEScsc.Academy.ACEScc_to_ACES`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed `<ACEStransformID>`, when the file declares one.
    pub fn id(&self) -> Option<&AcesTransformId> {
        self.id.as_ref()
    }

    /// `<ACESuserName>`, when the file declares one.
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Leading comment block.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Transform family.
    pub fn family(&self) -> TransformFamily {
        self.family
    }

    /// Namespace, or `undefined`.
    pub fn genus(&self) -> &str {
        &self.genus
    }

    /// Name component of the identifier, e.g. `ACEScc_to_ACES`.
    pub fn transform_name(&self) -> &str {
        &self.transform_name
    }

    /// Colour space this transform converts from.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Colour space this transform converts to.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Imported transform names, in declaration order.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Whether this transform takes part in the conversion graph.
    pub fn is_conversion(&self) -> bool {
        self.source.is_some() && self.target.is_some()
    }
}

/// `ACES` alone means the scene reference.
pub fn normalize_colorspace(label: &str) -> String {
    match label {
        "ACES" => ACES_REFERENCE.to_string(),
        other => other.to_string(),
    }
}

/// Derives `(source, target)` colour space labels from the family and name.
pub fn derive_endpoints(family: TransformFamily, name: &str) -> Option<(String, String)> {
    use TransformFamily::*;

    let label = || normalize_colorspace(name);
    let pair = match family {
        Csc | Utility => {
            let (a, b) = name.split_once("_to_")?;
            if a.is_empty() || b.is_empty() {
                return None;
            }
            (normalize_colorspace(a), normalize_colorspace(b))
        }
        Idt => (label(), ACES_REFERENCE.to_string()),
        InvIdt => (ACES_REFERENCE.to_string(), label()),
        Rrt => (ACES_REFERENCE.to_string(), OCES.to_string()),
        InvRrt => (OCES.to_string(), ACES_REFERENCE.to_string()),
        Odt => (OCES.to_string(), label()),
        InvOdt => (label(), OCES.to_string()),
        OutputTransform => (ACES_REFERENCE.to_string(), label()),
        InvOutputTransform => (label(), ACES_REFERENCE.to_string()),
        Lmt | Library | Unknown => return None,
    };
    Some(pair)
}

/// Extracts the comment block at the top of a CTL file.
///
/// Both `//` line comments and a `/* */` block are accepted; identifier and
/// user name tags are left out.
fn leading_comment(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_block = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if in_block {
            let (content, closed) = match trimmed.split_once("*/") {
                Some((content, _)) => (content, true),
                None => (trimmed, false),
            };
            lines.push(content.trim_start_matches('*').trim().to_string());
            if closed {
                in_block = false;
            }
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("//") {
            lines.push(rest.trim_start_matches('/').trim().to_string());
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            match rest.split_once("*/") {
                Some((content, _)) => lines.push(content.trim().to_string()),
                None => {
                    lines.push(rest.trim().to_string());
                    in_block = true;
                }
            }
        } else if trimmed.is_empty() && lines.is_empty() {
            continue;
        } else if trimmed.is_empty() {
            lines.push(String::new());
        } else {
            break;
        }
    }

    let kept: Vec<String> = lines
        .into_iter()
        .filter(|l| !l.contains("<ACEStransformID>") && !l.contains("<ACESuserName>"))
        .collect();
    collapse_blank_lines(&kept)
}

fn collapse_blank_lines(lines: &[String]) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in lines {
        if line.is_empty() && out.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACESCC: &str = r#"
// <ACEStransformID>urn:ampas:aces:transformId:v1.5:ACEScsc.Academy.ACEScc_to_ACES.a1.0.3</ACEStransformID>
// <ACESuserName>ACEScc to ACES2065-1</ACESuserName>

//
// ACEScsc - Conversion from ACEScc to ACES2065-1
//
// Converts ACEScc logarithmic values to ACES2065-1.
//

import "ACESlib.Transform_Common";
import "ACESlib.Utilities";
import "ACESlib.Utilities";

const float X = 1.0;
"#;

    #[test]
    fn parse_header() {
        let t = CtlTransform::parse("csc/ACEScsc.Academy.ACEScc_to_ACES.ctl", ACESCC).unwrap();

        assert_eq!(t.name(), "ACEScsc.Academy.ACEScc_to_ACES");
        assert_eq!(t.family(), TransformFamily::Csc);
        assert_eq!(t.genus(), "Academy");
        assert_eq!(t.user_name(), Some("ACEScc to ACES2065-1"));
        assert_eq!(t.source(), Some("ACEScc"));
        assert_eq!(t.target(), Some(ACES_REFERENCE));
        assert_eq!(
            t.dependencies(),
            &["ACESlib.Transform_Common".to_string(), "ACESlib.Utilities".to_string()]
        );
        assert_eq!(
            t.description(),
            "ACEScsc - Conversion from ACEScc to ACES2065-1\n\nConverts ACEScc logarithmic values to ACES2065-1."
        );
    }

    #[test]
    fn stem_fallback_without_id() {
        let t = CtlTransform::parse("ODT.Academy.Rec709_100nits_dim.ctl", "void main() {}").unwrap();
        assert!(t.id().is_none());
        assert_eq!(t.family(), TransformFamily::Odt);
        assert_eq!(t.source(), Some(OCES));
        assert_eq!(t.target(), Some("Rec709_100nits_dim"));
        assert_eq!(t.description(), "");
    }

    #[test]
    fn foreign_id_is_malformed() {
        let text = "// <ACEStransformID>urn:example:thing</ACEStransformID>\n";
        let err = CtlTransform::parse("X.ctl", text).unwrap_err();
        assert!(matches!(err, DiscoveryError::Malformed { .. }));
    }

    #[test]
    fn block_comment_description() {
        let text = "/*\n * Utility functions\n * for output transforms\n */\nimport \"ACESlib.Utilities\";\n";
        let t = CtlTransform::parse("ACESlib.ODT_Common.ctl", text).unwrap();
        assert_eq!(t.description(), "Utility functions\nfor output transforms");
        assert_eq!(t.family(), TransformFamily::Library);
        assert!(!t.is_conversion());
    }

    #[test]
    fn endpoints_by_family() {
        use TransformFamily::*;
        let e = |f, n| derive_endpoints(f, n);

        assert_eq!(e(Idt, "Unity"), Some(("Unity".into(), "ACES2065-1".into())));
        assert_eq!(e(InvIdt, "Unity"), Some(("ACES2065-1".into(), "Unity".into())));
        assert_eq!(e(Rrt, "RRT"), Some(("ACES2065-1".into(), "OCES".into())));
        assert_eq!(e(InvRrt, "InvRRT"), Some(("OCES".into(), "ACES2065-1".into())));
        assert_eq!(e(InvOdt, "P3D65_48nits"), Some(("P3D65_48nits".into(), "OCES".into())));
        assert_eq!(
            e(OutputTransform, "P3D65_1000nits_15nits_ST2084"),
            Some(("ACES2065-1".into(), "P3D65_1000nits_15nits_ST2084".into()))
        );
        assert_eq!(e(Utility, "Lin_to_Log2"), Some(("Lin".into(), "Log2".into())));
        assert_eq!(e(Utility, "Unity"), None);
        assert_eq!(e(Lmt, "GamutCompress"), None);
    }
}
