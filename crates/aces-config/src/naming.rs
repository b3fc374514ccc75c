//! Name derivation for generated config entries.

use aces_ocio::Encoding;
use regex::Regex;

use crate::profile::Replacement;

/// Applies every `(pattern, replacement)` pair in order.
///
/// ```
/// use aces_config::naming::multi_replace;
/// use regex::Regex;
///
/// let rules = vec![
///     (Regex::new("Rec709").unwrap(), "Rec.709".to_string()),
///     (Regex::new("_").unwrap(), " ".to_string()),
/// ];
/// assert_eq!(multi_replace("Rec709_100nits_dim", &rules), "Rec.709 100nits dim");
/// ```
pub fn multi_replace(name: &str, rules: &[(Regex, String)]) -> String {
    rules.iter().fold(name.to_string(), |acc, (pattern, replacement)| {
        pattern.replace_all(&acc, replacement.as_str()).into_owned()
    })
}

/// Compiled beautification rules of a profile.
#[derive(Debug, Clone, Default)]
pub struct Beautifier {
    rules: Vec<(Regex, String)>,
}

impl Beautifier {
    /// Compiles the rules.
    pub fn new(rules: &[Replacement]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|r| Ok((Regex::new(&r.pattern)?, r.replacement.clone())))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// Whether there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrites `name`, then collapses runs of whitespace.
    pub fn apply(&self, name: &str) -> String {
        multi_replace(name, &self.rules)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output transform label split into its parts.
///
/// `P3D65_1000nits_15nits_ST2084` reads as display `P3D65`, peak luminance
/// 1000 nits and EOTF `ST2084`; `Rec709_D60sim_100nits_dim` as display
/// `Rec709`, 100 nits, qualifier `D60sim`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
    /// Display primaries / encoding token.
    pub display: String,
    /// Peak luminance, first `<n>nits` token.
    pub peak_nits: Option<u32>,
    /// Explicit EOTF token (`ST2084`, `HLG`, `PQ`).
    pub eotf: Option<String>,
    /// Remaining tokens, e.g. `D60sim`.
    pub qualifiers: Vec<String>,
}

const EOTFS: [&str; 3] = ["ST2084", "HLG", "PQ"];
const SURROUNDS: [&str; 3] = ["dim", "dark", "normal"];

impl OutputName {
    /// Splits an output label on `_`.
    pub fn parse(label: &str) -> Self {
        let mut tokens = label.split('_').filter(|t| !t.is_empty());
        let display = tokens.next().unwrap_or(label).to_string();
        let mut peak_nits = None;
        let mut eotf = None;
        let mut qualifiers = Vec::new();

        for token in tokens {
            if let Some(n) = token.strip_suffix("nits") {
                // Later luminance tokens describe the black or surround level.
                if peak_nits.is_none() {
                    peak_nits = n.parse().ok();
                }
            } else if EOTFS.contains(&token) {
                eotf = Some(token.to_string());
            } else if !SURROUNDS.contains(&token) {
                qualifiers.push(token.to_string());
            }
        }

        Self {
            display,
            peak_nits,
            eotf,
            qualifiers,
        }
    }

    /// Key naming the display: primaries plus EOTF, e.g. `Rec2020_ST2084`.
    pub fn display_key(&self) -> String {
        match &self.eotf {
            Some(eotf) => format!("{}_{eotf}", self.display),
            None => self.display.clone(),
        }
    }

    /// Whether this is an HDR output.
    pub fn is_hdr(&self) -> bool {
        self.eotf.is_some() || self.peak_nits.is_some_and(|n| n > 100)
    }

    /// Encoding of the display colour space.
    pub fn encoding(&self) -> Encoding {
        if self.is_hdr() { Encoding::Hdr } else { Encoding::Sdr }
    }

    /// View name: `SDR Video` up to 100 nits, `SDR Cinema` at 48 nits,
    /// `HDR Video (N nits)` above 100; qualifiers go in parentheses.
    pub fn view_name(&self) -> String {
        let mut notes: Vec<String> = Vec::new();
        let base = match self.peak_nits {
            Some(48) => "SDR Cinema",
            Some(n) if n > 100 => {
                notes.push(format!("{n} nits"));
                "HDR Video"
            }
            _ if self.eotf.is_some() => "HDR Video",
            _ => "SDR Video",
        };
        notes.extend(self.qualifiers.iter().cloned());
        if notes.is_empty() {
            base.to_string()
        } else {
            format!("{base} ({})", notes.join(", "))
        }
    }
}

/// Best guess of a scene colour-space encoding from its label.
pub fn guess_encoding(label: &str) -> Encoding {
    let lower = label.to_ascii_lowercase();
    if lower.contains("log") || lower == "acescc" || lower == "acescct" || lower.contains("proxy") {
        Encoding::Log
    } else if lower.starts_with("aces") || lower.contains("lin") || lower == "unity" {
        Encoding::SceneLinear
    } else {
        Encoding::Unknown
    }
}

/// One-line description of a conversion.
pub fn conversion_description(source: &str, target: &str) -> String {
    format!("Convert {source} to {target}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beautifier() -> Beautifier {
        let rule = |p: &str, r: &str| Replacement {
            pattern: p.into(),
            replacement: r.into(),
        };
        Beautifier::new(&[
            rule("_to_", " to "),
            rule("Rec709", "Rec.709"),
            rule(r"(\d+)nits", "${1} nits"),
            rule("_", " "),
        ])
        .unwrap()
    }

    #[test]
    fn beautify_names() {
        let b = beautifier();
        assert_eq!(b.apply("Rec709_100nits_dim"), "Rec.709 100 nits dim");
        assert_eq!(b.apply("ACEScct_to_ACES"), "ACEScct to ACES");
        assert_eq!(b.apply("ACEScg"), "ACEScg");
        assert!(Beautifier::default().is_empty());
    }

    #[test]
    fn output_names() {
        let sdr = OutputName::parse("Rec709_100nits_dim");
        assert_eq!(sdr.display_key(), "Rec709");
        assert_eq!(sdr.view_name(), "SDR Video");
        assert_eq!(sdr.encoding(), Encoding::Sdr);

        let cinema = OutputName::parse("P3D65_48nits");
        assert_eq!(cinema.view_name(), "SDR Cinema");

        let hdr = OutputName::parse("P3D65_1000nits_15nits_ST2084");
        assert_eq!(hdr.display_key(), "P3D65_ST2084");
        assert_eq!(hdr.peak_nits, Some(1000));
        assert_eq!(hdr.view_name(), "HDR Video (1000 nits)");
        assert_eq!(hdr.encoding(), Encoding::Hdr);

        let sim = OutputName::parse("Rec709_D60sim_100nits_dim");
        assert_eq!(sim.view_name(), "SDR Video (D60sim)");

        let bare = OutputName::parse("RGBmonitor");
        assert_eq!(bare.display_key(), "RGBmonitor");
        assert_eq!(bare.view_name(), "SDR Video");
    }

    #[test]
    fn encodings() {
        assert_eq!(guess_encoding("ACEScct"), Encoding::Log);
        assert_eq!(guess_encoding("ACEScg"), Encoding::SceneLinear);
        assert_eq!(guess_encoding("Alexa-v3-logC-EI800"), Encoding::Log);
        assert_eq!(guess_encoding("Sony_SLog3"), Encoding::Log);
        assert_eq!(guess_encoding("Rec709"), Encoding::Unknown);
    }
}
