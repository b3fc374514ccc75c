//! Common LUT Format (CLF) transform discovery.
//!
//! Only the `ProcessList` header is read: its `id` and `name` attributes and
//! the `Description`, `InputDescriptor` and `OutputDescriptor` elements. The
//! process nodes themselves are left to OCIO's `FileTransform`.
//!
//! Family and genus come from the directory layout below the root:
//! `<root>/<family>/<genus>/<file>.clf`.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use tracing::{debug, info};

use crate::ctl::{UNDEFINED_GENUS, normalize_colorspace};
use crate::discover::{DiscoveryOptions, check_root, collect_files};
use crate::error::{DiscoveryError, DiscoveryResult};

/// One discovered CLF transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClfTransform {
    path: PathBuf,
    id: String,
    name: String,
    description: String,
    input_descriptor: Option<String>,
    output_descriptor: Option<String>,
    family: String,
    genus: String,
}

impl ClfTransform {
    /// Reads the header of a CLF file; family and genus stay `undefined`.
    pub fn from_file(path: impl AsRef<Path>) -> DiscoveryResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        Self::parse(path, std::io::BufReader::new(file))
    }

    /// Parses a CLF document.
    pub fn parse<R: BufRead>(path: impl AsRef<Path>, reader: R) -> DiscoveryResult<Self> {
        let path = path.as_ref();
        let malformed = |reason: String| DiscoveryError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        let mut xml = Reader::from_reader(reader);
        let mut buf = Vec::new();
        let mut header: Option<(String, String)> = None;
        let mut description: Vec<String> = Vec::new();
        let mut input_descriptor = None;
        let mut output_descriptor = None;
        let mut current: Option<String> = None;
        let mut text = String::new();

        loop {
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if tag == "ProcessList" {
                        let mut id = String::new();
                        let mut name = String::new();
                        for attr in e.attributes().flatten() {
                            let value = attr
                                .decode_and_unescape_value(xml.decoder())
                                .map_err(|e| malformed(format!("bad ProcessList attribute: {e}")))?
                                .into_owned();
                            match attr.key.as_ref() {
                                b"id" => id = value,
                                b"name" => name = value,
                                _ => {}
                            }
                        }
                        header = Some((id, name));
                    } else if header.is_some() {
                        text.clear();
                        current = Some(tag);
                    }
                }
                Ok(Event::Empty(ref e)) if e.name().as_ref() == b"ProcessList" => {
                    return Err(malformed("empty ProcessList".into()));
                }
                Ok(Event::Text(ref e)) => {
                    if current.is_some() {
                        let raw = String::from_utf8_lossy(e);
                        match quick_xml::escape::unescape(&raw) {
                            Ok(unescaped) => text.push_str(&unescaped),
                            Err(_) => text.push_str(&raw),
                        }
                    }
                }
                Ok(Event::GeneralRef(ref e)) => {
                    if current.is_some() {
                        text.push_str(&resolve_reference(e).map_err(malformed)?);
                    }
                }
                Ok(Event::End(ref e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if current.as_deref() == Some(tag.as_str()) {
                        let value = text.trim().to_string();
                        match tag.as_str() {
                            "Description" if !value.is_empty() => description.push(value),
                            "InputDescriptor" => input_descriptor = Some(value),
                            "OutputDescriptor" => output_descriptor = Some(value),
                            _ => {}
                        }
                        current = None;
                    }
                    if tag == "ProcessList" {
                        break;
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(malformed(format!("XML error: {e}"))),
            }
            buf.clear();
        }

        let (id, name) = header.ok_or_else(|| malformed("missing ProcessList element".into()))?;
        let name = if name.is_empty() {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string()
        } else {
            name
        };

        Ok(Self {
            path: path.to_path_buf(),
            id,
            name,
            description: description.join("\n"),
            input_descriptor,
            output_descriptor,
            family: UNDEFINED_GENUS.to_string(),
            genus: UNDEFINED_GENUS.to_string(),
        })
    }

    /// Source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `ProcessList` id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `ProcessList` name, or the file stem when absent.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Description` elements, one per line.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// `InputDescriptor`, when present.
    pub fn input_descriptor(&self) -> Option<&str> {
        self.input_descriptor.as_deref()
    }

    /// `OutputDescriptor`, when present.
    pub fn output_descriptor(&self) -> Option<&str> {
        self.output_descriptor.as_deref()
    }

    /// First directory below the discovery root.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Second directory below the discovery root.
    pub fn genus(&self) -> &str {
        &self.genus
    }

    /// Places the transform in `family` / `genus`.
    pub fn with_taxonomy(mut self, family: impl Into<String>, genus: impl Into<String>) -> Self {
        self.family = family.into();
        self.genus = genus.into();
        self
    }

    /// Colour space the LUT converts from.
    ///
    /// Taken from an `A_to_B` name, falling back to the input descriptor.
    pub fn source(&self) -> Option<String> {
        match self.name.split_once("_to_") {
            Some((a, _)) if !a.is_empty() => Some(normalize_colorspace(a)),
            _ => self.input_descriptor.clone().filter(|s| !s.is_empty()),
        }
    }

    /// Colour space the LUT converts to.
    pub fn target(&self) -> Option<String> {
        match self.name.split_once("_to_") {
            Some((_, b)) if !b.is_empty() => Some(normalize_colorspace(b)),
            _ => self.output_descriptor.clone().filter(|s| !s.is_empty()),
        }
    }
}

/// Expands `&name;` and `&#N;` references, which the reader reports apart
/// from the surrounding text.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, String> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|e| format!("bad character reference: {e}"))?
    {
        return Ok(ch.to_string());
    }
    let name = reference
        .decode()
        .map_err(|e| format!("bad entity reference: {e}"))?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| format!("unknown entity '&{name};'"))
}

/// Discovers every CLF transform under `root`, sorted by path.
pub fn discover_clf_transforms(
    root: impl AsRef<Path>,
    options: &DiscoveryOptions,
) -> DiscoveryResult<Vec<ClfTransform>> {
    let root = root.as_ref();
    check_root(root)?;
    debug!(root = %root.display(), "Discovering CLF transforms");

    let files = collect_files(root, "clf", options)?;
    if files.is_empty() {
        return Err(DiscoveryError::EmptyTree {
            path: root.to_path_buf(),
            kind: "CLF",
        });
    }

    let mut transforms = Vec::with_capacity(files.len());
    for path in files {
        let transform = ClfTransform::from_file(&path)?;
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let mut dirs = relative
            .parent()
            .into_iter()
            .flat_map(|p| p.components())
            .filter_map(|c| c.as_os_str().to_str());
        let family = dirs.next().unwrap_or(UNDEFINED_GENUS).to_string();
        let genus = dirs.next().unwrap_or(UNDEFINED_GENUS).to_string();
        transforms.push(transform.with_taxonomy(family, genus));
    }

    info!(root = %root.display(), count = transforms.len(), "Discovered CLF transforms");
    Ok(transforms)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ProcessList compCLFversion="3" id="urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_Linear_Rec709:1.0" name="AP0 to Linear Rec.709">
    <Description>Convert ACES2065-1 to linear Rec.709 primaries</Description>
    <Description>CLFtransformID: urn:aswf:ocio:transformId:1.0:OCIO:Utility:AP0_to_Linear_Rec709:1.0</Description>
    <InputDescriptor>ACES2065-1</InputDescriptor>
    <OutputDescriptor>Linear Rec.709 &amp; sRGB</OutputDescriptor>
    <Matrix inBitDepth="32f" outBitDepth="32f">
        <Array dim="3 3">
 2.52168618674388 -1.13413098823972 -0.38755519850416
-0.27621675426076  1.37271908766826 -0.09650232689300
-0.01538170256790 -0.15297534316396  1.16835704573186
        </Array>
    </Matrix>
</ProcessList>
"#;

    #[test]
    fn parse_header() {
        let clf = ClfTransform::parse("Utility/AP0_to_Linear_Rec709.clf", CLF.as_bytes()).unwrap();

        assert!(clf.id().starts_with("urn:aswf:ocio:transformId:1.0"));
        assert_eq!(clf.name(), "AP0 to Linear Rec.709");
        assert_eq!(clf.description().lines().count(), 2);
        assert_eq!(clf.input_descriptor(), Some("ACES2065-1"));
        assert_eq!(clf.output_descriptor(), Some("Linear Rec.709 & sRGB"));
        assert_eq!(clf.source().as_deref(), Some("ACES2065-1"));
    }

    #[test]
    fn name_falls_back_to_stem() {
        let doc = r#"<ProcessList id="x"><InputDescriptor>A</InputDescriptor></ProcessList>"#;
        let clf = ClfTransform::parse("dir/Log_to_ACES.clf", doc.as_bytes()).unwrap();
        assert_eq!(clf.name(), "Log_to_ACES");
        assert_eq!(clf.source().as_deref(), Some("Log"));
        assert_eq!(clf.target().as_deref(), Some("ACES2065-1"));
    }

    #[test]
    fn references_are_expanded() {
        let doc = r#"<ProcessList id="urn:x" name="Rec.709 &amp; sRGB &#x2192; P3">
    <Description>Rec.709 &amp; sRGB, &lt;D65&gt; &#169; 2024</Description>
    <InputDescriptor>Rec.709 &amp; sRGB</InputDescriptor>
    <OutputDescriptor>P3 &quot;D65&quot;</OutputDescriptor>
</ProcessList>"#;
        let clf = ClfTransform::parse("Rec709_sRGB.clf", doc.as_bytes()).unwrap();

        assert_eq!(clf.name(), "Rec.709 & sRGB \u{2192} P3");
        assert_eq!(clf.description(), "Rec.709 & sRGB, <D65> \u{a9} 2024");
        assert_eq!(clf.input_descriptor(), Some("Rec.709 & sRGB"));
        assert_eq!(clf.output_descriptor(), Some("P3 \"D65\""));
        assert_eq!(clf.source().as_deref(), Some("Rec.709 & sRGB"));
    }

    #[test]
    fn unknown_entity_is_malformed() {
        let doc = "<ProcessList id=\"x\"><Description>&bogus;</Description></ProcessList>";
        let err = ClfTransform::parse("x.clf", doc.as_bytes()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Malformed { .. }));
    }

    #[test]
    fn not_a_process_list() {
        let err = ClfTransform::parse("x.clf", "<LUT/>".as_bytes()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Malformed { .. }));

        let err = ClfTransform::parse("x.clf", "<ProcessList><a></b></ProcessList>".as_bytes());
        assert!(err.is_err());
    }
}
