//! Family / genus classification of discovered transforms.
//!
//! CTL transforms are grouped by [`TransformFamily`]; CLF transforms by the
//! family directory they were found in. Both share the same functions
//! through [`Taxon`].

use std::collections::BTreeMap;
use std::fmt;

use crate::clf::ClfTransform;
use crate::ctl::CtlTransform;
use crate::transform_id::TransformFamily;

/// A transform that can be placed in a family / genus taxonomy.
pub trait Taxon {
    /// Family key.
    type Family: Ord + Clone + fmt::Display;

    /// Family the transform belongs to.
    fn taxon_family(&self) -> Self::Family;

    /// Genus inside the family.
    fn taxon_genus(&self) -> &str;

    /// Name listed in the taxonomy.
    fn taxon_name(&self) -> &str;

    /// `(source, target)` colour spaces, when known.
    fn endpoints(&self) -> Option<(String, String)>;
}

impl Taxon for CtlTransform {
    type Family = TransformFamily;

    fn taxon_family(&self) -> TransformFamily {
        self.family()
    }

    fn taxon_genus(&self) -> &str {
        self.genus()
    }

    fn taxon_name(&self) -> &str {
        self.name()
    }

    fn endpoints(&self) -> Option<(String, String)> {
        self.source()
            .zip(self.target())
            .map(|(s, d)| (s.to_string(), d.to_string()))
    }
}

impl Taxon for ClfTransform {
    type Family = String;

    fn taxon_family(&self) -> String {
        self.family().to_string()
    }

    fn taxon_genus(&self) -> &str {
        self.genus()
    }

    fn taxon_name(&self) -> &str {
        self.name()
    }

    fn endpoints(&self) -> Option<(String, String)> {
        self.source().zip(self.target())
    }
}

/// `family -> genus -> transforms`, all levels sorted.
pub type Classification<'a, T = CtlTransform> =
    BTreeMap<<T as Taxon>::Family, BTreeMap<String, Vec<&'a T>>>;

/// Groups transforms by family then genus, keeping input order within a genus.
pub fn classify<'a, T: Taxon + 'a>(
    transforms: impl IntoIterator<Item = &'a T>,
) -> Classification<'a, T> {
    let mut classes: Classification<'a, T> = BTreeMap::new();
    for transform in transforms {
        classes
            .entry(transform.taxon_family())
            .or_default()
            .entry(transform.taxon_genus().to_string())
            .or_default()
            .push(transform);
    }
    classes
}

/// Flattens a classification back into a list, family then genus order.
pub fn unclassify<'a, T: Taxon>(classes: &Classification<'a, T>) -> Vec<&'a T> {
    classes
        .values()
        .flat_map(|genera| genera.values())
        .flat_map(|transforms| transforms.iter().copied())
        .collect()
}

/// Transforms matching `predicate`, in input order.
pub fn filter<'a, T: Taxon + 'a>(
    transforms: impl IntoIterator<Item = &'a T>,
    mut predicate: impl FnMut(&T) -> bool,
) -> Vec<&'a T> {
    transforms.into_iter().filter(|t| predicate(t)).collect()
}

/// Renders the classification as an indented tree.
pub fn format_taxonomy<T: Taxon>(classes: &Classification<'_, T>) -> String {
    let mut out = String::new();
    for (family, genera) in classes {
        out.push_str(&format!("[ {family} ]\n"));
        for (genus, transforms) in genera {
            out.push_str(&format!("  [ {genus} ]\n"));
            for t in transforms {
                match t.endpoints() {
                    Some((s, d)) => out.push_str(&format!("    {} ({s} -> {d})\n", t.taxon_name())),
                    None => out.push_str(&format!("    {}\n", t.taxon_name())),
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::TransformSet;

    fn set() -> TransformSet {
        let names = [
            "ODT.Academy.Rec709_100nits_dim.ctl",
            "ODT.Academy.P3D65_48nits.ctl",
            "IDT.Academy.Unity.ctl",
            "IDT.ARRI.Alexa.ctl",
            "RRT.ctl",
        ];
        TransformSet::from_transforms(names.map(|n| CtlTransform::parse(n, "").unwrap())).unwrap()
    }

    fn clf(name: &str, family: &str, genus: &str) -> ClfTransform {
        let doc = format!(
            "<ProcessList id=\"urn:{name}\" name=\"{name}\">\
             <InputDescriptor>ACES2065-1</InputDescriptor></ProcessList>"
        );
        ClfTransform::parse(format!("{name}.clf"), doc.as_bytes())
            .unwrap()
            .with_taxonomy(family, genus)
    }

    #[test]
    fn classify_by_family_and_genus() {
        let set = set();
        let classes = classify(&set);

        assert_eq!(classes[&TransformFamily::Idt].len(), 2);
        assert_eq!(classes[&TransformFamily::Odt]["Academy"].len(), 2);
        assert_eq!(classes[&TransformFamily::Rrt]["undefined"].len(), 1);
        assert_eq!(unclassify(&classes).len(), set.len());
    }

    #[test]
    fn filter_keeps_order() {
        let set = set();
        let odts = filter(&set, |t| t.family() == TransformFamily::Odt);
        let names: Vec<_> = odts.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["ODT.Academy.P3D65_48nits", "ODT.Academy.Rec709_100nits_dim"]);
    }

    #[test]
    fn taxonomy_text() {
        let set = set();
        let text = format_taxonomy(&classify(&set));
        assert!(text.starts_with("[ idt ]\n  [ ARRI ]\n    IDT.ARRI.Alexa (Alexa -> ACES2065-1)\n"));
        assert!(text.contains("    RRT (ACES2065-1 -> OCES)\n"));
    }

    #[test]
    fn clf_taxonomy() {
        let luts = vec![
            clf("AP0_to_Linear_Rec709", "Utility", "OCIO"),
            clf("ARRI_LogC4_to_ACES", "Input", "ARRI"),
            clf("Sony_SLog3_to_ACES", "Input", "Sony"),
            clf("Loose", "undefined", "undefined"),
        ];

        let classes = classify(&luts);
        assert_eq!(classes["Input"].len(), 2);
        assert_eq!(classes["Utility"]["OCIO"][0].name(), "AP0_to_Linear_Rec709");
        assert_eq!(unclassify(&classes).len(), luts.len());

        let inputs = filter(&luts, |t| t.family() == "Input");
        assert_eq!(inputs.len(), 2);

        assert_eq!(
            format_taxonomy(&classes),
            "[ Input ]\n\
             \x20 [ ARRI ]\n\
             \x20   ARRI_LogC4_to_ACES (ARRI_LogC4 -> ACES2065-1)\n\
             \x20 [ Sony ]\n\
             \x20   Sony_SLog3_to_ACES (Sony_SLog3 -> ACES2065-1)\n\
             [ Utility ]\n\
             \x20 [ OCIO ]\n\
             \x20   AP0_to_Linear_Rec709 (AP0 -> Linear_Rec709)\n\
             [ undefined ]\n\
             \x20 [ undefined ]\n\
             \x20   Loose\n"
        );
    }
}
