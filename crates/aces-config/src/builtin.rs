//! OpenColorIO builtin styles for ACES CTL transforms.
//!
//! OCIO registers the ACES transforms it implements under its own style
//! names. Academy transforms with a registered counterpart are emitted under
//! that style; an `RRT` followed by an `ODT` folds into the single
//! `ACES-OUTPUT` builtin covering both. Anything else keeps its CTL name.

use aces_ctl::{ACES_REFERENCE, CtlTransform, TransformFamily};
use aces_ocio::Transform;

/// Scene colour spaces with an `<X>_to_ACES2065-1` builtin, keyed by the
/// CTL colour space label.
const SCENE_STYLES: &[(&str, &str)] = &[
    ("ACEScc", "ACEScc_to_ACES2065-1"),
    ("ACEScct", "ACEScct_to_ACES2065-1"),
    ("ACEScg", "ACEScg_to_ACES2065-1"),
    ("ACESproxy10i", "ACESproxy10i_to_ACES2065-1"),
    ("ADX10", "ADX10_to_ACES2065-1"),
    ("ADX16", "ADX16_to_ACES2065-1"),
    ("LogC_EI800_AWG", "ARRI_ALEXA-LOGC-EI800-AWG_to_ACES2065-1"),
    ("CLog2_CinemaGamut", "CANON_CLOG2-CGAMUT_to_ACES2065-1"),
    ("CLog3_CinemaGamut", "CANON_CLOG3-CGAMUT_to_ACES2065-1"),
    ("VLog_VGamut", "PANASONIC_VLOG-VGAMUT_to_ACES2065-1"),
    ("Log3G10_RWG", "RED_LOG3G10-RWG_to_ACES2065-1"),
    ("SLog3_SGamut3", "SONY_SLOG3-SGAMUT3_to_ACES2065-1"),
    ("SLog3_SGamut3Cine", "SONY_SLOG3-SGAMUT3.CINE_to_ACES2065-1"),
    ("Venice_SLog3_SGamut3", "SONY_SLOG3-SGAMUT3-VENICE_to_ACES2065-1"),
    ("Venice_SLog3_SGamut3Cine", "SONY_SLOG3-SGAMUT3.CINE-VENICE_to_ACES2065-1"),
];

/// Look modification transforms, keyed by CTL transform name.
const LOOK_STYLES: &[(&str, &str)] = &[
    ("GamutCompress", "ACES-LMT - ACES 1.3 Reference Gamut Compression"),
    ("ReferenceGamutCompress", "ACES-LMT - ACES 1.3 Reference Gamut Compression"),
];

const OUTPUT_PREFIX: &str = "ACES-OUTPUT - ACES2065-1_to_CIE-XYZ-D65 - ";

/// `ODT` and `RRTODT` outputs, keyed by CTL transform name. Styles drop
/// the common [`OUTPUT_PREFIX`].
const OUTPUT_STYLES: &[(&str, &str)] = &[
    ("Rec709_100nits_dim", "SDR-VIDEO_1.0"),
    ("RGBmonitor_100nits_dim", "SDR-VIDEO_1.0"),
    ("Rec2020_100nits_dim", "SDR-VIDEO_1.0"),
    ("Rec709_D60sim_100nits_dim", "SDR-VIDEO-D60sim-D65_1.0"),
    ("RGBmonitor_D60sim_100nits_dim", "SDR-VIDEO-D60sim-D65_1.0"),
    ("Rec2020_P3D65limited_100nits_dim", "SDR-VIDEO-P3lim_1.1"),
    ("Rec2020_Rec709limited_100nits_dim", "SDR-VIDEO-REC709lim_1.1"),
    ("P3D65_48nits", "SDR-CINEMA_1.0"),
    ("P3D65_Rec709limited_48nits", "SDR-CINEMA-REC709lim_1.1"),
    ("P3D65_D60sim_48nits", "SDR-CINEMA-D60sim-D65_1.1"),
    ("Rec2020_1000nits_15nits_ST2084", "HDR-VIDEO-1000nit-15nit-REC2020lim_1.1"),
    ("Rec2020_2000nits_15nits_ST2084", "HDR-VIDEO-2000nit-15nit-REC2020lim_1.1"),
    ("Rec2020_4000nits_15nits_ST2084", "HDR-VIDEO-4000nit-15nit-REC2020lim_1.1"),
    ("P3D65_1000nits_15nits_ST2084", "HDR-VIDEO-1000nit-15nit-P3lim_1.1"),
    ("P3D65_2000nits_15nits_ST2084", "HDR-VIDEO-2000nit-15nit-P3lim_1.1"),
    ("P3D65_4000nits_15nits_ST2084", "HDR-VIDEO-4000nit-15nit-P3lim_1.1"),
    ("P3D65_108nits_7point2nits_ST2084", "HDR-CINEMA-108nit-7.2nit-P3lim_1.1"),
];

fn lookup<'a>(table: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, style)| *style)
}

fn is_academy(t: &CtlTransform) -> bool {
    t.genus() == "Academy"
}

/// Output builtin of an Academy `ODT`, `InvODT`, `RRTODT` or `InvRRTODT`.
fn output_style(t: &CtlTransform) -> Option<String> {
    if !is_academy(t) {
        return None;
    }
    lookup(OUTPUT_STYLES, t.transform_name()).map(|s| format!("{OUTPUT_PREFIX}{s}"))
}

/// Builtin for a single transform.
///
/// `RRT` and `ODT` alone have no registered counterpart; [`builtin_chain`]
/// folds them when they appear together.
pub(crate) fn builtin_for(t: &CtlTransform) -> Transform {
    use TransformFamily::*;

    let mapped = match t.family() {
        Csc if is_academy(t) => match (t.source(), t.target()) {
            (Some(label), Some(ACES_REFERENCE)) => {
                lookup(SCENE_STYLES, label).map(Transform::builtin)
            }
            (Some(ACES_REFERENCE), Some(label)) => {
                lookup(SCENE_STYLES, label).map(|s| Transform::builtin(s).inverse())
            }
            _ => None,
        },
        Lmt if is_academy(t) => lookup(LOOK_STYLES, t.transform_name()).map(Transform::builtin),
        OutputTransform => output_style(t).map(Transform::builtin),
        InvOutputTransform => output_style(t).map(|s| Transform::builtin(s).inverse()),
        _ => None,
    };
    mapped.unwrap_or_else(|| Transform::builtin(t.name()))
}

/// Builtin chain for a conversion path; `None` when `steps` is empty.
pub(crate) fn builtin_chain(steps: &[&CtlTransform]) -> Option<Transform> {
    use TransformFamily::*;

    let mut out = Vec::with_capacity(steps.len());
    let mut i = 0;
    while i < steps.len() {
        let folded = match (steps[i].family(), steps.get(i + 1).map(|t| t.family())) {
            (Rrt, Some(Odt)) => output_style(steps[i + 1]).map(Transform::builtin),
            (InvOdt, Some(InvRrt)) => output_style(steps[i]).map(|s| Transform::builtin(s).inverse()),
            _ => None,
        };
        match folded {
            Some(t) => {
                out.push(t);
                i += 2;
            }
            None => {
                out.push(builtin_for(steps[i]));
                i += 1;
            }
        }
    }
    Transform::chain(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctl(name: &str) -> CtlTransform {
        CtlTransform::parse(format!("{name}.ctl"), "").unwrap()
    }

    #[test]
    fn scene_styles() {
        assert_eq!(
            builtin_for(&ctl("ACEScsc.Academy.ACEScct_to_ACES")),
            Transform::builtin("ACEScct_to_ACES2065-1")
        );
        assert_eq!(
            builtin_for(&ctl("ACEScsc.Academy.ACES_to_ACEScg")),
            Transform::builtin("ACEScg_to_ACES2065-1").inverse()
        );
        assert_eq!(
            builtin_for(&ctl("ACEScsc.Academy.SLog3_SGamut3_to_ACES")),
            Transform::builtin("SONY_SLOG3-SGAMUT3_to_ACES2065-1")
        );
    }

    #[test]
    fn unmapped_keeps_ctl_name() {
        for name in ["IDT.ARRI.Alexa", "ACEScsc.Vendor.ACEScct_to_ACES", "ODT.Academy.Rec709_100nits_dim", "RRT"] {
            assert_eq!(builtin_for(&ctl(name)), Transform::builtin(name), "{name}");
        }
    }

    #[test]
    fn look_and_output_transform() {
        assert_eq!(
            builtin_for(&ctl("LMT.Academy.GamutCompress")),
            Transform::builtin("ACES-LMT - ACES 1.3 Reference Gamut Compression")
        );
        assert_eq!(
            builtin_for(&ctl("RRTODT.Academy.P3D65_1000nits_15nits_ST2084")),
            Transform::builtin("ACES-OUTPUT - ACES2065-1_to_CIE-XYZ-D65 - HDR-VIDEO-1000nit-15nit-P3lim_1.1")
        );
    }

    #[test]
    fn rrt_and_odt_fold() {
        let csc = ctl("ACEScsc.Academy.ACEScct_to_ACES");
        let rrt = ctl("RRT");
        let odt = ctl("ODT.Academy.Rec709_100nits_dim");
        assert_eq!(
            builtin_chain(&[&csc, &rrt, &odt]),
            Some(Transform::group(vec![
                Transform::builtin("ACEScct_to_ACES2065-1"),
                Transform::builtin("ACES-OUTPUT - ACES2065-1_to_CIE-XYZ-D65 - SDR-VIDEO_1.0"),
            ]))
        );

        let inv_odt = ctl("InvODT.Academy.P3D65_48nits");
        let inv_rrt = ctl("InvRRT");
        assert_eq!(
            builtin_chain(&[&inv_odt, &inv_rrt]),
            Some(Transform::builtin("ACES-OUTPUT - ACES2065-1_to_CIE-XYZ-D65 - SDR-CINEMA_1.0").inverse())
        );

        let custom = ctl("ODT.Studio.Custom_100nits_dim");
        assert_eq!(
            builtin_chain(&[&rrt, &custom]),
            Some(Transform::group(vec![
                Transform::builtin("RRT"),
                Transform::builtin("ODT.Studio.Custom_100nits_dim"),
            ]))
        );
        assert_eq!(builtin_chain(&[]), None);
    }
}
