//! Config generation over a synthetic ACES reference tree.

use std::fs;
use std::path::Path;

use aces_config::*;
use aces_ctl::{DiscoveryOptions, TransformGraph, discover_clf_transforms, discover_ctl_transforms};
use aces_ocio::{Config, ReferenceSpace, Transform, validate};
use tempfile::TempDir;

/// `(directory, file stem, user name, imports)`
const TREE: &[(&str, &str, &str, &[&str])] = &[
    ("lib", "ACESlib.Utilities", "", &[]),
    ("lib", "ACESlib.Transform_Common", "", &["ACESlib.Utilities"]),
    ("lib", "ACESlib.ODT_Common", "", &["ACESlib.Transform_Common"]),
    ("csc/ACEScc", "ACEScsc.Academy.ACEScc_to_ACES", "ACEScc to ACES2065-1", &["ACESlib.Transform_Common"]),
    ("csc/ACEScc", "ACEScsc.Academy.ACES_to_ACEScc", "ACES2065-1 to ACEScc", &["ACESlib.Transform_Common"]),
    ("csc/ACEScct", "ACEScsc.Academy.ACEScct_to_ACES", "ACEScct to ACES2065-1", &["ACESlib.Transform_Common"]),
    ("csc/ACEScct", "ACEScsc.Academy.ACES_to_ACEScct", "ACES2065-1 to ACEScct", &["ACESlib.Transform_Common"]),
    ("csc/ACEScg", "ACEScsc.Academy.ACEScg_to_ACES", "ACEScg to ACES2065-1", &["ACESlib.Transform_Common"]),
    ("csc/ACEScg", "ACEScsc.Academy.ACES_to_ACEScg", "ACES2065-1 to ACEScg", &["ACESlib.Transform_Common"]),
    ("idt/arri", "IDT.ARRI.Alexa-v3-logC-EI800", "", &["ACESlib.Utilities"]),
    ("idt/sony", "IDT.Sony.SLog3_SGamut3", "Sony S-Log3 S-Gamut3", &[]),
    ("lmt", "LMT.Academy.ReferenceGamutCompress", "ACES 1.3 Look - Reference Gamut Compress", &[]),
    ("rrt", "RRT", "ACES 1.0 - RRT", &["ACESlib.Transform_Common"]),
    ("rrt", "InvRRT", "ACES 1.0 - Inverse RRT", &["ACESlib.Transform_Common"]),
    ("odt/rec709", "ODT.Academy.Rec709_100nits_dim", "ACES 1.0 Output - Rec.709", &["ACESlib.ODT_Common"]),
    ("odt/rec709", "ODT.Academy.Rec709_D60sim_100nits_dim", "ACES 1.0 Output - Rec.709 (D60 sim.)", &["ACESlib.ODT_Common"]),
    ("odt/rec709", "InvODT.Academy.Rec709_100nits_dim", "ACES 1.0 Inverse Output - Rec.709", &["ACESlib.ODT_Common"]),
    ("odt/sRGB", "ODT.Academy.sRGB_100nits_dim", "ACES 1.0 Output - sRGB", &["ACESlib.ODT_Common"]),
    ("odt/p3", "ODT.Academy.P3D65_48nits", "ACES 1.0 Output - P3D65", &["ACESlib.ODT_Common"]),
    ("outputTransforms", "RRTODT.Academy.P3D65_1000nits_15nits_ST2084", "ACES 1.0 Output - P3D65 ST2084 (1000 nits)", &["ACESlib.ODT_Common"]),
    ("outputTransforms", "RRTODT.Academy.Rec2020_1000nits_15nits_ST2084", "ACES 1.0 Output - Rec.2020 ST2084 (1000 nits)", &["ACESlib.ODT_Common"]),
    ("utilities", "ACESutil.Lin_to_Log2_param", "ACES Utility - Linear to Log2", &[]),
    ("utilities", "ACESutil.DolbyPQ_to_Lin", "ACES Utility - Dolby PQ to Linear", &[]),
];

fn ctl_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    for (folder, stem, user_name, imports) in TREE {
        let mut text = String::new();
        if !stem.starts_with("ACESlib") {
            text.push_str(&format!(
                "// <ACEStransformID>urn:ampas:aces:transformId:v1.5:{stem}.a1.0.3</ACEStransformID>\n"
            ));
        }
        if !user_name.is_empty() {
            text.push_str(&format!("// <ACESuserName>{user_name}</ACESuserName>\n"));
        }
        text.push_str(&format!("\n//\n// {stem}\n//\n\n"));
        for import in *imports {
            text.push_str(&format!("import \"{import}\";\n"));
        }
        text.push_str("\nvoid main() {}\n");

        let folder = dir.path().join(folder);
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join(format!("{stem}.ctl")), text).unwrap();
    }
    dir
}

fn graph(root: &Path) -> TransformGraph {
    let set = discover_ctl_transforms(root, &DiscoveryOptions::new()).unwrap();
    TransformGraph::build(set).unwrap()
}

fn generate(graph: &TransformGraph, profile: ConfigProfile) -> Config {
    let spec = profile.spec().unwrap();
    ConfigGenerator::new(graph, &spec).generate().unwrap()
}

fn profile(yaml_tail: &str) -> ProfileSpec {
    ProfileSpec::from_yaml_str(&format!(
        "name: custom\nprofile_version: 1.0.0\naces_version: '1.3'\n{yaml_tail}"
    ))
    .unwrap()
}

#[test]
fn builtin_profiles_generate_valid_configs() {
    let dir = ctl_tree();
    let graph = graph(dir.path());

    for profile in ConfigProfile::ALL {
        let config = generate(&graph, profile);
        let issues = validate::check(&config);
        assert!(!validate::has_errors(&issues), "{profile}: {issues:?}");

        let yaml = config.to_yaml_string();
        assert_eq!(Config::from_yaml_str(&yaml).unwrap(), config, "{profile}");
        assert!(config.colorspace("Raw").unwrap().is_data());
        assert_eq!(config.roles().reference(), Some("ACES2065-1"));
    }
}

#[test]
fn generation_is_deterministic() {
    let dir = ctl_tree();
    for profile in ConfigProfile::ALL {
        let first = generate(&graph(dir.path()), profile).to_yaml_string();
        let second = generate(&graph(dir.path()), profile).to_yaml_string();
        assert_eq!(first, second, "{profile}");
    }
}

#[test]
fn cg_profile_content() {
    let dir = ctl_tree();
    let graph = graph(dir.path());
    let config = generate(&graph, ConfigProfile::Cg);

    assert_eq!(config.name(), "cg-config-v0.1.0_aces-v1.3_ocio-v2.1");
    assert_eq!(config.roles().scene_linear(), Some("ACEScg"));
    assert_eq!(config.roles().get("color_timing"), Some("ACEScct"));

    let acescct = config.colorspace("ACEScct").unwrap();
    assert_eq!(
        acescct.to_reference(),
        Some(&Transform::builtin("ACEScct_to_ACES2065-1"))
    );
    assert!(acescct.description().contains("ACEStransformID: urn:ampas:aces:transformId:v1.5"));
    assert!(config.colorspace("ARRI - Alexa-v3-logC-EI800").is_none());

    let displays: Vec<_> = config.displays().display_names().collect();
    assert_eq!(
        displays,
        vec!["P3-D65", "P3-D65 ST-2084 (PQ)", "Rec.2020 ST-2084 (PQ)", "Rec.709", "sRGB"]
    );
    let rec709: Vec<_> = config.displays().display("Rec.709").unwrap().view_names().collect();
    assert_eq!(rec709, vec!["SDR Video", "Raw"]);
    assert_eq!(config.default_view("P3-D65"), Some("SDR Cinema"));
    assert!(config
        .displays()
        .display("Rec.2020 ST-2084 (PQ)")
        .unwrap()
        .view("HDR Video (1000 nits)")
        .is_some());

    let display_cs = config.colorspace("Rec709 - Display").unwrap();
    assert_eq!(display_cs.name(), "Rec.709 - Display");
    assert_eq!(display_cs.reference_space(), ReferenceSpace::Display);

    let vt = config.displays().view_transform("ACES 1.0 Output - Rec.709").unwrap();
    assert_eq!(
        vt.from_scene_reference(),
        Some(&Transform::builtin("ACES-OUTPUT - ACES2065-1_to_CIE-XYZ-D65 - SDR-VIDEO_1.0"))
    );
    // First SDR output in name order.
    assert_eq!(
        config.displays().default_view_transform(),
        Some("ACES 1.0 Output - P3D65")
    );
    assert!(config.looks().is_empty());
    assert!(config.file_rules().last().is_some_and(|r| r.colorspace == "ACES2065-1"));
}

#[test]
fn studio_profile_content() {
    let dir = ctl_tree();
    let graph = graph(dir.path());
    let config = generate(&graph, ConfigProfile::Studio);

    let alexa = config.colorspace("ARRI - Alexa-v3-logC-EI800").unwrap();
    assert_eq!(alexa.name(), "ARRI Alexa v3 LogC EI800");
    assert_eq!(alexa.family(), "Input/ARRI");
    assert!(config.colorspace("Sony - SLog3_SGamut3").is_some());

    assert_eq!(config.looks().len(), 1);
    let look = config.looks().get("ACES 1.3 Look - Reference Gamut Compress").unwrap();
    assert_eq!(look.process_space.as_deref(), Some("ACES2065-1"));

    assert_eq!(config.named_transforms().len(), 2);
    assert!(config.named_transform("ACES Utility - Linear to Log2").is_some());

    // `_D60sim_` is excluded, HDR displays are inactive.
    assert!(config.displays().display("Rec.709").unwrap().view("SDR Video (D60sim)").is_none());
    assert!(config
        .inactive_colorspaces()
        .iter()
        .any(|n| n == "P3-D65 ST-2084 (PQ) - Display"));
    assert!(!config.inactive_colorspaces().iter().any(|n| n == "Rec.709 - Display"));
}

#[test]
fn reference_profile_keeps_raw_names() {
    let dir = ctl_tree();
    let graph = graph(dir.path());
    let config = generate(&graph, ConfigProfile::Reference);

    assert!(config.colorspace("ARRI - Alexa-v3-logC-EI800").is_some());
    assert!(config.displays().view_transform("ODT.Academy.Rec709_100nits_dim").is_some());
    assert!(config.displays().display("Rec709").unwrap().view("SDR Video (D60sim)").is_some());
    let look = config.looks().get("LMT.Academy.ReferenceGamutCompress").unwrap();
    assert_eq!(
        look.transform,
        Some(Transform::builtin("ACES-LMT - ACES 1.3 Reference Gamut Compression"))
    );
    assert!(config.named_transform("ACESutil.DolbyPQ_to_Lin").is_some());
    // Inverse output transforms never become entries.
    assert!(config.displays().view_transform("InvODT.Academy.Rec709_100nits_dim").is_none());
}

#[test]
fn missing_role_target() {
    let dir = ctl_tree();
    let graph = graph(dir.path());
    let spec = profile("families: [idt]\nroles:\n  scene_linear: ACEScg\n");

    let err = ConfigGenerator::new(&graph, &spec).generate().unwrap_err();
    match err {
        GenerationError::MissingColorSpace { name, usage, .. } => {
            assert_eq!(name, "ACEScg");
            assert_eq!(usage, "role 'scene_linear'");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_required_colorspace() {
    let dir = ctl_tree();
    let graph = graph(dir.path());
    let spec = profile("families: [csc]\nrequired: [ACESproxy]\n");

    let err = ConfigGenerator::new(&graph, &spec).generate().unwrap_err();
    assert!(matches!(err, GenerationError::MissingColorSpace { name, .. } if name == "ACESproxy"));
}

#[test]
fn aces_version_override() {
    let dir = ctl_tree();
    let graph = graph(dir.path());
    let spec = ConfigProfile::Cg.spec().unwrap();
    let config = ConfigGenerator::new(&graph, &spec)
        .with_aces_version("1.2")
        .generate()
        .unwrap();
    assert_eq!(config.name(), "cg-config-v0.1.0_aces-v1.2_ocio-v2.1");
}

#[test]
fn clf_inputs_and_utilities() {
    let ctl = ctl_tree();
    let graph = graph(ctl.path());

    let clf_root = TempDir::new().unwrap();
    let input = clf_root.path().join("Input/Canon");
    let utility = clf_root.path().join("Utility");
    fs::create_dir_all(&input).unwrap();
    fs::create_dir_all(&utility).unwrap();
    fs::write(
        input.join("CLog3_to_ACES.clf"),
        r#"<ProcessList id="canon.clog3" name="CLog3_to_ACES"><Description>Canon Log 3</Description></ProcessList>"#,
    )
    .unwrap();
    fs::write(
        utility.join("Curve.clf"),
        r#"<ProcessList id="util.curve" name="Curve"><Description>A curve</Description></ProcessList>"#,
    )
    .unwrap();
    let clfs = discover_clf_transforms(clf_root.path(), &DiscoveryOptions::new()).unwrap();

    let spec = ConfigProfile::Cg.spec().unwrap();
    let config = ConfigGenerator::new(&graph, &spec)
        .with_clf_transforms(&clfs)
        .generate()
        .unwrap();

    let clog = config.colorspace("CLog3").unwrap();
    assert_eq!(clog.family(), "Input/Canon");
    assert_eq!(clog.to_reference(), Some(&Transform::file("CLog3_to_ACES.clf")));
    assert!(config.named_transform("Curve").is_some());
    assert_eq!(config.search_paths().len(), 2);
    assert!(!validate::has_errors(&validate::check(&config)));
}

#[test]
fn write_and_reload() {
    let ctl = ctl_tree();
    let graph = graph(ctl.path());
    let config = generate(&graph, ConfigProfile::Studio);

    let out = TempDir::new().unwrap();
    let path = out.path().join("studio.ocio");
    config.write_to_file(&path).unwrap();
    assert_eq!(Config::from_file(&path).unwrap(), config);
}
