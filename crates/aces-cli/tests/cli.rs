//! End-to-end runs of the `ocio-aces` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use aces_ocio::Config;
use tempfile::TempDir;

const TREE: &[(&str, &str)] = &[
    ("lib/ACESlib.Utilities.ctl", ""),
    ("csc/ACEScsc.Academy.ACEScg_to_ACES.ctl", "import \"ACESlib.Utilities\";\n"),
    ("csc/ACEScsc.Academy.ACEScct_to_ACES.ctl", "import \"ACESlib.Utilities\";\n"),
    ("csc/ACEScsc.Academy.ACEScc_to_ACES.ctl", "import \"ACESlib.Utilities\";\n"),
    ("rrt/RRT.ctl", "import \"ACESlib.Utilities\";\n"),
    (
        "odt/ODT.Academy.Rec709_100nits_dim.ctl",
        "// <ACESuserName>ACES 1.0 Output - Rec.709</ACESuserName>\nimport \"ACESlib.Utilities\";\n",
    ),
];

fn ctl_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, text) in TREE {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }
    dir
}

fn ocio_aces(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ocio-aces"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn generate_writes_a_valid_config() {
    let tree = ctl_tree();
    let out = TempDir::new().unwrap();
    let root = tree.path().to_str().unwrap();

    let output = ocio_aces(&["generate", "--ctl-root", root, "-o", "cg.ocio"], out.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let config = Config::from_file(out.path().join("cg.ocio")).unwrap();
    assert_eq!(config.name(), "cg-config-v0.1.0_aces-v1.3_ocio-v2.1");
    assert_eq!(config.roles().scene_linear(), Some("ACEScg"));
    assert!(config.displays().display("Rec.709").is_some());

    let output = ocio_aces(&["validate", "cg.ocio"], out.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("(0 errors"));
}

#[test]
fn generate_default_output_name() {
    let tree = ctl_tree();
    let out = TempDir::new().unwrap();
    let root = tree.path().to_str().unwrap();

    let output = ocio_aces(
        &["generate", "--ctl-root", root, "--profile", "reference", "--aces-version", "1.2"],
        out.path(),
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(out.path().join("reference-config-v0.1.0_aces-v1.2_ocio-v2.1.ocio").is_file());
}

#[test]
fn build_writes_every_profile() {
    let tree = ctl_tree();
    let out = TempDir::new().unwrap();
    let root = tree.path().to_str().unwrap();

    let output = ocio_aces(&["build", "--ctl-root", root, "-d", "configs"], out.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let mut written: Vec<String> = fs::read_dir(out.path().join("configs"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(
        written,
        vec![
            "cg-config-v0.1.0_aces-v1.3_ocio-v2.1.ocio",
            "reference-config-v0.1.0_aces-v1.3_ocio-v2.1.ocio",
            "studio-config-v0.1.0_aces-v1.3_ocio-v2.1.ocio",
        ]
    );
}

#[test]
fn discover_and_path() {
    let tree = ctl_tree();
    let root = tree.path().to_str().unwrap();

    let output = ocio_aces(&["discover", "--ctl-root", root, "--family", "csc"], tree.path());
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("[ csc ]"));
    assert!(text.contains("ACEScsc.Academy.ACEScct_to_ACES"));
    assert!(!text.contains("RRT"));

    let output = ocio_aces(&["path", "--ctl-root", root, "ACEScct", "Rec709_100nits_dim"], tree.path());
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "ACEScsc.Academy.ACEScct_to_ACES\nRRT\nODT.Academy.Rec709_100nits_dim\n"
    );
}

#[test]
fn path_honours_ignore_globs() {
    let tree = ctl_tree();
    let root = tree.path().to_str().unwrap();

    let output = ocio_aces(&["path", "--ctl-root", root, "ACEScct", "ACES2065-1"], tree.path());
    assert!(output.status.success());
    assert_eq!(stdout(&output), "ACEScsc.Academy.ACEScct_to_ACES\n");

    let output = ocio_aces(
        &["path", "--ctl-root", root, "--ignore", "csc/*ACEScct*", "ACEScct", "ACES2065-1"],
        tree.path(),
    );
    assert!(!output.status.success());

    let output = ocio_aces(&["path", "--ctl-root", root, "--ignore", "[", "ACEScct", "ACES2065-1"], tree.path());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid ignore pattern"));
}

#[test]
fn discover_lists_clf_taxonomy() {
    let tree = ctl_tree();
    let clf = tree.path().join("clf");
    for (path, name) in [
        ("Input/ARRI/ARRI_LogC4_to_ACES.clf", "ARRI_LogC4_to_ACES"),
        ("Utility/OCIO/AP0_to_Linear_Rec709.clf", "AP0_to_Linear_Rec709"),
    ] {
        let path = clf.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("<ProcessList id=\"urn:{name}\" name=\"{name}\"></ProcessList>")).unwrap();
    }

    let output = ocio_aces(
        &["discover", "--ctl-root", tree.path().to_str().unwrap(), "--clf-root", clf.to_str().unwrap()],
        tree.path(),
    );
    assert!(output.status.success());
    assert!(stdout(&output).ends_with(
        "[ Input ]\n  [ ARRI ]\n    ARRI_LogC4_to_ACES (ARRI_LogC4 -> ACES2065-1)\n\
         [ Utility ]\n  [ OCIO ]\n    AP0_to_Linear_Rec709 (AP0 -> Linear_Rec709)\n"
    ));
}

#[test]
fn failures_exit_non_zero() {
    let tree = ctl_tree();
    let root = tree.path().to_str().unwrap();

    let output = ocio_aces(&["generate", "--ctl-root", root, "--profile", "film"], tree.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown profile 'film'"));

    let output = ocio_aces(&["path", "--ctl-root", root, "ACEScct", "Nowhere"], tree.path());
    assert!(!output.status.success());

    let missing = tree.path().join("missing");
    let output = ocio_aces(&["discover", "--ctl-root", missing.to_str().unwrap()], tree.path());
    assert!(!output.status.success());

    fs::write(tree.path().join("broken.ocio"), "ocio_profile_version: 2.1\nroles: [").unwrap();
    let output = ocio_aces(&["validate", "broken.ocio"], tree.path());
    assert!(!output.status.success());
}

#[test]
fn log_file_sink() {
    let tree = ctl_tree();
    let out = TempDir::new().unwrap();
    let root = tree.path().to_str().unwrap();

    let output = ocio_aces(
        &["-v", "--log", "run.log", "generate", "--ctl-root", root, "-o", "cg.ocio"],
        out.path(),
    );
    assert!(output.status.success());
    let log = fs::read_to_string(out.path().join("run.log")).unwrap();
    assert!(log.contains("Wrote config"));
}
