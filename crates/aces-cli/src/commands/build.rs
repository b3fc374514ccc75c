//! Builds the config of every built-in profile.

use std::fs;

use aces_config::{ConfigGenerator, ConfigProfile};
use anyhow::{Context, Result};
use tracing::{info, trace};

use super::{discovery_options, load_clf, load_graph, message_box};
use crate::BuildArgs;

/// Writes `<config name>.ocio` for each built-in profile into the output directory.
pub fn run(args: BuildArgs, verbose: u8) -> Result<()> {
    trace!(ctl_root = %args.tree.ctl_root.display(), directory = %args.directory.display(), "build::run");

    fs::create_dir_all(&args.directory)
        .with_context(|| format!("Failed to create directory: {}", args.directory.display()))?;

    let options = discovery_options(&args.tree)?;
    let graph = load_graph(&args.tree.ctl_root, &options)?;
    let clf = load_clf(args.tree.clf_root.as_deref(), &options)?;

    for profile in ConfigProfile::ALL {
        if verbose > 0 {
            println!("{}", message_box(&format!("Building \"{profile}\" config"), 79, 3));
        }
        let spec = profile
            .spec()
            .with_context(|| format!("Failed to load built-in profile: {profile}"))?;

        let mut generator = ConfigGenerator::new(&graph, &spec).with_clf_transforms(&clf);
        if let Some(version) = &args.aces_version {
            generator = generator.with_aces_version(version);
        }
        let config = generator
            .generate()
            .with_context(|| format!("Failed to generate \"{profile}\" config"))?;

        let output = args.directory.join(format!("{}.ocio", config.name()));
        config
            .write_to_file(&output)
            .with_context(|| format!("Failed to write config: {}", output.display()))?;
        info!(profile = %profile, output = %output.display(), "Wrote config");
        println!("{}", output.display());
    }
    Ok(())
}
