//! Config generation command.

use std::path::PathBuf;

use aces_config::ConfigGenerator;
use anyhow::{Context, Result};
use tracing::{debug, info, trace};

use super::{discovery_options, load_clf, load_graph, message_box, resolve_profile};
use crate::GenerateArgs;

/// Generates one config and writes it to the output path.
pub fn run(args: GenerateArgs, verbose: u8) -> Result<()> {
    trace!(ctl_root = %args.tree.ctl_root.display(), profile = %args.profile, "generate::run");

    let profile = resolve_profile(&args.profile, args.profile_file.as_deref())?;
    if verbose > 0 {
        println!("{}", message_box(&format!("Generating \"{}\" config", profile.name), 79, 3));
    }

    let options = discovery_options(&args.tree)?;
    let graph = load_graph(&args.tree.ctl_root, &options)?;
    let clf = load_clf(args.tree.clf_root.as_deref(), &options)?;
    debug!(transforms = graph.len(), clf = clf.len(), "Loaded transforms");

    let mut generator = ConfigGenerator::new(&graph, &profile).with_clf_transforms(&clf);
    if let Some(version) = &args.aces_version {
        generator = generator.with_aces_version(version);
    }
    let config = generator
        .generate()
        .with_context(|| format!("Failed to generate \"{}\" config", profile.name))?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.ocio", config.name())));
    config
        .write_to_file(&output)
        .with_context(|| format!("Failed to write config: {}", output.display()))?;

    info!(name = %config.name(), output = %output.display(), "Wrote config");
    if verbose > 0 {
        println!(
            "Wrote {} ({} colour spaces, {} displays, {} looks)",
            output.display(),
            config.colorspaces().len(),
            config.displays().displays().len(),
            config.looks().len()
        );
    } else {
        println!("{}", output.display());
    }
    Ok(())
}
