//! Conversion path command.

use anyhow::{Context, Result};
use tracing::{info, trace};

use super::{discovery_options, load_graph};
use crate::PathArgs;

/// Prints the transforms converting `source` into `target`, one per line.
pub fn run(args: PathArgs, verbose: u8) -> Result<()> {
    trace!(source = %args.source, target = %args.target, "path::run");

    let options = discovery_options(&args.tree)?;
    let graph = load_graph(&args.tree.ctl_root, &options)?;
    let steps = graph
        .conversion_path(&args.source, &args.target)
        .with_context(|| format!("No conversion from {} to {}", args.source, args.target))?;
    info!(steps = steps.len(), "Found conversion path");

    if steps.is_empty() {
        println!("{} is {}: no conversion needed", args.source, args.target);
    }
    for t in steps {
        match (verbose > 0, t.source(), t.target()) {
            (true, Some(src), Some(dst)) => println!("{}  ({src} -> {dst})", t.name()),
            _ => println!("{}", t.name()),
        }
    }
    Ok(())
}
