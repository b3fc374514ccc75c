//! Transform tree taxonomy command.

use aces_ctl::{TransformFamily, classify, format_taxonomy};
use anyhow::{Result, bail};
use tracing::{debug, info, trace};

use super::{discover_ctl, discovery_options, load_clf};
use crate::DiscoverArgs;

/// Prints the CTL transforms grouped by family and genus, then the CLF transforms.
pub fn run(args: DiscoverArgs) -> Result<()> {
    trace!(ctl_root = %args.tree.ctl_root.display(), "discover::run");

    let mut families = Vec::with_capacity(args.family.len());
    for keyword in &args.family {
        match TransformFamily::parse(keyword) {
            Some(family) => families.push(family),
            None => bail!("Unknown transform family: {keyword}"),
        }
    }

    let options = discovery_options(&args.tree)?;
    let set = discover_ctl(&args.tree.ctl_root, &options)?;
    let mut classes = classify(&set);
    if !families.is_empty() {
        classes.retain(|family, _| families.contains(family));
    }
    info!(transforms = set.len(), families = classes.len(), "Discovered CTL transforms");
    print!("{}", format_taxonomy(&classes));

    let clf = load_clf(args.tree.clf_root.as_deref(), &options)?;
    for t in &clf {
        debug!(name = t.name(), id = t.id(), path = %t.path().display(), "CLF transform");
    }
    print!("{}", format_taxonomy(&classify(&clf)));
    Ok(())
}
