//! Config validation command.

use aces_ocio::Config;
use aces_ocio::validate::{self, Severity};
use anyhow::{Context, Result, bail};
use tracing::{info, trace};

use crate::ValidateArgs;

/// Parses and validates each config, printing its issues.
pub fn run(args: ValidateArgs, verbose: u8) -> Result<()> {
    let mut failed = 0usize;

    for path in &args.input {
        trace!(input = %path.display(), "validate::run");
        let config = Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;
        let issues = validate::check(&config);

        let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
        let warnings = issues.iter().filter(|i| i.severity == Severity::Warning).count();
        info!(input = %path.display(), errors, warnings, "Validated config");

        println!("{}: {} ({} errors, {} warnings)", path.display(), config.name(), errors, warnings);
        for issue in &issues {
            if issue.severity != Severity::Info || verbose > 0 {
                println!("  {issue}");
            }
        }

        let rejected = if args.strict {
            validate::has_warnings(&issues)
        } else {
            validate::has_errors(&issues)
        };
        if rejected {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} config(s) failed validation", args.input.len());
    }
    Ok(())
}
