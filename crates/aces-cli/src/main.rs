//! ocio-aces - ACES OpenColorIO config generator
//!
//! Discovers the CTL (and CLF) transforms of an ACES reference tree and
//! turns them into OpenColorIO configs.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "ocio-aces")]
#[command(author, version, about = "ACES OpenColorIO config generator")]
#[command(long_about = "
Generates OpenColorIO configs from the CTL transforms of an ACES reference tree.

Examples:
  ocio-aces discover --ctl-root aces-dev/transforms/ctl
  ocio-aces generate --ctl-root aces-dev/transforms/ctl --profile cg -o cg.ocio
  ocio-aces generate --ctl-root ctl --profile-file studio.yaml --clf-root clf
  ocio-aces build --ctl-root aces-dev/transforms/ctl -d build/
  ocio-aces path --ctl-root aces-dev/transforms/ctl ACEScct P3D65_48nits
  ocio-aces validate cg.ocio
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate one config
    #[command(visible_alias = "g")]
    Generate(GenerateArgs),

    /// Generate the configs of every built-in profile
    #[command(visible_alias = "b")]
    Build(BuildArgs),

    /// Print the taxonomy of a transform tree
    #[command(visible_alias = "d")]
    Discover(DiscoverArgs),

    /// Print the transforms converting between two colour spaces
    Path(PathArgs),

    /// Parse and validate an existing config
    Validate(ValidateArgs),
}

/// Transform tree locations shared by the commands.
#[derive(Args, Debug)]
struct TreeArgs {
    /// Root of the CTL reference tree
    #[arg(long, value_name = "DIR")]
    ctl_root: PathBuf,

    /// Root of a CLF transform tree
    #[arg(long, value_name = "DIR")]
    clf_root: Option<PathBuf>,

    /// Glob of root-relative paths to skip (repeatable)
    #[arg(long, value_name = "GLOB")]
    ignore: Vec<String>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    tree: TreeArgs,

    /// Built-in profile (reference, cg, studio)
    #[arg(short, long, default_value = "cg", conflicts_with = "profile_file")]
    profile: String,

    /// Profile YAML file
    #[arg(long, value_name = "FILE")]
    profile_file: Option<PathBuf>,

    /// Output config (default: <config name>.ocio)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the ACES release in the config name
    #[arg(long)]
    aces_version: Option<String>,
}

#[derive(Args, Debug)]
struct BuildArgs {
    #[command(flatten)]
    tree: TreeArgs,

    /// Output directory
    #[arg(short = 'd', long, default_value = "build")]
    directory: PathBuf,

    /// Override the ACES release in the config names
    #[arg(long)]
    aces_version: Option<String>,
}

#[derive(Args, Debug)]
struct DiscoverArgs {
    #[command(flatten)]
    tree: TreeArgs,

    /// Only show these families (csc, idt, odt, ...)
    #[arg(short, long, value_delimiter = ',')]
    family: Vec<String>,
}

#[derive(Args, Debug)]
struct PathArgs {
    #[command(flatten)]
    tree: TreeArgs,

    /// Source colour space, e.g. ACEScct
    source: String,

    /// Target colour space, e.g. P3D65_48nits
    target: String,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Config file(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Fail on warnings too
    #[arg(long)]
    strict: bool,
}

/// Installs the stderr subscriber and the optional file sink.
///
/// `RUST_LOG` wins over `-v` when set.
fn init_logging(verbose: u8, log: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match log {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .context("Failed to install logger")?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .try_init()
                .context("Failed to install logger")?;
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log.as_ref())?;

    match cli.command {
        Commands::Generate(args) => commands::generate::run(args, cli.verbose),
        Commands::Build(args) => commands::build::run(args, cli.verbose),
        Commands::Discover(args) => commands::discover::run(args),
        Commands::Path(args) => commands::path::run(args, cli.verbose),
        Commands::Validate(args) => commands::validate::run(args, cli.verbose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ocio-aces").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn generate_args() {
        let cli = parse(&[
            "-vv", "generate", "--ctl-root", "ctl", "--profile", "studio", "-o", "out.ocio",
            "--ignore", "*/DCDM*", "--ignore", "lib/*",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.tree.ctl_root, PathBuf::from("ctl"));
        assert_eq!(args.profile, "studio");
        assert_eq!(args.output, Some(PathBuf::from("out.ocio")));
        assert_eq!(args.tree.ignore, vec!["*/DCDM*", "lib/*"]);
        assert!(args.profile_file.is_none());
    }

    #[test]
    fn generate_defaults_to_cg() {
        let cli = parse(&["g", "--ctl-root", "ctl"]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.profile, "cg");
        assert!(args.output.is_none());
    }

    #[test]
    fn profile_and_profile_file_conflict() {
        let result = Cli::try_parse_from([
            "ocio-aces", "generate", "--ctl-root", "ctl", "--profile", "cg", "--profile-file", "p.yaml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["build", "--ctl-root", "ctl", "-d", "out", "-v", "--log", "run.log"]);
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.log, Some(PathBuf::from("run.log")));
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.directory, PathBuf::from("out"));
    }

    #[test]
    fn discover_families() {
        let cli = parse(&["discover", "--ctl-root", "ctl", "--family", "csc,odt"]);
        let Commands::Discover(args) = cli.command else {
            panic!("expected discover");
        };
        assert_eq!(args.family, vec!["csc", "odt"]);
    }

    #[test]
    fn path_and_validate() {
        let cli = parse(&["path", "--ctl-root", "ctl", "ACEScct", "P3D65_48nits"]);
        let Commands::Path(args) = cli.command else {
            panic!("expected path");
        };
        assert_eq!((args.source.as_str(), args.target.as_str()), ("ACEScct", "P3D65_48nits"));

        assert!(Cli::try_parse_from(["ocio-aces", "validate"]).is_err());
        assert!(Cli::try_parse_from(["ocio-aces", "generate"]).is_err());
    }

    #[test]
    fn path_takes_tree_args() {
        let cli = parse(&[
            "path", "--ctl-root", "ctl", "--ignore", "odt/**", "--clf-root", "clf", "ACEScct", "ACEScg",
        ]);
        let Commands::Path(args) = cli.command else {
            panic!("expected path");
        };
        assert_eq!(args.tree.ctl_root, PathBuf::from("ctl"));
        assert_eq!(args.tree.ignore, vec!["odt/**"]);
        assert_eq!(args.tree.clf_root, Some(PathBuf::from("clf")));
        assert_eq!(args.target, "ACEScg");
    }
}
