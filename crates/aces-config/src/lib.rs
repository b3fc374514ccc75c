//! ACES OpenColorIO config generation.
//!
//! This crate provides:
//! - [`ConfigProfile`] / [`ProfileSpec`]: the Reference, CG and Studio
//!   profiles as embedded YAML, plus custom profiles from disk
//! - [`ConfigGenerator`]: turns a [`aces_ctl::TransformGraph`] and a
//!   profile into a validated [`aces_ocio::Config`]
//! - [`naming`]: name beautification and output-name parsing
//!
//! # Quick Start
//!
//! ```
//! use aces_config::{ConfigGenerator, ProfileSpec};
//! use aces_ctl::{CtlTransform, TransformGraph};
//!
//! let graph = TransformGraph::build([
//!     CtlTransform::parse("ACEScsc.Academy.ACEScg_to_ACES.ctl", "").unwrap(),
//!     CtlTransform::parse("RRT.ctl", "").unwrap(),
//!     CtlTransform::parse("ODT.Academy.Rec709_100nits_dim.ctl", "").unwrap(),
//! ])
//! .unwrap();
//!
//! let profile = ProfileSpec::from_yaml_str(
//!     "name: demo\nprofile_version: 0.1.0\naces_version: '1.3'\n\
//!      families: [csc, odt]\nroles: {scene_linear: ACEScg}\n",
//! )
//! .unwrap();
//!
//! let config = ConfigGenerator::new(&graph, &profile).generate().unwrap();
//! assert_eq!(config.name(), "demo-config-v0.1.0_aces-v1.3_ocio-v2.1");
//! assert_eq!(config.roles().scene_linear(), Some("ACEScg"));
//! assert_eq!(config.default_display(), Some("Rec709"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod builtin;
mod error;
mod generate;
mod profile;

pub mod naming;

pub use error::{GenerationError, GenerationResult};
pub use generate::{ConfigGenerator, RAW};
pub use profile::{
    CompiledProfile, ConfigProfile, DescriptionStyle, Naming, ProfileSpec, Replacement,
};
