//! OpenColorIO v2 configuration model for generated ACES configs.
//!
//! This crate provides:
//! - An in-memory model of an OCIO v2 config (color spaces, roles,
//!   displays, views, view transforms, looks, named transforms, file rules)
//! - A fluent [`ConfigBuilder`]
//! - A deterministic YAML emitter and the matching `.ocio` parser
//! - Structural validation via [`validate::check`]
//!
//! # Quick Start
//!
//! ```
//! use aces_ocio::{ColorSpace, ConfigBuilder, Encoding, FileRule, Transform};
//!
//! let config = ConfigBuilder::new("example")
//!     .add_colorspace(
//!         ColorSpace::builder("ACES2065-1")
//!             .family("ACES")
//!             .encoding(Encoding::SceneLinear)
//!             .build(),
//!     )
//!     .add_colorspace(
//!         ColorSpace::builder("ACEScg")
//!             .family("ACES")
//!             .encoding(Encoding::SceneLinear)
//!             .to_reference(Transform::builtin("ACEScsc.Academy.ACEScg_to_ACES"))
//!             .build(),
//!     )
//!     .set_role("reference", "ACES2065-1")
//!     .set_role("scene_linear", "ACEScg")
//!     .add_file_rule(FileRule::default_rule("ACES2065-1"))
//!     .build()
//!     .unwrap();
//!
//! let yaml = config.to_yaml_string();
//! let parsed = aces_ocio::Config::from_yaml_str(&yaml).unwrap();
//! assert_eq!(parsed, config);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod colorspace;
mod config;
mod config_builder;
mod display;
mod error;
mod look;
mod role;
mod serialize;
mod transform;

pub mod validate;

pub use colorspace::{ColorSpace, ColorSpaceBuilder, Encoding, ReferenceSpace};
pub use config::{Config, ConfigVersion, FileRule, NamedTransform};
pub use config_builder::ConfigBuilder;
pub use display::{Display, DisplayManager, USE_DISPLAY_NAME, View, ViewTarget, ViewTransform};
pub use error::{OcioError, OcioResult};
pub use look::{Look, LookManager, parse_looks};
pub use role::{Roles, names as role_names};
pub use transform::{
    BuiltinTransform, ColorSpaceTransform, FileTransform, GroupTransform, MatrixTransform,
    Transform, TransformDirection,
};
