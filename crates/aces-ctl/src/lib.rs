//! ACES reference transform discovery and dependency graph.
//!
//! This crate provides:
//! - CTL discovery: one [`CtlTransform`] per `.ctl` file, with its
//!   identifier, description, family and imports
//! - CLF discovery: [`ClfTransform`] headers for `.clf` LUT files
//! - Family / genus classification of discovered transforms
//! - [`TransformGraph`]: the import DAG and the colour-space
//!   [`ConversionGraph`] with shortest conversion paths
//!
//! # Quick Start
//!
//! ```
//! use aces_ctl::{CtlTransform, TransformFamily, TransformGraph};
//!
//! let rrt = CtlTransform::parse("RRT.ctl", "import \"ACESlib.Utilities\";").unwrap();
//! let lib = CtlTransform::parse("ACESlib.Utilities.ctl", "").unwrap();
//! let graph = TransformGraph::build([rrt, lib]).unwrap();
//!
//! let order: Vec<_> = graph.transforms().map(|t| t.name()).collect();
//! assert_eq!(order, ["ACESlib.Utilities", "RRT"]);
//! assert_eq!(graph.get("RRT").unwrap().family(), TransformFamily::Rrt);
//! assert_eq!(graph.conversion_path("ACES2065-1", "OCES").unwrap().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod classify;
mod clf;
mod ctl;
mod discover;
mod error;
mod graph;
mod transform_id;

pub use classify::{Classification, Taxon, classify, filter, format_taxonomy, unclassify};
pub use clf::{ClfTransform, discover_clf_transforms};
pub use ctl::{
    ACES_REFERENCE, CtlTransform, OCES, UNDEFINED_GENUS, derive_endpoints, normalize_colorspace,
};
pub use discover::{DiscoveryOptions, TransformSet, discover_ctl_transforms};
pub use error::{DiscoveryError, DiscoveryResult, GraphError, GraphResult};
pub use graph::{ConversionGraph, TransformGraph};
pub use transform_id::{AcesTransformId, InvalidTransformId, TransformFamily, URN_PREFIX};
