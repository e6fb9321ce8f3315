//! Retrieval tree reshaping.
//!
//! Converts the axis-labelled trees returned by a multidimensional query
//! engine into CoverageJSON ranges, and CoverageJSON Grid collections into
//! dense NaN-filled arrays for analysis.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   walk    ┌──────────────────────────────────┐
//! │ TreeNode     │ ────────► │ TreeWalker                       │
//! │ (any nesting │           │  Fields (active / discovered)    │
//! │  order)      │           │  StrideLayout  level→num→param→step
//! └──────────────┘           │  RangeStore + CoordinateAccumulator
//!                            └───────────────┬──────────────────┘
//!                                            │ WalkOutput
//!                                            ▼
//!                            ┌──────────────────────────────────┐
//!                            │ GridAssembler → CoverageCollection│
//!                            └───────────────┬──────────────────┘
//!                                            │ GridDecoder
//!                                            ▼
//!                            ┌──────────────────────────────────┐
//!                            │ DenseReshaper → DenseDataset      │
//!                            │  Array6 [date,num,step,lvl,lat,lon]
//!                            └──────────────────────────────────┘
//! ```
//!
//! The walk is single-threaded and order dependent. The dense write pass is
//! split over disjoint (date, number, step) blocks and runs on rayon.
//!
//! # Example
//!
//! ```rust
//! use covjson_protocol::ParameterCatalogue;
//! use tree_reshape::{tree_to_collection, ReshapeConfig, TreeNode};
//!
//! let tree = TreeNode::from_json(r#"{
//!     "axis": "root",
//!     "children": [{
//!         "axis": "param", "values": ["167"],
//!         "children": [{
//!             "axis": "latitude", "values": [50.0],
//!             "children": [{"axis": "longitude", "values": [1.0, 2.0], "result": [280.5, 281.0]}]
//!         }]
//!     }]
//! }"#).unwrap();
//!
//! let collection =
//!     tree_to_collection(&tree, &ParameterCatalogue::ecmwf(), &ReshapeConfig::default()).unwrap();
//! assert_eq!(collection.coverages[0].ranges["2t"].values.len(), 2);
//! ```

pub mod assemble;
pub mod config;
pub mod coords;
pub mod date_key;
pub mod decode;
pub mod dense;
pub mod error;
pub mod fields;
pub mod range_store;
pub mod scalar;
pub mod stride;
pub mod tree;
pub mod walker;

pub use assemble::GridAssembler;
pub use config::ReshapeConfig;
pub use coords::{CoordinateAccumulator, DateCoordinates};
pub use decode::{CoverageRecord, GridDecoder, RecordRange};
pub use dense::{DenseAxes, DenseDataset, DenseReshaper, DenseVariable};
pub use error::{ReshapeError, Result};
pub use fields::Fields;
pub use range_store::{RangeKey, RangeStore};
pub use scalar::Scalar;
pub use stride::StrideLayout;
pub use tree::{AxisKind, TreeNode};
pub use walker::{TreeWalker, WalkOutput, WalkStats};

use covjson_protocol::{CoverageCollection, ParameterCatalogue};

/// Walk a tree and assemble it into a Grid collection.
pub fn tree_to_collection(
    tree: &TreeNode,
    catalogue: &ParameterCatalogue,
    config: &ReshapeConfig,
) -> Result<CoverageCollection> {
    config.validate()?;
    let walk = TreeWalker::new(config.clone()).walk(tree)?;
    GridAssembler::new(catalogue.clone(), config.clone()).assemble(&walk)
}

/// Decode a Grid collection into dense arrays.
pub fn collection_to_dense(
    collection: &CoverageCollection,
    config: &ReshapeConfig,
) -> Result<DenseDataset> {
    config.validate()?;
    DenseReshaper::new(config.clone()).reshape_collection(collection)
}
