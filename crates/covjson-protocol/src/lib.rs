//! CoverageJSON document model
//!
//! This crate provides the typed document layer that sits on either side of
//! the reshaping engine: the `CoverageCollection` assembled from a walked
//! retrieval tree, and the same document read back for dense analysis.
//!
//! Documents follow the CoverageJSON format with the `mars:metadata`
//! extension carried per coverage.
//!
//! # Example
//!
//! ```rust
//! use covjson_protocol::{CoverageCollection, DomainType, ParameterCatalogue};
//!
//! let catalogue = ParameterCatalogue::ecmwf();
//! let mut collection = CoverageCollection::new(DomainType::Grid);
//! collection.add_parameter("2t", catalogue.parameter("167"));
//! assert!(collection.parameters.contains_key("2t"));
//! ```

pub mod catalogue;
pub mod coverage_json;
pub mod parameters;

// Re-export commonly used types
pub use catalogue::{ParameterCatalogue, ParameterInfo};
pub use coverage_json::{
    Axis, AxisValue, Coverage, CoverageCollection, CoverageType, Domain, DomainType, MarsMetadata,
    NdArray, ReferenceSystem, ReferenceSystemConnection,
};
pub use parameters::{I18nString, ObservedProperty, Parameter, Unit, UnitSymbol};

/// Well-known reference system identifiers.
pub mod crs {
    /// OGC CRS84 (longitude/latitude on WGS84).
    pub const CRS84: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";
}
