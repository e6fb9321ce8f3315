//! CoverageJSON types for assembled retrieval results.
//!
//! A retrieval is published as a `CoverageCollection`: shared parameter
//! definitions and referencing at the top, one `Coverage` per
//! (forecast date, ensemble member) below, each with its own domain axes,
//! `mars:metadata` side-map and per-parameter `NdArray` ranges.
//!
//! See: <https://covjson.org/>

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::parameters::Parameter;

/// Free-form per-coverage metadata (`mars:metadata`).
pub type MarsMetadata = BTreeMap<String, serde_json::Value>;

/// A CoverageJSON collection of coverages sharing parameters and referencing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageCollection {
    /// Document type (always "CoverageCollection").
    #[serde(rename = "type")]
    pub type_: CoverageType,

    /// Domain type shared by all coverages.
    #[serde(rename = "domainType")]
    pub domain_type: DomainType,

    /// Parameter definitions keyed by short name.
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,

    /// Reference systems for the coverage axes.
    #[serde(default)]
    pub referencing: Vec<ReferenceSystemConnection>,

    /// The coverages.
    #[serde(default)]
    pub coverages: Vec<Coverage>,
}

impl CoverageCollection {
    /// Create an empty collection of the given domain type.
    pub fn new(domain_type: DomainType) -> Self {
        Self {
            type_: CoverageType::CoverageCollection,
            domain_type,
            parameters: BTreeMap::new(),
            referencing: Vec::new(),
            coverages: Vec::new(),
        }
    }

    /// Register a parameter definition under its short name.
    pub fn add_parameter(&mut self, name: impl Into<String>, param: Parameter) {
        self.parameters.insert(name.into(), param);
    }

    /// Replace the referencing with a single connection.
    pub fn set_reference(&mut self, reference: ReferenceSystemConnection) {
        self.referencing = vec![reference];
    }

    /// Append a coverage.
    pub fn push_coverage(&mut self, coverage: Coverage) {
        self.coverages.push(coverage);
    }

    /// Names of the parameters defined on the collection.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.keys().map(|k| k.as_str()).collect()
    }

    /// Coordinates named by the referencing, flattened in order.
    pub fn referenced_coordinates(&self) -> Vec<&str> {
        self.referencing
            .iter()
            .flat_map(|r| r.coordinates.iter().map(|c| c.as_str()))
            .collect()
    }
}

/// A single coverage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coverage {
    /// Document type (always "Coverage").
    #[serde(rename = "type")]
    pub type_: CoverageType,

    /// Retrieval metadata for this coverage.
    #[serde(rename = "mars:metadata", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: MarsMetadata,

    /// The domain defining the coverage's spatial/temporal extent.
    pub domain: Domain,

    /// Data ranges for each parameter.
    #[serde(default)]
    pub ranges: BTreeMap<String, NdArray>,
}

impl Coverage {
    /// Create a coverage over a domain with no ranges yet.
    pub fn new(domain: Domain) -> Self {
        Self {
            type_: CoverageType::Coverage,
            metadata: MarsMetadata::new(),
            domain,
            ranges: BTreeMap::new(),
        }
    }

    /// Set the metadata side-map.
    pub fn with_metadata(mut self, metadata: MarsMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a parameter range.
    pub fn with_range(mut self, name: impl Into<String>, range: NdArray) -> Self {
        self.ranges.insert(name.into(), range);
        self
    }
}

/// Coverage type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoverageType {
    /// Single coverage.
    Coverage,
    /// Collection of coverages.
    CoverageCollection,
}

/// The domain of a coverage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    /// Domain type (always "Domain").
    #[serde(rename = "type")]
    pub type_: String,

    /// The domain type, when declared per coverage.
    #[serde(rename = "domainType", default, skip_serializing_if = "Option::is_none")]
    pub domain_type: Option<DomainType>,

    /// Axis definitions.
    pub axes: BTreeMap<String, Axis>,

    /// Reference systems for axes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referencing: Option<Vec<ReferenceSystemConnection>>,
}

impl Domain {
    /// Create an empty domain.
    pub fn new() -> Self {
        Self {
            type_: "Domain".to_string(),
            domain_type: None,
            axes: BTreeMap::new(),
            referencing: None,
        }
    }

    /// Create a grid domain over steps, levels and a latitude/longitude raster.
    pub fn grid(
        t_values: Vec<AxisValue>,
        levelist: Vec<AxisValue>,
        latitude: Vec<f64>,
        longitude: Vec<f64>,
    ) -> Self {
        Self::new()
            .with_axis("t", Axis::new(t_values))
            .with_axis("levelist", Axis::new(levelist))
            .with_axis("latitude", Axis::floats(latitude))
            .with_axis("longitude", Axis::floats(longitude))
    }

    /// Add or replace an axis.
    pub fn with_axis(mut self, name: impl Into<String>, axis: Axis) -> Self {
        self.axes.insert(name.into(), axis);
        self
    }

    /// Look up the first present axis among `names`.
    pub fn axis_any(&self, names: &[&str]) -> Option<&Axis> {
        names.iter().find_map(|n| self.axes.get(*n))
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::new()
    }
}

/// Domain types supported by CoverageJSON.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DomainType {
    /// Point (0D).
    Point,
    /// Point series (time series at a point).
    PointSeries,
    /// Vertical profile at a point.
    VerticalProfile,
    /// Grid (2D or higher).
    Grid,
    /// Trajectory (1D path through space).
    Trajectory,
    /// Multi-point set.
    MultiPoint,
}

/// An axis in the domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Axis {
    /// Data type for composite axes (e.g. "tuple").
    #[serde(rename = "dataType", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// Component names for composite axes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Vec<String>>,

    /// Explicit list of values.
    pub values: Vec<AxisValue>,
}

impl Axis {
    /// Create an axis from explicit values.
    pub fn new(values: Vec<AxisValue>) -> Self {
        Self {
            data_type: None,
            coordinates: None,
            values,
        }
    }

    /// Create a numeric axis.
    pub fn floats(values: Vec<f64>) -> Self {
        Self::new(values.into_iter().map(AxisValue::Float).collect())
    }

    /// Get the number of values in this axis.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if axis is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric view of the axis, if every value is numeric.
    pub fn as_floats(&self) -> Option<Vec<f64>> {
        self.values.iter().map(AxisValue::as_f64).collect()
    }
}

/// A value on an axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AxisValue {
    /// Floating-point value (coordinates, levels, steps).
    Float(f64),
    /// String value (timestamps).
    String(String),
    /// Composite tuple value.
    Tuple(Vec<f64>),
}

impl AxisValue {
    /// Numeric value, parsing numeric strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AxisValue::Float(v) => Some(*v),
            AxisValue::String(s) => s.trim().parse().ok(),
            AxisValue::Tuple(_) => None,
        }
    }
}

impl std::fmt::Display for AxisValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisValue::Float(v) => write!(f, "{}", v),
            AxisValue::String(s) => write!(f, "{}", s),
            AxisValue::Tuple(t) => write!(f, "{:?}", t),
        }
    }
}

/// Connection between axes and their reference system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceSystemConnection {
    /// Axes that use this reference system.
    pub coordinates: Vec<String>,

    /// The reference system.
    pub system: ReferenceSystem,
}

impl ReferenceSystemConnection {
    /// Geographic connection over the given coordinates.
    pub fn geographic(coordinates: &[&str], id: impl Into<String>) -> Self {
        Self {
            coordinates: coordinates.iter().map(|c| c.to_string()).collect(),
            system: ReferenceSystem::Geographic { id: id.into() },
        }
    }
}

/// Reference system definitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ReferenceSystem {
    /// Geographic coordinate reference system.
    #[serde(rename = "GeographicCRS")]
    Geographic {
        /// CRS identifier URI.
        id: String,
    },

    /// Temporal reference system.
    #[serde(rename = "TemporalRS")]
    Temporal {
        /// Calendar system (e.g., "Gregorian").
        calendar: String,
    },

    /// Vertical reference system.
    #[serde(rename = "VerticalCRS")]
    Vertical {
        /// CRS identifier URI.
        id: String,
    },

    /// Identifier-based reference system.
    #[serde(rename = "IdentifierRS")]
    Identifier {
        /// Target concept URI.
        #[serde(rename = "targetConcept")]
        target_concept: String,
    },
}

/// N-dimensional array containing data values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NdArray {
    /// Type (always "NdArray").
    #[serde(rename = "type")]
    pub type_: String,

    /// Data type of values.
    #[serde(rename = "dataType")]
    pub data_type: String,

    /// Names of axes in order.
    #[serde(rename = "axisNames", default, skip_serializing_if = "Option::is_none")]
    pub axis_names: Option<Vec<String>>,

    /// Shape of the array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,

    /// The data values (null for missing data).
    pub values: Vec<Option<f64>>,
}

impl NdArray {
    /// Create an N-dimensional array with missing data support.
    pub fn new(values: Vec<Option<f64>>, shape: Vec<usize>, axis_names: Vec<String>) -> Self {
        Self {
            type_: "NdArray".to_string(),
            data_type: "float".to_string(),
            axis_names: Some(axis_names),
            shape: Some(shape),
            values,
        }
    }

    /// Create an array from dense values, turning NaN into null.
    pub fn from_dense(values: &[f64], shape: Vec<usize>, axis_names: Vec<String>) -> Self {
        let values = values
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        Self::new(values, shape, axis_names)
    }

    /// Number of elements implied by the declared shape.
    ///
    /// An array without a shape is one-dimensional over its values.
    pub fn expected_len(&self) -> usize {
        match &self.shape {
            Some(shape) => shape.iter().product(),
            None => self.values.len(),
        }
    }

    /// Whether the value count matches the declared shape.
    pub fn is_consistent(&self) -> bool {
        self.expected_len() == self.values.len()
    }
}
