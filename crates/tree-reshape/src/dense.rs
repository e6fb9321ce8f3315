//! Dense NaN-filled arrays over the full axis cross-product.
//!
//! Records are placed into a `[date, number, step, level, latitude,
//! longitude]` array per parameter. The buffer is split into disjoint
//! (date, number, step) blocks, so blocks are filled in parallel without
//! locking once the shared axis vectors are known.
//!
//! A record whose own coordinates fall onto the same dense index (two
//! latitudes within tolerance, a repeated level) is rejected rather than
//! written over itself.
//!
//! ```text
//!   records ──► sorted axes ──► placements ──► par_chunks_mut(block) ──► Array6
//!                 (dates, numbers, steps exact;
//!                  levels exact; lat/lon within tolerance)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use covjson_protocol::{
    Coverage, CoverageCollection, Domain, DomainType, MarsMetadata, NdArray, Parameter,
    ParameterCatalogue, ReferenceSystemConnection,
};
use ndarray::{s, Array6};
use rayon::prelude::*;
use serde_json::Value;

use crate::assemble::{axis_value, GRID_RANGE_AXES, GRID_REFERENCED};
use crate::config::ReshapeConfig;
use crate::coords::{dedup_within, nearest_within};
use crate::decode::{CoverageRecord, GridDecoder};
use crate::error::{ReshapeError, Result};
use crate::scalar::Scalar;
use crate::walker::FORECAST_DATE;

/// Dimension names of every dense variable.
pub const DENSE_DIMS: [&str; 6] = [
    "datetimes",
    "number",
    "steps",
    "levelist",
    "latitude",
    "longitude",
];

/// Coordinate vectors of the dense dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenseAxes {
    pub dates: Vec<String>,
    pub numbers: Vec<Scalar>,
    pub steps: Vec<Scalar>,
    pub levels: Vec<Scalar>,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
}

impl DenseAxes {
    pub fn shape(&self) -> [usize; 6] {
        [
            self.dates.len(),
            self.numbers.len(),
            self.steps.len(),
            self.levels.len(),
            self.latitudes.len(),
            self.longitudes.len(),
        ]
    }

    /// Cells in one (date, number, step) block.
    pub fn block_len(&self) -> usize {
        self.levels.len() * self.latitudes.len() * self.longitudes.len()
    }
}

/// One parameter as a dense array.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseVariable {
    pub data: Array6<f64>,
    pub attrs: MarsMetadata,
}

/// Dense arrays for every parameter over shared axes.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseDataset {
    pub axes: DenseAxes,
    pub variables: BTreeMap<String, DenseVariable>,
    pub attrs: MarsMetadata,
}

impl DenseDataset {
    pub fn dims(&self) -> [&'static str; 6] {
        DENSE_DIMS
    }

    pub fn shape(&self) -> [usize; 6] {
        self.axes.shape()
    }

    pub fn variable(&self, name: &str) -> Option<&DenseVariable> {
        self.variables.get(name)
    }

    /// Value of one cell; `None` when the variable is unknown or the index is
    /// out of range. Missing data reads as NaN.
    pub fn get(&self, name: &str, index: [usize; 6]) -> Option<f64> {
        self.variables.get(name)?.data.get(index).copied()
    }

    /// Re-encode as a Grid collection with one coverage per (date, number).
    ///
    /// NaN cells are written as null.
    pub fn to_collection(
        &self,
        catalogue: &ParameterCatalogue,
        config: &ReshapeConfig,
    ) -> CoverageCollection {
        let mut collection = CoverageCollection::new(DomainType::Grid);
        collection.set_reference(ReferenceSystemConnection::geographic(
            &GRID_REFERENCED,
            config.crs_id.clone(),
        ));
        for name in self.variables.keys() {
            collection.add_parameter(name.clone(), catalogue.parameter(name));
        }

        let axes = &self.axes;
        let shape = vec![
            axes.steps.len(),
            axes.levels.len(),
            axes.latitudes.len(),
            axes.longitudes.len(),
        ];
        let axis_names: Vec<String> = GRID_RANGE_AXES.iter().map(|a| a.to_string()).collect();

        for (d, date) in axes.dates.iter().enumerate() {
            for (n, number) in axes.numbers.iter().enumerate() {
                let mut coverage = Coverage::new(Domain::grid(
                    axes.steps.iter().map(axis_value).collect(),
                    axes.levels.iter().map(axis_value).collect(),
                    axes.latitudes.clone(),
                    axes.longitudes.clone(),
                ));
                for (name, variable) in &self.variables {
                    let block: Vec<f64> = variable
                        .data
                        .slice(s![d, n, .., .., .., ..])
                        .iter()
                        .copied()
                        .collect();
                    coverage = coverage.with_range(
                        name.clone(),
                        NdArray::from_dense(&block, shape.clone(), axis_names.clone()),
                    );
                }

                let mut metadata = self.attrs.clone();
                metadata.insert("number".to_string(), number.to_json());
                if let Some(step) = axes.steps.last() {
                    metadata.insert("step".to_string(), step.to_json());
                }
                metadata.insert(FORECAST_DATE.to_string(), Value::String(date.clone()));
                collection.push_coverage(coverage.with_metadata(metadata));
            }
        }
        collection
    }
}

/// Where one record lands in the dense buffer.
struct Placement {
    block: usize,
    levels: Vec<usize>,
    lats: Vec<usize>,
    lons: Vec<usize>,
}

/// Builds dense datasets from decoded records.
#[derive(Debug, Clone, Default)]
pub struct DenseReshaper {
    config: ReshapeConfig,
}

impl DenseReshaper {
    pub fn new(config: ReshapeConfig) -> Self {
        Self { config }
    }

    /// Decode a Grid collection and reshape it, taking variable attributes
    /// from the collection's parameters.
    #[tracing::instrument(skip_all)]
    pub fn reshape_collection(&self, collection: &CoverageCollection) -> Result<DenseDataset> {
        let records = GridDecoder::new(self.config.clone()).decode(collection)?;
        self.reshape(&records, &collection.parameters)
    }

    /// Place every record into dense NaN-filled arrays.
    pub fn reshape(
        &self,
        records: &[CoverageRecord],
        parameters: &BTreeMap<String, Parameter>,
    ) -> Result<DenseDataset> {
        if records.is_empty() {
            return Err(ReshapeError::no_data());
        }
        for record in records {
            validate(record)?;
        }

        let axes = self.collect_axes(records);
        let placements = records
            .iter()
            .map(|r| self.place(r, &axes))
            .collect::<Result<Vec<_>>>()?;

        let names: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.ranges.keys().map(String::as_str))
            .collect();

        let shape = axes.shape();
        let mut variables = BTreeMap::new();
        for name in names {
            let buffer = self.fill(name, records, &placements, &axes);
            let cells = buffer.len();
            let data = Array6::from_shape_vec(shape, buffer).map_err(|e| {
                ReshapeError::shape_mismatch(
                    format!("dense array '{}' ({})", name, e),
                    shape.iter().product(),
                    cells,
                )
            })?;
            variables.insert(
                name.to_string(),
                DenseVariable {
                    data,
                    attrs: variable_attrs(parameters.get(name)),
                },
            );
        }

        let mut attrs = records[0].metadata.clone();
        for key in ["number", "step", FORECAST_DATE] {
            attrs.remove(key);
        }

        tracing::debug!(
            records = records.len(),
            variables = variables.len(),
            shape = ?shape,
            "dense dataset built"
        );
        Ok(DenseDataset { axes, variables, attrs })
    }

    fn collect_axes(&self, records: &[CoverageRecord]) -> DenseAxes {
        let dates: BTreeSet<&String> = records.iter().map(|r| &r.date).collect();
        let numbers: BTreeSet<&Scalar> = records.iter().map(|r| &r.number).collect();
        let steps: BTreeSet<&Scalar> = records.iter().map(|r| &r.step).collect();
        let levels: BTreeSet<&Scalar> = records.iter().flat_map(|r| &r.levels).collect();

        let tolerance = self.config.coordinate_tolerance;
        let mut lats: Vec<f64> = records.iter().flat_map(|r| r.latitudes.iter().copied()).collect();
        let mut lons: Vec<f64> = records.iter().flat_map(|r| r.longitudes.iter().copied()).collect();
        lats.sort_by(f64::total_cmp);
        lons.sort_by(f64::total_cmp);

        DenseAxes {
            dates: dates.into_iter().cloned().collect(),
            numbers: numbers.into_iter().cloned().collect(),
            steps: steps.into_iter().cloned().collect(),
            levels: levels.into_iter().cloned().collect(),
            latitudes: dedup_within(lats, tolerance),
            longitudes: dedup_within(lons, tolerance),
        }
    }

    fn place(&self, record: &CoverageRecord, axes: &DenseAxes) -> Result<Placement> {
        let tolerance = self.config.coordinate_tolerance;
        let missing = |what: &str| {
            ReshapeError::invalid_document(format!(
                "{} of record {}/{}/{} not on the dense axis",
                what, record.date, record.number, record.step
            ))
        };

        let d = axes.dates.binary_search(&record.date).map_err(|_| missing("date"))?;
        let n = axes.numbers.binary_search(&record.number).map_err(|_| missing("number"))?;
        let s = axes.steps.binary_search(&record.step).map_err(|_| missing("step"))?;

        let levels = record
            .levels
            .iter()
            .map(|l| axes.levels.binary_search(l).map_err(|_| missing("level")))
            .collect::<Result<Vec<_>>>()?;
        let lats = record
            .latitudes
            .iter()
            .map(|v| nearest_within(&axes.latitudes, *v, tolerance).ok_or_else(|| missing("latitude")))
            .collect::<Result<Vec<_>>>()?;
        let lons = record
            .longitudes
            .iter()
            .map(|v| nearest_within(&axes.longitudes, *v, tolerance).ok_or_else(|| missing("longitude")))
            .collect::<Result<Vec<_>>>()?;

        for (what, indices) in [("levels", &levels), ("latitudes", &lats), ("longitudes", &lons)] {
            let distinct = distinct_count(indices);
            if distinct != indices.len() {
                return Err(ReshapeError::shape_mismatch(
                    format!(
                        "{} of record {}/{}/{} merged onto the dense axis",
                        what, record.date, record.number, record.step
                    ),
                    indices.len(),
                    distinct,
                ));
            }
        }

        Ok(Placement {
            block: (d * axes.numbers.len() + n) * axes.steps.len() + s,
            levels,
            lats,
            lons,
        })
    }

    fn fill(
        &self,
        name: &str,
        records: &[CoverageRecord],
        placements: &[Placement],
        axes: &DenseAxes,
    ) -> Vec<f64> {
        let block_len = axes.block_len();
        let total: usize = axes.shape().iter().product();
        let mut buffer = vec![f64::NAN; total];
        if block_len == 0 {
            return buffer;
        }

        let blocks = total / block_len;
        let mut by_block: Vec<Vec<usize>> = vec![Vec::new(); blocks];
        for (i, placement) in placements.iter().enumerate() {
            if records[i].ranges.contains_key(name) {
                by_block[placement.block].push(i);
            }
        }

        let (nlat, nlon) = (axes.latitudes.len(), axes.longitudes.len());
        let write = |(block, chunk): (usize, &mut [f64])| {
            for &i in &by_block[block] {
                if let Some(range) = records[i].ranges.get(name) {
                    write_block(chunk, &range.values, &placements[i], nlat, nlon);
                }
            }
        };

        if total >= self.config.parallel_threshold {
            buffer.par_chunks_mut(block_len).enumerate().for_each(write);
        } else {
            buffer.chunks_mut(block_len).enumerate().for_each(write);
        }
        buffer
    }
}

/// Copy one record's `[level, lat, lon]` values into its dense block.
fn write_block(chunk: &mut [f64], values: &[Option<f64>], placement: &Placement, nlat: usize, nlon: usize) {
    let (local_lat, local_lon) = (placement.lats.len(), placement.lons.len());
    for (li, &gl) in placement.levels.iter().enumerate() {
        for (ai, &ga) in placement.lats.iter().enumerate() {
            for (oi, &go) in placement.lons.iter().enumerate() {
                let src = (li * local_lat + ai) * local_lon + oi;
                let dst = (gl * nlat + ga) * nlon + go;
                chunk[dst] = values[src].unwrap_or(f64::NAN);
            }
        }
    }
}

fn distinct_count(indices: &[usize]) -> usize {
    indices.iter().collect::<BTreeSet<_>>().len()
}

fn validate(record: &CoverageRecord) -> Result<()> {
    let declared = [
        record.levels.len(),
        record.latitudes.len(),
        record.longitudes.len(),
    ];
    for (name, range) in &record.ranges {
        let expected: usize = range.shape.iter().product();
        if range.values.len() != expected {
            return Err(ReshapeError::shape_mismatch(
                format!("record range '{}'", name),
                expected,
                range.values.len(),
            ));
        }
        if range.shape != declared {
            return Err(ReshapeError::shape_mismatch(
                format!("record range '{}' against its axes", name),
                declared.iter().product(),
                expected,
            ));
        }
    }
    Ok(())
}

fn variable_attrs(parameter: Option<&Parameter>) -> MarsMetadata {
    let mut attrs = MarsMetadata::new();
    let Some(parameter) = parameter else {
        return attrs;
    };
    attrs.insert("type".to_string(), Value::String(parameter.type_.clone()));
    if let Some(units) = parameter.unit_symbol() {
        attrs.insert("units".to_string(), Value::String(units.to_string()));
    }
    if let Some(label) = &parameter.observed_property.label {
        attrs.insert("long_name".to_string(), Value::String(label.text().to_string()));
    }
    if let Some(description) = &parameter.description {
        attrs.insert(
            "description".to_string(),
            Value::String(description.text().to_string()),
        );
    }
    attrs
}
