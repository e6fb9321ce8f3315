//! Assembly of walk output into a Grid CoverageJSON collection.
//!
//! One coverage is emitted per (date, number). Each parameter range is the
//! concatenation over steps of the concatenation over levels of the
//! matching range-store buckets, shaped `[t, levelist, latitude, longitude]`.

use covjson_protocol::{
    AxisValue, Coverage, CoverageCollection, Domain, DomainType, MarsMetadata, NdArray,
    ParameterCatalogue, ReferenceSystemConnection,
};

use crate::config::ReshapeConfig;
use crate::error::{ReshapeError, Result};
use crate::range_store::RangeKey;
use crate::scalar::Scalar;
use crate::walker::{WalkOutput, FORECAST_DATE};

/// Axis names of every assembled range, outermost first.
pub const GRID_RANGE_AXES: [&str; 4] = ["t", "levelist", "latitude", "longitude"];

/// Coordinates covered by the geographic reference system.
pub const GRID_REFERENCED: [&str; 3] = ["latitude", "longitude", "levelist"];

/// Builds Grid collections from walk output.
#[derive(Debug, Clone)]
pub struct GridAssembler {
    catalogue: ParameterCatalogue,
    config: ReshapeConfig,
}

impl GridAssembler {
    pub fn new(catalogue: ParameterCatalogue, config: ReshapeConfig) -> Self {
        Self { catalogue, config }
    }

    #[tracing::instrument(skip_all)]
    pub fn assemble(&self, walk: &WalkOutput) -> Result<CoverageCollection> {
        let fields = &walk.fields;
        if !fields.has_params() {
            return Err(ReshapeError::no_data());
        }

        let levels = or_default(fields.levels());
        let numbers = or_default(fields.numbers());
        let steps = or_default(fields.steps());
        let params = fields.params();

        let mut collection = CoverageCollection::new(DomainType::Grid);
        collection.set_reference(ReferenceSystemConnection::geographic(
            &GRID_REFERENCED,
            self.config.crs_id.clone(),
        ));
        for param in params {
            let raw = param.to_string();
            collection.add_parameter(self.catalogue.short_name(&raw), self.catalogue.parameter(&raw));
        }

        let tolerance = self.config.coordinate_tolerance;
        for date in fields.dates() {
            let (lats, lons) = match walk.coords.get(date) {
                Some(entry) => (entry.latitudes(tolerance), entry.longitudes(tolerance)),
                None => (Vec::new(), Vec::new()),
            };
            let shape = vec![steps.len(), levels.len(), lats.len(), lons.len()];
            let expected: usize = shape.iter().product();

            for number in &numbers {
                let mut coverage = Coverage::new(Domain::grid(
                    steps.iter().map(axis_value).collect(),
                    levels.iter().map(axis_value).collect(),
                    lats.clone(),
                    lons.clone(),
                ));

                for param in params {
                    let raw = param.to_string();
                    let mut values = Vec::with_capacity(expected);
                    for step in &steps {
                        for level in &levels {
                            let key = RangeKey::new(
                                date.as_str(),
                                level.clone(),
                                number.clone(),
                                raw.as_str(),
                                step.clone(),
                            );
                            if let Some(bucket) = walk.ranges.get(&key) {
                                values.extend_from_slice(bucket);
                            }
                        }
                    }
                    if values.is_empty() {
                        continue;
                    }
                    if values.len() != expected {
                        return Err(ReshapeError::shape_mismatch(
                            format!("range '{}' for date {} number {}", raw, date, number),
                            expected,
                            values.len(),
                        ));
                    }
                    let axis_names = GRID_RANGE_AXES.iter().map(|a| a.to_string()).collect();
                    coverage = coverage.with_range(
                        self.catalogue.short_name(&raw),
                        NdArray::new(values, shape.clone(), axis_names),
                    );
                }

                if coverage.ranges.is_empty() {
                    continue;
                }
                coverage.metadata = self.coverage_metadata(&walk.metadata, date, number, &steps);
                collection.push_coverage(coverage);
            }
        }

        if collection.coverages.is_empty() {
            return Err(ReshapeError::no_data());
        }

        tracing::debug!(
            coverages = collection.coverages.len(),
            parameters = collection.parameters.len(),
            "grid collection assembled"
        );
        Ok(collection)
    }

    fn coverage_metadata(
        &self,
        base: &MarsMetadata,
        date: &str,
        number: &Scalar,
        steps: &[Scalar],
    ) -> MarsMetadata {
        let mut metadata = base.clone();
        metadata.insert("number".to_string(), number.to_json());
        if let Some(last) = steps.last() {
            metadata.insert("step".to_string(), last.to_json());
        }
        metadata.insert(
            FORECAST_DATE.to_string(),
            serde_json::Value::String(date.to_string()),
        );
        metadata
    }
}

fn or_default(values: &[Scalar]) -> Vec<Scalar> {
    if values.is_empty() {
        vec![Scalar::default()]
    } else {
        values.to_vec()
    }
}

/// Document axis value for a scalar.
pub fn axis_value(value: &Scalar) -> AxisValue {
    match value {
        Scalar::Int(v) => AxisValue::Float(*v as f64),
        Scalar::Float(v) => AxisValue::Float(*v),
        Scalar::Text(s) => AxisValue::String(s.clone()),
    }
}
