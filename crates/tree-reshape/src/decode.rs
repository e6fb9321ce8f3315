//! Decoding of Grid collections into per-coverage records.
//!
//! Each coverage is split along its `t` axis, so every record carries one
//! (date, number, step) assignment and a `[level, latitude, longitude]`
//! block per parameter.

use std::collections::BTreeMap;

use covjson_protocol::{Axis, AxisValue, Coverage, CoverageCollection, MarsMetadata};
use serde_json::Value;

use crate::config::ReshapeConfig;
use crate::error::{ReshapeError, Result};
use crate::scalar::Scalar;
use crate::walker::FORECAST_DATE;

/// One parameter block of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRange {
    /// Declared local shape `[levels, latitudes, longitudes]`.
    pub shape: [usize; 3],
    /// Row-major values, null for missing.
    pub values: Vec<Option<f64>>,
}

/// A decoded coverage slice for one (date, number, step).
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRecord {
    pub date: String,
    pub number: Scalar,
    pub step: Scalar,
    pub levels: Vec<Scalar>,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    pub ranges: BTreeMap<String, RecordRange>,
    pub metadata: MarsMetadata,
}

/// Reads Grid collections back into records.
#[derive(Debug, Clone, Default)]
pub struct GridDecoder {
    config: ReshapeConfig,
}

impl GridDecoder {
    pub fn new(config: ReshapeConfig) -> Self {
        Self { config }
    }

    /// Decode every coverage of a collection.
    pub fn decode(&self, collection: &CoverageCollection) -> Result<Vec<CoverageRecord>> {
        let mut records = Vec::new();
        for coverage in &collection.coverages {
            records.extend(self.decode_coverage(coverage)?);
        }
        tracing::debug!(
            coverages = collection.coverages.len(),
            records = records.len(),
            "grid collection decoded"
        );
        Ok(records)
    }

    /// Parse and decode a JSON document.
    pub fn decode_json(&self, json: &str) -> Result<Vec<CoverageRecord>> {
        let collection: CoverageCollection = serde_json::from_str(json)?;
        self.decode(&collection)
    }

    /// Split one coverage into per-step records.
    pub fn decode_coverage(&self, coverage: &Coverage) -> Result<Vec<CoverageRecord>> {
        let metadata = &coverage.metadata;
        let domain = &coverage.domain;

        let date = match metadata.get(FORECAST_DATE) {
            Some(Value::String(s)) => s.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => self.config.undated_key.clone(),
        };
        let number = metadata
            .get("number")
            .and_then(Scalar::from_json)
            .unwrap_or_default();

        let steps = match domain.axis_any(&["t"]) {
            Some(axis) => scalars(axis, "t")?,
            None => vec![metadata
                .get("step")
                .and_then(Scalar::from_json)
                .unwrap_or_default()],
        };
        let levels = match domain.axis_any(&["levelist", "z"]) {
            Some(axis) if !axis.is_empty() => scalars(axis, "levelist")?,
            _ => vec![Scalar::default()],
        };
        let latitudes = floats(domain.axis_any(&["latitude", "x"]), "latitude")?;
        let longitudes = floats(domain.axis_any(&["longitude", "y"]), "longitude")?;

        let block = [levels.len(), latitudes.len(), longitudes.len()];
        let block_len: usize = block.iter().product();
        let expected = steps.len() * block_len;

        let mut per_step: Vec<BTreeMap<String, RecordRange>> = vec![BTreeMap::new(); steps.len()];
        for (name, range) in &coverage.ranges {
            if !range.is_consistent() {
                return Err(ReshapeError::shape_mismatch(
                    format!("range '{}' declared shape", name),
                    range.expected_len(),
                    range.values.len(),
                ));
            }
            if let Some(shape) = &range.shape {
                if shape.len() >= 3 && shape[shape.len() - 3..] != block[..] {
                    return Err(ReshapeError::shape_mismatch(
                        format!("range '{}' against its domain axes", name),
                        block_len,
                        shape[shape.len() - 3..].iter().product(),
                    ));
                }
            }
            if range.values.len() != expected {
                return Err(ReshapeError::shape_mismatch(
                    format!("range '{}' against its domain axes", name),
                    expected,
                    range.values.len(),
                ));
            }
            for (i, chunk) in range.values.chunks(block_len.max(1)).enumerate() {
                if let Some(slot) = per_step.get_mut(i) {
                    slot.insert(
                        name.clone(),
                        RecordRange {
                            shape: block,
                            values: chunk.to_vec(),
                        },
                    );
                }
            }
        }

        Ok(steps
            .into_iter()
            .zip(per_step)
            .map(|(step, ranges)| CoverageRecord {
                date: date.clone(),
                number: number.clone(),
                step,
                levels: levels.clone(),
                latitudes: latitudes.clone(),
                longitudes: longitudes.clone(),
                ranges,
                metadata: metadata.clone(),
            })
            .collect())
    }
}

/// Scalar view of a document axis value.
pub fn scalar_from_axis(value: &AxisValue) -> Option<Scalar> {
    match value {
        AxisValue::Float(v) => Some(Scalar::from_number(*v)),
        AxisValue::String(s) => Scalar::from_json(&Value::String(s.clone())),
        AxisValue::Tuple(_) => None,
    }
}

fn scalars(axis: &Axis, name: &str) -> Result<Vec<Scalar>> {
    axis.values
        .iter()
        .map(|v| {
            scalar_from_axis(v).ok_or_else(|| {
                ReshapeError::invalid_document(format!("composite value on axis '{}'", name))
            })
        })
        .collect()
}

fn floats(axis: Option<&Axis>, name: &str) -> Result<Vec<f64>> {
    axis.and_then(Axis::as_floats).ok_or_else(|| {
        ReshapeError::invalid_document(format!("missing or non-numeric '{}' axis", name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use covjson_protocol::{Domain, DomainType, NdArray};
    use serde_json::json;

    fn names() -> Vec<String> {
        ["t", "levelist", "latitude", "longitude"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn coverage(steps: Vec<f64>, values: Vec<Option<f64>>) -> Coverage {
        let shape = vec![steps.len(), 1, 2, 1];
        let mut metadata = MarsMetadata::new();
        metadata.insert(FORECAST_DATE.to_string(), json!("2017-01-01T00:00:00Z"));
        metadata.insert("number".to_string(), json!(3));
        Coverage::new(Domain::grid(
            steps.into_iter().map(AxisValue::Float).collect(),
            vec![AxisValue::Float(500.0)],
            vec![10.0, 20.0],
            vec![5.0],
        ))
        .with_metadata(metadata)
        .with_range("t", NdArray::new(values, shape, names()))
    }

    #[test]
    fn test_split_along_t() {
        let cov = coverage(
            vec![0.0, 6.0],
            vec![Some(1.0), Some(2.0), Some(3.0), None],
        );
        let records = GridDecoder::default().decode_coverage(&cov).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].date, "2017-01-01T00:00:00Z");
        assert_eq!(records[0].number, Scalar::Int(3));
        assert_eq!(records[0].step, Scalar::Int(0));
        assert_eq!(records[0].levels, vec![Scalar::Int(500)]);
        assert_eq!(records[0].ranges["t"].shape, [1, 2, 1]);
        assert_eq!(records[0].ranges["t"].values, vec![Some(1.0), Some(2.0)]);

        assert_eq!(records[1].step, Scalar::Int(6));
        assert_eq!(records[1].ranges["t"].values, vec![Some(3.0), None]);
    }

    #[test]
    fn test_inconsistent_range() {
        let cov = coverage(vec![0.0], vec![Some(1.0)]);
        let err = GridDecoder::default().decode_coverage(&cov).unwrap_err();
        assert!(matches!(
            err,
            ReshapeError::ShapeMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn test_missing_latitude_axis() {
        let mut cov = coverage(vec![0.0], vec![Some(1.0), Some(2.0)]);
        cov.domain.axes.remove("latitude");
        let err = GridDecoder::default().decode_coverage(&cov).unwrap_err();
        assert!(matches!(err, ReshapeError::InvalidDocument(_)));
    }

    #[test]
    fn test_defaults_without_metadata() {
        let mut cov = coverage(vec![0.0], vec![Some(1.0), Some(2.0)]);
        cov.metadata.clear();
        cov.domain.axes.remove("levelist");
        let records = GridDecoder::default().decode_coverage(&cov).unwrap();
        assert_eq!(records[0].date, "0");
        assert_eq!(records[0].number, Scalar::Int(0));
        assert_eq!(records[0].levels, vec![Scalar::Int(0)]);
    }

    #[test]
    fn test_decode_json_document() {
        let mut collection = CoverageCollection::new(DomainType::Grid);
        collection.push_coverage(coverage(vec![0.0], vec![Some(1.0), Some(2.0)]));
        let json = serde_json::to_string(&collection).unwrap();
        let records = GridDecoder::default().decode_json(&json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].latitudes, vec![10.0, 20.0]);
    }
}
