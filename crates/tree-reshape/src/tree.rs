//! Retrieval tree model.
//!
//! The query engine returns a tree whose internal nodes each name one axis
//! and carry the values selected on it. Nesting order varies between calls.
//! Leaves carry the geographic values of the innermost axis together with a
//! flat result buffer covering every axis that was not materialised as a
//! tree level.

use serde::{Deserialize, Serialize};

use crate::error::{ReshapeError, Result};
use crate::scalar::Scalar;

/// A node of the retrieval tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreeNode {
    /// Axis name (`date`, `number`, `levelist`, `longitude`, ...).
    pub axis: String,

    /// Values selected on this axis.
    #[serde(default)]
    pub values: Vec<Scalar>,

    /// Child nodes. Empty for a leaf.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,

    /// Flat result buffer, present on leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Option<f64>>>,
}

impl TreeNode {
    /// Internal node.
    pub fn branch(axis: impl Into<String>, values: Vec<Scalar>, children: Vec<TreeNode>) -> Self {
        Self {
            axis: axis.into(),
            values,
            children,
            result: None,
        }
    }

    /// Leaf node over geographic values with its result buffer.
    pub fn leaf(axis: impl Into<String>, values: Vec<f64>, result: Vec<Option<f64>>) -> Self {
        Self {
            axis: axis.into(),
            values: values.into_iter().map(Scalar::Float).collect(),
            children: Vec::new(),
            result: Some(result),
        }
    }

    /// Parse a tree from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn kind(&self) -> AxisKind {
        AxisKind::of(&self.axis)
    }

    /// Result buffer of a leaf; empty for internal nodes.
    pub fn result(&self) -> &[Option<f64>] {
        self.result.as_deref().unwrap_or(&[])
    }

    /// Whether the result carries no usable value.
    pub fn is_all_null(&self) -> bool {
        self.result().iter().all(Option::is_none)
    }

    /// Geographic values of a leaf as floats.
    pub fn geographic_values(&self) -> Result<Vec<f64>> {
        self.values
            .iter()
            .map(|v| {
                v.as_f64().ok_or_else(|| {
                    ReshapeError::invalid_tree(format!(
                        "non-numeric value '{}' on geographic axis '{}'",
                        v, self.axis
                    ))
                })
            })
            .collect()
    }
}

/// Role of an axis during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    /// `date` or `time`.
    Date,
    Level,
    Number,
    Param,
    Step,
    Latitude,
    Longitude,
    /// Any other axis; folded into metadata.
    Other,
}

impl AxisKind {
    pub fn of(name: &str) -> Self {
        match name {
            "date" | "time" => AxisKind::Date,
            "levelist" => AxisKind::Level,
            "number" => AxisKind::Number,
            "param" => AxisKind::Param,
            "step" => AxisKind::Step,
            "latitude" => AxisKind::Latitude,
            "longitude" => AxisKind::Longitude,
            _ => AxisKind::Other,
        }
    }

    /// Axes whose values are copied to metadata from the first child value.
    pub fn records_metadata(self) -> bool {
        matches!(self, AxisKind::Number | AxisKind::Step | AxisKind::Other)
    }

    /// Axes that take part in leaf slicing.
    pub fn is_slicing(self) -> bool {
        matches!(
            self,
            AxisKind::Level | AxisKind::Number | AxisKind::Param | AxisKind::Step
        )
    }
}
