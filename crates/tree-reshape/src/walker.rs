//! Depth-first walk of a retrieval tree.
//!
//! The walker visits nodes left to right with an explicit stack. Entering a
//! node registers its axis (slicing axes into [`Fields`], dates into the
//! coordinate accumulator, everything else into metadata); leaving it
//! restores the axis state of the parent branch. At each leaf the flat
//! result is cut with [`StrideLayout`] and appended to the [`RangeStore`]
//! under every date active on the branch.
//!
//! Dates whose leaves were all empty are dropped once the walk ends, so the
//! surviving dates keep the order in which they were first entered.
//!
//! Axes that are neither slicing, temporal nor geographic are assumed to be
//! constant across siblings. Metadata keeps the first value of the most
//! recently entered node of each name; a tree whose siblings disagree on
//! such an axis is not detected.

use covjson_protocol::MarsMetadata;
use serde_json::Value;

use crate::config::ReshapeConfig;
use crate::coords::CoordinateAccumulator;
use crate::date_key::date_key;
use crate::error::{ReshapeError, Result};
use crate::fields::{ActiveAxes, Fields};
use crate::range_store::{RangeKey, RangeStore};
use crate::stride::{StrideLayout, AXIS_PRIORITY};
use crate::tree::{AxisKind, TreeNode};

/// Metadata key carrying the raw forecast date.
pub const FORECAST_DATE: &str = "Forecast date";

/// Latitude paired with leaf values when no latitude axis was seen.
const DEFAULT_LATITUDE: f64 = 0.0;

/// Counters collected during a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub leaves: usize,
    pub empty_branches: usize,
    pub unknown_axes: usize,
    pub points: usize,
}

/// Everything a walk produces, handed read-only to the assembler.
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    pub fields: Fields,
    pub coords: CoordinateAccumulator,
    pub metadata: MarsMetadata,
    pub ranges: RangeStore,
    pub stats: WalkStats,
}

enum Frame<'t> {
    Enter(&'t TreeNode, bool),
    Exit(ActiveAxes),
}

/// Walks retrieval trees into range buckets.
#[derive(Debug, Clone, Default)]
pub struct TreeWalker {
    config: ReshapeConfig,
}

impl TreeWalker {
    pub fn new(config: ReshapeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReshapeConfig {
        &self.config
    }

    /// Walk `root` and return the populated accumulators.
    ///
    /// The root node itself is not an axis. Fails with `NoData` when no
    /// param was discovered or every branch was empty, and with
    /// `ShapeMismatch` when a leaf cannot be sliced exactly.
    #[tracing::instrument(skip_all)]
    pub fn walk(&self, root: &TreeNode) -> Result<WalkOutput> {
        let mut out = WalkOutput::default();
        let mut stack = vec![Frame::Enter(root, false)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Exit(saved) => out.fields.restore(saved),
                Frame::Enter(node, register) => {
                    let saved = out.fields.snapshot();
                    if register {
                        self.register(node, &mut out)?;
                    }
                    if node.is_leaf() {
                        self.visit_leaf(node, &mut out)?;
                        out.fields.restore(saved);
                    } else {
                        stack.push(Frame::Exit(saved));
                        for child in node.children.iter().rev() {
                            stack.push(Frame::Enter(child, true));
                        }
                    }
                }
            }
        }

        prune_empty_dates(&mut out);

        if !out.fields.has_params() || out.ranges.is_empty() {
            tracing::debug!(
                params = out.fields.params().len(),
                leaves = out.stats.leaves,
                empty = out.stats.empty_branches,
                "walk produced no data"
            );
            return Err(ReshapeError::no_data());
        }

        tracing::debug!(
            dates = out.fields.dates().len(),
            buckets = out.ranges.len(),
            leaves = out.stats.leaves,
            empty = out.stats.empty_branches,
            points = out.stats.points,
            "walk complete"
        );
        Ok(out)
    }

    fn register(&self, node: &TreeNode, out: &mut WalkOutput) -> Result<()> {
        let kind = node.kind();

        if kind.records_metadata() {
            if let Some(first) = node.values.first() {
                out.metadata.insert(node.axis.clone(), first.to_json());
            }
            if kind == AxisKind::Other {
                out.stats.unknown_axes += 1;
                tracing::trace!(axis = %node.axis, "unrecognised axis folded into metadata");
            }
        }

        match kind {
            AxisKind::Date => {
                let Some(first) = node.values.first() else {
                    return Ok(());
                };
                let keys: Vec<String> = node
                    .values
                    .iter()
                    .map(|v| date_key(&v.to_string(), &self.config.date_suffix))
                    .collect();
                for key in &keys {
                    out.coords.seed(key);
                }
                out.fields.set_dates(&keys);
                out.metadata
                    .insert(FORECAST_DATE.to_string(), Value::String(first.to_string()));
            }
            AxisKind::Latitude => {
                if let Some(first) = node.values.first() {
                    let lat = first.as_f64().ok_or_else(|| {
                        ReshapeError::invalid_tree(format!("non-numeric latitude '{}'", first))
                    })?;
                    out.fields.set_latitude(lat);
                }
            }
            kind if kind.is_slicing() => out.fields.set_axis(kind, &node.values),
            _ => {}
        }
        Ok(())
    }

    fn visit_leaf(&self, leaf: &TreeNode, out: &mut WalkOutput) -> Result<()> {
        out.stats.leaves += 1;

        if leaf.is_all_null() {
            out.stats.empty_branches += 1;
            tracing::debug!(
                dates = ?out.fields.active().dates,
                axis = %leaf.axis,
                "empty branch discarded"
            );
            return Ok(());
        }

        let points = leaf.geographic_values()?;
        let result = leaf.result();

        let active = out.fields.active().clone();
        let counts = AXIS_PRIORITY.map(|kind| active.values(kind).len());
        let layout = StrideLayout::for_leaf(result.len(), counts, points.len())?;

        let dates = if active.dates.is_empty() {
            vec![self.config.undated_key.clone()]
        } else {
            active.dates.clone()
        };
        let lat = active.latitude.unwrap_or(DEFAULT_LATITUDE);
        let levels = active.values(AxisKind::Level);
        let numbers = active.values(AxisKind::Number);
        let params = active.values(AxisKind::Param);
        let steps = active.values(AxisKind::Step);

        for date in &dates {
            out.fields.discover_date(date);
            for &lon in &points {
                out.coords.push(date, lat, lon);
            }
            for ([l, n, p, s], range) in layout.slices() {
                let key = RangeKey::new(
                    date.as_str(),
                    levels[l].clone(),
                    numbers[n].clone(),
                    params[p].to_string(),
                    steps[s].clone(),
                );
                out.ranges.extend(key, &result[range]);
            }
        }
        out.stats.points += points.len();
        Ok(())
    }
}

/// Drop dates that ended the walk without a single point or bucket.
fn prune_empty_dates(out: &mut WalkOutput) {
    let empty: Vec<String> = out
        .coords
        .dates()
        .filter(|d| !out.coords.has_points(d))
        .chain(
            out.fields
                .dates()
                .iter()
                .map(String::as_str)
                .filter(|d| !out.ranges.has_date(d) && !out.coords.has_points(d)),
        )
        .map(str::to_string)
        .collect();
    for date in &empty {
        out.coords.remove(date);
    }
    out.fields.retain_dates(|d| !empty.iter().any(|e| e == d));
}
