//! Shape and stride arithmetic for leaf result buffers.
//!
//! A leaf's flat result is laid out row-major over the fixed priority
//! level → number → param → step, with the leaf's geographic points
//! innermost. The order is fixed and never taken from the tree's nesting.

use std::ops::Range;

use crate::error::{ReshapeError, Result};
use crate::tree::AxisKind;

/// Slicing axes, outermost first.
pub const AXIS_PRIORITY: [AxisKind; 4] = [
    AxisKind::Level,
    AxisKind::Number,
    AxisKind::Param,
    AxisKind::Step,
];

/// Nested stride lengths derived from a result length and axis cardinalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrideLayout {
    /// Cardinalities in priority order.
    pub counts: [usize; 4],
    pub level_len: usize,
    pub num_len: usize,
    pub para_len: usize,
    pub step_len: usize,
}

impl StrideLayout {
    /// Compute strides for `result_len` values over `counts`
    /// (levels, numbers, params, steps).
    ///
    /// Every division must be exact.
    pub fn compute(result_len: usize, counts: [usize; 4]) -> Result<Self> {
        let mut lens = [0usize; 4];
        let mut remaining = result_len;
        for (i, (&count, kind)) in counts.iter().zip(AXIS_PRIORITY).enumerate() {
            remaining = exact_div(remaining, count, kind)?;
            lens[i] = remaining;
        }
        Ok(Self {
            counts,
            level_len: lens[0],
            num_len: lens[1],
            para_len: lens[2],
            step_len: lens[3],
        })
    }

    /// Like [`StrideLayout::compute`], additionally requiring the innermost
    /// stride to equal the leaf's point count.
    pub fn for_leaf(result_len: usize, counts: [usize; 4], points: usize) -> Result<Self> {
        let layout = Self::compute(result_len, counts)?;
        if layout.step_len != points {
            return Err(ReshapeError::shape_mismatch(
                "leaf point count",
                layout.combinations() * points,
                result_len,
            ));
        }
        Ok(layout)
    }

    /// Offset of the slice for one (level, number, param, step) index tuple.
    pub fn start(&self, level: usize, number: usize, param: usize, step: usize) -> usize {
        level * self.level_len + number * self.num_len + param * self.para_len + step * self.step_len
    }

    pub fn slice(&self, level: usize, number: usize, param: usize, step: usize) -> Range<usize> {
        let start = self.start(level, number, param, step);
        start..start + self.step_len
    }

    /// Number of (level, number, param, step) combinations.
    pub fn combinations(&self) -> usize {
        self.counts.iter().product()
    }

    /// All index tuples with their slices, in priority order.
    pub fn slices(&self) -> impl Iterator<Item = ([usize; 4], Range<usize>)> + '_ {
        let [nl, nn, np, ns] = self.counts;
        (0..nl).flat_map(move |l| {
            (0..nn).flat_map(move |n| {
                (0..np).flat_map(move |p| {
                    (0..ns).map(move |s| ([l, n, p, s], self.slice(l, n, p, s)))
                })
            })
        })
    }
}

fn exact_div(len: usize, count: usize, kind: AxisKind) -> Result<usize> {
    let context = format!("{:?} stride", kind).to_lowercase();
    if count == 0 {
        return Err(ReshapeError::shape_mismatch(context, 1, 0));
    }
    if len % count != 0 {
        // Nearest length that would divide evenly.
        let expected = (len / count + 1) * count;
        return Err(ReshapeError::shape_mismatch(context, expected, len));
    }
    Ok(len / count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_strides() {
        let layout = StrideLayout::compute(24, [2, 3, 2, 1]).unwrap();
        assert_eq!(layout.level_len, 12);
        assert_eq!(layout.num_len, 4);
        assert_eq!(layout.para_len, 2);
        assert_eq!(layout.step_len, 2);
        assert_eq!(layout.combinations(), 12);
    }

    #[test]
    fn test_start_offsets() {
        let layout = StrideLayout::compute(24, [2, 3, 2, 1]).unwrap();
        assert_eq!(layout.start(0, 0, 0, 0), 0);
        assert_eq!(layout.start(0, 0, 1, 0), 2);
        assert_eq!(layout.start(0, 1, 0, 0), 4);
        assert_eq!(layout.start(1, 2, 1, 0), 22);
        assert_eq!(layout.slice(1, 2, 1, 0), 22..24);
    }

    #[test]
    fn test_slices_partition_buffer() {
        let layout = StrideLayout::compute(36, [1, 3, 2, 2]).unwrap();
        let mut covered = vec![0u8; 36];
        for (_, range) in layout.slices() {
            assert_eq!(range.len(), layout.step_len);
            for i in range {
                covered[i] += 1;
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
        assert_eq!(layout.slices().count(), 12);
    }

    #[test]
    fn test_non_integral_stride() {
        let err = StrideLayout::compute(7, [2, 1, 1, 1]).unwrap_err();
        match err {
            ReshapeError::ShapeMismatch { context, expected, actual } => {
                assert_eq!(context, "level stride");
                assert_eq!(expected, 8);
                assert_eq!(actual, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_inner_stride_mismatch() {
        // 12 = 2 numbers * 3 params * 2, leaves a step of 1 not dividing
        assert!(StrideLayout::compute(12, [1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_leaf_point_count() {
        assert!(StrideLayout::for_leaf(6, [1, 2, 1, 1], 3).is_ok());
        let err = StrideLayout::for_leaf(6, [1, 2, 1, 1], 2).unwrap_err();
        assert!(matches!(
            err,
            ReshapeError::ShapeMismatch { expected: 4, actual: 6, .. }
        ));
    }

    #[test]
    fn test_zero_cardinality() {
        assert!(StrideLayout::compute(6, [0, 1, 1, 1]).is_err());
    }
}
