//! Test support for the reshaping workspace.
//!
//! - [`TreeSpec`] builds retrieval trees of any nesting order whose leaf
//!   values encode their own coordinates ([`cell_value`]).
//! - [`fixtures`] holds hand-written trees and documents for edge cases.
//! - [`assert_approx_eq!`] and [`assert_coords_approx_eq!`] compare floats.
//!
//! Trees come out as `serde_json::Value`; tests deserialize them into the
//! engine's own tree type.
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Assert that two numbers differ by at most `epsilon`.
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(50.003, 50.0, 0.01);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that two `(latitude, longitude)` pairs match per axis.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($lat1:expr, $lon1:expr), ($lat2:expr, $lon2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($lat1, $lat2, $epsilon);
        $crate::assert_approx_eq!($lon1, $lon2, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_jitter_within_tolerance() {
        let (lat, lon) = crate::points::JITTERED;
        let (lat0, lon0) = crate::points::ORIGIN;
        assert_coords_approx_eq!((lat, lon), (lat0, lon0), 0.01);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_distinct_point_rejected() {
        assert_approx_eq!(crate::points::DISTINCT.0, crate::points::ORIGIN.0, 0.01);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_nan_never_approx_equal() {
        assert_approx_eq!(f64::NAN, 0.0, 1.0);
    }
}
