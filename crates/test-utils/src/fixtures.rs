//! Common test fixtures for reshaping tests.
//!
//! Hand-written retrieval trees and documents for the scenarios the
//! generators do not cover: fixed numeric examples, null branches, jittered
//! coordinates and buffers that cannot be sliced.

use serde_json::{json, Value};

/// Date values used across fixtures.
pub mod dates {
    pub const DAY_1: &str = "2017-01-01";
    pub const DAY_2: &str = "2017-01-02";

    /// Range-store keys the walker derives from the dates above.
    pub const DAY_1_KEY: &str = "2017-01-01T00:00:00Z";
    pub const DAY_2_KEY: &str = "2017-01-02T00:00:00Z";
}

/// Coordinate pairs for tolerance tests, as `(latitude, longitude)`.
pub mod points {
    /// Reference point.
    pub const ORIGIN: (f64, f64) = (1.000, 50.000);
    /// Within 0.01 of [`ORIGIN`] on both axes.
    pub const JITTERED: (f64, f64) = (1.005, 50.003);
    /// 0.02 away from [`ORIGIN`] in latitude.
    pub const DISTINCT: (f64, f64) = (1.02, 50.00);
}

/// Leaf node over longitudes with a fully populated result.
pub fn leaf(longitudes: &[f64], result: &[f64]) -> Value {
    json!({
        "axis": "longitude",
        "values": longitudes,
        "result": result,
    })
}

/// Leaf node whose result is entirely null.
pub fn null_leaf(longitudes: &[f64]) -> Value {
    let result: Vec<Value> = longitudes.iter().map(|_| Value::Null).collect();
    json!({
        "axis": "longitude",
        "values": longitudes,
        "result": result,
    })
}

/// Internal node.
pub fn node(axis: &str, values: Value, children: Vec<Value>) -> Value {
    json!({
        "axis": axis,
        "values": values,
        "children": children,
    })
}

/// Root node over `children`.
pub fn root(children: Vec<Value>) -> Value {
    node("root", json!([]), children)
}

/// One date node selecting two dates, above a single param, numbers
/// `{0, 1}` and one three-point leaf holding `[10, 20, 30, 40, 50, 60]`.
///
/// Walking it yields four buckets of three values: number 0 gets
/// `[10, 20, 30]` and number 1 gets `[40, 50, 60]` under both dates.
pub fn two_dates_two_numbers() -> Value {
    root(vec![node(
        "date",
        json!([dates::DAY_1, dates::DAY_2]),
        vec![param_numbers_leaf()],
    )])
}

/// [`two_dates_two_numbers`] with one date node per date.
pub fn two_dates_two_numbers_split() -> Value {
    root(vec![
        node("date", json!([dates::DAY_1]), vec![param_numbers_leaf()]),
        node("date", json!([dates::DAY_2]), vec![param_numbers_leaf()]),
    ])
}

fn param_numbers_leaf() -> Value {
    node(
        "param",
        json!(["167"]),
        vec![node(
            "number",
            json!([0, 1]),
            vec![node(
                "latitude",
                json!([50.0]),
                vec![leaf(&[1.0, 2.0, 3.0], &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0])],
            )],
        )],
    )
}

/// Numbers outside dates, where the first leaf under `DAY_1` is empty and
/// `DAY_1` only receives data after `DAY_2` has been entered.
pub fn late_data_for_first_date() -> Value {
    let date = |day: &str, child: Value| node("date", json!([day]), vec![child]);
    let row = |child: Value| node("latitude", json!([0.0]), vec![child]);
    root(vec![node(
        "param",
        json!(["2t"]),
        vec![
            node("number", json!([0]), vec![date(dates::DAY_1, row(null_leaf(&[0.0])))]),
            node("number", json!([1]), vec![date(dates::DAY_2, row(leaf(&[0.0], &[2.0])))]),
            node("number", json!([2]), vec![date(dates::DAY_1, row(leaf(&[0.0], &[3.0])))]),
        ],
    )])
}

/// One date with three latitude rows; the row at `null_row` has an all-null
/// leaf, the others carry `[row * 10 + 1, row * 10 + 2]`.
pub fn tree_with_null_row(null_row: usize) -> Value {
    let rows = (0..3)
        .map(|row| {
            let lons = [1.0, 2.0];
            let child = if row == null_row {
                null_leaf(&lons)
            } else {
                let base = (row * 10) as f64;
                leaf(&lons, &[base + 1.0, base + 2.0])
            };
            node("latitude", json!([10.0 * row as f64]), vec![child])
        })
        .collect();
    root(vec![node(
        "date",
        json!([dates::DAY_1]),
        vec![node("param", json!(["2t"]), rows)],
    )])
}

/// Two dates where every leaf under the second date is null.
pub fn tree_with_empty_date() -> Value {
    root(vec![
        node(
            "date",
            json!([dates::DAY_1]),
            vec![node(
                "param",
                json!(["2t"]),
                vec![node("latitude", json!([0.0]), vec![leaf(&[0.0], &[1.0])])],
            )],
        ),
        node(
            "date",
            json!([dates::DAY_2]),
            vec![node(
                "param",
                json!(["2t"]),
                vec![node("latitude", json!([0.0]), vec![null_leaf(&[0.0])])],
            )],
        ),
    ])
}

/// Two levels over a leaf of seven values, which cannot be split evenly.
pub fn indivisible_levels() -> Value {
    root(vec![node(
        "levelist",
        json!([500, 850]),
        vec![node(
            "param",
            json!(["t"]),
            vec![node(
                "latitude",
                json!([0.0]),
                vec![leaf(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])],
            )],
        )],
    )])
}

/// A leaf with no param anywhere above it.
pub fn tree_without_param() -> Value {
    root(vec![node(
        "date",
        json!([dates::DAY_1]),
        vec![node("latitude", json!([0.0]), vec![leaf(&[0.0], &[1.0])])],
    )])
}

/// Extra axes the walker does not slice on.
pub fn tree_with_unknown_axes() -> Value {
    root(vec![node(
        "class",
        json!(["od"]),
        vec![node(
            "stream",
            json!(["enfo"]),
            vec![node(
                "param",
                json!(["167"]),
                vec![node("latitude", json!([0.0]), vec![leaf(&[0.0], &[273.15])])],
            )],
        )],
    )])
}

/// A Grid CoverageJSON document in the layout produced upstream.
pub fn sample_grid_document() -> Value {
    json!({
        "type": "CoverageCollection",
        "domainType": "Grid",
        "parameters": {
            "2t": {
                "type": "Parameter",
                "description": {"en": "2 metre temperature"},
                "unit": {"symbol": "K"},
                "observedProperty": {"id": "2t", "label": {"en": "2 metre temperature"}}
            }
        },
        "referencing": [{
            "coordinates": ["latitude", "longitude", "levelist"],
            "system": {"type": "GeographicCRS", "id": "http://www.opengis.net/def/crs/OGC/1.3/CRS84"}
        }],
        "coverages": [
            {
                "type": "Coverage",
                "mars:metadata": {"class": "od", "number": 0, "step": 6, "Forecast date": "2017-01-01T00:00:00Z"},
                "domain": {
                    "type": "Domain",
                    "axes": {
                        "t": {"values": [0, 6]},
                        "levelist": {"values": [0]},
                        "latitude": {"values": [50.0, 51.0]},
                        "longitude": {"values": [1.0, 2.0]}
                    }
                },
                "ranges": {
                    "2t": {
                        "type": "NdArray",
                        "dataType": "float",
                        "axisNames": ["t", "levelist", "latitude", "longitude"],
                        "shape": [2, 1, 2, 2],
                        "values": [270.0, 271.0, 272.0, 273.0, 274.0, null, 276.0, 277.0]
                    }
                }
            },
            {
                "type": "Coverage",
                "mars:metadata": {"class": "od", "number": 1, "step": 6, "Forecast date": "2017-01-01T00:00:00Z"},
                "domain": {
                    "type": "Domain",
                    "axes": {
                        "t": {"values": [0, 6]},
                        "levelist": {"values": [0]},
                        "latitude": {"values": [50.0, 51.0]},
                        "longitude": {"values": [1.0, 2.0]}
                    }
                },
                "ranges": {
                    "2t": {
                        "type": "NdArray",
                        "dataType": "float",
                        "axisNames": ["t", "levelist", "latitude", "longitude"],
                        "shape": [2, 1, 2, 2],
                        "values": [280.0, 281.0, 282.0, 283.0, 284.0, 285.0, 286.0, 287.0]
                    }
                }
            }
        ]
    })
}
