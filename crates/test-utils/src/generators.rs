//! Synthetic retrieval trees with predictable leaf values.
//!
//! Every generated leaf value encodes its own coordinates (see
//! [`cell_value`]), so a test can check where a value ended up without
//! keeping a copy of the input.

use serde_json::{json, Value};

/// Axis names a [`TreeSpec`] can nest.
pub const NESTABLE_AXES: [&str; 5] = ["date", "levelist", "number", "param", "step"];

/// Value at one cell of a synthetic retrieval.
///
/// Indices are positions in a [`TreeSpec`]'s axis lists. Every index except
/// `date` must stay below ten for the encoding to be unique.
///
/// # Example
///
/// ```
/// use test_utils::cell_value;
///
/// assert_eq!(cell_value(1, 0, 1, 0, 2, 3, 4), 1_010_234.0);
/// ```
pub fn cell_value(
    date: usize,
    level: usize,
    number: usize,
    param: usize,
    step: usize,
    lat: usize,
    lon: usize,
) -> f64 {
    (date * 1_000_000 + level * 100_000 + number * 10_000 + param * 1_000 + step * 100 + lat * 10 + lon)
        as f64
}

/// Shape of a synthetic retrieval tree.
///
/// `nesting` lists the axes materialised as tree levels, outermost first.
/// A `date` level fans out into one node per date; any other level is a
/// single node carrying all of its values. Below the nesting, each latitude
/// gets its own node with a longitude leaf whose result is laid out
/// level → number → param → step → longitude. Axes left out of `nesting`
/// are absent from the tree and their lists are ignored.
#[derive(Debug, Clone)]
pub struct TreeSpec {
    pub nesting: Vec<&'static str>,
    pub dates: Vec<String>,
    pub levels: Vec<i64>,
    pub numbers: Vec<i64>,
    pub params: Vec<String>,
    pub steps: Vec<i64>,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
}

impl Default for TreeSpec {
    fn default() -> Self {
        Self {
            nesting: vec!["date", "param"],
            dates: vec!["20170101".to_string()],
            levels: vec![],
            numbers: vec![],
            params: vec!["167".to_string()],
            steps: vec![],
            latitudes: vec![50.0],
            longitudes: vec![1.0, 2.0],
        }
    }
}

impl TreeSpec {
    /// Whether `axis` is materialised in the tree.
    pub fn nests(&self, axis: &str) -> bool {
        self.nesting.iter().any(|a| *a == axis)
    }

    /// Cardinality seen by the walker (1 for absent axes).
    pub fn axis_len(&self, axis: &str) -> usize {
        if !self.nests(axis) {
            return 1;
        }
        match axis {
            "date" => self.dates.len(),
            "levelist" => self.levels.len(),
            "number" => self.numbers.len(),
            "param" => self.params.len(),
            "step" => self.steps.len(),
            _ => 1,
        }
    }

    /// Result buffer of the leaf under date `date` and latitude `lat`.
    pub fn leaf_result(&self, date: usize, lat: usize) -> Vec<f64> {
        let mut result = Vec::new();
        for l in 0..self.axis_len("levelist") {
            for n in 0..self.axis_len("number") {
                for p in 0..self.axis_len("param") {
                    for s in 0..self.axis_len("step") {
                        for o in 0..self.longitudes.len() {
                            result.push(cell_value(date, l, n, p, s, lat, o));
                        }
                    }
                }
            }
        }
        result
    }

    /// Number of values over all leaves.
    pub fn value_count(&self) -> usize {
        NESTABLE_AXES
            .iter()
            .map(|a| self.axis_len(a))
            .product::<usize>()
            * self.latitudes.len()
            * self.longitudes.len()
    }

    /// The tree as JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "axis": "root",
            "values": [],
            "children": self.build(0, 0),
        })
    }

    fn build(&self, depth: usize, date: usize) -> Vec<Value> {
        let Some(&axis) = self.nesting.get(depth) else {
            return self.latitude_nodes(date);
        };
        if axis == "date" {
            return self
                .dates
                .iter()
                .enumerate()
                .map(|(d, value)| {
                    json!({
                        "axis": "date",
                        "values": [value],
                        "children": self.build(depth + 1, d),
                    })
                })
                .collect();
        }
        vec![json!({
            "axis": axis,
            "values": self.values(axis),
            "children": self.build(depth + 1, date),
        })]
    }

    fn values(&self, axis: &str) -> Value {
        match axis {
            "levelist" => json!(self.levels),
            "number" => json!(self.numbers),
            "param" => json!(self.params),
            "step" => json!(self.steps),
            _ => json!([]),
        }
    }

    fn latitude_nodes(&self, date: usize) -> Vec<Value> {
        self.latitudes
            .iter()
            .enumerate()
            .map(|(a, lat)| {
                json!({
                    "axis": "latitude",
                    "values": [lat],
                    "children": [{
                        "axis": "longitude",
                        "values": self.longitudes,
                        "result": self.leaf_result(date, a),
                    }],
                })
            })
            .collect()
    }
}

/// Evenly spaced coordinates starting at `start`.
pub fn coordinate_range(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}
