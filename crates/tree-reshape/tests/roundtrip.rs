//! End-to-end conversions: tree → document → dense, and dense → document → dense.

use anyhow::Result;
use covjson_protocol::{CoverageCollection, ParameterCatalogue};
use tree_reshape::{
    collection_to_dense, tree_to_collection, DenseDataset, GridDecoder, ReshapeConfig, Scalar,
    TreeNode,
};

use test_utils::{assert_approx_eq, assert_coords_approx_eq, cell_value, fixtures, TreeSpec};

fn through_json(collection: &CoverageCollection) -> Result<CoverageCollection> {
    let json = serde_json::to_string(collection)?;
    Ok(serde_json::from_str(&json)?)
}

fn assert_same_cells(left: &DenseDataset, right: &DenseDataset) {
    assert_eq!(left.axes, right.axes);
    assert_eq!(
        left.variables.keys().collect::<Vec<_>>(),
        right.variables.keys().collect::<Vec<_>>()
    );
    for (name, variable) in &left.variables {
        let other = &right.variables[name].data;
        for (a, b) in variable.data.iter().zip(other.iter()) {
            if a.is_nan() {
                assert!(b.is_nan(), "{name}: expected NaN, found {b}");
            } else {
                assert_eq!(a, b, "{name}");
            }
        }
    }
}

#[test]
fn test_tree_values_land_in_their_cells() -> Result<()> {
    let spec = TreeSpec {
        nesting: vec!["date", "step", "number", "levelist", "param"],
        dates: vec!["20170101".into(), "20170102".into()],
        levels: vec![500, 850],
        numbers: vec![0, 1],
        params: vec!["167".into(), "130".into()],
        steps: vec![0, 6],
        latitudes: vec![50.0, 51.0, 52.0],
        longitudes: vec![1.0, 2.0],
    };
    let tree: TreeNode = serde_json::from_value(spec.to_json())?;
    let config = ReshapeConfig::default();

    let collection = tree_to_collection(&tree, &ParameterCatalogue::ecmwf(), &config)?;
    assert_eq!(collection.coverages.len(), 4);
    let dataset = collection_to_dense(&through_json(&collection)?, &config)?;

    assert_eq!(dataset.shape(), [2, 2, 2, 2, 3, 2]);
    assert_eq!(
        dataset.axes.dates,
        vec!["2017-01-01T00:00:00Z", "2017-01-02T00:00:00Z"]
    );
    assert_eq!(dataset.axes.levels, vec![Scalar::Int(500), Scalar::Int(850)]);

    // "2t" and "t" are the short names of params 167 and 130.
    for (p, name) in ["2t", "t"].iter().enumerate() {
        for d in 0..2 {
            for n in 0..2 {
                for s in 0..2 {
                    for l in 0..2 {
                        for a in 0..3 {
                            for o in 0..2 {
                                let value = dataset.get(name, [d, n, s, l, a, o]).unwrap();
                                assert_eq!(value, cell_value(d, l, n, p, s, a, o));
                            }
                        }
                    }
                }
            }
        }
    }

    let attrs = &dataset.variable("2t").unwrap().attrs;
    assert_eq!(attrs["units"], "K");
    Ok(())
}

#[test]
fn test_dense_document_dense_is_stable() -> Result<()> {
    let config = ReshapeConfig::default();
    let original: CoverageCollection = serde_json::from_value(fixtures::sample_grid_document())?;
    let first = collection_to_dense(&original, &config)?;

    let encoded = first.to_collection(&ParameterCatalogue::ecmwf(), &config);
    let second = collection_to_dense(&through_json(&encoded)?, &config)?;

    assert_same_cells(&first, &second);
    assert_eq!(second.attrs.get("class"), first.attrs.get("class"));
    Ok(())
}

#[test]
fn test_sample_document_layout() -> Result<()> {
    let collection: CoverageCollection = serde_json::from_value(fixtures::sample_grid_document())?;

    let records = GridDecoder::default().decode(&collection)?;
    assert_eq!(records.len(), 4);
    assert_eq!(records[1].step, Scalar::Int(6));

    let dataset = collection_to_dense(&collection, &ReshapeConfig::default())?;
    assert_eq!(dataset.shape(), [1, 2, 2, 1, 2, 2]);
    assert_eq!(dataset.get("2t", [0, 0, 0, 0, 0, 0]), Some(270.0));
    assert!(dataset.get("2t", [0, 0, 1, 0, 0, 1]).unwrap().is_nan());
    assert_eq!(dataset.get("2t", [0, 1, 1, 0, 1, 1]), Some(287.0));
    assert_eq!(dataset.attrs.get("class"), Some(&serde_json::json!("od")));
    Ok(())
}

#[test]
fn test_jittered_coordinates_share_grid_lines() -> Result<()> {
    // Second row carries floating-point noise in latitude and longitude.
    let value = fixtures::root(vec![fixtures::node(
        "param",
        serde_json::json!(["167"]),
        vec![
            fixtures::node(
                "latitude",
                serde_json::json!([50.0]),
                vec![fixtures::leaf(&[1.0, 2.0], &[1.0, 2.0])],
            ),
            fixtures::node(
                "latitude",
                serde_json::json!([51.0]),
                vec![fixtures::leaf(&[1.004, 2.003], &[3.0, 4.0])],
            ),
        ],
    )]);
    let tree: TreeNode = serde_json::from_value(value)?;
    let config = ReshapeConfig::default();
    let collection = tree_to_collection(&tree, &ParameterCatalogue::ecmwf(), &config)?;

    let lons = collection.coverages[0].domain.axes["longitude"].as_floats().unwrap();
    assert_eq!(lons, vec![1.0, 2.0]);

    let dataset = collection_to_dense(&collection, &config)?;
    assert_coords_approx_eq!(
        (dataset.axes.latitudes[1], dataset.axes.longitudes[1]),
        (51.0, 2.0),
        1e-12
    );
    assert_approx_eq!(dataset.get("2t", [0, 0, 0, 0, 1, 1]).unwrap(), 4.0, 1e-12);
    Ok(())
}
