//! File-backed overlap, hex-center and square-mesh tables.

use crate::layout::TableLayout;
use crate::reader::read_json;
use crate::{Error, Result};
use meshinterp_core::geometry::{LayerTables, Overlap, Point2, SquareCoord, SquareMesh};
use meshinterp_core::LayerTableProvider;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// `{ "<hex_id>": [[[i, j], weight], ...] }`
type RawCoefficients = HashMap<u32, Vec<((i32, i32), f64)>>;
/// `{ "<hex_id>": [x, y] }`
type RawCenters = HashMap<u32, (f64, f64)>;

#[derive(Deserialize)]
struct RawSquareCell {
    coord: (i32, i32),
    center: (f64, f64),
}

/// Reads the overlap and hex-center tables of one layer.
///
/// # Errors
/// Returns an error if either file is missing or malformed, or if an overlap
/// weight is negative or not finite.
pub fn load_layer_tables(layout: &TableLayout, layer: u32) -> Result<LayerTables> {
    let coef_path = layout.coefficients_path(layer);
    let raw_coefficients: RawCoefficients = read_json(&coef_path)?;
    let raw_centers: RawCenters = read_json(layout.hex_centers_path(layer))?;

    let mut tables = LayerTables::new(layer);
    for (cell, overlaps) in raw_coefficients {
        let mut list = Vec::with_capacity(overlaps.len());
        for ((i, j), weight) in overlaps {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(Error::InvalidFormat(format!(
                    "{}: hex cell {cell} has weight {weight} for square cell ({i}, {j})",
                    coef_path.display()
                )));
            }
            list.push(Overlap::new(i, j, weight));
        }
        tables.overlaps.insert(cell, list);
    }
    tables.centers = raw_centers
        .into_iter()
        .map(|(cell, (x, y))| (cell, Point2::new(x, y)))
        .collect();

    log::debug!(
        "loaded layer {layer}: {} overlap lists, {} hex centers",
        tables.overlaps.len(),
        tables.centers.len()
    );
    Ok(tables)
}

/// Reads the square-mesh geometry table.
///
/// # Errors
/// Returns an error if the file is missing or malformed, or lists a
/// coordinate twice.
pub fn load_square_mesh(layout: &TableLayout) -> Result<SquareMesh> {
    let path = layout.square_mesh_path();
    let cells: Vec<RawSquareCell> = read_json(&path)?;

    let mut mesh = SquareMesh::new(layout.resolution, layout.edge_length);
    for cell in cells {
        let coord = SquareCoord::new(cell.coord.0, cell.coord.1);
        if mesh.center(coord).is_ok() {
            return Err(Error::InvalidFormat(format!(
                "{}: square cell ({}, {}) listed twice",
                path.display(),
                coord.i,
                coord.j
            )));
        }
        mesh.insert(coord, Point2::new(cell.center.0, cell.center.1));
    }

    log::debug!("loaded square mesh {}: {} cells", path.display(), mesh.len());
    Ok(mesh)
}

/// Reads per-layer tables from the directory layout on every request.
///
/// Wrap in [`meshinterp_core::CachedTableProvider`] to read each layer once.
#[derive(Clone, Debug)]
pub struct FileTableProvider {
    layout: TableLayout,
}

impl FileTableProvider {
    /// Creates a provider over a layout.
    #[must_use]
    pub fn new(layout: TableLayout) -> Self {
        Self { layout }
    }

    /// Returns the layout.
    #[must_use]
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }
}

impl LayerTableProvider for FileTableProvider {
    fn layer_tables(&self, layer: u32) -> meshinterp_core::Result<Arc<LayerTables>> {
        load_layer_tables(&self.layout, layer)
            .map(Arc::new)
            .map_err(|e| meshinterp_core::Error::TableLoad {
                layer,
                message: e.to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "File"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn layout_with(coefficients: &str, centers: &str) -> (TempDir, TableLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = TableLayout::new(dir.path())
            .with_resolution(2, 2)
            .with_edge_length(1.0);
        fs::create_dir_all(dir.path().join(crate::layout::SQUARE_CELLS_DIR)).unwrap();
        fs::create_dir_all(dir.path().join(crate::layout::HEX_POSITIONS_DIR)).unwrap();
        fs::write(layout.coefficients_path(3), coefficients).unwrap();
        fs::write(layout.hex_centers_path(3), centers).unwrap();
        (dir, layout)
    }

    #[test]
    fn test_load_layer_tables() {
        let (_dir, layout) = layout_with(
            r#"{"10": [[[0, 0], 0.25], [[1, 0], 0.75]], "11": [[[1, 1], 1.0]]}"#,
            r#"{"10": [0.5, 0.5], "11": [1.5, 1.5]}"#,
        );
        let tables = load_layer_tables(&layout, 3).unwrap();
        assert_eq!(tables.layer, 3);
        assert_eq!(tables.len(), 2);
        assert_eq!(
            tables.overlaps_of(10).unwrap(),
            &[Overlap::new(0, 0, 0.25), Overlap::new(1, 0, 0.75)]
        );
        assert_eq!(tables.hex_center(11).unwrap(), Point2::new(1.5, 1.5));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let (_dir, layout) = layout_with(r#"{"10": [[[0, 0], -0.5]]}"#, r#"{"10": [0.5, 0.5]}"#);
        assert!(matches!(
            load_layer_tables(&layout, 3),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_square_mesh_duplicates_rejected() {
        let (_dir, layout) = layout_with("{}", "{}");
        fs::write(
            layout.square_mesh_path(),
            r#"[{"coord": [0, 0], "center": [0.5, 0.5]}, {"coord": [0, 0], "center": [0.5, 0.5]}]"#,
        )
        .unwrap();
        assert!(matches!(
            load_square_mesh(&layout),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_provider_maps_to_table_load() {
        let (_dir, layout) = layout_with("{}", "{}");
        let provider = FileTableProvider::new(layout);
        assert!(provider.layer_tables(3).unwrap().is_empty());
        match provider.layer_tables(4) {
            Err(meshinterp_core::Error::TableLoad { layer, message }) => {
                assert_eq!(layer, 4);
                assert!(message.contains("coef_dict_layer_4"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
