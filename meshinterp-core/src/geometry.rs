//! Cell geometry and overlap tables.

use crate::{Error, Result};
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in the transverse (x, y) plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point2 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point2 {
    /// Creates a new point.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Integer grid coordinate of a square cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SquareCoord {
    /// Column index.
    pub i: i32,
    /// Row index.
    pub j: i32,
}

impl SquareCoord {
    /// Creates a new grid coordinate.
    #[inline]
    #[must_use]
    pub fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }
}

/// Fractional area overlap of one hex cell with one square cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Overlap {
    /// Square cell receiving the share.
    pub coord: SquareCoord,
    /// Raw (unnormalized) overlap weight.
    pub weight: f64,
}

impl Overlap {
    /// Creates a new overlap record.
    #[inline]
    #[must_use]
    pub fn new(i: i32, j: i32, weight: f64) -> Self {
        Self {
            coord: SquareCoord::new(i, j),
            weight,
        }
    }
}

/// Per-layer lookup tables: overlap lists and hex-cell centers.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerTables {
    /// Nominal layer number.
    pub layer: u32,
    /// Hex cell id -> overlapping square cells.
    pub overlaps: HashMap<u32, Vec<Overlap>>,
    /// Hex cell id -> cell center.
    pub centers: HashMap<u32, Point2>,
}

impl LayerTables {
    /// Creates empty tables for a layer.
    #[must_use]
    pub fn new(layer: u32) -> Self {
        Self {
            layer,
            ..Self::default()
        }
    }

    /// Registers a hex cell with its center and overlap list.
    pub fn insert_cell(&mut self, cell: u32, center: Point2, overlaps: Vec<Overlap>) {
        self.centers.insert(cell, center);
        self.overlaps.insert(cell, overlaps);
    }

    /// Returns the center of a hex cell.
    ///
    /// # Errors
    /// Returns [`Error::MissingHexCell`] if the cell has no center.
    pub fn hex_center(&self, cell: u32) -> Result<Point2> {
        self.centers
            .get(&cell)
            .copied()
            .ok_or(Error::MissingHexCell {
                layer: self.layer,
                cell,
            })
    }

    /// Returns the overlap list of a hex cell.
    ///
    /// # Errors
    /// Returns [`Error::MissingOverlaps`] if the cell has no overlap entry.
    pub fn overlaps_of(&self, cell: u32) -> Result<&[Overlap]> {
        self.overlaps
            .get(&cell)
            .map(Vec::as_slice)
            .ok_or(Error::MissingOverlaps {
                layer: self.layer,
                cell,
            })
    }

    /// Number of hex cells with an overlap list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.overlaps.len()
    }

    /// Returns true if the tables hold no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlaps.is_empty()
    }
}

/// The square resampling mesh, shared by all layers.
#[derive(Debug, Clone, Default)]
pub struct SquareMesh {
    /// Grid resolution (columns, rows).
    pub resolution: (u32, u32),
    /// Edge length of a square cell.
    pub edge_length: f64,
    centers: HashMap<SquareCoord, Point2>,
}

impl SquareMesh {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new(resolution: (u32, u32), edge_length: f64) -> Self {
        Self {
            resolution,
            edge_length,
            centers: HashMap::new(),
        }
    }

    /// Builds a mesh from (coordinate, center) pairs.
    #[must_use]
    pub fn from_cells<I>(resolution: (u32, u32), edge_length: f64, cells: I) -> Self
    where
        I: IntoIterator<Item = (SquareCoord, Point2)>,
    {
        Self {
            resolution,
            edge_length,
            centers: cells.into_iter().collect(),
        }
    }

    /// Adds or replaces a cell.
    pub fn insert(&mut self, coord: SquareCoord, center: Point2) {
        self.centers.insert(coord, center);
    }

    /// Returns the center of a square cell.
    ///
    /// # Errors
    /// Returns [`Error::MissingSquareCell`] if the coordinate is not in the mesh.
    pub fn center(&self, coord: SquareCoord) -> Result<Point2> {
        self.centers
            .get(&coord)
            .copied()
            .ok_or(Error::MissingSquareCell {
                i: coord.i,
                j: coord.j,
            })
    }

    /// Number of cells in the mesh.
    #[must_use]
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// Returns true if the mesh holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_tables_lookup() {
        let mut tables = LayerTables::new(4);
        tables.insert_cell(12, Point2::new(1.0, -2.0), vec![Overlap::new(0, 1, 0.5)]);

        assert_eq!(tables.hex_center(12).unwrap(), Point2::new(1.0, -2.0));
        assert_eq!(tables.overlaps_of(12).unwrap().len(), 1);
        assert_eq!(tables.len(), 1);

        match tables.hex_center(13) {
            Err(Error::MissingHexCell { layer, cell }) => {
                assert_eq!((layer, cell), (4, 13));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            tables.overlaps_of(13),
            Err(Error::MissingOverlaps { layer: 4, cell: 13 })
        ));
    }

    #[test]
    fn test_square_mesh_lookup() {
        let mesh = SquareMesh::from_cells(
            (2, 1),
            0.7,
            [
                (SquareCoord::new(0, 0), Point2::new(0.35, 0.35)),
                (SquareCoord::new(1, 0), Point2::new(1.05, 0.35)),
            ],
        );
        assert_eq!(mesh.len(), 2);
        assert_eq!(
            mesh.center(SquareCoord::new(1, 0)).unwrap(),
            Point2::new(1.05, 0.35)
        );
        assert!(matches!(
            mesh.center(SquareCoord::new(5, 5)),
            Err(Error::MissingSquareCell { i: 5, j: 5 })
        ));
    }
}
