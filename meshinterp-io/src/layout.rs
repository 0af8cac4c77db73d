//! On-disk layout of the lookup tables.
//!
//! ```text
//! <root>/sq_cells_data/coef_dict_layer_<L>_res_<R0>,<R1>_len_<E>.json
//! <root>/sq_cells_data/sq_cells_dict_res_<R0>,<R1>_len_<E>.json
//! <root>/hex_pos_data/<L>.json
//! ```

use std::path::{Path, PathBuf};

/// Directory holding overlap tables and the square mesh.
pub const SQUARE_CELLS_DIR: &str = "sq_cells_data";
/// Directory holding per-layer hex-cell centers.
pub const HEX_POSITIONS_DIR: &str = "hex_pos_data";

/// Locates table files for one mesh configuration.
#[derive(Clone, Debug)]
pub struct TableLayout {
    /// Base directory.
    pub root: PathBuf,
    /// Square mesh resolution (columns, rows).
    pub resolution: (u32, u32),
    /// Square cell edge length.
    pub edge_length: f64,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            resolution: (514, 513),
            edge_length: 0.7,
        }
    }
}

impl TableLayout {
    /// Creates a layout rooted at `root` with default mesh parameters.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Sets the mesh resolution.
    #[must_use]
    pub fn with_resolution(mut self, columns: u32, rows: u32) -> Self {
        self.resolution = (columns, rows);
        self
    }

    /// Sets the square cell edge length.
    #[must_use]
    pub fn with_edge_length(mut self, edge_length: f64) -> Self {
        self.edge_length = edge_length;
        self
    }

    // Whole edge lengths keep one decimal ("1.0"), matching the table generator.
    #[allow(clippy::float_cmp)]
    fn mesh_key(&self) -> String {
        let edge = if self.edge_length.fract() == 0.0 {
            format!("{:.1}", self.edge_length)
        } else {
            format!("{}", self.edge_length)
        };
        format!(
            "res_{},{}_len_{edge}",
            self.resolution.0, self.resolution.1
        )
    }

    /// Overlap-coefficient table of a layer.
    #[must_use]
    pub fn coefficients_path(&self, layer: u32) -> PathBuf {
        self.root
            .join(SQUARE_CELLS_DIR)
            .join(format!("coef_dict_layer_{layer}_{}.json", self.mesh_key()))
    }

    /// Hex-cell center table of a layer.
    #[must_use]
    pub fn hex_centers_path(&self, layer: u32) -> PathBuf {
        self.root.join(HEX_POSITIONS_DIR).join(format!("{layer}.json"))
    }

    /// Square-mesh geometry table.
    #[must_use]
    pub fn square_mesh_path(&self) -> PathBuf {
        self.root
            .join(SQUARE_CELLS_DIR)
            .join(format!("sq_cells_dict_{}.json", self.mesh_key()))
    }
}
