//! meshinterp-io: Memory-mapped file I/O for meshinterp.
//!
//! This crate reads the on-disk inputs of an interpolation check: per-layer
//! overlap-coefficient and hex-center tables, the square-mesh geometry, and
//! the columnar event hit table. Files are memory-mapped via memmap2 and
//! decoded with `serde_json`.
//!

mod error;
pub mod events;
pub mod layout;
mod reader;
pub mod tables;

pub use error::{Error, Result};
pub use events::EventTable;
pub use layout::TableLayout;
pub use reader::{read_json, MappedFileReader};
pub use tables::{load_layer_tables, load_square_mesh, FileTableProvider};
