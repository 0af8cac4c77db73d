//! meshinterp-core: Core types for mesh interpolation checks.
//!
//! This crate provides the foundational pieces shared by the interpolation
//! engine and the file readers: detector-id decoding, per-event hit tables,
//! hexagonal and square cell geometry, and the per-layer table provider
//! abstraction.
//!

pub mod detid;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod tables;

pub use detid::{DecodedId, LayerTarget, Subdetector};
pub use error::{Error, Result};
pub use geometry::{LayerTables, Overlap, Point2, SquareCoord, SquareMesh};
pub use hit::{EventHits, HitRef};
pub use tables::{CachedTableProvider, InMemoryTables, LayerTableProvider};
