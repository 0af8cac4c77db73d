//! meshinterp-algorithms: Hexagonal vs. square mesh interpolation checks.
//!
//! This crate provides:
//! - **Accumulators** - energy-weighted moment sums per multicluster
//! - **Interpolation engine** - per-event, per-layer redistribution of hex
//!   cell energy over overlapping square cells
//! - **Aggregation** - absolute differences across events, outliers and
//!   histograms
//! - **Batch driver** - parallel event fan-out folded in event order
//!
#![warn(missing_docs)]

mod accumulator;
mod aggregate;
mod batch;
mod engine;
pub mod histogram;

pub use accumulator::{ClusterAccumulator, ClusterProperties, Differences, Moments};
pub use aggregate::{
    ClusterTag, DifferenceAggregator, DifferenceHistograms, DifferenceStats, EventFailure,
    Outlier, ReportConfig,
};
pub use batch::run_events;
pub use engine::{
    normalized_weights, Accumulation, ClusterComparison, ClusterOutcome, ClusterResult,
    EventSummary, InterpolationConfig, InterpolationEngine, LayerReport, MAX_LAYERS,
};
pub use histogram::Histogram;

// Re-export core types used in the public API
pub use meshinterp_core::{Error, EventHits, LayerTableProvider, Result, SquareMesh};
