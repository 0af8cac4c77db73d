//! Cross-event collection of hex-vs-mesh differences.

use crate::engine::EventSummary;
use crate::histogram::Histogram;
use meshinterp_core::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the final report.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReportConfig {
    /// Number of histogram bins per panel.
    pub bins: usize,
    /// Barycenter x/y difference above which a cluster is listed.
    pub outlier_threshold: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            bins: 50,
            outlier_threshold: 0.02,
        }
    }
}

impl ReportConfig {
    /// Sets the number of bins.
    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Sets the outlier threshold.
    #[must_use]
    pub fn with_outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = threshold;
        self
    }
}

/// Identifies a multicluster within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterTag {
    /// Event identifier.
    pub event_id: u64,
    /// Multicluster id within the event.
    pub multicluster: u32,
}

/// An event whose computation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventFailure {
    /// Event identifier.
    pub event_id: u64,
    /// Rendered error.
    pub message: String,
}

/// A cluster whose barycenter moved more than the threshold in x or y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outlier {
    /// Cluster identity.
    pub tag: ClusterTag,
    /// Absolute x difference.
    pub dx: f64,
    /// Absolute y difference.
    pub dy: f64,
}

/// Count, mean and maximum of one difference column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DifferenceStats {
    /// Number of values.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Largest value.
    pub max: f64,
}

impl DifferenceStats {
    #[allow(clippy::cast_precision_loss)]
    fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        Self {
            count: values.len(),
            mean: values.iter().sum::<f64>() / values.len() as f64,
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// The four histogram panels of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceHistograms {
    /// Absolute energy differences.
    pub energy: Histogram,
    /// Absolute barycenter-x differences.
    pub x: Histogram,
    /// Absolute barycenter-y differences.
    pub y: Histogram,
    /// Absolute barycenter-z differences.
    pub z: Histogram,
}

/// Append-only store of per-multicluster differences across events.
///
/// The four difference columns and `tags` are parallel: entry `i` of each
/// belongs to the same cluster. Entries are kept in (event, first-seen
/// multicluster) order.
#[derive(Debug, Clone, Default)]
pub struct DifferenceAggregator {
    /// Absolute energy differences.
    pub energy: Vec<f64>,
    /// Absolute barycenter-x differences.
    pub x: Vec<f64>,
    /// Absolute barycenter-y differences.
    pub y: Vec<f64>,
    /// Absolute barycenter-z differences.
    pub z: Vec<f64>,
    /// Cluster identity per entry.
    pub tags: Vec<ClusterTag>,
    /// Clusters that could not be finalized on at least one side.
    pub incomplete: Vec<ClusterTag>,
    /// Events whose computation failed.
    pub failures: Vec<EventFailure>,
}

impl DifferenceAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the results of one event.
    pub fn record(&mut self, summary: &EventSummary) {
        for result in &summary.clusters {
            let tag = ClusterTag {
                event_id: summary.event_id,
                multicluster: result.multicluster,
            };
            match result.comparison() {
                Some(cmp) => {
                    let d = cmp.differences();
                    self.energy.push(d.energy);
                    self.x.push(d.x);
                    self.y.push(d.y);
                    self.z.push(d.z);
                    self.tags.push(tag);
                }
                None => self.incomplete.push(tag),
            }
        }
    }

    /// Records an event whose computation failed.
    pub fn record_failure(&mut self, event_id: u64, error: &Error) {
        self.failures.push(EventFailure {
            event_id,
            message: error.to_string(),
        });
    }

    /// Appends all entries of `other`, keeping their order.
    pub fn merge(&mut self, other: Self) {
        self.energy.extend(other.energy);
        self.x.extend(other.x);
        self.y.extend(other.y);
        self.z.extend(other.z);
        self.tags.extend(other.tags);
        self.incomplete.extend(other.incomplete);
        self.failures.extend(other.failures);
    }

    /// Number of compared clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if no cluster was compared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Clusters whose x or y barycenter difference exceeds `threshold`.
    #[must_use]
    pub fn outliers(&self, threshold: f64) -> Vec<Outlier> {
        self.tags
            .iter()
            .zip(self.x.iter().zip(&self.y))
            .filter(|&(_, (&dx, &dy))| dx > threshold || dy > threshold)
            .map(|(&tag, (&dx, &dy))| Outlier { tag, dx, dy })
            .collect()
    }

    /// Histograms of the four difference columns.
    #[must_use]
    pub fn histograms(&self, bins: usize) -> DifferenceHistograms {
        DifferenceHistograms {
            energy: Histogram::from_values(&self.energy, bins),
            x: Histogram::from_values(&self.x, bins),
            y: Histogram::from_values(&self.y, bins),
            z: Histogram::from_values(&self.z, bins),
        }
    }

    /// Summary statistics of the four difference columns, in
    /// (energy, x, y, z) order.
    #[must_use]
    pub fn stats(&self) -> [DifferenceStats; 4] {
        [
            DifferenceStats::of(&self.energy),
            DifferenceStats::of(&self.x),
            DifferenceStats::of(&self.y),
            DifferenceStats::of(&self.z),
        ]
    }
}
