//! Fixed-width histograms of difference values.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Equal-width histogram over the range of its input.
///
/// The maximum value lands in the last bin. Non-finite values are counted
/// in `skipped` and otherwise ignored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Histogram {
    /// Lower edge of the first bin.
    pub min: f64,
    /// Upper edge of the last bin.
    pub max: f64,
    /// Count per bin.
    pub counts: Vec<u64>,
    /// Non-finite inputs that were not binned.
    pub skipped: u64,
}

impl Histogram {
    /// Bins `values` into `bins` equal-width bins spanning their range.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let mut hist = Self {
            min: 0.0,
            max: 0.0,
            counts: vec![0; bins],
            skipped: 0,
        };

        let (min, max) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            hist.skipped = values.len() as u64;
            return hist;
        }
        hist.min = min;
        hist.max = max;

        let bin_width = (max - min) / bins as f64;
        for &v in values {
            if !v.is_finite() {
                hist.skipped += 1;
                continue;
            }
            let bin = if bin_width > 0.0 {
                (((v - min) / bin_width) as usize).min(bins - 1)
            } else {
                0
            };
            hist.counts[bin] += 1;
        }
        hist
    }

    /// Number of bins.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Width of each bin.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }

    /// Lower and upper edge of bin `index`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_edges(&self, index: usize) -> (f64, f64) {
        let width = self.bin_width();
        let lo = self.min + width * index as f64;
        (lo, lo + width)
    }

    /// Total number of binned values.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Largest bin count.
    #[must_use]
    pub fn peak(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Returns true if no value was binned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
