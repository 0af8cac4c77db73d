//! Text rendering of a check run.

use meshinterp_algorithms::{DifferenceAggregator, Histogram, LayerReport, Outlier, ReportConfig};
use std::fmt::Write;

const BAR_WIDTH: u64 = 40;

const PANELS: [&str; 4] = [
    "Absolute Diff in Energy",
    "Absolute Diff in Barycenter-X",
    "Absolute Diff in Barycenter-Y",
    "Absolute Diff in Barycenter-Z",
];

/// One histogram panel: a title, then one row per bin.
pub fn render_histogram(title: &str, hist: &Histogram) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    if hist.is_empty() {
        let _ = writeln!(out, "  (no entries)");
        return out;
    }

    let peak = hist.peak().max(1);
    for (index, &count) in hist.counts.iter().enumerate() {
        let (lo, hi) = hist.bin_edges(index);
        let bar = "#".repeat(usize::try_from(count * BAR_WIDTH / peak).unwrap_or(0));
        let _ = writeln!(out, "  [{:>11.4e}, {:>11.4e}) {:>7} {}", lo, hi, count, bar);
    }
    if hist.skipped > 0 {
        let _ = writeln!(out, "  ({} non-finite values skipped)", hist.skipped);
    }
    out
}

/// The four difference panels, titled with the cluster count.
pub fn render_histograms(aggregator: &DifferenceAggregator, config: &ReportConfig) -> String {
    let hists = aggregator.histograms(config.bins);
    let mut out = format!(
        "Error (Absolute value) Histograms for {} clusters\n",
        aggregator.len()
    );
    for (title, hist) in PANELS.iter().zip([&hists.energy, &hists.x, &hists.y, &hists.z]) {
        out.push('\n');
        out.push_str(&render_histogram(title, hist));
    }
    out
}

/// Outlier list, one `(event, cluster) dy dx` line per cluster.
pub fn render_outliers(outliers: &[Outlier], threshold: f64) -> String {
    let mut out = format!(
        "{} clusters with barycenter x/y difference above {}\n",
        outliers.len(),
        threshold
    );
    for o in outliers {
        let _ = writeln!(
            out,
            "({}, {}) {} {}",
            o.tag.event_id, o.tag.multicluster, o.dy, o.dx
        );
    }
    out
}

/// Per-layer table for the `layer` subcommand.
pub fn render_layer_reports(event_id: u64, reports: &[LayerReport]) -> String {
    let mut out = format!("Event {}\n", event_id);
    let _ = writeln!(
        out,
        "{:>5} | {:>6} | {:>8} | {:>14} | {:>14} | {:>11}",
        "Layer", "Hits", "Clusters", "Hex energy", "Mesh energy", "|dE|"
    );
    let _ = writeln!(out, "{:-<72}", "");
    for r in reports {
        let _ = writeln!(
            out,
            "{:>5} | {:>6} | {:>8} | {:>14.6} | {:>14.6} | {:>11.3e}",
            r.layer,
            r.hits,
            r.clusters,
            r.hex.energy,
            r.mesh.energy,
            (r.hex.energy - r.mesh.energy).abs()
        );
    }
    out
}
