//! Multicluster interpolation engine.
//!
//! For one event, walks the layers in order, and for every hit of a
//! multicluster adds its energy to two accumulators:
//! - the hexagonal view, at the center of the hit's hex cell;
//! - the square view, split over the square cells the hex cell overlaps,
//!   using the overlap weights normalized to one per hit.
//!
//! Both views of a multicluster are then turned into (energy, barycenter)
//! and compared.
#![allow(clippy::module_name_repetitions)]

use crate::accumulator::{ClusterAccumulator, ClusterProperties, Differences, Moments};
use indexmap::IndexMap;
use meshinterp_core::geometry::{LayerTables, Overlap, SquareCoord};
use meshinterp_core::{Error, EventHits, LayerTableProvider, Result, SquareMesh};

/// Highest nominal layer the detector-id layout can address.
pub const MAX_LAYERS: u32 = 52;

/// Configuration for the interpolation engine.
#[derive(Clone, Debug)]
pub struct InterpolationConfig {
    /// Number of nominal layers to walk, starting from 1.
    pub total_layers: u32,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self { total_layers: 40 }
    }
}

impl InterpolationConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of layers.
    #[must_use]
    pub fn with_total_layers(mut self, total_layers: u32) -> Self {
        self.total_layers = total_layers;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] if `total_layers` is 0 or exceeds
    /// [`MAX_LAYERS`].
    pub fn validate(&self) -> Result<()> {
        if self.total_layers == 0 || self.total_layers > MAX_LAYERS {
            return Err(Error::ConfigError(format!(
                "total_layers must be in 1..={MAX_LAYERS}, got {}",
                self.total_layers
            )));
        }
        Ok(())
    }
}

/// Normalizes overlap weights so they sum to one.
///
/// Returns `None` if the weights sum to zero, are empty, or the sum is not
/// finite.
#[must_use]
pub fn normalized_weights(overlaps: &[Overlap]) -> Option<Vec<(SquareCoord, f64)>> {
    let norm: f64 = overlaps.iter().map(|o| o.weight).sum();
    if !(norm.is_finite() && norm > 0.0) {
        return None;
    }
    Some(
        overlaps
            .iter()
            .map(|o| (o.coord, o.weight / norm))
            .collect(),
    )
}

/// Raw, unfinalized accumulators of one event.
#[derive(Debug, Clone, Default)]
pub struct Accumulation {
    /// Accumulators keyed by multicluster, in first-seen order.
    pub clusters: IndexMap<u32, ClusterAccumulator>,
    /// Hits that contributed.
    pub hits_used: usize,
    /// Hits skipped because they belong to no multicluster.
    pub hits_unassigned: usize,
    /// Layers for which tables were fetched.
    pub layers_visited: Vec<u32>,
}

/// Both views of a multicluster after finalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterComparison {
    /// Hexagonal-mesh energy and barycenter.
    pub hex: ClusterProperties,
    /// Square-mesh energy and barycenter.
    pub mesh: ClusterProperties,
}

impl ClusterComparison {
    /// Absolute hex-vs-mesh differences.
    #[must_use]
    pub fn differences(&self) -> Differences {
        self.hex.abs_diff(&self.mesh)
    }
}

/// Result of finalizing a multicluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClusterOutcome {
    /// Both views finalized.
    Compared(ClusterComparison),
    /// At least one view had zero or non-finite energy.
    Incomplete {
        /// Hex view, if it finalized.
        hex: Option<ClusterProperties>,
        /// Mesh view, if it finalized.
        mesh: Option<ClusterProperties>,
    },
}

/// Finalized result of one multicluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterResult {
    /// Multicluster id.
    pub multicluster: u32,
    /// The raw sums the outcome was computed from.
    pub accumulator: ClusterAccumulator,
    /// Finalized outcome.
    pub outcome: ClusterOutcome,
}

impl ClusterResult {
    fn finalize(multicluster: u32, accumulator: ClusterAccumulator) -> Self {
        let outcome = match (accumulator.hex.finalize(), accumulator.mesh.finalize()) {
            (Some(hex), Some(mesh)) => ClusterOutcome::Compared(ClusterComparison { hex, mesh }),
            (hex, mesh) => ClusterOutcome::Incomplete { hex, mesh },
        };
        Self {
            multicluster,
            accumulator,
            outcome,
        }
    }

    /// Returns the comparison if both views finalized.
    #[must_use]
    pub fn comparison(&self) -> Option<&ClusterComparison> {
        match &self.outcome {
            ClusterOutcome::Compared(cmp) => Some(cmp),
            ClusterOutcome::Incomplete { .. } => None,
        }
    }
}

/// Per-multicluster results of one event.
#[derive(Debug, Clone, Default)]
pub struct EventSummary {
    /// Event identifier.
    pub event_id: u64,
    /// Results in first-seen order.
    pub clusters: Vec<ClusterResult>,
    /// Hits that contributed.
    pub hits_used: usize,
    /// Hits skipped because they belong to no multicluster.
    pub hits_unassigned: usize,
}

impl EventSummary {
    /// Iterates over multiclusters whose both views finalized.
    pub fn compared(&self) -> impl Iterator<Item = (u32, &ClusterComparison)> + '_ {
        self.clusters
            .iter()
            .filter_map(|c| c.comparison().map(|cmp| (c.multicluster, cmp)))
    }

    /// Iterates over multiclusters that could not be finalized.
    pub fn incomplete(&self) -> impl Iterator<Item = &ClusterResult> + '_ {
        self.clusters
            .iter()
            .filter(|c| matches!(c.outcome, ClusterOutcome::Incomplete { .. }))
    }

    /// Looks up a multicluster.
    #[must_use]
    pub fn cluster(&self, multicluster: u32) -> Option<&ClusterResult> {
        self.clusters.iter().find(|c| c.multicluster == multicluster)
    }
}

/// Per-layer totals of one event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerReport {
    /// Nominal layer.
    pub layer: u32,
    /// Hits of the layer that contributed.
    pub hits: usize,
    /// Multiclusters touched by the layer.
    pub clusters: usize,
    /// Hex-view moments summed over all multiclusters.
    pub hex: Moments,
    /// Square-view moments summed over all multiclusters.
    pub mesh: Moments,
}

/// Computes hex-mesh and square-mesh multicluster properties.
pub struct InterpolationEngine<'a, P: ?Sized> {
    mesh: &'a SquareMesh,
    tables: &'a P,
    config: InterpolationConfig,
}

impl<'a, P: LayerTableProvider + ?Sized> InterpolationEngine<'a, P> {
    /// Creates an engine over a square mesh and a table provider.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] if the configuration is invalid.
    pub fn new(mesh: &'a SquareMesh, tables: &'a P, config: InterpolationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            mesh,
            tables,
            config,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &InterpolationConfig {
        &self.config
    }

    /// Accumulates an event without finalizing it.
    ///
    /// # Errors
    /// Returns an error if a table cannot be loaded, a cell is missing from
    /// the tables or the mesh, or a hex cell's overlap weights sum to zero.
    pub fn accumulate_event(&self, event: &EventHits) -> Result<Accumulation> {
        let mut acc = Accumulation {
            hits_unassigned: event.unassigned_count(),
            ..Accumulation::default()
        };

        for layer in 1..=self.config.total_layers {
            let indices = assigned_layer_hits(event, layer);
            if indices.is_empty() {
                continue;
            }
            log::debug!(
                "event {}: interpolating layer {layer} ({} hits)",
                event.event_id,
                indices.len()
            );

            let tables = self.tables.layer_tables(layer)?;
            self.accumulate_layer(event, &indices, &tables, &mut acc.clusters)?;
            acc.hits_used += indices.len();
            acc.layers_visited.push(layer);
        }

        Ok(acc)
    }

    /// Accumulates and finalizes an event.
    ///
    /// Multiclusters whose hex or mesh energy is zero come back as
    /// [`ClusterOutcome::Incomplete`] instead of carrying NaN barycenters.
    ///
    /// # Errors
    /// See [`Self::accumulate_event`].
    pub fn process_event(&self, event: &EventHits) -> Result<EventSummary> {
        let acc = self.accumulate_event(event)?;

        let clusters: Vec<ClusterResult> = acc
            .clusters
            .into_iter()
            .map(|(mcl, sums)| ClusterResult::finalize(mcl, sums))
            .collect();

        for result in &clusters {
            if let ClusterOutcome::Incomplete { hex, mesh } = result.outcome {
                log::warn!(
                    "event {}: multicluster {} has zero or non-finite energy on the {} side",
                    event.event_id,
                    result.multicluster,
                    match (hex.is_some(), mesh.is_some()) {
                        (false, false) => "hex and mesh",
                        (false, true) => "hex",
                        _ => "mesh",
                    }
                );
            }
        }

        Ok(EventSummary {
            event_id: event.event_id,
            clusters,
            hits_used: acc.hits_used,
            hits_unassigned: acc.hits_unassigned,
        })
    }

    /// Totals of a single layer of an event, or `None` if the layer has no
    /// assigned hits.
    ///
    /// # Errors
    /// Returns [`Error::InvalidLayer`] if `layer` is outside
    /// `1..=MAX_LAYERS`, otherwise see [`Self::accumulate_event`].
    pub fn layer_report(&self, event: &EventHits, layer: u32) -> Result<Option<LayerReport>> {
        if layer == 0 || layer > MAX_LAYERS {
            return Err(Error::InvalidLayer(layer));
        }
        let indices = assigned_layer_hits(event, layer);
        if indices.is_empty() {
            return Ok(None);
        }

        let tables = self.tables.layer_tables(layer)?;
        let mut clusters = IndexMap::new();
        self.accumulate_layer(event, &indices, &tables, &mut clusters)?;

        let mut report = LayerReport {
            layer,
            hits: indices.len(),
            clusters: clusters.len(),
            ..LayerReport::default()
        };
        for sums in clusters.values() {
            report.hex += sums.hex;
            report.mesh += sums.mesh;
        }
        Ok(Some(report))
    }

    fn accumulate_layer(
        &self,
        event: &EventHits,
        indices: &[usize],
        tables: &LayerTables,
        clusters: &mut IndexMap<u32, ClusterAccumulator>,
    ) -> Result<()> {
        for &idx in indices {
            let hit = event.hit(idx);
            let Some(mcl) = hit.multicluster else {
                continue;
            };
            let cell = hit.cell();
            let center = tables.hex_center(cell)?;
            let overlaps = tables.overlaps_of(cell)?;
            let mesh = self.mesh_moments(hit.energy, hit.z, overlaps, tables.layer, cell)?;

            let sums = clusters.entry(mcl).or_default();
            sums.hex.add_point(hit.energy, center.x, center.y, hit.z);
            sums.mesh += mesh;
        }
        Ok(())
    }

    /// Square-view moments of one hit: its energy split over the overlapped
    /// square cells.
    fn mesh_moments(
        &self,
        energy: f64,
        z: f64,
        overlaps: &[Overlap],
        layer: u32,
        cell: u32,
    ) -> Result<Moments> {
        let weights = normalized_weights(overlaps).ok_or_else(|| Error::ZeroNormOverlap {
            layer,
            cell,
            norm: overlaps.iter().map(|o| o.weight).sum(),
        })?;

        let mut moments = Moments::default();
        for (coord, weight) in weights {
            let center = self.mesh.center(coord)?;
            moments.add_point(energy * weight, center.x, center.y, z);
        }
        Ok(moments)
    }
}

fn assigned_layer_hits(event: &EventHits, layer: u32) -> Vec<usize> {
    let mut indices = event.layer_indices(layer);
    indices.retain(|&i| event.multicluster[i].is_some());
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshinterp_core::detid::encode;
    use meshinterp_core::geometry::Point2;
    use meshinterp_core::InMemoryTables;

    fn mesh() -> SquareMesh {
        SquareMesh::from_cells(
            (2, 1),
            1.0,
            [
                (SquareCoord::new(0, 0), Point2::new(0.0, 0.0)),
                (SquareCoord::new(1, 0), Point2::new(4.0, 0.0)),
            ],
        )
    }

    fn tables() -> InMemoryTables {
        let mut layer1 = LayerTables::new(1);
        layer1.insert_cell(
            7,
            Point2::new(1.0, 0.0),
            vec![Overlap::new(0, 0, 3.0), Overlap::new(1, 0, 1.0)],
        );
        layer1.insert_cell(8, Point2::new(2.0, 0.0), vec![]);
        InMemoryTables::new().with_layer(layer1)
    }

    #[test]
    fn test_normalized_weights() {
        let weights =
            normalized_weights(&[Overlap::new(0, 0, 3.0), Overlap::new(1, 0, 1.0)]).unwrap();
        assert_relative_eq!(weights[0].1, 0.75);
        assert_relative_eq!(weights[1].1, 0.25);

        assert!(normalized_weights(&[]).is_none());
        assert!(normalized_weights(&[Overlap::new(0, 0, 0.0)]).is_none());
    }

    #[test]
    fn test_split_three_to_one() {
        let mesh = mesh();
        let tables = tables();
        let engine = InterpolationEngine::new(&mesh, &tables, InterpolationConfig::new()).unwrap();

        let mut event = EventHits::with_capacity(1, 1);
        event.push(encode(3, 1, 7), 320.0, 8.0, Some(0));

        let acc = engine.accumulate_event(&event).unwrap();
        let sums = acc.clusters[&0_u32];
        // 0.75 * 8 at x=0, 0.25 * 8 at x=4
        assert_relative_eq!(sums.mesh.energy, 8.0);
        assert_relative_eq!(sums.mesh.wx, 2.0 * 4.0);
        assert_relative_eq!(sums.hex.energy, 8.0);
        assert_relative_eq!(sums.hex.wx, 8.0);
        assert_eq!(acc.layers_visited, vec![1]);
    }

    #[test]
    fn test_zero_norm_is_an_error() {
        let mesh = mesh();
        let tables = tables();
        let engine = InterpolationEngine::new(&mesh, &tables, InterpolationConfig::new()).unwrap();

        let mut event = EventHits::with_capacity(1, 1);
        event.push(encode(3, 1, 8), 320.0, 1.0, Some(0));

        match engine.process_event(&event) {
            Err(Error::ZeroNormOverlap { layer, cell, .. }) => assert_eq!((layer, cell), (1, 8)),
            other => panic!("expected zero-norm error, got {other:?}"),
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(InterpolationConfig::new().validate().is_ok());
        assert!(InterpolationConfig::new()
            .with_total_layers(0)
            .validate()
            .is_err());
        assert!(InterpolationConfig::new()
            .with_total_layers(MAX_LAYERS + 1)
            .validate()
            .is_err());
    }
}
