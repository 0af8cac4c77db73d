//! Per-event hit tables.
//!
//! Hits are stored in Structure of Arrays (`SoA`) layout, one vector per
//! column, mirroring the columnar event files they are read from.

use crate::detid::{self, LayerTarget};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A view of a single hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRef {
    /// Raw detector id.
    pub detid: u32,
    /// Longitudinal position.
    pub z: f64,
    /// Deposited energy.
    pub energy: f64,
    /// Multicluster the hit belongs to, if any.
    pub multicluster: Option<u32>,
}

impl HitRef {
    /// Local cell id of the hit.
    #[inline]
    #[must_use]
    pub fn cell(&self) -> u32 {
        detid::cell_id(self.detid)
    }
}

/// The recorded hits of one event.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventHits {
    /// Event identifier.
    pub event_id: u64,
    /// Columnar storage for raw detector ids.
    pub detid: Vec<u32>,
    /// Columnar storage for z positions.
    pub z: Vec<f64>,
    /// Columnar storage for energies.
    pub energy: Vec<f64>,
    /// Columnar storage for 2D-cluster indices (-1 = none).
    pub cluster2d: Vec<i32>,
    /// Resolved multicluster per hit (`None` = unassigned).
    pub multicluster: Vec<Option<u32>>,
}

impl EventHits {
    /// Creates an empty event with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(event_id: u64, capacity: usize) -> Self {
        Self {
            event_id,
            detid: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            energy: Vec::with_capacity(capacity),
            cluster2d: Vec::with_capacity(capacity),
            multicluster: Vec::with_capacity(capacity),
        }
    }

    /// Builds an event from raw columns, resolving each hit's multicluster
    /// through the 2D-cluster -> multicluster lookup.
    ///
    /// # Errors
    /// Returns [`Error::InvalidEvent`] if the hit columns differ in length.
    pub fn from_columns(
        event_id: u64,
        detid: Vec<u32>,
        z: Vec<f64>,
        energy: Vec<f64>,
        cluster2d: Vec<i32>,
        cluster2d_multicluster: &[i32],
    ) -> Result<Self> {
        let n = detid.len();
        if z.len() != n || energy.len() != n || cluster2d.len() != n {
            return Err(Error::InvalidEvent(format!(
                "event {event_id}: column lengths differ (detid={n}, z={}, energy={}, cluster2d={})",
                z.len(),
                energy.len(),
                cluster2d.len()
            )));
        }

        let multicluster = cluster2d
            .iter()
            .map(|&idx| resolve_multicluster(idx, cluster2d_multicluster))
            .collect();

        Ok(Self {
            event_id,
            detid,
            z,
            energy,
            cluster2d,
            multicluster,
        })
    }

    /// Pushes a single hit with an already resolved multicluster.
    ///
    /// The 2D-cluster column is not known for such hits and is stored as -1.
    pub fn push(&mut self, detid: u32, z: f64, energy: f64, multicluster: Option<u32>) {
        self.detid.push(detid);
        self.z.push(z);
        self.energy.push(energy);
        self.cluster2d.push(-1);
        self.multicluster.push(multicluster);
    }

    /// Returns the number of hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.detid.len()
    }

    /// Returns true if the event has no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detid.is_empty()
    }

    /// Returns the hit at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn hit(&self, index: usize) -> HitRef {
        HitRef {
            detid: self.detid[index],
            z: self.z[index],
            energy: self.energy[index],
            multicluster: self.multicluster[index],
        }
    }

    /// Iterates over all hits.
    pub fn iter(&self) -> impl Iterator<Item = HitRef> + '_ {
        (0..self.len()).map(|i| self.hit(i))
    }

    /// Indices of hits belonging to the nominal layer.
    ///
    /// Always a vector, also when a single hit matches.
    #[must_use]
    pub fn layer_indices(&self, nominal_layer: u32) -> Vec<usize> {
        let target = LayerTarget::for_layer(nominal_layer);
        self.detid
            .iter()
            .enumerate()
            .filter(|&(_, &detid)| target.matches(detid))
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of hits without a multicluster.
    #[must_use]
    pub fn unassigned_count(&self) -> usize {
        self.multicluster.iter().filter(|m| m.is_none()).count()
    }

    /// Total deposited energy of hits assigned to a multicluster.
    #[must_use]
    pub fn assigned_energy(&self) -> f64 {
        self.iter()
            .filter(|hit| hit.multicluster.is_some())
            .map(|hit| hit.energy)
            .sum()
    }
}

/// Looks up the multicluster of a 2D cluster.
///
/// Negative or out-of-range indices and negative multicluster entries mean
/// the hit is not part of any multicluster.
#[must_use]
pub fn resolve_multicluster(cluster2d: i32, cluster2d_multicluster: &[i32]) -> Option<u32> {
    let idx = usize::try_from(cluster2d).ok()?;
    let mcl = *cluster2d_multicluster.get(idx)?;
    u32::try_from(mcl).ok()
}
