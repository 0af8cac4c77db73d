//! Energy-weighted moment accumulators.

use std::ops::AddAssign;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Running sums `(E, E·x, E·y, E·z)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Moments {
    /// Total energy.
    pub energy: f64,
    /// Energy-weighted x sum.
    pub wx: f64,
    /// Energy-weighted y sum.
    pub wy: f64,
    /// Energy-weighted z sum.
    pub wz: f64,
}

impl Moments {
    /// Moments of a single energy deposit at `(x, y, z)`.
    #[inline]
    #[must_use]
    pub fn point(energy: f64, x: f64, y: f64, z: f64) -> Self {
        Self {
            energy,
            wx: energy * x,
            wy: energy * y,
            wz: energy * z,
        }
    }

    /// Adds a deposit at `(x, y, z)`.
    #[inline]
    pub fn add_point(&mut self, energy: f64, x: f64, y: f64, z: f64) {
        *self += Self::point(energy, x, y, z);
    }

    /// Returns the sums as `[E, E·x, E·y, E·z]`.
    #[must_use]
    pub fn to_array(&self) -> [f64; 4] {
        [self.energy, self.wx, self.wy, self.wz]
    }

    /// Converts the weighted sums into a barycenter.
    ///
    /// Returns `None` when the energy is zero or the result is not finite.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn finalize(&self) -> Option<ClusterProperties> {
        if self.energy == 0.0 || !self.energy.is_finite() {
            return None;
        }
        let props = ClusterProperties {
            energy: self.energy,
            x: self.wx / self.energy,
            y: self.wy / self.energy,
            z: self.wz / self.energy,
        };
        props.is_finite().then_some(props)
    }
}

impl AddAssign for Moments {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.energy += rhs.energy;
        self.wx += rhs.wx;
        self.wy += rhs.wy;
        self.wz += rhs.wz;
    }
}

/// Energy and barycenter of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterProperties {
    /// Total energy.
    pub energy: f64,
    /// Barycenter x.
    pub x: f64,
    /// Barycenter y.
    pub y: f64,
    /// Barycenter z.
    pub z: f64,
}

impl ClusterProperties {
    /// Returns true if all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.energy.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Component-wise absolute difference.
    #[must_use]
    pub fn abs_diff(&self, other: &Self) -> Differences {
        Differences {
            energy: (self.energy - other.energy).abs(),
            x: (self.x - other.x).abs(),
            y: (self.y - other.y).abs(),
            z: (self.z - other.z).abs(),
        }
    }
}

/// Absolute differences between two [`ClusterProperties`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Differences {
    /// Energy difference.
    pub energy: f64,
    /// Barycenter x difference.
    pub x: f64,
    /// Barycenter y difference.
    pub y: f64,
    /// Barycenter z difference.
    pub z: f64,
}

/// Paired hex-mesh and square-mesh moments of one multicluster.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterAccumulator {
    /// Sums over hexagonal cell centers.
    pub hex: Moments,
    /// Sums over square cell centers.
    pub mesh: Moments,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_moments_barycenter() {
        let mut m = Moments::default();
        m.add_point(1.0, 0.0, 0.0, 10.0);
        m.add_point(3.0, 4.0, -4.0, 14.0);

        let props = m.finalize().unwrap();
        assert_relative_eq!(props.energy, 4.0);
        assert_relative_eq!(props.x, 3.0);
        assert_relative_eq!(props.y, -3.0);
        assert_relative_eq!(props.z, 13.0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_moments_common_point_is_exact() {
        let mut m = Moments::default();
        m.add_point(1.0, 1.5, -2.25, 320.0);
        m.add_point(3.0, 1.5, -2.25, 320.0);

        let props = m.finalize().unwrap();
        assert_eq!(props.energy, 4.0);
        assert_eq!(props.x, 1.5);
        assert_eq!(props.y, -2.25);
        assert_eq!(props.z, 320.0);
    }

    #[test]
    fn test_zero_energy_does_not_finalize() {
        assert!(Moments::default().finalize().is_none());

        let mut m = Moments::default();
        m.add_point(0.0, 5.0, 5.0, 5.0);
        assert!(m.finalize().is_none());
    }

    #[test]
    fn test_non_finite_moments_do_not_finalize() {
        let mut m = Moments::default();
        m.add_point(f64::NAN, 1.0, 1.0, 1.0);
        assert!(m.finalize().is_none());

        let mut m = Moments::point(2.0, 1.0, 1.0, 1.0);
        m.add_point(1.0, f64::INFINITY, 0.0, 0.0);
        assert!(m.finalize().is_none());
    }

    #[test]
    fn test_abs_diff() {
        let a = ClusterProperties {
            energy: 10.0,
            x: 1.0,
            y: 2.0,
            z: 3.0,
        };
        let b = ClusterProperties {
            energy: 9.5,
            x: 1.5,
            y: 1.0,
            z: 3.0,
        };
        let d = a.abs_diff(&b);
        assert_relative_eq!(d.energy, 0.5);
        assert_relative_eq!(d.x, 0.5);
        assert_relative_eq!(d.y, 1.0);
        assert_relative_eq!(d.z, 0.0);
    }
}
