//! Detector-id decoding.
//!
//! Raw detector ids pack the subdetector, the layer within that subdetector
//! and the local cell id into one 32-bit word:
//!
//! | bits  | field        |
//! |-------|--------------|
//! | 25–27 | subdetector  |
//! | 19–23 | layer        |
//! | 0–17  | local cell   |
//!
//! Nominal layers count through the whole calorimeter (1..=52); the layer
//! field restarts at 1 inside each subdetector.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const SUBDET_SHIFT: u32 = 25;
const SUBDET_MASK: u32 = 0x7;
const LAYER_SHIFT: u32 = 19;
const LAYER_MASK: u32 = 0x1F;
/// Mask selecting the local cell id.
pub const CELL_MASK: u32 = 0x3FFFF;

/// Last nominal layer of the electromagnetic section.
pub const EE_LAST_LAYER: u32 = 28;
/// Last nominal layer of the front hadronic section.
pub const FH_LAST_LAYER: u32 = 40;

/// Calorimeter subdetector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Subdetector {
    /// Electromagnetic endcap (code 3).
    Ee,
    /// Front hadronic, silicon (code 4).
    Fh,
    /// Back hadronic, scintillator (code 5).
    Bh,
}

impl Subdetector {
    /// Returns the 3-bit code stored in the detector id.
    #[inline]
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Ee => 3,
            Self::Fh => 4,
            Self::Bh => 5,
        }
    }

    /// Maps a 3-bit code back to a subdetector.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            3 => Some(Self::Ee),
            4 => Some(Self::Fh),
            5 => Some(Self::Bh),
            _ => None,
        }
    }
}

/// The (subdetector code, layer field) pair a nominal layer decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerTarget {
    /// Subdetector code (bits 25–27).
    pub subdetector: u32,
    /// Layer within the subdetector (bits 19–23).
    pub layer: u32,
}

impl LayerTarget {
    /// Computes the target for a nominal layer.
    #[must_use]
    pub fn for_layer(nominal_layer: u32) -> Self {
        let (subdet, layer) = if nominal_layer <= EE_LAST_LAYER {
            (Subdetector::Ee, nominal_layer)
        } else if nominal_layer <= FH_LAST_LAYER {
            (Subdetector::Fh, nominal_layer - EE_LAST_LAYER)
        } else {
            (Subdetector::Bh, nominal_layer - FH_LAST_LAYER)
        };
        Self {
            subdetector: subdet.code(),
            layer,
        }
    }

    /// Returns true if the detector id belongs to this target.
    #[inline]
    #[must_use]
    pub fn matches(&self, detid: u32) -> bool {
        let decoded = DecodedId::new(detid);
        decoded.subdetector == self.subdetector && decoded.layer == self.layer
    }
}

/// Fields extracted from a raw detector id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodedId {
    /// Subdetector code.
    pub subdetector: u32,
    /// Layer within the subdetector.
    pub layer: u32,
    /// Local cell id (low 18 bits).
    pub cell: u32,
}

impl DecodedId {
    /// Decodes a raw detector id. Masks are applied unconditionally.
    #[inline]
    #[must_use]
    pub fn new(detid: u32) -> Self {
        Self {
            subdetector: (detid >> SUBDET_SHIFT) & SUBDET_MASK,
            layer: (detid >> LAYER_SHIFT) & LAYER_MASK,
            cell: cell_id(detid),
        }
    }

    /// Returns the subdetector, if the code is a known one.
    #[must_use]
    pub fn subdetector_kind(&self) -> Option<Subdetector> {
        Subdetector::from_code(self.subdetector)
    }
}

/// Extracts the local cell id.
#[inline]
#[must_use]
pub fn cell_id(detid: u32) -> u32 {
    detid & CELL_MASK
}

/// Packs fields into a detector id. Out-of-range values are truncated to
/// their bit width.
#[must_use]
pub fn encode(subdetector: u32, layer: u32, cell: u32) -> u32 {
    ((subdetector & SUBDET_MASK) << SUBDET_SHIFT)
        | ((layer & LAYER_MASK) << LAYER_SHIFT)
        | (cell & CELL_MASK)
}

/// Returns true if `detid` belongs to the nominal layer.
#[inline]
#[must_use]
pub fn matches_layer(detid: u32, nominal_layer: u32) -> bool {
    LayerTarget::for_layer(nominal_layer).matches(detid)
}

/// Builds a boolean mask over `detids` selecting hits of the nominal layer.
#[must_use]
pub fn layer_mask(detids: &[u32], nominal_layer: u32) -> Vec<bool> {
    let target = LayerTarget::for_layer(nominal_layer);
    detids.iter().map(|&detid| target.matches(detid)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_recovers_fields() {
        let detid = encode(4, 7, 0x2_1234);
        let decoded = DecodedId::new(detid);
        assert_eq!(decoded.subdetector, 4);
        assert_eq!(decoded.layer, 7);
        assert_eq!(decoded.cell, 0x2_1234);
        assert_eq!(decoded.subdetector_kind(), Some(Subdetector::Fh));
    }

    #[test]
    fn test_decode_ignores_unrelated_bits() {
        // Bit 18 and bits 24, 28+ are not part of any field.
        let detid = encode(3, 12, 99) | (1 << 18) | (1 << 24) | (1 << 30);
        let decoded = DecodedId::new(detid);
        assert_eq!(decoded.subdetector, 3);
        assert_eq!(decoded.layer, 12);
        assert_eq!(decoded.cell, 99);
    }

    #[test]
    fn test_layer_targets() {
        assert_eq!(
            LayerTarget::for_layer(1),
            LayerTarget {
                subdetector: 3,
                layer: 1
            }
        );
        assert_eq!(
            LayerTarget::for_layer(28),
            LayerTarget {
                subdetector: 3,
                layer: 28
            }
        );
        assert_eq!(
            LayerTarget::for_layer(29),
            LayerTarget {
                subdetector: 4,
                layer: 1
            }
        );
        assert_eq!(
            LayerTarget::for_layer(40),
            LayerTarget {
                subdetector: 4,
                layer: 12
            }
        );
        assert_eq!(
            LayerTarget::for_layer(41),
            LayerTarget {
                subdetector: 5,
                layer: 1
            }
        );
    }

    #[test]
    fn test_layer_mask() {
        let detids = [
            encode(3, 5, 10),
            encode(4, 5, 10),
            encode(3, 6, 10),
            encode(3, 5, 11),
        ];
        assert_eq!(layer_mask(&detids, 5), vec![true, false, false, true]);
        assert_eq!(layer_mask(&detids, 33), vec![false, true, false, false]);
        assert!(matches_layer(detids[2], 6));
    }
}
