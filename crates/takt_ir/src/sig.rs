//! Bit-level signal references.
//!
//! A [`SigBit`] names one bit of a wire, or a constant. A [`SigSpec`] is an
//! ordered vector of bits; cell port connections and module-level
//! connections are expressed in terms of them.

use crate::ids::WireId;
use serde::{Deserialize, Serialize};
use takt_common::Logic;

/// A single signal bit: one bit of a wire, or a constant logic value.
///
/// The `Ord` impl ranks constants before wire bits and wire bits by
/// `(wire, offset)`; the canonicaliser uses the minimum of an equivalence
/// class as its representative, so a net tied to a constant canonicalises
/// to the constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SigBit {
    /// A constant logic value.
    Const(Logic),
    /// One bit of a wire.
    Wire {
        /// The wire carrying the bit.
        wire: WireId,
        /// The bit offset within the wire, `0`-based.
        offset: u32,
    },
}

impl SigBit {
    /// Creates a wire bit.
    pub fn wire(wire: WireId, offset: u32) -> Self {
        SigBit::Wire { wire, offset }
    }

    /// Returns `true` if this bit belongs to a wire (not a constant).
    pub fn is_wire(self) -> bool {
        matches!(self, SigBit::Wire { .. })
    }
}

/// An ordered, possibly heterogeneous vector of signal bits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SigSpec {
    bits: Vec<SigBit>,
}

impl SigSpec {
    /// Creates an empty signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a signal spanning all `width` bits of `wire`, LSB first.
    pub fn full_wire(wire: WireId, width: u32) -> Self {
        Self {
            bits: (0..width).map(|offset| SigBit::Wire { wire, offset }).collect(),
        }
    }

    /// The number of bits in this signal.
    pub fn width(&self) -> u32 {
        self.bits.len() as u32
    }

    /// Returns `true` if this signal has no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns the bit at position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn bit(&self, index: u32) -> SigBit {
        self.bits[index as usize]
    }

    /// The bits of this signal, LSB first.
    pub fn bits(&self) -> &[SigBit] {
        &self.bits
    }

    /// Mutable access to the bits, for in-place rewiring.
    pub fn bits_mut(&mut self) -> &mut [SigBit] {
        &mut self.bits
    }

    /// Appends a bit.
    pub fn push(&mut self, bit: SigBit) {
        self.bits.push(bit);
    }

    /// Appends all bits of another signal.
    pub fn extend_from(&mut self, other: &SigSpec) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Splits the signal into maximal chunks: runs of consecutive bits of
    /// one wire (offsets ascending by one), or runs of constants.
    pub fn chunks(&self) -> Vec<SigSpec> {
        let mut out = Vec::new();
        let mut run: Vec<SigBit> = Vec::new();
        for &bit in &self.bits {
            let extends = match (run.last(), bit) {
                (None, _) => true,
                (Some(&SigBit::Wire { wire: pw, offset: po }), SigBit::Wire { wire, offset }) => {
                    wire == pw && offset == po + 1
                }
                (Some(&SigBit::Const(_)), SigBit::Const(_)) => true,
                _ => false,
            };
            if !extends {
                out.push(SigSpec {
                    bits: std::mem::take(&mut run),
                });
            }
            run.push(bit);
        }
        if !run.is_empty() {
            out.push(SigSpec { bits: run });
        }
        out
    }
}

impl From<SigBit> for SigSpec {
    fn from(bit: SigBit) -> Self {
        Self { bits: vec![bit] }
    }
}

impl FromIterator<SigBit> for SigSpec {
    fn from_iter<T: IntoIterator<Item = SigBit>>(iter: T) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}
