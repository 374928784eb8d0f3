use serde::{Deserialize, Serialize};

use crate::{PreconditionViolation, Result};

/// Instruments that support binning
pub trait BinningProvider {
    fn spatial_binning(&self) -> u32;
    fn spectral_binning(&self) -> u32;
}

/// Detector readout binning
///
/// Default properties:
///  - spatial  : 1
///  - spectral : 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binning {
    pub(crate) spatial: u32,
    pub(crate) spectral: u32,
}
impl Default for Binning {
    fn default() -> Self {
        Self {
            spatial: 1,
            spectral: 1,
        }
    }
}
impl Binning {
    /// Creates a new binning, both factors must be at least 1
    pub fn new(spatial: u32, spectral: u32) -> Result<Self> {
        Self { spatial, spectral }.validate()
    }
    pub(crate) fn validate(self) -> Result<Self> {
        if self.spatial == 0 {
            return Err(PreconditionViolation::ZeroSpatialBinning.into());
        }
        if self.spectral == 0 {
            return Err(PreconditionViolation::ZeroSpectralBinning.into());
        }
        Ok(self)
    }
}
impl BinningProvider for Binning {
    fn spatial_binning(&self) -> u32 {
        self.spatial
    }
    fn spectral_binning(&self) -> u32 {
        self.spectral
    }
}
