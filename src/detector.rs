//! Detector capability
//!
//! A [`Detector`] carries its family tag from construction; the grating optics
//! only ever ask whether it belongs to the legacy family.

use serde::{Deserialize, Serialize};

/// Detector electronics family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectorFamily {
    /// Original EEV CCDs
    Eev,
    /// E2V deep depletion CCDs
    E2vDeepDepletion,
    /// Hamamatsu red-sensitive CCDs
    Hamamatsu,
}

impl DetectorFamily {
    /// Legacy detectors are calibrated against their own grating tables
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Eev)
    }
}

/// Spectrograph detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    name: String,
    family: DetectorFamily,
    pixel_count: u32,
}

/// Unbinned pixels along the dispersion axis of the GMOS detector mosaics
const GMOS_PIXEL_COUNT: u32 = 6144;

impl Detector {
    pub fn new<S: Into<String>>(name: S, family: DetectorFamily, pixel_count: u32) -> Self {
        Self {
            name: name.into(),
            family,
            pixel_count,
        }
    }
    /// GMOS EEV detector set
    pub fn eev() -> Self {
        Self::new("EEV", DetectorFamily::Eev, GMOS_PIXEL_COUNT)
    }
    /// GMOS-N E2V deep depletion detector set
    pub fn e2v_deep_depletion() -> Self {
        Self::new(
            "E2V DD",
            DetectorFamily::E2vDeepDepletion,
            GMOS_PIXEL_COUNT,
        )
    }
    /// GMOS-N Hamamatsu detector set
    pub fn hamamatsu_north() -> Self {
        Self::new("Hamamatsu N", DetectorFamily::Hamamatsu, GMOS_PIXEL_COUNT)
    }
    /// GMOS-S Hamamatsu detector set
    pub fn hamamatsu_south() -> Self {
        Self::new("Hamamatsu S", DetectorFamily::Hamamatsu, GMOS_PIXEL_COUNT)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn family(&self) -> DetectorFamily {
        self.family
    }
    /// Number of unbinned pixels along the dispersion axis
    pub fn pixel_count(&self) -> u32 {
        self.pixel_count
    }
    pub fn is_legacy_family(&self) -> bool {
        self.family.is_legacy()
    }
}
