//! GMOS grating optics
//!
//! GMOS gratings are calibrated separately for the legacy EEV detectors.
//! The IFU-2 mode records two wavelength windows offset from each other, hence
//! the coverage queries taking an explicit shift.

use std::{fmt, ops::Deref};

use crate::{
    BinningProvider, CalibrationTables, Detector, FromBuilder, GratingOptics, GratingSpec,
    Namespace, PreconditionViolation, Result, WavelengthWindow,
};

mod builder;
pub use builder::GmosGratingOpticsBuilder;

/// Calibration namespace of a GMOS detector
pub fn gmos_namespace(detector: &Detector) -> Namespace {
    if detector.is_legacy_family() {
        Namespace::Legacy
    } else {
        Namespace::Standard
    }
}

/// GMOS grating transmission and coverage
#[derive(Debug, Clone)]
pub struct GmosGratingOptics {
    optics: GratingOptics,
}
impl FromBuilder for GmosGratingOptics {
    type ComponentBuilder = GmosGratingOpticsBuilder;
}
impl Deref for GmosGratingOptics {
    type Target = GratingOptics;
    fn deref(&self) -> &Self::Target {
        &self.optics
    }
}
impl GmosGratingOptics {
    /// Resolves the calibration of `grating` for `detector`
    pub fn create<T: CalibrationTables + ?Sized>(
        tables: &T,
        grating: &str,
        detector: &Detector,
        central_wavelength: f64,
        detector_pixels: u32,
        spectral_binning: u32,
    ) -> Result<Self> {
        let spec = GratingSpec {
            grating_name: grating.to_owned(),
            central_wavelength,
            detector_pixel_count: detector_pixels,
            spectral_binning,
        };
        Ok(Self {
            optics: GratingOptics::create(gmos_namespace, tables, spec, detector)?,
        })
    }
    /// Resolves the calibration of `grating` for `detector` with the spectral binning of `binning`
    pub fn from_binning<T, B>(
        tables: &T,
        grating: &str,
        detector: &Detector,
        central_wavelength: f64,
        detector_pixels: u32,
        binning: &B,
    ) -> Result<Self>
    where
        T: CalibrationTables + ?Sized,
        B: BinningProvider + ?Sized,
    {
        if binning.spatial_binning() == 0 {
            return Err(PreconditionViolation::ZeroSpatialBinning.into());
        }
        Self::create(
            tables,
            grating,
            detector,
            central_wavelength,
            detector_pixels,
            binning.spectral_binning(),
        )
    }
    /// Start of the detector window translated by `shift` (IFU-2)
    pub fn window_start(&self, shift: f64) -> f64 {
        self.central_wavelength() - self.coverage_half_width() + shift
    }
    /// End of the detector window translated by `shift` (IFU-2)
    pub fn window_end(&self, shift: f64) -> f64 {
        self.central_wavelength() + self.coverage_half_width() + shift
    }
    /// Detector window translated by `shift` (IFU-2)
    pub fn window_shifted(&self, shift: f64) -> WavelengthWindow {
        WavelengthWindow {
            start: self.window_start(shift),
            end: self.window_end(shift),
        }
    }
    /// The two IFU-2 windows, at `-shift` and `+shift` from the unshifted window
    pub fn ifu2_windows(&self, shift: f64) -> [WavelengthWindow; 2] {
        [self.window_shifted(-shift), self.window_shifted(shift)]
    }
    pub fn into_inner(self) -> GratingOptics {
        self.optics
    }
}
impl fmt::Display for GmosGratingOptics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.optics, f)
    }
}
