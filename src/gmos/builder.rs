use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use super::GmosGratingOptics;
use crate::{Binning, BinningProvider, Builder, CalibrationTables, Detector, GratingConfigError};

/// [`GmosGratingOptics`] builder
///
/// Default properties:
///  - grating            : B600_G5307
///  - detector           : GMOS-S Hamamatsu
///  - central wavelength : 600nm
///  - binning            : 1x1
///  - detector pixels    : the detector pixel count
///
/// # Examples
///
/// ```
/// use itc_gratings::{Binning, Builder, Detector, FromBuilder, GmosGratingOptics, TomlTables};
/// let builder = GmosGratingOptics::builder()
///     .grating("R831_G5302")
///     .detector(Detector::eev())
///     .central_wavelength(750.)
///     .binning(Binning::new(2, 4).unwrap());
/// let optics = builder.build(&TomlTables::new("calibration"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GmosGratingOpticsBuilder {
    pub grating: String,
    pub central_wavelength: f64,
    pub detector_pixels: Option<u32>,
    pub detector: Detector,
    #[serde(default)]
    pub binning: Binning,
}
impl Default for GmosGratingOpticsBuilder {
    fn default() -> Self {
        Self {
            grating: "B600_G5307".into(),
            central_wavelength: 600.,
            detector_pixels: None,
            detector: Detector::hamamatsu_south(),
            binning: Binning::default(),
        }
    }
}

impl GmosGratingOpticsBuilder {
    /// Load the builder from a toml file
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, GratingConfigError> {
        let mut file = File::open(&path)
            .map_err(|e| GratingConfigError::Open(e, path.as_ref().to_path_buf()))?;
        let mut toml = String::new();
        file.read_to_string(&mut toml)
            .map_err(|e| GratingConfigError::Read(e, path.as_ref().to_path_buf()))?;
        let builder: GmosGratingOpticsBuilder = toml::from_str(&toml)?;
        Ok(builder)
    }
    /// Save the builder into a toml file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), GratingConfigError> {
        let toml = toml::to_string_pretty(self)?;
        let mut file = File::create(&path)
            .map_err(|e| GratingConfigError::Create(e, path.as_ref().to_path_buf()))?;
        write!(file, "# ::itc_gratings::GmosGratingOpticsBuilder\n\n{}", toml)
            .map_err(|e| GratingConfigError::Write(e, path.as_ref().to_path_buf()))?;
        Ok(())
    }
    /// Set the grating name
    pub fn grating<S: Into<String>>(self, grating: S) -> Self {
        Self {
            grating: grating.into(),
            ..self
        }
    }
    /// Set the detector
    pub fn detector(self, detector: Detector) -> Self {
        Self { detector, ..self }
    }
    /// Set the central wavelength in nm
    pub fn central_wavelength(self, central_wavelength: f64) -> Self {
        Self {
            central_wavelength,
            ..self
        }
    }
    /// Set the detector binning
    pub fn binning(self, binning: Binning) -> Self {
        Self { binning, ..self }
    }
    /// Set the binning from an instrument configuration
    pub fn binning_from<B: BinningProvider + ?Sized>(self, provider: &B) -> Self {
        Self {
            binning: Binning {
                spatial: provider.spatial_binning(),
                spectral: provider.spectral_binning(),
            },
            ..self
        }
    }
    /// Override the number of unbinned pixels along the dispersion axis
    pub fn detector_pixels(self, detector_pixels: u32) -> Self {
        Self {
            detector_pixels: Some(detector_pixels),
            ..self
        }
    }
}
impl Builder for GmosGratingOpticsBuilder {
    type Component = GmosGratingOptics;
    /// Build the [`GmosGratingOptics`]
    fn build<T: CalibrationTables + ?Sized>(self, tables: &T) -> crate::Result<GmosGratingOptics> {
        let binning = self.binning.validate()?;
        let detector_pixels = self
            .detector_pixels
            .unwrap_or_else(|| self.detector.pixel_count());
        GmosGratingOptics::from_binning(
            tables,
            &self.grating,
            &self.detector,
            self.central_wavelength,
            detector_pixels,
            &binning,
        )
    }
}
