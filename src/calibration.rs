//! Grating calibration tables
//!
//! The calibration dataset is partitioned into [`Namespace`]s, one per detector
//! family, each holding one [`DispersionCurve`] per grating.
//! [`CalibrationTables`] is the lookup contract; [`InMemoryTables`] and the file
//! backed [`TomlTables`] implement it.

use std::{collections::HashMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{GratingError, Result};

mod toml_tables;
pub use toml_tables::TomlTables;

/// Calibration sub-namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Gratings calibrated for the current detectors
    Standard,
    /// Gratings calibrated for the legacy EEV detectors
    Legacy,
}
impl Namespace {
    /// Directory name of the namespace in the calibration dataset
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "gratings",
            Self::Legacy => "eev_gratings",
        }
    }
}
impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransmissionError {
    #[error("wavelength and transmission must have the same length ({0} != {1})")]
    LengthMismatch(usize, usize),
    #[error("at least 2 samples are required, found {0}")]
    TooFewSamples(usize),
    #[error("wavelengths must be finite and strictly ascending")]
    NotAscending,
    #[error("transmission values must be within [0,1], found {0}")]
    OutOfRange(f64),
}

#[derive(Deserialize)]
struct TransmissionTable {
    wavelength: Vec<f64>,
    transmission: Vec<f64>,
}
impl TryFrom<TransmissionTable> for TransmissionCurve {
    type Error = TransmissionError;
    fn try_from(table: TransmissionTable) -> std::result::Result<Self, Self::Error> {
        TransmissionCurve::new(table.wavelength, table.transmission)
    }
}

/// Grating transmission versus wavelength
///
/// Piecewise linear between the samples and 0 outside of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransmissionTable")]
pub struct TransmissionCurve {
    wavelength: Vec<f64>,
    transmission: Vec<f64>,
}
impl TransmissionCurve {
    /// Creates a transmission curve from wavelength samples in ascending order
    pub fn new(
        wavelength: Vec<f64>,
        transmission: Vec<f64>,
    ) -> std::result::Result<Self, TransmissionError> {
        if wavelength.len() != transmission.len() {
            return Err(TransmissionError::LengthMismatch(
                wavelength.len(),
                transmission.len(),
            ));
        }
        if wavelength.len() < 2 {
            return Err(TransmissionError::TooFewSamples(wavelength.len()));
        }
        if wavelength.iter().any(|w| !w.is_finite()) || wavelength.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(TransmissionError::NotAscending);
        }
        if let Some(t) = transmission
            .iter()
            .find(|t| !(0f64..=1f64).contains(*t))
        {
            return Err(TransmissionError::OutOfRange(*t));
        }
        Ok(Self {
            wavelength,
            transmission,
        })
    }
    /// Wavelength range covered by the samples
    pub fn domain(&self) -> (f64, f64) {
        (
            self.wavelength[0],
            self.wavelength[self.wavelength.len() - 1],
        )
    }
    /// Transmission at `wavelength`
    pub fn at(&self, wavelength: f64) -> f64 {
        let (lower, upper) = self.domain();
        if !(lower..=upper).contains(&wavelength) {
            return 0f64;
        }
        // index of the first sample above `wavelength`, clamped to the last segment
        let i = self
            .wavelength
            .partition_point(|w| *w <= wavelength)
            .clamp(1, self.wavelength.len() - 1);
        let (w0, w1) = (self.wavelength[i - 1], self.wavelength[i]);
        let (t0, t1) = (self.transmission[i - 1], self.transmission[i]);
        let t = (wavelength - w0) / (w1 - w0);
        t0 * (1f64 - t) + t1 * t
    }
}

/// Calibration record of a grating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispersionCurve {
    /// Wavelength per unbinned pixel
    pub dispersion: f64,
    /// Blaze wavelength
    pub blaze: f64,
    /// Resolving power for a 0.5" slit
    pub resolving_power: f64,
    pub transmission: TransmissionCurve,
}
impl DispersionCurve {
    /// Checks the record invariants, returning the first one that is violated
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.dispersion.is_finite() && self.dispersion > 0f64) {
            return Err(format!(
                "dispersion must be positive, found {}",
                self.dispersion
            ));
        }
        if !(self.blaze.is_finite() && self.blaze > 0f64) {
            return Err(format!("blaze must be positive, found {}", self.blaze));
        }
        if !(self.resolving_power.is_finite() && self.resolving_power > 0f64) {
            return Err(format!(
                "resolving power must be positive, found {}",
                self.resolving_power
            ));
        }
        Ok(())
    }
}

/// Calibration table lookup
///
/// Resolving the same `(namespace, grating)` twice must return equal curves.
pub trait CalibrationTables: Send + Sync {
    fn resolve(&self, namespace: Namespace, grating: &str) -> Result<Arc<DispersionCurve>>;
}

impl<T: CalibrationTables + ?Sized> CalibrationTables for Arc<T> {
    fn resolve(&self, namespace: Namespace, grating: &str) -> Result<Arc<DispersionCurve>> {
        (**self).resolve(namespace, grating)
    }
}

/// Calibration tables held in memory
///
/// Records are validated when resolved, not when inserted.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTables {
    tables: HashMap<Namespace, HashMap<String, Arc<DispersionCurve>>>,
}
impl InMemoryTables {
    /// Adds or replaces the record of `grating` in `namespace`
    pub fn insert<S: Into<String>>(
        &mut self,
        namespace: Namespace,
        grating: S,
        curve: DispersionCurve,
    ) -> &mut Self {
        self.tables
            .entry(namespace)
            .or_default()
            .insert(grating.into(), Arc::new(curve));
        self
    }
}
impl CalibrationTables for InMemoryTables {
    fn resolve(&self, namespace: Namespace, grating: &str) -> Result<Arc<DispersionCurve>> {
        let curve = self
            .tables
            .get(&namespace)
            .and_then(|table| table.get(grating))
            .ok_or_else(|| GratingError::not_found(namespace, grating))?;
        curve
            .validate()
            .map_err(|reason| GratingError::corrupt(namespace, grating, reason))?;
        Ok(Arc::clone(curve))
    }
}
