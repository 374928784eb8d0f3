//!
//! # ITC grating optics
//!
//! Wavelength coverage, dispersion and transmission of spectrograph gratings
//! for integration time calculators.
//!
//! A grating optics element is resolved once, at construction, against a set of
//! [`CalibrationTables`]: the detector selects the calibration [`Namespace`] and the
//! grating name selects the [`DispersionCurve`] inside it.
//! After construction every query is a pure function of immutable state.
//!
//! ```
//! use itc_gratings::{Builder, Detector, FromBuilder, GmosGratingOptics, InMemoryTables};
//! use itc_gratings::{DispersionCurve, Namespace, TransmissionCurve};
//!
//! let mut tables = InMemoryTables::default();
//! tables.insert(
//!     Namespace::Standard,
//!     "B1200_G5301",
//!     DispersionCurve {
//!         dispersion: 0.261,
//!         blaze: 463.,
//!         resolving_power: 3744.,
//!         transmission: TransmissionCurve::new(vec![300., 1100.], vec![0.5, 0.5]).unwrap(),
//!     },
//! );
//! let optics = GmosGratingOptics::builder()
//!     .grating("B1200_G5301")
//!     .detector(Detector::hamamatsu_south())
//!     .central_wavelength(500.)
//!     .build(&tables)
//!     .unwrap();
//! println!("{optics}: {:?}", optics.window());
//! ```

pub mod binning;
pub mod calibration;
pub mod detector;
pub mod error;
pub mod gmos;
pub mod grating_optics;

#[doc(inline)]
pub use self::binning::{Binning, BinningProvider};
#[doc(inline)]
pub use self::calibration::{
    CalibrationTables, DispersionCurve, InMemoryTables, Namespace, TomlTables, TransmissionCurve,
    TransmissionError,
};
#[doc(inline)]
pub use self::detector::{Detector, DetectorFamily};
#[doc(inline)]
pub use self::error::{ErrorKind, GratingConfigError, GratingError, PreconditionViolation};
#[doc(inline)]
pub use self::gmos::{gmos_namespace, GmosGratingOptics, GmosGratingOpticsBuilder};
#[doc(inline)]
pub use self::grating_optics::{GratingOptics, GratingSpec, WavelengthWindow};

pub type Result<T> = std::result::Result<T, GratingError>;

/// Grating optics builder type trait
///
/// The calibration tables are only borrowed for the duration of the build.
pub trait Builder: Default {
    type Component;
    fn new() -> Self {
        Default::default()
    }
    fn build<T: CalibrationTables + ?Sized>(self, tables: &T) -> Result<Self::Component>;
}

/// Access to the [`Builder`] of a component
pub trait FromBuilder: Sized {
    type ComponentBuilder: Builder<Component = Self>;
    fn builder() -> Self::ComponentBuilder {
        Self::ComponentBuilder::new()
    }
}
