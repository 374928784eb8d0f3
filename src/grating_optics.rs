//! Grating optics
//!
//! [`GratingOptics`] is the family independent part of a grating model: it
//! validates the configuration, resolves the calibration record and answers the
//! dispersion, transmission and coverage queries.
//! Instrument families wrap it and supply the rule mapping a [`Detector`] to a
//! calibration [`Namespace`].

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    CalibrationTables, Detector, DispersionCurve, Namespace, PreconditionViolation, Result,
};

/// Grating configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GratingSpec {
    pub grating_name: String,
    /// Central wavelength in nm
    pub central_wavelength: f64,
    /// Unbinned detector pixels along the dispersion axis
    pub detector_pixel_count: u32,
    pub spectral_binning: u32,
}
impl GratingSpec {
    /// Checks the configuration preconditions
    pub fn validate(&self) -> std::result::Result<(), PreconditionViolation> {
        if self.grating_name.is_empty() {
            return Err(PreconditionViolation::EmptyGratingName);
        }
        if self.detector_pixel_count == 0 {
            return Err(PreconditionViolation::ZeroPixelCount);
        }
        if self.spectral_binning == 0 {
            return Err(PreconditionViolation::ZeroSpectralBinning);
        }
        if !(self.central_wavelength.is_finite() && self.central_wavelength > 0f64) {
            return Err(PreconditionViolation::CentralWavelength(
                self.central_wavelength,
            ));
        }
        Ok(())
    }
}

/// Wavelength range seen by the detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavelengthWindow {
    pub start: f64,
    pub end: f64,
}
impl WavelengthWindow {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
    pub fn contains(&self, wavelength: f64) -> bool {
        (self.start..=self.end).contains(&wavelength)
    }
    /// The window translated by `shift`
    pub fn shifted(self, shift: f64) -> Self {
        Self {
            start: self.start + shift,
            end: self.end + shift,
        }
    }
}

/// Transmission and dispersion properties of a grating
#[derive(Debug, Clone)]
pub struct GratingOptics {
    spec: GratingSpec,
    namespace: Namespace,
    curve: Arc<DispersionCurve>,
}
impl GratingOptics {
    /// Resolves the grating calibration
    ///
    /// The preconditions are checked before `tables` is queried.
    pub fn create<F, T>(
        namespace_selector: F,
        tables: &T,
        spec: GratingSpec,
        detector: &Detector,
    ) -> Result<Self>
    where
        F: FnOnce(&Detector) -> Namespace,
        T: CalibrationTables + ?Sized,
    {
        spec.validate()?;
        let namespace = namespace_selector(detector);
        let curve = tables.resolve(namespace, &spec.grating_name)?;
        let optics = Self {
            spec,
            namespace,
            curve,
        };
        let window = optics.window();
        log::info!(
            "{} ({} on {}): {:.1}-{:.1}nm at {:.4}nm/px",
            optics,
            optics.namespace,
            detector.name(),
            window.start,
            window.end,
            optics.dispersion()
        );
        Ok(optics)
    }
    pub fn spec(&self) -> &GratingSpec {
        &self.spec
    }
    pub fn grating_name(&self) -> &str {
        &self.spec.grating_name
    }
    /// Calibration namespace the grating was resolved in
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }
    pub fn calibration(&self) -> &DispersionCurve {
        &self.curve
    }
    pub fn central_wavelength(&self) -> f64 {
        self.spec.central_wavelength
    }
    pub fn effective_wavelength(&self) -> f64 {
        self.spec.central_wavelength
    }
    pub fn detector_pixel_count(&self) -> u32 {
        self.spec.detector_pixel_count
    }
    pub fn spectral_binning(&self) -> u32 {
        self.spec.spectral_binning
    }
    /// Wavelength per unbinned pixel
    pub fn dispersion(&self) -> f64 {
        self.curve.dispersion
    }
    /// Wavelength per binned pixel
    pub fn pixel_width(&self) -> f64 {
        self.dispersion() * self.spec.spectral_binning as f64
    }
    pub fn resolving_power(&self) -> f64 {
        self.curve.resolving_power
    }
    pub fn blaze(&self) -> f64 {
        self.curve.blaze
    }
    /// Grating transmission at `wavelength`, 0 outside of the calibrated range
    pub fn transmission_at(&self, wavelength: f64) -> f64 {
        self.curve.transmission.at(wavelength)
    }
    /// Half of the wavelength range covered by the detector
    pub fn coverage_half_width(&self) -> f64 {
        self.dispersion() * self.spec.detector_pixel_count as f64 / 2f64
    }
    /// Unshifted wavelength range covered by the detector
    pub fn window(&self) -> WavelengthWindow {
        let half_width = self.coverage_half_width();
        WavelengthWindow {
            start: self.spec.central_wavelength - half_width,
            end: self.spec.central_wavelength + half_width,
        }
    }
}
impl fmt::Display for GratingOptics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grating Optics: {}", self.spec.grating_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GratingError, InMemoryTables, TransmissionCurve};
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tables() -> InMemoryTables {
        let mut tables = InMemoryTables::default();
        tables.insert(
            Namespace::Standard,
            "R400_G5305",
            DispersionCurve {
                dispersion: 0.074,
                blaze: 764.,
                resolving_power: 1918.,
                transmission: TransmissionCurve::new(vec![400., 1000.], vec![0.4, 1.])
                    .unwrap(),
            },
        );
        tables
    }

    fn config(
        grating_name: &str,
        detector_pixel_count: u32,
        spectral_binning: u32,
    ) -> GratingSpec {
        GratingSpec {
            grating_name: grating_name.into(),
            central_wavelength: 700.,
            detector_pixel_count,
            spectral_binning,
        }
    }

    fn standard(_: &Detector) -> Namespace {
        Namespace::Standard
    }

    #[derive(Default)]
    struct CountingTables(AtomicUsize);
    impl CalibrationTables for CountingTables {
        fn resolve(&self, namespace: Namespace, grating: &str) -> Result<Arc<DispersionCurve>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(GratingError::not_found(namespace, grating))
        }
    }

    #[test]
    fn queries() {
        let optics = GratingOptics::create(
            standard,
            &tables(),
            config("R400_G5305", 6144, 2),
            &Detector::hamamatsu_south(),
        )
        .unwrap();
        assert_eq!(optics.dispersion(), 0.074);
        assert_relative_eq!(optics.pixel_width(), 0.148);
        assert_relative_eq!(optics.coverage_half_width(), 0.074 * 3072.);
        assert_relative_eq!(optics.window().width(), 0.074 * 6144., epsilon = 1e-9);
        assert_relative_eq!(optics.transmission_at(700.), 0.7, epsilon = 1e-12);
        assert_eq!(optics.transmission_at(300.), 0.);
        assert_eq!(optics.effective_wavelength(), 700.);
        assert_eq!(optics.resolving_power(), 1918.);
        assert_eq!(optics.blaze(), 764.);
        assert_eq!(optics.namespace(), Namespace::Standard);
        assert_eq!(optics.to_string(), "Grating Optics: R400_G5305");
    }

    #[test]
    fn dispersion_ignores_binning() {
        let unbinned = GratingOptics::create(
            standard,
            &tables(),
            config("R400_G5305", 6144, 1),
            &Detector::hamamatsu_south(),
        )
        .unwrap();
        let binned = GratingOptics::create(
            standard,
            &tables(),
            config("R400_G5305", 6144, 4),
            &Detector::hamamatsu_south(),
        )
        .unwrap();
        assert_eq!(unbinned.dispersion(), binned.dispersion());
        assert_eq!(unbinned.window(), binned.window());
        assert_relative_eq!(binned.pixel_width(), 4. * unbinned.pixel_width());
    }

    #[test]
    fn preconditions_before_lookup() {
        let tables = CountingTables::default();
        let detector = Detector::hamamatsu_north();
        let cases = [
            (config("R400_G5305", 0, 1), PreconditionViolation::ZeroPixelCount),
            (
                config("R400_G5305", 6144, 0),
                PreconditionViolation::ZeroSpectralBinning,
            ),
            (config("", 6144, 1), PreconditionViolation::EmptyGratingName),
        ];
        for (spec, violation) in cases {
            match GratingOptics::create(standard, &tables, spec, &detector) {
                Err(GratingError::Precondition(v)) => assert_eq!(v, violation),
                other => panic!("expected {violation:?}, found {other:?}"),
            }
        }
        for central_wavelength in [f64::NAN, f64::INFINITY, 0., -500.] {
            let spec = GratingSpec {
                central_wavelength,
                ..config("R400_G5305", 6144, 1)
            };
            assert!(matches!(
                GratingOptics::create(standard, &tables, spec, &detector),
                Err(GratingError::Precondition(
                    PreconditionViolation::CentralWavelength(_)
                ))
            ));
        }
        assert_eq!(tables.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn not_found_propagates() {
        let tables = CountingTables::default();
        let result = GratingOptics::create(
            standard,
            &tables,
            config("R400_G5305", 6144, 1),
            &Detector::hamamatsu_north(),
        );
        assert!(matches!(result, Err(GratingError::NotFound { .. })));
        assert_eq!(tables.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn corrupt_propagates() {
        let mut tables = tables();
        tables.insert(
            Namespace::Standard,
            "R150_G5306",
            DispersionCurve {
                dispersion: 0.,
                blaze: 717.,
                resolving_power: 631.,
                transmission: TransmissionCurve::new(vec![400., 1000.], vec![0.4, 1.])
                    .unwrap(),
            },
        );
        let result = GratingOptics::create(
            standard,
            &tables,
            config("R150_G5306", 6144, 1),
            &Detector::hamamatsu_north(),
        );
        match result {
            Err(GratingError::DataCorrupt {
                namespace,
                grating,
                reason,
            }) => {
                assert_eq!(namespace, Namespace::Standard);
                assert_eq!(grating, "R150_G5306");
                assert!(reason.contains("dispersion"), "{reason}");
            }
            other => panic!("expected DataCorrupt, found {other:?}"),
        }
    }

    #[test]
    fn window() {
        let window = WavelengthWindow {
            start: 400.,
            end: 600.,
        };
        assert_eq!(window.width(), 200.);
        assert!(window.contains(400.) && window.contains(600.));
        assert!(!window.contains(399.));
        assert_eq!(
            window.shifted(-10.),
            WavelengthWindow {
                start: 390.,
                end: 590.
            }
        );
    }
}
