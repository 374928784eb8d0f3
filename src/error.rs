use std::path::PathBuf;

use crate::Namespace;

/// Invalid grating configuration, detected before any calibration lookup
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreconditionViolation {
    #[error("the grating name is empty")]
    EmptyGratingName,
    #[error("the detector pixel count must be greater than 0")]
    ZeroPixelCount,
    #[error("the spectral binning must be at least 1")]
    ZeroSpectralBinning,
    #[error("the spatial binning must be at least 1")]
    ZeroSpatialBinning,
    #[error("the central wavelength must be finite and positive, found {0}")]
    CentralWavelength(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum GratingError {
    #[error("grating `{grating}` not found in the `{namespace}` calibration tables")]
    NotFound { namespace: Namespace, grating: String },
    #[error("corrupt calibration data for grating `{grating}` in `{namespace}`: {reason}")]
    DataCorrupt {
        namespace: Namespace,
        grating: String,
        reason: String,
    },
    #[error("invalid grating configuration: {0}")]
    Precondition(#[from] PreconditionViolation),
    #[error("cannot open calibration table: {1}")]
    Open(#[source] std::io::Error, PathBuf),
    #[error("cannot read calibration table: {1}")]
    Read(#[source] std::io::Error, PathBuf),
}

/// Broad classification of a [`GratingError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested grating is not part of the instrument configuration
    Configuration,
    /// The calibration dataset is defective
    DataIntegrity,
    /// The caller supplied invalid parameters
    Precondition,
    /// The calibration store could not be accessed
    Io,
}

impl GratingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::Configuration,
            Self::DataCorrupt { .. } => ErrorKind::DataIntegrity,
            Self::Precondition(_) => ErrorKind::Precondition,
            Self::Open(..) | Self::Read(..) => ErrorKind::Io,
        }
    }
    pub(crate) fn not_found(namespace: Namespace, grating: &str) -> Self {
        Self::NotFound {
            namespace,
            grating: grating.to_owned(),
        }
    }
    pub(crate) fn corrupt(namespace: Namespace, grating: &str, reason: impl ToString) -> Self {
        Self::DataCorrupt {
            namespace,
            grating: grating.to_owned(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GratingConfigError {
    #[error("cannot open `::itc_gratings::GmosGratingOpticsBuilder` toml file: {1}")]
    Open(#[source] std::io::Error, PathBuf),
    #[error("cannot create `::itc_gratings::GmosGratingOpticsBuilder` toml file: {1}")]
    Create(#[source] std::io::Error, PathBuf),
    #[error("cannot read `::itc_gratings::GmosGratingOpticsBuilder` toml file: {1}")]
    Read(#[source] std::io::Error, PathBuf),
    #[error("cannot write `::itc_gratings::GmosGratingOpticsBuilder` toml file: {1}")]
    Write(#[source] std::io::Error, PathBuf),
    #[error("cannot deserialize `::itc_gratings::GmosGratingOpticsBuilder` from toml")]
    Load(#[from] toml::de::Error),
    #[error("cannot serialize `::itc_gratings::GmosGratingOpticsBuilder` into toml")]
    Save(#[from] toml::ser::Error),
}
