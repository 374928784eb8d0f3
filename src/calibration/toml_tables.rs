use std::{
    collections::HashMap,
    fs::File,
    hash::Hash,
    io::{self, Read},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use serde::Deserialize;

use super::{CalibrationTables, DispersionCurve, Namespace, TransmissionCurve};
use crate::{GratingError, Result};

#[derive(Debug, Clone, Copy, Deserialize)]
struct GratingRecord {
    dispersion: f64,
    blaze: f64,
    resolving_power: f64,
}

#[derive(Debug, Deserialize)]
struct NamespaceTable {
    #[serde(default)]
    gratings: HashMap<String, GratingRecord>,
}

/// Calibration tables stored as toml files
///
/// The dataset layout under the root directory is
///  - `<namespace>.toml`: one `[gratings.<name>]` table per grating with the
///    `dispersion`, `blaze` and `resolving_power` values
///  - `transmission/<name>.toml`: the `wavelength` and `transmission` arrays of
///    the grating
///
/// Resolved curves are cached, each `(namespace, grating)` pair is loaded once
/// and each namespace file is parsed once.
/// Loading a grating only blocks the threads resolving the same grating.
#[derive(Debug)]
pub struct TomlTables {
    root: PathBuf,
    curves: Mutex<HashMap<(Namespace, String), Slot<DispersionCurve>>>,
    namespaces: Mutex<HashMap<Namespace, Slot<NamespaceTable>>>,
}

/// Cache entry, empty until its value is loaded
type Slot<T> = Arc<Mutex<Option<Arc<T>>>>;

/// Returns the slot of `key`, inserting an empty one if needed
fn slot<K: Eq + Hash, T>(slots: &Mutex<HashMap<K, Slot<T>>>, key: K) -> Slot<T> {
    let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slots.entry(key).or_default())
}

/// Returns the value in `slot`, calling `load` to fill it if it is empty
///
/// Failed loads leave the slot empty.
fn get_or_load<T, F>(slot: &Slot<T>, load: F) -> Result<Arc<T>>
where
    F: FnOnce() -> Result<T>,
{
    let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(value) = cached.as_ref() {
        return Ok(Arc::clone(value));
    }
    let value = Arc::new(load()?);
    *cached = Some(Arc::clone(&value));
    Ok(value)
}
impl TomlTables {
    /// Creates the lookup for the dataset at `root`, nothing is read until a grating is resolved
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            curves: Default::default(),
            namespaces: Default::default(),
        }
    }
    pub fn root(&self) -> &Path {
        &self.root
    }
    fn namespace_path(&self, namespace: Namespace) -> PathBuf {
        self.root.join(format!("{namespace}.toml"))
    }
    fn transmission_path(&self, grating: &str) -> PathBuf {
        self.root.join("transmission").join(format!("{grating}.toml"))
    }
    /// Reads a toml file, `None` if it does not exist
    fn read(path: &Path) -> Result<Option<String>> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(GratingError::Open(e, path.to_path_buf())),
        };
        let mut toml = String::new();
        file.read_to_string(&mut toml)
            .map_err(|e| GratingError::Read(e, path.to_path_buf()))?;
        Ok(Some(toml))
    }
    fn load_namespace(&self, namespace: Namespace, grating: &str) -> Result<NamespaceTable> {
        let path = self.namespace_path(namespace);
        log::debug!("Loading {} calibration table from {:?}", namespace, path);
        let toml = Self::read(&path)?.ok_or_else(|| GratingError::not_found(namespace, grating))?;
        toml::from_str(&toml)
            .map_err(|e| GratingError::corrupt(namespace, grating, format!("{path:?}: {e}")))
    }
    fn load(&self, namespace: Namespace, grating: &str) -> Result<DispersionCurve> {
        let table = get_or_load(&slot(&self.namespaces, namespace), || {
            self.load_namespace(namespace, grating)
        })?;
        let record = table
            .gratings
            .get(grating)
            .copied()
            .ok_or_else(|| GratingError::not_found(namespace, grating))?;

        let path = self.transmission_path(grating);
        log::debug!("Loading {} transmission from {:?}", grating, path);
        let toml = Self::read(&path)?.ok_or_else(|| GratingError::not_found(namespace, grating))?;
        let transmission: TransmissionCurve = toml::from_str(&toml)
            .map_err(|e| GratingError::corrupt(namespace, grating, format!("{path:?}: {e}")))?;

        let curve = DispersionCurve {
            dispersion: record.dispersion,
            blaze: record.blaze,
            resolving_power: record.resolving_power,
            transmission,
        };
        curve
            .validate()
            .map_err(|reason| GratingError::corrupt(namespace, grating, reason))?;
        Ok(curve)
    }
}
impl CalibrationTables for TomlTables {
    fn resolve(&self, namespace: Namespace, grating: &str) -> Result<Arc<DispersionCurve>> {
        // the slot lock is held while loading so a key is never loaded twice
        let curve = slot(&self.curves, (namespace, grating.to_owned()));
        get_or_load(&curve, || self.load(namespace, grating))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, sync::mpsc, thread, time::Duration};

    fn dataset() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("gratings.toml"),
            r#"
[gratings.B600_G5307]
dispersion = 0.5
blaze = 461.0
resolving_power = 1688.0

[gratings.B1200_G5301]
dispersion = 0.261
blaze = 463.0
resolving_power = 3744.0

[gratings.R150_G5306]
dispersion = -1.0
blaze = 717.0
resolving_power = 631.0
"#,
        )
        .unwrap();
        fs::write(root.path().join("eev_gratings.toml"), "gratings = 3").unwrap();
        fs::create_dir(root.path().join("transmission")).unwrap();
        for grating in ["B600_G5307", "B1200_G5301", "R150_G5306"] {
            fs::write(
                root.path().join("transmission").join(format!("{grating}.toml")),
                "wavelength = [300.0, 1100.0]\ntransmission = [0.3, 0.6]",
            )
            .unwrap();
        }
        root
    }

    #[test]
    fn resolve_and_cache() {
        let root = dataset();
        let tables = TomlTables::new(root.path());
        let a = tables.resolve(Namespace::Standard, "B600_G5307").unwrap();
        assert_eq!(a.dispersion, 0.5);
        assert_eq!(a.transmission.domain(), (300., 1100.));
        // served from the cache once the files are gone
        fs::remove_file(root.path().join("gratings.toml")).unwrap();
        let b = tables.resolve(Namespace::Standard, "B600_G5307").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn namespace_parsed_once() {
        let root = dataset();
        let tables = TomlTables::new(root.path());
        tables.resolve(Namespace::Standard, "B600_G5307").unwrap();
        fs::remove_file(root.path().join("gratings.toml")).unwrap();
        let curve = tables.resolve(Namespace::Standard, "B1200_G5301").unwrap();
        assert_eq!(curve.dispersion, 0.261);
        assert!(matches!(
            tables.resolve(Namespace::Standard, "R831_G5302"),
            Err(GratingError::NotFound { .. })
        ));
    }

    #[test]
    fn loading_does_not_block_other_gratings() {
        let root = dataset();
        let tables = TomlTables::new(root.path());
        let busy = slot(&tables.curves, (Namespace::Standard, "R150_G5306".to_owned()));
        let (tx, rx) = mpsc::channel();
        let tables = &tables;
        thread::scope(|s| {
            let _loading = busy.lock().unwrap();
            s.spawn(move || {
                let _ = tx.send(tables.resolve(Namespace::Standard, "B600_G5307"));
            });
            let curve = rx
                .recv_timeout(Duration::from_secs(10))
                .expect("resolve blocked by an unrelated grating")
                .unwrap();
            assert_eq!(curve.dispersion, 0.5);
        });
    }

    #[test]
    fn missing_grating() {
        let root = dataset();
        let tables = TomlTables::new(root.path());
        assert!(matches!(
            tables.resolve(Namespace::Standard, "R831_G5302"),
            Err(GratingError::NotFound { .. })
        ));
    }

    #[test]
    fn missing_transmission() {
        let root = dataset();
        fs::remove_file(root.path().join("transmission").join("B600_G5307.toml")).unwrap();
        let tables = TomlTables::new(root.path());
        assert!(matches!(
            tables.resolve(Namespace::Standard, "B600_G5307"),
            Err(GratingError::NotFound { .. })
        ));
    }

    #[test]
    fn missing_namespace() {
        let root = tempfile::tempdir().unwrap();
        let tables = TomlTables::new(root.path());
        assert!(matches!(
            tables.resolve(Namespace::Legacy, "B600_G5307"),
            Err(GratingError::NotFound {
                namespace: Namespace::Legacy,
                ..
            })
        ));
    }

    #[test]
    fn corrupt_data() {
        let root = dataset();
        let tables = TomlTables::new(root.path());
        assert!(matches!(
            tables.resolve(Namespace::Standard, "R150_G5306"),
            Err(GratingError::DataCorrupt { .. })
        ));
        assert!(matches!(
            tables.resolve(Namespace::Legacy, "B600_G5307"),
            Err(GratingError::DataCorrupt { .. })
        ));
    }
}
