//! Program catalog: named programs and the models they run on.
//!
//! The catalog is described by a TOML manifest:
//!
//! ```toml
//! [[program]]
//! name = "Pengo"
//! file = "pengo.kcc"
//! compat = ["kc85_3", "kc85_4"]
//! ```
//!
//! Files are resolved relative to the manifest and read only when a
//! program is started.

use std::path::{Path, PathBuf};

use format_kcc::KccImage;
use serde::Deserialize;
use tracing::info;

use crate::core::EmulationCore;
use crate::device::{Device, DeviceMask};
use crate::error::{Error, Result};

/// One startable program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    /// Models the program runs on.
    pub compat: DeviceMask,
    /// KCC or KC-TAP file.
    pub path: PathBuf,
}

impl CatalogEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, compat: DeviceMask, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            compat,
            path: path.into(),
        }
    }

    /// Whether this entry is `name` and runs on `device`.
    #[must_use]
    pub fn matches(&self, name: &str, device: Device) -> bool {
        self.compat.contains(device.mask()) && self.name == name
    }
}

/// The file-loading service the driver starts programs through.
pub trait ProgramLoader {
    /// All known programs.
    fn items(&self) -> &[CatalogEntry];

    /// Load `entry` into the core and start it.
    ///
    /// # Errors
    ///
    /// Returns an error if the program file cannot be read or parsed.
    fn load_and_start(&self, core: &mut dyn EmulationCore, entry: &CatalogEntry) -> Result<()>;

    /// First entry named `name` that runs on `device`.
    fn find(&self, name: &str, device: Device) -> Option<&CatalogEntry> {
        self.items().iter().find(|item| item.matches(name, device))
    }
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    program: Vec<ManifestEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    name: String,
    file: PathBuf,
    compat: Vec<Device>,
}

/// A catalog of program files on disk.
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    entries: Vec<CatalogEntry>,
}

impl FileCatalog {
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Parse a manifest; relative file paths resolve against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed TOML or unknown model names.
    pub fn from_toml(text: &str, base_dir: &Path, path: &Path) -> Result<Self> {
        let manifest: Manifest = toml::from_str(text).map_err(|source| Error::Catalog {
            path: path.to_path_buf(),
            source,
        })?;

        let entries = manifest
            .program
            .into_iter()
            .map(|entry| CatalogEntry {
                name: entry.name,
                compat: DeviceMask::from(entry.compat.as_slice()),
                path: base_dir.join(entry.file),
            })
            .collect();
        Ok(Self { entries })
    }

    /// Read a manifest file.
    ///
    /// # Errors
    ///
    /// See [`FileCatalog::from_toml`]; also fails if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&text, base_dir, path)
    }
}

impl ProgramLoader for FileCatalog {
    fn items(&self) -> &[CatalogEntry] {
        &self.entries
    }

    fn load_and_start(&self, core: &mut dyn EmulationCore, entry: &CatalogEntry) -> Result<()> {
        let data = std::fs::read(&entry.path).map_err(|source| Error::Io {
            path: entry.path.clone(),
            source,
        })?;
        let image = KccImage::parse_any(&data).map_err(|source| Error::Program {
            path: entry.path.clone(),
            source,
        })?;

        info!(
            name = %entry.name,
            exec = ?image.exec_addr,
            "loading program at ${:04X}-${:04X}",
            image.load_addr,
            image.end_addr
        );
        core.load_program(&image);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[[program]]
name = "Pengo"
file = "pengo.kcc"
compat = ["kc85_3", "kc85_4"]

[[program]]
name = "Pengo"
file = "z1013/pengo.z80"
compat = ["z1013_64"]

[[program]]
name = "Digger"
file = "digger.tap"
compat = ["kc85_4"]
"#;

    fn catalog() -> FileCatalog {
        FileCatalog::from_toml(MANIFEST, Path::new("/games"), Path::new("/games/catalog.toml"))
            .expect("valid manifest")
    }

    #[test]
    fn manifest_paths_resolve_against_base() {
        let catalog = catalog();
        assert_eq!(catalog.items().len(), 3);
        assert_eq!(catalog.items()[0].path, Path::new("/games/pengo.kcc"));
        assert_eq!(catalog.items()[1].path, Path::new("/games/z1013/pengo.z80"));
    }

    #[test]
    fn find_respects_compat_mask() {
        let catalog = catalog();
        let kc = catalog.find("Pengo", Device::Kc85_4).expect("KC85/4 Pengo");
        assert_eq!(kc.path, Path::new("/games/pengo.kcc"));

        let z = catalog.find("Pengo", Device::Z1013_64).expect("Z1013 Pengo");
        assert_eq!(z.path, Path::new("/games/z1013/pengo.z80"));

        assert!(catalog.find("Digger", Device::Kc85_3).is_none());
        assert!(catalog.find("Pengo", Device::Kc85_2).is_none());
        assert!(catalog.find("Nope", Device::Kc85_4).is_none());
    }

    #[test]
    fn unknown_model_rejected() {
        let result = FileCatalog::from_toml(
            "[[program]]\nname = \"X\"\nfile = \"x.kcc\"\ncompat = [\"c64\"]\n",
            Path::new("."),
            Path::new("catalog.toml"),
        );
        assert!(matches!(result, Err(Error::Catalog { .. })));
    }

    #[test]
    fn empty_manifest() {
        let catalog =
            FileCatalog::from_toml("", Path::new("."), Path::new("catalog.toml")).unwrap();
        assert!(catalog.items().is_empty());
    }
}
