use anyhow::{bail, Context, Result};
use polars::prelude::{DataFrame, IpcReader, SerReader};
use std::fs;
use std::path::{Path, PathBuf};

use super::manifest::{DatasetManifest, MANIFEST_FILE};

/// Verified view of a dataset directory.
pub struct DatasetReader {
    dir: PathBuf,
    manifest: DatasetManifest,
}

impl DatasetReader {
    /// Load the manifest and check version, table presence and checksums.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let manifest_path = dir.join(MANIFEST_FILE);
        let json = fs::read_to_string(&manifest_path)
            .with_context(|| format!("reading manifest: {}", manifest_path.display()))?;
        let manifest: DatasetManifest = serde_json::from_str(&json)
            .with_context(|| format!("parsing manifest: {}", manifest_path.display()))?;

        manifest.is_compatible()?;
        manifest.verify_all_tables()?;
        manifest.validate_checksums(&dir)?;
        Ok(Self { dir, manifest })
    }

    pub fn manifest(&self) -> &DatasetManifest {
        &self.manifest
    }

    pub fn table(&self, name: &str) -> Result<DataFrame> {
        if !self.manifest.tables.contains_key(name) {
            bail!("dataset {} has no table '{}'", self.dir.display(), name);
        }
        let path = self.dir.join(format!("{}.arrow", name));
        let file =
            fs::File::open(&path).with_context(|| format!("opening table {}", path.display()))?;
        IpcReader::new(file)
            .finish()
            .with_context(|| format!("reading table {}", path.display()))
    }
}
