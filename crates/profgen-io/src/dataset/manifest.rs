//! `manifest.json` for profile and inflow datasets.
//!
//! The manifest is written last and records the schema version, the tool
//! version, the SHA256 of every table, the input files the run consumed and
//! the diagnostics collected along the way.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use profgen_core::Diagnostics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const CURRENT_SCHEMA_VERSION: &str = "1.0.0";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Profile,
    Inflow,
}

impl DatasetKind {
    pub fn required_tables(self) -> &'static [&'static str] {
        match self {
            DatasetKind::Profile => &["profile", "buses", "potential"],
            DatasetKind::Inflow => &["plants", "inflow"],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub schema_version: String,
    pub created_at: DateTime<Utc>,
    pub profgen_version: String,
    pub technology: String,
    pub kind: DatasetKind,
    /// Input files the dataset was derived from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceInfo>,
    pub tables: BTreeMap<String, TableInfo>,
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Role of the input (e.g. "regions", "cutout", "copernicus")
    pub role: String,
    pub path: String,
    /// SHA256 of the file; absent for directories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub sha256: String,
    pub row_count: u64,
    pub file_size_bytes: u64,
}

impl DatasetManifest {
    pub fn new(technology: impl Into<String>, kind: DatasetKind) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            created_at: Utc::now(),
            profgen_version: env!("CARGO_PKG_VERSION").to_string(),
            technology: technology.into(),
            kind,
            sources: Vec::new(),
            tables: BTreeMap::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn add_table(&mut self, name: impl Into<String>, info: TableInfo) {
        self.tables.insert(name.into(), info);
    }

    pub fn is_compatible(&self) -> Result<()> {
        use semver::Version;

        let manifest_version = Version::parse(&self.schema_version)
            .map_err(|e| anyhow::anyhow!("Invalid schema version in manifest: {}", e))?;
        let current_version = Version::parse(CURRENT_SCHEMA_VERSION)?;

        if manifest_version.major > current_version.major {
            bail!(
                "Schema v{} is too new (this version supports up to v{})",
                self.schema_version,
                CURRENT_SCHEMA_VERSION
            );
        }
        Ok(())
    }

    pub fn verify_all_tables(&self) -> Result<()> {
        for required in self.kind.required_tables() {
            if !self.tables.contains_key(*required) {
                bail!("Missing required table: {}", required);
            }
        }
        Ok(())
    }

    pub fn validate_checksums(&self, base_path: &Path) -> Result<()> {
        for (table_name, info) in &self.tables {
            let file_path = base_path.join(format!("{}.arrow", table_name));
            if !file_path.exists() {
                bail!("Table file not found: {}", file_path.display());
            }

            let actual_hash = compute_sha256(&file_path)?;
            if actual_hash != info.sha256 {
                bail!(
                    "Checksum mismatch for table '{}': expected {}, got {}",
                    table_name,
                    info.sha256,
                    actual_hash
                );
            }
        }
        Ok(())
    }
}

/// Compute SHA256 hash of a file
pub fn compute_sha256(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use std::fs::File;
    use std::io::Read;

    let mut file = File::open(path).map_err(|e| {
        anyhow::anyhow!("Failed to open file for hashing {}: {}", path.display(), e)
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];
    loop {
        let n = file.read(&mut buffer).map_err(|e| {
            anyhow::anyhow!("Failed to read file for hashing {}: {}", path.display(), e)
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Describe an input for the manifest, hashing it when it is a file.
pub fn source_info(role: &str, path: &Path) -> Result<SourceInfo> {
    let sha256 = if path.is_file() {
        Some(compute_sha256(path)?)
    } else {
        None
    };
    Ok(SourceInfo {
        role: role.to_string(),
        path: path.display().to_string(),
        sha256,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manifest_is_current() {
        let manifest = DatasetManifest::new("onwind", DatasetKind::Profile);
        assert_eq!(manifest.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(manifest.is_compatible().is_ok());
        assert!(manifest.verify_all_tables().is_err());
    }

    #[test]
    fn newer_major_version_is_rejected() {
        let mut manifest = DatasetManifest::new("hydro", DatasetKind::Inflow);
        manifest.schema_version = "2.0.0".into();
        assert!(manifest.is_compatible().is_err());
        manifest.schema_version = "1.3.0".into();
        assert!(manifest.is_compatible().is_ok());
    }

    #[test]
    fn source_info_hashes_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("regions.geojson");
        std::fs::write(&file, "abc").unwrap();

        let info = source_info("regions", &file).unwrap();
        assert_eq!(
            info.sha256.as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
        assert!(source_info("cutout", dir.path()).unwrap().sha256.is_none());
    }
}
