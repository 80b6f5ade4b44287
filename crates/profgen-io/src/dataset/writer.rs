//! Dataset directory writer with atomic commit.
//!
//! Tables are written as Arrow IPC files into `<out>.tmp`, the manifest is
//! written last, and the temp directory is renamed onto the final path.

use anyhow::{Context, Result};
use polars::io::ipc::IpcWriter;
use polars::prelude::{DataFrame, NamedFrom, SerWriter, Series};
use profgen_core::{Dataset, Diagnostics, InflowDataset, ProfileDataset};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::manifest::{
    compute_sha256, DatasetKind, DatasetManifest, SourceInfo, TableInfo, MANIFEST_FILE,
};

pub struct DatasetWriter {
    temp_dir: PathBuf,
    final_dir: PathBuf,
}

impl DatasetWriter {
    pub fn new(output_path: impl AsRef<Path>) -> Result<Self> {
        let final_dir = output_path.as_ref().to_path_buf();
        let temp_dir = final_dir.with_extension("tmp");

        // leftover from a crashed previous write
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir).with_context(|| {
                format!("cleaning up stale temp directory: {}", temp_dir.display())
            })?;
        }
        fs::create_dir_all(&temp_dir)
            .with_context(|| format!("creating temp directory: {}", temp_dir.display()))?;

        Ok(Self {
            temp_dir,
            final_dir,
        })
    }

    /// Write all tables and the manifest, then commit. The temp directory is
    /// removed if any step fails.
    pub fn write(
        &self,
        dataset: &Dataset,
        diagnostics: &Diagnostics,
        sources: Vec<SourceInfo>,
    ) -> Result<()> {
        let result = self.write_all(dataset, diagnostics, sources);
        if result.is_err() {
            let _ = self.cleanup();
        }
        result
    }

    fn write_all(
        &self,
        dataset: &Dataset,
        diagnostics: &Diagnostics,
        sources: Vec<SourceInfo>,
    ) -> Result<()> {
        let kind = match dataset {
            Dataset::Profile(_) => DatasetKind::Profile,
            Dataset::Inflow(_) => DatasetKind::Inflow,
        };
        let mut manifest = DatasetManifest::new(dataset.technology(), kind);
        manifest.sources = sources;
        manifest.diagnostics = diagnostics.clone();

        match dataset {
            Dataset::Profile(profile) => self.write_profile_tables(profile, &mut manifest)?,
            Dataset::Inflow(inflow) => self.write_inflow_tables(inflow, &mut manifest)?,
        }

        self.write_manifest(&manifest).context("writing manifest")?;
        self.commit().context("atomic commit")?;
        Ok(())
    }

    fn write_manifest(&self, manifest: &DatasetManifest) -> Result<()> {
        let manifest_path = self.temp_dir.join(MANIFEST_FILE);
        let json =
            serde_json::to_string_pretty(manifest).context("serializing manifest to JSON")?;
        fs::write(&manifest_path, json)
            .with_context(|| format!("writing manifest: {}", manifest_path.display()))?;
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        if self.final_dir.exists() {
            fs::remove_dir_all(&self.final_dir).with_context(|| {
                format!(
                    "removing existing output directory: {}",
                    self.final_dir.display()
                )
            })?;
        }
        fs::rename(&self.temp_dir, &self.final_dir).with_context(|| {
            format!(
                "atomic rename: {} -> {}",
                self.temp_dir.display(),
                self.final_dir.display()
            )
        })?;
        Ok(())
    }

    pub fn cleanup(&self) -> Result<()> {
        if self.temp_dir.exists() {
            fs::remove_dir_all(&self.temp_dir).with_context(|| {
                format!("cleaning up temp directory: {}", self.temp_dir.display())
            })?;
        }
        Ok(())
    }

    pub fn final_dir(&self) -> &Path {
        &self.final_dir
    }

    fn write_table(
        &self,
        name: &str,
        df: &mut DataFrame,
        manifest: &mut DatasetManifest,
    ) -> Result<()> {
        let path = self.temp_dir.join(format!("{}.arrow", name));
        {
            let mut file = fs::File::create(&path)
                .with_context(|| format!("creating table file {}", path.display()))?;
            IpcWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("writing table {}", name))?;
        }

        let sha256 = compute_sha256(&path)?;
        let file_size_bytes = fs::metadata(&path)?.len();
        debug!(table = name, rows = df.height(), bytes = file_size_bytes, "wrote table");
        manifest.add_table(
            name,
            TableInfo {
                sha256,
                row_count: df.height() as u64,
                file_size_bytes,
            },
        );
        Ok(())
    }

    fn write_profile_tables(
        &self,
        dataset: &ProfileDataset,
        manifest: &mut DatasetManifest,
    ) -> Result<()> {
        let times: Vec<String> = dataset.times.iter().map(|t| t.to_rfc3339()).collect();

        let n = dataset.buses.len() * times.len();
        let mut bus = Vec::with_capacity(n);
        let mut time = Vec::with_capacity(n);
        let mut profile = Vec::with_capacity(n);
        for b in &dataset.buses {
            for (t, value) in times.iter().zip(&b.profile) {
                bus.push(b.bus.clone());
                time.push(t.clone());
                profile.push(*value);
            }
        }
        let mut df = DataFrame::new(vec![
            Series::new("bus", bus),
            Series::new("time", time),
            Series::new("profile", profile),
        ])?;
        self.write_table("profile", &mut df, manifest)?;

        let buses = &dataset.buses;
        let mut df = DataFrame::new(vec![
            Series::new("bus", buses.iter().map(|b| b.bus.clone()).collect::<Vec<_>>()),
            Series::new("weight", buses.iter().map(|b| b.weight).collect::<Vec<_>>()),
            Series::new("p_nom_max", buses.iter().map(|b| b.p_nom_max).collect::<Vec<_>>()),
            Series::new(
                "average_distance",
                buses.iter().map(|b| b.average_distance).collect::<Vec<_>>(),
            ),
            Series::new("centre_x", buses.iter().map(|b| b.centre_of_mass.0).collect::<Vec<_>>()),
            Series::new("centre_y", buses.iter().map(|b| b.centre_of_mass.1).collect::<Vec<_>>()),
            Series::new(
                "underwater_fraction",
                buses.iter().map(|b| b.underwater_fraction).collect::<Vec<_>>(),
            ),
        ])?;
        self.write_table("buses", &mut df, manifest)?;

        let grid = &dataset.grid;
        let (xs, ys): (Vec<f64>, Vec<f64>) = (0..grid.len()).map(|c| grid.center(c)).unzip();
        let mut df = DataFrame::new(vec![
            Series::new("y", ys),
            Series::new("x", xs),
            Series::new("potential", dataset.potential.clone()),
        ])?;
        self.write_table("potential", &mut df, manifest)
    }

    fn write_inflow_tables(
        &self,
        dataset: &InflowDataset,
        manifest: &mut DatasetManifest,
    ) -> Result<()> {
        let plants = &dataset.plants;
        let mut df = DataFrame::new(vec![
            Series::new("plant", plants.iter().map(|p| p.name.clone()).collect::<Vec<_>>()),
            Series::new("lon", plants.iter().map(|p| p.lon).collect::<Vec<_>>()),
            Series::new("lat", plants.iter().map(|p| p.lat).collect::<Vec<_>>()),
            Series::new("country", plants.iter().map(|p| p.country.clone()).collect::<Vec<_>>()),
            Series::new(
                "installed_hydro",
                plants.iter().map(|p| p.installed_hydro).collect::<Vec<_>>(),
            ),
        ])?;
        self.write_table("plants", &mut df, manifest)?;

        let times: Vec<String> = dataset.times.iter().map(|t| t.to_rfc3339()).collect();
        let mut plant = Vec::with_capacity(dataset.inflow.len());
        let mut time = Vec::with_capacity(dataset.inflow.len());
        let mut inflow = Vec::with_capacity(dataset.inflow.len());
        for (p, row) in plants.iter().zip(dataset.inflow.rows()) {
            for (t, value) in times.iter().zip(row.iter()) {
                plant.push(p.name.clone());
                time.push(t.clone());
                inflow.push(*value);
            }
        }
        let mut df = DataFrame::new(vec![
            Series::new("plant", plant),
            Series::new("time", time),
            Series::new("inflow", inflow),
        ])?;
        self.write_table("inflow", &mut df, manifest)
    }
}
