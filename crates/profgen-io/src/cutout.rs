//! Cutout directory reader.
//!
//! A cutout is a directory holding `cutout.json` and one or more long-form
//! weather tables:
//!
//! ```json
//! {
//!   "name": "africa-2013",
//!   "x": {"start": 2.0, "step": 0.25, "count": 40},
//!   "y": {"start": 4.0, "step": 0.25, "count": 36},
//!   "time": {"start": "2013-01-01T00:00:00Z", "step_hours": 1.0, "count": 8760},
//!   "variables": {"wnd100m": "wind.parquet", "roughness": "wind.parquet"}
//! }
//! ```
//!
//! Tables carry `time` (step index), `x`, `y` and one column per variable.

use crate::frame::{f64_column, i64_column, read_frame};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use ndarray::Array2;
use profgen_core::{Axis, Cutout, Grid};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const CUTOUT_METADATA: &str = "cutout.json";

#[derive(Debug, Deserialize)]
struct CutoutMetadata {
    #[serde(default)]
    name: Option<String>,
    x: Axis,
    y: Axis,
    time: TimeAxis,
    variables: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct TimeAxis {
    start: DateTime<Utc>,
    step_hours: f64,
    count: usize,
}

pub fn load_cutout(dir: &Path) -> Result<Cutout> {
    let meta_path = dir.join(CUTOUT_METADATA);
    let meta: CutoutMetadata = serde_json::from_str(
        &fs::read_to_string(&meta_path)
            .with_context(|| format!("reading cutout metadata '{}'", meta_path.display()))?,
    )
    .with_context(|| format!("parsing cutout metadata '{}'", meta_path.display()))?;

    let name = meta.name.clone().unwrap_or_else(|| {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cutout".to_string())
    });
    let grid = Grid::new(meta.x, meta.y)?;
    let n_times = meta.time.count;
    let step = Duration::milliseconds((meta.time.step_hours * 3_600_000.0).round() as i64);
    let times: Vec<DateTime<Utc>> = (0..n_times)
        .map(|i| meta.time.start + step * i as i32)
        .collect();

    // variables sharing a table are read together
    let mut by_table: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (variable, table) in &meta.variables {
        by_table.entry(table.as_str()).or_default().push(variable.as_str());
    }

    let mut variables = BTreeMap::new();
    for (table, names) in by_table {
        let path = dir.join(table);
        let df = read_frame(&path)?;
        debug!(table = %path.display(), rows = df.height(), "read cutout table");

        let time = i64_column(&df, "time").with_context(|| format!("table '{}'", path.display()))?;
        let xs = f64_column(&df, "x").with_context(|| format!("table '{}'", path.display()))?;
        let ys = f64_column(&df, "y").with_context(|| format!("table '{}'", path.display()))?;

        let mut positions = Vec::with_capacity(df.height());
        for (row, ((t, x), y)) in time.iter().zip(&xs).zip(&ys).enumerate() {
            let (Some(t), Some(x), Some(y)) = (*t, *x, *y) else {
                bail!("table '{}' row {}: null time or coordinate", path.display(), row);
            };
            if t < 0 || t as usize >= n_times {
                bail!(
                    "table '{}' row {}: time index {} outside 0..{}",
                    path.display(),
                    row,
                    t,
                    n_times
                );
            }
            let Some(cell) = grid.locate(x, y) else {
                bail!(
                    "table '{}' row {}: coordinate ({}, {}) is off the cutout grid",
                    path.display(),
                    row,
                    x,
                    y
                );
            };
            positions.push((t as usize, cell));
        }

        let missing = missing_entries(&positions, n_times, grid.len());
        if missing > 0 {
            warn!(
                table = %path.display(),
                missing,
                expected = n_times * grid.len(),
                "Cutout table does not cover every (time, cell); missing values read as 0"
            );
        }

        for name in names {
            let values =
                f64_column(&df, name).with_context(|| format!("table '{}'", path.display()))?;
            let mut data = Array2::<f64>::zeros((n_times, grid.len()));
            for (&(t, cell), value) in positions.iter().zip(values) {
                data[[t, cell]] = value.unwrap_or(0.0);
            }
            variables.insert(name.to_string(), data);
        }
    }

    Ok(Cutout::new(name, grid, times, meta.time.step_hours, variables)?)
}

/// Number of `(time, cell)` pairs without a row.
fn missing_entries(positions: &[(usize, usize)], n_times: usize, n_cells: usize) -> usize {
    let mut seen = vec![false; n_times * n_cells];
    for &(t, cell) in positions {
        seen[t * n_cells + cell] = true;
    }
    seen.iter().filter(|&&s| !s).count()
}
