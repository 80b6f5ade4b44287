//! ESRI ASCII grid reader.

use anyhow::{anyhow, bail, Context, Result};
use ndarray::Array2;
use profgen_core::Raster;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub fn read_ascii_grid(path: &Path) -> Result<Raster> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading raster '{}'", path.display()))?;
    parse_ascii_grid(&data).with_context(|| format!("parsing raster '{}'", path.display()))
}

pub fn parse_ascii_grid(data: &str) -> Result<Raster> {
    let mut header: HashMap<String, f64> = HashMap::new();
    let mut lines = data.lines().peekable();

    while let Some(&line) = lines.peek() {
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else {
            lines.next();
            continue;
        };
        if !key.starts_with(|c: char| c.is_ascii_alphabetic()) {
            break;
        }
        let value = tokens
            .next()
            .ok_or_else(|| anyhow!("header '{key}' has no value"))?;
        let value: f64 = value
            .parse()
            .with_context(|| format!("header '{key}' has non-numeric value '{value}'"))?;
        header.insert(key.to_ascii_lowercase(), value);
        lines.next();
    }

    let get = |key: &str| {
        header
            .get(key)
            .copied()
            .ok_or_else(|| anyhow!("missing header '{key}'"))
    };
    let ncols = get("ncols")? as usize;
    let nrows = get("nrows")? as usize;
    if ncols == 0 || nrows == 0 {
        bail!("raster must have at least one row and column, got {nrows} x {ncols}");
    }
    let cellsize = get("cellsize")?;
    if !(cellsize > 0.0) {
        bail!("cellsize must be positive, got {cellsize}");
    }
    let x_min = match header.get("xllcorner") {
        Some(&x) => x,
        None => get("xllcenter")? - cellsize / 2.0,
    };
    let y_min = match header.get("yllcorner") {
        Some(&y) => y,
        None => get("yllcenter")? - cellsize / 2.0,
    };
    let nodata = header.get("nodata_value").copied();

    let mut values = Vec::with_capacity(ncols * nrows);
    for line in lines {
        for token in line.split_whitespace() {
            values.push(
                token
                    .parse::<f64>()
                    .with_context(|| format!("invalid raster value '{token}'"))?,
            );
        }
    }
    if values.len() != ncols * nrows {
        bail!(
            "expected {} values ({} rows x {} cols), found {}",
            ncols * nrows,
            nrows,
            ncols,
            values.len()
        );
    }

    Ok(Raster {
        x_min,
        y_max: y_min + nrows as f64 * cellsize,
        cellsize,
        nodata,
        data: Array2::from_shape_vec((nrows, ncols), values)?,
    })
}
