//! Georeferenced lon/lat rasters used as exclusion layers.

use crate::geodesy::{degree_envelope, haversine_km};
use crate::units::Metres;
use ndarray::Array2;

/// North-up raster; row 0 is the northernmost row.
#[derive(Debug, Clone)]
pub struct Raster {
    /// Western edge of the first column
    pub x_min: f64,
    /// Northern edge of the first row
    pub y_max: f64,
    pub cellsize: f64,
    pub nodata: Option<f64>,
    pub data: Array2<f64>,
}

impl Raster {
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    pub fn pixel_index(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col = ((x - self.x_min) / self.cellsize).floor();
        let row = ((self.y_max - y) / self.cellsize).floor();
        if col < 0.0 || row < 0.0 || col >= self.ncols() as f64 || row >= self.nrows() as f64 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.x_min + (col as f64 + 0.5) * self.cellsize,
            self.y_max - (row as f64 + 0.5) * self.cellsize,
        )
    }

    fn valid(&self, value: f64) -> Option<f64> {
        match self.nodata {
            Some(nodata) if value == nodata => None,
            _ if value.is_nan() => None,
            _ => Some(value),
        }
    }

    /// Value under `(x, y)`; `None` outside the raster or on nodata pixels.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let (row, col) = self.pixel_index(x, y)?;
        self.valid(self.data[[row, col]])
    }

    /// Whether any valid pixel whose centre lies within `radius` of `(x, y)`
    /// satisfies `pred`.
    pub fn any_within(&self, x: f64, y: f64, radius: Metres, pred: impl Fn(f64) -> bool) -> bool {
        let (dlon, dlat) = degree_envelope(radius, y);
        let radius_km = radius.to_kilometres().value();

        let col_lo = ((x - dlon - self.x_min) / self.cellsize).floor().max(0.0) as usize;
        let col_hi = ((x + dlon - self.x_min) / self.cellsize).floor();
        let row_lo = ((self.y_max - (y + dlat)) / self.cellsize).floor().max(0.0) as usize;
        let row_hi = ((self.y_max - (y - dlat)) / self.cellsize).floor();
        if col_hi < 0.0 || row_hi < 0.0 || self.data.is_empty() {
            return false;
        }
        let col_hi = (col_hi as usize).min(self.ncols().saturating_sub(1));
        let row_hi = (row_hi as usize).min(self.nrows().saturating_sub(1));

        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                let Some(value) = self.valid(self.data[[row, col]]) else {
                    continue;
                };
                if !pred(value) {
                    continue;
                }
                let (px, py) = self.pixel_center(row, col);
                if haversine_km(x, y, px, py).value() <= radius_km {
                    return true;
                }
            }
        }
        false
    }
}
