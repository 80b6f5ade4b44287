//! Share of every grid cell that each region may use.
//!
//! Each cell is sampled on an `n × n` lattice of sub-cell centres; a sample
//! counts for a region when it lies inside the region and passes every
//! exclusion layer.

use crate::exclusion::ExclusionContainer;
use anyhow::{Context, Result};
use geo::{BoundingRect, Contains, MultiPolygon, Point};
use indicatif::{ProgressBar, ProgressStyle};
use profgen_core::{AvailabilityMatrix, Grid};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

/// Settings for an availability run.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityOptions {
    /// Sub-samples per cell along each axis
    pub samples_per_cell: usize,
    /// Worker threads; 0 uses every core
    pub threads: usize,
    pub show_progress: bool,
}

impl Default for AvailabilityOptions {
    fn default() -> Self {
        Self {
            samples_per_cell: 10,
            threads: 0,
            show_progress: false,
        }
    }
}

/// Compute the `regions × cells` availability matrix.
pub fn compute_availability(
    grid: &Grid,
    shapes: &[&MultiPolygon<f64>],
    excluder: &ExclusionContainer,
    options: AvailabilityOptions,
) -> Result<AvailabilityMatrix> {
    let samples = options.samples_per_cell.max(1);
    let thread_count = if options.threads == 0 {
        num_cpus::get()
    } else {
        options.threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .context("building Rayon thread pool for availability")?;

    let progress = if options.show_progress {
        let bar = ProgressBar::new(shapes.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})")
                .context("progress bar template")?
                .progress_chars("=> "),
        );
        bar.set_message("availability");
        bar
    } else {
        ProgressBar::hidden()
    };

    let rows: Vec<Vec<(usize, f64)>> = pool.install(|| {
        shapes
            .par_iter()
            .map(|shape| {
                let row = region_row(grid, shape, excluder, samples);
                progress.inc(1);
                row
            })
            .collect()
    });
    progress.finish_and_clear();

    Ok(AvailabilityMatrix::new(grid.len(), rows)?)
}

fn region_row(
    grid: &Grid,
    shape: &MultiPolygon<f64>,
    excluder: &ExclusionContainer,
    samples: usize,
) -> Vec<(usize, f64)> {
    let Some(bounds) = shape.bounding_rect() else {
        return Vec::new();
    };
    let Some((xs, ys)) = grid.cells_in_bounds(bounds.min().x_y(), bounds.max().x_y()) else {
        return Vec::new();
    };

    let total = (samples * samples) as f64;
    let mut row = Vec::new();
    for iy in ys {
        for ix in xs.clone() {
            let cell = grid.index(ix, iy);
            let rect = grid.cell_rect(cell);
            let (w, h) = (rect.width(), rect.height());
            let mut hits = 0usize;
            for sy in 0..samples {
                let y = rect.min().y + (sy as f64 + 0.5) / samples as f64 * h;
                for sx in 0..samples {
                    let x = rect.min().x + (sx as f64 + 0.5) / samples as f64 * w;
                    if shape.contains(&Point::new(x, y)) && excluder.is_eligible(x, y) {
                        hits += 1;
                    }
                }
            }
            if hits > 0 {
                row.push((cell, hits as f64 / total));
            }
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exclusion::GeometryLayer;
    use geo::polygon;
    use profgen_core::grid::Axis;

    fn grid() -> Grid {
        // cells centred on x = 0.5, 1.5 and y = 0.5, 1.5
        Grid::new(
            Axis { start: 0.5, step: 1.0, count: 2 },
            Axis { start: 0.5, step: 1.0, count: 2 },
        )
        .unwrap()
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
            (x: x0, y: y0),
        ]])
    }

    fn options() -> AvailabilityOptions {
        AvailabilityOptions {
            samples_per_cell: 10,
            threads: 2,
            show_progress: false,
        }
    }

    #[test]
    fn region_covering_half_a_cell() {
        let west = rect(0.0, 0.0, 0.5, 1.0);
        let matrix =
            compute_availability(&grid(), &[&west], &ExclusionContainer::new(), options()).unwrap();
        assert_eq!(matrix.n_rows(), 1);
        assert!((matrix.get(0, 0) - 0.5).abs() < 1e-12);
        assert_eq!(matrix.get(0, 1), 0.0);
        assert_eq!(matrix.get(0, 2), 0.0);
    }

    #[test]
    fn exclusions_remove_samples() {
        let everything = rect(0.0, 0.0, 2.0, 2.0);
        let mut excluder = ExclusionContainer::new();
        excluder.add_geometry(GeometryLayer::new("protected", vec![rect(1.0, 1.0, 2.0, 2.0)]));
        let matrix = compute_availability(&grid(), &[&everything], &excluder, options()).unwrap();
        assert_eq!(matrix.get(0, 0), 1.0);
        assert_eq!(matrix.get(0, 3), 0.0);
        assert!(matrix.row(0).iter().all(|&(_, v)| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn disjoint_regions_never_share_more_than_a_cell() {
        let west = rect(0.0, 0.0, 1.0, 2.0);
        let east = rect(1.0, 0.0, 2.0, 2.0);
        let matrix =
            compute_availability(&grid(), &[&west, &east], &ExclusionContainer::new(), options())
                .unwrap();
        for sum in matrix.column_sums() {
            assert!(sum <= 1.0 + 1e-12);
        }
        assert_eq!(matrix.get(0, 0), 1.0);
        assert_eq!(matrix.get(1, 1), 1.0);
    }

    #[test]
    fn region_outside_grid_is_empty() {
        let far = rect(50.0, 50.0, 51.0, 51.0);
        let matrix =
            compute_availability(&grid(), &[&far], &ExclusionContainer::new(), options()).unwrap();
        assert!(matrix.row(0).is_empty());
    }
}
