//! Regular lon/lat grid shared by cutouts, availability matrices and the
//! potential output.
//!
//! Cells are stacked `(y, x)`: cell `c = iy * nx + ix`.

use crate::error::{ProfgenError, ProfgenResult};
use crate::geodesy::geodesic_area_km2;
use geo::{coord, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// Evenly spaced axis described by its first value, step and length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub start: f64,
    pub step: f64,
    pub count: usize,
}

impl Axis {
    /// Index of the value nearest to `v`, if it lies within half a step.
    pub fn locate(&self, v: f64) -> Option<usize> {
        let pos = (v - self.start) / self.step;
        let idx = pos.round();
        if idx < 0.0 || idx >= self.count as f64 || (pos - idx).abs() > 0.5 + 1e-9 {
            return None;
        }
        Some(idx as usize)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub x: Axis,
    pub y: Axis,
}

impl Grid {
    pub fn new(x: Axis, y: Axis) -> ProfgenResult<Self> {
        for (name, axis) in [("x", &x), ("y", &y)] {
            if axis.count == 0 {
                return Err(ProfgenError::Validation(format!("grid axis {name} is empty")));
            }
            if !(axis.step > 0.0) || !axis.start.is_finite() {
                return Err(ProfgenError::Validation(format!(
                    "grid axis {name} must be ascending with a positive step (got start {}, step {})",
                    axis.start, axis.step
                )));
            }
        }
        Ok(Self { x, y })
    }

    pub fn nx(&self) -> usize {
        self.x.count
    }

    pub fn ny(&self) -> usize {
        self.y.count
    }

    pub fn len(&self) -> usize {
        self.nx() * self.ny()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dx(&self) -> f64 {
        self.x.step
    }

    pub fn dy(&self) -> f64 {
        self.y.step
    }

    #[inline]
    pub fn index(&self, ix: usize, iy: usize) -> usize {
        iy * self.nx() + ix
    }

    #[inline]
    pub fn unravel(&self, cell: usize) -> (usize, usize) {
        (cell % self.nx(), cell / self.nx())
    }

    /// Cell centre as `(x, y)`.
    pub fn center(&self, cell: usize) -> (f64, f64) {
        let (ix, iy) = self.unravel(cell);
        (
            self.x.start + self.x.step * ix as f64,
            self.y.start + self.y.step * iy as f64,
        )
    }

    pub fn locate(&self, x: f64, y: f64) -> Option<usize> {
        Some(self.index(self.x.locate(x)?, self.y.locate(y)?))
    }

    pub fn cell_rect(&self, cell: usize) -> Rect<f64> {
        let (cx, cy) = self.center(cell);
        let (hx, hy) = (self.dx() / 2.0, self.dy() / 2.0);
        Rect::new(
            coord! { x: cx - hx, y: cy - hy },
            coord! { x: cx + hx, y: cy + hy },
        )
    }

    pub fn cell_polygon(&self, cell: usize) -> Polygon<f64> {
        self.cell_rect(cell).to_polygon()
    }

    /// Range of cell indices along each axis whose boxes touch `[min, max]`.
    pub fn cells_in_bounds(
        &self,
        min: (f64, f64),
        max: (f64, f64),
    ) -> Option<(std::ops::RangeInclusive<usize>, std::ops::RangeInclusive<usize>)> {
        let span = |axis: &Axis, lo: f64, hi: f64| {
            let first = ((lo - axis.start) / axis.step - 0.5).ceil().max(0.0);
            let last = ((hi - axis.start) / axis.step + 0.5).floor();
            let last = last.min(axis.count as f64 - 1.0);
            (first <= last).then(|| first as usize..=last as usize)
        };
        Some((span(&self.x, min.0, max.0)?, span(&self.y, min.1, max.1)?))
    }

    /// Geodesic area of every cell in km².
    ///
    /// Area only depends on latitude, so it is computed once per row.
    pub fn cell_areas_km2(&self) -> Vec<f64> {
        let mut areas = Vec::with_capacity(self.len());
        for iy in 0..self.ny() {
            let row_area = geodesic_area_km2(&self.cell_polygon(self.index(0, iy)));
            areas.extend(std::iter::repeat(row_area).take(self.nx()));
        }
        areas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(
            Axis { start: 2.0, step: 0.5, count: 4 },
            Axis { start: 6.0, step: 0.5, count: 3 },
        )
        .unwrap()
    }

    #[test]
    fn stacking_order_is_y_then_x() {
        let g = grid();
        assert_eq!(g.len(), 12);
        assert_eq!(g.index(1, 2), 9);
        assert_eq!(g.unravel(9), (1, 2));
        assert_eq!(g.center(9), (2.5, 7.0));
    }

    #[test]
    fn locate_snaps_to_nearest_cell() {
        let g = grid();
        assert_eq!(g.locate(2.6, 6.9), Some(g.index(1, 2)));
        assert_eq!(g.locate(10.0, 6.0), None);
        assert_eq!(g.locate(1.5, 6.0), None);
    }

    #[test]
    fn bounds_selects_touching_cells() {
        let g = grid();
        let (xs, ys) = g.cells_in_bounds((2.2, 6.0), (2.4, 6.1)).unwrap();
        assert_eq!(xs, 0..=1);
        assert_eq!(ys, 0..=0);
        assert!(g.cells_in_bounds((20.0, 20.0), (21.0, 21.0)).is_none());
    }

    #[test]
    fn areas_shrink_towards_the_pole() {
        let g = Grid::new(
            Axis { start: 0.0, step: 1.0, count: 1 },
            Axis { start: 0.0, step: 30.0, count: 3 },
        )
        .unwrap();
        let areas = g.cell_areas_km2();
        assert!(areas[0] > areas[1] && areas[1] > areas[2]);
    }

    #[test]
    fn rejects_descending_axis() {
        let err = Grid::new(
            Axis { start: 0.0, step: -1.0, count: 2 },
            Axis { start: 0.0, step: 1.0, count: 2 },
        )
        .unwrap_err();
        assert!(err.to_string().contains("ascending"));
    }
}
