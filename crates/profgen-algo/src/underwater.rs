//! Share of a bus connection that runs over water.

use geo::{BooleanOps, EuclideanLength, LineString, MultiLineString, MultiPolygon};

/// Union of all offshore shapes.
#[derive(Debug, Clone)]
pub struct OffshoreWater {
    area: MultiPolygon<f64>,
}

impl OffshoreWater {
    pub fn from_shapes(shapes: Vec<MultiPolygon<f64>>) -> Self {
        let area = shapes
            .into_iter()
            .fold(MultiPolygon::new(Vec::new()), |acc, shape| acc.union(&shape));
        Self { area }
    }

    /// Fraction of the straight line from `from` to `to` (planar, degrees)
    /// inside the offshore area; 0 for a degenerate line.
    pub fn underwater_fraction(&self, from: (f64, f64), to: (f64, f64)) -> f64 {
        let line = LineString::from(vec![from, to]);
        let length = line.euclidean_length();
        if length == 0.0 {
            return 0.0;
        }
        let inside = self
            .area
            .clip(&MultiLineString::new(vec![line]), false)
            .euclidean_length();
        (inside / length).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn sea() -> OffshoreWater {
        OffshoreWater::from_shapes(vec![
            MultiPolygon::new(vec![polygon![
                (x: 1.0, y: -1.0), (x: 2.0, y: -1.0), (x: 2.0, y: 1.0), (x: 1.0, y: 1.0), (x: 1.0, y: -1.0),
            ]]),
            MultiPolygon::new(vec![polygon![
                (x: 1.5, y: -1.0), (x: 3.0, y: -1.0), (x: 3.0, y: 1.0), (x: 1.5, y: 1.0), (x: 1.5, y: -1.0),
            ]]),
        ])
    }

    #[test]
    fn overlapping_shapes_count_once() {
        // x from 0 to 4; water covers 1..3
        let fraction = sea().underwater_fraction((0.0, 0.0), (4.0, 0.0));
        assert!((fraction - 0.5).abs() < 1e-9);
    }

    #[test]
    fn fully_offshore_and_onshore() {
        assert!((sea().underwater_fraction((1.2, 0.0), (2.8, 0.0)) - 1.0).abs() < 1e-9);
        assert_eq!(sea().underwater_fraction((-2.0, 0.0), (0.0, 0.0)), 0.0);
    }

    #[test]
    fn zero_length_line() {
        assert_eq!(sea().underwater_fraction((1.5, 0.0), (1.5, 0.0)), 0.0);
    }
}
