//! Exclusion container: ordered raster and geometry layers evaluated per
//! sample point.
//!
//! A point is eligible when no layer excludes it. Each layer computes a
//! `matched` flag and excludes the point iff `matched != invert`.

use geo::{BoundingRect, Closest, ClosestPoint, Contains, MultiPolygon, Point, Rect};
use profgen_core::geodesy::{degree_envelope, haversine_km};
use profgen_core::units::Metres;
use profgen_core::Raster;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum RasterPredicate {
    /// Any non-zero value
    Truthy,
    /// Membership in a set of class codes
    Codes(HashSet<i64>),
    /// Depth below `max_depth` metres, i.e. `value < -max_depth`
    DeeperThan(f64),
}

impl RasterPredicate {
    pub fn codes(codes: &[i64]) -> Self {
        RasterPredicate::Codes(codes.iter().copied().collect())
    }

    pub fn matches(&self, value: f64) -> bool {
        match self {
            RasterPredicate::Truthy => value != 0.0,
            RasterPredicate::Codes(codes) => {
                value.fract() == 0.0 && codes.contains(&(value as i64))
            }
            RasterPredicate::DeeperThan(max_depth) => value < -max_depth,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RasterLayer {
    pub name: String,
    pub raster: Arc<Raster>,
    pub predicate: RasterPredicate,
    /// With a buffer, the layer matches within this distance of a matching pixel
    pub buffer: Option<Metres>,
    pub invert: bool,
    /// Value assumed where the raster has no data
    pub nodata: Option<f64>,
}

impl RasterLayer {
    pub fn new(name: impl Into<String>, raster: Arc<Raster>, predicate: RasterPredicate) -> Self {
        Self {
            name: name.into(),
            raster,
            predicate,
            buffer: None,
            invert: false,
            nodata: None,
        }
    }

    pub fn with_buffer(mut self, buffer: Metres) -> Self {
        self.buffer = Some(buffer);
        self
    }

    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    fn matched(&self, x: f64, y: f64) -> bool {
        match self.buffer {
            Some(buffer) if buffer.value() > 0.0 => {
                self.raster
                    .any_within(x, y, buffer, |v| self.predicate.matches(v))
            }
            _ => self
                .raster
                .value_at(x, y)
                .or(self.nodata)
                .is_some_and(|v| self.predicate.matches(v)),
        }
    }

    pub fn excludes(&self, x: f64, y: f64) -> bool {
        self.matched(x, y) != self.invert
    }
}

#[derive(Debug, Clone)]
pub struct GeometryLayer {
    pub name: String,
    shapes: Vec<(MultiPolygon<f64>, Rect<f64>)>,
    pub buffer: Option<Metres>,
    pub invert: bool,
}

impl GeometryLayer {
    pub fn new(name: impl Into<String>, shapes: Vec<MultiPolygon<f64>>) -> Self {
        let shapes = shapes
            .into_iter()
            .filter_map(|shape| {
                let bounds = shape.bounding_rect()?;
                Some((shape, bounds))
            })
            .collect();
        Self {
            name: name.into(),
            shapes,
            buffer: None,
            invert: false,
        }
    }

    pub fn with_buffer(mut self, buffer: Metres) -> Self {
        self.buffer = Some(buffer);
        self
    }

    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    fn matched(&self, x: f64, y: f64) -> bool {
        let point = Point::new(x, y);
        let buffer = self.buffer.filter(|b| b.value() > 0.0);
        let (dlon, dlat) = buffer.map_or((0.0, 0.0), |b| degree_envelope(b, y));

        self.shapes.iter().any(|(shape, bounds)| {
            if x < bounds.min().x - dlon
                || x > bounds.max().x + dlon
                || y < bounds.min().y - dlat
                || y > bounds.max().y + dlat
            {
                return false;
            }
            if shape.contains(&point) {
                return true;
            }
            let Some(buffer) = buffer else {
                return false;
            };
            match shape.closest_point(&point) {
                Closest::Intersection(_) => true,
                Closest::SinglePoint(p) => {
                    haversine_km(x, y, p.x(), p.y()).value() <= buffer.to_kilometres().value()
                }
                Closest::Indeterminate => false,
            }
        })
    }

    pub fn excludes(&self, x: f64, y: f64) -> bool {
        self.matched(x, y) != self.invert
    }
}

#[derive(Debug, Clone)]
pub enum ExclusionLayer {
    Raster(RasterLayer),
    Geometry(GeometryLayer),
}

impl ExclusionLayer {
    pub fn excludes(&self, x: f64, y: f64) -> bool {
        match self {
            ExclusionLayer::Raster(layer) => layer.excludes(x, y),
            ExclusionLayer::Geometry(layer) => layer.excludes(x, y),
        }
    }
}

impl fmt::Display for ExclusionLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, name, buffer, invert) = match self {
            ExclusionLayer::Raster(l) => ("raster", &l.name, l.buffer, l.invert),
            ExclusionLayer::Geometry(l) => ("geometry", &l.name, l.buffer, l.invert),
        };
        write!(f, "{kind} {name}")?;
        if let Some(buffer) = buffer {
            write!(f, " buffer={buffer}")?;
        }
        if invert {
            write!(f, " inverted")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExclusionContainer {
    layers: Vec<ExclusionLayer>,
}

impl ExclusionContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_raster(&mut self, layer: RasterLayer) {
        self.layers.push(ExclusionLayer::Raster(layer));
    }

    pub fn add_geometry(&mut self, layer: GeometryLayer) {
        self.layers.push(ExclusionLayer::Geometry(layer));
    }

    pub fn layers(&self) -> &[ExclusionLayer] {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn is_eligible(&self, x: f64, y: f64) -> bool {
        !self.layers.iter().any(|layer| layer.excludes(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use ndarray::array;

    fn landcover() -> Arc<Raster> {
        // 2x2 degrees: codes 20 | 50 (north), 80 | 20 (south)
        Arc::new(Raster {
            x_min: 0.0,
            y_max: 2.0,
            cellsize: 1.0,
            nodata: None,
            data: array![[20.0, 50.0], [80.0, 20.0]],
        })
    }

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]])
    }

    #[test]
    fn empty_container_allows_everything() {
        assert!(ExclusionContainer::new().is_eligible(10.0, 10.0));
    }

    #[test]
    fn allowed_codes_are_inverted() {
        let mut excluder = ExclusionContainer::new();
        excluder.add_raster(
            RasterLayer::new("copernicus", landcover(), RasterPredicate::codes(&[20])).inverted(),
        );
        assert!(excluder.is_eligible(0.5, 1.5));
        assert!(!excluder.is_eligible(1.5, 1.5));
        assert!(!excluder.is_eligible(0.5, 0.5));
        // outside the raster: nothing matches, so inversion excludes
        assert!(!excluder.is_eligible(5.0, 5.0));
    }

    #[test]
    fn distance_band_around_codes() {
        let layer = RasterLayer::new("copernicus-distance", landcover(), RasterPredicate::codes(&[50]))
            .with_buffer(Metres(60_000.0));
        // pixel centre (1.5, 1.5); 0.5° west is ~55.6 km away
        assert!(layer.excludes(1.0, 1.5));
        assert!(!layer.excludes(0.1, 0.5));
    }

    #[test]
    fn depth_uses_nodata_outside_coverage() {
        let bathymetry = Arc::new(Raster {
            x_min: 0.0,
            y_max: 1.0,
            cellsize: 1.0,
            nodata: None,
            data: array![[-20.0, -80.0]],
        });
        let layer = RasterLayer::new("gebco", bathymetry, RasterPredicate::DeeperThan(50.0))
            .with_nodata(-1000.0);
        assert!(!layer.excludes(0.5, 0.5));
        assert!(layer.excludes(1.5, 0.5));
        assert!(layer.excludes(3.0, 0.5));
    }

    #[test]
    fn truthy_natura_with_zero_nodata() {
        let natura = Arc::new(Raster {
            x_min: 0.0,
            y_max: 1.0,
            cellsize: 1.0,
            nodata: None,
            data: array![[1.0, 0.0]],
        });
        let layer = RasterLayer::new("natura", natura, RasterPredicate::Truthy).with_nodata(0.0);
        assert!(layer.excludes(0.5, 0.5));
        assert!(!layer.excludes(1.5, 0.5));
        assert!(!layer.excludes(4.0, 0.5));
    }

    #[test]
    fn shore_distance_buffers() {
        let land = vec![square(0.0, 0.0, 1.0)];
        let min_shore = GeometryLayer::new("min_shore_distance", land.clone())
            .with_buffer(Metres(30_000.0));
        let max_shore = GeometryLayer::new("max_shore_distance", land)
            .with_buffer(Metres(80_000.0))
            .inverted();

        // 0.2° (~22 km) east of the coast: too close
        assert!(min_shore.excludes(1.2, 0.5));
        // 0.5° (~56 km): fine for both
        assert!(!min_shore.excludes(1.5, 0.5));
        assert!(!max_shore.excludes(1.5, 0.5));
        // 1° (~111 km): too far
        assert!(max_shore.excludes(2.0, 0.5));
        // on land
        assert!(min_shore.excludes(0.5, 0.5));
    }

    #[test]
    fn layers_compose_with_and() {
        let mut excluder = ExclusionContainer::new();
        excluder.add_raster(
            RasterLayer::new("copernicus", landcover(), RasterPredicate::codes(&[20, 80])).inverted(),
        );
        excluder.add_geometry(GeometryLayer::new("protected", vec![square(0.0, 0.0, 0.9)]));
        assert!(excluder.is_eligible(0.5, 1.5));
        assert!(!excluder.is_eligible(0.5, 0.5));
        assert!(excluder.is_eligible(1.5, 0.5));
        assert_eq!(excluder.layers().len(), 2);
        assert_eq!(excluder.layers()[0].to_string(), "raster copernicus inverted");
    }
}
