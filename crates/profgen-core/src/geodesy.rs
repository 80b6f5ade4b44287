//! Great-circle helpers on a spherical Earth.

use crate::units::{Kilometres, Metres};
use geo::{GeodesicArea, Polygon};
use std::f64::consts::PI;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two lon/lat points.
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Kilometres {
    let lat1_rad = lat1 * PI / 180.0;
    let lat2_rad = lat2 * PI / 180.0;
    let dlat = (lat2 - lat1) * PI / 180.0;
    let dlon = (lon2 - lon1) * PI / 180.0;

    let a = (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    Kilometres(EARTH_RADIUS_KM * c)
}

/// Conservative half-width in degrees of a box that contains every point
/// within `distance` of latitude `lat`.
///
/// Used to prefilter candidates before the exact haversine test.
pub fn degree_envelope(distance: Metres, lat: f64) -> (f64, f64) {
    let km = distance.to_kilometres().value();
    let dlat = (km / EARTH_RADIUS_KM).to_degrees();
    let cos_lat = (lat.abs() + dlat).min(89.9).to_radians().cos();
    let dlon = (dlat / cos_lat).min(360.0);
    (dlon, dlat)
}

/// Geodesic area of a lon/lat polygon on the WGS84 ellipsoid, in km².
pub fn geodesic_area_km2(polygon: &Polygon<f64>) -> f64 {
    polygon.geodesic_area_unsigned() / 1e6
}
