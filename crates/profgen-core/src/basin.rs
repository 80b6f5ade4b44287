use geo::MultiPolygon;

/// Hydrological basin with its downstream link.
#[derive(Debug, Clone, PartialEq)]
pub struct Basin {
    pub id: i64,
    /// Downstream basin id; 0 marks an outlet
    pub next_down: i64,
    /// Distance along the main stem to the outlet (km)
    pub dist_main: f64,
    pub geometry: MultiPolygon<f64>,
}
