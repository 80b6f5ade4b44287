use geo::{MultiPolygon, Point};

/// Network node with its service-area geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    pub name: String,
    /// Longitude of the bus location
    pub x: f64,
    /// Latitude of the bus location
    pub y: f64,
    /// ISO2 country code
    pub country: String,
    /// Shape the bus region was derived from, used by alternative clustering
    pub shape_id: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

impl Bus {
    pub fn location(&self) -> Point<f64> {
        Point::new(self.x, self.y)
    }
}
