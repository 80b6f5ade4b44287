//! GeoJSON readers for bus regions, country/offshore shapes and
//! hydrological basins.

use anyhow::{anyhow, bail, Context, Result};
use geo::{Geometry, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson, JsonValue};
use profgen_core::{Basin, Bus, ProfgenError};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading GeoJSON '{}'", path.display()))?;
    let geojson: GeoJson = data
        .parse()
        .with_context(|| format!("parsing GeoJSON '{}'", path.display()))?;
    FeatureCollection::try_from(geojson)
        .with_context(|| format!("'{}' is not a FeatureCollection", path.display()))
}

/// Polygonal geometry of a feature as a MultiPolygon.
fn feature_geometry(feature: &Feature, index: usize) -> Result<MultiPolygon<f64>> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| ProfgenError::Geometry(format!("feature {index} has no geometry")))?;
    let geometry = Geometry::<f64>::try_from(geometry.value.clone())
        .map_err(|err| ProfgenError::Geometry(format!("feature {index}: {err}")))?;
    match geometry {
        Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi) => Ok(multi),
        other => Err(ProfgenError::Geometry(format!(
            "feature {index}: expected Polygon or MultiPolygon, got {}",
            geometry_name(&other)
        ))
        .into()),
    }
}

fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// String-valued property; numbers are rendered as text.
fn string_property(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn f64_property(feature: &Feature, key: &str) -> Option<f64> {
    match feature.property(key)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn i64_property(feature: &Feature, key: &str) -> Option<i64> {
    match feature.property(key)? {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|v| v as i64)),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read bus regions with `name`, `x`, `y`, `country` and optional
/// `shape_id` properties.
pub fn read_regions(path: &Path) -> Result<Vec<Bus>> {
    let collection = read_feature_collection(path)?;
    let mut seen = HashSet::new();
    let mut buses = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.iter().enumerate() {
        let required = |key: &str| anyhow!("region {index} in '{}' is missing '{key}'", path.display());
        let name = string_property(feature, "name").ok_or_else(|| required("name"))?;
        let x = f64_property(feature, "x").ok_or_else(|| required("x"))?;
        let y = f64_property(feature, "y").ok_or_else(|| required("y"))?;
        let country = string_property(feature, "country").ok_or_else(|| required("country"))?;
        let geometry = feature_geometry(feature, index)
            .with_context(|| format!("region '{name}' in '{}'", path.display()))?;

        if !seen.insert(name.clone()) {
            bail!("duplicate region name '{}' in '{}'", name, path.display());
        }
        buses.push(Bus {
            name,
            x,
            y,
            country,
            shape_id: string_property(feature, "shape_id"),
            geometry,
        });
    }
    Ok(buses)
}

/// Read every polygonal feature of a shape file.
pub fn read_shapes(path: &Path) -> Result<Vec<MultiPolygon<f64>>> {
    let collection = read_feature_collection(path)?;
    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            feature_geometry(feature, index).with_context(|| format!("shape in '{}'", path.display()))
        })
        .collect()
}

/// Read HydroBASINS polygons with `HYBAS_ID`, `NEXT_DOWN` and `DIST_MAIN`.
pub fn read_basins(path: &Path) -> Result<Vec<Basin>> {
    let collection = read_feature_collection(path)?;
    let mut basins = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.iter().enumerate() {
        let id = i64_property(feature, "HYBAS_ID").ok_or_else(|| {
            anyhow!("basin {index} in '{}' is missing 'HYBAS_ID'", path.display())
        })?;
        basins.push(Basin {
            id,
            next_down: i64_property(feature, "NEXT_DOWN").unwrap_or(0),
            dist_main: f64_property(feature, "DIST_MAIN").unwrap_or(0.0),
            geometry: feature_geometry(feature, index)
                .with_context(|| format!("basin {id} in '{}'", path.display()))?,
        });
    }
    Ok(basins)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    const SQUARE: &str = r#"{"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}"#;

    #[test]
    fn reads_regions_with_properties() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature", "properties": {{"name": "NG0 0", "x": 0.5, "y": 0.5, "country": "NG", "shape_id": 3}}, "geometry": {SQUARE}}}
            ]}}"#
        );
        let path = write(&dir, "regions.geojson", &body);
        let buses = read_regions(&path).unwrap();
        assert_eq!(buses.len(), 1);
        assert_eq!(buses[0].name, "NG0 0");
        assert_eq!(buses[0].shape_id.as_deref(), Some("3"));
        assert_eq!(buses[0].geometry.0.len(), 1);
    }

    #[test]
    fn point_geometry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"name": "a", "x": 0, "y": 0, "country": "NG"},
             "geometry": {"type": "Point", "coordinates": [0, 0]}}
        ]}"#;
        let path = write(&dir, "regions.geojson", body);
        let err = read_regions(&path).unwrap_err();
        assert!(format!("{err:#}").contains("expected Polygon or MultiPolygon"));
    }

    #[test]
    fn missing_property_names_key() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature", "properties": {{"name": "a", "x": 0}}, "geometry": {SQUARE}}}
            ]}}"#
        );
        let path = write(&dir, "regions.geojson", &body);
        let err = read_regions(&path).unwrap_err();
        assert!(err.to_string().contains("'y'"));
    }

    #[test]
    fn malformed_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "regions.geojson", "{ not json");
        assert!(read_regions(&path).is_err());
    }

    #[test]
    fn reads_basins_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature", "properties": {{"HYBAS_ID": 11, "NEXT_DOWN": 12, "DIST_MAIN": 40.5}}, "geometry": {SQUARE}}},
                {{"type": "Feature", "properties": {{"HYBAS_ID": 12}}, "geometry": {SQUARE}}}
            ]}}"#
        );
        let path = write(&dir, "basins.geojson", &body);
        let basins = read_basins(&path).unwrap();
        assert_eq!(basins[0].next_down, 12);
        assert_eq!(basins[0].dist_main, 40.5);
        assert_eq!(basins[1].next_down, 0);
        assert_eq!(basins[1].dist_main, 0.0);
    }
}
