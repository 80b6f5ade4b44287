use anyhow::{anyhow, Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// Buses hosting at least one hydro plant.
///
/// The plant table needs a `bus` column and a `carrier` (or `Fueltype`)
/// column; carriers are compared case-insensitively.
pub fn read_hydro_plant_buses(path: &Path) -> Result<BTreeSet<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening power plants '{}'", path.display()))?;
    let headers = reader.headers()?.clone();
    let column = |candidates: &[&str]| {
        headers
            .iter()
            .position(|h| candidates.iter().any(|c| h.trim().eq_ignore_ascii_case(c)))
    };
    let bus_col = column(&["bus"])
        .ok_or_else(|| anyhow!("power plants '{}' has no 'bus' column", path.display()))?;
    let carrier_col = column(&["carrier", "fueltype"]).ok_or_else(|| {
        anyhow!(
            "power plants '{}' has no 'carrier' or 'Fueltype' column",
            path.display()
        )
    })?;

    let mut buses = BTreeSet::new();
    for (line, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("reading '{}' record {}", path.display(), line + 1))?;
        let carrier = record.get(carrier_col).unwrap_or_default().trim();
        let bus = record.get(bus_col).unwrap_or_default().trim();
        if carrier.eq_ignore_ascii_case("hydro") && !bus.is_empty() {
            buses.insert(bus.to_string());
        }
    }
    Ok(buses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn selects_hydro_buses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("powerplants.csv");
        fs::write(
            &path,
            ",Name,Fueltype,Capacity,bus\n0,Kainji,Hydro,760,NG0 1\n1,Egbin,Natural Gas,1320,NG0 2\n2,Jebba,hydro,578,NG0 1\n3,Nangbeto,Hydro,65,\n",
        )
        .unwrap();

        let buses = read_hydro_plant_buses(&path).unwrap();
        assert_eq!(buses.into_iter().collect::<Vec<_>>(), vec!["NG0 1".to_string()]);
    }

    #[test]
    fn missing_bus_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("powerplants.csv");
        fs::write(&path, "Name,carrier\nKainji,hydro\n").unwrap();
        assert!(read_hydro_plant_buses(&path).is_err());
    }
}
