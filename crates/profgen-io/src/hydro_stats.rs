//! Annual hydro generation statistics used as normalisation references.
//!
//! Two sources are supported:
//!
//! - `hydro_capacities`: a per-country table with an average hourly inflow
//!   column (`InflowHourlyAvg[GWh]`), replicated over a range of years.
//! - `eia`: the EIA international hydroelectricity generation export, one
//!   row per country name and one column per year, in TWh.
//!
//! Both are returned in MWh per year.

use crate::countries::iso2_from_name;
use anyhow::{anyhow, bail, Context, Result};
use profgen_core::AnnualGeneration;
use std::path::Path;
use tracing::debug;

const INFLOW_COLUMN: &str = "InflowHourlyAvg[GWh]";

fn parse_value(raw: &str) -> Option<f64> {
    match raw.trim() {
        "" | "-" | "--" | "NA" => None,
        v => v.parse().ok(),
    }
}

pub fn read_hydro_capacities(
    path: &Path,
    countries: &[String],
    year_start: i32,
    year_end: i32,
) -> Result<AnnualGeneration> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening hydro capacities '{}'", path.display()))?;
    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("hydro capacities '{}' has no '{}' column", path.display(), name))
    };
    let country_col = find("Country")?;
    let inflow_col = find(INFLOW_COLUMN)?;

    let mut generation = AnnualGeneration::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("reading '{}'", path.display()))?;
        let country = record.get(country_col).unwrap_or_default();
        if !countries.is_empty() && !countries.iter().any(|c| c == country) {
            continue;
        }
        generation.add_country(country);
        // GWh per hour on average to MWh per year
        let Some(annual) = record.get(inflow_col).and_then(parse_value).map(|v| v * 1e3 * 8760.0)
        else {
            continue;
        };
        for year in year_start..=year_end {
            generation.insert(country, year, annual);
        }
    }
    Ok(generation)
}

pub fn read_eia_hydro_generation(path: &Path, countries: &[String]) -> Result<AnnualGeneration> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening EIA statistics '{}'", path.display()))?;
    let mut records = reader.records();

    // first line is a title, second the header with years from the third column on
    records
        .next()
        .ok_or_else(|| anyhow!("EIA statistics '{}' is empty", path.display()))??;
    let header = records
        .next()
        .ok_or_else(|| anyhow!("EIA statistics '{}' has no header row", path.display()))??;
    let years: Vec<Option<i32>> = header
        .iter()
        .skip(2)
        .map(|h| h.trim().parse().ok())
        .collect();
    // the row right after the header is a unit line
    records.next().transpose()?;

    let mut rows: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    for record in records {
        let record = record.with_context(|| format!("reading '{}'", path.display()))?;
        let name = record.get(1).unwrap_or_default().trim().to_string();
        if name.is_empty() {
            continue;
        }
        let values = (0..years.len())
            .map(|j| record.get(j + 2).and_then(parse_value))
            .collect();
        rows.push((name, values));
    }

    let germany: Vec<Option<f64>> = (0..years.len())
        .map(|j| {
            Some(
                rows.iter()
                    .filter(|(name, _)| name.contains("Germany"))
                    .filter_map(|(_, values)| values[j])
                    .sum(),
            )
        })
        .collect();
    rows.retain(|(name, _)| name != "Germany");
    rows.push(("Germany".to_string(), germany));

    let kosovo = rows.iter().find(|(n, _)| n == "Kosovo").map(|(_, v)| v.clone());
    match (kosovo, rows.iter_mut().find(|(n, _)| n == "Serbia")) {
        (Some(kosovo), Some((_, serbia))) => {
            for (s, k) in serbia.iter_mut().zip(kosovo) {
                *s = match (*s, k) {
                    (Some(s), Some(k)) => Some(s + k),
                    _ => None,
                };
            }
        }
        _ => debug!("EIA statistics lack Serbia or Kosovo; not merging"),
    }

    rows.retain(|(name, _)| {
        !name.contains("Former") && !matches!(name.as_str(), "World" | "Germany, West" | "Germany, East")
    });

    let mut generation = AnnualGeneration::new();
    for (name, values) in &rows {
        let Some(code) = iso2_from_name(name) else {
            debug!(country = %name, "no ISO2 code for EIA row; skipping");
            continue;
        };
        if !countries.is_empty() && !countries.iter().any(|c| c == code) {
            continue;
        }
        generation.add_country(code);
        for (year, value) in years.iter().zip(values) {
            if let (Some(year), Some(value)) = (year, value) {
                // TWh to MWh
                generation.insert(code, *year, value * 1e6);
            }
        }
    }

    let missing: Vec<&str> = countries
        .iter()
        .map(String::as_str)
        .filter(|c| !generation.has_country(c))
        .collect();
    if !missing.is_empty() {
        bail!(
            "EIA statistics '{}' have no rows for countries: {}",
            path.display(),
            missing.join(", ")
        );
    }
    Ok(generation)
}
