use anyhow::{anyhow, Context, Result};
use polars::prelude::*;
#[cfg(feature = "parquet")]
use polars::prelude::ParquetReader;
use std::fs::File;
use std::path::Path;

/// Read a CSV, Parquet or Arrow IPC table, picking the reader by extension.
pub fn read_frame(path: &Path) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    match extension.as_str() {
        #[cfg(feature = "parquet")]
        "parquet" => ParquetReader::new(&mut file)
            .finish()
            .with_context(|| format!("reading Parquet file {}", path.display())),
        #[cfg(not(feature = "parquet"))]
        "parquet" => Err(anyhow!(
            "parquet support is disabled; rebuild with the 'parquet' feature"
        )),
        "arrow" | "ipc" | "feather" => IpcReader::new(&mut file)
            .finish()
            .with_context(|| format!("reading Arrow IPC file {}", path.display())),
        "csv" => CsvReader::new(&mut file)
            .has_header(true)
            .finish()
            .with_context(|| format!("reading CSV file {}", path.display())),
        _ => Err(anyhow!(
            "unsupported file extension '{}' for {}; use .csv, .parquet or .arrow",
            extension,
            path.display()
        )),
    }
}

/// Column cast to f64, with nulls kept as `None`.
pub fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)
        .with_context(|| format!("missing column '{name}'"))?
        .cast(&DataType::Float64)
        .with_context(|| format!("casting column '{name}' to Float64"))?;
    Ok(series.f64()?.into_iter().collect())
}

/// Column cast to i64, with nulls kept as `None`.
pub fn i64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = df
        .column(name)
        .with_context(|| format!("missing column '{name}'"))?
        .cast(&DataType::Int64)
        .with_context(|| format!("casting column '{name}' to Int64"))?;
    Ok(series.i64()?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_csv_and_casts_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.csv");
        fs::write(&path, "time,x,y,influx\n0,1,2,500.5\n1,1,2,\n").unwrap();

        let df = read_frame(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(i64_column(&df, "time").unwrap(), vec![Some(0), Some(1)]);
        assert_eq!(f64_column(&df, "influx").unwrap(), vec![Some(500.5), None]);
        assert!(f64_column(&df, "runoff").is_err());
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.nc");
        fs::write(&path, "").unwrap();
        let err = read_frame(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported file extension"));
    }
}
