//! In-memory weather cutout: a grid, a time axis and dense `time × cell`
//! matrices per weather variable.

use crate::error::{ProfgenError, ProfgenResult};
use crate::grid::Grid;
use chrono::{DateTime, Datelike, Utc};
use ndarray::Array2;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Cutout {
    pub name: String,
    pub grid: Grid,
    pub times: Vec<DateTime<Utc>>,
    /// Length of one time step in hours
    pub step_hours: f64,
    variables: BTreeMap<String, Array2<f64>>,
}

impl Cutout {
    pub fn new(
        name: impl Into<String>,
        grid: Grid,
        times: Vec<DateTime<Utc>>,
        step_hours: f64,
        variables: BTreeMap<String, Array2<f64>>,
    ) -> ProfgenResult<Self> {
        let name = name.into();
        if !(step_hours > 0.0) {
            return Err(ProfgenError::Validation(format!(
                "cutout {name}: time step must be positive, got {step_hours} h"
            )));
        }
        for (var, data) in &variables {
            if data.dim() != (times.len(), grid.len()) {
                return Err(ProfgenError::Validation(format!(
                    "cutout {name}: variable {var} has shape {:?}, expected ({}, {})",
                    data.dim(),
                    times.len(),
                    grid.len()
                )));
            }
        }
        Ok(Self {
            name,
            grid,
            times,
            step_hours,
            variables,
        })
    }

    pub fn n_times(&self) -> usize {
        self.times.len()
    }

    pub fn variable(&self, name: &str) -> ProfgenResult<&Array2<f64>> {
        self.variables.get(name).ok_or_else(|| {
            ProfgenError::Validation(format!(
                "cutout {} has no variable '{}' (available: {})",
                self.name,
                name,
                self.variable_names().join(", ")
            ))
        })
    }

    pub fn optional_variable(&self, name: &str) -> Option<&Array2<f64>> {
        self.variables.get(name)
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    /// Calendar year of every time step.
    pub fn years(&self) -> Vec<i32> {
        self.times.iter().map(|t| t.year()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Axis;
    use chrono::TimeZone;

    fn grid() -> Grid {
        Grid::new(
            Axis { start: 0.0, step: 1.0, count: 2 },
            Axis { start: 0.0, step: 1.0, count: 1 },
        )
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_variable_shape() {
        let times = vec![Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap()];
        let mut vars = BTreeMap::new();
        vars.insert("influx".to_string(), Array2::zeros((1, 3)));
        let err = Cutout::new("test", grid(), times, 1.0, vars).unwrap_err();
        assert!(err.to_string().contains("influx"));
    }

    #[test]
    fn missing_variable_lists_available() {
        let times = vec![
            Utc.with_ymd_and_hms(2012, 12, 31, 23, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap(),
        ];
        let mut vars = BTreeMap::new();
        vars.insert("runoff".to_string(), Array2::zeros((2, 2)));
        let cutout = Cutout::new("test", grid(), times, 1.0, vars).unwrap();

        let err = cutout.variable("wnd100m").unwrap_err();
        assert!(err.to_string().contains("runoff"));
        assert_eq!(cutout.years(), vec![2012, 2013]);
    }
}
