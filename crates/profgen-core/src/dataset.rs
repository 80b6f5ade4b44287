//! Output datasets produced by a profile or inflow run.

use crate::grid::Grid;
use chrono::{DateTime, Utc};
use ndarray::Array2;

/// Per-bus results of a wind or solar run.
#[derive(Debug, Clone, PartialEq)]
pub struct BusProfile {
    pub bus: String,
    /// Per-unit availability for every time step, in [0, 1]
    pub profile: Vec<f64>,
    /// Layout-derived installed capacity (MW)
    pub weight: f64,
    /// Ceiling on installable capacity (MW)
    pub p_nom_max: f64,
    /// Layout-weighted distance from the bus to its cells (km)
    pub average_distance: f64,
    pub centre_of_mass: (f64, f64),
    /// Offshore technologies only
    pub underwater_fraction: Option<f64>,
}

impl BusProfile {
    pub fn mean_profile(&self) -> f64 {
        if self.profile.is_empty() {
            return 0.0;
        }
        self.profile.iter().sum::<f64>() / self.profile.len() as f64
    }
}

#[derive(Debug, Clone)]
pub struct ProfileDataset {
    pub technology: String,
    pub times: Vec<DateTime<Utc>>,
    pub buses: Vec<BusProfile>,
    pub grid: Grid,
    /// Installable capacity per grid cell (MW), indexed like the grid
    pub potential: Vec<f64>,
}

/// Hydro plant selected for inflow modelling.
#[derive(Debug, Clone, PartialEq)]
pub struct HydroPlant {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub country: String,
    /// Whether the bus hosts an existing hydro plant
    pub installed_hydro: bool,
}

#[derive(Debug, Clone)]
pub struct InflowDataset {
    pub technology: String,
    pub times: Vec<DateTime<Utc>>,
    pub plants: Vec<HydroPlant>,
    /// plants × time, m³ per time step
    pub inflow: Array2<f64>,
}

impl InflowDataset {
    /// Well-formed dataset without plants.
    pub fn empty(technology: impl Into<String>, times: Vec<DateTime<Utc>>) -> Self {
        let n = times.len();
        Self {
            technology: technology.into(),
            times,
            plants: Vec::new(),
            inflow: Array2::zeros((0, n)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Dataset {
    Profile(ProfileDataset),
    Inflow(InflowDataset),
}

impl Dataset {
    pub fn technology(&self) -> &str {
        match self {
            Dataset::Profile(d) => &d.technology,
            Dataset::Inflow(d) => &d.technology,
        }
    }
}
