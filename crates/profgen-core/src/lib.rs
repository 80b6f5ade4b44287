//! # profgen-core: domain model for renewable profile generation
//!
//! Types shared by the readers, the algorithms and the command line:
//!
//! - [`Bus`]: network node with its service-area polygon
//! - [`Grid`] and [`Cutout`]: regular lon/lat weather grid and its variables
//! - [`Raster`]: north-up exclusion raster
//! - [`AvailabilityMatrix`]: sparse bus × cell eligible share
//! - [`ProfileDataset`] / [`InflowDataset`]: run outputs
//! - [`config::Config`]: the run configuration
//!
//! Cells are stacked `(y, x)` everywhere: cell `c = iy * nx + ix`.

pub mod availability;
pub mod basin;
pub mod bus;
pub mod config;
pub mod cutout;
pub mod dataset;
pub mod diagnostics;
pub mod error;
pub mod geodesy;
pub mod grid;
pub mod raster;
pub mod statistics;
pub mod units;

pub use availability::AvailabilityMatrix;
pub use basin::Basin;
pub use bus::Bus;
pub use cutout::Cutout;
pub use dataset::{BusProfile, Dataset, HydroPlant, InflowDataset, ProfileDataset};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{ProfgenError, ProfgenResult};
pub use grid::{Axis, Grid};
pub use raster::Raster;
pub use statistics::AnnualGeneration;
