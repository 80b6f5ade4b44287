//! # profgen-io: readers and dataset storage
//!
//! - [`geometry`]: GeoJSON bus regions, country/offshore shapes, basins
//! - [`ascii_grid`]: ESRI ASCII exclusion rasters
//! - [`cutout`]: cutout directories with long-form weather tables
//! - [`powerplants`] and [`hydro_stats`]: hydro plant and statistics tables
//! - [`dataset`]: atomic Arrow IPC output directories with a manifest

pub mod ascii_grid;
pub mod countries;
pub mod cutout;
pub mod dataset;
pub mod frame;
pub mod geometry;
pub mod hydro_stats;
pub mod powerplants;

pub use ascii_grid::read_ascii_grid;
pub use cutout::load_cutout;
pub use dataset::{DatasetReader, DatasetWriter};
pub use geometry::{read_basins, read_regions, read_shapes};
pub use hydro_stats::{read_eia_hydro_generation, read_hydro_capacities};
pub use powerplants::read_hydro_plant_buses;
