//! Renewable availability and capacity computations.
//!
//! Modules follow the run order: resource conversion, exclusions,
//! availability, layout, aggregation and the per-bus statistics, with the
//! hydro branch alongside. [`pipeline::run`] strings them together.

pub mod availability;
pub mod ceiling;
pub mod distance;
pub mod exclusion;
pub mod filter;
pub mod hydro;
pub mod layout;
pub mod pipeline;
pub mod profile;
pub mod regions;
pub mod resource;
pub mod underwater;

pub use availability::{compute_availability, AvailabilityOptions};
pub use exclusion::{ExclusionContainer, GeometryLayer, RasterLayer, RasterPredicate};
pub use pipeline::{run, InputPaths, RunOutput};
pub use resource::{resource_model, ResourceModel};
