//! End-to-end build of one technology's dataset.
//!
//! Wind and solar technologies produce per-bus profiles and a potential
//! grid; hydro technologies produce per-plant inflow.

use crate::availability::{compute_availability, AvailabilityOptions};
use crate::ceiling::max_capacity;
use crate::distance::connections;
use crate::exclusion::{ExclusionContainer, GeometryLayer, RasterLayer, RasterPredicate};
use crate::filter::{filter_and_clip, FilterSettings};
use crate::hydro::{correct_and_clip, normalize_inflow, route_inflow, select_plants, RoutingOptions};
use crate::layout::{layout, mean_capacity_factor, potential};
use crate::profile::aggregate_profiles;
use crate::regions::cluster_by_shape;
use crate::resource::resource_model;
use crate::underwater::OffshoreWater;
use anyhow::{anyhow, Context, Result};
use geo::MultiPolygon;
use ndarray::Array2;
use profgen_core::config::{
    Config, HydroResourceConfig, NormalizationSource, ResourceConfig, TechnologyConfig,
    TechnologyKind,
};
use profgen_core::{
    AnnualGeneration, Bus, BusProfile, Cutout, Dataset, Diagnostics, InflowDataset,
    ProfileDataset,
};
use profgen_io::dataset::{source_info, SourceInfo};
use profgen_io::{
    load_cutout, read_ascii_grid, read_basins, read_eia_hydro_generation, read_hydro_capacities,
    read_hydro_plant_buses, read_regions, read_shapes,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Gebco pixels without data are treated as this depth (m).
const GEBCO_NODATA: f64 = -1000.0;

/// Input files of a run. Which ones are required depends on the
/// technology and its configured exclusion layers.
#[derive(Debug, Clone, Default)]
pub struct InputPaths {
    pub regions: PathBuf,
    /// Overrides `renewable.<tech>.cutout`
    pub cutout: Option<PathBuf>,
    pub copernicus: Option<PathBuf>,
    pub gebco: Option<PathBuf>,
    pub natura: Option<PathBuf>,
    pub country_shapes: Option<PathBuf>,
    pub offshore_shapes: Option<PathBuf>,
    pub powerplants: Option<PathBuf>,
    pub hydro_capacities: Option<PathBuf>,
    pub eia_hydro_generation: Option<PathBuf>,
}

fn require<'a>(path: &'a Option<PathBuf>, flag: &str, needed_for: &str) -> Result<&'a Path> {
    path.as_deref()
        .ok_or_else(|| anyhow!("{needed_for} requires {flag}"))
}

#[derive(Debug)]
pub struct RunOutput {
    pub dataset: Dataset,
    pub diagnostics: Diagnostics,
    /// Inputs actually read, for the manifest
    pub sources: Vec<SourceInfo>,
}

/// Build the dataset for `technology`.
pub fn run(config: &Config, technology: &str, inputs: &InputPaths) -> Result<RunOutput> {
    let tech = config.technology(technology)?;
    let mut sources = Vec::new();
    let mut diagnostics = Diagnostics::new();

    if tech.correction_factor != 1.0 {
        info!("correction_factor is set as {}", tech.correction_factor);
    }

    let mut buses = read_regions(&inputs.regions)?;
    sources.push(source_info("regions", &inputs.regions)?);
    if config.cluster_options.alternative_clustering {
        let before = buses.len();
        let (merged, unassigned) = cluster_by_shape(buses);
        buses = merged;
        info!(before, after = buses.len(), "Grouped bus regions by shape");
        for bus in &unassigned {
            warn!(bus = %bus.name, "Bus region has no shape_id; dropped by alternative clustering");
            diagnostics.add_warning_with_entity(
                "regions",
                "no shape_id; dropped by alternative clustering",
                &bus.name,
            );
        }
        diagnostics.add_info(
            "regions",
            &format!("alternative clustering merged {} buses into {}", before, buses.len()),
        );
    }

    let cutout_path = inputs
        .cutout
        .as_ref()
        .or(tech.cutout.as_ref())
        .ok_or_else(|| {
            anyhow!("no cutout for '{technology}': pass --cutout or set renewable.{technology}.cutout")
        })?;
    let start = Instant::now();
    let cutout = load_cutout(cutout_path)?;
    sources.push(source_info("cutout", cutout_path)?);
    info!(
        cutout = %cutout.name,
        cells = cutout.grid.len(),
        steps = cutout.n_times(),
        elapsed = ?start.elapsed(),
        "Loaded cutout"
    );

    let model = resource_model(&tech.resource)?;
    let series = model
        .convert(&cutout)
        .with_context(|| format!("converting cutout with the {} model", model.name()))?;

    let availability = AvailabilityOptions {
        samples_per_cell: tech.samples_per_cell,
        threads: config.worker_threads(),
        show_progress: config.atlite.show_progress,
    };

    let dataset = match (&tech.resource, TechnologyKind::from_name(technology)) {
        (ResourceConfig::Hydro(hydro), _) => Dataset::Inflow(build_inflow(
            config,
            technology,
            tech,
            hydro,
            &buses,
            &cutout,
            &series,
            inputs,
            availability,
            &mut sources,
            &mut diagnostics,
        )?),
        (_, kind) => Dataset::Profile(build_profiles(
            technology,
            tech,
            kind,
            &buses,
            &cutout,
            &series,
            inputs,
            availability,
            &mut sources,
            &mut diagnostics,
        )?),
    };

    Ok(RunOutput {
        dataset,
        diagnostics,
        sources,
    })
}

/// Exclusion layers configured for `tech`, in evaluation order.
pub fn build_exclusions(
    tech: &TechnologyConfig,
    inputs: &InputPaths,
    sources: &mut Vec<SourceInfo>,
) -> Result<ExclusionContainer> {
    let mut excluder = ExclusionContainer::new();

    if tech.natura {
        let path = require(&inputs.natura, "--natura", "natura exclusion")?;
        let raster = Arc::new(read_ascii_grid(path)?);
        sources.push(source_info("natura", path)?);
        excluder.add_raster(
            RasterLayer::new("natura", raster, RasterPredicate::Truthy).with_nodata(0.0),
        );
    }

    if let Some(copernicus) = &tech.copernicus {
        let path = require(&inputs.copernicus, "--copernicus", "copernicus land cover")?;
        let raster = Arc::new(read_ascii_grid(path)?);
        sources.push(source_info("copernicus", path)?);
        excluder.add_raster(
            RasterLayer::new(
                "copernicus",
                Arc::clone(&raster),
                RasterPredicate::codes(&copernicus.grid_codes),
            )
            .inverted(),
        );
        if copernicus.distance.value() > 0.0 {
            excluder.add_raster(
                RasterLayer::new(
                    "copernicus distance",
                    raster,
                    RasterPredicate::codes(&copernicus.distance_grid_codes),
                )
                .with_buffer(copernicus.distance),
            );
        }
    }

    if let Some(max_depth) = tech.max_depth {
        let path = require(&inputs.gebco, "--gebco", "max_depth")?;
        let raster = Arc::new(read_ascii_grid(path)?);
        sources.push(source_info("gebco", path)?);
        excluder.add_raster(
            RasterLayer::new("gebco", raster, RasterPredicate::DeeperThan(max_depth))
                .with_nodata(GEBCO_NODATA),
        );
    }

    if tech.min_shore_distance.is_some() || tech.max_shore_distance.is_some() {
        let path = require(&inputs.country_shapes, "--country-shapes", "shore distance limits")?;
        let shapes = read_shapes(path)?;
        sources.push(source_info("country_shapes", path)?);
        if let Some(distance) = tech.min_shore_distance {
            excluder.add_geometry(
                GeometryLayer::new("min_shore_distance", shapes.clone()).with_buffer(distance),
            );
        }
        if let Some(distance) = tech.max_shore_distance {
            excluder.add_geometry(
                GeometryLayer::new("max_shore_distance", shapes)
                    .with_buffer(distance)
                    .inverted(),
            );
        }
    }

    Ok(excluder)
}

#[allow(clippy::too_many_arguments)]
fn build_profiles(
    technology: &str,
    tech: &TechnologyConfig,
    kind: TechnologyKind,
    buses: &[Bus],
    cutout: &Cutout,
    capacity_factor: &Array2<f64>,
    inputs: &InputPaths,
    options: AvailabilityOptions,
    sources: &mut Vec<SourceInfo>,
    diagnostics: &mut Diagnostics,
) -> Result<ProfileDataset> {
    let density = tech
        .capacity_per_sqkm
        .ok_or_else(|| anyhow!("technology '{technology}' requires capacity_per_sqkm"))?;
    let excluder = build_exclusions(tech, inputs, sources)?;
    for layer in excluder.layers() {
        info!(layer = %layer, "Added exclusion layer");
    }

    let grid = &cutout.grid;
    info!("Calculate landuse availabilities...");
    let start = Instant::now();
    let shapes: Vec<&MultiPolygon<f64>> = buses.iter().map(|b| &b.geometry).collect();
    let availability = compute_availability(grid, &shapes, &excluder, options)?;
    info!(elapsed = ?start.elapsed(), "Completed availability calculation");

    let areas = grid.cell_areas_km2();
    let mean_cf = mean_capacity_factor(capacity_factor, tech.correction_factor);
    let layout = layout(&mean_cf, &areas, density);
    let potential = potential(&availability, &areas, density);

    let start = Instant::now();
    let aggregated =
        aggregate_profiles(&availability, &layout, capacity_factor, tech.correction_factor);
    info!(elapsed = ?start.elapsed(), "Completed average capacity factor calculation");

    info!("Calculating maximal capacity per bus (method '{}')", tech.potential);
    let p_nom_max = max_capacity(
        tech.potential,
        &availability,
        &aggregated.capacities,
        &mean_cf,
        &areas,
        density,
    );

    info!("Calculate average distances.");
    let connections = connections(buses, &availability, &layout, grid);

    let water = if kind == TechnologyKind::Offshore {
        info!("Calculate underwater fraction of connections.");
        let path = require(&inputs.offshore_shapes, "--offshore-shapes", "offshore technologies")?;
        let shapes = read_shapes(path)?;
        sources.push(source_info("offshore_shapes", path)?);
        Some(OffshoreWater::from_shapes(shapes))
    } else {
        None
    };

    let profiles: Vec<BusProfile> = buses
        .iter()
        .enumerate()
        .map(|(b, bus)| BusProfile {
            bus: bus.name.clone(),
            profile: aggregated.profiles.row(b).to_vec(),
            weight: aggregated.capacities[b],
            p_nom_max: p_nom_max[b],
            average_distance: connections[b].average_distance,
            centre_of_mass: connections[b].centre_of_mass,
            underwater_fraction: water
                .as_ref()
                .map(|w| w.underwater_fraction(connections[b].centre_of_mass, (bus.x, bus.y))),
        })
        .collect();

    let before = profiles.len();
    let profiles = filter_and_clip(profiles, FilterSettings::from(tech), diagnostics);
    info!(kept = profiles.len(), dropped = before - profiles.len(), "Filtered buses");

    Ok(ProfileDataset {
        technology: technology.to_string(),
        times: cutout.times.clone(),
        buses: profiles,
        grid: grid.clone(),
        potential,
    })
}

fn load_reference(
    config: &Config,
    tech: &TechnologyConfig,
    hydro: &HydroResourceConfig,
    inputs: &InputPaths,
    sources: &mut Vec<SourceInfo>,
    diagnostics: &mut Diagnostics,
) -> Result<Option<AnnualGeneration>> {
    let Some(source) = hydro.normalization.0 else {
        info!("No hydro normalization");
        return Ok(None);
    };
    let reference = match source {
        NormalizationSource::HydroCapacities => {
            let path = require(
                &inputs.hydro_capacities,
                "--hydro-capacities",
                "hydro_capacities normalization",
            )?;
            sources.push(source_info("hydro_capacities", path)?);
            read_hydro_capacities(path, &config.countries, hydro.year_start, hydro.year_end)?
        }
        NormalizationSource::Eia => {
            let path = require(
                &inputs.eia_hydro_generation,
                "--eia-hydro-generation",
                "eia normalization",
            )?;
            sources.push(source_info("eia_hydro_generation", path)?);
            read_eia_hydro_generation(path, &config.countries)?
        }
    };
    info!("Hydro normalization mode {}", source);
    diagnostics.add_info("normalization", &format!("inflow normalised to {source} statistics"));
    Ok(Some(reference.scaled(tech.normalization_multiplier)))
}

#[allow(clippy::too_many_arguments)]
fn build_inflow(
    config: &Config,
    technology: &str,
    tech: &TechnologyConfig,
    hydro: &HydroResourceConfig,
    buses: &[Bus],
    cutout: &Cutout,
    runoff: &Array2<f64>,
    inputs: &InputPaths,
    options: AvailabilityOptions,
    sources: &mut Vec<SourceInfo>,
    diagnostics: &mut Diagnostics,
) -> Result<InflowDataset> {
    let basins = read_basins(&hydro.hydrobasins)?;
    sources.push(source_info("hydrobasins", &hydro.hydrobasins)?);
    let powerplants = require(&inputs.powerplants, "--powerplants", "hydro technologies")?;
    let hydro_buses = read_hydro_plant_buses(powerplants)?;
    sources.push(source_info("powerplants", powerplants)?);

    let plants = select_plants(buses, &basins, &hydro_buses, tech.extendable);
    info!(plants = plants.len(), basins = basins.len(), "Selected hydro plants");

    let reference = load_reference(config, tech, hydro, inputs, sources, diagnostics)?;

    if plants.is_empty() {
        info!("No hydro plant lies in a basin; writing an empty inflow dataset");
        return Ok(InflowDataset::empty(technology, cutout.times.clone()));
    }

    let start = Instant::now();
    let mut inflow = route_inflow(
        &plants,
        &basins,
        &cutout.grid,
        runoff,
        RoutingOptions {
            flowspeed: hydro.flowspeed,
            step_hours: cutout.step_hours,
            availability: options,
        },
    )?;
    info!(elapsed = ?start.elapsed(), "Completed runoff routing");

    if let Some(reference) = &reference {
        normalize_inflow(
            &mut inflow,
            &plants,
            &cutout.years(),
            cutout.step_hours,
            reference,
            diagnostics,
        )?;
    }
    correct_and_clip(&mut inflow, tech.correction_factor, tech.clip_min_inflow);

    Ok(InflowDataset {
        technology: technology.to_string(),
        times: cutout.times.clone(),
        plants,
        inflow,
    })
}
