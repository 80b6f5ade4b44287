//! `profgen build`: run one technology and write its dataset.

use anyhow::{Context, Result};
use profgen_algo::{run, InputPaths};
use profgen_cli::BuildArgs;
use profgen_core::config::load_config_from_path;
use profgen_core::Dataset;
use profgen_io::dataset::source_info;
use profgen_io::DatasetWriter;
use std::time::Instant;
use tracing::info;

fn input_paths(args: &BuildArgs) -> InputPaths {
    InputPaths {
        regions: args.regions.clone(),
        cutout: args.cutout.clone(),
        copernicus: args.copernicus.clone(),
        gebco: args.gebco.clone(),
        natura: args.natura.clone(),
        country_shapes: args.country_shapes.clone(),
        offshore_shapes: args.offshore_shapes.clone(),
        powerplants: args.powerplants.clone(),
        hydro_capacities: args.hydro_capacities.clone(),
        eia_hydro_generation: args.eia_hydro_generation.clone(),
    }
}

pub fn handle(args: &BuildArgs) -> Result<()> {
    let start = Instant::now();
    let config = load_config_from_path(&args.config)
        .with_context(|| format!("loading config '{}'", args.config.display()))?;
    info!(technology = %args.technology, config = %args.config.display(), "Building dataset");

    let output = run(&config, &args.technology, &input_paths(args))?;
    let mut sources = vec![source_info("config", &args.config)?];
    sources.extend(output.sources);

    let writer = DatasetWriter::new(&args.out)?;
    writer.write(&output.dataset, &output.diagnostics, sources)?;

    match &output.dataset {
        Dataset::Profile(ds) => println!(
            "Wrote {} profiles for {} steps to {}",
            ds.buses.len(),
            ds.times.len(),
            writer.final_dir().display()
        ),
        Dataset::Inflow(ds) => println!(
            "Wrote inflow for {} plants over {} steps to {}",
            ds.plants.len(),
            ds.times.len(),
            writer.final_dir().display()
        ),
    }
    println!("{}", output.diagnostics.summary());
    info!(elapsed = ?start.elapsed(), "Build finished");
    Ok(())
}
