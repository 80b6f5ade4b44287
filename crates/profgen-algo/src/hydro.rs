//! Hydro inflow: basin runoff routed downstream to the plants and,
//! optionally, scaled to reported annual generation.

use crate::availability::{compute_availability, AvailabilityOptions};
use crate::exclusion::ExclusionContainer;
use anyhow::{bail, Result};
use geo::{Intersects, MultiPolygon, Point};
use ndarray::{s, Array2};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use profgen_core::{AnnualGeneration, AvailabilityMatrix, Basin, Bus, Diagnostics, Grid, HydroPlant};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

/// Index of the first basin whose geometry touches `point`.
pub fn basin_at(basins: &[Basin], point: &Point<f64>) -> Option<usize> {
    basins.iter().position(|b| b.geometry.intersects(point))
}

/// Buses that get a hydro plant: those inside a basin that either host an
/// existing plant or, with `extendable`, all of them.
pub fn select_plants(
    buses: &[Bus],
    basins: &[Basin],
    hydro_buses: &BTreeSet<String>,
    extendable: bool,
) -> Vec<HydroPlant> {
    buses
        .iter()
        .filter_map(|bus| {
            let installed_hydro = hydro_buses.contains(&bus.name);
            if !(extendable || installed_hydro) {
                return None;
            }
            basin_at(basins, &bus.location())?;
            Some(HydroPlant {
                name: bus.name.clone(),
                lon: bus.x,
                lat: bus.y,
                country: bus.country.clone(),
                installed_hydro,
            })
        })
        .collect()
}

/// Directed river network with an edge from every basin to the basin it
/// drains into.
#[derive(Debug, Clone)]
pub struct BasinNetwork {
    graph: DiGraph<usize, ()>,
    nodes: Vec<NodeIndex>,
}

impl BasinNetwork {
    pub fn new(basins: &[Basin]) -> Self {
        let mut graph = DiGraph::with_capacity(basins.len(), basins.len());
        let nodes: Vec<NodeIndex> = (0..basins.len()).map(|i| graph.add_node(i)).collect();
        let by_id: HashMap<i64, NodeIndex> = basins
            .iter()
            .zip(&nodes)
            .map(|(basin, &node)| (basin.id, node))
            .collect();
        for (basin, &node) in basins.iter().zip(&nodes) {
            if basin.next_down == 0 || basin.next_down == basin.id {
                continue;
            }
            if let Some(&down) = by_id.get(&basin.next_down) {
                graph.add_edge(node, down, ());
            }
        }
        Self { graph, nodes }
    }

    /// `basin` and every basin draining into it, `basin` first.
    pub fn upstream(&self, basin: usize) -> Vec<usize> {
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, self.nodes[basin]);
        let mut found = Vec::new();
        while let Some(node) = bfs.next(reversed) {
            found.push(self.graph[node]);
        }
        found
    }
}

/// Time steps a flow from `dist_upstream` km needs to reach `dist_own`.
pub fn routing_shift(dist_upstream: f64, dist_own: f64, flowspeed: f64, step_hours: f64) -> usize {
    let steps = ((dist_upstream - dist_own) * 1000.0 / flowspeed / 3600.0 / step_hours).round();
    if steps.is_finite() && steps > 0.0 {
        steps as usize
    } else {
        0
    }
}

/// `basins × time` runoff volume in m³ per step.
///
/// `runoff` is `time × cell` in metres, `overlap` holds the share of each
/// cell inside each basin.
pub fn basin_runoff(runoff: &Array2<f64>, overlap: &AvailabilityMatrix, areas_km2: &[f64]) -> Array2<f64> {
    let mut volume = Array2::zeros((overlap.n_rows(), runoff.nrows()));
    for b in 0..overlap.n_rows() {
        let row = overlap.row(b);
        for (t, series) in runoff.outer_iter().enumerate() {
            volume[[b, t]] = row
                .iter()
                .map(|&(c, share)| series[c] * share * areas_km2[c] * 1e6)
                .sum();
        }
    }
    volume
}

/// Parameters shared by all plants of an inflow run.
#[derive(Debug, Clone, Copy)]
pub struct RoutingOptions {
    /// River flow speed (m/s)
    pub flowspeed: f64,
    pub step_hours: f64,
    pub availability: AvailabilityOptions,
}

/// `plants × time` inflow before normalisation.
pub fn route_inflow(
    plants: &[HydroPlant],
    basins: &[Basin],
    grid: &Grid,
    runoff: &Array2<f64>,
    options: RoutingOptions,
) -> Result<Array2<f64>> {
    let n_times = runoff.nrows();
    let network = BasinNetwork::new(basins);

    let mut catchments = Vec::with_capacity(plants.len());
    for plant in plants {
        let Some(own) = basin_at(basins, &Point::new(plant.lon, plant.lat)) else {
            bail!("plant {} does not lie in any basin", plant.name);
        };
        catchments.push((own, network.upstream(own)));
    }

    let needed: BTreeSet<usize> = catchments
        .iter()
        .flat_map(|(_, upstream)| upstream.iter().copied())
        .collect();
    let needed: Vec<usize> = needed.into_iter().collect();
    let row_of: HashMap<usize, usize> = needed.iter().enumerate().map(|(r, &b)| (b, r)).collect();
    debug!(basins = needed.len(), plants = plants.len(), "Routing runoff through basins");

    let shapes: Vec<&MultiPolygon<f64>> = needed.iter().map(|&b| &basins[b].geometry).collect();
    let overlap = compute_availability(grid, &shapes, &ExclusionContainer::new(), options.availability)?;
    let volume = basin_runoff(runoff, &overlap, &grid.cell_areas_km2());

    let mut inflow = Array2::zeros((plants.len(), n_times));
    for (p, (own, upstream)) in catchments.iter().enumerate() {
        let dist_own = basins[*own].dist_main;
        for &u in upstream {
            let shift = routing_shift(basins[u].dist_main, dist_own, options.flowspeed, options.step_hours);
            if shift >= n_times {
                continue;
            }
            let source = volume.slice(s![row_of[&u], ..n_times - shift]);
            let mut target = inflow.slice_mut(s![p, shift..]);
            target += &source;
        }
    }
    Ok(inflow)
}

/// Hours a calendar year must span in the cutout to count as a full year.
pub const FULL_YEAR_HOURS: f64 = 8700.0;

/// Scale each country's plants so that their modelled yearly total matches
/// `reference`. `years` holds the calendar year of every time step.
///
/// Only full years (more than [`FULL_YEAR_HOURS`] of data) are matched to
/// the reference one by one. All other steps of a country, partial years
/// and full years without a reference value, are scaled by the ratio of the
/// summed reference to the summed modelled inflow over the matched years.
///
/// Errors when the time axis holds no full year, when a plant country has no
/// reference column, or when none of its full years has a reference value.
/// Missing years and years with zero modelled inflow are warnings.
pub fn normalize_inflow(
    inflow: &mut Array2<f64>,
    plants: &[HydroPlant],
    years: &[i32],
    step_hours: f64,
    reference: &AnnualGeneration,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let mut by_country: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (p, plant) in plants.iter().enumerate() {
        by_country.entry(plant.country.as_str()).or_default().push(p);
    }
    let mut by_year: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (t, &year) in years.iter().enumerate() {
        by_year.entry(year).or_default().push(t);
    }
    let full_years: Vec<(i32, &[usize])> = by_year
        .iter()
        .filter(|(_, steps)| steps.len() as f64 * step_hours > FULL_YEAR_HOURS)
        .map(|(&year, steps)| (year, steps.as_slice()))
        .collect();
    if full_years.is_empty() {
        bail!(
            "hydro normalisation needs a calendar year with more than {FULL_YEAR_HOURS} h of cutout data"
        );
    }

    for (country, members) in &by_country {
        if !reference.has_country(country) {
            bail!("no reference hydro generation for country {country}");
        }

        let mut matched: BTreeMap<i32, f64> = BTreeMap::new();
        let (mut target_total, mut modelled_total) = (0.0, 0.0);
        for &(year, steps) in &full_years {
            let Some(target) = reference.get(country, year) else {
                warn!(country, year, "No reference hydro generation; year scaled by the country ratio");
                diagnostics.add_warning_with_entity(
                    "normalization",
                    &format!("no reference generation for {year}"),
                    country,
                );
                continue;
            };
            let modelled: f64 = members
                .iter()
                .flat_map(|&p| steps.iter().map(move |&t| (p, t)))
                .map(|(p, t)| inflow[[p, t]])
                .sum();
            if modelled == 0.0 {
                warn!(country, year, "Modelled hydro inflow is zero; inflow left unscaled");
                diagnostics.add_warning_with_entity(
                    "normalization",
                    &format!("modelled inflow is zero in {year}"),
                    country,
                );
                matched.insert(year, 1.0);
                continue;
            }
            target_total += target;
            modelled_total += modelled;
            matched.insert(year, target / modelled);
        }
        if matched.is_empty() {
            bail!("no reference hydro generation for country {country} in any full year of the cutout");
        }

        let country_factor = (modelled_total > 0.0).then(|| target_total / modelled_total);
        debug!(country, factor = ?country_factor, years = matched.len(), "Hydro normalisation");
        for (t, year) in years.iter().enumerate() {
            let Some(factor) = matched.get(year).copied().or(country_factor) else {
                continue;
            };
            for &p in members {
                inflow[[p, t]] *= factor;
            }
        }
    }
    Ok(())
}

/// Apply the correction factor, then zero every value not above `clip_min`.
pub fn correct_and_clip(inflow: &mut Array2<f64>, correction_factor: f64, clip_min: Option<f64>) {
    inflow.mapv_inplace(|v| {
        let v = v * correction_factor;
        match clip_min {
            Some(min) if v <= min => 0.0,
            _ => v,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use ndarray::array;

    fn square(x0: f64, y0: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + 1.0, y: y0),
            (x: x0 + 1.0, y: y0 + 1.0),
            (x: x0, y: y0 + 1.0),
            (x: x0, y: y0),
        ]])
    }

    fn basin(id: i64, next_down: i64, dist_main: f64, x0: f64) -> Basin {
        Basin {
            id,
            next_down,
            dist_main,
            geometry: square(x0, 0.0),
        }
    }

    fn bus(name: &str, x: f64, country: &str) -> Bus {
        Bus {
            name: name.into(),
            x,
            y: 0.5,
            country: country.into(),
            shape_id: None,
            geometry: square(x - 0.5, 0.0),
        }
    }

    fn plant(name: &str, country: &str) -> HydroPlant {
        HydroPlant {
            name: name.into(),
            lon: 0.5,
            lat: 0.5,
            country: country.into(),
            installed_hydro: true,
        }
    }

    #[test]
    fn selection_requires_basin_and_plant_or_extendable() {
        let basins = vec![basin(1, 0, 0.0, 0.0)];
        let buses = vec![bus("in", 0.5, "NG"), bus("out", 5.5, "NG"), bus("new", 0.2, "NG")];
        let hydro: BTreeSet<String> = ["in".to_string(), "out".to_string()].into();

        let existing = select_plants(&buses, &basins, &hydro, false);
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].name, "in");
        assert!(existing[0].installed_hydro);

        let all = select_plants(&buses, &basins, &hydro, true);
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["in", "new"]);
        assert!(!all[1].installed_hydro);
    }

    #[test]
    fn upstream_follows_next_down_links() {
        // 3 -> 2 -> 1 (outlet), 4 -> 1
        let basins = vec![
            basin(1, 0, 0.0, 0.0),
            basin(2, 1, 10.0, 1.0),
            basin(3, 2, 20.0, 2.0),
            basin(4, 1, 5.0, 3.0),
        ];
        let network = BasinNetwork::new(&basins);
        let mut up = network.upstream(0);
        assert_eq!(up[0], 0);
        up.sort();
        assert_eq!(up, vec![0, 1, 2, 3]);
        let mut mid = network.upstream(1);
        mid.sort();
        assert_eq!(mid, vec![1, 2]);
        assert_eq!(network.upstream(2), vec![2]);
    }

    #[test]
    fn shift_rounds_travel_time() {
        // 36 km at 1 m/s is 10 h
        assert_eq!(routing_shift(36.0, 0.0, 1.0, 1.0), 10);
        assert_eq!(routing_shift(36.0, 0.0, 1.0, 3.0), 3);
        assert_eq!(routing_shift(0.0, 36.0, 1.0, 1.0), 0);
    }

    #[test]
    fn runoff_volume_uses_cell_area() {
        let runoff = array![[0.001, 0.002]];
        let overlap = AvailabilityMatrix::new(2, vec![vec![(0, 1.0), (1, 0.5)]]).unwrap();
        let volume = basin_runoff(&runoff, &overlap, &[2.0, 4.0]);
        assert!((volume[[0, 0]] - 6000.0).abs() < 1e-6);
    }

    #[test]
    fn upstream_runoff_arrives_late() {
        let grid = Grid::new(
            profgen_core::Axis { start: 0.5, step: 1.0, count: 2 },
            profgen_core::Axis { start: 0.5, step: 1.0, count: 1 },
        )
        .unwrap();
        // basin 2 (x 1..2) drains into basin 1 (x 0..1), 7.2 km upstream
        let basins = vec![basin(1, 0, 0.0, 0.0), basin(2, 1, 7.2, 1.0)];
        let runoff = array![[0.0, 1.0], [0.0, 0.0], [0.0, 0.0], [0.0, 0.0]];
        let options = RoutingOptions {
            flowspeed: 1.0,
            step_hours: 1.0,
            availability: AvailabilityOptions {
                samples_per_cell: 4,
                threads: 1,
                show_progress: false,
            },
        };
        let inflow = route_inflow(&[plant("p", "NG")], &basins, &grid, &runoff, options).unwrap();
        let area = grid.cell_areas_km2()[1] * 1e6;
        // 7.2 km / 1 m/s = 2 h
        assert_eq!(inflow[[0, 0]], 0.0);
        assert_eq!(inflow[[0, 1]], 0.0);
        assert!((inflow[[0, 2]] - area).abs() / area < 1e-9);
        assert_eq!(inflow[[0, 3]], 0.0);
    }

    #[test]
    fn normalisation_matches_reference_per_country_and_year() {
        // two steps of 4380 h make a full year
        let years = [2013, 2013, 2014, 2014];
        let plants = vec![plant("a", "NG"), plant("b", "NG"), plant("c", "GH")];
        let mut inflow = array![
            [1.0, 1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0, 1.0],
            [2.0, 2.0, 0.0, 0.0],
        ];
        let mut reference = AnnualGeneration::new();
        reference.insert("NG", 2013, 8.0);
        reference.insert("NG", 2014, 2.0);
        reference.insert("GH", 2013, 2.0);
        reference.insert("GH", 2014, 5.0);
        let mut diagnostics = Diagnostics::new();

        normalize_inflow(&mut inflow, &plants, &years, 4380.0, &reference, &mut diagnostics).unwrap();

        assert_eq!(inflow.row(0).to_vec(), vec![2.0, 2.0, 0.5, 0.5]);
        assert_eq!(inflow.slice(s![0..2, 0..2]).sum(), 8.0);
        assert_eq!(inflow.row(2).to_vec(), vec![1.0, 1.0, 0.0, 0.0]);
        // GH 2014 has zero modelled inflow
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn partial_year_takes_the_full_year_ratio() {
        let years = [2013, 2013, 2014];
        let mut inflow = array![[1.0, 1.0, 1.0]];
        let mut reference = AnnualGeneration::new();
        reference.insert("NG", 2013, 10.0);
        reference.insert("NG", 2014, 10_000.0);
        let mut diagnostics = Diagnostics::new();

        normalize_inflow(&mut inflow, &[plant("a", "NG")], &years, 4380.0, &reference, &mut diagnostics)
            .unwrap();

        assert_eq!(inflow.row(0).to_vec(), vec![5.0, 5.0, 5.0]);
        assert!(!diagnostics.has_warnings());
    }

    #[test]
    fn hours_of_two_years_are_not_normalised() {
        let mut inflow = array![[1.0, 1.0]];
        let mut reference = AnnualGeneration::new();
        reference.insert("NG", 2012, 8760.0);
        reference.insert("NG", 2013, 8760.0);
        let err = normalize_inflow(
            &mut inflow,
            &[plant("a", "NG")],
            &[2012, 2013],
            1.0,
            &reference,
            &mut Diagnostics::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("8700"), "{err}");
        assert_eq!(inflow.row(0).to_vec(), vec![1.0, 1.0]);
    }

    #[test]
    fn missing_reference_year_is_a_warning() {
        let mut inflow = array![[3.0, 3.0, 3.0, 3.0]];
        let mut reference = AnnualGeneration::new();
        reference.insert("NG", 2014, 12.0);
        let mut diagnostics = Diagnostics::new();
        normalize_inflow(
            &mut inflow,
            &[plant("a", "NG")],
            &[2014, 2014, 2015, 2015],
            4380.0,
            &reference,
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(inflow.row(0).to_vec(), vec![6.0, 6.0, 6.0, 6.0]);
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn country_without_any_reference_year_is_fatal() {
        let mut inflow = array![[3.0, 3.0]];
        let mut reference = AnnualGeneration::new();
        reference.add_country("NG");
        let err = normalize_inflow(
            &mut inflow,
            &[plant("a", "NG")],
            &[2015, 2015],
            4380.0,
            &reference,
            &mut Diagnostics::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("NG"), "{err}");
    }

    #[test]
    fn missing_reference_country_is_fatal() {
        let mut inflow = array![[3.0]];
        let reference = AnnualGeneration::new();
        let err = normalize_inflow(
            &mut inflow,
            &[plant("a", "ZZ")],
            &[2015],
            8760.0,
            &reference,
            &mut Diagnostics::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("ZZ"));
    }

    #[test]
    fn correction_then_clip() {
        let mut inflow = array![[1.0, 2.0, 4.0]];
        correct_and_clip(&mut inflow, 0.5, Some(1.0));
        assert_eq!(inflow.row(0).to_vec(), vec![0.0, 0.0, 2.0]);
    }
}
