//! Layout-weighted distance from each bus to its cells and the matching
//! centre of mass.

use profgen_core::geodesy::haversine_km;
use profgen_core::{AvailabilityMatrix, Bus, Grid};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// km
    pub average_distance: f64,
    /// `(x, y)`
    pub centre_of_mass: (f64, f64),
}

pub fn connections(
    buses: &[Bus],
    availability: &AvailabilityMatrix,
    layout: &[f64],
    grid: &Grid,
) -> Vec<Connection> {
    buses
        .iter()
        .enumerate()
        .map(|(b, bus)| connection(bus, availability.row(b), layout, grid))
        .collect()
}

fn connection(bus: &Bus, row: &[(usize, f64)], layout: &[f64], grid: &Grid) -> Connection {
    let weights: Vec<(usize, f64)> = row
        .iter()
        .map(|&(c, a)| (c, a * layout[c]))
        .filter(|&(_, w)| w != 0.0)
        .collect();
    let total: f64 = weights.iter().map(|&(_, w)| w).sum();
    if weights.is_empty() || total == 0.0 {
        return Connection {
            average_distance: 0.0,
            centre_of_mass: (bus.x, bus.y),
        };
    }

    let mut distance = 0.0;
    let (mut cx, mut cy) = (0.0, 0.0);
    for (c, w) in weights {
        let w = w / total;
        let (x, y) = grid.center(c);
        distance += w * haversine_km(bus.x, bus.y, x, y).value();
        cx += w * x;
        cy += w * y;
    }
    Connection {
        average_distance: distance,
        centre_of_mass: (cx, cy),
    }
}
