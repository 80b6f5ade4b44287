//! Upper bound on installable capacity per region.

use profgen_core::config::CapacityPolicy;
use profgen_core::units::{CapacityDensity, SquareKilometres};
use profgen_core::AvailabilityMatrix;

/// `p_nom_max` (MW) for every region under `policy`.
///
/// `simple` builds out all eligible area at full density. `conservative`
/// scales the layout capacity so the best cell of the region is built out.
pub fn max_capacity(
    policy: CapacityPolicy,
    availability: &AvailabilityMatrix,
    capacities: &[f64],
    mean_cf: &[f64],
    areas_km2: &[f64],
    density: CapacityDensity,
) -> Vec<f64> {
    (0..availability.n_rows())
        .map(|b| match policy {
            CapacityPolicy::Simple => {
                (density * SquareKilometres(availability.row_dot(b, areas_km2))).value()
            }
            CapacityPolicy::Conservative => {
                let best = availability
                    .row(b)
                    .iter()
                    .map(|&(c, _)| mean_cf[c])
                    .fold(f64::NEG_INFINITY, f64::max);
                if best > 0.0 {
                    capacities[b] / best
                } else {
                    0.0
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout, mean_capacity_factor};
    use crate::profile::aggregate_profiles;
    use ndarray::array;

    fn availability() -> AvailabilityMatrix {
        AvailabilityMatrix::new(2, vec![vec![(0, 1.0), (1, 0.5)], vec![]]).unwrap()
    }

    #[test]
    fn simple_uses_eligible_area() {
        let p = max_capacity(
            CapacityPolicy::Simple,
            &availability(),
            &[0.0, 0.0],
            &[0.5, 0.25],
            &[4.0, 2.0],
            CapacityDensity(3.0),
        );
        assert_eq!(p, vec![15.0, 0.0]);
    }

    #[test]
    fn conservative_divides_by_best_cell() {
        let p = max_capacity(
            CapacityPolicy::Conservative,
            &availability(),
            &[6.75, 0.0],
            &[0.5, 0.25],
            &[4.0, 2.0],
            CapacityDensity(3.0),
        );
        assert_eq!(p, vec![13.5, 0.0]);
    }

    #[test]
    fn conservative_stays_below_simple() {
        let availability = AvailabilityMatrix::new(2, vec![vec![(0, 1.0), (1, 1.0)]]).unwrap();
        let cf = array![[0.6, 0.2], [0.2, 0.2]];
        let areas = [4.0, 4.0];
        let density = CapacityDensity(3.0);
        let mean_cf = mean_capacity_factor(&cf, 1.0);
        let layout = layout(&mean_cf, &areas, density);
        let aggregated = aggregate_profiles(&availability, &layout, &cf, 1.0);

        let [simple, conservative] = [CapacityPolicy::Simple, CapacityPolicy::Conservative].map(|policy| {
            max_capacity(policy, &availability, &aggregated.capacities, &mean_cf, &areas, density)[0]
        });

        // best cell has mean capacity factor 0.4: 7.2 MW / 0.4 against 3 MW/km² · 8 km²
        assert!((conservative - 18.0).abs() < 1e-9, "{conservative}");
        assert!((simple - 24.0).abs() < 1e-9, "{simple}");
        assert!(conservative < simple);
    }
}
