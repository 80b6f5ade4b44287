//! Layout-weighted aggregation of cell capacity factors into per-region
//! profiles.

use ndarray::Array2;
use profgen_core::AvailabilityMatrix;

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedProfiles {
    /// regions × time, per unit
    pub profiles: Array2<f64>,
    /// `Σ_c A[b, c] · layout[c]` (MW)
    pub capacities: Vec<f64>,
}

/// Aggregate a `time × cell` capacity factor matrix over each region.
///
/// Regions without capacity get a zero profile. Values are clamped to [0, 1].
pub fn aggregate_profiles(
    availability: &AvailabilityMatrix,
    layout: &[f64],
    capacity_factor: &Array2<f64>,
    correction_factor: f64,
) -> AggregatedProfiles {
    let n_times = capacity_factor.nrows();
    let n_regions = availability.n_rows();
    let mut profiles = Array2::zeros((n_regions, n_times));
    let mut capacities = Vec::with_capacity(n_regions);

    for b in 0..n_regions {
        let capacity = availability.row_dot(b, layout);
        capacities.push(capacity);
        if capacity <= 0.0 {
            continue;
        }
        let row = availability.row(b);
        for (t, series) in capacity_factor.outer_iter().enumerate() {
            let generation: f64 = row.iter().map(|&(c, a)| a * layout[c] * series[c]).sum();
            profiles[[b, t]] = (correction_factor * generation / capacity).clamp(0.0, 1.0);
        }
    }

    AggregatedProfiles {
        profiles,
        capacities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn weighted_by_layout_and_availability() {
        let availability =
            AvailabilityMatrix::new(2, vec![vec![(0, 1.0), (1, 0.5)]]).unwrap();
        let layout = [2.0, 4.0];
        let cf = array![[0.5, 0.25], [1.0, 0.0]];
        let result = aggregate_profiles(&availability, &layout, &cf, 1.0);
        assert_eq!(result.capacities, vec![4.0]);
        // t0: (2·0.5 + 2·0.25) / 4
        assert!((result.profiles[[0, 0]] - 0.375).abs() < 1e-12);
        assert!((result.profiles[[0, 1]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_capacity_gives_zero_profile() {
        let availability = AvailabilityMatrix::new(1, vec![vec![]]).unwrap();
        let cf = array![[0.7], [0.9]];
        let result = aggregate_profiles(&availability, &[1.0], &cf, 1.0);
        assert_eq!(result.capacities, vec![0.0]);
        assert!(result.profiles.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn correction_is_clamped_to_unit_interval() {
        let availability = AvailabilityMatrix::new(1, vec![vec![(0, 1.0)]]).unwrap();
        let cf = array![[0.9]];
        let result = aggregate_profiles(&availability, &[1.0], &cf, 1.5);
        assert_eq!(result.profiles[[0, 0]], 1.0);
    }
}
