//! Per-cell capacity layout and installable potential.

use ndarray::{Array2, Axis};
use profgen_core::units::{CapacityDensity, SquareKilometres};
use profgen_core::AvailabilityMatrix;

/// `correction_factor ×` the time-mean of every cell's capacity factor.
pub fn mean_capacity_factor(capacity_factor: &Array2<f64>, correction_factor: f64) -> Vec<f64> {
    match capacity_factor.mean_axis(Axis(0)) {
        Some(mean) => mean.iter().map(|v| v * correction_factor).collect(),
        None => vec![0.0; capacity_factor.ncols()],
    }
}

/// Capacity (MW) installed in each cell if the whole cell were built out at
/// `density`, scaled by its mean capacity factor.
pub fn layout(mean_cf: &[f64], areas_km2: &[f64], density: CapacityDensity) -> Vec<f64> {
    mean_cf
        .iter()
        .zip(areas_km2)
        .map(|(&cf, &area)| cf * (density * SquareKilometres(area)).value())
        .collect()
}

/// Installable capacity (MW) per cell over the eligible area of all regions.
pub fn potential(
    availability: &AvailabilityMatrix,
    areas_km2: &[f64],
    density: CapacityDensity,
) -> Vec<f64> {
    availability
        .column_sums()
        .into_iter()
        .zip(areas_km2)
        .map(|(share, &area)| (density * SquareKilometres(share * area)).value())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn mean_cf_applies_correction() {
        let cf = array![[0.2, 0.0], [0.4, 1.0]];
        let mean = mean_capacity_factor(&cf, 0.5);
        assert!((mean[0] - 0.15).abs() < 1e-12);
        assert!((mean[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn layout_scales_with_area_and_density() {
        let layout = layout(&[0.5, 0.25], &[4.0, 2.0], CapacityDensity(3.0));
        assert_eq!(layout, vec![6.0, 1.5]);
    }

    #[test]
    fn potential_sums_over_regions() {
        let availability =
            AvailabilityMatrix::new(2, vec![vec![(0, 0.5)], vec![(0, 0.25), (1, 1.0)]]).unwrap();
        let potential = potential(&availability, &[4.0, 2.0], CapacityDensity(3.0));
        assert!((potential[0] - 9.0).abs() < 1e-12);
        assert!((potential[1] - 6.0).abs() < 1e-12);
    }
}
