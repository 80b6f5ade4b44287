//! Sparse bus × cell availability matrix.
//!
//! Row `b` stores the cells that intersect bus `b` together with the share
//! of the cell that is inside the bus region and eligible. Entries are kept
//! sorted by cell index and never hold zero.

use crate::error::{ProfgenError, ProfgenResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityMatrix {
    n_cells: usize,
    rows: Vec<Vec<(usize, f64)>>,
}

impl AvailabilityMatrix {
    pub fn new(n_cells: usize, rows: Vec<Vec<(usize, f64)>>) -> ProfgenResult<Self> {
        let mut rows = rows;
        for (b, row) in rows.iter_mut().enumerate() {
            row.retain(|&(_, v)| v != 0.0);
            row.sort_by_key(|&(c, _)| c);
            for &(c, v) in row.iter() {
                if c >= n_cells {
                    return Err(ProfgenError::Validation(format!(
                        "availability row {b} references cell {c} outside grid of {n_cells} cells"
                    )));
                }
                if !(0.0..=1.0 + 1e-9).contains(&v) {
                    return Err(ProfgenError::Validation(format!(
                        "availability row {b}, cell {c}: fraction {v} outside [0, 1]"
                    )));
                }
            }
        }
        Ok(Self { n_cells, rows })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    pub fn row(&self, b: usize) -> &[(usize, f64)] {
        &self.rows[b]
    }

    pub fn get(&self, b: usize, c: usize) -> f64 {
        self.rows[b]
            .binary_search_by_key(&c, |&(cell, _)| cell)
            .map(|i| self.rows[b][i].1)
            .unwrap_or(0.0)
    }

    /// `Σ_c A[b, c] · weights[c]`
    pub fn row_dot(&self, b: usize, weights: &[f64]) -> f64 {
        self.rows[b].iter().map(|&(c, a)| a * weights[c]).sum()
    }

    /// `Σ_b A[b, c]` for every cell.
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_cells];
        for row in &self.rows {
            for &(c, a) in row {
                sums[c] += a;
            }
        }
        sums
    }
}
