//! DenseMatrix - dense 2-D float matrix with row/col reductions.
//!
//! Backs `cellConfidence[t]`/`[t-1]`/candidate of `DynamicState`, shaped
//! `NumberOfCols x CellsPerColumn`. Unlike the active/predicted state
//! matrices, confidence is rarely sparse (every segment on every active
//! cell contributes a duty cycle), so this is a flat `Vec<f64>` rather
//! than per-row storage.

use serde::{Deserialize, Serialize};

/// A dense `num_rows x num_cols` matrix of `f64`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DenseMatrix {
    data: Vec<f64>,
    num_rows: usize,
    num_cols: usize,
}

impl DenseMatrix {
    /// Create a new matrix of shape `num_rows x num_cols`, all zeros.
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            data: vec![0.0; num_rows * num_cols],
            num_rows,
            num_cols,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.num_rows && col < self.num_cols);
        row * self.num_cols + col
    }

    /// Get the value at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[self.index(row, col)]
    }

    /// Set the value at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f64) {
        let idx = self.index(row, col);
        self.data[idx] = val;
    }

    /// Add `val` to the value at `(row, col)`.
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, val: f64) {
        let idx = self.index(row, col);
        self.data[idx] += val;
    }

    /// Set every value to `v`.
    pub fn fill(&mut self, v: f64) {
        self.data.fill(v);
    }

    /// Replace row `row` with the given values (must have length `num_cols`).
    pub fn fill_row(&mut self, row: usize, vals: &[f64]) {
        assert_eq!(vals.len(), self.num_cols, "row length mismatch");
        let beg = row * self.num_cols;
        self.data[beg..beg + self.num_cols].copy_from_slice(vals);
    }

    /// Deep copy of this matrix.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Divide every element by `s` in place. No-op if `s == 0.0`.
    pub fn div_scaler(&mut self, s: f64) {
        if s == 0.0 {
            return;
        }
        for v in &mut self.data {
            *v /= s;
        }
    }

    /// Sum of all elements.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// For each row, the column index holding the maximum value. Ties
    /// are broken toward the lowest column index.
    pub fn arg_max_cols(&self) -> Vec<usize> {
        (0..self.num_rows)
            .map(|r| {
                let beg = r * self.num_cols;
                let row = &self.data[beg..beg + self.num_cols];
                let mut best = 0;
                let mut best_val = row[0];
                for (c, &v) in row.iter().enumerate().skip(1) {
                    if v > best_val {
                        best_val = v;
                        best = c;
                    }
                }
                best
            })
            .collect()
    }

    /// Estimate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.data.capacity() * std::mem::size_of::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new() {
        let m = DenseMatrix::new(3, 4);
        assert_eq!(m.num_rows(), 3);
        assert_eq!(m.num_cols(), 4);
        assert_eq!(m.sum(), 0.0);
    }

    #[test]
    fn test_get_set() {
        let mut m = DenseMatrix::new(2, 2);
        m.set(1, 1, 3.5);
        assert_eq!(m.get(1, 1), 3.5);
        assert_eq!(m.get(0, 0), 0.0);
    }

    #[test]
    fn test_add() {
        let mut m = DenseMatrix::new(1, 1);
        m.add(0, 0, 1.0);
        m.add(0, 0, 2.0);
        assert_eq!(m.get(0, 0), 3.0);
    }

    #[test]
    fn test_fill() {
        let mut m = DenseMatrix::new(2, 2);
        m.fill(5.0);
        assert_eq!(m.sum(), 20.0);
    }

    #[test]
    fn test_fill_row() {
        let mut m = DenseMatrix::new(2, 3);
        m.fill_row(1, &[1.0, 2.0, 3.0]);
        assert_eq!(m.get(1, 0), 1.0);
        assert_eq!(m.get(1, 2), 3.0);
        assert_eq!(m.get(0, 0), 0.0);
    }

    #[test]
    fn test_div_scaler() {
        let mut m = DenseMatrix::new(1, 2);
        m.fill_row(0, &[2.0, 4.0]);
        m.div_scaler(2.0);
        assert_relative_eq!(m.get(0, 0), 1.0);
        assert_relative_eq!(m.get(0, 1), 2.0);
    }

    #[test]
    fn test_div_scaler_zero_is_noop() {
        let mut m = DenseMatrix::new(1, 2);
        m.fill_row(0, &[2.0, 4.0]);
        m.div_scaler(0.0);
        assert_eq!(m.get(0, 0), 2.0);
        assert_eq!(m.get(0, 1), 4.0);
    }

    #[test]
    fn test_arg_max_cols_ties_break_low() {
        let mut m = DenseMatrix::new(1, 3);
        m.fill_row(0, &[1.0, 1.0, 0.5]);
        assert_eq!(m.arg_max_cols(), vec![0]);
    }

    #[test]
    fn test_arg_max_cols_multi_row() {
        let mut m = DenseMatrix::new(2, 2);
        m.fill_row(0, &[0.2, 0.8]);
        m.fill_row(1, &[0.9, 0.1]);
        assert_eq!(m.arg_max_cols(), vec![1, 0]);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut a = DenseMatrix::new(1, 1);
        a.set(0, 0, 1.0);
        let b = a.copy();
        a.set(0, 0, 2.0);
        assert_eq!(b.get(0, 0), 1.0);
    }
}
