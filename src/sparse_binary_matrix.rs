//! SparseBinaryMatrix - row-indexed sparse boolean matrix.
//!
//! Backs every "cells active/predicted" slot of `DynamicState`
//! (`infActiveState`, `infPredictedState`, and their `t-1`/backup/candidate
//! siblings). Each row is a mini-column; each column within a row is a
//! cell index. Rows are almost always near-empty (bursting sets every
//! cell in a column, the worst case) or hold a handful of predicted
//! cells, so each row is stored as a sorted list of the indices that are
//! set rather than as a dense bitset.
//!
//! # Examples
//!
//! ```
//! use temporal_pooler::SparseBinaryMatrix;
//!
//! let mut m = SparseBinaryMatrix::new(4, 3);
//! m.set(0, 1, true);
//! m.set(2, 0, true);
//! assert_eq!(m.get_row_indices(0), &[1]);
//! assert_eq!(m.total_true_cols(), 2);
//! ```

use serde::{Deserialize, Serialize};

/// A row-indexed sparse boolean matrix of fixed shape `num_rows x num_cols`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SparseBinaryMatrix {
    rows: Vec<Vec<usize>>,
    num_cols: usize,
}

impl SparseBinaryMatrix {
    /// Create a new all-false matrix of shape `num_rows x num_cols`.
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            rows: vec![Vec::new(); num_rows],
            num_cols,
        }
    }

    /// Number of rows (columns, in temporal-pooler terms).
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (cells per column, in temporal-pooler terms).
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Get the value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.rows[row].binary_search(&col).is_ok()
    }

    /// Set the value at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, val: bool) {
        let r = &mut self.rows[row];
        match r.binary_search(&col) {
            Ok(pos) => {
                if !val {
                    r.remove(pos);
                }
            }
            Err(pos) => {
                if val {
                    r.insert(pos, col);
                }
            }
        }
    }

    /// Get the sorted indices of set columns in `row`.
    pub fn get_row_indices(&self, row: usize) -> &[usize] {
        &self.rows[row]
    }

    /// Replace the contents of `row` with exactly the given (unsorted,
    /// possibly duplicate) indices.
    pub fn replace_row_by_indices(&mut self, row: usize, ids: &[usize]) {
        let mut sorted: Vec<usize> = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        self.rows[row] = sorted;
    }

    /// Set every column in `row` to `val`.
    pub fn fill_row(&mut self, row: usize, val: bool) {
        self.rows[row] = if val {
            (0..self.num_cols).collect()
        } else {
            Vec::new()
        };
    }

    /// Clear every row to all-false.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    /// Deep copy of this matrix.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Count of rows that have at least one set column.
    pub fn total_true_cols(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_empty()).count()
    }

    /// Bitwise OR with another matrix of the same shape.
    pub fn or(&self, other: &Self) -> Self {
        assert_eq!(self.num_rows(), other.num_rows(), "shape mismatch");
        assert_eq!(self.num_cols, other.num_cols, "shape mismatch");

        let rows = self
            .rows
            .iter()
            .zip(other.rows.iter())
            .map(|(a, b)| {
                let mut merged: Vec<usize> = a.iter().chain(b.iter()).copied().collect();
                merged.sort_unstable();
                merged.dedup();
                merged
            })
            .collect();

        Self {
            rows,
            num_cols: self.num_cols,
        }
    }

    /// Flatten to a row-major `Vec<bool>` of length `num_rows * num_cols`.
    pub fn flatten(&self) -> Vec<bool> {
        let mut out = vec![false; self.num_rows() * self.num_cols];
        for (r, idxs) in self.rows.iter().enumerate() {
            let base = r * self.num_cols;
            for &c in idxs {
                out[base + c] = true;
            }
        }
        out
    }

    /// Estimate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        let mut bytes = std::mem::size_of::<Self>();
        for r in &self.rows {
            bytes += r.capacity() * std::mem::size_of::<usize>();
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let m = SparseBinaryMatrix::new(4, 3);
        assert_eq!(m.num_rows(), 4);
        assert_eq!(m.num_cols(), 3);
        assert_eq!(m.total_true_cols(), 0);
    }

    #[test]
    fn test_get_set() {
        let mut m = SparseBinaryMatrix::new(2, 3);
        assert!(!m.get(0, 1));
        m.set(0, 1, true);
        assert!(m.get(0, 1));
        m.set(0, 1, false);
        assert!(!m.get(0, 1));
    }

    #[test]
    fn test_get_row_indices_sorted() {
        let mut m = SparseBinaryMatrix::new(1, 5);
        m.set(0, 3, true);
        m.set(0, 1, true);
        m.set(0, 4, true);
        assert_eq!(m.get_row_indices(0), &[1, 3, 4]);
    }

    #[test]
    fn test_replace_row_by_indices() {
        let mut m = SparseBinaryMatrix::new(2, 5);
        m.replace_row_by_indices(0, &[4, 2, 2, 0]);
        assert_eq!(m.get_row_indices(0), &[0, 2, 4]);
    }

    #[test]
    fn test_fill_row() {
        let mut m = SparseBinaryMatrix::new(2, 3);
        m.fill_row(1, true);
        assert_eq!(m.get_row_indices(1), &[0, 1, 2]);
        m.fill_row(1, false);
        assert_eq!(m.get_row_indices(1), &[] as &[usize]);
    }

    #[test]
    fn test_clear() {
        let mut m = SparseBinaryMatrix::new(2, 3);
        m.fill_row(0, true);
        m.fill_row(1, true);
        m.clear();
        assert_eq!(m.total_true_cols(), 0);
    }

    #[test]
    fn test_total_true_cols() {
        let mut m = SparseBinaryMatrix::new(4, 3);
        m.set(0, 0, true);
        m.set(2, 1, true);
        assert_eq!(m.total_true_cols(), 2);
    }

    #[test]
    fn test_or() {
        let mut a = SparseBinaryMatrix::new(2, 3);
        let mut b = SparseBinaryMatrix::new(2, 3);
        a.set(0, 0, true);
        b.set(0, 1, true);
        b.set(1, 2, true);

        let c = a.or(&b);
        assert_eq!(c.get_row_indices(0), &[0, 1]);
        assert_eq!(c.get_row_indices(1), &[2]);
    }

    #[test]
    fn test_flatten() {
        let mut m = SparseBinaryMatrix::new(2, 2);
        m.set(0, 1, true);
        m.set(1, 0, true);
        assert_eq!(m.flatten(), vec![false, true, true, false]);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut a = SparseBinaryMatrix::new(1, 3);
        a.set(0, 0, true);
        let b = a.copy();
        a.set(0, 1, true);
        assert_eq!(b.get_row_indices(0), &[0]);
        assert_eq!(a.get_row_indices(0), &[0, 1]);
    }
}
