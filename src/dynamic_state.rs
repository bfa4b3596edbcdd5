//! DynamicState - the double-buffered inference/learning state that ticks
//! forward once per call to `TemporalPooler::update_inference_state` (or
//! the equivalent learning-path update, not implemented by this core).
//!
//! Every "active"/"predicted" slot below is shaped `NumberOfCols x
//! CellsPerColumn`; every "confidence" slot mirrors it in the same shape
//! except `col_confidence`, which is one value per column. Backtracking
//! needs to try a candidate continuation and discard it if it doesn't
//! pan out, so beyond the usual `t`/`t-1` pair each state also carries a
//! `backup` (the last known-good state, taken before a backtrack attempt)
//! and a `candidate` (the state being speculatively evaluated).

use crate::dense_matrix::DenseMatrix;
use crate::sparse_binary_matrix::SparseBinaryMatrix;

/// Double-buffered active/predicted/confidence state for one
/// `TemporalPooler`.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicState {
    /// Active state of learning, this tick.
    pub lrn_active_state: SparseBinaryMatrix,
    /// Active state of learning, previous tick.
    pub lrn_active_state_last: SparseBinaryMatrix,
    /// Predicted state of learning, this tick.
    pub lrn_predicted_state: SparseBinaryMatrix,
    /// Predicted state of learning, previous tick.
    pub lrn_predicted_state_last: SparseBinaryMatrix,

    /// Active state of inference, this tick.
    pub inf_active_state: SparseBinaryMatrix,
    /// Active state of inference, previous tick.
    pub inf_active_state_last: SparseBinaryMatrix,
    /// Active state of inference, backed up before a backtrack attempt.
    pub inf_active_state_backup: SparseBinaryMatrix,
    /// Active state of inference, under speculative evaluation.
    pub inf_active_state_candidate: SparseBinaryMatrix,

    /// Predicted state of inference, this tick.
    pub inf_predicted_state: SparseBinaryMatrix,
    /// Predicted state of inference, previous tick.
    pub inf_predicted_state_last: SparseBinaryMatrix,
    /// Predicted state of inference, backed up before a backtrack attempt.
    pub inf_predicted_state_backup: SparseBinaryMatrix,
    /// Predicted state of inference, under speculative evaluation.
    pub inf_predicted_state_candidate: SparseBinaryMatrix,

    /// Per-cell confidence, this tick.
    pub cell_confidence: DenseMatrix,
    /// Per-cell confidence, previous tick.
    pub cell_confidence_last: DenseMatrix,
    /// Per-cell confidence, under speculative evaluation.
    pub cell_confidence_candidate: DenseMatrix,

    /// Per-column confidence, this tick.
    pub col_confidence: Vec<f64>,
    /// Per-column confidence, previous tick.
    pub col_confidence_last: Vec<f64>,
    /// Per-column confidence, under speculative evaluation.
    pub col_confidence_candidate: Vec<f64>,
}

impl DynamicState {
    /// Allocate a fresh, all-zero state for the given shape. Every
    /// confidence slot is pre-sized to `number_of_cols` so a later
    /// `copy()` can never silently truncate into a zero-length
    /// destination.
    pub fn new(number_of_cols: usize, cells_per_column: usize) -> Self {
        let sbm = || SparseBinaryMatrix::new(number_of_cols, cells_per_column);
        let dm = || DenseMatrix::new(number_of_cols, cells_per_column);
        let cc = || vec![0.0; number_of_cols];

        Self {
            lrn_active_state: sbm(),
            lrn_active_state_last: sbm(),
            lrn_predicted_state: sbm(),
            lrn_predicted_state_last: sbm(),

            inf_active_state: sbm(),
            inf_active_state_last: sbm(),
            inf_active_state_backup: sbm(),
            inf_active_state_candidate: sbm(),

            inf_predicted_state: sbm(),
            inf_predicted_state_last: sbm(),
            inf_predicted_state_backup: sbm(),
            inf_predicted_state_candidate: sbm(),

            cell_confidence: dm(),
            cell_confidence_last: dm(),
            cell_confidence_candidate: dm(),

            col_confidence: cc(),
            col_confidence_last: cc(),
            col_confidence_candidate: cc(),
        }
    }

    /// Deep copy of the entire state, used by `predict()` to checkpoint
    /// before a speculative multi-step rollout and restore afterward.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}
