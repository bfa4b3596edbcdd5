//! TemporalPooler - the sequence-learning inference core.
//!
//! Drives the two-pass inference state machine (`infer_phase1` /
//! `infer_phase2`) once per call to `update_inference_state`, backtracking
//! to relocalize when phase 1 or phase 2 comes back unconfident. Learning
//! (segment growth and permanence reinforcement beyond what inference
//! itself queues as pending updates) is out of scope for this core; the
//! cell/segment table exists so inference has something to read.

use std::collections::VecDeque;

use crate::dynamic_state::DynamicState;
use crate::error::{Result, TpError};
use crate::params::{OutputType, TemporalPoolerParams};
use crate::segment::Segment;
use crate::segment_update::SegmentUpdateList;
use crate::sparse_binary_matrix::SparseBinaryMatrix;

/// The temporal pooler: cell/segment memory plus the inference state
/// machine that reads it.
#[derive(Debug)]
pub struct TemporalPooler {
    params: TemporalPoolerParams,

    /// `cells[col][cell]` holds that cell's dendritic segments.
    cells: Vec<Vec<Vec<Segment>>>,

    state: DynamicState,
    segment_updates: SegmentUpdateList,

    /// FIFO of past active-column patterns, most recent at the back,
    /// bounded to `max_inf_backtrack` entries by evicting from the
    /// front.
    prev_inf_patterns: VecDeque<Vec<usize>>,
    /// Same, for the (unimplemented) learning path; tracked for parity
    /// with the original state shape.
    prev_lrn_patterns: VecDeque<Vec<usize>>,

    lrn_iteration_idx: usize,
    iteration_idx: usize,
    next_seg_id: u64,

    pam_counter: usize,
    avg_input_density: f64,
    avg_learned_seq_length: f64,
    reset_called: bool,
}

impl TemporalPooler {
    /// Construct a new pooler. Validates `params` per its construction
    /// invariants (see `TemporalPoolerParams::validated`).
    pub fn new(params: TemporalPoolerParams) -> Result<Self> {
        let params = params.validated()?;
        let cells = vec![vec![Vec::new(); params.cells_per_column]; params.number_of_cols];
        let state = DynamicState::new(params.number_of_cols, params.cells_per_column);

        Ok(Self {
            cells,
            state,
            segment_updates: SegmentUpdateList::new(),
            prev_inf_patterns: VecDeque::new(),
            prev_lrn_patterns: VecDeque::new(),
            lrn_iteration_idx: 0,
            iteration_idx: 0,
            next_seg_id: 0,
            pam_counter: params.pam_length,
            avg_input_density: 0.0,
            avg_learned_seq_length: 0.0,
            reset_called: true,
            params,
        })
    }

    #[inline]
    pub fn params(&self) -> &TemporalPoolerParams {
        &self.params
    }

    #[inline]
    pub fn cells(&self) -> &[Vec<Vec<Segment>>] {
        &self.cells
    }

    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Vec<Vec<Segment>>] {
        &mut self.cells
    }

    #[inline]
    pub fn state(&self) -> &DynamicState {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut DynamicState {
        &mut self.state
    }

    #[inline]
    pub fn segment_updates(&self) -> &SegmentUpdateList {
        &self.segment_updates
    }

    #[inline]
    pub fn segment_updates_mut(&mut self) -> &mut SegmentUpdateList {
        &mut self.segment_updates
    }

    /// Assign a fresh, monotonically increasing segment id.
    pub fn get_seg_id(&mut self) -> u64 {
        let id = self.next_seg_id;
        self.next_seg_id += 1;
        id
    }

    /// Mark the next call to `update_inference_state` as following a
    /// sequence reset: phase 1 will activate only the first cell of
    /// each active column (start cells) instead of replaying
    /// predictions.
    pub fn reset(&mut self) {
        self.reset_called = true;
        self.pam_counter = self.params.pam_length;
        self.prev_inf_patterns.clear();
        self.prev_lrn_patterns.clear();
    }

    /// Count of `active_state`-active synapses on `seg`, optionally
    /// restricted to connected ones.
    fn get_segment_activity_level(
        &self,
        seg: &Segment,
        active_state: &SparseBinaryMatrix,
        connected_synapses_only: bool,
    ) -> usize {
        seg.syns
            .iter()
            .filter(|syn| {
                active_state.get(syn.src_col, syn.src_cell_idx)
                    && (!connected_synapses_only || syn.is_connected(self.params.connected_perm))
            })
            .count()
    }

    /// Whether `seg` fires given `active_state`, using connected
    /// synapses only. Short-circuits false if the segment has fewer
    /// synapses than `activation_threshold` could ever need.
    fn is_segment_active(&self, seg: &Segment, active_state: &SparseBinaryMatrix) -> bool {
        if seg.syns.len() < self.params.activation_threshold {
            return false;
        }
        self.get_segment_activity_level(seg, active_state, true) >= self.params.activation_threshold
    }

    /// Phase 1: compute this tick's active state from the active
    /// columns and the previous tick's predictions.
    ///
    /// `use_start_cells`, when true (following a reset), activates only
    /// cell 0 of each active column rather than consulting predictions.
    /// Returns true if phase 1 is confident enough to skip backtracking:
    /// `use_start_cells`, or at least half the active columns were
    /// correctly predicted.
    fn infer_phase1(&mut self, active_columns: &[usize], use_start_cells: bool) -> bool {
        self.state.inf_active_state.clear();
        let mut num_predicted_columns = 0usize;

        for &col in active_columns {
            if use_start_cells {
                self.state.inf_active_state.set(col, 0, true);
                continue;
            }

            let predicted_cells: Vec<usize> = (0..self.params.cells_per_column)
                .filter(|&cell| self.state.inf_predicted_state_last.get(col, cell))
                .collect();

            if predicted_cells.is_empty() {
                self.state.inf_active_state.fill_row(col, true);
            } else {
                for cell in predicted_cells {
                    self.state.inf_active_state.set(col, cell, true);
                }
                num_predicted_columns += 1;
            }
        }

        use_start_cells || num_predicted_columns >= active_columns.len() / 2
    }

    /// Phase 2: compute this tick's predicted state and cell/column
    /// confidence from the active state phase 1 produced. Confidences
    /// are the sum of firing segments' duty cycles, normalized to sum
    /// to 1.0 across the whole pooler. Returns true if enough columns
    /// were predicted relative to the running average input density.
    fn infer_phase2(&mut self) -> bool {
        self.state.inf_predicted_state.clear();
        self.state.cell_confidence.fill(0.0);
        for v in &mut self.state.col_confidence {
            *v = 0.0;
        }

        let mut sum_confidences = 0.0;

        for col in 0..self.params.number_of_cols {
            for cell in 0..self.params.cells_per_column {
                for seg in &self.cells[col][cell] {
                    let activity =
                        self.get_segment_activity_level(seg, &self.state.inf_active_state, false);
                    if activity < self.params.activation_threshold {
                        continue;
                    }

                    let dc = seg.duty_cycle(false, false);
                    self.state.cell_confidence.add(col, cell, dc);
                    self.state.col_confidence[col] += dc;
                    sum_confidences += dc;

                    if self.is_segment_active(seg, &self.state.inf_active_state) {
                        self.state.inf_predicted_state.set(col, cell, true);
                    }
                }
            }
        }

        if sum_confidences > 0.0 {
            self.state.cell_confidence.div_scaler(sum_confidences);
            for v in &mut self.state.col_confidence {
                *v /= sum_confidences;
            }
        }

        let num_predicted_cols = self.state.inf_predicted_state.total_true_cols();
        num_predicted_cols as f64 >= 0.5 * self.avg_input_density
    }

    /// Replay buffered past input patterns from their start cells to
    /// relocalize after phase 1 or phase 2 came back unconfident. Tries
    /// each buffered starting point from oldest to newest; the oldest
    /// replay that ends confident wins. If none does, restores the
    /// pre-backtrack state and leaves phase 2's (unconfident) result in
    /// place.
    fn infer_backtrack(&mut self, active_columns: &[usize]) {
        // Backups are of the t-1 slots, not t: a replay overwrites t-1 on
        // every step, and the "no candidate" path restores that backup
        // into t (not t-1) before regenerating predictions. See
        // DESIGN.md for why this looks inverted.
        let active_state_backup = self.state.inf_active_state_last.copy();
        let predicted_state_backup = self.state.inf_predicted_state_last.copy();

        let num_prev = self.prev_inf_patterns.len();
        if num_prev == 0 {
            return;
        }

        let mut cand_start_offset: Option<usize> = None;

        for start_offset in 0..num_prev {
            if start_offset == num_prev - 1 && cand_start_offset.is_some() {
                break;
            }

            let mut total_confidence = 0.0;
            let mut in_sequence = true;

            for offset in start_offset..num_prev {
                if offset == num_prev - 1 {
                    total_confidence = active_columns
                        .iter()
                        .map(|&c| self.state.col_confidence[c])
                        .sum();
                }

                self.state.inf_predicted_state_last = self.state.inf_predicted_state.copy();

                let pattern = self.prev_inf_patterns[offset].clone();
                in_sequence = self.infer_phase1(&pattern, offset == start_offset);
                if !in_sequence {
                    break;
                }
                in_sequence = self.infer_phase2();
                if !in_sequence {
                    break;
                }
            }

            let _ = total_confidence;
            if !in_sequence {
                continue;
            }

            cand_start_offset = Some(start_offset);
            self.state.inf_active_state_candidate = self.state.inf_active_state.copy();
            self.state.inf_predicted_state_candidate = self.state.inf_predicted_state.copy();
            self.state.cell_confidence_candidate = self.state.cell_confidence.copy();
            self.state.col_confidence_candidate = self.state.col_confidence.clone();
            break;
        }

        match cand_start_offset {
            None => {
                self.state.inf_active_state = active_state_backup;
                self.infer_phase2();
            }
            Some(offset) => {
                if offset != num_prev - 1 {
                    self.state.inf_active_state = self.state.inf_active_state_candidate.copy();
                    self.state.inf_predicted_state =
                        self.state.inf_predicted_state_candidate.copy();
                    self.state.cell_confidence = self.state.cell_confidence_candidate.copy();
                    self.state.col_confidence = self.state.col_confidence_candidate.clone();
                }
            }
        }

        // Prune every pattern that was a bad starting point or sits at
        // or before the winning start offset; they are contiguous from
        // the head since start offsets were scanned oldest-first.
        let prune_count = cand_start_offset.map_or(num_prev, |offset| offset + 1);
        for _ in 0..prune_count {
            self.prev_inf_patterns.pop_front();
        }

        self.state.inf_predicted_state_last = predicted_state_backup;
    }

    /// Advance inference by one tick given this tick's active columns.
    /// Copies `t` state to `t-1`, runs phase 1 and (if phase 1 was
    /// confident) phase 2, backtracking if either came back unconfident.
    pub fn update_inference_state(&mut self, active_columns: &[usize]) {
        self.state.inf_active_state_last = self.state.inf_active_state.copy();
        self.state.inf_predicted_state_last = self.state.inf_predicted_state.copy();
        self.state.cell_confidence_last = self.state.cell_confidence.copy();
        self.state.col_confidence_last = self.state.col_confidence.clone();
        self.state.lrn_active_state_last = self.state.lrn_active_state.copy();
        self.state.lrn_predicted_state_last = self.state.lrn_predicted_state.copy();

        self.prev_inf_patterns.push_back(active_columns.to_vec());
        while self.prev_inf_patterns.len() > self.params.max_inf_backtrack {
            self.prev_inf_patterns.pop_front();
        }

        let use_start_cells = self.reset_called;
        self.reset_called = false;

        let phase1_ok = self.infer_phase1(active_columns, use_start_cells);
        let phase2_ok = if phase1_ok {
            self.infer_phase2()
        } else {
            false
        };

        if !phase1_ok || !phase2_ok {
            self.infer_backtrack(active_columns);
        }

        if phase1_ok && phase2_ok {
            self.pam_counter = self.params.pam_length;
        } else if self.pam_counter > 0 {
            self.pam_counter -= 1;
        }

        self.iteration_idx += 1;
    }

    /// Advance inference by one tick and return this tick's output
    /// vector: validates `active_columns`, drives
    /// `update_inference_state`, then returns `compute_output()`. This
    /// is the single entry point a caller feeding in a stream of
    /// spatial-pooler activations should use; `update_inference_state`
    /// and `compute_output` stay public separately for callers that
    /// need to inspect intermediate phase state.
    pub fn compute(&mut self, active_columns: &[usize]) -> Result<Vec<bool>> {
        for &col in active_columns {
            if col >= self.params.number_of_cols {
                return Err(TpError::InputOutOfRange {
                    index: col,
                    num_cols: self.params.number_of_cols,
                });
            }
        }

        self.update_inference_state(active_columns);
        Ok(self.compute_output())
    }

    /// This tick's output vector, flattened row-major
    /// (`number_of_cols * cells_per_column` entries), shaped per
    /// `params().output_type`.
    pub fn compute_output(&self) -> Vec<bool> {
        match self.params.output_type {
            OutputType::Normal => self
                .state
                .inf_active_state
                .or(&self.state.inf_predicted_state)
                .flatten(),
            OutputType::ActiveState => self.state.inf_active_state.flatten(),
            OutputType::ActiveState1CellPerCol => {
                let mut out = SparseBinaryMatrix::new(
                    self.params.number_of_cols,
                    self.params.cells_per_column,
                );
                let arg_max = self.state.cell_confidence.arg_max_cols();
                for (col, &best_cell) in arg_max.iter().enumerate() {
                    if self.state.inf_active_state.get_row_indices(col).is_empty() {
                        continue;
                    }
                    out.set(col, best_cell, true);
                }
                out.flatten()
            }
        }
    }

    /// Per-column confidence computed by the most recent phase 2 (or
    /// backtrack), normalized to sum to 1.0 over all columns.
    #[inline]
    pub fn column_confidences(&self) -> &[f64] {
        &self.state.col_confidence
    }

    /// Same values as `column_confidences`, returned by value for
    /// callers that want a top-down readout independent of pooler
    /// lifetime.
    pub fn top_down_compute(&self) -> Vec<f64> {
        self.state.col_confidence.clone()
    }

    /// Roll inference forward `n_steps` ticks with no new input, and
    /// return the column confidences produced at each step. Step 0's
    /// confidences are already sitting in `col_confidence` from the
    /// most recent `update_inference_state` call, so that row is
    /// recorded for free; state is only promoted one tick further
    /// between rows, never after the last one. Does not disturb the
    /// pooler's real state: a full checkpoint is restored before
    /// returning.
    pub fn predict(&mut self, n_steps: i64) -> Result<Vec<Vec<f64>>> {
        if n_steps <= 0 {
            return Err(TpError::PredictStepsInvalid(n_steps));
        }
        let n_steps = n_steps as usize;

        let checkpoint = self.state.copy();
        let mut results = Vec::with_capacity(n_steps);

        for step in 0..n_steps {
            results.push(self.state.col_confidence.clone());
            if step != n_steps - 1 {
                self.state.inf_active_state = self.state.inf_predicted_state.copy();
                self.state.inf_predicted_state.clear();
                self.infer_phase2();
            }
        }

        self.state = checkpoint;
        Ok(results)
    }

    /// Update the exponential moving average of learned sequence
    /// length. Uses a faster-adapting rate (0.5) for the first 100
    /// learning iterations, then settles to 0.1.
    pub fn update_avg_learned_seq_length(&mut self, prev_seq_length: f64) {
        let alpha = if self.lrn_iteration_idx < 100 {
            0.5
        } else {
            0.1
        };
        self.avg_learned_seq_length =
            (1.0 - alpha) * self.avg_learned_seq_length + alpha * prev_seq_length;
        self.lrn_iteration_idx += 1;
    }

    #[inline]
    pub fn avg_learned_seq_length(&self) -> f64 {
        self.avg_learned_seq_length
    }

    /// Running estimate of how many columns the upstream spatial pooler
    /// activates per tick, consulted by phase 2's confidence gate. Not
    /// maintained by this core (the spatial pooler / learning path
    /// owns it); defaults to 0 and is set by whichever caller tracks
    /// input density.
    #[inline]
    pub fn avg_input_density(&self) -> f64 {
        self.avg_input_density
    }

    #[inline]
    pub fn set_avg_input_density(&mut self, density: f64) {
        self.avg_input_density = density;
    }

    #[inline]
    pub fn iteration_idx(&self) -> usize {
        self.iteration_idx
    }

    #[inline]
    pub fn pam_counter(&self) -> usize {
        self.pam_counter
    }

    pub fn memory_usage(&self) -> usize {
        let cells_bytes: usize = self
            .cells
            .iter()
            .flatten()
            .map(|segs| segs.len() * std::mem::size_of::<Segment>())
            .sum();
        cells_bytes
            + self.state.inf_active_state.memory_usage()
            + self.state.cell_confidence.memory_usage()
    }
}
