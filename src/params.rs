//! Construction-time parameters and validation.

use crate::error::{Result, TpError};
use serde::{Deserialize, Serialize};

/// Selects the shape of `compute_output()`'s result.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputType {
    /// Bitwise OR of active and predicted state.
    Normal,
    /// Active state, verbatim.
    ActiveState,
    /// At most one cell per column: the most confident active cell.
    ActiveState1CellPerCol,
}

/// Construction parameters for a `TemporalPooler`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemporalPoolerParams {
    /// Number of mini-columns.
    pub number_of_cols: usize,
    /// Cells per column.
    pub cells_per_column: usize,

    /// Permanence a new synapse is created with.
    pub initial_perm: f64,
    /// Permanence threshold above which a synapse is connected.
    pub connected_perm: f64,
    /// Permanence increment applied on positive reinforcement.
    pub permanence_inc: f64,
    /// Permanence decrement applied on negative reinforcement.
    pub permanence_dec: f64,
    /// Maximum permanence value.
    pub permanence_max: f64,

    /// Minimum overlap for segment creation eligibility (learning path).
    pub min_threshold: usize,
    /// Synapses added per new segment (learning path).
    pub new_synapse_count: usize,
    /// Synapses required, connected and active, for a segment to fire.
    pub activation_threshold: usize,

    /// Global permanence decay per tick; must be 0 in fixed-size CLA mode.
    pub global_decay: f64,
    /// Maximum segment age before pruning; must be 0 in fixed-size CLA mode.
    pub max_age: usize,

    /// Whether segments keep pooling (sustaining activation past the
    /// triggering input) once active.
    pub do_pooling: bool,
    /// How many ticks a pending segment update stays valid.
    pub seg_update_valid_duration: usize,

    /// Ticks before learning statistics are trusted.
    pub burn_in: usize,
    /// Whether to collect runtime statistics.
    pub collect_stats: bool,
    /// PAM (prediction-assisted memory) counter reset value.
    pub pam_length: usize,
    /// Maximum depth of the inference backtrack buffer.
    pub max_inf_backtrack: usize,
    /// Maximum depth of the learning backtrack buffer.
    pub max_lrn_backtrack: usize,
    /// Maximum tracked sequence length (learning path).
    pub max_seq_length: usize,

    /// Fixed-size CLA cap on segments per cell, or `-1` to disable.
    pub max_segments_per_cell: i64,
    /// Fixed-size CLA cap on synapses per segment, or `-1` to disable.
    pub max_synapses_per_segment: i64,

    /// Output vector shape/selection.
    pub output_type: OutputType,
}

impl TemporalPoolerParams {
    /// Validate this parameter set per the construction-time invariants.
    ///
    /// Returns the (possibly adjusted) params on success: when
    /// `do_pooling` is false, `seg_update_valid_duration` is forced to 1.
    pub(crate) fn validated(mut self) -> Result<Self> {
        if self.pam_length == 0 {
            return Err(TpError::ConfigInvalid("pam_length must be > 0".to_string()));
        }

        let fixed_size_cla =
            self.max_segments_per_cell != -1 || self.max_synapses_per_segment != -1;

        if fixed_size_cla {
            if self.max_segments_per_cell <= 0 {
                return Err(TpError::ConfigInvalid(
                    "max_segments_per_cell must be > 0 in fixed-size CLA mode".to_string(),
                ));
            }
            if self.max_synapses_per_segment <= 0 {
                return Err(TpError::ConfigInvalid(
                    "max_synapses_per_segment must be > 0 in fixed-size CLA mode".to_string(),
                ));
            }
            if self.global_decay != 0.0 {
                return Err(TpError::ConfigInvalid(
                    "global_decay must be 0 in fixed-size CLA mode".to_string(),
                ));
            }
            if self.max_age != 0 {
                return Err(TpError::ConfigInvalid(
                    "max_age must be 0 in fixed-size CLA mode".to_string(),
                ));
            }
            if self.max_synapses_per_segment < self.new_synapse_count as i64 {
                return Err(TpError::ConfigInvalid(
                    "max_synapses_per_segment must be >= new_synapse_count".to_string(),
                ));
            }
        }

        if !self.do_pooling {
            self.seg_update_valid_duration = 1;
        }

        if self.number_of_cols == 0 {
            return Err(TpError::ConfigInvalid(
                "number_of_cols must be > 0".to_string(),
            ));
        }
        if self.cells_per_column == 0 {
            return Err(TpError::ConfigInvalid(
                "cells_per_column must be > 0".to_string(),
            ));
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_params() -> TemporalPoolerParams {
        TemporalPoolerParams {
            number_of_cols: 4,
            cells_per_column: 3,
            initial_perm: 0.11,
            connected_perm: 0.5,
            permanence_inc: 0.1,
            permanence_dec: 0.1,
            permanence_max: 1.0,
            min_threshold: 1,
            new_synapse_count: 5,
            activation_threshold: 1,
            global_decay: 0.0,
            max_age: 0,
            do_pooling: true,
            seg_update_valid_duration: 5,
            burn_in: 2,
            collect_stats: false,
            pam_length: 1,
            max_inf_backtrack: 5,
            max_lrn_backtrack: 5,
            max_seq_length: 32,
            max_segments_per_cell: -1,
            max_synapses_per_segment: -1,
            output_type: OutputType::Normal,
        }
    }

    #[test]
    fn test_valid_params_pass() {
        assert!(base_params().validated().is_ok());
    }

    #[test]
    fn test_pam_length_zero_rejected() {
        let mut p = base_params();
        p.pam_length = 0;
        assert!(matches!(p.validated(), Err(TpError::ConfigInvalid(_))));
    }

    #[test]
    fn test_fixed_size_cla_requires_zero_decay() {
        let mut p = base_params();
        p.max_segments_per_cell = 10;
        p.max_synapses_per_segment = 20;
        p.global_decay = 0.1;
        assert!(p.validated().is_err());
    }

    #[test]
    fn test_fixed_size_cla_requires_enough_synapses() {
        let mut p = base_params();
        p.max_segments_per_cell = 10;
        p.max_synapses_per_segment = 2;
        p.new_synapse_count = 5;
        assert!(p.validated().is_err());
    }

    #[test]
    fn test_fixed_size_cla_valid() {
        let mut p = base_params();
        p.max_segments_per_cell = 10;
        p.max_synapses_per_segment = 20;
        p.new_synapse_count = 5;
        assert!(p.validated().is_ok());
    }

    #[test]
    fn test_no_pooling_forces_duration_one() {
        let mut p = base_params();
        p.do_pooling = false;
        p.seg_update_valid_duration = 99;
        let validated = p.validated().unwrap();
        assert_eq!(validated.seg_update_valid_duration, 1);
    }
}
