//! temporal-pooler - the sequence-learning core of Hierarchical Temporal
//! Memory (HTM).
//!
//! This crate implements the temporal pooler: an online, unsupervised
//! learner of sequences over sparse binary column activations, as
//! produced upstream by an encoder and spatial pooler (neither of which
//! this crate implements). It models cells within columns, dendritic
//! segments on those cells, and synapses on those segments, and runs a
//! two-pass inference state machine each tick:
//!
//! - **Phase 1** computes this tick's active cells from the active
//!   columns and the previous tick's predictions (bursting a column
//!   that wasn't predicted).
//! - **Phase 2** computes this tick's predicted cells and per-cell/
//!   per-column confidence from segments that fire against the active
//!   state phase 1 produced.
//!
//! When phase 1 or phase 2 comes back unconfident, inference
//! backtracks: it replays buffered past inputs from their start cells,
//! looking for the oldest replay that relocalizes the pooler to a
//! confident state.
//!
//! # Examples
//!
//! ```
//! use temporal_pooler::{OutputType, TemporalPooler, TemporalPoolerParams};
//!
//! let params = TemporalPoolerParams {
//!     number_of_cols: 8,
//!     cells_per_column: 4,
//!     initial_perm: 0.11,
//!     connected_perm: 0.5,
//!     permanence_inc: 0.1,
//!     permanence_dec: 0.1,
//!     permanence_max: 1.0,
//!     min_threshold: 1,
//!     new_synapse_count: 5,
//!     activation_threshold: 1,
//!     global_decay: 0.0,
//!     max_age: 0,
//!     do_pooling: true,
//!     seg_update_valid_duration: 5,
//!     burn_in: 2,
//!     collect_stats: false,
//!     pam_length: 1,
//!     max_inf_backtrack: 5,
//!     max_lrn_backtrack: 5,
//!     max_seq_length: 32,
//!     max_segments_per_cell: -1,
//!     max_synapses_per_segment: -1,
//!     output_type: OutputType::Normal,
//! };
//!
//! let mut tp = TemporalPooler::new(params).unwrap();
//! tp.reset();
//! tp.update_inference_state(&[1, 3, 5]);
//! let _output = tp.compute_output();
//! ```
//!
//! # Non-goals
//!
//! This crate does not implement an encoder, a spatial pooler,
//! persistence or CLI/config loading, matrix primitives beyond the two
//! it needs, distributed or GPU execution, online hyperparameter
//! tuning, or full segment-reinforcement learning beyond what inference
//! itself queues as pending updates.

pub mod dense_matrix;
pub mod dynamic_state;
pub mod error;
pub mod params;
pub mod segment;
pub mod segment_update;
pub mod sparse_binary_matrix;
pub mod temporal_pooler;

pub use dense_matrix::DenseMatrix;
pub use dynamic_state::DynamicState;
pub use error::{Result, TpError};
pub use params::{OutputType, TemporalPoolerParams};
pub use segment::{Segment, Synapse};
pub use segment_update::{SegmentUpdateList, UpdateState};
pub use sparse_binary_matrix::SparseBinaryMatrix;
pub use temporal_pooler::TemporalPooler;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "temporal-pooler";

/// Human-readable `name vVERSION` string.
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(ver.contains("temporal-pooler"));
    }

    #[test]
    fn test_re_exports() {
        let _params: Option<TemporalPoolerParams> = None;
        let _result: Result<()> = Ok(());
    }
}
