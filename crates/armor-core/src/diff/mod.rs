//! Structural diff: engine, record model, and the change describer.

pub mod describe;
pub mod engine;
pub mod model;

pub use describe::{describe_changes, AtomicChange, ChangeCategory};
pub use engine::{diff_nodes, diff_trees, verify_diff_round_trip};
pub use model::{DiffRecord, DiffTag};
