//! The trainer side of the pipeline: a minimal regressor interface, a baseline model and
//! the evaluation metrics an external search loop optimizes.

pub mod error;
pub mod metrics;
pub mod regressor;
