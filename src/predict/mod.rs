//! Training and prediction runs

pub mod pipeline;

pub use pipeline::{Pipeline, PredictionOutcome};
