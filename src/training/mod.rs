//! Model training
//!
//! Classifier seam, evaluation metrics and hyperparameter search.

pub mod classifier;
pub mod metrics;
pub mod tuning;

pub use classifier::{Classifier, HomeCourtBaseline, LogisticClassifier, LogisticParams};
pub use metrics::ClassificationReport;
pub use tuning::{CandidateScore, GridSearch, TuningResult};
