//! Feature derivation and encoding
//!
//! Converts ordered game records into feature vectors and model-ready matrices.

pub mod encoding;
pub mod engine;
pub mod rolling;
pub mod state;

pub use encoding::{FeatureMatrix, TeamEncoder};
pub use engine::{EnrichedGame, FeatureEngine, FeaturePass, GameFeatures};
pub use rolling::{LabelledGame, WinPercentageTimeline};
pub use state::{PairKey, PassState, TeamState};
