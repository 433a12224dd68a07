//! Data ingestion and normalization
//!
//! Raw provider rows, team identity resolution, standings tables and
//! dataset files.

pub mod export;
pub mod normalize;
pub mod rankings;
pub mod raw;
pub mod teams;

pub use normalize::{Normalizer, SeasonWindow};
pub use rankings::{RankResolver, SeasonRankTable};
pub use raw::RawGameRow;
pub use teams::TeamRegistry;
