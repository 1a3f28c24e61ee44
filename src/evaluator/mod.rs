pub mod normalizers;
pub mod scorer;
pub mod ranker;

pub use ranker::{CatalystRanker, FilterOutcome, RankedSelection};
