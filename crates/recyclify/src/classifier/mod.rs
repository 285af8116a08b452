pub mod material;

pub use material::{Classification, MatchTier, MaterialClassifier};
