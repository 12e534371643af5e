pub mod classifier_trait;
pub mod connected_set;
pub mod density;
pub mod factory;
pub mod frequency;
pub mod isolation_forest;
pub mod prediction;
pub mod simple_distance;
pub mod three_sigma;
pub mod utils;
pub mod zero_deviation;

pub use classifier_trait::Classifier;
pub use prediction::{Direction, Prediction, ANOMALY, NORMAL};
