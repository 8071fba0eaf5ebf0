pub mod bayesian;
pub mod prior_mean;

pub use bayesian::{global_mean, BayesianPrior};
pub use prior_mean::PriorMeanCache;
