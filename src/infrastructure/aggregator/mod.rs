//! Swap aggregators: quote providers that also build swap transactions

pub mod jupiter;
pub mod simulated;

pub use jupiter::JupiterClient;
pub use simulated::{SimulatedAggregator, SimulatedSubmitter};
