//! Infrastructure layer - external collaborators behind the domain traits

pub mod aggregator;
pub mod blockchain;
pub mod wallet;
