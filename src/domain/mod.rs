//! Domain layer - swap lifecycle entities and the seams to external services

pub mod form;
pub mod liquidity;
pub mod quote;
pub mod swap;
pub mod token;
pub mod wallet;
