//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::SwapError;

/// Which side of the swap the user-entered amount fixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapMode {
    #[default]
    ExactIn,
    ExactOut,
}

impl SwapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapMode::ExactIn => "EXACT_IN",
            SwapMode::ExactOut => "EXACT_OUT",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SwapMode::ExactIn => SwapMode::ExactOut,
            SwapMode::ExactOut => SwapMode::ExactIn,
        }
    }

    /// Label shown above the input side of the form
    pub fn side_label(&self) -> &'static str {
        match self {
            SwapMode::ExactIn => "Selling",
            SwapMode::ExactOut => "Buying",
        }
    }
}

impl fmt::Display for SwapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapMode {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EXACT_IN" | "EXACTIN" | "IN" => Ok(SwapMode::ExactIn),
            "EXACT_OUT" | "EXACTOUT" | "OUT" => Ok(SwapMode::ExactOut),
            _ => Err(SwapError::invalid(format!("Unknown swap mode: {}", s))),
        }
    }
}

/// Slippage tolerance in basis points, always within [1, 10000]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct SlippageBps(u16);

impl SlippageBps {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 10_000;

    pub fn new(bps: u16) -> Result<Self, SwapError> {
        if (Self::MIN..=Self::MAX).contains(&bps) {
            Ok(Self(bps))
        } else {
            Err(SwapError::invalid(format!(
                "Slippage must be between {} and {} bps, got {}",
                Self::MIN,
                Self::MAX,
                bps
            )))
        }
    }

    /// Build from a percentage such as `0.5` (= 50 bps)
    pub fn from_percent(percent: f64) -> Result<Self, SwapError> {
        if !percent.is_finite() {
            return Err(SwapError::invalid("Slippage must be a finite number"));
        }
        let bps = (percent * 100.0).round();
        if bps < Self::MIN as f64 || bps > Self::MAX as f64 {
            return Err(SwapError::invalid(format!(
                "Slippage must be between 0.01% and 100%, got {}%",
                percent
            )));
        }
        Self::new(bps as u16)
    }

    pub fn bps(&self) -> u16 {
        self.0
    }

    pub fn as_percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for SlippageBps {
    fn default() -> Self {
        Self(50)
    }
}

impl TryFrom<u16> for SlippageBps {
    type Error = SwapError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SlippageBps> for u16 {
    fn from(value: SlippageBps) -> Self {
        value.0
    }
}

impl fmt::Display for SlippageBps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bps", self.0)
    }
}
