//! Analysis parameters.
//!
//! Every field is overridable per invocation; `Default` gives the standard
//! daily-bar settings.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::returns::TRADING_DAYS_PER_YEAR;

/// How divide-by-zero guards behave in beta, Sortino and correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Substitute the documented fallback value.
    #[default]
    Lenient,
    /// Surface `DegenerateMetric` instead.
    Strict,
}

/// Reference series used for beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BetaMode {
    /// Rolling mean of the symbol's own returns (parity with the old analyzer).
    #[default]
    Legacy,
    /// Returns of a configured benchmark symbol.
    Benchmark,
    /// Beta is not computed.
    None,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for FallbackMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(FallbackMode::Lenient),
            "strict" => Ok(FallbackMode::Strict),
            other => Err(UnknownVariant {
                kind: "fallback mode",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for BetaMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(BetaMode::Legacy),
            "benchmark" => Ok(BetaMode::Benchmark),
            "none" => Ok(BetaMode::None),
            other => Err(UnknownVariant {
                kind: "beta mode",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BetaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetaMode::Legacy => write!(f, "legacy"),
            BetaMode::Benchmark => write!(f, "benchmark"),
            BetaMode::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    /// Annualised.
    pub risk_free_rate: f64,
    pub rsi_period: usize,
    pub sma_short: usize,
    pub sma_long: usize,
    pub var_confidence: f64,
    pub trading_days: usize,
    pub fallback_mode: FallbackMode,
    pub beta_mode: BetaMode,
    pub legacy_beta_window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.02,
            rsi_period: 14,
            sma_short: 20,
            sma_long: 50,
            var_confidence: 0.95,
            trading_days: TRADING_DAYS_PER_YEAR,
            fallback_mode: FallbackMode::Lenient,
            beta_mode: BetaMode::Legacy,
            legacy_beta_window: 20,
        }
    }
}

impl AnalysisConfig {
    pub fn trading_days_f64(&self) -> f64 {
        self.trading_days as f64
    }

    pub fn daily_risk_free(&self) -> f64 {
        self.risk_free_rate / self.trading_days_f64()
    }

    pub fn is_strict(&self) -> bool {
        self.fallback_mode == FallbackMode::Strict
    }
}
