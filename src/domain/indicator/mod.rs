//! Technical indicators over a symbol's close prices.
//!
//! - `IndicatorPoint`: one dated value, `None` while the trailing window is still filling
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series of indicator points aligned with the price series
//! - `IndicatorSet`: the SMA pair and RSI used by the recommendation rules

pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::domain::config::AnalysisConfig;
use crate::domain::error::AnalyzerError;
use crate::domain::ohlcv::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn latest(&self) -> Option<f64> {
        self.values.last().and_then(|p| p.value)
    }

    pub fn first_available(&self) -> Option<usize> {
        self.values.iter().position(|p| p.value.is_some())
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}

/// Latest indicator readings for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub prev_close: f64,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub rsi: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    pub symbol: String,
    pub sma_short: IndicatorSeries,
    pub sma_long: IndicatorSeries,
    pub rsi: IndicatorSeries,
}

impl IndicatorSet {
    pub fn compute(series: &PriceSeries, config: &AnalysisConfig) -> Result<Self, AnalyzerError> {
        let need = config
            .sma_short
            .max(config.sma_long)
            .max(config.rsi_period)
            + 1;
        if series.len() < need {
            return Err(AnalyzerError::insufficient(
                series.symbol(),
                series.len(),
                need,
            ));
        }

        Ok(Self {
            symbol: series.symbol().to_string(),
            sma_short: sma::calculate_sma(series, config.sma_short)?,
            sma_long: sma::calculate_sma(series, config.sma_long)?,
            rsi: rsi::calculate_rsi(series, config.rsi_period)?,
        })
    }

    /// Readings at the last bar. Unavailable indicators stay `None`.
    pub fn snapshot(&self, series: &PriceSeries) -> Result<IndicatorSnapshot, AnalyzerError> {
        let bars = series.bars();
        if bars.len() < 2 {
            return Err(AnalyzerError::insufficient(series.symbol(), bars.len(), 2));
        }
        Ok(IndicatorSnapshot {
            close: bars[bars.len() - 1].close,
            prev_close: bars[bars.len() - 2].close,
            sma_short: self.sma_short.latest(),
            sma_long: self.sma_long.latest(),
            rsi: self.rsi.latest(),
        })
    }
}
