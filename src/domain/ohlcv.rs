//! OHLCV bars and the per-symbol price series built from them.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::error::AnalyzerError;

#[derive(Debug, Clone, Serialize)]
pub struct OhlcvBar {
    pub code: String,
    pub exchange: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Time-ordered bars for one symbol. Dates are strictly increasing.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, AnalyzerError> {
        let symbol = symbol.into();
        if let Some(i) = bars.windows(2).position(|w| w[1].date <= w[0].date) {
            let reason = if bars[i + 1].date == bars[i].date {
                format!("duplicate date {}", bars[i].date)
            } else {
                format!("{} follows {}", bars[i + 1].date, bars[i].date)
            };
            return Err(AnalyzerError::InvalidSeries { symbol, reason });
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn first_close(&self) -> Option<f64> {
        self.bars.first().map(|b| b.close)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}
