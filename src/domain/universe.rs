//! Symbol universe loading.
//!
//! Parses code lists from configuration and fetches a validated price
//! series for each code, skipping codes that cannot be analysed.

use crate::domain::error::AnalyzerError;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Fewest bars that still yield one return.
pub const MIN_OHLCV_BARS: usize = 2;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Fetch(String),
    NoData,
    InsufficientBars { bars: usize },
    InvalidSeries(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Fetch(reason) => write!(f, "{reason}"),
            SkipReason::NoData => write!(f, "no data found"),
            SkipReason::InsufficientBars { bars } => write!(
                f,
                "only {bars} bars, minimum {MIN_OHLCV_BARS} required"
            ),
            SkipReason::InvalidSeries(reason) => write!(f, "{reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct LoadedUniverse {
    pub exchange: String,
    pub series: BTreeMap<String, PriceSeries>,
    pub skipped: Vec<SkippedCode>,
}

impl LoadedUniverse {
    pub fn count(&self) -> usize {
        self.series.len()
    }
}

fn load_one(
    data_port: &dyn DataPort,
    code: &str,
    exchange: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<PriceSeries, SkipReason> {
    let bars = data_port
        .fetch_ohlcv(code, exchange, start_date, end_date)
        .map_err(|e| SkipReason::Fetch(e.to_string()))?;
    if bars.is_empty() {
        return Err(SkipReason::NoData);
    }
    if bars.len() < MIN_OHLCV_BARS {
        return Err(SkipReason::InsufficientBars { bars: bars.len() });
    }
    PriceSeries::new(code, bars).map_err(|e| SkipReason::InvalidSeries(e.to_string()))
}

/// Fetches `codes` from `data_port`, keeping every code with a usable series.
///
/// Fails with `NoData` only when no code loads at all.
pub fn load_universe(
    data_port: &dyn DataPort,
    codes: &[String],
    exchange: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<LoadedUniverse, AnalyzerError> {
    let mut series = BTreeMap::new();
    let mut skipped = Vec::new();

    for code in codes {
        match load_one(data_port, code, exchange, start_date, end_date) {
            Ok(s) => {
                tracing::debug!(%code, %exchange, bars = s.len(), "loaded");
                series.insert(code.clone(), s);
            }
            Err(reason) => {
                tracing::warn!(%code, %exchange, %reason, "skipping code");
                skipped.push(SkippedCode {
                    code: code.clone(),
                    reason,
                });
            }
        }
    }

    if series.is_empty() {
        return Err(AnalyzerError::NoData {
            code: codes.join(","),
            exchange: exchange.to_string(),
        });
    }

    if !skipped.is_empty() {
        tracing::info!(
            loaded = series.len(),
            requested = codes.len(),
            %exchange,
            "universe partially loaded"
        );
    }

    Ok(LoadedUniverse {
        exchange: exchange.to_string(),
        series,
        skipped,
    })
}
