#![allow(dead_code)]

use chrono::NaiveDate;
use portfolio_analyzer::cli::DataSettings;
use portfolio_analyzer::domain::error::AnalyzerError;
pub use portfolio_analyzer::domain::ohlcv::{OhlcvBar, PriceSeries};
use portfolio_analyzer::ports::data_port::DataPort;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        _exchange: &str,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, AnalyzerError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(AnalyzerError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(code).cloned().unwrap_or_default())
    }

    fn list_symbols(&self, _exchange: &str) -> Result<Vec<String>, AnalyzerError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
        _exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AnalyzerError> {
        match self.data.get(code) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(code: &str, date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        code: code.to_string(),
        exchange: "NASDAQ".to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Daily bars from `start_date`, one per close.
pub fn bars_from_closes(code: &str, start_date: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            code: code.to_string(),
            exchange: "NASDAQ".to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1000 + i as i64,
        })
        .collect()
}

/// Oscillating, gently trending closes; never flat and always positive.
pub fn wave_closes(count: usize, base: f64, phase: f64) -> Vec<f64> {
    (0..count)
        .map(|i| base + (i as f64 * 0.35 + phase).sin() * base * 0.04 + i as f64 * base * 0.002)
        .collect()
}

pub fn generate_bars(code: &str, start_date: &str, count: usize, base: f64, phase: f64) -> Vec<OhlcvBar> {
    bars_from_closes(code, start_date, &wave_closes(count, base, phase))
}

pub fn make_series(code: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(code, bars_from_closes(code, "2024-01-01", closes)).unwrap()
}

pub fn portfolio(entries: &[(&str, Vec<f64>)]) -> BTreeMap<String, PriceSeries> {
    entries
        .iter()
        .map(|(code, closes)| (code.to_string(), make_series(code, closes)))
        .collect()
}

pub fn settings(codes: &[&str]) -> DataSettings {
    DataSettings {
        data_dir: PathBuf::from("."),
        exchange: "NASDAQ".to_string(),
        codes: codes.iter().map(|c| c.to_string()).collect(),
        lookback_days: 365,
        end_date: Some(date(2024, 12, 31)),
        benchmark: None,
    }
}

/// Writes `<dir>/<CODE>_<EXCHANGE>.csv` in the layout `CsvAdapter` reads.
pub fn write_csv(dir: &std::path::Path, bars: &[OhlcvBar]) {
    let Some(first) = bars.first() else {
        return;
    };
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    std::fs::write(
        dir.join(format!("{}_{}.csv", first.code, first.exchange)),
        content,
    )
    .unwrap();
}
