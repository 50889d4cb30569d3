//! CSV file data adapter.
//!
//! One file per symbol, `<base>/<CODE>_<EXCHANGE>.csv`, with the header
//! `date,open,high,low,close,volume` and ISO dates.

use crate::domain::error::AnalyzerError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str, exchange: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", code, exchange))
    }

    fn read_all(&self, code: &str, exchange: &str) -> Result<Vec<OhlcvBar>, AnalyzerError> {
        let path = self.csv_path(code, exchange);
        let content = fs::read_to_string(&path).map_err(|e| AnalyzerError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| AnalyzerError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                AnalyzerError::DataSource {
                    reason: format!("invalid date format '{}': {}", date_str, e),
                }
            })?;

            bars.push(OhlcvBar {
                code: code.to_string(),
                exchange: exchange.to_string(),
                date,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_volume(&record)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, AnalyzerError> {
    record.get(index).ok_or_else(|| AnalyzerError::DataSource {
        reason: format!("missing {} column", name),
    })
}

fn parse_field<T>(record: &csv::StringRecord, index: usize, name: &str) -> Result<T, AnalyzerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = field(record, index, name)?;
    raw.trim().parse().map_err(|e| AnalyzerError::DataSource {
        reason: format!("invalid {} value '{}': {}", name, raw, e),
    })
}

// Some providers export volume as a float ("1234.0").
fn parse_volume(record: &csv::StringRecord) -> Result<i64, AnalyzerError> {
    match parse_field::<i64>(record, 5, "volume") {
        Ok(v) => Ok(v),
        Err(_) => parse_field::<f64>(record, 5, "volume").map(|v| v.round() as i64),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, AnalyzerError> {
        let mut bars = self.read_all(code, exchange)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, AnalyzerError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| AnalyzerError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", exchange);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| AnalyzerError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            if let Some(code) = name.to_string_lossy().strip_suffix(&suffix) {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
        exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AnalyzerError> {
        if !self.csv_path(code, exchange).exists() {
            return Ok(None);
        }
        let bars = self.read_all(code, exchange)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
