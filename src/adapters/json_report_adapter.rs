//! JSON report adapter.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::AnalyzerError;
use crate::ports::report_port::ReportPort;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportAdapter {
    pub pretty: bool,
}

impl JsonReportAdapter {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl ReportPort for JsonReportAdapter {
    fn write_to(&self, report: &AnalysisReport, out: &mut dyn Write) -> Result<(), AnalyzerError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, report)?;
        } else {
            serde_json::to_writer(&mut *out, report)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::analyze;
    use crate::domain::config::AnalysisConfig;
    use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
    use crate::domain::risk::MarketProxy;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn sample_report() -> AnalysisReport {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = (0..60)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.4).sin() * 3.0 + i as f64 * 0.2;
                OhlcvBar {
                    code: "AAPL".into(),
                    exchange: "NASDAQ".into(),
                    date: start + chrono::Duration::days(i),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1000,
                }
            })
            .collect();
        let mut series = BTreeMap::new();
        series.insert("AAPL".to_string(), PriceSeries::new("AAPL", bars).unwrap());
        analyze(
            &series,
            10_000.0,
            &AnalysisConfig::default(),
            &MarketProxy::Legacy { window: 20 },
        )
        .unwrap()
    }

    #[test]
    fn writes_parseable_json() {
        let report = sample_report();
        let mut buf = Vec::new();
        JsonReportAdapter::pretty().write_to(&report, &mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["portfolio"]["investment_amount"], 10_000.0);
        assert_eq!(value["config"]["fallback_mode"], "lenient");
        assert!(value["recommendations"]["AAPL"]["overall_sentiment"].is_string());
    }

    #[test]
    fn compact_output_is_single_line() {
        let report = sample_report();
        let mut buf = Vec::new();
        JsonReportAdapter::default().write_to(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.trim_end().lines().count(), 1);
    }

    #[test]
    fn write_creates_file() {
        let report = sample_report();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        JsonReportAdapter::pretty()
            .write(&report, path.to_str().unwrap())
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"recommendations\""));
    }
}
