//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]), maintained with a running window sum.
//! Warmup: first (n-1) bars are unavailable.

use crate::domain::error::AnalyzerError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::stats::RollingWindow;

pub fn calculate_sma(series: &PriceSeries, period: usize) -> Result<IndicatorSeries, AnalyzerError> {
    if period == 0 {
        return Err(AnalyzerError::InvalidParameter {
            name: "sma period".into(),
            reason: "must be at least 1".into(),
        });
    }
    if series.len() < period {
        return Err(AnalyzerError::insufficient(
            series.symbol(),
            series.len(),
            period,
        ));
    }

    let mut window = RollingWindow::new(period);
    let values = series
        .bars()
        .iter()
        .map(|bar| {
            window.push(bar.close);
            IndicatorPoint {
                date: bar.date,
                value: window.mean(),
            }
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    })
}
