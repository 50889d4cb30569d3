//! RSI (Relative Strength Index) indicator.
//!
//! Average gain/loss are simple rolling means of the last n price changes:
//! - gain = max(delta, 0), loss = max(-delta, 0)
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! - avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are unavailable (need n price changes).

use crate::domain::error::AnalyzerError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::stats::RollingWindow;

pub fn calculate_rsi(series: &PriceSeries, period: usize) -> Result<IndicatorSeries, AnalyzerError> {
    if period == 0 {
        return Err(AnalyzerError::InvalidParameter {
            name: "rsi period".into(),
            reason: "must be at least 1".into(),
        });
    }
    let bars = series.bars();
    if bars.len() < period + 1 {
        return Err(AnalyzerError::insufficient(
            series.symbol(),
            bars.len(),
            period + 1,
        ));
    }

    let mut values = Vec::with_capacity(bars.len());
    values.push(IndicatorPoint {
        date: bars[0].date,
        value: None,
    });

    let mut gains = RollingWindow::new(period);
    let mut losses = RollingWindow::new(period);

    for w in bars.windows(2) {
        let change = w[1].close - w[0].close;
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));

        let rsi = match (gains.mean(), losses.mean()) {
            (Some(avg_gain), Some(avg_loss)) => Some(rsi_from_averages(avg_gain, avg_loss)),
            _ => None,
        };
        values.push(IndicatorPoint {
            date: w[1].date,
            value: rsi,
        });
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    })
}

// A window with no losses averages to exactly 0.0; mixed windows can still
// drift a hair below zero.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let avg_gain = avg_gain.max(0.0);
    let avg_loss = avg_loss.max(0.0);
    if avg_loss == 0.0 {
        return 100.0;
    }
    (100.0 - 100.0 / (1.0 + avg_gain / avg_loss)).clamp(0.0, 100.0)
}
