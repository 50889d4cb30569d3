//! Simple and cumulative returns derived from a price series.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::error::AnalyzerError;
use crate::domain::ohlcv::PriceSeries;

/// Trading periods per year used for every annualisation.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnPoint {
    /// Date of the bar the return ends on.
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    pub symbol: String,
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Running compounded return: c[i] = prod(1 + r[0..=i]) - 1.
    pub fn cumulative(&self) -> Vec<f64> {
        let mut growth = 1.0;
        self.points
            .iter()
            .map(|p| {
                growth *= 1.0 + p.value;
                growth - 1.0
            })
            .collect()
    }

    pub fn total_return(&self) -> f64 {
        self.cumulative().last().copied().unwrap_or(0.0)
    }
}

/// Values of `a` and `b` on the dates both series share, in date order.
pub fn align_on_dates(a: &ReturnSeries, b: &ReturnSeries) -> (Vec<f64>, Vec<f64>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.points.len() && j < b.points.len() {
        let (pa, pb) = (&a.points[i], &b.points[j]);
        match pa.date.cmp(&pb.date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                left.push(pa.value);
                right.push(pb.value);
                i += 1;
                j += 1;
            }
        }
    }
    (left, right)
}

/// r[i] = (close[i+1] - close[i]) / close[i]
///
/// Every close must be strictly positive; the series needs at least two bars.
pub fn compute_returns(series: &PriceSeries) -> Result<ReturnSeries, AnalyzerError> {
    let bars = series.bars();
    if bars.len() < 2 {
        return Err(AnalyzerError::insufficient(series.symbol(), bars.len(), 2));
    }

    if let Some((index, bar)) = bars
        .iter()
        .enumerate()
        .find(|(_, b)| !(b.close.is_finite() && b.close > 0.0))
    {
        return Err(AnalyzerError::DegenerateSeries {
            symbol: series.symbol().to_string(),
            index,
            close: bar.close,
        });
    }

    let points = bars
        .windows(2)
        .map(|w| ReturnPoint {
            date: w[1].date,
            value: (w[1].close - w[0].close) / w[0].close,
        })
        .collect();

    Ok(ReturnSeries {
        symbol: series.symbol().to_string(),
        points,
    })
}
