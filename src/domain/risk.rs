//! Per-symbol and portfolio-level risk metrics.
//!
//! Per-symbol metrics depend only on that symbol's prices and returns (plus
//! the read-only market proxy), so symbols can be evaluated independently.
//! The portfolio block needs every symbol's returns at once.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::config::AnalysisConfig;
use crate::domain::error::AnalyzerError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::returns::{align_on_dates, ReturnSeries};
use crate::domain::stats::{self, RollingWindow};

/// Reference returns for beta.
#[derive(Debug, Clone)]
pub enum MarketProxy {
    /// Beta is left out of the metrics.
    None,
    /// Rolling mean of the symbol's own returns. This measures self-correlation,
    /// not systematic risk; kept only for output parity.
    Legacy { window: usize },
    /// An independent benchmark, aligned with each symbol on common dates.
    Benchmark(ReturnSeries),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub volatility: f64,
    pub var_95: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub beta: Option<f64>,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Drawdown {
    /// Most negative (price - running_max) / running_max, always <= 0.
    pub max_drawdown: f64,
    /// Longest run of consecutive bars below a prior peak.
    pub duration: usize,
}

impl RiskMetrics {
    pub fn compute(
        series: &PriceSeries,
        returns: &ReturnSeries,
        proxy: &MarketProxy,
        config: &AnalysisConfig,
    ) -> Result<Self, AnalyzerError> {
        let drawdown = max_drawdown(&series.closes());
        Ok(RiskMetrics {
            volatility: volatility(returns, config)?,
            var_95: value_at_risk(returns, config.var_confidence)?,
            max_drawdown: drawdown.max_drawdown,
            max_drawdown_duration: drawdown.duration,
            beta: beta(returns, proxy, config)?,
            sharpe_ratio: sharpe_ratio(returns, config)?,
            sortino_ratio: sortino_ratio(returns, config)?,
        })
    }
}

fn sample_std(returns: &ReturnSeries) -> Result<f64, AnalyzerError> {
    stats::std_dev(&returns.values())
        .ok_or_else(|| AnalyzerError::insufficient(&returns.symbol, returns.len(), 2))
}

/// Sample standard deviation of returns, annualised.
pub fn volatility(returns: &ReturnSeries, config: &AnalysisConfig) -> Result<f64, AnalyzerError> {
    Ok(sample_std(returns)? * config.trading_days_f64().sqrt())
}

/// Historical-simulation VaR: the (1 - confidence) percentile of returns.
pub fn value_at_risk(returns: &ReturnSeries, confidence: f64) -> Result<f64, AnalyzerError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(AnalyzerError::InvalidParameter {
            name: "var confidence".into(),
            reason: format!("{} is not inside (0, 1)", confidence),
        });
    }
    stats::percentile(&returns.values(), (1.0 - confidence) * 100.0)
        .ok_or_else(|| AnalyzerError::insufficient(&returns.symbol, 0, 1))
}

pub fn max_drawdown(closes: &[f64]) -> Drawdown {
    let Some(&first) = closes.first() else {
        return Drawdown {
            max_drawdown: 0.0,
            duration: 0,
        };
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut current_duration = 0usize;
    let mut max_duration = 0usize;

    for &price in closes {
        if price >= peak {
            peak = price;
            current_duration = 0;
        } else if peak > 0.0 {
            let dd = (price - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
            current_duration += 1;
            max_duration = max_duration.max(current_duration);
        }
    }

    Drawdown {
        max_drawdown: max_dd,
        duration: max_duration,
    }
}

/// cov(returns, proxy) / var(proxy).
///
/// Zero or undefined proxy variance yields 1.0 in lenient mode. That value
/// is a placeholder, not an estimate.
pub fn beta(
    returns: &ReturnSeries,
    proxy: &MarketProxy,
    config: &AnalysisConfig,
) -> Result<Option<f64>, AnalyzerError> {
    let (asset, market) = match proxy {
        MarketProxy::None => return Ok(None),
        MarketProxy::Legacy { window } => legacy_proxy_pairs(&returns.values(), *window),
        MarketProxy::Benchmark(benchmark) => {
            let (asset, market) = align_on_dates(returns, benchmark);
            if asset.len() < 2 {
                return Err(AnalyzerError::insufficient(
                    &format!("{} vs {}", returns.symbol, benchmark.symbol),
                    asset.len(),
                    2,
                ));
            }
            (asset, market)
        }
    };

    match (stats::covariance(&asset, &market), stats::variance(&market)) {
        (Some(cov), Some(var)) if var != 0.0 => Ok(Some(cov / var)),
        _ if config.is_strict() => Err(AnalyzerError::degenerate(
            "beta",
            "market proxy variance is zero or undefined",
        )),
        _ => Ok(Some(1.0)),
    }
}

// Pairs each return with the trailing mean ending on it; bars before the
// window fills have no proxy value and are dropped.
fn legacy_proxy_pairs(values: &[f64], window: usize) -> (Vec<f64>, Vec<f64>) {
    let mut rolling = RollingWindow::new(window);
    let mut asset = Vec::with_capacity(values.len());
    let mut market = Vec::with_capacity(values.len());
    for &value in values {
        rolling.push(value);
        if let Some(avg) = rolling.mean() {
            asset.push(value);
            market.push(avg);
        }
    }
    (asset, market)
}

/// sqrt(td) * mean(r - rf/td) / std(r). Zero volatility is always an error.
pub fn sharpe_ratio(returns: &ReturnSeries, config: &AnalysisConfig) -> Result<f64, AnalyzerError> {
    let std = sample_std(returns)?;
    if std == 0.0 {
        return Err(AnalyzerError::degenerate(
            "sharpe_ratio",
            &format!("{} returns have zero standard deviation", returns.symbol),
        ));
    }
    Ok(config.trading_days_f64().sqrt() * mean_excess(returns, config)? / std)
}

/// Sharpe numerator over sqrt(mean(r^2)) of the negative returns.
pub fn sortino_ratio(returns: &ReturnSeries, config: &AnalysisConfig) -> Result<f64, AnalyzerError> {
    let downside: Vec<f64> = returns
        .values()
        .into_iter()
        .filter(|&r| r < 0.0)
        .map(|r| r * r)
        .collect();
    let downside_std = stats::mean(&downside).map(f64::sqrt).unwrap_or(0.0);

    if downside_std == 0.0 {
        if config.is_strict() {
            return Err(AnalyzerError::degenerate(
                "sortino_ratio",
                &format!("{} has no downside returns", returns.symbol),
            ));
        }
        return Ok(0.0);
    }
    Ok(config.trading_days_f64().sqrt() * mean_excess(returns, config)? / downside_std)
}

fn mean_excess(returns: &ReturnSeries, config: &AnalysisConfig) -> Result<f64, AnalyzerError> {
    let mean = stats::mean(&returns.values())
        .ok_or_else(|| AnalyzerError::insufficient(&returns.symbol, 0, 1))?;
    Ok(mean - config.daily_risk_free())
}

/// Pairwise Pearson correlations in symbol order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[i][j])
    }

    pub fn mean_off_diagonal(&self) -> Option<f64> {
        let n = self.symbols.len();
        if n < 2 {
            return None;
        }
        let sum: f64 = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| self.values[i][j])
            .sum();
        Some(sum / (n * (n - 1)) as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioRisk {
    pub correlation: CorrelationMatrix,
    pub portfolio_volatility: f64,
    /// 1 / (1 + mean off-diagonal correlation). A heuristic, not the
    /// weighted diversification ratio.
    pub diversification_ratio: f64,
}

/// Portfolio-level block. `Ok(None)` when fewer than two symbols are given
/// or some pair shares fewer than two dates.
pub fn compute_portfolio_risk(
    returns: &BTreeMap<String, ReturnSeries>,
    config: &AnalysisConfig,
) -> Result<Option<PortfolioRisk>, AnalyzerError> {
    if returns.len() < 2 {
        return Ok(None);
    }

    let series: Vec<&ReturnSeries> = returns.values().collect();
    let n = series.len();
    let mut values = vec![vec![1.0; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = align_on_dates(series[i], series[j]);
            if a.len() < 2 {
                return Ok(None);
            }
            let corr = match stats::pearson(&a, &b) {
                Some(c) => c,
                None if config.is_strict() => {
                    return Err(AnalyzerError::degenerate(
                        "correlation",
                        &format!(
                            "{} / {} has a zero-variance side",
                            series[i].symbol, series[j].symbol
                        ),
                    ));
                }
                None => 0.0,
            };
            values[i][j] = corr;
            values[j][i] = corr;
        }
    }

    let correlation = CorrelationMatrix {
        symbols: returns.keys().cloned().collect(),
        values,
    };

    let mean_corr = correlation.mean_off_diagonal().unwrap_or(0.0);
    if 1.0 + mean_corr == 0.0 {
        return Err(AnalyzerError::degenerate(
            "diversification_ratio",
            "mean correlation is -1",
        ));
    }

    Ok(Some(PortfolioRisk {
        portfolio_volatility: date_mean_volatility(&series, config)?,
        diversification_ratio: 1.0 / (1.0 + mean_corr),
        correlation,
    }))
}

// Mean across the symbols present on each date, then annualised sample std.
fn date_mean_volatility(
    series: &[&ReturnSeries],
    config: &AnalysisConfig,
) -> Result<f64, AnalyzerError> {
    let mut by_date: BTreeMap<chrono::NaiveDate, (f64, usize)> = BTreeMap::new();
    for s in series {
        for p in &s.points {
            let entry = by_date.entry(p.date).or_insert((0.0, 0));
            entry.0 += p.value;
            entry.1 += 1;
        }
    }
    let means: Vec<f64> = by_date.values().map(|(sum, n)| sum / *n as f64).collect();
    let std = stats::std_dev(&means)
        .ok_or_else(|| AnalyzerError::insufficient("portfolio", means.len(), 2))?;
    Ok(std * config.trading_days_f64().sqrt())
}
