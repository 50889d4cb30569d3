//! Equal-weighted portfolio aggregation.
//!
//! Symbol return series are combined by position, not by date: callers
//! must hand in series of equal length.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::config::AnalysisConfig;
use crate::domain::error::AnalyzerError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::returns::{compute_returns, ReturnSeries};
use crate::domain::risk;
use crate::domain::stats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolStats {
    #[serde(rename = "return")]
    pub total_return: f64,
    pub volatility: f64,
    pub weight: f64,
    pub allocation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioStats {
    pub investment_amount: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    /// Running compounded return of the equal-weighted portfolio.
    pub cumulative_returns: Vec<f64>,
    pub symbols: BTreeMap<String, SymbolStats>,
}

impl PortfolioStats {
    pub fn compute(
        series: &BTreeMap<String, PriceSeries>,
        investment_amount: f64,
        config: &AnalysisConfig,
    ) -> Result<Self, AnalyzerError> {
        let returns = series
            .iter()
            .map(|(symbol, s)| Ok((symbol.clone(), compute_returns(s)?)))
            .collect::<Result<BTreeMap<_, _>, AnalyzerError>>()?;
        Self::from_returns(series, &returns, investment_amount, config)
    }

    /// Aggregates precomputed return series. `series` supplies first/last closes.
    pub fn from_returns(
        series: &BTreeMap<String, PriceSeries>,
        returns: &BTreeMap<String, ReturnSeries>,
        investment_amount: f64,
        config: &AnalysisConfig,
    ) -> Result<Self, AnalyzerError> {
        if returns.is_empty() {
            return Err(AnalyzerError::EmptyPortfolio);
        }
        if !(investment_amount.is_finite() && investment_amount > 0.0) {
            return Err(AnalyzerError::InvalidParameter {
                name: "investment amount".into(),
                reason: format!("{} is not a positive amount", investment_amount),
            });
        }

        let portfolio_returns = equal_weight_returns(returns)?;
        let weight = 1.0 / returns.len() as f64;
        let td = config.trading_days_f64();

        let mut growth = 1.0;
        let cumulative_returns: Vec<f64> = portfolio_returns
            .iter()
            .map(|r| {
                growth *= 1.0 + r;
                growth - 1.0
            })
            .collect();
        let total_return = growth - 1.0;
        let annualized_return =
            (1.0 + total_return).powf(td / portfolio_returns.len() as f64) - 1.0;

        let volatility = stats::std_dev(&portfolio_returns)
            .ok_or_else(|| AnalyzerError::insufficient("portfolio", portfolio_returns.len(), 2))?
            * td.sqrt();
        if volatility == 0.0 {
            return Err(AnalyzerError::degenerate(
                "portfolio sharpe_ratio",
                "portfolio volatility is zero",
            ));
        }
        let sharpe_ratio = (annualized_return - config.risk_free_rate) / volatility;

        let mut symbols = BTreeMap::new();
        for (symbol, r) in returns {
            let prices = series
                .get(symbol)
                .ok_or_else(|| AnalyzerError::insufficient(symbol, 0, 2))?;
            let (first, last) = match (prices.first_close(), prices.last_close()) {
                (Some(f), Some(l)) => (f, l),
                _ => return Err(AnalyzerError::insufficient(symbol, prices.len(), 2)),
            };
            symbols.insert(
                symbol.clone(),
                SymbolStats {
                    total_return: last / first - 1.0,
                    volatility: risk::volatility(r, config)?,
                    weight,
                    allocation: investment_amount * weight,
                },
            );
        }

        Ok(PortfolioStats {
            investment_amount,
            total_return,
            annualized_return,
            volatility,
            sharpe_ratio,
            cumulative_returns,
            symbols,
        })
    }

    pub fn total_allocation(&self) -> f64 {
        self.symbols.values().map(|s| s.allocation).sum()
    }
}

/// Elementwise mean of equally long return series.
pub fn equal_weight_returns(
    returns: &BTreeMap<String, ReturnSeries>,
) -> Result<Vec<f64>, AnalyzerError> {
    let Some(expected) = returns.values().next().map(ReturnSeries::len) else {
        return Err(AnalyzerError::EmptyPortfolio);
    };
    if let Some((symbol, r)) = returns.iter().find(|(_, r)| r.len() != expected) {
        return Err(AnalyzerError::MisalignedSeries {
            symbol: symbol.clone(),
            len: r.len(),
            expected,
        });
    }

    let n = returns.len() as f64;
    let mut sums = vec![0.0; expected];
    for r in returns.values() {
        for (sum, p) in sums.iter_mut().zip(&r.points) {
            *sum += p.value;
        }
    }
    Ok(sums.into_iter().map(|s| s / n).collect())
}
