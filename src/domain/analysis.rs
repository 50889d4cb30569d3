//! Multi-symbol analysis run.
//!
//! Per-symbol stages run in parallel and a failing symbol is only dropped
//! from the stage it failed in. Portfolio aggregation is the join point and
//! its failure fails the whole run.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::config::AnalysisConfig;
use crate::domain::error::AnalyzerError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::portfolio::PortfolioStats;
use crate::domain::recommendation::{recommend_series, Recommendation};
use crate::domain::returns::{compute_returns, ReturnSeries};
use crate::domain::risk::{compute_portfolio_risk, MarketProxy, PortfolioRisk, RiskMetrics};

/// Key used for the portfolio-level entry in skip records.
pub const PORTFOLIO_KEY: &str = "__portfolio__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Returns,
    Risk,
    PortfolioRisk,
    Recommendation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load => write!(f, "load"),
            Stage::Returns => write!(f, "returns"),
            Stage::Risk => write!(f, "risk"),
            Stage::PortfolioRisk => write!(f, "portfolio risk"),
            Stage::Recommendation => write!(f, "recommendation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub stage: Stage,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub symbols: BTreeMap<String, RiskMetrics>,
    pub portfolio: Option<PortfolioRisk>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub config: AnalysisConfig,
    pub portfolio: PortfolioStats,
    pub risk: RiskReport,
    pub recommendations: BTreeMap<String, Recommendation>,
    pub skipped: Vec<SkippedSymbol>,
}

type StageResults<T> = (BTreeMap<String, T>, Vec<SkippedSymbol>);

fn run_stage<T, F>(stage: Stage, symbols: Vec<&String>, f: F) -> StageResults<T>
where
    T: Send,
    F: Fn(&String) -> Result<T, AnalyzerError> + Sync,
{
    let outcomes: Vec<(String, Result<T, AnalyzerError>)> = symbols
        .into_par_iter()
        .map(|symbol| (symbol.clone(), f(symbol)))
        .collect();

    let mut ok = BTreeMap::new();
    let mut skipped = Vec::new();
    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(value) => {
                ok.insert(symbol, value);
            }
            Err(e) => {
                tracing::warn!(%symbol, %stage, error = %e, "skipping symbol");
                skipped.push(SkippedSymbol {
                    symbol,
                    stage,
                    reason: e.to_string(),
                });
            }
        }
    }
    (ok, skipped)
}

/// Runs returns, risk, recommendations and portfolio aggregation over `series`.
pub fn analyze(
    series: &BTreeMap<String, PriceSeries>,
    investment_amount: f64,
    config: &AnalysisConfig,
    proxy: &MarketProxy,
) -> Result<AnalysisReport, AnalyzerError> {
    if series.is_empty() {
        return Err(AnalyzerError::EmptyPortfolio);
    }
    tracing::info!(symbols = series.len(), "analysing portfolio");

    let (returns, mut skipped): StageResults<ReturnSeries> =
        run_stage(Stage::Returns, series.keys().collect(), |symbol| {
            compute_returns(&series[symbol])
        });

    let usable: Vec<&String> = returns.keys().collect();

    let (risk, risk_skipped) = run_stage(Stage::Risk, usable.clone(), |symbol| {
        RiskMetrics::compute(&series[symbol], &returns[symbol], proxy, config)
    });
    skipped.extend(risk_skipped);

    let (recommendations, rec_skipped) = run_stage(Stage::Recommendation, usable, |symbol| {
        recommend_series(&series[symbol], config)
    });
    skipped.extend(rec_skipped);

    let portfolio_risk = match compute_portfolio_risk(&returns, config) {
        Ok(block) => block,
        Err(e) => {
            tracing::warn!(error = %e, "omitting portfolio risk block");
            skipped.push(SkippedSymbol {
                symbol: PORTFOLIO_KEY.to_string(),
                stage: Stage::PortfolioRisk,
                reason: e.to_string(),
            });
            None
        }
    };

    let usable_series: BTreeMap<String, PriceSeries> = returns
        .keys()
        .map(|symbol| (symbol.clone(), series[symbol].clone()))
        .collect();
    let portfolio =
        PortfolioStats::from_returns(&usable_series, &returns, investment_amount, config)?;

    tracing::info!(
        analysed = returns.len(),
        skipped = skipped.len(),
        total_return = portfolio.total_return,
        "analysis complete"
    );

    Ok(AnalysisReport {
        config: config.clone(),
        portfolio,
        risk: RiskReport {
            symbols: risk,
            portfolio: portfolio_risk,
        },
        recommendations,
        skipped,
    })
}
