//! Rule-based trend and sentiment classification from the latest indicators.

use serde::Serialize;
use std::fmt;

use crate::domain::config::AnalysisConfig;
use crate::domain::error::AnalyzerError;
use crate::domain::indicator::{IndicatorSet, IndicatorSnapshot};
use crate::domain::ohlcv::PriceSeries;

const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    #[serde(rename = "Strong Uptrend")]
    StrongUptrend,
    #[serde(rename = "Strong Downtrend")]
    StrongDowntrend,
    #[serde(rename = "Moderate Uptrend")]
    ModerateUptrend,
    #[serde(rename = "Moderate Downtrend")]
    ModerateDowntrend,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaSignal {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Hold,
    Sell,
    #[serde(rename = "Strong Sell")]
    StrongSell,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::StrongUptrend => "Strong Uptrend",
            Trend::StrongDowntrend => "Strong Downtrend",
            Trend::ModerateUptrend => "Moderate Uptrend",
            Trend::ModerateDowntrend => "Moderate Downtrend",
            Trend::Sideways => "Sideways",
        };
        f.write_str(label)
    }
}

impl fmt::Display for RsiSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RsiSignal::Overbought => "Overbought",
            RsiSignal::Oversold => "Oversold",
            RsiSignal::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}

impl fmt::Display for MaSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MaSignal::Bullish => "Bullish",
            MaSignal::Bearish => "Bearish",
            MaSignal::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sentiment::StrongBuy => "Strong Buy",
            Sentiment::Buy => "Buy",
            Sentiment::Hold => "Hold",
            Sentiment::Sell => "Sell",
            Sentiment::StrongSell => "Strong Sell",
        };
        f.write_str(label)
    }
}

/// Fully available readings the rules operate on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Signals {
    pub close: f64,
    pub prev_close: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub rsi: f64,
}

impl Signals {
    pub fn from_snapshot(symbol: &str, snap: &IndicatorSnapshot) -> Result<Self, AnalyzerError> {
        match (snap.sma_short, snap.sma_long, snap.rsi) {
            (Some(sma_short), Some(sma_long), Some(rsi)) => Ok(Signals {
                close: snap.close,
                prev_close: snap.prev_close,
                sma_short,
                sma_long,
                rsi,
            }),
            _ => Err(AnalyzerError::InsufficientData {
                symbol: symbol.to_string(),
                have: 0,
                need: 1,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub symbol: String,
    pub current_price: f64,
    pub price_change: f64,
    pub price_change_pct: f64,
    pub trend: Trend,
    pub rsi_signal: RsiSignal,
    pub moving_average_signal: MaSignal,
    pub overall_sentiment: Sentiment,
    pub sentiment_score: i32,
    pub signals: Signals,
}

pub fn classify_trend(s: &Signals) -> Trend {
    if s.close > s.sma_short && s.sma_short > s.sma_long {
        Trend::StrongUptrend
    } else if s.close < s.sma_short && s.sma_short < s.sma_long {
        Trend::StrongDowntrend
    } else if s.close > s.sma_short {
        Trend::ModerateUptrend
    } else if s.close < s.sma_short {
        Trend::ModerateDowntrend
    } else {
        Trend::Sideways
    }
}

pub fn classify_rsi(rsi: f64) -> RsiSignal {
    if rsi > RSI_OVERBOUGHT {
        RsiSignal::Overbought
    } else if rsi < RSI_OVERSOLD {
        RsiSignal::Oversold
    } else {
        RsiSignal::Neutral
    }
}

pub fn classify_moving_averages(s: &Signals) -> MaSignal {
    match classify_trend(s) {
        Trend::StrongUptrend => MaSignal::Bullish,
        Trend::StrongDowntrend => MaSignal::Bearish,
        _ => MaSignal::Neutral,
    }
}

pub fn sentiment_score(s: &Signals) -> i32 {
    let mut score = if s.close > s.prev_close { 1 } else { -1 };
    if s.rsi > RSI_OVERBOUGHT {
        score -= 1;
    } else if s.rsi < RSI_OVERSOLD {
        score += 1;
    }
    if s.close > s.sma_short {
        score += 1;
    }
    if s.close > s.sma_long {
        score += 1;
    }
    score
}

pub fn sentiment_from_score(score: i32) -> Sentiment {
    match score {
        s if s >= 2 => Sentiment::StrongBuy,
        1 => Sentiment::Buy,
        0 => Sentiment::Hold,
        -1 => Sentiment::Sell,
        _ => Sentiment::StrongSell,
    }
}

/// Classifies a set of latest readings. Pure function of its inputs.
pub fn recommend(symbol: &str, signals: Signals) -> Recommendation {
    let price_change = signals.close - signals.prev_close;
    let score = sentiment_score(&signals);
    Recommendation {
        symbol: symbol.to_string(),
        current_price: signals.close,
        price_change,
        price_change_pct: price_change / signals.prev_close * 100.0,
        trend: classify_trend(&signals),
        rsi_signal: classify_rsi(signals.rsi),
        moving_average_signal: classify_moving_averages(&signals),
        overall_sentiment: sentiment_from_score(score),
        sentiment_score: score,
        signals,
    }
}

/// Computes indicators for the series and classifies its latest bar.
pub fn recommend_series(
    series: &PriceSeries,
    config: &AnalysisConfig,
) -> Result<Recommendation, AnalyzerError> {
    let set = IndicatorSet::compute(series, config)?;
    let snapshot = set.snapshot(series)?;
    let signals = Signals::from_snapshot(series.symbol(), &snapshot)?;
    Ok(recommend(series.symbol(), signals))
}
