//! Domain error types.

/// Top-level error type for portfolio-analyzer.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("insufficient data for {symbol}: have {have} points, need {need}")]
    InsufficientData {
        symbol: String,
        have: usize,
        need: usize,
    },

    #[error("degenerate series for {symbol}: close price {close} at index {index}")]
    DegenerateSeries {
        symbol: String,
        index: usize,
        close: f64,
    },

    #[error("degenerate metric {metric}: {reason}")]
    DegenerateMetric { metric: String, reason: String },

    #[error("portfolio has no symbols")]
    EmptyPortfolio,

    #[error("misaligned series: {symbol} has {len} returns, expected {expected}")]
    MisalignedSeries {
        symbol: String,
        len: usize,
        expected: usize,
    },

    #[error("invalid series for {symbol}: {reason}")]
    InvalidSeries { symbol: String, reason: String },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {code} on {exchange}")]
    NoData { code: String, exchange: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    pub(crate) fn degenerate(metric: &str, reason: &str) -> Self {
        AnalyzerError::DegenerateMetric {
            metric: metric.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn insufficient(symbol: &str, have: usize, need: usize) -> Self {
        AnalyzerError::InsufficientData {
            symbol: symbol.to_string(),
            have,
            need,
        }
    }
}

impl From<&AnalyzerError> for std::process::ExitCode {
    fn from(err: &AnalyzerError) -> Self {
        let code: u8 = match err {
            AnalyzerError::Io(_) | AnalyzerError::Serialization(_) => 1,
            AnalyzerError::ConfigParse { .. }
            | AnalyzerError::ConfigMissing { .. }
            | AnalyzerError::ConfigInvalid { .. }
            | AnalyzerError::InvalidParameter { .. } => 2,
            AnalyzerError::DataSource { .. } => 3,
            AnalyzerError::NoData { .. }
            | AnalyzerError::InsufficientData { .. }
            | AnalyzerError::InvalidSeries { .. }
            | AnalyzerError::DegenerateSeries { .. }
            | AnalyzerError::DegenerateMetric { .. }
            | AnalyzerError::EmptyPortfolio
            | AnalyzerError::MisalignedSeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
