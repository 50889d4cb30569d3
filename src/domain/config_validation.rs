//! Configuration validation.
//!
//! Checks the `[analysis]`, `[data]` and `[portfolio]` sections before any
//! data is fetched.

use crate::domain::config::{BetaMode, FallbackMode};
use crate::domain::error::AnalyzerError;
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), AnalyzerError> {
    validate_risk_free_rate(config)?;
    validate_periods(config)?;
    validate_var_confidence(config)?;
    let beta_mode = validate_modes(config)?;
    validate_data_source(config)?;
    validate_codes(config)?;
    validate_window(config)?;
    if beta_mode == BetaMode::Benchmark {
        require_string(config, "data", "benchmark")?;
    }
    validate_investment_amount(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AnalyzerError {
    AnalyzerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, AnalyzerError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(AnalyzerError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), AnalyzerError> {
    let value = config.get_double("analysis", "risk_free_rate")?.unwrap_or(0.02);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "analysis",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), AnalyzerError> {
    for (key, default) in [
        ("rsi_period", 14),
        ("sma_short", 20),
        ("sma_long", 50),
        ("trading_days", 252),
        ("legacy_beta_window", 20),
    ] {
        let value = config.get_int("analysis", key)?.unwrap_or(default);
        if value < 1 {
            return Err(invalid("analysis", key, format!("{key} must be at least 1")));
        }
    }

    let short = config.get_int("analysis", "sma_short")?.unwrap_or(20);
    let long = config.get_int("analysis", "sma_long")?.unwrap_or(50);
    if short >= long {
        return Err(invalid(
            "analysis",
            "sma_short",
            "sma_short must be shorter than sma_long",
        ));
    }
    Ok(())
}

fn validate_var_confidence(config: &dyn ConfigPort) -> Result<(), AnalyzerError> {
    let value = config.get_double("analysis", "var_confidence")?.unwrap_or(0.95);
    if value <= 0.0 || value >= 1.0 {
        return Err(invalid(
            "analysis",
            "var_confidence",
            "var_confidence must be strictly between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_modes(config: &dyn ConfigPort) -> Result<BetaMode, AnalyzerError> {
    if let Some(raw) = config.get_string("analysis", "fallback_mode") {
        raw.parse::<FallbackMode>()
            .map_err(|e| invalid("analysis", "fallback_mode", e.to_string()))?;
    }
    match config.get_string("analysis", "beta_mode") {
        Some(raw) => raw
            .parse::<BetaMode>()
            .map_err(|e| invalid("analysis", "beta_mode", e.to_string())),
        None => Ok(BetaMode::default()),
    }
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), AnalyzerError> {
    require_string(config, "data", "data_dir")?;
    require_string(config, "data", "exchange")?;
    Ok(())
}

fn validate_codes(config: &dyn ConfigPort) -> Result<(), AnalyzerError> {
    let codes = require_string(config, "data", "codes")?;
    parse_codes(&codes).map_err(|e| invalid("data", "codes", e.to_string()))?;
    Ok(())
}

fn validate_window(config: &dyn ConfigPort) -> Result<(), AnalyzerError> {
    let lookback = config.get_int("data", "lookback_days")?.unwrap_or(365);
    if lookback < 1 {
        return Err(invalid(
            "data",
            "lookback_days",
            "lookback_days must be at least 1",
        ));
    }
    if let Some(raw) = config.get_string("data", "end_date") {
        parse_date(&raw, "data", "end_date")?;
    }
    Ok(())
}

fn validate_investment_amount(config: &dyn ConfigPort) -> Result<(), AnalyzerError> {
    let value = config.get_double("portfolio", "investment_amount")?.unwrap_or(10_000.0);
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(
            "portfolio",
            "investment_amount",
            "investment_amount must be positive",
        ));
    }
    Ok(())
}

pub(crate) fn parse_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, AnalyzerError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        invalid(
            section,
            key,
            format!("invalid {key} format, expected YYYY-MM-DD"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    const DATA: &str = "[data]\ndata_dir = ./data\nexchange = NASDAQ\ncodes = AAPL,MSFT\n";

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn with_data(extra: &str) -> FileConfigAdapter {
        make_config(&format!("{DATA}{extra}"))
    }

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[analysis]
risk_free_rate = 0.03
rsi_period = 14
sma_short = 10
sma_long = 30
var_confidence = 0.99
fallback_mode = strict
beta_mode = benchmark

[data]
data_dir = ./data
exchange = NASDAQ
codes = AAPL,MSFT,GOOGL
lookback_days = 180
end_date = 2024-12-31
benchmark = SPY

[portfolio]
investment_amount = 50000
"#,
        );
        assert!(validate_analysis_config(&config).is_ok());
    }

    #[test]
    fn data_section_alone_is_enough() {
        assert!(validate_analysis_config(&with_data("")).is_ok());
    }

    #[test]
    fn risk_free_rate_out_of_range_fails() {
        let err = validate_analysis_config(&with_data("[analysis]\nrisk_free_rate = 1.5\n"))
            .unwrap_err();
        assert!(
            matches!(err, AnalyzerError::ConfigInvalid { key, .. } if key == "risk_free_rate")
        );
    }

    #[test]
    fn zero_rsi_period_fails() {
        let err =
            validate_analysis_config(&with_data("[analysis]\nrsi_period = 0\n")).unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigInvalid { key, .. } if key == "rsi_period"));
    }

    #[test]
    fn sma_short_must_be_shorter() {
        let err = validate_analysis_config(&with_data(
            "[analysis]\nsma_short = 50\nsma_long = 20\n",
        ))
        .unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigInvalid { key, .. } if key == "sma_short"));
    }

    #[test]
    fn var_confidence_bounds() {
        for value in ["0", "1", "1.2"] {
            let err = validate_analysis_config(&with_data(&format!(
                "[analysis]\nvar_confidence = {value}\n"
            )))
            .unwrap_err();
            assert!(
                matches!(err, AnalyzerError::ConfigInvalid { key, .. } if key == "var_confidence")
            );
        }
    }

    #[test]
    fn unknown_modes_fail() {
        let err = validate_analysis_config(&with_data("[analysis]\nfallback_mode = loose\n"))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigInvalid { key, .. } if key == "fallback_mode"));

        let err =
            validate_analysis_config(&with_data("[analysis]\nbeta_mode = market\n")).unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigInvalid { key, .. } if key == "beta_mode"));
    }

    #[test]
    fn missing_data_dir_fails() {
        let config = make_config("[data]\nexchange = NASDAQ\ncodes = AAPL\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigMissing { key, .. } if key == "data_dir"));
    }

    #[test]
    fn missing_exchange_fails() {
        let config = make_config("[data]\ndata_dir = ./data\ncodes = AAPL\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigMissing { key, .. } if key == "exchange"));
    }

    #[test]
    fn missing_codes_fails() {
        let config = make_config("[data]\ndata_dir = ./data\nexchange = NASDAQ\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigMissing { key, .. } if key == "codes"));
    }

    #[test]
    fn duplicate_codes_fail() {
        let config = make_config("[data]\ndata_dir = ./data\nexchange = NASDAQ\ncodes = AAPL,aapl\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(
            matches!(err, AnalyzerError::ConfigInvalid { key, reason, .. } if key == "codes" && reason.contains("AAPL"))
        );
    }

    #[test]
    fn bad_end_date_fails() {
        let err =
            validate_analysis_config(&make_config(&format!("{DATA}end_date = 2024/12/31\n")))
                .unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigInvalid { key, .. } if key == "end_date"));
    }

    #[test]
    fn zero_lookback_fails() {
        let err = validate_analysis_config(&make_config(&format!("{DATA}lookback_days = 0\n")))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigInvalid { key, .. } if key == "lookback_days"));
    }

    #[test]
    fn benchmark_mode_requires_benchmark_code() {
        let err = validate_analysis_config(&with_data("[analysis]\nbeta_mode = benchmark\n"))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigMissing { key, .. } if key == "benchmark"));
    }

    #[test]
    fn non_positive_investment_fails() {
        let err = validate_analysis_config(&with_data("[portfolio]\ninvestment_amount = 0\n"))
            .unwrap_err();
        assert!(
            matches!(err, AnalyzerError::ConfigInvalid { key, .. } if key == "investment_amount")
        );
    }

    #[test]
    fn malformed_numbers_are_rejected_not_defaulted() {
        for (section, key, raw) in [
            ("analysis", "rsi_period", "abc"),
            ("analysis", "risk_free_rate", "2%"),
            ("analysis", "sma_short", "5.5"),
            ("analysis", "var_confidence", "high"),
            ("analysis", "legacy_beta_window", "twenty"),
            ("data", "lookback_days", "1y"),
            ("portfolio", "investment_amount", "$10k"),
        ] {
            let content = if section == "data" {
                format!("{DATA}{key} = {raw}\n")
            } else {
                format!("{DATA}[{section}]\n{key} = {raw}\n")
            };
            let err = validate_analysis_config(&make_config(&content)).unwrap_err();
            assert!(
                matches!(&err, AnalyzerError::ConfigInvalid { key: k, reason, .. } if k == key && reason.contains(raw)),
                "{key} = {raw} gave {err:?}"
            );
        }
    }

    #[test]
    fn parse_date_accepts_iso() {
        assert_eq!(
            parse_date(" 2024-03-01 ", "data", "end_date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }
}
