//! CLI definition and dispatch.

use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::analysis::{analyze, AnalysisReport, SkippedSymbol, Stage};
use crate::domain::config::{AnalysisConfig, BetaMode, FallbackMode};
use crate::domain::config_validation::{parse_date, validate_analysis_config};
use crate::domain::error::AnalyzerError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::returns::compute_returns;
use crate::domain::risk::MarketProxy;
use crate::domain::universe::{load_universe, parse_codes};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "portfolio-analyzer",
    about = "Returns, risk and signal analysis for an equal-weight portfolio"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyse the configured portfolio and emit a JSON report
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated codes, replacing [data] codes
        #[arg(long)]
        codes: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
        /// Amount split equally across the analysed symbols
        #[arg(long)]
        investment: Option<f64>,
        /// Report path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List available symbols on an exchange
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        exchange: Option<String>,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Analyze {
            config,
            codes,
            exchange,
            investment,
            output,
        } => run_analyze(
            &config,
            codes.as_deref(),
            exchange.as_deref(),
            investment,
            output.as_deref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, exchange } => run_list_symbols(&config, exchange.as_deref()),
        Command::Info {
            config,
            code,
            exchange,
        } => run_info(&config, code.as_deref(), exchange.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AnalyzerError> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Where the data lives and which window of it to analyse (`[data]`).
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub data_dir: PathBuf,
    pub exchange: String,
    pub codes: Vec<String>,
    pub lookback_days: u64,
    pub end_date: Option<NaiveDate>,
    pub benchmark: Option<String>,
}

impl DataSettings {
    /// Inclusive (start, end) window, `end` defaulting to `today`.
    pub fn window(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AnalyzerError> {
        let end = self.end_date.unwrap_or(today);
        let start = end
            .checked_sub_days(Days::new(self.lookback_days))
            .ok_or_else(|| AnalyzerError::ConfigInvalid {
                section: "data".into(),
                key: "lookback_days".into(),
                reason: "lookback window starts before the earliest representable date".into(),
            })?;
        Ok((start, end))
    }
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, AnalyzerError> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AnalyzerError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })
}

fn invalid_codes(reason: String) -> AnalyzerError {
    AnalyzerError::ConfigInvalid {
        section: "data".into(),
        key: "codes".into(),
        reason,
    }
}

pub fn build_analysis_config(adapter: &dyn ConfigPort) -> Result<AnalysisConfig, AnalyzerError> {
    let defaults = AnalysisConfig::default();

    let fallback_mode = match adapter.get_string("analysis", "fallback_mode") {
        Some(raw) => raw
            .parse::<FallbackMode>()
            .map_err(|e| AnalyzerError::ConfigInvalid {
                section: "analysis".into(),
                key: "fallback_mode".into(),
                reason: e.to_string(),
            })?,
        None => defaults.fallback_mode,
    };
    let beta_mode = match adapter.get_string("analysis", "beta_mode") {
        Some(raw) => raw
            .parse::<BetaMode>()
            .map_err(|e| AnalyzerError::ConfigInvalid {
                section: "analysis".into(),
                key: "beta_mode".into(),
                reason: e.to_string(),
            })?,
        None => defaults.beta_mode,
    };

    Ok(AnalysisConfig {
        risk_free_rate: adapter
            .get_double("analysis", "risk_free_rate")?
            .unwrap_or(defaults.risk_free_rate),
        rsi_period: adapter.get_usize("analysis", "rsi_period")?.unwrap_or(defaults.rsi_period),
        sma_short: adapter.get_usize("analysis", "sma_short")?.unwrap_or(defaults.sma_short),
        sma_long: adapter.get_usize("analysis", "sma_long")?.unwrap_or(defaults.sma_long),
        var_confidence: adapter
            .get_double("analysis", "var_confidence")?
            .unwrap_or(defaults.var_confidence),
        trading_days: adapter
            .get_usize("analysis", "trading_days")?
            .unwrap_or(defaults.trading_days),
        fallback_mode,
        beta_mode,
        legacy_beta_window: adapter
            .get_usize("analysis", "legacy_beta_window")?
            .unwrap_or(defaults.legacy_beta_window),
    })
}

pub fn build_data_settings(adapter: &dyn ConfigPort) -> Result<DataSettings, AnalyzerError> {
    let codes = parse_codes(&required(adapter, "data", "codes")?)
        .map_err(|e| invalid_codes(e.to_string()))?;
    let end_date = match adapter.get_string("data", "end_date") {
        Some(raw) => Some(parse_date(&raw, "data", "end_date")?),
        None => None,
    };

    Ok(DataSettings {
        data_dir: PathBuf::from(required(adapter, "data", "data_dir")?),
        exchange: required(adapter, "data", "exchange")?,
        codes,
        lookback_days: adapter
            .get_usize("data", "lookback_days")?
            .map_or(365, |days| days as u64),
        end_date,
        benchmark: adapter
            .get_string("data", "benchmark")
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty()),
    })
}

pub fn investment_amount(adapter: &dyn ConfigPort) -> Result<f64, AnalyzerError> {
    Ok(adapter
        .get_double("portfolio", "investment_amount")?
        .unwrap_or(10_000.0))
}

/// Builds the beta reference selected by `config.beta_mode`.
pub fn build_market_proxy(
    data_port: &dyn DataPort,
    config: &AnalysisConfig,
    settings: &DataSettings,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<MarketProxy, AnalyzerError> {
    match config.beta_mode {
        BetaMode::None => Ok(MarketProxy::None),
        BetaMode::Legacy => Ok(MarketProxy::Legacy {
            window: config.legacy_beta_window,
        }),
        BetaMode::Benchmark => {
            let code = settings
                .benchmark
                .as_deref()
                .ok_or_else(|| AnalyzerError::ConfigMissing {
                    section: "data".into(),
                    key: "benchmark".into(),
                })?;
            let bars = data_port.fetch_ohlcv(code, &settings.exchange, start, end)?;
            if bars.is_empty() {
                return Err(AnalyzerError::NoData {
                    code: code.to_string(),
                    exchange: settings.exchange.clone(),
                });
            }
            let returns = compute_returns(&PriceSeries::new(code, bars)?)?;
            tracing::info!(benchmark = %code, returns = returns.len(), "loaded benchmark");
            Ok(MarketProxy::Benchmark(returns))
        }
    }
}

/// Loads the universe, analyses it and merges load-time skips into the report.
pub fn run_analysis_pipeline(
    data_port: &dyn DataPort,
    config: &AnalysisConfig,
    settings: &DataSettings,
    investment: f64,
    today: NaiveDate,
) -> Result<AnalysisReport, AnalyzerError> {
    let (start, end) = settings.window(today)?;
    tracing::info!(
        codes = settings.codes.len(),
        exchange = %settings.exchange,
        %start,
        %end,
        "loading universe"
    );

    let universe = load_universe(data_port, &settings.codes, &settings.exchange, start, end)?;
    let proxy = build_market_proxy(data_port, config, settings, start, end)?;

    let mut report = analyze(&universe.series, investment, config, &proxy)?;
    let mut skipped: Vec<SkippedSymbol> = universe
        .skipped
        .into_iter()
        .map(|s| SkippedSymbol {
            symbol: s.code,
            stage: Stage::Load,
            reason: s.reason.to_string(),
        })
        .collect();
    skipped.append(&mut report.skipped);
    report.skipped = skipped;
    Ok(report)
}

fn print_summary(report: &AnalysisReport) {
    let p = &report.portfolio;
    eprintln!("\n=== Portfolio ===");
    eprintln!("Investment:       {:.2}", p.investment_amount);
    eprintln!("Total Return:     {:.2}%", p.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", p.annualized_return * 100.0);
    eprintln!("Volatility:       {:.2}%", p.volatility * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", p.sharpe_ratio);
    if let Some(block) = &report.risk.portfolio {
        eprintln!("Portfolio Vol:    {:.2}%", block.portfolio_volatility * 100.0);
        eprintln!("Diversification:  {:.2}", block.diversification_ratio);
    }

    eprintln!("\n=== Per-Symbol Summary ===");
    for (symbol, stats) in &p.symbols {
        let risk = report
            .risk
            .symbols
            .get(symbol)
            .map(|r| {
                format!(
                    "vol {:.1}%, max dd {:.1}%, sharpe {:.2}",
                    r.volatility * 100.0,
                    r.max_drawdown * 100.0,
                    r.sharpe_ratio
                )
            })
            .unwrap_or_else(|| "risk n/a".to_string());
        let signal = report
            .recommendations
            .get(symbol)
            .map(|r| r.overall_sentiment.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        eprintln!(
            "  {}:  {:+.2}%, {}, {}, allocation {:.2}",
            symbol,
            stats.total_return * 100.0,
            risk,
            signal,
            stats.allocation
        );
    }

    if !report.skipped.is_empty() {
        eprintln!("\n=== Skipped ===");
        for s in &report.skipped {
            eprintln!("  {} ({}): {}", s.symbol, s.stage, s.reason);
        }
    }
}

fn run_analyze(
    config_path: &Path,
    codes_override: Option<&str>,
    exchange_override: Option<&str>,
    investment_override: Option<f64>,
    output_path: Option<&Path>,
) -> Result<(), AnalyzerError> {
    let adapter = load_config(config_path)?;
    validate_analysis_config(&adapter)?;

    let config = build_analysis_config(&adapter)?;
    let mut settings = build_data_settings(&adapter)?;
    if let Some(codes) = codes_override {
        settings.codes = parse_codes(codes).map_err(|e| invalid_codes(e.to_string()))?;
    }
    if let Some(exchange) = exchange_override {
        settings.exchange = exchange.to_string();
    }
    let investment = match investment_override {
        Some(amount) => amount,
        None => investment_amount(&adapter)?,
    };

    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let report = run_analysis_pipeline(
        &data_port,
        &config,
        &settings,
        investment,
        Local::now().date_naive(),
    )?;

    print_summary(&report);

    let writer = JsonReportAdapter::pretty();
    match output_path {
        Some(path) => {
            writer.write(&report, &path.to_string_lossy())?;
            eprintln!("\nReport written to: {}", path.display());
        }
        None => writer.write_to(&report, &mut io::stdout().lock())?,
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), AnalyzerError> {
    let adapter = load_config(config_path)?;
    validate_analysis_config(&adapter)?;
    let config = build_analysis_config(&adapter)?;
    let settings = build_data_settings(&adapter)?;

    eprintln!("Analysis:");
    eprintln!("  risk_free_rate: {}", config.risk_free_rate);
    eprintln!(
        "  indicators:     SMA({}), SMA({}), RSI({})",
        config.sma_short, config.sma_long, config.rsi_period
    );
    eprintln!("  var_confidence: {}", config.var_confidence);
    eprintln!("  beta_mode:      {}", config.beta_mode);
    eprintln!("\nUniverse:");
    eprintln!("  exchange: {}", settings.exchange);
    eprintln!("  codes:    {}", settings.codes.join(", "));
    eprintln!("  lookback: {} days", settings.lookback_days);
    eprintln!("\nInvestment: {:.2}", investment_amount(&adapter)?);
    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn data_dir(adapter: &dyn ConfigPort) -> Result<PathBuf, AnalyzerError> {
    required(adapter, "data", "data_dir").map(PathBuf::from)
}

fn resolve_exchange(
    exchange_override: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<String, AnalyzerError> {
    match exchange_override {
        Some(e) => Ok(e.to_string()),
        None => required(adapter, "data", "exchange"),
    }
}

fn run_list_symbols(config_path: &Path, exchange: Option<&str>) -> Result<(), AnalyzerError> {
    let adapter = load_config(config_path)?;
    let exchange = resolve_exchange(exchange, &adapter)?;
    let data_port = CsvAdapter::new(data_dir(&adapter)?);

    let symbols = data_port.list_symbols(&exchange)?;
    if symbols.is_empty() {
        eprintln!("No symbols found for exchange {}", exchange);
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_info(
    config_path: &Path,
    code: Option<&str>,
    exchange: Option<&str>,
) -> Result<(), AnalyzerError> {
    let adapter = load_config(config_path)?;
    let exchange = resolve_exchange(exchange, &adapter)?;
    let codes = match code {
        Some(c) => vec![c.trim().to_uppercase()],
        None => parse_codes(&required(&adapter, "data", "codes")?)
            .map_err(|e| invalid_codes(e.to_string()))?,
    };
    let data_port = CsvAdapter::new(data_dir(&adapter)?);

    for c in &codes {
        match data_port.get_data_range(c, &exchange) {
            Ok(Some((min_date, max_date, count))) => {
                println!(
                    "{}.{}: {} bars, {} to {}",
                    c, exchange, count, min_date, max_date
                );
            }
            Ok(None) => eprintln!("{}.{}: no data found", c, exchange),
            Err(e) => eprintln!("error querying {}.{}: {}", c, exchange, e),
        }
    }
    Ok(())
}
