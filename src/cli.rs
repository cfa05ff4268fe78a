//! CLI definition and dispatch.

use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_data_adapter::CsvDataAdapter;
use crate::adapters::csv_results_adapter::{CsvResultsAdapter, TIMESTAMP_FORMAT};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::adapters::http_data_adapter::HttpDataAdapter;
use crate::domain::analysis::Summary;
use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::config_validation::validate_run_config;
use crate::domain::error::GaptraderError;
use crate::domain::metrics::{Metrics, RunParams, StatsRecord};
use crate::domain::ohlcv::{filter_lookback, Granularity};
use crate::domain::strategy::OvernightGap;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::results_port::ResultsPort;

#[derive(Parser, Debug)]
#[command(name = "gaptrader", about = "Overnight-gap strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the strategy over historical data and record the results
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Ticker to trade (overrides config)
        #[arg(short, long)]
        ticker: Option<String>,
        /// Amount spent per entry (overrides config)
        #[arg(short, long)]
        investment: Option<f64>,
        /// Lookback window in years (overrides config)
        #[arg(short, long)]
        years: Option<u32>,
        /// Bar granularity: daily, weekly or monthly
        #[arg(short, long)]
        granularity: Option<String>,
        /// Directory holding stats files
        #[arg(long)]
        results_dir: Option<PathBuf>,
        /// Read price CSVs from this directory instead of downloading
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Skip the HTML report
        #[arg(long)]
        no_visualize: bool,
        /// Skip writing the stats file
        #[arg(long)]
        no_save: bool,
    },
    /// Download a ticker's raw CSV into the local cache directory
    Fetch {
        ticker: String,
        /// Directory to write <TICKER>.csv into (default: [data] cache_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Aggregate saved stats files into a strategy summary
    Analyze {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory holding stats files (default: [results] dir)
        #[arg(long)]
        results_dir: Option<PathBuf>,
        /// Summary format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// Skip the comparison charts
        #[arg(long)]
        no_plot: bool,
    },
    /// List tickers with a configured data source
    ListTickers {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            ticker,
            investment,
            years,
            granularity,
            results_dir,
            data_dir,
            no_visualize,
            no_save,
        } => run_strategy(
            config.as_ref(),
            ticker.as_deref(),
            investment,
            years,
            granularity.as_deref(),
            results_dir,
            data_dir,
            no_visualize,
            no_save,
        ),
        Command::Fetch {
            ticker,
            output,
            config,
        } => run_fetch(&ticker, output, config.as_ref()),
        Command::Analyze {
            config,
            results_dir,
            format,
            no_plot,
        } => run_analyze(config.as_ref(), results_dir, &format, no_plot),
        Command::ListTickers { config, data_dir } => {
            run_list_tickers(config.as_ref(), data_dir)
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = GaptraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_config_or_empty(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            load_config(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Flag beats config beats default.
pub fn build_run_params(
    adapter: &dyn ConfigPort,
    investment_override: Option<f64>,
    years_override: Option<u32>,
) -> RunParams {
    RunParams {
        investment_amount: investment_override
            .unwrap_or_else(|| adapter.get_double("strategy", "investment_amount", 10_000.0)),
        lookback_years: years_override
            .unwrap_or_else(|| adapter.get_int("strategy", "lookback_years", 5).max(0) as u32),
        initial_cash: adapter.get_double("backtest", "initial_cash", 100_000.0),
        commission_pct: adapter.get_double("backtest", "commission_pct", 0.001),
    }
}

pub fn resolve_ticker(ticker_override: Option<&str>, adapter: &dyn ConfigPort) -> String {
    ticker_override
        .map(str::to_string)
        .or_else(|| adapter.get_string("strategy", "ticker"))
        .unwrap_or_else(|| "TSLA".to_string())
        .to_uppercase()
}

pub fn resolve_granularity(
    granularity_override: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<Granularity, GaptraderError> {
    let value = granularity_override
        .map(str::to_string)
        .or_else(|| adapter.get_string("data", "granularity"));

    match value {
        Some(v) => v
            .parse::<Granularity>()
            .map_err(|reason| GaptraderError::ConfigInvalid {
                section: "data".into(),
                key: "granularity".into(),
                reason,
            }),
        None => Ok(Granularity::Daily),
    }
}

/// Flag beats `[results] dir` beats `results/`.
pub fn resolve_results_dir(flag: Option<PathBuf>, adapter: &dyn ConfigPort) -> PathBuf {
    flag.or_else(|| adapter.get_string("results", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("results"))
}

/// Flag beats `[data] cache_dir` beats `data/`.
pub fn resolve_cache_dir(flag: Option<PathBuf>, adapter: &dyn ConfigPort) -> PathBuf {
    flag.or_else(|| adapter.get_string("data", "cache_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn build_data_port(
    adapter: &FileConfigAdapter,
    data_dir: Option<PathBuf>,
) -> Box<dyn DataPort> {
    let dir = data_dir.or_else(|| adapter.get_string("data", "cache_dir").map(PathBuf::from));
    match dir {
        Some(d) => Box::new(CsvDataAdapter::new(d)),
        None => Box::new(HttpDataAdapter::with_overrides(
            adapter.section_map("urls"),
        )),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_strategy(
    config_path: Option<&PathBuf>,
    ticker_override: Option<&str>,
    investment_override: Option<f64>,
    years_override: Option<u32>,
    granularity_override: Option<&str>,
    results_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    no_visualize: bool,
    no_save: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    let adapter = match load_config_or_empty(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_run_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Resolve run parameters
    let params = build_run_params(&adapter, investment_override, years_override);
    if params.investment_amount <= 0.0 {
        eprintln!("error: investment must be positive");
        return ExitCode::from(2);
    }
    if params.lookback_years < 1 {
        eprintln!("error: years must be at least 1");
        return ExitCode::from(2);
    }

    let ticker = resolve_ticker(ticker_override, &adapter);
    let granularity = match resolve_granularity(granularity_override, &adapter) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Fetch price history
    eprintln!("Fetching {ticker} ({granularity} bars)...");
    let data_port = build_data_port(&adapter, data_dir);
    let bars = match data_port.fetch_bars(&ticker, granularity) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let today = Local::now().date_naive();
    let bars = filter_lookback(bars, params.lookback_years, today);
    if bars.is_empty() {
        let e = GaptraderError::NoData { ticker };
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!(
        "  {} bars, {} to {}",
        bars.len(),
        bars[0].date,
        bars[bars.len() - 1].date,
    );

    // Stage 4: Run the backtest
    let bt_config = BacktestConfig {
        initial_cash: params.initial_cash,
        commission_pct: params.commission_pct,
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", 0.0),
    };
    let mut strategy = OvernightGap::new(params.investment_amount);

    eprintln!(
        "Running backtest: investing {:.0} per bar, {:.0} starting cash",
        params.investment_amount, params.initial_cash,
    );
    let result = match run_backtest(&bars, &mut strategy, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: Compute metrics and print a summary
    let metrics = Metrics::compute(&result.portfolio, bt_config.risk_free_rate);

    eprintln!("\n=== Results: {} ===", result.ticker);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!(
        "Annualized:       {:.2}%",
        metrics.annualized_return * 100.0
    );
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", metrics.sortino_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    eprintln!("Final Equity:     {:.2}", metrics.final_equity);

    let run_at = Local::now().naive_local();
    let results_dir = resolve_results_dir(results_dir, &adapter);
    let results_port = CsvResultsAdapter::new(results_dir.clone());

    // Stage 6: Persist the stats row
    if no_save {
        eprintln!("\nSkipping save (--no-save)");
    } else {
        let record = StatsRecord::from_result(&result, &metrics, &params, run_at);
        match results_port.save_stats(&record, run_at) {
            Ok(path) => eprintln!("\nStats written to: {}", path.display()),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    // Stage 7: Write the HTML report
    if no_visualize {
        eprintln!("Skipping report (--no-visualize)");
    } else {
        let report_path =
            results_dir.join(format!("report_{}.html", run_at.format(TIMESTAMP_FORMAT)));
        if let Err(e) = fs::create_dir_all(&results_dir) {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
        if let Err(e) = HtmlReportAdapter::new().write_run_report(&result, &metrics, &report_path)
        {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Report written to: {}", report_path.display());
    }

    ExitCode::SUCCESS
}

fn run_fetch(ticker: &str, output: Option<PathBuf>, config_path: Option<&PathBuf>) -> ExitCode {
    let adapter = match load_config_or_empty(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let output = resolve_cache_dir(output, &adapter);
    let http = HttpDataAdapter::with_overrides(adapter.section_map("urls"));

    eprintln!("Downloading {}...", ticker.to_uppercase());
    let body = match http.download_raw(ticker) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if let Err(e) = fs::create_dir_all(&output) {
        eprintln!("error: {e}");
        return ExitCode::from(1);
    }
    let path = output.join(format!("{}.csv", ticker.to_uppercase()));
    if let Err(e) = fs::write(&path, &body) {
        eprintln!("error: {e}");
        return ExitCode::from(1);
    }

    eprintln!("Saved to: {}", path.display());
    ExitCode::SUCCESS
}

fn run_analyze(
    config_path: Option<&PathBuf>,
    results_dir: Option<PathBuf>,
    format: &str,
    no_plot: bool,
) -> ExitCode {
    if format != "csv" && format != "json" {
        eprintln!("error: unknown format {format:?} (expected csv or json)");
        return ExitCode::from(2);
    }

    let adapter = match load_config_or_empty(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let results_dir = resolve_results_dir(results_dir, &adapter);
    let results_port = CsvResultsAdapter::new(results_dir.clone());

    eprintln!("Loading results from {}", results_dir.display());
    let records = match results_port.load_all() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if records.is_empty() {
        let e = GaptraderError::NoResults {
            dir: results_dir.display().to_string(),
        };
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("  {} run(s) found", records.len());

    let analyzed_at = Local::now().naive_local();
    let summary = match Summary::aggregate(&records, analyzed_at) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Strategy Summary: {} ===", summary.ticker);
    eprintln!("Runs:             {}", summary.num_runs);
    eprintln!("Avg Return:       {:.2}%", summary.avg_return_pct);
    eprintln!("Avg Sharpe:       {:.2}", summary.avg_sharpe_ratio);
    eprintln!("Avg Max Drawdown: -{:.1}%", summary.avg_max_drawdown_pct);
    eprintln!("Avg Win Rate:     {:.1}%", summary.avg_win_rate_pct);
    eprintln!("Avg # Trades:     {:.0}", summary.avg_num_trades);

    let saved = if format == "json" {
        results_port.save_summary_json(&summary, analyzed_at)
    } else {
        results_port.save_summary_csv(&summary, analyzed_at)
    };
    match saved {
        Ok(path) => eprintln!("\nSummary written to: {}", path.display()),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    if !no_plot {
        let report_path = results_dir.join(format!(
            "performance_{}.html",
            analyzed_at.format(TIMESTAMP_FORMAT)
        ));
        if let Err(e) =
            HtmlReportAdapter::new().write_analysis_report(&records, &summary, &report_path)
        {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Charts written to: {}", report_path.display());
    }

    ExitCode::SUCCESS
}

fn run_list_tickers(config_path: Option<&PathBuf>, data_dir: Option<PathBuf>) -> ExitCode {
    let adapter = match load_config_or_empty(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_port = build_data_port(&adapter, data_dir);
    let tickers = match data_port.list_tickers() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if tickers.is_empty() {
        eprintln!("No tickers configured");
    } else {
        for ticker in &tickers {
            println!("{ticker}");
        }
        eprintln!("{} ticker(s) available", tickers.len());
    }
    ExitCode::SUCCESS
}
