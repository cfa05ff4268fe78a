use std::fs;
use std::io::Write;

use gaptrader::adapters::file_config_adapter::FileConfigAdapter;
use gaptrader::adapters::http_data_adapter::HttpDataAdapter;
use gaptrader::cli::{build_run_params, resolve_granularity, resolve_ticker};
use gaptrader::domain::config_validation::validate_run_config;
use gaptrader::domain::ohlcv::Granularity;
use gaptrader::ports::config_port::ConfigPort;
use gaptrader::ports::data_port::DataPort;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn full_config_loads_and_validates() {
    let file = write_config(
        "[strategy]\n\
         ticker = amzn\n\
         investment_amount = 25000\n\
         lookback_years = 3\n\
         \n\
         [backtest]\n\
         initial_cash = 50000\n\
         commission_pct = 0.002\n\
         risk_free_rate = 0.04\n\
         \n\
         [data]\n\
         granularity = weekly\n",
    );

    let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
    validate_run_config(&adapter).unwrap();

    let params = build_run_params(&adapter, None, None);
    assert_eq!(params.investment_amount, 25_000.0);
    assert_eq!(params.lookback_years, 3);
    assert_eq!(params.initial_cash, 50_000.0);
    assert_eq!(params.commission_pct, 0.002);

    assert_eq!(resolve_ticker(None, &adapter), "AMZN");
    assert_eq!(
        resolve_granularity(None, &adapter).unwrap(),
        Granularity::Weekly
    );
}

#[test]
fn flags_beat_config_values() {
    let file = write_config(
        "[strategy]\n\
         ticker = amzn\n\
         investment_amount = 25000\n\
         lookback_years = 3\n",
    );
    let adapter = FileConfigAdapter::from_file(file.path()).unwrap();

    let params = build_run_params(&adapter, Some(1_000.0), Some(10));
    assert_eq!(params.investment_amount, 1_000.0);
    assert_eq!(params.lookback_years, 10);

    assert_eq!(resolve_ticker(Some("fang"), &adapter), "FANG");
    assert_eq!(
        resolve_granularity(Some("monthly"), &adapter).unwrap(),
        Granularity::Monthly
    );
}

#[test]
fn invalid_config_fails_validation() {
    let file = write_config("[backtest]\ncommission_pct = 2.0\n");
    let adapter = FileConfigAdapter::from_file(file.path()).unwrap();

    let err = validate_run_config(&adapter).unwrap_err();
    assert!(err.to_string().contains("commission_pct"));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("nope.ini");
    assert!(FileConfigAdapter::from_file(&missing).is_err());
}

#[test]
fn url_overrides_flow_into_data_adapter() {
    let file = write_config(
        "[urls]\n\
         TSLA = https://mirror.example.com/tsla.csv\n\
         NVDA = https://mirror.example.com/nvda.csv\n",
    );
    let adapter = FileConfigAdapter::from_file(file.path()).unwrap();

    let http = HttpDataAdapter::with_overrides(adapter.section_map("urls"));
    let tickers = http.list_tickers().unwrap();

    // defaults plus the new entry, override shadowing the default
    assert!(tickers.contains(&"NVDA".to_string()));
    assert!(tickers.contains(&"AMZN".to_string()));
}

#[test]
fn comments_and_case_handled_by_config() {
    let file = write_config(
        "; strategy settings\n\
         [Strategy]\n\
         Investment_Amount = 7500\n",
    );
    let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
    let params = build_run_params(&adapter, None, None);
    assert_eq!(params.investment_amount, 7_500.0);
}

#[test]
fn analyze_reads_results_dir_from_config() {
    use chrono::NaiveDate;
    use gaptrader::adapters::csv_results_adapter::CsvResultsAdapter;
    use gaptrader::cli::{run, Cli, Command};
    use gaptrader::domain::metrics::{Metrics, RunParams, StatsRecord};
    use gaptrader::domain::portfolio::Portfolio;
    use gaptrader::ports::results_port::ResultsPort;

    let dir = tempfile::TempDir::new().unwrap();
    let results_dir = dir.path().join("my_results");

    // one saved run in the configured directory
    let mut portfolio = Portfolio::new(100_000.0);
    let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    portfolio.record_equity(date, 100.0);
    let metrics = Metrics::compute(&portfolio, 0.0);
    let result = gaptrader::domain::backtest::BacktestResult {
        ticker: "TSLA".into(),
        start_date: date,
        end_date: date,
        bars_processed: 1,
        portfolio,
    };
    let params = RunParams {
        investment_amount: 10_000.0,
        lookback_years: 5,
        initial_cash: 100_000.0,
        commission_pct: 0.001,
    };
    let run_at = date.and_hms_opt(9, 0, 0).unwrap();
    let record = StatsRecord::from_result(&result, &metrics, &params, run_at);
    CsvResultsAdapter::new(results_dir.clone())
        .save_stats(&record, run_at)
        .unwrap();

    let config_path = dir.path().join("gaptrader.ini");
    fs::write(
        &config_path,
        format!("[results]\ndir = {}\n", results_dir.display()),
    )
    .unwrap();

    // analyze with only --config must find the configured directory
    let code = run(Cli {
        command: Command::Analyze {
            config: Some(config_path),
            results_dir: None,
            format: "json".to_string(),
            no_plot: true,
        },
    });
    assert_eq!(
        format!("{code:?}"),
        format!("{:?}", std::process::ExitCode::SUCCESS)
    );

    let summary_written = fs::read_dir(&results_dir).unwrap().any(|e| {
        e.unwrap()
            .file_name()
            .to_string_lossy()
            .starts_with("strategy_summary_")
    });
    assert!(summary_written);
}

#[test]
fn example_config_file_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("gaptrader.ini");
    fs::write(
        &path,
        "[strategy]\nticker = TSLA\n[results]\ndir = my_results\n",
    )
    .unwrap();

    let adapter = FileConfigAdapter::from_file(&path).unwrap();
    assert_eq!(
        adapter.get_string("results", "dir"),
        Some("my_results".to_string())
    );
}
