//! Configuration validation.
//!
//! Validates all config fields before a run starts, so bad values fail with a
//! config error instead of surfacing mid-simulation.

use crate::domain::error::GaptraderError;
use crate::domain::ohlcv::Granularity;
use crate::ports::config_port::ConfigPort;

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), GaptraderError> {
    validate_investment_amount(config)?;
    validate_lookback_years(config)?;
    validate_initial_cash(config)?;
    validate_commission(config)?;
    validate_risk_free_rate(config)?;
    validate_granularity(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> GaptraderError {
    GaptraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_investment_amount(config: &dyn ConfigPort) -> Result<(), GaptraderError> {
    let value = config.get_double("strategy", "investment_amount", 10_000.0);
    if value <= 0.0 {
        return Err(invalid(
            "strategy",
            "investment_amount",
            "investment_amount must be positive",
        ));
    }
    Ok(())
}

fn validate_lookback_years(config: &dyn ConfigPort) -> Result<(), GaptraderError> {
    let value = config.get_int("strategy", "lookback_years", 5);
    if value < 1 {
        return Err(invalid(
            "strategy",
            "lookback_years",
            "lookback_years must be at least 1",
        ));
    }
    Ok(())
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), GaptraderError> {
    let value = config.get_double("backtest", "initial_cash", 100_000.0);
    if value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), GaptraderError> {
    let value = config.get_double("backtest", "commission_pct", 0.001);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "commission_pct",
            "commission_pct must be a fraction in [0, 1)",
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), GaptraderError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.0);
    if value < 0.0 {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be non-negative",
        ));
    }
    Ok(())
}

fn validate_granularity(config: &dyn ConfigPort) -> Result<(), GaptraderError> {
    if let Some(value) = config.get_string("data", "granularity") {
        value
            .parse::<Granularity>()
            .map_err(|reason| invalid("data", "granularity", &reason))?;
    }
    Ok(())
}
