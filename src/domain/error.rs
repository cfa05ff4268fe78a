//! Domain error types.

/// Top-level error type for gaptrader.
#[derive(Debug, thiserror::Error)]
pub enum GaptraderError {
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

    #[error("no download URL configured for ticker {ticker}")]
    UnknownTicker { ticker: String },

    #[error("failed to fetch data for {ticker}: {reason}")]
    Fetch { ticker: String, reason: String },

    #[error("malformed price data for {ticker}: {reason}")]
    DataFormat { ticker: String, reason: String },

    #[error("no bars for {ticker} within the lookback window")]
    NoData { ticker: String },

    #[error("results error: {reason}")]
    Results { reason: String },

    #[error("no result files found in {dir}")]
    NoResults { dir: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&GaptraderError> for std::process::ExitCode {
    fn from(err: &GaptraderError) -> Self {
        let code: u8 = match err {
            GaptraderError::Io(_) => 1,
            GaptraderError::ConfigParse { .. }
            | GaptraderError::ConfigMissing { .. }
            | GaptraderError::ConfigInvalid { .. } => 2,
            GaptraderError::UnknownTicker { .. } | GaptraderError::Fetch { .. } => 3,
            GaptraderError::DataFormat { .. } | GaptraderError::NoData { .. } => 4,
            GaptraderError::Results { .. } | GaptraderError::NoResults { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let err = GaptraderError::ConfigMissing {
            section: "strategy".into(),
            key: "ticker".into(),
        };
        assert_eq!(err.to_string(), "missing config key [strategy] ticker");

        let err = GaptraderError::UnknownTicker {
            ticker: "NVDA".into(),
        };
        assert!(err.to_string().contains("NVDA"));
    }

    // ExitCode has no PartialEq, so compare Debug renderings.
    fn code_of(err: &GaptraderError) -> String {
        format!("{:?}", std::process::ExitCode::from(err))
    }

    #[test]
    fn exit_codes() {
        let fetch = GaptraderError::Fetch {
            ticker: "TSLA".into(),
            reason: "timeout".into(),
        };
        assert_eq!(code_of(&fetch), format!("{:?}", std::process::ExitCode::from(3)));

        let no_data = GaptraderError::NoData {
            ticker: "TSLA".into(),
        };
        assert_eq!(code_of(&no_data), format!("{:?}", std::process::ExitCode::from(4)));
    }
}
