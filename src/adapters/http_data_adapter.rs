//! HTTP data adapter: downloads raw price CSVs from per-ticker URLs.

use std::collections::HashMap;

use crate::adapters::price_csv::parse_price_csv;
use crate::domain::error::GaptraderError;
use crate::domain::ohlcv::{resample, Bar, Granularity};
use crate::ports::data_port::DataPort;

/// Share links for the course's five tickers; overridable via `[urls]`.
pub fn default_urls() -> HashMap<String, String> {
    [
        ("APPL", "https://edubuas-my.sharepoint.com/:x:/g/personal/davarynejad_m_buas_nl/EUjD8nLdpt1FmcNq1kQckBAB9gfHTn2Y_hl1zGOo5ecrYQ?e=AEmTL8"),
        ("AMZN", "https://edubuas-my.sharepoint.com/:x:/g/personal/davarynejad_m_buas_nl/ERqUB631cFlEilFPtvFw5MkBlq_bVvc4xa27svDLWGlU3A?e=nHbTKw"),
        ("FANG", "https://edubuas-my.sharepoint.com/:x:/g/personal/davarynejad_m_buas_nl/EejmVAFQLv5PqJGuFXcvgVYBGswiq_oQJ4LhzslJbLAoAA?e=SN9BLa"),
        ("GOOG", "https://edubuas-my.sharepoint.com/:x:/g/personal/davarynejad_m_buas_nl/ET6y-MR3SidHjGGmm8DQMn4BtpSO-GnAokJ8GI4LsghZDw?e=st6IyB"),
        ("TSLA", "https://edubuas-my.sharepoint.com/:x:/g/personal/davarynejad_m_buas_nl/Ecv4R01Cn75Koj7y8UFjxHMBazIVliolR9rioUwyT03vcw?e=uq2TSF"),
    ]
    .into_iter()
    .map(|(t, u)| (t.to_string(), u.to_string()))
    .collect()
}

/// Share links serve a web page unless the download flag is present.
pub fn download_url(url: &str) -> String {
    if url.contains("download=1") {
        url.to_string()
    } else if url.contains('?') {
        format!("{url}&download=1")
    } else {
        format!("{url}?download=1")
    }
}

pub struct HttpDataAdapter {
    client: reqwest::blocking::Client,
    urls: HashMap<String, String>,
}

impl HttpDataAdapter {
    pub fn new(urls: HashMap<String, String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            urls,
        }
    }

    /// Compiled-in defaults overlaid with `[urls]` entries from config.
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        let mut urls = default_urls();
        urls.extend(overrides);
        Self::new(urls)
    }

    fn url_for(&self, ticker: &str) -> Result<String, GaptraderError> {
        self.urls
            .get(&ticker.to_uppercase())
            .map(|u| download_url(u))
            .ok_or_else(|| GaptraderError::UnknownTicker {
                ticker: ticker.to_string(),
            })
    }

    /// Raw CSV text for a ticker, as served by the provider. Used by the
    /// `fetch` command to populate the local cache.
    pub fn download_raw(&self, ticker: &str) -> Result<String, GaptraderError> {
        let url = self.url_for(ticker)?;
        let fetch_err = |reason: String| GaptraderError::Fetch {
            ticker: ticker.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| fetch_err(e.to_string()))?
            .error_for_status()
            .map_err(|e| fetch_err(e.to_string()))?;

        response.text().map_err(|e| fetch_err(e.to_string()))
    }
}

impl DataPort for HttpDataAdapter {
    fn fetch_bars(
        &self,
        ticker: &str,
        granularity: Granularity,
    ) -> Result<Vec<Bar>, GaptraderError> {
        let body = self.download_raw(ticker)?;
        let bars = parse_price_csv(&ticker.to_uppercase(), body.as_bytes())?;
        Ok(resample(&bars, granularity))
    }

    fn list_tickers(&self) -> Result<Vec<String>, GaptraderError> {
        let mut tickers: Vec<String> = self.urls.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}
