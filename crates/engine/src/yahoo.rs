use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use common::{Bar, Config, Error, MarketDataProvider, Result};

const BASE_URL: &str = "https://query1.finance.yahoo.com";
/// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0";

/// Yahoo Finance chart API client. Used to pull intraday bars per ticker.
pub struct YahooClient {
    base_url: Url,
    http: Client,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    /// Point the client at another host (a local mock in tests).
    pub fn with_base_url(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| Error::Config(format!("invalid market data url {}: {e}", base_url.as_ref())))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("market data url {base_url} cannot take a path")));
        }

        let http = Client::builder()
            .use_rustls_tls()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self { base_url, http })
    }

    /// Chart endpoint for `ticker`. The symbol is a single escaped path
    /// segment, so `/`, `?` and `#` cannot change the request.
    pub fn chart_url(&self, ticker: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["v8", "finance", "chart", ticker]);
        }
        url
    }
}

/// Reject settings the chart API can never serve, before the first cycle.
pub fn check_config(cfg: &Config) -> Result<()> {
    interval_param(cfg.bar_interval).map_err(|e| Error::Config(e.to_string()))?;
    window_start(Utc::now(), cfg.lookback).map_err(|e| Error::Config(e.to_string()))?;
    Ok(())
}

/// Start of a fetch window of length `lookback` ending at `end`.
fn window_start(end: DateTime<Utc>, lookback: Duration) -> Result<DateTime<Utc>> {
    chrono::Duration::from_std(lookback)
        .ok()
        .and_then(|d| end.checked_sub_signed(d))
        .ok_or_else(|| Error::Provider(format!("lookback of {}s is out of range", lookback.as_secs())))
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch(
        &self,
        ticker: &str,
        lookback: Duration,
        bar_interval: Duration,
    ) -> Result<Vec<Bar>> {
        let interval = interval_param(bar_interval)?;
        let end = Utc::now();
        let start = window_start(end, lookback)?;

        let url = self.chart_url(ticker);
        let query = [
            ("period1", start.timestamp().to_string()),
            ("period2", end.timestamp().to_string()),
            ("interval", interval.to_string()),
            ("includePrePost", "false".to_string()),
        ];

        debug!(ticker, interval, "Fetching bars from Yahoo");
        let resp = self
            .http
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        // Error responses still carry a chart envelope with a description;
        // prefer that over the bare status.
        match parse_chart(&body) {
            Ok(bars) if status.is_success() => {
                debug!(ticker, bars = bars.len(), "Fetched bars");
                Ok(bars)
            }
            Ok(_) => Err(Error::Provider(format!("HTTP {status}: {body}"))),
            Err(e @ Error::Provider(_)) => Err(e),
            Err(_) if !status.is_success() => Err(Error::Provider(format!("HTTP {status}: {body}"))),
            Err(e) => Err(e),
        }
    }
}

/// Map a bar size onto one of the interval codes the chart API accepts.
pub fn interval_param(bar_interval: Duration) -> Result<&'static str> {
    let code = match bar_interval.as_secs() {
        60 => "1m",
        120 => "2m",
        300 => "5m",
        900 => "15m",
        1_800 => "30m",
        3_600 => "60m",
        5_400 => "90m",
        86_400 => "1d",
        432_000 => "5d",
        604_800 => "1wk",
        other => {
            return Err(Error::Provider(format!(
                "unsupported bar interval of {other}s"
            )))
        }
    };
    Ok(code)
}

/// Decode a chart response into bars, oldest first.
///
/// Rows with any missing OHLCV value are dropped, as are rows whose timestamp
/// does not move forward (the live bar is sometimes repeated at the end).
pub fn parse_chart(body: &str) -> Result<Vec<Bar>> {
    let resp: ChartResponse = serde_json::from_str(body)?;

    if let Some(err) = resp.chart.error {
        return Err(Error::Provider(format!("{}: {}", err.code, err.description)));
    }

    let Some(data) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(Error::Provider("empty chart result".into()));
    };
    let Some(quote) = data.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut bars: Vec<Bar> = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let field = |col: &[Option<f64>]| col.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
            field(&quote.volume),
        ) else {
            continue;
        };
        let Some(timestamp) = Utc.timestamp_opt(ts, 0).single() else {
            continue;
        };
        if bars.last().is_some_and(|last| last.timestamp >= timestamp) {
            continue;
        }

        bars.push(Bar { timestamp, open, high, low, close, volume });
    }

    Ok(bars)
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}
