use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::{Error, Result};

const DEFAULT_TICKERS: &str = "NVDA,PLTR,AMD,SMCI,TALK";
const DEFAULT_LOG_DESTINATION: &str = "data/raketradar_log.csv";
/// Upper bound on `LOOKBACK_DAYS`; keeps `now - lookback` representable.
pub const MAX_LOOKBACK_DAYS: u64 = 36_500;

/// All configuration loaded from environment variables at startup.
/// Built once and shared read-only for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    // Watchlist, in polling order
    pub tickers: Vec<String>,

    // Scheduling
    pub check_interval: Duration,
    pub lookback: Duration,
    pub bar_interval: Duration,

    // Indicators
    pub ma_window: usize,
    pub vol_window: usize,

    // Notifier
    pub notifier_token: String,
    pub notifier_chat_id: String,

    // Run log
    pub log_destination: PathBuf,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        // a missing .env is fine; the process environment may carry everything
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let notifier_token = get("NOTIFIER_TOKEN")
            .or_else(|| get("TELEGRAM_TOKEN"))
            .ok_or_else(|| missing("NOTIFIER_TOKEN"))?;
        let notifier_chat_id = get("NOTIFIER_CHAT_ID")
            .or_else(|| get("TELEGRAM_CHAT_ID"))
            .ok_or_else(|| missing("NOTIFIER_CHAT_ID"))?;

        let tickers = parse_tickers(&get("TICKERS").unwrap_or_else(|| DEFAULT_TICKERS.to_string()));
        if tickers.is_empty() {
            return Err(Error::Config("TICKERS contains no symbols".into()));
        }

        let check_interval_secs = positive(&get, "CHECK_INTERVAL_SECONDS", 3600)?;
        let lookback_days = positive(&get, "LOOKBACK_DAYS", 10)?;
        if lookback_days > MAX_LOOKBACK_DAYS {
            return Err(Error::Config(format!(
                "LOOKBACK_DAYS must be at most {MAX_LOOKBACK_DAYS}, got {lookback_days}"
            )));
        }
        let bar_interval_mins = positive(&get, "BAR_INTERVAL_MINUTES", 60)?;

        Ok(Config {
            tickers,
            check_interval: Duration::from_secs(check_interval_secs),
            lookback: Duration::from_secs(scaled("LOOKBACK_DAYS", lookback_days, 24 * 60 * 60)?),
            bar_interval: Duration::from_secs(scaled("BAR_INTERVAL_MINUTES", bar_interval_mins, 60)?),
            ma_window: positive(&get, "MA_WINDOW", 20)? as usize,
            vol_window: positive(&get, "VOL_WINDOW", 20)? as usize,
            notifier_token,
            notifier_chat_id,
            log_destination: get("LOG_DESTINATION")
                .or_else(|| get("LOG_CSV"))
                .unwrap_or_else(|| DEFAULT_LOG_DESTINATION.to_string())
                .into(),
        })
    }

    /// Fewest bars a ticker needs before it can be evaluated.
    pub fn min_bars(&self) -> usize {
        self.ma_window.max(self.vol_window) + 2
    }
}

/// Split a comma-separated symbol list: trimmed, upper-cased, blanks and
/// repeats dropped, first occurrence wins.
pub fn parse_tickers(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

fn missing(key: &str) -> Error {
    Error::Config(format!(
        "Required environment variable '{key}' is not set. Check your .env file."
    ))
}

/// `value * unit` in seconds, or a config error when it does not fit.
fn scaled(key: &str, value: u64, unit: u64) -> Result<u64> {
    value
        .checked_mul(unit)
        .ok_or_else(|| Error::Config(format!("{key} is too large, got {value}")))
}

fn positive<F>(get: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(Error::Config(format!("{key} must be greater than zero"))),
        Ok(v) => Ok(v),
        Err(_) => Err(Error::Config(format!("{key} must be a positive integer, got '{raw}'"))),
    }
}
