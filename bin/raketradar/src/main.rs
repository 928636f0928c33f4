use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::Config;
use engine::{yahoo, Poller, YahooClient};
use journal::CsvJournal;
use signals::SignalEvaluator;
use telegram_notify::TelegramNotifier;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // ── Logging ──────────────────────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = match Config::from_env().and_then(|cfg| yahoo::check_config(&cfg).map(|()| cfg)) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!(error = %e, "Refusing to start");
            return ExitCode::FAILURE;
        }
    };
    info!(
        tickers = %cfg.tickers.join(","),
        interval_secs = cfg.check_interval.as_secs(),
        ma_window = cfg.ma_window,
        vol_window = cfg.vol_window,
        log = %cfg.log_destination.display(),
        "Raketradar starting"
    );

    // ── Collaborators ─────────────────────────────────────────────────────────
    let provider = match YahooClient::new() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "Failed to build market data client");
            return ExitCode::FAILURE;
        }
    };
    let notifier = Arc::new(TelegramNotifier::new(cfg.notifier_token.clone()));
    let journal = Arc::new(CsvJournal::new(cfg.log_destination.clone()));
    let evaluator = SignalEvaluator::new(cfg.ma_window, cfg.vol_window);

    let poller = Poller::new(cfg, provider, evaluator, journal, notifier);

    // ── Run until interrupted ─────────────────────────────────────────────────
    tokio::select! {
        _ = poller.run() => {}
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                error!(error = %e, "Failed to listen for shutdown signal");
                return ExitCode::FAILURE;
            }
            info!("Shutdown signal received. Exiting.");
        }
    }

    ExitCode::SUCCESS
}
