//! ticker-watch: poll a Twitter timeline, detect stock mentions, notify.
//!
//! Usage:
//!   ticker-watch                      # poll every POLL_INTERVAL_SECS until Ctrl+C
//!   ticker-watch --once               # single poll cycle
//!   ticker-watch --text "Apple and Gartner seem to be at each other"

use std::time::Duration;

use anyhow::{Context, Result};
use mention_core::SimilarityOracle;
use mention_engine::{Catalog, MentionDetector};
use notification_service::{NotificationConfig, NotificationService};
use similarity_client::HttpSimilarityOracle;
use tokio::signal::unix::SignalKind;
use tokio::time;
use twitter_client::{TimelineSource, TwitterConfig};

mod config;
mod pipeline;

use config::WatchConfig;
use pipeline::Pipeline;

enum Mode {
    Text(String),
    Once,
    Watch,
}

fn parse_mode(args: &[String]) -> Result<Mode> {
    if let Some(i) = args.iter().position(|a| a == "--text") {
        let text = args
            .get(i + 1)
            .context("--text requires a message argument")?;
        return Ok(Mode::Text(text.clone()));
    }
    if args.iter().any(|a| a == "--once") {
        return Ok(Mode::Once);
    }
    Ok(Mode::Watch)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ticker_watch=info,mention_engine=info,similarity_client=info".into());

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    let args: Vec<String> = std::env::args().collect();
    let mode = parse_mode(&args)?;

    let config = WatchConfig::from_env()?;
    tracing::info!("Similarity threshold: {:.2}", config.engine.similarity_threshold);

    let catalog = Catalog::load(&config.catalog_path)
        .with_context(|| format!("failed to load catalog {}", config.catalog_path.display()))?;

    let oracle = HttpSimilarityOracle::open(&config.oracle)
        .await
        .context("similarity oracle unavailable")?;
    tracing::info!("Similarity backend: {}", oracle.backend_name());

    // The oracle is closed on every exit path below, including errors.
    let outcome = run(mode, &config, catalog, &oracle).await;
    oracle.close();
    outcome
}

async fn run(
    mode: Mode,
    config: &WatchConfig,
    catalog: Catalog,
    oracle: &HttpSimilarityOracle,
) -> Result<()> {
    let detector = MentionDetector::new(config.engine);

    let once = match mode {
        Mode::Text(text) => {
            let result = detector.detect(&text, &catalog, oracle).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }
        Mode::Once => true,
        Mode::Watch => false,
    };

    let twitter = TwitterConfig::from_env()?;
    let source = TimelineSource::connect(&twitter).await?;
    let notifier = NotificationService::new(&NotificationConfig::from_env())?;
    if notifier.channel_count() == 0 {
        tracing::warn!("No notification channels configured; mentions will only be logged");
    }
    let mut pipeline = Pipeline::new(detector, catalog);

    if once {
        let summary = pipeline.run_cycle(&source, oracle, &notifier).await?;
        tracing::info!(
            "Cycle complete: {} messages, {} with mentions, {} mentions",
            summary.messages,
            summary.reports,
            summary.mentions
        );
        return Ok(());
    }

    tracing::info!(
        "Watching timeline every {}s. Press Ctrl+C to stop.",
        config.poll_interval_seconds
    );

    let mut interval = time::interval(Duration::from_secs(config.poll_interval_seconds));
    let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())?;
    let shutdown = async {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
        }
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match pipeline.run_cycle(&source, oracle, &notifier).await {
                    Ok(summary) => tracing::info!(
                        "Cycle complete: {} messages, {} with mentions, {} mentions (cursor {:?})",
                        summary.messages,
                        summary.reports,
                        summary.mentions,
                        pipeline.cursor()
                    ),
                    // Retried from the same cursor on the next tick
                    Err(e) => tracing::error!("Error in poll cycle: {}", e),
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_mode() {
        assert!(matches!(parse_mode(&args(&["ticker-watch"])).unwrap(), Mode::Watch));
        assert!(matches!(parse_mode(&args(&["ticker-watch", "--once"])).unwrap(), Mode::Once));
        match parse_mode(&args(&["ticker-watch", "--text", "AAPL up"])).unwrap() {
            Mode::Text(t) => assert_eq!(t, "AAPL up"),
            _ => panic!("expected text mode"),
        }
        assert!(parse_mode(&args(&["ticker-watch", "--text"])).is_err());
    }
}
